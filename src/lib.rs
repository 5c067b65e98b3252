pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod export;
pub mod global;
pub mod intake;
pub mod session;
pub mod summary;
