use crate::config::Config;
use anyhow::{Context, Result};

pub mod args;
pub mod process;

pub use args::{Cli, CliCommand, ProcessCliArgs, ServeCliArgs};
pub use process::handle_process_command;

pub fn handle_config_command(config: &Config) -> Result<()> {
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    println!("{}", content);
    Ok(())
}
