pub mod remote_api;
pub mod sample;

pub use remote_api::RemoteApiProducer;
pub use sample::SampleProducer;
