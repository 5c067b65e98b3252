//! Result production: turning a run's input into a summary and action items.
//!
//! The session machine only sees the [`ResultProducer`] trait; which engine
//! sits behind it is decided from config.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::config::ProducerConfig;
use crate::session::{InputReference, ResultPayload};

pub mod providers;

pub use providers::{RemoteApiProducer, SampleProducer};

/// Produces the structured result for one run.
///
/// Called exactly once per run, after progress has settled. The future may be
/// dropped mid-flight when the session is reset.
#[async_trait]
pub trait ResultProducer: Send + Sync {
    fn name(&self) -> &'static str;

    async fn produce(&self, input: &InputReference) -> Result<ResultPayload>;
}

pub fn build_producer(config: &ProducerConfig) -> Result<Arc<dyn ResultProducer>> {
    let producer: Arc<dyn ResultProducer> = match config.provider.as_str() {
        "sample" => Arc::new(SampleProducer),
        "remote-api" => {
            let endpoint = config
                .api_endpoint
                .clone()
                .context("api_endpoint is required for the remote-api producer")?;
            Arc::new(RemoteApiProducer::new(endpoint, config.api_key.clone())?)
        }
        other => bail!(
            "Unknown result producer '{}'. Supported producers: sample, remote-api",
            other
        ),
    };

    info!("Using {} for result production", producer.name());
    Ok(producer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_sample_producer() {
        let producer = build_producer(&ProducerConfig::default()).unwrap();
        assert_eq!(producer.name(), "Sample");
    }

    #[test]
    fn test_remote_producer_requires_endpoint() {
        let config = ProducerConfig {
            provider: "remote-api".to_string(),
            api_endpoint: None,
            api_key: None,
        };
        let err = build_producer(&config).err().unwrap();
        assert!(err.to_string().contains("api_endpoint"));
    }

    #[test]
    fn test_unknown_producer_is_rejected() {
        let config = ProducerConfig {
            provider: "gpt-9".to_string(),
            ..ProducerConfig::default()
        };
        let err = build_producer(&config).err().unwrap();
        assert!(err.to_string().contains("Unknown result producer 'gpt-9'"));
    }
}
