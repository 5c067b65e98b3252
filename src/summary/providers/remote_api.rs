use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::{debug, error, info};

use crate::session::{AudioInput, InputReference, ResultPayload};
use crate::summary::ResultProducer;

async fn encode_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path)
        .await
        .with_context(|| format!("Failed to read audio file {:?}", path))?;
    Ok(BASE64.encode(&bytes))
}

#[derive(Debug, Serialize)]
struct SummaryRequest<'a> {
    input: &'a InputReference,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_base64: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
    code: Option<String>,
}

/// Delegates summarization to an HTTP service.
pub struct RemoteApiProducer {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl RemoteApiProducer {
    pub fn new(endpoint: String, api_key: Option<String>) -> Result<Self> {
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            bail!("Invalid summary endpoint '{}': expected an http(s) URL", endpoint);
        }

        let client = reqwest::Client::new();
        info!("Initialized remote summary producer with endpoint: {}", endpoint);

        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }
}

#[async_trait]
impl ResultProducer for RemoteApiProducer {
    fn name(&self) -> &'static str {
        "Remote API"
    }

    async fn produce(&self, input: &InputReference) -> Result<ResultPayload> {
        let content_base64 = match input {
            InputReference::Audio(AudioInput {
                source: Some(path), ..
            }) => Some(encode_file(path).await?),
            InputReference::Audio(_) | InputReference::Text(_) => None,
        };

        debug!("Sending {} input to {}", input.kind(), self.endpoint);

        let mut request = self.client.post(&self.endpoint).json(&SummaryRequest {
            input,
            content_base64,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .context("Failed to send request to summary API")?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .context("Failed to read response body")?;

        if !status.is_success() {
            error!(
                "Summary API request failed with status {}: {}",
                status, response_text
            );

            if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&response_text) {
                return Err(anyhow!(
                    "Summary API error: {} (code: {:?})",
                    error_response.error.message,
                    error_response.error.code
                ));
            }

            bail!(
                "Summary API request failed with status {}: {}",
                status,
                response_text
            );
        }

        let payload: ResultPayload =
            serde_json::from_str(&response_text).context("Failed to parse summary response")?;

        if payload.summary_points.is_empty() && payload.action_items.is_empty() {
            bail!("Summary API returned an empty result");
        }

        info!(
            "Summary complete: {} points, {} action items",
            payload.summary_points.len(),
            payload.action_items.len()
        );
        Ok(payload)
    }
}
