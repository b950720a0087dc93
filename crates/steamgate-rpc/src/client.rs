//! Outbound JSON-RPC client for event relay.

use serde_json::Value;
use steamgate_config::EndpointConfig;

use crate::types::RpcRequest;

/// Transport failure delivering an outbound call.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    /// The HTTP request could not be delivered.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("endpoint answered status {0}")]
    Status(u16),
}

/// Fire-and-forget JSON-RPC caller.
///
/// The response body is never interpreted; only transport-level failure is
/// reported, for logging. Nothing is retried.
pub struct RpcClient {
    http: reqwest::Client,
    endpoint: String,
}

impl RpcClient {
    /// Client posting to the configured remote endpoint.
    pub fn new(config: &EndpointConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: config.url(),
        }
    }

    /// The target URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Issue one call.
    pub async fn call(&self, method: &str, params: Value) -> Result<(), ForwardError> {
        let request = RpcRequest::call(method, params);
        let response = self.http.post(&self.endpoint).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ForwardError::Status(status.as_u16()));
        }
        Ok(())
    }
}
