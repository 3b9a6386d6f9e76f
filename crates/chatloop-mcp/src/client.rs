//! The JSON-RPC HTTP [`ToolClient`] implementation.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};

use chatloop::{ToolClient, ToolDescriptor, ToolError};
use serde_json::{Value, json};
use tracing::{debug, instrument};

use crate::config::McpConfig;
use crate::types::{CallResult, ListResult, RpcRequest, RpcResponse, first_text, unwrap_result};

/// HTTP client for a JSON-RPC 2.0 tool server.
///
/// Each outbound request is assigned a monotonically increasing id from
/// a counter scoped to this instance; the orchestration core only calls
/// sequentially within a turn, the id exists for response correlation
/// and log diagnostics.
#[derive(Debug)]
pub struct McpHttpClient {
    config: McpConfig,
    client: reqwest::Client,
    next_id: AtomicU64,
}

impl McpHttpClient {
    /// Creates a client from configuration.
    pub fn new(config: McpConfig) -> Self {
        let client = config.client.clone().unwrap_or_else(|| {
            let mut builder = reqwest::Client::builder();
            if let Some(timeout) = config.timeout {
                builder = builder.timeout(timeout);
            }
            builder.build().expect("failed to build HTTP client")
        });
        Self {
            config,
            client,
            next_id: AtomicU64::new(1),
        }
    }

    /// Builds the next request, consuming one id.
    fn next_request(&self, method: &'static str, params: Value) -> RpcRequest {
        RpcRequest::new(self.next_id.fetch_add(1, Ordering::Relaxed), method, params)
    }

    /// POSTs a request and returns the unwrapped `result` payload.
    async fn post(&self, request: RpcRequest) -> Result<Value, ToolError> {
        debug!(id = request.id, method = request.method, "tool server request");

        let response = self
            .client
            .post(&self.config.base_url)
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ToolError::Transport {
                status: http::StatusCode::from_u16(status.as_u16()).ok(),
                message: body.chars().take(500).collect(),
            });
        }

        let decoded: RpcResponse = response
            .json()
            .await
            .map_err(|e| ToolError::MalformedResponse(e.to_string()))?;
        unwrap_result(decoded)
    }

    /// Probes `GET {base_url}/actuator/health`; liveness is reported by
    /// HTTP status alone.
    #[instrument(skip_all)]
    pub async fn health(&self) -> bool {
        let url = format!(
            "{}/actuator/health",
            self.config.base_url.trim_end_matches('/')
        );
        match self.client.get(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

fn map_transport_error(error: reqwest::Error) -> ToolError {
    ToolError::Transport {
        status: error.status().map(|s| {
            http::StatusCode::from_u16(s.as_u16())
                .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR)
        }),
        message: error.to_string(),
    }
}

impl ToolClient for McpHttpClient {
    fn list_tools(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ToolDescriptor>, ToolError>> + Send + '_>> {
        Box::pin(async move {
            let request = self.next_request("tools/list", json!({}));
            let result = self.post(request).await?;
            let listing: ListResult = serde_json::from_value(result)
                .map_err(|e| ToolError::MalformedResponse(e.to_string()))?;
            Ok(listing.tools.into_iter().map(Into::into).collect())
        })
    }

    fn call_tool<'a>(
        &'a self,
        name: &'a str,
        arguments: Value,
    ) -> Pin<Box<dyn Future<Output = Result<String, ToolError>> + Send + 'a>> {
        Box::pin(async move {
            let request = self.next_request(
                "tools/call",
                json!({"name": name, "arguments": arguments}),
            );
            let result = self.post(request).await?;
            let call: CallResult = serde_json::from_value(result)
                .map_err(|e| ToolError::MalformedResponse(e.to_string()))?;
            first_text(call)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_ids_are_monotonic() {
        let client = McpHttpClient::new(McpConfig::default());
        let first = client.next_request("tools/list", json!({}));
        let second = client.next_request("tools/call", json!({"name": "x"}));
        let third = client.next_request("tools/call", json!({"name": "y"}));
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(third.id, 3);
    }

    #[test]
    fn test_call_request_carries_name_and_arguments() {
        let client = McpHttpClient::new(McpConfig::default());
        let request = client.next_request(
            "tools/call",
            json!({"name": "getSegment", "arguments": {"filter": "gender=male"}}),
        );
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["method"], "tools/call");
        assert_eq!(value["params"]["name"], "getSegment");
        assert_eq!(value["params"]["arguments"]["filter"], "gender=male");
    }
}
