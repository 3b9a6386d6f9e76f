//! Tool-server client configuration.

use std::time::Duration;

/// Configuration for the JSON-RPC tool client.
#[derive(Debug, Clone)]
pub struct McpConfig {
    /// Base URL the JSON-RPC requests are POSTed to. The health probe
    /// lives at `{base_url}/actuator/health`.
    pub base_url: String,
    /// Request timeout. `None` uses reqwest's default.
    pub timeout: Option<Duration>,
    /// Pre-configured HTTP client for connection pooling across
    /// backends. When `None`, a new client is created.
    pub client: Option<reqwest::Client>,
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".into(),
            timeout: Some(Duration::from_secs(15)),
            client: None,
        }
    }
}
