//! Gemini backend configuration.

use std::time::Duration;

/// Configuration for the Gemini gateway.
///
/// Use struct update syntax with [`Default`] for ergonomic construction:
///
/// ```rust
/// use chatloop_gemini::GeminiConfig;
///
/// let config = GeminiConfig {
///     api_key: "AIza...".into(),
///     model: "gemini-2.0-flash".into(),
///     ..Default::default()
/// };
/// ```
#[derive(Clone)]
pub struct GeminiConfig {
    /// Gemini API key. Required.
    pub api_key: String,
    /// Model identifier (e.g. `"gemini-2.0-flash"`).
    pub model: String,
    /// Base URL for the API. Override for proxies or local emulators.
    pub base_url: String,
    /// Request timeout. `None` uses reqwest's default.
    pub timeout: Option<Duration>,
    /// Pre-configured HTTP client for connection pooling across
    /// backends. When `None`, a new client is created.
    pub client: Option<reqwest::Client>,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("client", &self.client.as_ref().map(|_| "..."))
            .finish()
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gemini-2.0-flash".into(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
            timeout: Some(Duration::from_secs(30)),
            client: None,
        }
    }
}
