//! The Gemini [`Gateway`] implementation.

use chatloop::{Gateway, GatewayError, Message};
use tracing::instrument;

use crate::config::GeminiConfig;
use crate::convert;
use crate::types::{GenerateContentRequest, GenerateContentResponse};

/// Gemini `generateContent` backend implementing [`Gateway`].
#[derive(Debug)]
pub struct GeminiGateway {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl GeminiGateway {
    /// Creates a gateway from configuration.
    ///
    /// If `config.client` is `Some`, that client is reused for
    /// connection pooling. Otherwise a new client is built with the
    /// configured timeout.
    pub fn new(config: GeminiConfig) -> Self {
        let client = config.client.clone().unwrap_or_else(|| {
            let mut builder = reqwest::Client::builder();
            if let Some(timeout) = config.timeout {
                builder = builder.timeout(timeout);
            }
            builder.build().expect("failed to build HTTP client")
        });
        Self { config, client }
    }

    /// Full URL of the `generateContent` endpoint for the configured
    /// model.
    fn generate_url(&self) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        format!("{base}/models/{}:generateContent", self.config.model)
    }

    fn map_transport_error(&self, error: reqwest::Error) -> GatewayError {
        if error.is_timeout() {
            GatewayError::Timeout {
                elapsed_ms: self
                    .config
                    .timeout
                    .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX)),
            }
        } else {
            GatewayError::Http {
                status: error.status().map(|s| {
                    http::StatusCode::from_u16(s.as_u16())
                        .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR)
                }),
                message: error.to_string(),
                retryable: error.is_connect() || error.is_timeout(),
            }
        }
    }
}

impl Gateway for GeminiGateway {
    #[instrument(skip_all, fields(model = %self.config.model))]
    async fn send(&self, history: &[Message]) -> Result<String, GatewayError> {
        let request = GenerateContentRequest {
            contents: convert::build_contents(history)?,
        };

        let response = self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let status = http::StatusCode::from_u16(status.as_u16())
                .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR);
            return Err(convert::convert_error(status, &body));
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        let parsed: GenerateContentResponse =
            serde_json::from_str(&body).map_err(|e| GatewayError::ResponseFormat {
                message: e.to_string(),
                raw: body.chars().take(2000).collect(),
            })?;

        convert::response_text(parsed)
    }
}
