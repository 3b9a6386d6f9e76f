//! Unified error type for LLM gateway operations.
//!
//! Every gateway implementation maps its native failures into
//! [`GatewayError`], giving callers a single type to match against
//! regardless of which backend is in use. Variants carry enough context
//! for retry decisions, user-facing messages, and diagnostics.
//!
//! # Retryability
//!
//! The HTTP and provider variants include a `retryable` flag that the
//! concrete gateway sets from the upstream response (e.g. HTTP 429 or
//! 503). The retry policy consults this flag in addition to its
//! transient-signature allow-list, because some backends only expose a
//! free-form error string.

/// The unified error type returned by gateway operations.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// The outbound history violates the provider's turn contract
    /// (typically: the final entry is not a user turn).
    #[error("invalid history: {0}")]
    InvalidHistory(String),

    /// An HTTP-level failure (transport error, unexpected status code).
    ///
    /// `status` is `None` when the request never received a response
    /// (DNS failure, connection reset).
    #[error("HTTP error (status={status:?}): {message}")]
    Http {
        /// The HTTP status code, if one was received.
        status: Option<http::StatusCode>,
        /// A human-readable description of the failure.
        message: String,
        /// Whether the caller should retry this request.
        retryable: bool,
    },

    /// A provider-reported error that doesn't map to another variant.
    #[error("provider error ({code}): {message}")]
    Provider {
        /// Provider-defined error code (e.g. `"RESOURCE_EXHAUSTED"`).
        code: String,
        /// Human-readable error description.
        message: String,
        /// Whether the caller should retry this request.
        retryable: bool,
    },

    /// The response body could not be parsed, or carried no generated text.
    #[error("response format error: {message}")]
    ResponseFormat {
        /// What went wrong during parsing.
        message: String,
        /// The raw response body, for diagnostics.
        raw: String,
    },

    /// The request exceeded its deadline.
    #[error("request timed out after {elapsed_ms}ms")]
    Timeout {
        /// Milliseconds elapsed before the timeout fired.
        elapsed_ms: u64,
    },

    /// The retry budget was spent without a successful response.
    #[error("gateway retries exhausted after {attempts} attempts: {last_error}")]
    RetryExhausted {
        /// How many attempts were made in total.
        attempts: u32,
        /// The error from the final attempt.
        #[source]
        last_error: Box<GatewayError>,
    },
}

impl GatewayError {
    /// Returns `true` if the structured retryability flag marks this
    /// error as transient. Timeouts are always retryable.
    ///
    /// The retry policy combines this with message-signature matching,
    /// see [`RetryPolicy::should_retry`](crate::retry::RetryPolicy::should_retry).
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { retryable, .. } | Self::Provider { retryable, .. } => *retryable,
            Self::Timeout { .. } => true,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        Self::ResponseFormat {
            message: err.to_string(),
            raw: String::new(),
        }
    }
}
