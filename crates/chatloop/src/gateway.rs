//! The LLM gateway trait and its retrying wrapper.
//!
//! Two abstractions, mirroring each other:
//!
//! - **[`Gateway`]** — the trait every LLM backend implements. It uses
//!   native async-fn-in-traits, so implementations are plain `async fn`s.
//! - **[`DynGateway`]** — an object-safe mirror using boxed futures. A
//!   blanket `impl<T: Gateway> DynGateway for T` bridges the two, so any
//!   concrete gateway can be stored as `Arc<dyn DynGateway>` with no
//!   boilerplate.
//!
//! # Turn contract
//!
//! The provider being modeled enforces strict user/model alternation and
//! has no system role in history, so `send` requires the final history
//! entry to be a user turn ([`GatewayError::InvalidHistory`] otherwise).
//! System entries are filtered out by the concrete backend before
//! transmission.
//!
//! # Retries
//!
//! [`RetryingGateway`] layers a [`RetryPolicy`] over any `DynGateway`:
//! a bounded loop with an explicit attempt counter, sleeping the computed
//! backoff between attempts. There is no caching anywhere in this path —
//! every call is a fresh round-trip.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::chat::{ChatRole, Message};
use crate::error::GatewayError;
use crate::retry::RetryPolicy;

/// The trait every LLM backend implements.
///
/// `Gateway` is **not** object-safe because async-fn-in-traits returns
/// `impl Future`. For dynamic dispatch use [`DynGateway`] — every
/// `Gateway` implements it automatically via a blanket impl.
pub trait Gateway: Send + Sync {
    /// Sends a role-tagged history and returns the generated text for
    /// the final turn.
    ///
    /// The last entry of `history` must have role [`ChatRole::User`].
    fn send(
        &self,
        history: &[Message],
    ) -> impl Future<Output = Result<String, GatewayError>> + Send;
}

/// Object-safe counterpart of [`Gateway`] for dynamic dispatch.
///
/// You rarely implement this directly — the blanket impl does it for
/// every [`Gateway`].
pub trait DynGateway: Send + Sync {
    /// Boxed-future version of [`Gateway::send`].
    fn send_boxed<'a>(
        &'a self,
        history: &'a [Message],
    ) -> Pin<Box<dyn Future<Output = Result<String, GatewayError>> + Send + 'a>>;
}

impl<T: Gateway> DynGateway for T {
    fn send_boxed<'a>(
        &'a self,
        history: &'a [Message],
    ) -> Pin<Box<dyn Future<Output = Result<String, GatewayError>> + Send + 'a>> {
        Box::pin(self.send(history))
    }
}

/// Validates the gateway turn contract: non-empty history ending in a
/// user turn.
pub fn validate_history(history: &[Message]) -> Result<(), GatewayError> {
    match history.last() {
        Some(message) if message.role == ChatRole::User => Ok(()),
        Some(message) => Err(GatewayError::InvalidHistory(format!(
            "final history entry must be a user turn, got {}",
            message.role
        ))),
        None => Err(GatewayError::InvalidHistory("history is empty".into())),
    }
}

/// A [`Gateway`] that retries transient failures with exponential
/// backoff before giving up.
///
/// Wraps any [`DynGateway`] plus a [`RetryPolicy`]. Once the budget is
/// spent on a retryable failure the final error is wrapped in
/// [`GatewayError::RetryExhausted`], annotated with the underlying
/// cause; non-retryable errors propagate unwrapped on first sight.
#[derive(Clone)]
pub struct RetryingGateway {
    inner: Arc<dyn DynGateway>,
    policy: RetryPolicy,
}

impl std::fmt::Debug for RetryingGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryingGateway")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl RetryingGateway {
    /// Wraps `inner` with the given policy.
    pub fn new(inner: Arc<dyn DynGateway>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// Like [`Gateway::send`], but substitutes `fallback` when the call
    /// fails after exhausting retries. The error is logged, never lost
    /// silently, and the caller receives usable degraded-mode text.
    pub async fn send_with_fallback(&self, history: &[Message], fallback: &str) -> String {
        match self.send(history).await {
            Ok(text) => text,
            Err(error) => {
                warn!(%error, "gateway call failed, substituting fallback text");
                fallback.to_string()
            }
        }
    }
}

impl Gateway for RetryingGateway {
    async fn send(&self, history: &[Message]) -> Result<String, GatewayError> {
        validate_history(history)?;

        let mut attempt: u32 = 0;
        loop {
            match self.inner.send_boxed(history).await {
                Ok(text) => return Ok(text),
                Err(error) if self.policy.should_retry(&error, attempt) => {
                    let delay = self.policy.delay_for(attempt);
                    debug!(
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        %error,
                        "transient gateway failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) if attempt >= self.policy.max_attempts => {
                    return Err(GatewayError::RetryExhausted {
                        attempts: attempt + 1,
                        last_error: Box::new(error),
                    });
                }
                Err(error) => return Err(error),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockGateway;
    use std::time::Duration;

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 2,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            jitter: Duration::ZERO,
        }
    }

    fn transient_error() -> GatewayError {
        GatewayError::Http {
            status: Some(http::StatusCode::SERVICE_UNAVAILABLE),
            message: "model overloaded".into(),
            retryable: true,
        }
    }

    fn user_turn(text: &str) -> Vec<Message> {
        vec![Message::transient(ChatRole::User, text)]
    }

    #[test]
    fn test_validate_history_rejects_empty() {
        assert!(matches!(
            validate_history(&[]),
            Err(GatewayError::InvalidHistory(_))
        ));
    }

    #[test]
    fn test_validate_history_rejects_assistant_final_turn() {
        let history = vec![Message::transient(ChatRole::Assistant, "hi")];
        assert!(matches!(
            validate_history(&history),
            Err(GatewayError::InvalidHistory(_))
        ));
    }

    #[tokio::test]
    async fn test_send_passes_through_success() {
        let mock = Arc::new(MockGateway::new());
        mock.queue_reply("four");
        let gateway = RetryingGateway::new(mock.clone(), fast_policy());

        let text = gateway.send(&user_turn("2+2?")).await.unwrap();
        assert_eq!(text, "four");
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_send_rejects_non_user_final_turn_before_calling() {
        let mock = Arc::new(MockGateway::new());
        let gateway = RetryingGateway::new(mock.clone(), fast_policy());

        let history = vec![Message::transient(ChatRole::Assistant, "hello")];
        let err = gateway.send(&history).await.unwrap_err();
        assert!(matches!(err, GatewayError::InvalidHistory(_)));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_send_retries_transient_then_succeeds() {
        let mock = Arc::new(MockGateway::new());
        mock.queue_error(transient_error());
        mock.queue_reply("recovered");
        let gateway = RetryingGateway::new(mock.clone(), fast_policy());

        let text = gateway.send(&user_turn("hi")).await.unwrap();
        assert_eq!(text, "recovered");
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_send_wraps_final_error_after_exhaustion() {
        let mock = Arc::new(MockGateway::new());
        for _ in 0..3 {
            mock.queue_error(transient_error());
        }
        let gateway = RetryingGateway::new(mock.clone(), fast_policy());

        let err = gateway.send(&user_turn("hi")).await.unwrap_err();
        match err {
            GatewayError::RetryExhausted {
                attempts,
                last_error,
            } => {
                assert_eq!(attempts, 3);
                assert!(last_error.to_string().contains("overloaded"));
            }
            other => panic!("expected RetryExhausted, got {other:?}"),
        }
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn test_send_does_not_retry_permanent_errors() {
        let mock = Arc::new(MockGateway::new());
        mock.queue_error(GatewayError::Provider {
            code: "INVALID_ARGUMENT".into(),
            message: "unknown model".into(),
            retryable: false,
        });
        let gateway = RetryingGateway::new(mock.clone(), fast_policy());

        let err = gateway.send(&user_turn("hi")).await.unwrap_err();
        assert!(matches!(err, GatewayError::Provider { .. }));
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_send_with_fallback_substitutes_on_failure() {
        let mock = Arc::new(MockGateway::new());
        mock.queue_error(GatewayError::Provider {
            code: "INVALID_ARGUMENT".into(),
            message: "bad request".into(),
            retryable: false,
        });
        let gateway = RetryingGateway::new(mock, fast_policy());

        let text = gateway
            .send_with_fallback(&user_turn("hi"), "degraded answer")
            .await;
        assert_eq!(text, "degraded answer");
    }
}
