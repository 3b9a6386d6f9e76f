//! Retry decisions and exponential backoff for LLM calls.
//!
//! The upstream error surface is partly free-form text, so retryability
//! is decided two ways: the structured `retryable` flag that gateways
//! set from HTTP status codes, and a case-insensitive substring match
//! against a fixed allow-list of transient-failure signatures. Anything
//! that matches neither propagates immediately — this policy never
//! swallows an error.

use std::time::Duration;

use rand::Rng;

use crate::error::GatewayError;

/// Transient-failure signatures, matched case-insensitively as
/// substrings of the rendered error message.
const TRANSIENT_SIGNATURES: &[&str] = &[
    "service unavailable",
    "unavailable",
    "overloaded",
    "rate limit",
    "rate-limited",
    "quota",
    "too many requests",
    "internal error",
    "internal server error",
    "bad gateway",
    "gateway timeout",
    "timed out",
    "timeout",
    "429",
    "503",
];

/// Returns `true` when `message` matches the transient allow-list.
pub fn is_transient_message(message: &str) -> bool {
    let lowered = message.to_lowercase();
    TRANSIENT_SIGNATURES.iter().any(|sig| lowered.contains(sig))
}

/// Bounded exponential backoff with jitter.
///
/// Delay for attempt `n` is `base_delay * 2^n + uniform(0, jitter)`,
/// capped at `max_delay`. Retry is permitted only while
/// `attempt < max_attempts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retry budget; attempts are numbered from 0.
    pub max_attempts: u32,
    /// Backoff base for attempt 0.
    pub base_delay: Duration,
    /// Hard cap on any single delay.
    pub max_delay: Duration,
    /// Upper bound of the uniform jitter added to each delay.
    pub jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            jitter: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Decides whether `error` warrants another attempt.
    ///
    /// `false` once `attempt == max_attempts`, regardless of the error.
    /// Otherwise `true` only when the error's structured flag marks it
    /// retryable or its message matches the transient allow-list.
    pub fn should_retry(&self, error: &GatewayError, attempt: u32) -> bool {
        if attempt >= self.max_attempts {
            return false;
        }
        error.is_retryable() || is_transient_message(&error.to_string())
    }

    /// Backoff delay before retrying attempt `attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        let backoff = self
            .base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay);
        let jitter = if self.jitter.is_zero() {
            Duration::ZERO
        } else {
            let bound = u64::try_from(self.jitter.as_millis()).unwrap_or(u64::MAX);
            Duration::from_millis(rand::thread_rng().gen_range(0..=bound))
        };
        (backoff + jitter).min(self.max_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transient_error() -> GatewayError {
        GatewayError::Http {
            status: Some(http::StatusCode::SERVICE_UNAVAILABLE),
            message: "service unavailable".into(),
            retryable: true,
        }
    }

    fn permanent_error() -> GatewayError {
        GatewayError::InvalidHistory("final turn must be a user turn".into())
    }

    #[test]
    fn test_transient_signatures_match_case_insensitively() {
        assert!(is_transient_message("Model is OVERLOADED, try later"));
        assert!(is_transient_message("Resource quota exceeded for project"));
        assert!(is_transient_message("upstream Gateway Timeout"));
        assert!(is_transient_message("HTTP 429 Too Many Requests"));
    }

    #[test]
    fn test_non_transient_messages_do_not_match() {
        assert!(!is_transient_message("invalid api key"));
        assert!(!is_transient_message("malformed request body"));
    }

    #[test]
    fn test_should_retry_false_once_budget_spent() {
        let policy = RetryPolicy::default();
        assert!(!policy.should_retry(&transient_error(), policy.max_attempts));
        assert!(!policy.should_retry(&transient_error(), policy.max_attempts + 1));
    }

    #[test]
    fn test_should_retry_false_for_permanent_error_at_zero() {
        let policy = RetryPolicy::default();
        assert!(!policy.should_retry(&permanent_error(), 0));
    }

    #[test]
    fn test_should_retry_true_for_transient_within_budget() {
        let policy = RetryPolicy::default();
        assert!(policy.should_retry(&transient_error(), 0));
        assert!(policy.should_retry(&transient_error(), policy.max_attempts - 1));
    }

    #[test]
    fn test_should_retry_honors_message_match_without_flag() {
        let policy = RetryPolicy::default();
        let err = GatewayError::Http {
            status: None,
            message: "upstream rate limit hit".into(),
            retryable: false,
        };
        assert!(policy.should_retry(&err, 0));
    }

    #[test]
    fn test_delay_bounds_per_attempt() {
        let policy = RetryPolicy::default();
        for attempt in 0..6 {
            let floor = policy.base_delay * 2u32.pow(attempt);
            for _ in 0..16 {
                let delay = policy.delay_for(attempt);
                assert!(delay >= floor.min(policy.max_delay) || delay == policy.max_delay);
                assert!(delay <= (floor + policy.jitter).min(policy.max_delay));
            }
        }
    }

    #[test]
    fn test_delay_never_exceeds_cap() {
        let policy = RetryPolicy::default();
        for attempt in [0, 5, 10, 20, 31, 40] {
            assert!(policy.delay_for(attempt) <= policy.max_delay);
        }
    }

    #[test]
    fn test_expected_delay_non_decreasing() {
        let policy = RetryPolicy {
            jitter: Duration::ZERO,
            ..RetryPolicy::default()
        };
        let mut previous = Duration::ZERO;
        for attempt in 0..10 {
            let delay = policy.delay_for(attempt);
            assert!(delay >= previous);
            previous = delay;
        }
    }
}
