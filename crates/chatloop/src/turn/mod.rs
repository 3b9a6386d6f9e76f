//! One user turn, end to end.
//!
//! A *turn* is one user message and the resulting assistant response,
//! including any intermediate tool calls. The flow:
//!
//! ```text
//!   user text
//!        │
//!   augmented prompt (instructions + tool catalog + user text)
//!        │
//!   LLM gateway ──► reply text
//!        │
//!   extractor: any TOOL_CALL markers?
//!        │ no                         │ yes
//!   reply is the answer         recovery loop: execute tools,
//!                               self-correct failures, synthesize
//! ```
//!
//! Everything here is strictly sequential within a turn; concurrent
//! turns are independent tasks sharing nothing but the store.

mod correction;
mod orchestrator;
pub mod prompt;

pub use correction::execute_with_recovery;
pub use orchestrator::Orchestrator;

use std::time::Duration;

use crate::error::GatewayError;
use crate::tool::ToolError;

/// Per-turn behavior knobs, passed by constructor, never ambient.
#[derive(Debug, Clone)]
pub struct TurnConfig {
    /// How many correction cycles a failing tool call is granted before
    /// the turn fails.
    pub max_correction_attempts: u32,
    /// The static instruction block explaining how and when the LLM may
    /// emit `TOOL_CALL:` markers.
    pub instructions: String,
    /// Retry-after hint attached to degraded user-facing failures.
    pub retry_after: Duration,
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            max_correction_attempts: 2,
            instructions: prompt::TOOL_USAGE_INSTRUCTIONS.to_string(),
            retry_after: Duration::from_secs(30),
        }
    }
}

/// Internal turn failures, one variant per distinguishable kind.
///
/// These never cross the orchestrator boundary raw; see [`TurnFailure`].
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum TurnError {
    /// The LLM gateway failed (after its own retry budget).
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The LLM replied with the unable-to-fix sentinel: it has declared
    /// the tool failure unrecoverable.
    #[error("LLM declined to correct failing tool call '{tool}'")]
    CorrectionDeclined {
        /// The tool whose call could not be corrected.
        tool: String,
    },

    /// The LLM's correction reply contained no parseable tool call.
    #[error("LLM correction for tool '{tool}' contained no tool call")]
    CorrectionMissing {
        /// The tool whose call was being corrected.
        tool: String,
    },

    /// The correction budget was spent and a tool call still fails.
    #[error("tool recovery exhausted after {attempts} correction attempts: {last_error}")]
    MaxRetriesExceeded {
        /// Correction cycles performed.
        attempts: u32,
        /// The failure that ended the loop.
        last_error: ToolError,
    },
}

/// Stable user-facing failure classification produced at the
/// orchestrator boundary.
///
/// Internal errors are translated here so the transport layer can pick
/// behavior per kind (retry suggestion, fallback text, hard failure)
/// without ever seeing a raw internal error.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum TurnFailure {
    /// The referenced chat does not exist.
    #[error("chat {chat_id} not found")]
    ChatNotFound {
        /// The id that failed to resolve.
        chat_id: uuid::Uuid,
    },

    /// The LLM backend stayed unavailable through the retry budget.
    #[error("AI service temporarily unavailable, retry in {} seconds", .retry_after.as_secs())]
    LlmUnavailable {
        /// Suggested wait before the client retries the turn.
        retry_after: Duration,
    },

    /// Tool execution kept failing and self-correction was exhausted or
    /// declined.
    #[error("AI service temporarily unavailable, retry in {} seconds", .retry_after.as_secs())]
    ToolRecoveryFailed {
        /// Suggested wait before the client retries the turn.
        retry_after: Duration,
    },
}
