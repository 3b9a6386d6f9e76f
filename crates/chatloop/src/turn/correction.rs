//! The tool-execution recovery loop.
//!
//! Executes a batch of tool invocations and, when one fails, feeds the
//! error back to the LLM asking it to correct its own arguments, bounded
//! by an explicit attempt ceiling. Unbounded recursion on pathological
//! LLM output is a real risk; the counter is a parameter of the loop,
//! never ambient state.
//!
//! The loop moves through four states: executing, correcting, succeeded,
//! failed. Executing goes to succeeded when every invocation returns;
//! to correcting on the first failure while budget remains; to failed
//! when the budget is spent. Correcting goes back to executing when the
//! LLM supplies a parseable corrected call, and to failed when it
//! declines ([`UNABLE_TO_FIX_SENTINEL`]) or breaks the format. Succeeded
//! and failed are terminal.

use tracing::{debug, warn};

use crate::chat::{ChatRole, Message};
use crate::gateway::{Gateway, RetryingGateway};
use crate::tool::{ToolClient, ToolError, ToolInvocation, extract_tool_calls};

use super::prompt::{UNABLE_TO_FIX_SENTINEL, correction_prompt, synthesis_prompt};
use super::{TurnConfig, TurnError};

/// The invocation that ended an execution pass, with its error.
struct FailedInvocation {
    invocation: ToolInvocation,
    error: ToolError,
}

/// Executes `invocations` in order, self-correcting failures through the
/// gateway, and returns the final synthesized answer text.
///
/// On full success the tool results are folded into a synthesis prompt
/// (one `Tool {name}: {result}` line each) and the gateway produces the
/// final natural-language answer. On a failure the LLM is asked for
/// corrected arguments at most `config.max_correction_attempts` times;
/// past that the loop fails with [`TurnError::MaxRetriesExceeded`].
pub async fn execute_with_recovery(
    gateway: &RetryingGateway,
    tools: &dyn ToolClient,
    catalog: &str,
    original_message: &str,
    history: &[Message],
    mut invocations: Vec<ToolInvocation>,
    config: &TurnConfig,
) -> Result<String, TurnError> {
    let mut attempt: u32 = 0;

    loop {
        match run_invocations(tools, &invocations).await {
            Ok(results) => {
                debug!(tools = results.len(), "all tool invocations succeeded");
                let prompt = synthesis_prompt(original_message, &results);
                let mut outbound = history.to_vec();
                outbound.push(Message::transient(ChatRole::User, prompt));
                return Ok(gateway.send(&outbound).await?);
            }
            Err(failed) if attempt >= config.max_correction_attempts => {
                return Err(TurnError::MaxRetriesExceeded {
                    attempts: attempt,
                    last_error: failed.error,
                });
            }
            Err(failed) => {
                warn!(
                    tool = %failed.invocation.name,
                    error = %failed.error,
                    attempt,
                    "tool invocation failed, asking LLM to correct it"
                );
                let prompt = correction_prompt(
                    catalog,
                    original_message,
                    &failed.invocation,
                    &failed.error.to_string(),
                );
                let reply = gateway
                    .send(&[Message::transient(ChatRole::User, prompt)])
                    .await?;

                if reply.contains(UNABLE_TO_FIX_SENTINEL) {
                    return Err(TurnError::CorrectionDeclined {
                        tool: failed.invocation.name,
                    });
                }
                let corrected = extract_tool_calls(&reply);
                if corrected.is_empty() {
                    return Err(TurnError::CorrectionMissing {
                        tool: failed.invocation.name,
                    });
                }

                invocations = corrected;
                attempt += 1;
            }
        }
    }
}

/// Runs every invocation sequentially, in listed order. Stops at the
/// first failure so the failing call can be corrected before its
/// successors run against possibly-wrong context.
async fn run_invocations(
    tools: &dyn ToolClient,
    invocations: &[ToolInvocation],
) -> Result<Vec<(String, String)>, FailedInvocation> {
    let mut results = Vec::with_capacity(invocations.len());
    for invocation in invocations {
        match tools
            .call_tool(&invocation.name, invocation.arguments.clone())
            .await
        {
            Ok(text) => results.push((invocation.name.clone(), text)),
            Err(error) => {
                return Err(FailedInvocation {
                    invocation: invocation.clone(),
                    error,
                });
            }
        }
    }
    Ok(results)
}
