//! Remote tool invocation: the client contract and the text extractor.
//!
//! This module defines the [`ToolClient`] trait — a minimal contract for
//! remote tool sources — plus the taxonomy of tool failures and the
//! catalog rendering used in prompts. The concrete JSON-RPC HTTP client
//! lives in the `chatloop-mcp` crate; keeping the trait here means the
//! orchestration core never depends on a wire protocol and tests can
//! substitute a scripted double.
//!
//! Submodule [`extract`] parses `TOOL_CALL:` markers out of raw LLM text.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod extract;

pub use extract::{TOOL_CALL_MARKER, ToolInvocation, extract_tool_calls, render_tool_call};

/// How a remote tool invocation failed.
///
/// Each variant is distinguishable so the correction loop and the
/// orchestrator boundary can choose behavior per kind instead of
/// pattern-matching strings.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum ToolError {
    /// The HTTP exchange itself failed: non-2xx status, timeout, or
    /// connection error. `status` is `None` when no response arrived.
    #[error("tool transport error (status={status:?}): {message}")]
    Transport {
        /// The HTTP status code, if one was received.
        status: Option<http::StatusCode>,
        /// A human-readable description of the failure.
        message: String,
    },

    /// The remote response carried a protocol-level error member.
    #[error("tool protocol error ({code}): {message}")]
    Protocol {
        /// Protocol-defined error code.
        code: i64,
        /// Error description from the server.
        message: String,
    },

    /// The tool ran and reported failure through its result payload.
    /// The message is what the correction loop feeds back to the LLM.
    #[error("tool execution failed: {0}")]
    Execution(String),

    /// The success result was missing its content payload.
    #[error("malformed tool response: {0}")]
    MalformedResponse(String),
}

/// A catalog entry describing one remotely callable tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// The tool's name, referenced by `TOOL_CALL:` markers.
    pub name: String,
    /// Human-readable description shown to the LLM.
    pub description: String,
    /// JSON Schema describing the tool's expected arguments.
    pub input_schema: Value,
}

/// Minimal contract for a remote tool source.
///
/// Two operations: list the available tools (with their schemas) and
/// call one by name with JSON arguments. Implementations must be
/// `Send + Sync`; the trait is object-safe so different backends can
/// stand behind the same `Arc<dyn ToolClient>`.
pub trait ToolClient: Send + Sync {
    /// Lists all tools available from the remote endpoint.
    fn list_tools(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ToolDescriptor>, ToolError>> + Send + '_>>;

    /// Calls a tool and returns the first text content element of a
    /// successful result.
    fn call_tool<'a>(
        &'a self,
        name: &'a str,
        arguments: Value,
    ) -> Pin<Box<dyn Future<Output = Result<String, ToolError>> + Send + 'a>>;
}

/// Renders the tool catalog as the prompt section given to the LLM.
///
/// One block per tool: name, description, and the input schema as
/// compact JSON, so the LLM knows what it may call and with what shape.
pub fn render_catalog(tools: &[ToolDescriptor]) -> String {
    let mut out = String::new();
    for tool in tools {
        out.push_str("- ");
        out.push_str(&tool.name);
        out.push_str(": ");
        out.push_str(&tool.description);
        out.push_str("\n  input schema: ");
        out.push_str(&tool.input_schema.to_string());
        out.push('\n');
    }
    out
}
