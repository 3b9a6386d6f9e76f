//! Parsing `TOOL_CALL:` markers out of raw LLM text.
//!
//! The LLM is instructed to request tool invocations with the literal
//! textual form
//!
//! ```text
//! TOOL_CALL:<toolName>:<jsonArguments>
//! ```
//!
//! where `<jsonArguments>` is a single JSON object, optionally preceded
//! by whitespace. Because arguments may nest objects and arrays, the
//! payload boundary is found by brace-depth counting from the first `{`
//! after the marker — a non-greedy regex would cut nested payloads
//! short. A malformed marker is skipped with a warning and never aborts
//! extraction of its siblings.
//!
//! [`extract_tool_calls`] is pure and stateless; [`render_tool_call`]
//! produces the identical textual form for prompts, so the format is
//! documented in one place for both directions.

use serde_json::Value;
use tracing::warn;

/// The literal prefix the LLM uses to request a tool invocation.
pub const TOOL_CALL_MARKER: &str = "TOOL_CALL:";

/// A structured tool invocation parsed from LLM output.
///
/// Transient: constructed by the extractor, consumed by the executor,
/// never persisted. `name` matches `\w+`; `arguments` is always a
/// syntactically valid JSON object.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    /// The tool to call.
    pub name: String,
    /// JSON arguments for the call.
    pub arguments: Value,
}

/// Renders an invocation back into the `TOOL_CALL:` textual form.
pub fn render_tool_call(invocation: &ToolInvocation) -> String {
    format!(
        "{TOOL_CALL_MARKER}{}:{}",
        invocation.name, invocation.arguments
    )
}

/// Extracts every well-formed tool invocation from `text`, in marker
/// order.
///
/// A marker is skipped (logged, not fatal) when its name is empty, no
/// `{` follows the second colon modulo whitespace, the brace depth
/// never returns to zero, or the payload fails JSON parsing.
pub fn extract_tool_calls(text: &str) -> Vec<ToolInvocation> {
    let mut invocations = Vec::new();
    let mut cursor = 0;

    while let Some(found) = text[cursor..].find(TOOL_CALL_MARKER) {
        let name_start = cursor + found + TOOL_CALL_MARKER.len();
        // Resume after the marker prefix when this marker is skipped.
        cursor = name_start;

        let rest = &text[name_start..];
        let name_len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        if name_len == 0 || !rest[name_len..].starts_with(':') {
            warn!("tool-call marker without a valid name, skipping");
            continue;
        }
        let name = &rest[..name_len];

        let after_colon = &rest[name_len + 1..];
        let leading_ws = after_colon.len() - after_colon.trim_start().len();
        let payload_region = &after_colon[leading_ws..];
        if !payload_region.starts_with('{') {
            warn!(tool = name, "tool-call marker not followed by a JSON object, skipping");
            continue;
        }

        let Some(payload_len) = balanced_object_len(payload_region) else {
            warn!(tool = name, "unterminated JSON payload in tool-call marker, skipping");
            continue;
        };

        let payload = &payload_region[..payload_len];
        // Whether or not the payload parses, scanning resumes after it.
        cursor = name_start + name_len + 1 + leading_ws + payload_len;

        match serde_json::from_str::<Value>(payload) {
            Ok(arguments) => invocations.push(ToolInvocation {
                name: name.to_string(),
                arguments,
            }),
            Err(error) => {
                warn!(tool = name, %error, "tool-call payload is not valid JSON, skipping");
            }
        }
    }

    invocations
}

/// Length of the balanced JSON object at the start of `s`, found by
/// brace-depth counting. `None` when the depth never returns to zero.
fn balanced_object_len(s: &str) -> Option<usize> {
    debug_assert!(s.starts_with('{'));
    let mut depth = 0usize;
    for (i, byte) in s.bytes().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}
