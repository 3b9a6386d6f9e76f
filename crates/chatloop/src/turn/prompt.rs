//! Prompt assembly for turns, tool-result synthesis, and correction.
//!
//! The `TOOL_CALL:` textual format is part of the contract with the LLM:
//! what these prompts tell the model to produce is exactly what the
//! extractor parses. Both directions point at
//! [`TOOL_CALL_MARKER`](crate::tool::TOOL_CALL_MARKER).

use crate::tool::{ToolInvocation, render_tool_call};

/// Static instruction block given to the LLM on every augmented turn.
pub const TOOL_USAGE_INSTRUCTIONS: &str = "\
You are a helpful assistant with access to the external tools listed below.

When a tool is needed to answer, reply with a line of the exact form:

TOOL_CALL:<toolName>:<jsonArguments>

where <jsonArguments> is a single JSON object matching the tool's input \
schema. You may emit several TOOL_CALL lines if several tools are needed. \
When no tool is needed, answer the question directly and do not emit any \
TOOL_CALL line.";

/// Catalog placeholder used when the tool listing cannot be fetched.
pub const TOOLS_UNAVAILABLE_PLACEHOLDER: &str =
    "(tool catalog currently unavailable — answer directly without tools)";

/// Literal sentinel by which the LLM declares a tool failure
/// unrecoverable during correction.
pub const UNABLE_TO_FIX_SENTINEL: &str = "ERROR_UNABLE_TO_FIX";

/// Builds the augmented prompt for a user turn: instructions, the tool
/// catalog section, and the literal user text.
pub fn augmented_prompt(instructions: &str, catalog: &str, user_text: &str) -> String {
    format!("{instructions}\n\nAvailable tools:\n{catalog}\nUser message:\n{user_text}")
}

/// Builds the synthesis prompt that turns tool results into a final
/// natural-language answer. One `Tool {name}: {result}` line per result.
pub fn synthesis_prompt(original_message: &str, results: &[(String, String)]) -> String {
    let mut out = String::from("The user asked:\n");
    out.push_str(original_message);
    out.push_str("\n\nThe following tools were executed:\n");
    for (name, text) in results {
        out.push_str("Tool ");
        out.push_str(name);
        out.push_str(": ");
        out.push_str(text);
        out.push('\n');
    }
    out.push_str("\nUsing the tool results above, answer the user's question in natural language.");
    out
}

/// Builds the correction prompt for a failing tool call: catalog, the
/// original user message, the failing call in `TOOL_CALL:` form, and the
/// raw error, plus instructions to reply with a corrected call or the
/// unable-to-fix sentinel.
pub fn correction_prompt(
    catalog: &str,
    original_message: &str,
    failing: &ToolInvocation,
    error: &str,
) -> String {
    format!(
        "A tool call you produced has failed.\n\n\
         Available tools:\n{catalog}\n\
         The user asked:\n{original_message}\n\n\
         Failing call:\n{call}\n\n\
         Error:\n{error}\n\n\
         Reply with a corrected call in the exact same format:\n\
         TOOL_CALL:<toolName>:<jsonArguments>\n\
         If the error cannot be fixed by changing the arguments, reply with \
         exactly {UNABLE_TO_FIX_SENTINEL} and nothing else.",
        call = render_tool_call(failing),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_instructions_document_the_marker_format() {
        assert!(TOOL_USAGE_INSTRUCTIONS.contains("TOOL_CALL:<toolName>:<jsonArguments>"));
    }

    #[test]
    fn test_augmented_prompt_contains_all_sections() {
        let prompt = augmented_prompt(TOOL_USAGE_INSTRUCTIONS, "- getSegment: ...", "What is 2+2");
        assert!(prompt.contains("TOOL_CALL:"));
        assert!(prompt.contains("- getSegment"));
        assert!(prompt.contains("What is 2+2"));
    }

    #[test]
    fn test_synthesis_prompt_embeds_tool_lines() {
        let results = vec![("getSegment".to_string(), "1532 users".to_string())];
        let prompt = synthesis_prompt("how many men?", &results);
        assert!(prompt.contains("Tool getSegment: 1532 users"));
        assert!(prompt.contains("how many men?"));
    }

    #[test]
    fn test_correction_prompt_embeds_failure_details() {
        let failing = ToolInvocation {
            name: "getSegment".into(),
            arguments: json!({"filter": "gender IN male"}),
        };
        let prompt = correction_prompt(
            "- getSegment: fetch a segment",
            "how many men?",
            &failing,
            "unknown operator IN",
        );
        assert!(prompt.contains(r#"TOOL_CALL:getSegment:{"filter":"gender IN male"}"#));
        assert!(prompt.contains("unknown operator IN"));
        assert!(prompt.contains(UNABLE_TO_FIX_SENTINEL));
        assert!(prompt.contains("how many men?"));
    }
}
