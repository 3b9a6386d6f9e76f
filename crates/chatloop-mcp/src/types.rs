//! JSON-RPC wire types and response classification.
//!
//! The classification helpers are pure functions so the failure mapping
//! (protocol error vs. tool-reported error vs. malformed payload) is
//! testable without a server.

use chatloop::{ToolDescriptor, ToolError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outbound JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest {
    /// Always `"2.0"`.
    pub jsonrpc: &'static str,
    /// Monotonically increasing, scoped to the client instance.
    pub id: u64,
    /// `"tools/call"` or `"tools/list"`.
    pub method: &'static str,
    /// Method parameters.
    pub params: Value,
}

impl RpcRequest {
    /// Builds a request with the protocol version pinned.
    pub fn new(id: u64, method: &'static str, params: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method,
            params,
        }
    }
}

/// Inbound JSON-RPC 2.0 response: exactly one of `result` / `error`.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    /// Success payload.
    pub result: Option<Value>,
    /// Protocol-level failure.
    pub error: Option<RpcError>,
}

/// The `error` member of a failed response.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    /// Protocol-defined error code.
    #[serde(default)]
    pub code: i64,
    /// Error description.
    #[serde(default)]
    pub message: String,
}

/// The `result` payload of a `tools/call` response.
#[derive(Debug, Clone, Deserialize)]
pub struct CallResult {
    /// Ordered content elements.
    #[serde(default)]
    pub content: Vec<ContentPart>,
    /// Whether the tool ran but reported failure.
    #[serde(default, rename = "isError")]
    pub is_error: bool,
}

/// One content element of a call result.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentPart {
    /// Content kind, `"text"` for everything this client consumes.
    #[serde(default, rename = "type")]
    pub kind: String,
    /// Text payload, present for text parts.
    #[serde(default)]
    pub text: Option<String>,
}

/// The `result` payload of a `tools/list` response.
#[derive(Debug, Clone, Deserialize)]
pub struct ListResult {
    /// The advertised tools.
    #[serde(default)]
    pub tools: Vec<WireTool>,
}

/// A tool as advertised on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct WireTool {
    /// Tool name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: Option<String>,
    /// JSON Schema for the tool's arguments.
    #[serde(default, rename = "inputSchema")]
    pub input_schema: Value,
}

impl From<WireTool> for ToolDescriptor {
    fn from(tool: WireTool) -> Self {
        Self {
            name: tool.name,
            description: tool.description.unwrap_or_default(),
            input_schema: tool.input_schema,
        }
    }
}

/// Splits a decoded response into its success payload, mapping the
/// `error` member to [`ToolError::Protocol`] and a missing `result` to
/// [`ToolError::MalformedResponse`].
pub fn unwrap_result(response: RpcResponse) -> Result<Value, ToolError> {
    if let Some(error) = response.error {
        return Err(ToolError::Protocol {
            code: error.code,
            message: error.message,
        });
    }
    response.result.ok_or_else(|| {
        ToolError::MalformedResponse("response carried neither result nor error".into())
    })
}

/// Extracts the first text content element of a call result.
///
/// A result flagged `isError` becomes [`ToolError::Execution`] carrying
/// the tool's own message, which the correction loop feeds back to the
/// LLM. A success result with no text part is malformed.
pub fn first_text(result: CallResult) -> Result<String, ToolError> {
    let text = result
        .content
        .iter()
        .find_map(|part| part.text.clone());

    if result.is_error {
        return Err(ToolError::Execution(
            text.unwrap_or_else(|| "tool reported an error without a message".into()),
        ));
    }
    text.ok_or_else(|| {
        ToolError::MalformedResponse("success result is missing its text content".into())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serializes_protocol_fields() {
        let request = RpcRequest::new(7, "tools/call", json!({"name": "getSegment"}));
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["id"], 7);
        assert_eq!(value["method"], "tools/call");
        assert_eq!(value["params"]["name"], "getSegment");
    }

    #[test]
    fn test_unwrap_result_maps_error_member_to_protocol() {
        let response: RpcResponse = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": -32601, "message": "method not found"}
        }))
        .unwrap();
        let err = unwrap_result(response).unwrap_err();
        assert!(matches!(err, ToolError::Protocol { code: -32601, .. }));
    }

    #[test]
    fn test_unwrap_result_requires_result_or_error() {
        let response: RpcResponse =
            serde_json::from_value(json!({"jsonrpc": "2.0", "id": 1})).unwrap();
        assert!(matches!(
            unwrap_result(response).unwrap_err(),
            ToolError::MalformedResponse(_)
        ));
    }

    #[test]
    fn test_first_text_returns_leading_text_part() {
        let result: CallResult = serde_json::from_value(json!({
            "content": [{"type": "text", "text": "1532 users"}],
            "isError": false
        }))
        .unwrap();
        assert_eq!(first_text(result).unwrap(), "1532 users");
    }

    #[test]
    fn test_first_text_maps_is_error_to_execution_failure() {
        let result: CallResult = serde_json::from_value(json!({
            "content": [{"type": "text", "text": "unknown operator IN"}],
            "isError": true
        }))
        .unwrap();
        let err = first_text(result).unwrap_err();
        assert!(matches!(err, ToolError::Execution(msg) if msg == "unknown operator IN"));
    }

    #[test]
    fn test_first_text_rejects_missing_content() {
        let result: CallResult = serde_json::from_value(json!({"content": []})).unwrap();
        assert!(matches!(
            first_text(result).unwrap_err(),
            ToolError::MalformedResponse(_)
        ));
    }

    #[test]
    fn test_wire_tool_converts_to_descriptor() {
        let tool: WireTool = serde_json::from_value(json!({
            "name": "getSegment",
            "description": "Fetch a segment",
            "inputSchema": {"type": "object"}
        }))
        .unwrap();
        let descriptor: ToolDescriptor = tool.into();
        assert_eq!(descriptor.name, "getSegment");
        assert_eq!(descriptor.description, "Fetch a segment");
        assert_eq!(descriptor.input_schema, json!({"type": "object"}));
    }

    #[test]
    fn test_wire_tool_without_description() {
        let tool: WireTool = serde_json::from_value(json!({"name": "ping"})).unwrap();
        let descriptor: ToolDescriptor = tool.into();
        assert!(descriptor.description.is_empty());
    }
}
