//! Wire types for the Gemini `generateContent` API.
//!
//! Only the request and response shapes this gateway actually uses are
//! modeled; unknown response fields are ignored during deserialization.

use serde::{Deserialize, Serialize};

/// Outbound request body.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentRequest {
    /// Conversation turns, alternating `user`/`model`.
    pub contents: Vec<Content>,
}

/// One conversation turn on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// `"user"` or `"model"`.
    #[serde(default)]
    pub role: String,
    /// Ordered content parts.
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// A single content part. Only text parts are modeled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    /// The text payload.
    #[serde(default)]
    pub text: String,
}

/// Successful response body.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    /// Generated candidates; the first is the answer.
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

/// One generated candidate.
#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    /// The generated turn.
    pub content: Option<Content>,
}

/// Error response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorEnvelope {
    /// The error payload.
    pub error: ApiError,
}

/// The error payload inside a non-2xx response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    /// Numeric code (mirrors the HTTP status).
    #[serde(default)]
    pub code: i64,
    /// Human-readable description.
    #[serde(default)]
    pub message: String,
    /// Symbolic status (e.g. `"RESOURCE_EXHAUSTED"`).
    #[serde(default)]
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_expected_shape() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".into(),
                parts: vec![Part { text: "hi".into() }],
            }],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hi");
    }

    #[test]
    fn test_response_ignores_unknown_fields() {
        let body = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "hello"}]},
                "finishReason": "STOP",
                "safetyRatings": []
            }],
            "usageMetadata": {"totalTokenCount": 7}
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.candidates.len(), 1);
        let content = response.candidates[0].content.as_ref().unwrap();
        assert_eq!(content.parts[0].text, "hello");
    }

    #[test]
    fn test_error_envelope_parses() {
        let body = r#"{"error": {"code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED"}}"#;
        let envelope: ApiErrorEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.error.code, 429);
        assert_eq!(envelope.error.status, "RESOURCE_EXHAUSTED");
    }
}
