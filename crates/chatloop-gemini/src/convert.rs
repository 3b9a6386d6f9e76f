//! Mapping between core messages and Gemini wire types.

use chatloop::{ChatRole, GatewayError, Message};
use http::StatusCode;

use crate::types::{ApiErrorEnvelope, Content, GenerateContentResponse, Part};

/// Builds the outbound `contents` array from a role-tagged history.
///
/// System entries are filtered out (the API has no system role in
/// history); `Assistant` maps to `"model"`. The final entry must be a
/// user turn, mirroring the gateway contract, since it initiates the
/// exchange.
pub fn build_contents(history: &[Message]) -> Result<Vec<Content>, GatewayError> {
    match history.last() {
        Some(message) if message.role == ChatRole::User => {}
        Some(message) => {
            return Err(GatewayError::InvalidHistory(format!(
                "final history entry must be a user turn, got {}",
                message.role
            )));
        }
        None => return Err(GatewayError::InvalidHistory("history is empty".into())),
    }

    Ok(history
        .iter()
        .filter(|message| message.role != ChatRole::System)
        .map(|message| Content {
            role: match message.role {
                ChatRole::User => "user".into(),
                ChatRole::Assistant => "model".into(),
                ChatRole::System => unreachable!("system entries are filtered"),
            },
            parts: vec![Part {
                text: message.content.clone(),
            }],
        })
        .collect())
}

/// Extracts the generated text from a successful response.
///
/// Joins the text parts of the first candidate. An empty candidate list
/// or a candidate without text is a [`GatewayError::ResponseFormat`].
pub fn response_text(response: GenerateContentResponse) -> Result<String, GatewayError> {
    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .map(|part| part.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.is_empty() {
        return Err(GatewayError::ResponseFormat {
            message: "response carried no generated text".into(),
            raw: String::new(),
        });
    }
    Ok(text)
}

/// Maps a non-2xx response to a [`GatewayError`].
///
/// 429 and 5xx are marked retryable. When the body parses as the API's
/// error envelope the symbolic status becomes the provider code;
/// otherwise the raw body is attached to an HTTP error.
pub fn convert_error(status: StatusCode, body: &str) -> GatewayError {
    let retryable = status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error();

    match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(envelope) => GatewayError::Provider {
            code: if envelope.error.status.is_empty() {
                status.as_u16().to_string()
            } else {
                envelope.error.status
            },
            message: envelope.error.message,
            retryable,
        },
        Err(_) => GatewayError::Http {
            status: Some(status),
            message: body.chars().take(500).collect(),
            retryable,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Candidate;
    use uuid::Uuid;

    fn message(role: ChatRole, text: &str) -> Message {
        Message::new(Uuid::nil(), role, text)
    }

    #[test]
    fn test_build_contents_maps_roles() {
        let history = vec![
            message(ChatRole::User, "hi"),
            message(ChatRole::Assistant, "hello"),
            message(ChatRole::User, "how are you"),
        ];
        let contents = build_contents(&history).unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0].role, "user");
        assert_eq!(contents[1].role, "model");
        assert_eq!(contents[2].role, "user");
    }

    #[test]
    fn test_build_contents_filters_system_entries() {
        let history = vec![
            message(ChatRole::System, "be nice"),
            message(ChatRole::User, "hi"),
        ];
        let contents = build_contents(&history).unwrap();
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0].role, "user");
    }

    #[test]
    fn test_build_contents_rejects_non_user_final_turn() {
        let history = vec![
            message(ChatRole::User, "hi"),
            message(ChatRole::Assistant, "hello"),
        ];
        assert!(matches!(
            build_contents(&history),
            Err(GatewayError::InvalidHistory(_))
        ));
    }

    #[test]
    fn test_build_contents_rejects_empty_history() {
        assert!(matches!(
            build_contents(&[]),
            Err(GatewayError::InvalidHistory(_))
        ));
    }

    #[test]
    fn test_response_text_joins_parts() {
        let response = GenerateContentResponse {
            candidates: vec![Candidate {
                content: Some(Content {
                    role: "model".into(),
                    parts: vec![
                        Part { text: "Hello, ".into() },
                        Part { text: "world".into() },
                    ],
                }),
            }],
        };
        assert_eq!(response_text(response).unwrap(), "Hello, world");
    }

    #[test]
    fn test_response_text_rejects_empty_candidates() {
        let response = GenerateContentResponse { candidates: vec![] };
        assert!(matches!(
            response_text(response),
            Err(GatewayError::ResponseFormat { .. })
        ));
    }

    #[test]
    fn test_convert_error_parses_envelope() {
        let body = r#"{"error": {"code": 429, "message": "quota exceeded", "status": "RESOURCE_EXHAUSTED"}}"#;
        let err = convert_error(StatusCode::TOO_MANY_REQUESTS, body);
        match err {
            GatewayError::Provider {
                code,
                message,
                retryable,
            } => {
                assert_eq!(code, "RESOURCE_EXHAUSTED");
                assert_eq!(message, "quota exceeded");
                assert!(retryable);
            }
            other => panic!("expected Provider, got {other:?}"),
        }
    }

    #[test]
    fn test_convert_error_retryability_by_status() {
        assert!(convert_error(StatusCode::SERVICE_UNAVAILABLE, "busy").is_retryable());
        assert!(convert_error(StatusCode::INTERNAL_SERVER_ERROR, "oops").is_retryable());
        assert!(!convert_error(StatusCode::BAD_REQUEST, "bad").is_retryable());
        assert!(!convert_error(StatusCode::UNAUTHORIZED, "no key").is_retryable());
    }

    #[test]
    fn test_convert_error_non_json_body() {
        let err = convert_error(StatusCode::BAD_GATEWAY, "<html>nginx</html>");
        assert!(matches!(err, GatewayError::Http { status: Some(s), .. } if s == StatusCode::BAD_GATEWAY));
    }
}
