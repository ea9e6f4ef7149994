//! Request and response bodies of the Baidu OAuth and Wenxin workshop endpoints.
//!
//! Every response field is optional: Baidu reports failures in the same JSON
//! shape as successes, with the payload fields missing and error fields set.

use serde::{Deserialize, Serialize};
use wenxinbot_core::Message;

use crate::error::BaiduError;

// ─────────────────────────────────────────────
// OAuth token
// ─────────────────────────────────────────────

/// Body of `POST /oauth/2.0/token`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    /// Lifetime in seconds.
    pub expires_in: Option<u64>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl TokenResponse {
    /// The access token, or `MissingAccessToken` with whatever the provider said.
    pub fn into_token(self) -> Result<String, BaiduError> {
        match self.access_token {
            Some(token) => Ok(token),
            None => {
                let reason = match (self.error, self.error_description) {
                    (Some(e), Some(d)) => format!("{e}: {d}"),
                    (Some(e), None) => e,
                    (None, Some(d)) => d,
                    (None, None) => "access_token field absent".to_string(),
                };
                Err(BaiduError::MissingAccessToken { reason })
            }
        }
    }
}

// ─────────────────────────────────────────────
// Chat
// ─────────────────────────────────────────────

/// Body of `POST .../wenxinworkshop/chat/{model}`.
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub messages: &'a [Message],
    pub stream: bool,
}

/// Non-streamed chat reply.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ChatResponse {
    pub id: Option<String>,
    pub result: Option<String>,
    pub is_end: Option<bool>,
    pub is_truncated: Option<bool>,
    pub usage: Option<Usage>,
    pub error_code: Option<i64>,
    pub error_msg: Option<String>,
}

/// Token usage statistics.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

impl ChatResponse {
    /// Reply text, or the provider error / `MissingResult`.
    pub fn into_result(self) -> Result<String, BaiduError> {
        if let Some(code) = self.error_code {
            return Err(BaiduError::Api {
                code,
                message: self.error_msg.unwrap_or_default(),
            });
        }
        self.result.ok_or(BaiduError::MissingResult)
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_token_present() {
        let resp: TokenResponse =
            serde_json::from_value(json!({"access_token": "T", "expires_in": 2592000})).unwrap();
        assert_eq!(resp.expires_in, Some(2592000));
        assert_eq!(resp.into_token().unwrap(), "T");
    }

    #[test]
    fn test_token_missing_carries_provider_error() {
        let resp: TokenResponse = serde_json::from_value(json!({
            "error": "invalid_client",
            "error_description": "unknown client id"
        }))
        .unwrap();

        match resp.into_token() {
            Err(BaiduError::MissingAccessToken { reason }) => {
                assert_eq!(reason, "invalid_client: unknown client id");
            }
            other => panic!("Expected MissingAccessToken, got {other:?}"),
        }
    }

    #[test]
    fn test_token_missing_without_details() {
        let resp: TokenResponse = serde_json::from_value(json!({})).unwrap();
        assert!(matches!(
            resp.into_token(),
            Err(BaiduError::MissingAccessToken { .. })
        ));
    }

    #[test]
    fn test_chat_request_shape() {
        let messages = vec![Message::user("hi")];
        let body = serde_json::to_value(ChatRequest {
            messages: &messages,
            stream: false,
        })
        .unwrap();

        assert_eq!(
            body,
            json!({"messages": [{"role": "user", "content": "hi"}], "stream": false})
        );
    }

    #[test]
    fn test_chat_response_result() {
        let resp: ChatResponse = serde_json::from_value(json!({
            "id": "as-abc",
            "result": "hello",
            "is_end": true,
            "usage": {"prompt_tokens": 1, "completion_tokens": 2, "total_tokens": 3}
        }))
        .unwrap();

        assert_eq!(resp.usage.as_ref().map(|u| u.total_tokens), Some(3));
        assert_eq!(resp.into_result().unwrap(), "hello");
    }

    #[test]
    fn test_chat_response_api_error() {
        let resp: ChatResponse = serde_json::from_value(json!({
            "error_code": 110,
            "error_msg": "Access token invalid or no longer valid"
        }))
        .unwrap();

        match resp.into_result() {
            Err(BaiduError::Api { code, message }) => {
                assert_eq!(code, 110);
                assert!(message.contains("Access token invalid"));
            }
            other => panic!("Expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_chat_response_missing_result() {
        let resp: ChatResponse = serde_json::from_value(json!({"id": "as-abc"})).unwrap();
        assert!(matches!(resp.into_result(), Err(BaiduError::MissingResult)));
    }
}
