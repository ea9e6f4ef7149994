//! Errors raised while talking to the Baidu Wenxin API.

use reqwest::StatusCode;

pub type Result<T> = std::result::Result<T, BaiduError>;

#[derive(Debug, thiserror::Error)]
pub enum BaiduError {
    #[error("Baidu API key and secret key must both be configured")]
    MissingCredentials,

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("access token request failed: {0}")]
    TokenRequest(#[source] reqwest::Error),

    #[error("access token response was not JSON ({status}): {body}")]
    TokenDecode { status: StatusCode, body: String },

    #[error("no access token in response: {reason}")]
    MissingAccessToken { reason: String },

    #[error("chat request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("chat endpoint returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Baidu API error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("chat response has no `result` field")]
    MissingResult,

    #[error("failed to decode chat response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl BaiduError {
    /// Whether the call failed before a chat request was sent, while
    /// exchanging credentials for an access token.
    pub fn is_token_failure(&self) -> bool {
        matches!(
            self,
            BaiduError::TokenRequest(_)
                | BaiduError::TokenDecode { .. }
                | BaiduError::MissingAccessToken { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_failure_classification() {
        let missing = BaiduError::MissingAccessToken {
            reason: "invalid_client".to_string(),
        };
        assert!(missing.is_token_failure());

        let decode = BaiduError::TokenDecode {
            status: StatusCode::BAD_GATEWAY,
            body: "<html>".to_string(),
        };
        assert!(decode.is_token_failure());

        assert!(!BaiduError::MissingResult.is_token_failure());
        assert!(!BaiduError::MissingCredentials.is_token_failure());
        let api = BaiduError::Api {
            code: 110,
            message: "Access token invalid".to_string(),
        };
        assert!(!api.is_token_failure());
    }

    #[test]
    fn test_display() {
        let err = BaiduError::Api {
            code: 18,
            message: "Open api qps request limit reached".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Baidu API error 18: Open api qps request limit reached"
        );
    }
}
