//! Configuration schema.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! We use `#[serde(rename_all = "camelCase")]` to handle the conversion.

use serde::{Deserialize, Serialize};

/// Default Wenxin workshop chat endpoint name.
pub const DEFAULT_MODEL: &str = "eb-instant";

/// Default HTTP timeout for provider calls, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.wenxinbot/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub baidu: BaiduConfig,
}

// ─────────────────────────────────────────────
// Baidu
// ─────────────────────────────────────────────

/// Credentials and transport settings for the Baidu Wenxin API.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BaiduConfig {
    /// API key (`client_id` of the OAuth exchange).
    #[serde(alias = "baiduApikey")]
    pub api_key: String,
    /// Secret key (`client_secret` of the OAuth exchange).
    #[serde(alias = "baiduSecret")]
    pub secret_key: String,
    /// Forward proxy for every HTTP call (e.g. `http://127.0.0.1:7890`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    /// Override for `https://aip.baidubce.com`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Chat endpoint name under `wenxinworkshop/chat/`.
    pub model: String,
    /// Request timeout in seconds. `0` disables the timeout.
    pub timeout_secs: u64,
    /// Keep only the first turn plus this many recent turns. Unbounded if unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_history: Option<usize>,
}

impl Default for BaiduConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            secret_key: String::new(),
            proxy: None,
            api_base: None,
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_history: None,
        }
    }
}

impl BaiduConfig {
    /// Whether both halves of the credential pair are present.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty() && !self.secret_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = BaiduConfig::default();
        assert_eq!(cfg.model, "eb-instant");
        assert_eq!(cfg.timeout_secs, 120);
        assert!(!cfg.is_configured());
    }

    #[test]
    fn test_legacy_key_aliases() {
        let cfg: BaiduConfig = serde_json::from_str(
            r#"{"baiduApikey": "ak", "baiduSecret": "sk"}"#,
        )
        .unwrap();
        assert_eq!(cfg.api_key, "ak");
        assert_eq!(cfg.secret_key, "sk");
        assert!(cfg.is_configured());
    }

    #[test]
    fn test_half_configured() {
        let cfg = BaiduConfig {
            api_key: "ak".to_string(),
            ..Default::default()
        };
        assert!(!cfg.is_configured());
    }
}
