//! Baidu Wenxin workshop (ERNIE) chat bot.
//!
//! Every turn exchanges the API key / secret key pair for a fresh OAuth access
//! token, then posts the conversation to the chat endpoint with the token as a
//! query parameter:
//!
//! ```text
//! POST {api_base}/oauth/2.0/token?grant_type=client_credentials&client_id=..&client_secret=..
//! POST {api_base}/rpc/2.0/ai_custom/v1/wenxinworkshop/chat/{model}?access_token=..
//!      {"messages": [...], "stream": false}
//! ```
//!
//! Tokens are not cached and nothing is retried.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use tracing::{debug, error, info, warn};

use wenxinbot_core::config::BaiduConfig;
use wenxinbot_core::utils::{mask_secret, truncate_string};
use wenxinbot_core::{ChatHistory, Message};

use crate::error::{BaiduError, Result};
use crate::traits::Bot;
use crate::wire::{ChatRequest, ChatResponse, TokenResponse};

/// Production API host.
pub const DEFAULT_API_BASE: &str = "https://aip.baidubce.com";

/// Text returned by [`Bot::ask`] when no access token could be obtained.
pub const TOKEN_FAILURE_TEXT: &str = "获取百度Token失败";

const TOKEN_PATH: &str = "/oauth/2.0/token";
const CHAT_PATH: &str = "/rpc/2.0/ai_custom/v1/wenxinworkshop/chat";

/// Tracing target for passthrough of streamed response lines.
pub const STREAM_TARGET: &str = "wenxinbot::stream";

/// Longest error body kept in logs and errors.
const MAX_ERROR_BODY: usize = 500;

// ─────────────────────────────────────────────
// BaiduBot
// ─────────────────────────────────────────────

/// Chat bot backed by the Baidu Wenxin workshop API.
pub struct BaiduBot {
    /// HTTP client (connection-pooled, proxy and timeout applied).
    client: reqwest::Client,
    api_key: String,
    secret_key: String,
    /// API host without trailing slash.
    api_base: String,
    /// Chat endpoint name, e.g. `eb-instant`.
    model: String,
    proxy: Option<String>,
    history: ChatHistory,
}

impl std::fmt::Debug for BaiduBot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaiduBot")
            .field("api_key", &mask_secret(&self.api_key))
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("proxy", &self.proxy)
            .field("turns", &self.history.len())
            .finish()
    }
}

impl BaiduBot {
    /// Create a bot with default endpoint settings.
    pub fn new(api_key: impl Into<String>, secret_key: impl Into<String>) -> Result<Self> {
        Self::from_config(&BaiduConfig {
            api_key: api_key.into(),
            secret_key: secret_key.into(),
            ..Default::default()
        })
    }

    /// Create a bot from the `baidu` config section.
    ///
    /// Requires both credentials. When `proxy` is set every request goes
    /// through it; otherwise the usual `HTTP(S)_PROXY` env vars apply.
    pub fn from_config(config: &BaiduConfig) -> Result<Self> {
        if !config.is_configured() {
            return Err(BaiduError::MissingCredentials);
        }

        let proxy = config.proxy.clone().filter(|p| !p.is_empty());

        let mut builder = reqwest::Client::builder();
        if config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        }
        if let Some(ref url) = proxy {
            builder = builder.proxy(reqwest::Proxy::all(url).map_err(BaiduError::Client)?);
        }
        let client = builder.build().map_err(BaiduError::Client)?;

        let api_base = config
            .api_base
            .as_deref()
            .filter(|b| !b.is_empty())
            .unwrap_or(DEFAULT_API_BASE)
            .trim_end_matches('/')
            .to_string();

        let history = match config.max_history {
            Some(n) => ChatHistory::with_max_turns(n),
            None => ChatHistory::new(),
        };

        debug!(
            api_base = %api_base,
            model = %config.model,
            proxy = proxy.as_deref().unwrap_or("none"),
            "Creating Baidu bot"
        );

        Ok(BaiduBot {
            client,
            api_key: config.api_key.clone(),
            secret_key: config.secret_key.clone(),
            api_base,
            model: config.model.clone(),
            proxy,
            history,
        })
    }

    fn token_url(&self) -> String {
        format!("{}{}", self.api_base, TOKEN_PATH)
    }

    fn chat_url(&self) -> String {
        format!("{}{}/{}", self.api_base, CHAT_PATH, self.model)
    }

    // ── Access token ──

    /// Exchange the credentials for a token response.
    ///
    /// Baidu answers bad credentials with a JSON error body (and a 4xx status),
    /// so the body is decoded regardless of status.
    pub async fn fetch_token(&self) -> Result<TokenResponse> {
        let response = self
            .client
            .post(self.token_url())
            .query(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.api_key.as_str()),
                ("client_secret", self.secret_key.as_str()),
            ])
            .send()
            .await
            .map_err(BaiduError::TokenRequest)?;

        let status = response.status();
        let body = response.text().await.map_err(BaiduError::TokenRequest)?;

        serde_json::from_str(&body).map_err(|_| BaiduError::TokenDecode {
            status,
            body: truncate_string(&body, MAX_ERROR_BODY),
        })
    }

    /// A fresh access token, or why none could be obtained.
    pub async fn access_token(&self) -> Result<String> {
        let token = self.fetch_token().await?;
        if let Some(expires_in) = token.expires_in {
            debug!(expires_in, "Obtained Baidu access token");
        }
        token.into_token()
    }

    /// A fresh access token as plain text.
    ///
    /// Returns the literal `"None"` when the provider sent no token or the
    /// request failed. Prefer [`BaiduBot::access_token`] to see why.
    pub async fn get_access_token(&self) -> String {
        match self.fetch_token().await {
            Ok(resp) => resp.access_token.unwrap_or_else(|| "None".to_string()),
            Err(e) => {
                warn!(error = %e, "Baidu token request failed");
                "None".to_string()
            }
        }
    }

    // ── Chat ──

    /// Post `messages` to the chat endpoint.
    ///
    /// With `stream == false` the reply text (`result`) is returned. With
    /// `stream == true` each response line is passed through to the
    /// `wenxinbot::stream` log target and an empty string is returned; lines
    /// are not assembled into a reply.
    pub async fn ask_baidu_msg(&self, messages: &[Message], stream: bool) -> Result<String> {
        let token = self.access_token().await?;

        debug!(
            model = %self.model,
            messages = messages.len(),
            stream,
            "Calling Baidu chat"
        );

        let response = self
            .client
            .post(self.chat_url())
            .query(&[("access_token", token.as_str())])
            .json(&ChatRequest { messages, stream })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(status = %status, body = %body, "Baidu chat API error");
            return Err(BaiduError::Status {
                status,
                body: truncate_string(&body, MAX_ERROR_BODY),
            });
        }

        if stream {
            let lines = pass_through_lines(response).await?;
            debug!(lines, "Baidu stream finished");
            return Ok(String::new());
        }

        let body = response.text().await?;
        let chat: ChatResponse = serde_json::from_str(&body)?;
        debug!(
            id = chat.id.as_deref().unwrap_or("?"),
            total_tokens = chat.usage.as_ref().map_or(0, |u| u.total_tokens),
            "Baidu chat response received"
        );
        chat.into_result()
    }

    /// Send `query` after the current history and record the turn on success.
    ///
    /// History is untouched when the call fails.
    pub async fn try_ask(&mut self, query: &str) -> Result<String> {
        let messages = self.outgoing_messages(query);
        let reply = self.ask_baidu_msg(&messages, false).await?;
        self.history.add_message(query, reply.clone());
        Ok(reply)
    }

    /// Streaming counterpart of [`BaiduBot::try_ask`].
    ///
    /// Records the turn with an empty reply, since streamed lines are only
    /// passed through.
    pub async fn try_ask_stream(&mut self, query: &str) -> Result<()> {
        let messages = self.outgoing_messages(query);
        let reply = self.ask_baidu_msg(&messages, true).await?;
        self.history.add_message(query, reply);
        Ok(())
    }

    fn outgoing_messages(&self, query: &str) -> Vec<Message> {
        let mut messages = self.history.get_messages();
        messages.push(Message::user(query));
        messages
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }
}

#[async_trait]
impl Bot for BaiduBot {
    fn name(&self) -> &str {
        "百度"
    }

    async fn ask(&mut self, query: &str) -> String {
        match self.try_ask(query).await {
            Ok(reply) => {
                debug!(chars = reply.chars().count(), "Baidu reply");
                reply
            }
            Err(e) if e.is_token_failure() => {
                error!(error = %e, "get baidu access token failed");
                TOKEN_FAILURE_TEXT.to_string()
            }
            Err(e) => {
                error!(error = %e, "Baidu ask failed");
                String::new()
            }
        }
    }

    async fn ask_stream(&mut self, query: &str) -> Option<String> {
        match self.try_ask_stream(query).await {
            Ok(()) => Some(String::new()),
            Err(e) => {
                error!(error = %e, "Baidu streaming ask failed");
                None
            }
        }
    }

    fn history(&self) -> &ChatHistory {
        &self.history
    }

    fn history_mut(&mut self) -> &mut ChatHistory {
        &mut self.history
    }
}

// ─────────────────────────────────────────────
// Streaming passthrough
// ─────────────────────────────────────────────

/// Emit every line of the body to the stream log target. Returns the line count.
async fn pass_through_lines(response: reqwest::Response) -> Result<usize> {
    let mut body = response.bytes_stream();
    let mut buffer: Vec<u8> = Vec::new();
    let mut count = 0;

    while let Some(chunk) = body.next().await {
        buffer.extend_from_slice(&chunk?);
        while let Some(pos) = buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = buffer.drain(..=pos).collect();
            emit_line(&line);
            count += 1;
        }
    }

    if !buffer.is_empty() {
        emit_line(&buffer);
        count += 1;
    }

    Ok(count)
}

fn emit_line(raw: &[u8]) {
    let text = String::from_utf8_lossy(raw);
    let line = text.trim_end_matches(['\r', '\n']);
    info!(target: STREAM_TARGET, "{}", line);
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
