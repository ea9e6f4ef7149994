//! Bot trait — the seam between a conversation front-end and a chat backend.

use async_trait::async_trait;
use wenxinbot_core::ChatHistory;

/// A chat backend that owns its conversation history.
///
/// `ask` and `ask_stream` never fail: backends log the underlying error and
/// degrade to an empty (or placeholder) answer. Backends that need to expose
/// the failure offer their own `Result`-returning methods.
#[async_trait]
pub trait Bot: Send {
    /// Display name for logging and UI.
    fn name(&self) -> &str;

    /// Send `query` with the current history and return the reply text.
    async fn ask(&mut self, query: &str) -> String;

    /// Send `query` in streaming mode. `None` means the call failed.
    async fn ask_stream(&mut self, query: &str) -> Option<String>;

    /// Conversation so far.
    fn history(&self) -> &ChatHistory;

    fn history_mut(&mut self) -> &mut ChatHistory;
}
