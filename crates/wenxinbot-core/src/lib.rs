//! Core building blocks for Wenxinbot.
//!
//! - [`types`] — chat messages in the Wenxin workshop wire format
//! - [`history`] — conversation history owned by a bot
//! - [`config`] — typed config, JSON loading, env var overrides
//! - [`utils`] — data directory paths and string helpers

pub mod config;
pub mod history;
pub mod types;
pub mod utils;

pub use history::{ChatHistory, Turn};
pub use types::{Message, Role};
