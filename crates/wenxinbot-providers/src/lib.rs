//! Chat bot backends for Wenxinbot.
//!
//! # Architecture
//!
//! - [`traits::Bot`] — trait every chat backend implements
//! - [`baidu::BaiduBot`] — Baidu Wenxin workshop (ERNIE) adapter
//! - [`wire`] — request/response bodies of the Baidu endpoints
//! - [`error::BaiduError`] — typed failures of a Baidu call

pub mod baidu;
pub mod error;
pub mod traits;
pub mod wire;

// Re-export main types for convenience
pub use baidu::{BaiduBot, STREAM_TARGET, TOKEN_FAILURE_TEXT};
pub use error::BaiduError;
pub use traits::Bot;
