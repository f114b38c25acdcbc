pub mod briefing;
pub mod client;
pub mod error;
pub(crate) mod retry;
pub mod summarize;
pub mod types;

pub use briefing::compose_briefing;
pub use client::OpenAiClient;
pub use error::LlmError;
pub use summarize::summarize_report;
pub use types::{ChatRequest, Message};
