pub mod client;
pub mod types;

pub use client::{CompletionClient, OpenAIClient};
pub use types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, Role};
