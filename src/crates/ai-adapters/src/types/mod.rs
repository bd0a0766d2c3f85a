pub mod message;
pub mod openai;

pub use message::*;
pub use openai::{ChatCompletionRequest, ChatCompletionResponse, CompletionUsage};
