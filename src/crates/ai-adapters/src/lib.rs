//! Chat completion adapters
//!
//! One HTTP call to an OpenAI-compatible `chat/completions` endpoint per
//! [`ChatCompletionProvider::complete`], with every failure folded into a
//! [`ProviderFailure`] instead of an error that escapes the caller.

pub mod candidate;
pub mod client;
pub mod failure;
pub mod secret;
pub mod types;

pub use candidate::Candidate;
pub use client::{ChatCompletionProvider, CompletionOptions, HttpChatProvider};
pub use failure::{FailureKind, ProviderFailure};
pub use secret::SecretString;
pub use types::message::{ChatMessage, ChatRole};
