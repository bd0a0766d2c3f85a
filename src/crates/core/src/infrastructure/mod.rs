//! Infrastructure layer
//!
//! Configuration loading and conversation persistence.

pub mod config;
pub mod storage;

pub use config::{AppConfig, ProviderConfig};
pub use storage::MemoryConversationStore;
