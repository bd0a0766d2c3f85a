//! Storage backends for the conversation store port.

pub mod memory;

pub use memory::MemoryConversationStore;
