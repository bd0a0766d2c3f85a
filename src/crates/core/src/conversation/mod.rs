//! Conversation layer
//!
//! Chat turns, history, analytics and backup on top of a pluggable store.

pub mod analytics;
pub mod backup;
pub mod history;
pub mod service;
pub mod store;
pub mod types;

pub use analytics::{EmotionAnalytics, EmotionStat, MostCommonEmotion, RecentTrend};
pub use backup::{backup_file_name, BackupDocument};
pub use history::{ChatHistory, HistoryStats};
pub use service::{ChatRequest, ChatService, ChatTurn, ProfileUpdate};
pub use store::ConversationStore;
pub use types::{
    Conversation, ConversationStatus, ConversationWithMessages, EmotionEvent, NewEmotionEvent,
    Profile, StoredMessage,
};
