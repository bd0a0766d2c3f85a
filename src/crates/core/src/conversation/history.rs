use super::types::ConversationWithMessages;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStats {
    pub total_conversations: usize,
    pub total_messages: usize,
    pub oldest_conversation: Option<DateTime<Utc>>,
    pub newest_conversation: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatHistory {
    /// Most recently updated first.
    pub conversations: Vec<ConversationWithMessages>,
    pub stats: HistoryStats,
}

impl ChatHistory {
    /// `conversations` must already be ordered by `updated_at` descending.
    pub fn new(conversations: Vec<ConversationWithMessages>) -> Self {
        let stats = HistoryStats {
            total_conversations: conversations.len(),
            total_messages: conversations.iter().map(|c| c.messages.len()).sum(),
            oldest_conversation: conversations.last().map(created_at),
            newest_conversation: conversations.first().map(created_at),
        };
        Self {
            conversations,
            stats,
        }
    }
}

fn created_at(entry: &ConversationWithMessages) -> DateTime<Utc> {
    entry.conversation.created_at
}
