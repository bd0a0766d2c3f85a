use super::types::{Conversation, EmotionEvent, NewEmotionEvent, Profile, StoredMessage};
use crate::util::errors::XinyuResult;
use async_trait::async_trait;
use xinyu_ai_adapters::ChatRole;

/// Persistence port for conversations, messages, emotion events and
/// profiles. Row-store backends plug in here; the CLI uses the in-memory
/// implementation.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn create_conversation(&self, user_id: &str, title: &str) -> XinyuResult<Conversation>;

    async fn get_conversation(&self, conversation_id: &str) -> XinyuResult<Option<Conversation>>;

    /// Conversations of `user_id`, most recently updated first.
    async fn list_conversations(&self, user_id: &str) -> XinyuResult<Vec<Conversation>>;

    /// Removes the conversation and its messages. Returns whether a row was
    /// removed.
    async fn delete_conversation(&self, conversation_id: &str) -> XinyuResult<bool>;

    /// Appends a message and bumps the conversation's `updated_at`.
    async fn append_message(
        &self,
        conversation_id: &str,
        role: ChatRole,
        content: &str,
        tokens: Option<u32>,
    ) -> XinyuResult<StoredMessage>;

    /// Up to `limit` most recent messages, newest first.
    async fn recent_messages(
        &self,
        conversation_id: &str,
        limit: usize,
    ) -> XinyuResult<Vec<StoredMessage>>;

    /// Every message of the conversation, oldest first.
    async fn list_messages(&self, conversation_id: &str) -> XinyuResult<Vec<StoredMessage>>;

    async fn record_emotion(&self, event: NewEmotionEvent) -> XinyuResult<EmotionEvent>;

    /// Up to `limit` most recent events of `user_id`, newest first.
    async fn recent_emotions(&self, user_id: &str, limit: usize)
        -> XinyuResult<Vec<EmotionEvent>>;

    /// Every event of `user_id`, oldest first.
    async fn list_emotions(&self, user_id: &str) -> XinyuResult<Vec<EmotionEvent>>;

    async fn get_profile(&self, user_id: &str) -> XinyuResult<Option<Profile>>;

    async fn upsert_profile(&self, profile: Profile) -> XinyuResult<Profile>;
}
