//! Chat service
//!
//! Glues the orchestrator to the conversation store: one chat turn,
//! history, deletion, analytics and backup export per user.

use super::analytics::{self, EmotionAnalytics, ANALYTICS_WINDOW};
use super::backup::BackupDocument;
use super::history::ChatHistory;
use super::store::ConversationStore;
use super::types::{Conversation, ConversationWithMessages, NewEmotionEvent, Profile};
use crate::companion::FallbackOrchestrator;
use crate::emotion::{EmotionAnalysis, EVENT_PREVIEW_CHARS};
use crate::util::errors::{XinyuError, XinyuResult};
use crate::util::text::truncate_with_ellipsis;
use chrono::Utc;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use xinyu_ai_adapters::{ChatMessage, ChatRole};

/// Fields to change on a user's profile; `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

/// Messages loaded from the store as context for one turn.
pub const HISTORY_FETCH_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            conversation_id: None,
        }
    }

    pub fn in_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurn {
    pub message: String,
    pub conversation_id: String,
    pub emotion_analysis: EmotionAnalysis,
}

pub struct ChatService {
    orchestrator: Arc<FallbackOrchestrator>,
    store: Arc<dyn ConversationStore>,
}

impl ChatService {
    pub fn new(orchestrator: Arc<FallbackOrchestrator>, store: Arc<dyn ConversationStore>) -> Self {
        Self {
            orchestrator,
            store,
        }
    }

    pub fn orchestrator(&self) -> &FallbackOrchestrator {
        &self.orchestrator
    }

    /// Run one chat turn for `user_id`.
    ///
    /// Fails only on an empty message, an unknown (or foreign) conversation,
    /// or a store failure while creating a new conversation. Failures while
    /// persisting messages or the emotion event are logged and swallowed.
    pub async fn handle_message(&self, user_id: &str, request: ChatRequest) -> XinyuResult<ChatTurn> {
        let message = request.message.as_str();
        if message.trim().is_empty() {
            return Err(XinyuError::validation("Message content must not be empty"));
        }

        let history = match request.conversation_id.as_deref() {
            Some(conversation_id) => {
                self.owned_conversation(user_id, conversation_id).await?;
                self.load_history(conversation_id).await?
            }
            None => Vec::new(),
        };
        debug!(
            "Handling chat turn: user_id={}, conversation_id={:?}, history_len={}",
            user_id,
            request.conversation_id,
            history.len()
        );

        let reply = self.orchestrator.respond(message, &history).await;
        let analysis = self.orchestrator.classify(message).await;

        let conversation_id = match request.conversation_id {
            Some(id) => id,
            None => {
                let title = truncate_with_ellipsis(message, EVENT_PREVIEW_CHARS);
                let conversation = self.store.create_conversation(user_id, &title).await?;
                info!(
                    "Conversation created: id={}, user_id={}",
                    conversation.id, user_id
                );
                conversation.id
            }
        };

        self.persist_turn(user_id, &conversation_id, message, &reply, &analysis)
            .await;

        Ok(ChatTurn {
            message: reply,
            conversation_id,
            emotion_analysis: analysis,
        })
    }

    async fn owned_conversation(
        &self,
        user_id: &str,
        conversation_id: &str,
    ) -> XinyuResult<Conversation> {
        self.store
            .get_conversation(conversation_id)
            .await?
            .filter(|conversation| conversation.user_id == user_id)
            .ok_or_else(|| {
                XinyuError::not_found(format!("Conversation not found: {}", conversation_id))
            })
    }

    /// Most recent messages, oldest first.
    async fn load_history(&self, conversation_id: &str) -> XinyuResult<Vec<ChatMessage>> {
        let mut recent = self
            .store
            .recent_messages(conversation_id, HISTORY_FETCH_LIMIT)
            .await?;
        recent.reverse();
        Ok(recent.iter().map(|m| m.to_chat_message()).collect())
    }

    async fn persist_turn(
        &self,
        user_id: &str,
        conversation_id: &str,
        message: &str,
        reply: &str,
        analysis: &EmotionAnalysis,
    ) {
        let entries = [(ChatRole::User, message), (ChatRole::Assistant, reply)];
        for (role, content) in entries {
            let tokens = u32::try_from(content.chars().count()).ok();
            if let Err(e) = self
                .store
                .append_message(conversation_id, role, content, tokens)
                .await
            {
                warn!(
                    "Failed to save {} message: conversation_id={}, error={}",
                    role, conversation_id, e
                );
            }
        }

        let event = NewEmotionEvent {
            user_id: user_id.to_string(),
            conversation_id: Some(conversation_id.to_string()),
            analysis: analysis.clone(),
        };
        if let Err(e) = self.store.record_emotion(event).await {
            warn!(
                "Failed to save emotion event: conversation_id={}, error={}",
                conversation_id, e
            );
        }
    }

    /// Every conversation of `user_id` with its messages, most recently
    /// updated first.
    pub async fn history(&self, user_id: &str) -> XinyuResult<ChatHistory> {
        let conversations = self.store.list_conversations(user_id).await?;
        let entries = self.with_messages(conversations).await?;
        Ok(ChatHistory::new(entries))
    }

    /// Deletes the conversation only when it belongs to `user_id`.
    pub async fn delete_conversation(&self, user_id: &str, conversation_id: &str) -> XinyuResult<()> {
        self.owned_conversation(user_id, conversation_id).await?;
        self.store.delete_conversation(conversation_id).await?;
        info!(
            "Conversation deleted: id={}, user_id={}",
            conversation_id, user_id
        );
        Ok(())
    }

    pub async fn emotion_analytics(&self, user_id: &str) -> XinyuResult<EmotionAnalytics> {
        let events = self.store.recent_emotions(user_id, ANALYTICS_WINDOW).await?;
        Ok(analytics::summarize(&events, Utc::now()))
    }

    /// Create the profile of `user_id` on first use, otherwise merge `update`
    /// into the stored one.
    pub async fn update_profile(&self, user_id: &str, update: ProfileUpdate) -> XinyuResult<Profile> {
        let now = Utc::now();
        let mut profile = match self.store.get_profile(user_id).await? {
            Some(profile) => profile,
            None => Profile {
                id: uuid::Uuid::new_v4().to_string(),
                user_id: user_id.to_string(),
                display_name: None,
                avatar_url: None,
                bio: None,
                created_at: now,
                updated_at: now,
            },
        };
        if let Some(display_name) = update.display_name {
            profile.display_name = Some(display_name);
        }
        if let Some(avatar_url) = update.avatar_url {
            profile.avatar_url = Some(avatar_url);
        }
        if let Some(bio) = update.bio {
            profile.bio = Some(bio);
        }

        let profile = self.store.upsert_profile(profile).await?;
        info!("Profile updated: user_id={}", user_id);
        Ok(profile)
    }

    pub async fn export_backup(&self, user_id: &str) -> XinyuResult<BackupDocument> {
        let profile = self.store.get_profile(user_id).await?;

        let mut conversations = self.store.list_conversations(user_id).await?;
        conversations.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        let conversations = self.with_messages(conversations).await?;

        let emotions = self.store.list_emotions(user_id).await?;

        Ok(BackupDocument::new(
            user_id,
            profile,
            conversations,
            emotions,
            Utc::now(),
        ))
    }

    async fn with_messages(
        &self,
        conversations: Vec<Conversation>,
    ) -> XinyuResult<Vec<ConversationWithMessages>> {
        let mut entries = Vec::with_capacity(conversations.len());
        for conversation in conversations {
            let messages = self.store.list_messages(&conversation.id).await?;
            entries.push(ConversationWithMessages {
                conversation,
                messages,
            });
        }
        Ok(entries)
    }
}
