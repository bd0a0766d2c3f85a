//! In-memory conversation store with JSON snapshot persistence.

use crate::conversation::store::ConversationStore;
use crate::conversation::types::{
    Conversation, ConversationStatus, EmotionEvent, NewEmotionEvent, Profile, StoredMessage,
};
use crate::util::errors::{XinyuError, XinyuResult};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use xinyu_ai_adapters::ChatRole;

/// Row plus insertion sequence, so rows created within the same clock tick
/// keep a stable order.
#[derive(Debug, Clone)]
struct Row<T> {
    seq: u64,
    value: T,
}

/// Serialized form of the whole store.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreSnapshot {
    #[serde(default)]
    conversations: Vec<Conversation>,
    #[serde(default)]
    messages: Vec<StoredMessage>,
    #[serde(default)]
    emotions: Vec<EmotionEvent>,
    #[serde(default)]
    profiles: Vec<Profile>,
}

#[derive(Debug, Default)]
pub struct MemoryConversationStore {
    conversations: DashMap<String, Row<Conversation>>,
    /// Keyed by conversation id, insertion order.
    messages: DashMap<String, Vec<Row<StoredMessage>>>,
    /// Keyed by user id, insertion order.
    emotions: DashMap<String, Vec<Row<EmotionEvent>>>,
    profiles: DashMap<String, Profile>,
    seq: AtomicU64,
}

impl MemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed)
    }

    /// Load a snapshot written by [`save_snapshot`](Self::save_snapshot). A
    /// missing file yields an empty store.
    pub async fn load_snapshot(path: &Path) -> XinyuResult<Self> {
        let store = Self::new();
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No store snapshot yet: path={}", path.display());
                return Ok(store);
            }
            Err(e) => return Err(e.into()),
        };
        let snapshot: StoreSnapshot = serde_json::from_str(&content).map_err(|e| {
            XinyuError::store(format!(
                "Failed to parse store snapshot {}: {}",
                path.display(),
                e
            ))
        })?;

        // Snapshot vectors are already in insertion order.
        for conversation in snapshot.conversations {
            let seq = store.next_seq();
            store.conversations.insert(
                conversation.id.clone(),
                Row {
                    seq,
                    value: conversation,
                },
            );
        }
        for message in snapshot.messages {
            let seq = store.next_seq();
            store
                .messages
                .entry(message.conversation_id.clone())
                .or_default()
                .push(Row {
                    seq,
                    value: message,
                });
        }
        for event in snapshot.emotions {
            let seq = store.next_seq();
            store
                .emotions
                .entry(event.user_id.clone())
                .or_default()
                .push(Row { seq, value: event });
        }
        for profile in snapshot.profiles {
            store.profiles.insert(profile.user_id.clone(), profile);
        }

        info!(
            "Store snapshot loaded: path={}, conversations={}",
            path.display(),
            store.conversations.len()
        );
        Ok(store)
    }

    /// Write the whole store to `path` through a temporary sibling file, so a
    /// crash mid-write leaves the previous snapshot intact.
    pub async fn save_snapshot(&self, path: &Path) -> XinyuResult<()> {
        let snapshot = self.to_snapshot();
        let content = serde_json::to_string_pretty(&snapshot)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, content).await?;
        tokio::fs::rename(&tmp_path, path).await?;

        debug!("Store snapshot saved: path={}", path.display());
        Ok(())
    }

    fn to_snapshot(&self) -> StoreSnapshot {
        let mut conversations: Vec<Row<Conversation>> =
            self.conversations.iter().map(|e| e.value().clone()).collect();
        conversations.sort_by_key(|row| row.seq);

        let mut messages: Vec<Row<StoredMessage>> = self
            .messages
            .iter()
            .flat_map(|e| e.value().clone())
            .collect();
        messages.sort_by_key(|row| row.seq);

        let mut emotions: Vec<Row<EmotionEvent>> = self
            .emotions
            .iter()
            .flat_map(|e| e.value().clone())
            .collect();
        emotions.sort_by_key(|row| row.seq);

        let mut profiles: Vec<Profile> = self.profiles.iter().map(|e| e.value().clone()).collect();
        profiles.sort_by(|a, b| a.user_id.cmp(&b.user_id));

        StoreSnapshot {
            conversations: conversations.into_iter().map(|row| row.value).collect(),
            messages: messages.into_iter().map(|row| row.value).collect(),
            emotions: emotions.into_iter().map(|row| row.value).collect(),
            profiles,
        }
    }
}

#[async_trait]
impl ConversationStore for MemoryConversationStore {
    async fn create_conversation(&self, user_id: &str, title: &str) -> XinyuResult<Conversation> {
        let now = Utc::now();
        let conversation = Conversation {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            title: title.to_string(),
            status: ConversationStatus::Active,
            created_at: now,
            updated_at: now,
        };
        let seq = self.next_seq();
        self.conversations.insert(
            conversation.id.clone(),
            Row {
                seq,
                value: conversation.clone(),
            },
        );
        Ok(conversation)
    }

    async fn get_conversation(&self, conversation_id: &str) -> XinyuResult<Option<Conversation>> {
        Ok(self
            .conversations
            .get(conversation_id)
            .map(|row| row.value.clone()))
    }

    async fn list_conversations(&self, user_id: &str) -> XinyuResult<Vec<Conversation>> {
        let mut rows: Vec<Row<Conversation>> = self
            .conversations
            .iter()
            .filter(|e| e.value().value.user_id == user_id)
            .map(|e| e.value().clone())
            .collect();
        rows.sort_by(|a, b| {
            b.value
                .updated_at
                .cmp(&a.value.updated_at)
                .then(b.seq.cmp(&a.seq))
        });
        Ok(rows.into_iter().map(|row| row.value).collect())
    }

    async fn delete_conversation(&self, conversation_id: &str) -> XinyuResult<bool> {
        let removed = self.conversations.remove(conversation_id).is_some();
        self.messages.remove(conversation_id);
        Ok(removed)
    }

    async fn append_message(
        &self,
        conversation_id: &str,
        role: ChatRole,
        content: &str,
        tokens: Option<u32>,
    ) -> XinyuResult<StoredMessage> {
        let now = Utc::now();
        {
            let mut conversation = self.conversations.get_mut(conversation_id).ok_or_else(|| {
                XinyuError::not_found(format!("Conversation not found: {}", conversation_id))
            })?;
            conversation.value.updated_at = now;
        }

        let message = StoredMessage {
            id: uuid::Uuid::new_v4().to_string(),
            conversation_id: conversation_id.to_string(),
            role,
            content: content.to_string(),
            tokens,
            created_at: now,
        };
        let seq = self.next_seq();
        self.messages
            .entry(conversation_id.to_string())
            .or_default()
            .push(Row {
                seq,
                value: message.clone(),
            });
        Ok(message)
    }

    async fn recent_messages(
        &self,
        conversation_id: &str,
        limit: usize,
    ) -> XinyuResult<Vec<StoredMessage>> {
        Ok(self
            .messages
            .get(conversation_id)
            .map(|rows| {
                rows.iter()
                    .rev()
                    .take(limit)
                    .map(|row| row.value.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn list_messages(&self, conversation_id: &str) -> XinyuResult<Vec<StoredMessage>> {
        Ok(self
            .messages
            .get(conversation_id)
            .map(|rows| rows.iter().map(|row| row.value.clone()).collect())
            .unwrap_or_default())
    }

    async fn record_emotion(&self, event: NewEmotionEvent) -> XinyuResult<EmotionEvent> {
        let stored = EmotionEvent {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: event.user_id.clone(),
            conversation_id: event.conversation_id,
            event_text: event.analysis.event,
            belief_text: event.analysis.belief,
            emotion_label: event.analysis.emotion,
            intensity: event.analysis.intensity,
            created_at: Utc::now(),
        };
        let seq = self.next_seq();
        self.emotions.entry(event.user_id).or_default().push(Row {
            seq,
            value: stored.clone(),
        });
        Ok(stored)
    }

    async fn recent_emotions(
        &self,
        user_id: &str,
        limit: usize,
    ) -> XinyuResult<Vec<EmotionEvent>> {
        Ok(self
            .emotions
            .get(user_id)
            .map(|rows| {
                rows.iter()
                    .rev()
                    .take(limit)
                    .map(|row| row.value.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn list_emotions(&self, user_id: &str) -> XinyuResult<Vec<EmotionEvent>> {
        Ok(self
            .emotions
            .get(user_id)
            .map(|rows| rows.iter().map(|row| row.value.clone()).collect())
            .unwrap_or_default())
    }

    async fn get_profile(&self, user_id: &str) -> XinyuResult<Option<Profile>> {
        Ok(self.profiles.get(user_id).map(|p| p.value().clone()))
    }

    async fn upsert_profile(&self, mut profile: Profile) -> XinyuResult<Profile> {
        profile.updated_at = Utc::now();
        self.profiles
            .insert(profile.user_id.clone(), profile.clone());
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryConversationStore;
    use crate::conversation::store::ConversationStore;
    use crate::conversation::types::{NewEmotionEvent, Profile};
    use crate::emotion::EmotionAnalysis;
    use xinyu_ai_adapters::ChatRole;

    fn analysis(emotion: &str, intensity: u8) -> EmotionAnalysis {
        EmotionAnalysis {
            event: "e".to_string(),
            belief: "b".to_string(),
            emotion: emotion.to_string(),
            intensity,
        }
    }

    #[tokio::test]
    async fn messages_keep_insertion_order() {
        let store = MemoryConversationStore::new();
        let conversation = store.create_conversation("u1", "title").await.unwrap();
        for i in 0..5 {
            store
                .append_message(&conversation.id, ChatRole::User, &format!("m{}", i), None)
                .await
                .unwrap();
        }

        let recent = store.recent_messages(&conversation.id, 3).await.unwrap();
        let contents: Vec<&str> = recent.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["m4", "m3", "m2"]);

        let all = store.list_messages(&conversation.id).await.unwrap();
        assert_eq!(all.first().unwrap().content, "m0");
        assert_eq!(all.len(), 5);
    }

    #[tokio::test]
    async fn append_to_unknown_conversation_fails() {
        let store = MemoryConversationStore::new();
        let err = store
            .append_message("missing", ChatRole::User, "hi", None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[tokio::test]
    async fn delete_removes_messages() {
        let store = MemoryConversationStore::new();
        let conversation = store.create_conversation("u1", "t").await.unwrap();
        store
            .append_message(&conversation.id, ChatRole::User, "hi", Some(2))
            .await
            .unwrap();

        assert!(store.delete_conversation(&conversation.id).await.unwrap());
        assert!(!store.delete_conversation(&conversation.id).await.unwrap());
        assert!(store.list_messages(&conversation.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_conversations_is_user_scoped_newest_first() {
        let store = MemoryConversationStore::new();
        let older = store.create_conversation("u1", "older").await.unwrap();
        let newer = store.create_conversation("u1", "newer").await.unwrap();
        store.create_conversation("u2", "other").await.unwrap();

        let listed = store.list_conversations("u1").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, newer.id);

        store
            .append_message(&older.id, ChatRole::User, "bump", None)
            .await
            .unwrap();
        let listed = store.list_conversations("u1").await.unwrap();
        assert_eq!(listed[0].id, older.id);
    }

    #[tokio::test]
    async fn snapshot_round_trip_preserves_order() {
        let store = MemoryConversationStore::new();
        let conversation = store.create_conversation("u1", "t").await.unwrap();
        for content in ["a", "b", "c"] {
            store
                .append_message(&conversation.id, ChatRole::Assistant, content, None)
                .await
                .unwrap();
        }
        store
            .record_emotion(NewEmotionEvent {
                user_id: "u1".to_string(),
                conversation_id: Some(conversation.id.clone()),
                analysis: analysis("焦虑", 5),
            })
            .await
            .unwrap();

        let path = std::env::temp_dir()
            .join(format!("xinyu-store-{}", uuid::Uuid::new_v4()))
            .join("store.json");
        store.save_snapshot(&path).await.unwrap();

        let loaded = MemoryConversationStore::load_snapshot(&path).await.unwrap();
        let messages = loaded.list_messages(&conversation.id).await.unwrap();
        let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["a", "b", "c"]);
        assert_eq!(loaded.list_emotions("u1").await.unwrap().len(), 1);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn profile_upsert_replaces_previous() {
        let store = MemoryConversationStore::new();
        assert!(store.get_profile("u1").await.unwrap().is_none());

        let now = chrono::Utc::now();
        let profile = Profile {
            id: "p1".to_string(),
            user_id: "u1".to_string(),
            display_name: Some("小雨".to_string()),
            avatar_url: None,
            bio: None,
            created_at: now,
            updated_at: now,
        };
        store.upsert_profile(profile.clone()).await.unwrap();
        store
            .upsert_profile(Profile {
                bio: Some("喜欢散步".to_string()),
                ..profile
            })
            .await
            .unwrap();

        let stored = store.get_profile("u1").await.unwrap().expect("profile");
        assert_eq!(stored.display_name.as_deref(), Some("小雨"));
        assert_eq!(stored.bio.as_deref(), Some("喜欢散步"));
    }

    #[tokio::test]
    async fn missing_snapshot_is_empty_store() {
        let path = std::env::temp_dir().join(format!("xinyu-none-{}.json", uuid::Uuid::new_v4()));
        let store = MemoryConversationStore::load_snapshot(&path).await.unwrap();
        assert!(store.list_conversations("u1").await.unwrap().is_empty());
    }
}
