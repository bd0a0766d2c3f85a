//! Full data export for one user.

use super::types::{ConversationWithMessages, EmotionEvent, Profile};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackupUser {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateRange {
    pub first: Option<DateTime<Utc>>,
    pub last: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupStatistics {
    pub total_conversations: usize,
    pub total_messages: usize,
    pub total_emotions: usize,
    pub date_range: DateRange,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    pub export_date: DateTime<Utc>,
    pub user: BackupUser,
    pub profile: Option<Profile>,
    /// Oldest first.
    pub conversations: Vec<ConversationWithMessages>,
    /// Oldest first.
    pub emotions: Vec<EmotionEvent>,
    pub statistics: BackupStatistics,
}

impl BackupDocument {
    pub fn new(
        user_id: &str,
        profile: Option<Profile>,
        conversations: Vec<ConversationWithMessages>,
        emotions: Vec<EmotionEvent>,
        export_date: DateTime<Utc>,
    ) -> Self {
        let statistics = BackupStatistics {
            total_conversations: conversations.len(),
            total_messages: conversations.iter().map(|c| c.messages.len()).sum(),
            total_emotions: emotions.len(),
            date_range: DateRange {
                first: conversations.first().map(|c| c.conversation.created_at),
                last: conversations.last().map(|c| c.conversation.created_at),
            },
        };
        Self {
            export_date,
            user: BackupUser {
                id: user_id.to_string(),
            },
            profile,
            conversations,
            emotions,
            statistics,
        }
    }

    pub fn file_name(&self) -> String {
        backup_file_name(&self.user.id, self.export_date.date_naive())
    }
}

/// `xinyu-xiaowu-backup-<user>-<YYYY-MM-DD>.json`
pub fn backup_file_name(user_id: &str, date: NaiveDate) -> String {
    format!(
        "xinyu-xiaowu-backup-{}-{}.json",
        user_id,
        date.format("%Y-%m-%d")
    )
}

#[cfg(test)]
mod tests {
    use super::{backup_file_name, BackupDocument};
    use chrono::{NaiveDate, TimeZone, Utc};

    #[test]
    fn file_name_uses_user_and_date() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 9).unwrap();
        assert_eq!(
            backup_file_name("u-42", date),
            "xinyu-xiaowu-backup-u-42-2025-01-09.json"
        );
    }

    #[test]
    fn empty_backup_serializes_expected_shape() {
        let exported_at = Utc.with_ymd_and_hms(2025, 6, 1, 8, 30, 0).unwrap();
        let doc = BackupDocument::new("local", None, vec![], vec![], exported_at);
        assert_eq!(doc.file_name(), "xinyu-xiaowu-backup-local-2025-06-01.json");

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["user"]["id"], "local");
        assert!(json["profile"].is_null());
        assert_eq!(json["statistics"]["totalConversations"], 0);
        assert!(json["statistics"]["dateRange"]["first"].is_null());
        assert!(json["exportDate"].is_string());
    }
}
