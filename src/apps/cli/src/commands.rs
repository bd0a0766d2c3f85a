use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use xinyu_core::conversation::ProfileUpdate;
use xinyu_core::{AppConfig, ChatService, FallbackOrchestrator, MemoryConversationStore};

pub const STORE_FILE_NAME: &str = "store.json";

pub struct CommandContext {
    pub config: AppConfig,
    pub orchestrator: Arc<FallbackOrchestrator>,
}

impl CommandContext {
    pub fn new(config: AppConfig, orchestrator: Arc<FallbackOrchestrator>) -> Self {
        Self {
            config,
            orchestrator,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.config.user_id
    }

    pub fn store_path(&self) -> PathBuf {
        self.config.data_dir().join(STORE_FILE_NAME)
    }

    pub async fn open_store(&self) -> Result<Arc<MemoryConversationStore>> {
        let path = self.store_path();
        let store = MemoryConversationStore::load_snapshot(&path)
            .await
            .with_context(|| format!("Failed to load store from {}", path.display()))?;
        Ok(Arc::new(store))
    }

    pub async fn save_store(&self, store: &MemoryConversationStore) -> Result<()> {
        let path = self.store_path();
        store
            .save_snapshot(&path)
            .await
            .with_context(|| format!("Failed to save store to {}", path.display()))
    }

    pub fn chat_service(&self, store: Arc<MemoryConversationStore>) -> ChatService {
        ChatService::new(self.orchestrator.clone(), store)
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn classify(ctx: &CommandContext, text: &str, local: bool) -> Result<()> {
    let analysis = if local {
        ctx.orchestrator.classify_local(text)
    } else {
        ctx.orchestrator.classify(text).await
    };
    print_json(&analysis)
}

pub async fn diagnose(ctx: &CommandContext) -> Result<()> {
    if ctx.orchestrator.candidates().is_empty() {
        eprintln!("No provider credentials configured; replies will use local templates.");
    }
    let report = ctx.orchestrator.diagnose().await;
    print_json(&report)
}

pub async fn history(ctx: &CommandContext) -> Result<()> {
    let store = ctx.open_store().await?;
    let history = ctx.chat_service(store).history(ctx.user_id()).await?;
    print_json(&history)
}

pub async fn delete(ctx: &CommandContext, conversation_id: &str) -> Result<()> {
    let store = ctx.open_store().await?;
    ctx.chat_service(store.clone())
        .delete_conversation(ctx.user_id(), conversation_id)
        .await?;
    ctx.save_store(&store).await?;
    println!("Deleted conversation {}", conversation_id);
    Ok(())
}

pub async fn stats(ctx: &CommandContext) -> Result<()> {
    let store = ctx.open_store().await?;
    let analytics = ctx
        .chat_service(store)
        .emotion_analytics(ctx.user_id())
        .await?;
    print_json(&analytics)
}

pub async fn profile(
    ctx: &CommandContext,
    display_name: Option<String>,
    avatar_url: Option<String>,
    bio: Option<String>,
) -> Result<()> {
    let store = ctx.open_store().await?;
    let update = ProfileUpdate {
        display_name,
        avatar_url,
        bio,
    };
    let profile = ctx
        .chat_service(store.clone())
        .update_profile(ctx.user_id(), update)
        .await?;
    ctx.save_store(&store).await?;
    print_json(&profile)
}

pub async fn export(ctx: &CommandContext, out: Option<PathBuf>) -> Result<()> {
    let store = ctx.open_store().await?;
    let backup = ctx.chat_service(store).export_backup(ctx.user_id()).await?;
    let path = out.unwrap_or_else(|| PathBuf::from(backup.file_name()));

    let content = serde_json::to_string_pretty(&backup)?;
    tokio::fs::write(&path, content)
        .await
        .with_context(|| format!("Failed to write backup to {}", path.display()))?;

    tracing::info!("Backup exported: path={}", path.display());
    println!("Backup written to {}", path.display());
    Ok(())
}
