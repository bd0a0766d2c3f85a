//! Xinyu CLI
//!
//! Terminal front end for the emotional-support companion.

mod chat;
mod commands;
mod logging;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use xinyu_core::{AppConfig, FallbackOrchestrator};

#[derive(Parser)]
#[command(name = "xinyu-cli")]
#[command(about = "Xinyu - ABC-theory emotional support companion", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (defaults to <config_dir>/xinyu/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging to stderr
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat; one line per turn, /quit to exit
    Chat {
        /// Continue an existing conversation
        #[arg(long)]
        conversation: Option<String>,
    },

    /// Classify the emotion of a message and print it as JSON
    Classify {
        text: String,

        /// Skip the remote model and use keyword matching only
        #[arg(long)]
        local: bool,
    },

    /// Probe every configured model and print the report as JSON
    Diagnose,

    /// Print all conversations with their messages
    History,

    /// Delete a conversation
    Delete { conversation_id: String },

    /// Print emotion statistics
    Stats,

    /// Set profile fields included in backups
    Profile {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        avatar: Option<String>,

        #[arg(long)]
        bio: Option<String>,
    },

    /// Export all data to a JSON backup file
    Export {
        /// Output path (defaults to the backup file name in the current directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let data_dir = config.data_dir();

    let log_config = logging::LogConfig::new(cli.debug, &data_dir.join("logs"));
    logging::init_logging(&log_config);
    logging::spawn_log_cleanup_task(log_config.logs_root.clone());

    tracing::info!(
        "Starting {} v{}: data_dir={}",
        xinyu_core::CORE_NAME,
        xinyu_core::VERSION,
        data_dir.display()
    );

    let orchestrator = Arc::new(FallbackOrchestrator::from_config(&config));
    let ctx = commands::CommandContext::new(config, orchestrator);

    match cli.command {
        Commands::Chat { conversation } => chat::run_chat(&ctx, conversation).await,
        Commands::Classify { text, local } => commands::classify(&ctx, &text, local).await,
        Commands::Diagnose => commands::diagnose(&ctx).await,
        Commands::History => commands::history(&ctx).await,
        Commands::Delete { conversation_id } => commands::delete(&ctx, &conversation_id).await,
        Commands::Stats => commands::stats(&ctx).await,
        Commands::Profile { name, avatar, bio } => {
            commands::profile(&ctx, name, avatar, bio).await
        }
        Commands::Export { out } => commands::export(&ctx, out).await,
    }
}
