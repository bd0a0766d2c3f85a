//! Logging Configuration

use chrono::Local;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub const LOG_LEVEL_ENV: &str = "XINYU_LOG_LEVEL";

const SESSION_DIR_PATTERN: &str = r"^\d{8}T\d{6}$";
const MAX_LOG_SESSIONS: usize = 50;
const LOG_RETENTION_DAYS: i64 = 7;

/// Provider attempts are logged under this target and go to `ai.log`.
const AI_TARGET: &str = "ai";

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: log::LevelFilter,
    pub is_debug: bool,
    pub logs_root: PathBuf,
    pub session_log_dir: PathBuf,
}

impl LogConfig {
    pub fn new(is_debug: bool, logs_root: &Path) -> Self {
        let level = resolve_default_level(
            std::env::var(LOG_LEVEL_ENV).ok().as_deref(),
            is_debug,
        );
        let session_log_dir = create_session_log_dir(logs_root);

        Self {
            level,
            is_debug,
            logs_root: logs_root.to_path_buf(),
            session_log_dir,
        }
    }
}

fn resolve_default_level(env_value: Option<&str>, is_debug: bool) -> log::LevelFilter {
    let fallback = if is_debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    match env_value {
        Some(val) => parse_log_level(val).unwrap_or_else(|| {
            eprintln!(
                "Warning: Invalid {} '{}', falling back to default",
                LOG_LEVEL_ENV, val
            );
            fallback
        }),
        None => fallback,
    }
}

pub fn parse_log_level(value: &str) -> Option<log::LevelFilter> {
    match value.trim().to_lowercase().as_str() {
        "trace" => Some(log::LevelFilter::Trace),
        "debug" => Some(log::LevelFilter::Debug),
        "info" => Some(log::LevelFilter::Info),
        "warn" => Some(log::LevelFilter::Warn),
        "error" => Some(log::LevelFilter::Error),
        "off" => Some(log::LevelFilter::Off),
        _ => None,
    }
}

pub fn level_to_str(level: log::LevelFilter) -> &'static str {
    match level {
        log::LevelFilter::Trace => "trace",
        log::LevelFilter::Debug => "debug",
        log::LevelFilter::Info => "info",
        log::LevelFilter::Warn => "warn",
        log::LevelFilter::Error => "error",
        log::LevelFilter::Off => "off",
    }
}

pub fn create_session_log_dir(logs_root: &Path) -> PathBuf {
    let timestamp = Local::now().format("%Y%m%dT%H%M%S").to_string();
    let session_dir = logs_root.join(&timestamp);

    if let Err(e) = std::fs::create_dir_all(&session_dir) {
        eprintln!("Warning: Failed to create log session directory: {}", e);
        return logs_root.to_path_buf();
    }

    session_dir
}

fn open_log_file(dir: &Path, name: &str) -> Option<Mutex<File>> {
    let path = dir.join(name);
    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => Some(Mutex::new(file)),
        Err(e) => {
            eprintln!(
                "Warning: Failed to open log file {}: {}",
                path.display(),
                e
            );
            None
        }
    }
}

fn is_ai_target(target: &str) -> bool {
    target.starts_with(AI_TARGET)
}

/// Install the global subscriber: `app.log` and `ai.log` in the session
/// directory, plus stderr output with `--debug`. `log` records from the
/// library crates are bridged into tracing.
pub fn init_logging(config: &LogConfig) {
    let env_filter = EnvFilter::new(level_to_str(config.level));

    let console_layer = config.is_debug.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_thread_ids(true)
            .with_filter(filter_fn(|metadata| !is_ai_target(metadata.target())))
    });

    let app_layer = open_log_file(&config.session_log_dir, "app.log").map(|file| {
        tracing_subscriber::fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_thread_ids(true)
            .with_filter(filter_fn(|metadata| !is_ai_target(metadata.target())))
    });

    let ai_layer = open_log_file(&config.session_log_dir, "ai.log").map(|file| {
        tracing_subscriber::fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_thread_ids(true)
            .with_filter(filter_fn(|metadata| is_ai_target(metadata.target())))
    });

    let result = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(app_layer)
        .with(ai_layer)
        .try_init();

    if let Err(e) = result {
        eprintln!("Warning: Failed to initialize logging: {}", e);
        return;
    }

    tracing::info!(
        "Logging initialized: level={}, session_log_dir={}",
        level_to_str(config.level),
        config.session_log_dir.display()
    );
}

fn parse_session_timestamp(name: &str) -> Option<chrono::NaiveDateTime> {
    chrono::NaiveDateTime::parse_from_str(name, "%Y%m%dT%H%M%S").ok()
}

async fn do_cleanup_log_sessions(
    logs_root: &Path,
    max_sessions: usize,
) -> Result<usize, std::io::Error> {
    let regex = regex::Regex::new(SESSION_DIR_PATTERN).map_err(|e| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("Invalid session dir pattern: {}", e),
        )
    })?;
    let mut entries = tokio::fs::read_dir(logs_root).await?;
    let mut session_dirs: Vec<String> = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let metadata = entry.metadata().await?;
        if !metadata.is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();
        if regex.is_match(&name) {
            session_dirs.push(name);
        }
    }

    session_dirs.sort();

    if session_dirs.len() <= max_sessions {
        return Ok(0);
    }

    let now = Local::now().naive_local();
    let retention_threshold = now - chrono::Duration::days(LOG_RETENTION_DAYS);

    let excess_count = session_dirs.len() - max_sessions;
    let to_delete: Vec<_> = session_dirs
        .into_iter()
        .take(excess_count)
        .filter(|name| {
            parse_session_timestamp(name)
                .map(|ts| ts < retention_threshold)
                .unwrap_or(false)
        })
        .collect();

    if to_delete.is_empty() {
        return Ok(0);
    }

    tracing::info!(
        "Cleaning up {} old log session(s) older than {} days",
        to_delete.len(),
        LOG_RETENTION_DAYS
    );

    let mut removed = 0;
    for session_name in to_delete {
        let session_path = logs_root.join(&session_name);
        match tokio::fs::remove_dir_all(&session_path).await {
            Ok(_) => {
                removed += 1;
                tracing::debug!("Removed old log session: {}", session_name);
            }
            Err(e) => {
                tracing::warn!("Failed to remove log session {}: {}", session_name, e);
            }
        }
    }

    Ok(removed)
}

pub fn spawn_log_cleanup_task(logs_root: PathBuf) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = do_cleanup_log_sessions(&logs_root, MAX_LOG_SESSIONS).await {
            tracing::warn!("Failed to cleanup old log sessions: {}", e);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::{do_cleanup_log_sessions, parse_log_level, resolve_default_level};
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "xinyu-cli-{}-{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn parses_levels_case_insensitively() {
        assert_eq!(parse_log_level(" DEBUG "), Some(log::LevelFilter::Debug));
        assert_eq!(parse_log_level("off"), Some(log::LevelFilter::Off));
        assert_eq!(parse_log_level("verbose"), None);
    }

    #[test]
    fn env_level_wins_and_invalid_falls_back() {
        assert_eq!(resolve_default_level(Some("warn"), true), log::LevelFilter::Warn);
        assert_eq!(resolve_default_level(Some("loud"), true), log::LevelFilter::Debug);
        assert_eq!(resolve_default_level(None, false), log::LevelFilter::Info);
    }

    #[tokio::test]
    async fn cleanup_removes_only_excess_expired_sessions() {
        let root = scratch_dir("cleanup");
        for day in 1..=5 {
            std::fs::create_dir_all(root.join(format!("202001{:02}T120000", day))).unwrap();
        }
        let recent = chrono::Local::now().format("%Y%m%dT%H%M%S").to_string();
        std::fs::create_dir_all(root.join(&recent)).unwrap();
        std::fs::create_dir_all(root.join("not-a-session")).unwrap();

        let removed = do_cleanup_log_sessions(&root, 3).await.unwrap();
        assert_eq!(removed, 3);
        assert!(!root.join("20200101T120000").exists());
        assert!(!root.join("20200103T120000").exists());
        assert!(root.join("20200104T120000").exists());
        assert!(root.join(&recent).exists());
        assert!(root.join("not-a-session").exists());

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn cleanup_keeps_everything_under_the_cap() {
        let root = scratch_dir("under-cap");
        std::fs::create_dir_all(root.join("20200101T120000")).unwrap();
        assert_eq!(do_cleanup_log_sessions(&root, 3).await.unwrap(), 0);
        assert!(root.join("20200101T120000").exists());
        let _ = std::fs::remove_dir_all(&root);
    }
}
