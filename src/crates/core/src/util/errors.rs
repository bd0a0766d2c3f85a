//! Error types shared across the core library

use thiserror::Error;

#[derive(Debug, Error)]
pub enum XinyuError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("AI client error: {0}")]
    AIClient(String),
}

pub type XinyuResult<T> = Result<T, XinyuError>;

impl XinyuError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }
}

impl From<toml::de::Error> for XinyuError {
    fn from(error: toml::de::Error) -> Self {
        Self::Config(error.to_string())
    }
}
