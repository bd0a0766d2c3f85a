use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Body substrings (matched case-insensitively) that mark a permission
/// problem even when the status code is not 401/403.
const PERMISSION_MARKERS: &[&str] = &["no_access", "no access", "models permission"];

/// Closed failure taxonomy of one provider attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Timeout,
    Transient,
    PermissionDenied,
    MalformedResponse,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Timeout => "timeout",
            FailureKind::Transient => "transient",
            FailureKind::PermissionDenied => "permission_denied",
            FailureKind::MalformedResponse => "malformed_response",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderFailure {
    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("provider returned HTTP {status}")]
    Status { status: u16 },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("permission denied by provider (HTTP {status})")]
    PermissionDenied { status: u16 },

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl ProviderFailure {
    pub fn kind(&self) -> FailureKind {
        match self {
            ProviderFailure::Timeout(_) => FailureKind::Timeout,
            ProviderFailure::Status { .. } | ProviderFailure::Transport(_) => {
                FailureKind::Transient
            }
            ProviderFailure::PermissionDenied { .. } => FailureKind::PermissionDenied,
            ProviderFailure::MalformedResponse(_) => FailureKind::MalformedResponse,
        }
    }

    /// Classify a non-2xx response.
    pub fn from_error_response(status: u16, body: &str) -> Self {
        if status == 401 || status == 403 || has_permission_marker(body) {
            ProviderFailure::PermissionDenied { status }
        } else {
            ProviderFailure::Status { status }
        }
    }

    pub(crate) fn from_transport(error: reqwest::Error, timeout: Duration) -> Self {
        if error.is_timeout() {
            ProviderFailure::Timeout(timeout)
        } else {
            ProviderFailure::Transport(error.to_string())
        }
    }
}

pub fn has_permission_marker(body: &str) -> bool {
    let lowered = body.to_lowercase();
    PERMISSION_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
}
