use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use xinyu_ai_adapters::Candidate;

#[derive(Debug, Clone, PartialEq)]
pub enum WorkingModel {
    /// Nothing known yet; the full candidate list is tried.
    Unknown,
    /// The last candidate that answered; tried first next time.
    Working(Candidate),
    /// A permission failure was observed; remote calls are skipped.
    NoAccess { since: Instant },
}

/// Single-slot memory of the last successful candidate.
///
/// Owned by one orchestrator, so independent orchestrators (and tests) never
/// share it. All transitions happen under one async mutex.
#[derive(Debug)]
pub struct WorkingModelCache {
    state: Mutex<WorkingModel>,
    /// `None` keeps `NoAccess` for the life of the process.
    no_access_cooldown: Option<Duration>,
}

impl WorkingModelCache {
    pub fn new(no_access_cooldown: Option<Duration>) -> Self {
        Self {
            state: Mutex::new(WorkingModel::Unknown),
            no_access_cooldown,
        }
    }

    /// Current state, expiring `NoAccess` once the cooldown has elapsed.
    pub async fn snapshot(&self) -> WorkingModel {
        let mut state = self.state.lock().await;
        let expired = match (&*state, self.no_access_cooldown) {
            (WorkingModel::NoAccess { since }, Some(cooldown)) => since.elapsed() >= cooldown,
            _ => false,
        };
        if expired {
            log::info!(
                target: "ai",
                "No-access cooldown elapsed, re-enabling remote providers"
            );
            *state = WorkingModel::Unknown;
        }
        state.clone()
    }

    pub async fn remember(&self, candidate: Candidate) {
        *self.state.lock().await = WorkingModel::Working(candidate);
    }

    /// Clear the slot only if it still holds `candidate`; another request may
    /// already have replaced it. Returns whether the slot was cleared.
    pub async fn forget(&self, candidate: &Candidate) -> bool {
        let mut state = self.state.lock().await;
        match &*state {
            WorkingModel::Working(current) if current == candidate => {
                *state = WorkingModel::Unknown;
                true
            }
            _ => false,
        }
    }

    pub async fn mark_no_access(&self) {
        *self.state.lock().await = WorkingModel::NoAccess {
            since: Instant::now(),
        };
    }

    pub async fn is_no_access(&self) -> bool {
        matches!(self.snapshot().await, WorkingModel::NoAccess { .. })
    }

    pub async fn working_candidate(&self) -> Option<Candidate> {
        match self.snapshot().await {
            WorkingModel::Working(candidate) => Some(candidate),
            _ => None,
        }
    }
}

impl Default for WorkingModelCache {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::{WorkingModel, WorkingModelCache};
    use std::time::Duration;
    use xinyu_ai_adapters::{Candidate, SecretString};

    fn candidate(model: &str) -> Candidate {
        Candidate::new("github", "http://localhost/chat", model, SecretString::new("k"))
    }

    #[tokio::test]
    async fn starts_unknown_and_remembers() {
        let cache = WorkingModelCache::default();
        assert_eq!(cache.snapshot().await, WorkingModel::Unknown);

        cache.remember(candidate("a")).await;
        assert_eq!(cache.working_candidate().await, Some(candidate("a")));
    }

    #[tokio::test]
    async fn forget_only_clears_matching_candidate() {
        let cache = WorkingModelCache::default();
        cache.remember(candidate("b")).await;

        assert!(!cache.forget(&candidate("a")).await);
        assert_eq!(cache.working_candidate().await, Some(candidate("b")));

        assert!(cache.forget(&candidate("b")).await);
        assert_eq!(cache.snapshot().await, WorkingModel::Unknown);
    }

    #[tokio::test]
    async fn no_access_is_permanent_without_cooldown() {
        let cache = WorkingModelCache::new(None);
        cache.mark_no_access().await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(cache.is_no_access().await);
    }

    #[tokio::test]
    async fn no_access_expires_after_cooldown() {
        let cache = WorkingModelCache::new(Some(Duration::from_millis(10)));
        cache.mark_no_access().await;
        assert!(cache.is_no_access().await);

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(!cache.is_no_access().await);
        assert_eq!(cache.snapshot().await, WorkingModel::Unknown);
    }
}
