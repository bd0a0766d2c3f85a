//! Fallback orchestration across remote candidates
//!
//! A reply is always produced: the cached working candidate is tried first,
//! then the full ordered list, and finally the local template responder.

use super::analysis::parse_remote_analysis;
use super::cache::{WorkingModel, WorkingModelCache};
use super::diagnostics::{CandidateProbe, DiagnosticsReport};
use super::prompts::{
    build_analysis_prompt, ANALYSIS_SYSTEM_PROMPT, COMPANION_SYSTEM_PROMPT, PROBE_MESSAGE,
};
use super::templates::TemplatedResponder;
use crate::emotion::{EmotionAnalysis, EmotionClassifier, IntensityFormula};
use crate::infrastructure::config::AppConfig;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};
use xinyu_ai_adapters::{
    Candidate, ChatCompletionProvider, ChatMessage, FailureKind, HttpChatProvider,
    ProviderFailure,
};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_HISTORY_WINDOW: usize = 6;

#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorSettings {
    /// Upper bound for each individual provider attempt.
    pub request_timeout: Duration,
    /// Most recent history entries forwarded to the model.
    pub history_window: usize,
    pub no_access_cooldown: Option<Duration>,
    pub intensity_formula: IntensityFormula,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            history_window: DEFAULT_HISTORY_WINDOW,
            no_access_cooldown: None,
            intensity_formula: IntensityFormula::default(),
        }
    }
}

pub struct FallbackOrchestrator {
    provider: Arc<dyn ChatCompletionProvider>,
    candidates: Vec<Candidate>,
    cache: WorkingModelCache,
    responder: TemplatedResponder,
    classifier: EmotionClassifier,
    settings: OrchestratorSettings,
}

impl FallbackOrchestrator {
    pub fn new(
        provider: Arc<dyn ChatCompletionProvider>,
        candidates: Vec<Candidate>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            provider,
            candidates,
            cache: WorkingModelCache::new(settings.no_access_cooldown),
            responder: TemplatedResponder::new(),
            classifier: EmotionClassifier::new(settings.intensity_formula),
            settings,
        }
    }

    /// Build the production orchestrator: HTTP provider plus every candidate
    /// whose provider has a resolvable credential.
    pub fn from_config(config: &AppConfig) -> Self {
        let candidates = config.candidates();
        if candidates.is_empty() {
            warn!("No provider credentials configured, replies will come from local templates");
        } else {
            info!(
                "Fallback orchestrator ready: candidates={}",
                candidates
                    .iter()
                    .map(|c| c.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
        let provider = Arc::new(HttpChatProvider::new(config.completion_options()));
        Self::new(provider, candidates, config.orchestrator_settings())
    }

    pub fn with_responder(mut self, responder: TemplatedResponder) -> Self {
        self.responder = responder;
        self
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn cache(&self) -> &WorkingModelCache {
        &self.cache
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    /// System persona, the last `history_window` history entries, then the
    /// new user message.
    pub fn build_messages(&self, user_message: &str, history: &[ChatMessage]) -> Vec<ChatMessage> {
        let start = history.len().saturating_sub(self.settings.history_window);
        let mut messages = Vec::with_capacity(history.len() - start + 2);
        messages.push(ChatMessage::system(COMPANION_SYSTEM_PROMPT));
        messages.extend_from_slice(&history[start..]);
        messages.push(ChatMessage::user(user_message));
        messages
    }

    /// Produce a reply for `user_message`. Never fails: when no remote
    /// candidate answers, the templated responder does.
    pub async fn respond(&self, user_message: &str, history: &[ChatMessage]) -> String {
        let messages = self.build_messages(user_message, history);
        if let Some(reply) = self.try_remote(&messages).await {
            return reply;
        }
        debug!("Replying from local templates");
        self.responder.generate(user_message, history)
    }

    async fn try_remote(&self, messages: &[ChatMessage]) -> Option<String> {
        if self.candidates.is_empty() {
            return None;
        }

        match self.cache.snapshot().await {
            WorkingModel::NoAccess { .. } => {
                debug!(target: "ai", "Remote providers marked no-access, skipping network");
                return None;
            }
            WorkingModel::Working(cached) => match self.attempt(&cached, messages).await {
                Ok(reply) => return Some(reply),
                Err(failure) => {
                    if self.cache.forget(&cached).await {
                        info!(
                            target: "ai",
                            "Cached candidate failed, retrying full list: candidate={}, kind={}",
                            cached,
                            failure.kind()
                        );
                    }
                }
            },
            WorkingModel::Unknown => {}
        }

        let mut saw_permission_denied = false;
        for candidate in &self.candidates {
            match self.attempt(candidate, messages).await {
                Ok(reply) => {
                    self.cache.remember(candidate.clone()).await;
                    return Some(reply);
                }
                Err(failure) => {
                    if failure.kind() == FailureKind::PermissionDenied {
                        saw_permission_denied = true;
                    }
                }
            }
        }

        if saw_permission_denied {
            warn!(
                target: "ai",
                "Every candidate failed and at least one denied access, disabling remote providers"
            );
            self.cache.mark_no_access().await;
        }
        None
    }

    async fn attempt(
        &self,
        candidate: &Candidate,
        messages: &[ChatMessage],
    ) -> Result<String, ProviderFailure> {
        self.provider
            .complete(candidate, messages, self.settings.request_timeout)
            .await
    }

    /// Ask each candidate in order for a structured analysis. Never records a
    /// working model, but makes no calls once access has been denied. `None`
    /// when no candidate produced a parseable answer.
    pub async fn classify_remote(&self, text: &str) -> Option<EmotionAnalysis> {
        if let WorkingModel::NoAccess { .. } = self.cache.snapshot().await {
            debug!(target: "ai", "Skipping remote analysis: access denied for all candidates");
            return None;
        }

        let messages = [
            ChatMessage::system(ANALYSIS_SYSTEM_PROMPT),
            ChatMessage::user(build_analysis_prompt(text)),
        ];

        for candidate in &self.candidates {
            let reply = match self.attempt(candidate, &messages).await {
                Ok(reply) => reply,
                Err(_) => continue,
            };
            match parse_remote_analysis(&reply) {
                Ok(analysis) => return Some(analysis),
                Err(e) => {
                    warn!(
                        target: "ai",
                        "Discarding unparseable analysis: candidate={}, error={}",
                        candidate,
                        e
                    );
                    return None;
                }
            }
        }
        None
    }

    /// Remote analysis when available, local keyword analysis otherwise.
    pub async fn classify(&self, text: &str) -> EmotionAnalysis {
        match self.classify_remote(text).await {
            Some(analysis) => analysis,
            None => self.classify_local(text),
        }
    }

    pub fn classify_local(&self, text: &str) -> EmotionAnalysis {
        self.classifier.classify(text)
    }

    /// Probe every candidate once with a tiny request and report which ones
    /// answer. Leaves the cache untouched.
    pub async fn diagnose(&self) -> DiagnosticsReport {
        let messages = [ChatMessage::user(PROBE_MESSAGE)];
        let mut probes = Vec::with_capacity(self.candidates.len());

        for candidate in &self.candidates {
            let started = Instant::now();
            let outcome = self.attempt(candidate, &messages).await;
            let latency_ms = started.elapsed().as_millis() as u64;
            let (ok, failure, detail) = match outcome {
                Ok(_) => (true, None, None),
                Err(failure) => (false, Some(failure.kind()), Some(failure.to_string())),
            };
            probes.push(CandidateProbe {
                provider: candidate.provider().to_string(),
                model: candidate.model().to_string(),
                endpoint: candidate.endpoint().to_string(),
                ok,
                failure,
                detail,
                latency_ms,
            });
        }

        let state = self.cache.snapshot().await;
        DiagnosticsReport {
            candidate_count: self.candidates.len(),
            working_model: match &state {
                WorkingModel::Working(candidate) => Some(candidate.to_string()),
                _ => None,
            },
            no_access: matches!(state, WorkingModel::NoAccess { .. }),
            probes,
        }
    }
}
