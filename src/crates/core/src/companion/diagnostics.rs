use serde::Serialize;
use xinyu_ai_adapters::FailureKind;

/// Outcome of one probe request against one candidate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateProbe {
    pub provider: String,
    pub model: String,
    pub endpoint: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub latency_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsReport {
    pub candidate_count: usize,
    /// Cached working candidate at the time of the report, e.g. `github/openai/gpt-4o-mini`.
    pub working_model: Option<String>,
    pub no_access: bool,
    pub probes: Vec<CandidateProbe>,
}

impl DiagnosticsReport {
    pub fn reachable_count(&self) -> usize {
        self.probes.iter().filter(|probe| probe.ok).count()
    }
}
