//! Companion reply pipeline: remote candidates first, templates last.

pub mod analysis;
pub mod cache;
pub mod diagnostics;
pub mod orchestrator;
pub mod prompts;
pub mod templates;

pub use analysis::parse_remote_analysis;
pub use cache::{WorkingModel, WorkingModelCache};
pub use diagnostics::{CandidateProbe, DiagnosticsReport};
pub use orchestrator::{FallbackOrchestrator, OrchestratorSettings};
pub use templates::TemplatedResponder;
