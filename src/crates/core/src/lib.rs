// Xinyu Core Library - emotional-support companion logic
// Layers: Util -> Infrastructure -> Emotion/Companion -> Conversation

pub mod companion; // Fallback orchestrator, templated replies, prompts
pub mod conversation; // Chat turns, history, analytics, backup
pub mod emotion; // Keyword emotion classifier
pub mod infrastructure; // Configuration, storage
pub mod util; // Errors, text helpers

pub use util::errors::*;

pub use companion::{
    CandidateProbe, DiagnosticsReport, FallbackOrchestrator, OrchestratorSettings,
    TemplatedResponder, WorkingModel, WorkingModelCache,
};
pub use conversation::{ChatRequest, ChatService, ChatTurn, ConversationStore};
pub use emotion::{EmotionAnalysis, EmotionClassifier, IntensityFormula};
pub use infrastructure::config::{AppConfig, ProviderConfig};
pub use infrastructure::storage::MemoryConversationStore;

pub use xinyu_ai_adapters::{ChatMessage, ChatRole};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const CORE_NAME: &str = "Xinyu Core";
