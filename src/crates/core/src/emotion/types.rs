use serde::{Deserialize, Serialize};

pub const MIN_INTENSITY: u8 = 1;
pub const MAX_INTENSITY: u8 = 10;

/// Event → belief → emotion summary of one user message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionAnalysis {
    /// The triggering event, at most 50 chars plus `...`.
    pub event: String,
    /// One-sentence hypothesis about the belief behind the emotion.
    pub belief: String,
    pub emotion: String,
    /// 1..=10
    pub intensity: u8,
}
