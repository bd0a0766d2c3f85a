//! Keyword-driven emotion classification
//!
//! Maps free text onto a small closed set of emotion labels plus an
//! intensity score, without any network access. The remote classifier in
//! [`crate::companion`] falls back to this whenever a provider cannot help.

pub mod classifier;
pub mod keywords;
pub mod types;

pub use classifier::{EmotionClassifier, IntensityFormula, EVENT_PREVIEW_CHARS};
pub use keywords::{detect_family, EmotionFamily, DEFAULT_BELIEF, DEFAULT_EMOTION};
pub use types::EmotionAnalysis;
