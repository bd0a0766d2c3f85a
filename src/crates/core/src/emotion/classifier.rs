use super::keywords::{detect_family, matched_trigger_count, DEFAULT_BELIEF, DEFAULT_EMOTION};
use super::types::EmotionAnalysis;
use crate::util::text::truncate_with_ellipsis;
use serde::{Deserialize, Serialize};

pub const EVENT_PREVIEW_CHARS: usize = 50;

const DEFAULT_INTENSITY: u8 = 4;
const MIN_MATCHED_INTENSITY: usize = 4;
const MAX_MATCHED_INTENSITY: usize = 8;
const CHARS_PER_INTENSITY_STEP: usize = 15;
const BASE_INTENSITY: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntensityFormula {
    /// `clamp(len / 15 + 3, 4, 8)`
    #[default]
    LengthOnly,
    /// `clamp(len / 15 + 3 + distinct_matched_triggers, 4, 8)`
    LengthAndKeywords,
}

/// Total over every input string: always yields an analysis.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmotionClassifier {
    formula: IntensityFormula,
}

impl EmotionClassifier {
    pub fn new(formula: IntensityFormula) -> Self {
        Self { formula }
    }

    pub fn classify(&self, text: &str) -> EmotionAnalysis {
        let event = truncate_with_ellipsis(text, EVENT_PREVIEW_CHARS);

        let Some(family) = detect_family(text) else {
            return EmotionAnalysis {
                event,
                belief: DEFAULT_BELIEF.to_string(),
                emotion: DEFAULT_EMOTION.to_string(),
                intensity: DEFAULT_INTENSITY,
            };
        };

        let length_score = text.chars().count() / CHARS_PER_INTENSITY_STEP + BASE_INTENSITY;
        let raw = match self.formula {
            IntensityFormula::LengthOnly => length_score,
            IntensityFormula::LengthAndKeywords => {
                length_score + matched_trigger_count(text, family)
            }
        };
        let intensity = raw.clamp(MIN_MATCHED_INTENSITY, MAX_MATCHED_INTENSITY) as u8;

        EmotionAnalysis {
            event,
            belief: family.belief.to_string(),
            emotion: family.label.to_string(),
            intensity,
        }
    }
}
