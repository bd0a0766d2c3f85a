use crate::emotion::types::{MAX_INTENSITY, MIN_INTENSITY};
use crate::emotion::{EmotionAnalysis, EVENT_PREVIEW_CHARS};
use crate::util::errors::{XinyuError, XinyuResult};
use crate::util::text::truncate_with_ellipsis;
use log::warn;
use serde::Deserialize;
use serde_json::Value;

/// Parse a model's emotion analysis reply into an [`EmotionAnalysis`].
///
/// Models often wrap the object in prose or a code fence, so the JSON is cut
/// from the first `{` to the last `}`. All four fields must be present and
/// non-empty; intensity must land in 1..=10 after rounding.
pub fn parse_remote_analysis(model_text: &str) -> XinyuResult<EmotionAnalysis> {
    let start = model_text.find('{').ok_or_else(|| {
        XinyuError::AIClient("Analysis output did not contain JSON object".to_string())
    })?;
    let end = model_text.rfind('}').ok_or_else(|| {
        XinyuError::AIClient("Analysis output did not contain JSON object end".to_string())
    })?;
    if end < start {
        return Err(XinyuError::AIClient(
            "Analysis output JSON braces are out of order".to_string(),
        ));
    }
    let json_str = &model_text[start..=end];

    #[derive(Debug, Deserialize)]
    struct RawAnalysis {
        #[serde(default)]
        event: Option<String>,
        #[serde(default)]
        belief: Option<String>,
        #[serde(default)]
        emotion: Option<String>,
        #[serde(default)]
        intensity: Option<Value>,
    }

    let raw: RawAnalysis = serde_json::from_str(json_str).map_err(|e| {
        warn!("Failed to parse emotion analysis JSON: {}", e);
        XinyuError::AIClient(format!("Failed to parse analysis JSON: {}", e))
    })?;

    let event = required_text(raw.event, "event")?;
    let belief = required_text(raw.belief, "belief")?;
    let emotion = required_text(raw.emotion, "emotion")?;
    let intensity = raw
        .intensity
        .as_ref()
        .and_then(parse_intensity)
        .ok_or_else(|| {
            XinyuError::AIClient("Analysis intensity missing or outside 1-10".to_string())
        })?;

    Ok(EmotionAnalysis {
        event: truncate_with_ellipsis(&event, EVENT_PREVIEW_CHARS),
        belief,
        emotion,
        intensity,
    })
}

fn required_text(value: Option<String>, field: &str) -> XinyuResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| XinyuError::AIClient(format!("Analysis field '{}' is empty", field)))
}

fn parse_intensity(value: &Value) -> Option<u8> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    let rounded = number.round();
    (f64::from(MIN_INTENSITY)..=f64::from(MAX_INTENSITY))
        .contains(&rounded)
        .then_some(rounded as u8)
}
