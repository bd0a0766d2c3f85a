//! Emotion statistics over a user's recent emotion events.

use super::types::EmotionEvent;
use chrono::{DateTime, Duration, Utc};
use indexmap::IndexMap;
use serde::Serialize;

/// Events considered per report.
pub const ANALYTICS_WINDOW: usize = 100;
pub const TIMELINE_LEN: usize = 20;
pub const TREND_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionStat {
    pub count: usize,
    pub total_intensity: u32,
    pub avg_intensity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MostCommonEmotion {
    pub emotion: String,
    pub count: usize,
    pub avg_intensity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentTrend {
    pub last_7_days: usize,
    pub avg_intensity_last_7_days: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionAnalytics {
    pub total_records: usize,
    /// Keyed by label in first-seen order.
    pub emotion_stats: IndexMap<String, EmotionStat>,
    pub most_common_emotion: Option<MostCommonEmotion>,
    pub overall_avg_intensity: f64,
    pub recent_trend: RecentTrend,
    pub timeline: Vec<EmotionEvent>,
}

/// Summarize `events`, which must be ordered newest first. Only the first
/// [`ANALYTICS_WINDOW`] events are considered.
pub fn summarize(events: &[EmotionEvent], now: DateTime<Utc>) -> EmotionAnalytics {
    let events = &events[..events.len().min(ANALYTICS_WINDOW)];

    let mut emotion_stats: IndexMap<String, EmotionStat> = IndexMap::new();
    for event in events {
        let stat = emotion_stats
            .entry(event.emotion_label.clone())
            .or_insert(EmotionStat {
                count: 0,
                total_intensity: 0,
                avg_intensity: 0.0,
            });
        stat.count += 1;
        stat.total_intensity += u32::from(event.intensity);
        stat.avg_intensity = f64::from(stat.total_intensity) / stat.count as f64;
    }

    // max_by_key keeps the last maximum, so fold to keep the first-seen one.
    let most_common_emotion = emotion_stats
        .iter()
        .fold(None::<(&String, &EmotionStat)>, |best, (label, stat)| match best {
            Some((_, best_stat)) if best_stat.count >= stat.count => best,
            _ => Some((label, stat)),
        })
        .map(|(label, stat)| MostCommonEmotion {
            emotion: label.clone(),
            count: stat.count,
            avg_intensity: round2(stat.avg_intensity),
        });

    let trend_start = now - Duration::days(TREND_DAYS);
    let recent: Vec<&EmotionEvent> = events
        .iter()
        .filter(|event| event.created_at >= trend_start)
        .collect();

    EmotionAnalytics {
        total_records: events.len(),
        emotion_stats,
        most_common_emotion,
        overall_avg_intensity: round2(average_intensity(events.iter())),
        recent_trend: RecentTrend {
            last_7_days: recent.len(),
            avg_intensity_last_7_days: round2(average_intensity(recent.iter().copied())),
        },
        timeline: events.iter().take(TIMELINE_LEN).cloned().collect(),
    }
}

fn average_intensity<'a>(events: impl Iterator<Item = &'a EmotionEvent>) -> f64 {
    let (sum, count) = events.fold((0u32, 0usize), |(sum, count), event| {
        (sum + u32::from(event.intensity), count + 1)
    });
    if count == 0 {
        0.0
    } else {
        f64::from(sum) / count as f64
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
