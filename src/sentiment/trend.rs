//! Mood trend across diary entries.

use super::analyzer::{analyze_text, SentimentLabel};
use crate::events::DiaryEntry;
use crate::math::round_dp;
use crate::meta::ModuleMeta;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mean-score shift between halves that counts as a trend
const TREND_DELTA: f64 = 1.0;
const STREAK_WARNING: usize = 3;
const DOMINANCE_MIN_ENTRIES: usize = 5;
const RECENT_TONE_FLOOR: f64 = -3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Declining,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentEntry {
    pub date: DateTime<Utc>,
    pub score: i32,
    pub comparative: f64,
    pub label: SentimentLabel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentTrend {
    pub meta: ModuleMeta,
    pub entries: Vec<SentimentEntry>,
    pub average_score: f64,
    pub trend: Trend,
    /// Recent-half mean minus older-half mean, 2 dp
    pub recent_vs_previous: f64,
    pub dominant_mood: SentimentLabel,
    /// Consecutive negative entries ending at the most recent one
    pub negative_streak: usize,
    pub warning_signals: Vec<String>,
}

impl Default for SentimentTrend {
    fn default() -> Self {
        Self {
            meta: module_meta(),
            entries: Vec::new(),
            average_score: 0.0,
            trend: Trend::Stable,
            recent_vs_previous: 0.0,
            dominant_mood: SentimentLabel::Neutral,
            negative_streak: 0,
            warning_signals: Vec::new(),
        }
    }
}

pub fn module_meta() -> ModuleMeta {
    ModuleMeta::new("sentiment_analyzer", "lexicon valence sum with negation, midpoint trend")
        .with_thresholds(-TREND_DELTA, RECENT_TONE_FLOOR)
        .with_lexicon("AFINN-165 English word list with Russian gambling-recovery vocabulary")
}

fn mean_score(entries: &[SentimentEntry]) -> f64 {
    if entries.is_empty() {
        return 0.0;
    }
    entries.iter().map(|e| f64::from(e.score)).sum::<f64>() / entries.len() as f64
}

/// Most frequent label; positive, then negative, then neutral on ties.
fn dominant_mood(entries: &[SentimentEntry]) -> SentimentLabel {
    let order = [
        SentimentLabel::Positive,
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
    ];
    let mut best = SentimentLabel::Neutral;
    let mut best_count = 0;
    for label in order {
        let count = entries.iter().filter(|e| e.label == label).count();
        if count > best_count {
            best = label;
            best_count = count;
        }
    }
    best
}

pub fn negative_streak(labels: impl DoubleEndedIterator<Item = SentimentLabel>) -> usize {
    labels
        .rev()
        .take_while(|l| *l == SentimentLabel::Negative)
        .count()
}

/// Score every non-blank entry and derive trend, dominant mood, streak and warnings.
pub fn analyze_trend(entries: &[DiaryEntry]) -> SentimentTrend {
    let mut scored: Vec<SentimentEntry> = entries
        .iter()
        .filter(|e| !e.text.trim().is_empty())
        .map(|e| {
            let r = analyze_text(&e.text);
            SentimentEntry {
                date: e.date,
                score: r.score,
                comparative: r.comparative,
                label: r.label,
            }
        })
        .collect();
    if scored.is_empty() {
        return SentimentTrend::default();
    }
    scored.sort_by_key(|e| e.date);

    let mid = scored.len() / 2;
    let (older, recent) = scored.split_at(mid);
    let recent_avg = mean_score(recent);
    let diff = recent_avg - mean_score(older);
    let trend = if diff > TREND_DELTA {
        Trend::Improving
    } else if diff < -TREND_DELTA {
        Trend::Declining
    } else {
        Trend::Stable
    };

    let dominant_mood = dominant_mood(&scored);
    let negative_streak = negative_streak(scored.iter().map(|e| e.label));

    let mut warning_signals = Vec::new();
    if negative_streak >= STREAK_WARNING {
        warning_signals.push(format!("{negative_streak} negative entries in a row"));
    }
    if trend == Trend::Declining {
        warning_signals.push("Emotional tone is getting worse".to_string());
    }
    if dominant_mood == SentimentLabel::Negative && scored.len() >= DOMINANCE_MIN_ENTRIES {
        warning_signals.push("Negative emotions dominate the diary".to_string());
    }
    if recent_avg < RECENT_TONE_FLOOR {
        warning_signals.push("Strongly negative tone in recent entries".to_string());
    }

    SentimentTrend {
        meta: module_meta(),
        average_score: round_dp(mean_score(&scored), 2),
        trend,
        recent_vs_previous: round_dp(diff, 2),
        dominant_mood,
        negative_streak,
        warning_signals,
        entries: scored,
    }
}
