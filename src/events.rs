//! Raw behavioral events: self-reported gambling episodes, diary text, site-block attempts.
//! The caller windows these (typically the last 30 days) before handing them to the engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One user's event window at a point in time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorSnapshot {
    /// Reference instant; all trailing windows end here
    pub now: DateTime<Utc>,
    /// Used for the clean streak when the window holds no episodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub episodes: Vec<EpisodeRecord>,
    #[serde(default)]
    pub diary: Vec<DiaryEntry>,
    #[serde(default)]
    pub block_events: Vec<BlockEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeRecord {
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood_before: Option<Mood>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood_after: Option<Mood>,
    #[serde(default)]
    pub triggers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
}

/// Five-point ordinal mood scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Terrible,
    Bad,
    Neutral,
    Good,
    Great,
}

impl Mood {
    pub fn score(self) -> f64 {
        match self {
            Mood::Terrible => 1.0,
            Mood::Bad => 2.0,
            Mood::Neutral => 3.0,
            Mood::Good => 4.0,
            Mood::Great => 5.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiaryEntry {
    pub date: DateTime<Utc>,
    pub text: String,
}

/// Blocked-site hit reported by the browser extension
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockEvent {
    pub timestamp: DateTime<Utc>,
    pub domain: String,
}

impl EpisodeRecord {
    pub fn new(date: DateTime<Utc>, amount: f64) -> Self {
        Self {
            date,
            amount,
            duration_minutes: None,
            mood_before: None,
            mood_after: None,
            triggers: Vec::new(),
            platform: None,
        }
    }

    pub fn with_mood(mut self, mood: Mood) -> Self {
        self.mood_before = Some(mood);
        self
    }

    pub fn with_triggers<I, S>(mut self, triggers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.triggers = triggers.into_iter().map(Into::into).collect();
        self
    }

    /// Amount with non-finite and negative values treated as zero
    pub fn spend(&self) -> f64 {
        if self.amount.is_finite() && self.amount > 0.0 {
            self.amount
        } else {
            0.0
        }
    }
}

impl BehaviorSnapshot {
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            now,
            account_created_at: None,
            episodes: Vec::new(),
            diary: Vec::new(),
            block_events: Vec::new(),
        }
    }
}
