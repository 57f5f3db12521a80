//! Behavioral feature set consumed by inference and archetype classification, plus the
//! typed names the model artifact uses to declare its column order.

use serde::{Deserialize, Serialize};

/// Trigger tags above this count add nothing to the model input
pub const TRIGGER_DIVERSITY_CAP: u32 = 6;

/// Spending ratio above which the model sees `financial_escalation = 1`
pub const FINANCIAL_ESCALATION_RATIO: f64 = 1.2;

/// Mood scale bounds (1 = terrible, 5 = great)
pub const MOOD_MIN: f64 = 1.0;
pub const MOOD_MAX: f64 = 5.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BehavioralFeatures {
    /// Episodes in the trailing 7 days
    pub episode_frequency: u32,
    /// Last-7-day mean spend over prior-7-day mean spend
    pub spending_trend: f64,
    /// Mean mood before episodes, 1-5
    pub mood_score: f64,
    /// Fraction of episodes at night (22:00-06:00 local)
    pub night_activity_ratio: f64,
    /// Distinct trigger tags, uncapped
    pub trigger_diversity: u32,
    /// Consecutive clean days
    pub streak_days: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episodes_prev7: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlock_attempts7: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_sites7: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_episodes30: Option<u32>,
    /// Distinct trigger tags, for the emotional-trigger check
    #[serde(default)]
    pub triggers: Vec<String>,
}

impl Default for BehavioralFeatures {
    fn default() -> Self {
        Self {
            episode_frequency: 0,
            spending_trend: 0.0,
            mood_score: 3.0,
            night_activity_ratio: 0.0,
            trigger_diversity: 0,
            streak_days: 0,
            episodes_prev7: None,
            unlock_attempts7: None,
            blocked_sites7: None,
            total_episodes30: None,
            triggers: Vec::new(),
        }
    }
}

impl BehavioralFeatures {
    /// Replace NaN/Infinity with the documented defaults and pull floats into range.
    /// Mood lands on the 1-5 scale.
    pub fn sanitized(mut self) -> Self {
        self.spending_trend = finite_non_negative(self.spending_trend, 0.0);
        self.mood_score = if self.mood_score.is_finite() {
            self.mood_score.clamp(MOOD_MIN, MOOD_MAX)
        } else {
            3.0
        };
        self.night_activity_ratio = finite_non_negative(self.night_activity_ratio, 0.0).min(1.0);
        self
    }

    pub fn financial_escalation(&self) -> bool {
        self.spending_trend > FINANCIAL_ESCALATION_RATIO
    }

    /// Raw model input for one feature, applying defaults for absent extended fields.
    pub fn value(&self, name: FeatureName) -> f64 {
        match name {
            FeatureName::StreakDays => self.streak_days as f64,
            FeatureName::EpisodesLast7 => self.episode_frequency as f64,
            FeatureName::EpisodesPrev7 => {
                self.episodes_prev7.unwrap_or(self.episode_frequency) as f64
            }
            FeatureName::AvgMoodBefore => self.mood_score,
            FeatureName::NightActivityRatio => self.night_activity_ratio,
            FeatureName::TriggerCount => self.trigger_diversity.min(TRIGGER_DIVERSITY_CAP) as f64,
            FeatureName::FinancialEscalation => {
                if self.financial_escalation() {
                    1.0
                } else {
                    0.0
                }
            }
            FeatureName::UnlockAttempts7 => self.unlock_attempts7.unwrap_or(0) as f64,
            FeatureName::BlockedSites7 => self.blocked_sites7.unwrap_or(0) as f64,
            FeatureName::TotalEpisodes30 => self
                .total_episodes30
                .unwrap_or(self.episode_frequency.saturating_mul(4))
                as f64,
        }
    }
}

fn finite_non_negative(v: f64, fallback: f64) -> f64 {
    if v.is_finite() && v >= 0.0 {
        v
    } else {
        fallback
    }
}

/// Model input columns. The artifact's `meta.features` decides their order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FeatureName {
    #[serde(rename = "streak_days")]
    StreakDays,
    #[serde(rename = "episodes_last_7")]
    EpisodesLast7,
    #[serde(rename = "episodes_prev_7")]
    EpisodesPrev7,
    #[serde(rename = "avg_mood_before")]
    AvgMoodBefore,
    #[serde(rename = "night_activity_ratio")]
    NightActivityRatio,
    #[serde(rename = "trigger_count")]
    TriggerCount,
    #[serde(rename = "financial_escalation")]
    FinancialEscalation,
    #[serde(rename = "unlock_attempts_7")]
    UnlockAttempts7,
    #[serde(rename = "blocked_sites_7")]
    BlockedSites7,
    #[serde(rename = "total_episodes_30")]
    TotalEpisodes30,
}

impl FeatureName {
    pub const COUNT: usize = 10;

    pub const ALL: [FeatureName; Self::COUNT] = [
        FeatureName::StreakDays,
        FeatureName::EpisodesLast7,
        FeatureName::EpisodesPrev7,
        FeatureName::AvgMoodBefore,
        FeatureName::NightActivityRatio,
        FeatureName::TriggerCount,
        FeatureName::FinancialEscalation,
        FeatureName::UnlockAttempts7,
        FeatureName::BlockedSites7,
        FeatureName::TotalEpisodes30,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FeatureName::StreakDays => "streak_days",
            FeatureName::EpisodesLast7 => "episodes_last_7",
            FeatureName::EpisodesPrev7 => "episodes_prev_7",
            FeatureName::AvgMoodBefore => "avg_mood_before",
            FeatureName::NightActivityRatio => "night_activity_ratio",
            FeatureName::TriggerCount => "trigger_count",
            FeatureName::FinancialEscalation => "financial_escalation",
            FeatureName::UnlockAttempts7 => "unlock_attempts_7",
            FeatureName::BlockedSites7 => "blocked_sites_7",
            FeatureName::TotalEpisodes30 => "total_episodes_30",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }

    /// Human-readable label for explanations
    pub fn label(self) -> &'static str {
        match self {
            FeatureName::StreakDays => "Clean streak",
            FeatureName::EpisodesLast7 => "Episodes in the last 7 days",
            FeatureName::EpisodesPrev7 => "Episodes in the previous 7 days",
            FeatureName::AvgMoodBefore => "Mood before episodes",
            FeatureName::NightActivityRatio => "Night activity",
            FeatureName::TriggerCount => "Trigger diversity",
            FeatureName::FinancialEscalation => "Spending escalation",
            FeatureName::UnlockAttempts7 => "Blocked-site attempts",
            FeatureName::BlockedSites7 => "Distinct blocked sites",
            FeatureName::TotalEpisodes30 => "Episodes in the last 30 days",
        }
    }

    /// Value at which the display normalization saturates
    pub fn display_scale(self) -> f64 {
        match self {
            FeatureName::StreakDays => 90.0,
            FeatureName::EpisodesLast7 | FeatureName::EpisodesPrev7 => 7.0,
            FeatureName::AvgMoodBefore => 5.0,
            FeatureName::NightActivityRatio | FeatureName::FinancialEscalation => 1.0,
            FeatureName::TriggerCount => 6.0,
            FeatureName::UnlockAttempts7 => 20.0,
            FeatureName::BlockedSites7 => 50.0,
            FeatureName::TotalEpisodes30 => 30.0,
        }
    }

    /// Higher raw value means lower risk
    pub fn is_protective(self) -> bool {
        matches!(self, FeatureName::StreakDays | FeatureName::AvgMoodBefore)
    }

    /// Raw value mapped into [0, 1] in the risk direction
    pub fn normalize(self, raw: f64) -> f64 {
        let n = (raw / self.display_scale()).clamp(0.0, 1.0);
        if self.is_protective() {
            1.0 - n
        } else {
            n
        }
    }
}

impl std::fmt::Display for FeatureName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
