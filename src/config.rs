//! Engine configuration. Supplied by the host process; the engine itself reads no environment.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Upper bound for `features.window_days`
pub const MAX_WINDOW_DAYS: u32 = 366;
/// Upper bound for `features.streak_lookback_days`
pub const MAX_STREAK_LOOKBACK_DAYS: u32 = 3650;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Path to the serialized tree-ensemble model (JSON)
    pub model_path: PathBuf,
    /// Feature builder windowing
    pub features: FeaturesConfig,
    /// Risk level thresholds on the 0-100 score
    pub risk: RiskConfig,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturesConfig {
    /// Trailing window for daily series and episode features
    pub window_days: u32,
    /// User's offset from UTC; drives local day buckets and night-hour detection
    pub utc_offset_minutes: i32,
    /// How far back the clean-streak scan goes
    pub streak_lookback_days: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Score at or above this is HIGH
    pub high_threshold: u8,
    /// Score at or above this is MEDIUM
    pub medium_threshold: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/relapse_model.json"),
            features: FeaturesConfig::default(),
            risk: RiskConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            window_days: 30,
            utc_offset_minutes: 0,
            streak_lookback_days: 365,
        }
    }
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            high_threshold: 60,
            medium_threshold: 30,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: true,
        }
    }
}

impl FeaturesConfig {
    /// Pull windowing values into the supported range; at least one day each.
    pub fn clamped(self) -> Self {
        Self {
            window_days: self.window_days.clamp(1, MAX_WINDOW_DAYS),
            streak_lookback_days: self.streak_lookback_days.clamp(1, MAX_STREAK_LOOKBACK_DAYS),
            ..self
        }
    }
}

impl EngineConfig {
    /// Load from JSON file if present; otherwise return default
    pub fn load(path: &std::path::Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(data) => match serde_json::from_str::<EngineConfig>(&data) {
                Ok(mut c) => {
                    let features = c.features.clone().clamped();
                    if features.window_days != c.features.window_days
                        || features.streak_lookback_days != c.features.streak_lookback_days
                    {
                        tracing::warn!(
                            path = %path.display(),
                            window_days = features.window_days,
                            streak_lookback_days = features.streak_lookback_days,
                            "feature windows out of range; clamped"
                        );
                    }
                    c.features = features;
                    c
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "invalid engine config; using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable engine config; using defaults");
                Self::default()
            }
        }
    }
}
