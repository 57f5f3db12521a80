//! Z-score anomaly detection over daily and hourly behavior aggregates.

mod detector;

pub use detector::{analyze_anomalies, detect_anomalies, module_meta, Z_CRITICAL, Z_WARNING};

use crate::meta::ModuleMeta;
use serde::{Deserialize, Serialize};

/// One observation: a day (`YYYY-MM-DD`) or an hour bucket (`"0"`..`"23"`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    #[serde(rename = "date")]
    pub key: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl DataPoint {
    pub fn new(key: impl Into<String>, value: f64) -> Self {
        Self {
            key: key.into(),
            value,
            label: None,
        }
    }

    pub fn hour(hour: u32, value: f64) -> Self {
        Self {
            key: hour.to_string(),
            value,
            label: Some(hour.to_string()),
        }
    }

    /// Hour of day for hourly buckets (label first, then key)
    pub fn hour_of_day(&self) -> Option<u32> {
        self.label
            .as_deref()
            .unwrap_or(&self.key)
            .trim()
            .parse()
            .ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Normal,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyResult {
    #[serde(flatten)]
    pub point: DataPoint,
    pub z_score: f64,
    pub is_anomaly: bool,
    pub severity: Severity,
}

/// The four series the detector inspects, all over the same trailing window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BehaviorSeries {
    pub daily_spending: Vec<DataPoint>,
    pub daily_episodes: Vec<DataPoint>,
    /// 24 hour-of-day buckets
    pub hourly_activity: Vec<DataPoint>,
    pub block_attempts: Vec<DataPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesStats {
    pub mean: f64,
    pub std_dev: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesReport {
    pub anomalies: Vec<AnomalyResult>,
    pub stats: SeriesStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimePatterns {
    pub anomalies: Vec<AnomalyResult>,
    pub peak_hour: Option<u32>,
    pub night_ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyRisk {
    Low,
    Moderate,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalySummary {
    pub total_anomalies: usize,
    pub critical_count: usize,
    pub warning_count: usize,
    pub overall_risk: AnomalyRisk,
    pub alerts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub meta: ModuleMeta,
    pub spending: SeriesReport,
    pub episodes: SeriesReport,
    pub time_patterns: TimePatterns,
    pub block_attempts: SeriesReport,
    pub summary: AnomalySummary,
}
