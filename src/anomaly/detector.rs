//! Per-series z-scores, severity classification, time-pattern analysis and alert synthesis.

use super::{
    AnomalyReport, AnomalyResult, AnomalyRisk, AnomalySummary, BehaviorSeries, DataPoint,
    SeriesReport, SeriesStats, Severity, TimePatterns,
};
use crate::math::{is_night_hour, mean, round_dp, sample_std_dev};
use crate::meta::ModuleMeta;

/// |z| at or above this is a warning (and counts as an anomaly)
pub const Z_WARNING: f64 = 1.5;
/// |z| at or above this is critical
pub const Z_CRITICAL: f64 = 2.5;

/// Fewer points than this are returned unclassified
const MIN_POINTS: usize = 3;
const NIGHT_RATIO_ALERT: f64 = 0.4;
const ESCALATION_MIN_POINTS: usize = 7;
const ESCALATION_RECENT_DAYS: usize = 3;
const ESCALATION_FACTOR: f64 = 2.0;

impl Severity {
    pub fn from_z(z: f64) -> Self {
        let abs = z.abs();
        if abs >= Z_CRITICAL {
            Severity::Critical
        } else if abs >= Z_WARNING {
            Severity::Warning
        } else {
            Severity::Normal
        }
    }
}

fn z_score(value: f64, avg: f64, sd: f64) -> f64 {
    if sd == 0.0 {
        return 0.0;
    }
    (value - avg) / sd
}

/// Classify every point of one series against that series' own mean and sample std-dev.
pub fn detect_anomalies(data: &[DataPoint]) -> Vec<AnomalyResult> {
    if data.len() < MIN_POINTS {
        return data
            .iter()
            .map(|d| AnomalyResult {
                point: d.clone(),
                z_score: 0.0,
                is_anomaly: false,
                severity: Severity::Normal,
            })
            .collect();
    }

    let values: Vec<f64> = data.iter().map(|d| d.value).collect();
    let avg = mean(&values);
    let sd = sample_std_dev(&values);

    data.iter()
        .map(|d| {
            let z = z_score(d.value, avg, sd);
            AnomalyResult {
                point: d.clone(),
                z_score: round_dp(z, 2),
                is_anomaly: z.abs() >= Z_WARNING,
                severity: Severity::from_z(z),
            }
        })
        .collect()
}

fn series_stats(data: &[DataPoint], places: i32) -> SeriesStats {
    let values: Vec<f64> = data.iter().map(|d| d.value).collect();
    SeriesStats {
        mean: round_dp(mean(&values), places),
        std_dev: round_dp(sample_std_dev(&values), places),
        total: round_dp(values.iter().sum(), places),
    }
}

fn positive_anomalies(results: &[AnomalyResult]) -> impl Iterator<Item = &AnomalyResult> {
    results.iter().filter(|r| r.is_anomaly && r.z_score > 0.0)
}

/// Hour bucket with the highest count; the earliest bucket wins ties.
fn peak_hour(hourly: &[DataPoint]) -> Option<u32> {
    let first = hourly.first()?;
    let peak = hourly
        .iter()
        .fold(first, |max, d| if d.value > max.value { d } else { max });
    peak.hour_of_day()
}

fn night_ratio(hourly: &[DataPoint]) -> f64 {
    let total: f64 = hourly.iter().map(|d| d.value).sum();
    if total <= 0.0 {
        return 0.0;
    }
    let night: f64 = hourly
        .iter()
        .filter(|d| d.hour_of_day().is_some_and(is_night_hour))
        .map(|d| d.value)
        .sum();
    round_dp(night / total, 2)
}

/// Mean of the last three days against the mean of everything before them.
fn spending_escalated(daily_spending: &[DataPoint]) -> bool {
    if daily_spending.len() < ESCALATION_MIN_POINTS {
        return false;
    }
    let split = daily_spending.len() - ESCALATION_RECENT_DAYS;
    let earlier: Vec<f64> = daily_spending[..split].iter().map(|d| d.value).collect();
    let recent: Vec<f64> = daily_spending[split..].iter().map(|d| d.value).collect();
    let recent_avg = mean(&recent);
    recent_avg > mean(&earlier) * ESCALATION_FACTOR && recent_avg > 0.0
}

fn synthesize_alerts(
    spending: &[AnomalyResult],
    episodes: &[AnomalyResult],
    blocks: &[AnomalyResult],
    night_ratio: f64,
    daily_spending: &[DataPoint],
) -> Vec<String> {
    let mut alerts = Vec::new();

    let worst_spend = positive_anomalies(spending).fold(None::<&AnomalyResult>, |worst, r| {
        match worst {
            Some(w) if w.z_score >= r.z_score => Some(w),
            _ => Some(r),
        }
    });
    if let Some(worst) = worst_spend {
        let tag = if worst.severity == Severity::Critical {
            "critical"
        } else {
            "warning"
        };
        alerts.push(format!(
            "Anomalously high spending on {}: z-score {} ({})",
            worst.point.key, worst.z_score, tag
        ));
    }

    let episode_days = positive_anomalies(episodes).count();
    if episode_days > 0 {
        alerts.push(format!(
            "Episode spike detected ({} anomalous days)",
            episode_days
        ));
    }

    let block_days = positive_anomalies(blocks).count();
    if block_days > 0 {
        alerts.push(format!(
            "Rising attempts to reach blocked sites ({} anomalous days)",
            block_days
        ));
    }

    if night_ratio > NIGHT_RATIO_ALERT {
        alerts.push(format!(
            "{}% of activity happens at night (22:00-06:00)",
            (night_ratio * 100.0).round()
        ));
    }

    if spending_escalated(daily_spending) {
        alerts.push(
            "Spending over the last 3 days is more than twice the earlier average: possible escalation"
                .to_string(),
        );
    }

    alerts
}

fn overall_risk(critical: usize, warning: usize, alerts: usize) -> AnomalyRisk {
    if critical >= 2 || alerts >= 3 {
        AnomalyRisk::High
    } else if critical >= 1 || warning >= 2 || alerts >= 2 {
        AnomalyRisk::Moderate
    } else {
        AnomalyRisk::Low
    }
}

pub fn module_meta() -> ModuleMeta {
    ModuleMeta::new("anomaly_detector", "z-score over daily and hourly series, sample std-dev")
        .with_thresholds(Z_WARNING, Z_CRITICAL)
}

/// Run the detector over all four series and summarize.
pub fn analyze_anomalies(series: &BehaviorSeries) -> AnomalyReport {
    let spending = detect_anomalies(&series.daily_spending);
    let episodes = detect_anomalies(&series.daily_episodes);
    let hours = detect_anomalies(&series.hourly_activity);
    let blocks = detect_anomalies(&series.block_attempts);

    let night_ratio = night_ratio(&series.hourly_activity);
    let peak_hour = peak_hour(&series.hourly_activity);

    let flagged: Vec<&AnomalyResult> = spending
        .iter()
        .chain(&episodes)
        .chain(&hours)
        .chain(&blocks)
        .filter(|r| r.is_anomaly)
        .collect();
    let critical_count = flagged
        .iter()
        .filter(|r| r.severity == Severity::Critical)
        .count();
    let warning_count = flagged
        .iter()
        .filter(|r| r.severity == Severity::Warning)
        .count();

    let alerts = synthesize_alerts(
        &spending,
        &episodes,
        &blocks,
        night_ratio,
        &series.daily_spending,
    );

    let summary = AnomalySummary {
        total_anomalies: flagged.len(),
        critical_count,
        warning_count,
        overall_risk: overall_risk(critical_count, warning_count, alerts.len()),
        alerts,
    };

    AnomalyReport {
        meta: module_meta(),
        spending: SeriesReport {
            stats: series_stats(&series.daily_spending, 0),
            anomalies: spending,
        },
        episodes: SeriesReport {
            stats: series_stats(&series.daily_episodes, 2),
            anomalies: episodes,
        },
        time_patterns: TimePatterns {
            anomalies: hours,
            peak_hour,
            night_ratio,
        },
        block_attempts: SeriesReport {
            stats: series_stats(&series.block_attempts, 2),
            anomalies: blocks,
        },
        summary,
    }
}
