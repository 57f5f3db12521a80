//! Feature builder: event snapshot → behavioral features, daily/hourly series, diary texts.

use super::BehavioralFeatures;
use crate::anomaly::{BehaviorSeries, DataPoint};
use crate::config::FeaturesConfig;
use crate::events::{BehaviorSnapshot, DiaryEntry, EpisodeRecord};
use crate::math::is_night_hour;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Offset, Timelike, Utc};
use std::collections::{HashMap, HashSet};

const DEFAULT_MOOD: f64 = 3.0;
/// Spending ratio reported when only the recent week has spend
const NEW_SPENDING_RATIO: f64 = 2.0;

/// Everything the four analysis modules need, derived from one snapshot
#[derive(Debug, Clone)]
pub struct FeatureSet {
    pub features: BehavioralFeatures,
    pub series: BehaviorSeries,
    /// Non-blank diary entries, oldest first
    pub diary: Vec<DiaryEntry>,
}

pub struct FeatureBuilder {
    config: FeaturesConfig,
    offset: FixedOffset,
}

fn mean_spend(episodes: &[&EpisodeRecord]) -> f64 {
    if episodes.is_empty() {
        return 0.0;
    }
    episodes.iter().map(|e| e.spend()).sum::<f64>() / episodes.len() as f64
}

impl FeatureBuilder {
    pub fn new(config: FeaturesConfig) -> Self {
        let config = config.clamped();
        let offset = FixedOffset::east_opt(config.utc_offset_minutes.saturating_mul(60))
            .unwrap_or_else(|| Utc.fix());
        Self { config, offset }
    }

    fn local_date(&self, ts: DateTime<Utc>) -> NaiveDate {
        ts.with_timezone(&self.offset).date_naive()
    }

    fn local_hour(&self, ts: DateTime<Utc>) -> u32 {
        ts.with_timezone(&self.offset).hour()
    }

    /// Derive the full feature set. Pure: the same snapshot always yields the same output.
    pub fn build(&self, snapshot: &BehaviorSnapshot) -> FeatureSet {
        let now = snapshot.now;
        let window_start = now - Duration::days(i64::from(self.config.window_days));
        let week_ago = now - Duration::days(7);
        let two_weeks_ago = now - Duration::days(14);

        let episodes: Vec<&EpisodeRecord> = snapshot
            .episodes
            .iter()
            .filter(|e| e.date >= window_start && e.date <= now)
            .collect();
        let last7: Vec<&EpisodeRecord> = episodes
            .iter()
            .copied()
            .filter(|e| e.date >= week_ago)
            .collect();
        let prev7: Vec<&EpisodeRecord> = episodes
            .iter()
            .copied()
            .filter(|e| e.date >= two_weeks_ago && e.date < week_ago)
            .collect();

        let avg_last = mean_spend(&last7);
        let avg_prev = mean_spend(&prev7);
        let spending_trend = if avg_prev > 0.0 {
            avg_last / avg_prev
        } else if avg_last > 0.0 {
            NEW_SPENDING_RATIO
        } else {
            0.0
        };

        let moods: Vec<f64> = episodes
            .iter()
            .filter_map(|e| e.mood_before.map(|m| m.score()))
            .collect();
        let mood_score = if moods.is_empty() {
            DEFAULT_MOOD
        } else {
            moods.iter().sum::<f64>() / moods.len() as f64
        };

        let night = episodes
            .iter()
            .filter(|e| is_night_hour(self.local_hour(e.date)))
            .count();
        let night_activity_ratio = if episodes.is_empty() {
            0.0
        } else {
            night as f64 / episodes.len() as f64
        };

        let mut triggers: Vec<String> = Vec::new();
        for t in episodes.iter().flat_map(|e| e.triggers.iter()) {
            if !triggers.contains(t) {
                triggers.push(t.clone());
            }
        }

        let blocks7: Vec<_> = snapshot
            .block_events
            .iter()
            .filter(|b| b.timestamp >= week_ago && b.timestamp <= now)
            .collect();
        let distinct_domains: HashSet<&str> = blocks7.iter().map(|b| b.domain.as_str()).collect();

        let features = BehavioralFeatures {
            episode_frequency: last7.len() as u32,
            spending_trend,
            mood_score,
            night_activity_ratio,
            trigger_diversity: triggers.len() as u32,
            streak_days: self.streak_days(snapshot, &episodes),
            episodes_prev7: Some(prev7.len() as u32),
            unlock_attempts7: Some(blocks7.len() as u32),
            blocked_sites7: Some(distinct_domains.len() as u32),
            total_episodes30: Some(episodes.len() as u32),
            triggers,
        }
        .sanitized();

        let series = self.series(snapshot, &episodes);

        let mut diary: Vec<DiaryEntry> = snapshot
            .diary
            .iter()
            .filter(|d| !d.text.trim().is_empty())
            .cloned()
            .collect();
        diary.sort_by_key(|d| d.date);

        tracing::debug!(
            episodes = episodes.len(),
            diary = diary.len(),
            blocks = snapshot.block_events.len(),
            streak_days = features.streak_days,
            "features built"
        );

        FeatureSet {
            features,
            series,
            diary,
        }
    }

    /// Clean local days counting back from today. With no episodes in the window the
    /// streak runs from account creation.
    fn streak_days(&self, snapshot: &BehaviorSnapshot, episodes: &[&EpisodeRecord]) -> u32 {
        if episodes.is_empty() {
            if let Some(created) = snapshot.account_created_at {
                let days = (snapshot.now - created).num_days().max(0);
                return u32::try_from(days).unwrap_or(u32::MAX);
            }
        }
        let episode_days: HashSet<NaiveDate> =
            episodes.iter().map(|e| self.local_date(e.date)).collect();
        let today = self.local_date(snapshot.now);
        let mut streak = 0;
        for i in 0..self.config.streak_lookback_days {
            let day = today - Duration::days(i64::from(i));
            if episode_days.contains(&day) {
                break;
            }
            streak += 1;
        }
        streak
    }

    fn series(&self, snapshot: &BehaviorSnapshot, episodes: &[&EpisodeRecord]) -> BehaviorSeries {
        let today = self.local_date(snapshot.now);
        let days: Vec<NaiveDate> = (0..self.config.window_days)
            .rev()
            .map(|i| today - Duration::days(i64::from(i)))
            .collect();
        let index: HashMap<NaiveDate, usize> =
            days.iter().enumerate().map(|(i, d)| (*d, i)).collect();

        let mut spending = vec![0.0; days.len()];
        let mut counts = vec![0.0; days.len()];
        let mut blocks = vec![0.0; days.len()];
        let mut hourly = [0.0; 24];

        for e in episodes {
            if let Some(&i) = index.get(&self.local_date(e.date)) {
                spending[i] += e.spend();
                counts[i] += 1.0;
            }
            hourly[self.local_hour(e.date) as usize] += 1.0;
        }
        for b in snapshot.block_events.iter().filter(|b| b.timestamp <= snapshot.now) {
            if let Some(&i) = index.get(&self.local_date(b.timestamp)) {
                blocks[i] += 1.0;
            }
        }

        let daily = |values: &[f64]| -> Vec<DataPoint> {
            days.iter()
                .zip(values)
                .map(|(d, v)| DataPoint::new(d.format("%Y-%m-%d").to_string(), *v))
                .collect()
        };

        BehaviorSeries {
            daily_spending: daily(&spending),
            daily_episodes: daily(&counts),
            hourly_activity: hourly
                .iter()
                .enumerate()
                .map(|(h, v)| DataPoint::hour(h as u32, *v))
                .collect(),
            block_attempts: daily(&blocks),
        }
    }
}
