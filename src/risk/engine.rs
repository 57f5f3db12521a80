//! Risk level thresholds and the aggregator that runs the four analysis modules side by side.

use super::assessment::{CombinedRisk, InferenceOutput, Module, ModuleFailure, RiskAssessment};
use crate::anomaly::analyze_anomalies;
use crate::archetype::get_behavioral_archetype;
use crate::config::{EngineConfig, RiskConfig};
use crate::error::ModelError;
use crate::events::BehaviorSnapshot;
use crate::features::{BehavioralFeatures, FeatureBuilder, FeatureSet};
use crate::model::{ModelCache, Prediction};
use crate::sentiment::analyze_trend;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinError;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_score(score: u8, config: &RiskConfig) -> Self {
        if score >= config.high_threshold {
            RiskLevel::High
        } else if score >= config.medium_threshold {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

pub struct RiskEngine {
    config: EngineConfig,
    cache: Arc<ModelCache>,
    builder: FeatureBuilder,
}

fn join_failure(e: JoinError) -> String {
    if e.is_panic() {
        let payload = e.into_panic();
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        format!("panicked: {message}")
    } else {
        "task cancelled".to_string()
    }
}

/// Run one module on the blocking pool. A panic or an error becomes a `ModuleFailure`
/// and never reaches the other modules.
async fn run_isolated<T, F>(module: Module, task: F) -> Result<T, ModuleFailure>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, String> + Send + 'static,
{
    let outcome = match tokio::task::spawn_blocking(task).await {
        Ok(result) => result,
        Err(e) => Err(join_failure(e)),
    };
    match outcome {
        Ok(value) => {
            debug!(module = %module, "module finished");
            Ok(value)
        }
        Err(reason) => {
            warn!(module = %module, reason = %reason, "module failed; omitted from assessment");
            Err(ModuleFailure { module, reason })
        }
    }
}

fn keep<T>(result: Result<T, ModuleFailure>, failures: &mut Vec<ModuleFailure>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(failure) => {
            failures.push(failure);
            None
        }
    }
}

impl RiskEngine {
    /// Engine backed by the process-wide model cache
    pub fn new(config: EngineConfig) -> Self {
        Self::with_cache(config, ModelCache::shared())
    }

    pub fn with_cache(config: EngineConfig, cache: Arc<ModelCache>) -> Self {
        let builder = FeatureBuilder::new(config.features.clone());
        Self {
            config,
            cache,
            builder,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Tree-ensemble prediction alone, loading the model on first use.
    pub fn predict(&self, features: &BehavioralFeatures) -> Result<Prediction, ModelError> {
        let model = self.cache.get_or_load(&self.config.model_path)?;
        Ok(model.predict(&features.clone().sanitized(), &self.config.risk))
    }

    /// Build features from `snapshot`, run inference, anomaly detection, sentiment and
    /// archetype classification concurrently, and assemble one assessment. A failing
    /// module is reported in `failed_modules` while the others still contribute.
    pub async fn assess(&self, snapshot: &BehaviorSnapshot) -> RiskAssessment {
        let assessment_id = uuid::Uuid::new_v4().to_string();
        let FeatureSet {
            features,
            series,
            diary,
        } = self.builder.build(snapshot);
        let features = Arc::new(features);

        let inference = {
            let cache = Arc::clone(&self.cache);
            let path = self.config.model_path.clone();
            let thresholds = self.config.risk.clone();
            let features = Arc::clone(&features);
            run_isolated(Module::Inference, move || {
                let model = cache.get_or_load(&path).map_err(|e| e.to_string())?;
                Ok(InferenceOutput {
                    meta: InferenceOutput::module_meta(&model.meta, &thresholds),
                    prediction: model.predict(&features, &thresholds),
                    input_features: (*features).clone(),
                })
            })
        };
        let anomalies = run_isolated(Module::Anomalies, move || Ok(analyze_anomalies(&series)));
        let sentiment = run_isolated(Module::Sentiment, move || Ok(analyze_trend(&diary)));
        let archetype = {
            let features = Arc::clone(&features);
            run_isolated(Module::Archetype, move || Ok(get_behavioral_archetype(&features)))
        };

        let (inference, anomalies, sentiment, archetype) =
            tokio::join!(inference, anomalies, sentiment, archetype);

        let mut failed_modules = Vec::new();
        let inference = keep(inference, &mut failed_modules);
        let anomalies = keep(anomalies, &mut failed_modules);
        let sentiment = keep(sentiment, &mut failed_modules);
        let archetype = keep(archetype, &mut failed_modules);

        let combined_risk = CombinedRisk::from_parts(
            inference.as_ref(),
            anomalies.as_ref(),
            sentiment.as_ref(),
            archetype.as_ref(),
        );

        info!(
            assessment_id = %assessment_id,
            risk_score = ?combined_risk.risk_score,
            anomaly_risk = ?combined_risk.anomaly_risk,
            warnings = combined_risk.all_warnings.len(),
            failed = failed_modules.len(),
            "assessment complete"
        );

        RiskAssessment {
            assessment_id,
            generated_at: snapshot.now,
            inference,
            anomalies,
            sentiment,
            archetype,
            combined_risk,
            failed_modules,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{DiaryEntry, EpisodeRecord, Mood};
    use crate::model::SerializedModel;
    use chrono::{Duration, TimeZone, Utc};

    // Two stumps: few clean days → short horizon; any recent episode → high relapse odds.
    const MODEL: &str = r#"{
        "meta": {"name": "stub", "version": "0.1.0",
                 "features": ["streak_days", "episodes_last_7", "avg_mood_before"]},
        "regressor": {"init_prediction": 10.0, "learning_rate": 1.0, "trees": [
            {"left_child": [1, -1, -1], "right_child": [2, -1, -1], "feature": [0, -2, -2],
             "threshold": [6.5, -2, -2], "value": [0, -9.0, 20.0]}
        ]},
        "classifier": {"init_log_odds": 0.0, "learning_rate": 1.0, "trees": [
            {"left_child": [1, -1, -1], "right_child": [2, -1, -1], "feature": [1, -2, -2],
             "threshold": [0.5, -2, -2], "value": [0, -2.0, 1.5]}
        ]},
        "feature_importance": {"regressor": {"streak_days": 0.6, "episodes_last_7": 0.3, "avg_mood_before": 0.1}}
    }"#;

    fn engine() -> RiskEngine {
        let cache = Arc::new(ModelCache::preloaded(SerializedModel::from_json(MODEL).unwrap()));
        RiskEngine::with_cache(EngineConfig::default(), cache)
    }

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 30, 18, 0, 0).unwrap()
    }

    #[test]
    fn level_boundaries() {
        let c = RiskConfig::default();
        assert_eq!(RiskLevel::from_score(0, &c), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(29, &c), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(30, &c), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(59, &c), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(60, &c), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(100, &c), RiskLevel::High);
    }

    #[test]
    fn level_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&RiskLevel::Medium).unwrap(), "\"MEDIUM\"");
    }

    #[test]
    fn direct_prediction() {
        let p = engine()
            .predict(&BehavioralFeatures {
                streak_days: 2,
                episode_frequency: 2,
                ..Default::default()
            })
            .unwrap();
        // raw 1 → day 1 → score 100
        assert_eq!(p.days_until_relapse, 1);
        assert_eq!(p.risk_score, 100);
        assert_eq!(p.risk_level, RiskLevel::High);
        assert_eq!(p.relapse_probability, 0.818);
    }

    #[tokio::test]
    async fn recent_relapse_is_high_risk() {
        let now = now();
        let mut snapshot = BehaviorSnapshot::empty(now);
        snapshot.episodes = vec![
            EpisodeRecord::new(now - Duration::days(1), 0.0)
                .with_mood(Mood::Bad)
                .with_triggers(["stress"]),
            EpisodeRecord::new(now - Duration::days(3), 0.0).with_mood(Mood::Terrible),
        ];
        snapshot.diary = vec![DiaryEntry {
            date: now - Duration::hours(2),
            text: "ужасно, проиграл всё".into(),
        }];

        let a = engine().assess(&snapshot).await;
        assert!(a.is_complete());
        assert_eq!(a.combined_risk.risk_level, Some(RiskLevel::High));
        assert_eq!(a.combined_risk.days_until_relapse, Some(1));
        assert_eq!(
            a.archetype.as_ref().map(|r| r.archetype),
            Some(crate::archetype::Archetype::EmotionalGambler)
        );
        // streak_days (0.6 × 1.0) is the one high-impact feature
        assert_eq!(a.combined_risk.all_warnings[0], "ML model: high contribution from Clean streak");
        assert!(a
            .combined_risk
            .all_warnings
            .iter()
            .any(|w| w.starts_with("Sentiment: ")));
    }

    #[tokio::test]
    async fn every_module_output_carries_meta() {
        let a = engine().assess(&BehaviorSnapshot::empty(now())).await;

        let inference = &a.inference.as_ref().unwrap().meta;
        assert_eq!(inference.name, "stub");
        assert_eq!(inference.version, "0.1.0");
        assert_eq!(inference.warning_threshold, Some(30.0));
        assert_eq!(inference.critical_threshold, Some(60.0));

        let anomalies = &a.anomalies.as_ref().unwrap().meta;
        assert_eq!(anomalies.name, "anomaly_detector");
        assert_eq!(anomalies.warning_threshold, Some(1.5));
        assert_eq!(anomalies.critical_threshold, Some(2.5));

        let sentiment = &a.sentiment.as_ref().unwrap().meta;
        assert!(sentiment.lexicon.as_deref().unwrap().contains("AFINN-165"));

        assert_eq!(a.archetype.as_ref().unwrap().meta.name, "archetype_classifier");
    }

    #[tokio::test]
    async fn oversized_feature_windows_still_assess() {
        let config = EngineConfig {
            features: crate::config::FeaturesConfig {
                window_days: u32::MAX,
                streak_lookback_days: u32::MAX,
                ..Default::default()
            },
            ..Default::default()
        };
        let cache = Arc::new(ModelCache::preloaded(SerializedModel::from_json(MODEL).unwrap()));
        let engine = RiskEngine::with_cache(config, cache);

        let a = engine.assess(&BehaviorSnapshot::empty(now())).await;
        assert!(a.is_complete());
        assert_eq!(
            a.inference.unwrap().input_features.streak_days,
            crate::config::MAX_STREAK_LOOKBACK_DAYS
        );
    }

    #[tokio::test]
    async fn missing_model_only_fails_inference() {
        let config = EngineConfig {
            model_path: "no/such/model.json".into(),
            ..Default::default()
        };
        let engine = RiskEngine::with_cache(config, Arc::new(ModelCache::new()));
        let a = engine.assess(&BehaviorSnapshot::empty(now())).await;

        assert!(a.inference.is_none());
        assert!(a.failed(Module::Inference));
        assert_eq!(a.failed_modules.len(), 1);
        assert!(a.failed_modules[0].reason.contains("not found"));
        assert!(a.anomalies.is_some());
        assert!(a.sentiment.is_some());
        assert!(a.archetype.is_some());
        assert_eq!(a.combined_risk.risk_score, None);
    }

    #[tokio::test]
    async fn panicking_module_is_isolated() {
        let failed: Result<u8, ModuleFailure> =
            run_isolated(Module::Sentiment, || -> Result<u8, String> { panic!("lexicon exploded") })
                .await;
        let failure = failed.unwrap_err();
        assert_eq!(failure.module, Module::Sentiment);
        assert_eq!(failure.reason, "panicked: lexicon exploded");

        let ok = run_isolated(Module::Archetype, || Ok::<_, String>(7u8)).await;
        assert_eq!(ok.unwrap(), 7);
    }
}
