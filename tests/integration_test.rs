//! Integration test: config load, fixture model inference, end-to-end assessments, module isolation.

use chrono::{DateTime, Duration, TimeZone, Utc};
use relapse_risk_engine::{
    anomaly::AnomalyRisk,
    config::RiskConfig,
    model::ModelCache,
    risk::Module,
    sentiment::Trend,
    Archetype, BehaviorSnapshot, BehavioralFeatures, DiaryEntry, EngineConfig, EpisodeRecord,
    Mood, RiskEngine, RiskLevel, SerializedModel,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/relapse_model.json")
}

fn engine() -> RiskEngine {
    let config = EngineConfig {
        model_path: fixture(),
        ..Default::default()
    };
    RiskEngine::with_cache(config, Arc::new(ModelCache::new()))
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap()
}

fn at(days_ago: i64, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 30, hour, 0, 0).unwrap() - Duration::days(days_ago)
}

fn features(streak: u32, episodes: u32, mood: f64) -> BehavioralFeatures {
    BehavioralFeatures {
        streak_days: streak,
        episode_frequency: episodes,
        mood_score: mood,
        ..Default::default()
    }
}

#[test]
fn config_load_default() {
    let c = EngineConfig::load(Path::new("nonexistent.json"));
    assert_eq!(c.features.window_days, 30);
    assert_eq!(c.risk.high_threshold, 60);
    assert_eq!(c.risk.medium_threshold, 30);
    assert!(c.log.json);
}

#[test]
fn fixture_model_loads() {
    let model = SerializedModel::from_path(&fixture()).unwrap();
    assert_eq!(model.layout().len(), 10);
    assert_eq!(model.regressor.trees.len(), 2);
    assert_eq!(model.meta.version, "1.2.0-fixture");
}

#[test]
fn fixture_predictions_span_all_levels() {
    let engine = engine();

    let calm = engine.predict(&features(90, 0, 3.0)).unwrap();
    assert_eq!(calm.days_until_relapse, 6);
    assert_eq!(calm.risk_score, 17);
    assert_eq!(calm.risk_level, RiskLevel::Low);
    assert_eq!(calm.relapse_probability, 0.119);
    assert_eq!(calm.feature_importance.len(), 6);

    let shaky = engine.predict(&features(5, 1, 3.0)).unwrap();
    assert_eq!(shaky.days_until_relapse, 4);
    assert_eq!(shaky.risk_score, 50);
    assert_eq!(shaky.risk_level, RiskLevel::Medium);

    let relapsing = engine.predict(&features(2, 3, 2.0)).unwrap();
    assert_eq!(relapsing.days_until_relapse, 1);
    assert_eq!(relapsing.risk_score, 100);
    assert_eq!(relapsing.risk_level, RiskLevel::High);
    assert_eq!(relapsing.confidence, 1.0);
}

#[test]
fn prediction_is_idempotent() {
    let engine = engine();
    let f = features(5, 1, 3.0);
    let a = engine.predict(&f).unwrap();
    let b = engine.predict(&f).unwrap();
    assert_eq!(a, b);
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[test]
fn score_and_days_stay_in_range() {
    let engine = engine();
    let thresholds = RiskConfig::default();
    for streak in [0, 1, 5, 14, 15, 30, 90, 400] {
        for episodes in 0..=7 {
            for mood in [1.0, 2.0, 2.5, 3.0, 5.0] {
                let p = engine.predict(&features(streak, episodes, mood)).unwrap();
                assert!((1..=7).contains(&p.days_until_relapse));
                assert!(p.risk_score <= 100);
                assert_eq!(p.risk_level, RiskLevel::from_score(p.risk_score, &thresholds));
                assert!((0.0..=1.0).contains(&p.relapse_probability));
            }
        }
    }
}

#[tokio::test]
async fn long_streak_without_activity_is_low_risk() {
    let mut snapshot = BehaviorSnapshot::empty(now());
    snapshot.account_created_at = Some(now() - Duration::days(90));

    let a = engine().assess(&snapshot).await;
    assert!(a.is_complete());

    let inference = a.inference.as_ref().unwrap();
    assert_eq!(inference.input_features.streak_days, 90);
    assert_eq!(inference.prediction.risk_level, RiskLevel::Low);
    assert_eq!(a.archetype.as_ref().unwrap().archetype, Archetype::Unknown);
    assert_eq!(
        a.anomalies.as_ref().unwrap().summary.overall_risk,
        AnomalyRisk::Low
    );
    assert_eq!(a.combined_risk.sentiment_trend, Some(Trend::Stable));
    assert!(a.combined_risk.all_warnings.is_empty());
}

#[tokio::test]
async fn bad_week_orders_warnings_by_module() {
    let mut snapshot = BehaviorSnapshot::empty(now());
    snapshot.episodes = (1..=3)
        .map(|d| {
            EpisodeRecord::new(at(d, 23), 500.0)
                .with_mood(Mood::Terrible)
                .with_triggers(["stress", "loneliness"])
        })
        .collect();
    snapshot.diary = vec![
        DiaryEntry {
            date: at(2, 10),
            text: "ужасно, проиграл всё".into(),
        },
        DiaryEntry {
            date: at(1, 10),
            text: "опять сорвался, стыдно".into(),
        },
        DiaryEntry {
            date: at(0, 10),
            text: "долги, отчаяние".into(),
        },
    ];

    let a = engine().assess(&snapshot).await;
    assert!(a.is_complete());
    assert_eq!(a.combined_risk.risk_level, Some(RiskLevel::High));
    assert_eq!(a.combined_risk.days_until_relapse, Some(1));
    assert_eq!(a.combined_risk.archetype, Some(Archetype::ImpulsiveChaser));
    assert_eq!(a.combined_risk.anomaly_risk, Some(AnomalyRisk::High));

    let w = &a.combined_risk.all_warnings;
    assert_eq!(w[0], "ML model: high contribution from Clean streak");
    assert_eq!(w[1], "Sentiment: 3 negative entries in a row");
    assert_eq!(w[2], "Sentiment: Strongly negative tone in recent entries");
    assert!(w.len() >= 6);
    assert!(w[3..].iter().all(|s| s.starts_with("Anomaly detector: ")));
}

#[tokio::test]
async fn missing_model_leaves_other_modules_running() {
    let config = EngineConfig {
        model_path: PathBuf::from("nonexistent-model.json"),
        ..Default::default()
    };
    let engine = RiskEngine::with_cache(config, Arc::new(ModelCache::new()));

    let mut snapshot = BehaviorSnapshot::empty(now());
    snapshot.diary = vec![DiaryEntry {
        date: at(0, 9),
        text: "отлично, держусь!".into(),
    }];

    for _ in 0..2 {
        let a = engine.assess(&snapshot).await;
        assert!(a.inference.is_none());
        assert!(a.failed(Module::Inference));
        assert_eq!(a.failed_modules.len(), 1);
        assert!(a.anomalies.is_some());
        assert!(a.archetype.is_some());
        assert_eq!(a.sentiment.as_ref().unwrap().entries.len(), 1);
        assert_eq!(a.combined_risk.risk_level, None);
    }
    assert!(engine.predict(&features(10, 0, 3.0)).is_err());
}

#[tokio::test]
async fn assessment_serializes_with_stable_keys() {
    let a = engine().assess(&BehaviorSnapshot::empty(now())).await;
    let v = serde_json::to_value(&a).unwrap();
    for key in [
        "assessment_id",
        "generated_at",
        "inference",
        "anomalies",
        "sentiment",
        "archetype",
        "combined_risk",
        "failed_modules",
    ] {
        assert!(v.get(key).is_some(), "missing {key}");
    }
    for module in ["inference", "anomalies", "sentiment", "archetype"] {
        assert!(v[module]["meta"]["name"].is_string(), "missing {module}.meta");
        assert!(v[module]["meta"]["version"].is_string());
    }
    assert_eq!(v["inference"]["meta"]["version"], "1.2.0-fixture");
    assert!(v["combined_risk"]["all_warnings"].is_array());
    assert!(v["inference"]["prediction"]["risk_level"].is_string());
    assert!(uuid::Uuid::parse_str(v["assessment_id"].as_str().unwrap()).is_ok());
}
