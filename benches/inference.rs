//! Inference benchmark: behavioral features → tree-ensemble prediction.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use relapse_risk_engine::config::RiskConfig;
use relapse_risk_engine::{BehavioralFeatures, SerializedModel};
use std::path::Path;

fn load_fixture() -> SerializedModel {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/relapse_model.json");
    SerializedModel::from_path(&path).expect("fixture model")
}

fn bench_predict(c: &mut Criterion) {
    let model = load_fixture();
    let thresholds = RiskConfig::default();
    let features = BehavioralFeatures {
        streak_days: 5,
        episode_frequency: 2,
        spending_trend: 1.4,
        mood_score: 2.5,
        night_activity_ratio: 0.3,
        trigger_diversity: 3,
        ..Default::default()
    };

    c.bench_function("predict_fixture_model", |b| {
        b.iter(|| model.predict(black_box(&features), &thresholds))
    });
}

fn bench_predict_by_streak(c: &mut Criterion) {
    let model = load_fixture();
    let thresholds = RiskConfig::default();

    let mut g = c.benchmark_group("predict_by_streak");
    for streak in [0, 7, 30, 90] {
        let features = BehavioralFeatures {
            streak_days: streak,
            ..Default::default()
        };
        g.bench_function(format!("streak_{}", streak).as_str(), |b| {
            b.iter(|| model.predict(black_box(&features), &thresholds))
        });
    }
    g.finish();
}

fn bench_model_parse(c: &mut Criterion) {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/relapse_model.json");
    let json = std::fs::read_to_string(path).expect("fixture model");

    c.bench_function("parse_and_validate_model", |b| {
        b.iter(|| SerializedModel::from_json(black_box(&json)))
    });
}

criterion_group!(benches, bench_predict, bench_predict_by_streak, bench_model_parse);
criterion_main!(benches);
