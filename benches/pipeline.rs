//! Pipeline benchmark: event snapshot → features → anomaly, sentiment and archetype analysis.

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use relapse_risk_engine::config::FeaturesConfig;
use relapse_risk_engine::{
    analyze_anomalies, analyze_trend, get_behavioral_archetype, BehaviorSnapshot, DiaryEntry,
    EpisodeRecord, FeatureBuilder, Mood,
};

fn make_snapshot(episodes: usize) -> BehaviorSnapshot {
    let now = Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap();
    let mut snapshot = BehaviorSnapshot::empty(now);
    snapshot.episodes = (0..episodes)
        .map(|i| {
            EpisodeRecord::new(now - Duration::hours(7 * i as i64), (i % 9) as f64 * 40.0)
                .with_mood(if i % 3 == 0 { Mood::Bad } else { Mood::Neutral })
                .with_triggers(["stress", "ads", "boredom"].into_iter().take(i % 3 + 1))
        })
        .collect();
    snapshot.diary = (0..30)
        .map(|d| DiaryEntry {
            date: now - Duration::days(d),
            text: if d % 4 == 0 {
                "ужасно, проиграл всё, опять не спал".to_string()
            } else {
                "держусь, устоял, гулял с семьёй".to_string()
            },
        })
        .collect();
    snapshot
}

fn bench_feature_build(c: &mut Criterion) {
    let builder = FeatureBuilder::new(FeaturesConfig::default());
    let snapshot = make_snapshot(100);

    c.bench_function("feature_build_100_episodes", |b| {
        b.iter(|| black_box(builder.build(black_box(&snapshot))))
    });
}

fn bench_full_pipeline(c: &mut Criterion) {
    let builder = FeatureBuilder::new(FeaturesConfig::default());
    let snapshot = make_snapshot(100);

    c.bench_function("full_pipeline_snapshot_to_analysis", |b| {
        b.iter(|| {
            let set = builder.build(&snapshot);
            black_box(analyze_anomalies(&set.series));
            black_box(analyze_trend(&set.diary));
            black_box(get_behavioral_archetype(&set.features))
        })
    });
}

criterion_group!(benches, bench_feature_build, bench_full_pipeline);
criterion_main!(benches);
