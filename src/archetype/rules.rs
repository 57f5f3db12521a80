use super::Archetype;
use crate::features::BehavioralFeatures;

/// Trigger tags that mark emotionally driven play (compared case-insensitively)
pub const EMOTIONAL_TRIGGERS: &[&str] =
    &["stress", "boredom", "loneliness", "sadness", "anger", "anxiety"];

/// One weighted predicate. A weaker tier of an archetype excludes its stronger tier so
/// that each archetype contributes at most one candidate.
pub struct Rule {
    pub archetype: Archetype,
    pub predicate: fn(&BehavioralFeatures) -> bool,
    pub score: fn(&BehavioralFeatures) -> f64,
}

fn strong_chaser(f: &BehavioralFeatures) -> bool {
    f.spending_trend > 1.5 && f.episode_frequency >= 2
}

fn dark_night(f: &BehavioralFeatures) -> bool {
    f.night_activity_ratio > 0.3 && f.mood_score <= 2.5
}

fn emotional(f: &BehavioralFeatures) -> bool {
    let tagged = f.triggers.iter().any(|t| {
        EMOTIONAL_TRIGGERS
            .iter()
            .any(|e| t.eq_ignore_ascii_case(e))
    });
    // callers may pass unsanitized features where 0 means "no mood recorded"
    tagged || (f.mood_score > 0.0 && f.mood_score <= 2.5)
}

pub static RULES: &[Rule] = &[
    Rule {
        archetype: Archetype::ImpulsiveChaser,
        predicate: strong_chaser,
        score: |f: &BehavioralFeatures| 0.8 + (f.spending_trend - 1.5) * 0.2,
    },
    Rule {
        archetype: Archetype::ImpulsiveChaser,
        predicate: |f: &BehavioralFeatures| f.spending_trend > 1.2 && !strong_chaser(f),
        score: |_: &BehavioralFeatures| 0.5,
    },
    Rule {
        archetype: Archetype::StrategicIllusionist,
        predicate: |f: &BehavioralFeatures| {
            f.trigger_diversity >= 4 && (2.5..=4.0).contains(&f.mood_score)
        },
        score: |_: &BehavioralFeatures| 0.7,
    },
    Rule {
        archetype: Archetype::NightEscapist,
        predicate: dark_night,
        score: |_: &BehavioralFeatures| 0.85,
    },
    Rule {
        archetype: Archetype::NightEscapist,
        predicate: |f: &BehavioralFeatures| f.night_activity_ratio > 0.2 && !dark_night(f),
        score: |_: &BehavioralFeatures| 0.5,
    },
    Rule {
        archetype: Archetype::EmotionalGambler,
        predicate: |f: &BehavioralFeatures| emotional(f) && f.episode_frequency >= 1,
        score: |_: &BehavioralFeatures| 0.85,
    },
    Rule {
        archetype: Archetype::EmotionalGambler,
        predicate: |f: &BehavioralFeatures| emotional(f) && f.episode_frequency == 0,
        score: |_: &BehavioralFeatures| 0.6,
    },
    Rule {
        archetype: Archetype::FinancialSaboteur,
        predicate: |f: &BehavioralFeatures| f.spending_trend > 1.3 && f.streak_days < 7,
        score: |_: &BehavioralFeatures| 0.7,
    },
];
