//! Behavioral archetype classification.
//!
//! Each archetype contributes rules to a single ordered table. Every rule whose predicate
//! holds is a candidate; the highest score wins and the earlier rule wins a tie.

mod rules;

use crate::features::BehavioralFeatures;
use crate::meta::ModuleMeta;
use serde::{Deserialize, Serialize};

pub use rules::{Rule, EMOTIONAL_TRIGGERS, RULES};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    ImpulsiveChaser,
    StrategicIllusionist,
    NightEscapist,
    EmotionalGambler,
    FinancialSaboteur,
    Unknown,
}

struct Profile {
    label: &'static str,
    description: &'static str,
    insight: &'static str,
}

impl Archetype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Archetype::ImpulsiveChaser => "impulsive_chaser",
            Archetype::StrategicIllusionist => "strategic_illusionist",
            Archetype::NightEscapist => "night_escapist",
            Archetype::EmotionalGambler => "emotional_gambler",
            Archetype::FinancialSaboteur => "financial_saboteur",
            Archetype::Unknown => "unknown",
        }
    }

    fn profile(&self) -> Profile {
        match self {
            Archetype::ImpulsiveChaser => Profile {
                label: "Impulsive chaser",
                description: "Raises stakes after a loss and chases what was lost.",
                insight: "You play when you feel you have to win it back. A pause before the next bet breaks the impulse.",
            },
            Archetype::StrategicIllusionist => Profile {
                label: "Strategic illusionist",
                description: "Believes in a system, a sense of control or a strategy that should pay off.",
                insight: "You play when you feel in control. The house edge does not care about strategy.",
            },
            Archetype::NightEscapist => Profile {
                label: "Night escapist",
                description: "Night-time activity used to get away from thoughts or loneliness.",
                insight: "You play when you cannot sleep or feel alone. A device curfew closes the window.",
            },
            Archetype::EmotionalGambler => Profile {
                label: "Emotional gambler",
                description: "Gambling as a reaction to stress, boredom, loneliness or low mood.",
                insight: "You play when your feelings take over. Prepare an alternative action for the next trigger.",
            },
            Archetype::FinancialSaboteur => Profile {
                label: "Financial saboteur",
                description: "Spending grows while the abstinence streak stays unstable.",
                insight: "The relapse and spend-more loop feeds itself. Hand money control to someone you trust during risky periods.",
            },
            Archetype::Unknown => Profile {
                label: "Not enough data",
                description: "Keep filling in the diary and episodes to build a profile.",
                insight: "Patterns are analysed as data accumulates.",
            },
        }
    }
}

impl std::fmt::Display for Archetype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeResult {
    pub meta: ModuleMeta,
    pub archetype: Archetype,
    pub label: String,
    pub description: String,
    pub insight: String,
    /// Winning rule score clamped to [0, 1]; 0 for `unknown`
    pub confidence: f64,
}

impl ArchetypeResult {
    fn new(archetype: Archetype, confidence: f64) -> Self {
        let profile = archetype.profile();
        Self {
            meta: module_meta(),
            archetype,
            label: profile.label.to_string(),
            description: profile.description.to_string(),
            insight: profile.insight.to_string(),
            confidence,
        }
    }

    pub fn unknown() -> Self {
        Self::new(Archetype::Unknown, 0.0)
    }
}

pub fn module_meta() -> ModuleMeta {
    ModuleMeta::new("archetype_classifier", "ordered rule table, highest score wins")
}

/// Every archetype whose rule fired, with its score, in table order.
pub fn candidates(features: &BehavioralFeatures) -> Vec<(Archetype, f64)> {
    RULES
        .iter()
        .filter(|rule| (rule.predicate)(features))
        .map(|rule| (rule.archetype, (rule.score)(features)))
        .collect()
}

pub fn get_behavioral_archetype(features: &BehavioralFeatures) -> ArchetypeResult {
    let mut best: Option<(Archetype, f64)> = None;
    for (archetype, score) in candidates(features) {
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((archetype, score)),
        }
    }
    match best {
        Some((archetype, score)) => ArchetypeResult::new(archetype, score.clamp(0.0, 1.0)),
        None => ArchetypeResult::unknown(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features() -> BehavioralFeatures {
        BehavioralFeatures {
            streak_days: 30,
            ..Default::default()
        }
    }

    #[test]
    fn no_signal_is_unknown() {
        let r = get_behavioral_archetype(&features());
        assert_eq!(r.archetype, Archetype::Unknown);
        assert_eq!(r.confidence, 0.0);
        assert_eq!(r.label, "Not enough data");
    }

    #[test]
    fn chaser_beats_saboteur_on_score() {
        let f = BehavioralFeatures {
            spending_trend: 2.0,
            episode_frequency: 3,
            streak_days: 2,
            ..features()
        };
        let fired: Vec<Archetype> = candidates(&f).into_iter().map(|(a, _)| a).collect();
        assert!(fired.contains(&Archetype::FinancialSaboteur));

        let r = get_behavioral_archetype(&f);
        assert_eq!(r.archetype, Archetype::ImpulsiveChaser);
        assert!((r.confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn weak_chaser_loses_to_saboteur() {
        // trend 1.4: chaser 0.5, saboteur 0.7
        let f = BehavioralFeatures {
            spending_trend: 1.4,
            episode_frequency: 1,
            streak_days: 3,
            ..features()
        };
        assert_eq!(get_behavioral_archetype(&f).archetype, Archetype::FinancialSaboteur);
    }

    #[test]
    fn earlier_rule_wins_tie() {
        // night escapist and emotional gambler both score 0.85
        let f = BehavioralFeatures {
            night_activity_ratio: 0.5,
            mood_score: 2.0,
            episode_frequency: 2,
            ..features()
        };
        let r = get_behavioral_archetype(&f);
        assert_eq!(r.archetype, Archetype::NightEscapist);
        assert_eq!(r.confidence, 0.85);
    }

    #[test]
    fn emotional_trigger_tags_are_case_insensitive() {
        let f = BehavioralFeatures {
            triggers: vec!["Stress".into()],
            ..features()
        };
        let r = get_behavioral_archetype(&f);
        assert_eq!(r.archetype, Archetype::EmotionalGambler);
        assert_eq!(r.confidence, 0.6);
    }

    #[test]
    fn illusionist_needs_mid_mood() {
        let mut f = BehavioralFeatures {
            trigger_diversity: 5,
            mood_score: 3.5,
            ..features()
        };
        assert_eq!(get_behavioral_archetype(&f).archetype, Archetype::StrategicIllusionist);
        f.mood_score = 4.5;
        assert_eq!(get_behavioral_archetype(&f).archetype, Archetype::Unknown);
    }

    #[test]
    fn confidence_is_clamped() {
        let f = BehavioralFeatures {
            spending_trend: 5.0,
            episode_frequency: 4,
            ..features()
        };
        let r = get_behavioral_archetype(&f);
        assert_eq!(r.archetype, Archetype::ImpulsiveChaser);
        assert_eq!(r.confidence, 1.0);
    }

    #[test]
    fn serializes_snake_case_id() {
        let json = serde_json::to_value(ArchetypeResult::unknown()).unwrap();
        assert_eq!(json["archetype"], "unknown");
        assert_eq!(Archetype::NightEscapist.to_string(), "night_escapist");
    }
}
