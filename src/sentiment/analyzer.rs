//! Per-text lexicon scoring.

use super::lexicon::{is_negator, valence};
use crate::math::round_dp;
use serde::{Deserialize, Serialize};

/// Comparative score beyond which a text is labelled positive or negative
const LABEL_MARGIN: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub fn from_comparative(comparative: f64) -> Self {
        if comparative > LABEL_MARGIN {
            SentimentLabel::Positive
        } else if comparative < -LABEL_MARGIN {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSentiment {
    /// Sum of matched valences
    pub score: i32,
    /// `score / word count`, 3 dp
    pub comparative: f64,
    pub positive: Vec<String>,
    pub negative: Vec<String>,
    pub label: SentimentLabel,
}

impl TextSentiment {
    fn neutral() -> Self {
        Self {
            score: 0,
            comparative: 0.0,
            positive: Vec::new(),
            negative: Vec::new(),
            label: SentimentLabel::Neutral,
        }
    }
}

/// Lowercased word tokens; punctuation separates words, apostrophes and hyphens do not.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '-'))
        .filter(|t| !t.is_empty() && *t != "-")
        .map(str::to_string)
        .collect()
}

pub fn analyze_text(text: &str) -> TextSentiment {
    let tokens = tokenize(text);
    if tokens.is_empty() {
        return TextSentiment::neutral();
    }

    let mut score = 0;
    let mut positive = Vec::new();
    let mut negative = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let (term, value, width) = match tokens.get(i + 1) {
            Some(next) => {
                let phrase = format!("{} {}", tokens[i], next);
                match valence(&phrase) {
                    Some(v) => (phrase, Some(v), 2),
                    None => (tokens[i].clone(), valence(&tokens[i]), 1),
                }
            }
            None => (tokens[i].clone(), valence(&tokens[i]), 1),
        };

        if let Some(mut v) = value {
            if width == 1 && i > 0 && is_negator(&tokens[i - 1]) {
                v = -v;
            }
            if v > 0 {
                positive.push(term);
            } else if v < 0 {
                negative.push(term);
            }
            score += v;
        }
        i += width;
    }

    let comparative = f64::from(score) / tokens.len() as f64;
    TextSentiment {
        score,
        comparative: round_dp(comparative, 3),
        positive,
        negative,
        label: SentimentLabel::from_comparative(comparative),
    }
}
