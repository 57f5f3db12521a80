//! Relapse-risk prediction from the two boosted ensembles.
//!
//! The regressor estimates days until relapse; its output is clamped to `[1, 30]` and
//! rescaled onto a one-week display horizon. The risk score is derived from that horizon,
//! not from the classifier, whose probability is reported alongside.

use super::SerializedModel;
use crate::config::RiskConfig;
use crate::features::{BehavioralFeatures, FeatureName};
use crate::math::round_dp;
use crate::risk::RiskLevel;
use serde::{Deserialize, Serialize};

const RAW_DAYS_MIN: f64 = 1.0;
const RAW_DAYS_MAX: f64 = 30.0;
const DISPLAY_DAYS_MIN: f64 = 1.0;
const DISPLAY_DAYS_MAX: f64 = 7.0;

const SIGMOID_INPUT_LIMIT: f64 = 500.0;
const TOP_FEATURES: usize = 6;
const IMPACT_HIGH: f64 = 0.15;
const IMPACT_MEDIUM: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Impact {
    Low,
    Medium,
    High,
}

impl Impact {
    fn from_contribution(c: f64) -> Self {
        if c >= IMPACT_HIGH {
            Impact::High
        } else if c >= IMPACT_MEDIUM {
            Impact::Medium
        } else {
            Impact::Low
        }
    }
}

/// One ranked explanation entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureContribution {
    pub feature: FeatureName,
    pub label: String,
    pub raw_value: f64,
    /// Raw value scaled into [0, 1] in the risk direction
    pub normalized_value: f64,
    /// Model-wide importance of the feature (regressor)
    pub importance: f64,
    /// `importance × normalized_value`
    pub contribution: f64,
    pub impact: Impact,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub risk_probability: f64,
    /// Decisiveness: distance of `risk_probability` from 0.5, scaled to [0, 1]
    pub confidence: f64,
    pub days_until_relapse: u8,
    /// Classifier output, 3 dp
    pub relapse_probability: f64,
    pub feature_importance: Vec<FeatureContribution>,
    pub model_version: String,
}

pub fn sigmoid(x: f64) -> f64 {
    let x = x.clamp(-SIGMOID_INPUT_LIMIT, SIGMOID_INPUT_LIMIT);
    1.0 / (1.0 + (-x).exp())
}

/// Regressor output → whole days on the display horizon
pub fn display_days(raw: f64) -> u8 {
    let clamped = raw.clamp(RAW_DAYS_MIN, RAW_DAYS_MAX);
    let scaled = DISPLAY_DAYS_MIN
        + (clamped - RAW_DAYS_MIN) / (RAW_DAYS_MAX - RAW_DAYS_MIN)
            * (DISPLAY_DAYS_MAX - DISPLAY_DAYS_MIN);
    (scaled.round() as u8).clamp(DISPLAY_DAYS_MIN as u8, DISPLAY_DAYS_MAX as u8)
}

/// Probability implied by the display horizon: 1 day → 1.0, 7 days → 0.0
pub fn risk_probability_for_days(days: u8) -> f64 {
    let span = DISPLAY_DAYS_MAX - DISPLAY_DAYS_MIN;
    (1.0 - (f64::from(days) - DISPLAY_DAYS_MIN) / span).clamp(0.0, 1.0)
}

fn explain(model: &SerializedModel, features: &BehavioralFeatures) -> Vec<FeatureContribution> {
    model
        .ranked_importance()
        .iter()
        .take(TOP_FEATURES)
        .map(|&(feature, importance)| {
            let raw_value = features.value(feature);
            let normalized = feature.normalize(raw_value);
            let contribution = importance * normalized;
            FeatureContribution {
                feature,
                label: feature.label().to_string(),
                raw_value,
                normalized_value: round_dp(normalized, 2),
                importance: round_dp(importance, 4),
                contribution: round_dp(contribution, 4),
                impact: Impact::from_contribution(contribution),
            }
        })
        .collect()
}

/// Evaluate both ensembles against `features`. Deterministic for a given model.
pub fn predict_risk(
    model: &SerializedModel,
    features: &BehavioralFeatures,
    thresholds: &RiskConfig,
) -> Prediction {
    let x = model.encode(features);

    let days_until_relapse = display_days(model.regressor.raw_output(&x));
    let relapse_probability = round_dp(sigmoid(model.classifier.raw_output(&x)), 3);

    let risk_probability = risk_probability_for_days(days_until_relapse);
    let risk_score = (risk_probability * 100.0).round() as u8;

    Prediction {
        risk_score,
        risk_level: RiskLevel::from_score(risk_score, thresholds),
        risk_probability: round_dp(risk_probability, 3),
        confidence: round_dp((risk_probability - 0.5).abs() * 2.0, 2),
        days_until_relapse,
        relapse_probability,
        feature_importance: explain(model, features),
        model_version: model.meta.version.clone(),
    }
}

impl SerializedModel {
    pub fn predict(&self, features: &BehavioralFeatures, thresholds: &RiskConfig) -> Prediction {
        predict_risk(self, features, thresholds)
    }
}
