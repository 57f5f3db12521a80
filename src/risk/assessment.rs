//! The assembled per-user assessment and its combined headline block.

use super::RiskLevel;
use crate::anomaly::{AnomalyReport, AnomalyRisk};
use crate::archetype::{Archetype, ArchetypeResult};
use crate::config::RiskConfig;
use crate::features::BehavioralFeatures;
use crate::meta::ModuleMeta;
use crate::model::{Impact, ModelMeta, Prediction};
use crate::sentiment::{SentimentTrend, Trend};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const ML_WARNING_PREFIX: &str = "ML model: ";
pub const SENTIMENT_WARNING_PREFIX: &str = "Sentiment: ";
pub const ANOMALY_WARNING_PREFIX: &str = "Anomaly detector: ";

/// Analysis modules run by the aggregator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Module {
    Inference,
    Anomalies,
    Sentiment,
    Archetype,
}

impl Module {
    pub fn as_str(&self) -> &'static str {
        match self {
            Module::Inference => "inference",
            Module::Anomalies => "anomalies",
            Module::Sentiment => "sentiment",
            Module::Archetype => "archetype",
        }
    }
}

impl std::fmt::Display for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A module that produced no output, and why
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleFailure {
    pub module: Module,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceOutput {
    pub meta: ModuleMeta,
    pub prediction: Prediction,
    pub input_features: BehavioralFeatures,
}

impl InferenceOutput {
    /// Model identity from the artifact; thresholds are the MEDIUM and HIGH score cut-offs.
    pub fn module_meta(model: &ModelMeta, risk: &RiskConfig) -> ModuleMeta {
        let name = if model.name.is_empty() {
            "relapse_model"
        } else {
            model.name.as_str()
        };
        let method = model
            .algorithm
            .as_deref()
            .unwrap_or("gradient-boosted tree ensemble");
        ModuleMeta::new(name, method)
            .with_version(model.version.as_str())
            .with_thresholds(f64::from(risk.medium_threshold), f64::from(risk.high_threshold))
    }
}

/// Headline scalars of every module that succeeded, plus all warnings in fixed group order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombinedRisk {
    pub risk_score: Option<u8>,
    pub risk_level: Option<RiskLevel>,
    pub relapse_probability: Option<f64>,
    pub days_until_relapse: Option<u8>,
    pub sentiment_trend: Option<Trend>,
    pub anomaly_risk: Option<AnomalyRisk>,
    pub archetype: Option<Archetype>,
    pub all_warnings: Vec<String>,
}

impl CombinedRisk {
    pub fn from_parts(
        inference: Option<&InferenceOutput>,
        anomalies: Option<&AnomalyReport>,
        sentiment: Option<&SentimentTrend>,
        archetype: Option<&ArchetypeResult>,
    ) -> Self {
        let mut all_warnings = Vec::new();
        if let Some(out) = inference {
            all_warnings.extend(
                out.prediction
                    .feature_importance
                    .iter()
                    .filter(|c| c.impact == Impact::High)
                    .map(|c| format!("{ML_WARNING_PREFIX}high contribution from {}", c.label)),
            );
        }
        if let Some(trend) = sentiment {
            all_warnings.extend(
                trend
                    .warning_signals
                    .iter()
                    .map(|w| format!("{SENTIMENT_WARNING_PREFIX}{w}")),
            );
        }
        if let Some(report) = anomalies {
            all_warnings.extend(
                report
                    .summary
                    .alerts
                    .iter()
                    .map(|a| format!("{ANOMALY_WARNING_PREFIX}{a}")),
            );
        }

        let prediction = inference.map(|out| &out.prediction);
        Self {
            risk_score: prediction.map(|p| p.risk_score),
            risk_level: prediction.map(|p| p.risk_level),
            relapse_probability: prediction.map(|p| p.relapse_probability),
            days_until_relapse: prediction.map(|p| p.days_until_relapse),
            sentiment_trend: sentiment.map(|t| t.trend),
            anomaly_risk: anomalies.map(|r| r.summary.overall_risk),
            archetype: archetype.map(|a| a.archetype),
            all_warnings,
        }
    }
}

/// One complete assessment. A module that failed is `None` and listed in `failed_modules`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub assessment_id: String,
    pub generated_at: DateTime<Utc>,
    pub inference: Option<InferenceOutput>,
    pub anomalies: Option<AnomalyReport>,
    pub sentiment: Option<SentimentTrend>,
    pub archetype: Option<ArchetypeResult>,
    pub combined_risk: CombinedRisk,
    pub failed_modules: Vec<ModuleFailure>,
}

impl RiskAssessment {
    pub fn is_complete(&self) -> bool {
        self.failed_modules.is_empty()
    }

    pub fn failed(&self, module: Module) -> bool {
        self.failed_modules.iter().any(|f| f.module == module)
    }
}
