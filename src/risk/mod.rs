//! Risk aggregation: level thresholds, the concurrent multi-module assessment and its output shape.

mod assessment;
mod engine;

pub use assessment::{
    CombinedRisk, InferenceOutput, Module, ModuleFailure, RiskAssessment, ANOMALY_WARNING_PREFIX,
    ML_WARNING_PREFIX, SENTIMENT_WARNING_PREFIX,
};
pub use engine::{RiskEngine, RiskLevel};
