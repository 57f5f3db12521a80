//! Tree-ensemble inference: artifact loading, traversal and relapse-risk prediction.

mod cache;
mod predictor;
mod tree;

pub use cache::ModelCache;
pub use predictor::{
    display_days, predict_risk, risk_probability_for_days, sigmoid, FeatureContribution, Impact,
    Prediction,
};
pub use tree::{FeatureImportance, ModelMeta, SerializedModel, Tree, TreeEnsembleBranch, LEAF};
