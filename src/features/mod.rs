//! Feature engineering: raw event snapshot → typed behavioral features and aggregate series.

mod behavioral;
mod pipeline;

pub use behavioral::{
    BehavioralFeatures, FeatureName, FINANCIAL_ESCALATION_RATIO, TRIGGER_DIVERSITY_CAP,
};
pub use pipeline::{FeatureBuilder, FeatureSet};
