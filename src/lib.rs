//! Relapse risk engine: behavioral relapse-risk assessment for gambling recovery.
//!
//! Modular structure:
//! - [`events`]: Episode, diary and block-event input snapshot
//! - [`features`]: Behavioral feature extraction and typed model columns
//! - [`model`]: Gradient-boosted tree-ensemble inference with a lazy model cache
//! - [`anomaly`]: Z-score anomaly detection over daily and hourly series
//! - [`sentiment`]: Lexicon sentiment and diary mood trend
//! - [`archetype`]: Rule-based behavioral archetype classification
//! - [`risk`]: Concurrent, fault-isolating aggregation into one assessment
//! - [`logging`]: Structured JSON logging
//! - [`meta`]: Static name, version and thresholds stamped on each module output

pub mod anomaly;
pub mod archetype;
pub mod config;
pub mod error;
pub mod events;
pub mod features;
pub mod logging;
pub(crate) mod math;
pub mod meta;
pub mod model;
pub mod risk;
pub mod sentiment;

pub use anomaly::{analyze_anomalies, AnomalyReport, BehaviorSeries};
pub use archetype::{get_behavioral_archetype, Archetype, ArchetypeResult};
pub use config::EngineConfig;
pub use error::ModelError;
pub use events::{BehaviorSnapshot, BlockEvent, DiaryEntry, EpisodeRecord, Mood};
pub use features::{BehavioralFeatures, FeatureBuilder, FeatureName};
pub use logging::StructuredLogger;
pub use meta::ModuleMeta;
pub use model::{predict_risk, ModelCache, Prediction, SerializedModel};
pub use risk::{RiskAssessment, RiskEngine, RiskLevel};
pub use sentiment::{analyze_trend, SentimentTrend};
