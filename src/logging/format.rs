//! Subscriber setup and ndjson audit lines for finished assessments.

use crate::anomaly::AnomalyRisk;
use crate::archetype::Archetype;
use crate::config::LogConfig;
use crate::risk::{Module, RiskAssessment, RiskLevel};
use serde::Serialize;
use std::io::Write;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// One audit line per assessment; carries headline values only, never diary text.
#[derive(Debug, Serialize)]
pub struct AssessmentLogLine<'a> {
    pub ts: String,
    pub assessment_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anomaly_risk: Option<AnomalyRisk>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archetype: Option<Archetype>,
    pub warnings: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_modules: Vec<Module>,
}

impl<'a> From<&'a RiskAssessment> for AssessmentLogLine<'a> {
    fn from(a: &'a RiskAssessment) -> Self {
        let combined = &a.combined_risk;
        Self {
            ts: a.generated_at.to_rfc3339(),
            assessment_id: &a.assessment_id,
            risk_score: combined.risk_score,
            risk_level: combined.risk_level,
            anomaly_risk: combined.anomaly_risk,
            archetype: combined.archetype,
            warnings: combined.all_warnings.len(),
            failed_modules: a.failed_modules.iter().map(|f| f.module).collect(),
        }
    }
}

pub struct StructuredLogger;

impl StructuredLogger {
    /// Install the global subscriber: level from `RUST_LOG`, else `default_level`.
    /// Returns false when a subscriber was already installed.
    pub fn init(json: bool, default_level: &str) -> bool {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
        if json {
            let fmt = tracing_subscriber::fmt::layer()
                .json()
                .with_span_events(FmtSpan::NONE)
                .with_writer(std::io::stdout);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt)
                .try_init()
                .is_ok()
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
                .try_init()
                .is_ok()
        }
    }

    pub fn init_from(config: &LogConfig) -> bool {
        Self::init(config.json, &config.level)
    }

    /// Write `event` as one JSON line, bypassing tracing
    pub fn emit_json(event: &impl Serialize, w: &mut impl Write) -> std::io::Result<()> {
        let line = serde_json::to_string(event).map_err(std::io::Error::other)?;
        writeln!(w, "{line}")
    }

    pub fn audit(assessment: &RiskAssessment, w: &mut impl Write) -> std::io::Result<()> {
        Self::emit_json(&AssessmentLogLine::from(assessment), w)
    }
}
