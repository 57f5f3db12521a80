//! Static description attached to every module output: what produced it and with which cut-offs.

use serde::{Deserialize, Serialize};

/// Version stamped on module outputs that have no artifact of their own
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleMeta {
    pub name: String,
    pub version: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical_threshold: Option<f64>,
    /// Word lists behind a lexicon-based module
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lexicon: Option<String>,
}

impl ModuleMeta {
    pub fn new(name: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: ENGINE_VERSION.to_string(),
            method: method.into(),
            warning_threshold: None,
            critical_threshold: None,
            lexicon: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_thresholds(mut self, warning: f64, critical: f64) -> Self {
        self.warning_threshold = Some(warning);
        self.critical_threshold = Some(critical);
        self
    }

    pub fn with_lexicon(mut self, description: impl Into<String>) -> Self {
        self.lexicon = Some(description.into());
        self
    }
}
