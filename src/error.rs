//! Error types for the risk engine

use thiserror::Error;

/// Failure to load the serialized tree-ensemble model.
///
/// Cloneable: the first failure is cached for the lifetime of the process and handed
/// back to every later inference call until the artifact is fixed and the host restarts.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModelError {
    #[error("model artifact not found: {path}")]
    NotFound { path: String },

    #[error("failed to read model artifact {path}: {message}")]
    Io { path: String, message: String },

    #[error("malformed model artifact: {0}")]
    Malformed(String),

    #[error("model declares unknown feature: {0}")]
    UnknownFeature(String),
}

impl From<serde_json::Error> for ModelError {
    fn from(e: serde_json::Error) -> Self {
        ModelError::Malformed(e.to_string())
    }
}
