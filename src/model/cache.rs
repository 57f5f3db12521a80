//! Lazily loaded, process-lifetime model cache.
//! The first load attempt decides the outcome: a success is shared read-only by every caller,
//! a failure is served back unchanged until the host restarts with a fixed artifact.

use super::SerializedModel;
use crate::error::ModelError;
use std::path::Path;
use std::sync::{Arc, OnceLock};

static SHARED: OnceLock<Arc<ModelCache>> = OnceLock::new();

#[derive(Debug, Default)]
pub struct ModelCache {
    cell: OnceLock<Result<Arc<SerializedModel>, ModelError>>,
}

impl ModelCache {
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// Process-wide cache
    pub fn shared() -> Arc<ModelCache> {
        SHARED.get_or_init(|| Arc::new(ModelCache::new())).clone()
    }

    /// Cache that already holds `model`; no file is read.
    pub fn preloaded(model: SerializedModel) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(Ok(Arc::new(model)));
        Self { cell }
    }

    /// Return the cached model, loading it from `path` on the first call only.
    /// Later calls ignore `path`.
    pub fn get_or_load(&self, path: &Path) -> Result<Arc<SerializedModel>, ModelError> {
        self.cell
            .get_or_init(|| match SerializedModel::from_path(path) {
                Ok(model) => {
                    tracing::info!(
                        path = %path.display(),
                        version = %model.meta.version,
                        regressor_trees = model.regressor.trees.len(),
                        classifier_trees = model.classifier.trees.len(),
                        "relapse model loaded"
                    );
                    Ok(Arc::new(model))
                }
                Err(e) => {
                    tracing::error!(path = %path.display(), error = %e, "relapse model failed to load; inference disabled");
                    Err(e)
                }
            })
            .clone()
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.cell.get(), Some(Ok(_)))
    }
}
