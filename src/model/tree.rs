//! Serialized gradient-boosted tree ensembles stored as flattened parallel arrays.

use crate::error::ModelError;
use crate::features::{BehavioralFeatures, FeatureName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Child index marking a leaf
pub const LEAF: i32 = -1;

/// One regression tree. Node `i` is described by the `i`-th element of every array;
/// only leaf entries of `value` are read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub left_child: Vec<i32>,
    pub right_child: Vec<i32>,
    pub feature: Vec<i32>,
    pub threshold: Vec<f64>,
    pub value: Vec<f64>,
}

impl Tree {
    fn validate(&self, n_features: usize) -> Result<(), String> {
        let n = self.left_child.len();
        if n == 0 {
            return Err("tree has no nodes".into());
        }
        if [
            self.right_child.len(),
            self.feature.len(),
            self.threshold.len(),
            self.value.len(),
        ]
        .iter()
        .any(|&len| len != n)
        {
            return Err("tree arrays differ in length".into());
        }
        for node in 0..n {
            let (left, right) = (self.left_child[node], self.right_child[node]);
            if left == LEAF {
                if right != LEAF {
                    return Err(format!("node {node}: half leaf"));
                }
                if !self.value[node].is_finite() {
                    return Err(format!("node {node}: non-finite leaf value"));
                }
                continue;
            }
            // Children always follow their parent, which rules out cycles.
            for child in [left, right] {
                if child <= node as i32 || child as usize >= n {
                    return Err(format!("node {node}: child {child} out of range"));
                }
            }
            let f = self.feature[node];
            if f < 0 || f as usize >= n_features {
                return Err(format!("node {node}: feature index {f} out of range"));
            }
        }
        Ok(())
    }

    /// Walk from the root: left when `x[feature] <= threshold`, right otherwise.
    pub fn leaf_value(&self, x: &[f64]) -> f64 {
        let mut node = 0usize;
        while self.left_child[node] != LEAF {
            let f = self.feature[node] as usize;
            node = if x[f] <= self.threshold[node] {
                self.left_child[node] as usize
            } else {
                self.right_child[node] as usize
            };
        }
        self.value[node]
    }
}

/// A boosted ensemble: `bias + learning_rate * Σ leaf`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeEnsembleBranch {
    /// `init_prediction` for the regressor, `init_log_odds` for the classifier
    #[serde(alias = "init_prediction", alias = "init_log_odds")]
    pub init: f64,
    pub learning_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_estimators: Option<usize>,
    pub trees: Vec<Tree>,
}

impl TreeEnsembleBranch {
    pub fn raw_output(&self, x: &[f64]) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.leaf_value(x)).sum();
        self.init + self.learning_rate * sum
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<u64>,
    /// Column order of the model input
    pub features: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reg_mae_days: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reg_r2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cls_auc: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cls_acc: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureImportance {
    #[serde(default)]
    pub regressor: BTreeMap<String, f64>,
    #[serde(default)]
    pub classifier: BTreeMap<String, f64>,
}

#[derive(Deserialize)]
struct RawModel {
    meta: ModelMeta,
    regressor: TreeEnsembleBranch,
    classifier: TreeEnsembleBranch,
    #[serde(default)]
    feature_importance: FeatureImportance,
}

/// Validated, immutable model artifact
#[derive(Debug, Clone)]
pub struct SerializedModel {
    pub meta: ModelMeta,
    pub regressor: TreeEnsembleBranch,
    pub classifier: TreeEnsembleBranch,
    pub feature_importance: FeatureImportance,
    layout: Vec<FeatureName>,
    ranked: Vec<(FeatureName, f64)>,
}

impl SerializedModel {
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let raw: RawModel = serde_json::from_str(json)?;
        Self::validate(raw)
    }

    pub fn from_path(path: &Path) -> Result<Self, ModelError> {
        if !path.exists() {
            return Err(ModelError::NotFound {
                path: path.display().to_string(),
            });
        }
        let data = std::fs::read_to_string(path).map_err(|e| ModelError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&data)
    }

    fn validate(raw: RawModel) -> Result<Self, ModelError> {
        let mut layout = Vec::with_capacity(raw.meta.features.len());
        for name in &raw.meta.features {
            let f = FeatureName::from_name(name)
                .ok_or_else(|| ModelError::UnknownFeature(name.clone()))?;
            if layout.contains(&f) {
                return Err(ModelError::Malformed(format!("duplicate feature {name}")));
            }
            layout.push(f);
        }
        if layout.is_empty() {
            return Err(ModelError::Malformed("model declares no features".into()));
        }

        for (branch, ensemble) in [("regressor", &raw.regressor), ("classifier", &raw.classifier)] {
            if !ensemble.init.is_finite() || !ensemble.learning_rate.is_finite() {
                return Err(ModelError::Malformed(format!("{branch}: non-finite parameters")));
            }
            for (i, tree) in ensemble.trees.iter().enumerate() {
                tree.validate(layout.len())
                    .map_err(|e| ModelError::Malformed(format!("{branch} tree {i}: {e}")))?;
            }
        }

        for name in raw.feature_importance.regressor.keys() {
            if FeatureName::from_name(name).is_none() {
                return Err(ModelError::UnknownFeature(name.clone()));
            }
        }
        let mut ranked: Vec<(FeatureName, f64)> = layout
            .iter()
            .filter_map(|f| {
                raw.feature_importance
                    .regressor
                    .get(f.as_str())
                    .map(|imp| (*f, *imp))
            })
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        Ok(Self {
            meta: raw.meta,
            regressor: raw.regressor,
            classifier: raw.classifier,
            feature_importance: raw.feature_importance,
            layout,
            ranked,
        })
    }

    /// Model column order
    pub fn layout(&self) -> &[FeatureName] {
        &self.layout
    }

    /// Regressor importances, highest first; ties keep model column order
    pub fn ranked_importance(&self) -> &[(FeatureName, f64)] {
        &self.ranked
    }

    /// Encode features in the artifact's column order. Unused trailing slots stay zero.
    pub fn encode(&self, features: &BehavioralFeatures) -> [f64; FeatureName::COUNT] {
        let mut x = [0.0; FeatureName::COUNT];
        for (slot, name) in x.iter_mut().zip(&self.layout) {
            *slot = features.value(*name);
        }
        x
    }
}
