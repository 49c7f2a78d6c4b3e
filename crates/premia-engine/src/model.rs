//! Regression model artifacts.
//!
//! Models are produced offline and exchanged as JSON. Two families are
//! understood: a linear model and an additive ensemble of regression trees.

use premia_core::PredictionError;
use serde::{Deserialize, Serialize};

/// A fitted regression model, tagged by `kind` in its JSON form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegressionModel {
    Linear(LinearModel),
    TreeEnsemble(TreeEnsemble),
}

impl RegressionModel {
    /// Column names, in the order the model was trained on.
    pub fn feature_names(&self) -> &[String] {
        match self {
            RegressionModel::Linear(m) => &m.feature_names,
            RegressionModel::TreeEnsemble(m) => &m.feature_names,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let names = self.feature_names();
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(format!("duplicate feature name {name:?}"));
            }
        }
        match self {
            RegressionModel::Linear(m) => m.validate(),
            RegressionModel::TreeEnsemble(m) => m.validate(),
        }
    }

    /// Scores one row laid out as [`Self::feature_names`].
    pub fn predict(&self, features: &[f64]) -> Result<f64, PredictionError> {
        let expected = self.feature_names().len();
        if features.len() != expected {
            return Err(PredictionError::SchemaMismatch(format!(
                "model expects {expected} features, got {}",
                features.len()
            )));
        }

        match self {
            RegressionModel::Linear(m) => Ok(m.predict(features)),
            RegressionModel::TreeEnsemble(m) => m.predict(features),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Linear
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LinearModel {
    fn validate(&self) -> Result<(), String> {
        if self.coefficients.len() != self.feature_names.len() {
            return Err(format!(
                "{} coefficients for {} features",
                self.coefficients.len(),
                self.feature_names.len()
            ));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err("non-finite parameter".into());
        }
        Ok(())
    }

    fn predict(&self, features: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(c, x)| c * x)
                .sum::<f64>()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tree ensemble
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Boosted trees: outputs are added up.
    #[default]
    Sum,
    /// Bagged trees: outputs are averaged.
    Mean,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub feature_names: Vec<String>,
    #[serde(default)]
    pub base_score: f64,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default)]
    pub aggregation: Aggregation,
    pub trees: Vec<Tree>,
}

fn default_learning_rate() -> f64 {
    1.0
}

/// A regression tree stored as a flat node list rooted at index 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

impl TreeEnsemble {
    fn validate(&self) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("ensemble has no trees".into());
        }
        for (t, tree) in self.trees.iter().enumerate() {
            tree.validate(self.feature_names.len())
                .map_err(|e| format!("tree {t}: {e}"))?;
        }
        Ok(())
    }

    fn predict(&self, features: &[f64]) -> Result<f64, PredictionError> {
        let mut total = 0.0;
        for (t, tree) in self.trees.iter().enumerate() {
            total += tree
                .predict(features)
                .map_err(|e| PredictionError::SchemaMismatch(format!("tree {t}: {e}")))?;
        }
        let combined = match self.aggregation {
            Aggregation::Sum => total,
            Aggregation::Mean => total / self.trees.len() as f64,
        };
        Ok(self.base_score + self.learning_rate * combined)
    }
}

impl Tree {
    /// Children always point forward, so a walk from the root terminates.
    fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("empty tree".into());
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if let Node::Split { feature, left, right, .. } = *node {
                if feature >= n_features {
                    return Err(format!("node {i} splits on feature {feature}, model has {n_features}"));
                }
                for child in [left, right] {
                    if child <= i || child >= self.nodes.len() {
                        return Err(format!("node {i} has invalid child {child}"));
                    }
                }
            }
        }
        Ok(())
    }

    /// Walks from the root to a leaf. A walk longer than the node count means
    /// the tree has a cycle.
    fn predict(&self, features: &[f64]) -> Result<f64, String> {
        let mut idx = 0;
        for _ in 0..self.nodes.len() {
            match self.nodes.get(idx) {
                Some(Node::Leaf { value }) => return Ok(*value),
                Some(&Node::Split { feature, threshold, left, right }) => {
                    let x = features
                        .get(feature)
                        .ok_or_else(|| format!("node {idx} splits on missing feature {feature}"))?;
                    idx = if *x <= threshold { left } else { right };
                }
                None => return Err(format!("node {idx} does not exist")),
            }
        }
        Err("walk did not reach a leaf".into())
    }
}
