//! One-hot encoder artifact.

use premia_core::PredictionError;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// What to do with a categorical value the encoder was not fitted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleUnknown {
    /// Fail with [`PredictionError::UnknownCategory`].
    #[default]
    Error,
    /// Emit an all-zero indicator block for that feature.
    Ignore,
}

/// Fitted categorical-to-indicator transform.
///
/// `categories[i]` holds the fitted vocabulary of `features[i]`, in the
/// order the indicator columns are emitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    pub features: Vec<String>,
    pub categories: Vec<Vec<String>>,
    #[serde(default)]
    pub handle_unknown: HandleUnknown,
}

impl OneHotEncoder {
    /// Checks the structural invariants a fitted encoder must satisfy.
    pub fn validate(&self) -> Result<(), String> {
        if self.features.len() != self.categories.len() {
            return Err(format!(
                "{} features but {} category lists",
                self.features.len(),
                self.categories.len()
            ));
        }

        for (i, feature) in self.features.iter().enumerate() {
            if self.features[..i].contains(feature) {
                return Err(format!("duplicate feature {feature:?}"));
            }
            let cats = &self.categories[i];
            if cats.is_empty() {
                return Err(format!("feature {feature:?} has no categories"));
            }
            for (j, cat) in cats.iter().enumerate() {
                if cats[..j].contains(cat) {
                    return Err(format!("feature {feature:?} lists category {cat:?} twice"));
                }
            }
        }

        Ok(())
    }

    /// Indicator column names, `<feature>_<category>`, in emission order.
    pub fn feature_names_out(&self) -> Vec<String> {
        self.features
            .iter()
            .zip(&self.categories)
            .flat_map(|(feature, cats)| cats.iter().map(move |cat| format!("{feature}_{cat}")))
            .collect()
    }

    /// Encodes one value per fitted feature, given in `features` order.
    pub fn transform(&self, values: &[&str]) -> Result<Vec<f64>, PredictionError> {
        if values.len() != self.features.len() {
            return Err(PredictionError::SchemaMismatch(format!(
                "encoder expects {} categorical values, got {}",
                self.features.len(),
                values.len()
            )));
        }

        let width = self.categories.iter().map(Vec::len).sum();
        let mut out = Vec::with_capacity(width);

        for ((feature, cats), value) in self.features.iter().zip(&self.categories).zip(values) {
            let hit = cats.iter().position(|c| c.as_str() == *value);
            if hit.is_none() {
                match self.handle_unknown {
                    HandleUnknown::Error => {
                        return Err(PredictionError::UnknownCategory {
                            feature: feature.clone(),
                            value: value.to_string(),
                        });
                    }
                    HandleUnknown::Ignore => {
                        warn!(feature = %feature, value = %value, "Unknown category encoded as all zeros");
                    }
                }
            }
            out.extend((0..cats.len()).map(|i| if Some(i) == hit { 1.0 } else { 0.0 }));
        }

        Ok(out)
    }
}

#[cfg(test)]
pub(crate) fn fitted() -> OneHotEncoder {
    OneHotEncoder {
        features: vec!["sex".into(), "smoker".into(), "region".into()],
        categories: vec![
            vec!["female".into(), "male".into()],
            vec!["no".into(), "yes".into()],
            vec![
                "northeast".into(),
                "northwest".into(),
                "southeast".into(),
                "southwest".into(),
            ],
        ],
        handle_unknown: HandleUnknown::Error,
    }
}
