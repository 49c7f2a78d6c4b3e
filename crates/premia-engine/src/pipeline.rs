//! Inference pipeline: loaded artifacts plus the single scoring entry point.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use premia_core::{InputRecord, PredictionError};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::encoder::OneHotEncoder;
use crate::features;
use crate::model::RegressionModel;

/// A model and the encoder it was trained alongside.
///
/// Only constructed through validation, so scoring can trust the node graph
/// and column counts.
#[derive(Debug, Clone)]
pub struct Artifacts {
    model: RegressionModel,
    encoder: OneHotEncoder,
}

impl Artifacts {
    /// Validates both artifacts before they can be used for scoring.
    pub fn new(model: RegressionModel, encoder: OneHotEncoder) -> Result<Self, PredictionError> {
        Self::validated(model, encoder, "model", "encoder")
    }

    pub fn from_json(model_json: &str, encoder_json: &str) -> Result<Self, PredictionError> {
        let model: RegressionModel =
            serde_json::from_str(model_json).map_err(|e| PredictionError::artifact_load("model", e))?;
        let encoder: OneHotEncoder =
            serde_json::from_str(encoder_json).map_err(|e| PredictionError::artifact_load("encoder", e))?;
        Self::new(model, encoder)
    }

    /// Reads and validates both artifact files.
    pub async fn load(paths: &ArtifactPaths) -> Result<Self, PredictionError> {
        let model: RegressionModel = read_json(&paths.model).await?;
        let encoder: OneHotEncoder = read_json(&paths.encoder).await?;
        let artifacts = Self::validated(
            model,
            encoder,
            &paths.model.display().to_string(),
            &paths.encoder.display().to_string(),
        )?;

        info!(
            model = %paths.model.display(),
            encoder = %paths.encoder.display(),
            features = artifacts.model.feature_names().len(),
            "Loaded artifacts"
        );
        Ok(artifacts)
    }

    /// `model_label` and `encoder_label` name the source in load errors.
    fn validated(
        model: RegressionModel,
        encoder: OneHotEncoder,
        model_label: &str,
        encoder_label: &str,
    ) -> Result<Self, PredictionError> {
        model
            .validate()
            .map_err(|e| PredictionError::artifact_load(model_label, e))?;
        encoder
            .validate()
            .map_err(|e| PredictionError::artifact_load(encoder_label, e))?;
        Ok(Self { model, encoder })
    }

    pub fn model(&self) -> &RegressionModel {
        &self.model
    }

    pub fn encoder(&self) -> &OneHotEncoder {
        &self.encoder
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, PredictionError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| PredictionError::artifact_load(path.display().to_string(), e))?;
    serde_json::from_str(&content).map_err(|e| PredictionError::artifact_load(path.display().to_string(), e))
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub encoder: PathBuf,
}

/// Scores one record against already-loaded artifacts.
pub fn predict_premium(artifacts: &Artifacts, record: &InputRecord) -> Result<f64, PredictionError> {
    let row = features::engineer(artifacts.encoder(), record)?;
    let vector = row.into_vector(artifacts.model().feature_names())?;

    let premium = artifacts.model().predict(&vector)?;
    if !premium.is_finite() {
        return Err(PredictionError::NonFiniteOutput(premium));
    }

    debug!(premium, "Scored record");
    Ok(premium)
}

// ─────────────────────────────────────────────────────────────────────────────
// Predictor
// ─────────────────────────────────────────────────────────────────────────────

/// Process-wide scoring handle with write-once artifact caching.
///
/// The first successful load is kept for the life of the predictor. A failed
/// load leaves the cache empty, so the next call tries again.
pub struct Predictor {
    paths: Option<ArtifactPaths>,
    artifacts: OnceCell<Arc<Artifacts>>,
}

impl Predictor {
    /// Lazily loads artifacts from `paths` on first use.
    pub fn new(paths: ArtifactPaths) -> Self {
        Self {
            paths: Some(paths),
            artifacts: OnceCell::new(),
        }
    }

    /// Wraps artifacts that are already in memory.
    pub fn with_artifacts(artifacts: Artifacts) -> Self {
        Self {
            paths: None,
            artifacts: OnceCell::new_with(Some(Arc::new(artifacts))),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.artifacts.initialized()
    }

    pub async fn artifacts(&self) -> Result<Arc<Artifacts>, PredictionError> {
        self.artifacts
            .get_or_try_init(|| async {
                let paths = self
                    .paths
                    .as_ref()
                    .ok_or_else(|| PredictionError::artifact_load("<none>", "no artifact paths configured"))?;
                Artifacts::load(paths).await.map(Arc::new)
            })
            .await
            .cloned()
    }

    /// Forces the artifacts into the cache.
    pub async fn preload(&self) -> Result<(), PredictionError> {
        self.artifacts().await.map(|_| ())
    }

    pub async fn predict(&self, record: &InputRecord) -> Result<f64, PredictionError> {
        let artifacts = self.artifacts().await?;
        predict_premium(&artifacts, record)
    }
}
