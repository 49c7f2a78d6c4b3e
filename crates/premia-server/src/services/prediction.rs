//! Bridges validated request payloads to the inference pipeline.

use premia_core::{InputRecord, PredictionError};
use serde_json::Value;
use tracing::{debug, info};

use crate::ServerState;

/// Validates a raw payload and scores it.
pub async fn submit_prediction(state: &ServerState, payload: &Value) -> Result<f64, PredictionError> {
    let record = InputRecord::from_json(payload)?;
    debug!(?record, "Validated prediction request");

    let premium = state.predictor.predict(&record).await?;
    info!(premium, age = record.age, smoker = %record.smoker, region = %record.region, "Premium predicted");
    Ok(premium)
}
