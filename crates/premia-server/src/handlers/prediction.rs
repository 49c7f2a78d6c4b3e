//! Premium prediction HTTP handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde_json::Value;
use tracing::{error, warn};

use crate::dto::PredictResponse;
use crate::error::AppError;
use crate::services::prediction as prediction_service;
use crate::ServerState;

/// POST /getInsurancePremiumPrediction - Scores one applicant.
pub async fn predict(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PredictResponse>, AppError> {
    let Json(payload) = payload.map_err(|e| {
        warn!("Rejected prediction body: {}", e.body_text());
        AppError::from(e)
    })?;

    let predict = prediction_service::submit_prediction(&state, &payload)
        .await
        .map_err(|e| {
            if e.is_client_error() {
                warn!("Rejected prediction request: {}", e);
            } else {
                error!("Prediction failed: {}", e);
            }
            AppError::from(e)
        })?;

    Ok(Json(PredictResponse { predict }))
}

/// GET /getInsurancePremiumPrediction - Only POST is supported.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed("Invalid Method.".into())
}
