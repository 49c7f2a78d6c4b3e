//! HTTP route handlers for the prediction server.

pub mod prediction;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

use crate::dto::EchoResponse;
use crate::error::AppError;

const INVALID_FORMAT: &str = "Invalid format.";

/// Health check endpoint.
pub async fn health() -> &'static str {
    "OK"
}

/// GET / - Liveness check.
pub async fn welcome() -> &'static str {
    "Welcome to the Insurance Premium Prediction API!"
}

/// POST / - Echoes the posted JSON back.
pub async fn echo(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<EchoResponse>), AppError> {
    let Ok(Json(value)) = payload else {
        return Err(AppError::BadRequest(INVALID_FORMAT.into()));
    };
    if !is_truthy(&value) {
        return Err(AppError::BadRequest(INVALID_FORMAT.into()));
    }

    Ok((StatusCode::CREATED, Json(EchoResponse { post_values: value })))
}

/// Empty containers, zero, `false` and `null` carry nothing worth echoing.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
