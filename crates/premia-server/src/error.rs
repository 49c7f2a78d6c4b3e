//! Application error types and Axum response conversion.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use premia_core::PredictionError;
use serde::Serialize;

/// Application-level errors with HTTP status code mapping.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Unprocessable(String),
    MethodNotAllowed(String),
    Unavailable(String),
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PredictionError> for AppError {
    fn from(e: PredictionError) -> Self {
        let message = e.to_string();
        match e {
            PredictionError::MalformedInput(_)
            | PredictionError::MissingField(_)
            | PredictionError::InvalidField { .. } => AppError::BadRequest(message),
            PredictionError::UnknownCategory { .. } => AppError::Unprocessable(message),
            PredictionError::ArtifactLoad { .. } => AppError::Unavailable(message),
            PredictionError::SchemaMismatch(_) | PredictionError::NonFiniteOutput(_) => AppError::Internal(message),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::BadRequest(e.body_text())
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (AppError::BadRequest(message)
        | AppError::Unprocessable(message)
        | AppError::MethodNotAllowed(message)
        | AppError::Unavailable(message)
        | AppError::Internal(message)) = self;
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction_error_status_mapping() {
        let cases = [
            (PredictionError::MissingField("age".into()), StatusCode::BAD_REQUEST),
            (PredictionError::invalid_field("bmi", "negative"), StatusCode::BAD_REQUEST),
            (
                PredictionError::UnknownCategory { feature: "region".into(), value: "mars".into() },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (PredictionError::artifact_load("model.json", "missing"), StatusCode::SERVICE_UNAVAILABLE),
            (PredictionError::SchemaMismatch("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(AppError::from(err).status(), expected);
        }
    }
}
