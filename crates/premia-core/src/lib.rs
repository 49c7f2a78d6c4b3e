//! Core domain types and error definitions for premia.
//!
//! This crate provides the types shared between the inference pipeline and
//! the HTTP gateway:
//!
//! - [`PredictionError`] — Error type for every stage of a prediction
//! - [`InputRecord`] — One applicant, validated at the boundary
//!
//! # Example
//!
//! ```rust
//! use premia_core::InputRecord;
//!
//! let payload = serde_json::json!({
//!     "age": 19, "sex": "female", "bmi": 27.9,
//!     "children": 0, "smoker": "yes", "region": "southwest"
//! });
//!
//! let record = InputRecord::from_json(&payload).unwrap();
//! assert_eq!(record.region, "southwest");
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub const AGE: &str = "age";
pub const SEX: &str = "sex";
pub const BMI: &str = "bmi";
pub const CHILDREN: &str = "children";
pub const SMOKER: &str = "smoker";
pub const REGION: &str = "region";

/// Column layout of a materialised input record.
pub const INPUT_COLUMNS: [&str; 6] = [AGE, SEX, BMI, CHILDREN, SMOKER, REGION];

/// Columns handed to the categorical encoder.
pub const CATEGORICAL_COLUMNS: [&str; 3] = [SEX, SMOKER, REGION];

/// Upper bounds accepted for the numeric inputs.
pub const MAX_AGE: f64 = 150.0;
pub const MAX_BMI: f64 = 200.0;

/// Errors that can occur while turning a request into a premium estimate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictionError {
    /// Model or encoder file is missing, unreadable or structurally invalid.
    #[error("Failed to load artifact {path}: {reason}")]
    ArtifactLoad { path: String, reason: String },

    /// Payload is not a JSON object.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// A required input field is absent or null.
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// A field is present but has the wrong type or an out-of-range value.
    #[error("Invalid value for field {field}: {reason}")]
    InvalidField { field: String, reason: String },

    /// A categorical value was not seen when the encoder was fitted.
    #[error("Unknown category {value:?} for feature {feature}")]
    UnknownCategory { feature: String, value: String },

    /// The engineered feature vector does not line up with the model.
    #[error("Feature schema mismatch: {0}")]
    SchemaMismatch(String),

    /// The model produced NaN or an infinite value.
    #[error("Model produced a non-finite prediction: {0}")]
    NonFiniteOutput(f64),
}

impl PredictionError {
    pub fn artifact_load(path: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        PredictionError::ArtifactLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_field(field: &str, reason: impl Into<String>) -> Self {
        PredictionError::InvalidField {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// True for failures caused by the caller's payload rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PredictionError::MalformedInput(_)
                | PredictionError::MissingField(_)
                | PredictionError::InvalidField { .. }
                | PredictionError::UnknownCategory { .. }
        )
    }
}

/// A single applicant as submitted to the prediction endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputRecord {
    pub age: f64,
    pub sex: String,
    pub bmi: f64,
    pub children: u32,
    pub smoker: String,
    pub region: String,
}

impl InputRecord {
    /// Validates an arbitrary JSON payload into a typed record.
    ///
    /// Every required field is looked up by name; `null` counts as missing.
    /// Keys outside the six input columns are ignored.
    pub fn from_json(payload: &Value) -> Result<Self, PredictionError> {
        let Value::Object(obj) = payload else {
            return Err(PredictionError::MalformedInput(format!(
                "expected a JSON object, got {}",
                json_kind(payload)
            )));
        };

        Ok(Self {
            age: bounded_number(obj, AGE, MAX_AGE)?,
            sex: category(obj, SEX)?,
            bmi: bounded_number(obj, BMI, MAX_BMI)?,
            children: count(obj, CHILDREN)?,
            smoker: category(obj, SMOKER)?,
            region: category(obj, REGION)?,
        })
    }

    /// Raw value of a categorical column.
    pub fn category(&self, column: &str) -> Option<&str> {
        match column {
            SEX => Some(&self.sex),
            SMOKER => Some(&self.smoker),
            REGION => Some(&self.region),
            _ => None,
        }
    }
}

fn required<'a>(obj: &'a Map<String, Value>, field: &str) -> Result<&'a Value, PredictionError> {
    match obj.get(field) {
        None | Some(Value::Null) => Err(PredictionError::MissingField(field.to_string())),
        Some(v) => Ok(v),
    }
}

fn bounded_number(obj: &Map<String, Value>, field: &str, max: f64) -> Result<f64, PredictionError> {
    let value = required(obj, field)?;
    let n = value
        .as_f64()
        .ok_or_else(|| PredictionError::invalid_field(field, format!("expected a number, got {}", json_kind(value))))?;
    if !n.is_finite() || n < 0.0 || n > max {
        return Err(PredictionError::invalid_field(field, format!("{n} is outside 0..={max}")));
    }
    Ok(n)
}

fn count(obj: &Map<String, Value>, field: &str) -> Result<u32, PredictionError> {
    let value = required(obj, field)?;
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).map_err(|_| PredictionError::invalid_field(field, format!("{n} is too large")));
    }

    // 2.0 is accepted as 2; 2.5 and negatives are not.
    match value.as_f64() {
        Some(n) if n >= 0.0 && n.fract() == 0.0 && n <= u32::MAX as f64 => Ok(n as u32),
        Some(n) => Err(PredictionError::invalid_field(field, format!("expected a non-negative integer, got {n}"))),
        None => Err(PredictionError::invalid_field(field, format!("expected an integer, got {}", json_kind(value)))),
    }
}

fn category(obj: &Map<String, Value>, field: &str) -> Result<String, PredictionError> {
    let value = required(obj, field)?;
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| PredictionError::invalid_field(field, format!("expected a string, got {}", json_kind(value))))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
