use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub predict: f64,
}

#[derive(Debug, Serialize)]
pub struct EchoResponse {
    #[serde(rename = "Post Values")]
    pub post_values: Value,
}
