//! Inference pipeline for premia.
//!
//! Converts one [`InputRecord`](premia_core::InputRecord) into the feature
//! vector the model was trained on and scores it:
//!
//! 1. materialise the record as a single row
//! 2. one-hot encode `sex`, `smoker` and `region` with the fitted encoder
//! 3. append the indicators, derive the age interaction terms
//! 4. drop the raw categoricals and redundant indicators
//! 5. check the columns against the model and predict
//!
//! [`Predictor`] wraps this with a write-once artifact cache.

pub mod encoder;
pub mod features;
pub mod frame;
pub mod model;
mod pipeline;

pub use encoder::{HandleUnknown, OneHotEncoder};
pub use frame::{Cell, FeatureRow};
pub use model::{Aggregation, LinearModel, Node, RegressionModel, Tree, TreeEnsemble};
pub use pipeline::{predict_premium, ArtifactPaths, Artifacts, Predictor};
