//! Inference module: request preprocessing and model prediction.

pub mod predictor;
pub mod preprocess;

// Re-export main types for convenience
pub use predictor::{Prediction, Predictor};
pub use preprocess::{preprocess_bytes, IMAGE_SIZE};
