//! Model module for the waste classification CNN.
//!
//! This module provides:
//! - The CNN architecture used by the serving path
//! - Model configuration matching the trained checkpoint

pub mod cnn;

// Re-export main types for convenience
pub use cnn::{WasteClassifier, WasteClassifierConfig};

/// Default dropout rate the checkpoint was trained with
pub const DEFAULT_DROPOUT: f64 = 0.4;

/// Default input image size (width and height)
pub const DEFAULT_INPUT_SIZE: usize = 224;
