//! EcoVis - waste image classification inference service
//!
//! A convolutional network trained to sort waste images into six categories,
//! served over a single HTTP upload endpoint. The crate provides:
//! - The CNN architecture and checkpoint loading ([`model`], [`inference`])
//! - The axum server ([`server`])
//! - Offline dataset normalization statistics ([`stats`])

pub mod backend;
pub mod classes;
pub mod config;
pub mod error;
pub mod inference;
pub mod model;
pub mod server;
pub mod stats;

pub use error::{Error, Result};
