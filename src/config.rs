//! Service configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Server configuration, assembled from CLI arguments and environment
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Path to the trained model weights (Burn CompactRecorder format)
    pub weights_path: PathBuf,
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            weights_path: PathBuf::from("ecovis.mpk"),
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ServiceConfig {
    /// Resolve the configured bind address
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| Error::Config(format!("invalid bind address: {}", e)))
    }
}
