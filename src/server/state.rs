//! Application state for the inference server.

use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Instant;

use crate::backend::DefaultBackend;
use crate::inference::Predictor;

/// Shared application state
pub struct AppState {
    /// The loaded predictor; read-only for the process lifetime
    pub predictor: Predictor<DefaultBackend>,
    /// Total predict requests served
    pub total_requests: AtomicU64,
    /// Server start time
    pub started_at: Instant,
}

impl AppState {
    pub fn new(predictor: Predictor<DefaultBackend>) -> Self {
        Self {
            predictor,
            total_requests: AtomicU64::new(0),
            started_at: Instant::now(),
        }
    }

    /// Seconds since the server started
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

/// Shared state handle passed to every route handler
pub type SharedState = Arc<AppState>;
