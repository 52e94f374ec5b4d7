//! EcoVis Inference Server
//!
//! Loads the trained waste classifier once at startup and serves
//! `POST /predict`. A missing or unreadable checkpoint is fatal: the process
//! exits before binding rather than serve an uninitialized model.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use ecovis::backend::{backend_name, default_device, DefaultBackend};
use ecovis::classes::NUM_CLASSES;
use ecovis::config::ServiceConfig;
use ecovis::inference::Predictor;
use ecovis::model::WasteClassifierConfig;
use ecovis::server::{self, AppState};

/// EcoVis inference server
#[derive(Parser, Debug)]
#[command(name = "ecovis")]
#[command(version = "0.1.0")]
#[command(about = "HTTP inference server for waste image classification")]
struct Cli {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Path to the trained model weights
    #[arg(long, env = "ECOVIS_WEIGHTS", default_value = "ecovis.mpk")]
    weights: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    let config = ServiceConfig {
        weights_path: cli.weights,
        host: cli.host,
        port: cli.port,
    };

    info!("EcoVis Inference Server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Weights: {:?}", config.weights_path);
    info!("  Backend: {}", backend_name());
    info!("  Classes: {}", NUM_CLASSES);

    let device = default_device();
    let model_config = WasteClassifierConfig::new();
    let predictor: Predictor<DefaultBackend> =
        Predictor::load(&model_config, &config.weights_path, device)
            .context("refusing to serve without a loaded model")?;

    info!("Model loaded from {:?}", config.weights_path);

    let addr = config.bind_addr()?;
    let state = Arc::new(AppState::new(predictor));

    server::serve(addr, state).await
}
