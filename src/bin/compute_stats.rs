//! Offline dataset statistics tool.
//!
//! Computes per-channel mean and standard deviation over a labeled image
//! folder and prints the two vectors. The values are normalization constants
//! meant to be copied by hand where needed; the serving path intentionally
//! does not consume them (see `ecovis::stats`).
//!
//! Usage: compute_stats --data-dir dataset/training

use std::path::PathBuf;

use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use ecovis::stats::compute_dataset_stats;

/// Dataset mean/std computation
#[derive(Parser, Debug)]
#[command(name = "compute_stats")]
#[command(about = "Compute per-channel mean/std over a labeled image directory")]
struct Cli {
    /// Root directory with one subdirectory per class
    #[arg(long)]
    data_dir: PathBuf,

    /// Image size to resize to before accumulating
    #[arg(long, default_value = "224")]
    image_size: u32,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .compact()
        .init();

    info!("Computing statistics over {:?}", cli.data_dir);
    let stats = compute_dataset_stats(&cli.data_dir, cli.image_size)?;

    info!("Processed {} images", stats.num_images);
    println!("Mean: {:?}", stats.mean);
    println!("Std: {:?}", stats.std);

    Ok(())
}
