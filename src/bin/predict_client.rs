//! Manual client for the inference endpoint.
//!
//! Reads one local image file, POSTs it to a running server as a multipart
//! upload, and prints the JSON response. No retries, no batching.
//!
//! Usage: predict_client path/to/image.jpg [--url http://host:8080/predict]

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Send one image to the EcoVis prediction endpoint
#[derive(Parser, Debug)]
#[command(name = "predict_client")]
#[command(about = "POST an image to a running EcoVis server")]
struct Cli {
    /// Path to the image file to classify
    image: PathBuf,

    /// Prediction endpoint URL
    #[arg(long, default_value = "http://localhost:8080/predict")]
    url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let bytes = std::fs::read(&cli.image)
        .map_err(|e| anyhow::anyhow!("could not read image file {:?}: {}", cli.image, e))?;

    let file_name = cli
        .image
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;

    let form = reqwest::multipart::Form::new()
        .part("file", reqwest::multipart::Part::bytes(bytes).file_name(file_name));

    let response = client.post(&cli.url).multipart(form).send().await?;
    let status = response.status();
    let body = response.text().await?;

    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", body),
    }

    if !status.is_success() {
        anyhow::bail!("server returned {}", status);
    }

    Ok(())
}
