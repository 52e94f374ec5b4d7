//! Offline dataset statistics.
//!
//! Computes per-channel mean and standard deviation over a labeled image
//! folder (one subdirectory per class), for use as normalization constants.
//! Runs once, offline; the result is printed and copied by hand wherever it
//! is needed.
//!
//! Known discrepancy, kept on purpose: the serving path in
//! [`crate::inference::preprocess`] only rescales to `[0,1]` and never applies
//! these statistics, because that is the input distribution the checkpoint was
//! trained on. See DESIGN.md.

use std::path::Path;

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::inference::preprocess::resize_image;

/// Per-channel statistics over a dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelStats {
    /// Per-channel mean, RGB order, in `[0,1]` units
    pub mean: [f64; 3],
    /// Per-channel standard deviation, RGB order
    pub std: [f64; 3],
    /// Number of images the statistics were computed over
    pub num_images: usize,
}

/// Running accumulator for per-channel mean/std.
///
/// Accumulates the reference algorithm with a batch size of one: each image
/// contributes its own per-channel mean and std, weighted equally, and the
/// totals are divided by the image count at the end.
#[derive(Debug, Default)]
pub struct StatsAccumulator {
    mean_sum: [f64; 3],
    std_sum: [f64; 3],
    count: usize,
}

impl StatsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one image's statistics to the running totals
    pub fn push(&mut self, image: &RgbImage) {
        let (width, height) = image.dimensions();
        let num_pixels = (width * height) as f64;
        if num_pixels == 0.0 {
            return;
        }

        let mut sum = [0.0f64; 3];
        let mut sum_sq = [0.0f64; 3];

        for pixel in image.pixels() {
            for c in 0..3 {
                let v = pixel[c] as f64 / 255.0;
                sum[c] += v;
                sum_sq[c] += v * v;
            }
        }

        for c in 0..3 {
            let mean = sum[c] / num_pixels;
            let variance = (sum_sq[c] / num_pixels - mean * mean).max(0.0);
            self.mean_sum[c] += mean;
            self.std_sum[c] += variance.sqrt();
        }

        self.count += 1;
    }

    /// Number of images accumulated so far
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Finalize into per-channel statistics
    pub fn finalize(&self) -> Result<ChannelStats> {
        if self.count == 0 {
            return Err(Error::Other("no images accumulated".to_string()));
        }

        let n = self.count as f64;
        Ok(ChannelStats {
            mean: [
                self.mean_sum[0] / n,
                self.mean_sum[1] / n,
                self.mean_sum[2] / n,
            ],
            std: [
                self.std_sum[0] / n,
                self.std_sum[1] / n,
                self.std_sum[2] / n,
            ],
            num_images: self.count,
        })
    }
}

/// Compute per-channel statistics over a labeled image directory.
///
/// Expects `root` to contain one subdirectory per class; every regular file
/// inside them is treated as an image. Each image is resized to
/// `size` x `size` before accumulation. Undecodable files are logged and
/// skipped.
pub fn compute_dataset_stats(root: &Path, size: u32) -> Result<ChannelStats> {
    if !root.is_dir() {
        return Err(Error::NotFound(format!("dataset directory {:?}", root)));
    }

    let mut accumulator = StatsAccumulator::new();

    for class_entry in std::fs::read_dir(root)? {
        let class_dir = class_entry?.path();
        if !class_dir.is_dir() {
            continue;
        }

        for file_entry in std::fs::read_dir(&class_dir)? {
            let path = file_entry?.path();
            if !path.is_file() {
                continue;
            }

            match image::open(&path) {
                Ok(img) => {
                    let resized = resize_image(&img, size, size);
                    accumulator.push(&resized.to_rgb8());
                }
                Err(e) => {
                    tracing::warn!("Skipping unreadable image {:?}: {}", path, e);
                }
            }
        }

        tracing::info!(
            "Processed class directory {:?} ({} images so far)",
            class_dir.file_name().unwrap_or_default(),
            accumulator.len()
        );
    }

    accumulator.finalize()
}
