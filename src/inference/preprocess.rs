//! Request-side image preprocessing.
//!
//! Turns uploaded bytes into the flat `[0,1]`-scaled CHW vector the network
//! expects. Note the serving path deliberately applies no per-channel mean/std
//! normalization; the checkpoint was trained on plain `[0,1]` inputs (see the
//! `stats` module and DESIGN.md).

use image::{imageops::FilterType, DynamicImage, RgbImage};

use crate::error::{Error, Result};

/// Serving-side input resolution (width and height)
pub const IMAGE_SIZE: u32 = 224;

/// Decode raw uploaded bytes into an image
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    if bytes.is_empty() {
        return Err(Error::Decode("empty upload".to_string()));
    }
    image::load_from_memory(bytes).map_err(|e| Error::Decode(e.to_string()))
}

/// Resize an image to the target dimensions, ignoring aspect ratio
pub fn resize_image(image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    image.resize_exact(width, height, FilterType::Lanczos3)
}

/// Scale an RGB image to `[0,1]` in channel-first layout
///
/// Returns CHW layout: all R values, then all G values, then all B values.
pub fn to_chw_scaled(rgb: &RgbImage) -> Vec<f32> {
    let (width, height) = rgb.dimensions();
    let num_pixels = (width * height) as usize;

    let mut scaled = vec![0.0f32; 3 * num_pixels];

    for (i, pixel) in rgb.pixels().enumerate() {
        scaled[i] = pixel[0] as f32 / 255.0;
        scaled[num_pixels + i] = pixel[1] as f32 / 255.0;
        scaled[2 * num_pixels + i] = pixel[2] as f32 / 255.0;
    }

    scaled
}

/// Full pipeline: decode, resize to `size` x `size`, convert to RGB, scale
///
/// Returns a flat CHW vector of length `3 * size * size`.
pub fn preprocess_bytes(bytes: &[u8], size: u32) -> Result<Vec<f32>> {
    let image = decode_image(bytes)?;
    let resized = resize_image(&image, size, size);
    Ok(to_chw_scaled(&resized.to_rgb8()))
}
