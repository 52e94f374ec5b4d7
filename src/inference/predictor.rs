//! Inference predictor.
//!
//! Owns the loaded model and device for the lifetime of the process. Weights
//! are read exactly once at startup; a missing or corrupt checkpoint is fatal
//! and must keep the service from ever binding.

use std::path::Path;

use burn::{
    module::Module,
    record::CompactRecorder,
    tensor::{backend::Backend, Tensor, TensorData},
};
use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::classes::{CLASS_NAMES, NUM_CLASSES};
use crate::error::{Error, Result};
use crate::inference::preprocess;
use crate::model::{WasteClassifier, WasteClassifierConfig};

/// Result of a single prediction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    /// Predicted class index
    pub class_index: usize,

    /// Predicted class name
    pub label: String,

    /// Probability of the predicted class
    pub confidence: f32,
}

impl Prediction {
    /// Build a prediction from a softmaxed probability vector (argmax)
    pub fn from_probabilities(probabilities: &[f32]) -> Result<Self> {
        if probabilities.len() != NUM_CLASSES {
            return Err(Error::Model(format!(
                "expected {} class probabilities, got {}",
                NUM_CLASSES,
                probabilities.len()
            )));
        }

        let (class_index, &confidence) = probabilities
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .ok_or_else(|| Error::Model("empty probability vector".to_string()))?;

        Ok(Self {
            class_index,
            label: CLASS_NAMES[class_index].to_string(),
            confidence,
        })
    }
}

/// Predictor for running inference with the trained model
pub struct Predictor<B: Backend> {
    model: WasteClassifier<B>,
    device: B::Device,
    image_size: u32,
}

impl<B: Backend> Predictor<B> {
    /// Load a trained checkpoint from `path` and build a ready predictor.
    ///
    /// Fails (and the caller must not serve) when the file is missing, the
    /// record cannot be read, or the class taxonomy does not match the model.
    pub fn load(config: &WasteClassifierConfig, path: &Path, device: B::Device) -> Result<Self> {
        config.validate()?;

        if config.num_classes != CLASS_NAMES.len() {
            return Err(Error::Config(format!(
                "model has {} output classes but the taxonomy lists {}",
                config.num_classes,
                CLASS_NAMES.len()
            )));
        }

        // CompactRecorder appends .mpk, so check both spellings before
        // handing the path to the recorder.
        if !path.exists() && !path.with_extension("mpk").exists() {
            return Err(Error::NotFound(format!("model weights at {:?}", path)));
        }

        let recorder = CompactRecorder::new();
        let model = WasteClassifier::new(config, &device)
            .load_file(path, &recorder, &device)
            .map_err(|e| Error::Model(format!("failed to load weights: {:?}", e)))?;

        Ok(Self {
            model,
            device,
            image_size: config.input_size as u32,
        })
    }

    /// Build a predictor around an already-constructed model (used by tests)
    pub fn from_model(config: &WasteClassifierConfig, model: WasteClassifier<B>, device: B::Device) -> Self {
        Self {
            model,
            device,
            image_size: config.input_size as u32,
        }
    }

    /// The input resolution the model expects
    pub fn image_size(&self) -> u32 {
        self.image_size
    }

    /// Run the full pipeline on raw uploaded bytes
    pub fn predict_bytes(&self, bytes: &[u8]) -> Result<Prediction> {
        let image = preprocess::decode_image(bytes)?;
        self.predict_image(&image)
    }

    /// Run preprocessing and a forward pass on a decoded image
    pub fn predict_image(&self, image: &DynamicImage) -> Result<Prediction> {
        let size = self.image_size;
        let resized = preprocess::resize_image(image, size, size);
        let chw = preprocess::to_chw_scaled(&resized.to_rgb8());

        let data = TensorData::new(chw, [3, size as usize, size as usize]);
        let input = Tensor::<B, 3>::from_data(data.convert::<B::FloatElem>(), &self.device)
            .unsqueeze::<4>();

        let probabilities: Vec<f32> = self
            .model
            .forward_softmax(input)
            .into_data()
            .to_vec()
            .map_err(|e| Error::Model(format!("failed to read output tensor: {:?}", e)))?;

        Prediction::from_probabilities(&probabilities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use image::{Rgb, RgbImage};

    fn test_config() -> WasteClassifierConfig {
        WasteClassifierConfig {
            num_classes: 6,
            input_size: 32,
            dropout_rate: 0.4,
            in_channels: 3,
            base_filters: 8,
        }
    }

    fn test_predictor() -> Predictor<NdArray> {
        let device = Default::default();
        let config = test_config();
        let model = WasteClassifier::new(&config, &device);
        Predictor::from_model(&config, model, device)
    }

    #[test]
    fn test_argmax_maps_every_class() {
        // A probability vector peaking at index i must map to label i.
        for (i, expected) in CLASS_NAMES.iter().enumerate() {
            let mut probs = vec![0.05f32; NUM_CLASSES];
            probs[i] = 0.75;

            let prediction = Prediction::from_probabilities(&probs).unwrap();
            assert_eq!(prediction.class_index, i);
            assert_eq!(prediction.label, *expected);
            assert!((prediction.confidence - 0.75).abs() < 1e-6);
        }
    }

    #[test]
    fn test_wrong_probability_length_rejected() {
        let err = Prediction::from_probabilities(&[0.5, 0.5]).unwrap_err();
        assert!(matches!(err, Error::Model(_)));
    }

    #[test]
    fn test_load_missing_weights_fails() {
        let device = Default::default();
        let result: Result<Predictor<NdArray>> = Predictor::load(
            &test_config(),
            Path::new("/nonexistent/ecovis.mpk"),
            device,
        );
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_predict_image_returns_known_label() {
        let predictor = test_predictor();
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 64, Rgb([200, 30, 90])));

        let prediction = predictor.predict_image(&image).unwrap();
        assert!(prediction.class_index < NUM_CLASSES);
        assert_eq!(prediction.label, CLASS_NAMES[prediction.class_index]);
        assert!((0.0..=1.0).contains(&prediction.confidence));
    }

    #[test]
    fn test_predict_bytes_rejects_garbage() {
        let predictor = test_predictor();
        let err = predictor.predict_bytes(b"definitely not an image").unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }
}
