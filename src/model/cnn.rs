//! CNN architecture for waste classification.
//!
//! A fixed-topology classifier built with the Burn framework: four
//! convolutional blocks with doubling filter counts, followed by a flattened
//! fully-connected head. The topology matches the checkpoint the service
//! loads, so none of it is tunable at runtime.

use burn::{
    config::Config,
    module::Module,
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{MaxPool2d, MaxPool2dConfig},
        Dropout, DropoutConfig, Linear, LinearConfig, PaddingConfig2d, Relu,
    },
    tensor::{backend::Backend, Tensor},
};

use crate::error::Error;

/// Configuration for the WasteClassifier CNN model
#[derive(Config, Debug)]
pub struct WasteClassifierConfig {
    /// Number of output classes
    #[config(default = "6")]
    pub num_classes: usize,

    /// Input image size (assumes square images)
    #[config(default = "224")]
    pub input_size: usize,

    /// Dropout rate applied before the final projection
    #[config(default = "0.4")]
    pub dropout_rate: f64,

    /// Number of input channels (3 for RGB)
    #[config(default = "3")]
    pub in_channels: usize,

    /// Number of filters in the first convolutional block
    #[config(default = "32")]
    pub base_filters: usize,
}

impl WasteClassifierConfig {
    /// Validate the configuration against the architecture's contracts
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.num_classes == 0 {
            return Err(Error::Config("num_classes must be greater than 0".into()));
        }
        // Four 2x2 pools halve the spatial size four times; the flatten width
        // is fixed at construction, so the input size must divide cleanly.
        if self.input_size == 0 || self.input_size % 16 != 0 {
            return Err(Error::Config(format!(
                "input_size must be a positive multiple of 16, got {}",
                self.input_size
            )));
        }
        Ok(())
    }
}

/// A convolutional block: 3x3 same-padding Conv2d, ReLU, 2x2 max-pool
#[derive(Module, Debug)]
pub struct ConvBlock<B: Backend> {
    pub conv: Conv2d<B>,
    pub relu: Relu,
    pub pool: MaxPool2d,
}

impl<B: Backend> ConvBlock<B> {
    /// Create a new convolutional block
    pub fn new(in_channels: usize, out_channels: usize, device: &B::Device) -> Self {
        let conv = Conv2dConfig::new([in_channels, out_channels], [3, 3])
            .with_padding(PaddingConfig2d::Same)
            .init(device);

        let pool = MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init();

        Self {
            conv,
            relu: Relu::new(),
            pool,
        }
    }

    /// Forward pass through the block; halves the spatial dimensions
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.conv.forward(x);
        let x = self.relu.forward(x);
        self.pool.forward(x)
    }
}

/// Waste image classifier
///
/// Architecture:
/// - 4 convolutional blocks with doubling filter counts (32 -> 64 -> 128 -> 256)
/// - Flatten to 256 * (input_size/16)^2 features
/// - Fully connected head: 512 hidden units with ReLU and dropout, then
///   a projection to the class logits
#[derive(Module, Debug)]
pub struct WasteClassifier<B: Backend> {
    pub conv1: ConvBlock<B>,
    pub conv2: ConvBlock<B>,
    pub conv3: ConvBlock<B>,
    pub conv4: ConvBlock<B>,

    pub fc1: Linear<B>,
    pub dropout: Dropout,
    pub fc2: Linear<B>,

    num_classes: usize,
}

impl<B: Backend> WasteClassifier<B> {
    /// Create a new WasteClassifier from configuration
    pub fn new(config: &WasteClassifierConfig, device: &B::Device) -> Self {
        let base = config.base_filters;

        let conv1 = ConvBlock::new(config.in_channels, base, device);
        let conv2 = ConvBlock::new(base, base * 2, device);
        let conv3 = ConvBlock::new(base * 2, base * 4, device);
        let conv4 = ConvBlock::new(base * 4, base * 8, device);

        // Spatial size after four 2x2 pools
        let final_size = config.input_size / 16;
        let flat_features = base * 8 * final_size * final_size;

        let fc1 = LinearConfig::new(flat_features, 512).init(device);
        let dropout = DropoutConfig::new(config.dropout_rate).init();
        let fc2 = LinearConfig::new(512, config.num_classes).init(device);

        Self {
            conv1,
            conv2,
            conv3,
            conv4,
            fc1,
            dropout,
            fc2,
            num_classes: config.num_classes,
        }
    }

    /// Forward pass through the network
    ///
    /// # Arguments
    /// * `x` - Input tensor of shape [batch_size, 3, input_size, input_size]
    ///
    /// # Returns
    /// * Logits tensor of shape [batch_size, num_classes]
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = self.conv1.forward(x);
        let x = self.conv2.forward(x);
        let x = self.conv3.forward(x);
        let x = self.conv4.forward(x);

        // Flatten: [B, C, H, W] -> [B, C * H * W]
        let [batch_size, channels, height, width] = x.dims();
        let x = x.reshape([batch_size, channels * height * width]);

        let x = self.fc1.forward(x);
        let x = Relu::new().forward(x);
        let x = self.dropout.forward(x);
        self.fc2.forward(x)
    }

    /// Forward pass with softmax over the class axis, for inference
    pub fn forward_softmax(&self, x: Tensor<B, 4>) -> Tensor<B, 2> {
        let logits = self.forward(x);
        burn::tensor::activation::softmax(logits, 1)
    }

    /// Get the number of output classes
    pub fn num_classes(&self) -> usize {
        self.num_classes
    }
}
