use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{MaxPool2d, MaxPool2dConfig},
        Dropout, DropoutConfig,
        Linear, LinearConfig,
        PaddingConfig2d,
    },
    prelude::*,
    tensor::activation::relu,
};

/// The model predicts a single steering angle per image.
pub const OUTPUT_SIZE: usize = 1;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct SteeringModelConfig {
    pub height:      usize,
    pub width:       usize,
    pub channels:    usize,
    pub output_size: usize,
    #[config(default = 0.5)]
    pub dropout:     f64,
}

impl SteeringModelConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> SteeringModel<B> {
        // Kernel 3 with padding 1: a stride-2 conv halves the
        // spatial size (rounding up), a stride-1 conv keeps it
        let conv0 = Conv2dConfig::new([self.channels, 16], [3, 3])
            .with_stride([2, 2])
            .with_padding(PaddingConfig2d::Explicit(1, 1))
            .init(device);
        let conv1 = Conv2dConfig::new([16, 32], [3, 3])
            .with_stride([2, 2])
            .with_padding(PaddingConfig2d::Explicit(1, 1))
            .init(device);
        let conv2 = Conv2dConfig::new([32, 64], [3, 3])
            .with_padding(PaddingConfig2d::Explicit(1, 1))
            .init(device);
        let pool = MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init();

        let flat = 64 * downsampled(self.height) * downsampled(self.width);
        let dense0 = LinearConfig::new(flat, 100).init(device);
        let dense1 = LinearConfig::new(100, 50).init(device);
        let dense2 = LinearConfig::new(50, 10).init(device);
        let output = LinearConfig::new(10, self.output_size).init(device);
        let dropout = DropoutConfig::new(self.dropout).init();

        SteeringModel {
            conv0, conv1, conv2, pool,
            dense0, dense1, dense2, output, dropout,
        }
    }
}

/// Spatial size of one input dimension after the conv/pool stack.
/// The padded stride-2 convolutions round up, pooling rounds down:
///   conv s2 → ceil(d/2), pool → floor(d/2), twice,
///   then the stride-1 conv keeps the size and the last pool halves.
fn downsampled(dim: usize) -> usize {
    let d = (dim + 1) / 2; // conv0, stride 2
    let d = d / 2;         // pool
    let d = (d + 1) / 2;   // conv1, stride 2
    let d = d / 2;         // pool
    d / 2                  // conv2 keeps size; final pool
}

#[derive(Module, Debug)]
pub struct SteeringModel<B: Backend> {
    pub conv0:   Conv2d<B>,
    pub conv1:   Conv2d<B>,
    pub conv2:   Conv2d<B>,
    pub pool:    MaxPool2d,
    pub dense0:  Linear<B>,
    pub dense1:  Linear<B>,
    pub dense2:  Linear<B>,
    pub output:  Linear<B>,
    pub dropout: Dropout,
}

impl<B: Backend> SteeringModel<B> {
    /// images: [batch, channels, height, width] → angles: [batch, 1]
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = self.pool.forward(relu(self.conv0.forward(images)));
        let x = self.pool.forward(relu(self.conv1.forward(x)));
        let x = self.pool.forward(relu(self.conv2.forward(x)));

        let x = self.dropout.forward(x.flatten::<2>(1, 3));
        let x = self.dropout.forward(relu(self.dense0.forward(x)));
        let x = self.dropout.forward(relu(self.dense1.forward(x)));
        let x = self.dropout.forward(relu(self.dense2.forward(x)));

        self.output.forward(x)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_downsampled_arithmetic() {
        // 160: conv→80, pool→40, conv→20, pool→10, pool→5
        assert_eq!(downsampled(160), 5);
        // 66: conv→33, pool→16, conv→8, pool→4, pool→2
        assert_eq!(downsampled(66), 2);
    }

    #[test]
    fn test_forward_shape_is_batch_by_one() {
        let device = Default::default();
        let config = SteeringModelConfig::new(64, 64, 3, OUTPUT_SIZE);
        let model  = config.init::<NdArray>(&device);

        let images = Tensor::<NdArray, 4>::zeros([2, 3, 64, 64], &device);
        let out = model.forward(images);

        assert_eq!(out.dims(), [2, 1]);
    }

    #[test]
    fn test_forward_handles_non_square_input() {
        let device = Default::default();
        let config = SteeringModelConfig::new(48, 96, 3, OUTPUT_SIZE);
        let model  = config.init::<NdArray>(&device);

        let images = Tensor::<NdArray, 4>::zeros([1, 3, 48, 96], &device);
        assert_eq!(model.forward(images).dims(), [1, 1]);
    }
}
