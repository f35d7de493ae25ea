// ============================================================
// Layer 4 — Steering Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec<SteeringSample>
// into GPU-ready tensors.
//
// How batching works here:
//   Input:  Vec of N SteeringSamples, each HWC u8 pixels
//   Output: SteeringBatch with
//             images  of shape [N, C, H, W]  (f32)
//             targets of shape [N, 1]        (f32)
//
// Two conversions happen while stacking:
//   1. u8 pixel values are cast to f32 (no rescaling — the model
//      was trained on raw 0–255 values)
//   2. HWC layout is transposed to CHW, which is what the
//      convolution layers expect
//
// Reference: Burn Book §4 (Batcher)

use burn::{data::dataloader::batcher::Batcher, prelude::*};

use crate::data::dataset::SteeringSample;

// ─── SteeringBatch ────────────────────────────────────────────────────────────
/// A batch of samples ready for the model forward pass.
/// All tensors have batch_size as their first dimension.
///
/// B is the Burn Backend (e.g. Wgpu, NdArray) —
/// generic so the same batcher works on any device.
#[derive(Debug, Clone)]
pub struct SteeringBatch<B: Backend> {
    /// Image stack — shape: [batch_size, channels, height, width]
    pub images: Tensor<B, 4>,

    /// Steering angles — shape: [batch_size, 1]
    pub targets: Tensor<B, 2>,
}

// ─── SteeringBatcher ──────────────────────────────────────────────────────────
/// The batcher struct — holds the target device so tensors
/// are created on the correct GPU/CPU.
#[derive(Clone, Debug)]
pub struct SteeringBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> SteeringBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<SteeringSample, SteeringBatch<B>> for SteeringBatcher<B> {
    fn batch(&self, items: Vec<SteeringSample>) -> SteeringBatch<B> {
        let batch_size = items.len();
        // All samples in a batch share one shape (the container
        // enforced this when the data was written)
        let shape = items[0].shape;

        let mut image_data = Vec::with_capacity(batch_size * shape.volume());
        let mut target_data = Vec::with_capacity(batch_size);

        for sample in &items {
            // HWC → CHW while casting to f32
            for c in 0..shape.channels {
                for y in 0..shape.height {
                    for x in 0..shape.width {
                        let idx = (y * shape.width + x) * shape.channels + c;
                        image_data.push(sample.pixels[idx] as f32);
                    }
                }
            }
            target_data.push(sample.steering);
        }

        let images = Tensor::<B, 1>::from_floats(image_data.as_slice(), &self.device)
            .reshape([batch_size, shape.channels, shape.height, shape.width]);

        let targets = Tensor::<B, 1>::from_floats(target_data.as_slice(), &self.device)
            .reshape([batch_size, 1]);

        SteeringBatch { images, targets }
    }
}
