// ============================================================
// Layer 5 — Predictor
// ============================================================
use anyhow::{bail, Result};
use burn::{backend::NdArray, data::dataloader::batcher::Batcher, prelude::*};
use std::path::Path;

use crate::data::batcher::SteeringBatcher;
use crate::data::dataset::SteeringSample;
use crate::data::images::load_image_batch;
use crate::domain::sample::SampleShape;
use crate::infra::snapshot::SnapshotStore;
use crate::ml::model::{SteeringModel, SteeringModelConfig};

type InferBackend = NdArray;

/// Loads the saved snapshot and predicts steering angles for
/// single images. Inference always runs on the CPU backend —
/// one image at a time needs no GPU.
pub struct Predictor {
    model:  SteeringModel<InferBackend>,
    shape:  SampleShape,
    device: <InferBackend as Backend>::Device,
}

impl Predictor {
    /// Rebuild the trained architecture from the snapshot
    /// metadata and load its weights.
    pub fn from_snapshot(store: &SnapshotStore) -> Result<Self> {
        let device = <InferBackend as Backend>::Device::default();
        let meta   = store.load_metadata()?;

        // Dropout 0.0 — inference must be deterministic
        let model_cfg = SteeringModelConfig::new(
            meta.height, meta.width, meta.channels, meta.output_size,
        )
        .with_dropout(0.0);

        let model = store.load_model(model_cfg.init::<InferBackend>(&device), &device)?;
        tracing::info!("Model loaded from snapshot");

        Ok(Self {
            model,
            shape: SampleShape::new(meta.height, meta.width, meta.channels),
            device,
        })
    }

    /// Predict the steering angle for one camera frame.
    pub fn predict(&self, image_path: &Path, resize_scale: Option<f64>) -> Result<f32> {
        let paths = [image_path.to_path_buf()];
        let batch = load_image_batch(&paths, vec![0.0], resize_scale)?;

        if batch.shape != self.shape {
            bail!(
                "image '{}' has shape {:?}, but the model was trained on {:?}",
                image_path.display(),
                batch.shape,
                self.shape,
            );
        }

        // Reuse the training batcher so inference sees exactly the
        // same HWC→CHW float conversion
        let sample = SteeringSample {
            pixels:   batch.pixels,
            shape:    batch.shape,
            steering: 0.0,
        };
        let batcher = SteeringBatcher::<InferBackend>::new(self.device.clone());
        let tensors = batcher.batch(vec![sample]);

        let prediction = self.model.forward(tensors.images);
        let values: Vec<f32> = prediction.into_data().to_vec().unwrap_or_default();

        values
            .first()
            .copied()
            .ok_or_else(|| anyhow::anyhow!("model returned no output"))
    }
}
