// ============================================================
// Layer 2 — Predict Use Case
// ============================================================
// Loads the trained snapshot once and answers "what steering
// angle would the model output for this frame?" — the smallest
// possible consumer of the snapshot the trainer writes.

use anyhow::Result;
use std::path::Path;

use crate::infra::snapshot::SnapshotStore;
use crate::ml::predictor::Predictor;

pub struct PredictUseCase {
    predictor: Predictor,
}

impl PredictUseCase {
    /// Build the use case from the snapshot directory.
    pub fn new(snapshot_dir: &str) -> Result<Self> {
        let store = SnapshotStore::new(snapshot_dir);
        let predictor = Predictor::from_snapshot(&store)?;
        Ok(Self { predictor })
    }

    /// Predict the steering angle for one camera frame.
    pub fn predict(&self, image: &Path, resize_scale: Option<f64>) -> Result<f32> {
        self.predictor.predict(image, resize_scale)
    }
}
