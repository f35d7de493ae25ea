// ============================================================
// Layer 6 — Model Snapshot Store
// ============================================================
// Saves and restores the trained model using Burn's
// CompactRecorder.
//
// What gets saved:
//   1. steering_model.mpk.gz — all learned parameters
//   2. steering_model.json   — the metadata needed to rebuild
//                              the exact architecture before the
//                              weights can be loaded into it
//
// There is exactly ONE snapshot: every save overwrites the
// previous one. The driver saves after each data directory, so
// the file on disk is always the most recently trained state —
// no epoch numbering, no history.
//
// Burn's CompactRecorder:
//   - Serialises model parameters to MessagePack format
//   - Compresses with gzip for smaller file size
//   - Type-safe: loading fails if the architecture doesn't match
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::ml::model::SteeringModel;

/// Base name of the snapshot — the recorder adds .mpk.gz
const SNAPSHOT_NAME: &str = "steering_model";
const METADATA_NAME: &str = "steering_model.json";

/// Everything needed to rebuild the saved model's architecture,
/// plus the headline numbers of the run that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub height:      usize,
    pub width:       usize,
    pub channels:    usize,
    pub output_size: usize,
    pub epochs:      usize,
    pub test_loss:   f64,
}

/// Manages the single named model snapshot on disk.
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    /// Create a store rooted at `dir`, creating the directory
    /// if it doesn't already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    fn model_path(&self) -> PathBuf {
        self.dir.join(SNAPSHOT_NAME)
    }

    /// True if a snapshot has been saved here before.
    pub fn exists(&self) -> bool {
        self.dir.join(format!("{SNAPSHOT_NAME}.mpk.gz")).is_file()
    }

    /// Overwrite the snapshot with the current model weights.
    pub fn save_model<B: Backend>(&self, model: &SteeringModel<B>) -> Result<()> {
        let path = self.model_path();
        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save snapshot to '{}'", path.display()))?;

        tracing::debug!("Saved model snapshot to '{}'", path.display());
        Ok(())
    }

    /// Load the snapshot weights into a freshly built model of the
    /// same architecture.
    pub fn load_model<B: Backend>(
        &self,
        model:  SteeringModel<B>,
        device: &B::Device,
    ) -> Result<SteeringModel<B>> {
        let path = self.model_path();
        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!(
                    "Cannot load snapshot '{}'. Have you trained the model first?",
                    path.display(),
                )
            })?;

        Ok(model.load_record(record))
    }

    /// Overwrite the metadata JSON next to the snapshot.
    pub fn save_metadata(&self, meta: &SnapshotMetadata) -> Result<()> {
        let path = self.dir.join(METADATA_NAME);
        let json = serde_json::to_string_pretty(meta)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write metadata to '{}'", path.display()))?;
        Ok(())
    }

    /// Read back the metadata so inference can rebuild the model.
    pub fn load_metadata(&self) -> Result<SnapshotMetadata> {
        let path = self.dir.join(METADATA_NAME);
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read metadata from '{}'. Make sure you have run 'train' before 'predict'.",
                path.display(),
            )
        })?;
        Ok(serde_json::from_str(&json)?)
    }
}
