// ============================================================
// Layer 3 — Sample Shape and Sample Batch
// ============================================================
// A SampleBatch is a stack of decoded images plus their steering
// labels, laid out exactly the way the on-disk container and the
// tensor batcher want them:
//
//   pixels: row-major HWC bytes, one image after another
//   labels: one f32 per image
//
// Invariant: pixels.len() == labels.len() * shape.volume().
// The constructor enforces it, so every SampleBatch in the
// system describes the same number of images and labels.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Per-sample image dimensions: height × width × channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleShape {
    pub height:   usize,
    pub width:    usize,
    pub channels: usize,
}

impl SampleShape {
    pub fn new(height: usize, width: usize, channels: usize) -> Self {
        Self { height, width, channels }
    }

    /// Number of bytes one sample occupies.
    pub fn volume(&self) -> usize {
        self.height * self.width * self.channels
    }
}

/// A stacked batch of images and their labels.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBatch {
    pub shape:  SampleShape,
    pub pixels: Vec<u8>,
    pub labels: Vec<f32>,
}

impl SampleBatch {
    /// Build a batch, checking the parallel-array invariant.
    pub fn new(shape: SampleShape, pixels: Vec<u8>, labels: Vec<f32>) -> Result<Self> {
        let expected = labels.len() * shape.volume();
        if pixels.len() != expected {
            bail!(
                "batch holds {} pixel bytes but {} labels of shape {:?} need {}",
                pixels.len(),
                labels.len(),
                shape,
                expected,
            );
        }
        Ok(Self { shape, pixels, labels })
    }

    /// Number of samples in the batch.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume() {
        assert_eq!(SampleShape::new(4, 8, 3).volume(), 96);
    }

    #[test]
    fn test_batch_accepts_matching_lengths() {
        let shape = SampleShape::new(2, 2, 1);
        let batch = SampleBatch::new(shape, vec![0u8; 8], vec![0.1, 0.2]).unwrap();
        assert_eq!(batch.len(), 2);
        assert!(!batch.is_empty());
    }

    #[test]
    fn test_batch_rejects_mismatched_lengths() {
        let shape = SampleShape::new(2, 2, 1);
        // 7 bytes cannot hold two 4-byte samples
        assert!(SampleBatch::new(shape, vec![0u8; 7], vec![0.1, 0.2]).is_err());
    }

    #[test]
    fn test_empty_batch_is_valid() {
        let shape = SampleShape::new(2, 2, 3);
        let batch = SampleBatch::new(shape, Vec::new(), Vec::new()).unwrap();
        assert!(batch.is_empty());
    }
}
