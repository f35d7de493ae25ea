// ============================================================
// Layer 3 — Split Ratio
// ============================================================
// The three fractions that carve the shuffled mappings into
// train / validation / test partitions.
//
// The fractions must add up to 1.0 — otherwise samples would be
// silently dropped (sum < 1) or double-counted (sum > 1).
// The check is done at 5-decimal precision so that ratios like
// (0.7, 0.2, 0.1), whose floating-point sum is 0.9999999999999999,
// still pass.
//
// validate() is called before ANY file I/O happens, so a bad
// ratio fails the run immediately.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Fractions of the dataset that go to each partition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitRatio {
    pub train: f64,
    pub valid: f64,
    pub test:  f64,
}

impl SplitRatio {
    pub fn new(train: f64, valid: f64, test: f64) -> Self {
        Self { train, valid, test }
    }

    /// Fail unless the three fractions sum to 1.0 at 5-decimal
    /// precision.
    pub fn validate(&self) -> Result<()> {
        let sum     = self.train + self.valid + self.test;
        let rounded = (sum * 100_000.0).round() / 100_000.0;

        if (rounded - 1.0).abs() > f64::EPSILON {
            bail!("splitting ratio must add up to 1.0, got {:.5}", sum);
        }
        Ok(())
    }
}

impl Default for SplitRatio {
    /// The 70/20/10 split the pipeline was tuned with.
    fn default() -> Self {
        Self { train: 0.7, valid: 0.2, test: 0.1 }
    }
}
