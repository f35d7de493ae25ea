// ============================================================
// Layer 3 — Frame Mapping Domain Type
// ============================================================
// Represents a single frame of the driving log: the resolved
// path to the dashboard camera image plus the steering angle
// recorded for that frame.
//
// The steering value is kept as the raw CSV token here and only
// parsed to a float when a batch is built. That keeps this type
// a faithful record of the log row, and keeps parse errors close
// to the code that actually needs the number.
//
// Reference: Rust Book §5 (Structs and Methods)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A resolved (image path, steering label) pair from one log row.
/// Immutable once created — the pipeline shuffles and partitions
/// mappings but never rewrites them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameMapping {
    /// Absolute path to the camera image under the data
    /// directory's IMG/ folder
    pub image_path: PathBuf,

    /// The raw steering-angle token from the log row,
    /// e.g. "0.25" or "-0.1"
    pub steering: String,
}

impl FrameMapping {
    /// Create a new FrameMapping.
    /// Uses impl Into<_> so callers can pass &str or owned values.
    pub fn new(image_path: impl Into<PathBuf>, steering: impl Into<String>) -> Self {
        Self {
            image_path: image_path.into(),
            steering:   steering.into(),
        }
    }
}
