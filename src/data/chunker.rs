// ============================================================
// Layer 4 — Mapping Chunker
// ============================================================
// Walks the mapping list in fixed-size chunks, separating each
// chunk into its image paths and its parsed steering labels.
//
// Why chunk at all?
//   A recording session holds tens of thousands of frames.
//   Decoding them all at once would need gigabytes of memory,
//   so the materializer pulls one chunk, decodes it, appends it
//   to the container, and moves on. The chunk size is also the
//   growth step of the container's resizable arrays.
//
// Two sizes are used in practice:
//   - PERSIST_CHUNK_SIZE (100) when writing containers
//   - PULL_CHUNK_SIZE    (10)  for lazy iteration elsewhere
//
// Labels are parsed from their raw CSV tokens to f32 here —
// this is the single place where a bad steering value surfaces.
//
// Reference: Rust Book §8 (Slices), §13 (Iterators)

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::domain::mapping::FrameMapping;

/// Chunk size used when persisting containers.
pub const PERSIST_CHUNK_SIZE: usize = 100;

/// Chunk size used for lazy pulls during iteration.
pub const PULL_CHUNK_SIZE: usize = 10;

/// One fixed-size slice of the mapping list, labels parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelledChunk {
    pub paths:  Vec<PathBuf>,
    pub labels: Vec<f32>,
}

impl LabelledChunk {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Iterate `mappings` in chunks of `chunk_size`, parsing every
/// steering token to f32. The final chunk may be shorter.
///
/// # Panics
/// Panics if chunk_size is zero — a zero step would never
/// advance through the list.
pub fn label_batches(
    mappings:   &[FrameMapping],
    chunk_size: usize,
) -> impl Iterator<Item = Result<LabelledChunk>> + '_ {
    assert!(chunk_size > 0, "chunk_size must be at least 1");

    mappings.chunks(chunk_size).map(|chunk| {
        let paths: Vec<PathBuf> = chunk.iter().map(|m| m.image_path.clone()).collect();

        let labels: Vec<f32> = chunk
            .iter()
            .map(|m| {
                m.steering.trim().parse::<f32>().with_context(|| {
                    format!(
                        "invalid steering value '{}' for image '{}'",
                        m.steering,
                        m.image_path.display(),
                    )
                })
            })
            .collect::<Result<_>>()?;

        Ok(LabelledChunk { paths, labels })
    })
}
