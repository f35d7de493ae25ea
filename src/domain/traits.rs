// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// Traits are Rust's way of defining shared behaviour —
// similar to interfaces in Java or abstract classes in Python.
//
// By programming against traits instead of concrete types,
// we can swap implementations without changing the code
// that uses them. For example:
//   - SampleTableWriter implements SampleSink
//   - A future in-memory sink could also implement SampleSink
//   - The materializer only sees SampleSink and works with
//     both without any changes
//
// This is the Dependency Inversion Principle from SOLID,
// applied using Rust's trait system.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::domain::sample::SampleBatch;

// ─── DirectoryLister ──────────────────────────────────────────────────────────
/// Any component that can discover training directories under a root.
///
/// Implementations:
///   - FsDirectoryLister → lists subdirectories on the local filesystem
///   - test doubles      → return a fixed list, no filesystem needed
pub trait DirectoryLister {
    /// Return the immediate subdirectories of `root`, in a stable order.
    fn subdirectories(&self, root: &Path) -> Result<Vec<PathBuf>>;
}

// ─── SampleSink ───────────────────────────────────────────────────────────────
/// An appendable table of (image, label) rows, decoupled from any
/// particular storage engine.
///
/// The contract mirrors how the containers are grown on disk:
/// open the sink, append whole batches, then close it. The first
/// appended batch fixes the per-sample shape; appending a batch
/// with a different shape is an error.
///
/// Implementations:
///   - SampleTableWriter → the binary chunked container on disk
pub trait SampleSink {
    /// Append one stacked batch, growing images and labels together.
    fn append_batch(&mut self, batch: &SampleBatch) -> Result<()>;

    /// Finalise the table. After close() the data is durable and
    /// readable; a sink that is dropped without close() leaves no
    /// usable table behind.
    fn close(self) -> Result<()>
    where
        Self: Sized;
}
