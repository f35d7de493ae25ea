// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Handles all cross-cutting concerns that don't belong in
// any specific business layer:
//
//   container.rs  — The chunked sample container: the binary
//                   storage engine behind the SampleSink trait.
//                   Writes batch-appended parallel arrays of
//                   image bytes and labels; reads them back
//                   through a memory map.
//
//   snapshot.rs   — Saving and loading the trained model.
//                   Uses Burn's CompactRecorder plus a metadata
//                   JSON so inference can rebuild the exact
//                   architecture.
//
//   metrics.rs    — Training metrics logging. Writes epoch-level
//                   loss figures to a CSV file for plotting.
//
//   fs_lister.rs  — Filesystem implementation of the
//                   DirectoryLister trait used to discover
//                   training directories under scan roots.
//
// Why is this a separate layer?
//   These concerns are used by multiple other layers but
//   don't belong to any one of them. Keeping them here:
//   - Prevents duplication across layers
//   - Makes it easy to swap implementations
//     (e.g. swap the binary container for an HDF5 engine)
//
// Reference: Rust Book §7 (Modules)
//            Burn Book §5 (Checkpointing)

/// Chunked on-disk sample container (writer + mmap reader)
pub mod container;

/// Model snapshot saving and loading
pub mod snapshot;

/// Training metrics CSV logger
pub mod metrics;

/// Filesystem directory discovery
pub mod fs_lister;
