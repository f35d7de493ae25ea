// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// This layer handles everything from the raw driving log all
// the way to GPU-ready tensor batches.
//
// The pipeline flows in this order:
//
//   driving_log.csv
//       │
//       ▼
//   DrivingLogLoader  → reads rows, resolves IMG/ paths
//       │
//       ▼
//   splitter          → shuffles, carves train/valid/test
//       │
//       ▼
//   chunker           → fixed-size batches, parses labels
//       │
//       ▼
//   images            → decodes and stacks RGB images
//       │
//       ▼
//   materializer      → streams batches into the containers
//       │
//       ▼
//   SteeringDataset   → implements Burn's Dataset trait
//       │
//       ▼
//   SteeringBatcher   → stacks samples into tensor batches
//       │
//       ▼
//   DataLoader        → feeds batches to the training loop
//
// Each module is responsible for exactly one step.
// This makes each step independently testable and replaceable.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)
//            Rust Book §13 (Iterators and Closures)

/// Reads the driving log CSV and resolves image paths
pub mod loader;

/// Decodes camera images and stacks them into batches
pub mod images;

/// Splits the mapping list into fixed-size labelled chunks
pub mod chunker;

/// Shuffles and splits mappings into train/valid/test
pub mod splitter;

/// Streams chunks of images into the on-disk containers
pub mod materializer;

/// Implements Burn's Dataset trait for steering samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
