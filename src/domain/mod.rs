// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// This is the heart of the application — pure Rust structs
// and traits that define the core concepts of the system.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O, image decoding, or CSV parsing
//   - Only plain Rust structs, enums, and traits
//
// Why keep this layer pure?
//   - Easy to unit test (no GPU, no fixture files needed)
//   - Easy to understand (no framework noise)
//   - Easy to swap implementations (just implement the trait)
//
// Think of this layer as the "dictionary" of the system —
// it defines what things ARE, not how they work.
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// One driving-log row resolved to an image path + steering label
pub mod mapping;

// Stacked image/label batches and their per-sample shape
pub mod sample;

// Train/validation/test split ratios with sum validation
pub mod split;

// Core abstractions (traits) that other layers implement
pub mod traits;
