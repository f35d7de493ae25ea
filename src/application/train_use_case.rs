// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Validate the split ratio        (Layer 3 - domain)
//   Step 2: Discover training directories   (Layer 6 - infra)
//   Step 3: Run the training driver         (Layer 5 - ml)
//            which per directory materializes the containers
//            (Layer 4 - data), fits, evaluates, and snapshots
//
// Directory discovery goes through the DirectoryLister trait so
// tests can inject a stub instead of touching the filesystem.
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Training)

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::domain::split::SplitRatio;
use crate::domain::traits::DirectoryLister;
use crate::ml::trainer::train_across_directories;

/// Whether the first directory starts from random weights or
/// from the snapshot left by a previous run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelMode {
    Fresh,
    Resume,
}

// ─── Training Configuration ──────────────────────────────────────────────────
// All knobs for a training run.
// Serialisable so it can be inspected or kept with the snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Data directories used exactly as given
    pub data_dirs:      Vec<PathBuf>,
    /// Roots whose immediate subdirectories are also trained on
    pub scan_roots:     Vec<PathBuf>,
    pub snapshot_dir:   String,
    pub train_fraction: f64,
    pub valid_fraction: f64,
    pub test_fraction:  f64,
    pub epochs:         usize,
    pub batch_size:     usize,
    pub lr:             f64,
    pub dropout:        f64,
    /// Images decoded and appended per container chunk
    pub chunk_size:     usize,
    /// Optional uniform resize applied to every frame
    pub resize_scale:   Option<f64>,
    pub mode:           ModelMode,
    pub gpu:            bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_dirs:      Vec::new(),
            scan_roots:     Vec::new(),
            snapshot_dir:   "snapshots".to_string(),
            train_fraction: 0.7,
            valid_fraction: 0.2,
            test_fraction:  0.1,
            epochs:         20,
            batch_size:     32,
            lr:             1e-4,
            dropout:        0.5,
            chunk_size:     100,
            resize_scale:   None,
            mode:           ModelMode::Fresh,
            gpu:            false,
        }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
// Owns the config and runs the full training pipeline.
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Assemble the ordered list of training directories:
    /// the explicit ones first, then one level of subdirectories
    /// under every scan root.
    pub fn discover_directories(&self, lister: &dyn DirectoryLister) -> Result<Vec<PathBuf>> {
        let mut dirs = self.config.data_dirs.clone();

        for root in &self.config.scan_roots {
            dirs.extend(lister.subdirectories(root)?);
        }

        if dirs.is_empty() {
            bail!("no training directories given — use --data-dir or --scan-root");
        }
        Ok(dirs)
    }

    /// Execute the full training pipeline end to end.
    pub fn execute(&self, lister: &dyn DirectoryLister) -> Result<()> {
        let cfg = &self.config;

        // ── Step 1: Fail fast on a bad split ratio ────────────────────────────
        SplitRatio::new(cfg.train_fraction, cfg.valid_fraction, cfg.test_fraction)
            .validate()?;

        // ── Step 2: Discover the training directories ─────────────────────────
        let dirs = self.discover_directories(lister)?;
        tracing::info!("Training across {} directories", dirs.len());

        // ── Step 3: Hand off to the training driver (Layer 5) ─────────────────
        train_across_directories(cfg, &dirs)
    }
}
