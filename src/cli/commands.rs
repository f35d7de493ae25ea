// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands: `train` and `predict`
// and all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, etc.)
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::train_use_case::{ModelMode, TrainConfig};

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the steering model on recorded driving data
    Train(TrainArgs),

    /// Predict the steering angle for one camera frame
    Predict(PredictArgs),
}

/// All arguments for the `train` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Data directory containing driving_log.csv and IMG/
    /// (repeatable; trained in the order given)
    #[arg(long = "data-dir")]
    pub data_dirs: Vec<PathBuf>,

    /// Root folder whose immediate subdirectories are all
    /// treated as data directories (repeatable)
    #[arg(long = "scan-root")]
    pub scan_roots: Vec<PathBuf>,

    /// Directory for the model snapshot and metrics
    #[arg(long, default_value = "snapshots")]
    pub snapshot_dir: String,

    /// Fraction of samples used for training
    #[arg(long, default_value_t = 0.7)]
    pub train_fraction: f64,

    /// Fraction of samples used for per-epoch validation
    #[arg(long, default_value_t = 0.2)]
    pub valid_fraction: f64,

    /// Fraction of samples held out for the final test loss
    /// (the three fractions must sum to 1.0)
    #[arg(long, default_value_t = 0.1)]
    pub test_fraction: f64,

    /// Number of full passes through each directory's data
    #[arg(long, default_value_t = 20)]
    pub epochs: usize,

    /// Number of samples per forward pass
    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-4)]
    pub lr: f64,

    /// Dropout probability after every dense stage
    #[arg(long, default_value_t = 0.5)]
    pub dropout: f64,

    /// Images decoded and appended per container chunk
    #[arg(long, default_value_t = 100)]
    pub chunk_size: usize,

    /// Uniform resize applied to every frame, e.g. 0.5
    #[arg(long)]
    pub resize_scale: Option<f64>,

    /// Continue from the existing snapshot instead of starting
    /// from random weights
    #[arg(long)]
    pub resume: bool,

    /// Train on the GPU (Wgpu backend) instead of the CPU
    #[arg(long)]
    pub gpu: bool,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// This is the boundary between Layer 1 and Layer 2 —
/// the application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_dirs:      a.data_dirs,
            scan_roots:     a.scan_roots,
            snapshot_dir:   a.snapshot_dir,
            train_fraction: a.train_fraction,
            valid_fraction: a.valid_fraction,
            test_fraction:  a.test_fraction,
            epochs:         a.epochs,
            batch_size:     a.batch_size,
            lr:             a.lr,
            dropout:        a.dropout,
            chunk_size:     a.chunk_size,
            resize_scale:   a.resize_scale,
            mode:           if a.resume { ModelMode::Resume } else { ModelMode::Fresh },
            gpu:            a.gpu,
        }
    }
}

/// All arguments for the `predict` command
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// The camera frame to predict a steering angle for
    #[arg(long)]
    pub image: PathBuf,

    /// Directory where the snapshot was saved during training
    #[arg(long, default_value = "snapshots")]
    pub snapshot_dir: String,

    /// Resize scale — must match the one used during training
    #[arg(long)]
    pub resize_scale: Option<f64>,
}
