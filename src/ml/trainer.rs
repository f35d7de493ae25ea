// ============================================================
// Layer 5 — Training Driver
// ============================================================
// Drives the full run: for each data directory in order, load
// (or generate) its three containers, fit the model with Adam
// on MSE loss, evaluate on the held-out test split, and
// overwrite the single snapshot on disk.
//
// Only the model itself carries across directories — datasets
// are dropped as soon as a directory is done, so training is
// sequential fine-tuning, one recording session at a time.
// Any failure aborts the whole run; there is no retry or
// skip-and-continue.
//
// Key Burn insight (same trap as any train/valid split):
//   - Training uses an Autodiff backend for gradients
//   - model.valid() returns the model on the inner backend
//     with dropout disabled for deterministic evaluation
//   - Validation/test batchers must use that inner backend
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::{bail, Result};
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    nn::loss::{MseLoss, Reduction},
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use std::path::PathBuf;

use crate::application::train_use_case::{ModelMode, TrainConfig};
use crate::data::batcher::SteeringBatcher;
use crate::data::dataset::SteeringDataset;
use crate::data::materializer::{ensure_datasets_ready, MaterializeOptions};
use crate::domain::sample::SampleShape;
use crate::domain::split::SplitRatio;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::infra::snapshot::{SnapshotMetadata, SnapshotStore};
use crate::ml::model::{SteeringModel, SteeringModelConfig, OUTPUT_SIZE};

type GpuBackend = burn::backend::Autodiff<burn::backend::Wgpu>;
type CpuBackend = burn::backend::Autodiff<burn::backend::NdArray>;

/// Train across the given data directories, on GPU or CPU
/// depending on the config.
pub fn train_across_directories(cfg: &TrainConfig, data_dirs: &[PathBuf]) -> Result<()> {
    if cfg.gpu {
        tracing::info!("Training with the Wgpu backend");
        let device = burn::backend::wgpu::WgpuDevice::default();
        run::<GpuBackend>(cfg, data_dirs, device)
    } else {
        tracing::info!("Training with the NdArray (CPU) backend");
        let device = <burn::backend::NdArray as Backend>::Device::default();
        run::<CpuBackend>(cfg, data_dirs, device)
    }
}

fn run<B: AutodiffBackend>(
    cfg:       &TrainConfig,
    data_dirs: &[PathBuf],
    device:    B::Device,
) -> Result<()> {
    let ratio = SplitRatio::new(cfg.train_fraction, cfg.valid_fraction, cfg.test_fraction);
    ratio.validate()?;

    let snapshot = SnapshotStore::new(&cfg.snapshot_dir);
    let metrics  = MetricsLogger::new(&cfg.snapshot_dir)?;
    let options  = MaterializeOptions {
        chunk_size:   cfg.chunk_size,
        resize_scale: cfg.resize_scale,
    };

    // The trained model is the only state carried from one
    // directory to the next
    let mut model:       Option<SteeringModel<B>> = None;
    let mut model_shape: Option<SampleShape>      = None;

    for data_dir in data_dirs {
        println!("Training on data in '{}'\n", data_dir.display());

        // ── Load (or generate) the three containers ───────────────────────────
        let (train_table, valid_table, test_table) =
            ensure_datasets_ready(data_dir, &ratio, &options)?;

        let train_dataset = SteeringDataset::from_table(&train_table);
        let valid_dataset = SteeringDataset::from_table(&valid_table);
        let test_dataset  = SteeringDataset::from_table(&test_table);

        if train_dataset.sample_count() == 0 {
            bail!("no training samples in '{}'", data_dir.display());
        }
        let shape = train_dataset.shape();

        // ── Build the model on the first directory, carry it after ───────────
        let current = match model.take() {
            Some(m) => {
                if model_shape != Some(shape) {
                    bail!(
                        "images in '{}' have shape {:?}, but the model was built for {:?}",
                        data_dir.display(),
                        shape,
                        model_shape,
                    );
                }
                m
            }
            None => build_model::<B>(cfg, shape, &snapshot, &device)?,
        };

        // ── Fit ───────────────────────────────────────────────────────────────
        let trained = fit(cfg, current, train_dataset, valid_dataset, &metrics, &device)?;

        // ── Evaluate on the held-out test split ───────────────────────────────
        let test_loss = evaluate::<B>(&trained, test_dataset, cfg.batch_size)?;
        println!("\nTrained on data in '{}'", data_dir.display());
        println!("Test loss: {:.6}", test_loss);

        // ── Overwrite the snapshot ────────────────────────────────────────────
        snapshot.save_model(&trained)?;
        snapshot.save_metadata(&SnapshotMetadata {
            height:      shape.height,
            width:       shape.width,
            channels:    shape.channels,
            output_size: OUTPUT_SIZE,
            epochs:      cfg.epochs,
            test_loss,
        })?;

        model       = Some(trained);
        model_shape = Some(shape);
    }

    tracing::info!("Training complete across {} directories", data_dirs.len());
    Ok(())
}

/// Build the model for the first directory — fresh weights, or
/// weights loaded from the existing snapshot in resume mode.
fn build_model<B: AutodiffBackend>(
    cfg:      &TrainConfig,
    shape:    SampleShape,
    snapshot: &SnapshotStore,
    device:   &B::Device,
) -> Result<SteeringModel<B>> {
    let model_cfg =
        SteeringModelConfig::new(shape.height, shape.width, shape.channels, OUTPUT_SIZE)
            .with_dropout(cfg.dropout);
    let model = model_cfg.init::<B>(device);

    match cfg.mode {
        ModelMode::Fresh  => Ok(model),
        ModelMode::Resume => {
            tracing::info!("Resuming from the existing snapshot");
            snapshot.load_model(model, device)
        }
    }
}

/// The epoch loop: forward, MSE loss, backward, Adam step, then
/// a validation pass with dropout disabled.
fn fit<B: AutodiffBackend>(
    cfg:           &TrainConfig,
    mut model:     SteeringModel<B>,
    train_dataset: SteeringDataset,
    valid_dataset: SteeringDataset,
    metrics:       &MetricsLogger,
    device:        &B::Device,
) -> Result<SteeringModel<B>> {

    // ── Adam optimiser ────────────────────────────────────────────────────────
    // m = β1*m + (1-β1)*g        (mean)
    // v = β2*v + (1-β2)*g²       (variance)
    // θ = θ - lr * m / (√v + ε)  (update)
    let optim_cfg = AdamConfig::new().with_epsilon(1e-8);
    let mut optim = optim_cfg.init();

    // ── Training data loader (AutodiffBackend) ────────────────────────────────
    let train_batcher = SteeringBatcher::<B>::new(device.clone());
    let train_loader  = DataLoaderBuilder::new(train_batcher)
        .batch_size(cfg.batch_size)
        .shuffle(42)
        .num_workers(1)
        .build(train_dataset);

    // ── Validation data loader (InnerBackend — no autodiff overhead) ──────────
    let valid_device  = <B::InnerBackend as Backend>::Device::default();
    let valid_batcher = SteeringBatcher::<B::InnerBackend>::new(valid_device);
    let valid_loader  = DataLoaderBuilder::new(valid_batcher)
        .batch_size(cfg.batch_size)
        .num_workers(1)
        .build(valid_dataset);

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {

        // ── Training phase ────────────────────────────────────────────────────
        let mut train_loss_sum = 0.0f64;
        let mut train_batches  = 0usize;

        for batch in train_loader.iter() {
            let prediction = model.forward(batch.images);
            let loss = MseLoss::new().forward(prediction, batch.targets, Reduction::Mean);

            train_loss_sum += loss.clone().into_scalar().elem::<f64>();
            train_batches  += 1;

            // Backward pass + Adam update
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
        }

        let avg_train_loss = if train_batches > 0 {
            train_loss_sum / train_batches as f64
        } else { f64::NAN };

        // ── Validation phase ──────────────────────────────────────────────────
        // model.valid() → SteeringModel<B::InnerBackend>,
        // dropout disabled for deterministic evaluation
        let model_valid = model.valid();

        let mut val_loss_sum = 0.0f64;
        let mut val_batches  = 0usize;

        for batch in valid_loader.iter() {
            let prediction = model_valid.forward(batch.images);
            let loss = MseLoss::new().forward(prediction, batch.targets, Reduction::Mean);
            val_loss_sum += loss.into_scalar().elem::<f64>();
            val_batches  += 1;
        }

        let avg_val_loss = if val_batches > 0 {
            val_loss_sum / val_batches as f64
        } else { f64::NAN };

        println!(
            "Epoch {:>3}/{} | train_loss={:.6} | val_loss={:.6}",
            epoch, cfg.epochs, avg_train_loss, avg_val_loss,
        );

        metrics.log(&EpochMetrics {
            epoch,
            train_loss: avg_train_loss,
            val_loss:   avg_val_loss,
        })?;
    }

    Ok(model)
}

/// Average MSE of the model over the test split, computed on the
/// inner backend with dropout disabled.
fn evaluate<B: AutodiffBackend>(
    model:        &SteeringModel<B>,
    test_dataset: SteeringDataset,
    batch_size:   usize,
) -> Result<f64> {
    let model_valid = model.valid();

    let device  = <B::InnerBackend as Backend>::Device::default();
    let batcher = SteeringBatcher::<B::InnerBackend>::new(device);
    let loader  = DataLoaderBuilder::new(batcher)
        .batch_size(batch_size)
        .num_workers(1)
        .build(test_dataset);

    let mut loss_sum = 0.0f64;
    let mut batches  = 0usize;

    for batch in loader.iter() {
        let prediction = model_valid.forward(batch.images);
        let loss = MseLoss::new().forward(prediction, batch.targets, Reduction::Mean);
        loss_sum += loss.into_scalar().elem::<f64>();
        batches  += 1;
    }

    Ok(if batches > 0 { loss_sum / batches as f64 } else { f64::NAN })
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::SteeringSample;

    type TestBackend = CpuBackend;

    fn tiny_dataset(n: usize, shape: SampleShape) -> SteeringDataset {
        let samples = (0..n)
            .map(|i| SteeringSample {
                pixels:   vec![(i * 10) as u8; shape.volume()],
                shape,
                steering: (i as f32 - 1.0) * 0.1,
            })
            .collect();
        SteeringDataset::new(shape, samples)
    }

    fn tiny_config(dir: &std::path::Path) -> TrainConfig {
        TrainConfig {
            epochs:       1,
            batch_size:   2,
            snapshot_dir: dir.to_string_lossy().into_owned(),
            ..TrainConfig::default()
        }
    }

    #[test]
    fn test_fit_and_evaluate_on_cpu() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = tiny_config(dir.path());
        let shape = SampleShape::new(32, 32, 3);

        let device  = Default::default();
        let metrics = MetricsLogger::new(dir.path()).unwrap();
        let model = SteeringModelConfig::new(32, 32, 3, OUTPUT_SIZE)
            .init::<TestBackend>(&device);

        let trained = fit(
            &cfg,
            model,
            tiny_dataset(4, shape),
            tiny_dataset(2, shape),
            &metrics,
            &device,
        )
        .unwrap();

        let loss = evaluate::<TestBackend>(&trained, tiny_dataset(2, shape), 2).unwrap();
        assert!(loss.is_finite());

        // One epoch → header plus one metrics row
        let csv = std::fs::read_to_string(metrics.csv_path()).unwrap();
        assert_eq!(csv.lines().count(), 2);
    }

    #[test]
    fn test_empty_test_split_evaluates_to_nan() {
        let shape = SampleShape::new(32, 32, 3);
        let device = Default::default();
        let model = SteeringModelConfig::new(32, 32, 3, OUTPUT_SIZE)
            .init::<TestBackend>(&device);

        let loss = evaluate::<TestBackend>(&model, tiny_dataset(0, shape), 2).unwrap();
        assert!(loss.is_nan());
    }

    #[test]
    fn test_driver_produces_containers_snapshot_and_metrics() {
        use image::RgbImage;
        use std::fs;

        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("session");
        let img_dir  = data_dir.join("IMG");
        fs::create_dir_all(&img_dir).unwrap();

        let mut log = String::from("center,left,right,steering,throttle,brake,speed\n");
        for i in 0..6 {
            let name = format!("frame_{i}.png");
            RgbImage::from_fn(32, 32, |_, _| image::Rgb([i as u8 * 20, 0, 0]))
                .save(img_dir.join(&name))
                .unwrap();
            log.push_str(&format!("/rec/{name},l,r,0.{i},1.0,0.0,30\n"));
        }
        fs::write(data_dir.join("driving_log.csv"), log).unwrap();

        let snap_dir = dir.path().join("snapshots");
        let cfg = TrainConfig {
            epochs:       1,
            batch_size:   2,
            snapshot_dir: snap_dir.to_string_lossy().into_owned(),
            ..TrainConfig::default()
        };

        let device = Default::default();
        run::<TestBackend>(&cfg, &[data_dir.clone()], device).unwrap();

        // All three containers, the snapshot, and the metrics CSV
        assert!(data_dir.join("train.bin").is_file());
        assert!(data_dir.join("valid.bin").is_file());
        assert!(data_dir.join("test.bin").is_file());
        assert!(SnapshotStore::new(&cfg.snapshot_dir).exists());
        assert!(snap_dir.join("metrics.csv").is_file());

        // A resume-mode run must be able to load the snapshot back
        let resume_cfg = TrainConfig { mode: ModelMode::Resume, ..cfg };
        let device = Default::default();
        run::<TestBackend>(&resume_cfg, &[data_dir], device).unwrap();
    }
}
