// ============================================================
// Layer 4 — Dataset Materializer
// ============================================================
// Turns a list of frame mappings into the three on-disk sample
// containers, and hands back opened read-only tables.
//
// materialize() is a straight streaming loop:
//   pull a chunk of mappings → decode its images → append the
//   stacked batch to the sink → repeat until the list is done.
// Memory use stays bounded by the chunk size no matter how long
// the recording session was.
//
// ensure_datasets_ready() is the entry point the training driver
// calls per data directory:
//   - if train.bin, valid.bin and test.bin all exist, they are
//     opened and returned unchanged — there is NO staleness
//     check against driving_log.csv
//   - if ANY of the three is missing, all three are rebuilt
//     from scratch (no partial-regeneration path)

use anyhow::Result;
use std::path::Path;

use crate::data::chunker::{label_batches, PERSIST_CHUNK_SIZE};
use crate::data::images::load_image_batch;
use crate::data::loader::DrivingLogLoader;
use crate::data::splitter::split_three;
use crate::domain::mapping::FrameMapping;
use crate::domain::split::SplitRatio;
use crate::domain::traits::SampleSink;
use crate::infra::container::{SampleTable, SampleTableWriter};

/// Container file names inside every data directory.
pub const TRAIN_FILE: &str = "train.bin";
pub const VALID_FILE: &str = "valid.bin";
pub const TEST_FILE:  &str = "test.bin";

/// Knobs for the materialization pass.
#[derive(Debug, Clone)]
pub struct MaterializeOptions {
    /// How many images are decoded and appended per chunk
    pub chunk_size: usize,

    /// Optional uniform resize applied to every frame
    pub resize_scale: Option<f64>,
}

impl Default for MaterializeOptions {
    fn default() -> Self {
        Self {
            chunk_size:   PERSIST_CHUNK_SIZE,
            resize_scale: None,
        }
    }
}

/// Stream `mappings` through image decoding into `sink`, one
/// chunk at a time. Returns the number of samples written.
pub fn materialize<S: SampleSink>(
    mappings: &[FrameMapping],
    mut sink: S,
    options:  &MaterializeOptions,
) -> Result<usize> {
    let mut rows = 0;

    for chunk in label_batches(mappings, options.chunk_size) {
        let chunk = chunk?;
        let batch = load_image_batch(&chunk.paths, chunk.labels, options.resize_scale)?;
        rows += batch.len();
        sink.append_batch(&batch)?;
    }

    sink.close()?;
    Ok(rows)
}

/// Open the three containers of a data directory, generating them
/// first if any is missing.
pub fn ensure_datasets_ready(
    data_dir: &Path,
    ratio:    &SplitRatio,
    options:  &MaterializeOptions,
) -> Result<(SampleTable, SampleTable, SampleTable)> {
    // Fail on a bad ratio before any file is touched
    ratio.validate()?;

    let train_path = data_dir.join(TRAIN_FILE);
    let valid_path = data_dir.join(VALID_FILE);
    let test_path  = data_dir.join(TEST_FILE);

    let all_exist =
        train_path.is_file() && valid_path.is_file() && test_path.is_file();

    if all_exist {
        tracing::info!(
            "Training, validation, and test data were already generated in '{}'",
            data_dir.display(),
        );
    } else {
        let mappings = DrivingLogLoader::new(data_dir).load(true)?;
        let (train_maps, valid_maps, test_maps) = split_three(mappings, ratio)?;

        materialize(&train_maps, SampleTableWriter::create(&train_path)?, options)?;
        materialize(&valid_maps, SampleTableWriter::create(&valid_path)?, options)?;
        materialize(&test_maps,  SampleTableWriter::create(&test_path)?,  options)?;

        tracing::info!(
            "Training, validation, and test data are now generated in '{}'",
            data_dir.display(),
        );
    }

    Ok((
        SampleTable::open(&train_path)?,
        SampleTable::open(&valid_path)?,
        SampleTable::open(&test_path)?,
    ))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;
    use std::fs;

    /// Build a data directory with an IMG/ folder of tiny frames
    /// and a driving log that references them.
    fn fixture_dir(dir: &Path, frames: usize) -> Vec<FrameMapping> {
        let img_dir = dir.join("IMG");
        fs::create_dir_all(&img_dir).unwrap();

        let mut log = String::from("center,left,right,steering,throttle,brake,speed\n");
        let mut mappings = Vec::new();

        for i in 0..frames {
            let name = format!("frame_{i}.png");
            let img = RgbImage::from_fn(6, 4, |_, _| image::Rgb([i as u8, 0, 0]));
            img.save(img_dir.join(&name)).unwrap();

            log.push_str(&format!("/rec/{name},l,r,0.{i},1.0,0.0,30\n"));
            mappings.push(FrameMapping::new(img_dir.join(&name), format!("0.{i}")));
        }

        fs::write(dir.join("driving_log.csv"), log).unwrap();
        mappings
    }

    #[test]
    fn test_materialize_writes_every_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let mappings = fixture_dir(dir.path(), 7);
        let path = dir.path().join("out.bin");

        // Chunk of 3 forces 3 appends: 3 + 3 + 1
        let options = MaterializeOptions { chunk_size: 3, resize_scale: None };
        let rows = materialize(
            &mappings,
            SampleTableWriter::create(&path).unwrap(),
            &options,
        )
        .unwrap();

        assert_eq!(rows, 7);

        let table = SampleTable::open(&path).unwrap();
        assert_eq!(table.len(), 7);
        assert_eq!(table.labels().len(), 7);
        assert_eq!(table.shape().height, 4);
        assert_eq!(table.shape().width, 6);
    }

    #[test]
    fn test_materialize_missing_image_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mappings = vec![FrameMapping::new(dir.path().join("IMG/nope.png"), "0.0")];
        let path = dir.path().join("out.bin");

        let result = materialize(
            &mappings,
            SampleTableWriter::create(&path).unwrap(),
            &MaterializeOptions::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_ensure_generates_all_three_containers() {
        let dir = tempfile::tempdir().unwrap();
        fixture_dir(dir.path(), 10);

        let ratio = SplitRatio::new(1.0, 0.0, 0.0);
        let (train, valid, test) =
            ensure_datasets_ready(dir.path(), &ratio, &MaterializeOptions::default())
                .unwrap();

        assert_eq!(train.len(), 10);
        assert!(valid.is_empty());
        assert!(test.is_empty());
        assert!(dir.path().join(TRAIN_FILE).is_file());
        assert!(dir.path().join(VALID_FILE).is_file());
        assert!(dir.path().join(TEST_FILE).is_file());
    }

    #[test]
    fn test_second_call_reuses_existing_containers() {
        let dir = tempfile::tempdir().unwrap();
        fixture_dir(dir.path(), 5);

        let ratio = SplitRatio::new(1.0, 0.0, 0.0);
        let options = MaterializeOptions::default();
        let (first, _, _) =
            ensure_datasets_ready(dir.path(), &ratio, &options).unwrap();
        let first_labels: Vec<f32> = first.labels().to_vec();

        // Removing the source log proves the second call never
        // re-runs the build pipeline
        fs::remove_file(dir.path().join("driving_log.csv")).unwrap();

        let (second, _, _) =
            ensure_datasets_ready(dir.path(), &ratio, &options).unwrap();
        assert_eq!(second.len(), 5);
        assert_eq!(second.labels(), &first_labels[..]);
    }

    #[test]
    fn test_one_missing_container_triggers_full_rebuild() {
        let dir = tempfile::tempdir().unwrap();
        fixture_dir(dir.path(), 6);

        let ratio = SplitRatio::new(1.0, 0.0, 0.0);
        let options = MaterializeOptions::default();
        ensure_datasets_ready(dir.path(), &ratio, &options).unwrap();

        fs::remove_file(dir.path().join(VALID_FILE)).unwrap();

        let (train, valid, test) =
            ensure_datasets_ready(dir.path(), &ratio, &options).unwrap();
        assert_eq!(train.len(), 6);
        assert!(valid.is_empty() && test.is_empty());
        assert!(dir.path().join(VALID_FILE).is_file());
    }

    #[test]
    fn test_bad_ratio_fails_before_any_io() {
        let dir = tempfile::tempdir().unwrap();
        // No fixture at all — with a bad ratio we must fail before
        // noticing the missing log
        let ratio = SplitRatio::new(0.5, 0.1, 0.1);
        let err = ensure_datasets_ready(dir.path(), &ratio, &MaterializeOptions::default())
            .unwrap_err();
        assert!(format!("{err:#}").contains("ratio"));
    }
}
