// ============================================================
// Layer 4 — Driving Log Loader
// ============================================================
// Reads a driving_log.csv recorded by the simulator and turns
// each row into a FrameMapping.
//
// How the log is laid out:
//   The first row is a header and is skipped.
//   Column 0 holds the path of the centre-camera image as it
//   was written on the machine that recorded the run — often
//   an absolute path that no longer exists here.
//   Column 3 holds the steering angle for that frame.
//
// We therefore keep only the file name from column 0 and
// re-root it under the data directory's own IMG/ folder,
// which is where the simulator stores the frames.
//
// Reference: Rust Book §9 (Error Handling)
//            csv crate documentation

use anyhow::{bail, Context, Result};
use rand::seq::SliceRandom;
use std::path::{Path, PathBuf};

use crate::domain::mapping::FrameMapping;

/// File name of the log inside every data directory.
pub const DRIVING_LOG: &str = "driving_log.csv";

/// Subdirectory that holds the recorded camera frames.
pub const IMAGE_DIR: &str = "IMG";

/// Loads FrameMappings from one data directory's driving log.
pub struct DrivingLogLoader {
    /// The data directory containing driving_log.csv and IMG/
    data_dir: PathBuf,
}

impl DrivingLogLoader {
    /// Create a loader pointed at a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into() }
    }

    /// Read the log and build one mapping per data row.
    ///
    /// With `randomize` the mappings are uniformly shuffled after
    /// reading; without it the log order is preserved.
    pub fn load(&self, randomize: bool) -> Result<Vec<FrameMapping>> {
        let log_path = self.data_dir.join(DRIVING_LOG);

        // has_headers(true) makes the reader skip the first row
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(&log_path)
            .with_context(|| format!("Cannot open driving log '{}'", log_path.display()))?;

        let mut mappings = Vec::new();

        for (idx, result) in reader.records().enumerate() {
            // Row numbers in errors are 1-based and count the header
            let row = idx + 2;
            let record = result
                .with_context(|| format!("Invalid CSV row {} in '{}'", row, log_path.display()))?;

            if record.len() < 4 {
                bail!(
                    "row {} of '{}' has {} fields, need at least 4",
                    row,
                    log_path.display(),
                    record.len(),
                );
            }

            // Keep only the file name of the recorded source path and
            // re-root it under this directory's IMG/ folder
            let source = &record[0];
            let filename = Path::new(source)
                .file_name()
                .with_context(|| format!("row {}: no file name in '{}'", row, source))?;

            let image_path = self.data_dir.join(IMAGE_DIR).join(filename);
            mappings.push(FrameMapping::new(image_path, &record[3]));
        }

        tracing::info!(
            "Loaded {} frame mappings from '{}'",
            mappings.len(),
            log_path.display(),
        );

        if randomize {
            mappings.shuffle(&mut rand::thread_rng());
        }

        Ok(mappings)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_log(dir: &Path, rows: &[&str]) {
        let mut content = String::from("center,left,right,steering,throttle,brake,speed\n");
        for row in rows {
            content.push_str(row);
            content.push('\n');
        }
        fs::write(dir.join(DRIVING_LOG), content).unwrap();
    }

    #[test]
    fn test_rows_become_mappings_in_order() {
        let dir = tempfile::tempdir().unwrap();
        write_log(
            dir.path(),
            &[
                "/a/x/1.jpg,/a/l.jpg,/a/r.jpg,0.25,0.9,0.0,30.1",
                "/a/x/2.jpg,/a/l.jpg,/a/r.jpg,-0.1,0.9,0.0,30.2",
            ],
        );

        let mappings = DrivingLogLoader::new(dir.path()).load(false).unwrap();

        assert_eq!(mappings.len(), 2);
        assert_eq!(mappings[0].image_path, dir.path().join("IMG").join("1.jpg"));
        assert_eq!(mappings[0].steering, "0.25");
        assert_eq!(mappings[1].image_path, dir.path().join("IMG").join("2.jpg"));
        assert_eq!(mappings[1].steering, "-0.1");
    }

    #[test]
    fn test_shuffle_keeps_every_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let rows: Vec<String> = (0..50)
            .map(|i| format!("/rec/{i}.jpg,l,r,0.{i},1,0,30"))
            .collect();
        let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
        write_log(dir.path(), &refs);

        let mappings = DrivingLogLoader::new(dir.path()).load(true).unwrap();

        assert_eq!(mappings.len(), 50);
        for i in 0..50 {
            let expected = dir.path().join("IMG").join(format!("{i}.jpg"));
            assert!(mappings.iter().any(|m| m.image_path == expected));
        }
    }

    #[test]
    fn test_missing_log_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(DrivingLogLoader::new(dir.path()).load(false).is_err());
    }

    #[test]
    fn test_short_row_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write_log(dir.path(), &["/a/1.jpg,l,r"]);

        let err = DrivingLogLoader::new(dir.path()).load(false).unwrap_err();
        assert!(format!("{err:#}").contains("row 2"));
    }
}
