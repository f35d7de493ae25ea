// ============================================================
// Layer 6 — Chunked Sample Container
// ============================================================
// The on-disk storage engine behind the SampleSink abstraction:
// a single binary file holding two parallel resizable arrays,
// one of image bytes and one of steering labels.
//
// File layout:
//   [TableHeader]  64 bytes — magic, version, row count, shape
//   [pixels]       rows * height * width * channels bytes (u8, HWC)
//   [labels]       rows * 4 bytes (little-endian f32)
//
// The writer streams pixel bytes to disk chunk by chunk while
// buffering the (tiny) labels in memory; close() appends the
// labels region and backpatches the header with the final row
// count. Until close() runs, the header still says zero rows,
// so a half-written file can never be mistaken for a table.
//
// The reader memory-maps the file: pixels are served zero-copy
// straight from the map, labels are copied once into a Vec at
// open time (the label region has no alignment guarantee, so a
// cast in place is not allowed).
//
// Invariant: the pixels and labels regions always describe the
// same number of rows. The first appended batch fixes the
// per-sample shape; appending a different shape is an error.

use anyhow::{bail, Context, Result};
use bytemuck::{Pod, Zeroable};
use memmap2::{Mmap, MmapOptions};
use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::mem;
use std::path::{Path, PathBuf};

use crate::domain::sample::{SampleBatch, SampleShape};
use crate::domain::traits::SampleSink;

// ─── Header ───────────────────────────────────────────────────────────────────

/// Fixed-size header at the start of every container file.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct TableHeader {
    /// Magic bytes: "STRD"
    pub magic: [u8; 4],
    /// Format version
    pub version: u32,
    /// Number of samples in the table
    pub rows: u64,
    /// Per-sample image height
    pub height: u32,
    /// Per-sample image width
    pub width: u32,
    /// Per-sample channel count
    pub channels: u32,
    /// Reserved, pads the header to 64 bytes
    pub _reserved: [u8; 36],
}

impl TableHeader {
    pub const MAGIC: [u8; 4] = *b"STRD";
    pub const VERSION: u32 = 1;

    fn new(rows: u64, shape: SampleShape) -> Self {
        Self {
            magic:    Self::MAGIC,
            version:  Self::VERSION,
            rows,
            height:   shape.height as u32,
            width:    shape.width as u32,
            channels: shape.channels as u32,
            _reserved: [0; 36],
        }
    }

    pub fn is_valid(&self) -> bool {
        self.magic == Self::MAGIC && self.version == Self::VERSION
    }

    fn shape(&self) -> SampleShape {
        SampleShape::new(self.height as usize, self.width as usize, self.channels as usize)
    }
}

// ─── Writer ───────────────────────────────────────────────────────────────────

/// Appends batches to a new container file.
/// Implements the SampleSink trait from the domain layer.
pub struct SampleTableWriter {
    path:   PathBuf,
    writer: BufWriter<File>,
    shape:  Option<SampleShape>,
    labels: Vec<f32>,
    rows:   u64,
}

impl SampleTableWriter {
    /// Create the container file, truncating any previous one.
    /// A zeroed header placeholder is written immediately so the
    /// pixel region always starts at the same offset.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = File::create(&path)
            .with_context(|| format!("Cannot create container '{}'", path.display()))?;

        let mut writer = BufWriter::new(file);
        writer.write_all(bytemuck::bytes_of(&TableHeader::zeroed()))?;

        Ok(Self {
            path,
            writer,
            shape: None,
            labels: Vec::new(),
            rows: 0,
        })
    }
}

impl SampleSink for SampleTableWriter {
    fn append_batch(&mut self, batch: &SampleBatch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }

        match self.shape {
            // First batch fixes the per-sample shape
            None => self.shape = Some(batch.shape),
            Some(expected) if expected != batch.shape => {
                bail!(
                    "container '{}' holds samples of shape {:?}, cannot append {:?}",
                    self.path.display(),
                    expected,
                    batch.shape,
                );
            }
            Some(_) => {}
        }

        self.writer
            .write_all(&batch.pixels)
            .with_context(|| format!("Cannot write to container '{}'", self.path.display()))?;
        self.labels.extend_from_slice(&batch.labels);
        self.rows += batch.len() as u64;

        Ok(())
    }

    fn close(mut self) -> Result<()> {
        // Labels region goes after the last pixel batch
        self.writer.write_all(bytemuck::cast_slice(&self.labels))?;
        self.writer.flush()?;

        // Backpatch the header now that the row count is final
        let mut file = self.writer.into_inner().map_err(|e| e.into_error())?;
        let shape  = self.shape.unwrap_or(SampleShape::new(0, 0, 0));
        let header = TableHeader::new(self.rows, shape);

        file.seek(SeekFrom::Start(0))?;
        file.write_all(bytemuck::bytes_of(&header))?;
        file.sync_all()
            .with_context(|| format!("Cannot finalise container '{}'", self.path.display()))?;

        tracing::debug!("Wrote {} samples to '{}'", self.rows, self.path.display());
        Ok(())
    }
}

// ─── Reader ───────────────────────────────────────────────────────────────────

/// A read-only, memory-mapped view of a container file.
#[derive(Debug)]
pub struct SampleTable {
    mmap:   Mmap,
    header: TableHeader,
    labels: Vec<f32>,
}

impl SampleTable {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Cannot open container '{}'", path.display()))?;
        let mmap = unsafe { MmapOptions::new().map(&file) }
            .with_context(|| format!("Cannot map container '{}'", path.display()))?;

        let header_size = mem::size_of::<TableHeader>();
        if mmap.len() < header_size {
            bail!("container '{}' is too small to hold a header", path.display());
        }

        let header: TableHeader = *bytemuck::from_bytes(&mmap[..header_size]);
        if !header.is_valid() {
            bail!(
                "container '{}' is not a sample table (bad magic or version)",
                path.display(),
            );
        }

        let rows       = header.rows as usize;
        let pixels_len = rows * header.shape().volume();
        let labels_off = header_size + pixels_len;
        let expected   = labels_off + rows * mem::size_of::<f32>();
        if mmap.len() < expected {
            bail!(
                "container '{}' is truncated: {} bytes, expected at least {}",
                path.display(),
                mmap.len(),
                expected,
            );
        }

        // The labels region is not alignment-guaranteed, so copy it
        // out once instead of casting the map in place
        let labels = bytemuck::pod_collect_to_vec::<u8, f32>(
            &mmap[labels_off..labels_off + rows * mem::size_of::<f32>()],
        );

        Ok(Self { mmap, header, labels })
    }

    /// Number of samples in the table.
    pub fn len(&self) -> usize {
        self.header.rows as usize
    }

    pub fn is_empty(&self) -> bool {
        self.header.rows == 0
    }

    pub fn shape(&self) -> SampleShape {
        self.header.shape()
    }

    /// Pixel bytes of one sample, zero-copy from the map.
    pub fn pixels_of(&self, row: usize) -> &[u8] {
        let volume = self.shape().volume();
        let start  = mem::size_of::<TableHeader>() + row * volume;
        &self.mmap[start..start + volume]
    }

    /// All steering labels, one per sample.
    pub fn labels(&self) -> &[f32] {
        &self.labels
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn batch(shape: SampleShape, n: usize, base: u8) -> SampleBatch {
        let pixels: Vec<u8> = (0..n * shape.volume())
            .map(|i| base.wrapping_add(i as u8))
            .collect();
        let labels: Vec<f32> = (0..n).map(|i| base as f32 + i as f32 * 0.1).collect();
        SampleBatch::new(shape, pixels, labels).unwrap()
    }

    #[test]
    fn test_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("train.bin");
        let shape = SampleShape::new(2, 3, 3);

        let mut writer = SampleTableWriter::create(&path).unwrap();
        let first  = batch(shape, 2, 0);
        let second = batch(shape, 3, 100);
        writer.append_batch(&first).unwrap();
        writer.append_batch(&second).unwrap();
        writer.close().unwrap();

        let table = SampleTable::open(&path).unwrap();
        assert_eq!(table.len(), 5);
        assert_eq!(table.shape(), shape);

        // Pixels come back row by row in append order
        assert_eq!(table.pixels_of(0), &first.pixels[..shape.volume()]);
        assert_eq!(table.pixels_of(2), &second.pixels[..shape.volume()]);

        // Labels are the concatenation of both batches
        let mut expected = first.labels.clone();
        expected.extend_from_slice(&second.labels);
        assert_eq!(table.labels(), &expected[..]);
    }

    #[test]
    fn test_images_and_labels_always_same_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.bin");
        let shape = SampleShape::new(1, 1, 3);

        let mut writer = SampleTableWriter::create(&path).unwrap();
        for i in 0..4 {
            writer.append_batch(&batch(shape, i + 1, i as u8)).unwrap();
        }
        writer.close().unwrap();

        let table = SampleTable::open(&path).unwrap();
        assert_eq!(table.len(), 1 + 2 + 3 + 4);
        assert_eq!(table.labels().len(), table.len());
    }

    #[test]
    fn test_shape_change_mid_write_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = SampleTableWriter::create(dir.path().join("t.bin")).unwrap();

        writer.append_batch(&batch(SampleShape::new(2, 2, 3), 1, 0)).unwrap();
        let err = writer
            .append_batch(&batch(SampleShape::new(2, 4, 3), 1, 0))
            .unwrap_err();
        assert!(format!("{err:#}").contains("shape"));
    }

    #[test]
    fn test_empty_table_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.bin");

        let writer = SampleTableWriter::create(&path).unwrap();
        writer.close().unwrap();

        let table = SampleTable::open(&path).unwrap();
        assert!(table.is_empty());
        assert!(table.labels().is_empty());
    }

    #[test]
    fn test_open_rejects_foreign_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not_a_table.bin");
        fs::write(&path, vec![0xAB; 128]).unwrap();

        assert!(SampleTable::open(&path).is_err());
    }

    #[test]
    fn test_open_rejects_truncated_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.bin");
        let shape = SampleShape::new(4, 4, 3);

        let mut writer = SampleTableWriter::create(&path).unwrap();
        writer.append_batch(&batch(shape, 3, 0)).unwrap();
        writer.close().unwrap();

        // Chop off the labels region
        let full = fs::read(&path).unwrap();
        fs::write(&path, &full[..full.len() - 8]).unwrap();

        assert!(SampleTable::open(&path).is_err());
    }
}
