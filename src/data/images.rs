// ============================================================
// Layer 4 — Image Loading
// ============================================================
// Decodes camera frames from disk as 3-channel RGB and stacks
// a chunk of them into one SampleBatch.
//
// The first image of a batch fixes the per-sample shape; any
// later image with a different shape is a hard error. There is
// deliberately no resize-to-fit or padding fallback — a stray
// odd-sized frame in a recording means the data is broken, and
// breaking loudly here beats training on garbage.
//
// An optional resize scale shrinks (or grows) every frame
// uniformly, e.g. 0.5 halves both dimensions.

use anyhow::{bail, Context, Result};
use image::{imageops, ImageReader, RgbImage};
use std::path::{Path, PathBuf};

use crate::domain::sample::{SampleBatch, SampleShape};

/// Decode one image as RGB, optionally resized by `resize_scale`.
pub fn load_image(path: &Path, resize_scale: Option<f64>) -> Result<RgbImage> {
    let img = ImageReader::open(path)
        .with_context(|| format!("Cannot open image '{}'", path.display()))?
        .decode()
        .with_context(|| format!("Cannot decode image '{}'", path.display()))?
        .to_rgb8();

    match resize_scale {
        Some(scale) => {
            let width  = (img.width()  as f64 * scale) as u32;
            let height = (img.height() as f64 * scale) as u32;
            Ok(imageops::resize(&img, width, height, imageops::FilterType::Triangle))
        }
        None => Ok(img),
    }
}

/// Decode every image in `paths` and stack the chunk into a
/// SampleBatch together with its labels.
pub fn load_image_batch(
    paths:        &[PathBuf],
    labels:       Vec<f32>,
    resize_scale: Option<f64>,
) -> Result<SampleBatch> {
    let mut shape: Option<SampleShape> = None;
    let mut pixels = Vec::new();

    for path in paths {
        let img = load_image(path, resize_scale)?;
        let img_shape = SampleShape::new(img.height() as usize, img.width() as usize, 3);

        match shape {
            None => {
                // First image fixes the batch shape
                pixels.reserve(paths.len() * img_shape.volume());
                shape = Some(img_shape);
            }
            Some(expected) if expected != img_shape => {
                bail!(
                    "image '{}' has shape {:?}, expected {:?}",
                    path.display(),
                    img_shape,
                    expected,
                );
            }
            Some(_) => {}
        }

        // RgbImage stores row-major HWC bytes already
        pixels.extend_from_slice(img.as_raw());
    }

    let shape = shape.unwrap_or(SampleShape::new(0, 0, 3));
    SampleBatch::new(shape, pixels, labels)
}
