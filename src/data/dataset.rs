use burn::data::dataset::Dataset;

use crate::domain::sample::SampleShape;
use crate::infra::container::SampleTable;

/// One decoded camera frame with its steering angle.
/// Pixels are row-major HWC bytes, exactly as stored on disk.
#[derive(Debug, Clone)]
pub struct SteeringSample {
    pub pixels:   Vec<u8>,
    pub shape:    SampleShape,
    pub steering: f32,
}

/// An in-memory dataset of steering samples, bulk-loaded from a
/// container so the training loop never touches the disk again.
pub struct SteeringDataset {
    shape:   SampleShape,
    samples: Vec<SteeringSample>,
}

impl SteeringDataset {
    pub fn new(shape: SampleShape, samples: Vec<SteeringSample>) -> Self {
        Self { shape, samples }
    }

    /// Copy every row of an opened container into memory.
    pub fn from_table(table: &SampleTable) -> Self {
        let shape = table.shape();
        let labels = table.labels();

        let samples = (0..table.len())
            .map(|row| SteeringSample {
                pixels:   table.pixels_of(row).to_vec(),
                shape,
                steering: labels[row],
            })
            .collect();

        Self { shape, samples }
    }

    pub fn shape(&self) -> SampleShape {
        self.shape
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

impl Dataset<SteeringSample> for SteeringDataset {
    fn get(&self, index: usize) -> Option<SteeringSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
