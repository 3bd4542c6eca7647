// THEORY:
// The `SmartChunk` is the temporal observer for one block of the grid. It is handed a
// single sample location when it is created and keeps watching that one pixel for
// the whole frame sequence, recording the pixel's brightness once per frame.
//
// Key architectural principles:
// 1.  **Fixed Sample Location**: The sample pixel is drawn uniformly at random inside
//     the block's extent at construction time and never recomputed. Using one pixel
//     instead of the block average keeps the scan cheap; the Gaussian smoothing
//     applied later compensates for the noise of a single sample.
// 2.  **Append-Only History**: `update` appends exactly one sample per frame, in frame
//     order. The history length therefore always equals the number of frames seen.
// 3.  **Motion Score**: A block's motion score is the population standard deviation
//     of its brightness history. Static regions score close to 0; regions where
//     things come and go score high.

use crate::core_modules::chunk::chunk::BlockExtent;
use crate::core_modules::pixel::pixel::{Brightness, Pixel};
use image::RgbImage;
use rand::Rng;

/// Pixel coordinate `(pixel_row, pixel_col)` used as the motion indicator for a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleLocation {
    pub pixel_row: u32,
    pub pixel_col: u32,
}

/// A stateful sampler for a single block location in the grid.
#[derive(Debug, Clone)]
pub struct SmartChunk {
    /// The row index of this block in the grid.
    pub row: u32,
    /// The column index of this block in the grid.
    pub col: u32,
    /// The pixel watched by this block for the lifetime of the scan.
    pub sample_location: SampleLocation,
    /// One brightness sample per processed frame, in frame order.
    intensity_history: Vec<Brightness>,
}

impl SmartChunk {
    pub fn new<R: Rng>(row: u32, col: u32, extent: BlockExtent, rng: &mut R) -> Self {
        let sample_location = SampleLocation {
            pixel_row: extent.top + rng.gen_range(0..extent.height),
            pixel_col: extent.left + rng.gen_range(0..extent.width),
        };
        Self::with_location(row, col, sample_location)
    }

    pub fn with_location(row: u32, col: u32, sample_location: SampleLocation) -> Self {
        Self {
            row,
            col,
            sample_location,
            intensity_history: Vec::new(),
        }
    }

    /// Reads this block's sample pixel from `frame` without recording it.
    pub fn sample(&self, frame: &RgbImage) -> Brightness {
        let SampleLocation { pixel_row, pixel_col } = self.sample_location;
        Pixel::from(*frame.get_pixel(pixel_col, pixel_row)).brightness()
    }

    pub fn update(&mut self, frame: &RgbImage) {
        let brightness = self.sample(frame);
        self.record(brightness);
    }

    pub fn record(&mut self, brightness: Brightness) {
        self.intensity_history.push(brightness);
    }

    pub fn intensity_history(&self) -> &[Brightness] {
        &self.intensity_history
    }

    /// Population standard deviation of the brightness history.
    pub fn std_dev(&self) -> f64 {
        Self::calculate_stats_for_history(&self.intensity_history).1
    }

    fn calculate_stats_for_history(history: &[Brightness]) -> (f64, f64) {
        let count = history.len() as f64;
        if count < 1.0 {
            return (0.0, 0.0);
        }
        let sum: f64 = history.iter().map(|&v| v as f64).sum();
        let mean = sum / count;
        let variance = history.iter().map(|&v| (v as f64 - mean).powi(2)).sum::<f64>() / count;
        (mean, variance.sqrt())
    }
}
