// THEORY:
// The renderer paints the heatmap onto the base image. Each block gets one offset,
// proportional to how far its heatmap value sits from the mean of the whole heatmap:
//
//     offset = color_intensity_factor * (heatmap[row][col] - mean(heatmap))
//
// Every pixel of the block has `offset` added to its red channel and subtracted from
// its blue channel, both clipped back into 8 bits. Green is left alone. Blocks with
// more motion than average therefore trend red, quieter blocks trend blue, and a
// factor of 0 leaves the base image untouched.
//
// Frames are decoded by the `image` crate in RGB order, so channel 0 is red and
// channel 2 is blue. Pixels in the truncated remainder outside every block are
// copied from the base image.
//
// Rendering is a boundary operation: it reports success as a `bool` and never
// fails the caller, unlike the fatal errors of the analysis phase.

use crate::core_modules::chunk::chunk::BlockGrid;
use crate::core_modules::heatmap::Heatmap;
use crate::core_modules::pixel_grid::PixelGrid;
use crate::core_modules::utils::image_helper::image_helper::encode_image;
use crate::error::HeatmapResult;
use crate::pipeline::{HeatmapConfig, MotionHeatmap};
use image::RgbImage;
use std::path::Path;

pub use crate::core_modules::pixel_grid::clip8;

const RED: usize = 0;
const BLUE: usize = 2;

/// Applies the red/blue motion tint to a base image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatmapRenderer {
    color_intensity_factor: f64,
}

impl HeatmapRenderer {
    pub fn new(color_intensity_factor: f64) -> Self {
        Self { color_intensity_factor }
    }

    pub fn from_config(config: &HeatmapConfig) -> Self {
        Self::new(config.color_intensity_factor)
    }

    /// Renders `motion` and writes it to `output_path`. The image format follows the
    /// file extension. Returns whether the image was written.
    pub fn render(&self, motion: &MotionHeatmap, output_path: impl AsRef<Path>) -> bool {
        let output_path = output_path.as_ref();
        let result = self
            .render_image(motion)
            .and_then(|image| encode_image(&image, output_path));

        match result {
            Ok(()) => {
                log::info!("Wrote motion heatmap to {}", output_path.display());
                true
            }
            Err(err) => {
                log::warn!("Failed to render motion heatmap: {}", err);
                false
            }
        }
    }

    /// Renders `motion` in memory.
    pub fn render_image(&self, motion: &MotionHeatmap) -> HeatmapResult<RgbImage> {
        let base = motion.base_image()?;
        Ok(self.apply_overlay(motion.heatmap(), motion.grid(), &base))
    }

    /// Tints every block of `base` by its heatmap deviation from the mean.
    pub fn apply_overlay(&self, heatmap: &Heatmap, grid: &BlockGrid, base: &PixelGrid) -> RgbImage {
        let mut output = base.to_rgb_image();
        let mean_intensity = heatmap.mean();
        let total = grid.num_blocks();

        for (row, col) in grid.blocks() {
            log::debug!(
                "Processing output block {} of {}",
                grid.index_of(row, col) + 1,
                total
            );
            let offset =
                self.color_intensity_factor * (heatmap.get(row as usize, col as usize) - mean_intensity);
            let extent = grid.block_extent(row, col);

            for y in extent.top..extent.top + extent.height {
                for x in extent.left..extent.left + extent.width {
                    let channels = base.channels(x, y);
                    let pixel = output.get_pixel_mut(x, y);
                    pixel.0[RED] = clip8(channels[RED] + offset);
                    pixel.0[BLUE] = clip8(channels[BLUE] - offset);
                }
            }
        }

        output
    }
}
