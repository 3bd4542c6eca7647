// THEORY:
// The `GridManager` is the owner and operator of every `SmartChunk` in the block
// grid. It turns a decoded frame into one brightness sample per block and, once all
// frames have been seen, turns the per-block histories into the raw heatmap.
//
// Key architectural principles:
// 1.  **Orchestration**: It is not an analyzer itself. It holds the master list of
//     `SmartChunk`s in row-major order and calls their `update` methods for each
//     frame, in frame order.
// 2.  **Geometry Ownership**: It owns the `BlockGrid`, so sample locations are drawn
//     from exactly the extents the renderer later paints.
// 3.  **State Aggregation**: `unfiltered_heatmap` gathers each chunk's standard
//     deviation into a `Heatmap`, the input of the Gaussian smoothing stage.

use crate::core_modules::chunk::chunk::BlockGrid;
use crate::core_modules::heatmap::Heatmap;
use crate::core_modules::pixel::pixel::Brightness;
use crate::core_modules::smart_chunk::{SampleLocation, SmartChunk};
use image::RgbImage;
use rand::Rng;

/// Manages the grid of `SmartChunk`s for one frame sequence.
#[derive(Debug, Clone)]
pub struct GridManager {
    grid: BlockGrid,
    smart_chunks: Vec<SmartChunk>,
    frames_processed: usize,
}

impl GridManager {
    /// Creates a manager with one randomly placed sample pixel per block.
    pub fn new<R: Rng>(grid: BlockGrid, rng: &mut R) -> Self {
        let smart_chunks = grid
            .blocks()
            .map(|(row, col)| SmartChunk::new(row, col, grid.block_extent(row, col), &mut *rng))
            .collect();
        Self { grid, smart_chunks, frames_processed: 0 }
    }

    pub fn grid(&self) -> &BlockGrid {
        &self.grid
    }

    pub fn frames_processed(&self) -> usize {
        self.frames_processed
    }

    /// Appends one brightness sample per block, read from `frame`.
    pub fn process_frame(&mut self, frame: &RgbImage) {
        for smart_chunk in &mut self.smart_chunks {
            smart_chunk.update(frame);
        }
        self.frames_processed += 1;
    }

    /// Reads every block's sample from `frame` without recording it.
    pub fn sample_frame(&self, frame: &RgbImage) -> Vec<Brightness> {
        self.smart_chunks.iter().map(|c| c.sample(frame)).collect()
    }

    /// Records a row-major set of samples previously produced by `sample_frame`.
    pub fn record_samples(&mut self, samples: &[Brightness]) {
        debug_assert_eq!(samples.len(), self.smart_chunks.len());
        for (smart_chunk, &brightness) in self.smart_chunks.iter_mut().zip(samples) {
            smart_chunk.record(brightness);
        }
        self.frames_processed += 1;
    }

    pub fn sample_locations(&self) -> impl Iterator<Item = ((u32, u32), SampleLocation)> + '_ {
        self.smart_chunks.iter().map(|c| ((c.row, c.col), c.sample_location))
    }

    pub fn sample_location(&self, row: u32, col: u32) -> SampleLocation {
        self.smart_chunks[self.grid.index_of(row, col)].sample_location
    }

    pub fn intensity_series(&self, row: u32, col: u32) -> &[Brightness] {
        self.smart_chunks[self.grid.index_of(row, col)].intensity_history()
    }

    /// Per-block population standard deviation of the recorded samples.
    pub fn unfiltered_heatmap(&self) -> Heatmap {
        let mut heatmap = Heatmap::zeros(
            self.grid.vertical_divisions as usize,
            self.grid.horizontal_divisions as usize,
        );
        for smart_chunk in &self.smart_chunks {
            heatmap.set(smart_chunk.row as usize, smart_chunk.col as usize, smart_chunk.std_dev());
        }
        heatmap
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn manager(height: u32, width: u32, rows: u32, cols: u32) -> GridManager {
        let grid = BlockGrid::new(height, width, rows, cols).unwrap();
        GridManager::new(grid, &mut StdRng::seed_from_u64(3))
    }

    #[test]
    fn one_sample_location_per_block() {
        let manager = manager(9, 12, 3, 4);
        let keys: Vec<_> = manager.sample_locations().map(|(k, _)| k).collect();
        let expected: Vec<_> = (0..3).flat_map(|r| (0..4).map(move |c| (r, c))).collect();
        assert_eq!(keys, expected);

        for ((row, col), location) in manager.sample_locations() {
            let extent = manager.grid().block_extent(row, col);
            assert!(extent.contains(location.pixel_row, location.pixel_col));
        }
    }

    #[test]
    fn series_length_matches_frames_processed() {
        let mut manager = manager(4, 4, 2, 2);
        for value in [100u8, 150, 100] {
            manager.process_frame(&RgbImage::from_pixel(4, 4, Rgb([value; 3])));
        }
        assert_eq!(manager.frames_processed(), 3);
        for row in 0..2 {
            for col in 0..2 {
                assert_eq!(manager.intensity_series(row, col), &[100, 150, 100]);
            }
        }
    }

    #[test]
    fn recorded_samples_match_processed_frames() {
        let frames: Vec<RgbImage> = (0..4u8)
            .map(|i| RgbImage::from_fn(6, 6, |x, y| Rgb([x as u8 * 10 + i, y as u8 * 20, i * 3])))
            .collect();

        let mut direct = manager(6, 6, 3, 2);
        let mut recorded = direct.clone();
        for frame in &frames {
            direct.process_frame(frame);
            let samples = recorded.sample_frame(frame);
            recorded.record_samples(&samples);
        }
        assert_eq!(direct.unfiltered_heatmap(), recorded.unfiltered_heatmap());
        assert_eq!(direct.frames_processed(), recorded.frames_processed());
    }

    #[test]
    fn unfiltered_heatmap_holds_std_devs() {
        let mut manager = manager(2, 2, 1, 2);
        // Left column flickers, right column is constant.
        for value in [0u8, 200, 0, 200] {
            let frame = RgbImage::from_fn(2, 2, |x, _| if x == 0 { Rgb([value; 3]) } else { Rgb([50; 3]) });
            manager.process_frame(&frame);
        }
        let heatmap = manager.unfiltered_heatmap();
        assert_eq!(heatmap.get(0, 0), 100.0);
        assert_eq!(heatmap.get(0, 1), 0.0);
    }
}
