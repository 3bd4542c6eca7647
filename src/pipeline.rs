// THEORY:
// The `pipeline` module is the top-level API of the heatmap engine. It wraps the
// whole analysis stack behind two types:
//
// - `HeatmapBuilder` is the cheap half. Creating one resolves the frame sequence,
//   decodes the first frame to learn the canvas size, partitions the canvas into
//   blocks and draws one sample pixel per block. Nothing else is read yet.
// - `HeatmapBuilder::analyze` is the expensive half. It decodes every frame in
//   order, feeds each block's sample into its history, optionally accumulates the
//   average image, and smooths the per-block standard deviations into the final
//   `Heatmap`. The result is a `MotionHeatmap`, which is immutable and is all the
//   renderer needs.
//
// Both phases fail fatally: an empty sequence or any frame that cannot be decoded
// aborts the run, and there is no partial heatmap.

use crate::core_modules::chunk::chunk::BlockGrid;
use crate::core_modules::frame_sequence::FrameSequence;
use crate::core_modules::gaussian::gaussian_blur_2d;
use crate::core_modules::grid_manager::GridManager;
use crate::core_modules::pixel_grid::{AverageAccumulator, PixelGrid};
use crate::core_modules::utils::image_helper::image_helper::decode_image;
use crate::error::{HeatmapError, HeatmapResult};
use crate::renderer::HeatmapRenderer;
use image::RgbImage;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};

// Re-export key data structures for the public API.
pub use crate::core_modules::heatmap::Heatmap;
pub use crate::core_modules::pixel::pixel::Brightness;
pub use crate::core_modules::smart_chunk::SampleLocation;

pub const DEFAULT_SIGMA: f64 = 1.5;
pub const DEFAULT_COLOR_INTENSITY_FACTOR: f64 = 7.0;
pub const DEFAULT_OUTPUT_PATH: &str = "motion_heatmap.jpg";

/// Configuration for a heatmap run.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapConfig {
    /// Number of block rows in the heatmap.
    pub num_vertical_divisions: u32,
    /// Number of block columns in the heatmap.
    pub num_horizontal_divisions: u32,
    /// Directory holding the frames.
    pub image_path: PathBuf,
    /// Paint the overlay on the average of all frames instead of the first frame.
    pub use_average_overlay: bool,
    /// Standard deviation, in blocks, of the Gaussian applied to the heatmap.
    pub sigma: f64,
    /// Scales the red/blue tint. Higher values exaggerate the tinting.
    pub color_intensity_factor: f64,
    /// Seed for sample pixel selection. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

/// A single block over the frames in the current directory.
impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            num_vertical_divisions: 1,
            num_horizontal_divisions: 1,
            image_path: PathBuf::from("."),
            use_average_overlay: true,
            sigma: DEFAULT_SIGMA,
            color_intensity_factor: DEFAULT_COLOR_INTENSITY_FACTOR,
            seed: None,
        }
    }
}

impl HeatmapConfig {
    pub fn new(
        num_vertical_divisions: u32,
        num_horizontal_divisions: u32,
        image_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            num_vertical_divisions,
            num_horizontal_divisions,
            image_path: image_path.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> HeatmapResult<()> {
        if self.num_vertical_divisions == 0 || self.num_horizontal_divisions == 0 {
            return Err(HeatmapError::InvalidConfig(format!(
                "division counts must be positive, got {}x{}",
                self.num_vertical_divisions, self.num_horizontal_divisions
            )));
        }
        if !self.sigma.is_finite() || self.sigma < 0.0 {
            return Err(HeatmapError::InvalidConfig(format!(
                "sigma must be a non-negative number, got {}",
                self.sigma
            )));
        }
        if !self.color_intensity_factor.is_finite() {
            return Err(HeatmapError::InvalidConfig(format!(
                "color intensity factor must be finite, got {}",
                self.color_intensity_factor
            )));
        }
        Ok(())
    }
}

/// Resolved inputs of a heatmap run, ready for the frame scan.
#[derive(Debug, Clone)]
pub struct HeatmapBuilder {
    pub(crate) config: HeatmapConfig,
    pub(crate) frames: FrameSequence,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) grid_manager: GridManager,
}

impl HeatmapBuilder {
    /// Resolves the frame sequence, reads the canvas size from the first frame and
    /// picks one sample pixel per block. `filter` receives bare file names.
    pub fn new<F>(config: HeatmapConfig, filter: F) -> HeatmapResult<Self>
    where
        F: Fn(&str) -> bool,
    {
        config.validate()?;
        let frames = FrameSequence::resolve(&config.image_path, filter)?;

        let sample_image = decode_image(frames.first())?;
        let (width, height) = sample_image.dimensions();
        let grid = BlockGrid::new(
            height,
            width,
            config.num_vertical_divisions,
            config.num_horizontal_divisions,
        )?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let grid_manager = GridManager::new(grid, &mut rng);

        log::info!(
            "Found {} frames of {}x{} in {}, using {}x{} blocks of {}x{} pixels",
            frames.len(),
            width,
            height,
            frames.directory().display(),
            grid.vertical_divisions,
            grid.horizontal_divisions,
            grid.block_width,
            grid.block_height,
        );

        Ok(Self { config, frames, width, height, grid_manager })
    }

    /// Creates the builder and runs the frame scan in one step.
    pub fn build<F>(config: HeatmapConfig, filter: F) -> HeatmapResult<MotionHeatmap>
    where
        F: Fn(&str) -> bool,
    {
        Self::new(config, filter)?.analyze()
    }

    pub fn config(&self) -> &HeatmapConfig {
        &self.config
    }

    pub fn frames(&self) -> &FrameSequence {
        &self.frames
    }

    /// Canvas size as `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn grid(&self) -> &BlockGrid {
        self.grid_manager.grid()
    }

    pub fn sample_location(&self, row: u32, col: u32) -> SampleLocation {
        self.grid_manager.sample_location(row, col)
    }

    /// Decodes every frame in order and computes the smoothed heatmap.
    pub fn analyze(mut self) -> HeatmapResult<MotionHeatmap> {
        let total = self.frames.len();
        let mut accumulator = self
            .config
            .use_average_overlay
            .then(|| AverageAccumulator::new(self.width, self.height));

        for (index, path) in self.frames.iter().enumerate() {
            log::info!("Processing input frame {} of {}", index + 1, total);
            let frame = decode_frame(path, self.width, self.height)?;
            if let Some(accumulator) = accumulator.as_mut() {
                accumulator.add(&frame);
            }
            self.grid_manager.process_frame(&frame);
        }

        self.finish(accumulator)
    }

    /// Turns the collected samples into the final `MotionHeatmap`.
    pub(crate) fn finish(self, accumulator: Option<AverageAccumulator>) -> HeatmapResult<MotionHeatmap> {
        let average_image = accumulator.map(AverageAccumulator::finish).transpose()?;
        let unfiltered_heatmap = self.grid_manager.unfiltered_heatmap();
        let heatmap = gaussian_blur_2d(&unfiltered_heatmap, self.config.sigma);
        log::debug!("Heatmap mean intensity {:.3}", heatmap.mean());

        Ok(MotionHeatmap {
            config: self.config,
            frames: self.frames,
            width: self.width,
            height: self.height,
            grid_manager: self.grid_manager,
            unfiltered_heatmap,
            heatmap,
            average_image,
        })
    }
}

/// Decodes one frame and checks it matches the canvas size of the sequence.
pub(crate) fn decode_frame(path: &Path, width: u32, height: u32) -> HeatmapResult<RgbImage> {
    let frame = decode_image(path)?;
    if frame.dimensions() != (width, height) {
        return Err(HeatmapError::DimensionMismatch {
            path: path.to_path_buf(),
            expected_width: width,
            expected_height: height,
            actual_width: frame.width(),
            actual_height: frame.height(),
        });
    }
    Ok(frame)
}

/// The immutable result of a frame scan.
#[derive(Debug, Clone)]
pub struct MotionHeatmap {
    config: HeatmapConfig,
    frames: FrameSequence,
    width: u32,
    height: u32,
    grid_manager: GridManager,
    unfiltered_heatmap: Heatmap,
    heatmap: Heatmap,
    average_image: Option<PixelGrid>,
}

impl MotionHeatmap {
    pub fn config(&self) -> &HeatmapConfig {
        &self.config
    }

    pub fn frames(&self) -> &FrameSequence {
        &self.frames
    }

    /// Canvas size as `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn grid(&self) -> &BlockGrid {
        self.grid_manager.grid()
    }

    /// The smoothed per-block motion scores.
    pub fn heatmap(&self) -> &Heatmap {
        &self.heatmap
    }

    /// Per-block standard deviations before smoothing.
    pub fn unfiltered_heatmap(&self) -> &Heatmap {
        &self.unfiltered_heatmap
    }

    /// The average of all frames, when the average overlay is enabled.
    pub fn average_image(&self) -> Option<&PixelGrid> {
        self.average_image.as_ref()
    }

    pub fn frames_processed(&self) -> usize {
        self.grid_manager.frames_processed()
    }

    pub fn sample_location(&self, row: u32, col: u32) -> SampleLocation {
        self.grid_manager.sample_location(row, col)
    }

    pub fn sample_locations(&self) -> impl Iterator<Item = ((u32, u32), SampleLocation)> + '_ {
        self.grid_manager.sample_locations()
    }

    pub fn intensity_series(&self, row: u32, col: u32) -> &[Brightness] {
        self.grid_manager.intensity_series(row, col)
    }

    /// The image the overlay is painted on: the average image, or a fresh decode of
    /// the first frame.
    pub fn base_image(&self) -> HeatmapResult<PixelGrid> {
        match &self.average_image {
            Some(average) => Ok(average.clone()),
            None => Ok(PixelGrid::from(&decode_image(self.frames.first())?)),
        }
    }

    /// Renders with the configured color intensity factor. See `HeatmapRenderer::render`.
    pub fn render(&self, output_path: impl AsRef<Path>) -> bool {
        HeatmapRenderer::from_config(&self.config).render(self, output_path)
    }
}
