// THEORY:
// This file is the main entry point for the `motion_heatmap` library crate.
// It exports the two halves of the engine as the public API:
//
// - `pipeline::HeatmapBuilder` scans a directory of time-lapse frames and produces
//   a `pipeline::MotionHeatmap`, the per-block motion scores smoothed with a
//   Gaussian kernel (plus the optional average image).
// - `renderer::HeatmapRenderer` paints that heatmap as a red/blue tint over the
//   average image or the first frame and writes the result to disk.
//
// `parallel_pipeline` offers the same frame scan on tokio's blocking pool. The
// building blocks live in `core_modules`.

pub mod core_modules;
pub mod error;
pub mod parallel_pipeline;
pub mod pipeline;
pub mod renderer;

pub use error::{HeatmapError, HeatmapResult};
pub use pipeline::{HeatmapBuilder, HeatmapConfig, MotionHeatmap};
pub use renderer::HeatmapRenderer;
