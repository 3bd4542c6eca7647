// THEORY:
// Decoding is by far the most expensive part of the frame scan, and every frame can
// be decoded and sampled independently of the others. `analyze_parallel` spreads
// that work over tokio's blocking pool in batches of one frame per CPU, then folds
// the results back in frame order, so each block's intensity series is identical
// to what the sequential `HeatmapBuilder::analyze` produces.

use crate::core_modules::grid_manager::GridManager;
use crate::core_modules::pixel::pixel::Brightness;
use crate::core_modules::pixel_grid::AverageAccumulator;
use crate::error::{HeatmapError, HeatmapResult};
use crate::pipeline::{HeatmapBuilder, MotionHeatmap, decode_frame};
use image::RgbImage;
use std::path::PathBuf;
use std::sync::Arc;

/// The output of one worker: the block samples and, for averaging, the frame itself.
struct FrameSample {
    samples: Vec<Brightness>,
    frame: Option<RgbImage>,
}

/// Runs the frame scan of `builder` on tokio's blocking pool.
pub async fn analyze_parallel(builder: HeatmapBuilder) -> HeatmapResult<MotionHeatmap> {
    analyze_parallel_with_workers(builder, num_cpus::get()).await
}

/// Like `analyze_parallel`, decoding at most `workers` frames at a time.
pub async fn analyze_parallel_with_workers(
    mut builder: HeatmapBuilder,
    workers: usize,
) -> HeatmapResult<MotionHeatmap> {
    let workers = workers.max(1);
    let (width, height) = builder.dimensions();
    let keep_frames = builder.config.use_average_overlay;
    let mut accumulator = keep_frames.then(|| AverageAccumulator::new(width, height));
    let sampler = Arc::new(builder.grid_manager.clone());
    let paths: Vec<PathBuf> = builder.frames.paths().to_vec();
    let total = paths.len();

    log::debug!("Scanning {} frames with {} workers", total, workers);

    for (batch_index, batch) in paths.chunks(workers).enumerate() {
        let tasks = batch.iter().cloned().map(|path| {
            let sampler = Arc::clone(&sampler);
            tokio::task::spawn_blocking(move || {
                sample_frame(&sampler, path, width, height, keep_frames)
            })
        });
        let results = futures::future::join_all(tasks).await;

        for (offset, joined) in results.into_iter().enumerate() {
            let index = batch_index * workers + offset;
            log::info!("Processing input frame {} of {}", index + 1, total);
            let sample = joined.map_err(|err| HeatmapError::Task(err.to_string()))??;
            builder.grid_manager.record_samples(&sample.samples);
            if let (Some(accumulator), Some(frame)) = (accumulator.as_mut(), sample.frame.as_ref()) {
                accumulator.add(frame);
            }
        }
    }

    builder.finish(accumulator)
}

fn sample_frame(
    sampler: &GridManager,
    path: PathBuf,
    width: u32,
    height: u32,
    keep_frame: bool,
) -> HeatmapResult<FrameSample> {
    let frame = decode_frame(&path, width, height)?;
    let samples = sampler.sample_frame(&frame);
    Ok(FrameSample {
        samples,
        frame: keep_frame.then_some(frame),
    })
}
