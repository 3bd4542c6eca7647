//! Error types for heatmap construction and rendering.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for heatmap operations.
pub type HeatmapResult<T> = Result<T, HeatmapError>;

/// Errors that can occur while building or rendering a motion heatmap.
#[derive(Debug, Error)]
pub enum HeatmapError {
    #[error("No frames found in {} after filtering", .0.display())]
    EmptySequence(PathBuf),

    #[error("Failed to decode frame {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to encode image to {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error(
        "Frame {} is {actual_width}x{actual_height}, expected {expected_width}x{expected_height}",
        .path.display()
    )]
    DimensionMismatch {
        path: PathBuf,
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Background task failed: {0}")]
    Task(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
