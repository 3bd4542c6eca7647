pub mod chunk;
pub mod frame_sequence;
pub mod gaussian;
pub mod grid_manager;
pub mod heatmap;
pub mod pixel;
pub mod pixel_grid;
pub mod smart_chunk;
pub mod utils;
