// THEORY:
// `Heatmap` is the small 2D grid of per-block motion scores. It has exactly one value
// per block, stored row-major, and is the only thing the renderer needs from the
// analysis besides the base image.

/// A `rows x cols` grid of real-valued motion scores, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Heatmap {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl Heatmap {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self { rows, cols, values: vec![0.0; rows * cols] }
    }

    /// Builds a heatmap from nested rows. Every row must have the same length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Self {
        let cols = rows.first().map_or(0, Vec::len);
        assert!(rows.iter().all(|r| r.len() == cols), "heatmap rows must have equal length");
        let num_rows = rows.len();
        Self { rows: num_rows, cols, values: rows.into_iter().flatten().collect() }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.values[row * self.cols + col] = value;
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Arithmetic mean over all blocks. An empty grid has mean 0.
    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    pub fn as_rows(&self) -> Vec<Vec<f64>> {
        self.values.chunks(self.cols.max(1)).map(<[f64]>::to_vec).collect()
    }
}
