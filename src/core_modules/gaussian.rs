// THEORY:
// Low-pass filtering of the block heatmap. A single sample pixel per block is a noisy
// estimator of that block's motion, so the raw grid of standard deviations is
// smoothed with a 2D Gaussian before rendering.
//
// The filter is separable: a 1D kernel is run along every row, then along every
// column of the intermediate result. The kernel extends to `4 * sigma` on each side
// and its weights are normalized to sum to 1, so a uniform grid stays uniform.
// Indices that fall outside the grid are mirrored with the "reflect" rule
// (`d c b a | a b c d | d c b a`), which repeats the edge sample once.

use crate::core_modules::heatmap::Heatmap;

const TRUNCATE: f64 = 4.0;

/// Smooths `input` with a Gaussian of standard deviation `sigma` (in blocks).
/// A `sigma` of 0 returns an unchanged copy.
pub fn gaussian_blur_2d(input: &Heatmap, sigma: f64) -> Heatmap {
    if sigma <= 0.0 || input.values().is_empty() {
        return input.clone();
    }
    let kernel = gaussian_kernel(sigma);
    let (rows, cols) = (input.rows(), input.cols());

    // horizontal
    let mut tmp = Heatmap::zeros(rows, cols);
    for r in 0..rows {
        for c in 0..cols {
            let v = convolve_at(&kernel, c, cols, |i| input.get(r, i));
            tmp.set(r, c, v);
        }
    }

    // vertical
    let mut out = Heatmap::zeros(rows, cols);
    for c in 0..cols {
        for r in 0..rows {
            let v = convolve_at(&kernel, r, rows, |i| tmp.get(i, c));
            out.set(r, c, v);
        }
    }
    out
}

/// Normalized 1D Gaussian weights for offsets `-radius..=radius`.
fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    let radius = (TRUNCATE * sigma + 0.5) as i64;
    let denom = 2.0 * sigma * sigma;
    let weights: Vec<f64> = (-radius..=radius).map(|x| (-((x * x) as f64) / denom).exp()).collect();
    let total: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}

fn convolve_at(kernel: &[f64], center: usize, len: usize, sample: impl Fn(usize) -> f64) -> f64 {
    let radius = (kernel.len() / 2) as i64;
    kernel
        .iter()
        .enumerate()
        .map(|(k, w)| w * sample(reflect_index(center as i64 + k as i64 - radius, len)))
        .sum()
}

/// Maps any integer index onto `0..len` by mirroring about the edges.
fn reflect_index(index: i64, len: usize) -> usize {
    let len = len as i64;
    if len == 1 {
        return 0;
    }
    let period = 2 * len;
    let i = index.rem_euclid(period);
    if i < len { i as usize } else { (period - 1 - i) as usize }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflect_repeats_the_edge_sample() {
        // d c b a | a b c d | d c b a
        let mapped: Vec<usize> = (-4..8).map(|i| reflect_index(i, 4)).collect();
        assert_eq!(mapped, vec![3, 2, 1, 0, 0, 1, 2, 3, 3, 2, 1, 0]);
        assert_eq!(reflect_index(-7, 1), 0);
    }

    #[test]
    fn kernel_is_normalized_and_symmetric() {
        let kernel = gaussian_kernel(1.5);
        assert_eq!(kernel.len(), 13);
        assert!((kernel.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        for i in 0..kernel.len() / 2 {
            assert!((kernel[i] - kernel[kernel.len() - 1 - i]).abs() < 1e-15);
        }
    }

    #[test]
    fn uniform_grid_stays_uniform() {
        let input = Heatmap::from_rows(vec![vec![23.57; 3]; 2]);
        let out = gaussian_blur_2d(&input, 1.5);
        for v in out.values() {
            assert!((v - 23.57).abs() < 1e-9);
        }
    }

    #[test]
    fn zero_sigma_is_identity() {
        let input = Heatmap::from_rows(vec![vec![1.0, 5.0], vec![2.0, 9.0]]);
        assert_eq!(gaussian_blur_2d(&input, 0.0), input);
    }

    #[test]
    fn blur_spreads_a_peak_to_its_neighbours() {
        let mut input = Heatmap::zeros(5, 5);
        input.set(2, 2, 100.0);
        let out = gaussian_blur_2d(&input, 1.0);
        assert!(out.get(2, 2) < 100.0);
        assert!(out.get(2, 1) > 0.0);
        assert!(out.get(2, 2) > out.get(2, 1));
        assert!(out.get(2, 1) > out.get(2, 0));
        assert!((out.get(1, 2) - out.get(2, 1)).abs() < 1e-12);
    }

    #[test]
    fn single_cell_grid_is_unchanged() {
        let input = Heatmap::from_rows(vec![vec![4.2]]);
        let out = gaussian_blur_2d(&input, 2.0);
        assert!((out.get(0, 0) - 4.2).abs() < 1e-12);
    }

    fn assert_close(actual: &[f64], expected: &[f64], tolerance: f64) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < tolerance, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn ramp_matches_reference_values() {
        let ramp = Heatmap::from_rows(vec![vec![1.0, 2.0, 3.0, 4.0, 5.0]]);

        let narrow = gaussian_blur_2d(&ramp, 1.0);
        assert_close(
            narrow.values(),
            &[1.4270409503911738, 2.0678220347792573, 3.0, 3.932177965220743, 4.572959049608827],
            1e-12,
        );

        // Radius 16 on a length-5 axis: indices wrap through several reflections.
        let wide = gaussian_blur_2d(&ramp, 4.0);
        assert_close(wide.values(), &[2.9194834, 2.9502350, 3.0, 3.0497649, 3.0805165], 1e-6);
    }

    #[test]
    fn column_ramp_matches_the_row_ramp() {
        let row = Heatmap::from_rows(vec![vec![1.0, 2.0, 3.0, 4.0, 5.0]]);
        let column = Heatmap::from_rows((1..=5).map(|v| vec![v as f64]).collect());
        let along_row = gaussian_blur_2d(&row, 1.0);
        let along_column = gaussian_blur_2d(&column, 1.0);
        assert_close(along_column.values(), along_row.values(), 1e-12);
    }
}
