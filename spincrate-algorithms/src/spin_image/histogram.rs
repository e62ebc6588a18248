//! Bilinear accumulation of neighbor contributions

use super::config::SpinImageConfig;
use super::mapper::SpinCoordinates;
use ndarray::Array2;

/// Cell indices and weights of one bilinear splat
///
/// `weights` are for `(row, col)`, `(row + 1, col)`, `(row, col + 1)` and
/// `(row + 1, col + 1)`, in that order, and sum to one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BilinearSplat {
    pub row: usize,
    pub col: usize,
    pub weights: [f64; 4],
}

impl BilinearSplat {
    /// Place `coords` on the grid described by the bin sizes and width
    pub fn new(
        coords: SpinCoordinates,
        bin_size: f64,
        beta_bin_size: f64,
        image_width: usize,
    ) -> Self {
        let width = image_width as i64;
        let mut alpha = coords.alpha;
        let mut beta = coords.beta;

        let mut alpha_bin = (alpha / bin_size).floor() as i64;
        let mut beta_bin = (beta / beta_bin_size).floor() as i64 + width;

        // points on the outer edge go to the last bin, nudged inside it
        if alpha_bin >= width {
            alpha_bin = width - 1;
            alpha = bin_size * width as f64 - f64::EPSILON;
        }
        if beta_bin >= 2 * width {
            beta_bin = 2 * width - 1;
            beta = beta_bin_size * width as f64 - f64::EPSILON;
        }
        let alpha_bin = alpha_bin.max(0);
        let beta_bin = beta_bin.max(0);

        let a = (alpha / bin_size - alpha_bin as f64).clamp(0.0, 1.0);
        let b = (beta / beta_bin_size - (beta_bin - width) as f64).clamp(0.0, 1.0);

        Self {
            row: alpha_bin as usize,
            col: beta_bin as usize,
            weights: [(1.0 - a) * (1.0 - b), a * (1.0 - b), (1.0 - a) * b, a * b],
        }
    }

    fn cells(&self) -> [(usize, usize); 4] {
        [
            (self.row, self.col),
            (self.row + 1, self.col),
            (self.row, self.col + 1),
            (self.row + 1, self.col + 1),
        ]
    }
}

/// Raw, unnormalized spin image of one query point
#[derive(Debug, Clone)]
pub struct SpinHistogram {
    /// Sum of bilinear weights per cell
    pub counts: Array2<f64>,
    /// Angle-weighted sums per cell, angular mode only
    pub angles: Option<Array2<f64>>,
    /// Number of neighbors that were splatted
    pub contributors: usize,
    bin_size: f64,
    beta_bin_size: f64,
    image_width: usize,
}

impl SpinHistogram {
    pub fn new(config: &SpinImageConfig) -> Self {
        let shape = (config.rows(), config.cols());
        Self {
            counts: Array2::zeros(shape),
            angles: config.angular.then(|| Array2::zeros(shape)),
            contributors: 0,
            bin_size: config.bin_size(),
            beta_bin_size: config.beta_bin_size(),
            image_width: config.image_width,
        }
    }

    /// Splat one neighbor; `angle` is the angle between the normals, used in angular mode
    pub fn add(&mut self, coords: SpinCoordinates, angle: Option<f64>) -> BilinearSplat {
        let splat = BilinearSplat::new(coords, self.bin_size, self.beta_bin_size, self.image_width);

        for (cell, weight) in splat.cells().into_iter().zip(splat.weights) {
            self.counts[cell] += weight;
        }
        if let (Some(angles), Some(angle)) = (self.angles.as_mut(), angle) {
            for (cell, weight) in splat.cells().into_iter().zip(splat.weights) {
                angles[cell] += weight * angle;
            }
        }

        self.contributors += 1;
        splat
    }
}
