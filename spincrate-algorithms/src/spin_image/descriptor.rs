//! Spin image output types

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use spincrate_core::Error;

/// One spin image, flattened row-major (alpha bins major, beta bins minor)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinImage {
    pub image_width: usize,
    pub values: Vec<f32>,
}

impl SpinImage {
    /// Flatten a `(W + 1) x (2W + 1)` grid
    pub fn from_grid(grid: &Array2<f64>, image_width: usize) -> Self {
        debug_assert_eq!(grid.dim(), (image_width + 1, 2 * image_width + 1));
        Self {
            image_width,
            values: grid.iter().map(|v| *v as f32).collect(),
        }
    }

    /// Placeholder for a point that produced no descriptor
    pub fn invalid(image_width: usize) -> Self {
        Self {
            image_width,
            values: vec![f32::NAN; (image_width + 1) * (2 * image_width + 1)],
        }
    }

    pub fn rows(&self) -> usize {
        self.image_width + 1
    }

    pub fn cols(&self) -> usize {
        2 * self.image_width + 1
    }

    /// Value at `(row, col)`
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.rows() || col >= self.cols() {
            return None;
        }
        self.values.get(row * self.cols() + col).copied()
    }

    pub fn sum(&self) -> f32 {
        self.values.iter().sum()
    }

    /// False for the NaN placeholder of a skipped point
    pub fn is_valid(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }

    /// Back to a 2D grid
    pub fn to_grid(&self) -> Array2<f32> {
        Array2::from_shape_fn((self.rows(), self.cols()), |(r, c)| self.values[r * self.cols() + c])
    }
}

/// A query point that failed under [`FailurePolicy::SkipPoint`](super::FailurePolicy::SkipPoint)
#[derive(Debug, Clone, PartialEq)]
pub struct PointFailure {
    /// Position in the query sequence (and in the output)
    pub position: usize,
    /// Index of the point in the input cloud
    pub index: usize,
    pub error: Error,
}

/// Spin images for a sequence of query points, in query order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpinImageSet {
    pub images: Vec<SpinImage>,
    /// Input-cloud index of each image
    pub indices: Vec<usize>,
    #[serde(skip)]
    pub failures: Vec<PointFailure>,
}

impl SpinImageSet {
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &SpinImage)> {
        self.indices.iter().copied().zip(self.images.iter())
    }

    /// All histograms concatenated, one row per query point
    pub fn to_matrix(&self) -> Array2<f32> {
        let cols = self.images.first().map_or(0, |image| image.values.len());
        Array2::from_shape_fn((self.images.len(), cols), |(r, c)| self.images[r].values[c])
    }
}
