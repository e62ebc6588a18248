//! Spin image parameters

use serde::{Deserialize, Serialize};
use spincrate_core::{Error, Result};
use std::f64::consts::{FRAC_PI_2, SQRT_2};

/// What to do when a single query point cannot produce a descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FailurePolicy {
    /// Stop at the first failing point and return its error; no output is produced
    #[default]
    AbortBatch,
    /// Fill the failing point's slot with NaN, record the error and carry on
    SkipPoint,
}

/// Parameters of the spin image estimator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinImageConfig {
    /// Number of bins along the radial (alpha) direction; the image has
    /// `image_width + 1` rows and `2 * image_width + 1` columns
    pub image_width: usize,
    /// Minimum |cos| between query and neighbor normals for the neighbor to
    /// contribute; 0 disables the check
    pub support_angle_cos: f64,
    /// Minimum number of points the radius search must return
    pub min_neighbors: usize,
    /// Use spherical distance/elevation coordinates instead of cylindrical ones
    pub radial: bool,
    /// Store the average angle between normals per bin instead of a density
    pub angular: bool,
    /// Radius of the neighbor search
    pub search_radius: f32,
    /// Per-point failure handling
    pub failure_policy: FailurePolicy,
    /// Process query points on the rayon pool
    pub parallel: bool,
}

impl Default for SpinImageConfig {
    fn default() -> Self {
        Self {
            image_width: 8,
            support_angle_cos: 0.0,
            min_neighbors: 0,
            radial: false,
            angular: false,
            search_radius: 0.0,
            failure_policy: FailurePolicy::AbortBatch,
            parallel: true,
        }
    }
}

impl SpinImageConfig {
    /// Create a configuration with the given resolution and search radius
    pub fn new(image_width: usize, search_radius: f32) -> Self {
        Self {
            image_width,
            search_radius,
            ..Self::default()
        }
    }

    /// Set the image width
    pub fn with_image_width(mut self, image_width: usize) -> Self {
        self.image_width = image_width;
        self
    }

    /// Set the support angle cosine
    pub fn with_support_angle_cos(mut self, support_angle_cos: f64) -> Self {
        self.support_angle_cos = support_angle_cos;
        self
    }

    /// Set the minimum neighbor count
    pub fn with_min_neighbors(mut self, min_neighbors: usize) -> Self {
        self.min_neighbors = min_neighbors;
        self
    }

    /// Enable or disable the radial structure
    pub fn with_radial(mut self, radial: bool) -> Self {
        self.radial = radial;
        self
    }

    /// Enable or disable the angular domain
    pub fn with_angular(mut self, angular: bool) -> Self {
        self.angular = angular;
        self
    }

    /// Set the search radius
    pub fn with_search_radius(mut self, search_radius: f32) -> Self {
        self.search_radius = search_radius;
        self
    }

    /// Set the failure policy
    pub fn with_failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }

    /// Enable or disable parallel processing
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Check the numeric parameters
    pub fn validate(&self) -> Result<()> {
        if self.image_width == 0 {
            return Err(Error::Configuration("image_width must be at least 1".to_string()));
        }
        if !(0.0..=1.0).contains(&self.support_angle_cos) {
            return Err(Error::Configuration(format!(
                "support_angle_cos must be in [0, 1], got {}",
                self.support_angle_cos
            )));
        }
        if !self.search_radius.is_finite() || self.search_radius <= 0.0 {
            return Err(Error::Configuration(format!(
                "search_radius must be positive, got {}",
                self.search_radius
            )));
        }
        Ok(())
    }

    /// Whether neighbors are checked against the query normal
    pub fn filters_by_normal(&self) -> bool {
        self.support_angle_cos > 0.0 || self.angular
    }

    /// Rows of the descriptor grid (alpha bins)
    pub fn rows(&self) -> usize {
        self.image_width + 1
    }

    /// Columns of the descriptor grid (beta bins)
    pub fn cols(&self) -> usize {
        2 * self.image_width + 1
    }

    /// Number of values in one flattened descriptor
    pub fn histogram_len(&self) -> usize {
        self.rows() * self.cols()
    }

    /// Size of one alpha bin
    ///
    /// In rectangular mode the support cylinder (radius and half-height
    /// `bin_size * image_width`) is inscribed in the search sphere.
    pub fn bin_size(&self) -> f64 {
        let radius = self.search_radius as f64;
        let width = self.image_width as f64;
        if self.radial {
            radius / width
        } else {
            radius / width / SQRT_2
        }
    }

    /// Size of one beta bin: an angle in radial mode, a length otherwise
    pub fn beta_bin_size(&self) -> f64 {
        if self.radial {
            FRAC_PI_2 / self.image_width as f64
        } else {
            self.bin_size()
        }
    }
}
