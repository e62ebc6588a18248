//! Spin image estimation over a cloud of query points

use super::axis::RotationAxis;
use super::config::{FailurePolicy, SpinImageConfig};
use super::descriptor::{PointFailure, SpinImage, SpinImageSet};
use super::filter::{Alignment, NormalFilter};
use super::histogram::SpinHistogram;
use super::mapper::CoordinateMapper;
use super::normalize::normalize;
use crate::nearest_neighbor::RTreeSearch;
use ndarray::Array2;
use rayon::prelude::*;
use spincrate_core::{Error, NearestNeighborSearch, Point3f, PointCloud, Result, Vector3f};
use std::borrow::Cow;
use tracing::{debug, info, trace, warn};

/// Spin image estimator
///
/// Borrows the clouds it works on; nothing is copied until [`compute`](Self::compute)
/// builds its search index. Without a separate search surface the input
/// cloud is compared against itself.
///
/// # Example
/// ```rust
/// use spincrate_core::{Point3f, PointCloud, Vector3f};
/// use spincrate_algorithms::{SpinImageConfig, SpinImageEstimation};
///
/// fn main() -> spincrate_core::Result<()> {
///     let mut points = Vec::new();
///     for i in -5..=5 {
///         for j in -5..=5 {
///             points.push(Point3f::new(i as f32 * 0.1, j as f32 * 0.1, 0.0));
///         }
///     }
///     let normals: PointCloud<Vector3f> = points.iter().map(|_| Vector3f::z()).collect();
///     let cloud = PointCloud::from_points(points);
///
///     let config = SpinImageConfig::new(4, 0.5).with_min_neighbors(5);
///     let images = SpinImageEstimation::new(&cloud, config)
///         .with_input_normals(&normals)
///         .with_indices(vec![60])
///         .compute()?;
///
///     assert_eq!(images.len(), 1);
///     assert!((images.images[0].sum() - 1.0).abs() < 1e-4);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SpinImageEstimation<'a> {
    config: SpinImageConfig,
    input: &'a PointCloud<Point3f>,
    input_normals: Option<&'a PointCloud<Vector3f>>,
    surface: Option<&'a PointCloud<Point3f>>,
    surface_normals: Option<&'a PointCloud<Vector3f>>,
    indices: Option<Vec<usize>>,
    rotation_axis: Option<Vector3f>,
    rotation_axes: Option<&'a PointCloud<Vector3f>>,
}

impl<'a> SpinImageEstimation<'a> {
    /// Create an estimator for the points of `input`
    pub fn new(input: &'a PointCloud<Point3f>, config: SpinImageConfig) -> Self {
        Self {
            config,
            input,
            input_normals: None,
            surface: None,
            surface_normals: None,
            indices: None,
            rotation_axis: None,
            rotation_axes: None,
        }
    }

    /// Normals of the input cloud, index-aligned with it
    pub fn with_input_normals(mut self, normals: &'a PointCloud<Vector3f>) -> Self {
        self.input_normals = Some(normals);
        self
    }

    /// Search for neighbors in `surface` instead of the input cloud
    pub fn with_search_surface(
        mut self,
        surface: &'a PointCloud<Point3f>,
        normals: Option<&'a PointCloud<Vector3f>>,
    ) -> Self {
        self.surface = Some(surface);
        self.surface_normals = normals;
        self
    }

    /// Only compute descriptors for these input indices, in this order
    pub fn with_indices(mut self, indices: Vec<usize>) -> Self {
        self.indices = Some(indices);
        self
    }

    /// Use one rotation axis for every point
    pub fn with_rotation_axis(mut self, axis: Vector3f) -> Self {
        self.rotation_axis = Some(axis);
        self
    }

    /// Use a per-point rotation axis, index-aligned with the input cloud
    pub fn with_rotation_axes(mut self, axes: &'a PointCloud<Vector3f>) -> Self {
        self.rotation_axes = Some(axes);
        self
    }

    /// Drop any custom axis and spin around the input normals
    pub fn use_normals_as_rotation_axis(mut self) -> Self {
        self.rotation_axis = None;
        self.rotation_axes = None;
        self
    }

    pub fn config(&self) -> &SpinImageConfig {
        &self.config
    }

    /// Compute spin images, building an R*-tree over the search surface
    pub fn compute(&self) -> Result<SpinImageSet> {
        let prepared = self.prepare()?;
        let search = RTreeSearch::new(prepared.surface);
        prepared.run(&search)
    }

    /// Compute spin images using a caller-provided index over the search surface
    pub fn compute_with_search<S>(&self, search: &S) -> Result<SpinImageSet>
    where
        S: NearestNeighborSearch + Sync + ?Sized,
    {
        let prepared = self.prepare()?;
        prepared.check_search(search)?;
        prepared.run(search)
    }

    /// Compute the spin image of a single input point
    pub fn compute_point<S>(&self, index: usize, search: &S) -> Result<SpinImage>
    where
        S: NearestNeighborSearch + ?Sized,
    {
        let prepared = self.prepare()?;
        prepared.check_search(search)?;
        if index >= prepared.input.len() {
            return Err(Error::InvalidData(format!(
                "query index {} out of range for {} input points",
                index,
                prepared.input.len()
            )));
        }
        let grid = prepared.compute_grid(index, search)?;
        Ok(SpinImage::from_grid(&grid, self.config.image_width))
    }

    /// Validate the setup and resolve the axis source
    fn prepare(&self) -> Result<Prepared<'_>> {
        self.config.validate()?;

        let input = self.input.as_slice();
        let input_normals = self.input_normals.map(PointCloud::as_slice);
        if let Some(normals) = input_normals {
            if normals.len() != input.len() {
                return Err(Error::Configuration(format!(
                    "input has {} points but {} normals",
                    input.len(),
                    normals.len()
                )));
            }
        }

        // without a separate surface the input is compared against itself
        let (surface, surface_normals) = match self.surface {
            Some(surface) => (surface.as_slice(), self.surface_normals.map(PointCloud::as_slice)),
            None => {
                debug!("No search surface set, comparing the input cloud against itself");
                (input, input_normals)
            }
        };
        if let Some(normals) = surface_normals {
            if normals.len() != surface.len() {
                return Err(Error::Configuration(format!(
                    "search surface has {} points but {} normals",
                    surface.len(),
                    normals.len()
                )));
            }
        }

        let axis = match (self.rotation_axis, self.rotation_axes) {
            (Some(_), Some(_)) => {
                return Err(Error::Configuration(
                    "both a fixed rotation axis and a rotation axis cloud are set".to_string(),
                ));
            }
            (Some(axis), None) => RotationAxis::Fixed(axis),
            (None, Some(axes)) => {
                if axes.len() != input.len() {
                    return Err(Error::Configuration(format!(
                        "rotation axis cloud has {} entries but the input has {} points",
                        axes.len(),
                        input.len()
                    )));
                }
                RotationAxis::PerPoint(axes.as_slice())
            }
            (None, None) => {
                if input_normals.is_none() {
                    return Err(Error::Configuration(
                        "no input normals given and no custom rotation axis set".to_string(),
                    ));
                }
                RotationAxis::Normals
            }
        };

        let filter = NormalFilter::from_config(&self.config);
        if filter.is_active() && (input_normals.is_none() || surface_normals.is_none()) {
            return Err(Error::Configuration(
                "normals of the input and the search surface are required when the support \
                 angle is set or the angular domain is used"
                    .to_string(),
            ));
        }

        let indices: Cow<'_, [usize]> = match &self.indices {
            Some(indices) => {
                if let Some(bad) = indices.iter().find(|&&i| i >= input.len()) {
                    return Err(Error::Configuration(format!(
                        "query index {} out of range for {} input points",
                        bad,
                        input.len()
                    )));
                }
                Cow::Borrowed(indices.as_slice())
            }
            None => Cow::Owned((0..input.len()).collect()),
        };

        Ok(Prepared {
            config: &self.config,
            input,
            input_normals,
            surface,
            surface_normals,
            indices,
            axis,
            filter,
            mapper: CoordinateMapper::new(&self.config),
        })
    }
}

/// Validated, read-only view of an estimation run
struct Prepared<'a> {
    config: &'a SpinImageConfig,
    input: &'a [Point3f],
    input_normals: Option<&'a [Vector3f]>,
    surface: &'a [Point3f],
    surface_normals: Option<&'a [Vector3f]>,
    indices: Cow<'a, [usize]>,
    axis: RotationAxis<'a>,
    filter: NormalFilter,
    mapper: CoordinateMapper,
}

impl Prepared<'_> {
    fn check_search<S>(&self, search: &S) -> Result<()>
    where
        S: NearestNeighborSearch + ?Sized,
    {
        if search.len() != self.surface.len() {
            return Err(Error::Configuration(format!(
                "search index holds {} points but the search surface has {}",
                search.len(),
                self.surface.len()
            )));
        }
        Ok(())
    }

    fn run<S>(&self, search: &S) -> Result<SpinImageSet>
    where
        S: NearestNeighborSearch + Sync + ?Sized,
    {
        let width = self.config.image_width;
        debug!(
            "Computing {} spin images: width {}, radius {}, bin size {:.6}, radial {}, angular {}",
            self.indices.len(),
            width,
            self.config.search_radius,
            self.config.bin_size(),
            self.config.radial,
            self.config.angular
        );

        let results: Vec<Result<Array2<f64>>> = if self.config.parallel {
            self.indices
                .par_iter()
                .map(|&index| self.compute_grid(index, search))
                .collect()
        } else {
            self.indices
                .iter()
                .map(|&index| self.compute_grid(index, search))
                .collect()
        };

        let mut output = SpinImageSet {
            images: Vec::with_capacity(results.len()),
            indices: self.indices.to_vec(),
            failures: Vec::new(),
        };

        for (position, (&index, result)) in self.indices.iter().zip(results).enumerate() {
            match result {
                Ok(grid) => output.images.push(SpinImage::from_grid(&grid, width)),
                Err(error) => match self.config.failure_policy {
                    FailurePolicy::AbortBatch => return Err(error),
                    FailurePolicy::SkipPoint => {
                        warn!("Skipping spin image for point {}: {}", index, error);
                        output.images.push(SpinImage::invalid(width));
                        output.failures.push(PointFailure { position, index, error });
                    }
                },
            }
        }

        info!(
            "Computed {} spin images ({} skipped)",
            output.len() - output.failures.len(),
            output.failures.len()
        );
        Ok(output)
    }

    /// Spin image of input point `index` as a `(W + 1) x (2W + 1)` grid
    fn compute_grid<S>(&self, index: usize, search: &S) -> Result<Array2<f64>>
    where
        S: NearestNeighborSearch + ?Sized,
    {
        let origin = self.input[index];
        let query_normal = self.input_normals.map(|normals| &normals[index]);
        let axis = self.axis.axis_for(index, query_normal).ok_or_else(|| {
            Error::Configuration(format!("no rotation axis available for point {}", index))
        })?;

        let neighbors = search.find_radius_neighbors(&origin, self.config.search_radius);
        trace!("Point {} has {} neighbors", index, neighbors.len());
        if neighbors.len() < self.config.min_neighbors {
            return Err(Error::InsufficientNeighbors {
                index,
                found: neighbors.len(),
                required: self.config.min_neighbors,
            });
        }

        let mut histogram = SpinHistogram::new(self.config);
        for (neighbor, _) in neighbors {
            let neighbor_normal = self.surface_normals.and_then(|normals| normals.get(neighbor));
            let alignment = self.filter.check(index, neighbor, query_normal, neighbor_normal)?;
            if alignment == Alignment::Rejected {
                continue;
            }

            let position = self.surface.get(neighbor).ok_or_else(|| {
                Error::InvalidData(format!(
                    "neighbor index {} out of range for {} surface points",
                    neighbor,
                    self.surface.len()
                ))
            })?;
            let direction = *position - origin;

            if let Some(coords) = self.mapper.map(index, neighbor, &direction, &axis)? {
                histogram.add(coords, alignment.angle());
            }
        }

        Ok(normalize(histogram))
    }
}
