//! Conversion of neighbor offsets into spin image coordinates

use super::config::SpinImageConfig;
use super::filter::UNIT_TOLERANCE;
use spincrate_core::{Error, NormalKind, Result, Vector3f};

/// Offsets shorter than this are treated as the query point itself
pub const COINCIDENT_DISTANCE: f64 = 10.0 * f64::EPSILON;

/// Position of a neighbor in the image plane
///
/// Rectangular mode: `alpha` is the distance from the axis, `beta` the signed
/// height along it. Radial mode: `alpha` is the distance from the query
/// point, `beta` the elevation above the tangent plane in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinCoordinates {
    pub alpha: f64,
    pub beta: f64,
}

/// Maps neighbor offsets to `(alpha, beta)` and rejects those outside the support
#[derive(Debug, Clone, Copy)]
pub struct CoordinateMapper {
    radial: bool,
    /// `bin_size * image_width`
    support: f64,
}

impl CoordinateMapper {
    pub fn new(config: &SpinImageConfig) -> Self {
        Self {
            radial: config.radial,
            support: config.bin_size() * config.image_width as f64,
        }
    }

    /// Map the offset from the query point to a neighbor
    ///
    /// Returns `Ok(None)` for neighbors that do not contribute: coincident
    /// with the query point, or outside the support region.
    pub fn map(
        &self,
        index: usize,
        neighbor: usize,
        direction: &Vector3f,
        axis: &Vector3f,
    ) -> Result<Option<SpinCoordinates>> {
        let distance = direction.norm() as f64;
        if distance < COINCIDENT_DISTANCE {
            return Ok(None);
        }

        let cos_dir_axis = direction.dot(axis) as f64 / distance;
        if cos_dir_axis.abs() > 1.0 + UNIT_TOLERANCE || cos_dir_axis.is_nan() {
            return Err(Error::DegenerateNormal {
                index,
                neighbor,
                dot: cos_dir_axis,
                kind: NormalKind::RotationAxis,
            });
        }
        let cos_dir_axis = cos_dir_axis.clamp(-1.0, 1.0);

        let coords = if self.radial {
            // arcsine: elevation from the tangent plane, not angle to the axis
            let coords = SpinCoordinates {
                alpha: distance,
                beta: cos_dir_axis.asin(),
            };
            // only reachable when the search hands back points beyond its radius
            if coords.alpha > self.support * (1.0 + UNIT_TOLERANCE) {
                return Ok(None);
            }
            coords
        } else {
            let coords = SpinCoordinates {
                alpha: distance * (1.0 - cos_dir_axis * cos_dir_axis).sqrt(),
                beta: distance * cos_dir_axis,
            };
            if coords.beta.abs() >= self.support || coords.alpha >= self.support {
                return Ok(None);
            }
            coords
        };

        Ok(Some(coords))
    }
}
