//! Rigid 3D transformation utilities

use crate::error::{Error, Result};
use crate::point::{Point3f, Vector3f};
use nalgebra::{Isometry3, Translation3, Unit, UnitQuaternion};
use serde::{Deserialize, Serialize};

/// A rigid transformation (rotation followed by translation) that can be
/// applied to points, normals and point clouds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform3D {
    pub isometry: Isometry3<f32>,
}

impl Transform3D {
    /// Create a translation transformation
    pub fn translation(translation: Vector3f) -> Self {
        Self {
            isometry: Isometry3::from_parts(
                Translation3::from(translation),
                UnitQuaternion::identity(),
            ),
        }
    }

    /// Create a rotation about the origin from a quaternion
    pub fn rotation(rotation: UnitQuaternion<f32>) -> Self {
        Self {
            isometry: Isometry3::from_parts(Translation3::identity(), rotation),
        }
    }

    /// Rotate by `angle` radians about the line through `pivot` with direction `axis`
    ///
    /// The axis does not need to be unit length, but it must not be zero.
    pub fn rotation_about(axis: &Vector3f, angle: f32, pivot: &Point3f) -> Result<Self> {
        let axis = Unit::try_new(*axis, f32::EPSILON).ok_or_else(|| {
            Error::InvalidData("rotation axis must have non-zero length".to_string())
        })?;
        let rotation = UnitQuaternion::from_axis_angle(&axis, angle);
        let to_origin = Self::translation(-pivot.coords);
        let back = Self::translation(pivot.coords);
        Ok(back * Self::rotation(rotation) * to_origin)
    }

    /// Apply the transformation to a point
    pub fn transform_point(&self, point: &Point3f) -> Point3f {
        self.isometry.transform_point(point)
    }

    /// Apply the rotational part to a vector (normals, axes)
    pub fn transform_vector(&self, vector: &Vector3f) -> Vector3f {
        self.isometry.transform_vector(vector)
    }

    /// Compose this transformation with another; `other` is applied first
    pub fn compose(self, other: Self) -> Self {
        Self {
            isometry: self.isometry * other.isometry,
        }
    }

    /// Get the inverse transformation
    pub fn inverse(self) -> Self {
        Self {
            isometry: self.isometry.inverse(),
        }
    }
}

impl std::ops::Mul for Transform3D {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        self.compose(rhs)
    }
}
