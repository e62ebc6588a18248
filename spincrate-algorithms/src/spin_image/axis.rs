//! Rotation axis selection

use spincrate_core::Vector3f;

/// Where the spin axis of each query point comes from
///
/// Resolved once when the estimator is validated; the axis is not
/// renormalized here; non-unit axes are caught by the coordinate mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RotationAxis<'a> {
    /// The query point's own normal
    Normals,
    /// One axis shared by every query point
    Fixed(Vector3f),
    /// Per-point axes, indexed like the input cloud
    PerPoint(&'a [Vector3f]),
}

impl<'a> RotationAxis<'a> {
    /// Axis for the input point at `index`, given that point's normal
    ///
    /// `query_normal` is only read in [`RotationAxis::Normals`] mode; the
    /// caller guarantees that `index` is in range for a per-point source.
    pub fn axis_for(&self, index: usize, query_normal: Option<&Vector3f>) -> Option<Vector3f> {
        match self {
            RotationAxis::Fixed(axis) => Some(*axis),
            RotationAxis::PerPoint(axes) => axes.get(index).copied(),
            RotationAxis::Normals => query_normal.copied(),
        }
    }
}
