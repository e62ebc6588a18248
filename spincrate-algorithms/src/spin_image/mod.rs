//! Spin image descriptors
//!
//! A spin image summarizes the points around a query point in a 2D
//! histogram indexed by distance from, and height along, a rotation axis
//! through the query point (usually its normal). Because the histogram
//! ignores the angle around the axis, it does not change when the
//! surrounding surface is rotated about that axis.
//!
//! Per query point the pipeline is: pick the axis ([`RotationAxis`]), find
//! neighbors within the search radius, drop those whose normals disagree
//! with the query normal ([`NormalFilter`]), map each remaining neighbor to
//! image coordinates ([`CoordinateMapper`]), splat it bilinearly into the
//! grid ([`SpinHistogram`]) and finally [`normalize`] the grid.
//! [`SpinImageEstimation`] drives this over a whole cloud.

pub mod axis;
pub mod config;
pub mod descriptor;
pub mod estimator;
pub mod filter;
pub mod histogram;
pub mod mapper;
pub mod normalize;

pub use axis::RotationAxis;
pub use config::{FailurePolicy, SpinImageConfig};
pub use descriptor::{PointFailure, SpinImage, SpinImageSet};
pub use estimator::SpinImageEstimation;
pub use filter::{Alignment, NormalFilter};
pub use histogram::{BilinearSplat, SpinHistogram};
pub use mapper::{CoordinateMapper, SpinCoordinates};
pub use normalize::normalize;
