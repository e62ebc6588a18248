//! Core data structures and traits for spincrate
//! 
//! This crate provides the fundamental types shared by the spin image
//! pipeline: points, normals, point clouds, rigid transforms, the
//! neighbor-search trait and the common error type.

pub mod point;
pub mod point_cloud;
pub mod traits;
pub mod transform;
pub mod error;

pub use point::*;
pub use point_cloud::*;
pub use traits::*;
pub use transform::*;
pub use error::*;

/// Re-export the nalgebra types the point aliases are built on
pub use nalgebra::{Point3, Vector3};
