//! # SpinCrate Algorithms
//!
//! Neighbor search and spin image estimation for 3D point clouds.
//!
//! The main entry point is [`SpinImageEstimation`], which computes one
//! rotation-invariant spin image per query point.

pub mod nearest_neighbor;
pub mod spin_image;

// Re-export commonly used items
pub use nearest_neighbor::*;
pub use spin_image::*;
