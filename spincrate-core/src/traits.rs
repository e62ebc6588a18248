//! Core traits for spincrate

use crate::point::*;

/// Trait for nearest neighbor search functionality
///
/// Implementations index a static set of points. Returned distances are
/// *squared* Euclidean distances, paired with the index of the point in
/// the indexed set.
pub trait NearestNeighborSearch {
    /// Find all neighbors within a given radius (inclusive), closest first
    fn find_radius_neighbors(&self, query: &Point3f, radius: f32) -> Vec<(usize, f32)>;

    /// Number of indexed points
    fn len(&self) -> usize;

    /// Whether the index is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
