//! Nearest neighbor search implementations

use rstar::primitives::GeomWithData;
use rstar::RTree;
use spincrate_core::{NearestNeighborSearch, Point3f};

type IndexedPoint = GeomWithData<[f32; 3], usize>;

fn sort_by_distance(neighbors: &mut [(usize, f32)]) {
    neighbors.sort_by(|a, b| {
        a.1.partial_cmp(&b.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });
}

/// R*-tree backed radius search over a static point set
///
/// Handles clouds with many coincident or coplanar points, which is the
/// common case for scanned surfaces.
pub struct RTreeSearch {
    tree: RTree<IndexedPoint>,
    len: usize,
}

impl RTreeSearch {
    pub fn new(points: &[Point3f]) -> Self {
        let indexed: Vec<IndexedPoint> = points
            .iter()
            .enumerate()
            .map(|(idx, p)| GeomWithData::new([p.x, p.y, p.z], idx))
            .collect();

        Self {
            tree: RTree::bulk_load(indexed),
            len: points.len(),
        }
    }
}

impl NearestNeighborSearch for RTreeSearch {
    fn find_radius_neighbors(&self, query: &Point3f, radius: f32) -> Vec<(usize, f32)> {
        let radius_squared = radius * radius;
        let mut neighbors: Vec<(usize, f32)> = self
            .tree
            .locate_within_distance([query.x, query.y, query.z], radius_squared)
            .map(|entry| {
                let [x, y, z] = *entry.geom();
                let distance_squared = (Point3f::new(x, y, z) - query).norm_squared();
                (entry.data, distance_squared)
            })
            .filter(|(_, distance_squared)| *distance_squared <= radius_squared)
            .collect();

        sort_by_distance(&mut neighbors);
        neighbors
    }

    fn len(&self) -> usize {
        self.len
    }
}

/// Simple brute force nearest neighbor search for small datasets
pub struct BruteForceSearch {
    points: Vec<Point3f>,
}

impl BruteForceSearch {
    pub fn new(points: &[Point3f]) -> Self {
        Self {
            points: points.to_vec(),
        }
    }
}

impl NearestNeighborSearch for BruteForceSearch {
    fn find_radius_neighbors(&self, query: &Point3f, radius: f32) -> Vec<(usize, f32)> {
        let radius_squared = radius * radius;
        let mut neighbors: Vec<(usize, f32)> = self.points
            .iter()
            .enumerate()
            .filter_map(|(idx, point)| {
                let distance_squared = (point - query).norm_squared();

                if distance_squared <= radius_squared {
                    Some((idx, distance_squared))
                } else {
                    None
                }
            })
            .collect();

        sort_by_distance(&mut neighbors);
        neighbors
    }

    fn len(&self) -> usize {
        self.points.len()
    }
}
