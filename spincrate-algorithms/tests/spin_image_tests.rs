//! Integration tests for spin image estimation
//!
//! These tests run the whole pipeline on synthetic surfaces and check the
//! properties the descriptor is used for: normalization, symmetry and
//! invariance to rotations about the spin axis.

use approx::assert_abs_diff_eq;
use rand::prelude::*;
use spincrate_algorithms::*;
use spincrate_core::{
    Error, NormalKind, NormalPoint3f, NormalPointCloud3f, Point3f, PointCloud, Transform3D, Vector3f,
};

/// Height field z = 0.3x^2 - 0.2y + 0.1xy sampled on a grid, with analytic normals
///
/// Deliberately lacks any rotational symmetry about its normal at the origin.
fn saddle_patch(half: i32, spacing: f32) -> NormalPointCloud3f {
    let mut points = Vec::new();
    for i in -half..=half {
        for j in -half..=half {
            let x = i as f32 * spacing;
            let y = j as f32 * spacing;
            let z = 0.3 * x * x - 0.2 * y + 0.1 * x * y;
            let normal = Vector3f::new(-(0.6 * x + 0.1 * y), -(-0.2 + 0.1 * x), 1.0).normalize();
            points.push(NormalPoint3f::new(Point3f::new(x, y, z), normal));
        }
    }
    PointCloud::from_points(points)
}

fn origin_index(half: i32) -> usize {
    let side = (2 * half + 1) as usize;
    side * side / 2
}

/// Concentric rings in the plane z = `height`, normals up
fn disk(rings: usize, ring_spacing: f32, height: f32) -> NormalPointCloud3f {
    let mut points = vec![NormalPoint3f::new(Point3f::new(0.0, 0.0, height), Vector3f::z())];
    for ring in 1..=rings {
        let radius = ring as f32 * ring_spacing;
        let count = 8 * ring;
        for k in 0..count {
            let theta = 2.0 * std::f32::consts::PI * k as f32 / count as f32;
            points.push(NormalPoint3f::new(
                Point3f::new(radius * theta.cos(), radius * theta.sin(), height),
                Vector3f::z(),
            ));
        }
    }
    PointCloud::from_points(points)
}

fn spin_image_at(cloud: &NormalPointCloud3f, index: usize, config: SpinImageConfig) -> SpinImage {
    let positions = cloud.positions();
    let normals = cloud.normals();
    let mut images = SpinImageEstimation::new(&positions, config)
        .with_input_normals(&normals)
        .with_indices(vec![index])
        .compute()
        .unwrap();
    images.images.remove(0)
}

fn assert_mirror_symmetric(image: &SpinImage, epsilon: f32) {
    let w = image.image_width;
    for row in 0..image.rows() {
        for col in 0..image.cols() {
            let mirrored = 2 * w - col;
            assert_abs_diff_eq!(
                image.get(row, col).unwrap(),
                image.get(row, mirrored).unwrap(),
                epsilon = epsilon
            );
        }
    }
}

#[test]
fn test_flat_disk_is_symmetric() {
    let cloud = disk(20, 0.05, 0.0);
    let image = spin_image_at(&cloud, 0, SpinImageConfig::new(4, 1.0));

    assert_eq!((image.rows(), image.cols()), (5, 9));
    assert_abs_diff_eq!(image.sum(), 1.0, epsilon = 1e-5);
    assert_mirror_symmetric(&image, 1e-6);

    // a flat disk has zero height everywhere: only the center column is hit
    for row in 0..5 {
        for col in (0..9).filter(|&c| c != 4) {
            assert_eq!(image.get(row, col), Some(0.0));
        }
    }
}

#[test]
fn test_stacked_disks_are_symmetric() {
    let mut cloud = disk(12, 0.05, 0.0);
    cloud.extend(disk(12, 0.05, 0.1).into_iter().skip(1));
    cloud.extend(disk(12, 0.05, -0.1).into_iter().skip(1));

    let image = spin_image_at(&cloud, 0, SpinImageConfig::new(4, 1.0));
    assert_abs_diff_eq!(image.sum(), 1.0, epsilon = 1e-5);
    assert_mirror_symmetric(&image, 1e-5);
    // the offset disks spread weight into neighboring columns
    assert!(image.get(1, 3).unwrap() > 0.0);
    assert!(image.get(1, 5).unwrap() > 0.0);
}

#[test]
fn test_density_images_sum_to_one() {
    let cloud = saddle_patch(8, 0.05);
    let positions = cloud.positions();
    let normals = cloud.normals();

    for radial in [false, true] {
        let config = SpinImageConfig::new(6, 0.3).with_radial(radial).with_min_neighbors(2);
        let images = SpinImageEstimation::new(&positions, config)
            .with_input_normals(&normals)
            .compute()
            .unwrap();

        assert_eq!(images.len(), cloud.len());
        for image in &images.images {
            assert_eq!(image.values.len(), 7 * 13);
            assert!(image.values.iter().all(|v| v.is_finite() && *v >= 0.0));
            assert_abs_diff_eq!(image.sum(), 1.0, epsilon = 1e-4);
        }
    }
}

/// Random rotations of `cloud` about the normal at `query`, pivoting on the query point
fn rotations_about_normal(cloud: &NormalPointCloud3f, query: usize, seed: u64) -> Vec<NormalPointCloud3f> {
    let axis = cloud[query].normal;
    let pivot = cloud[query].position;
    let mut rng = StdRng::seed_from_u64(seed);
    (0..3)
        .map(|_| {
            let angle = rng.gen_range(0.1..std::f32::consts::TAU);
            let mut rotated = cloud.clone();
            rotated.transform(&Transform3D::rotation_about(&axis, angle, &pivot).unwrap());
            rotated
        })
        .collect()
}

#[test]
fn test_rotation_about_axis_leaves_image_unchanged() {
    let half = 10;
    let cloud = saddle_patch(half, 0.06);
    let query = origin_index(half);

    let configs = [
        SpinImageConfig::new(5, 0.6),
        SpinImageConfig::new(5, 0.6).with_radial(true),
        SpinImageConfig::new(5, 0.6).with_support_angle_cos(0.8),
    ];

    for config in configs {
        let reference = spin_image_at(&cloud, query, config.clone());
        assert!(reference.is_valid());

        for rotated in rotations_about_normal(&cloud, query, 2024) {
            let image = spin_image_at(&rotated, query, config.clone());
            for (a, b) in reference.values.iter().zip(&image.values) {
                assert_abs_diff_eq!(*a, *b, epsilon = 1e-4);
            }
        }
    }
}

#[test]
fn test_rotation_about_axis_leaves_mean_angles_unchanged() {
    let half = 10;
    let cloud = saddle_patch(half, 0.06);
    let query = origin_index(half);
    let density = SpinImageConfig::new(5, 0.6);
    let angular = density.clone().with_angular(true);

    let reference_weights = spin_image_at(&cloud, query, density.clone());
    let reference = spin_image_at(&cloud, query, angular.clone());
    assert!(reference.is_valid());

    for rotated in rotations_about_normal(&cloud, query, 2024) {
        let weights = spin_image_at(&rotated, query, density.clone());
        let image = spin_image_at(&rotated, query, angular.clone());

        let mut compared = 0;
        for cell in 0..reference.values.len() {
            // a neighbor on a bin line leaves ~0 weight in the next cell, and
            // the mean angle of such a cell is the neighbor's full angle
            if reference_weights.values[cell].min(weights.values[cell]) < 1e-5 {
                continue;
            }
            compared += 1;
            // acos is steep near aligned normals, so mean angles are looser
            assert_abs_diff_eq!(reference.values[cell], image.values[cell], epsilon = 2e-3);
        }
        assert!(compared > 0);
    }
}

#[test]
fn test_rotation_about_other_axis_changes_image() {
    let half = 10;
    let cloud = saddle_patch(half, 0.06);
    let query = origin_index(half);
    let config = SpinImageConfig::new(5, 0.6).with_parallel(false);

    let positions = cloud.positions();
    let reference = SpinImageEstimation::new(&positions, config.clone())
        .with_rotation_axis(Vector3f::z())
        .with_indices(vec![query])
        .compute()
        .unwrap();
    let tilted = SpinImageEstimation::new(&positions, config)
        .with_rotation_axis(Vector3f::x())
        .with_indices(vec![query])
        .compute()
        .unwrap();

    let difference: f32 = reference.images[0]
        .values
        .iter()
        .zip(&tilted.images[0].values)
        .map(|(a, b)| (a - b).abs())
        .sum();
    assert!(difference > 0.1);
}

#[test]
fn test_counter_directed_normals_give_same_image() {
    let half = 6;
    let cloud = saddle_patch(half, 0.05);
    let query = origin_index(half);
    let config = SpinImageConfig::new(4, 0.3).with_support_angle_cos(0.5);

    let mut flipped = cloud.clone();
    for (i, point) in flipped.iter_mut().enumerate() {
        if i % 2 == 1 {
            point.normal = -point.normal;
        }
    }

    let reference = spin_image_at(&cloud, query, config.clone());
    let image = spin_image_at(&flipped, query, config);
    assert_eq!(reference, image);
}

#[test]
fn test_point_on_search_sphere_lands_in_last_row() {
    let positions = PointCloud::from_points(vec![Point3f::origin(), Point3f::new(1.0, 0.0, 0.0)]);
    let normals = PointCloud::from_points(vec![Vector3f::z(), Vector3f::z()]);
    let config = SpinImageConfig::new(4, 1.0).with_radial(true);

    let images = SpinImageEstimation::new(&positions, config)
        .with_input_normals(&normals)
        .with_indices(vec![0])
        .compute()
        .unwrap();
    let image = &images.images[0];

    // alpha == W * bin_size: clamped into the last bin, weight on its outer edge
    assert_abs_diff_eq!(image.get(4, 4).unwrap(), 1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(image.sum(), 1.0, epsilon = 1e-6);
}

#[test]
fn test_sparse_neighborhood_fails() {
    let mut cloud = disk(3, 0.05, 0.0);
    cloud.push(NormalPoint3f::new(Point3f::new(5.0, 5.0, 0.0), Vector3f::z()));
    let isolated = cloud.len() - 1;
    let positions = cloud.positions();
    let normals = cloud.normals();
    let config = SpinImageConfig::new(4, 0.5).with_min_neighbors(3);

    let result = SpinImageEstimation::new(&positions, config.clone())
        .with_input_normals(&normals)
        .compute();
    assert_eq!(
        result.unwrap_err(),
        Error::InsufficientNeighbors { index: isolated, found: 1, required: 3 }
    );

    let images = SpinImageEstimation::new(&positions, config.with_failure_policy(FailurePolicy::SkipPoint))
        .with_input_normals(&normals)
        .compute()
        .unwrap();
    assert_eq!(images.failures.len(), 1);
    assert_eq!(images.failures[0].index, isolated);
    assert!(!images.images[isolated].is_valid());
    assert!(images.images[..isolated].iter().all(SpinImage::is_valid));
}

#[test]
fn test_non_unit_normal_fails() {
    let mut cloud = disk(3, 0.05, 0.0);
    cloud[5].normal = Vector3f::new(0.0, 0.0, 2.0);
    let positions = cloud.positions();
    let normals = cloud.normals();
    let config = SpinImageConfig::new(4, 0.5).with_support_angle_cos(0.3);

    let result = SpinImageEstimation::new(&positions, config)
        .with_input_normals(&normals)
        .with_indices(vec![0])
        .compute();
    match result {
        Err(Error::DegenerateNormal { index, neighbor, kind, .. }) => {
            assert_eq!(index, 0);
            assert_eq!(neighbor, 5);
            assert_eq!(kind, NormalKind::SurfaceNormal);
        }
        other => panic!("expected a degenerate normal error, got {other:?}"),
    }
}

#[test]
fn test_non_unit_axis_fails() {
    let cloud = disk(3, 0.05, 0.0);
    let positions = cloud.positions();
    let axis = Vector3f::new(2.0, 0.0, 0.0);

    let result = SpinImageEstimation::new(&positions, SpinImageConfig::new(4, 0.5))
        .with_rotation_axis(axis)
        .compute();
    assert!(matches!(
        result,
        Err(Error::DegenerateNormal { kind: NormalKind::RotationAxis, .. })
    ));
}

#[test]
fn test_brute_force_and_rtree_agree() {
    let cloud = saddle_patch(6, 0.05);
    let positions = cloud.positions();
    let normals = cloud.normals();
    let estimator = SpinImageEstimation::new(&positions, SpinImageConfig::new(4, 0.2).with_angular(true))
        .with_input_normals(&normals);

    let brute = BruteForceSearch::new(positions.as_slice());
    let rtree = RTreeSearch::new(positions.as_slice());
    let a = estimator.compute_with_search(&brute).unwrap();
    let b = estimator.compute_with_search(&rtree).unwrap();
    for (x, y) in a.images.iter().zip(&b.images) {
        for (u, v) in x.values.iter().zip(&y.values) {
            assert_abs_diff_eq!(*u, *v, epsilon = 1e-6);
        }
    }
}

#[test]
fn test_output_follows_query_order() {
    let cloud = disk(2, 0.05, 0.0);
    let positions = cloud.positions();
    let normals = cloud.normals();
    let images = SpinImageEstimation::new(&positions, SpinImageConfig::new(2, 0.2))
        .with_input_normals(&normals)
        .with_indices(vec![3, 0])
        .compute()
        .unwrap();

    assert_eq!(images.indices, vec![3, 0]);
    let matrix = images.to_matrix();
    assert_eq!(matrix.dim(), (2, 15));
    assert_abs_diff_eq!(matrix.row(1).sum(), 1.0, epsilon = 1e-5);
}

#[test]
fn test_output_json_round_trip() {
    let cloud = disk(2, 0.05, 0.0);
    let positions = cloud.positions();
    let normals = cloud.normals();
    let config = SpinImageConfig::new(2, 0.2).with_radial(true);
    let images = SpinImageEstimation::new(&positions, config.clone())
        .with_input_normals(&normals)
        .with_indices(vec![3, 0])
        .compute()
        .unwrap();

    let json = serde_json::to_string(&images).unwrap();
    let restored: SpinImageSet = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.indices, images.indices);
    assert_eq!(restored.images, images.images);
    assert!(restored.failures.is_empty());

    let json = serde_json::to_string(&config).unwrap();
    let restored: SpinImageConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, config);
}
