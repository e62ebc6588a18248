//! Spin image example for spincrate
//!
//! Samples a noisy cylinder, computes spin images for a subset of its
//! points and prints a summary, plus the image of the first query point.
//!
//! Run with `RUST_LOG=debug` to see the estimator's own logging.

use anyhow::Context;
use clap::Parser;
use rand::prelude::*;
use spincrate_algorithms::{FailurePolicy, SpinImageConfig, SpinImageEstimation};
use spincrate_core::{Point3f, PointCloud, Vector3f};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Compute spin images on a synthetic cylinder")]
struct Args {
    /// Number of points sampled on the cylinder
    #[arg(long, default_value_t = 5000)]
    points: usize,

    /// Image width (bins along the radial direction)
    #[arg(long, default_value_t = 8)]
    width: usize,

    /// Neighbor search radius
    #[arg(long, default_value_t = 0.3)]
    radius: f32,

    /// Support angle cosine in [0, 1]
    #[arg(long, default_value_t = 0.0)]
    support_angle: f64,

    /// Minimum number of neighbors per query point
    #[arg(long, default_value_t = 10)]
    min_neighbors: usize,

    /// Use the radial (spherical) image structure
    #[arg(long)]
    radial: bool,

    /// Store mean angles between normals instead of densities
    #[arg(long)]
    angular: bool,

    /// Skip points that fail instead of aborting
    #[arg(long)]
    skip_failures: bool,

    /// Compute an image for every n-th point
    #[arg(long, default_value_t = 50)]
    stride: usize,

    /// Random seed
    #[arg(long, default_value_t = 7)]
    seed: u64,
}

/// Unit-radius cylinder of height 2 around the z axis, with radial noise
fn noisy_cylinder(n: usize, seed: u64) -> (PointCloud<Point3f>, PointCloud<Vector3f>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut points = PointCloud::with_capacity(n);
    let mut normals = PointCloud::with_capacity(n);
    for _ in 0..n {
        let theta: f32 = rng.gen_range(0.0..std::f32::consts::TAU);
        let z: f32 = rng.gen_range(-1.0..1.0);
        let r = 1.0 + rng.gen_range(-0.005..0.005);
        points.push(Point3f::new(r * theta.cos(), r * theta.sin(), z));
        normals.push(Vector3f::new(theta.cos(), theta.sin(), 0.0));
    }
    (points, normals)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let (cloud, normals) = noisy_cylinder(args.points, args.seed);
    println!("Sampled cylinder with {} points", cloud.len());

    let policy = if args.skip_failures {
        FailurePolicy::SkipPoint
    } else {
        FailurePolicy::AbortBatch
    };
    let config = SpinImageConfig::new(args.width, args.radius)
        .with_support_angle_cos(args.support_angle)
        .with_min_neighbors(args.min_neighbors)
        .with_radial(args.radial)
        .with_angular(args.angular)
        .with_failure_policy(policy);

    let indices: Vec<usize> = (0..cloud.len()).step_by(args.stride.max(1)).collect();
    let images = SpinImageEstimation::new(&cloud, config)
        .with_input_normals(&normals)
        .with_indices(indices)
        .compute()
        .context("spin image estimation failed")?;

    println!(
        "Computed {} spin images ({} failed)",
        images.len(),
        images.failures.len()
    );
    for failure in &images.failures {
        println!("  point {}: {}", failure.index, failure.error);
    }

    if let Some((index, image)) = images.iter().find(|(_, image)| image.is_valid()) {
        println!("\nSpin image of point {} ({} x {}):", index, image.rows(), image.cols());
        let grid = image.to_grid();
        for row in grid.rows() {
            let line: Vec<String> = row.iter().map(|v| format!("{:6.3}", v)).collect();
            println!("  {}", line.join(" "));
        }
    }

    Ok(())
}
