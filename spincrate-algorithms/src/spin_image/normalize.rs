//! Turning raw bin sums into the final descriptor

use super::histogram::SpinHistogram;
use ndarray::Array2;

/// Finish a spin image
///
/// Angular mode divides the angle sums by the weight sums, giving the mean
/// angle between normals per cell (empty cells come out as ~0). Density
/// mode divides by the total weight once more than one neighbor contributed;
/// a single contribution already sums to one and an empty grid stays zero.
pub fn normalize(histogram: SpinHistogram) -> Array2<f64> {
    let SpinHistogram {
        counts,
        angles,
        contributors,
        ..
    } = histogram;

    match angles {
        Some(angles) => angles / (counts + f64::EPSILON),
        None if contributors > 1 => {
            let total = counts.sum();
            if total > 0.0 {
                counts / total
            } else {
                counts
            }
        }
        None => counts,
    }
}
