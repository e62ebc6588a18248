//! Neighbor selection by normal alignment

use super::config::SpinImageConfig;
use spincrate_core::{Error, NormalKind, Result, Vector3f};

/// Slack allowed on |dot| of two unit vectors before they are considered
/// not normalized
pub const UNIT_TOLERANCE: f64 = 10.0 * f32::EPSILON as f64;

/// Outcome of checking one neighbor against the query normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Alignment {
    /// Filtering is off; the neighbor is used and its normal is never read
    Unchecked,
    /// The neighbor is used; holds |cos| of the angle between the normals
    Aligned(f64),
    /// The normals are too far apart
    Rejected,
}

impl Alignment {
    /// Angle between the (undirected) normals in `[0, pi/2]`, if known
    pub fn angle(&self) -> Option<f64> {
        match self {
            Alignment::Aligned(cos) => Some(cos.acos()),
            _ => None,
        }
    }
}

/// Support-angle filter applied to every neighbor of a query point
#[derive(Debug, Clone, Copy)]
pub struct NormalFilter {
    support_angle_cos: f64,
    active: bool,
}

impl NormalFilter {
    pub fn new(support_angle_cos: f64, angular: bool) -> Self {
        Self {
            support_angle_cos,
            active: support_angle_cos > 0.0 || angular,
        }
    }

    pub fn from_config(config: &SpinImageConfig) -> Self {
        Self::new(config.support_angle_cos, config.angular)
    }

    /// Whether normals are read at all
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Check the neighbor's normal against the query normal
    ///
    /// Normals are only read when the filter is active; a missing one is an
    /// error then. Counter-directed normals count as aligned, so surfaces
    /// with inconsistently oriented normals still produce usable images.
    pub fn check(
        &self,
        index: usize,
        neighbor: usize,
        query_normal: Option<&Vector3f>,
        neighbor_normal: Option<&Vector3f>,
    ) -> Result<Alignment> {
        if !self.active {
            return Ok(Alignment::Unchecked);
        }
        let (Some(query_normal), Some(neighbor_normal)) = (query_normal, neighbor_normal) else {
            return Err(Error::InvalidData(format!(
                "missing normal for point {} or neighbor {}",
                index, neighbor
            )));
        };

        let cos = query_normal.dot(neighbor_normal) as f64;
        if cos.abs() > 1.0 + UNIT_TOLERANCE || cos.is_nan() {
            return Err(Error::DegenerateNormal {
                index,
                neighbor,
                dot: cos,
                kind: NormalKind::SurfaceNormal,
            });
        }
        let cos = cos.clamp(-1.0, 1.0);

        if cos.abs() < self.support_angle_cos {
            return Ok(Alignment::Rejected);
        }

        Ok(Alignment::Aligned(cos.abs()))
    }
}
