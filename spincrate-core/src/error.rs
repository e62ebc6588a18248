//! Error types for spincrate

use thiserror::Error;

/// Which unit-length check a vector failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalKind {
    /// Surface normal of the query point or one of its neighbors
    SurfaceNormal,
    /// Rotation axis of the query point
    RotationAxis,
}

impl std::fmt::Display for NormalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NormalKind::SurfaceNormal => write!(f, "surface normal"),
            NormalKind::RotationAxis => write!(f, "rotation axis"),
        }
    }
}

/// Main error type for spincrate operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(
        "Too few neighbors for point {index}: found {found}, need at least {required} \
         (lower the minimum neighbor count or use a larger search radius)"
    )]
    InsufficientNeighbors {
        index: usize,
        found: usize,
        required: usize,
    },

    #[error("{kind} is not normalized for point {index} (neighbor {neighbor}): dot product is {dot}")]
    DegenerateNormal {
        index: usize,
        neighbor: usize,
        dot: f64,
        kind: NormalKind,
    },
}

impl Error {
    /// Index of the query point the error refers to, if any
    pub fn point_index(&self) -> Option<usize> {
        match self {
            Error::InsufficientNeighbors { index, .. } | Error::DegenerateNormal { index, .. } => {
                Some(*index)
            }
            _ => None,
        }
    }
}

/// Result type alias for spincrate operations
pub type Result<T> = std::result::Result<T, Error>;
