//! Error taxonomy for the gridding engine.
//!
//! Only conditions that stop the solver before a grid can be produced are
//! errors. Slow convergence, discarded duplicates, mutually prime dimensions
//! and planar input are reported through `log` and the [`SolveReport`]
//! instead.
//!
//! [`SolveReport`]: crate::diagnostics::SolveReport

use thiserror::Error;

/// Which of the two optional limit surfaces an error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundSide {
    Lower,
    Upper,
}

impl std::fmt::Display for BoundSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoundSide::Lower => f.write_str("lower"),
            BoundSide::Upper => f.write_str("upper"),
        }
    }
}

/// Fatal conditions reported by [`SurfaceSolver`](crate::SurfaceSolver).
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// The node lattice needs at least 4 nodes along each axis.
    #[error("grid must have at least 4 nodes in each direction (got {n_columns} by {n_rows})")]
    GridTooSmall { n_columns: usize, n_rows: usize },

    /// Nothing usable remained after filtering the input against the region.
    #[error("no data points inside the region")]
    NoData,

    /// A bound grid does not match the output grid dimensions.
    #[error("{side} limit grid has {found} values, expected {expected}")]
    BoundGridShape {
        side: BoundSide,
        expected: usize,
        found: usize,
    },

    /// A solver parameter is outside its admissible range.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// Region or increments do not describe a usable lattice.
    #[error("invalid region: {0}")]
    InvalidRegion(String),
}

impl SurfaceError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        SurfaceError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

pub type SurfaceResult<T> = Result<T, SurfaceError>;
