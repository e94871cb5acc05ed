use crate::types::PointId;
use thiserror::Error;

/// Errors raised when validating a [`crate::point::PointSet`] before
/// optimization starts.
///
/// All of these are fatal for the run: the caller has to fix the input
/// data. Degenerate per-step conditions (coincident points, all-equal
/// losses) are recovered inside the loop instead and never surface as
/// errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidateError {
    /// The set contains no points at all.
    #[error("no points to optimize")]
    EmptyCollection,

    /// A point's position does not have the same number of dimensions
    /// as the first point's.
    #[error("point {index} has {found} position dimensions, expected {expected}")]
    DimensionMismatch {
        index: PointId,
        expected: usize,
        found: usize,
    },

    /// A point's target-distance vector does not have one entry per
    /// point in the set.
    #[error("point {index} has {found} target distances, expected {expected}")]
    TargetDistanceLengthMismatch {
        index: PointId,
        expected: usize,
        found: usize,
    },
}
