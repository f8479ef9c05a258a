//! Error types for runlag-run

use runlag_core::Orientation;
use thiserror::Error;

/// Errors that can occur while building or editing run tables
#[derive(Debug, Error)]
pub enum RunError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] runlag_core::Error),

    /// Two tables of different orientations were combined
    #[error("orientation mismatch: expected {expected}, got {actual}")]
    OrientationMismatch {
        expected: Orientation,
        actual: Orientation,
    },

    /// Two tables of different dimensions were combined
    #[error("dimension mismatch: expected {expected_width}x{expected_height}, got {width}x{height}")]
    DimensionMismatch {
        expected_width: i32,
        expected_height: i32,
        width: i32,
        height: i32,
    },

    /// The run to remove is not in the sequence
    #[error("run {start}/{length} not found in sequence {index}")]
    RunNotFound {
        index: usize,
        start: i32,
        length: i32,
    },

    /// Runs of a sequence are unsorted, overlapping or out of the table
    #[error("invalid sequence {index}: {reason}")]
    RunOverlap { index: usize, reason: String },

    /// Empty region of interest
    #[error("empty region: nothing to scan")]
    EmptyRegion,
}

/// Result type for run operations
pub type RunResult<T> = Result<T, RunError>;
