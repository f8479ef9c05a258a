//! Error types for runlag-lag

use runlag_core::Orientation;
use thiserror::Error;

use crate::section::SectionId;

/// Errors that can occur while building or editing section graphs
#[derive(Debug, Error)]
pub enum LagError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] runlag_core::Error),

    /// Run table error
    #[error("run error: {0}")]
    Run(#[from] runlag_run::RunError),

    /// A section or table does not share the orientation of the lag
    #[error("orientation mismatch: expected {expected}, got {actual}")]
    OrientationMismatch {
        expected: Orientation,
        actual: Orientation,
    },

    /// No section with this id in the lag
    #[error("unknown section {0}")]
    UnknownSection(SectionId),

    /// A junction must link a section to a later one
    #[error("invalid junction from {source_id} to {target_id}: {reason}")]
    InvalidJunction {
        source_id: SectionId,
        target_id: SectionId,
        reason: String,
    },

    /// A section without any run
    #[error("section has no run")]
    EmptySection,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for lag operations
pub type LagResult<T> = Result<T, LagError>;
