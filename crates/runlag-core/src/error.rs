//! Error types for runlag-core
//!
//! Provides a unified error type for the primitive values of the engine
//! (runs, rectangles, gray images). Each variant captures enough context
//! for diagnostics without exposing internal implementation details.

use thiserror::Error;

/// runlag-core error type
#[derive(Error, Debug)]
pub enum Error {
    /// A run with a non-positive length
    #[error("invalid run: start {start}, length {length}")]
    InvalidRun { start: i32, length: i32 },

    /// Invalid image or table dimensions
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimension { width: i32, height: i32 },

    /// Index out of bounds
    #[error("index out of bounds: {index} >= {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Invalid parameter value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Malformed textual or binary data
    #[error("decode error: {0}")]
    DecodeError(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for runlag-core operations
pub type Result<T> = std::result::Result<T, Error>;
