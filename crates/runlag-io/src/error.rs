//! I/O error types
//!
//! Provides a unified error type for image reading and writing, so that
//! callers only need to handle one error type.

use thiserror::Error;

/// Error type for image I/O operations
#[derive(Error, Debug)]
pub enum IoError {
    /// Standard I/O error (file not found, permission denied, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The image format is not supported
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The image data is structurally invalid
    #[error("decode error: {0}")]
    DecodeError(String),

    /// An error from the core library
    #[error("core error: {0}")]
    Core(#[from] runlag_core::Error),
}

/// Convenience alias for I/O results
pub type IoResult<T> = Result<T, IoError>;
