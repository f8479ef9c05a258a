//! runlag-io - Image I/O for runlag
//!
//! Reads and writes 8-bit gray images in the PNM family (PBM and PGM, both
//! ASCII and binary). These are used for test fixtures and for dumping
//! rendered run tables and sections.

pub mod error;
pub mod pnm;

pub use error::{IoError, IoResult};
pub use pnm::{PnmFormat, decode_pnm, encode_pnm, read_pnm, write_pnm};

use runlag_core::GrayImage;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Read an image from a file path
///
/// The variant is detected from the file's magic number.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or decoded.
pub fn read_image<P: AsRef<Path>>(path: P) -> IoResult<GrayImage> {
    let file = File::open(path)?;
    read_pnm(BufReader::new(file))
}

/// Write an image to a file path
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_image<P: AsRef<Path>>(image: &GrayImage, path: P, format: PnmFormat) -> IoResult<()> {
    let file = File::create(path)?;
    write_pnm(image, format, BufWriter::new(file))
}
