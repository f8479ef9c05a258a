//! runlag - Run-length section graphs for optical music recognition
//!
//! A binarized page is decomposed into maximal runs of foreground pixels,
//! either horizontally or vertically. Runs on consecutive lines are
//! aggregated into sections, and sections are linked into a directed
//! graph (a "lag") whenever their runs touch across lines.
//!
//! # Overview
//!
//! - Geometry, orientation, histograms and the gray image ([`runlag_core`])
//! - PBM/PGM image I/O ([`io`])
//! - Run tables and run scanning ([`run`])
//! - Sections, lags, junction policies and projections ([`lag`])
//!
//! # Example
//!
//! ```
//! use runlag::io::decode_pnm;
//! use runlag::lag::{AllPolicy, Lag, SectionFactory};
//! use runlag::run::ScanOptions;
//! use runlag::Orientation;
//!
//! let img = decode_pnm(b"P1\n5 3\n11111\n00100\n00100\n").unwrap();
//! let mut lag = Lag::new("hLag", Orientation::Horizontal);
//! SectionFactory::new(AllPolicy)
//!     .create_sections_from_source(&mut lag, &img, img.bounds(), &ScanOptions::default())
//!     .unwrap();
//!
//! assert_eq!(lag.len(), 1);
//! assert_eq!(lag.sections().next().unwrap().weight(), 7);
//! ```

// Re-export core types (primary data structures used everywhere)
pub use runlag_core::*;

// Re-export domain crates as modules to avoid name conflicts
pub use runlag_io as io;
pub use runlag_lag as lag;
pub use runlag_run as run;
