//! runlag-run - Run tables and run-length scanning
//!
//! This crate provides:
//!
//! - **Run tables** - Per-line storage of foreground runs, with insertion,
//!   removal, purge and trimming
//! - **Run-length scanning** - Conversion of a gray pixel source into a
//!   run table, with lines scanned in parallel
//!
//! # Examples
//!
//! ```
//! use runlag_core::{BLACK, GrayImage, Orientation, Rect};
//! use runlag_run::{RunTableFactory, ScanOptions};
//!
//! let mut img = GrayImage::new(20, 10).unwrap();
//! img.fill_rect(&Rect::new_unchecked(2, 3, 10, 4), BLACK);
//!
//! let factory = RunTableFactory::new(Orientation::Horizontal, ScanOptions::default());
//! let table = factory.create_table(&img).unwrap();
//! assert_eq!(table.total_run_count(), 4);
//! assert_eq!(table.weight(), 40);
//! ```

pub mod error;
pub mod factory;
pub mod table;

pub use error::{RunError, RunResult};
pub use factory::{RunTableFactory, ScanOptions};
pub use table::RunTable;
