//! runlag-lag - Section graphs built from pixel runs
//!
//! This crate provides:
//!
//! - **Sections** - Sequences of runs on consecutive lines, with derived
//!   geometry (bounds, contour polygon, centroid, fitted line)
//! - **Lags** - Directed graphs of sections of one orientation, linked by
//!   junctions, with lookup and purge
//! - **Section building** - The line-by-line sweep turning a run table
//!   into a lag, under a pluggable [`JunctionPolicy`]
//! - **Projections** - Histograms of pixel weight over a region of
//!   interest, from runs, sections or glyphs
//! - **Persistence** - Text serialization of sections
//!
//! # Examples
//!
//! ```
//! use runlag_core::{BLACK, GrayImage, Orientation, Rect};
//! use runlag_lag::{AllPolicy, Lag, SectionFactory};
//! use runlag_run::ScanOptions;
//!
//! // A "T": a bar on top of a stem
//! let mut img = GrayImage::new(9, 9).unwrap();
//! img.fill_rect(&Rect::new_unchecked(1, 1, 7, 2), BLACK);
//! img.fill_rect(&Rect::new_unchecked(4, 3, 1, 5), BLACK);
//!
//! let mut lag = Lag::new("hLag", Orientation::Horizontal);
//! let factory = SectionFactory::new(AllPolicy);
//! factory
//!     .create_sections_from_source(&mut lag, &img, img.bounds(), &ScanOptions::default())
//!     .unwrap();
//!
//! assert_eq!(lag.len(), 1);
//! let section = lag.sections().next().unwrap();
//! assert_eq!(section.weight(), 19);
//! assert_eq!(section.bounds(), Rect::new_unchecked(1, 1, 7, 7));
//! ```

pub mod error;
pub mod factory;
pub mod glyph;
pub mod lag;
pub mod policy;
pub mod roi;
pub mod section;
pub mod sections;
pub mod serial;

pub use error::{LagError, LagResult};
pub use factory::SectionFactory;
pub use glyph::Glyph;
pub use lag::Lag;
pub use policy::{AllPolicy, DeltaPolicy, JunctionPolicy, RatioPolicy, ShiftPolicy};
pub use roi::Roi;
pub use section::{Section, SectionId};
pub use serial::{read_sections, read_sections_from_reader, write_sections};
