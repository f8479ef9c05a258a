//! Runlag Core - Primitive values of the section-graph engine
//!
//! This crate provides the leaf types shared by the rest of the runlag
//! workspace:
//!
//! - [`Run`] - A span of foreground pixels on one scan line
//! - [`Orientation`] - Mapping between oriented and absolute frames
//! - [`Point`] / [`PointF`] / [`Rect`] / [`Polygon`] - Geometry
//! - [`Line`] - Least-squares line fitting
//! - [`Barycenter`] / [`PointsCollector`] - Pixel accumulators
//! - [`Histogram`] - Sparse integer histograms
//! - [`PixelSource`] / [`GrayImage`] - 8-bit gray pixel access

pub mod error;
pub mod geom;
pub mod histogram;
pub mod image;
pub mod orientation;
pub mod run;

pub use error::{Error, Result};
pub use geom::{Barycenter, Line, Point, PointF, PointsCollector, Polygon, Rect};
pub use histogram::{Histogram, Maximum, Peak};
pub use image::{BLACK, GrayImage, PixelSource, WHITE};
pub use orientation::Orientation;
pub use run::Run;
