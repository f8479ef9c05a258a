//! Geometric primitives
//!
//! Integer points and rectangles in the absolute (x, y) pixel frame, plus
//! the accumulators used to derive section geometry:
//!
//! - [`Point`] / [`PointF`] - integer and sub-pixel points
//! - [`Rect`] - axis-aligned rectangle with exclusive right/bottom edges
//! - [`Polygon`] - closed rectilinear contour
//! - [`Line`] - least-squares line accumulator
//! - [`Barycenter`] / [`PointsCollector`] - pixel accumulators

mod barycenter;
mod line;
mod point;
mod polygon;
mod rect;

pub use barycenter::{Barycenter, PointsCollector};
pub use line::Line;
pub use point::{Point, PointF};
pub use polygon::Polygon;
pub use rect::Rect;
