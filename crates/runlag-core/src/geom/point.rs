//! Integer and sub-pixel points

use std::fmt;

/// A point with integer coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Point {
    /// X coordinate
    pub x: i32,
    /// Y coordinate
    pub y: i32,
}

impl Point {
    /// Create a new point
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Translate the point by (dx, dy)
    #[inline]
    pub fn translate(&self, dx: i32, dy: i32) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// A point with floating-point coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointF {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl PointF {
    /// Create a new point
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Round to the nearest integer point
    pub fn round(&self) -> Point {
        Point::new(self.x.round() as i32, self.y.round() as i32)
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &PointF) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<Point> for PointF {
    fn from(p: Point) -> Self {
        PointF::new(p.x as f64, p.y as f64)
    }
}

impl fmt::Display for PointF {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2},{:.2})", self.x, self.y)
    }
}
