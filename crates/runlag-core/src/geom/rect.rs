//! Rectangle regions
//!
//! Axis-aligned rectangles in pixel units. The left/top edges are
//! inclusive and the right/bottom edges exclusive, so a rectangle of
//! width `w` covers pixel columns `x..x + w`.

use crate::error::{Error, Result};
use crate::geom::Point;

use std::fmt;

/// A rectangle region
///
/// A simple Copy type since it's small and frequently copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Left x coordinate
    pub x: i32,
    /// Top y coordinate
    pub y: i32,
    /// Width
    pub w: i32,
    /// Height
    pub h: i32,
}

impl Rect {
    /// Create a new rectangle
    ///
    /// # Errors
    ///
    /// Returns an error if width or height is negative.
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Result<Self> {
        if w < 0 || h < 0 {
            return Err(Error::InvalidParameter(format!(
                "rectangle dimensions must be non-negative: w={}, h={}",
                w, h
            )));
        }
        Ok(Self { x, y, w, h })
    }

    /// Create a rectangle without validation
    pub const fn new_unchecked(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Create the smallest rectangle containing two pixel positions
    /// (both inclusive)
    pub fn from_pixels(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        let (x_min, x_max) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let (y_min, y_max) = if y1 <= y2 { (y1, y2) } else { (y2, y1) };
        Self {
            x: x_min,
            y: y_min,
            w: x_max - x_min + 1,
            h: y_max - y_min + 1,
        }
    }

    /// Get the top-left corner
    #[inline]
    pub fn location(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Get the right x coordinate (exclusive)
    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    /// Get the bottom y coordinate (exclusive)
    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// Get the center point (rounded towards the top-left)
    #[inline]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2, self.y + self.h / 2)
    }

    /// Get the area
    #[inline]
    pub fn area(&self) -> i64 {
        self.w as i64 * self.h as i64
    }

    /// Check if the rectangle is empty (zero area)
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Check if a pixel is inside the rectangle
    #[inline]
    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Check if this rectangle contains another one
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Check if this rectangle shares at least one pixel with another
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Check if this rectangle overlaps or is 8-adjacent to another
    pub fn touches(&self, other: &Rect) -> bool {
        self.expand(1).overlaps(other)
    }

    /// Compute the intersection of two rectangles
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if x < right && y < bottom {
            Some(Rect {
                x,
                y,
                w: right - x,
                h: bottom - y,
            })
        } else {
            None
        }
    }

    /// Compute the union (bounding rectangle) of two rectangles
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());

        Rect {
            x,
            y,
            w: right - x,
            h: bottom - y,
        }
    }

    /// Translate the rectangle by (dx, dy)
    pub fn translate(&self, dx: i32, dy: i32) -> Rect {
        Rect {
            x: self.x + dx,
            y: self.y + dy,
            w: self.w,
            h: self.h,
        }
    }

    /// Expand the rectangle by a margin on all sides
    pub fn expand(&self, margin: i32) -> Rect {
        Rect {
            x: self.x - margin,
            y: self.y - margin,
            w: self.w + 2 * margin,
            h: self.h + 2 * margin,
        }
    }

    /// Clip the rectangle to fit within `0..width` x `0..height`
    pub fn clip(&self, width: i32, height: i32) -> Option<Rect> {
        self.intersect(&Rect::new_unchecked(0, 0, width, height))
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[x={},y={},w={},h={}]", self.x, self.y, self.w, self.h)
    }
}
