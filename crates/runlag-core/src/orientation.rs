//! Horizontal / vertical frames
//!
//! All run geometry is expressed in an oriented `(coord, pos)` frame:
//! `coord` runs along the runs and `pos` indexes the scan lines. An
//! [`Orientation`] maps between this frame and absolute `(x, y)` pixel
//! space. Horizontal is the identity, vertical swaps the two axes, so
//! every transform here is its own inverse.

use crate::error::{Error, Result};
use crate::geom::{Line, Point, PointF, Rect};

use std::fmt;
use std::str::FromStr;

/// Orientation of runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Runs extend along x, lines are rows
    Horizontal,
    /// Runs extend along y, lines are columns
    Vertical,
}

impl Orientation {
    /// Both orientations, horizontal first
    pub const ALL: [Orientation; 2] = [Orientation::Horizontal, Orientation::Vertical];

    /// Get the other orientation
    #[inline]
    pub fn opposite(self) -> Orientation {
        match self {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        }
    }

    /// Check for the vertical orientation
    #[inline]
    pub fn is_vertical(self) -> bool {
        self == Orientation::Vertical
    }

    /// One-letter tag used in text serialization
    pub fn tag(self) -> &'static str {
        match self {
            Orientation::Horizontal => "H",
            Orientation::Vertical => "V",
        }
    }

    /// Parse a one-letter tag
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] for anything other than `H` or `V`.
    pub fn from_tag(tag: &str) -> Result<Orientation> {
        match tag.trim() {
            "H" | "h" => Ok(Orientation::Horizontal),
            "V" | "v" => Ok(Orientation::Vertical),
            other => Err(Error::InvalidParameter(format!(
                "unknown orientation tag: {:?}",
                other
            ))),
        }
    }

    /// Map an oriented `(coord, pos)` pair to absolute `(x, y)`, or back
    #[inline]
    pub fn absolute_xy(self, coord: i32, pos: i32) -> (i32, i32) {
        match self {
            Orientation::Horizontal => (coord, pos),
            Orientation::Vertical => (pos, coord),
        }
    }

    /// Transform a point between the oriented and absolute frames
    #[inline]
    pub fn point(self, p: Point) -> Point {
        let (x, y) = self.absolute_xy(p.x, p.y);
        Point::new(x, y)
    }

    /// Transform a sub-pixel point between the oriented and absolute frames
    #[inline]
    pub fn point_f(self, p: PointF) -> PointF {
        match self {
            Orientation::Horizontal => p,
            Orientation::Vertical => PointF::new(p.y, p.x),
        }
    }

    /// Transform a rectangle between the oriented and absolute frames
    ///
    /// The vertical transform swaps both the origin coordinates and the
    /// width/height.
    #[inline]
    pub fn rect(self, r: Rect) -> Rect {
        match self {
            Orientation::Horizontal => r,
            Orientation::Vertical => Rect::new_unchecked(r.y, r.x, r.h, r.w),
        }
    }

    /// Transform a fitted line between the oriented and absolute frames
    pub fn line(self, line: &Line) -> Line {
        match self {
            Orientation::Horizontal => *line,
            Orientation::Vertical => line.swapped(),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Horizontal => write!(f, "HORIZONTAL"),
            Orientation::Vertical => write!(f, "VERTICAL"),
        }
    }
}

impl FromStr for Orientation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "HORIZONTAL" => Ok(Orientation::Horizontal),
            "VERTICAL" => Ok(Orientation::Vertical),
            other => Orientation::from_tag(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_involutive_transforms() {
        let p = Point::new(3, -7);
        let r = Rect::new_unchecked(1, 2, 30, 4);
        for o in Orientation::ALL {
            assert_eq!(o.point(o.point(p)), p);
            assert_eq!(o.rect(o.rect(r)), r);
        }
        assert_eq!(Orientation::Vertical.point(p), Point::new(-7, 3));
        assert_eq!(
            Orientation::Vertical.rect(r),
            Rect::new_unchecked(2, 1, 4, 30)
        );
    }

    #[test]
    fn test_line_transform() {
        let mut line = Line::new();
        line.include_point(0.0, 1.0);
        line.include_point(2.0, 5.0);
        let v = Orientation::Vertical.line(&line);
        assert!((v.slope().unwrap() - 0.5).abs() < 1e-9);
        assert_eq!(Orientation::Horizontal.line(&line), line);
    }

    #[test]
    fn test_tags() {
        for o in Orientation::ALL {
            assert_eq!(Orientation::from_tag(o.tag()).unwrap(), o);
            assert_eq!(o.to_string().parse::<Orientation>().unwrap(), o);
            assert_eq!(o.opposite().opposite(), o);
        }
        assert!(Orientation::from_tag("X").is_err());
        assert!(Orientation::Vertical.is_vertical());
    }
}
