//! Closed polygon contours
//!
//! Vertices lie on pixel corners: a pixel (x, y) covers the unit square
//! `[x, x + 1) x [y, y + 1)`. The closing edge from the last vertex back
//! to the first one is implicit.

use crate::geom::{Point, Rect};

/// A closed polygon
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Polygon {
    vertices: Vec<Point>,
}

impl Polygon {
    /// Create a polygon from its vertices
    pub fn new(vertices: Vec<Point>) -> Self {
        Self { vertices }
    }

    /// Get the number of vertices
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Check if the polygon has no vertex
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Get the vertices
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Iterate over the edges, closing edge included
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Bounding rectangle of the vertices
    ///
    /// Returns an empty rectangle for an empty polygon.
    pub fn bounds(&self) -> Rect {
        let Some(first) = self.vertices.first() else {
            return Rect::default();
        };
        let (mut x_min, mut y_min) = (first.x, first.y);
        let (mut x_max, mut y_max) = (first.x, first.y);
        for p in &self.vertices[1..] {
            x_min = x_min.min(p.x);
            y_min = y_min.min(p.y);
            x_max = x_max.max(p.x);
            y_max = y_max.max(p.y);
        }
        Rect::new_unchecked(x_min, y_min, x_max - x_min, y_max - y_min)
    }

    /// Even-odd insideness test of an arbitrary point
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let mut inside = false;
        for (a, b) in self.edges() {
            let (ax, ay) = (a.x as f64, a.y as f64);
            let (bx, by) = (b.x as f64, b.y as f64);
            if (ay > y) != (by > y) {
                let cross_x = ax + (y - ay) * (bx - ax) / (by - ay);
                if x < cross_x {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Check whether the pixel (x, y) lies inside, using its centre
    pub fn contains_pixel(&self, x: i32, y: i32) -> bool {
        self.contains(x as f64 + 0.5, y as f64 + 0.5)
    }

    /// Enclosed area (shoelace formula)
    pub fn area(&self) -> i64 {
        let twice: i64 = self
            .edges()
            .map(|(a, b)| a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64)
            .sum();
        twice.abs() / 2
    }

    /// Translate every vertex by (dx, dy)
    pub fn translate(&mut self, dx: i32, dy: i32) {
        for p in &mut self.vertices {
            *p = p.translate(dx, dy);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l_shape() -> Polygon {
        // Two rows: 0..4 on row 0, 0..2 on row 1
        Polygon::new(vec![
            Point::new(0, 0),
            Point::new(0, 2),
            Point::new(2, 2),
            Point::new(2, 1),
            Point::new(4, 1),
            Point::new(4, 0),
        ])
    }

    #[test]
    fn test_bounds_and_area() {
        let poly = l_shape();
        assert_eq!(poly.bounds(), Rect::new_unchecked(0, 0, 4, 2));
        assert_eq!(poly.area(), 6);
    }

    #[test]
    fn test_contains_pixel() {
        let poly = l_shape();
        assert!(poly.contains_pixel(3, 0));
        assert!(poly.contains_pixel(1, 1));
        assert!(!poly.contains_pixel(3, 1));
        assert!(!poly.contains_pixel(4, 0));
    }

    #[test]
    fn test_empty_polygon() {
        let poly = Polygon::default();
        assert!(poly.is_empty());
        assert_eq!(poly.area(), 0);
        assert!(!poly.contains(0.5, 0.5));
    }
}
