//! Pixel accumulators
//!
//! Sections and run tables push their foreground pixels into these
//! collectors, which then provide mass centres or explicit point lists.

use crate::geom::{Point, PointF, Rect};

/// Weighted mass-centre accumulator
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Barycenter {
    weight: f64,
    xx: f64,
    yy: f64,
}

impl Barycenter {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Include one point of unit weight
    #[inline]
    pub fn include(&mut self, x: f64, y: f64) {
        self.include_weighted(1.0, x, y);
    }

    /// Include one point with the given weight
    #[inline]
    pub fn include_weighted(&mut self, weight: f64, x: f64, y: f64) {
        self.weight += weight;
        self.xx += weight * x;
        self.yy += weight * y;
    }

    /// Total weight
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Mass centre, or `None` if nothing was included
    pub fn center(&self) -> Option<PointF> {
        if self.weight == 0.0 {
            return None;
        }
        Some(PointF::new(self.xx / self.weight, self.yy / self.weight))
    }
}

/// Collector of individual pixel positions, optionally clipped to a
/// region of interest
#[derive(Debug, Clone, Default)]
pub struct PointsCollector {
    roi: Option<Rect>,
    points: Vec<Point>,
}

impl PointsCollector {
    /// Create a collector, with an optional clipping rectangle
    pub fn new(roi: Option<Rect>) -> Self {
        Self {
            roi,
            points: Vec::new(),
        }
    }

    /// Create a collector with pre-allocated capacity
    pub fn with_capacity(roi: Option<Rect>, capacity: usize) -> Self {
        Self {
            roi,
            points: Vec::with_capacity(capacity),
        }
    }

    /// Clipping rectangle, if any
    pub fn roi(&self) -> Option<Rect> {
        self.roi
    }

    /// Add a pixel
    #[inline]
    pub fn include(&mut self, x: i32, y: i32) {
        self.points.push(Point::new(x, y));
    }

    /// Number of collected pixels
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if nothing was collected
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Collected pixels, in insertion order
    pub fn points(&self) -> &[Point] {
        &self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_barycenter_weighted() {
        let mut bary = Barycenter::new();
        bary.include_weighted(3.0, 0.0, 0.0);
        bary.include(4.0, 4.0);
        let c = bary.center().unwrap();
        assert_eq!(bary.weight(), 4.0);
        assert!((c.x - 1.0).abs() < 1e-9);
        assert!((c.y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_barycenter() {
        assert_eq!(Barycenter::new().center(), None);
    }
}
