//! Least-squares line fitting
//!
//! [`Line`] accumulates the first and second moments of a point cloud
//! incrementally, so that a section can feed its pixels one by one and
//! query the best-fit line `y = slope * x + intercept` afterwards.

use crate::geom::PointF;

/// Incremental least-squares line
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Line {
    n: f64,
    sx: f64,
    sy: f64,
    sxx: f64,
    sxy: f64,
    syy: f64,
}

impl Line {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one point
    pub fn include_point(&mut self, x: f64, y: f64) {
        self.n += 1.0;
        self.sx += x;
        self.sy += y;
        self.sxx += x * x;
        self.sxy += x * y;
        self.syy += y * y;
    }

    /// Merge the points of another accumulator
    pub fn include_line(&mut self, other: &Line) {
        self.n += other.n;
        self.sx += other.sx;
        self.sy += other.sy;
        self.sxx += other.sxx;
        self.sxy += other.sxy;
        self.syy += other.syy;
    }

    /// Number of points included so far
    pub fn number_of_points(&self) -> usize {
        self.n as usize
    }

    /// Mean point, or `None` when empty
    pub fn mean(&self) -> Option<PointF> {
        if self.n == 0.0 {
            return None;
        }
        Some(PointF::new(self.sx / self.n, self.sy / self.n))
    }

    /// Slope dy/dx
    ///
    /// Returns `None` with fewer than 2 points or when all x are equal.
    pub fn slope(&self) -> Option<f64> {
        let factor = self.n * self.sxx - self.sx * self.sx;
        if self.n < 2.0 || factor == 0.0 {
            return None;
        }
        Some((self.n * self.sxy - self.sx * self.sy) / factor)
    }

    /// Intercept at x = 0
    pub fn intercept(&self) -> Option<f64> {
        let factor = self.n * self.sxx - self.sx * self.sx;
        if self.n < 2.0 || factor == 0.0 {
            return None;
        }
        Some((self.sxx * self.sy - self.sx * self.sxy) / factor)
    }

    /// Fitted y for a given x
    pub fn y_at(&self, x: f64) -> Option<f64> {
        Some(self.slope()? * x + self.intercept()?)
    }

    /// Fitted x for a given y, using the regression of x on y
    pub fn x_at(&self, y: f64) -> Option<f64> {
        self.swapped().y_at(y)
    }

    /// Same point cloud with x and y exchanged
    pub fn swapped(&self) -> Line {
        Line {
            n: self.n,
            sx: self.sy,
            sy: self.sx,
            sxx: self.syy,
            sxy: self.sxy,
            syy: self.sxx,
        }
    }

    /// Root mean square distance of the points to the fitted line,
    /// measured along y
    pub fn mean_distance(&self) -> Option<f64> {
        let a = self.slope()?;
        let b = self.intercept()?;
        // sum((y - a x - b)^2) expanded on the accumulated moments
        let sum = self.syy - 2.0 * a * self.sxy - 2.0 * b * self.sy
            + a * a * self.sxx
            + 2.0 * a * b * self.sx
            + b * b * self.n;
        Some((sum.max(0.0) / self.n).sqrt())
    }
}
