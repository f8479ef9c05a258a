//! Pixel runs
//!
//! A [`Run`] is a contiguous span of foreground pixels along one scan
//! line. It only carries its extent along the line and its mean gray
//! level; the line index (position) is implied by whichever table or
//! section holds it.

use crate::error::{Error, Result};

use std::fmt;

/// A contiguous span of foreground pixels on one scan line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Run {
    start: i32,
    length: i32,
    level: u8,
}

impl Run {
    /// Create a new run
    ///
    /// # Arguments
    ///
    /// * `start` - First coordinate of the run
    /// * `length` - Number of pixels, at least 1
    /// * `level` - Mean gray level, 0 being black
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRun`] if `length < 1`.
    pub fn new(start: i32, length: i32, level: u8) -> Result<Self> {
        if length < 1 {
            return Err(Error::InvalidRun { start, length });
        }
        Ok(Self {
            start,
            length,
            level,
        })
    }

    /// Create a run without validation
    ///
    /// The caller guarantees `length >= 1`.
    #[inline]
    pub const fn new_unchecked(start: i32, length: i32, level: u8) -> Self {
        Self {
            start,
            length,
            level,
        }
    }

    /// First coordinate
    #[inline]
    pub fn start(&self) -> i32 {
        self.start
    }

    /// Last coordinate (inclusive)
    #[inline]
    pub fn stop(&self) -> i32 {
        self.start + self.length - 1
    }

    /// Number of pixels
    #[inline]
    pub fn length(&self) -> i32 {
        self.length
    }

    /// Mean gray level
    #[inline]
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Check that the run covers at least one pixel
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.length >= 1
    }

    /// Check whether the coordinate spans of two runs share a pixel
    #[inline]
    pub fn overlaps(&self, other: &Run) -> bool {
        self.stop() >= other.start && self.start <= other.stop()
    }

    /// Number of coordinates shared with another run, zero when disjoint
    pub fn common_length(&self, other: &Run) -> i32 {
        let start = self.start.max(other.start);
        let stop = self.stop().min(other.stop());
        (stop - start + 1).max(0)
    }

    /// Shift the run along its line
    #[inline]
    pub fn translate(&mut self, dc: i32) {
        self.start += dc;
    }

    /// Copy of this run shifted along its line
    #[inline]
    pub fn translated(&self, dc: i32) -> Run {
        Run {
            start: self.start + dc,
            ..*self
        }
    }
}

impl fmt::Display for Run {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Run{{{}/{} lv={}}}",
            self.start, self.length, self.level
        )
    }
}
