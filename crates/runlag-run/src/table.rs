//! Run tables
//!
//! A [`RunTable`] stores the foreground runs of a rectangular image area,
//! one ordered sequence per scan line. Horizontal tables have one sequence
//! per row, vertical tables one per column.
//!
//! Within a sequence, runs are sorted by start and always separated by at
//! least one background pixel: inserting a run that touches a neighbour
//! fuses the two.

use crate::error::{RunError, RunResult};
use runlag_core::{GrayImage, Orientation, Point, PointsCollector, Rect, Run};

use std::fmt;

/// Per-line storage of foreground runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunTable {
    orientation: Orientation,
    width: i32,
    height: i32,
    sequences: Vec<Vec<Run>>,
}

impl RunTable {
    /// Create an empty table
    ///
    /// # Arguments
    ///
    /// * `orientation` - Orientation of the runs
    /// * `width` - Width of the covered area in pixels
    /// * `height` - Height of the covered area in pixels
    ///
    /// # Errors
    ///
    /// Returns an error if a dimension is not positive.
    pub fn new(orientation: Orientation, width: i32, height: i32) -> RunResult<Self> {
        if width <= 0 || height <= 0 {
            return Err(runlag_core::Error::InvalidDimension { width, height }.into());
        }
        let size = match orientation {
            Orientation::Horizontal => height,
            Orientation::Vertical => width,
        } as usize;
        Ok(Self {
            orientation,
            width,
            height,
            sequences: vec![Vec::new(); size],
        })
    }

    /// Orientation of the runs
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Width of the covered area
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Height of the covered area
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Covered area, with origin at (0, 0)
    pub fn bounds(&self) -> Rect {
        Rect::new_unchecked(0, 0, self.width, self.height)
    }

    /// Number of sequences (scan lines)
    pub fn size(&self) -> usize {
        self.sequences.len()
    }

    /// Length of a scan line
    pub fn coord_extent(&self) -> i32 {
        match self.orientation {
            Orientation::Horizontal => self.width,
            Orientation::Vertical => self.height,
        }
    }

    /// Runs of one sequence, or `None` if `index` is out of range
    pub fn sequence(&self, index: usize) -> Option<&[Run]> {
        self.sequences.get(index).map(Vec::as_slice)
    }

    /// Iterate over all sequences in position order
    pub fn sequences(&self) -> impl Iterator<Item = &[Run]> + '_ {
        self.sequences.iter().map(Vec::as_slice)
    }

    /// Iterate over `(position, run)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Run)> + '_ {
        self.sequences
            .iter()
            .enumerate()
            .flat_map(|(pos, seq)| seq.iter().map(move |run| (pos, run)))
    }

    /// Check whether a sequence holds no run
    ///
    /// Out-of-range indices are reported as empty.
    pub fn is_sequence_empty(&self, index: usize) -> bool {
        self.sequences.get(index).is_none_or(Vec::is_empty)
    }

    /// Replace a whole sequence
    ///
    /// # Errors
    ///
    /// Returns [`RunError::RunOverlap`] if the runs are not sorted,
    /// overlap, touch, or leave the table; an index error if `index` is out
    /// of range.
    pub fn set_sequence(&mut self, index: usize, runs: Vec<Run>) -> RunResult<()> {
        self.check_index(index)?;
        let extent = self.coord_extent();
        let mut prev_stop: Option<i32> = None;
        for run in &runs {
            if !run.is_valid() || run.start() < 0 || run.stop() >= extent {
                return Err(RunError::RunOverlap {
                    index,
                    reason: format!("{} outside 0..{}", run, extent),
                });
            }
            if let Some(stop) = prev_stop {
                if run.start() <= stop + 1 {
                    return Err(RunError::RunOverlap {
                        index,
                        reason: format!("{} not separated from previous run", run),
                    });
                }
            }
            prev_stop = Some(run.stop());
        }
        self.sequences[index] = runs;
        Ok(())
    }

    /// Insert a run into a sequence
    ///
    /// A run touching its left or right neighbour is fused with it, the
    /// gray level of the result being the length-weighted mean.
    ///
    /// # Returns
    ///
    /// `Ok(true)` if the run was inserted, `Ok(false)` if it overlaps an
    /// existing run (the table is then left untouched).
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range or if the run does not
    /// fit in the scan line.
    pub fn add_run(&mut self, index: usize, run: Run) -> RunResult<bool> {
        self.check_index(index)?;
        let extent = self.coord_extent();
        if run.start() < 0 || run.stop() >= extent {
            return Err(runlag_core::Error::InvalidParameter(format!(
                "{} does not fit in line of length {}",
                run, extent
            ))
            .into());
        }

        let seq = &mut self.sequences[index];
        let at = seq.partition_point(|r| r.start() <= run.start());

        if at > 0 && seq[at - 1].stop() >= run.start() {
            return Ok(false);
        }
        if at < seq.len() && run.stop() >= seq[at].start() {
            return Ok(false);
        }

        let fuse_prev = at > 0 && seq[at - 1].stop() + 1 == run.start();
        let fuse_next = at < seq.len() && run.stop() + 1 == seq[at].start();

        match (fuse_prev, fuse_next) {
            (true, true) => {
                let left = fuse(&seq[at - 1], &run);
                seq[at - 1] = fuse(&left, &seq[at]);
                seq.remove(at);
            }
            (true, false) => seq[at - 1] = fuse(&seq[at - 1], &run),
            (false, true) => seq[at] = fuse(&run, &seq[at]),
            (false, false) => seq.insert(at, run),
        }
        Ok(true)
    }

    /// Remove an exact run from a sequence
    ///
    /// # Errors
    ///
    /// Returns [`RunError::RunNotFound`] if no run with the same start and
    /// length lies in the sequence.
    pub fn remove_run(&mut self, index: usize, run: &Run) -> RunResult<()> {
        self.check_index(index)?;
        let seq = &mut self.sequences[index];
        match seq
            .iter()
            .position(|r| r.start() == run.start() && r.length() == run.length())
        {
            Some(i) => {
                seq.remove(i);
                Ok(())
            }
            None => Err(RunError::RunNotFound {
                index,
                start: run.start(),
                length: run.length(),
            }),
        }
    }

    /// Run containing the pixel at (x, y), coordinates relative to the table
    pub fn run_at(&self, x: i32, y: i32) -> Option<Run> {
        let (coord, pos) = self.orientation.absolute_xy(x, y);
        if pos < 0 {
            return None;
        }
        let seq = self.sequences.get(pos as usize)?;
        let at = seq.partition_point(|r| r.start() <= coord);
        if at == 0 {
            return None;
        }
        let run = seq[at - 1];
        (run.stop() >= coord).then_some(run)
    }

    /// Check whether the pixel at (x, y) is foreground
    pub fn is_foreground(&self, x: i32, y: i32) -> bool {
        self.run_at(x, y).is_some()
    }

    /// Number of runs in the table
    pub fn total_run_count(&self) -> usize {
        self.sequences.iter().map(Vec::len).sum()
    }

    /// Number of foreground pixels
    pub fn weight(&self) -> i64 {
        self.sequences
            .iter()
            .flatten()
            .map(|r| r.length() as i64)
            .sum()
    }

    /// Add all runs of another table into this one
    ///
    /// Runs overlapping a run already present are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the tables differ in orientation or dimension.
    pub fn include(&mut self, other: &RunTable) -> RunResult<()> {
        self.check_compatible(other)?;
        for (pos, seq) in other.sequences.iter().enumerate() {
            for run in seq {
                if !self.add_run(pos, *run)? {
                    log::warn!("{} skipped at pos {}: overlaps existing run", run, pos);
                }
            }
        }
        Ok(())
    }

    /// Remove every run matching a predicate
    ///
    /// # Arguments
    ///
    /// * `predicate` - Selects the runs to remove
    /// * `removed` - Optional table receiving the removed runs
    ///
    /// # Returns
    ///
    /// The number of removed runs.
    ///
    /// # Errors
    ///
    /// Returns an error if `removed` differs in orientation or dimension.
    pub fn purge<F>(&mut self, mut predicate: F, mut removed: Option<&mut RunTable>) -> RunResult<usize>
    where
        F: FnMut(&Run) -> bool,
    {
        if let Some(target) = removed.as_deref() {
            self.check_compatible(target)?;
        }

        let mut count = 0;
        for pos in 0..self.sequences.len() {
            let seq = std::mem::take(&mut self.sequences[pos]);
            let mut kept = Vec::with_capacity(seq.len());
            for run in seq {
                if predicate(&run) {
                    count += 1;
                    if let Some(target) = removed.as_deref_mut() {
                        target.add_run(pos, run)?;
                    }
                } else {
                    kept.push(run);
                }
            }
            self.sequences[pos] = kept;
        }
        Ok(count)
    }

    /// Shrink the table to the bounding box of its runs
    ///
    /// # Returns
    ///
    /// The trimmed table and the absolute offset of its origin in this
    /// table, or `None` if the table holds no run.
    pub fn trim(&self) -> Option<(RunTable, Point)> {
        let first = self.sequences.iter().position(|s| !s.is_empty())?;
        let last = self.sequences.iter().rposition(|s| !s.is_empty())?;

        let mut coord_min = i32::MAX;
        let mut coord_max = i32::MIN;
        for run in self.sequences[first..=last].iter().flatten() {
            coord_min = coord_min.min(run.start());
            coord_max = coord_max.max(run.stop());
        }

        let oriented = Rect::new_unchecked(
            coord_min,
            first as i32,
            coord_max - coord_min + 1,
            (last - first + 1) as i32,
        );
        let abs = self.orientation.rect(oriented);

        let sequences = self.sequences[first..=last]
            .iter()
            .map(|seq| seq.iter().map(|r| r.translated(-coord_min)).collect())
            .collect();
        let table = RunTable {
            orientation: self.orientation,
            width: abs.w,
            height: abs.h,
            sequences,
        };
        Some((table, abs.location()))
    }

    /// Push every foreground pixel into a collector
    ///
    /// The collector ROI, if any, is expressed in the same frame as the
    /// table (origin at (0, 0)); `offset` is added to every included pixel.
    pub fn cumulate(&self, collector: &mut PointsCollector, offset: Point) {
        let (p_min, p_max, c_min, c_max) = match collector.roi() {
            Some(roi) => {
                let o = self.orientation.rect(roi);
                (o.y.max(0), o.bottom() - 1, o.x, o.right() - 1)
            }
            None => (0, i32::MAX, i32::MIN, i32::MAX),
        };

        for (pos, seq) in self.sequences.iter().enumerate() {
            let p = pos as i32;
            if p < p_min {
                continue;
            }
            if p > p_max {
                break;
            }
            for run in seq {
                let start = run.start().max(c_min);
                let stop = run.stop().min(c_max);
                for c in start..=stop {
                    let (x, y) = self.orientation.absolute_xy(c, p);
                    collector.include(x + offset.x, y + offset.y);
                }
            }
        }
    }

    /// Render the runs with their gray level on a white image
    ///
    /// # Errors
    ///
    /// Propagates image creation errors.
    pub fn to_image(&self) -> RunResult<GrayImage> {
        let mut image = GrayImage::new(self.width, self.height)?;
        for (pos, run) in self.iter() {
            let oriented = Rect::new_unchecked(run.start(), pos as i32, run.length(), 1);
            image.fill_rect(&self.orientation.rect(oriented), run.level());
        }
        Ok(image)
    }

    /// Multi-line drawing of the table, `X` for foreground and `-` for
    /// background, framed by `+=+` and `|`
    pub fn dump(&self) -> String {
        let border = format!("+{}+", "=".repeat(self.width as usize));
        let mut out = format!("{}\n{}\n", self, border);
        for y in 0..self.height {
            out.push('|');
            for x in 0..self.width {
                out.push(if self.is_foreground(x, y) { 'X' } else { '-' });
            }
            out.push_str("|\n");
        }
        out.push_str(&border);
        out
    }

    fn check_index(&self, index: usize) -> RunResult<()> {
        if index >= self.sequences.len() {
            return Err(runlag_core::Error::IndexOutOfBounds {
                index,
                len: self.sequences.len(),
            }
            .into());
        }
        Ok(())
    }

    /// Check that another table has the same orientation and dimension
    ///
    /// # Errors
    ///
    /// Returns [`RunError::OrientationMismatch`] or
    /// [`RunError::DimensionMismatch`].
    pub fn check_compatible(&self, other: &RunTable) -> RunResult<()> {
        if other.orientation != self.orientation {
            return Err(RunError::OrientationMismatch {
                expected: self.orientation,
                actual: other.orientation,
            });
        }
        if other.width != self.width || other.height != self.height {
            return Err(RunError::DimensionMismatch {
                expected_width: self.width,
                expected_height: self.height,
                width: other.width,
                height: other.height,
            });
        }
        Ok(())
    }
}

/// Fuse two adjacent runs, `a` lying just before `b`
fn fuse(a: &Run, b: &Run) -> Run {
    let length = a.length() + b.length();
    let sum = a.level() as i64 * a.length() as i64 + b.level() as i64 * b.length() as i64;
    let level = ((sum as f64) / (length as f64)).round() as u8;
    Run::new_unchecked(a.start(), length, level)
}

impl fmt::Display for RunTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RunTable{{{} {}x{}}}",
            self.orientation, self.width, self.height
        )
    }
}
