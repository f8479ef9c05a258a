//! Region of interest projections
//!
//! A [`Roi`] projects the pixels lying in an absolute rectangle onto the
//! axis orthogonal to a projection orientation. A horizontal projection
//! gives one bucket per row, a vertical projection one bucket per column.
//!
//! Runs parallel to the projection add their clipped length to the bucket
//! of their line. Runs across the projection add one to the bucket of
//! every coordinate they cover.

use crate::glyph::Glyph;
use crate::section::Section;
use runlag_core::{Histogram, Orientation, Rect, Run};
use runlag_run::RunTable;

/// Rectangular region of interest, in absolute coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roi {
    contour: Rect,
}

impl Roi {
    /// Create a region of interest
    pub fn new(contour: Rect) -> Self {
        Self { contour }
    }

    /// Absolute rectangle of the region
    pub fn contour(&self) -> Rect {
        self.contour
    }

    /// Projection histogram of the pixels of some sections
    ///
    /// Sections of both orientations may be mixed.
    pub fn section_histogram<'s, I>(&self, projection: Orientation, sections: I) -> Histogram
    where
        I: IntoIterator<Item = &'s Section>,
    {
        let mut histo = Histogram::new();
        for section in sections {
            let o_roi = section.orientation().rect(self.contour);
            let along = section.orientation() == projection;
            for (pos, run) in section.positioned_runs() {
                accumulate(&mut histo, along, &o_roi, pos, run);
            }
        }
        histo
    }

    /// Projection histogram of the runs of a table
    ///
    /// The table origin is taken at absolute (0, 0).
    pub fn run_histogram(&self, projection: Orientation, table: &RunTable) -> Histogram {
        let mut histo = Histogram::new();
        let o_roi = table.orientation().rect(self.contour);
        let along = table.orientation() == projection;
        for (pos, run) in table.iter() {
            accumulate(&mut histo, along, &o_roi, pos as i32, run);
        }
        histo
    }

    /// Projection histogram of the member sections of a glyph
    pub fn glyph_histogram(&self, projection: Orientation, glyph: &Glyph<'_>) -> Histogram {
        self.section_histogram(projection, glyph.members().iter().copied())
    }
}

/// Add the part of a run lying in the oriented region
fn accumulate(histo: &mut Histogram, along: bool, o_roi: &Rect, pos: i32, run: &Run) {
    if pos < o_roi.y || pos >= o_roi.bottom() {
        return;
    }
    let start = run.start().max(o_roi.x);
    let stop = run.stop().min(o_roi.right() - 1);
    if stop < start {
        return;
    }
    if along {
        histo.increase_count(pos, stop - start + 1);
    } else {
        for coord in start..=stop {
            histo.increase_count(coord, 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(orientation: Orientation, first_pos: i32, runs: &[(i32, i32)]) -> Section {
        let runs = runs
            .iter()
            .map(|&(s, l)| Run::new(s, l, 0).unwrap())
            .collect();
        Section::with_runs(orientation, first_pos, runs).unwrap()
    }

    #[test]
    fn test_along() {
        // Two rows: x 0..9 at y=2, x 3..6 at y=3
        let h = section(Orientation::Horizontal, 2, &[(0, 10), (3, 4)]);
        let roi = Roi::new(Rect::new_unchecked(2, 0, 4, 10));
        let histo = roi.section_histogram(Orientation::Horizontal, [&h]);
        assert_eq!(histo.count(2), 4);
        assert_eq!(histo.count(3), 3);
        assert_eq!(histo.total_count(), 7);
    }

    #[test]
    fn test_across() {
        // Vertical section: column 5 rows 0..3, column 6 rows 2..3
        let v = section(Orientation::Vertical, 5, &[(0, 4), (2, 2)]);
        let roi = Roi::new(Rect::new_unchecked(0, 1, 20, 20));
        let histo = roi.section_histogram(Orientation::Horizontal, [&v]);
        assert_eq!(histo.count(0), 0);
        assert_eq!(histo.count(1), 1);
        assert_eq!(histo.count(2), 2);
        assert_eq!(histo.count(3), 2);
        assert_eq!(histo.total_count(), 5);

        // Projected vertically, it lies along
        let histo = roi.section_histogram(Orientation::Vertical, [&v]);
        assert_eq!(histo.count(5), 3);
        assert_eq!(histo.count(6), 2);
    }

    #[test]
    fn test_outside_is_empty() {
        let h = section(Orientation::Horizontal, 2, &[(0, 10)]);
        let roi = Roi::new(Rect::new_unchecked(50, 50, 4, 4));
        assert!(roi.section_histogram(Orientation::Horizontal, [&h]).is_empty());
        assert!(roi.section_histogram(Orientation::Vertical, [&h]).is_empty());
    }

    #[test]
    fn test_run_histogram() {
        let mut table = RunTable::new(Orientation::Horizontal, 8, 3).unwrap();
        table.add_run(0, Run::new(1, 3, 0).unwrap()).unwrap();
        table.add_run(2, Run::new(0, 8, 0).unwrap()).unwrap();
        let roi = Roi::new(table.bounds());
        let rows = roi.run_histogram(Orientation::Horizontal, &table);
        assert_eq!(rows.count(0), 3);
        assert_eq!(rows.count(2), 8);
        let cols = roi.run_histogram(Orientation::Vertical, &table);
        assert_eq!(cols.count(0), 1);
        assert_eq!(cols.count(2), 2);
        assert_eq!(cols.total_count(), 11);
    }

    #[test]
    fn test_glyph_histogram() {
        let h = section(Orientation::Horizontal, 0, &[(0, 3)]);
        let v = section(Orientation::Vertical, 1, &[(1, 2)]);
        let glyph = Glyph::new(vec![&h, &v]);
        let roi = Roi::new(Rect::new_unchecked(0, 0, 3, 3));
        let histo = roi.glyph_histogram(Orientation::Horizontal, &glyph);
        assert_eq!(histo.count(0), 3);
        assert_eq!(histo.count(1), 1);
        assert_eq!(histo.count(2), 1);
    }
}
