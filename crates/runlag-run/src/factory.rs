//! Run-length scanning
//!
//! [`RunTableFactory`] turns a [`PixelSource`] into a [`RunTable`]. Every
//! scan line is processed independently, one pass per line with no shared
//! state, so lines are scanned in parallel when the `parallel` feature is
//! enabled. The output is identical either way.

use crate::error::{RunError, RunResult};
use crate::table::RunTable;
use runlag_core::{Orientation, PixelSource, Rect, Run};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Options for run-length scanning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    /// Pixels with a gray level at or below this value are foreground
    pub max_foreground: u8,
    /// Foreground spans shorter than this are dropped
    pub min_length: i32,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_foreground: 127,
            min_length: 1,
        }
    }
}

impl ScanOptions {
    /// Set the foreground threshold
    pub fn with_max_foreground(mut self, max_foreground: u8) -> Self {
        self.max_foreground = max_foreground;
        self
    }

    /// Set the minimum run length
    pub fn with_min_length(mut self, min_length: i32) -> Self {
        self.min_length = min_length;
        self
    }

    /// Validate the options
    ///
    /// # Errors
    ///
    /// Returns an error if `min_length < 1`.
    pub fn validate(&self) -> RunResult<()> {
        if self.min_length < 1 {
            return Err(runlag_core::Error::InvalidParameter(format!(
                "min_length must be at least 1, got {}",
                self.min_length
            ))
            .into());
        }
        Ok(())
    }
}

/// Builds run tables of one orientation from pixel sources
#[derive(Debug, Clone, Copy)]
pub struct RunTableFactory {
    orientation: Orientation,
    options: ScanOptions,
}

impl RunTableFactory {
    /// Create a factory
    pub fn new(orientation: Orientation, options: ScanOptions) -> Self {
        Self {
            orientation,
            options,
        }
    }

    /// Orientation of the produced tables
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Scanning options
    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Scan the whole source
    ///
    /// # Errors
    ///
    /// Returns an error if the options are invalid or the source is empty.
    pub fn create_table<S>(&self, source: &S) -> RunResult<RunTable>
    where
        S: PixelSource + ?Sized,
    {
        let roi = Rect::new_unchecked(0, 0, source.width(), source.height());
        self.create_table_in(source, roi)
    }

    /// Scan a rectangular region of the source
    ///
    /// The region is clipped to the source; run coordinates and sequence
    /// indices of the result are relative to the clipped region origin.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::EmptyRegion`] if nothing of the region lies
    /// inside the source, or an error for invalid options.
    pub fn create_table_in<S>(&self, source: &S, roi: Rect) -> RunResult<RunTable>
    where
        S: PixelSource + ?Sized,
    {
        self.options.validate()?;
        let roi = roi
            .clip(source.width(), source.height())
            .ok_or(RunError::EmptyRegion)?;

        let oriented = self.orientation.rect(roi);
        let lines = self.scan_lines(source, &oriented);

        let mut table = RunTable::new(self.orientation, roi.w, roi.h)?;
        for (index, runs) in lines.into_iter().enumerate() {
            if !runs.is_empty() {
                table.set_sequence(index, runs)?;
            }
        }

        log::debug!(
            "{} scanned in {}: {} runs, weight {}",
            table,
            roi,
            table.total_run_count(),
            table.weight()
        );
        Ok(table)
    }

    #[cfg(feature = "parallel")]
    fn scan_lines<S>(&self, source: &S, oriented: &Rect) -> Vec<Vec<Run>>
    where
        S: PixelSource + ?Sized,
    {
        (0..oriented.h)
            .into_par_iter()
            .map(|pos| self.scan_line(source, oriented, pos))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn scan_lines<S>(&self, source: &S, oriented: &Rect) -> Vec<Vec<Run>>
    where
        S: PixelSource + ?Sized,
    {
        (0..oriented.h)
            .map(|pos| self.scan_line(source, oriented, pos))
            .collect()
    }

    /// Scan one line of the oriented region, `pos` relative to its origin
    fn scan_line<S>(&self, source: &S, oriented: &Rect, pos: i32) -> Vec<Run>
    where
        S: PixelSource + ?Sized,
    {
        let mut runs = Vec::new();
        let mut start = 0;
        let mut length = 0;
        let mut gray_sum: u32 = 0;

        for coord in 0..oriented.w {
            let (x, y) = self
                .orientation
                .absolute_xy(oriented.x + coord, oriented.y + pos);
            let level = source.pixel(x, y);

            if level <= self.options.max_foreground {
                if length == 0 {
                    start = coord;
                }
                length += 1;
                gray_sum += level as u32;
            } else if length > 0 {
                self.end_run(&mut runs, start, length, gray_sum);
                length = 0;
                gray_sum = 0;
            }
        }
        if length > 0 {
            self.end_run(&mut runs, start, length, gray_sum);
        }
        runs
    }

    #[inline]
    fn end_run(&self, runs: &mut Vec<Run>, start: i32, length: i32, gray_sum: u32) {
        if length >= self.options.min_length {
            let level = (gray_sum as f64 / length as f64).round() as u8;
            runs.push(Run::new_unchecked(start, length, level));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runlag_core::{BLACK, GrayImage};

    fn image_from_rows(rows: &[&str]) -> GrayImage {
        let width = rows[0].len() as i32;
        let data = rows
            .iter()
            .flat_map(|row| row.bytes().map(|b| if b == b'X' { BLACK } else { 255 }))
            .collect();
        GrayImage::from_raw(width, rows.len() as i32, data).unwrap()
    }

    fn line(table: &RunTable, index: usize) -> Vec<(i32, i32)> {
        table
            .sequence(index)
            .unwrap()
            .iter()
            .map(|r| (r.start(), r.length()))
            .collect()
    }

    #[test]
    fn test_straight_line() {
        let img = image_from_rows(&["XXXXXXXXXX"]);
        let factory = RunTableFactory::new(Orientation::Horizontal, ScanOptions::default());
        let table = factory.create_table(&img).unwrap();
        assert_eq!(table.size(), 1);
        assert_eq!(line(&table, 0), vec![(0, 10)]);
        assert_eq!(table.sequence(0).unwrap()[0].level(), BLACK);
    }

    #[test]
    fn test_empty_and_saturated_lines() {
        let img = image_from_rows(&["......", "XXXXXX", ".X..XX"]);
        let factory = RunTableFactory::new(Orientation::Horizontal, ScanOptions::default());
        let table = factory.create_table(&img).unwrap();
        assert!(table.is_sequence_empty(0));
        assert_eq!(line(&table, 1), vec![(0, 6)]);
        assert_eq!(line(&table, 2), vec![(1, 1), (4, 2)]);
    }

    #[test]
    fn test_vertical_scan() {
        let img = image_from_rows(&["X..", "X.X", "..X"]);
        let factory = RunTableFactory::new(Orientation::Vertical, ScanOptions::default());
        let table = factory.create_table(&img).unwrap();
        assert_eq!(table.size(), 3);
        assert_eq!(line(&table, 0), vec![(0, 2)]);
        assert!(table.is_sequence_empty(1));
        assert_eq!(line(&table, 2), vec![(1, 2)]);
    }

    #[test]
    fn test_min_length_drops_noise() {
        let img = image_from_rows(&["X.XX.XXX"]);
        let options = ScanOptions::default().with_min_length(2);
        let factory = RunTableFactory::new(Orientation::Horizontal, options);
        let table = factory.create_table(&img).unwrap();
        assert_eq!(line(&table, 0), vec![(2, 2), (5, 3)]);
    }

    #[test]
    fn test_threshold_and_level() {
        let img = GrayImage::from_raw(4, 1, vec![10, 30, 200, 100]).unwrap();
        let options = ScanOptions::default().with_max_foreground(100);
        let factory = RunTableFactory::new(Orientation::Horizontal, options);
        let table = factory.create_table(&img).unwrap();
        let runs = table.sequence(0).unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].level(), 20);
        assert_eq!(runs[1].level(), 100);
    }

    #[test]
    fn test_roi_is_relative_and_clipped() {
        let img = image_from_rows(&["XXXX", "X..X", "XXXX"]);
        let factory = RunTableFactory::new(Orientation::Horizontal, ScanOptions::default());
        let table = factory
            .create_table_in(&img, Rect::new_unchecked(1, 1, 10, 10))
            .unwrap();
        assert_eq!((table.width(), table.height()), (3, 2));
        assert_eq!(line(&table, 0), vec![(2, 1)]);
        assert_eq!(line(&table, 1), vec![(0, 3)]);

        assert!(matches!(
            factory.create_table_in(&img, Rect::new_unchecked(8, 8, 2, 2)),
            Err(RunError::EmptyRegion)
        ));
    }

    #[test]
    fn test_invalid_options() {
        let img = image_from_rows(&["X"]);
        let options = ScanOptions::default().with_min_length(0);
        let factory = RunTableFactory::new(Orientation::Horizontal, options);
        assert!(factory.create_table(&img).is_err());
    }
}
