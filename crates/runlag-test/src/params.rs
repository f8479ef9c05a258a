//! Regression test parameters and checks

use crate::error::TestResult;
use crate::regout_dir;
use runlag_core::GrayImage;
use runlag_io::PnmFormat;
use std::fs;

/// Regression test mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegTestMode {
    /// Check only (default)
    #[default]
    Compare,
    /// Check, and also write every compared text and image to the regout
    /// directory for inspection
    Display,
}

impl RegTestMode {
    /// Parse mode from the `REGTEST_MODE` environment variable
    pub fn from_env() -> Self {
        match std::env::var("REGTEST_MODE")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "display" => Self::Display,
            _ => Self::Compare,
        }
    }
}

/// Regression test parameters
///
/// Every check increments the index; failures are recorded with the index
/// and reported together by [`RegParams::cleanup`].
pub struct RegParams {
    /// Name of the test (e.g., "sweep")
    pub test_name: String,
    index: usize,
    /// Test mode
    pub mode: RegTestMode,
    failures: Vec<String>,
}

impl RegParams {
    /// Create the parameters of a regression test
    ///
    /// The mode comes from the `REGTEST_MODE` environment variable.
    pub fn new(test_name: &str) -> Self {
        let mode = RegTestMode::from_env();
        if mode == RegTestMode::Display {
            let _ = fs::create_dir_all(regout_dir());
        }
        eprintln!("==== {}_reg ({:?}) ====", test_name, mode);

        Self {
            test_name: test_name.to_string(),
            index: 0,
            mode,
            failures: Vec::new(),
        }
    }

    /// Index of the last check
    pub fn index(&self) -> usize {
        self.index
    }

    /// Check if in display mode
    pub fn display(&self) -> bool {
        self.mode == RegTestMode::Display
    }

    /// Check a condition
    pub fn check(&mut self, condition: bool) -> bool {
        self.index += 1;
        if !condition {
            let msg = format!("{}_reg, index {}: condition is false", self.test_name, self.index);
            self.record(msg);
        }
        condition
    }

    /// Compare two numbers
    ///
    /// # Arguments
    ///
    /// * `expected` - Expected value
    /// * `actual` - Computed value
    /// * `delta` - Maximum allowed difference
    pub fn compare_values(&mut self, expected: f64, actual: f64, delta: f64) -> bool {
        self.index += 1;
        let diff = (expected - actual).abs();
        if diff > delta {
            let msg = format!(
                "{}_reg, index {}: expected {}, got {} (difference {} > {})",
                self.test_name, self.index, expected, actual, diff, delta
            );
            self.record(msg);
            return false;
        }
        true
    }

    /// Compare two gray images pixel by pixel
    ///
    /// In display mode the second image is written to the regout directory.
    pub fn compare_images(&mut self, expected: &GrayImage, actual: &GrayImage) -> bool {
        self.index += 1;
        self.dump_image(actual);

        if expected.width() != actual.width() || expected.height() != actual.height() {
            let msg = format!(
                "{}_reg, index {}: image size {}x{} instead of {}x{}",
                self.test_name,
                self.index,
                actual.width(),
                actual.height(),
                expected.width(),
                expected.height()
            );
            self.record(msg);
            return false;
        }

        let mismatches: Vec<(i32, i32)> = (0..expected.height())
            .flat_map(|y| (0..expected.width()).map(move |x| (x, y)))
            .filter(|&(x, y)| expected.get_pixel(x, y) != actual.get_pixel(x, y))
            .collect();
        if let Some(&(x, y)) = mismatches.first() {
            let msg = format!(
                "{}_reg, index {}: {} pixels differ, first at ({}, {})",
                self.test_name,
                self.index,
                mismatches.len(),
                x,
                y
            );
            self.record(msg);
            return false;
        }
        true
    }

    /// Compare two texts, such as run table dumps or section drawings
    ///
    /// The failure report gives the first differing line. In display mode
    /// the second text is written to the regout directory.
    pub fn compare_strings(&mut self, expected: &[u8], actual: &[u8]) -> bool {
        self.index += 1;
        self.dump_text(actual);
        if expected == actual {
            return true;
        }

        let expected = String::from_utf8_lossy(expected);
        let actual = String::from_utf8_lossy(actual);
        let line = expected
            .lines()
            .zip(actual.lines())
            .position(|(e, a)| e != a)
            .unwrap_or_else(|| expected.lines().count().min(actual.lines().count()));
        let msg = format!(
            "{}_reg, index {}: texts differ at line {}\nexpected:\n{}\nactual:\n{}",
            self.test_name,
            self.index,
            line + 1,
            expected,
            actual
        );
        self.record(msg);
        false
    }

    /// Write an image to the regout directory, named after the test and
    /// the current index
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be written.
    pub fn write_image(&self, image: &GrayImage, format: PnmFormat) -> TestResult<String> {
        fs::create_dir_all(regout_dir())?;
        let path = self.regout_path(format.extension());
        runlag_io::write_image(image, &path, format).map_err(|e| {
            crate::TestError::ImageWrite {
                path: path.clone(),
                message: e.to_string(),
            }
        })?;
        Ok(path)
    }

    fn regout_path(&self, ext: &str) -> String {
        format!("{}/{}.{:02}.{}", regout_dir(), self.test_name, self.index, ext)
    }

    fn dump_image(&self, image: &GrayImage) {
        if !self.display() {
            return;
        }
        if let Err(e) = self.write_image(image, PnmFormat::PgmBinary) {
            eprintln!("{}_reg, index {}: {}", self.test_name, self.index, e);
        }
    }

    fn dump_text(&self, text: &[u8]) {
        if !self.display() {
            return;
        }
        let path = self.regout_path("txt");
        if let Err(e) = fs::write(&path, text) {
            eprintln!("{}_reg, index {}: cannot write {}: {}", self.test_name, self.index, path, e);
        }
    }

    fn record(&mut self, msg: String) {
        eprintln!("{}", msg);
        self.failures.push(msg);
    }

    /// Report the results
    ///
    /// # Returns
    ///
    /// `true` if every check passed.
    pub fn cleanup(self) -> bool {
        if self.failures.is_empty() {
            eprintln!("SUCCESS: {}_reg ({} checks)", self.test_name, self.index);
        } else {
            eprintln!(
                "FAILURE: {}_reg ({} of {} checks failed)",
                self.test_name,
                self.failures.len(),
                self.index
            );
        }
        self.failures.is_empty()
    }

    /// Check if every check passed so far
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Recorded failures
    pub fn failures(&self) -> &[String] {
        &self.failures
    }
}
