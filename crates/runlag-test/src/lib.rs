//! runlag-test - Regression test framework for runlag
//!
//! Regression tests record a sequence of numbered checks and report all
//! failures at the end. Two modes are supported:
//!
//! - **Compare**: Run the checks (default)
//! - **Display**: Run the checks and write every compared text and image
//!   to `tests/regout/` for inspection
//!
//! # Usage
//!
//! ```ignore
//! use runlag_test::RegParams;
//!
//! let mut rp = RegParams::new("sweep");
//! rp.compare_values(3.0, lag.len() as f64, 0.0);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: Set to "compare" or "display"

mod error;
mod params;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};

use runlag_core::GrayImage;

/// Load a test image from the test data directory
///
/// # Arguments
///
/// * `name` - Image filename (e.g., "fork.pbm")
///
/// # Returns
///
/// The loaded image, or an error if loading fails.
pub fn load_test_image(name: &str) -> TestResult<GrayImage> {
    let path = test_data_path(name);
    runlag_io::read_image(&path).map_err(|e| TestError::ImageLoad {
        path: path.clone(),
        message: e.to_string(),
    })
}

/// Get the path to the workspace root
fn workspace_root() -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    // runlag-test is at crates/runlag-test, so go up two directories
    format!("{}/../..", manifest_dir)
}

/// Get the path to a test data file
pub fn test_data_path(name: &str) -> String {
    format!("{}/tests/data/images/{}", workspace_root(), name)
}

/// Get the path to the regout (regression output) directory
pub fn regout_dir() -> String {
    format!("{}/tests/regout", workspace_root())
}
