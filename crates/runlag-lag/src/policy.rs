//! Junction policies
//!
//! During the sweep, a run that overlaps exactly one active section is
//! offered to that section. The policy decides whether the run continues
//! the section or must start a new one linked by a junction.

use crate::section::Section;
use runlag_core::Run;

/// Decides whether a run may extend a section
pub trait JunctionPolicy: Send + Sync {
    /// Check whether `run`, on the line right after `section`'s last run,
    /// is consistent with it
    fn consistent_run(&self, run: &Run, section: &Section) -> bool;
}

impl<T: JunctionPolicy + ?Sized> JunctionPolicy for Box<T> {
    fn consistent_run(&self, run: &Run, section: &Section) -> bool {
        (**self).consistent_run(run, section)
    }
}

impl<T: JunctionPolicy + ?Sized> JunctionPolicy for &T {
    fn consistent_run(&self, run: &Run, section: &Section) -> bool {
        (**self).consistent_run(run, section)
    }
}

/// Accepts every run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllPolicy;

impl JunctionPolicy for AllPolicy {
    fn consistent_run(&self, _run: &Run, _section: &Section) -> bool {
        true
    }
}

/// Accepts a run whose length differs from the section's last run by at
/// most `max_delta_length`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeltaPolicy {
    /// Maximum absolute length difference
    pub max_delta_length: i32,
}

impl DeltaPolicy {
    /// Create a delta policy
    pub fn new(max_delta_length: i32) -> Self {
        Self { max_delta_length }
    }
}

impl JunctionPolicy for DeltaPolicy {
    fn consistent_run(&self, run: &Run, section: &Section) -> bool {
        let delta = (run.length() - section.last_run().length()).abs();
        delta <= self.max_delta_length
    }
}

/// Accepts a run whose length stays within a ratio of the section's mean
/// run length
///
/// With ratio `r` and mean `m`, the run length must lie in `[m / r, m * r]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioPolicy {
    /// Maximum ratio, at least 1
    pub max_height_ratio: f64,
}

impl RatioPolicy {
    /// Create a ratio policy
    pub fn new(max_height_ratio: f64) -> Self {
        Self { max_height_ratio }
    }
}

impl JunctionPolicy for RatioPolicy {
    fn consistent_run(&self, run: &Run, section: &Section) -> bool {
        let mean = section.weight() as f64 / section.run_count() as f64;
        let ratio = run.length() as f64 / mean;
        ratio <= self.max_height_ratio && ratio * self.max_height_ratio >= 1.0
    }
}

/// Accepts a run whose ends moved by at most `max_shift` with respect to
/// the section's last run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftPolicy {
    /// Maximum shift of either end
    pub max_shift: i32,
}

impl ShiftPolicy {
    /// Create a shift policy
    pub fn new(max_shift: i32) -> Self {
        Self { max_shift }
    }
}

impl JunctionPolicy for ShiftPolicy {
    fn consistent_run(&self, run: &Run, section: &Section) -> bool {
        let last = section.last_run();
        (run.start() - last.start()).abs() <= self.max_shift
            && (run.stop() - last.stop()).abs() <= self.max_shift
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runlag_core::Orientation;

    fn section_of(runs: &[(i32, i32)]) -> Section {
        let runs = runs
            .iter()
            .map(|&(s, l)| Run::new(s, l, 0).unwrap())
            .collect();
        Section::with_runs(Orientation::Horizontal, 0, runs).unwrap()
    }

    fn run(start: i32, length: i32) -> Run {
        Run::new(start, length, 0).unwrap()
    }

    #[test]
    fn test_all_policy() {
        let s = section_of(&[(0, 2)]);
        assert!(AllPolicy.consistent_run(&run(0, 100), &s));
    }

    #[test]
    fn test_delta_policy() {
        let s = section_of(&[(0, 10), (0, 4)]);
        let p = DeltaPolicy::new(2);
        assert!(p.consistent_run(&run(0, 6), &s));
        assert!(p.consistent_run(&run(3, 2), &s));
        assert!(!p.consistent_run(&run(0, 7), &s));
        assert!(DeltaPolicy::new(0).consistent_run(&run(9, 4), &s));
    }

    #[test]
    fn test_ratio_policy() {
        // Mean run length is 4
        let s = section_of(&[(0, 2), (0, 6)]);
        let p = RatioPolicy::new(2.0);
        assert!(p.consistent_run(&run(0, 8), &s));
        assert!(p.consistent_run(&run(0, 2), &s));
        assert!(!p.consistent_run(&run(0, 9), &s));
        assert!(!p.consistent_run(&run(0, 1), &s));
    }

    #[test]
    fn test_shift_policy() {
        let s = section_of(&[(5, 5)]);
        let p = ShiftPolicy::new(1);
        assert!(p.consistent_run(&run(4, 7), &s));
        assert!(!p.consistent_run(&run(3, 7), &s));
        assert!(!p.consistent_run(&run(5, 7), &s));
    }

    #[test]
    fn test_boxed_policy() {
        let p: Box<dyn JunctionPolicy> = Box::new(DeltaPolicy::new(0));
        let s = section_of(&[(0, 3)]);
        assert!(p.consistent_run(&run(1, 3), &s));
        assert!(!(&p).consistent_run(&run(1, 4), &s));
    }
}
