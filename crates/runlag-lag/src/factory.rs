//! Section building
//!
//! [`SectionFactory`] sweeps a run table line by line and grows the
//! section graph of a lag:
//!
//! 1. Every run of the first line starts a section.
//! 2. For each following line, the sections active on the previous line
//!    are checked against the runs of the new line. A section overlapped by
//!    exactly one run that the policy accepts stays extendable; any other
//!    overlapped section is finished.
//! 3. Each run of the new line then extends its single extendable
//!    predecessor, or starts a new section linked by junctions to every
//!    overlapped predecessor.
//!
//! Runs of a line and last runs of the active sections are both sorted
//! and disjoint. Each pass walks them together with a cursor that only
//! moves forward, so a line costs time linear in its runs plus the active
//! sections.

use crate::error::{LagError, LagResult};
use crate::lag::Lag;
use crate::policy::JunctionPolicy;
use crate::section::SectionId;
use runlag_core::{PixelSource, Point, Rect, Run};
use runlag_run::{RunError, RunTable, RunTableFactory, ScanOptions};

use std::collections::HashSet;

/// Builds sections from run tables under a junction policy
#[derive(Debug, Clone)]
pub struct SectionFactory<P: JunctionPolicy> {
    policy: P,
}

impl<P: JunctionPolicy> SectionFactory<P> {
    /// Create a factory
    pub fn new(policy: P) -> Self {
        Self { policy }
    }

    /// Junction policy of the factory
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Build the sections of a run table into a lag
    ///
    /// # Arguments
    ///
    /// * `lag` - Lag receiving the sections, same orientation as `table`
    /// * `table` - Runs to sweep
    /// * `offset` - Absolute location of the table origin; created
    ///   sections are translated by it
    /// * `include` - Also add the table to the lag backing runs
    ///
    /// # Returns
    ///
    /// The ids of the created sections, in creation order.
    ///
    /// # Errors
    ///
    /// Returns [`LagError::OrientationMismatch`] if the table and the lag
    /// orientations differ. With `include`, also fails when the table does
    /// not fit the lag backing runs (see [`Lag::check_runs`]). A rejected
    /// table leaves the lag unchanged.
    pub fn create_sections(
        &self,
        lag: &mut Lag,
        table: &RunTable,
        offset: Point,
        include: bool,
    ) -> LagResult<Vec<SectionId>> {
        if table.orientation() != lag.orientation() {
            return Err(LagError::OrientationMismatch {
                expected: lag.orientation(),
                actual: table.orientation(),
            });
        }

        if include {
            lag.check_runs(table, offset)?;
        }

        let SweepStats {
            created,
            junctions,
            visits,
        } = self.sweep(lag, table)?;

        if offset != Point::default() {
            for &id in &created {
                if let Some(section) = lag.section_mut(id) {
                    section.translate(offset);
                }
            }
        }
        if include {
            lag.include_runs(table, offset)?;
        }

        log::debug!(
            "{}: {} sections and {} junctions from {} in {} steps",
            lag.name(),
            created.len(),
            junctions,
            table,
            visits
        );
        Ok(created)
    }

    fn sweep(&self, lag: &mut Lag, table: &RunTable) -> LagResult<SweepStats> {
        let mut sweep = Sweep {
            lag,
            policy: &self.policy,
            prev_actives: Vec::new(),
            next_actives: Vec::new(),
            finished: HashSet::new(),
            stats: SweepStats::default(),
        };
        sweep.run(table)?;
        Ok(sweep.stats)
    }

    /// Scan a region of a pixel source and build its sections into a lag
    ///
    /// The scanned runs are added to the lag backing runs.
    ///
    /// # Errors
    ///
    /// Returns an error if the region lies outside the source, if the
    /// options are invalid, or if the lag already holds runs at another
    /// offset or of another dimension. The lag is then left unchanged.
    pub fn create_sections_from_source<S>(
        &self,
        lag: &mut Lag,
        source: &S,
        roi: Rect,
        options: &ScanOptions,
    ) -> LagResult<Vec<SectionId>>
    where
        S: PixelSource + ?Sized,
    {
        let clipped = roi
            .clip(source.width(), source.height())
            .ok_or(RunError::EmptyRegion)?;
        let table = RunTableFactory::new(lag.orientation(), *options).create_table_in(source, clipped)?;
        self.create_sections(lag, &table, clipped.location(), true)
    }
}

/// Outcome of one sweep
#[derive(Debug, Default)]
struct SweepStats {
    created: Vec<SectionId>,
    junctions: usize,
    /// Run and section comparisons made by both passes
    visits: usize,
}

/// State of one sweep over a run table
struct Sweep<'a, P: JunctionPolicy> {
    lag: &'a mut Lag,
    policy: &'a P,
    /// Sections ending on the previous line, with their last run,
    /// ordered by run start
    prev_actives: Vec<(SectionId, Run)>,
    /// Sections ending on the current line, ordered by last run start
    next_actives: Vec<SectionId>,
    /// Sections that may no longer be extended
    finished: HashSet<SectionId>,
    stats: SweepStats,
}

impl<P: JunctionPolicy> Sweep<'_, P> {
    fn run(&mut self, table: &RunTable) -> LagResult<()> {
        for (index, runs) in table.sequences().enumerate() {
            let pos = index as i32;
            if index == 0 {
                for run in runs {
                    let id = self.create(pos, *run)?;
                    self.next_actives.push(id);
                }
                continue;
            }
            if runs.is_empty() {
                self.next_actives.clear();
                continue;
            }

            self.rotate()?;
            self.process_prev_side(runs)?;
            self.process_next_side(pos, runs)?;
        }
        Ok(())
    }

    fn rotate(&mut self) -> LagResult<()> {
        self.prev_actives.clear();
        for id in std::mem::take(&mut self.next_actives) {
            let last = *self.section(id)?.last_run();
            self.prev_actives.push((id, last));
        }
        Ok(())
    }

    /// Finish the active sections that cannot be extended by the runs of
    /// the new line
    ///
    /// Both sequences are sorted and disjoint, so the first run that may
    /// overlap a section only moves forward.
    fn process_prev_side(&mut self, runs: &[Run]) -> LagResult<()> {
        let mut cursor = 0;
        for index in 0..self.prev_actives.len() {
            let (id, last) = self.prev_actives[index];
            while cursor < runs.len() && runs[cursor].stop() < last.start() {
                cursor += 1;
                self.stats.visits += 1;
            }

            let mut overlapping = runs[cursor..]
                .iter()
                .take_while(|run| run.start() <= last.stop());
            let first = overlapping.next();
            let second = overlapping.next();
            self.stats.visits += 2;

            match (first, second) {
                (Some(run), None) => {
                    let section = self.section(id)?;
                    if !self.policy.consistent_run(run, section) {
                        log::debug!("{} finished: {} rejected by policy", section, run);
                        self.finished.insert(id);
                    }
                }
                (Some(_), Some(_)) => {
                    self.finished.insert(id);
                }
                (None, _) => {}
            }
        }
        Ok(())
    }

    /// Attach each run of the new line to its predecessors
    fn process_next_side(&mut self, pos: i32, runs: &[Run]) -> LagResult<()> {
        let mut cursor = 0;
        for run in runs {
            let mut visits = 0;
            while cursor < self.prev_actives.len()
                && self.prev_actives[cursor].1.stop() < run.start()
            {
                cursor += 1;
                visits += 1;
            }
            let mut overlapping = Vec::new();
            for &(id, last) in &self.prev_actives[cursor..] {
                visits += 1;
                if last.start() > run.stop() {
                    break;
                }
                overlapping.push(id);
            }
            self.stats.visits += visits;
            self.attach(pos, run, &overlapping)?;
        }
        Ok(())
    }

    fn attach(&mut self, pos: i32, run: &Run, overlapping: &[SectionId]) -> LagResult<()> {
        match overlapping {
            [] => {
                let id = self.create(pos, *run)?;
                self.next_actives.push(id);
            }
            [single] if !self.finished.contains(single) => {
                let id = *single;
                log::debug!("Continuing {} with {}", id, run);
                self.lag
                    .section_mut(id)
                    .ok_or(LagError::UnknownSection(id))?
                    .append(*run)?;
                self.next_actives.push(id);
            }
            sources => {
                let id = self.create(pos, *run)?;
                for &source in sources {
                    self.lag.add_junction(source, id)?;
                    log::debug!("Junction {} -> {}", source, id);
                    self.stats.junctions += 1;
                }
                if sources.len() > 1 {
                    log::debug!("{} converges {} sections", id, sources.len());
                }
                self.next_actives.push(id);
            }
        }
        Ok(())
    }

    fn create(&mut self, pos: i32, run: Run) -> LagResult<SectionId> {
        let id = self.lag.create_section(pos, run)?;
        log::debug!("Created {} at pos {} with {}", id, pos, run);
        self.stats.created.push(id);
        Ok(id)
    }

    fn section(&self, id: SectionId) -> LagResult<&crate::section::Section> {
        self.lag.section(id).ok_or(LagError::UnknownSection(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{AllPolicy, DeltaPolicy};
    use runlag_core::{BLACK, GrayImage, Orientation};

    fn table(orientation: Orientation, width: i32, height: i32, lines: &[&[(i32, i32)]]) -> RunTable {
        let mut table = RunTable::new(orientation, width, height).unwrap();
        for (pos, runs) in lines.iter().enumerate() {
            let runs = runs
                .iter()
                .map(|&(s, l)| Run::new(s, l, 0).unwrap())
                .collect();
            table.set_sequence(pos, runs).unwrap();
        }
        table
    }

    #[test]
    fn test_single_line() {
        let t = table(Orientation::Horizontal, 10, 1, &[&[(0, 10)]]);
        let mut lag = Lag::new("h", Orientation::Horizontal);
        let ids = SectionFactory::new(AllPolicy)
            .create_sections(&mut lag, &t, Point::default(), false)
            .unwrap();
        assert_eq!(ids.len(), 1);
        let s = lag.section(ids[0]).unwrap();
        assert_eq!(s.first_pos(), 0);
        assert_eq!(s.run_count(), 1);
        assert_eq!(s.weight(), 10);
        assert_eq!(s.out_degree(), 0);
        assert!(lag.runs().is_none());
    }

    #[test]
    fn test_fork() {
        let t = table(Orientation::Horizontal, 6, 2, &[&[(0, 6)], &[(0, 2), (4, 2)]]);
        let mut lag = Lag::new("h", Orientation::Horizontal);
        SectionFactory::new(AllPolicy)
            .create_sections(&mut lag, &t, Point::default(), false)
            .unwrap();
        assert_eq!(lag.len(), 3);
        let top = lag.section(SectionId(1)).unwrap();
        assert_eq!(top.run_count(), 1);
        assert_eq!(top.targets(), &[SectionId(2), SectionId(3)]);
    }

    #[test]
    fn test_join() {
        let t = table(Orientation::Horizontal, 6, 2, &[&[(0, 2), (4, 2)], &[(0, 6)]]);
        let mut lag = Lag::new("h", Orientation::Horizontal);
        SectionFactory::new(AllPolicy)
            .create_sections(&mut lag, &t, Point::default(), false)
            .unwrap();
        assert_eq!(lag.len(), 3);
        let bottom = lag.section(SectionId(3)).unwrap();
        assert_eq!(bottom.first_pos(), 1);
        assert_eq!(bottom.sources(), &[SectionId(1), SectionId(2)]);
    }

    #[test]
    fn test_policy_split() {
        let t = table(Orientation::Horizontal, 8, 3, &[&[(0, 2)], &[(0, 2)], &[(0, 5)]]);
        let mut lag = Lag::new("h", Orientation::Horizontal);
        SectionFactory::new(DeltaPolicy::new(0))
            .create_sections(&mut lag, &t, Point::default(), false)
            .unwrap();
        assert_eq!(lag.len(), 2);
        let first = lag.section(SectionId(1)).unwrap();
        assert_eq!(first.run_count(), 2);
        assert_eq!(first.targets(), &[SectionId(2)]);
        let second = lag.section(SectionId(2)).unwrap();
        assert_eq!(second.first_pos(), 2);
        assert_eq!(second.weight(), 5);
    }

    #[test]
    fn test_empty_line_ends_sections() {
        let t = table(Orientation::Horizontal, 4, 3, &[&[(0, 2)], &[], &[(0, 2)]]);
        let mut lag = Lag::new("h", Orientation::Horizontal);
        SectionFactory::new(AllPolicy)
            .create_sections(&mut lag, &t, Point::default(), false)
            .unwrap();
        assert_eq!(lag.len(), 2);
        assert!(lag.sections().all(|s| s.in_degree() + s.out_degree() == 0));
    }

    #[test]
    fn test_empty_first_line() {
        let t = table(Orientation::Horizontal, 4, 3, &[&[], &[(1, 2)], &[(0, 3)]]);
        let mut lag = Lag::new("h", Orientation::Horizontal);
        let ids = SectionFactory::new(AllPolicy)
            .create_sections(&mut lag, &t, Point::default(), false)
            .unwrap();
        assert_eq!(ids.len(), 1);
        assert_eq!(lag.section(ids[0]).unwrap().first_pos(), 1);
        assert_eq!(lag.section(ids[0]).unwrap().run_count(), 2);
    }

    #[test]
    fn test_orientation_mismatch() {
        let t = table(Orientation::Vertical, 4, 4, &[]);
        let mut lag = Lag::new("h", Orientation::Horizontal);
        let result = SectionFactory::new(AllPolicy).create_sections(&mut lag, &t, Point::default(), true);
        assert!(matches!(result, Err(LagError::OrientationMismatch { .. })));
        assert!(lag.runs().is_none());
    }

    #[test]
    fn test_offset_and_include() {
        let t = table(Orientation::Vertical, 3, 5, &[&[(1, 3)], &[(1, 3)]]);
        let mut lag = Lag::new("v", Orientation::Vertical);
        let ids = SectionFactory::new(AllPolicy)
            .create_sections(&mut lag, &t, Point::new(10, 20), true)
            .unwrap();
        let s = lag.section(ids[0]).unwrap();
        assert_eq!(s.bounds(), Rect::new_unchecked(10, 21, 2, 3));
        assert_eq!(lag.runs_offset(), Point::new(10, 20));
        assert_eq!(lag.runs().unwrap().total_run_count(), 2);
    }

    #[test]
    fn test_from_source() {
        let mut img = GrayImage::new(12, 8).unwrap();
        img.fill_rect(&Rect::new_unchecked(2, 2, 3, 4), BLACK);
        img.fill_rect(&Rect::new_unchecked(8, 1, 2, 2), BLACK);
        let mut lag = Lag::new("v", Orientation::Vertical);
        let ids = SectionFactory::new(AllPolicy)
            .create_sections_from_source(
                &mut lag,
                &img,
                Rect::new_unchecked(1, 0, 20, 20),
                &ScanOptions::default(),
            )
            .unwrap();
        assert_eq!(ids.len(), 2);
        let bounds: Vec<Rect> = lag.sections().map(|s| s.bounds()).collect();
        assert_eq!(
            bounds,
            vec![Rect::new_unchecked(2, 2, 3, 4), Rect::new_unchecked(8, 1, 2, 2)]
        );
        assert_eq!(lag.runs_offset(), Point::new(1, 0));
        assert_eq!(lag.lookup_section(9, 2).map(|s| s.id()), Some(ids[1]));
    }

    /// Staggered comb: runs of odd lines straddle two runs of even lines
    fn comb(teeth: i32, height: i32) -> RunTable {
        let mut t = RunTable::new(Orientation::Horizontal, 5 * teeth + 2, height).unwrap();
        for pos in 0..height {
            let runs = (0..teeth)
                .map(|i| {
                    if pos % 2 == 0 {
                        Run::new(5 * i, 3, 0).unwrap()
                    } else {
                        Run::new(5 * i + 2, 4, 0).unwrap()
                    }
                })
                .collect();
            t.set_sequence(pos as usize, runs).unwrap();
        }
        t
    }

    #[test]
    fn test_sweep_visits_stay_linear() {
        let teeth = 1000;
        let t = comb(teeth, 3);
        let mut lag = Lag::new("comb", Orientation::Horizontal);
        let stats = SectionFactory::new(AllPolicy).sweep(&mut lag, &t).unwrap();

        let n = teeth as usize;
        assert_eq!(stats.created.len(), 3 * n);
        assert_eq!(stats.junctions, 4 * n - 2);
        assert!(
            stats.visits <= 8 * t.total_run_count(),
            "{} visits for {} runs",
            stats.visits,
            t.total_run_count()
        );
        assert!(lag.sections().all(|s| s.run_count() == 1));
    }

    #[test]
    fn test_sweep_visits_on_continuous_columns() {
        let mut t = RunTable::new(Orientation::Horizontal, 4000, 4).unwrap();
        for pos in 0..4 {
            let runs = (0..2000).map(|i| Run::new(2 * i, 1, 0).unwrap()).collect();
            t.set_sequence(pos, runs).unwrap();
        }
        let mut lag = Lag::new("columns", Orientation::Horizontal);
        let stats = SectionFactory::new(AllPolicy).sweep(&mut lag, &t).unwrap();
        assert_eq!(stats.created.len(), 2000);
        assert_eq!(stats.junctions, 0);
        assert!(stats.visits <= 8 * t.total_run_count());
        assert!(lag.sections().all(|s| s.weight() == 4));
    }

    #[test]
    fn test_failed_include_leaves_lag_unchanged() {
        let mut img = GrayImage::new(20, 20).unwrap();
        img.fill_rect(&Rect::new_unchecked(2, 2, 4, 4), BLACK);
        img.fill_rect(&Rect::new_unchecked(12, 12, 4, 4), BLACK);
        let factory = SectionFactory::new(AllPolicy);
        let options = ScanOptions::default();
        let mut lag = Lag::new("h", Orientation::Horizontal);
        factory
            .create_sections_from_source(&mut lag, &img, Rect::new_unchecked(0, 0, 10, 10), &options)
            .unwrap();
        assert_eq!(lag.len(), 1);

        // Another offset
        let result = factory.create_sections_from_source(
            &mut lag,
            &img,
            Rect::new_unchecked(10, 10, 10, 10),
            &options,
        );
        assert!(matches!(result, Err(LagError::Core(_))));
        assert_eq!(lag.len(), 1);
        assert!(lag.lookup_section(13, 13).is_none());

        // Same offset, another dimension
        let result =
            factory.create_sections_from_source(&mut lag, &img, Rect::new_unchecked(0, 0, 8, 8), &options);
        assert!(matches!(result, Err(LagError::Run(_))));
        assert_eq!(lag.len(), 1);
        assert_eq!(lag.runs().unwrap().width(), 10);
        assert_eq!(lag.runs().unwrap().total_run_count(), 4);
        assert_eq!(lag.runs_offset(), Point::default());

        // Sections without backing runs are still accepted
        let t = table(Orientation::Horizontal, 4, 1, &[&[(0, 2)]]);
        factory
            .create_sections(&mut lag, &t, Point::new(30, 30), false)
            .unwrap();
        assert_eq!(lag.len(), 2);
    }
}
