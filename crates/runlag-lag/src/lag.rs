//! Lag: directed graph of sections
//!
//! The lag owns its sections in an arena indexed by [`SectionId`]. Junction
//! edges are stored on both ends as id lists, so removing a section only
//! needs to filter the lists of its neighbours.

use crate::error::{LagError, LagResult};
use crate::section::{Section, SectionId};
use runlag_core::{Orientation, Point, Rect, Run};
use runlag_run::RunTable;

use std::fmt;

/// Graph of sections of one orientation, with optional backing runs
#[derive(Debug, Clone)]
pub struct Lag {
    name: String,
    orientation: Orientation,
    vertices: Vec<Option<Section>>,
    count: usize,
    runs: Option<RunTable>,
    runs_offset: Point,
}

impl Lag {
    /// Create an empty lag
    ///
    /// # Arguments
    ///
    /// * `name` - Name used in logs and display
    /// * `orientation` - Orientation shared by every section
    pub fn new(name: impl Into<String>, orientation: Orientation) -> Self {
        Self {
            name: name.into(),
            orientation,
            vertices: Vec::new(),
            count: 0,
            runs: None,
            runs_offset: Point::default(),
        }
    }

    /// Name of the lag
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Orientation of the sections
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Number of sections
    pub fn len(&self) -> usize {
        self.count
    }

    /// Check whether the lag has no section
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    // --- Vertices ---

    /// Create and register a section holding one run
    ///
    /// # Errors
    ///
    /// Returns an error if the run is empty.
    pub fn create_section(&mut self, first_pos: i32, first_run: Run) -> LagResult<SectionId> {
        let section = Section::new(self.orientation, first_pos, first_run)?;
        Ok(self.register(section))
    }

    /// Register an existing section, assigning it a fresh id
    ///
    /// Relations the section may carry from another lag are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`LagError::OrientationMismatch`] if the section orientation
    /// differs from the lag orientation.
    pub fn add_section(&mut self, mut section: Section) -> LagResult<SectionId> {
        if section.orientation() != self.orientation {
            return Err(LagError::OrientationMismatch {
                expected: self.orientation,
                actual: section.orientation(),
            });
        }
        section.sources.clear();
        section.targets.clear();
        section.opposites.clear();
        Ok(self.register(section))
    }

    fn register(&mut self, mut section: Section) -> SectionId {
        let id = SectionId(self.vertices.len() as u32 + 1);
        section.set_id(id);
        self.vertices.push(Some(section));
        self.count += 1;
        id
    }

    fn slot(id: SectionId) -> Option<usize> {
        (id.0 as usize).checked_sub(1)
    }

    /// Section with the given id
    pub fn section(&self, id: SectionId) -> Option<&Section> {
        self.vertices.get(Self::slot(id)?)?.as_ref()
    }

    /// Mutable section with the given id
    ///
    /// Extending a section through this reference does not re-check its
    /// junctions.
    pub fn section_mut(&mut self, id: SectionId) -> Option<&mut Section> {
        self.vertices.get_mut(Self::slot(id)?)?.as_mut()
    }

    fn vertex(&self, id: SectionId) -> LagResult<&Section> {
        self.section(id).ok_or(LagError::UnknownSection(id))
    }

    fn vertex_mut(&mut self, id: SectionId) -> LagResult<&mut Section> {
        self.section_mut(id).ok_or(LagError::UnknownSection(id))
    }

    /// Iterate over the sections in id order
    pub fn sections(&self) -> impl Iterator<Item = &Section> + '_ {
        self.vertices.iter().flatten()
    }

    /// Iterate over the section ids in increasing order
    pub fn ids(&self) -> impl Iterator<Item = SectionId> + '_ {
        self.sections().map(Section::id)
    }

    /// Remove a section and every junction touching it
    ///
    /// Removing an unknown id is a no-op returning `None`. The backing runs
    /// are left untouched; see [`Lag::purge_sections`].
    pub fn remove_section(&mut self, id: SectionId) -> Option<Section> {
        let mut section = self.vertices.get_mut(Self::slot(id)?)?.take()?;
        self.count -= 1;

        for source in std::mem::take(&mut section.sources) {
            if let Some(s) = self.section_mut(source) {
                s.targets.retain(|&t| t != id);
            }
        }
        for target in std::mem::take(&mut section.targets) {
            if let Some(t) = self.section_mut(target) {
                t.sources.retain(|&s| s != id);
            }
        }
        Some(section)
    }

    // --- Edges ---

    /// Link two sections by a junction
    ///
    /// Adding an existing junction again has no effect.
    ///
    /// # Errors
    ///
    /// Returns an error if either section is unknown, or if `source` does
    /// not end before `target` starts.
    pub fn add_junction(&mut self, source: SectionId, target: SectionId) -> LagResult<()> {
        let src = self.vertex(source)?;
        let tgt = self.vertex(target)?;
        if src.last_pos() >= tgt.first_pos() {
            return Err(LagError::InvalidJunction {
                source_id: source,
                target_id: target,
                reason: format!(
                    "source ends at {} but target starts at {}",
                    src.last_pos(),
                    tgt.first_pos()
                ),
            });
        }
        if src.targets.contains(&target) {
            return Ok(());
        }
        self.vertex_mut(source)?.targets.push(target);
        self.vertex_mut(target)?.sources.push(source);
        Ok(())
    }

    /// Remove the junction from `source` to `target`
    ///
    /// # Returns
    ///
    /// `true` if the junction existed.
    pub fn remove_junction(&mut self, source: SectionId, target: SectionId) -> bool {
        let Some(src) = self.section_mut(source) else {
            return false;
        };
        let before = src.targets.len();
        src.targets.retain(|&t| t != target);
        if src.targets.len() == before {
            return false;
        }
        if let Some(tgt) = self.section_mut(target) {
            tgt.sources.retain(|&s| s != source);
        }
        true
    }

    /// Merge a section into another one lying right before or after it
    ///
    /// The runs of `absorbed` are moved into `keep` and `absorbed` is
    /// removed. Junctions of both sections are rewired to `keep`; those no
    /// longer pointing forward in position order are dropped. Opposite
    /// links of `absorbed` are carried over to `keep`.
    ///
    /// # Errors
    ///
    /// Returns an error if either section is unknown, if they are the same
    /// section, or if they are not on contiguous positions.
    pub fn merge_sections(&mut self, keep: SectionId, absorbed: SectionId) -> LagResult<()> {
        let k = self.vertex(keep)?;
        let a = self.vertex(absorbed)?;
        if keep == absorbed
            || (a.first_pos() != k.last_pos() + 1 && a.last_pos() + 1 != k.first_pos())
        {
            return Err(runlag_core::Error::InvalidParameter(format!(
                "cannot merge {} into {}: sections are not contiguous",
                absorbed, keep
            ))
            .into());
        }

        let mut sources = k.sources.clone();
        let mut targets = k.targets.clone();
        for &s in a.sources() {
            sources.push(s);
        }
        for &t in a.targets() {
            targets.push(t);
        }

        // Detach both sections, then relink the merged one
        let removed = self
            .remove_section(absorbed)
            .ok_or(LagError::UnknownSection(absorbed))?;
        for s in &sources {
            self.remove_junction(*s, keep);
        }
        for t in &targets {
            self.remove_junction(keep, *t);
        }

        let merged = self.vertex_mut(keep)?;
        merged.merge(&removed);
        merged.opposites.extend(removed.opposites.iter().copied());

        for s in sources {
            if s != keep && s != absorbed && self.section(s).is_some() {
                self.relink(s, keep)?;
            }
        }
        for t in targets {
            if t != keep && t != absorbed && self.section(t).is_some() {
                self.relink(keep, t)?;
            }
        }
        Ok(())
    }

    /// Add a junction unless it would point backward
    fn relink(&mut self, source: SectionId, target: SectionId) -> LagResult<()> {
        match self.add_junction(source, target) {
            Ok(()) => Ok(()),
            Err(LagError::InvalidJunction { reason, .. }) => {
                log::debug!("Dropping junction {} -> {}: {}", source, target, reason);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Link two sections of lags with opposite orientations
    ///
    /// # Errors
    ///
    /// Returns an error if the lags do not have opposite orientations or if
    /// a section is unknown.
    pub fn link_opposite(
        first: &mut Lag,
        first_id: SectionId,
        second: &mut Lag,
        second_id: SectionId,
    ) -> LagResult<()> {
        if second.orientation != first.orientation.opposite() {
            return Err(LagError::OrientationMismatch {
                expected: first.orientation.opposite(),
                actual: second.orientation,
            });
        }
        second.vertex(second_id)?;
        first.vertex_mut(first_id)?.opposites.insert(second_id);
        second.vertex_mut(second_id)?.opposites.insert(first_id);
        Ok(())
    }

    // --- Lookups ---

    /// Section holding the absolute pixel (x, y)
    pub fn lookup_section(&self, x: i32, y: i32) -> Option<&Section> {
        self.sections().find(|s| s.contains(x, y))
    }

    /// Sections whose bounds intersect an absolute rectangle
    pub fn sections_in(&self, rect: &Rect) -> Vec<&Section> {
        self.sections().filter(|s| s.bounds().overlaps(rect)).collect()
    }

    /// Sections having at least one pixel in an absolute rectangle
    pub fn lookup_intersected_sections(&self, rect: &Rect) -> Vec<&Section> {
        self.sections().filter(|s| s.intersects_rect(rect)).collect()
    }

    /// Fraction of the first run of a section covered by the last runs of
    /// its sources
    ///
    /// # Errors
    ///
    /// Returns an error if the section is unknown.
    pub fn first_adjacency(&self, id: SectionId) -> LagResult<f64> {
        let section = self.vertex(id)?;
        let run = section.first_run();
        let covered: i32 = section
            .sources()
            .iter()
            .filter_map(|&s| self.section(s))
            .map(|s| run.common_length(s.last_run()))
            .sum();
        Ok(covered as f64 / run.length() as f64)
    }

    /// Fraction of the last run of a section covered by the first runs of
    /// its targets
    ///
    /// # Errors
    ///
    /// Returns an error if the section is unknown.
    pub fn last_adjacency(&self, id: SectionId) -> LagResult<f64> {
        let section = self.vertex(id)?;
        let run = section.last_run();
        let covered: i32 = section
            .targets()
            .iter()
            .filter_map(|&t| self.section(t))
            .map(|t| run.common_length(t.first_run()))
            .sum();
        Ok(covered as f64 / run.length() as f64)
    }

    // --- Backing runs ---

    /// Add a run table to the backing storage
    ///
    /// `offset` is the absolute location of the table origin. The first
    /// table sets the storage offset; later tables must share it.
    ///
    /// # Errors
    ///
    /// Returns an error on orientation mismatch, on a different offset, or
    /// if the tables differ in dimension.
    pub fn include_runs(&mut self, table: &RunTable, offset: Point) -> LagResult<()> {
        self.check_runs(table, offset)?;
        match &mut self.runs {
            None => {
                self.runs = Some(table.clone());
                self.runs_offset = offset;
            }
            Some(runs) => runs.include(table)?,
        }
        Ok(())
    }

    /// Check that a run table could be added to the backing storage
    ///
    /// # Errors
    ///
    /// Same as [`Lag::include_runs`]; the lag is left untouched.
    pub fn check_runs(&self, table: &RunTable, offset: Point) -> LagResult<()> {
        if table.orientation() != self.orientation {
            return Err(LagError::OrientationMismatch {
                expected: self.orientation,
                actual: table.orientation(),
            });
        }
        if let Some(runs) = &self.runs {
            if offset != self.runs_offset {
                return Err(runlag_core::Error::InvalidParameter(format!(
                    "run table offset {} differs from lag offset {}",
                    offset, self.runs_offset
                ))
                .into());
            }
            runs.check_compatible(table)?;
        }
        Ok(())
    }

    /// Backing runs, if any
    pub fn runs(&self) -> Option<&RunTable> {
        self.runs.as_ref()
    }

    /// Absolute location of the backing table origin
    pub fn runs_offset(&self) -> Point {
        self.runs_offset
    }

    /// Remove every section matching a predicate
    ///
    /// Matching sections are collected first, then removed with their
    /// junctions. Their runs are also removed from the backing storage.
    ///
    /// # Returns
    ///
    /// The removed sections.
    pub fn purge_sections<F>(&mut self, mut predicate: F) -> Vec<Section>
    where
        F: FnMut(&Section) -> bool,
    {
        let doomed: Vec<SectionId> = self
            .sections()
            .filter(|s| predicate(s))
            .map(Section::id)
            .collect();

        let mut purged = Vec::with_capacity(doomed.len());
        for id in doomed {
            if let Some(section) = self.remove_section(id) {
                self.strip_runs(&section);
                purged.push(section);
            }
        }

        log::debug!("{}: purged {} sections", self.name, purged.len());
        purged
    }

    fn strip_runs(&mut self, section: &Section) {
        let Some(table) = self.runs.as_mut() else {
            return;
        };
        let offset = self.orientation.point(self.runs_offset);
        for (pos, run) in section.positioned_runs() {
            let index = pos - offset.y;
            let local = run.translated(-offset.x);
            let removed = usize::try_from(index)
                .map_err(|_| format!("position {} before table", pos))
                .and_then(|i| table.remove_run(i, &local).map_err(|e| e.to_string()));
            if let Err(reason) = removed {
                log::warn!("{}: {} of {} not stripped: {}", self.name, run, section, reason);
            }
        }
    }
}

impl fmt::Display for Lag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lag{{{} {} sections={}}}",
            self.name,
            self.orientation.tag(),
            self.count
        )
    }
}
