//! Sections
//!
//! A [`Section`] is a vertex of a lag: a sequence of runs lying on
//! consecutive scan lines, starting at `first_pos`. Sections are built in
//! the oriented `(coord, pos)` frame of their lag and report their geometry
//! in absolute `(x, y)` pixel space.
//!
//! Derived geometry (bounds, contour polygon, fitted line) is computed on
//! first use and cached until the next mutation. Aggregates (weight,
//! fore-weight, max run length) are maintained eagerly.
//!
//! Junction edges and opposite-orientation links are stored as section ids
//! and are only edited through the owning [`Lag`](crate::Lag).

use crate::error::{LagError, LagResult};
use runlag_core::{
    BLACK, Barycenter, GrayImage, Line, Orientation, Point, PointF, PointsCollector, Polygon,
    Rect, Run,
};

use std::collections::{BTreeSet, VecDeque};
use std::fmt;
use std::sync::OnceLock;

/// Identifier of a section within its lag
///
/// Ids are allocated by the lag starting at 1; 0 marks a section not yet
/// registered in any lag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SectionId(pub u32);

impl SectionId {
    /// Id of an unregistered section
    pub const NONE: SectionId = SectionId(0);

    /// Check whether this id was allocated by a lag
    pub fn is_registered(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Geometry derived from the runs, computed lazily
#[derive(Debug, Clone)]
struct Geometry {
    oriented_bounds: Rect,
    bounds: Rect,
    polygon: Polygon,
    oriented_line: Line,
}

/// A vertex of the section graph
#[derive(Debug, Clone)]
pub struct Section {
    id: SectionId,
    orientation: Orientation,
    first_pos: i32,
    runs: VecDeque<Run>,
    weight: i32,
    fore_weight: i64,
    max_run_length: i32,
    pub(crate) sources: Vec<SectionId>,
    pub(crate) targets: Vec<SectionId>,
    pub(crate) opposites: BTreeSet<SectionId>,
    geometry: OnceLock<Geometry>,
}

impl Section {
    /// Create an unregistered section holding a single run
    ///
    /// # Arguments
    ///
    /// * `orientation` - Orientation of the runs
    /// * `first_pos` - Position of the first run
    /// * `first_run` - The first run
    ///
    /// # Errors
    ///
    /// Returns an error if the run is empty.
    pub fn new(orientation: Orientation, first_pos: i32, first_run: Run) -> LagResult<Self> {
        check_run(&first_run)?;
        let mut section = Section {
            id: SectionId::NONE,
            orientation,
            first_pos,
            runs: VecDeque::new(),
            weight: 0,
            fore_weight: 0,
            max_run_length: 0,
            sources: Vec::new(),
            targets: Vec::new(),
            opposites: BTreeSet::new(),
            geometry: OnceLock::new(),
        };
        section.push_back(first_run);
        Ok(section)
    }

    /// Create an unregistered section from a run sequence
    ///
    /// # Errors
    ///
    /// Returns [`LagError::EmptySection`] if `runs` is empty, or an error
    /// for an empty run.
    pub fn with_runs(orientation: Orientation, first_pos: i32, runs: Vec<Run>) -> LagResult<Self> {
        let mut iter = runs.into_iter();
        let first = iter.next().ok_or(LagError::EmptySection)?;
        let mut section = Section::new(orientation, first_pos, first)?;
        for run in iter {
            section.append(run)?;
        }
        Ok(section)
    }

    // --- Identity and runs ---

    /// Id within the owning lag
    pub fn id(&self) -> SectionId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: SectionId) {
        self.id = id;
    }

    /// Orientation of the runs
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Check for a vertical section
    pub fn is_vertical(&self) -> bool {
        self.orientation.is_vertical()
    }

    /// Position of the first run
    pub fn first_pos(&self) -> i32 {
        self.first_pos
    }

    /// Position of the last run
    pub fn last_pos(&self) -> i32 {
        self.first_pos + self.runs.len() as i32 - 1
    }

    /// Runs, one per position from `first_pos`
    pub fn runs(&self) -> &VecDeque<Run> {
        &self.runs
    }

    /// Iterate over `(position, run)` pairs
    pub fn positioned_runs(&self) -> impl Iterator<Item = (i32, &Run)> + '_ {
        let first = self.first_pos;
        self.runs
            .iter()
            .enumerate()
            .map(move |(i, run)| (first + i as i32, run))
    }

    /// Number of runs
    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    /// First run
    pub fn first_run(&self) -> &Run {
        // A section always holds at least one run
        &self.runs[0]
    }

    /// Last run
    pub fn last_run(&self) -> &Run {
        &self.runs[self.runs.len() - 1]
    }

    /// Run at the given position, if within the section
    pub fn run_at(&self, pos: i32) -> Option<&Run> {
        let index = pos.checked_sub(self.first_pos)?;
        if index < 0 {
            return None;
        }
        self.runs.get(index as usize)
    }

    // --- Mutation ---

    /// Add a run after the last one
    ///
    /// # Errors
    ///
    /// Returns an error if the run is empty.
    pub fn append(&mut self, run: Run) -> LagResult<()> {
        check_run(&run)?;
        self.push_back(run);
        Ok(())
    }

    /// Add a run before the first one, decrementing `first_pos`
    ///
    /// # Errors
    ///
    /// Returns an error if the run is empty.
    pub fn prepend(&mut self, run: Run) -> LagResult<()> {
        check_run(&run)?;
        self.first_pos -= 1;
        self.runs.push_front(run);
        self.include_parameters(&run);
        self.invalidate();
        Ok(())
    }

    /// Absorb the runs of another section
    ///
    /// The other section is expected to lie just after (or just before)
    /// this one; its runs are appended (or prepended) without further
    /// checks. Relations of `other` are not transferred.
    pub fn merge(&mut self, other: &Section) {
        if other.last_pos() + 1 == self.first_pos {
            for run in other.runs.iter().rev() {
                self.runs.push_front(*run);
            }
            self.first_pos = other.first_pos;
        } else {
            self.runs.extend(other.runs.iter().copied());
        }
        self.compute_parameters();
    }

    /// Recompute weight, fore-weight and max run length from the runs
    pub fn compute_parameters(&mut self) {
        self.weight = 0;
        self.fore_weight = 0;
        self.max_run_length = 0;
        let runs = std::mem::take(&mut self.runs);
        for run in &runs {
            self.include_parameters(run);
        }
        self.runs = runs;
        self.invalidate();
    }

    /// Shift the section by an absolute vector
    pub fn translate(&mut self, vector: Point) {
        let oriented = self.orientation.point(vector);
        self.first_pos += oriented.y;
        for run in &mut self.runs {
            run.translate(oriented.x);
        }
        self.invalidate();
    }

    fn push_back(&mut self, run: Run) {
        self.runs.push_back(run);
        self.include_parameters(&run);
        self.invalidate();
    }

    fn include_parameters(&mut self, run: &Run) {
        self.weight += run.length();
        self.fore_weight += run.length() as i64 * run.level() as i64;
        self.max_run_length = self.max_run_length.max(run.length());
    }

    fn invalidate(&mut self) {
        self.geometry = OnceLock::new();
    }

    // --- Aggregates ---

    /// Number of pixels
    pub fn weight(&self) -> i32 {
        self.weight
    }

    /// Sum of run lengths weighted by their gray level
    pub fn fore_weight(&self) -> i64 {
        self.fore_weight
    }

    /// Length of the longest run
    pub fn max_run_length(&self) -> i32 {
        self.max_run_length
    }

    /// Integer mean run length
    pub fn mean_run_length(&self) -> i32 {
        self.weight / self.runs.len() as i32
    }

    /// Mean gray level of the pixels
    pub fn level(&self) -> u8 {
        (self.fore_weight as f64 / self.weight as f64).round() as u8
    }

    // --- Geometry ---

    fn geometry(&self) -> &Geometry {
        self.geometry.get_or_init(|| self.compute_geometry())
    }

    fn compute_geometry(&self) -> Geometry {
        let mut coord_min = i32::MAX;
        let mut coord_max = i32::MIN;
        let mut oriented_line = Line::new();
        for (pos, run) in self.positioned_runs() {
            coord_min = coord_min.min(run.start());
            coord_max = coord_max.max(run.stop());
            for coord in run.start()..=run.stop() {
                oriented_line.include_point(coord as f64, pos as f64);
            }
        }
        let oriented_bounds = Rect::new_unchecked(
            coord_min,
            self.first_pos,
            coord_max - coord_min + 1,
            self.runs.len() as i32,
        );
        Geometry {
            oriented_bounds,
            bounds: self.orientation.rect(oriented_bounds),
            polygon: self.compute_polygon(),
            oriented_line,
        }
    }

    /// Walk the left side of the runs downwards, then their right side
    /// upwards, emitting a vertex at each change of abscissa
    fn compute_polygon(&self) -> Polygon {
        let n = self.runs.len();
        let first = self.first_pos;
        let mut vertices = Vec::with_capacity(4 * n);

        // Left side, top to bottom
        let mut prev: Option<i32> = None;
        for (i, run) in self.runs.iter().enumerate() {
            let x = run.start();
            let y = first + i as i32;
            match prev {
                None => vertices.push(Point::new(x, y)),
                Some(p) if p != x => {
                    vertices.push(Point::new(p, y));
                    vertices.push(Point::new(x, y));
                }
                Some(_) => {}
            }
            prev = Some(x);
        }
        if let Some(p) = prev {
            vertices.push(Point::new(p, first + n as i32));
        }

        // Right side, bottom to top
        let mut prev: Option<i32> = None;
        for (i, run) in self.runs.iter().enumerate().rev() {
            let x = run.stop() + 1;
            let y = first + i as i32 + 1;
            match prev {
                None => vertices.push(Point::new(x, y)),
                Some(p) if p != x => {
                    vertices.push(Point::new(p, y));
                    vertices.push(Point::new(x, y));
                }
                Some(_) => {}
            }
            prev = Some(x);
        }
        if let Some(p) = prev {
            vertices.push(Point::new(p, first));
        }

        let orientation = self.orientation;
        Polygon::new(vertices.into_iter().map(|v| orientation.point(v)).collect())
    }

    /// Bounding rectangle in the oriented frame
    pub fn oriented_bounds(&self) -> Rect {
        self.geometry().oriented_bounds
    }

    /// Absolute bounding rectangle
    pub fn bounds(&self) -> Rect {
        self.geometry().bounds
    }

    /// Absolute contour, vertices on pixel corners
    pub fn polygon(&self) -> &Polygon {
        &self.geometry().polygon
    }

    /// Lowest coordinate of the runs
    pub fn start_coord(&self) -> i32 {
        self.oriented_bounds().x
    }

    /// Highest coordinate of the runs
    pub fn stop_coord(&self) -> i32 {
        let b = self.oriented_bounds();
        b.x + b.w - 1
    }

    /// Extent of the absolute bounds along an orientation
    pub fn length(&self, orientation: Orientation) -> i32 {
        let b = self.bounds();
        match orientation {
            Orientation::Horizontal => b.w,
            Orientation::Vertical => b.h,
        }
    }

    /// Extent of the absolute bounds across an orientation
    pub fn thickness(&self, orientation: Orientation) -> i32 {
        self.length(orientation.opposite())
    }

    /// Ratio of length to thickness along an orientation
    pub fn aspect(&self, orientation: Orientation) -> f64 {
        self.length(orientation) as f64 / self.thickness(orientation) as f64
    }

    /// Weight divided by length along an orientation
    pub fn mean_thickness(&self, orientation: Orientation) -> f64 {
        self.weight as f64 / self.length(orientation) as f64
    }

    /// Length divided by mean thickness along an orientation
    pub fn mean_aspect(&self, orientation: Orientation) -> f64 {
        self.length(orientation) as f64 / self.mean_thickness(orientation)
    }

    /// Centre of the absolute bounds
    pub fn area_center(&self) -> Point {
        self.bounds().center()
    }

    /// Sub-pixel mass centre
    ///
    /// Along the runs, a run of length `l` starting at `s` contributes its
    /// middle `s + l / 2`; across the runs, its position.
    pub fn centroid_f(&self) -> PointF {
        let mut x = 0.0;
        let mut y = 0.0;
        for (pos, run) in self.positioned_runs() {
            let length = run.length() as f64;
            x += length * (2.0 * run.start() as f64 + length);
            y += length * 2.0 * pos as f64;
        }
        let twice = 2.0 * self.weight as f64;
        self.orientation.point_f(PointF::new(x / twice, y / twice))
    }

    /// Mass centre rounded to the nearest pixel
    pub fn centroid(&self) -> Point {
        self.centroid_f().round()
    }

    /// Mass centre of the pixels lying in an absolute rectangle
    ///
    /// Returns `None` when no pixel of the section lies in `roi`.
    pub fn rectangle_centroid(&self, roi: &Rect) -> Option<Point> {
        let mut barycenter = Barycenter::new();
        self.cumulate(&mut barycenter, Some(roi));
        barycenter.center().map(|c| c.round())
    }

    /// Least-squares line through the pixels, in the oriented frame
    pub fn oriented_line(&self) -> Line {
        self.geometry().oriented_line
    }

    /// Least-squares line through the pixels, in absolute space
    pub fn absolute_line(&self) -> Line {
        self.orientation.line(&self.geometry().oriented_line)
    }

    /// Accumulate the section pixels into a barycenter
    ///
    /// Without a rectangle, each run is included once with its length as
    /// weight, at its middle. With an absolute rectangle, each pixel inside
    /// it is included individually.
    pub fn cumulate(&self, barycenter: &mut Barycenter, roi: Option<&Rect>) {
        match roi {
            None => {
                for (pos, run) in self.positioned_runs() {
                    let coord = run.start() as f64 + run.length() as f64 / 2.0;
                    let p = self.orientation.point_f(PointF::new(coord, pos as f64));
                    barycenter.include_weighted(run.length() as f64, p.x, p.y);
                }
            }
            Some(roi) => self.for_each_pixel_in(roi, |x, y| {
                barycenter.include(x as f64, y as f64);
            }),
        }
    }

    /// Accumulate the section pixels into a collector, clipped to the
    /// collector rectangle if any
    pub fn cumulate_points(&self, collector: &mut PointsCollector) {
        match collector.roi() {
            None => {
                for (pos, run) in self.positioned_runs() {
                    for coord in run.start()..=run.stop() {
                        let (x, y) = self.orientation.absolute_xy(coord, pos);
                        collector.include(x, y);
                    }
                }
            }
            Some(roi) => self.for_each_pixel_in(&roi, |x, y| collector.include(x, y)),
        }
    }

    /// Visit the absolute pixels lying inside an absolute rectangle
    fn for_each_pixel_in<F>(&self, roi: &Rect, mut visit: F)
    where
        F: FnMut(i32, i32),
    {
        let o_roi = self.orientation.rect(*roi);
        let pos_max = (self.last_pos()).min(o_roi.bottom() - 1);
        let coord_max = o_roi.right() - 1;

        for (pos, run) in self.positioned_runs() {
            if pos < o_roi.y {
                continue;
            }
            if pos > pos_max {
                break;
            }
            let start = run.start().max(o_roi.x);
            let stop = run.stop().min(coord_max);
            for coord in start..=stop {
                let (x, y) = self.orientation.absolute_xy(coord, pos);
                visit(x, y);
            }
        }
    }

    /// Absolute rectangles of the runs
    pub fn run_rects(&self) -> impl Iterator<Item = Rect> + '_ {
        self.positioned_runs().map(move |(pos, run)| {
            self.orientation
                .rect(Rect::new_unchecked(run.start(), pos, run.length(), 1))
        })
    }

    /// Check whether the section holds the absolute pixel (x, y)
    pub fn contains(&self, x: i32, y: i32) -> bool {
        let (coord, pos) = self.orientation.absolute_xy(x, y);
        self.run_at(pos)
            .is_some_and(|run| coord >= run.start() && coord <= run.stop())
    }

    /// Check whether at least one pixel lies in an absolute rectangle
    pub fn intersects_rect(&self, rect: &Rect) -> bool {
        self.bounds().overlaps(rect) && self.run_rects().any(|r| r.overlaps(rect))
    }

    /// Check whether two sections share at least one pixel
    pub fn intersects_section(&self, other: &Section) -> bool {
        if !self.bounds().overlaps(&other.bounds()) {
            return false;
        }
        self.run_rects()
            .any(|r1| other.run_rects().any(|r2| r1.overlaps(&r2)))
    }

    /// Check whether two sections overlap or are 8-adjacent
    pub fn touches(&self, other: &Section) -> bool {
        let fat = other.bounds().expand(1);
        if !self.bounds().overlaps(&fat) {
            return false;
        }
        self.run_rects()
            .filter(|r1| r1.overlaps(&fat))
            .any(|r1| other.run_rects().any(|r2| r1.touches(&r2)))
    }

    /// Paint the section in black on an image
    ///
    /// `offset` is the absolute location of the image origin; pixels
    /// falling outside the image are ignored.
    pub fn write_to(&self, image: &mut GrayImage, offset: Point) {
        for rect in self.run_rects() {
            image.fill_rect(&rect.translate(-offset.x, -offset.y), BLACK);
        }
    }

    /// Text drawing of the contour, `+` at vertices, `-` and `|` along
    /// the edges, one line per absolute row
    pub fn ascii_drawing(&self) -> String {
        let bounds = self.bounds();
        let polygon = self.polygon();
        let mut table = vec![vec![' '; bounds.w as usize + 1]; bounds.h as usize + 1];

        let vertices = polygon.vertices();
        let mut prev: Option<Point> = None;
        for i in 0..=vertices.len() {
            let v = vertices[i % vertices.len()];
            let (x, y) = ((v.x - bounds.x) as usize, (v.y - bounds.y) as usize);
            if let Some(p) = prev {
                let (px, py) = ((p.x - bounds.x) as usize, (p.y - bounds.y) as usize);
                if x != px {
                    for cell in &mut table[y][x.min(px) + 1..x.max(px)] {
                        *cell = '-';
                    }
                } else {
                    for row in &mut table[y.min(py) + 1..y.max(py)] {
                        row[x] = '|';
                    }
                }
            }
            table[y][x] = '+';
            prev = Some(v);
        }

        let mut out = format!(
            "{}\nxMin={}, xMax={}\nyMin={}, yMax={}\n",
            self,
            bounds.x,
            bounds.right() - 1,
            bounds.y,
            bounds.bottom() - 1
        );
        for (i, row) in table.iter().enumerate() {
            let line: String = row.iter().collect();
            out.push_str(&format!("{}:{}\n", bounds.y + i as i32, line.trim_end()));
        }
        out
    }

    // --- Relations ---

    /// Sections linked by an incoming junction
    pub fn sources(&self) -> &[SectionId] {
        &self.sources
    }

    /// Sections linked by an outgoing junction
    pub fn targets(&self) -> &[SectionId] {
        &self.targets
    }

    /// Number of incoming junctions
    pub fn in_degree(&self) -> usize {
        self.sources.len()
    }

    /// Number of outgoing junctions
    pub fn out_degree(&self) -> usize {
        self.targets.len()
    }

    /// Sections of the opposite orientation linked to this one
    pub fn opposites(&self) -> &BTreeSet<SectionId> {
        &self.opposites
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Section{}{{{} fp={} runs={} w={}}}",
            self.id,
            self.orientation.tag(),
            self.first_pos,
            self.runs.len(),
            self.weight
        )
    }
}

fn check_run(run: &Run) -> LagResult<()> {
    if !run.is_valid() {
        return Err(runlag_core::Error::InvalidRun {
            start: run.start(),
            length: run.length(),
        }
        .into());
    }
    Ok(())
}
