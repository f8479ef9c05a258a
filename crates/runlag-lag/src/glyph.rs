//! Compounds of sections

use crate::section::Section;
use crate::sections;
use runlag_core::{Point, Rect};

/// A borrowed set of sections, possibly of both orientations, forming
/// one shape
#[derive(Debug, Clone, Default)]
pub struct Glyph<'a> {
    members: Vec<&'a Section>,
}

impl<'a> Glyph<'a> {
    /// Create a glyph from its member sections
    pub fn new(members: Vec<&'a Section>) -> Self {
        Self { members }
    }

    /// Add a member section
    pub fn add(&mut self, section: &'a Section) {
        self.members.push(section);
    }

    /// Member sections
    pub fn members(&self) -> &[&'a Section] {
        &self.members
    }

    /// Number of member sections
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check whether the glyph has no member
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Absolute bounds, `None` for an empty glyph
    pub fn bounds(&self) -> Option<Rect> {
        sections::bounds_of(self.members.iter().copied())
    }

    /// Total number of pixels
    pub fn weight(&self) -> i64 {
        sections::weight_of(self.members.iter().copied())
    }

    /// Mass centre, `None` for an empty glyph
    pub fn centroid(&self) -> Option<Point> {
        sections::centroid_of(self.members.iter().copied())
    }

    /// Check whether a member holds the absolute pixel (x, y)
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.members.iter().any(|s| s.contains(x, y))
    }
}

impl<'a> FromIterator<&'a Section> for Glyph<'a> {
    fn from_iter<I: IntoIterator<Item = &'a Section>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
