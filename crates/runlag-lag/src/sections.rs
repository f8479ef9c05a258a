//! Utilities over collections of sections

use crate::section::{Section, SectionId};
use runlag_core::{Barycenter, Point, Rect};

use std::cmp::Ordering;

/// Union of the absolute bounds, or `None` for no section
pub fn bounds_of<'a, I>(sections: I) -> Option<Rect>
where
    I: IntoIterator<Item = &'a Section>,
{
    sections
        .into_iter()
        .map(Section::bounds)
        .reduce(|acc, b| acc.union(&b))
}

/// Total number of pixels
pub fn weight_of<'a, I>(sections: I) -> i64
where
    I: IntoIterator<Item = &'a Section>,
{
    sections.into_iter().map(|s| s.weight() as i64).sum()
}

/// Mass centre of all pixels, or `None` for no pixel
pub fn centroid_of<'a, I>(sections: I) -> Option<Point>
where
    I: IntoIterator<Item = &'a Section>,
{
    let mut barycenter = Barycenter::new();
    for section in sections {
        section.cumulate(&mut barycenter, None);
    }
    barycenter.center().map(|c| c.round())
}

/// Order by first position, then by start coordinate
pub fn by_position(a: &Section, b: &Section) -> Ordering {
    a.first_pos()
        .cmp(&b.first_pos())
        .then_with(|| a.start_coord().cmp(&b.start_coord()))
}

/// Order by start coordinate, then by first position
pub fn by_coordinate(a: &Section, b: &Section) -> Ordering {
    a.start_coord()
        .cmp(&b.start_coord())
        .then_with(|| a.first_pos().cmp(&b.first_pos()))
}

/// Sort sections by first position
pub fn sort_by_position(sections: &mut [&Section]) {
    sections.sort_by(|a, b| by_position(a, b));
}

/// Sort sections by start coordinate
pub fn sort_by_coordinate(sections: &mut [&Section]) {
    sections.sort_by(|a, b| by_coordinate(a, b));
}

/// Compact text listing of ids, e.g. `[#1 #4 #7]`
pub fn ids_to_string<I>(ids: I) -> String
where
    I: IntoIterator<Item = SectionId>,
{
    let ids: Vec<String> = ids.into_iter().map(|id| id.to_string()).collect();
    format!("[{}]", ids.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use runlag_core::{Orientation, Run};

    fn section(orientation: Orientation, first_pos: i32, start: i32, length: i32) -> Section {
        Section::new(orientation, first_pos, Run::new(start, length, 0).unwrap()).unwrap()
    }

    #[test]
    fn test_aggregates() {
        let a = section(Orientation::Horizontal, 0, 0, 4);
        let b = section(Orientation::Vertical, 6, 2, 2);
        let all = [&a, &b];
        assert_eq!(bounds_of(all), Some(Rect::new_unchecked(0, 0, 7, 4)));
        assert_eq!(weight_of(all), 6);
        // (2, 0) weighs 4, (6, 3) weighs 2
        assert_eq!(centroid_of(all), Some(Point::new(3, 1)));
        assert_eq!(bounds_of(std::iter::empty()), None);
        assert_eq!(centroid_of(std::iter::empty()), None);
    }

    #[test]
    fn test_sorting() {
        let a = section(Orientation::Horizontal, 3, 0, 2);
        let b = section(Orientation::Horizontal, 1, 5, 2);
        let c = section(Orientation::Horizontal, 1, 2, 2);
        let mut list = vec![&a, &b, &c];
        sort_by_position(&mut list);
        assert_eq!(
            list.iter().map(|s| (s.first_pos(), s.start_coord())).collect::<Vec<_>>(),
            vec![(1, 2), (1, 5), (3, 0)]
        );
        sort_by_coordinate(&mut list);
        assert_eq!(
            list.iter().map(|s| s.start_coord()).collect::<Vec<_>>(),
            vec![0, 2, 5]
        );
    }

    #[test]
    fn test_ids_to_string() {
        assert_eq!(ids_to_string([SectionId(1), SectionId(4)]), "[#1 #4]");
        assert_eq!(ids_to_string(Vec::new()), "[]");
    }
}
