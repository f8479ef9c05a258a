//! Section regression test
//!
//! Geometry, drawing, projections, persistence and purge of the sections
//! of a small note image (head, stem and a detached flag).

use runlag_core::{Orientation, Point, Rect};
use runlag_lag::{AllPolicy, Glyph, Lag, Roi, Section, SectionFactory, SectionId, sections};
use runlag_run::ScanOptions;
use runlag_test::{RegParams, load_test_image};

fn build(orientation: Orientation) -> Lag {
    let note = load_test_image("note.pbm").expect("load note.pbm");
    let mut lag = Lag::new("note", orientation);
    SectionFactory::new(AllPolicy)
        .create_sections_from_source(&mut lag, &note, note.bounds(), &ScanOptions::default())
        .unwrap();
    lag
}

#[test]
fn section_geometry_reg() {
    let mut rp = RegParams::new("section_geometry");
    let lag = build(Orientation::Horizontal);
    let head = lag.section(SectionId(1)).unwrap();

    // --- Bounds and measures ---
    rp.check(head.bounds() == Rect::new_unchecked(3, 0, 8, 11));
    rp.compare_values(31.0, head.weight() as f64, 0.0);
    rp.compare_values(7.0, head.max_run_length() as f64, 0.0);
    rp.compare_values(2.0, head.mean_run_length() as f64, 0.0);
    rp.compare_values(8.0, head.length(Orientation::Horizontal) as f64, 0.0);
    rp.compare_values(11.0, head.thickness(Orientation::Horizontal) as f64, 0.0);
    rp.compare_values(8.0 / 11.0, head.aspect(Orientation::Horizontal), 1e-9);
    rp.compare_values(31.0 / 11.0, head.mean_thickness(Orientation::Vertical), 1e-9);

    // --- Centroids ---
    let c = head.centroid_f();
    rp.compare_values(449.0 / 62.0, c.x, 1e-9);
    rp.compare_values(214.0 / 31.0, c.y, 1e-9);
    rp.check(head.centroid() == Point::new(7, 7));
    let stem = Rect::new_unchecked(9, 0, 2, 7);
    rp.check(head.rectangle_centroid(&stem) == Some(Point::new(9, 3)));

    // --- Contour ---
    let polygon = head.polygon();
    rp.compare_values(18.0, polygon.len() as f64, 0.0);
    rp.compare_values(31.0, polygon.area() as f64, 0.0);

    let expected = "Section#1{H fp=0 runs=11 w=31}\n\
                    xMin=3, xMax=10\n\
                    yMin=0, yMax=10\n\
                    0:      ++\n\
                    1:      |++\n\
                    2:      |++\n\
                    3:      ||\n\
                    4:      ||\n\
                    5:      ||\n\
                    6:      ||\n\
                    7: +----+|\n\
                    8:++     |\n\
                    9:|     ++\n\
                    10:++   ++\n\
                    11: +---+\n";
    rp.compare_strings(expected.as_bytes(), head.ascii_drawing().as_bytes());

    let flag_section = lag.section(SectionId(2)).unwrap();
    let expected = "Section#2{H fp=2 runs=2 w=2}\n\
                    xMin=11, xMax=11\n\
                    yMin=2, yMax=3\n\
                    2:++\n\
                    3:||\n\
                    4:++\n";
    rp.compare_strings(expected.as_bytes(), flag_section.ascii_drawing().as_bytes());

    // --- Relations between the two sections ---
    rp.check(head.touches(flag_section));
    rp.check(!head.intersects_section(flag_section));

    assert!(rp.cleanup(), "section_geometry regression test failed");
}

#[test]
fn section_projection_reg() {
    let mut rp = RegParams::new("section_projection");
    let hlag = build(Orientation::Horizontal);
    let vlag = build(Orientation::Vertical);
    let roi = Roi::new(Rect::new_unchecked(0, 0, 12, 12));

    // Row profile: the head rows dominate
    let rows = roi.section_histogram(Orientation::Horizontal, hlag.sections());
    rp.compare_values(33.0, rows.total_count() as f64, 0.0);
    let peaks = rows.peaks(5);
    rp.compare_values(1.0, peaks.len() as f64, 0.0);
    rp.compare_values(7.0, peaks[0].first as f64, 0.0);
    rp.compare_values(8.0, peaks[0].best as f64, 0.0);
    rp.compare_values(9.0, peaks[0].last as f64, 0.0);
    let maxima = rows.local_maxima();
    rp.compare_values(2.0, maxima.len() as f64, 0.0);
    rp.compare_values(8.0, maxima[0].bucket as f64, 0.0);

    // Same profile from vertical sections, counted across the runs
    let across = roi.section_histogram(Orientation::Horizontal, vlag.sections());
    rp.check(across == rows);

    // Column profile: the stem column
    let cols = roi.section_histogram(Orientation::Vertical, vlag.sections());
    rp.compare_values(9.0, cols.max_count() as f64, 0.0);
    rp.compare_values(9.0, cols.max_bucket().unwrap_or(-1) as f64, 0.0);

    // --- Glyph of the vertical sections ---
    let glyph: Glyph<'_> = vlag.sections().collect();
    rp.compare_values(33.0, glyph.weight() as f64, 0.0);
    rp.check(glyph.bounds() == Some(Rect::new_unchecked(3, 0, 9, 11)));
    rp.check(glyph.centroid() == Some(Point::new(7, 7)));
    let glyph_cols = roi.glyph_histogram(Orientation::Vertical, &glyph);
    rp.check(glyph_cols == cols);

    let ids = sections::ids_to_string(vlag.ids());
    rp.compare_strings(b"[#1 #2]", ids.as_bytes());

    assert!(rp.cleanup(), "section_projection regression test failed");
}

#[test]
fn section_persistence_reg() {
    let mut rp = RegParams::new("section_persistence");
    let mut lag = build(Orientation::Horizontal);

    // --- Text round trip ---
    let mut buf = Vec::new();
    runlag_lag::write_sections(&mut buf, lag.sections()).unwrap();
    let restored = runlag_lag::read_sections(&buf).unwrap();
    rp.compare_values(2.0, restored.len() as f64, 0.0);
    let mut same = true;
    for (a, b) in lag.sections().zip(&restored) {
        same &= a.first_pos() == b.first_pos();
        same &= a.runs() == b.runs();
        same &= a.bounds() == b.bounds();
    }
    rp.check(same);

    // Restored sections register again with fresh ids
    let mut copy = Lag::new("copy", Orientation::Horizontal);
    for section in restored {
        copy.add_section(section).unwrap();
    }
    rp.compare_values(2.0, copy.len() as f64, 0.0);
    let vertical = Section::read_from_bytes(
        b"Section Version 1\nOrientation = V, first-pos = 0, Number of runs = 1\n  Run[0]: start = 0, length = 1, level = 0\n",
    )
    .unwrap();
    rp.check(copy.add_section(vertical).is_err());

    // --- Purge the small flag, its runs leave the backing table ---
    let before = lag.runs().unwrap().total_run_count();
    rp.compare_values(13.0, before as f64, 0.0);
    let purged = lag.purge_sections(|s| s.weight() < 3);
    rp.compare_values(1.0, purged.len() as f64, 0.0);
    rp.compare_values(1.0, lag.len() as f64, 0.0);
    rp.compare_values(11.0, lag.runs().unwrap().total_run_count() as f64, 0.0);
    rp.check(lag.lookup_section(11, 2).is_none());
    rp.check(!lag.runs().unwrap().is_foreground(11, 2));
    rp.check(lag.lookup_section(9, 5).is_some());

    assert!(rp.cleanup(), "section_persistence regression test failed");
}
