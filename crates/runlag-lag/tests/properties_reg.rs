//! Section graph invariants regression test
//!
//! Sweeps pseudo-random images under every policy and checks that the
//! resulting graphs partition the scanned runs, keep runs on contiguous
//! positions, only link sections forward, and that derived geometry and
//! projections agree with the pixels.

use runlag_core::{BLACK, GrayImage, Orientation, Rect, Run};
use runlag_lag::{
    AllPolicy, DeltaPolicy, JunctionPolicy, Lag, RatioPolicy, Roi, SectionFactory, ShiftPolicy,
};
use runlag_run::{RunTableFactory, ScanOptions};
use runlag_test::RegParams;

/// Simple linear congruential generator for reproducible randomness
struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    fn new(seed: u32) -> Self {
        Self { state: seed as u64 }
    }

    fn next(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.state >> 33
    }

    fn below(&mut self, n: u64) -> i32 {
        (self.next() % n) as i32
    }
}

/// Random rectangles plus scattered pixels
fn random_image(seed: u32) -> GrayImage {
    let mut rng = SimpleRng::new(seed);
    let (w, h) = (48, 36);
    let mut img = GrayImage::new(w, h).unwrap();
    for _ in 0..10 {
        let x = rng.below(w as u64);
        let y = rng.below(h as u64);
        let rw = 1 + rng.below(16);
        let rh = 1 + rng.below(12);
        img.fill_rect(&Rect::new_unchecked(x, y, rw, rh), BLACK);
    }
    for _ in 0..60 {
        let x = rng.below(w as u64);
        let y = rng.below(h as u64);
        img.set_pixel(x, y, BLACK).unwrap();
    }
    img
}

fn check_lag<P: JunctionPolicy>(
    rp: &mut RegParams,
    img: &GrayImage,
    orientation: Orientation,
    policy: P,
    all_policy: bool,
) {
    let options = ScanOptions::default();
    let table = RunTableFactory::new(orientation, options)
        .create_table(img)
        .unwrap();
    let mut lag = Lag::new("random", orientation);
    SectionFactory::new(policy)
        .create_sections(&mut lag, &table, Default::default(), false)
        .unwrap();

    // Partition: the section runs are exactly the scanned runs
    let mut from_sections: Vec<(i32, Run)> = lag
        .sections()
        .flat_map(|s| s.positioned_runs().map(|(pos, run)| (pos, *run)))
        .collect();
    from_sections.sort_by_key(|&(pos, run)| (pos, run.start()));
    let from_table: Vec<(i32, Run)> = table.iter().map(|(pos, run)| (pos as i32, *run)).collect();
    rp.check(from_sections == from_table);

    let mut contiguous = true;
    let mut forward = true;
    let mut geometry = true;
    let mut continuity = true;
    for s in lag.sections() {
        // Consecutive runs of a section always overlap
        let runs = s.runs();
        for i in 1..runs.len() {
            contiguous &= runs[i - 1].overlaps(&runs[i]);
        }
        contiguous &= s.last_pos() == s.first_pos() + runs.len() as i32 - 1;

        for t in s.targets() {
            let target = lag.section(*t).unwrap();
            forward &= s.last_pos() + 1 == target.first_pos();
            forward &= target.sources().contains(&s.id());
            if all_policy {
                continuity &= s.out_degree() >= 2 || target.in_degree() >= 2;
            }
        }

        geometry &= s.polygon().area() == s.weight() as i64;
        geometry &= s.polygon().bounds() == s.bounds();
        let b = s.bounds();
        for y in b.y..b.bottom() {
            for x in b.x..b.right() {
                geometry &= s.polygon().contains_pixel(x, y) == s.contains(x, y);
            }
        }
    }
    rp.check(contiguous);
    rp.check(forward);
    rp.check(geometry);
    rp.check(continuity);

    // Every foreground pixel belongs to exactly one section
    let mut lookup = true;
    for y in 0..img.height() {
        for x in 0..img.width() {
            let owners = lag.sections().filter(|s| s.contains(x, y)).count();
            let expected = usize::from(table.is_foreground(x, y));
            lookup &= owners == expected;
            lookup &= lag.lookup_section(x, y).is_some() == (expected == 1);
        }
    }
    rp.check(lookup);

    // Projections over the whole image conserve the weight
    let roi = Roi::new(img.bounds());
    for projection in Orientation::ALL {
        let histo = roi.section_histogram(projection, lag.sections());
        rp.compare_values(table.weight() as f64, histo.total_count() as f64, 0.0);
        let runs_histo = roi.run_histogram(projection, &table);
        rp.check(runs_histo == histo);
    }
}

#[test]
fn properties_reg() {
    let mut rp = RegParams::new("properties");

    for seed in [1, 7, 42, 2024] {
        let img = random_image(seed);
        for orientation in Orientation::ALL {
            check_lag(&mut rp, &img, orientation, AllPolicy, true);
            check_lag(&mut rp, &img, orientation, DeltaPolicy::new(1), false);
            check_lag(&mut rp, &img, orientation, ShiftPolicy::new(2), false);
            check_lag(&mut rp, &img, orientation, RatioPolicy::new(1.5), false);
        }
    }

    assert!(rp.cleanup(), "properties regression test failed");
}

#[test]
fn orientation_involution_reg() {
    let mut rp = RegParams::new("orientation");
    let mut rng = SimpleRng::new(5);
    let mut involutive = true;
    for _ in 0..200 {
        let r = Rect::new_unchecked(
            rng.below(100) - 50,
            rng.below(100) - 50,
            rng.below(30),
            rng.below(30),
        );
        for o in Orientation::ALL {
            involutive &= o.rect(o.rect(r)) == r;
            involutive &= o.point(o.point(r.location())) == r.location();
        }
    }
    rp.check(involutive);
    assert!(rp.cleanup(), "orientation regression test failed");
}
