//! End-to-end properties of the field engine: grid-vs-reference neighbor
//! search, connection thresholds, ramp-up, worker lifecycle, trail paths.

use std::time::Duration;

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use plexus::spatial::{brute_force_pairs, CellGrid};
use plexus::worker;
use plexus::{Field, FieldConfig, FieldWorker, Theme, TrailConfig, TrailField};

fn random_positions(seed: u64, n: usize, width: f32, height: f32) -> Vec<Vec2> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| Vec2::new(rng.gen::<f32>() * width, rng.gen::<f32>() * height))
        .collect()
}

#[test]
fn test_grid_matches_brute_force_on_random_placements() {
    for seed in [1, 7, 42] {
        for n in [0, 1, 50, 200, 500] {
            let positions = random_positions(seed, n, 1000.0, 1100.0);
            let mut grid = CellGrid::new(1000.0, 1100.0, 145.0);
            grid.rebuild(&positions);

            let mut from_grid = grid.pairs(&positions);
            let mut reference = brute_force_pairs(&positions, 145.0);
            from_grid.sort_unstable();
            reference.sort_unstable();
            assert_eq!(
                from_grid, reference,
                "grid disagrees with reference (seed {}, n {})",
                seed, n
            );
        }
    }
}

#[test]
fn test_grid_pairs_ordered_and_unique_on_random_placements() {
    let positions = random_positions(3, 300, 1440.0, 900.0);
    let mut grid = CellGrid::new(1440.0, 900.0, 221.0);
    grid.rebuild(&positions);

    let pairs = grid.pairs(&positions);
    let mut seen = std::collections::HashSet::new();
    for &(a, b) in &pairs {
        assert!(a < b, "unordered pair ({}, {})", a, b);
        assert!(seen.insert((a, b)), "duplicate pair ({}, {})", a, b);
    }
}

#[test]
fn test_connection_distance_boundary() {
    let cfg = FieldConfig::logo(1280.0);
    let distance = cfg.line_distance;
    let mut field = Field::with_seed(cfg, 1).unwrap();

    field.place(&[
        Vec2::new(400.0, 500.0),
        Vec2::new(400.0 + distance - 0.01, 500.0),
    ]);
    assert_eq!(field.connected_pairs(), vec![(0, 1)]);

    field.place(&[
        Vec2::new(400.0, 500.0),
        Vec2::new(400.0 + distance + 0.01, 500.0),
    ]);
    assert!(field.connected_pairs().is_empty());
}

#[test]
fn test_ramp_is_monotone_and_reaches_target() {
    let mut field = Field::with_seed(FieldConfig::logo(1280.0), 5).unwrap();
    let mut last = 0;
    let mut ticks_to_full = None;
    for tick in 0..400 {
        field.step(1.0 / 60.0);
        let n = field.population();
        assert!(n >= last, "population shrank at tick {}", tick);
        assert!(n <= 500);
        if n == 500 && ticks_to_full.is_none() {
            ticks_to_full = Some(tick);
        }
        last = n;
    }
    // 3 second ramp at 60 fps.
    let full = ticks_to_full.expect("never reached target");
    assert!((175..=185).contains(&full), "full at tick {}", full);
}

#[test]
fn test_zero_target_field_stays_empty() {
    // The logo preset is empty below the mobile breakpoint.
    let cfg = FieldConfig::logo(400.0);
    assert_eq!(cfg.particle_count, 0);
    let mut field = Field::with_seed(cfg, 2).unwrap();
    for _ in 0..300 {
        field.step(1.0 / 60.0);
        let frame = field.frame();
        assert!(frame.points.is_empty());
        assert!(frame.bins.iter().all(|b| b.segments.is_empty()));
    }
}

#[test]
fn test_repeated_restarts_leave_one_worker() {
    let mut cfg = FieldConfig::background(1440.0, 900.0);
    cfg.ramp = Duration::from_millis(10);

    let mut slot: Option<FieldWorker> = None;
    for _ in 0..6 {
        slot = Some(FieldWorker::spawn(cfg.clone(), Duration::from_millis(2)).unwrap());
    }
    let current = slot.take().unwrap();
    std::thread::sleep(Duration::from_millis(20));
    assert!(current.is_running());
    assert_eq!(worker::live_count(), 1);
    current.set_theme(Theme::Light);

    drop(current);
    assert_eq!(worker::live_count(), 0);
}

#[test]
fn test_trail_frame_strips_never_bridge_a_wrap() {
    let cfg = TrailConfig::new(800.0, 600.0);
    let jump = cfg.jump_distance();
    let mut field = TrailField::with_seed(cfg, 13).unwrap();

    for _ in 0..2000 {
        field.step(1.0 / 60.0);
    }
    let frame = field.frame();
    assert!(!frame.strips.is_empty());
    for strip in &frame.strips {
        assert!(strip.points.len() >= 2);
        for pair in strip.points.windows(2) {
            assert!(
                (pair[0] - pair[1]).length() <= jump,
                "strip bridges a wrap discontinuity"
            );
        }
    }
}

#[test]
fn test_theme_toggle_keeps_running_field() {
    let mut field = Field::with_seed(FieldConfig::background(1440.0, 900.0), 8).unwrap();
    for _ in 0..300 {
        field.step(1.0 / 60.0);
    }
    let population = field.population();
    let dark = field.frame();

    field.set_theme(Theme::Light);
    field.step(1.0 / 60.0);
    let light = field.frame();

    assert_eq!(field.population(), population);
    assert_eq!(dark.rgb, [1.0, 1.0, 1.0]);
    assert_eq!(light.rgb, [0.0, 0.0, 0.0]);
    assert_eq!(dark.points.len(), light.points.len());
}
