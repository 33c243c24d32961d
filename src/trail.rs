//! Trails: moving points with a fading multi-segment history.
//!
//! Unlike bare particles, trails steer by heading and angular velocity,
//! wrap at the edges instead of bouncing, and keep a bounded FIFO history
//! of recent positions that is rendered as a polyline. A wrap teleports
//! the head across the field; the resulting implausible gap in the history
//! is detected at draw time and the path is broken there instead of drawn
//! as a long streak.

use std::collections::VecDeque;
use std::f32::consts::{PI, TAU};

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{
    TrailConfig, Theme, POINTER_INFLUENCE_DIST_SQ, POINTER_SPEED_BOOST,
};
use crate::error::ConfigError;
use crate::field::{ramp_target, Frame, LineBin, LineStrip, PointInstance};
use crate::spatial::CellGrid;

/// Fraction of the remaining turn toward the pointer applied per step to
/// mouse-following trails.
const HEADING_BLEND: f32 = 0.08;
/// Fraction of the remaining speed difference applied per step.
const SPEED_BLEND: f32 = 0.1;

/// Wrap an angle difference into (-PI, PI].
fn wrap_angle(a: f32) -> f32 {
    (a + PI).rem_euclid(TAU) - PI
}

#[derive(Debug, Clone)]
pub struct Trail {
    pub id: u32,
    pub pos: Vec2,
    pub heading: f32,
    pub angular_vel: f32,
    pub base_speed: f32,
    pub speed: f32,
    /// Per-trail draw opacity class.
    pub opacity: f32,
    /// Whether this trail steers toward the pointer.
    pub follows_pointer: bool,
    segments: VecDeque<Vec2>,
    max_segments: usize,
}

impl Trail {
    pub fn spawn<R: Rng>(id: u32, rng: &mut R, cfg: &TrailConfig) -> Self {
        let pos = Vec2::new(
            rng.gen::<f32>() * cfg.width,
            rng.gen::<f32>() * cfg.height,
        );
        let base_speed = cfg.base_speed * (0.6 + rng.gen::<f32>() * 0.8);
        Self {
            id,
            pos,
            heading: rng.gen::<f32>() * TAU,
            angular_vel: (rng.gen::<f32>() - 0.5) * 2.0 * cfg.turn_rate,
            base_speed,
            speed: base_speed,
            opacity: 0.3 + rng.gen::<f32>() * 0.5,
            follows_pointer: rng.gen::<f32>() < cfg.follow_fraction,
            segments: VecDeque::with_capacity(cfg.max_segments),
            max_segments: cfg.max_segments,
        }
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn head(&self) -> Vec2 {
        self.pos
    }

    /// Advance one step: turn, steer, blend speed, move, wrap, record.
    pub fn step(&mut self, cfg: &TrailConfig, pointer: Option<Vec2>) {
        self.heading += self.angular_vel;

        let near_pointer = match pointer {
            Some(m) => (self.pos - m).length_squared() < POINTER_INFLUENCE_DIST_SQ,
            None => false,
        };

        if self.follows_pointer {
            if let Some(m) = pointer {
                let desired = (m - self.pos).to_angle();
                self.heading += wrap_angle(desired - self.heading) * HEADING_BLEND;
            }
        }

        // Speed boost near the pointer, blended rather than snapped.
        let target_speed = if near_pointer {
            self.base_speed * POINTER_SPEED_BOOST
        } else {
            self.base_speed
        };
        self.speed += (target_speed - self.speed) * SPEED_BLEND;

        self.pos += Vec2::from_angle(self.heading) * self.speed;

        // Wrap past the edge with a margin so the teleport happens out of
        // view.
        let m = cfg.wrap_margin;
        if self.pos.x < -m {
            self.pos.x = cfg.width + m;
        } else if self.pos.x > cfg.width + m {
            self.pos.x = -m;
        }
        if self.pos.y < -m {
            self.pos.y = cfg.height + m;
        } else if self.pos.y > cfg.height + m {
            self.pos.y = -m;
        }

        self.segments.push_back(self.pos);
        if self.segments.len() > self.max_segments {
            self.segments.pop_front();
        }
    }

    /// The draw paths of the history: consecutive points stay in one run,
    /// but a gap longer than `jump_distance` (a wrap teleport) starts a
    /// new run so no segment is drawn across the field.
    pub fn runs(&self, jump_distance: f32) -> Vec<Vec<Vec2>> {
        let jump_sq = jump_distance * jump_distance;
        let mut runs = Vec::new();
        let mut current: Vec<Vec2> = Vec::new();
        for &p in &self.segments {
            if let Some(&last) = current.last() {
                if (p - last).length_squared() > jump_sq {
                    if current.len() > 1 {
                        runs.push(std::mem::take(&mut current));
                    } else {
                        current.clear();
                    }
                }
            }
            current.push(p);
        }
        if current.len() > 1 {
            runs.push(current);
        }
        runs
    }
}

/// A field of trails, mirroring [`Field`](crate::field::Field) for the
/// trail variant: same ramp-up, same grid-based head connections, polyline
/// histories on top.
#[derive(Debug)]
pub struct TrailField {
    config: TrailConfig,
    trails: Vec<Trail>,
    positions: Vec<Vec2>,
    grid: CellGrid,
    elapsed: f32,
    pointer: Option<Vec2>,
    theme: Theme,
    rng: StdRng,
}

impl TrailField {
    pub fn new(config: TrailConfig) -> Result<Self, ConfigError> {
        Self::from_rng(config, StdRng::from_entropy())
    }

    pub fn with_seed(config: TrailConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::from_rng(config, StdRng::seed_from_u64(seed))
    }

    fn from_rng(config: TrailConfig, rng: StdRng) -> Result<Self, ConfigError> {
        config.validate()?;
        let cell = if config.line_distance > 0.0 {
            config.line_distance
        } else {
            1.0
        };
        let grid = CellGrid::new(config.width, config.height, cell);
        Ok(Self {
            trails: Vec::with_capacity(config.trail_count),
            positions: Vec::with_capacity(config.trail_count),
            grid,
            elapsed: 0.0,
            pointer: None,
            theme: Theme::default(),
            config,
            rng,
        })
    }

    pub fn config(&self) -> &TrailConfig {
        &self.config
    }

    pub fn set_pointer(&mut self, pointer: Option<Vec2>) {
        self.pointer = pointer;
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn population(&self) -> usize {
        self.trails.len()
    }

    pub fn trails(&self) -> &[Trail] {
        &self.trails
    }

    pub fn step(&mut self, dt: f32) {
        self.elapsed += dt;

        let target = ramp_target(self.elapsed, self.config.ramp, self.config.trail_count);
        while self.trails.len() < target {
            let id = self.trails.len() as u32;
            self.trails.push(Trail::spawn(id, &mut self.rng, &self.config));
        }

        for t in &mut self.trails {
            t.step(&self.config, self.pointer);
        }
    }

    pub fn frame(&mut self) -> Frame {
        self.positions.clear();
        self.positions.extend(self.trails.iter().map(|t| t.head()));
        self.grid.rebuild(&self.positions);

        let cfg = &self.config;
        let points = self
            .trails
            .iter()
            .map(|t| PointInstance {
                pos: t.head(),
                size: 2.0,
                alpha: t.opacity,
            })
            .collect();

        let bin_count = cfg.opacity_bins;
        let mut bins: Vec<LineBin> = (0..bin_count)
            .map(|b| LineBin {
                alpha: (b + 1) as f32 / bin_count as f32 * 0.3,
                segments: Vec::new(),
            })
            .collect();

        let distance = cfg.line_distance;
        let positions = &self.positions;
        self.grid.for_each_pair(positions, |a, b, dist_sq| {
            let dist = dist_sq.sqrt();
            let bin = (((1.0 - dist / distance) * (bin_count - 1) as f32) as usize)
                .min(bin_count - 1);
            bins[bin]
                .segments
                .push([positions[a as usize], positions[b as usize]]);
        });

        let jump = cfg.jump_distance();
        let strips = self
            .trails
            .iter()
            .flat_map(|t| {
                let alpha = t.opacity;
                t.runs(jump)
                    .into_iter()
                    .map(move |points| LineStrip { alpha, points })
            })
            .collect();

        Frame {
            points,
            bins,
            strips,
            rgb: self.theme.entity_rgb(cfg.mode),
            point_alpha: 1.0,
            line_width: cfg.line_width,
            size: Vec2::new(cfg.width, cfg.height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> TrailConfig {
        TrailConfig::new(1000.0, 800.0)
    }

    #[test]
    fn test_wrap_angle_range() {
        assert!((wrap_angle(3.0 * PI).abs() - PI).abs() < 1e-4);
        assert!((wrap_angle(-3.0 * PI).abs() - PI).abs() < 1e-4);
        assert!((wrap_angle(0.3) - 0.3).abs() < 1e-6);
        assert!((wrap_angle(TAU + 0.5) - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_segment_history_never_exceeds_cap() {
        let cfg = test_config();
        let mut rng = StdRng::seed_from_u64(11);
        let mut trail = Trail::spawn(0, &mut rng, &cfg);
        for i in 0..500 {
            trail.step(&cfg, None);
            assert!(
                trail.segment_count() <= cfg.max_segments,
                "cap exceeded at step {}",
                i
            );
        }
        assert_eq!(trail.segment_count(), cfg.max_segments);
    }

    #[test]
    fn test_history_is_fifo() {
        let cfg = test_config();
        let mut rng = StdRng::seed_from_u64(5);
        let mut trail = Trail::spawn(0, &mut rng, &cfg);
        trail.step(&cfg, None);
        let oldest = *trail.segments.front().unwrap();
        for _ in 0..cfg.max_segments {
            trail.step(&cfg, None);
        }
        // The original first position has been evicted.
        assert!(trail.segments.iter().all(|&p| p != oldest));
    }

    #[test]
    fn test_wrap_produces_broken_runs() {
        let cfg = test_config();
        let mut rng = StdRng::seed_from_u64(2);
        let mut trail = Trail::spawn(0, &mut rng, &cfg);
        // Force a trajectory straight off the right edge.
        trail.pos = Vec2::new(cfg.width + cfg.wrap_margin - 10.0, 400.0);
        trail.heading = 0.0;
        trail.angular_vel = 0.0;
        trail.follows_pointer = false;
        trail.speed = 3.0;
        trail.base_speed = 3.0;

        for _ in 0..10 {
            trail.step(&cfg, None);
        }
        let runs = trail.runs(cfg.jump_distance());
        assert_eq!(runs.len(), 2, "wrap should split the path");
        for run in &runs {
            for pair in run.windows(2) {
                assert!((pair[0] - pair[1]).length() <= cfg.jump_distance());
            }
        }
    }

    #[test]
    fn test_trail_field_ramps_and_caps() {
        let mut field = TrailField::with_seed(test_config(), 42).unwrap();
        for _ in 0..240 {
            field.step(1.0 / 60.0);
        }
        assert_eq!(field.population(), field.config().trail_count);
        for t in field.trails() {
            assert!(t.segment_count() <= field.config().max_segments);
        }
    }
}
