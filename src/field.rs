//! The particle field engine.
//!
//! A [`Field`] owns a bounded population of particles, grows it over a
//! ramp-up window after (re)start, steps kinematics each frame, and emits
//! a [`Frame`] of draw geometry: particle squares plus connection lines
//! batched into opacity bins.

use std::time::Duration;

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{FieldConfig, Theme};
use crate::error::ConfigError;
use crate::particle::Particle;
use crate::spatial::CellGrid;

/// Lifecycle phase of a field. A field starts ramping and stays steady
/// until it is torn down and rebuilt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPhase {
    RampingUp,
    Steady,
}

/// One frame of draw geometry, in field coordinates.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    /// Filled squares, one per live entity.
    pub points: Vec<PointInstance>,
    /// Connection segments grouped by opacity bin; one batch per bin.
    pub bins: Vec<LineBin>,
    /// Multi-segment polylines (trail histories). Empty for particle fields.
    pub strips: Vec<LineStrip>,
    /// Entity/line color for the current theme.
    pub rgb: [f32; 3],
    /// Fill alpha of the points.
    pub point_alpha: f32,
    pub line_width: f32,
    /// Field-space extent, used by the renderer for its projection.
    pub size: Vec2,
}

#[derive(Debug, Clone, Copy)]
pub struct PointInstance {
    pub pos: Vec2,
    pub size: f32,
    pub alpha: f32,
}

/// Segments sharing one approximate alpha, drawn as a single batch.
#[derive(Debug, Clone)]
pub struct LineBin {
    pub alpha: f32,
    pub segments: Vec<[Vec2; 2]>,
}

#[derive(Debug, Clone)]
pub struct LineStrip {
    pub alpha: f32,
    pub points: Vec<Vec2>,
}

/// Population the ramp allows after `elapsed` seconds: linear growth to
/// `target` over `ramp`, then flat. Monotone in `elapsed` and never above
/// `target`.
pub fn ramp_target(elapsed: f32, ramp: Duration, target: usize) -> usize {
    let ramp_secs = ramp.as_secs_f32();
    let progress = if ramp_secs <= 0.0 {
        1.0
    } else {
        (elapsed / ramp_secs).clamp(0.0, 1.0)
    };
    (progress * target as f32).floor() as usize
}

#[derive(Debug)]
pub struct Field {
    config: FieldConfig,
    particles: Vec<Particle>,
    positions: Vec<Vec2>,
    grid: CellGrid,
    elapsed: f32,
    pointer: Option<Vec2>,
    theme: Theme,
    rng: StdRng,
}

impl Field {
    /// Create a field from a validated config, seeded from the OS.
    pub fn new(config: FieldConfig) -> Result<Self, ConfigError> {
        Self::from_rng(config, StdRng::from_entropy())
    }

    /// Deterministic construction for tests and reproducible runs.
    pub fn with_seed(config: FieldConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::from_rng(config, StdRng::seed_from_u64(seed))
    }

    fn from_rng(config: FieldConfig, rng: StdRng) -> Result<Self, ConfigError> {
        config.validate()?;
        // A zero-population field never queries the grid, but the grid
        // still needs a positive cell size to construct.
        let cell = if config.line_distance > 0.0 {
            config.line_distance
        } else {
            1.0
        };
        let grid = CellGrid::new(config.width, config.height, cell);
        Ok(Self {
            particles: Vec::with_capacity(config.particle_count),
            positions: Vec::with_capacity(config.particle_count),
            grid,
            elapsed: 0.0,
            pointer: None,
            theme: Theme::default(),
            config,
            rng,
        })
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Latest pointer position in field coordinates, or `None` when the
    /// pointer left the viewport.
    pub fn set_pointer(&mut self, pointer: Option<Vec2>) {
        self.pointer = pointer;
    }

    /// Switch color scheme without touching simulation state.
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn population(&self) -> usize {
        self.particles.len()
    }

    pub fn phase(&self) -> FieldPhase {
        if self.particles.len() < self.config.particle_count {
            FieldPhase::RampingUp
        } else {
            FieldPhase::Steady
        }
    }

    fn bounds(&self) -> Vec2 {
        Vec2::new(self.config.width, self.config.height)
    }

    /// Advance the simulation by `dt` seconds: grow the population toward
    /// the ramp target, then integrate every particle.
    pub fn step(&mut self, dt: f32) {
        self.elapsed += dt;

        let target = ramp_target(self.elapsed, self.config.ramp, self.config.particle_count);
        let bounds = self.bounds();
        while self.particles.len() < target {
            let id = self.particles.len() as u32;
            self.particles
                .push(Particle::spawn(id, &mut self.rng, bounds, self.config.base_speed));
        }

        for p in &mut self.particles {
            p.step(bounds, self.pointer);
        }
    }

    /// Connection pairs for the current positions, via the grid.
    pub fn connected_pairs(&mut self) -> Vec<(u32, u32)> {
        self.rebuild_grid();
        self.grid.pairs(&self.positions)
    }

    fn rebuild_grid(&mut self) {
        self.positions.clear();
        self.positions.extend(self.particles.iter().map(|p| p.pos));
        self.grid.rebuild(&self.positions);
    }

    /// Build this frame's draw geometry.
    pub fn frame(&mut self) -> Frame {
        self.rebuild_grid();

        let cfg = &self.config;
        let points = self
            .particles
            .iter()
            .map(|p| PointInstance {
                pos: p.pos,
                size: cfg.particle_size,
                alpha: cfg.particle_alpha(),
            })
            .collect();

        let bin_count = cfg.opacity_bins;
        let mut bins: Vec<LineBin> = (0..bin_count)
            .map(|b| LineBin {
                alpha: cfg.bin_alpha(b),
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

        Frame {
            points,
            bins,
            strips: Vec::new(),
            rgb: self.theme.entity_rgb(cfg.mode),
            point_alpha: cfg.particle_alpha(),
            line_width: cfg.line_width,
            size: self.bounds(),
        }
    }

    /// Scatter particles at exact positions. Test hook for the connection
    /// scenarios; truncates to the configured target count.
    #[doc(hidden)]
    pub fn place(&mut self, positions: &[Vec2]) {
        self.particles.clear();
        for (i, &pos) in positions
            .iter()
            .take(self.config.particle_count)
            .enumerate()
        {
            let angle = self.rng.gen::<f32>() * std::f32::consts::TAU;
            self.particles.push(Particle {
                id: i as u32,
                pos,
                vel: Vec2::from_angle(angle) * self.config.base_speed * 0.5,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> FieldConfig {
        let mut cfg = FieldConfig::background(1440.0, 900.0);
        cfg.ramp = Duration::from_secs(3);
        cfg
    }

    #[test]
    fn test_ramp_target_monotone_and_bounded() {
        let ramp = Duration::from_secs(3);
        let mut last = 0;
        let mut t = 0.0;
        while t < 5.0 {
            let n = ramp_target(t, ramp, 500);
            assert!(n >= last, "population shrank at t={}", t);
            assert!(n <= 500);
            last = n;
            t += 0.016;
        }
        assert_eq!(last, 500);
        assert_eq!(ramp_target(3.0, ramp, 500), 500);
    }

    #[test]
    fn test_ramp_zero_duration_is_immediate() {
        assert_eq!(ramp_target(0.0, Duration::ZERO, 120), 120);
    }

    #[test]
    fn test_field_ramps_to_target() {
        let mut field = Field::with_seed(test_config(), 7).unwrap();
        assert_eq!(field.population(), 0);
        assert_eq!(field.phase(), FieldPhase::RampingUp);

        let mut last = 0;
        for _ in 0..200 {
            field.step(1.0 / 60.0);
            assert!(field.population() >= last);
            assert!(field.population() <= field.config().particle_count);
            last = field.population();
        }
        assert_eq!(field.population(), field.config().particle_count);
        assert_eq!(field.phase(), FieldPhase::Steady);
    }

    #[test]
    fn test_empty_field_draws_nothing() {
        let mut cfg = test_config();
        cfg.particle_count = 0;
        let mut field = Field::with_seed(cfg, 1).unwrap();
        for _ in 0..120 {
            field.step(1.0 / 60.0);
            let frame = field.frame();
            assert!(frame.points.is_empty());
            assert!(frame.bins.iter().all(|b| b.segments.is_empty()));
        }
    }

    #[test]
    fn test_theme_change_preserves_population() {
        let mut field = Field::with_seed(test_config(), 3).unwrap();
        for _ in 0..300 {
            field.step(1.0 / 60.0);
        }
        let before: Vec<Vec2> = field.particles.iter().map(|p| p.pos).collect();
        field.set_theme(Theme::Light);
        let after: Vec<Vec2> = field.particles.iter().map(|p| p.pos).collect();
        assert_eq!(before.len(), after.len());
        assert_eq!(before[0], after[0]);
        assert_eq!(field.frame().rgb, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_frame_bins_match_config() {
        let mut field = Field::with_seed(test_config(), 9).unwrap();
        for _ in 0..300 {
            field.step(1.0 / 60.0);
        }
        let frame = field.frame();
        assert_eq!(frame.bins.len(), field.config().opacity_bins);
        // Every segment landed in a bin whose alpha came from the config.
        for (b, bin) in frame.bins.iter().enumerate() {
            assert_eq!(bin.alpha, field.config().bin_alpha(b));
        }
    }
}
