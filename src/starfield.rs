//! Parallax starfield variant.
//!
//! Stars live on three depth layers; each layer falls at its own speed and
//! shifts by a pointer-proportional parallax scaled by depth. Stars that
//! fall past the bottom edge wrap back to the top at a fresh horizontal
//! position. No ramp-up: the whole population spawns at once.

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{StarfieldConfig, Theme};

#[derive(Debug, Clone, Copy)]
pub struct Star {
    pub pos: Vec2,
    /// Depth layer, 1 (back) to 3 (front); scales parallax.
    pub depth: f32,
    pub size: f32,
    pub base_speed: f32,
    pub alpha: f32,
}

impl Star {
    fn spawn<R: Rng>(rng: &mut R, cfg: &StarfieldConfig) -> Self {
        let pos = Vec2::new(
            rng.gen::<f32>() * cfg.width,
            rng.gen::<f32>() * cfg.height,
        );
        let (depth, size, base_speed) = match rng.gen::<f32>() {
            l if l > 0.9 => (3.0, 2.5, 1.2),
            l if l > 0.6 => (2.0, 1.5, 0.6),
            _ => (1.0, 0.8, 0.2),
        };
        Self {
            pos,
            depth,
            size,
            base_speed,
            alpha: 0.3 + rng.gen::<f32>() * 0.5,
        }
    }

    fn step<R: Rng>(&mut self, rng: &mut R, cfg: &StarfieldConfig) {
        self.pos.y += self.base_speed;
        if self.pos.y > cfg.height {
            self.pos.y = 0.0;
            self.pos.x = rng.gen::<f32>() * cfg.width;
        }
    }
}

/// A star ready to draw, parallax already applied.
#[derive(Debug, Clone, Copy)]
pub struct StarInstance {
    pub pos: Vec2,
    pub size: f32,
    pub alpha: f32,
}

#[derive(Debug)]
pub struct Starfield {
    config: StarfieldConfig,
    stars: Vec<Star>,
    /// Pointer offset from the viewport center, in pixels.
    pointer_offset: Vec2,
    theme: Theme,
    rng: StdRng,
}

impl Starfield {
    pub fn new(config: StarfieldConfig) -> Self {
        Self::from_rng(config, StdRng::from_entropy())
    }

    pub fn with_seed(config: StarfieldConfig, seed: u64) -> Self {
        Self::from_rng(config, StdRng::seed_from_u64(seed))
    }

    fn from_rng(config: StarfieldConfig, mut rng: StdRng) -> Self {
        let stars = (0..config.star_count)
            .map(|_| Star::spawn(&mut rng, &config))
            .collect();
        Self {
            config,
            stars,
            pointer_offset: Vec2::ZERO,
            theme: Theme::default(),
            rng,
        }
    }

    pub fn config(&self) -> &StarfieldConfig {
        &self.config
    }

    pub fn set_pointer_offset(&mut self, offset: Vec2) {
        self.pointer_offset = offset;
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn step(&mut self) {
        for star in &mut self.stars {
            star.step(&mut self.rng, &self.config);
        }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.config.width, self.config.height)
    }

    /// Draw list for the current frame.
    pub fn instances(&self) -> Vec<StarInstance> {
        let parallax = self.pointer_offset * self.config.parallax;
        self.stars
            .iter()
            .map(|s| StarInstance {
                pos: s.pos + parallax * s.depth,
                size: s.size,
                alpha: s.alpha,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> Starfield {
        Starfield::with_seed(StarfieldConfig::new(1280.0), 17)
    }

    #[test]
    fn test_full_population_at_start() {
        let sf = field();
        assert_eq!(sf.stars().len(), sf.config().star_count);
    }

    #[test]
    fn test_stars_wrap_at_bottom() {
        let mut sf = field();
        let height = sf.config().height;
        for _ in 0..5000 {
            sf.step();
            assert!(sf.stars().iter().all(|s| s.pos.y <= height + 1.3));
        }
    }

    #[test]
    fn test_parallax_scales_with_depth() {
        let mut sf = field();
        sf.set_pointer_offset(Vec2::new(100.0, 0.0));
        let instances = sf.instances();
        for (star, inst) in sf.stars().iter().zip(&instances) {
            let shift = inst.pos.x - star.pos.x;
            let expected = 100.0 * sf.config().parallax * star.depth;
            assert!((shift - expected).abs() < 1e-4);
        }
    }
}
