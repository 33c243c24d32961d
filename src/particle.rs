//! Particle kinematics.

use glam::Vec2;
use rand::Rng;

use crate::config::{POINTER_INFLUENCE_DIST_SQ, POINTER_SPEED_BOOST};

/// A bare moving point. The id exists only so each connection pair is
/// evaluated once (`id_a < id_b`).
#[derive(Debug, Clone, Copy)]
pub struct Particle {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
}

impl Particle {
    /// Spawn at a uniformly random position with a random velocity scaled
    /// by `base_speed`.
    pub fn spawn<R: Rng>(id: u32, rng: &mut R, bounds: Vec2, base_speed: f32) -> Self {
        Self {
            id,
            pos: Vec2::new(
                rng.gen::<f32>() * bounds.x,
                rng.gen::<f32>() * bounds.y,
            ),
            vel: Vec2::new(
                (rng.gen::<f32>() - 0.5) * base_speed,
                (rng.gen::<f32>() - 0.5) * base_speed,
            ),
        }
    }

    /// Integrate one step: apply the pointer speed boost, move, then flip
    /// velocity components that carried the particle past an edge.
    pub fn step(&mut self, bounds: Vec2, pointer: Option<Vec2>) {
        let boost = match pointer {
            Some(m) if (self.pos - m).length_squared() < POINTER_INFLUENCE_DIST_SQ => {
                POINTER_SPEED_BOOST
            }
            _ => 1.0,
        };

        self.pos += self.vel * boost;

        if self.pos.x < 0.0 || self.pos.x > bounds.x {
            self.vel.x = -self.vel.x;
        }
        if self.pos.y < 0.0 || self.pos.y > bounds.y {
            self.vel.y = -self.vel.y;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounce_flips_velocity() {
        let bounds = Vec2::new(100.0, 100.0);
        let mut p = Particle {
            id: 0,
            pos: Vec2::new(99.5, 50.0),
            vel: Vec2::new(1.0, 0.0),
        };
        p.step(bounds, None);
        assert!(p.vel.x < 0.0);
        // Next step moves back inside.
        p.step(bounds, None);
        assert!(p.pos.x <= 100.0);
    }

    #[test]
    fn test_pointer_boost_applies_inside_radius() {
        let bounds = Vec2::new(1000.0, 1000.0);
        let vel = Vec2::new(1.0, 0.0);
        let mut near = Particle { id: 0, pos: Vec2::new(500.0, 500.0), vel };
        let mut far = Particle { id: 1, pos: Vec2::new(500.0, 500.0), vel };

        near.step(bounds, Some(Vec2::new(510.0, 500.0)));
        far.step(bounds, Some(Vec2::new(900.0, 500.0)));

        assert!((near.pos.x - 500.0) > (far.pos.x - 500.0));
        assert!(((near.pos.x - 500.0) - POINTER_SPEED_BOOST).abs() < 1e-5);
    }

    #[test]
    fn test_spawn_within_bounds() {
        let mut rng = rand::thread_rng();
        let bounds = Vec2::new(320.0, 240.0);
        for id in 0..100 {
            let p = Particle::spawn(id, &mut rng, bounds, 0.8);
            assert!(p.pos.x >= 0.0 && p.pos.x <= bounds.x);
            assert!(p.pos.y >= 0.0 && p.pos.y <= bounds.y);
            assert!(p.vel.x.abs() <= 0.4 && p.vel.y.abs() <= 0.4);
        }
    }
}
