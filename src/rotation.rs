//! Pointer-driven logo tilt.
//!
//! Pointer offset from the viewport center sets a target rotation, capped
//! at +/-20 degrees per axis; the current rotation chases the target with a
//! first-order low-pass filter each frame. The smoothed angles become a 3D
//! rotation of the logo layer plus a drop-shadow offset.

use glam::{Mat4, Vec2};

use crate::config::Theme;

/// Full tilt span in degrees (+/-20 per axis).
pub const TILT_SPAN_DEG: f32 = 40.0;

/// Fraction of the remaining distance covered per frame.
pub const SMOOTHING: f32 = 0.29;

const SHADOW_BLUR: f32 = 20.0;

/// Smoothed rotation output for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationTransform {
    /// Rotation about the horizontal axis, degrees.
    pub rotate_x: f32,
    /// Rotation about the vertical axis, degrees.
    pub rotate_y: f32,
    /// Drop-shadow displacement in pixels.
    pub shadow_offset: Vec2,
    pub shadow_blur: f32,
    pub shadow_alpha: f32,
}

#[derive(Debug, Default)]
pub struct RotationController {
    /// Target (rotate_x, rotate_y) in degrees.
    target: Vec2,
    /// Smoothed (rotate_x, rotate_y) in degrees.
    current: Vec2,
}

impl RotationController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update targets from the pointer's fractional offset from the
    /// viewport center (each component in [-0.5, 0.5]).
    pub fn pointer_moved(&mut self, center_frac: Vec2) {
        self.target = Vec2::new(
            -center_frac.y * TILT_SPAN_DEG,
            center_frac.x * TILT_SPAN_DEG,
        );
    }

    /// Pointer left the viewport entirely: ease back to neutral.
    pub fn pointer_left(&mut self) {
        self.target = Vec2::ZERO;
    }

    /// Advance the filter one frame.
    pub fn step(&mut self) {
        self.current += (self.target - self.current) * SMOOTHING;
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn current(&self) -> Vec2 {
        self.current
    }

    /// The frame's presentation values.
    pub fn transform(&self, theme: Theme) -> RotationTransform {
        RotationTransform {
            rotate_x: self.current.x,
            rotate_y: self.current.y,
            shadow_offset: Vec2::new(self.current.y * 0.5, self.current.x * 0.5),
            shadow_blur: SHADOW_BLUR,
            shadow_alpha: theme.shadow_alpha(),
        }
    }

    /// Rotation matrix about the field center, for the renderer.
    pub fn matrix(&self, center: Vec2) -> Mat4 {
        Mat4::from_translation(center.extend(0.0))
            * Mat4::from_rotation_x(self.current.x.to_radians())
            * Mat4::from_rotation_y(self.current.y.to_radians())
            * Mat4::from_translation(-center.extend(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_targets_capped_at_twenty_degrees() {
        let mut rot = RotationController::new();
        rot.pointer_moved(Vec2::new(0.5, -0.5));
        assert_eq!(rot.target(), Vec2::new(20.0, 20.0));
        rot.pointer_moved(Vec2::new(-0.5, 0.5));
        assert_eq!(rot.target(), Vec2::new(-20.0, -20.0));
    }

    #[test]
    fn test_smoothing_converges_to_held_target() {
        let mut rot = RotationController::new();
        rot.pointer_moved(Vec2::new(0.25, 0.4));
        let target = rot.target();
        for _ in 0..60 {
            rot.step();
        }
        assert!((rot.current() - target).length() < 1e-3);
    }

    #[test]
    fn test_pointer_leave_returns_to_neutral() {
        let mut rot = RotationController::new();
        rot.pointer_moved(Vec2::new(0.5, 0.5));
        for _ in 0..10 {
            rot.step();
        }
        rot.pointer_left();
        for _ in 0..60 {
            rot.step();
        }
        assert!(rot.current().length() < 1e-3);
    }

    #[test]
    fn test_shadow_follows_angles() {
        let mut rot = RotationController::new();
        rot.pointer_moved(Vec2::new(0.5, 0.0));
        for _ in 0..100 {
            rot.step();
        }
        let t = rot.transform(Theme::Dark);
        assert!((t.shadow_offset.x - t.rotate_y * 0.5).abs() < 1e-5);
        assert!((t.shadow_offset.y - t.rotate_x * 0.5).abs() < 1e-5);
        assert_eq!(t.shadow_alpha, Theme::Dark.shadow_alpha());
    }
}
