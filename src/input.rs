//! Pointer tracking over window events.
//!
//! The simulation wants pointer positions in three flavors: raw viewport
//! pixels (background field), center-relative fractions (rotation
//! controller, starfield parallax), and logo-field coordinates (the logo
//! canvas has its own fixed internal space). `PointerTracker` keeps the
//! latest position and does the mappings; a pointer that left the window
//! reports `None` everywhere so each consumer can fall back to neutral.

use glam::Vec2;
use winit::event::WindowEvent;

#[derive(Debug)]
pub struct PointerTracker {
    window_size: (u32, u32),
    /// Latest pointer position in viewport pixels; `None` after the
    /// pointer left the window.
    position: Option<Vec2>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self {
            window_size: (1280, 720),
            position: None,
        }
    }

    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_size = (width, height);
    }

    pub fn window_width(&self) -> f32 {
        self.window_size.0 as f32
    }

    pub fn window_height(&self) -> f32 {
        self.window_size.1 as f32
    }

    /// Process a winit window event.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.position = Some(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::CursorLeft { .. } => {
                self.position = None;
            }
            WindowEvent::Resized(size) => {
                self.window_size = (size.width, size.height);
            }
            _ => {}
        }
    }

    /// Pointer in viewport pixels.
    pub fn viewport(&self) -> Option<Vec2> {
        self.position
    }

    /// Pointer offset from the viewport center as a fraction of the
    /// viewport, each component in [-0.5, 0.5].
    pub fn center_frac(&self) -> Option<Vec2> {
        let (w, h) = self.window_size;
        if w == 0 || h == 0 {
            return None;
        }
        self.position.map(|p| {
            Vec2::new(p.x / w as f32 - 0.5, p.y / h as f32 - 0.5)
        })
    }

    /// Pointer offset from the viewport center in pixels.
    pub fn center_offset(&self) -> Option<Vec2> {
        let (w, h) = self.window_size;
        self.position
            .map(|p| Vec2::new(p.x - w as f32 / 2.0, p.y - h as f32 / 2.0))
    }

    /// Pointer mapped into a field's internal coordinate space, with the
    /// viewport center landing on the field center.
    pub fn field_space(&self, field_size: Vec2) -> Option<Vec2> {
        self.center_frac()
            .map(|f| f * field_size + field_size * 0.5)
    }
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker_at(x: f32, y: f32) -> PointerTracker {
        let mut t = PointerTracker::new();
        t.set_window_size(1000, 800);
        t.position = Some(Vec2::new(x, y));
        t
    }

    #[test]
    fn test_center_frac_at_center_is_zero() {
        let t = tracker_at(500.0, 400.0);
        let f = t.center_frac().unwrap();
        assert!(f.length() < 1e-6);
    }

    #[test]
    fn test_field_space_mapping() {
        // Viewport corner maps to the field corner.
        let t = tracker_at(1000.0, 800.0);
        let p = t.field_space(Vec2::new(1000.0, 1100.0)).unwrap();
        assert!((p - Vec2::new(1000.0, 1100.0)).length() < 1e-3);

        // Viewport center maps to the field center.
        let t = tracker_at(500.0, 400.0);
        let p = t.field_space(Vec2::new(1000.0, 1100.0)).unwrap();
        assert!((p - Vec2::new(500.0, 550.0)).length() < 1e-3);
    }

    #[test]
    fn test_leave_clears_position() {
        let mut t = tracker_at(10.0, 10.0);
        assert!(t.viewport().is_some());
        t.position = None;
        assert!(t.center_frac().is_none());
        assert!(t.field_space(Vec2::new(100.0, 100.0)).is_none());
    }
}
