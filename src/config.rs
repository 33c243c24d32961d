//! Field configuration.
//!
//! The effect has a handful of near-identical tuning variants; they collapse
//! here into plain data. Each preset constructor is one shipped
//! parameterization, keyed on viewport width against the mobile breakpoint.

use std::time::Duration;

use crate::error::ConfigError;

/// Viewport width below which the reduced mobile presets apply.
pub const MOBILE_BREAKPOINT: f32 = 768.0;

/// Squared pointer-influence radius (250 px).
pub const POINTER_INFLUENCE_DIST_SQ: f32 = 62_500.0;

/// Speed multiplier applied to entities inside the pointer-influence radius.
pub const POINTER_SPEED_BOOST: f32 = 1.96;

/// Duration of the population ramp-up after a field (re)starts.
pub const RAMP_DURATION: Duration = Duration::from_secs(3);

/// Light/dark color scheme, switchable at runtime without resetting the
/// simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    /// Entity/line color for a field in this theme.
    pub fn entity_rgb(self, mode: FieldMode) -> [f32; 3] {
        match (self, mode) {
            (Theme::Dark, _) => [1.0, 1.0, 1.0],
            (Theme::Light, FieldMode::Background) => [0.0, 0.0, 0.0],
            // Logo fields use a soft near-black in light mode.
            (Theme::Light, FieldMode::Logo) => [26.0 / 255.0, 26.0 / 255.0, 26.0 / 255.0],
        }
    }

    /// Window clear color.
    pub fn clear_rgb(self) -> [f64; 3] {
        match self {
            Theme::Dark => [0.04, 0.04, 0.05],
            Theme::Light => [0.96, 0.96, 0.95],
        }
    }

    /// Drop-shadow alpha used by the logo tilt.
    pub fn shadow_alpha(self) -> f32 {
        match self {
            Theme::Dark => 0.1,
            Theme::Light => 0.3,
        }
    }
}

/// Whether a field is the full-viewport background layer or the denser
/// logo layer. The two differ in color defaults and opacity binning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMode {
    Background,
    Logo,
}

/// Tuning for a particle field instance.
#[derive(Debug, Clone)]
pub struct FieldConfig {
    /// Internal field width in field units.
    pub width: f32,
    /// Internal field height in field units.
    pub height: f32,
    /// Target population after ramp-up completes.
    pub particle_count: usize,
    /// Connection distance threshold; also the spatial grid cell size.
    pub line_distance: f32,
    /// Side length of the filled square drawn per particle.
    pub particle_size: f32,
    /// Scale of initial per-axis velocities.
    pub base_speed: f32,
    /// Line alpha for background fields (logo fields derive alpha per bin).
    pub line_opacity: f32,
    /// Stroke width of connection lines.
    pub line_width: f32,
    /// Number of opacity bins connections are batched into.
    pub opacity_bins: usize,
    pub mode: FieldMode,
    /// How long the population takes to reach `particle_count`.
    pub ramp: Duration,
}

impl FieldConfig {
    /// The logo field preset: a fixed 1000x1100 internal space, empty on
    /// narrow viewports.
    pub fn logo(viewport_width: f32) -> Self {
        let mobile = viewport_width < MOBILE_BREAKPOINT;
        Self {
            width: 1000.0,
            height: 1100.0,
            particle_count: if mobile { 0 } else { 500 },
            line_distance: 145.0,
            particle_size: 2.0,
            base_speed: 0.8,
            line_opacity: 0.8,
            line_width: 0.8,
            opacity_bins: 11,
            mode: FieldMode::Logo,
            ramp: RAMP_DURATION,
        }
    }

    /// The viewport-sized background field preset.
    pub fn background(viewport_width: f32, viewport_height: f32) -> Self {
        let mobile = viewport_width < MOBILE_BREAKPOINT;
        Self {
            width: viewport_width,
            height: viewport_height,
            particle_count: if mobile { 25 } else { 120 },
            line_distance: if mobile { 250.0 } else { 221.0 },
            particle_size: 1.59,
            base_speed: 0.4,
            line_opacity: 0.2,
            line_width: 1.2,
            opacity_bins: 6,
            mode: FieldMode::Background,
            ramp: RAMP_DURATION,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(ConfigError::NonPositiveBounds {
                width: self.width,
                height: self.height,
            });
        }
        if self.particle_count > 0 && self.line_distance <= 0.0 {
            return Err(ConfigError::NonPositiveLineDistance(self.line_distance));
        }
        if self.opacity_bins < 2 {
            return Err(ConfigError::TooFewBins(self.opacity_bins));
        }
        Ok(())
    }

    /// Fill alpha of the particle squares.
    pub fn particle_alpha(&self) -> f32 {
        match self.mode {
            FieldMode::Background => 0.4,
            FieldMode::Logo => 0.8,
        }
    }

    /// Alpha assigned to connection lines in the given bin.
    ///
    /// Background fields share one flat opacity across bins; logo fields
    /// step 8% per bin so closer pairs draw brighter.
    pub fn bin_alpha(&self, bin: usize) -> f32 {
        match self.mode {
            FieldMode::Background => self.line_opacity,
            FieldMode::Logo => (bin * 8) as f32 / 100.0,
        }
    }
}

/// Tuning for a trail field instance.
#[derive(Debug, Clone)]
pub struct TrailConfig {
    pub width: f32,
    pub height: f32,
    /// Target population after ramp-up completes.
    pub trail_count: usize,
    /// Connection distance between trail heads; also the grid cell size.
    pub line_distance: f32,
    pub base_speed: f32,
    /// Hard cap on segment history length per trail.
    pub max_segments: usize,
    /// Margin beyond the edges before a trail wraps to the opposite side.
    pub wrap_margin: f32,
    /// Maximum magnitude of per-trail angular velocity, radians per step.
    pub turn_rate: f32,
    /// Fraction of trails that steer toward the pointer.
    pub follow_fraction: f32,
    pub line_width: f32,
    pub opacity_bins: usize,
    pub mode: FieldMode,
    pub ramp: Duration,
}

impl TrailConfig {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            trail_count: 48,
            line_distance: 180.0,
            base_speed: 1.4,
            max_segments: 32,
            wrap_margin: 20.0,
            turn_rate: 0.04,
            follow_fraction: 0.25,
            line_width: 1.0,
            opacity_bins: 6,
            mode: FieldMode::Background,
            ramp: RAMP_DURATION,
        }
    }

    /// A segment gap longer than this is treated as a wrap discontinuity
    /// and the draw path is broken instead of connected.
    pub fn jump_distance(&self) -> f32 {
        self.wrap_margin * 4.0
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(ConfigError::NonPositiveBounds {
                width: self.width,
                height: self.height,
            });
        }
        if self.trail_count > 0 && self.line_distance <= 0.0 {
            return Err(ConfigError::NonPositiveLineDistance(self.line_distance));
        }
        if self.opacity_bins < 2 {
            return Err(ConfigError::TooFewBins(self.opacity_bins));
        }
        if self.max_segments == 0 {
            return Err(ConfigError::ZeroSegmentCap);
        }
        Ok(())
    }
}

/// Tuning for the parallax starfield variant.
#[derive(Debug, Clone)]
pub struct StarfieldConfig {
    pub width: f32,
    pub height: f32,
    pub star_count: usize,
    /// Pointer parallax strength per depth layer.
    pub parallax: f32,
}

impl StarfieldConfig {
    pub fn new(viewport_width: f32) -> Self {
        let mobile = viewport_width < MOBILE_BREAKPOINT;
        Self {
            width: 1000.0,
            height: 1100.0,
            star_count: if mobile { 150 } else { 400 },
            parallax: 0.02,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logo_preset_empty_on_mobile() {
        assert_eq!(FieldConfig::logo(400.0).particle_count, 0);
        assert_eq!(FieldConfig::logo(1280.0).particle_count, 500);
    }

    #[test]
    fn test_background_preset_by_viewport() {
        let desktop = FieldConfig::background(1440.0, 900.0);
        assert_eq!(desktop.particle_count, 120);
        assert_eq!(desktop.line_distance, 221.0);

        let mobile = FieldConfig::background(390.0, 844.0);
        assert_eq!(mobile.particle_count, 25);
        assert_eq!(mobile.line_distance, 250.0);
    }

    #[test]
    fn test_validate_rejects_bad_bounds() {
        let mut cfg = FieldConfig::background(1440.0, 900.0);
        cfg.height = 0.0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::NonPositiveBounds { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_distance_with_particles() {
        let mut cfg = FieldConfig::logo(1280.0);
        cfg.line_distance = 0.0;
        assert!(cfg.validate().is_err());

        // A zero-population field does not care about the distance.
        cfg.particle_count = 0;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_bin_alpha_modes() {
        let logo = FieldConfig::logo(1280.0);
        assert_eq!(logo.bin_alpha(0), 0.0);
        assert_eq!(logo.bin_alpha(10), 0.8);

        let bg = FieldConfig::background(1440.0, 900.0);
        assert_eq!(bg.bin_alpha(0), bg.line_opacity);
        assert_eq!(bg.bin_alpha(5), bg.line_opacity);
    }

    #[test]
    fn test_trail_config_validate() {
        let mut cfg = TrailConfig::new(1000.0, 1100.0);
        assert!(cfg.validate().is_ok());
        cfg.max_segments = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroSegmentCap));
    }

    #[test]
    fn test_theme_colors() {
        assert_eq!(Theme::Dark.entity_rgb(FieldMode::Logo), [1.0, 1.0, 1.0]);
        assert_eq!(Theme::Light.entity_rgb(FieldMode::Background), [0.0, 0.0, 0.0]);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
    }
}
