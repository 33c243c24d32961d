//! Restartable logo reveal animation.
//!
//! Models the stroke-draw and imploding-wave intro: a 5 second draw
//! progress plus staggered 3.5 second waves that implode from 5x scale to
//! rest. Both run on CSS-style cubic-bezier easing and restart together on
//! theme changes or navigation.

/// A CSS `cubic-bezier(x1, y1, x2, y2)` easing curve.
///
/// Control x-coordinates must lie in [0, 1] so the curve is a function of
/// progress. Evaluation solves x(t) = p with Newton iterations and falls
/// back to bisection when the derivative flattens out.
#[derive(Debug, Clone, Copy)]
pub struct CubicBezier {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
}

/// Easing of the logo stroke-draw (`cubic-bezier(.75,.03,.46,.46)`).
pub const LOGO_DRAW_EASE: CubicBezier = CubicBezier::new(0.75, 0.03, 0.46, 0.46);

/// Easing of the imploding waves (`cubic-bezier(.19,1,.22,1)`).
pub const WAVE_EASE: CubicBezier = CubicBezier::new(0.19, 1.0, 0.22, 1.0);

/// Stroke-draw duration in seconds.
pub const DRAW_DURATION: f32 = 5.0;

/// Per-wave duration in seconds.
pub const WAVE_DURATION: f32 = 3.5;

/// Stagger between consecutive wave starts in seconds.
pub const WAVE_STAGGER: f32 = 0.1;

impl CubicBezier {
    pub const fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    fn sample_x(&self, t: f32) -> f32 {
        let omt = 1.0 - t;
        3.0 * omt * omt * t * self.x1 + 3.0 * omt * t * t * self.x2 + t * t * t
    }

    fn sample_y(&self, t: f32) -> f32 {
        let omt = 1.0 - t;
        3.0 * omt * omt * t * self.y1 + 3.0 * omt * t * t * self.y2 + t * t * t
    }

    fn sample_dx(&self, t: f32) -> f32 {
        let omt = 1.0 - t;
        3.0 * omt * omt * self.x1
            + 6.0 * omt * t * (self.x2 - self.x1)
            + 3.0 * t * t * (1.0 - self.x2)
    }

    /// Eased output for a linear progress in [0, 1].
    pub fn eval(&self, progress: f32) -> f32 {
        let x = progress.clamp(0.0, 1.0);
        if x <= 0.0 {
            return 0.0;
        }
        if x >= 1.0 {
            return 1.0;
        }

        // Newton's method on x(t) = x.
        let mut t = x;
        for _ in 0..8 {
            let err = self.sample_x(t) - x;
            if err.abs() < 1e-6 {
                return self.sample_y(t);
            }
            let d = self.sample_dx(t);
            if d.abs() < 1e-6 {
                break;
            }
            t -= err / d;
        }

        // Bisection fallback.
        let (mut lo, mut hi) = (0.0f32, 1.0f32);
        let mut t = x;
        for _ in 0..32 {
            let mid = self.sample_x(t);
            if (mid - x).abs() < 1e-6 {
                break;
            }
            if mid < x {
                lo = t;
            } else {
                hi = t;
            }
            t = (lo + hi) * 0.5;
        }
        self.sample_y(t)
    }
}

/// State of one imploding wave for the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveState {
    /// Scale from 5.0 (just restarted) down to 1.0 (at rest).
    pub scale: f32,
    /// Opacity from 0.0 up to 1.0.
    pub opacity: f32,
}

/// The reveal timeline. Created running; `restart` rewinds it.
#[derive(Debug)]
pub struct RevealAnimation {
    elapsed: f32,
    wave_count: usize,
}

impl RevealAnimation {
    pub fn new(wave_count: usize) -> Self {
        Self {
            elapsed: 0.0,
            wave_count,
        }
    }

    /// Rewind to the beginning, e.g. after a theme change or navigation.
    pub fn restart(&mut self) {
        self.elapsed = 0.0;
    }

    pub fn step(&mut self, dt: f32) {
        self.elapsed += dt;
    }

    pub fn wave_count(&self) -> usize {
        self.wave_count
    }

    /// Eased stroke-draw progress in [0, 1].
    pub fn draw_progress(&self) -> f32 {
        LOGO_DRAW_EASE.eval(self.elapsed / DRAW_DURATION)
    }

    /// State of wave `index`, accounting for its staggered start.
    pub fn wave(&self, index: usize) -> WaveState {
        let local = self.elapsed - index as f32 * WAVE_STAGGER;
        let eased = WAVE_EASE.eval(local / WAVE_DURATION);
        WaveState {
            scale: 5.0 - 4.0 * eased,
            opacity: eased,
        }
    }

    pub fn finished(&self) -> bool {
        let last_wave_end = (self.wave_count.saturating_sub(1)) as f32 * WAVE_STAGGER + WAVE_DURATION;
        self.elapsed >= DRAW_DURATION.max(last_wave_end)
    }
}
