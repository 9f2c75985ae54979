//! Ripple lifecycle and propagation parameters.

use serde::{Deserialize, Serialize};

use crate::curve::Curve;
use crate::error::{Error, Result};

/// Narrowest ripple the pitch mapping produces (cells)
pub const MIN_RIPPLE_WIDTH: f32 = 0.1;

/// Tunables for ripple spawning, propagation and trailing echoes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RippleParams {
    /// Amplitude above which a channel becomes active
    pub min_amplitude: f32,

    /// Ripple height produced at `min_amplitude`
    pub height_at_min_amplitude: f32,

    /// Reference amplitude for the height mapping
    pub mid_amplitude: f32,

    /// Ripple height produced at `mid_amplitude`
    /// Formula: height = lerp(height_at_min, height_at_mid, inverse_lerp(min, mid, amplitude))
    pub height_at_mid_amplitude: f32,

    /// Reference pitch (Hz)
    pub mid_pitch: f32,

    /// Ripple width produced at `mid_pitch` (cells)
    pub width_at_mid_pitch: f32,

    /// Pitch sensitivity of the width mapping (1 = proportional)
    /// Formula: width = ((pitch_scale * (pitch - mid) + mid) / mid) * width_at_mid
    pub pitch_scale: f32,

    /// Outward propagation speed (cells per second)
    pub speed: f32,

    /// Height ratio between a trailing echo and its parent
    pub trail_proportion: f32,

    /// Maximum number of trailing echo generations
    pub trail_out_ripples: u32,

    /// Live ripple cap; the oldest is evicted beyond it
    pub max_ripples: usize,

    /// Minimum spacing between growth keyframes (seconds)
    pub keyframe_interval: f32,

    /// Silence needed before an active channel goes idle (seconds)
    pub ripple_split_time_gap: f32,

    /// Time scale of `growth_curve` (seconds)
    pub height_growth_duration: f32,

    /// Sampled growth-curve propagation instead of the analytic pulse
    pub use_curves: bool,

    /// Spawn a negated companion ripple at the down pin (curve mode)
    pub use_down_pin: bool,

    /// Multiplier applied to keyframe heights over normalised elapsed time
    pub growth_curve: Curve,
}

impl Default for RippleParams {
    fn default() -> Self {
        Self {
            min_amplitude: 0.05,
            height_at_min_amplitude: 0.5,
            mid_amplitude: 0.5,
            height_at_mid_amplitude: 2.0,
            mid_pitch: 220.0,
            width_at_mid_pitch: 4.0,
            pitch_scale: 1.0,
            speed: 5.0,
            trail_proportion: 0.5,
            trail_out_ripples: 3,
            max_ripples: 32,
            keyframe_interval: 0.1,
            ripple_split_time_gap: 0.2,
            height_growth_duration: 1.0,
            use_curves: false,
            use_down_pin: false,
            growth_curve: Curve::constant(1.0),
        }
    }
}

impl RippleParams {
    /// Ripple height for an input amplitude
    pub fn amplitude_to_height(&self, amplitude: f32) -> f32 {
        let t = inverse_lerp(self.min_amplitude, self.mid_amplitude, amplitude);
        self.height_at_min_amplitude + (self.height_at_mid_amplitude - self.height_at_min_amplitude) * t
    }

    /// Ripple width for an input pitch, never below [`MIN_RIPPLE_WIDTH`]
    pub fn pitch_to_width(&self, pitch: f32) -> f32 {
        let width = ((self.pitch_scale * (pitch - self.mid_pitch) + self.mid_pitch)
            / self.mid_pitch)
            * self.width_at_mid_pitch;
        width.max(MIN_RIPPLE_WIDTH)
    }

    pub fn validate(&self) -> Result<()> {
        if self.speed <= 0.0 {
            return Err(Error::InvalidParams(format!(
                "speed must be > 0, got {}",
                self.speed
            )));
        }
        if self.mid_pitch == 0.0 {
            return Err(Error::InvalidParams("mid_pitch must be non-zero".to_string()));
        }
        if !(self.width_at_mid_pitch > 0.0) {
            return Err(Error::InvalidParams(format!(
                "width_at_mid_pitch must be > 0, got {}",
                self.width_at_mid_pitch
            )));
        }
        if self.max_ripples == 0 {
            return Err(Error::InvalidParams("max_ripples must be > 0".to_string()));
        }
        if self.height_growth_duration <= 0.0 {
            return Err(Error::InvalidParams(
                "height_growth_duration must be > 0".to_string(),
            ));
        }
        if self.use_curves && self.growth_curve.is_empty() {
            return Err(Error::InvalidParams(
                "growth_curve needs at least one keyframe".to_string(),
            ));
        }
        Ok(())
    }
}

/// `(value - a) / (b - a)` clamped to `[0, 1]`; zero when `a == b`
fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if a == b {
        return 0.0;
    }
    ((value - a) / (b - a)).clamp(0.0, 1.0)
}
