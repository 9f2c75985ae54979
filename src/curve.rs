//! Keyframed scalar curves.
//!
//! Used for the growth envelope of sampled ripples, the growth-rate shaping
//! curve, species altitude response and entity grow/die animation.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How values between two keyframes are produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    #[default]
    Linear,
    /// Cubic Hermite with finite-difference tangents
    Cubic,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: f32,
    pub value: f32,
}

/// Ordered, append-only sequence of keyframes.
///
/// Evaluation outside the keyed range clamps to the first or last value.
/// Deserialized curves are rebuilt through [`Curve::push`], so ordering and
/// finiteness hold for loaded configs too.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "CurveRepr")]
pub struct Curve {
    keys: Vec<Keyframe>,
    interpolation: Interpolation,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct CurveRepr {
    keys: Vec<Keyframe>,
    interpolation: Interpolation,
}

impl TryFrom<CurveRepr> for Curve {
    type Error = Error;

    fn try_from(repr: CurveRepr) -> Result<Self> {
        let mut curve = Curve::new(repr.interpolation);
        for key in repr.keys {
            curve.push(key.time, key.value)?;
        }
        Ok(curve)
    }
}

impl Curve {
    pub fn new(interpolation: Interpolation) -> Self {
        Self {
            keys: Vec::new(),
            interpolation,
        }
    }

    /// Linear curve through `points`; points must have increasing times
    pub fn linear(points: &[(f32, f32)]) -> Self {
        Self::from_points(points, Interpolation::Linear)
    }

    pub fn cubic(points: &[(f32, f32)]) -> Self {
        Self::from_points(points, Interpolation::Cubic)
    }

    fn from_points(points: &[(f32, f32)], interpolation: Interpolation) -> Self {
        let mut curve = Self::new(interpolation);
        for &(time, value) in points {
            // Out-of-order points are dropped rather than reordered
            let _ = curve.push(time, value);
        }
        curve
    }

    /// Single-key curve evaluating to `value` everywhere
    pub fn constant(value: f32) -> Self {
        Self::linear(&[(0.0, value)])
    }

    /// Append a keyframe after the current last one
    pub fn push(&mut self, time: f32, value: f32) -> Result<()> {
        if !time.is_finite() || !value.is_finite() {
            return Err(Error::NonFinite {
                what: "curve keyframe",
            });
        }
        if let Some(last) = self.keys.last() {
            if time <= last.time {
                return Err(Error::InvalidParams(format!(
                    "keyframe time {time} does not follow last keyframe time {}",
                    last.time
                )));
            }
        }
        self.keys.push(Keyframe { time, value });
        Ok(())
    }

    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    /// Time of the last keyframe
    pub fn last_time(&self) -> Option<f32> {
        self.keys.last().map(|k| k.time)
    }

    /// Evaluate at `t`, clamping outside the keyed range
    pub fn evaluate(&self, t: f32) -> Result<f32> {
        let (first, last) = match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(Error::EmptyCurve),
        };
        if t.is_nan() {
            return Err(Error::NonFinite {
                what: "curve evaluation time",
            });
        }
        if t <= first.time {
            return Ok(first.value);
        }
        if t >= last.time {
            return Ok(last.value);
        }

        // First key strictly after t; always in 1..len here
        let hi = self.keys.partition_point(|k| k.time <= t);
        let lo = hi - 1;
        let (a, b) = (self.keys[lo], self.keys[hi]);
        let span = b.time - a.time;
        let s = (t - a.time) / span;

        let value = match self.interpolation {
            Interpolation::Linear => a.value + (b.value - a.value) * s,
            Interpolation::Cubic => {
                let m0 = self.tangent(lo) * span;
                let m1 = self.tangent(hi) * span;
                let s2 = s * s;
                let s3 = s2 * s;
                (2.0 * s3 - 3.0 * s2 + 1.0) * a.value
                    + (s3 - 2.0 * s2 + s) * m0
                    + (-2.0 * s3 + 3.0 * s2) * b.value
                    + (s3 - s2) * m1
            }
        };
        Ok(value)
    }

    /// Slope at key `i` from its neighbours (one-sided at the ends)
    fn tangent(&self, i: usize) -> f32 {
        let prev = self.keys[i.saturating_sub(1)];
        let next = self.keys[(i + 1).min(self.keys.len() - 1)];
        let dt = next.time - prev.time;
        if dt > 0.0 {
            (next.value - prev.value) / dt
        } else {
            0.0
        }
    }
}
