//! A single propagating ripple and its two propagation models.

use std::f32::consts::PI;

use glam::Vec2;

use crate::curve::Curve;

/// Exponent applied to the local time before sampling a growth curve
const CURVE_TIME_EXPONENT: f32 = 1.1;

/// Input channel a ripple belongs to; down ripples push the surface down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Up,
    Down,
}

impl Channel {
    pub fn sign(self) -> f32 {
        match self {
            Channel::Up => 1.0,
            Channel::Down => -1.0,
        }
    }
}

/// Sampled amplitude envelope of a curve-mode ripple
#[derive(Debug, Clone)]
pub struct Growth {
    pub samples: Curve,
    pub last_keyframe_time: f32,
}

/// One propagating disturbance
#[derive(Debug, Clone)]
pub struct WaveEvent {
    pub(crate) id: u64,
    /// Centre in grid space
    pub origin: Vec2,
    pub start_time: f32,
    /// Peak magnitude (always stored positive; see [`Channel`])
    pub height: f32,
    /// Pulse width in cells
    pub width: f32,
    /// Echo depth still allowed to spawn; `None` once spent or never eligible
    pub trail: Option<u32>,
    pub channel: Channel,
    /// Present only under the sampled-curve model
    pub growth: Option<Growth>,
}

impl WaveEvent {
    /// Analytic-pulse ripple
    pub fn pulse(origin: Vec2, start_time: f32, height: f32, width: f32, channel: Channel) -> Self {
        Self {
            id: 0,
            origin,
            start_time,
            height,
            width,
            trail: None,
            channel,
            growth: None,
        }
    }

    /// Sampled-curve ripple whose envelope starts with `(0, initial_value)`
    pub fn sampled(
        origin: Vec2,
        start_time: f32,
        height: f32,
        width: f32,
        channel: Channel,
        initial_value: f32,
    ) -> Self {
        let mut samples = Curve::default();
        if let Err(e) = samples.push(0.0, initial_value) {
            log::trace!("initial growth sample rejected, starting from 0: {e}");
            samples = Curve::constant(0.0);
        }
        Self {
            growth: Some(Growth {
                samples,
                last_keyframe_time: start_time,
            }),
            ..Self::pulse(origin, start_time, height, width, channel)
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn elapsed(&self, now: f32) -> f32 {
        now - self.start_time
    }

    /// Time of the last growth sample; zero for pulse ripples
    pub fn last_sample_time(&self) -> f32 {
        self.growth
            .as_ref()
            .and_then(|g| g.samples.last_time())
            .unwrap_or(0.0)
    }

    /// Still contributing as a primary pulse
    pub fn is_live(&self, now: f32, speed: f32) -> bool {
        let elapsed = self.elapsed(now);
        match self.growth {
            Some(_) => elapsed < self.last_sample_time() + self.width,
            None => elapsed < self.width / speed,
        }
    }

    /// Trailing edge still within the field diagonal
    pub fn is_visible(&self, now: f32, speed: f32, diagonal: f32) -> bool {
        let elapsed = self.elapsed(now);
        match self.growth {
            Some(_) => (elapsed - self.last_sample_time()) * speed < diagonal,
            None => elapsed * speed - self.width < diagonal,
        }
    }

    /// Diminished echo of this ripple starting at `now`
    pub fn trail_echo(&self, now: f32, proportion: f32, generation: u32) -> Self {
        Self {
            trail: Some(generation),
            ..Self::pulse(
                self.origin,
                now,
                self.height * proportion,
                self.width,
                self.channel,
            )
        }
    }

    /// Frame-fixed view of this ripple for per-cell evaluation
    pub fn front(&self, now: f32, speed: f32) -> WaveFront<'_> {
        let radius = self.elapsed(now) * speed;
        let (profile, depth) = match &self.growth {
            Some(growth) => {
                let last_time = self.last_sample_time();
                let profile = Profile::Sampled {
                    curve: &growth.samples,
                    last_time,
                    speed,
                };
                (profile, last_time * speed)
            }
            None => {
                let profile = Profile::Pulse {
                    width: self.width,
                    height: self.height,
                };
                (profile, self.width)
            }
        };
        WaveFront {
            origin: self.origin,
            radius,
            inner: (radius - depth).max(0.0),
            sign: self.channel.sign(),
            profile,
        }
    }

    /// Contribution at `distance` from the origin at time `now`
    pub fn contribution(&self, distance: f32, now: f32, speed: f32) -> f32 {
        self.front(now, speed).contribution(distance)
    }
}

#[derive(Debug, Clone, Copy)]
enum Profile<'a> {
    Pulse {
        width: f32,
        height: f32,
    },
    Sampled {
        curve: &'a Curve,
        last_time: f32,
        speed: f32,
    },
}

/// Ripple state frozen for one frame: origin, radius and profile.
///
/// Built once per ripple per frame so the per-cell loop does no allocation
/// and rejects cells outside the band before any trigonometry.
#[derive(Debug, Clone, Copy)]
pub struct WaveFront<'a> {
    pub origin: Vec2,
    /// Leading edge distance from the origin
    pub radius: f32,
    /// Trailing edge distance from the origin
    pub inner: f32,
    sign: f32,
    profile: Profile<'a>,
}

impl WaveFront<'_> {
    /// Cheap reject on squared distance; `false` means zero contribution
    #[inline]
    pub fn may_reach(&self, distance_sq: f32) -> bool {
        self.radius >= 0.0
            && distance_sq <= self.radius * self.radius
            && distance_sq >= self.inner * self.inner
    }

    /// Signed height contribution at `distance` from the origin
    #[inline]
    pub fn contribution(&self, distance: f32) -> f32 {
        let behind = self.radius - distance;
        match self.profile {
            Profile::Pulse { width, height } => {
                let phase = behind / width;
                if !(0.0..=1.0).contains(&phase) {
                    return 0.0;
                }
                (phase * PI * 2.0).sin() * height * self.sign
            }
            Profile::Sampled {
                curve,
                last_time,
                speed,
            } => {
                let t = behind / speed;
                if !(t > 0.0 && t < last_time) {
                    return 0.0;
                }
                curve
                    .evaluate(t.powf(CURVE_TIME_EXPONENT))
                    .map(|v| v * self.sign)
                    .unwrap_or(0.0)
            }
        }
    }

    #[inline]
    pub fn contribution_at(&self, point: Vec2) -> f32 {
        self.contribution(point.distance(self.origin))
    }
}
