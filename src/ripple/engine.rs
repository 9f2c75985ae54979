//! Ripple lifecycle: spawning from input, live updates, trailing echoes and
//! retirement.

use std::collections::VecDeque;

use glam::Vec2;

use super::event::{Channel, WaveEvent};
use crate::input::InputSignal;
use crate::params::RippleParams;

/// Owns the live ripple set and the per-channel `Idle → Active → Idle`
/// state machine.
///
/// Call [`RippleEngine::update`] once per frame with the frame's input
/// signal, before the height field is composited.
#[derive(Debug, Clone)]
pub struct RippleEngine {
    params: RippleParams,
    /// Field diagonal in cells; ripples past it are retired
    diagonal: f32,
    events: VecDeque<WaveEvent>,
    next_id: u64,

    input_active: bool,
    current_up: Option<u64>,
    current_down: Option<u64>,
    last_input_time: f32,
    recent_amplitudes: Vec<f32>,
    recent_pitches: Vec<f32>,
    signal: InputSignal,

    input_point: Vec2,
    up_pin: Vec2,
    down_pin: Vec2,
}

impl RippleEngine {
    /// Create an engine for a `field_size × field_size` height field
    pub fn new(params: RippleParams, field_size: usize) -> Self {
        let centre = Vec2::splat((field_size as f32 - 1.0) * 0.5);
        Self {
            params,
            diagonal: field_size as f32 * std::f32::consts::SQRT_2,
            events: VecDeque::new(),
            next_id: 1,
            input_active: false,
            current_up: None,
            current_down: None,
            last_input_time: 0.0,
            recent_amplitudes: Vec::new(),
            recent_pitches: Vec::new(),
            signal: InputSignal::default(),
            input_point: centre,
            up_pin: centre,
            down_pin: centre,
        }
    }

    pub fn params(&self) -> &RippleParams {
        &self.params
    }

    /// Live ripples, oldest first
    pub fn events(&self) -> impl ExactSizeIterator<Item = &WaveEvent> + '_ {
        self.events.iter()
    }

    pub fn live_count(&self) -> usize {
        self.events.len()
    }

    pub fn is_active(&self) -> bool {
        self.input_active
    }

    pub fn speed(&self) -> f32 {
        self.params.speed
    }

    /// Ripple currently receiving updates on the up channel
    pub fn current_up(&self) -> Option<&WaveEvent> {
        self.current_up.and_then(|id| self.find(id))
    }

    /// Ripple currently receiving updates on the down channel
    pub fn current_down(&self) -> Option<&WaveEvent> {
        self.current_down.and_then(|id| self.find(id))
    }

    /// Where pulse-mode up ripples originate
    pub fn set_input_point(&mut self, point: Vec2) {
        self.input_point = point;
    }

    /// Move the up pin and detach the current up ripple; if input is still
    /// active a fresh ripple spawns at the pin on the next frame.
    pub fn move_up_pin(&mut self, point: Vec2) {
        self.up_pin = point;
        self.input_point = point;
        self.current_up = None;
    }

    pub fn move_down_pin(&mut self, point: Vec2) {
        self.down_pin = point;
    }

    /// Insert an externally built ripple, subject to the capacity cap
    pub fn insert(&mut self, event: WaveEvent) -> u64 {
        self.push_event(event)
    }

    /// Drop every ripple and return to idle
    pub fn clear(&mut self) {
        self.events.clear();
        self.input_active = false;
        self.current_up = None;
        self.current_down = None;
    }

    /// Advance one frame
    pub fn update(&mut self, signal: InputSignal, now: f32) {
        self.signal = signal;
        self.recent_amplitudes.push(signal.amplitude);
        self.recent_pitches.push(signal.pitch);

        if signal.amplitude > self.params.min_amplitude {
            self.last_input_time = now;
        }

        self.retire_and_trail(now);

        if !self.input_active {
            if signal.amplitude > self.params.min_amplitude {
                self.input_active = true;
                self.spawn_channels(now);
            }
        } else if signal.amplitude < self.params.min_amplitude
            && now > self.last_input_time + self.params.ripple_split_time_gap
        {
            self.release();
        } else {
            let speed = self.params.speed;
            let current_live = self.current_up().is_some_and(|e| e.is_live(now, speed));
            if !current_live {
                self.spawn_channels(now);
            } else if self.params.use_curves {
                self.append_keyframes(now);
            } else {
                self.refresh_current();
            }
        }
    }

    /// Remove ripples past the field and spawn echoes behind finished ones
    fn retire_and_trail(&mut self, now: f32) {
        let speed = self.params.speed;
        let diagonal = self.diagonal;
        let max_generation = self.params.trail_out_ripples;
        let proportion = self.params.trail_proportion;
        let mut echoes = Vec::new();

        self.events.retain_mut(|event| {
            if !event.is_visible(now, speed, diagonal) {
                log::debug!("removed ripple {}", event.id);
                return false;
            }
            if let Some(generation) = event.trail {
                if generation < max_generation && !event.is_live(now, speed) {
                    echoes.push(event.trail_echo(now, proportion, generation + 1));
                    event.trail = None;
                }
            }
            true
        });

        for echo in echoes {
            log::debug!(
                "trailing ripple, generation {:?}, height {:.3}",
                echo.trail,
                echo.height
            );
            self.push_event(echo);
        }
    }

    /// `Active → Idle`
    fn release(&mut self) {
        self.input_active = false;
        let up = self.current_up.take();
        let down = self.current_down.take();
        if self.params.use_curves {
            // Sampled ripples are finalised as they are; no echoes
            return;
        }
        for id in [up, down].into_iter().flatten() {
            if let Some(event) = self.find_mut(id) {
                event.trail = Some(0);
            }
        }
    }

    fn spawn_channels(&mut self, now: f32) {
        let up = self.make_ripple(Channel::Up, now);
        self.current_up = Some(self.push_event(up));
        if self.params.use_down_pin {
            let down = self.make_ripple(Channel::Down, now);
            self.current_down = Some(self.push_event(down));
        } else {
            self.current_down = None;
        }
    }

    fn make_ripple(&mut self, channel: Channel, now: f32) -> WaveEvent {
        log::debug!("new ripple, down: {}", channel == Channel::Down);

        let height = self.params.amplitude_to_height(self.signal.amplitude);
        let width = self.params.pitch_to_width(self.signal.pitch);

        self.recent_amplitudes.clear();
        self.recent_pitches.clear();
        self.recent_amplitudes.push(self.signal.amplitude);
        self.recent_pitches.push(self.signal.pitch);

        let origin = match (self.params.use_curves, channel) {
            (true, Channel::Up) => self.up_pin,
            (_, Channel::Down) => self.down_pin,
            (false, Channel::Up) => self.input_point,
        };

        if self.params.use_curves {
            let initial = height * self.growth_multiplier(0.0);
            WaveEvent::sampled(origin, now, height, width, channel, initial)
        } else {
            WaveEvent::pulse(origin, now, height, width, channel)
        }
    }

    /// Continuous mode: track the rolling mean of the input
    fn refresh_current(&mut self) {
        let (Some(amplitude), Some(pitch)) =
            (mean(&self.recent_amplitudes), mean(&self.recent_pitches))
        else {
            return;
        };
        let height = self.params.amplitude_to_height(amplitude);
        let width = self.params.pitch_to_width(pitch);
        for id in [self.current_up, self.current_down].into_iter().flatten() {
            if let Some(event) = self.find_mut(id) {
                event.height = height;
                event.width = width;
            }
        }
    }

    /// Sampled mode: append a keyframe once `keyframe_interval` has passed
    fn append_keyframes(&mut self, now: f32) {
        let interval = self.params.keyframe_interval;
        let due = self.current_up().and_then(|event| {
            let growth = event.growth.as_ref()?;
            (now > growth.last_keyframe_time + interval).then_some(event.start_time)
        });
        let Some(start_time) = due else {
            return;
        };
        let Some(amplitude) = mean(&self.recent_amplitudes) else {
            return;
        };

        let multiplier =
            self.growth_multiplier((now - start_time) / self.params.height_growth_duration);
        let value = self.params.amplitude_to_height(amplitude) * multiplier;

        for id in [self.current_up, self.current_down].into_iter().flatten() {
            if let Some(event) = self.find_mut(id) {
                let elapsed = now - event.start_time;
                if let Some(growth) = event.growth.as_mut() {
                    growth.last_keyframe_time = now;
                    if let Err(e) = growth.samples.push(elapsed, value) {
                        log::trace!("skipped keyframe: {e}");
                    }
                }
            }
        }
        self.recent_amplitudes.clear();
        self.recent_pitches.clear();
    }

    fn growth_multiplier(&self, t: f32) -> f32 {
        self.params.growth_curve.evaluate(t).unwrap_or(1.0)
    }

    fn push_event(&mut self, mut event: WaveEvent) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        event.id = id;
        self.events.push_back(event);
        while self.events.len() > self.params.max_ripples {
            if let Some(evicted) = self.events.pop_front() {
                log::debug!("evicted ripple {} (cap {})", evicted.id, self.params.max_ripples);
            }
        }
        id
    }

    fn find(&self, id: u64) -> Option<&WaveEvent> {
        self.events.iter().find(|e| e.id == id)
    }

    fn find_mut(&mut self, id: u64) -> Option<&mut WaveEvent> {
        self.events.iter_mut().find(|e| e.id == id)
    }
}

fn mean(values: &[f32]) -> Option<f32> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f32>() / values.len() as f32)
    }
}
