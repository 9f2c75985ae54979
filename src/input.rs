//! Input signal and the sources that produce it.
//!
//! The simulation reads one [`InputSignal`] per frame. Sources range from a
//! held "mouse button" to a slot shared with an audio analysis thread.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

/// Amplitude and pitch pair sampled once per frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSignal {
    /// Loudness (dimensionless, compared against `min_amplitude`)
    pub amplitude: f32,
    /// Pitch (Hz)
    pub pitch: f32,
}

impl InputSignal {
    pub fn new(amplitude: f32, pitch: f32) -> Self {
        Self { amplitude, pitch }
    }

    pub fn silent(pitch: f32) -> Self {
        Self {
            amplitude: 0.0,
            pitch,
        }
    }
}

/// Producer of the per-frame input signal
pub trait InputSource {
    fn read(&mut self, now: f32) -> InputSignal;
}

impl<S: InputSource + ?Sized> InputSource for Box<S> {
    fn read(&mut self, now: f32) -> InputSignal {
        (**self).read(now)
    }
}

/// Mouse-mode input: a fixed amplitude while "pressed", silence otherwise
#[derive(Debug, Clone)]
pub struct HeldInput {
    pub amplitude: f32,
    pub pitch: f32,
    pressed: bool,
}

impl HeldInput {
    pub fn new(amplitude: f32, pitch: f32) -> Self {
        Self {
            amplitude,
            pitch,
            pressed: false,
        }
    }

    pub fn set_pressed(&mut self, pressed: bool) {
        self.pressed = pressed;
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }
}

impl InputSource for HeldInput {
    fn read(&mut self, _now: f32) -> InputSignal {
        let amplitude = if self.pressed { self.amplitude } else { 0.0 };
        InputSignal::new(amplitude, self.pitch)
    }
}

/// One sounding interval of a scripted timeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputSegment {
    pub start_s: f32,
    pub end_s: f32,
    pub amplitude: f32,
    pub pitch: f32,
}

/// Timeline of sounding segments; silent between them.
///
/// During silence the pitch of the most recent segment is held so that a
/// ripple's width does not jump when its input stops.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    segments: Vec<InputSegment>,
    last_pitch: f32,
}

impl ScriptedInput {
    pub fn new(mut segments: Vec<InputSegment>) -> Self {
        segments.sort_by(|a, b| a.start_s.total_cmp(&b.start_s));
        let last_pitch = segments.first().map(|s| s.pitch).unwrap_or_default();
        Self {
            segments,
            last_pitch,
        }
    }

    /// Regular pulses: `on_s` sounding, `off_s` silent, repeated `count` times
    pub fn pulses(count: usize, on_s: f32, off_s: f32, amplitude: f32, pitch: f32) -> Self {
        let segments = (0..count)
            .map(|i| {
                let start_s = i as f32 * (on_s + off_s);
                InputSegment {
                    start_s,
                    end_s: start_s + on_s,
                    amplitude,
                    pitch,
                }
            })
            .collect();
        Self::new(segments)
    }

    pub fn segments(&self) -> &[InputSegment] {
        &self.segments
    }
}

impl InputSource for ScriptedInput {
    fn read(&mut self, now: f32) -> InputSignal {
        match self
            .segments
            .iter()
            .find(|s| now >= s.start_s && now < s.end_s)
        {
            Some(segment) => {
                self.last_pitch = segment.pitch;
                InputSignal::new(segment.amplitude, segment.pitch)
            }
            None => InputSignal::silent(self.last_pitch),
        }
    }
}

/// Signal slot written by an audio thread and read by the frame loop
#[derive(Debug, Clone, Default)]
pub struct SharedInput {
    slot: Arc<Mutex<InputSignal>>,
    /// Override tracked pitch with a fixed value
    pub lock_pitch: Option<f32>,
}

impl SharedInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for the producing side
    pub fn slot(&self) -> Arc<Mutex<InputSignal>> {
        Arc::clone(&self.slot)
    }

    /// Overwrite the current signal
    pub fn write(&self, signal: InputSignal) {
        let mut guard = self.slot.lock().unwrap_or_else(|p| p.into_inner());
        *guard = signal;
    }
}

impl InputSource for SharedInput {
    fn read(&mut self, _now: f32) -> InputSignal {
        let mut signal = *self.slot.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(pitch) = self.lock_pitch {
            signal.pitch = pitch;
        }
        signal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_held_input() {
        let mut input = HeldInput::new(0.8, 300.0);
        assert_eq!(input.read(0.0).amplitude, 0.0);
        input.set_pressed(true);
        assert_eq!(input.read(0.0), InputSignal::new(0.8, 300.0));
    }

    #[test]
    fn test_scripted_pulses() {
        let mut input = ScriptedInput::pulses(2, 0.5, 1.0, 0.6, 200.0);
        assert_eq!(input.read(0.1).amplitude, 0.6);
        assert_eq!(input.read(0.7).amplitude, 0.0);
        assert_eq!(input.read(0.7).pitch, 200.0);
        assert_eq!(input.read(1.6).amplitude, 0.6);
        assert_eq!(input.read(2.1).amplitude, 0.0);
    }

    #[test]
    fn test_shared_input_with_pitch_lock() {
        let mut input = SharedInput::new();
        input.write(InputSignal::new(0.3, 440.0));
        assert_eq!(input.read(0.0), InputSignal::new(0.3, 440.0));

        input.lock_pitch = Some(220.0);
        assert_eq!(input.read(0.0).pitch, 220.0);

        *input.slot().lock().unwrap() = InputSignal::new(0.9, 100.0);
        assert_eq!(input.read(0.0).amplitude, 0.9);
    }
}
