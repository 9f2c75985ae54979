//! Amplitude and pitch extraction from sample blocks.

use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::error::Result;
use crate::input::InputSignal;
use crate::params::AnalyzerConfig;

/// Peak magnitudes below this are treated as silence
const SILENCE_MAGNITUDE: f32 = 1e-4;

/// Reduces sample windows to an [`InputSignal`].
///
/// Amplitude is the window's RMS times `amplitude_gain`. Pitch is the
/// strongest bin inside the configured band, refined by parabolic
/// interpolation. During silence the previous pitch is held.
pub struct Analyzer {
    config: AnalyzerConfig,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    last_pitch: f32,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        config.validate()?;
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(config.fft_size);
        let window = (0..config.fft_size)
            .map(|i| hann_window(i, config.fft_size))
            .collect();
        let (lo, hi) = config.pitch_range_hz;
        Ok(Self {
            fft,
            window,
            buffer: vec![Complex::new(0.0, 0.0); config.fft_size],
            // Centre of the band (geometric) until a pitch is heard
            last_pitch: (lo * hi).sqrt(),
            config,
        })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Samples consumed per analysis
    pub fn window_size(&self) -> usize {
        self.config.fft_size
    }

    /// Analyse the most recent `fft_size` samples of `samples`
    pub fn analyze(&mut self, samples: &[f32]) -> InputSignal {
        let start = samples.len().saturating_sub(self.config.fft_size);
        let recent = &samples[start..];
        let amplitude = rms(recent) * self.config.amplitude_gain;
        if let Some(pitch) = self.dominant_pitch(recent) {
            self.last_pitch = pitch;
        }
        InputSignal::new(amplitude, self.last_pitch)
    }

    /// Strongest frequency in the pitch band, `None` for silence
    pub fn dominant_pitch(&mut self, samples: &[f32]) -> Option<f32> {
        let size = self.config.fft_size;
        let start = samples.len().saturating_sub(size);
        let recent = &samples[start..];
        // Shorter input is zero-padded at the front
        let pad = size - recent.len();

        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let sample = if i < pad { 0.0 } else { recent[i - pad] };
            *slot = Complex::new(sample * self.window[i], 0.0);
        }
        self.fft.process(&mut self.buffer);

        let nyquist = size / 2;
        let (lo, hi) = self.config.pitch_range_hz;
        let first = self.config.hz_to_bin(lo).max(1);
        let last = self.config.hz_to_bin(hi).min(nyquist - 1);
        if first > last {
            return None;
        }

        let magnitude = |bin: usize| self.buffer[bin].norm();
        let (peak, peak_mag) = (first..=last)
            .map(|bin| (bin, magnitude(bin)))
            .fold((first, 0.0_f32), |best, cur| if cur.1 > best.1 { cur } else { best });
        if peak_mag < SILENCE_MAGNITUDE {
            return None;
        }

        let (a, b, c) = (magnitude(peak - 1), peak_mag, magnitude(peak + 1));
        let denom = a - 2.0 * b + c;
        let offset = if denom.abs() > f32::EPSILON {
            (0.5 * (a - c) / denom).clamp(-0.5, 0.5)
        } else {
            0.0
        };
        Some(self.config.bin_to_hz(peak as f32 + offset))
    }
}

/// Root mean square of a block; zero when empty
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
}

/// Hann window function for FFT analysis
pub fn hann_window(index: usize, size: usize) -> f32 {
    0.5 * (1.0 - ((2.0 * PI * index as f32) / (size as f32 - 1.0)).cos())
}
