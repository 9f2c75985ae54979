//! Audio analysis configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Smallest window with a bin on each side of an in-band peak
pub const MIN_FFT_SIZE: usize = 4;

/// Amplitude/pitch analysis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Audio sample rate (Hz)
    pub sample_rate_hz: usize,

    /// FFT window size (must be power of 2)
    pub fft_size: usize,

    /// Analysis interval for threaded sources (milliseconds)
    pub update_interval_ms: u64,

    /// Pitch search band (Hz)
    pub pitch_range_hz: (f32, f32),

    /// RMS gain applied to produce the amplitude signal
    pub amplitude_gain: f32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 44100,
            fft_size: 2048,
            update_interval_ms: 20,
            pitch_range_hz: (60.0, 1200.0),
            amplitude_gain: 4.0,
        }
    }
}

impl AnalyzerConfig {
    /// Convert frequency (Hz) to FFT bin index
    pub fn hz_to_bin(&self, hz: f32) -> usize {
        ((hz * self.fft_size as f32) / self.sample_rate_hz as f32) as usize
    }

    /// Centre frequency of an FFT bin (Hz), fractional bins allowed
    pub fn bin_to_hz(&self, bin: f32) -> f32 {
        bin * self.sample_rate_hz as f32 / self.fft_size as f32
    }

    /// Validate configuration (FFT size must be power of 2, etc.)
    pub fn validate(&self) -> Result<()> {
        if !self.fft_size.is_power_of_two() {
            return Err(Error::InvalidParams(format!(
                "FFT size must be power of 2, got {}",
                self.fft_size
            )));
        }
        if self.fft_size < MIN_FFT_SIZE {
            return Err(Error::InvalidParams(format!(
                "FFT size must be at least {MIN_FFT_SIZE}, got {}",
                self.fft_size
            )));
        }
        if self.sample_rate_hz == 0 {
            return Err(Error::InvalidParams("Sample rate must be > 0".to_string()));
        }
        if self.pitch_range_hz.0 >= self.pitch_range_hz.1 {
            return Err(Error::InvalidParams(
                "pitch range must be increasing".to_string(),
            ));
        }
        Ok(())
    }
}

/// Audio constants (compile-time, match Glicol engine setup)
pub mod audio_constants {
    /// Audio block size (samples per buffer)
    pub const BLOCK_SIZE: usize = 128;
}
