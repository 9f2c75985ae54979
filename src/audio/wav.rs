//! WAV file playback as an input source.

use std::path::Path;

use hound::{SampleFormat, WavReader};

use super::analysis::Analyzer;
use crate::error::{Error, Result};
use crate::input::{InputSignal, InputSource};
use crate::params::AnalyzerConfig;

/// Decoded mono track analysed at the simulation clock.
///
/// Each read analyses the window of samples ending at `now`; past the end
/// of the track the source falls silent.
pub struct WavInput {
    samples: Vec<f32>,
    sample_rate: u32,
    analyzer: Analyzer,
}

impl WavInput {
    /// Decode a WAV file; its sample rate overrides `config.sample_rate_hz`
    pub fn open(path: impl AsRef<Path>, config: AnalyzerConfig) -> Result<Self> {
        let reader = WavReader::open(path.as_ref())?;
        let spec = reader.spec();
        let channels = spec.channels.max(1) as usize;

        let interleaved: Vec<f32> = match spec.sample_format {
            SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<std::result::Result<_, _>>()?,
            SampleFormat::Int => {
                let scale = (1_i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<std::result::Result<_, _>>()?
            }
        };

        // Mix down to mono
        let samples = interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect();

        log::info!(
            "loaded {} ({} Hz, {} channel(s))",
            path.as_ref().display(),
            spec.sample_rate,
            channels
        );
        Self::from_samples(samples, spec.sample_rate, config)
    }

    /// Wrap already decoded mono samples
    pub fn from_samples(samples: Vec<f32>, sample_rate: u32, config: AnalyzerConfig) -> Result<Self> {
        if sample_rate == 0 {
            return Err(Error::InvalidParams("WAV sample rate is zero".to_string()));
        }
        let analyzer = Analyzer::new(AnalyzerConfig {
            sample_rate_hz: sample_rate as usize,
            ..config
        })?;
        Ok(Self {
            samples,
            sample_rate,
            analyzer,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Track length (seconds)
    pub fn duration_s(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

impl InputSource for WavInput {
    fn read(&mut self, now: f32) -> InputSignal {
        let end = (now.max(0.0) * self.sample_rate as f32) as usize;
        if end > self.samples.len() {
            return self.analyzer.analyze(&[]);
        }
        let start = end.saturating_sub(self.analyzer.window_size());
        self.analyzer.analyze(&self.samples[start..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn write_sine(path: &Path, freq_hz: f32, seconds: f32, channels: u16) {
        let spec = hound::WavSpec {
            channels,
            sample_rate: 22050,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        let frames = (seconds * 22050.0) as usize;
        for i in 0..frames {
            let v = (2.0 * PI * freq_hz * i as f32 / 22050.0).sin() * 0.5;
            for _ in 0..channels {
                writer.write_sample((v * i16::MAX as f32) as i16).unwrap();
            }
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_wav_tone_drives_signal() {
        let path = std::env::temp_dir().join(format!("ripplefield_tone_{}.wav", std::process::id()));
        write_sine(&path, 330.0, 1.0, 2);

        let mut input = WavInput::open(&path, AnalyzerConfig::default()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(input.sample_rate(), 22050);
        assert!((input.duration_s() - 1.0).abs() < 1e-3);

        let signal = input.read(0.5);
        assert!(signal.amplitude > 1.0, "amplitude {}", signal.amplitude);
        assert!((signal.pitch - 330.0).abs() < 5.0, "pitch {}", signal.pitch);

        // Past the end: silent, pitch held
        let after = input.read(2.0);
        assert_eq!(after.amplitude, 0.0);
        assert_eq!(after.pitch, signal.pitch);
    }

    #[test]
    fn test_start_of_track_is_quiet() {
        let samples = vec![0.5; 1000];
        let mut input = WavInput::from_samples(samples, 1000, AnalyzerConfig::default()).unwrap();
        assert_eq!(input.read(0.0).amplitude, 0.0);
    }

    #[test]
    fn test_zero_sample_rate_rejected() {
        assert!(WavInput::from_samples(vec![], 0, AnalyzerConfig::default()).is_err());
    }
}
