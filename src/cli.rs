//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use ripplefield::error::Result;
use ripplefield::params::SimParams;

/// Where the per-frame amplitude and pitch come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// A single press of the mouse button
    Held,
    /// Regular on/off pulses
    Scripted,
    Wav,
    Synth,
    Mic,
}

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "ripplefield")]
#[command(about = "Headless audio-driven ripple terrain simulation", long_about = None)]
pub struct Args {
    /// Number of frames to simulate
    #[arg(long, default_value = "300")]
    pub frames: u64,

    /// Simulation frames per second
    #[arg(long, default_value = "60")]
    pub fps: u32,

    /// Grid size in cells (overrides config)
    #[arg(long)]
    pub size: Option<usize>,

    /// RNG seed (overrides config)
    #[arg(long)]
    pub seed: Option<u64>,

    /// JSON parameter file
    #[arg(long, value_name = "JSON")]
    pub config: Option<PathBuf>,

    /// Use sampled growth curves instead of analytic pulses
    #[arg(long)]
    pub curves: bool,

    /// Pair every up ripple with a down ripple at the down pin
    #[arg(long)]
    pub down_pin: bool,

    /// Input source: held, scripted (default), wav, synth, mic
    #[arg(long, value_name = "SOURCE", default_value = "scripted")]
    pub input: String,

    /// WAV file for the wav input
    #[arg(long, value_name = "PATH")]
    pub wav: Option<PathBuf>,

    /// Amplitude of held and scripted input
    #[arg(long, default_value = "0.5")]
    pub amplitude: f32,

    /// Pitch of held and scripted input (Hz)
    #[arg(long, value_name = "HZ", default_value = "220")]
    pub pitch: f32,

    /// How long the held input stays pressed (seconds)
    #[arg(long, value_name = "SECONDS", default_value = "1.0")]
    pub hold: f32,

    /// Replace the tracked microphone pitch with a fixed value (Hz)
    #[arg(long, value_name = "HZ")]
    pub lock_pitch: Option<f32>,

    /// Start with entity spawning disabled
    #[arg(long)]
    pub no_spawn: bool,

    /// Write the final height field as a greyscale PNG
    #[arg(long, value_name = "PATH")]
    pub export_png: Option<PathBuf>,

    /// Write the final terrain mesh as OBJ
    #[arg(long, value_name = "PATH")]
    pub export_obj: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Parse input source from command-line arguments
    pub fn parse_input_kind(&self) -> InputKind {
        match self.input.to_lowercase().as_str() {
            "held" | "mouse" => InputKind::Held,
            "scripted" => InputKind::Scripted,
            "wav" => InputKind::Wav,
            "synth" => InputKind::Synth,
            "mic" | "microphone" => InputKind::Mic,
            other => {
                log::warn!("Unknown input source '{}', using scripted", other);
                InputKind::Scripted
            }
        }
    }

    /// Config file (or defaults) with command-line overrides applied
    pub fn load_params(&self) -> Result<SimParams> {
        let mut params = match &self.config {
            Some(path) => {
                log::info!("loading parameters from {}", path.display());
                SimParams::from_json_file(path)?
            }
            None => SimParams::default(),
        };
        self.apply_overrides(&mut params);
        params.validate()?;
        Ok(params)
    }

    fn apply_overrides(&self, params: &mut SimParams) {
        if let Some(size) = self.size {
            params.terrain.size = size;
        }
        if self.seed.is_some() {
            params.seed = self.seed;
        }
        params.ripple.use_curves |= self.curves;
        params.ripple.use_down_pin |= self.down_pin;
        if self.no_spawn {
            params.population.spawn_enabled = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_overrides() {
        let args = Args::parse_from(["ripplefield", "--size", "32", "--curves", "--seed", "9"]);
        assert_eq!(args.frames, 300);
        assert_eq!(args.parse_input_kind(), InputKind::Scripted);

        let params = args.load_params().unwrap();
        assert_eq!(params.terrain.size, 32);
        assert_eq!(params.seed, Some(9));
        assert!(params.ripple.use_curves);
        assert!(!params.ripple.use_down_pin);
        assert!(params.population.spawn_enabled);
    }

    #[test]
    fn test_input_kinds() {
        let kind = |s: &str| Args::parse_from(["ripplefield", "--input", s]).parse_input_kind();
        assert_eq!(kind("held"), InputKind::Held);
        assert_eq!(kind("WAV"), InputKind::Wav);
        assert_eq!(kind("mic"), InputKind::Mic);
        assert_eq!(kind("nonsense"), InputKind::Scripted);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let args = Args::parse_from(["ripplefield", "--size", "1"]);
        assert!(args.load_params().is_err());
    }
}
