//! Audio-driven input sources.
//!
//! Every source reduces a stream of samples to the per-frame amplitude and
//! pitch pair through the same [`Analyzer`]. WAV playback is always built;
//! the Glicol composition and the live microphone sit behind the `synth` and
//! `microphone` features.

mod analysis;
#[cfg(feature = "microphone")]
mod microphone;
#[cfg(feature = "synth")]
mod synthesis;
mod wav;

// Re-export public types
pub use analysis::{hann_window, rms, Analyzer};
#[cfg(feature = "microphone")]
pub use microphone::MicrophoneInput;
#[cfg(feature = "synth")]
pub use synthesis::{SynthInput, GLICOL_COMPOSITION};
pub use wav::WavInput;
