//! Input-spawned ripples and their lifecycle.

mod engine;
mod event;

// Re-export public types
pub use engine::RippleEngine;
pub use event::{Channel, Growth, WaveEvent, WaveFront};
