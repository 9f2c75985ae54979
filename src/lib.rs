//! Ripplefield library - audio-driven ripple terrain with an altitude-keyed population

pub mod audio;
pub mod curve;
pub mod error;
pub mod export;
pub mod grid;
pub mod input;
pub mod params;
pub mod population;
pub mod random;
pub mod ripple;
pub mod simulation;
pub mod terrain;
pub mod time;

pub use error::{Error, Result};
