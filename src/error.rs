//! Crate-wide error type.

use thiserror::Error;

/// Errors surfaced outside the per-frame step.
///
/// The frame step itself never fails; these cover grid lookups made through
/// the fallible accessors, curve evaluation, parameter validation and the I/O
/// edges (config files, WAV input, exports, audio devices).
#[derive(Debug, Error)]
pub enum Error {
    #[error("grid index (x: {x}, z: {z}) out of bounds for size {size}")]
    IndexOutOfBounds { x: usize, z: usize, size: usize },

    #[error("curve has no keyframes")]
    EmptyCurve,

    #[error("non-finite value in {what}")]
    NonFinite { what: &'static str },

    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    #[error("audio: {0}")]
    Audio(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Wav(#[from] hound::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;
