//! Height-field parameters.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Terrain grid and base-surface parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    /// Cells per side (the field is `size × size`)
    pub size: usize,

    /// Resting altitude of the surface (world units)
    pub base_height: f32,

    /// Amplitude of the fixed per-cell noise added to `base_height`
    pub noise_level: f32,

    /// Altitude of the bottom skirt in the exported mesh
    pub bottom_height: f32,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            size: 64,
            base_height: 0.0,
            noise_level: 0.5,
            bottom_height: -4.0,
        }
    }
}

impl TerrainParams {
    pub fn validate(&self) -> Result<()> {
        if self.size < 2 {
            return Err(Error::InvalidParams(format!(
                "terrain size must be at least 2, got {}",
                self.size
            )));
        }
        if !self.base_height.is_finite() || !self.noise_level.is_finite() {
            return Err(Error::InvalidParams(
                "terrain heights must be finite".to_string(),
            ));
        }
        Ok(())
    }

    /// Length of the field diagonal in cells
    pub fn diagonal(&self) -> f32 {
        self.size as f32 * std::f32::consts::SQRT_2
    }
}
