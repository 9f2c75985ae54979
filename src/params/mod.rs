//! Parameter definitions with units and documented semantics.
//!
//! Every tunable lives here with a `Default` and a `validate` method. A full
//! [`SimParams`] can be loaded from JSON; missing fields fall back to their
//! defaults.

mod audio;
mod population;
mod ripple;
mod terrain;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

// Re-export all types
pub use audio::{audio_constants, AnalyzerConfig};
pub use population::{PopulationParams, Species};
pub use ripple::{RippleParams, MIN_RIPPLE_WIDTH};
pub use terrain::TerrainParams;

/// Complete simulation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimParams {
    pub terrain: TerrainParams,
    pub ripple: RippleParams,
    pub population: PopulationParams,
    pub analyzer: AnalyzerConfig,

    /// RNG seed; random when absent
    pub seed: Option<u64>,
}

impl SimParams {
    /// Load parameters from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(text)?;
        params.validate()?;
        Ok(params)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.terrain.validate()?;
        self.ripple.validate()?;
        self.population.validate()?;
        self.analyzer.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let params = SimParams::from_json_str(
            r#"{ "terrain": { "size": 32 }, "ripple": { "use_curves": true }, "seed": 5 }"#,
        )
        .unwrap();
        assert_eq!(params.terrain.size, 32);
        assert_eq!(params.terrain.noise_level, TerrainParams::default().noise_level);
        assert!(params.ripple.use_curves);
        assert_eq!(params.seed, Some(5));
        assert_eq!(params.population.species.len(), 1);
    }

    #[test]
    fn test_invalid_json_params_rejected() {
        let result = SimParams::from_json_str(r#"{ "ripple": { "speed": -1.0 } }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_json_round_trip_preserves_curves() {
        let params = SimParams::default();
        let text = params.to_json_string().unwrap();
        let back = SimParams::from_json_str(&text).unwrap();
        assert_eq!(back.ripple.growth_curve, params.ripple.growth_curve);
        assert_eq!(back.population.species[0].response, params.population.species[0].response);
    }

    #[test]
    fn test_unsorted_species_response_rejected() {
        let json = r#"{ "population": { "species": [ { "response": { "keys": [
            { "time": 0.0, "value": 0.0 },
            { "time": 3.0, "value": 0.8 },
            { "time": 1.0, "value": 0.4 },
            { "time": 2.0, "value": 0.1 }
        ] } } ] } }"#;
        assert!(SimParams::from_json_str(json).is_err());
    }
}
