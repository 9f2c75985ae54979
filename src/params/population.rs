//! Entity population parameters and species templates.

use serde::{Deserialize, Serialize};

use crate::curve::Curve;
use crate::error::{Error, Result};

/// One kind of entity and how it responds to altitude
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Species {
    pub name: String,

    /// Altitude → relative presence likelihood
    pub response: Curve,

    /// Scale applied to `response` to get a probability
    pub multiplier: f32,

    /// Uniform size range of spawned entities
    pub min_size: f32,
    pub max_size: f32,
}

impl Default for Species {
    fn default() -> Self {
        Self {
            name: "tree".to_string(),
            response: Curve::linear(&[(0.0, 0.0), (0.6, 0.0), (1.5, 0.8), (3.0, 0.0)]),
            multiplier: 1.0,
            min_size: 0.6,
            max_size: 1.2,
        }
    }
}

impl Species {
    /// Presence probability at `altitude`
    pub fn chance(&self, altitude: f32) -> Result<f32> {
        let chance = self.response.evaluate(altitude)? * self.multiplier;
        if chance.is_finite() {
            Ok(chance)
        } else {
            Err(Error::NonFinite {
                what: "species response",
            })
        }
    }
}

/// Population control and entity animation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationParams {
    /// Species templates, checked in order for empty cells
    pub species: Vec<Species>,

    /// Maximum spawn offset from the cell centre on each axis (cells)
    pub jitter: f32,

    /// Grow animation length (seconds)
    pub grow_time: f32,

    /// Death animation length (seconds)
    pub die_time: f32,

    /// Scale multiplier over normalised grow time
    pub grow_curve: Curve,

    /// Scale multiplier over normalised death time
    pub die_curve: Curve,

    /// Whether spawning is enabled at start
    pub spawn_enabled: bool,
}

impl Default for PopulationParams {
    fn default() -> Self {
        Self {
            species: vec![Species::default()],
            jitter: 0.25,
            grow_time: 1.0,
            die_time: 0.5,
            grow_curve: Curve::linear(&[(0.0, 0.0), (1.0, 1.0)]),
            die_curve: Curve::linear(&[(0.0, 1.0), (1.0, 0.0)]),
            spawn_enabled: true,
        }
    }
}

impl PopulationParams {
    pub fn validate(&self) -> Result<()> {
        for species in &self.species {
            if species.min_size > species.max_size {
                return Err(Error::InvalidParams(format!(
                    "species '{}' has min_size > max_size",
                    species.name
                )));
            }
        }
        if self.grow_time <= 0.0 || self.die_time <= 0.0 {
            return Err(Error::InvalidParams(
                "grow_time and die_time must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}
