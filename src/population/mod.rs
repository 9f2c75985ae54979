//! Altitude-driven entity population.

mod controller;
mod entity;

// Re-export public types
pub use controller::{birth_chance, death_chance, Occupant, PopulationController, DEATH_FLOOR};
pub use entity::{AnimatedPool, Entity, EntityHandle, EntityPool, Phase, SpawnRequest};
