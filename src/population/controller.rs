//! Stochastic birth/death of entities keyed to cell altitude.

use glam::Vec3;

use super::entity::{EntityHandle, EntityPool, SpawnRequest};
use crate::grid::Grid;
use crate::params::{PopulationParams, Species};
use crate::random::RandomSource;
use crate::terrain::HeightField;

/// Below this survival chance death is certain
pub const DEATH_FLOOR: f32 = 0.01;

/// Probability of a birth this frame given none happened at `last_chance`.
///
/// `None` when the response is falling, in which case no birth is checked.
pub fn birth_chance(last_chance: f32, curr_chance: f32) -> Option<f32> {
    if curr_chance < last_chance {
        return None;
    }
    Some((curr_chance - last_chance) / (1.0 - last_chance))
}

/// Probability of death this frame given survival at `last_chance`
pub fn death_chance(last_chance: f32, curr_chance: f32) -> f32 {
    if curr_chance < DEATH_FLOOR {
        return 1.0;
    }
    (last_chance - curr_chance) / last_chance
}

/// Entity bound to a cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Occupant {
    pub handle: EntityHandle,
    pub species: usize,
    pub position: Vec3,
    /// Death animation running; the slot frees once the pool drops it
    pub dying: bool,
}

/// One optional entity per grid cell, born and killed by altitude response
#[derive(Debug, Clone)]
pub struct PopulationController {
    species: Vec<Species>,
    slots: Grid<Option<Occupant>>,
    jitter: f32,
    spawn_enabled: bool,
}

impl PopulationController {
    pub fn new(params: &PopulationParams, size: usize) -> Self {
        Self {
            species: params.species.clone(),
            slots: Grid::new(size, None),
            jitter: params.jitter,
            spawn_enabled: params.spawn_enabled,
        }
    }

    pub fn species(&self) -> &[Species] {
        &self.species
    }

    pub fn spawn_enabled(&self) -> bool {
        self.spawn_enabled
    }

    /// Handle of the entity bound to `(x, z)`; panics outside the grid
    pub fn entity_at(&self, x: usize, z: usize) -> Option<EntityHandle> {
        self.slots[(x, z)].map(|o| o.handle)
    }

    pub fn occupant_at(&self, x: usize, z: usize) -> Option<&Occupant> {
        self.slots[(x, z)].as_ref()
    }

    /// Occupied cells that are not dying
    pub fn living_count(&self) -> usize {
        self.occupants().filter(|o| !o.dying).count()
    }

    pub fn occupied_count(&self) -> usize {
        self.occupants().count()
    }

    pub fn occupants(&self) -> impl Iterator<Item = &Occupant> + '_ {
        self.slots.as_slice().iter().flatten()
    }

    /// Toggle spawning; disabling also kills every living entity
    pub fn set_spawn_enabled<P: EntityPool + ?Sized>(&mut self, enabled: bool, pool: &mut P) {
        self.spawn_enabled = enabled;
        if enabled {
            return;
        }
        let mut cleared = 0;
        for occupant in self.slots.as_mut_slice().iter_mut().flatten() {
            if !occupant.dying {
                occupant.dying = true;
                pool.kill(occupant.handle);
                cleared += 1;
            }
        }
        log::info!("spawning disabled, {cleared} entities dying");
    }

    /// Evaluate every cell against the settled height field
    pub fn update<R, P>(&mut self, field: &HeightField, rng: &mut R, pool: &mut P)
    where
        R: RandomSource + ?Sized,
        P: EntityPool + ?Sized,
    {
        let size = self.slots.size();
        debug_assert_eq!(size, field.size());

        for z in 0..size {
            for x in 0..size {
                let height = field.height(x, z);
                let last_height = field.last_height(x, z);
                let slot = &mut self.slots[(x, z)];

                match slot {
                    None => {
                        if self.spawn_enabled {
                            *slot = try_spawn(
                                &self.species,
                                self.jitter,
                                (x, z),
                                height,
                                last_height,
                                rng,
                                pool,
                            );
                        }
                    }
                    Some(occupant) if occupant.dying => {
                        if !pool.is_alive(occupant.handle) {
                            *slot = None;
                        }
                    }
                    Some(occupant) => {
                        let Some(species) = self.species.get(occupant.species) else {
                            continue;
                        };
                        let chances = species
                            .chance(last_height)
                            .and_then(|last| Ok((last, species.chance(height)?)));
                        match chances {
                            Ok((last, curr)) if rng.uniform() < death_chance(last, curr) => {
                                occupant.dying = true;
                                pool.kill(occupant.handle);
                            }
                            other => {
                                if let Err(e) = other {
                                    log::trace!("species '{}' response failed: {e}", species.name);
                                }
                                occupant.position.y = height;
                                pool.move_to(occupant.handle, occupant.position);
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Birth check for an empty cell; first species to spawn wins
fn try_spawn<R, P>(
    species: &[Species],
    jitter: f32,
    (x, z): (usize, usize),
    height: f32,
    last_height: f32,
    rng: &mut R,
    pool: &mut P,
) -> Option<Occupant>
where
    R: RandomSource + ?Sized,
    P: EntityPool + ?Sized,
{
    for (index, template) in species.iter().enumerate() {
        let (last, curr) = match (template.chance(last_height), template.chance(height)) {
            (Ok(last), Ok(curr)) => (last, curr),
            (Err(e), _) | (_, Err(e)) => {
                log::trace!("species '{}' response failed: {e}", template.name);
                continue;
            }
        };
        let Some(frame_chance) = birth_chance(last, curr) else {
            continue;
        };
        if rng.uniform() >= frame_chance {
            continue;
        }

        let position = Vec3::new(
            x as f32 + rng.range(-jitter, jitter),
            height,
            z as f32 + rng.range(-jitter, jitter),
        );
        let request = SpawnRequest {
            species: index,
            position,
            heading_deg: rng.range(0.0, 360.0),
            size: rng.range(template.min_size, template.max_size),
        };
        let handle = pool.spawn(request);
        return Some(Occupant {
            handle,
            species: index,
            position,
            dying: false,
        });
    }
    None
}
