//! Entity pool interface and an animated in-process implementation.

use std::collections::BTreeMap;

use glam::Vec3;

use crate::curve::Curve;
use crate::params::PopulationParams;

/// Opaque reference to an entity owned by a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityHandle(pub u64);

/// Everything a pool needs to instantiate an entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRequest {
    /// Index into the species list
    pub species: usize,
    pub position: Vec3,
    /// Rotation about the vertical axis (degrees)
    pub heading_deg: f32,
    /// Fully grown scale
    pub size: f32,
}

/// Owner of entity instances and their animations.
///
/// The population controller only decides births and deaths; the pool
/// performs them and reports when a dying entity has finally gone.
pub trait EntityPool {
    fn spawn(&mut self, request: SpawnRequest) -> EntityHandle;

    /// Start the death animation; the handle stays alive until it finishes
    fn kill(&mut self, handle: EntityHandle);

    fn move_to(&mut self, handle: EntityHandle, position: Vec3);

    /// `false` once the entity has been destroyed
    fn is_alive(&self, handle: EntityHandle) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Growing,
    Grown,
    Dying,
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub species: usize,
    pub position: Vec3,
    pub heading_deg: f32,
    pub target_size: f32,
    /// Current rendered scale
    pub scale: f32,
    pub phase: Phase,
    anim_start: f32,
}

/// Pool that grows entities in, shrinks them out and then destroys them
#[derive(Debug, Clone)]
pub struct AnimatedPool {
    entities: BTreeMap<EntityHandle, Entity>,
    next_id: u64,
    now: f32,
    grow_time: f32,
    die_time: f32,
    grow_curve: Curve,
    die_curve: Curve,
}

impl AnimatedPool {
    pub fn new(params: &PopulationParams) -> Self {
        Self {
            entities: BTreeMap::new(),
            next_id: 1,
            now: 0.0,
            grow_time: params.grow_time,
            die_time: params.die_time,
            grow_curve: params.grow_curve.clone(),
            die_curve: params.die_curve.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, handle: EntityHandle) -> Option<&Entity> {
        self.entities.get(&handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityHandle, &Entity)> + '_ {
        self.entities.iter().map(|(&h, e)| (h, e))
    }

    /// Step animations to `now`, destroying entities whose death finished
    pub fn advance(&mut self, now: f32) {
        self.now = now;
        let (grow_time, die_time) = (self.grow_time, self.die_time);
        let (grow_curve, die_curve) = (&self.grow_curve, &self.die_curve);

        self.entities.retain(|handle, entity| {
            match entity.phase {
                Phase::Growing => {
                    let t = ((now - entity.anim_start) / grow_time).clamp(0.0, 1.0);
                    entity.scale = grow_curve.evaluate(t).unwrap_or(1.0) * entity.target_size;
                    if t >= 1.0 {
                        entity.phase = Phase::Grown;
                    }
                }
                Phase::Grown => {}
                Phase::Dying => {
                    let t = ((now - entity.anim_start) / die_time).clamp(0.0, 1.0);
                    entity.scale = die_curve.evaluate(t).unwrap_or(0.0) * entity.target_size;
                    if t >= 0.99 {
                        log::trace!("destroyed entity {}", handle.0);
                        return false;
                    }
                }
            }
            true
        });
    }
}

impl EntityPool for AnimatedPool {
    fn spawn(&mut self, request: SpawnRequest) -> EntityHandle {
        let handle = EntityHandle(self.next_id);
        self.next_id += 1;
        self.entities.insert(
            handle,
            Entity {
                species: request.species,
                position: request.position,
                heading_deg: request.heading_deg,
                target_size: request.size,
                scale: 0.0,
                phase: Phase::Growing,
                anim_start: self.now,
            },
        );
        handle
    }

    fn kill(&mut self, handle: EntityHandle) {
        if let Some(entity) = self.entities.get_mut(&handle) {
            if entity.phase != Phase::Dying {
                entity.phase = Phase::Dying;
                entity.anim_start = self.now;
            }
        }
    }

    fn move_to(&mut self, handle: EntityHandle, position: Vec3) {
        if let Some(entity) = self.entities.get_mut(&handle) {
            entity.position = position;
        }
    }

    fn is_alive(&self, handle: EntityHandle) -> bool {
        self.entities.contains_key(&handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SpawnRequest {
        SpawnRequest {
            species: 0,
            position: Vec3::new(1.0, 2.0, 3.0),
            heading_deg: 90.0,
            size: 2.0,
        }
    }

    #[test]
    fn test_grow_animation() {
        let params = PopulationParams::default();
        let mut pool = AnimatedPool::new(&params);
        pool.advance(10.0);
        let handle = pool.spawn(request());

        pool.advance(10.5);
        let entity = pool.get(handle).unwrap();
        assert_eq!(entity.phase, Phase::Growing);
        assert!((entity.scale - 1.0).abs() < 1e-5);

        pool.advance(11.0);
        let entity = pool.get(handle).unwrap();
        assert_eq!(entity.phase, Phase::Grown);
        assert!((entity.scale - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_kill_destroys_after_die_time() {
        let params = PopulationParams::default();
        let mut pool = AnimatedPool::new(&params);
        let handle = pool.spawn(request());
        pool.advance(2.0);
        pool.kill(handle);
        assert!(pool.is_alive(handle));

        pool.advance(2.25);
        assert!(pool.is_alive(handle));
        assert_eq!(pool.get(handle).unwrap().phase, Phase::Dying);

        pool.advance(2.5);
        assert!(!pool.is_alive(handle));
        assert!(pool.is_empty());
    }

    #[test]
    fn test_move_to_updates_position() {
        let mut pool = AnimatedPool::new(&PopulationParams::default());
        let handle = pool.spawn(request());
        pool.move_to(handle, Vec3::new(1.0, 5.0, 3.0));
        assert_eq!(pool.get(handle).unwrap().position.y, 5.0);
    }
}
