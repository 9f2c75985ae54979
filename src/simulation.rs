//! Frame driver tying input, ripples, terrain and population together.

use std::fmt;

use rand::rngs::SmallRng;

use crate::error::Result;
use crate::input::InputSource;
use crate::params::SimParams;
use crate::population::{AnimatedPool, PopulationController};
use crate::random::seeded_rng;
use crate::ripple::RippleEngine;
use crate::terrain::{HeightField, TerrainMesh};

/// Summary of one simulated frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    pub frame: u64,
    pub time_s: f32,
    /// Ripples in the engine, echoes included
    pub ripples: usize,
    /// Ripples still pulsing as primaries
    pub pulsing: usize,
    /// Entities still in the pool, dying ones included
    pub entities: usize,
    pub living_entities: usize,
    pub min_height: f32,
    pub max_height: f32,
}

impl fmt::Display for FrameStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "frame {} @ {:.2}s: ripples {} ({} pulsing), entities {} ({} living), height [{:.2}, {:.2}]",
            self.frame,
            self.time_s,
            self.ripples,
            self.pulsing,
            self.entities,
            self.living_entities,
            self.min_height,
            self.max_height
        )
    }
}

/// Complete simulation state.
///
/// [`Simulation::step`] runs the frame phases strictly in order: read
/// input, update ripples, composite the height field, advance entity
/// animations, evaluate population, refresh the mesh. Population and mesh
/// therefore always see a fully settled field.
pub struct Simulation<I> {
    params: SimParams,
    input: I,
    rng: SmallRng,
    ripples: RippleEngine,
    field: HeightField,
    population: PopulationController,
    pool: AnimatedPool,
    mesh: TerrainMesh,
    frame: u64,
}

impl<I: InputSource> Simulation<I> {
    pub fn new(params: SimParams, input: I) -> Result<Self> {
        params.validate()?;
        let mut rng = seeded_rng(params.seed);
        let terrain = &params.terrain;

        let field = HeightField::new(terrain, &mut rng);
        let mut mesh = TerrainMesh::new(terrain.size, terrain.base_height, terrain.bottom_height);
        mesh.update(&field);

        log::info!(
            "simulation: {}x{} field, {} species, {} mode",
            terrain.size,
            terrain.size,
            params.population.species.len(),
            if params.ripple.use_curves { "curve" } else { "pulse" }
        );

        Ok(Self {
            ripples: RippleEngine::new(params.ripple.clone(), terrain.size),
            population: PopulationController::new(&params.population, terrain.size),
            pool: AnimatedPool::new(&params.population),
            field,
            mesh,
            rng,
            input,
            params,
            frame: 0,
        })
    }

    /// Run one frame at simulation time `now`
    pub fn step(&mut self, now: f32) -> FrameStats {
        let signal = self.input.read(now);
        self.ripples.update(signal, now);
        self.field.composite(&self.ripples, now);
        self.pool.advance(now);
        self.population
            .update(&self.field, &mut self.rng, &mut self.pool);
        self.mesh.update(&self.field);

        self.frame += 1;
        self.stats(now)
    }

    pub fn stats(&self, now: f32) -> FrameStats {
        let (min_height, max_height) = self.field.height_range();
        FrameStats {
            frame: self.frame,
            time_s: now,
            ripples: self.ripples.live_count(),
            pulsing: self
                .ripples
                .events()
                .filter(|e| e.is_live(now, self.ripples.speed()))
                .count(),
            entities: self.pool.len(),
            living_entities: self.population.living_count(),
            min_height,
            max_height,
        }
    }

    /// Toggle spawning; disabling starts the death of every entity
    pub fn set_spawn_enabled(&mut self, enabled: bool) {
        self.population.set_spawn_enabled(enabled, &mut self.pool);
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn ripples(&self) -> &RippleEngine {
        &self.ripples
    }

    /// Engine access for input points and pins
    pub fn ripples_mut(&mut self) -> &mut RippleEngine {
        &mut self.ripples
    }

    pub fn field(&self) -> &HeightField {
        &self.field
    }

    pub fn population(&self) -> &PopulationController {
        &self.population
    }

    pub fn pool(&self) -> &AnimatedPool {
        &self.pool
    }

    pub fn mesh(&self) -> &TerrainMesh {
        &self.mesh
    }

    /// Frames stepped so far
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{HeldInput, InputSignal};
    use crate::time::{Clock, FixedStepClock};

    /// Records the times it was read at
    struct Probe(Vec<f32>);

    impl InputSource for Probe {
        fn read(&mut self, now: f32) -> InputSignal {
            self.0.push(now);
            InputSignal::silent(220.0)
        }
    }

    fn small_params() -> SimParams {
        let mut params = SimParams {
            seed: Some(5),
            ..Default::default()
        };
        params.terrain.size = 16;
        params
    }

    #[test]
    fn test_input_read_once_per_frame() {
        let mut sim = Simulation::new(small_params(), Probe(Vec::new())).unwrap();
        let mut clock = FixedStepClock::from_fps(10);
        for _ in 0..3 {
            sim.step(clock.now());
            clock.tick();
        }
        assert_eq!(sim.input().0.len(), 3);
        assert!((sim.input().0[2] - 0.2).abs() < 1e-6);
        assert_eq!(sim.frame(), 3);
    }

    #[test]
    fn test_held_input_spawns_ripple_and_moves_terrain() {
        let mut sim = Simulation::new(small_params(), HeldInput::new(0.5, 220.0)).unwrap();
        let flat = sim.field().heights().clone();
        sim.input_mut().set_pressed(true);

        let mut clock = FixedStepClock::from_fps(30);
        let mut stats = sim.step(clock.now());
        for _ in 0..10 {
            clock.tick();
            stats = sim.step(clock.now());
        }
        assert!(stats.ripples >= 1);
        assert!(stats.pulsing <= stats.ripples);
        assert_ne!(sim.field().heights(), &flat);

        // Mesh surface mirrors the settled field
        assert_eq!(sim.mesh().vertices[0].position[1], sim.field().height(0, 0));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let mut params = small_params();
        params.analyzer.fft_size = 1000;
        assert!(Simulation::new(params, Probe(Vec::new())).is_err());
    }

    #[test]
    fn test_same_seed_same_noise() {
        let a = Simulation::new(small_params(), Probe(Vec::new())).unwrap();
        let b = Simulation::new(small_params(), Probe(Vec::new())).unwrap();
        assert_eq!(a.field().noise(), b.field().noise());
    }
}
