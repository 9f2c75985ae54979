//! End-to-end runs through the public API.

use glam::Vec2;

use ripplefield::grid::Grid;
use ripplefield::input::{HeldInput, InputSignal, ScriptedInput};
use ripplefield::params::{RippleParams, SimParams, TerrainParams};
use ripplefield::ripple::{Channel, RippleEngine, WaveEvent};
use ripplefield::simulation::Simulation;
use ripplefield::terrain::HeightField;
use ripplefield::time::{Clock, FixedStepClock};

fn params(seed: u64) -> SimParams {
    SimParams {
        seed: Some(seed),
        ..Default::default()
    }
}

#[test]
fn test_single_ripple_live_window() {
    // 64×64 field, ripple at the centre, height 2, width 4, speed 5
    let mut engine = RippleEngine::new(RippleParams::default(), 64);
    engine.insert(WaveEvent::pulse(
        Vec2::new(32.0, 32.0),
        0.0,
        2.0,
        4.0,
        Channel::Up,
    ));
    let event = engine.events().next().unwrap();
    assert!(event.is_live(0.79, engine.speed()));
    assert!(!event.is_live(0.8, engine.speed()));
}

#[test]
fn test_down_pin_pair_cancels_on_the_field() {
    let ripple = RippleParams {
        use_down_pin: true,
        ..Default::default()
    };
    let mut engine = RippleEngine::new(ripple, 32);
    let centre = Vec2::new(16.0, 16.0);
    engine.set_input_point(centre);
    engine.move_down_pin(centre);

    let mut clock = FixedStepClock::from_fps(50);
    for _ in 0..20 {
        engine.update(InputSignal::new(0.7, 330.0), clock.now());
        clock.tick();
    }

    let up = engine.current_up().unwrap();
    let down = engine.current_down().unwrap();
    assert_eq!(up.height, down.height);
    let now = clock.now();
    for i in 0..64 {
        let d = i as f32 * 0.25;
        let u = up.contribution(d, now, engine.speed());
        assert_eq!(down.contribution(d, now, engine.speed()), -u);
    }

    let terrain = TerrainParams {
        size: 32,
        base_height: 0.0,
        noise_level: 0.0,
        ..Default::default()
    };
    let mut field = HeightField::with_noise(&terrain, Grid::new(32, 0.0));
    field.composite(&engine, now);
    assert!(field.heights().as_slice().iter().all(|h| h.abs() < 1e-5));
}

#[test]
fn test_pulses_grow_then_clear_population() {
    let input = ScriptedInput::pulses(2, 0.5, 1.0, 0.5, 220.0);
    let mut sim = Simulation::new(params(42), input).unwrap();
    let mut clock = FixedStepClock::from_fps(30);

    let mut most_living = 0;
    let mut most_ripples = 0;
    // Long enough for every echo to leave the field
    for _ in 0..(25 * 30) {
        let stats = sim.step(clock.now());
        most_living = most_living.max(stats.living_entities);
        most_ripples = most_ripples.max(stats.ripples);
        clock.tick();
    }

    // Two primaries plus three echo generations each
    assert!(most_ripples >= 2);
    assert!(most_ripples <= 8);
    assert!(most_living > 0, "crests never raised a species");

    let stats = sim.stats(clock.now());
    assert_eq!(stats.ripples, 0);
    assert_eq!(stats.entities, 0);
    assert_eq!(stats.living_entities, 0);
    let field = sim.field();
    for (x, z, &h) in field.heights().iter_cells() {
        assert!((h - field.base_at(x, z)).abs() < 1e-6);
    }
}

#[test]
fn test_same_seed_same_run() {
    let run = || {
        let input = ScriptedInput::pulses(3, 0.4, 0.6, 0.6, 180.0);
        let mut sim = Simulation::new(params(7), input).unwrap();
        let mut clock = FixedStepClock::from_fps(30);
        for _ in 0..120 {
            sim.step(clock.now());
            clock.tick();
        }
        let positions: Vec<_> = sim.population().occupants().map(|o| o.position).collect();
        (sim.field().heights().clone(), positions)
    };
    assert_eq!(run(), run());
}

#[test]
fn test_curve_mode_single_held_ripple() {
    let mut params = params(3);
    params.terrain.size = 32;
    params.ripple.use_curves = true;
    let mut sim = Simulation::new(params, HeldInput::new(0.5, 220.0)).unwrap();
    let mut clock = FixedStepClock::from_fps(30);

    sim.input_mut().set_pressed(true);
    for _ in 0..30 {
        sim.step(clock.now());
        clock.tick();
    }
    let keys = sim.ripples().current_up().unwrap().growth.as_ref().unwrap().samples.len();
    assert!(keys >= 5, "only {keys} keyframes after a second");

    sim.input_mut().set_pressed(false);
    for _ in 0..60 {
        sim.step(clock.now());
        clock.tick();
    }
    assert!(!sim.ripples().is_active());
    // Sampled ripples leave no echoes
    assert_eq!(sim.ripples().live_count(), 1);
}

#[test]
fn test_disabling_spawn_through_simulation() {
    let input = ScriptedInput::pulses(1, 1.0, 1.0, 0.5, 220.0);
    let mut sim = Simulation::new(params(11), input).unwrap();
    let mut clock = FixedStepClock::from_fps(30);
    for _ in 0..60 {
        sim.step(clock.now());
        clock.tick();
    }

    sim.set_spawn_enabled(false);
    assert_eq!(sim.population().living_count(), 0);
    for _ in 0..60 {
        let stats = sim.step(clock.now());
        assert_eq!(stats.living_entities, 0);
        clock.tick();
    }
    assert!(sim.pool().is_empty());
}

#[test]
fn test_partial_json_config() {
    let params = SimParams::from_json_str(
        r#"{ "terrain": { "size": 24 }, "ripple": { "use_curves": true }, "seed": 1 }"#,
    )
    .unwrap();
    assert_eq!(params.terrain.size, 24);
    assert!(params.ripple.use_curves);
    assert_eq!(params.ripple.speed, 5.0);
    assert_eq!(params.seed, Some(1));

    let text = params.to_json_string().unwrap();
    let again = SimParams::from_json_str(&text).unwrap();
    assert_eq!(again.terrain.size, 24);
}
