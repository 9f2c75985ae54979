//! Ripplefield - headless driver for the audio-driven ripple terrain.
//!
//! Sound (or a held button) sends ripples across a height field; species
//! are born where the ground rises into their favoured altitude and die
//! as it falls away again.

mod cli;

use clap::Parser;
use env_logger::Env;

use ripplefield::error::{Error, Result};
use ripplefield::export;
use ripplefield::input::{HeldInput, InputSource, ScriptedInput};
use ripplefield::simulation::Simulation;
use ripplefield::time::{Clock, FixedStepClock};
use ripplefield::{audio, params::SimParams};

use cli::{Args, InputKind};

fn main() {
    let args = Args::parse();
    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    if let Err(e) = run(&args) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let params = args.load_params()?;

    match args.parse_input_kind() {
        InputKind::Held => {
            let hold = args.hold;
            let input = HeldInput::new(args.amplitude, args.pitch);
            drive(Simulation::new(params, input)?, args, |input, now| {
                input.set_pressed(now < hold)
            })
        }
        InputKind::Scripted => {
            let input = ScriptedInput::pulses(8, 0.5, 1.0, args.amplitude, args.pitch);
            drive(Simulation::new(params, input)?, args, |_, _| {})
        }
        InputKind::Wav => {
            let path = args.wav.as_ref().ok_or_else(|| {
                Error::InvalidParams("--input wav needs --wav <PATH>".to_string())
            })?;
            let input = audio::WavInput::open(path, params.analyzer.clone())?;
            drive(Simulation::new(params, input)?, args, |_, _| {})
        }
        InputKind::Synth => run_synth(params, args),
        InputKind::Mic => run_microphone(params, args),
    }
}

#[cfg(feature = "synth")]
fn run_synth(params: SimParams, args: &Args) -> Result<()> {
    let input = audio::SynthInput::new(params.analyzer.clone())?;
    drive(Simulation::new(params, input)?, args, |_, _| {})
}

#[cfg(not(feature = "synth"))]
fn run_synth(_params: SimParams, _args: &Args) -> Result<()> {
    Err(Error::Audio("built without the `synth` feature".to_string()))
}

#[cfg(feature = "microphone")]
fn run_microphone(params: SimParams, args: &Args) -> Result<()> {
    let mut input = audio::MicrophoneInput::new(params.analyzer.clone())?;
    input.lock_pitch(args.lock_pitch);

    // Live input runs against the wall clock
    let mut clock = ripplefield::time::WallClock::new();
    let frame_time = std::time::Duration::from_secs_f32(1.0 / args.fps.max(1) as f32);
    let mut sim = Simulation::new(params, input)?;
    for frame in 0..args.frames {
        clock.tick();
        let stats = sim.step(clock.now());
        if frame % args.fps.max(1) as u64 == 0 {
            log::info!("{stats}");
        }
        std::thread::sleep(frame_time);
    }
    finish(&sim, clock.now(), args)
}

#[cfg(not(feature = "microphone"))]
fn run_microphone(_params: SimParams, _args: &Args) -> Result<()> {
    Err(Error::Audio("built without the `microphone` feature".to_string()))
}

/// Step the simulation on a fixed clock; `control` sees the input before each frame
fn drive<I: InputSource>(
    mut sim: Simulation<I>,
    args: &Args,
    mut control: impl FnMut(&mut I, f32),
) -> Result<()> {
    let mut clock = FixedStepClock::from_fps(args.fps);
    let report_every = args.fps.max(1) as u64;
    log::info!("running {} frames at {} fps", args.frames, args.fps);

    for frame in 0..args.frames {
        let now = clock.now();
        control(sim.input_mut(), now);
        let stats = sim.step(now);
        if frame % report_every == 0 {
            log::info!("{stats}");
        }
        clock.tick();
    }
    finish(&sim, clock.now(), args)
}

fn finish<I: InputSource>(sim: &Simulation<I>, now: f32, args: &Args) -> Result<()> {
    let stats = sim.stats(now);
    log::info!("finished: {stats}");

    if let Some(path) = &args.export_png {
        export::export_png(sim.field(), path)?;
    }
    if let Some(path) = &args.export_obj {
        export::export_obj(sim.mesh(), path)?;
    }
    Ok(())
}
