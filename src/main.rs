//! Demo binary: drives the simulation kernel through [`rocket_sim::setup::World`]
//! for a fixed number of ticks and logs periodic snapshots. Loads a world
//! preset from disk if one is given, otherwise runs the built-in Earth/Moon
//! default (spec.md §6/§8).
//!
//! Grounded in the teacher's sibling `sim` binary (`crater-rockets-crater-sw`),
//! which takes a `clap::Parser` CLI and drives a simulation loop from a
//! config file on disk; this crate has no render/window plugin to attach, so
//! the binary is a plain headless driver rather than a `bevy::App`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rocket_sim::config::WorldConfig;
use rocket_sim::controller::Command;
use rocket_sim::rocket::ThrusterId;
use rocket_sim::setup::World;
use tracing::info;

#[derive(Parser, Debug)]
#[command(version, about = "Headless driver for the rocket simulation kernel", long_about = None)]
struct Args {
    /// Path to a world preset JSON file (spec.md §6). Falls back to the
    /// built-in Earth/Moon default if omitted.
    #[arg(short, long)]
    world: Option<PathBuf>,

    /// Number of fixed ticks to run.
    #[arg(short, long, default_value_t = 600)]
    steps: u64,

    /// Tick length in seconds.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f64,

    /// Main-thruster power, 0.0-1.0, held for the entire run.
    #[arg(long, default_value_t = 0.0)]
    main_thrust: f64,

    /// How often (in ticks) to log a snapshot.
    #[arg(long, default_value_t = 60)]
    log_every: u64,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config = match &args.world {
        Some(path) => match WorldConfig::load(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("fatal: failed to load world preset `{}`: {err}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => WorldConfig::default_preset(),
    };

    let mut world = match World::new(&config) {
        Ok(world) => world,
        Err(err) => {
            eprintln!("fatal: failed to build world: {err}");
            return ExitCode::FAILURE;
        }
    };

    if args.main_thrust > 0.0 {
        let max = world.rocket.thruster(ThrusterId::Main).max_power;
        let _ = world.apply_command(Command::SetThrusterPower {
            id: ThrusterId::Main,
            power: args.main_thrust.clamp(0.0, 1.0) * max,
        });
    }

    for step in 0..args.steps {
        world.step(args.dt);

        if args.log_every > 0 && step % args.log_every == 0 {
            info!(
                step,
                x = world.rocket.position.x,
                y = world.rocket.position.y,
                fuel = world.rocket.fuel,
                landed = world.rocket.surface_state.is_landed(),
                destroyed = world.rocket.is_destroyed(),
                "snapshot",
            );
        }

        if world.rocket.is_destroyed() {
            info!(step, "rocket destroyed, stopping early");
            break;
        }
    }

    ExitCode::SUCCESS
}
