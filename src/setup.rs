//! Game Setup (spec.md §4, §12 in the component table): constructs a
//! [`Universe`] and [`Rocket`] from a validated [`WorldConfig`] and resolves
//! spawn placement on a host body's surface. Also hosts [`World`], the
//! composition root tying C2–C9/C11 together for the demo binary and for
//! tests that want a fully wired simulation without going through the
//! headless environment's action/reward machinery.
//!
//! Grounded in the teacher's `main.rs`, which assembles `Ephemeris`,
//! `SimulationTime`, and the plugin set into one `App`; this crate has no
//! ECS scheduler to register plugins with; `World::new` plays the same
//! "wire everything together once" role as a plain constructor.

use std::f64::consts::FRAC_PI_2;

use glam::DVec2;

use crate::config::WorldConfig;
use crate::constants::{DEFAULT_SPAWN_ALTITUDE, PhysicsConstants};
use crate::controller::{Command, RocketController};
use crate::error::{ConfigurationError, OnceLog};
use crate::events::EventBus;
use crate::physics::{PhysicsController, StepDiagnostics};
use crate::rocket::{Rocket, RocketSpawn};
use crate::universe::Universe;

pub fn build_universe(config: &WorldConfig) -> Result<Universe, ConfigurationError> {
    Universe::from_config(&config.bodies)
}

/// Resolves a spawn descriptor against a live universe to an absolute pose.
/// The rocket is placed `altitude` world-units above the host's surface
/// along `angle`, oriented upright — perpendicular to the local surface
/// normal — the same convention [`crate::sync::enter_landed`] uses, so a
/// rocket spawned already touching its host reads as landed rather than as
/// a rocket keeling over on its first tick.
pub fn resolve_spawn(
    universe: &Universe,
    spawn: &RocketSpawn,
) -> Result<(DVec2, f64), ConfigurationError> {
    let host = universe
        .find_by_name(&spawn.host_name)
        .ok_or_else(|| ConfigurationError::UnknownSpawnHost(spawn.host_name.clone()))?;
    let position = host.position + DVec2::from_angle(spawn.angle) * (host.radius + spawn.altitude);
    let angle = spawn.angle + FRAC_PI_2;
    Ok((position, angle))
}

pub fn build_rocket(config: &WorldConfig, universe: &Universe) -> Result<Rocket, ConfigurationError> {
    let spawn = RocketSpawn {
        host_name: config.rocket.spawn.host_name.clone(),
        altitude: config.rocket.spawn.altitude.unwrap_or(DEFAULT_SPAWN_ALTITUDE),
        angle: config.rocket.spawn.angle.unwrap_or(FRAC_PI_2),
    };
    let (position, angle) = resolve_spawn(universe, &spawn)?;
    Ok(Rocket::new(spawn, position, angle))
}

/// Composition root: one universe, one rocket, the controllers that drive
/// them, and the event bus they all publish through. Not used by
/// [`crate::env::HeadlessEnvironment`] directly (it owns the same pieces
/// plus reward bookkeeping), but shares every constructor helper with it.
pub struct World {
    pub universe: Universe,
    pub rocket: Rocket,
    pub physics: PhysicsController,
    pub controller: RocketController,
    pub events: EventBus,
    log: OnceLog,
}

impl World {
    pub fn new(config: &WorldConfig) -> Result<Self, ConfigurationError> {
        let universe = build_universe(config)?;
        let rocket = build_rocket(config, &universe)?;
        let mut physics = PhysicsController::new(PhysicsConstants {
            g: config.physics.g,
            ..PhysicsConstants::default()
        });
        physics.init_world(&rocket, &universe);
        Ok(Self {
            universe,
            rocket,
            physics,
            controller: RocketController::new(),
            events: EventBus::new(),
            log: OnceLog::new(),
        })
    }

    pub fn apply_command(&mut self, command: Command) -> Result<(), ConfigurationError> {
        self.controller.apply(
            command,
            &mut self.rocket,
            &mut self.physics,
            &self.universe,
            &mut self.events,
        )
    }

    /// Advances one tick and emits the resulting `SIMULATION.UPDATED`
    /// notification (spec.md §6) to every subscriber.
    pub fn step(&mut self, dt: f64) -> StepDiagnostics {
        let diagnostics = self.physics.step(
            dt,
            &mut self.rocket,
            &mut self.universe,
            &mut self.events,
            &mut self.log,
        );
        let snapshot = self.snapshot(diagnostics);
        self.events
            .emit(crate::events::SimEvent::SimulationUpdated { snapshot });
        diagnostics
    }

    fn snapshot(&self, diagnostics: StepDiagnostics) -> crate::events::SimulationSnapshot {
        crate::events::SimulationSnapshot {
            rocket_position: self.rocket.position,
            rocket_velocity: self.rocket.velocity,
            rocket_angle: self.rocket.angle,
            rocket_angular_velocity: self.rocket.angular_velocity,
            fuel: self.rocket.fuel,
            health: self.rocket.health,
            is_destroyed: self.rocket.is_destroyed(),
            is_landed: self.rocket.surface_state.is_landed(),
            landed_on: self.rocket.surface_state.anchor_body().map(str::to_owned),
            bodies: self
                .universe
                .bodies()
                .iter()
                .map(|body| crate::events::BodyPose {
                    name: body.name.clone(),
                    position: body.position,
                    radius: body.radius,
                    mass: body.mass,
                })
                .collect(),
            gravity: diagnostics.gravity,
            total_thrust: diagnostics.total_thrust,
            acceleration: diagnostics.acceleration,
            mission_view: None,
        }
    }
}
