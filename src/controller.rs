//! Rocket Controller (spec.md §4.6): the command adapter between the
//! external input/adapter layer (keyboard, gamepad, touch, or the headless
//! environment's action decoder) and the rocket model. Per spec.md §4.6/§5,
//! this is the *only* writer of `thruster.power`; the Synchronization
//! Manager may read thrust ratios but never sets them.
//!
//! Grounded in the teacher's `input.rs` (semantic command enum decoded from
//! raw input, then applied to model state) kept in the same shape, minus
//! the raw-input decoding itself (out of scope per spec.md §1 — that lives
//! in the external input-capture collaborator).

use crate::error::ConfigurationError;
use crate::events::{EventBus, SimEvent};
use crate::physics::PhysicsController;
use crate::rocket::{Rocket, ThrusterId};
use crate::setup;
use crate::universe::Universe;

/// Below this magnitude a `Rotate` command is treated as "release both
/// lateral thrusters" rather than a very gentle turn.
const ROTATE_DEADZONE: f64 = 0.02;

/// Semantic commands enumerated in spec.md §4.6/§6. `Zoom` is forwarded
/// untouched since camera zoom is a rendering concern (spec.md §1
/// out-of-scope); it is accepted here only so the adapter boundary has one
/// place to route every inbound command through.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetThrusterPower { id: ThrusterId, power: f64 },
    Rotate { value: f64 },
    Zoom { delta: f64 },
    ToggleAssistedControls,
    TogglePause,
    /// `GAME.RESUME_IF_PAUSED`: idempotent resume, unlike `TogglePause`.
    ResumeIfPaused,
    /// `PHYSICS.TOGGLE_FORCES`: force-vector visualization toggle; a
    /// rendering concern the kernel only routes through, like `Zoom`.
    ToggleForces,
    Reset,
    ResetRocket,
}

/// Holds the one controller-owned flag (`assisted_controls` mirrors onto
/// [`PhysicsController`] so the stabilization pass in `physics::step` can
/// read it) and arbitrates every mutation of rocket intent.
#[derive(Debug, Default)]
pub struct RocketController;

impl RocketController {
    pub fn new() -> Self {
        Self
    }

    /// Applies one command. Returns `Err` only for `ResetRocket`, when the
    /// rocket's configured spawn host no longer resolves in `universe`
    /// (spec.md §7 `ConfigurationError`, surfaced rather than silently
    /// downgraded because a spawn failure means the rocket has nowhere
    /// valid to go).
    pub fn apply(
        &mut self,
        command: Command,
        rocket: &mut Rocket,
        physics: &mut PhysicsController,
        universe: &Universe,
        events: &mut EventBus,
    ) -> Result<(), ConfigurationError> {
        match command {
            Command::SetThrusterPower { id, power } => {
                if rocket.is_destroyed() {
                    return Ok(());
                }
                rocket.set_thruster_power(id, power);
                events.emit(SimEvent::ThrusterPowerSet { id, power });
            }
            Command::Rotate { value } => {
                if rocket.is_destroyed() {
                    return Ok(());
                }
                let value = value.clamp(-1.0, 1.0);
                if value.abs() < ROTATE_DEADZONE {
                    rocket.set_thruster_power(ThrusterId::Left, 0.0);
                    rocket.set_thruster_power(ThrusterId::Right, 0.0);
                } else if value > 0.0 {
                    let max = rocket.thruster(ThrusterId::Right).max_power;
                    rocket.set_thruster_power(ThrusterId::Right, max * value);
                    rocket.set_thruster_power(ThrusterId::Left, 0.0);
                } else {
                    let max = rocket.thruster(ThrusterId::Left).max_power;
                    rocket.set_thruster_power(ThrusterId::Left, max * -value);
                    rocket.set_thruster_power(ThrusterId::Right, 0.0);
                }
                events.emit(SimEvent::RotationCommand { value });
            }
            Command::Zoom { .. } | Command::ToggleForces => {
                // Rendering-only concerns; nothing for the kernel to do.
            }
            Command::ResumeIfPaused => {
                if physics.is_paused() {
                    physics.resume();
                    events.emit(SimEvent::GameTogglePause { paused: false });
                }
            }
            Command::ToggleAssistedControls => {
                physics.toggle_assisted_controls();
            }
            Command::TogglePause => {
                if physics.is_paused() {
                    physics.resume();
                } else {
                    physics.pause();
                }
                events.emit(SimEvent::GameTogglePause {
                    paused: physics.is_paused(),
                });
            }
            Command::Reset => {
                events.emit(SimEvent::RocketReset);
            }
            Command::ResetRocket => {
                let (position, angle) = setup::resolve_spawn(universe, rocket.spawn())?;
                rocket.reset_to(position, angle);
                physics.resync(rocket);
                events.emit(SimEvent::RocketReset);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BodyConfig;
    use crate::constants::PhysicsConstants;
    use crate::rocket::RocketSpawn;
    use glam::DVec2;
    use std::f64::consts::FRAC_PI_2;

    fn earth_universe() -> Universe {
        Universe::from_config(&[BodyConfig {
            name: "earth".into(),
            mass: 2e11,
            radius: 720.0,
            color: None,
            parent: None,
            orbit_distance: None,
            orbit_angle: None,
            orbit_speed: None,
        }])
        .unwrap()
    }

    fn fixture_rocket() -> Rocket {
        Rocket::new(
            RocketSpawn {
                host_name: "earth".into(),
                altitude: 50.0,
                angle: FRAC_PI_2,
            },
            DVec2::new(0.0, 770.0),
            FRAC_PI_2,
        )
    }

    #[test]
    fn set_thruster_power_writes_through_to_rocket() {
        let universe = earth_universe();
        let mut rocket = fixture_rocket();
        let mut physics = PhysicsController::new(PhysicsConstants::default());
        physics.init_world(&rocket, &universe);
        let mut events = EventBus::new();
        let mut controller = RocketController::new();

        controller
            .apply(
                Command::SetThrusterPower {
                    id: ThrusterId::Main,
                    power: 40.0,
                },
                &mut rocket,
                &mut physics,
                &universe,
                &mut events,
            )
            .unwrap();
        assert_eq!(rocket.thruster(ThrusterId::Main).power, 40.0);
    }

    #[test]
    fn rotate_command_drives_opposing_lateral_thrusters() {
        let universe = earth_universe();
        let mut rocket = fixture_rocket();
        let mut physics = PhysicsController::new(PhysicsConstants::default());
        physics.init_world(&rocket, &universe);
        let mut events = EventBus::new();
        let mut controller = RocketController::new();

        controller
            .apply(
                Command::Rotate { value: 0.5 },
                &mut rocket,
                &mut physics,
                &universe,
                &mut events,
            )
            .unwrap();
        assert!(rocket.thruster(ThrusterId::Right).power > 0.0);
        assert_eq!(rocket.thruster(ThrusterId::Left).power, 0.0);
    }

    #[test]
    fn rotate_command_near_zero_releases_both_sides() {
        let universe = earth_universe();
        let mut rocket = fixture_rocket();
        rocket.set_thruster_power(ThrusterId::Left, 10.0);
        let mut physics = PhysicsController::new(PhysicsConstants::default());
        physics.init_world(&rocket, &universe);
        let mut events = EventBus::new();
        let mut controller = RocketController::new();

        controller
            .apply(
                Command::Rotate { value: 0.0 },
                &mut rocket,
                &mut physics,
                &universe,
                &mut events,
            )
            .unwrap();
        assert_eq!(rocket.thruster(ThrusterId::Left).power, 0.0);
        assert_eq!(rocket.thruster(ThrusterId::Right).power, 0.0);
    }

    #[test]
    fn destroyed_rocket_ignores_thruster_commands() {
        let universe = earth_universe();
        let mut rocket = fixture_rocket();
        rocket.destroyed = true;
        let mut physics = PhysicsController::new(PhysicsConstants::default());
        physics.init_world(&rocket, &universe);
        let mut events = EventBus::new();
        let mut controller = RocketController::new();

        controller
            .apply(
                Command::SetThrusterPower {
                    id: ThrusterId::Main,
                    power: 90.0,
                },
                &mut rocket,
                &mut physics,
                &universe,
                &mut events,
            )
            .unwrap();
        assert_eq!(rocket.thruster(ThrusterId::Main).power, 0.0);
    }

    #[test]
    fn reset_rocket_restores_fuel_and_clears_destroyed() {
        let universe = earth_universe();
        let mut rocket = fixture_rocket();
        rocket.fuel = 1.0;
        rocket.destroyed = true;
        let mut physics = PhysicsController::new(PhysicsConstants::default());
        physics.init_world(&rocket, &universe);
        let mut events = EventBus::new();
        let mut controller = RocketController::new();

        controller
            .apply(
                Command::ResetRocket,
                &mut rocket,
                &mut physics,
                &universe,
                &mut events,
            )
            .unwrap();
        assert_eq!(rocket.fuel, crate::constants::FUEL_MAX);
        assert!(!rocket.is_destroyed());
    }

    #[test]
    fn toggle_pause_flips_physics_controller() {
        let universe = earth_universe();
        let mut rocket = fixture_rocket();
        let mut physics = PhysicsController::new(PhysicsConstants::default());
        physics.init_world(&rocket, &universe);
        let mut events = EventBus::new();
        let mut controller = RocketController::new();

        assert!(!physics.is_paused());
        controller
            .apply(
                Command::TogglePause,
                &mut rocket,
                &mut physics,
                &universe,
                &mut events,
            )
            .unwrap();
        assert!(physics.is_paused());
    }
}
