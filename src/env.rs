//! Headless Environment (spec.md §4.7): the `reset`/`step` contract an
//! external reinforcement-learning training loop drives the kernel through.
//! Translates a flat numeric action into semantic commands via the Rocket
//! Controller, advances exactly one tick of Universe + Physics Controller,
//! scores the tick with `reward::compute`, and reports termination.
//!
//! Grounded in the teacher's `tests/bevy_headless.rs`, which drives a
//! `bevy::app::App` built with `MinimalPlugins` one `app.update()` per
//! external tick to get deterministic headless stepping with no window or
//! render plugin attached; this crate has no `App`, so `HeadlessEnvironment`
//! plays that exact role directly as a plain struct.

use crate::config::WorldConfig;
use crate::constants::{self, ContactThresholds, PhysicsConstants, RewardConstants};
use crate::controller::{Command, RocketController};
use crate::error::{ConfigurationError, OnceLog};
use crate::events::EventBus;
use crate::physics::PhysicsController;
use crate::reward::{self, Objective, RewardState};
use crate::rocket::{Rocket, ThrusterId};
use crate::setup;
use crate::universe::{CelestialBody, Universe};

/// Flat action schema (spec.md §6): every field is optional, and an absent
/// field means "no command this tick" — the thruster in question keeps
/// whatever power it was last set to, rather than being reset to zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StepAction {
    pub main_thruster: Option<f64>,
    pub rear_thruster: Option<f64>,
    pub rotation_input: Option<f64>,
    pub left_thruster: Option<f64>,
    pub right_thruster: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RocketObservation {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub angle: f64,
    pub angular_velocity: f64,
    pub fuel: f64,
    pub health: f64,
    pub is_destroyed: bool,
    pub is_landed: bool,
    pub landed_on: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CelestialObservation {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub mass: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub rocket: RocketObservation,
    pub celestial_bodies: Vec<CelestialObservation>,
    pub step: u64,
    pub reward: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    Destroyed,
    OutOfFuel,
    MaxSteps,
    ImminentCrash,
    ObjectiveSuccess,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepInfo {
    pub termination_reason: Option<TerminationReason>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub observation: Observation,
    pub reward: f64,
    pub done: bool,
    pub info: StepInfo,
}

pub struct HeadlessEnvironment {
    config: WorldConfig,
    universe: Universe,
    rocket: Rocket,
    physics: PhysicsController,
    controller: RocketController,
    events: EventBus,
    log: OnceLog,
    objective: Objective,
    reward_constants: RewardConstants,
    reward_state: RewardState,
    step_count: u64,
    max_steps: u64,
}

impl HeadlessEnvironment {
    pub fn new(config: WorldConfig, objective: Objective) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let universe = setup::build_universe(&config)?;
        let rocket = setup::build_rocket(&config, &universe)?;
        let mut physics = PhysicsController::new(PhysicsConstants {
            g: config.physics.g,
            ..PhysicsConstants::default()
        });
        physics.init_world(&rocket, &universe);
        Ok(Self {
            config,
            universe,
            rocket,
            physics,
            controller: RocketController::new(),
            events: EventBus::new(),
            log: OnceLog::new(),
            objective,
            reward_constants: RewardConstants::default(),
            reward_state: RewardState::new(),
            step_count: 0,
            max_steps: constants::HEADLESS_MAX_STEPS,
        })
    }

    /// Builds an environment whose objective is taken from `config`'s first
    /// mission entry (spec.md §4.8), falling back to `Explore` for a preset
    /// with no missions defined.
    pub fn from_config(config: WorldConfig) -> Result<Self, ConfigurationError> {
        let objective = config
            .missions
            .first()
            .map(Objective::from_mission)
            .unwrap_or(Objective::Explore);
        Self::new(config, objective)
    }

    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn events(&mut self) -> &mut EventBus {
        &mut self.events
    }

    /// Rebuilds universe and rocket from the held config, resets reward
    /// bookkeeping and the step counter, and emits `AI.EPISODE_STARTED`.
    pub fn reset(&mut self) -> Result<Observation, ConfigurationError> {
        self.universe = setup::build_universe(&self.config)?;
        self.rocket = setup::build_rocket(&self.config, &self.universe)?;
        self.physics.init_world(&self.rocket, &self.universe);
        self.reward_state = RewardState::new();
        self.step_count = 0;
        self.log.reset();
        self.events.emit(crate::events::SimEvent::EpisodeStarted);
        Ok(self.observation(0.0))
    }

    /// Advances one tick at the default 1/60s cadence (spec.md §4.7).
    pub fn step_default(&mut self, action: StepAction) -> StepOutcome {
        self.step(action, constants::HEADLESS_DEFAULT_DT)
    }

    pub fn step(&mut self, action: StepAction, dt: f64) -> StepOutcome {
        self.apply_action(action);
        self.physics
            .step(dt, &mut self.rocket, &mut self.universe, &mut self.events, &mut self.log);
        self.step_count += 1;

        let mut termination = None;
        if !self.rocket.is_destroyed() && self.imminent_crash_check() {
            termination = Some(TerminationReason::ImminentCrash);
        }

        let outcome = reward::compute(
            &self.objective,
            &self.rocket,
            &self.universe,
            &self.reward_constants,
            &mut self.reward_state,
        );

        let mut done = false;
        if self.rocket.is_destroyed() {
            done = true;
            termination = termination.or(Some(TerminationReason::Destroyed));
        } else if self.rocket.fuel <= 0.0 {
            done = true;
            termination = Some(TerminationReason::OutOfFuel);
        } else if self.step_count >= self.max_steps {
            done = true;
            termination = Some(TerminationReason::MaxSteps);
        } else if outcome.objective_success {
            done = true;
            termination = Some(TerminationReason::ObjectiveSuccess);
        }

        self.events.emit(crate::events::SimEvent::TrainingStep {
            step: self.step_count,
            reward: outcome.reward,
        });
        if done {
            self.events
                .emit(crate::events::SimEvent::EpisodeEnded { reward: outcome.reward });
        }

        StepOutcome {
            observation: self.observation(outcome.reward),
            reward: outcome.reward,
            done,
            info: StepInfo {
                termination_reason: termination,
            },
        }
    }

    fn apply_action(&mut self, action: StepAction) {
        let mut commands = Vec::with_capacity(5);
        if let Some(v) = action.main_thruster {
            let max = self.rocket.thruster(ThrusterId::Main).max_power;
            commands.push(Command::SetThrusterPower {
                id: ThrusterId::Main,
                power: v.clamp(0.0, 1.0) * max,
            });
        }
        if let Some(v) = action.rear_thruster {
            let max = self.rocket.thruster(ThrusterId::Rear).max_power;
            commands.push(Command::SetThrusterPower {
                id: ThrusterId::Rear,
                power: v.clamp(0.0, 1.0) * max,
            });
        }
        if let Some(v) = action.rotation_input {
            commands.push(Command::Rotate { value: v.clamp(-1.0, 1.0) });
        }
        if let Some(v) = action.left_thruster {
            let max = self.rocket.thruster(ThrusterId::Left).max_power;
            commands.push(Command::SetThrusterPower {
                id: ThrusterId::Left,
                power: v.clamp(0.0, 1.0) * max,
            });
        }
        if let Some(v) = action.right_thruster {
            let max = self.rocket.thruster(ThrusterId::Right).max_power;
            commands.push(Command::SetThrusterPower {
                id: ThrusterId::Right,
                power: v.clamp(0.0, 1.0) * max,
            });
        }

        for command in commands {
            // Neither command below can return `Err` (only `ResetRocket`
            // can); the headless loop has no out-of-band reset path.
            let _ = self.controller.apply(
                command,
                &mut self.rocket,
                &mut self.physics,
                &self.universe,
                &mut self.events,
            );
        }
    }

    /// Fast termination for training (spec.md §4.7): if the rocket is on a
    /// fast, closing trajectory within `CRASH_PROXIMITY_THRESHOLD` of any
    /// body's surface, destroy it immediately rather than waiting for the
    /// solver to generate a contact event next tick.
    fn imminent_crash_check(&mut self) -> bool {
        let bodies: Vec<CelestialBody> = self.universe.bodies().to_vec();
        let thresholds = ContactThresholds::default();
        for body in &bodies {
            let delta = self.rocket.position - body.position;
            let distance = delta.length();
            let altitude = distance - body.radius;

            // Already overshot the surface: the solver's own contact check
            // is still delayed by `COLLISION_DELAY_MS` or simply has not run
            // this tick, but the rocket has physically penetrated the body.
            if altitude <= 0.0 {
                crate::sync::enter_destroyed(&mut self.rocket, Some(body));
                self.events.emit(crate::events::SimEvent::RocketDestroyed {
                    position: self.rocket.position,
                });
                return true;
            }
            if altitude >= constants::CRASH_PROXIMITY_THRESHOLD {
                continue;
            }

            let relative_velocity = self.rocket.velocity - body.velocity;
            let total_speed = relative_velocity.length();
            if total_speed <= thresholds.crash_speed_threshold {
                continue;
            }
            let unit = delta / distance;
            let inbound_speed = -relative_velocity.dot(unit);
            if inbound_speed > 0.0 {
                crate::sync::enter_destroyed(&mut self.rocket, Some(body));
                self.events.emit(crate::events::SimEvent::RocketDestroyed {
                    position: self.rocket.position,
                });
                return true;
            }
        }
        false
    }

    fn observation(&self, reward: f64) -> Observation {
        Observation {
            rocket: RocketObservation {
                x: self.rocket.position.x,
                y: self.rocket.position.y,
                vx: self.rocket.velocity.x,
                vy: self.rocket.velocity.y,
                angle: self.rocket.angle,
                angular_velocity: self.rocket.angular_velocity,
                fuel: self.rocket.fuel,
                health: self.rocket.health,
                is_destroyed: self.rocket.is_destroyed(),
                is_landed: self.rocket.surface_state.is_landed(),
                landed_on: self.rocket.surface_state.anchor_body().map(str::to_owned),
            },
            celestial_bodies: self
                .universe
                .bodies()
                .iter()
                .map(|body| CelestialObservation {
                    name: body.name.clone(),
                    x: body.position.x,
                    y: body.position.y,
                    radius: body.radius,
                    mass: body.mass,
                })
                .collect(),
            step: self.step_count,
            reward,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn explore_env() -> HeadlessEnvironment {
        HeadlessEnvironment::new(WorldConfig::default_preset(), Objective::Explore).unwrap()
    }

    #[test]
    fn from_config_defaults_to_explore_with_no_missions() {
        let env = HeadlessEnvironment::from_config(WorldConfig::default_preset()).unwrap();
        assert_eq!(env.objective, Objective::Explore);
    }

    #[test]
    fn from_config_derives_objective_from_first_mission() {
        let mut config = WorldConfig::default_preset();
        config.missions.push(crate::config::MissionConfig {
            id: "land-on-moon".into(),
            from: "earth".into(),
            to: "moon".into(),
            required_cargo: Vec::new(),
            reward: 10.0,
            objective: crate::config::ObjectiveConfig::Landing,
        });
        let env = HeadlessEnvironment::from_config(config).unwrap();
        assert_eq!(
            env.objective,
            Objective::Landing { target_body: "moon".into() }
        );
    }

    #[test]
    fn reset_is_idempotent() {
        let mut env = explore_env();
        let first = env.reset().unwrap();
        let second = env.reset().unwrap();
        assert_eq!(first.rocket, second.rocket);
        assert_eq!(first.step, second.step);
    }

    #[test]
    fn absent_action_fields_retain_prior_thruster_power() {
        let mut env = explore_env();
        env.step(
            StepAction {
                main_thruster: Some(0.5),
                ..Default::default()
            },
            1.0 / 60.0,
        );
        let before = env.rocket.thruster(ThrusterId::Main).power;
        env.step(StepAction::default(), 1.0 / 60.0);
        assert_eq!(env.rocket.thruster(ThrusterId::Main).power, before);
    }

    #[test]
    fn fuel_exhaustion_ends_the_episode() {
        let mut env = explore_env();
        env.rocket.fuel = 0.0;
        let outcome = env.step(StepAction::default(), 1.0 / 60.0);
        assert!(outcome.done);
        assert_eq!(outcome.info.termination_reason, Some(TerminationReason::OutOfFuel));
    }

    #[test]
    fn hard_crash_trajectory_terminates_via_imminent_crash_predictor() {
        let mut env = explore_env();
        let earth = env.universe.find_by_name("earth").unwrap();
        env.rocket.position = earth.position + glam::DVec2::new(0.0, earth.radius + 50.0);
        env.rocket.velocity = glam::DVec2::new(0.0, -5000.0);
        let outcome = env.step(StepAction::default(), 1.0 / 60.0);
        assert!(outcome.done);
        assert!(outcome.observation.rocket.is_destroyed);
        assert!(outcome.reward < 0.0);
    }

    #[test]
    fn orbit_objective_terminates_on_sustained_success() {
        let mut env = HeadlessEnvironment::new(
            WorldConfig::default_preset(),
            Objective::Orbit {
                target_body: "earth".into(),
            },
        )
        .unwrap()
        .with_max_steps(10_000);
        let constants = RewardConstants::default();
        let altitude = (constants.orbit_min_altitude + constants.orbit_max_altitude) / 2.0;
        let speed = (constants.orbit_min_speed + constants.orbit_max_speed) / 2.0;
        let earth = env.universe.find_by_name("earth").unwrap();
        let earth_position = earth.position;
        let earth_radius = earth.radius;
        env.rocket.position = earth_position + glam::DVec2::new(0.0, earth_radius + altitude);
        env.rocket.velocity = glam::DVec2::new(speed, 0.0);
        env.rocket.surface_state = crate::rocket::SurfaceState::Flying;

        let mut done = false;
        for _ in 0..constants.orbit_stability_steps + 5 {
            env.rocket.position = earth_position + glam::DVec2::new(0.0, earth_radius + altitude);
            env.rocket.velocity = glam::DVec2::new(speed, 0.0);
            let outcome = env.step(StepAction::default(), 0.0);
            if outcome.done {
                done = true;
                assert_eq!(outcome.info.termination_reason, Some(TerminationReason::ObjectiveSuccess));
                break;
            }
        }
        assert!(done);
    }
}
