//! Reward Function (spec.md §4.8): per-objective shaped-and-one-shot reward
//! computation for the Headless Environment. Kept as its own module rather
//! than folded into `env` because it is sizeable on its own — three
//! objective-specific calculators plus shared shaping — mirroring the
//! teacher's `outcome.rs`: a pure, side-effect-free classifier taking
//! borrowed state and returning a verdict, with no knowledge of how the
//! caller drives episodes.

use std::collections::HashSet;

use crate::config::{MissionConfig, ObjectiveConfig};
use crate::constants::RewardConstants;
use crate::rocket::{Rocket, SurfaceState};
use crate::universe::{CelestialBody, Universe};

/// Which objective classifier to score an episode against (spec.md §4.8).
#[derive(Debug, Clone, PartialEq)]
pub enum Objective {
    Orbit { target_body: String },
    Landing { target_body: String },
    Explore,
}

impl Objective {
    /// Derives the episode objective from a world preset's mission entry
    /// (spec.md §4.8: "one is selected per episode by mission configuration").
    /// `to` is the mission's target body; `Explore` ignores it since it scores
    /// against however many distinct bodies get visited, not one named body.
    pub fn from_mission(mission: &MissionConfig) -> Self {
        match mission.objective {
            ObjectiveConfig::Orbit => Objective::Orbit {
                target_body: mission.to.clone(),
            },
            ObjectiveConfig::Landing => Objective::Landing {
                target_body: mission.to.clone(),
            },
            ObjectiveConfig::Explore => Objective::Explore,
        }
    }
}

/// Per-episode bookkeeping for the latched one-shot rewards. Reset at the
/// start of every episode so a mission cannot be rewarded twice
/// (`_missionRewardedThisEpisode` in spec.md §4.8).
#[derive(Debug, Clone, Default)]
pub struct RewardState {
    orbit_stable_steps: u32,
    orbit_rewarded: bool,
    landing_rewarded: bool,
    explore_rewarded: bool,
    visited: HashSet<String>,
}

impl RewardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardOutcome {
    pub reward: f64,
    /// True the single tick an objective's sustained-success condition
    /// latches; the Headless Environment treats this as a `done` cause.
    pub objective_success: bool,
}

fn shared_shaping(rocket: &Rocket, constants: &RewardConstants) -> f64 {
    let fuel_usage: f64 = rocket.thrust_ratios().iter().sum();
    constants.step_penalty - constants.fuel_penalty_weight * fuel_usage
}

fn orbit_reward(
    target: &CelestialBody,
    rocket: &Rocket,
    constants: &RewardConstants,
    state: &mut RewardState,
) -> (f64, bool) {
    let altitude = (rocket.position - target.position).length() - target.radius;
    let speed = (rocket.velocity - target.velocity).length();
    let mut reward = 0.0;

    let in_altitude_band = altitude >= constants.orbit_min_altitude && altitude <= constants.orbit_max_altitude;
    let in_speed_band = speed >= constants.orbit_min_speed && speed <= constants.orbit_max_speed;

    if in_altitude_band {
        reward += 0.5;
        if in_speed_band {
            reward += 0.5;
        }
    }

    if in_altitude_band && in_speed_band {
        state.orbit_stable_steps += 1;
    } else {
        state.orbit_stable_steps = 0;
    }

    let mut success = false;
    if !state.orbit_rewarded && state.orbit_stable_steps >= constants.orbit_stability_steps {
        reward += constants.orbit_success_reward;
        state.orbit_rewarded = true;
        success = true;
    }

    if altitude < constants.orbit_min_safe_altitude {
        reward += constants.orbit_too_close_penalty;
    } else if altitude > constants.orbit_max_altitude * 1.5 {
        reward += constants.orbit_too_far_penalty;
    }

    (reward, success)
}

fn landing_reward(
    target: &CelestialBody,
    rocket: &Rocket,
    constants: &RewardConstants,
    state: &mut RewardState,
) -> (f64, bool) {
    let altitude = (rocket.position - target.position).length() - target.radius;
    let speed = (rocket.velocity - target.velocity).length();
    let mut reward = 0.0;

    // Non-cumulative, monotone-in-proximity shaped bonus: only the
    // tightest band the rocket currently sits in applies.
    if altitude <= constants.landing_band_near {
        reward += 0.2;
    } else if altitude <= constants.landing_band_mid {
        reward += 0.1;
    } else if altitude <= constants.landing_band_far {
        reward += 0.05;
    }

    if altitude <= constants.landing_band_near && speed < constants.landing_max_speed {
        reward += 0.1;
    }

    let mut success = false;
    if !state.landing_rewarded {
        if let SurfaceState::Landed { body, .. } = &rocket.surface_state {
            if body == &target.name && speed <= constants.landing_max_speed {
                reward += constants.landing_success_reward;
                state.landing_rewarded = true;
                success = true;
            }
        }
    }

    (reward, success)
}

fn explore_reward(rocket: &Rocket, constants: &RewardConstants, state: &mut RewardState) -> (f64, bool) {
    let speed = rocket.velocity.length();
    let mut reward = 0.0;

    if speed >= constants.explore_min_speed && speed <= constants.explore_max_speed {
        reward += constants.explore_step_reward;
    }

    if let SurfaceState::Landed { body, .. } = &rocket.surface_state {
        if state.visited.insert(body.clone()) {
            reward += constants.explore_visit_reward;
        }
    }

    let mut success = false;
    if !state.explore_rewarded && state.visited.len() >= constants.explore_target_visits {
        reward += constants.explore_success_reward;
        state.explore_rewarded = true;
        success = true;
    }

    (reward, success)
}

/// Scores one tick against `objective`, folding in the shared step/fuel
/// shaping and the destroyed penalty. Bodies named by `objective` that have
/// vanished from `universe` (should not happen past config validation, but
/// the classifier stays total rather than panicking) simply contribute no
/// objective-specific bonus for that tick.
pub fn compute(
    objective: &Objective,
    rocket: &Rocket,
    universe: &Universe,
    constants: &RewardConstants,
    state: &mut RewardState,
) -> RewardOutcome {
    let mut reward = shared_shaping(rocket, constants);

    if rocket.is_destroyed() {
        reward += constants.destroyed_penalty;
        return RewardOutcome {
            reward,
            objective_success: false,
        };
    }

    let (bonus, success) = match objective {
        Objective::Orbit { target_body } => match universe.find_by_name(target_body) {
            Some(body) => orbit_reward(body, rocket, constants, state),
            None => (0.0, false),
        },
        Objective::Landing { target_body } => match universe.find_by_name(target_body) {
            Some(body) => landing_reward(body, rocket, constants, state),
            None => (0.0, false),
        },
        Objective::Explore => explore_reward(rocket, constants, state),
    };

    reward += bonus;
    RewardOutcome {
        reward,
        objective_success: success,
    }
}
