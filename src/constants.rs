//! Physical and tuning constants, grouped the way spec.md §3/§4 introduces
//! them. Everything here is overridable per-world (the `g` field in
//! particular), so these are defaults rather than `const` literals, mirroring
//! the teacher's own `physics/integrator.rs::IAS15Config` resource pattern of
//! a plain `Default`-able struct rather than scattered free constants.

use crate::rocket::ThrusterId;

/// Gravitational constant used by the worked examples in spec.md §8.
pub const DEFAULT_G: f64 = 1e-4;

/// Lift-off grace window: the model ignores the periodic landed re-check for
/// this long after a lift-off, so initial ascent wobble cannot be mistaken
/// for a fresh touchdown.
pub const LIFTOFF_GRACE_MS: u64 = 500;

/// Collision detection is disabled for this long after `init_world`, so a
/// rocket spawned flush against a surface does not immediately register a
/// landing/crash before its first physics tick has integrated anything.
pub const COLLISION_DELAY_MS: u64 = 50;

/// Cadence of the Synchronization Manager's periodic landed re-check.
pub const LANDED_CHECK_INTERVAL_MS: u64 = 150;

/// Upper bound on the integrator's per-tick `dt`, per spec.md §4.1/§5.
pub const MAX_DT_SECONDS: f64 = 1.0 / 30.0;

/// Below this squared distance, gravity contributions are skipped rather
/// than blown up by the inverse-square singularity.
pub const GRAVITY_EPSILON_SQ: f64 = 1.0;

/// Relative speed below which the periodic landed re-check considers the
/// rocket "at rest" against a body.
pub const NEAR_ZERO_VELOCITY: f64 = 1.0;

/// Slack added to a body's radius when testing surface proximity for the
/// periodic landed re-check (keeps the test robust to sub-pixel float
/// drift).
pub const SURFACE_EPSILON: f64 = 0.5;

pub const FUEL_MAX: f64 = 100.0;
pub const HEALTH_MAX: f64 = 100.0;

/// Default spawn altitude above a host body's surface, used when a world
/// preset omits `rocket.spawn.altitude`.
pub const DEFAULT_SPAWN_ALTITUDE: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrusterSpec {
    pub base_thrust: f64,
    pub effectiveness: f64,
    pub consumption: f64,
    pub default_max_power: f64,
    /// Distance of the nozzle from the rocket's center of mass.
    pub offset_distance: f64,
    /// Angle of the nozzle's lever arm in the rocket's body frame, radians.
    pub offset_angle: f64,
}

/// Per-thruster physical constants, indexed by [`ThrusterId::index`].
///
/// `EFFECTIVENESS`/`CONSUMPTION`/base-thrust values are the single resolved
/// set spec.md §9 calls for in place of the source material's two
/// conflicting `ThrusterPhysics` variants — see DESIGN.md.
pub const THRUSTER_SPECS: [ThrusterSpec; 4] = [
    // Main
    ThrusterSpec {
        base_thrust: 120.0,
        effectiveness: 1.0,
        consumption: 0.6,
        default_max_power: 100.0,
        offset_distance: 12.0,
        offset_angle: std::f64::consts::PI,
    },
    // Rear
    ThrusterSpec {
        base_thrust: 40.0,
        effectiveness: 0.8,
        consumption: 0.25,
        default_max_power: 100.0,
        offset_distance: 12.0,
        offset_angle: 0.0,
    },
    // Left
    ThrusterSpec {
        base_thrust: 18.0,
        effectiveness: 0.6,
        consumption: 0.15,
        default_max_power: 100.0,
        offset_distance: 8.0,
        offset_angle: std::f64::consts::FRAC_PI_2,
    },
    // Right
    ThrusterSpec {
        base_thrust: 18.0,
        effectiveness: 0.6,
        consumption: 0.15,
        default_max_power: 100.0,
        offset_distance: 8.0,
        offset_angle: -std::f64::consts::FRAC_PI_2,
    },
];

pub fn thruster_spec(id: ThrusterId) -> &'static ThrusterSpec {
    &THRUSTER_SPECS[id.index()]
}

/// Fraction of a thruster's `maxPower` that the main engine must exceed,
/// while `Landed`, to trigger the lift-off protocol.
pub const TAKEOFF_THRUST_THRESHOLD_PERCENT: f64 = 0.35;

/// Upward impulse (velocity delta, world units/s) applied once when the
/// lift-off protocol fires, so a rocket visibly separates from the surface
/// in the same tick rather than needing several ticks of thrust to out-climb
/// gravity.
pub const LIFTOFF_IMPULSE_SPEED: f64 = 6.0;

/// Global multiplier applied to all thruster output; a single knob for
/// world-level difficulty tuning without touching per-thruster specs.
pub const GLOBAL_THRUST_MULTIPLIER: f64 = 1.0;

/// Fraction of residual angular velocity removed per second by assisted
/// rotation stabilization, while `Flying` with no lateral input.
pub const ROTATION_STABILITY_FACTOR: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactThresholds {
    pub landing_max_speed: f64,
    pub landing_max_angle_deg: f64,
    pub landing_max_angular_velocity: f64,
    pub crash_speed_threshold: f64,
    pub crash_angle_deg: f64,
    pub crash_angular_velocity: f64,
    pub restitution: f64,
    pub collision_damping: f64,
}

impl Default for ContactThresholds {
    fn default() -> Self {
        Self {
            landing_max_speed: 12.0,
            landing_max_angle_deg: 20.0,
            landing_max_angular_velocity: 0.6,
            crash_speed_threshold: 40.0,
            crash_angle_deg: 55.0,
            crash_angular_velocity: 2.5,
            restitution: 0.25,
            collision_damping: 0.6,
        }
    }
}

/// Proximity (world units) at which the Headless Environment's imminent-crash
/// predictor starts evaluating the approach trajectory.
pub const CRASH_PROXIMITY_THRESHOLD: f64 = 150.0;

/// Default episode length cap for the Headless Environment's `step counter
/// >= max` termination condition (spec.md §4.7), at the default `dt = 1/60`.
pub const HEADLESS_MAX_STEPS: u64 = 3600;

/// Default headless tick length (spec.md §4.7: `step(action, dt = 1/60)`).
pub const HEADLESS_DEFAULT_DT: f64 = 1.0 / 60.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardConstants {
    pub step_penalty: f64,
    pub fuel_penalty_weight: f64,
    pub destroyed_penalty: f64,
    pub orbit_min_altitude: f64,
    pub orbit_max_altitude: f64,
    pub orbit_min_speed: f64,
    pub orbit_max_speed: f64,
    pub orbit_min_safe_altitude: f64,
    pub orbit_too_close_penalty: f64,
    pub orbit_too_far_penalty: f64,
    pub orbit_stability_steps: u32,
    pub orbit_success_reward: f64,
    pub landing_band_far: f64,
    pub landing_band_mid: f64,
    pub landing_band_near: f64,
    pub landing_max_speed: f64,
    pub landing_success_reward: f64,
    pub explore_min_speed: f64,
    pub explore_max_speed: f64,
    pub explore_step_reward: f64,
    pub explore_visit_reward: f64,
    pub explore_success_reward: f64,
    pub explore_target_visits: usize,
}

impl Default for RewardConstants {
    fn default() -> Self {
        Self {
            step_penalty: -0.01,
            fuel_penalty_weight: 0.005,
            destroyed_penalty: -100.0,
            orbit_min_altitude: 400.0,
            orbit_max_altitude: 1200.0,
            orbit_min_speed: 2.0,
            orbit_max_speed: 12.0,
            orbit_min_safe_altitude: 150.0,
            orbit_too_close_penalty: -1.0,
            orbit_too_far_penalty: -0.5,
            orbit_stability_steps: 150,
            orbit_success_reward: 100.0,
            landing_band_far: 1000.0,
            landing_band_mid: 500.0,
            landing_band_near: 100.0,
            landing_max_speed: 12.0,
            landing_success_reward: 100.0,
            explore_min_speed: 1.0,
            explore_max_speed: 20.0,
            explore_step_reward: 0.02,
            explore_visit_reward: 10.0,
            explore_success_reward: 100.0,
            explore_target_visits: 2,
        }
    }
}

/// Everything tunable by a world preset, bundled so `PhysicsController`,
/// `Thruster Physics`, and `Collision Handler` all read from one immutable
/// snapshot per simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsConstants {
    pub g: f64,
    pub contact: ContactThresholds,
}

impl Default for PhysicsConstants {
    fn default() -> Self {
        Self {
            g: DEFAULT_G,
            contact: ContactThresholds::default(),
        }
    }
}
