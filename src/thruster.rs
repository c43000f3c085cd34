//! Thruster Physics (spec.md §4.3): force/torque generation, fuel demand,
//! and lift-off threshold detection. Does not itself burn fuel or clear
//! `Landed` — it only reports what the tick *wants* to happen; the single
//! writers for those (`Rocket::apply_fuel_burn`, the lift-off routine in
//! `physics`) live elsewhere, per spec.md §9's single-writer resolution.

use std::f64::consts::FRAC_PI_2;

use glam::DVec2;

use crate::constants::{self, PhysicsConstants};
use crate::rocket::{Rocket, ThrusterId};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrusterForce {
    pub force: DVec2,
    pub application_point: DVec2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrustOutcome {
    pub total_force: DVec2,
    pub total_torque: f64,
    pub per_thruster: [ThrusterForce; 4],
    /// Requested fuel burn for this tick, summed across thrusters and not
    /// yet clamped/applied — the caller (`physics::PhysicsController`)
    /// applies it exactly once via [`Rocket::apply_fuel_burn`].
    pub fuel_demand: f64,
    /// True when the main thruster exceeds the lift-off threshold while the
    /// rocket is `Landed`.
    pub liftoff_triggered: bool,
}

fn offset_vector(rocket_angle: f64, distance: f64, offset_angle: f64) -> DVec2 {
    DVec2::from_angle(rocket_angle + offset_angle) * distance
}

/// Direction each thruster pushes the rocket. Main/rear fire fore-aft along
/// the rocket's own axis; left/right fire tangential to their lever arm, so
/// they produce mostly torque with a small linear component (any off-center
/// force both translates and rotates a rigid body).
fn thrust_direction(id: ThrusterId, rocket_angle: f64, offset_angle: f64) -> DVec2 {
    match id {
        ThrusterId::Main => DVec2::from_angle(rocket_angle - FRAC_PI_2),
        ThrusterId::Rear => DVec2::from_angle(rocket_angle + FRAC_PI_2),
        ThrusterId::Left => DVec2::from_angle(rocket_angle + offset_angle + FRAC_PI_2),
        ThrusterId::Right => DVec2::from_angle(rocket_angle + offset_angle - FRAC_PI_2),
    }
}

pub fn compute(rocket: &Rocket, constants: &PhysicsConstants, dt: f64) -> ThrustOutcome {
    let mut total_force = DVec2::ZERO;
    let mut total_torque = 0.0;
    let mut per_thruster = [ThrusterForce {
        force: DVec2::ZERO,
        application_point: rocket.position,
    }; 4];
    let mut fuel_demand = 0.0;
    let mut liftoff_triggered = false;

    for id in ThrusterId::ALL {
        let spec = constants::thruster_spec(id);
        let thruster = rocket.thruster(id);
        let ratio = thruster.ratio();

        let offset = offset_vector(rocket.angle, spec.offset_distance, spec.offset_angle);
        let application_point = rocket.position + offset;

        // Force and fuel demand only apply while Flying: a Landed rocket
        // producing no force burns no fuel either, per spec.md §8's "fuel is
        // constant otherwise" invariant. The lift-off check below still reads
        // `ratio` directly so a Landed rocket can still throttle up enough to
        // trigger lift-off without having burned anything beforehand.
        let flying = rocket.surface_state.is_flying();
        let magnitude = if flying && rocket.fuel > 0.0 {
            spec.base_thrust * ratio * spec.effectiveness * constants::GLOBAL_THRUST_MULTIPLIER
        } else {
            0.0
        };
        let direction = thrust_direction(id, rocket.angle, spec.offset_angle);
        let force = direction * magnitude;

        total_force += force;
        total_torque += offset.perp_dot(force);
        per_thruster[id.index()] = ThrusterForce {
            force,
            application_point,
        };
        if flying {
            fuel_demand += spec.consumption * ratio * dt;
        }

        if id == ThrusterId::Main
            && rocket.surface_state.is_landed()
            && ratio > constants::TAKEOFF_THRUST_THRESHOLD_PERCENT
        {
            liftoff_triggered = true;
        }
    }

    ThrustOutcome {
        total_force,
        total_torque,
        per_thruster,
        fuel_demand,
        liftoff_triggered,
    }
}
