//! Body Factory (spec.md §4, data model): builds the "Rigid-Body (solver
//! view)" mirror from model state. Grounded in the teacher's pattern of a
//! small free-function factory producing a physics-side component from a
//! model-side one, rather than letting the physics step reach into model
//! structs directly.

use glam::DVec2;

use crate::rocket::Rocket;
use crate::universe::CelestialBody;

/// Mirrors a [`Rocket`] or [`CelestialBody`] for the integrator and contact
/// resolution. Never the source of truth — the Synchronization Manager
/// (`sync`) is the only module permitted to write one back into the model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverBody {
    pub position: DVec2,
    pub velocity: DVec2,
    pub angle: f64,
    pub angular_velocity: f64,
    pub mass: f64,
    pub moment_of_inertia: f64,
    pub radius: f64,
    /// Celestial bodies are kinematic (their pose is dictated by the
    /// Universe's scripted orbit, never by force integration).
    pub kinematic: bool,
}

pub fn build_rocket_body(rocket: &Rocket) -> SolverBody {
    SolverBody {
        position: rocket.position,
        velocity: rocket.velocity,
        angle: rocket.angle,
        angular_velocity: rocket.angular_velocity,
        mass: rocket.mass,
        moment_of_inertia: rocket.moment_of_inertia,
        radius: rocket.half_extent,
        kinematic: false,
    }
}

pub fn build_celestial_body(body: &CelestialBody) -> SolverBody {
    SolverBody {
        position: body.position,
        velocity: body.velocity,
        angle: 0.0,
        angular_velocity: 0.0,
        mass: body.mass,
        moment_of_inertia: f64::INFINITY,
        radius: body.radius,
        kinematic: true,
    }
}
