//! Collision Handler (spec.md §4.5): contact detection against celestial
//! bodies, plus landing-vs-crash discrimination via the tri-condition tests.
//! Grounded in the teacher's `collision.rs`, which pairs a contact-detection
//! pass with a response/classification function in the same file.

use std::f64::consts::FRAC_PI_2;

use glam::DVec2;

use crate::body_factory::{self, SolverBody};
use crate::constants::ContactThresholds;
use crate::universe::{CelestialBody, Universe};

#[derive(Debug, Clone, PartialEq)]
pub struct ContactEvent {
    pub body_name: String,
    pub contact_point: DVec2,
    pub normal: DVec2,
    pub impact_speed: f64,
    pub angle_to_normal: f64,
    pub angular_velocity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContactOutcome {
    Landing,
    Crash,
    Bounce,
}

/// Finds every celestial body the rocket is currently touching or
/// overlapping. The rocket is treated as a circle of radius `half_extent`
/// for contact purposes (spec.md does not mandate oriented-box contact, and
/// the teacher's own `collision.rs` uses a radius-sum circle test).
pub fn detect_contacts(universe: &Universe, rocket_body: &SolverBody) -> Vec<ContactEvent> {
    universe
        .bodies()
        .iter()
        .filter_map(|body| contact_with(rocket_body, body))
        .collect()
}

fn contact_with(rocket_body: &SolverBody, body: &CelestialBody) -> Option<ContactEvent> {
    let body_solver = body_factory::build_celestial_body(body);
    let delta = rocket_body.position - body_solver.position;
    let distance = delta.length();
    if distance > body_solver.radius + rocket_body.radius {
        return None;
    }
    let normal = if distance > f64::EPSILON {
        delta / distance
    } else {
        DVec2::Y
    };
    let relative_velocity = rocket_body.velocity - body_solver.velocity;
    let impact_speed = relative_velocity.length();
    // The rocket's long axis (nose-to-tail) is offset from `angle` by -90°,
    // the same relationship `thruster::thrust_direction`'s main-engine
    // formula and `sync::enter_landed`'s "angle = surface-normal + 90°"
    // convention both rely on (spec.md §4.4).
    let rocket_axis = DVec2::from_angle(rocket_body.angle - FRAC_PI_2);
    let angle_to_normal = signed_angle_between(rocket_axis, normal);

    Some(ContactEvent {
        body_name: body.name.clone(),
        contact_point: body_solver.position + normal * body_solver.radius,
        normal,
        impact_speed,
        angle_to_normal,
        angular_velocity: rocket_body.angular_velocity,
    })
}

fn signed_angle_between(a: DVec2, b: DVec2) -> f64 {
    a.angle_to(b)
}

pub fn classify(event: &ContactEvent, thresholds: &ContactThresholds) -> ContactOutcome {
    let crash_angle = thresholds.crash_angle_deg.to_radians();
    if event.impact_speed >= thresholds.crash_speed_threshold
        || event.angle_to_normal.abs() >= crash_angle
        || event.angular_velocity.abs() >= thresholds.crash_angular_velocity
    {
        return ContactOutcome::Crash;
    }

    let landing_angle = thresholds.landing_max_angle_deg.to_radians();
    if event.impact_speed <= thresholds.landing_max_speed
        && event.angle_to_normal.abs() <= landing_angle
        && event.angular_velocity.abs() <= thresholds.landing_max_angular_velocity
    {
        return ContactOutcome::Landing;
    }

    ContactOutcome::Bounce
}

/// Damped elastic reflection off the contact normal, used when a contact is
/// neither gentle enough to land nor violent enough to crash.
pub fn apply_bounce(body: &mut SolverBody, normal: DVec2, thresholds: &ContactThresholds) {
    let into_surface = body.velocity.dot(normal);
    if into_surface >= 0.0 {
        return; // already separating
    }
    let reflected = body.velocity - normal * (2.0 * into_surface);
    body.velocity = reflected * thresholds.restitution;
    body.angular_velocity *= thresholds.collision_damping;
}
