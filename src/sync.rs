//! Synchronization Manager (spec.md §4.4/§4.7): reconciles the rocket model
//! against its anchor body each tick, runs the periodic landed re-check, and
//! hosts the landing/destroy/lift-off transition helpers shared by the
//! Collision Handler and Physics Controller. Never writes `thruster.power`
//! or `liftoffGraceEnd` itself — those stay with the Rocket Controller and
//! the dedicated lift-off routine, per spec.md §4.6's write-ownership note.

use std::f64::consts::FRAC_PI_2;

use glam::DVec2;

use crate::body_factory::SolverBody;
use crate::constants::{self, PhysicsConstants};
use crate::error::{OnceLog, RecoverableKind};
use crate::rocket::{Rocket, SurfaceState};
use crate::universe::{CelestialBody, Universe};

/// Re-pins a `Landed`/`AttachedDebris` rocket to its anchor body's current
/// position at the start of every tick, unless this is the one tick
/// immediately following a lift-off (in which case the fresh free-flight
/// pose must be left alone).
pub fn pre_step_surface_constraint(
    rocket: &mut Rocket,
    universe: &Universe,
    rocket_solver: &mut SolverBody,
    just_lifted_off: bool,
    log: &mut OnceLog,
) {
    if just_lifted_off {
        return;
    }
    let (body_name, relative_offset) = match &rocket.surface_state {
        SurfaceState::Landed { body, relative_offset, .. }
        | SurfaceState::AttachedDebris { body, relative_offset, .. } => {
            (body.clone(), *relative_offset)
        }
        SurfaceState::Flying | SurfaceState::Destroyed => return,
    };

    match universe.find_by_name(&body_name) {
        Some(anchor) => {
            rocket.position = anchor.position + relative_offset;
            rocket.velocity = anchor.velocity;
            rocket.angular_velocity = 0.0;
            rocket.angle = relative_offset.y.atan2(relative_offset.x) + FRAC_PI_2;
            sync_solver_from_rocket(rocket, rocket_solver);
        }
        None => {
            log.log_once(
                RecoverableKind::State,
                format!("missing-anchor:{body_name}"),
                format!("anchor body `{body_name}` no longer exists; releasing rocket to Flying"),
            );
            rocket.surface_state = SurfaceState::Flying;
        }
    }
}

fn sync_solver_from_rocket(rocket: &Rocket, rocket_solver: &mut SolverBody) {
    rocket_solver.position = rocket.position;
    rocket_solver.velocity = rocket.velocity;
    rocket_solver.angle = rocket.angle;
    rocket_solver.angular_velocity = rocket.angular_velocity;
}

/// Assisted-controls residual-spin damping: only active while `Flying` with
/// no lateral (left/right) thruster input, so pilot-commanded rotation is
/// never fought.
pub fn rotation_stabilization(rocket: &mut Rocket, assisted: bool, lateral_active: bool, dt: f64) {
    if !assisted || !rocket.surface_state.is_flying() || lateral_active {
        return;
    }
    rocket.angular_velocity -= rocket.angular_velocity * constants::ROTATION_STABILITY_FACTOR * dt;
}

/// Copies the free-flight integration result back into the model. Skipped
/// for `Landed`/`AttachedDebris`/`Destroyed`, which are never solver-driven:
/// `Landed` is re-pinned by [`pre_step_surface_constraint`] instead, and a
/// `Destroyed` rocket no longer has a meaningful pose to integrate.
pub fn post_step_sync(rocket: &mut Rocket, rocket_solver: &SolverBody) {
    if !rocket.surface_state.is_flying() {
        return;
    }
    rocket.position = rocket_solver.position;
    rocket.velocity = rocket_solver.velocity;
    rocket.angle = rocket_solver.angle;
    rocket.angular_velocity = rocket_solver.angular_velocity;
}

/// Puts a rocket into `Landed` against `body`, zeroing its motion and
/// orienting it perpendicular to the local surface normal. Shared by the
/// Collision Handler's landing path and the periodic re-check below.
pub fn enter_landed(rocket: &mut Rocket, body: &CelestialBody) {
    rocket.velocity = DVec2::ZERO;
    rocket.angular_velocity = 0.0;
    let to_rocket = rocket.position - body.position;
    let normal_angle = to_rocket.y.atan2(to_rocket.x);
    rocket.angle = normal_angle + FRAC_PI_2;
    rocket.surface_state = SurfaceState::Landed {
        body: body.name.clone(),
        relative_offset: to_rocket,
        local_angle: normal_angle,
    };
}

/// Latches the destroyed flag and, if the rocket was touching a body at the
/// moment of destruction, carries it into `AttachedDebris` rather than a
/// bare `Destroyed` (spec.md §3: "Landed → AttachedDebris occurs only via
/// the destroy transition while touching a body").
pub fn enter_destroyed(rocket: &mut Rocket, touching: Option<&CelestialBody>) {
    rocket.health = 0.0;
    rocket.destroyed = true;
    rocket.surface_state = match touching {
        Some(body) => {
            let relative_offset = rocket.position - body.position;
            let local_angle = relative_offset.y.atan2(relative_offset.x);
            SurfaceState::AttachedDebris {
                body: body.name.clone(),
                relative_offset,
                local_angle,
            }
        }
        None => SurfaceState::Destroyed,
    };
}

/// Fires exactly once per lift-off: clears `Landed`, grants a grace window
/// during which the periodic re-check below is suppressed, and imparts a
/// one-tick upward impulse so the rocket visibly separates from the surface.
pub fn trigger_liftoff(rocket: &mut Rocket, rocket_solver: &mut SolverBody, now_ms: u64) {
    let normal = match &rocket.surface_state {
        SurfaceState::Landed { relative_offset, .. } if relative_offset.length() > f64::EPSILON => {
            *relative_offset / relative_offset.length()
        }
        _ => DVec2::from_angle(rocket.angle - FRAC_PI_2),
    };
    rocket.velocity += normal * constants::LIFTOFF_IMPULSE_SPEED;
    rocket.surface_state = SurfaceState::Flying;
    rocket.liftoff_grace_end_ms = now_ms + constants::LIFTOFF_GRACE_MS;
    sync_solver_from_rocket(rocket, rocket_solver);
}

/// Safety-net re-entry into `Landed`, independent of the Collision Handler's
/// contact-driven transition. Hysteresis against flying/landed oscillation:
/// suppressed during the post-liftoff grace window, while the main thruster
/// is still above the take-off threshold, and while the rocket has any
/// appreciable relative velocity against the candidate body.
pub fn periodic_landed_check(
    rocket: &mut Rocket,
    universe: &Universe,
    now_ms: u64,
    main_thrust_ratio: f64,
) {
    if rocket.is_destroyed() || !rocket.surface_state.is_flying() {
        return;
    }
    if now_ms < rocket.liftoff_grace_end_ms {
        return;
    }
    if main_thrust_ratio > constants::TAKEOFF_THRUST_THRESHOLD_PERCENT {
        return;
    }
    let Some(nearest) = universe.nearest_to(rocket.position) else {
        return;
    };
    let distance = (rocket.position - nearest.position).length();
    if distance > nearest.radius + constants::SURFACE_EPSILON {
        return;
    }
    let relative_speed = (rocket.velocity - nearest.velocity).length();
    if relative_speed > constants::NEAR_ZERO_VELOCITY {
        return;
    }
    enter_landed(rocket, nearest);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body_factory::build_rocket_body;
    use crate::config::BodyConfig;
    use crate::rocket::RocketSpawn;

    fn earth_only_universe() -> Universe {
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

    fn landed_rocket() -> Rocket {
        let mut rocket = Rocket::new(
            RocketSpawn {
                host_name: "earth".into(),
                altitude: 0.0,
                angle: FRAC_PI_2,
            },
            DVec2::new(0.0, 720.0),
            FRAC_PI_2,
        );
        rocket.surface_state = SurfaceState::Landed {
            body: "earth".into(),
            relative_offset: DVec2::new(0.0, 720.0),
            local_angle: FRAC_PI_2,
        };
        rocket
    }

    #[test]
    fn pre_step_constraint_re_pins_to_moving_anchor() {
        let mut universe = earth_only_universe();
        universe.find_by_name_mut("earth").unwrap().position = DVec2::new(5.0, 5.0);
        let mut rocket = landed_rocket();
        let mut solver = build_rocket_body(&rocket);
        let mut log = OnceLog::new();
        pre_step_surface_constraint(&mut rocket, &universe, &mut solver, false, &mut log);
        assert_eq!(rocket.position, DVec2::new(5.0, 725.0));
    }

    #[test]
    fn missing_anchor_releases_to_flying() {
        let universe = earth_only_universe();
        let mut rocket = landed_rocket();
        rocket.surface_state = SurfaceState::Landed {
            body: "mars".into(),
            relative_offset: DVec2::new(0.0, 720.0),
            local_angle: FRAC_PI_2,
        };
        let mut solver = build_rocket_body(&rocket);
        let mut log = OnceLog::new();
        pre_step_surface_constraint(&mut rocket, &universe, &mut solver, false, &mut log);
        assert!(rocket.surface_state.is_flying());
    }

    #[test]
    fn liftoff_clears_landed_and_grants_grace() {
        let mut rocket = landed_rocket();
        let mut solver = build_rocket_body(&rocket);
        trigger_liftoff(&mut rocket, &mut solver, 1_000);
        assert!(rocket.surface_state.is_flying());
        assert_eq!(rocket.liftoff_grace_end_ms, 1_000 + constants::LIFTOFF_GRACE_MS);
        assert!(rocket.velocity.length() > 0.0);
    }

    #[test]
    fn periodic_check_ignores_rocket_still_in_grace_window() {
        let universe = earth_only_universe();
        let mut rocket = landed_rocket();
        rocket.surface_state = SurfaceState::Flying;
        rocket.liftoff_grace_end_ms = 2_000;
        periodic_landed_check(&mut rocket, &universe, 1_000, 0.0);
        assert!(rocket.surface_state.is_flying());
    }

    #[test]
    fn periodic_check_relands_a_resting_rocket() {
        let universe = earth_only_universe();
        let mut rocket = landed_rocket();
        rocket.surface_state = SurfaceState::Flying;
        rocket.velocity = DVec2::ZERO;
        periodic_landed_check(&mut rocket, &universe, 10_000, 0.0);
        assert!(rocket.surface_state.is_landed());
    }

    #[test]
    fn destroy_while_touching_body_produces_attached_debris() {
        let universe = earth_only_universe();
        let mut rocket = landed_rocket();
        enter_destroyed(&mut rocket, universe.find_by_name("earth"));
        assert!(rocket.is_destroyed());
        assert!(matches!(rocket.surface_state, SurfaceState::AttachedDebris { .. }));
    }

    #[test]
    fn destroy_without_contact_is_plain_destroyed() {
        let mut rocket = landed_rocket();
        rocket.surface_state = SurfaceState::Flying;
        enter_destroyed(&mut rocket, None);
        assert_eq!(rocket.surface_state, SurfaceState::Destroyed);
    }
}
