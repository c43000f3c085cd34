//! Physics Controller (spec.md §4.1): the fixed-step kernel loop. Owns the
//! rocket's solver-side mirror and wires the Universe, Thruster Physics,
//! Collision Handler, and Synchronization Manager together in the exact
//! nine-step order spec.md prescribes.
//!
//! Grounded in the teacher's `physics/mod.rs` `physics_step` system: this
//! keeps the same external shape (one call advances exactly one fixed tick,
//! headless, no window or render plugin attached) but inlines the ordering
//! as a straight-line function body rather than a `bevy` `SystemSet` DAG,
//! per spec.md §9's redesign note against implicit global-registration
//! ordering.

use glam::DVec2;

use crate::body_factory::{self, SolverBody};
use crate::collision::{self, ContactOutcome};
use crate::constants::{self, PhysicsConstants};
use crate::error::OnceLog;
use crate::events::{EventBus, SimEvent};
use crate::rocket::{Rocket, ThrusterId};
use crate::sync;
use crate::universe::Universe;

/// Vector annotations spec.md §3 lists as part of the `SimulationSnapshot`:
/// gravity, total thrust, and resulting acceleration at the rocket's current
/// position, recomputed every tick for visualization.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StepDiagnostics {
    pub gravity: DVec2,
    pub total_thrust: DVec2,
    pub acceleration: DVec2,
}

/// Fixed-step simulation kernel. Owns the solver-side [`SolverBody`] mirror
/// of the rocket; no other module writes it (spec.md §5).
pub struct PhysicsController {
    constants: PhysicsConstants,
    rocket_solver: SolverBody,
    paused: bool,
    assisted_controls: bool,
    initialized: bool,
    now_ms: u64,
    collision_enabled_at_ms: u64,
    last_landed_check_ms: u64,
    /// Set for exactly one tick after a lift-off fires, so that tick's
    /// surface-constraint pre-step is skipped (spec.md §4.1 step 2).
    just_lifted_off: bool,
}

impl PhysicsController {
    pub fn new(constants: PhysicsConstants) -> Self {
        Self {
            constants,
            rocket_solver: SolverBody {
                position: DVec2::ZERO,
                velocity: DVec2::ZERO,
                angle: 0.0,
                angular_velocity: 0.0,
                mass: 1.0,
                moment_of_inertia: 1.0,
                radius: 1.0,
                kinematic: false,
            },
            paused: false,
            assisted_controls: true,
            initialized: false,
            now_ms: 0,
            collision_enabled_at_ms: constants::COLLISION_DELAY_MS,
            last_landed_check_ms: 0,
            just_lifted_off: false,
        }
    }

    /// Builds the solver body for `rocket` and resets the timing state
    /// (collision delay, periodic-check cadence). Celestial bodies never
    /// get a persistent solver mirror of their own — `Universe::gravity_at`
    /// and `collision::detect_contacts` read the model directly, since
    /// bodies are kinematic and never force-integrated (spec.md §1).
    pub fn init_world(&mut self, rocket: &Rocket, _universe: &Universe) {
        self.rocket_solver = body_factory::build_rocket_body(rocket);
        self.now_ms = 0;
        self.collision_enabled_at_ms = constants::COLLISION_DELAY_MS;
        self.last_landed_check_ms = 0;
        self.just_lifted_off = false;
        self.paused = false;
        self.initialized = true;
    }

    /// Rebuilds the solver mirror from the model without touching timing
    /// state — used after an out-of-band pose change (e.g. `ResetRocket`)
    /// that does not re-run `init_world`.
    pub fn resync(&mut self, rocket: &Rocket) {
        self.rocket_solver = body_factory::build_rocket_body(rocket);
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Per spec.md §5, resuming must not catch up on the paused wall-clock
    /// interval: the caller is responsible for passing a freshened `dt` into
    /// the next `step`, not this controller replaying missed ticks.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn stop(&mut self) {
        self.paused = true;
        self.initialized = false;
    }

    pub fn toggle_assisted_controls(&mut self) {
        self.assisted_controls = !self.assisted_controls;
    }

    pub fn assisted_controls(&self) -> bool {
        self.assisted_controls
    }

    pub fn rocket_solver(&self) -> &SolverBody {
        &self.rocket_solver
    }

    /// Advances one fixed tick. `dt` is clamped to spec.md's
    /// `MAX_DT_SECONDS`. A no-op (returning the zeroed default) while
    /// paused or before `init_world`.
    pub fn step(
        &mut self,
        dt: f64,
        rocket: &mut Rocket,
        universe: &mut Universe,
        events: &mut EventBus,
        log: &mut OnceLog,
    ) -> StepDiagnostics {
        if self.paused {
            return StepDiagnostics::default();
        }
        if !self.initialized {
            log.log_once(
                crate::error::RecoverableKind::NotReady,
                "step-before-init",
                "PhysicsController::step called before init_world",
            );
            return StepDiagnostics::default();
        }

        let dt = dt.min(constants::MAX_DT_SECONDS).max(0.0);
        self.now_ms += (dt * 1000.0).round() as u64;

        // 1. Universe advance.
        universe.step(dt);

        if rocket.is_destroyed() {
            // AttachedDebris still co-moves with its anchor; plain
            // Destroyed has nothing left to pin.
            sync::pre_step_surface_constraint(rocket, universe, &mut self.rocket_solver, false, log);
            let gravity = universe.gravity_at(rocket.position, self.constants.g);
            return StepDiagnostics {
                gravity,
                total_thrust: DVec2::ZERO,
                acceleration: gravity,
            };
        }

        // 2. Surface constraint pre-step (skipped for one tick post-liftoff).
        sync::pre_step_surface_constraint(
            rocket,
            universe,
            &mut self.rocket_solver,
            self.just_lifted_off,
            log,
        );
        self.just_lifted_off = false;
        self.rocket_solver = body_factory::build_rocket_body(rocket);

        // 3. Rotation stabilization (assisted mode, flying, no lateral input).
        let lateral_active = rocket.thruster(ThrusterId::Left).power > 0.0
            || rocket.thruster(ThrusterId::Right).power > 0.0;
        sync::rotation_stabilization(rocket, self.assisted_controls, lateral_active, dt);
        self.rocket_solver.angular_velocity = rocket.angular_velocity;

        // 4. Thruster application: force/torque, fuel demand, lift-off test.
        let thrust = crate::thruster::compute(rocket, &self.constants, dt);
        rocket.apply_fuel_burn(thrust.fuel_demand);

        if thrust.liftoff_triggered {
            sync::trigger_liftoff(rocket, &mut self.rocket_solver, self.now_ms);
            self.just_lifted_off = true;
        }

        // 5. Solver integrate + 6. Contact handling — only meaningful while
        // free-flying; a still-`Landed` rocket stays pinned by step 2.
        if rocket.surface_state.is_flying() {
            let last_valid = self.rocket_solver;
            let gravity = universe.gravity_at(self.rocket_solver.position, self.constants.g);
            let linear_accel = gravity + thrust.total_force / rocket.mass;
            let angular_accel = thrust.total_torque / rocket.moment_of_inertia;

            self.rocket_solver.velocity += linear_accel * dt;
            self.rocket_solver.angular_velocity += angular_accel * dt;
            self.rocket_solver.position += self.rocket_solver.velocity * dt;
            self.rocket_solver.angle += self.rocket_solver.angular_velocity * dt;

            if !self.rocket_solver.position.is_finite()
                || !self.rocket_solver.velocity.is_finite()
                || !self.rocket_solver.angle.is_finite()
                || !self.rocket_solver.angular_velocity.is_finite()
            {
                log.log_once(
                    crate::error::RecoverableKind::Numerical,
                    "non-finite-pose",
                    "integrator produced a non-finite rocket pose; snapping back to the last valid one",
                );
                self.rocket_solver = last_valid;
            }

            if self.now_ms >= self.collision_enabled_at_ms {
                let contacts = collision::detect_contacts(universe, &self.rocket_solver);
                for contact in &contacts {
                    match collision::classify(contact, &self.constants.contact) {
                        ContactOutcome::Landing => {
                            if let Some(body) = universe.find_by_name(&contact.body_name) {
                                sync::enter_landed(rocket, body);
                                events.emit(SimEvent::RocketLanded {
                                    body: body.name.clone(),
                                });
                            }
                            break;
                        }
                        ContactOutcome::Crash => {
                            let touching = universe.find_by_name(&contact.body_name);
                            sync::enter_destroyed(rocket, touching);
                            events.emit(SimEvent::RocketDestroyed {
                                position: self.rocket_solver.position,
                            });
                            break;
                        }
                        ContactOutcome::Bounce => {
                            collision::apply_bounce(
                                &mut self.rocket_solver,
                                contact.normal,
                                &self.constants.contact,
                            );
                        }
                    }
                }
            }

            // 7. Post-step sync (no-ops once the contact loop above left
            // Landed/Destroyed, since those states are no longer flying).
            sync::post_step_sync(rocket, &self.rocket_solver);
        }

        // 8. Periodic landed re-check.
        if self.now_ms.saturating_sub(self.last_landed_check_ms) >= constants::LANDED_CHECK_INTERVAL_MS
        {
            self.last_landed_check_ms = self.now_ms;
            let main_ratio = rocket.thruster(ThrusterId::Main).ratio();
            sync::periodic_landed_check(rocket, universe, self.now_ms, main_ratio);
        }

        // 9. Gravity diagnostics.
        let gravity = universe.gravity_at(rocket.position, self.constants.g);
        StepDiagnostics {
            gravity,
            total_thrust: thrust.total_force,
            acceleration: gravity + thrust.total_force / rocket.mass,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BodyConfig;
    use crate::rocket::RocketSpawn;
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

    fn flying_rocket(altitude: f64) -> Rocket {
        Rocket::new(
            RocketSpawn {
                host_name: "earth".into(),
                altitude,
                angle: FRAC_PI_2,
            },
            DVec2::new(0.0, 720.0 + altitude),
            FRAC_PI_2,
        )
    }

    #[test]
    fn free_fall_decreases_altitude_with_no_thrust() {
        let mut universe = earth_universe();
        let mut rocket = flying_rocket(3.0 * 720.0);
        let mut controller = PhysicsController::new(PhysicsConstants::default());
        controller.init_world(&rocket, &universe);
        let mut events = EventBus::new();
        let mut log = OnceLog::new();

        let start_y = rocket.position.y;
        for _ in 0..60 {
            controller.step(1.0 / 60.0, &mut rocket, &mut universe, &mut events, &mut log);
        }
        assert!(rocket.position.y < start_y);
        assert!(rocket.velocity.y < 0.0);
        assert!(!rocket.surface_state.is_landed());
        assert_eq!(rocket.fuel, constants::FUEL_MAX);
    }

    #[test]
    fn paused_controller_does_not_advance() {
        let mut universe = earth_universe();
        let mut rocket = flying_rocket(100.0);
        let mut controller = PhysicsController::new(PhysicsConstants::default());
        controller.init_world(&rocket, &universe);
        controller.pause();
        let mut events = EventBus::new();
        let mut log = OnceLog::new();

        let before = rocket.position;
        controller.step(1.0 / 60.0, &mut rocket, &mut universe, &mut events, &mut log);
        assert_eq!(rocket.position, before);
    }

    #[test]
    fn destroyed_rocket_burns_no_fuel_and_feels_no_thrust() {
        let mut universe = earth_universe();
        let mut rocket = flying_rocket(10.0);
        rocket.destroyed = true;
        rocket.surface_state = crate::rocket::SurfaceState::Destroyed;
        rocket.set_thruster_power(ThrusterId::Main, 100.0);
        let mut controller = PhysicsController::new(PhysicsConstants::default());
        controller.init_world(&rocket, &universe);
        let mut events = EventBus::new();
        let mut log = OnceLog::new();

        let fuel_before = rocket.fuel;
        let diag = controller.step(1.0 / 60.0, &mut rocket, &mut universe, &mut events, &mut log);
        assert_eq!(rocket.fuel, fuel_before);
        assert_eq!(diag.total_thrust, DVec2::ZERO);
    }

    #[test]
    fn hard_impact_destroys_the_rocket() {
        let mut universe = earth_universe();
        let mut rocket = flying_rocket(10.0);
        rocket.velocity = DVec2::new(0.0, -5000.0);
        let mut controller = PhysicsController::new(PhysicsConstants::default());
        controller.init_world(&rocket, &universe);
        // Skip past the spawn collision-delay window.
        controller.collision_enabled_at_ms = 0;
        let mut events = EventBus::new();
        let mut log = OnceLog::new();

        let mut destroyed_event = false;
        for _ in 0..5 {
            controller.step(1.0 / 60.0, &mut rocket, &mut universe, &mut events, &mut log);
            if rocket.is_destroyed() {
                destroyed_event = true;
                break;
            }
        }
        assert!(destroyed_event);
        assert!(rocket.is_destroyed());
    }

    #[test]
    fn liftoff_suppresses_landed_check_for_grace_window() {
        let mut universe = earth_universe();
        let mut rocket = flying_rocket(0.0);
        rocket.surface_state = crate::rocket::SurfaceState::Landed {
            body: "earth".into(),
            relative_offset: DVec2::new(0.0, 720.0),
            local_angle: FRAC_PI_2,
        };
        let mut controller = PhysicsController::new(PhysicsConstants::default());
        controller.init_world(&rocket, &universe);
        controller.collision_enabled_at_ms = 0;
        let max_main = rocket.thruster(ThrusterId::Main).max_power;
        rocket.set_thruster_power(ThrusterId::Main, max_main);
        let mut events = EventBus::new();
        let mut log = OnceLog::new();

        let mut left_landed_by = None;
        for step in 0..120 {
            controller.step(1.0 / 60.0, &mut rocket, &mut universe, &mut events, &mut log);
            if left_landed_by.is_none() && !rocket.surface_state.is_landed() {
                left_landed_by = Some(step);
            }
        }
        assert!(left_landed_by.unwrap() <= 30);
        assert!(!rocket.surface_state.is_landed());
    }

    #[test]
    fn non_finite_integration_result_snaps_back_to_last_valid_pose() {
        let mut universe = earth_universe();
        let mut rocket = flying_rocket(500.0);
        // A massless rocket under nonzero thrust integrates to an infinite
        // acceleration, the one realistic way this path produces a
        // non-finite pose without corrupting the model's inputs directly.
        rocket.mass = 0.0;
        rocket.set_thruster_power(ThrusterId::Main, rocket.thruster(ThrusterId::Main).max_power);
        let mut controller = PhysicsController::new(PhysicsConstants::default());
        controller.init_world(&rocket, &universe);
        let mut events = EventBus::new();
        let mut log = OnceLog::new();

        let last_valid_position = rocket.position;
        let last_valid_velocity = rocket.velocity;

        controller.step(1.0 / 60.0, &mut rocket, &mut universe, &mut events, &mut log);

        assert_eq!(rocket.position, last_valid_position);
        assert_eq!(rocket.velocity, last_valid_velocity);
    }
}
