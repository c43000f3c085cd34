//! Universe Model (spec.md §4.2): scripted circular orbits for celestial
//! bodies plus gravity sampling for the dynamically-gravitated rocket.
//!
//! Bodies are stored in an arena (`Vec<CelestialBody>`) addressed by a
//! `HashMap<String, usize>` name index rather than the teacher's closed
//! `CelestialBodyId` enum or `Entity`-keyed ECS lookup — the world preset
//! loads an open, arbitrary roster of bodies by name (spec.md §6), so the
//! index has to be open too. This is the concrete "arena + indices" instance
//! of the spec.md §9 redesign note.

use std::collections::HashMap;

use glam::DVec2;

use crate::config::BodyConfig;
use crate::constants::GRAVITY_EPSILON_SQ;
use crate::error::ConfigurationError;

#[derive(Debug, Clone, PartialEq)]
pub struct Orbit {
    pub parent: usize,
    pub distance: f64,
    pub angle: f64,
    pub speed: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CelestialBody {
    pub name: String,
    pub mass: f64,
    pub radius: f64,
    pub position: DVec2,
    pub velocity: DVec2,
    pub orbit: Option<Orbit>,
}

/// Scripted-orbit, kinematic universe: bodies are never force-integrated
/// (spec.md §1 non-goal: no mutual N-body attraction). Only the rocket is
/// dynamically gravitated, via [`Universe::gravity_at`].
#[derive(Debug, Clone)]
pub struct Universe {
    bodies: Vec<CelestialBody>,
    index: HashMap<String, usize>,
    /// Bodies ordered so a parent is always updated before its children.
    update_order: Vec<usize>,
}

impl Universe {
    pub fn from_config(configs: &[BodyConfig]) -> Result<Self, ConfigurationError> {
        if configs.is_empty() {
            return Err(ConfigurationError::NoBodies);
        }

        let mut index = HashMap::new();
        for (i, cfg) in configs.iter().enumerate() {
            if cfg.mass <= 0.0 || cfg.radius <= 0.0 {
                return Err(ConfigurationError::InvalidBody(cfg.name.clone()));
            }
            index.insert(cfg.name.clone(), i);
        }

        let mut bodies = Vec::with_capacity(configs.len());
        for cfg in configs {
            let orbit = match &cfg.parent {
                Some(parent_name) => {
                    let parent = *index
                        .get(parent_name)
                        .ok_or_else(|| ConfigurationError::UnknownParent(parent_name.clone()))?;
                    Some(Orbit {
                        parent,
                        distance: cfg.orbit_distance.unwrap_or(0.0),
                        angle: cfg.orbit_angle.unwrap_or(0.0),
                        speed: cfg.orbit_speed.unwrap_or(0.0),
                    })
                }
                None => None,
            };
            bodies.push(CelestialBody {
                name: cfg.name.clone(),
                mass: cfg.mass,
                radius: cfg.radius,
                position: DVec2::ZERO,
                velocity: DVec2::ZERO,
                orbit,
            });
        }

        let update_order = topological_order(&bodies);

        let mut universe = Self {
            bodies,
            index,
            update_order,
        };
        universe.resolve_positions();
        Ok(universe)
    }

    fn resolve_positions(&mut self) {
        for &i in &self.update_order.clone() {
            let Some(orbit) = self.bodies[i].orbit.clone() else {
                continue;
            };
            let parent_pos = self.bodies[orbit.parent].position;
            let parent_vel = self.bodies[orbit.parent].velocity;
            let (pos, vel) = orbit_state(&orbit, parent_pos, parent_vel);
            self.bodies[i].position = pos;
            self.bodies[i].velocity = vel;
        }
    }

    /// Advances every orbiting body's angle by `speed * dt`, then
    /// re-derives position/velocity analytically. Parents are always
    /// advanced before children within this call.
    pub fn step(&mut self, dt: f64) {
        for &i in &self.update_order.clone() {
            if let Some(orbit) = &mut self.bodies[i].orbit {
                orbit.angle += orbit.speed * dt;
            }
        }
        self.resolve_positions();
    }

    pub fn bodies(&self) -> &[CelestialBody] {
        &self.bodies
    }

    pub fn find_by_name(&self, name: &str) -> Option<&CelestialBody> {
        self.index.get(name).map(|&i| &self.bodies[i])
    }

    pub fn find_by_name_mut(&mut self, name: &str) -> Option<&mut CelestialBody> {
        let i = *self.index.get(name)?;
        Some(&mut self.bodies[i])
    }

    pub fn nearest_to(&self, point: DVec2) -> Option<&CelestialBody> {
        self.bodies
            .iter()
            .min_by(|a, b| {
                let da = (a.position - point).length_squared();
                let db = (b.position - point).length_squared();
                da.total_cmp(&db)
            })
    }

    /// Superposed inverse-square gravitational acceleration at `point`, used
    /// to drive the rocket's integrator. Bodies closer than
    /// `GRAVITY_EPSILON_SQ` (squared) are skipped to avoid a singularity.
    pub fn gravity_at(&self, point: DVec2, g: f64) -> DVec2 {
        let mut accel = DVec2::ZERO;
        for body in &self.bodies {
            let delta = body.position - point;
            let r2 = delta.length_squared();
            if r2 < GRAVITY_EPSILON_SQ {
                continue;
            }
            let r = r2.sqrt();
            accel += delta * (g * body.mass / (r2 * r));
        }
        accel
    }
}

fn orbit_state(orbit: &Orbit, parent_pos: DVec2, parent_vel: DVec2) -> (DVec2, DVec2) {
    let local = DVec2::from_angle(orbit.angle) * orbit.distance;
    let local_vel = DVec2::new(-orbit.angle.sin(), orbit.angle.cos()) * (orbit.distance * orbit.speed);
    (parent_pos + local, parent_vel + local_vel)
}

fn topological_order(bodies: &[CelestialBody]) -> Vec<usize> {
    let mut depth = vec![0u32; bodies.len()];
    for i in 0..bodies.len() {
        let mut d = 0u32;
        let mut cur = i;
        while let Some(orbit) = &bodies[cur].orbit {
            cur = orbit.parent;
            d += 1;
            if d as usize > bodies.len() {
                break; // cyclic parent chain, bail rather than loop forever
            }
        }
        depth[i] = d;
    }
    let mut order: Vec<usize> = (0..bodies.len()).collect();
    order.sort_by_key(|&i| depth[i]);
    order
}
