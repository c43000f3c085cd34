//! Rocket data model and surface state machine (spec.md §3, §4.4).

use glam::DVec2;

use crate::constants::{self, PhysicsConstants};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThrusterId {
    Main,
    Rear,
    Left,
    Right,
}

impl ThrusterId {
    pub const ALL: [ThrusterId; 4] = [
        ThrusterId::Main,
        ThrusterId::Rear,
        ThrusterId::Left,
        ThrusterId::Right,
    ];

    pub fn index(self) -> usize {
        match self {
            ThrusterId::Main => 0,
            ThrusterId::Rear => 1,
            ThrusterId::Left => 2,
            ThrusterId::Right => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thruster {
    pub power: f64,
    pub max_power: f64,
}

impl Thruster {
    pub fn ratio(&self) -> f64 {
        if self.max_power <= 0.0 {
            0.0
        } else {
            (self.power / self.max_power).clamp(0.0, 1.0)
        }
    }
}

/// Where the rocket sits relative to the world, and who (if anyone) is
/// currently authoritative over its pose. `relative_offset`/`local_angle`
/// are stored in the anchor body's world frame; since no `CelestialBody`
/// rotates on its own axis in this model, that frame's orientation is fixed
/// (see DESIGN.md's resolution of the `bodyAngle` ambiguity).
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceState {
    Flying,
    Landed {
        body: String,
        relative_offset: DVec2,
        local_angle: f64,
    },
    AttachedDebris {
        body: String,
        relative_offset: DVec2,
        local_angle: f64,
    },
    Destroyed,
}

impl SurfaceState {
    pub fn anchor_body(&self) -> Option<&str> {
        match self {
            SurfaceState::Landed { body, .. } | SurfaceState::AttachedDebris { body, .. } => {
                Some(body.as_str())
            }
            SurfaceState::Flying | SurfaceState::Destroyed => None,
        }
    }

    pub fn is_landed(&self) -> bool {
        matches!(self, SurfaceState::Landed { .. })
    }

    pub fn is_flying(&self) -> bool {
        matches!(self, SurfaceState::Flying)
    }
}

/// Where a rocket comes into existence, resolved against a [`crate::universe::Universe`]
/// by [`crate::setup::GameSetup`].
#[derive(Debug, Clone, PartialEq)]
pub struct RocketSpawn {
    pub host_name: String,
    pub altitude: f64,
    pub angle: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CargoItem {
    pub item_type: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rocket {
    pub position: DVec2,
    pub angle: f64,
    pub velocity: DVec2,
    pub angular_velocity: f64,
    pub mass: f64,
    pub moment_of_inertia: f64,
    pub half_extent: f64,
    pub fuel: f64,
    pub health: f64,
    pub thrusters: [Thruster; 4],
    pub surface_state: SurfaceState,
    /// Monotonic latch: once true, never cleared (spec.md §8 invariant #2).
    pub destroyed: bool,
    /// Simulation-time millisecond at which the liftoff grace window ends;
    /// `0` means no grace is active. Written only by the lift-off routine
    /// ([`crate::physics::PhysicsController`]) or [`Rocket::reset`].
    pub liftoff_grace_end_ms: u64,
    pub cargo: Vec<CargoItem>,
    spawn: RocketSpawn,
}

impl Rocket {
    pub fn new(spawn: RocketSpawn, position: DVec2, angle: f64) -> Self {
        let thrusters = std::array::from_fn(|i| Thruster {
            power: 0.0,
            max_power: constants::THRUSTER_SPECS[i].default_max_power,
        });
        Self {
            position,
            angle,
            velocity: DVec2::ZERO,
            angular_velocity: 0.0,
            mass: 1.0,
            moment_of_inertia: 12.0,
            half_extent: 6.0,
            fuel: constants::FUEL_MAX,
            health: constants::HEALTH_MAX,
            thrusters,
            surface_state: SurfaceState::Flying,
            destroyed: false,
            liftoff_grace_end_ms: 0,
            cargo: Vec::new(),
            spawn,
        }
    }

    pub fn spawn(&self) -> &RocketSpawn {
        &self.spawn
    }

    /// Re-initializes pose/fuel/health/state to the spawn configuration in
    /// place; does not itself know the spawn body's current world position
    /// (that requires a [`crate::universe::Universe`] lookup), so callers
    /// pass the resolved absolute pose.
    pub fn reset_to(&mut self, position: DVec2, angle: f64) {
        self.position = position;
        self.angle = angle;
        self.velocity = DVec2::ZERO;
        self.angular_velocity = 0.0;
        self.fuel = constants::FUEL_MAX;
        self.health = constants::HEALTH_MAX;
        for thruster in &mut self.thrusters {
            thruster.power = 0.0;
        }
        self.surface_state = SurfaceState::Flying;
        self.destroyed = false;
        self.liftoff_grace_end_ms = 0;
        self.cargo.clear();
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn thruster(&self, id: ThrusterId) -> &Thruster {
        &self.thrusters[id.index()]
    }

    pub fn thruster_mut(&mut self, id: ThrusterId) -> &mut Thruster {
        &mut self.thrusters[id.index()]
    }

    /// Single write path for thruster power, used by the Rocket Controller
    /// (spec.md §4.6: "only this component writes `thruster.power`").
    /// Silently ignored once destroyed.
    pub fn set_thruster_power(&mut self, id: ThrusterId, power: f64) {
        if self.destroyed {
            return;
        }
        let max = self.thruster(id).max_power;
        self.thruster_mut(id).power = power.clamp(0.0, max);
    }

    /// Single writer for fuel burn (spec.md §9: the duplicate-decrement
    /// defect in the source material is resolved by making this the only
    /// call site, invoked once per tick from [`crate::physics::PhysicsController`]).
    pub fn apply_fuel_burn(&mut self, demand: f64) {
        self.fuel = (self.fuel - demand).clamp(0.0, constants::FUEL_MAX);
    }

    pub fn thrust_ratios(&self) -> [f64; 4] {
        std::array::from_fn(|i| self.thrusters[i].ratio())
    }
}

pub fn default_constants() -> PhysicsConstants {
    PhysicsConstants::default()
}
