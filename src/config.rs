//! World preset loading (spec.md §6): JSON on disk, validated eagerly so
//! every failure surfaces as a [`ConfigurationError`] before the simulation
//! ever starts stepping.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyConfig {
    pub name: String,
    pub mass: f64,
    pub radius: f64,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub orbit_distance: Option<f64>,
    #[serde(default)]
    pub orbit_angle: Option<f64>,
    #[serde(default)]
    pub orbit_speed: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RocketSpawnConfig {
    pub host_name: String,
    #[serde(default)]
    pub altitude: Option<f64>,
    #[serde(default)]
    pub angle: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RocketConfig {
    pub spawn: RocketSpawnConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ObjectiveConfig {
    Orbit,
    Landing,
    Explore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CargoRequirement {
    pub item_type: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionConfig {
    pub id: String,
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub required_cargo: Vec<CargoRequirement>,
    pub reward: f64,
    pub objective: ObjectiveConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsConfig {
    #[serde(default = "default_g")]
    pub g: f64,
}

fn default_g() -> f64 {
    crate::constants::DEFAULT_G
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self { g: default_g() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    #[serde(default)]
    pub physics: PhysicsConfig,
    pub bodies: Vec<BodyConfig>,
    pub rocket: RocketConfig,
    #[serde(default)]
    pub missions: Vec<MissionConfig>,
}

impl WorldConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Io {
            path: path.display().to_string(),
            message: source.to_string(),
        })?;
        let config: WorldConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.bodies.is_empty() {
            return Err(ConfigurationError::NoBodies);
        }
        let names: std::collections::HashSet<&str> =
            self.bodies.iter().map(|b| b.name.as_str()).collect();
        for body in &self.bodies {
            if body.mass <= 0.0 || body.radius <= 0.0 {
                return Err(ConfigurationError::InvalidBody(body.name.clone()));
            }
            if let Some(parent) = &body.parent {
                if !names.contains(parent.as_str()) {
                    return Err(ConfigurationError::UnknownParent(parent.clone()));
                }
            }
        }
        if !names.contains(self.rocket.spawn.host_name.as_str()) {
            return Err(ConfigurationError::UnknownSpawnHost(
                self.rocket.spawn.host_name.clone(),
            ));
        }
        for mission in &self.missions {
            if !names.contains(mission.from.as_str()) {
                return Err(ConfigurationError::UnknownMissionBody(mission.from.clone()));
            }
            if !names.contains(mission.to.as_str()) {
                return Err(ConfigurationError::UnknownMissionBody(mission.to.clone()));
            }
        }
        Ok(())
    }

    /// Earth/Moon two-body default matching the worked examples in spec.md
    /// §8, so the crate is runnable without an external preset file.
    pub fn default_preset() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            bodies: vec![
                BodyConfig {
                    name: "earth".into(),
                    mass: 2e11,
                    radius: 720.0,
                    color: Some("#3a6ea5".into()),
                    parent: None,
                    orbit_distance: None,
                    orbit_angle: None,
                    orbit_speed: None,
                },
                BodyConfig {
                    name: "moon".into(),
                    mass: 1.2e9,
                    radius: 150.0,
                    color: Some("#b0b0b0".into()),
                    parent: Some("earth".into()),
                    orbit_distance: Some(2000.0),
                    orbit_angle: Some(std::f64::consts::PI + std::f64::consts::FRAC_PI_4),
                    orbit_speed: Some(0.005),
                },
            ],
            rocket: RocketConfig {
                spawn: RocketSpawnConfig {
                    host_name: "earth".into(),
                    altitude: Some(50.0),
                    angle: Some(std::f64::consts::FRAC_PI_2),
                },
            },
            missions: Vec::new(),
        }
    }
}
