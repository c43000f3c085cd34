//! Deorbiting - a headless 2D Newtonian spaceflight simulation kernel.
//!
//! Scripted-orbit celestial bodies, a single dynamically-gravitated rocket,
//! and the fixed-step physics loop that drives them, exposed both as a
//! composition root ([`setup::World`]) for a live demo and as a
//! [`env::HeadlessEnvironment`] `reset`/`step` contract for reinforcement
//! learning. Rendering, input capture, and camera/UI concerns are out of
//! scope — this crate is the simulation kernel alone.

pub mod body_factory;
pub mod collision;
pub mod config;
pub mod constants;
pub mod controller;
pub mod env;
pub mod error;
pub mod events;
pub mod physics;
pub mod reward;
pub mod rocket;
pub mod setup;
pub mod sync;
pub mod thruster;
pub mod universe;
