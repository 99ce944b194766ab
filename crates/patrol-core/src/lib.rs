//! Decentralized drone patrol simulation.
//!
//! A fleet of drones covers a grid of areas. Each tick every drone perceives
//! a small square window around itself, heads for the most stale area in
//! view, and steps one cell toward it; areas nobody visits grow staler.
//!
//! [`Simulation`] is the entry point for drivers and renderers.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;

pub mod components;
pub mod config;
pub mod error;
pub mod events;
pub mod output;
pub mod setup;
pub mod simulation;
pub mod systems;

pub use components::{Cell, DroneId};
pub use config::{DecisionStrategy, DronePlacement, SimConfig};
pub use error::{ConfigError, PatrolError};
pub use simulation::Simulation;

/// Seeded random number generator resource
#[derive(Resource)]
pub struct SimRng(pub SmallRng);

/// Resource: per-run parameters the systems read
#[derive(Resource, Debug, Clone, Copy)]
pub struct PatrolSettings {
    pub view_radius: i32,
    pub strategy: DecisionStrategy,
}

impl From<&SimConfig> for PatrolSettings {
    fn from(config: &SimConfig) -> Self {
        Self {
            view_radius: config.grid.view_radius,
            strategy: config.decision.strategy,
        }
    }
}

/// Resource: ticks completed so far. During a tick, the index of the
/// tick being run.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct SimulationClock {
    pub current_tick: u64,
}
