//! Drone Components
//!
//! Identity, position and the per-tick target of each patrol unit.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::grid::Cell;

/// Marker component identifying an entity as a drone
#[derive(Component, Debug, Clone, Default)]
pub struct Drone;

/// Stable identifier for a drone, assigned in spawn order
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DroneId(pub u32);

impl fmt::Display for DroneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "drone_{:03}", self.0)
    }
}

/// Component: the cell a drone currently occupies
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position(pub Cell);

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self(Cell::new(x, y))
    }

    pub fn cell(&self) -> Cell {
        self.0
    }
}

/// Component: the area a drone is heading for.
///
/// Set during the decide phase and consumed during the act phase. Kept
/// across ticks so a drone with nothing in view keeps its previous heading.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target(pub Option<Cell>);

impl Target {
    pub fn cell(&self) -> Option<Cell> {
        self.0
    }
}
