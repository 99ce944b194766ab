//! ECS Components
//!
//! Drone entity components and the shared area grid.

pub mod drone;
pub mod grid;

pub use drone::*;
pub use grid::*;
