//! Shared event and snapshot types for the drone patrol simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! Everything here is what the core hands to renderers, loggers and
//! analysis tooling.

pub mod event;
pub mod snapshot;

pub use event::{generate_event_id, CellCoord, EventKind, PatrolEvent};
pub use snapshot::{
    generate_snapshot_id, CoverageMetrics, DroneSnapshot, FleetSnapshot, GridSnapshot,
};
