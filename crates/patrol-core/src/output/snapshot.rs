//! Snapshot Generation
//!
//! Captures the whole fleet and grid as a serializable `FleetSnapshot`.

use bevy_ecs::prelude::*;
use patrol_events::{generate_snapshot_id, DroneSnapshot, FleetSnapshot, GridSnapshot};
use std::fs;
use std::path::{Path, PathBuf};

use crate::components::drone::{DroneId, Position, Target};
use crate::components::grid::AreaGrid;
use crate::error::PatrolError;
use crate::output::stats::CoverageTracker;
use crate::systems::perception::VisibleDrones;
use crate::{PatrolSettings, SimulationClock};

/// Resource to track snapshot generation
#[derive(Resource, Debug)]
pub struct SnapshotGenerator {
    next_snapshot_id: u64,
    snapshot_interval: u64,
    last_snapshot_tick: Option<u64>,
}

impl SnapshotGenerator {
    pub fn new(snapshot_interval: u64) -> Self {
        Self {
            next_snapshot_id: 1,
            snapshot_interval,
            last_snapshot_tick: None,
        }
    }

    /// True on ticks that fall on the interval. An interval of 0 disables
    /// periodic snapshots.
    pub fn should_snapshot(&self, current_tick: u64) -> bool {
        self.snapshot_interval > 0 && current_tick > 0 && current_tick % self.snapshot_interval == 0
    }

    pub fn next_id(&mut self) -> String {
        let id = generate_snapshot_id(self.next_snapshot_id);
        self.next_snapshot_id += 1;
        id
    }

    pub fn mark_snapshot(&mut self, tick: u64) {
        self.last_snapshot_tick = Some(tick);
    }

    /// Tick of the most recent snapshot written to disk, if any
    pub fn last_snapshot_tick(&self) -> Option<u64> {
        self.last_snapshot_tick
    }
}

/// Generate a complete fleet snapshot
pub fn generate_snapshot(world: &mut World, triggered_by: &str) -> FleetSnapshot {
    let tick = world.resource::<SimulationClock>().current_tick;
    let snapshot_id = world.resource_mut::<SnapshotGenerator>().next_id();

    let mut snapshot = FleetSnapshot::new(snapshot_id, tick, triggered_by);

    let view_radius = world.resource::<PatrolSettings>().view_radius;
    let grid = world.resource::<AreaGrid>();
    snapshot.grid = GridSnapshot {
        width: grid.width(),
        height: grid.height(),
        view_radius,
        staleness: grid.staleness_rows(),
    };
    snapshot.metrics = world.resource::<CoverageTracker>().metrics();

    let mut query = world.query::<(&DroneId, &Position, &Target, &VisibleDrones)>();
    let mut drones: Vec<DroneSnapshot> = query
        .iter(world)
        .map(|(id, position, target, visible)| DroneSnapshot {
            drone_id: id.0,
            position: position.cell().into(),
            target: target.cell().map(Into::into),
            neighbors: visible.drones.iter().map(|d| d.0).collect(),
        })
        .collect();
    drones.sort_by_key(|d| d.drone_id);
    snapshot.drones = drones;

    snapshot
}

/// Write snapshot to file
pub fn write_snapshot(snapshot: &FleetSnapshot, path: impl AsRef<Path>) -> Result<(), PatrolError> {
    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, json)?;
    Ok(())
}

/// Write snapshot to the snapshots directory under `output_dir`
pub fn write_snapshot_to_dir(
    snapshot: &FleetSnapshot,
    output_dir: impl AsRef<Path>,
) -> Result<PathBuf, PatrolError> {
    let dir = output_dir.as_ref().join("snapshots");
    fs::create_dir_all(&dir)?;
    let path = dir.join(format!("snap_{:06}.json", snapshot.tick));
    write_snapshot(snapshot, &path)?;
    Ok(path)
}

/// Write current state (overwrites each time)
pub fn write_current_state(
    snapshot: &FleetSnapshot,
    output_dir: impl AsRef<Path>,
) -> Result<(), PatrolError> {
    fs::create_dir_all(output_dir.as_ref())?;
    write_snapshot(snapshot, output_dir.as_ref().join("current_state.json"))
}
