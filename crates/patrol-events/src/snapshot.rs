//! Snapshot Types
//!
//! Serialization structs for fleet snapshots and state output.
//!
//! Snapshots capture the complete state of the patrol at a point in time,
//! used for analysis, visualization, and debugging.

use serde::{Deserialize, Serialize};

use crate::CellCoord;

/// Generates a snapshot ID with the given sequence number.
pub fn generate_snapshot_id(sequence: u64) -> String {
    format!("snap_{:06}", sequence)
}

/// Staleness of every area, row-major (`staleness[y][x]`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub width: i32,
    pub height: i32,
    pub view_radius: i32,
    pub staleness: Vec<Vec<u64>>,
}

impl GridSnapshot {
    /// Staleness at a coordinate, if it lies inside the grid.
    pub fn staleness_at(&self, x: i32, y: i32) -> Option<u64> {
        if x < 0 || y < 0 {
            return None;
        }
        self.staleness
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
            .copied()
    }
}

/// A single drone's observable state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DroneSnapshot {
    pub drone_id: u32,
    pub position: CellCoord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<CellCoord>,
    /// Drones seen in this drone's window during the last perceive phase
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub neighbors: Vec<u32>,
}

impl DroneSnapshot {
    pub fn new(drone_id: u32, position: CellCoord) -> Self {
        Self {
            drone_id,
            position,
            target: None,
            neighbors: Vec::new(),
        }
    }
}

/// Coverage quality measured after the age phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageMetrics {
    /// Largest staleness of any area this tick
    pub max_staleness: u64,
    /// Mean staleness over all areas this tick
    pub mean_staleness: f64,
    /// Areas no drone has occupied since the run started
    pub never_visited: usize,
    /// Largest staleness observed at any tick of the run
    pub worst_staleness: u64,
}

/// Complete fleet snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetSnapshot {
    pub snapshot_id: String,
    pub tick: u64,
    pub triggered_by: String,
    pub grid: GridSnapshot,
    pub drones: Vec<DroneSnapshot>,
    #[serde(default)]
    pub metrics: CoverageMetrics,
}

impl FleetSnapshot {
    /// Creates a new FleetSnapshot with no drones and an empty grid.
    pub fn new(snapshot_id: impl Into<String>, tick: u64, triggered_by: impl Into<String>) -> Self {
        Self {
            snapshot_id: snapshot_id.into(),
            tick,
            triggered_by: triggered_by.into(),
            grid: GridSnapshot::default(),
            drones: Vec::new(),
            metrics: CoverageMetrics::default(),
        }
    }

    /// Finds a drone by ID.
    pub fn find_drone(&self, drone_id: u32) -> Option<&DroneSnapshot> {
        self.drones.iter().find(|d| d.drone_id == drone_id)
    }

    /// Drones standing on the given cell.
    pub fn drones_at(&self, cell: CellCoord) -> Vec<u32> {
        self.drones
            .iter()
            .filter(|d| d.position == cell)
            .map(|d| d.drone_id)
            .collect()
    }
}
