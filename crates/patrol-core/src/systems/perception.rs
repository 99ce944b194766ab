//! Perception System
//!
//! Builds each drone's square window onto the grid: the areas within its view
//! radius and the drones standing on them. The window is a private snapshot,
//! replaced wholesale every tick.

use bevy_ecs::prelude::*;
use std::collections::HashMap;

use crate::components::drone::{Drone, DroneId, Position};
use crate::components::grid::{AreaGrid, Cell};
use crate::PatrolSettings;

/// Component tracking which drones a drone saw this tick
#[derive(Component, Debug, Clone, Default)]
pub struct VisibleDrones {
    /// Every drone found anywhere in the window, the perceiving drone
    /// included, by id
    pub drones: Vec<DroneId>,
}

impl VisibleDrones {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Resource tracking drones by cell for occupancy queries
#[derive(Resource, Debug, Default)]
pub struct DronesByArea {
    cells: HashMap<Cell, Vec<DroneId>>,
}

impl DronesByArea {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get drones at a specific cell
    pub fn at_cell(&self, cell: Cell) -> &[DroneId] {
        self.cells.get(&cell).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Clear all occupancy data (called before rebuilding)
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Add a drone to a cell
    pub fn add(&mut self, cell: Cell, drone: DroneId) {
        self.cells.entry(cell).or_default().push(drone);
    }

    /// Move a drone's entry from one cell to another
    pub fn relocate(&mut self, drone: DroneId, from: Cell, to: Cell) {
        if from == to {
            return;
        }
        if let Some(occupants) = self.cells.get_mut(&from) {
            occupants.retain(|d| *d != drone);
            if occupants.is_empty() {
                self.cells.remove(&from);
            }
        }
        self.add(to, drone);
    }
}

/// One visible area as the perceiving drone recorded it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleArea {
    pub cell: Cell,
    pub staleness: u64,
    pub drones: Vec<DroneId>,
}

/// Component: the window a drone perceived this tick.
///
/// Only the part of the (2R+1)x(2R+1) window that lies on the grid is
/// stored, in scan order (x offset outer, y offset inner). Offsets off the
/// grid or beyond the radius read as absent.
#[derive(Component, Debug, Clone)]
pub struct LocalView {
    origin: Cell,
    /// Inclusive offset bounds of the stored rectangle on each axis
    x_offsets: (i32, i32),
    y_offsets: (i32, i32),
    areas: Vec<VisibleArea>,
}

/// Inclusive offsets in -radius..=radius that keep `pos + offset` inside
/// 0..extent. Empty (lo > hi) when none do.
fn clip_offsets(pos: i32, radius: i32, extent: i32) -> (i32, i32) {
    let lo = radius.saturating_neg().max(0i32.saturating_sub(pos));
    let hi = radius.min(extent.saturating_sub(1).saturating_sub(pos));
    (lo, hi)
}

impl LocalView {
    /// A window that saw nothing, centred on `origin`
    pub fn empty(origin: Cell) -> Self {
        Self {
            origin,
            x_offsets: (0, -1),
            y_offsets: (0, -1),
            areas: Vec::new(),
        }
    }

    /// Capture the window around `origin` from the current grid and occupancy
    pub fn capture(grid: &AreaGrid, occupancy: &DronesByArea, origin: Cell, radius: i32) -> Self {
        let x_offsets = clip_offsets(origin.x, radius, grid.width());
        let y_offsets = clip_offsets(origin.y, radius, grid.height());

        let mut areas = Vec::new();
        for ox in x_offsets.0..=x_offsets.1 {
            for oy in y_offsets.0..=y_offsets.1 {
                let cell = origin.offset(ox, oy);
                if let Some(area) = grid.area_at(cell) {
                    areas.push(VisibleArea {
                        cell,
                        staleness: area.staleness(),
                        drones: occupancy.at_cell(cell).to_vec(),
                    });
                }
            }
        }

        Self {
            origin,
            x_offsets,
            y_offsets,
            areas,
        }
    }

    pub fn origin(&self) -> Cell {
        self.origin
    }

    /// The area at offset (ox, oy) from the origin, if it was in the grid
    pub fn get(&self, ox: i32, oy: i32) -> Option<&VisibleArea> {
        let (x_lo, x_hi) = self.x_offsets;
        let (y_lo, y_hi) = self.y_offsets;
        if ox < x_lo || ox > x_hi || oy < y_lo || oy > y_hi {
            return None;
        }
        let column = (y_hi - y_lo + 1) as usize;
        self.areas
            .get((ox - x_lo) as usize * column + (oy - y_lo) as usize)
    }

    /// Visible areas with their offsets, in scan order
    pub fn visible(&self) -> impl Iterator<Item = ((i32, i32), &VisibleArea)> + '_ {
        let origin = self.origin;
        self.areas
            .iter()
            .map(move |area| ((area.cell.x - origin.x, area.cell.y - origin.y), area))
    }

    /// True when no grid area fell inside the window
    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    pub fn area_count(&self) -> usize {
        self.areas.len()
    }

    pub fn max_staleness(&self) -> Option<u64> {
        self.areas.iter().map(|a| a.staleness).max()
    }

    /// Staleness recorded for an absolute cell, if it was visible
    pub fn staleness_of(&self, cell: Cell) -> Option<u64> {
        self.get(cell.x - self.origin.x, cell.y - self.origin.y)
            .map(|a| a.staleness)
    }

    /// Every drone in the window with the cell it occupied, in scan order
    pub fn drones(&self) -> impl Iterator<Item = (DroneId, Cell)> + '_ {
        self.areas
            .iter()
            .flat_map(|area| area.drones.iter().map(move |d| (*d, area.cell)))
    }
}

impl Default for LocalView {
    fn default() -> Self {
        Self::empty(Cell::new(0, 0))
    }
}

/// System to build the DronesByArea index
/// This runs first so every drone perceives the same pre-tick positions
pub fn build_occupancy_index(
    mut occupancy: ResMut<DronesByArea>,
    query: Query<(&DroneId, &Position), With<Drone>>,
) {
    occupancy.clear();

    for (drone_id, position) in query.iter() {
        occupancy.add(position.cell(), *drone_id);
    }
}

/// System to rebuild each drone's window and neighbor set
/// Runs after build_occupancy_index; reads the grid, never writes it
pub fn update_perception(
    settings: Res<PatrolSettings>,
    grid: Res<AreaGrid>,
    occupancy: Res<DronesByArea>,
    mut query: Query<(&Position, &mut LocalView, &mut VisibleDrones), With<Drone>>,
) {
    for (position, mut view, mut visible) in query.iter_mut() {
        let snapshot = LocalView::capture(&grid, &occupancy, position.cell(), settings.view_radius);

        let mut neighbors: Vec<DroneId> = snapshot.drones().map(|(d, _)| d).collect();
        neighbors.sort();
        neighbors.dedup();

        *view = snapshot;
        visible.drones = neighbors;
    }
}
