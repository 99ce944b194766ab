//! Grid Components
//!
//! The shared area grid: one staleness counter per cell.

use bevy_ecs::prelude::*;
use patrol_events::CellCoord;
use serde::{Deserialize, Serialize};

/// Integer coordinate of a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The cell displaced by (dx, dy)
    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Largest per-axis distance to another cell
    pub fn chebyshev_distance(&self, other: Cell) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// Straight-line distance to another cell
    pub fn euclidean_distance(&self, other: Cell) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        (dx * dx + dy * dy).sqrt()
    }

    pub fn as_tuple(&self) -> (i32, i32) {
        (self.x, self.y)
    }
}

impl From<(i32, i32)> for Cell {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl From<Cell> for CellCoord {
    fn from(cell: Cell) -> Self {
        CellCoord::new(cell.x, cell.y)
    }
}

/// One grid cell and how long it has gone unvisited
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Area {
    pub cell: Cell,
    staleness: u64,
    seen_this_tick: bool,
    ever_visited: bool,
}

impl Area {
    pub fn new(cell: Cell, staleness: u64) -> Self {
        Self {
            cell,
            staleness,
            seen_this_tick: false,
            ever_visited: false,
        }
    }

    /// Ticks elapsed since a drone last occupied this area
    pub fn staleness(&self) -> u64 {
        self.staleness
    }

    /// A drone occupies this area: staleness drops to zero
    fn seen(&mut self) {
        self.staleness = 0;
        self.seen_this_tick = true;
        self.ever_visited = true;
    }

    /// End of tick: unseen areas grow one tick staler, seen flags reset
    fn age(&mut self) -> bool {
        if self.seen_this_tick {
            self.seen_this_tick = false;
            false
        } else {
            self.staleness += 1;
            true
        }
    }
}

/// Resource: every area of the grid, row-major
#[derive(Resource, Debug, Clone)]
pub struct AreaGrid {
    width: i32,
    height: i32,
    areas: Vec<Area>,
}

impl AreaGrid {
    /// Build a grid where every area starts at `initial_staleness`.
    /// Dimensions must be positive; the config layer enforces that.
    pub fn new(width: i32, height: i32, initial_staleness: u64) -> Self {
        let mut areas = Vec::with_capacity(width.max(0) as usize * height.max(0) as usize);
        for y in 0..height {
            for x in 0..width {
                areas.push(Area::new(Cell::new(x, y), initial_staleness));
            }
        }

        Self {
            width,
            height,
            areas,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        (0..self.width).contains(&x) && (0..self.height).contains(&y)
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if self.contains(x, y) {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    /// The area at (x, y), or `None` outside the grid
    pub fn area(&self, x: i32, y: i32) -> Option<&Area> {
        self.index(x, y).map(|i| &self.areas[i])
    }

    pub fn area_at(&self, cell: Cell) -> Option<&Area> {
        self.area(cell.x, cell.y)
    }

    pub fn staleness(&self, x: i32, y: i32) -> Option<u64> {
        self.area(x, y).map(Area::staleness)
    }

    /// Overwrite an area's staleness. Returns false outside the grid.
    pub fn set_staleness(&mut self, x: i32, y: i32, staleness: u64) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.areas[i].staleness = staleness;
                true
            }
            None => false,
        }
    }

    /// Record a visit. Returns false outside the grid.
    pub fn mark_seen(&mut self, cell: Cell) -> bool {
        match self.index(cell.x, cell.y) {
            Some(i) => {
                self.areas[i].seen();
                true
            }
            None => false,
        }
    }

    /// Age every area not seen this tick and clear the seen flags.
    /// Returns the number of areas that aged.
    pub fn age_unseen(&mut self) -> usize {
        self.areas.iter_mut().map(Area::age).filter(|aged| *aged).count()
    }

    pub fn max_staleness(&self) -> u64 {
        self.areas.iter().map(Area::staleness).max().unwrap_or(0)
    }

    pub fn mean_staleness(&self) -> f64 {
        if self.areas.is_empty() {
            return 0.0;
        }
        let total: u64 = self.areas.iter().map(Area::staleness).sum();
        total as f64 / self.areas.len() as f64
    }

    pub fn never_visited(&self) -> usize {
        self.areas.iter().filter(|a| !a.ever_visited).count()
    }

    /// Staleness as rows, `rows[y][x]`
    pub fn staleness_rows(&self) -> Vec<Vec<u64>> {
        self.areas
            .chunks(self.width.max(1) as usize)
            .map(|row| row.iter().map(Area::staleness).collect())
            .collect()
    }
}
