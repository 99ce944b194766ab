//! Simulation Facade
//!
//! Owns the ECS world and the tick schedule, and exposes the read-only
//! observation queries drivers and renderers need.

use bevy_ecs::prelude::*;
use patrol_events::{CoverageMetrics, FleetSnapshot, PatrolEvent};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::components::drone::{DroneId, Position, Target};
use crate::components::grid::{AreaGrid, Cell};
use crate::config::SimConfig;
use crate::error::{ConfigError, PatrolError};
use crate::output::{self, CoverageTracker, RunSummary, SnapshotGenerator};
use crate::setup;
use crate::systems::{self, DronesByArea, LocalView, TickEvents, VisibleDrones};
use crate::SimulationClock;

/// A running patrol: grid, fleet and schedule
pub struct Simulation {
    world: World,
    schedule: Schedule,
    /// Drone entities, indexed by `DroneId`
    drones: Vec<Entity>,
}

impl Simulation {
    /// Build a simulation seeded from `config.run.seed`
    pub fn new(config: &SimConfig) -> Result<Self, ConfigError> {
        Self::with_rng(config, SmallRng::seed_from_u64(config.run.seed))
    }

    /// Build a simulation drawing tie-breaks from the given generator
    pub fn with_rng(config: &SimConfig, rng: SmallRng) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut world = World::new();
        setup::insert_resources(&mut world, config, rng);
        let drones = setup::spawn_fleet(&mut world, &config.drones);

        tracing::info!(
            width = config.grid.width,
            height = config.grid.height,
            view_radius = config.grid.view_radius,
            drones = drones.len(),
            strategy = ?config.decision.strategy,
            "simulation initialized"
        );

        Ok(Self {
            world,
            schedule: systems::build_tick_schedule(),
            drones,
        })
    }

    /// Advance the whole fleet and grid by one tick
    pub fn step_all(&mut self) {
        self.schedule.run(&mut self.world);
    }

    /// Advance by `ticks` ticks
    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.step_all();
        }
    }

    /// Number of completed ticks
    pub fn tick(&self) -> u64 {
        self.world.resource::<SimulationClock>().current_tick
    }

    pub fn drone_ids(&self) -> Vec<DroneId> {
        (0..self.drones.len() as u32).map(DroneId).collect()
    }

    pub fn drone_count(&self) -> usize {
        self.drones.len()
    }

    fn entity(&self, drone: DroneId) -> Result<Entity, PatrolError> {
        self.drones
            .get(drone.0 as usize)
            .copied()
            .ok_or(PatrolError::UnknownDrone(drone))
    }

    fn component<T: Component>(&self, drone: DroneId) -> Result<&T, PatrolError> {
        let entity = self.entity(drone)?;
        self.world
            .get::<T>(entity)
            .ok_or(PatrolError::UnknownDrone(drone))
    }

    /// Cell the drone occupies
    pub fn position(&self, drone: DroneId) -> Result<(i32, i32), PatrolError> {
        Ok(self.component::<Position>(drone)?.cell().as_tuple())
    }

    /// Cell the drone is heading for, if it has chosen one
    pub fn target(&self, drone: DroneId) -> Result<Option<(i32, i32)>, PatrolError> {
        Ok(self.component::<Target>(drone)?.cell().map(|c| c.as_tuple()))
    }

    /// Drones the given drone saw during the last perceive phase, itself
    /// included
    pub fn neighbors(&self, drone: DroneId) -> Result<Vec<DroneId>, PatrolError> {
        Ok(self.component::<VisibleDrones>(drone)?.drones.clone())
    }

    /// The window the given drone perceived during the last tick
    pub fn view(&self, drone: DroneId) -> Result<&LocalView, PatrolError> {
        self.component::<LocalView>(drone)
    }

    /// Staleness of the area at (x, y), or `None` outside the grid
    pub fn staleness(&self, x: i32, y: i32) -> Option<u64> {
        self.grid().staleness(x, y)
    }

    /// Overwrite the staleness of one area
    pub fn set_staleness(&mut self, x: i32, y: i32, staleness: u64) -> Result<(), PatrolError> {
        if self.world.resource_mut::<AreaGrid>().set_staleness(x, y, staleness) {
            Ok(())
        } else {
            Err(PatrolError::OutOfBounds { x, y })
        }
    }

    /// Drones occupying (x, y) at the end of the last tick
    pub fn drones_at(&self, x: i32, y: i32) -> Vec<DroneId> {
        self.world
            .resource::<DronesByArea>()
            .at_cell(Cell::new(x, y))
            .to_vec()
    }

    pub fn grid(&self) -> &AreaGrid {
        self.world.resource::<AreaGrid>()
    }

    /// Take the events produced by the most recent tick
    pub fn drain_events(&mut self) -> Vec<PatrolEvent> {
        self.world.resource_mut::<TickEvents>().drain()
    }

    /// Coverage measured at the end of the most recent tick
    pub fn coverage(&self) -> CoverageMetrics {
        self.world.resource::<CoverageTracker>().metrics()
    }

    /// Statistics over every tick run so far
    pub fn summary(&self) -> RunSummary {
        self.world
            .resource::<CoverageTracker>()
            .summary(self.grid().len())
    }

    /// Capture the full state
    pub fn snapshot(&mut self, triggered_by: &str) -> FleetSnapshot {
        output::generate_snapshot(&mut self.world, triggered_by)
    }

    /// Whether the completed tick count falls on the snapshot interval
    pub fn snapshot_due(&self) -> bool {
        self.world
            .resource::<SnapshotGenerator>()
            .should_snapshot(self.tick())
    }

    /// Record that a snapshot of the current tick was written
    pub fn mark_snapshot(&mut self) {
        let tick = self.tick();
        self.world.resource_mut::<SnapshotGenerator>().mark_snapshot(tick);
    }

    /// Whether a snapshot of the current tick was already written
    pub fn snapshot_written(&self) -> bool {
        self.world.resource::<SnapshotGenerator>().last_snapshot_tick() == Some(self.tick())
    }
}
