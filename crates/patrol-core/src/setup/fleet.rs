//! Fleet Setup
//!
//! Builds the ECS world from a validated configuration: the area grid, the
//! shared resources, and one entity per drone.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;

use crate::components::drone::{Drone, DroneId, Position, Target};
use crate::components::grid::AreaGrid;
use crate::config::{DronePlacement, SimConfig};
use crate::output::{CoverageTracker, SnapshotGenerator};
use crate::systems::movement::TickEvents;
use crate::systems::perception::{DronesByArea, LocalView, VisibleDrones};
use crate::{PatrolSettings, SimRng, SimulationClock};

/// Everything a drone entity carries
#[derive(Bundle)]
pub struct DroneBundle {
    pub drone: Drone,
    pub id: DroneId,
    pub position: Position,
    pub target: Target,
    pub view: LocalView,
    pub visible: VisibleDrones,
}

impl DroneBundle {
    pub fn new(id: u32, placement: DronePlacement) -> Self {
        let position = Position::new(placement.x, placement.y);
        Self {
            drone: Drone,
            id: DroneId(id),
            position,
            target: Target::default(),
            view: LocalView::empty(position.cell()),
            visible: VisibleDrones::new(),
        }
    }
}

/// Insert all shared resources for a run
pub fn insert_resources(world: &mut World, config: &SimConfig, rng: SmallRng) {
    world.insert_resource(PatrolSettings::from(config));
    world.insert_resource(SimRng(rng));
    world.insert_resource(SimulationClock::default());
    world.insert_resource(AreaGrid::new(
        config.grid.width,
        config.grid.height,
        config.grid.initial_staleness,
    ));
    world.insert_resource(DronesByArea::new());
    world.insert_resource(TickEvents::new());
    world.insert_resource(CoverageTracker::new(config.run.report_interval));
    world.insert_resource(SnapshotGenerator::new(config.run.snapshot_interval));
}

/// Spawn one drone per placement, ids assigned in order.
/// Returns the spawned entities in id order.
pub fn spawn_fleet(world: &mut World, placements: &[DronePlacement]) -> Vec<Entity> {
    let entities: Vec<Entity> = placements
        .iter()
        .enumerate()
        .map(|(i, placement)| world.spawn(DroneBundle::new(i as u32, *placement)).id())
        .collect();

    let mut occupancy = world.resource_mut::<DronesByArea>();
    for (i, placement) in placements.iter().enumerate() {
        occupancy.add(
            Position::new(placement.x, placement.y).cell(),
            DroneId(i as u32),
        );
    }

    entities
}
