//! ECS Systems
//!
//! The four tick phases: perceive, decide, act, age.

pub mod aging;
pub mod decision;
pub mod movement;
pub mod perception;

use bevy_ecs::prelude::*;

// Re-export commonly used systems
pub use aging::{advance_clock, age_areas};
pub use decision::{choose_target, closest_drone, decide_targets, distance_to, most_stale_candidates};
pub use movement::{clear_tick_events, execute_movement, step_toward, TickEvents};
pub use perception::{
    build_occupancy_index, update_perception, DronesByArea, LocalView, VisibleArea,
    VisibleDrones,
};

/// Phases of one tick, run in this order with a barrier between each
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickPhase {
    /// Every drone rebuilds its window from the pre-tick grid
    Perceive,
    /// Every drone picks a target from its own window
    Decide,
    /// Every drone steps and marks its new cell seen
    Act,
    /// Unseen areas age; telemetry is recorded
    Age,
}

/// Build the tick schedule with the phases chained
pub fn build_tick_schedule() -> Schedule {
    let mut schedule = Schedule::default();

    schedule.configure_sets(
        (
            TickPhase::Perceive,
            TickPhase::Decide,
            TickPhase::Act,
            TickPhase::Age,
        )
            .chain(),
    );

    schedule.add_systems(
        (clear_tick_events, build_occupancy_index, update_perception)
            .chain()
            .in_set(TickPhase::Perceive),
    );
    schedule.add_systems(decide_targets.in_set(TickPhase::Decide));
    schedule.add_systems(execute_movement.in_set(TickPhase::Act));
    schedule.add_systems(
        (age_areas, crate::output::record_coverage, advance_clock)
            .chain()
            .in_set(TickPhase::Age),
    );

    schedule
}
