//! Movement System
//!
//! Advances each drone one step toward its target and marks the cell it
//! lands on as seen. This is the only phase that writes the shared grid.

use bevy_ecs::prelude::*;
use patrol_events::{generate_event_id, EventKind, PatrolEvent};

use crate::components::drone::{DroneId, Position, Target};
use crate::components::grid::{AreaGrid, Cell};
use crate::systems::perception::DronesByArea;
use crate::SimulationClock;

/// Resource storing events generated this tick
#[derive(Resource, Debug)]
pub struct TickEvents {
    pub events: Vec<PatrolEvent>,
    next_event_id: u64,
}

impl TickEvents {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            next_event_id: 1,
        }
    }

    pub fn generate_id(&mut self) -> String {
        let id = generate_event_id(self.next_event_id);
        self.next_event_id += 1;
        id
    }

    pub fn push(&mut self, event: PatrolEvent) {
        self.events.push(event);
    }

    pub fn drain(&mut self) -> Vec<PatrolEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl Default for TickEvents {
    fn default() -> Self {
        Self::new()
    }
}

/// System to drop the previous tick's events; ids keep counting
pub fn clear_tick_events(mut tick_events: ResMut<TickEvents>) {
    tick_events.events.clear();
}

/// One unit toward `target` on each axis independently
pub fn step_toward(from: Cell, target: Cell) -> Cell {
    Cell::new(
        from.x + (target.x - from.x).signum(),
        from.y + (target.y - from.y).signum(),
    )
}

/// System to move drones and record the visits.
///
/// Runs serially over drones, so two drones landing on the same cell are
/// both reflected in its occupancy.
pub fn execute_movement(
    clock: Res<SimulationClock>,
    mut grid: ResMut<AreaGrid>,
    mut occupancy: ResMut<DronesByArea>,
    mut tick_events: ResMut<TickEvents>,
    mut query: Query<(&DroneId, &mut Position, &Target)>,
) {
    let mut drones: Vec<_> = query.iter_mut().collect();
    drones.sort_by_key(|(id, _, _)| **id);

    for (drone_id, mut position, target) in drones {
        let from = position.cell();
        let to = match target.cell() {
            Some(goal) => step_toward(from, goal),
            None => from,
        };

        position.0 = to;
        if !grid.mark_seen(to) {
            tracing::warn!(drone = %drone_id, x = to.x, y = to.y, "drone left the grid");
        }
        occupancy.relocate(*drone_id, from, to);

        let kind = if to == from {
            EventKind::Held {
                at: to.into(),
                target: target.cell().map(Into::into),
            }
        } else {
            EventKind::Moved {
                from: from.into(),
                to: to.into(),
                target: target.cell().map(Into::into),
            }
        };
        let event_id = tick_events.generate_id();
        tick_events.push(PatrolEvent::new(event_id, clock.current_tick, drone_id.0, kind));

        tracing::debug!(drone = %drone_id, from_x = from.x, from_y = from.y, to_x = to.x, to_y = to.y, "drone acted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_toward_moves_each_axis_once() {
        let from = Cell::new(5, 5);
        assert_eq!(step_toward(from, Cell::new(9, 1)), Cell::new(6, 4));
        assert_eq!(step_toward(from, Cell::new(5, 0)), Cell::new(5, 4));
        assert_eq!(step_toward(from, Cell::new(2, 5)), Cell::new(4, 5));
        assert_eq!(step_toward(from, from), from);
    }

    #[test]
    fn test_tick_events() {
        let mut events = TickEvents::new();
        assert!(events.is_empty());
        assert_eq!(events.generate_id(), "evt_00000001");
        assert_eq!(events.generate_id(), "evt_00000002");

        events.push(PatrolEvent::new(
            "evt_00000001",
            0,
            0,
            EventKind::Held {
                at: Cell::new(0, 0).into(),
                target: None,
            },
        ));
        assert_eq!(events.len(), 1);
        assert_eq!(events.drain().len(), 1);
        assert!(events.is_empty());
    }

    fn movement_world(drones: &[(u32, Cell, Option<Cell>)]) -> World {
        let mut world = World::new();
        world.insert_resource(SimulationClock::default());
        world.insert_resource(AreaGrid::new(4, 4, 3));
        world.insert_resource(DronesByArea::new());
        world.insert_resource(TickEvents::new());
        for (id, cell, target) in drones {
            world.spawn((DroneId(*id), Position(*cell), Target(*target)));
            world.resource_mut::<DronesByArea>().add(*cell, DroneId(*id));
        }
        world
    }

    #[test]
    fn test_execute_movement_marks_landing_cell() {
        let mut world = movement_world(&[(0, Cell::new(0, 0), Some(Cell::new(3, 2)))]);

        let mut schedule = Schedule::default();
        schedule.add_systems(execute_movement);
        schedule.run(&mut world);

        let grid = world.resource::<AreaGrid>();
        assert_eq!(grid.staleness(1, 1), Some(0));
        assert_eq!(grid.staleness(0, 0), Some(3));

        let occupancy = world.resource::<DronesByArea>();
        assert_eq!(occupancy.at_cell(Cell::new(1, 1)), &[DroneId(0)]);
        assert!(occupancy.at_cell(Cell::new(0, 0)).is_empty());

        let events = world.resource::<TickEvents>();
        assert_eq!(events.len(), 1);
        assert!(events.events[0].is_move());
    }

    #[test]
    fn test_two_drones_landing_on_same_cell() {
        let mut world = movement_world(&[
            (0, Cell::new(0, 0), Some(Cell::new(1, 1))),
            (1, Cell::new(2, 2), Some(Cell::new(1, 1))),
        ]);

        let mut schedule = Schedule::default();
        schedule.add_systems(execute_movement);
        schedule.run(&mut world);

        let occupancy = world.resource::<DronesByArea>();
        assert_eq!(occupancy.at_cell(Cell::new(1, 1)), &[DroneId(0), DroneId(1)]);
        assert_eq!(world.resource::<AreaGrid>().staleness(1, 1), Some(0));
    }

    #[test]
    fn test_drone_without_target_holds_and_scans() {
        let mut world = movement_world(&[(4, Cell::new(2, 3), None)]);

        let mut schedule = Schedule::default();
        schedule.add_systems(execute_movement);
        schedule.run(&mut world);

        assert_eq!(world.resource::<AreaGrid>().staleness(2, 3), Some(0));
        let events = world.resource::<TickEvents>();
        assert!(!events.events[0].is_move());
        assert_eq!(events.events[0].drone_id, 4);
    }
}
