//! Decision System
//!
//! Picks the area each drone heads for, using nothing but the window it
//! perceived this tick. The most stale visible area wins; ties are broken
//! uniformly at random. A drone that saw no area keeps its previous target.

use bevy_ecs::prelude::*;
use rand::Rng;

use crate::components::drone::{DroneId, Target};
use crate::components::grid::Cell;
use crate::config::DecisionStrategy;
use crate::systems::perception::LocalView;
use crate::{PatrolSettings, SimRng};

/// Offsets of the areas tied for highest staleness, in scan order.
///
/// A strictly staler area replaces the whole tie set, so ties at a lower
/// staleness never survive a later maximum.
pub fn most_stale_candidates(view: &LocalView) -> Vec<(i32, i32)> {
    let mut best: Option<u64> = None;
    let mut candidates = Vec::new();

    for (offset, area) in view.visible() {
        match best {
            Some(b) if area.staleness < b => {}
            Some(b) if area.staleness == b => candidates.push(offset),
            _ => {
                best = Some(area.staleness);
                candidates.clear();
                candidates.push(offset);
            }
        }
    }

    candidates
}

/// Straight-line distance from a drone's cell to an area
pub fn distance_to(from: Cell, area: Cell) -> f64 {
    from.euclidean_distance(area)
}

/// The drone nearest to `area` among `me` and `others`. Ties go to `me`.
pub fn closest_drone(area: Cell, me: (DroneId, Cell), others: &[(DroneId, Cell)]) -> DroneId {
    let (mut closest, mut distance) = (me.0, distance_to(me.1, area));
    for (drone, cell) in others {
        let d = distance_to(*cell, area);
        if d < distance {
            distance = d;
            closest = *drone;
        }
    }
    closest
}

/// Choose a target from a perceived window.
///
/// Returns `None` only when the window held no grid area at all.
pub fn choose_target<R: Rng + ?Sized>(
    view: &LocalView,
    me: DroneId,
    strategy: DecisionStrategy,
    rng: &mut R,
) -> Option<Cell> {
    let candidates = most_stale_candidates(view);
    if candidates.is_empty() {
        return None;
    }

    let origin = view.origin();
    let cells: Vec<Cell> = candidates
        .iter()
        .map(|(ox, oy)| origin.offset(*ox, *oy))
        .collect();

    if strategy == DecisionStrategy::ClosestClaim {
        let others: Vec<(DroneId, Cell)> = view.drones().filter(|(d, _)| *d != me).collect();
        if let Some(claimed) = cells
            .iter()
            .copied()
            .find(|cell| closest_drone(*cell, (me, origin), &others) == me)
        {
            return Some(claimed);
        }
    }

    let pick = rng.gen_range(0..cells.len());
    Some(cells[pick])
}

/// System to set every drone's target from its own window.
///
/// Drones are visited in id order so a seeded run draws tie-breaks in the
/// same sequence every time.
pub fn decide_targets(
    settings: Res<PatrolSettings>,
    mut rng: ResMut<SimRng>,
    mut query: Query<(&DroneId, &LocalView, &mut Target)>,
) {
    let mut drones: Vec<_> = query.iter_mut().collect();
    drones.sort_by_key(|(id, _, _)| **id);

    for (drone_id, view, mut target) in drones {
        match choose_target(view, *drone_id, settings.strategy, &mut rng.0) {
            Some(cell) => {
                tracing::debug!(drone = %drone_id, x = cell.x, y = cell.y, "target chosen");
                target.0 = Some(cell);
            }
            None => {
                tracing::debug!(drone = %drone_id, "nothing in view, keeping target");
            }
        }
    }
}
