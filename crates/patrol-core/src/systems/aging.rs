//! Aging System
//!
//! Closes a tick: every area no drone occupied this tick grows one tick
//! staler, then the clock advances.

use bevy_ecs::prelude::*;

use crate::components::grid::AreaGrid;
use crate::SimulationClock;

/// System to age all areas not seen during the act phase
pub fn age_areas(mut grid: ResMut<AreaGrid>) {
    let aged = grid.age_unseen();
    tracing::trace!(aged, "areas aged");
}

/// System to count the completed tick
pub fn advance_clock(mut clock: ResMut<SimulationClock>) {
    clock.current_tick += 1;
}
