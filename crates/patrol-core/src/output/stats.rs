//! Statistics Output
//!
//! Coverage telemetry collected after each age phase.

use bevy_ecs::prelude::*;
use patrol_events::CoverageMetrics;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs;
use std::path::Path;

use crate::components::grid::AreaGrid;
use crate::error::PatrolError;
use crate::SimulationClock;

/// Most history samples kept; older ones are dropped first
pub const HISTORY_CAPACITY: usize = 1000;

/// Coverage at the end of one tick
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CoverageSample {
    pub tick: u64,
    pub max_staleness: u64,
    pub mean_staleness: f64,
}

/// Overall run statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_ticks: u64,
    pub area_count: usize,
    pub final_metrics: CoverageMetrics,
    /// Mean over ticks of the per-tick maximum staleness
    pub average_max_staleness: f64,
    /// Samples every `sample_interval` ticks, at most `HISTORY_CAPACITY`
    pub history: Vec<CoverageSample>,
}

/// Resource to accumulate coverage statistics during a run.
///
/// Totals are running aggregates; only the sampled history is stored, and
/// it is capped.
#[derive(Resource, Debug, Default)]
pub struct CoverageTracker {
    latest: CoverageMetrics,
    ticks_recorded: u64,
    max_staleness_total: u128,
    sample_interval: u64,
    history: VecDeque<CoverageSample>,
}

impl CoverageTracker {
    /// Tracker sampling history every `sample_interval` ticks (0 keeps none)
    pub fn new(sample_interval: u64) -> Self {
        Self {
            sample_interval,
            ..Self::default()
        }
    }

    /// Record the grid as it stands after aging tick `tick`
    pub fn record(&mut self, tick: u64, grid: &AreaGrid) {
        let max_staleness = grid.max_staleness();
        let mean_staleness = grid.mean_staleness();

        self.latest = CoverageMetrics {
            max_staleness,
            mean_staleness,
            never_visited: grid.never_visited(),
            worst_staleness: self.latest.worst_staleness.max(max_staleness),
        };
        self.ticks_recorded += 1;
        self.max_staleness_total += u128::from(max_staleness);

        if self.sample_interval > 0 && (tick + 1) % self.sample_interval == 0 {
            if self.history.len() == HISTORY_CAPACITY {
                self.history.pop_front();
            }
            self.history.push_back(CoverageSample {
                tick,
                max_staleness,
                mean_staleness,
            });
        }
    }

    pub fn metrics(&self) -> CoverageMetrics {
        self.latest
    }

    /// Generate final statistics
    pub fn summary(&self, area_count: usize) -> RunSummary {
        let average_max_staleness = if self.ticks_recorded == 0 {
            0.0
        } else {
            self.max_staleness_total as f64 / self.ticks_recorded as f64
        };

        RunSummary {
            total_ticks: self.ticks_recorded,
            area_count,
            final_metrics: self.latest,
            average_max_staleness,
            history: self.history.iter().copied().collect(),
        }
    }
}

/// System to record coverage once unseen areas have aged
pub fn record_coverage(
    clock: Res<SimulationClock>,
    grid: Res<AreaGrid>,
    mut tracker: ResMut<CoverageTracker>,
) {
    tracker.record(clock.current_tick, &grid);
}

/// Write run statistics as pretty JSON
pub fn write_summary(summary: &RunSummary, path: impl AsRef<Path>) -> Result<(), PatrolError> {
    let json = serde_json::to_string_pretty(summary)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::grid::Cell;

    #[test]
    fn test_tracker_keeps_worst_staleness() {
        let mut grid = AreaGrid::new(2, 2, 0);
        let mut tracker = CoverageTracker::new(1);

        grid.set_staleness(0, 0, 9);
        tracker.record(0, &grid);
        assert_eq!(tracker.metrics().max_staleness, 9);
        assert_eq!(tracker.metrics().never_visited, 4);

        grid.mark_seen(Cell::new(0, 0));
        tracker.record(1, &grid);
        let metrics = tracker.metrics();
        assert_eq!(metrics.max_staleness, 0);
        assert_eq!(metrics.worst_staleness, 9);
        assert_eq!(metrics.never_visited, 3);
    }

    #[test]
    fn test_summary_averages_per_tick_maximum() {
        let mut grid = AreaGrid::new(1, 1, 2);
        let mut tracker = CoverageTracker::new(1);
        tracker.record(0, &grid);
        grid.set_staleness(0, 0, 4);
        tracker.record(1, &grid);

        let summary = tracker.summary(grid.len());
        assert_eq!(summary.total_ticks, 2);
        assert_eq!(summary.area_count, 1);
        assert!((summary.average_max_staleness - 3.0).abs() < f64::EPSILON);
        assert_eq!(summary.history.len(), 2);
    }

    #[test]
    fn test_history_is_sampled_on_interval() {
        let grid = AreaGrid::new(1, 1, 0);
        let mut tracker = CoverageTracker::new(5);
        for tick in 0..12 {
            tracker.record(tick, &grid);
        }

        let summary = tracker.summary(1);
        assert_eq!(summary.total_ticks, 12);
        let ticks: Vec<u64> = summary.history.iter().map(|s| s.tick).collect();
        assert_eq!(ticks, vec![4, 9]);

        let mut silent = CoverageTracker::new(0);
        silent.record(0, &grid);
        assert!(silent.summary(1).history.is_empty());
    }

    #[test]
    fn test_history_is_capped() {
        let grid = AreaGrid::new(1, 1, 0);
        let mut tracker = CoverageTracker::new(1);
        let ticks = HISTORY_CAPACITY as u64 + 250;
        for tick in 0..ticks {
            tracker.record(tick, &grid);
        }

        let summary = tracker.summary(1);
        assert_eq!(summary.total_ticks, ticks);
        assert_eq!(summary.history.len(), HISTORY_CAPACITY);
        // Oldest samples go first
        assert_eq!(summary.history[0].tick, 250);
        assert_eq!(summary.history[HISTORY_CAPACITY - 1].tick, ticks - 1);
    }

    #[test]
    fn test_empty_summary() {
        let summary = CoverageTracker::new(1).summary(0);
        assert_eq!(summary.total_ticks, 0);
        assert_eq!(summary.average_max_staleness, 0.0);
    }
}
