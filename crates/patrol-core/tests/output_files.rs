//! Output pipeline tests
//!
//! Drives a short run the way the binary does and checks what lands on disk.

use patrol_core::events::EventLogger;
use patrol_core::output::{write_current_state, write_snapshot_to_dir, write_summary, RunSummary};
use patrol_core::{DronePlacement, SimConfig, Simulation};
use patrol_events::{FleetSnapshot, PatrolEvent};
use std::fs;
use std::path::Path;

#[test]
fn test_run_writes_events_snapshots_and_stats() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = SimConfig::with_grid(
        6,
        6,
        2,
        vec![DronePlacement::new(0, 0), DronePlacement::new(5, 5)],
    );
    config.run.snapshot_interval = 5;
    config.run.report_interval = 4;

    let mut sim = Simulation::new(&config).unwrap();
    let mut logger = EventLogger::new(dir.path().join("events.jsonl")).unwrap();

    for _ in 0..12 {
        sim.step_all();
        logger.log_batch(&sim.drain_events()).unwrap();
        if sim.snapshot_due() {
            let snapshot = sim.snapshot("periodic");
            write_snapshot_to_dir(&snapshot, dir.path()).unwrap();
            write_current_state(&snapshot, dir.path()).unwrap();
            sim.mark_snapshot();
        }
    }
    logger.flush().unwrap();
    write_summary(&sim.summary(), dir.path().join("stats.json")).unwrap();

    // One event per drone per tick
    let contents = fs::read_to_string(dir.path().join("events.jsonl")).unwrap();
    let events: Vec<PatrolEvent> = contents
        .lines()
        .map(|line| PatrolEvent::from_jsonl(line).unwrap())
        .collect();
    assert_eq!(events.len(), 24);
    assert_eq!(logger.event_count(), 24);
    assert_eq!(events.first().unwrap().tick, 0);
    assert_eq!(events.last().unwrap().tick, 11);
    assert_eq!(events.last().unwrap().event_id, "evt_00000024");

    // The last event for each drone names where it now stands
    for id in sim.drone_ids() {
        let last = events.iter().rev().find(|e| e.drone_id == id.0).unwrap();
        let cell = last.final_cell();
        assert_eq!((cell.x, cell.y), sim.position(id).unwrap());
    }

    let snapshots = dir.path().join("snapshots");
    assert!(snapshots.join("snap_000005.json").exists());
    assert!(snapshots.join("snap_000010.json").exists());
    assert!(!snapshots.join("snap_000012.json").exists());

    let current: FleetSnapshot =
        serde_json::from_str(&fs::read_to_string(dir.path().join("current_state.json")).unwrap()).unwrap();
    assert_eq!(current.tick, 10);
    assert_eq!(current.drones.len(), 2);

    let summary: RunSummary =
        serde_json::from_str(&fs::read_to_string(dir.path().join("stats.json")).unwrap()).unwrap();
    assert_eq!(summary.total_ticks, 12);
    assert_eq!(summary.area_count, 36);
    let sampled: Vec<u64> = summary.history.iter().map(|s| s.tick).collect();
    assert_eq!(sampled, vec![3, 7, 11]);
}

#[test]
fn test_null_logger_discards_events() {
    let dir = tempfile::tempdir().unwrap();
    let config = SimConfig::with_grid(3, 3, 1, vec![DronePlacement::new(1, 1)]);
    let mut sim = Simulation::new(&config).unwrap();
    let mut logger = EventLogger::null();

    sim.run(3);
    // Only the last tick's event is still buffered
    logger.log_batch(&sim.drain_events()).unwrap();
    logger.flush().unwrap();

    // Counted, but nothing reaches the disk
    assert_eq!(logger.event_count(), 1);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

/// Mirrors the driver: periodic snapshots, then a final one unless the last
/// tick was already captured
fn run_with_snapshots(ticks: u64, interval: u64, output_dir: &Path) -> Simulation {
    let mut config = SimConfig::with_grid(4, 4, 1, vec![DronePlacement::new(0, 0)]);
    config.run.snapshot_interval = interval;
    let mut sim = Simulation::new(&config).unwrap();

    for _ in 0..ticks {
        sim.step_all();
        if sim.snapshot_due() {
            write_snapshot_to_dir(&sim.snapshot("periodic"), output_dir).unwrap();
            sim.mark_snapshot();
        }
    }
    if !sim.snapshot_written() {
        write_snapshot_to_dir(&sim.snapshot("simulation_end"), output_dir).unwrap();
        sim.mark_snapshot();
    }
    sim
}

fn read_snapshot(path: &Path) -> FleetSnapshot {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_final_snapshot_keeps_periodic_one_on_same_tick() {
    let dir = tempfile::tempdir().unwrap();
    run_with_snapshots(10, 5, dir.path());

    let last = read_snapshot(&dir.path().join("snapshots/snap_000010.json"));
    assert_eq!(last.triggered_by, "periodic");
    assert_eq!(last.snapshot_id, "snap_000002");
    assert_eq!(fs::read_dir(dir.path().join("snapshots")).unwrap().count(), 2);
}

#[test]
fn test_final_snapshot_written_off_interval() {
    let dir = tempfile::tempdir().unwrap();
    run_with_snapshots(7, 5, dir.path());

    let last = read_snapshot(&dir.path().join("snapshots/snap_000007.json"));
    assert_eq!(last.triggered_by, "simulation_end");
    assert_eq!(last.tick, 7);
}
