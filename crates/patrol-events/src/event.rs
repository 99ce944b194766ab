//! Event Types
//!
//! Per-tick records of what each drone did during the act phase.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A grid cell coordinate as it appears in serialized output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellCoord {
    pub x: i32,
    pub y: i32,
}

impl CellCoord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for CellCoord {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// What happened to a drone during the act phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    /// The drone stepped to a new cell
    Moved {
        from: CellCoord,
        to: CellCoord,
        #[serde(skip_serializing_if = "Option::is_none")]
        target: Option<CellCoord>,
    },
    /// The drone stayed put (already on its target, or no target)
    Held {
        at: CellCoord,
        #[serde(skip_serializing_if = "Option::is_none")]
        target: Option<CellCoord>,
    },
}

/// A single drone action, as written to the JSONL event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatrolEvent {
    /// Unique identifier (e.g., "evt_00000042")
    pub event_id: String,
    /// Tick during which the action happened
    pub tick: u64,
    /// Drone that acted
    pub drone_id: u32,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl PatrolEvent {
    pub fn new(event_id: impl Into<String>, tick: u64, drone_id: u32, kind: EventKind) -> Self {
        Self {
            event_id: event_id.into(),
            tick,
            drone_id,
            kind,
        }
    }

    /// Cell the drone occupies after the action.
    pub fn final_cell(&self) -> CellCoord {
        match &self.kind {
            EventKind::Moved { to, .. } => *to,
            EventKind::Held { at, .. } => *at,
        }
    }

    /// Returns true if the drone changed cell.
    pub fn is_move(&self) -> bool {
        matches!(self.kind, EventKind::Moved { .. })
    }

    /// Serializes the event to a JSON line (for JSONL format).
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes an event from a JSON line.
    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// Generates an event ID with the given sequence number.
pub fn generate_event_id(sequence: u64) -> String {
    format!("evt_{:08}", sequence)
}
