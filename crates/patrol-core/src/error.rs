//! Error Types
//!
//! Configuration errors are fatal at construction time. Everything else the
//! core reports is a lookup failure on an observation query.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::components::drone::DroneId;

/// Invalid or unreadable simulation configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("view radius must be positive, got {0}")]
    InvalidViewRadius(i32),
    #[error("grid dimensions must be positive, got {width}x{height}")]
    InvalidGridSize { width: i32, height: i32 },
    #[error("drone {index} starts at ({x}, {y}), outside the {width}x{height} grid")]
    DroneOutOfBounds {
        index: usize,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },
}

/// Errors surfaced by the simulation facade and its output writers
#[derive(Debug, Error)]
pub enum PatrolError {
    #[error("no drone with id {0}")]
    UnknownDrone(DroneId),
    #[error("({x}, {y}) is outside the grid")]
    OutOfBounds { x: i32, y: i32 },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
}
