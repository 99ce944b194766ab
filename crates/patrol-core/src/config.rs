//! Configuration System
//!
//! Loads grid, fleet and run parameters from a TOML file. Every section has
//! defaults, so a partial file (or no file at all) still yields a runnable
//! configuration. Validation happens before the simulation is built and is
//! never silently clamped.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

/// Default config file path
pub const DEFAULT_CONFIG_PATH: &str = "patrol.toml";

/// Top-level configuration structure
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub grid: GridConfig,
    pub drones: Vec<DronePlacement>,
    pub decision: DecisionConfig,
    pub run: RunConfig,
}

/// Grid geometry and perception range
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub width: i32,
    pub height: i32,
    /// Chebyshev radius of the square window each drone perceives
    pub view_radius: i32,
    /// Staleness every area starts with
    pub initial_staleness: u64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 20,
            height: 20,
            view_radius: 2,
            initial_staleness: 0,
        }
    }
}

/// Initial position of one drone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DronePlacement {
    pub x: i32,
    pub y: i32,
}

impl DronePlacement {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// How a drone picks among the most stale candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStrategy {
    /// Uniform random pick among the tied most stale areas
    #[default]
    MostStale,
    /// First tied area no visible drone is closer to, else uniform random
    ClosestClaim,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    pub strategy: DecisionStrategy,
}

/// Driver parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub seed: u64,
    pub ticks: u64,
    pub snapshot_interval: u64,
    pub report_interval: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            ticks: 1000,
            snapshot_interval: 100,
            report_interval: 100,
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            drones: vec![
                DronePlacement::new(0, 0),
                DronePlacement::new(19, 0),
                DronePlacement::new(0, 19),
                DronePlacement::new(19, 19),
            ],
            decision: DecisionConfig::default(),
            run: RunConfig::default(),
        }
    }
}

impl SimConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Configuration for a grid with the given drones and defaults elsewhere
    pub fn with_grid(width: i32, height: i32, view_radius: i32, drones: Vec<DronePlacement>) -> Self {
        Self {
            grid: GridConfig {
                width,
                height,
                view_radius,
                ..GridConfig::default()
            },
            drones,
            ..Self::default()
        }
    }

    /// Reject configurations the simulation cannot run
    pub fn validate(&self) -> Result<(), ConfigError> {
        let GridConfig {
            width,
            height,
            view_radius,
            ..
        } = self.grid;

        // Area count must fit in an i32
        if width <= 0 || height <= 0 || width.checked_mul(height).is_none() {
            return Err(ConfigError::InvalidGridSize { width, height });
        }
        if view_radius <= 0 {
            return Err(ConfigError::InvalidViewRadius(view_radius));
        }

        for (index, placement) in self.drones.iter().enumerate() {
            let inside = (0..width).contains(&placement.x) && (0..height).contains(&placement.y);
            if !inside {
                return Err(ConfigError::DroneOutOfBounds {
                    index,
                    x: placement.x,
                    y: placement.y,
                    width,
                    height,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SimConfig::default();
        assert_eq!(config.grid.view_radius, 2);
        assert_eq!(config.drones.len(), 4);
        assert_eq!(config.decision.strategy, DecisionStrategy::MostStale);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = SimConfig::from_toml_str(
            r#"
            [grid]
            width = 8
            height = 6
            view_radius = 1

            [[drones]]
            x = 7
            y = 5

            [decision]
            strategy = "closest_claim"
            "#,
        )
        .unwrap();

        assert_eq!(config.grid.width, 8);
        assert_eq!(config.grid.initial_staleness, 0);
        assert_eq!(config.drones, vec![DronePlacement::new(7, 5)]);
        assert_eq!(config.decision.strategy, DecisionStrategy::ClosestClaim);
        assert_eq!(config.run.seed, 42);
    }

    #[test]
    fn test_rejects_non_positive_view_radius() {
        let config = SimConfig::with_grid(5, 5, 0, vec![]);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidViewRadius(0))));

        let config = SimConfig::with_grid(5, 5, -3, vec![]);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidViewRadius(-3))));
    }

    #[test]
    fn test_rejects_empty_grid() {
        let config = SimConfig::with_grid(0, 5, 1, vec![]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidGridSize { width: 0, height: 5 })
        ));
    }

    #[test]
    fn test_rejects_grid_too_large_to_index() {
        let config = SimConfig::with_grid(50_000, 50_000, 1, vec![]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidGridSize {
                width: 50_000,
                height: 50_000
            })
        ));

        let config = SimConfig::with_grid(46_340, 46_340, 1, vec![]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_accepts_radius_beyond_grid() {
        let config = SimConfig::with_grid(3, 3, i32::MAX, vec![DronePlacement::new(1, 1)]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_drone_outside_grid() {
        let config = SimConfig::with_grid(
            3,
            3,
            1,
            vec![DronePlacement::new(1, 1), DronePlacement::new(3, 0)],
        );
        match config.validate() {
            Err(ConfigError::DroneOutOfBounds { index, x, y, .. }) => {
                assert_eq!((index, x, y), (1, 3, 0));
            }
            other => panic!("expected out-of-bounds error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_error_is_reported() {
        let result = SimConfig::from_toml_str("[grid]\nwidth = \"wide\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = SimConfig::load("definitely/not/here.toml");
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
