//! Error types shared by the simulation crates.

use std::path::PathBuf;

use thiserror::Error;

/// Configuration could not be loaded or failed validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read configuration {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("configuration file not found, tried: {}", display_paths(.tried))]
    NotFound { tried: Vec<PathBuf> },
    #[error("no configuration for defender type `{0}`")]
    MissingDefender(&'static str),
    #[error("no configuration for attacker type `{0}`")]
    MissingAttacker(&'static str),
    #[error("`{unit}` requires `{field}`")]
    MissingField {
        unit: &'static str,
        field: &'static str,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A placement request was rejected. Rejection never mutates the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("cell ({row}, {column}) is outside the field")]
    OutOfBounds { row: usize, column: usize },
    #[error("cell ({row}, {column}) is already occupied")]
    Occupied { row: usize, column: usize },
    #[error("not enough sun: cost {cost}, balance {balance}")]
    InsufficientSun { cost: u32, balance: u32 },
    #[error("session is not running")]
    NotRunning,
}
