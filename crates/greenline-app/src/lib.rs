//! Greenline headless driver.
//!
//! This crate wires the simulation engine to its external collaborators:
//! the fixed-rate game-loop thread, configuration loading, session
//! persistence and the top-scores leaderboard.

pub mod autopilot;
pub mod config_loader;
pub mod game_loop;
pub mod leaderboard;
pub mod logging;
pub mod persistence;
pub mod state;

pub use greenline_core as core;
