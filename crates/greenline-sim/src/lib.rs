//! Simulation engine for Greenline.
//!
//! Owns the hecs world holding every live unit, runs the per-tick systems
//! at the configured rate, and produces `SessionSnapshot`s for the render
//! bridge.

pub mod engine;
pub mod error;
pub mod grid;
pub mod index;
pub mod scheduler;
pub mod session;
pub mod systems;
pub mod world_setup;

pub use engine::{SimConfig, SimulationEngine};
pub use error::SessionError;
pub use greenline_core as core;
