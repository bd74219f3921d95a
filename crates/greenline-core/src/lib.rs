//! Core types and definitions for the Greenline lane-defense simulation.
//!
//! This crate defines the vocabulary shared across the other crates:
//! configuration and tuning, entity records, commands, events, snapshots,
//! the persisted session form, and constants. It performs no I/O and has no
//! dependency on any runtime.

pub mod commands;
pub mod components;
pub mod config;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod state;
pub mod tasks;
pub mod types;
