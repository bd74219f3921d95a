//! Per-tick systems that operate on the simulation world.
//!
//! Systems are plain functions over `&mut World` plus the session counters
//! they need. They do not own state; the engine calls them in a fixed order.

pub mod attackers;
pub mod cleanup;
pub mod defenders;
pub mod difficulty;
pub mod economy;
pub mod projectiles;
pub mod score;
pub mod snapshot;
pub mod spawner;
