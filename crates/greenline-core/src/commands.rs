//! Player commands sent from the input bridge to the simulation.
//!
//! Commands are queued and applied at the next tick boundary.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::EntityId;

/// All possible player actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    /// Start a new session. The difficulty is clamped to the configured range.
    StartGame { location: Location, difficulty: u32 },
    /// Buy and place a defender.
    PlaceDefender {
        row: usize,
        column: usize,
        kind: DefenderKind,
    },
    /// Collect a resource orb.
    PickupOrb { orb: EntityId },
    /// Pause the simulation.
    Pause,
    /// Resume the simulation.
    Resume,
}
