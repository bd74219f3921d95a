//! Entity records stored as hecs components.
//!
//! Records are plain data. Game logic lives in the simulation systems; the
//! only behavior here is the one-shot kill latch.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::constants::ATTACKER_Y_OFFSET;
use crate::enums::*;
use crate::types::{Cell, EntityId};

/// A player-placed unit occupying one field cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Defender {
    pub id: EntityId,
    pub kind: DefenderKind,
    pub row: usize,
    pub column: usize,
    pub health: f64,
    pub max_health: f64,
    /// Simulated time of the last shot or generation. `None` until the first
    /// shot, so a fresh shooter fires on its first eligible tick.
    pub last_action_secs: Option<f64>,
    #[serde(default)]
    pub kill_requested: bool,
}

impl Defender {
    pub fn cell(&self) -> Cell {
        Cell::new(self.row, self.column)
    }

    /// Latch the kill request. Returns `true` only the first time.
    pub fn request_kill(&mut self) -> bool {
        !std::mem::replace(&mut self.kill_requested, true)
    }
}

/// An enemy unit walking leftward along its row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attacker {
    pub id: EntityId,
    pub kind: AttackerKind,
    pub row: usize,
    /// Continuous horizontal position in field units.
    pub x: f64,
    /// Current zero-based column, `None` while still right of the field.
    pub column: Option<usize>,
    pub health: f64,
    pub max_health: f64,
    /// Cells per `SPEED_CELL_DIVISOR` seconds.
    pub speed: f64,
    /// Damage per second applied to the defender being eaten.
    pub damage: f64,
    pub state: AttackerState,
    #[serde(default)]
    pub kill_requested: bool,
}

impl Attacker {
    pub fn is_alive(&self) -> bool {
        self.state == AttackerState::Alive
    }

    /// Vertical render position.
    pub fn y(&self, cell_size: f64) -> f64 {
        cell_size * self.row as f64 + ATTACKER_Y_OFFSET * cell_size
    }

    /// Latch the kill request. Returns `true` only the first time.
    pub fn request_kill(&mut self) -> bool {
        !std::mem::replace(&mut self.kill_requested, true)
    }
}

/// A shot travelling rightward along a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub id: EntityId,
    /// Type of the defender that fired it; determines speed and damage.
    pub source: DefenderKind,
    pub row: usize,
    pub x: f64,
    #[serde(default)]
    pub kill_requested: bool,
}

impl Projectile {
    pub fn request_kill(&mut self) -> bool {
        !std::mem::replace(&mut self.kill_requested, true)
    }
}

/// A collectible sun orb.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceOrb {
    pub id: EntityId,
    /// Where the orb appeared.
    pub position: DVec2,
    /// Where the orb comes to rest (equal to `position` for generator orbs).
    pub target: DVec2,
    pub spawn_secs: f64,
    pub motion: OrbMotion,
    /// Sun credited on pickup.
    pub value: u32,
}
