//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Player-placed unit type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DefenderKind {
    /// Single-barrel periodic shooter.
    Shooter1,
    /// Multi-barrel shooter (two projectiles per spray by default).
    Shooter2,
    /// Static blocker with no periodic action.
    Shield,
    /// Periodically emits resource orbs.
    Generator,
}

impl DefenderKind {
    pub const ALL: [DefenderKind; 4] = [
        DefenderKind::Shooter1,
        DefenderKind::Shooter2,
        DefenderKind::Shield,
        DefenderKind::Generator,
    ];

    /// Key of this type in the configuration table.
    pub fn config_key(self) -> &'static str {
        match self {
            DefenderKind::Shooter1 => "Shooter1",
            DefenderKind::Shooter2 => "Shooter2",
            DefenderKind::Shield => "Shield",
            DefenderKind::Generator => "Generator",
        }
    }

    /// Dense index into per-kind tables.
    pub fn index(self) -> usize {
        match self {
            DefenderKind::Shooter1 => 0,
            DefenderKind::Shooter2 => 1,
            DefenderKind::Shield => 2,
            DefenderKind::Generator => 3,
        }
    }
}

/// Enemy unit type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackerKind {
    ZombieBoy,
    ZombieGirl,
}

impl AttackerKind {
    pub const ALL: [AttackerKind; 2] = [AttackerKind::ZombieBoy, AttackerKind::ZombieGirl];

    pub fn config_key(self) -> &'static str {
        match self {
            AttackerKind::ZombieBoy => "ZombieBoy",
            AttackerKind::ZombieGirl => "ZombieGirl",
        }
    }

    pub fn index(self) -> usize {
        match self {
            AttackerKind::ZombieBoy => 0,
            AttackerKind::ZombieGirl => 1,
        }
    }
}

/// Attacker lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackerState {
    #[default]
    Alive,
    /// Lethal damage applied; waiting out the death grace period.
    Dying,
    /// Removed from the field.
    Dead,
}

/// How a resource orb enters the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrbMotion {
    /// Tossed out of a generator.
    Arc,
    /// Dropped from the sky.
    Fall,
}

/// Visual theme of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Location {
    #[default]
    GrassLawn,
    SandBeach,
}

/// Session lifecycle (top-level state).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    #[default]
    Created,
    Running,
    Paused,
    /// Terminal: an attacker reached the defended edge.
    Over,
}
