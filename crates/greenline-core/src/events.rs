//! Lifecycle events emitted by the simulation for the render/input bridge.
//!
//! Events are collected during a tick and delivered with that tick's
//! snapshot; they are the explicit diff of what changed.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{Cell, EntityId};

/// One-shot notification about an entity or session change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimEvent {
    DefenderPlaced {
        id: EntityId,
        kind: DefenderKind,
        cell: Cell,
    },
    DefenderKilled {
        id: EntityId,
        kind: DefenderKind,
        cell: Cell,
    },
    /// A shooter fired one barrel.
    DefenderWantsToShoot { id: EntityId, kind: DefenderKind },
    GeneratorWantsToEmitSun { id: EntityId },
    AttackerSpawned {
        id: EntityId,
        kind: AttackerKind,
        row: usize,
    },
    /// Lethal damage applied; removal follows after the grace period.
    AttackerDying { id: EntityId },
    AttackerKilled { id: EntityId },
    ProjectileSpawned {
        id: EntityId,
        source: DefenderKind,
        row: usize,
    },
    ProjectileKilled { id: EntityId },
    OrbSpawned { id: EntityId, motion: OrbMotion },
    OrbCollected { id: EntityId, value: u32 },
    OrbExpired { id: EntityId },
    DifficultyIncreased { difficulty: u32 },
    NewBestScore { score: f64 },
    /// The session score is now the sentinel; `survived_secs` is the score
    /// it held before the breach.
    GameOver { survived_secs: f64 },
}

/// Transient message shown by the UI until cleared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub message: String,
    /// Tick at which the notice was raised.
    pub tick: u64,
}
