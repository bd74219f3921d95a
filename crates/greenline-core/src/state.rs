//! Session state forms: the per-tick snapshot sent to the render bridge, and
//! the flat persisted session.

use std::collections::BTreeMap;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::components::{Attacker, Defender, Projectile, ResourceOrb};
use crate::enums::*;
use crate::events::{Notice, SimEvent};
use crate::tasks::ScheduledTask;
use crate::types::{EntityId, SimTime};

/// Timestamps (simulated seconds) of the last occurrence of each periodic event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bookmarks {
    pub last_zombie_spawn: f64,
    pub last_sun_fall: f64,
    pub last_difficulty_increase: f64,
    /// Last spawn time per row; a row absent from the map has never spawned.
    #[serde(default)]
    pub last_zombie_spawn_by_row: BTreeMap<usize, f64>,
}

/// Complete session state broadcast to the render bridge after each tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub time: SimTime,
    pub phase: SessionPhase,
    pub location: Location,
    pub score: f64,
    pub difficulty: u32,
    pub sun_balance: u32,
    pub defenders: Vec<DefenderView>,
    pub attackers: Vec<AttackerView>,
    pub projectiles: Vec<ProjectileView>,
    pub orbs: Vec<OrbView>,
    pub notice: Option<Notice>,
    pub events: Vec<SimEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefenderView {
    pub id: EntityId,
    pub kind: DefenderKind,
    pub row: usize,
    pub column: usize,
    pub health: f64,
    pub max_health: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackerView {
    pub id: EntityId,
    pub kind: AttackerKind,
    pub row: usize,
    pub x: f64,
    pub y: f64,
    pub health: f64,
    pub max_health: f64,
    pub state: AttackerState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileView {
    pub id: EntityId,
    pub source: DefenderKind,
    pub row: usize,
    pub x: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrbView {
    pub id: EntityId,
    pub position: DVec2,
    pub target: DVec2,
    pub motion: OrbMotion,
    /// Seconds until the orb expires unpicked.
    pub remaining_secs: f64,
}

/// Flat, lossless persisted form of a session.
///
/// Live indices (field grid, id lookup, scheduler heap) are not stored; they
/// are rebuilt from these lists on restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSession {
    pub version: u32,
    pub location: Location,
    pub difficulty: u32,
    pub score: f64,
    pub sun_balance: u32,
    pub time: SimTime,
    pub bookmarks: Bookmarks,
    pub next_entity_id: u64,
    #[serde(default)]
    pub best_score: Option<f64>,
    pub defenders: Vec<Defender>,
    pub attackers: Vec<Attacker>,
    pub projectiles: Vec<Projectile>,
    pub orbs: Vec<ResourceOrb>,
    #[serde(default)]
    pub pending: Vec<ScheduledTask>,
    #[serde(default)]
    pub notice: Option<Notice>,
}
