//! Simulation engine: the core of the game.
//!
//! `SimulationEngine` owns the hecs world, processes player commands, runs
//! all systems and produces `SessionSnapshot`s. It is completely headless,
//! which keeps it deterministic under a seed and easy to test.

use std::collections::VecDeque;

use hecs::{Component, Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use greenline_core::commands::PlayerCommand;
use greenline_core::components::*;
use greenline_core::config::Tuning;
use greenline_core::constants::SAVE_FORMAT_VERSION;
use greenline_core::enums::*;
use greenline_core::error::PlacementError;
use greenline_core::events::SimEvent;
use greenline_core::state::{SavedSession, SessionSnapshot};
use greenline_core::tasks::DeferredAction;
use greenline_core::types::{Cell, EntityId, SimTime};

use crate::error::SessionError;
use crate::grid::FieldGrid;
use crate::index::EntityIndex;
use crate::scheduler::Scheduler;
use crate::session::{clamp_difficulty, Session};
use crate::systems;
use crate::world_setup;

/// Configuration for starting a new simulation.
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self { seed: 42 }
    }
}

/// The simulation engine. Owns the ECS world and all session state.
pub struct SimulationEngine {
    world: World,
    grid: FieldGrid,
    index: EntityIndex,
    tuning: Tuning,
    session: Session,
    time: SimTime,
    rng: ChaCha8Rng,
    scheduler: Scheduler,
    command_queue: VecDeque<PlayerCommand>,
    despawn_buffer: Vec<(EntityId, Entity)>,
    events: Vec<SimEvent>,
}

impl SimulationEngine {
    /// Create an engine holding an empty session in `Created`.
    pub fn new(tuning: Tuning, config: SimConfig) -> Self {
        Self {
            world: World::new(),
            grid: FieldGrid::new(tuning.field.rows, tuning.field.columns),
            index: EntityIndex::default(),
            session: Session::new(&tuning),
            tuning,
            time: SimTime::default(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            scheduler: Scheduler::default(),
            command_queue: VecDeque::new(),
            despawn_buffer: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Begin the session. Only a `Created` session can start; the requested
    /// difficulty is clamped to the configured range.
    pub fn start(&mut self, location: Location, difficulty: u32) {
        if self.session.phase != SessionPhase::Created {
            debug!(phase = ?self.session.phase, "start ignored");
            return;
        }
        self.session.location = location;
        self.session.difficulty = clamp_difficulty(difficulty, &self.tuning);
        self.session.phase = SessionPhase::Running;
        self.time = SimTime::default();
        info!(
            ?location,
            difficulty = self.session.difficulty,
            balance = self.session.sun_balance,
            "session started"
        );
    }

    /// Seed the best score on record, enabling the new-best notice.
    pub fn set_best_score(&mut self, best: Option<f64>) {
        self.session.best_score = best;
        self.session.best_announced = best.is_some_and(|b| self.session.score > b);
    }

    /// Queue a player command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = PlayerCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the simulation by one tick and return the resulting snapshot.
    ///
    /// Only a running session advances. Paused and finished sessions return
    /// an unchanged snapshot carrying any events buffered since the last tick.
    pub fn tick(&mut self) -> SessionSnapshot {
        self.process_commands();

        if self.session.is_running() {
            self.run_systems();
            self.time.advance(self.tuning.fps);
        }

        let events = std::mem::take(&mut self.events);
        systems::snapshot::build_snapshot(
            &self.world,
            &self.session,
            &self.tuning,
            &self.time,
            events,
        )
    }

    /// Current state without advancing or draining events.
    pub fn snapshot(&self) -> SessionSnapshot {
        systems::snapshot::build_snapshot(
            &self.world,
            &self.session,
            &self.tuning,
            &self.time,
            Vec::new(),
        )
    }

    // ---- Placement & economy ----

    pub fn can_afford(&self, kind: DefenderKind) -> bool {
        self.session.can_afford(self.tuning.cost(kind))
    }

    /// True exactly when `place` would succeed right now.
    pub fn can_place(&self, row: usize, column: usize, kind: DefenderKind) -> bool {
        self.check_placement(row, column, kind).is_ok()
    }

    /// Why a placement would be rejected, if it would.
    pub fn check_placement(
        &self,
        row: usize,
        column: usize,
        kind: DefenderKind,
    ) -> Result<(), PlacementError> {
        if !self.session.is_running() {
            return Err(PlacementError::NotRunning);
        }
        self.grid.check_free(row, column)?;
        let cost = self.tuning.cost(kind);
        if !self.session.can_afford(cost) {
            return Err(PlacementError::InsufficientSun {
                cost,
                balance: self.session.sun_balance,
            });
        }
        Ok(())
    }

    /// Buy and place a defender. The debit and the creation happen together
    /// or not at all.
    pub fn place(
        &mut self,
        row: usize,
        column: usize,
        kind: DefenderKind,
    ) -> Result<EntityId, PlacementError> {
        self.check_placement(row, column, kind)?;

        let stats = *self.tuning.defender(kind);
        if !self.session.try_debit(stats.cost) {
            return Err(PlacementError::InsufficientSun {
                cost: stats.cost,
                balance: self.session.sun_balance,
            });
        }

        let id = self.index.allocate();
        let now = self.time.elapsed_secs;
        let placed = self.grid.place(row, column, || {
            world_setup::spawn_defender(
                &mut self.world,
                &mut self.index,
                id,
                &stats,
                row,
                column,
                now,
            )
        });
        if let Err(err) = placed {
            self.session.credit(stats.cost);
            return Err(err);
        }

        debug!(%id, ?kind, row, column, balance = self.session.sun_balance, "defender placed");
        self.events.push(SimEvent::DefenderPlaced {
            id,
            kind,
            cell: Cell::new(row, column),
        });
        Ok(id)
    }

    /// Collect an orb and credit its value. Picking up an orb that is gone
    /// (already collected or expired) is a no-op returning `false`.
    pub fn pickup(&mut self, orb: EntityId) -> bool {
        if !self.session.is_running() {
            return false;
        }
        let Some(entity) = self.index.get(orb) else {
            return false;
        };
        let value = match self.world.get::<&ResourceOrb>(entity) {
            Ok(found) => found.value,
            Err(_) => return false,
        };

        self.index.remove(orb);
        let _ = self.world.despawn(entity);
        self.session.credit(value);
        debug!(%orb, value, balance = self.session.sun_balance, "sun collected");
        self.events.push(SimEvent::OrbCollected { id: orb, value });
        true
    }

    // ---- Lifecycle ----

    /// Suspend ticking. Returns `false` unless the session was running.
    pub fn pause(&mut self) -> bool {
        if self.session.phase != SessionPhase::Running {
            return false;
        }
        self.session.phase = SessionPhase::Paused;
        info!(tick = self.time.tick, "session paused");
        true
    }

    /// Continue a paused session from exactly where it stopped.
    pub fn resume(&mut self) -> bool {
        if self.session.phase != SessionPhase::Paused {
            return false;
        }
        self.session.phase = SessionPhase::Running;
        info!(tick = self.time.tick, "session resumed");
        true
    }

    /// Flatten the session into its persisted form.
    pub fn save(&self) -> SavedSession {
        SavedSession {
            version: SAVE_FORMAT_VERSION,
            location: self.session.location,
            difficulty: self.session.difficulty,
            score: self.session.score,
            sun_balance: self.session.sun_balance,
            time: self.time,
            bookmarks: self.session.bookmarks.clone(),
            next_entity_id: self.index.next_id(),
            best_score: self.session.best_score,
            defenders: collect_sorted(&self.world, |d: &Defender| d.id),
            attackers: collect_sorted(&self.world, |a: &Attacker| a.id),
            projectiles: collect_sorted(&self.world, |p: &Projectile| p.id),
            orbs: collect_sorted(&self.world, |o: &ResourceOrb| o.id),
            pending: self.scheduler.pending(),
            notice: self.session.notice.clone(),
        }
    }

    /// Rebuild a live engine from a persisted session.
    ///
    /// The world, field grid, id index and scheduler are reconstructed from
    /// the flat lists. The session resumes `Paused`. A session whose
    /// defenders overlap or leave the field, or whose ids collide, is
    /// rejected and no engine is created.
    pub fn restore(
        tuning: Tuning,
        saved: SavedSession,
        config: SimConfig,
    ) -> Result<Self, SessionError> {
        if saved.version != SAVE_FORMAT_VERSION {
            return Err(corrupt(format!(
                "unsupported version {} (expected {SAVE_FORMAT_VERSION})",
                saved.version
            )));
        }
        if saved.score < 0.0 {
            return Err(corrupt("session is already over"));
        }

        let mut engine = Self::new(tuning, config);
        let rows = engine.grid.rows();

        let highest_id = saved
            .defenders
            .iter()
            .map(|d| d.id)
            .chain(saved.attackers.iter().map(|a| a.id))
            .chain(saved.projectiles.iter().map(|p| p.id))
            .chain(saved.orbs.iter().map(|o| o.id))
            .max()
            .map_or(0, |id| id.0);
        engine.index = EntityIndex::starting_at(saved.next_entity_id.max(highest_id + 1));

        for defender in saved.defenders {
            let (id, row, column) = (defender.id, defender.row, defender.column);
            engine
                .grid
                .check_free(row, column)
                .map_err(|err| corrupt(format!("defender {id}: {err}")))?;
            let entity = world_setup::restore(&mut engine.world, &mut engine.index, id, defender)
                .ok_or_else(|| duplicate(id))?;
            engine
                .grid
                .place(row, column, || entity)
                .map_err(|err| corrupt(format!("defender {id}: {err}")))?;
        }
        for attacker in saved.attackers {
            let id = attacker.id;
            if attacker.row >= rows {
                return Err(corrupt(format!("attacker {id} in row {}", attacker.row)));
            }
            world_setup::restore(&mut engine.world, &mut engine.index, id, attacker)
                .ok_or_else(|| duplicate(id))?;
        }
        for projectile in saved.projectiles {
            let id = projectile.id;
            if projectile.row >= rows {
                return Err(corrupt(format!("projectile {id} in row {}", projectile.row)));
            }
            world_setup::restore(&mut engine.world, &mut engine.index, id, projectile)
                .ok_or_else(|| duplicate(id))?;
        }
        for orb in saved.orbs {
            let id = orb.id;
            world_setup::restore(&mut engine.world, &mut engine.index, id, orb)
                .ok_or_else(|| duplicate(id))?;
        }

        engine.scheduler = Scheduler::from_pending(saved.pending);
        engine.time = saved.time;
        engine.session = Session {
            phase: SessionPhase::Paused,
            location: saved.location,
            score: saved.score,
            difficulty: clamp_difficulty(saved.difficulty, &engine.tuning),
            sun_balance: saved.sun_balance,
            bookmarks: saved.bookmarks,
            best_score: saved.best_score,
            best_announced: saved.best_score.is_some_and(|b| saved.score > b),
            notice: saved.notice,
        };

        info!(
            tick = engine.time.tick,
            entities = engine.index.len(),
            pending = engine.scheduler.len(),
            "session restored"
        );
        Ok(engine)
    }

    // ---- Accessors ----

    pub fn phase(&self) -> SessionPhase {
        self.session.phase
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn score(&self) -> f64 {
        self.session.score
    }

    pub fn difficulty(&self) -> u32 {
        self.session.difficulty
    }

    pub fn sun_balance(&self) -> u32 {
        self.session.sun_balance
    }

    pub fn location(&self) -> Location {
        self.session.location
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn grid(&self) -> &FieldGrid {
        &self.grid
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Number of deferred tasks not yet run.
    pub fn pending_tasks(&self) -> usize {
        self.scheduler.len()
    }

    pub fn defender(&self, id: EntityId) -> Option<Defender> {
        self.component(id)
    }

    pub fn attacker(&self, id: EntityId) -> Option<Attacker> {
        self.component(id)
    }

    pub fn projectile(&self, id: EntityId) -> Option<Projectile> {
        self.component(id)
    }

    pub fn orb(&self, id: EntityId) -> Option<ResourceOrb> {
        self.component(id)
    }

    fn component<C: Component + Clone>(&self, id: EntityId) -> Option<C> {
        let entity = self.index.get(id)?;
        self.world.get::<&C>(entity).ok().map(|c| (*c).clone())
    }

    /// Spawn an attacker at an explicit position (for tests).
    #[cfg(test)]
    pub fn spawn_test_attacker(&mut self, row: usize, kind: AttackerKind, x: f64) -> EntityId {
        world_setup::spawn_attacker_at(
            &mut self.world,
            &mut self.index,
            self.tuning.attacker(kind),
            row,
            x,
            &self.tuning.field,
        )
    }

    /// Spawn a projectile from an arbitrary cell (for tests).
    #[cfg(test)]
    pub fn spawn_test_projectile(
        &mut self,
        row: usize,
        column: usize,
        source: DefenderKind,
    ) -> EntityId {
        world_setup::spawn_projectile(
            &mut self.world,
            &mut self.index,
            source,
            row,
            column,
            self.tuning.field.cell_size,
        )
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    /// Handle a single player command.
    fn handle_command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::StartGame {
                location,
                difficulty,
            } => self.start(location, difficulty),
            PlayerCommand::PlaceDefender { row, column, kind } => {
                if let Err(err) = self.place(row, column, kind) {
                    debug!(%err, row, column, ?kind, "placement rejected");
                }
            }
            PlayerCommand::PickupOrb { orb } => {
                if !self.pickup(orb) {
                    debug!(%orb, "pickup ignored");
                }
            }
            PlayerCommand::Pause => {
                self.pause();
            }
            PlayerCommand::Resume => {
                self.resume();
            }
        }
    }

    /// Run all systems in order. Each phase sees the previous one's changes.
    fn run_systems(&mut self) {
        let now = self.time.elapsed_secs;

        // 0. Deferred tasks due this tick
        self.run_due_tasks();
        self.cleanup();
        // 1. Difficulty progression
        systems::difficulty::run(&mut self.session, &self.tuning, now, &mut self.events);
        // 2. Attacker spawn
        systems::spawner::run(
            &mut self.world,
            &mut self.index,
            &mut self.rng,
            &mut self.session,
            &self.tuning,
            now,
            &mut self.events,
        );
        // 3. Attackers eat or walk
        systems::attackers::run(&mut self.world, &mut self.grid, &self.tuning, &mut self.events);
        self.cleanup();
        // 4. Defenders shoot or generate
        systems::defenders::run(
            &mut self.world,
            &mut self.index,
            &mut self.rng,
            &mut self.scheduler,
            &self.tuning,
            self.time,
            &mut self.events,
        );
        // 5. Projectile flight and contact
        systems::projectiles::run(
            &mut self.world,
            &mut self.scheduler,
            &self.tuning,
            self.time,
            &mut self.events,
        );
        self.cleanup();
        // 6. Sun economy
        systems::economy::run(
            &mut self.world,
            &mut self.index,
            &mut self.rng,
            &mut self.session,
            &self.tuning,
            now,
            &mut self.events,
        );
        // 7. Score
        systems::score::run(
            &mut self.session,
            &mut self.scheduler,
            &self.tuning,
            self.time,
            &mut self.events,
        );
        // 8. Game over
        systems::score::check_game_over(&self.world, &mut self.session, &mut self.events);
    }

    /// Run every deferred task due at the current tick.
    fn run_due_tasks(&mut self) {
        while let Some(task) = self.scheduler.pop_due(self.time.tick) {
            match task.action {
                DeferredAction::FollowUpShot { defender } => {
                    systems::defenders::follow_up_shot(
                        &mut self.world,
                        &mut self.index,
                        &self.tuning,
                        defender,
                        &mut self.events,
                    );
                }
                DeferredAction::RemoveAttacker { attacker } => {
                    if let Some(entity) = self.index.get(attacker) {
                        systems::attackers::finish_dying(&mut self.world, entity, &mut self.events);
                    }
                }
                DeferredAction::ClearNotice => {
                    self.session.notice = None;
                }
            }
        }
    }

    fn cleanup(&mut self) {
        systems::cleanup::run(
            &mut self.world,
            &mut self.index,
            &mut self.grid,
            &mut self.despawn_buffer,
        );
    }
}

/// Clone every `C` in the world, ordered by id.
fn collect_sorted<C: Component + Clone>(world: &World, id: impl Fn(&C) -> EntityId) -> Vec<C> {
    let mut items: Vec<C> = world.query::<&C>().iter().map(|(_, c)| c.clone()).collect();
    items.sort_by_key(|c| id(c));
    items
}

fn corrupt(message: impl Into<String>) -> SessionError {
    let message = message.into();
    warn!(%message, "rejecting saved session");
    SessionError::Corrupt(message)
}

fn duplicate(id: EntityId) -> SessionError {
    corrupt(format!("duplicate entity id {id}"))
}
