//! Game loop thread: runs the simulation engine at the configured FPS.
//!
//! Commands arrive via an `mpsc` channel and are drained before every tick.
//! Snapshots are stored in a shared slot for polling. When the session ends
//! the loop records the final score and deletes the active save slot.

use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use greenline_core::events::SimEvent;
use greenline_core::state::SessionSnapshot;
use greenline_sim::SimulationEngine;

use crate::leaderboard::Leaderboard;
use crate::persistence;
use crate::state::GameLoopCommand;

/// Where the loop keeps its files.
#[derive(Debug, Clone)]
pub struct LoopSettings {
    pub save_dir: PathBuf,
    /// Slot written on save-and-quit and deleted on game over.
    pub slot: String,
}

/// Why the loop stopped.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopExit {
    Shutdown,
    Disconnected,
    Saved,
    GameOver { survived_secs: f64 },
}

/// Nominal duration of one tick.
pub fn tick_duration(fps: u32) -> Duration {
    Duration::from_nanos(1_000_000_000 / u64::from(fps.max(1)))
}

/// The engine plus the bookkeeping the loop does around it.
pub struct GameLoop {
    engine: SimulationEngine,
    settings: LoopSettings,
}

impl GameLoop {
    pub fn new(engine: SimulationEngine, settings: LoopSettings) -> Self {
        Self { engine, settings }
    }

    pub fn engine(&self) -> &SimulationEngine {
        &self.engine
    }

    /// Apply everything waiting on the channel.
    pub fn drain(&mut self, cmd_rx: &mpsc::Receiver<GameLoopCommand>) -> Option<LoopExit> {
        loop {
            match cmd_rx.try_recv() {
                Ok(command) => {
                    if let Some(exit) = self.handle(command) {
                        return Some(exit);
                    }
                }
                Err(mpsc::TryRecvError::Empty) => return None,
                Err(mpsc::TryRecvError::Disconnected) => return Some(LoopExit::Disconnected),
            }
        }
    }

    /// Apply one command. Player commands take effect at the next tick.
    ///
    /// A failed save is logged and the loop keeps running with the session
    /// untouched.
    pub fn handle(&mut self, command: GameLoopCommand) -> Option<LoopExit> {
        match command {
            GameLoopCommand::Player(cmd) => {
                self.engine.queue_command(cmd);
                None
            }
            GameLoopCommand::SaveAndQuit => {
                let saved = self.engine.save();
                match persistence::save_session(&self.settings.save_dir, &self.settings.slot, &saved)
                {
                    Ok(()) => Some(LoopExit::Saved),
                    Err(err) => {
                        warn!(slot = %self.settings.slot, %err, "save failed");
                        None
                    }
                }
            }
            GameLoopCommand::Shutdown => Some(LoopExit::Shutdown),
        }
    }

    /// Advance one tick.
    pub fn step(&mut self) -> (SessionSnapshot, Option<LoopExit>) {
        let snapshot = self.engine.tick();
        let survived = snapshot.events.iter().find_map(|event| match event {
            SimEvent::GameOver { survived_secs } => Some(*survived_secs),
            _ => None,
        });
        let exit = survived.map(|survived_secs| {
            self.finish(survived_secs);
            LoopExit::GameOver { survived_secs }
        });
        (snapshot, exit)
    }

    fn finish(&self, survived_secs: f64) {
        let dir = &self.settings.save_dir;
        let mut board = Leaderboard::load(dir).unwrap_or_else(|err| {
            warn!(%err, "leaderboard unreadable, starting fresh");
            Leaderboard::default()
        });
        if board.record(survived_secs) {
            if let Err(err) = board.save(dir) {
                warn!(%err, "leaderboard not saved");
            }
        }
        if let Err(err) = persistence::delete_save(dir, &self.settings.slot) {
            warn!(slot = %self.settings.slot, %err, "finished session's save not deleted");
        }
        info!(survived_secs, "game over");
    }
}

/// Spawn the game loop in a new thread.
///
/// Returns the command sender and a handle yielding the reason the loop
/// stopped.
pub fn spawn_game_loop(
    engine: SimulationEngine,
    settings: LoopSettings,
    latest_snapshot: Arc<Mutex<Option<SessionSnapshot>>>,
) -> io::Result<(mpsc::Sender<GameLoopCommand>, JoinHandle<LoopExit>)> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<GameLoopCommand>();
    let tick = tick_duration(engine.tuning().fps);
    let game = GameLoop::new(engine, settings);

    let handle = std::thread::Builder::new()
        .name("greenline-game-loop".into())
        .spawn(move || run_game_loop(game, cmd_rx, &latest_snapshot, tick))?;

    Ok((cmd_tx, handle))
}

/// Runs until a command, a disconnect or the end of the session stops it.
fn run_game_loop(
    mut game: GameLoop,
    cmd_rx: mpsc::Receiver<GameLoopCommand>,
    latest_snapshot: &Mutex<Option<SessionSnapshot>>,
    tick: Duration,
) -> LoopExit {
    let mut next_tick_time = Instant::now();

    loop {
        if let Some(exit) = game.drain(&cmd_rx) {
            info!(?exit, "game loop stopped");
            return exit;
        }

        let (snapshot, exit) = game.step();
        if let Ok(mut lock) = latest_snapshot.lock() {
            *lock = Some(snapshot);
        }
        if let Some(exit) = exit {
            return exit;
        }

        next_tick_time += tick;
        let now = Instant::now();
        if next_tick_time > now {
            std::thread::sleep(next_tick_time - now);
        } else if now - next_tick_time > tick * 2 {
            // Too far behind, skip ahead rather than run catch-up ticks.
            next_tick_time = now;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenline_core::commands::PlayerCommand;
    use greenline_core::components::Attacker;
    use greenline_core::config::{GameConfig, Tuning};
    use greenline_core::enums::*;
    use greenline_core::types::EntityId;
    use greenline_sim::SimConfig;
    use std::fs;

    fn tuning() -> Tuning {
        GameConfig::standard().validate().unwrap()
    }

    fn scratch(name: &str) -> LoopSettings {
        let save_dir = std::env::temp_dir().join(format!("greenline_test_loop_{name}"));
        let _ = fs::remove_dir_all(&save_dir);
        LoopSettings {
            save_dir,
            slot: "active".into(),
        }
    }

    fn started() -> SimulationEngine {
        let mut engine = SimulationEngine::new(tuning(), SimConfig::default());
        engine.start(Location::GrassLawn, 1);
        engine
    }

    /// A running engine with `score` seconds on the clock and an attacker
    /// one step from the defended edge.
    fn about_to_lose(score_ticks: usize) -> SimulationEngine {
        let mut engine = started();
        for _ in 0..score_ticks {
            engine.tick();
        }
        let mut saved = engine.save();
        let stats = *engine.tuning().attacker(AttackerKind::ZombieBoy);
        saved.attackers.push(Attacker {
            id: EntityId(saved.next_entity_id),
            kind: AttackerKind::ZombieBoy,
            row: 0,
            x: 0.3,
            column: Some(0),
            health: stats.health,
            max_health: stats.health,
            speed: stats.speed,
            damage: stats.damage,
            state: AttackerState::Alive,
            kill_requested: false,
        });
        saved.next_entity_id += 1;
        let mut engine = SimulationEngine::restore(tuning(), saved, SimConfig::default()).unwrap();
        engine.resume();
        engine
    }

    #[test]
    fn test_command_channel_round_trip() {
        let (tx, rx) = mpsc::channel::<GameLoopCommand>();

        tx.send(GameLoopCommand::Player(PlayerCommand::StartGame {
            location: Location::GrassLawn,
            difficulty: 1,
        }))
        .unwrap();
        tx.send(GameLoopCommand::Player(PlayerCommand::Pause))
            .unwrap();
        tx.send(GameLoopCommand::SaveAndQuit).unwrap();
        tx.send(GameLoopCommand::Shutdown).unwrap();

        let mut commands = Vec::new();
        while let Ok(cmd) = rx.try_recv() {
            commands.push(cmd);
        }

        assert_eq!(commands.len(), 4);
        assert!(matches!(
            commands[0],
            GameLoopCommand::Player(PlayerCommand::StartGame { .. })
        ));
        assert!(matches!(
            commands[1],
            GameLoopCommand::Player(PlayerCommand::Pause)
        ));
        assert!(matches!(commands[2], GameLoopCommand::SaveAndQuit));
        assert!(matches!(commands[3], GameLoopCommand::Shutdown));
    }

    #[test]
    fn test_tick_duration_constant() {
        // 60 Hz = 16.666ms per tick
        assert_eq!(tick_duration(60).as_nanos(), 1_000_000_000u128 / 60);
        assert_eq!(tick_duration(0), tick_duration(1));
    }

    #[test]
    fn test_pause_resume_via_commands() {
        let mut game = GameLoop::new(
            SimulationEngine::new(tuning(), SimConfig::default()),
            scratch("pause"),
        );

        game.handle(GameLoopCommand::Player(PlayerCommand::StartGame {
            location: Location::GrassLawn,
            difficulty: 1,
        }));
        let (snap, _) = game.step();
        assert_eq!(snap.phase, SessionPhase::Running);

        game.handle(GameLoopCommand::Player(PlayerCommand::Pause));
        let (snap, _) = game.step();
        assert_eq!(snap.phase, SessionPhase::Paused);
        let paused_tick = snap.time.tick;

        let (snap, _) = game.step();
        assert_eq!(snap.time.tick, paused_tick);

        game.handle(GameLoopCommand::Player(PlayerCommand::Resume));
        let (snap, _) = game.step();
        assert_eq!(snap.phase, SessionPhase::Running);
        assert!(snap.time.tick > paused_tick);
    }

    #[test]
    fn test_drain_stops_on_shutdown_and_disconnect() {
        let mut game = GameLoop::new(started(), scratch("drain"));
        let (tx, rx) = mpsc::channel();

        tx.send(GameLoopCommand::Player(PlayerCommand::Pause))
            .unwrap();
        assert_eq!(game.drain(&rx), None);

        tx.send(GameLoopCommand::Shutdown).unwrap();
        assert_eq!(game.drain(&rx), Some(LoopExit::Shutdown));

        drop(tx);
        assert_eq!(game.drain(&rx), Some(LoopExit::Disconnected));
    }

    #[test]
    fn test_save_and_quit_writes_active_slot() {
        let settings = scratch("save_quit");
        let mut game = GameLoop::new(started(), settings.clone());
        for _ in 0..120 {
            game.step();
        }

        assert_eq!(game.handle(GameLoopCommand::SaveAndQuit), Some(LoopExit::Saved));

        let loaded = persistence::load_session(&settings.save_dir, "active").unwrap();
        assert_eq!(loaded, game.engine().save());

        let _ = fs::remove_dir_all(&settings.save_dir);
    }

    #[test]
    fn test_failed_save_keeps_running() {
        let settings = scratch("save_fail");
        fs::create_dir_all(&settings.save_dir).unwrap();
        fs::create_dir_all(settings.save_dir.join("active.json.tmp")).unwrap();
        let mut game = GameLoop::new(started(), settings.clone());
        game.step();

        assert_eq!(game.handle(GameLoopCommand::SaveAndQuit), None);
        let (snap, exit) = game.step();
        assert_eq!(snap.phase, SessionPhase::Running);
        assert!(exit.is_none());

        let _ = fs::remove_dir_all(&settings.save_dir);
    }

    #[test]
    fn test_game_over_records_score_and_deletes_save() {
        let settings = scratch("game_over");
        let mut game = GameLoop::new(about_to_lose(120), settings.clone());
        persistence::save_session(&settings.save_dir, "active", &game.engine().save()).unwrap();

        let (snap, exit) = game.step();

        assert_eq!(snap.phase, SessionPhase::Over);
        let Some(LoopExit::GameOver { survived_secs }) = exit else {
            panic!("expected game over, got {exit:?}");
        };
        assert!((survived_secs - 2.0).abs() < 0.05);

        let board = Leaderboard::load(&settings.save_dir).unwrap();
        assert_eq!(board.scores(), &[survived_secs]);
        assert!(!persistence::save_path(&settings.save_dir, "active").exists());

        let _ = fs::remove_dir_all(&settings.save_dir);
    }

    #[test]
    fn test_thread_saves_and_stops() {
        let settings = scratch("thread");
        let latest = Arc::new(Mutex::new(None));
        let (tx, handle) = spawn_game_loop(started(), settings.clone(), latest.clone()).unwrap();

        std::thread::sleep(Duration::from_millis(100));
        tx.send(GameLoopCommand::SaveAndQuit).unwrap();
        assert_eq!(handle.join().unwrap(), LoopExit::Saved);

        let snapshot = latest.lock().unwrap().clone().unwrap();
        assert!(snapshot.time.tick > 0);
        let saved = persistence::load_session(&settings.save_dir, "active").unwrap();
        assert_eq!(saved.time, snapshot.time);

        let _ = fs::remove_dir_all(&settings.save_dir);
    }
}
