//! State shared between the driver and the game loop thread.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use greenline_core::commands::PlayerCommand;
use greenline_core::state::SessionSnapshot;

/// Commands sent from the input bridge to the game loop thread.
#[derive(Debug)]
pub enum GameLoopCommand {
    /// A player command to forward to the simulation engine.
    Player(PlayerCommand),
    /// Write the session to the active save slot and stop the loop.
    SaveAndQuit,
    /// Stop the loop without saving.
    Shutdown,
}

/// Handles the driver keeps while a game loop is running.
///
/// The sender sits behind a `Mutex` so the state can be shared by reference
/// between threads; the latest snapshot is shared with the loop thread.
pub struct AppState {
    /// `None` until a loop has been spawned.
    pub command_tx: Mutex<Option<mpsc::Sender<GameLoopCommand>>>,
    /// Updated by the game loop thread after each tick.
    pub latest_snapshot: Arc<Mutex<Option<SessionSnapshot>>>,
    pub running: Mutex<bool>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            command_tx: Mutex::new(None),
            latest_snapshot: Arc::new(Mutex::new(None)),
            running: Mutex::new(false),
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forward a command to the loop. Returns `false` if no loop is
    /// listening.
    pub fn send(&self, command: GameLoopCommand) -> bool {
        let Ok(guard) = self.command_tx.lock() else {
            return false;
        };
        match guard.as_ref() {
            Some(tx) => tx.send(command).is_ok(),
            None => false,
        }
    }

    /// Clone of the most recent snapshot, if any tick has run.
    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        self.latest_snapshot
            .lock()
            .ok()
            .and_then(|slot| slot.clone())
    }

    pub fn is_running(&self) -> bool {
        self.running.lock().map(|r| *r).unwrap_or(false)
    }

    pub fn set_running(&self, running: bool) {
        if let Ok(mut flag) = self.running.lock() {
            *flag = running;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_creation() {
        let state = AppState::new();
        assert!(state.command_tx.lock().unwrap().is_none());
        assert!(state.latest_snapshot.lock().unwrap().is_none());
        assert!(!state.is_running());
    }

    #[test]
    fn test_send_without_loop_is_refused() {
        let state = AppState::new();
        assert!(!state.send(GameLoopCommand::Shutdown));
    }

    #[test]
    fn test_send_reaches_receiver() {
        let state = AppState::new();
        let (tx, rx) = mpsc::channel();
        *state.command_tx.lock().unwrap() = Some(tx);

        assert!(state.send(GameLoopCommand::Player(PlayerCommand::Pause)));
        assert!(matches!(
            rx.try_recv().unwrap(),
            GameLoopCommand::Player(PlayerCommand::Pause)
        ));

        drop(rx);
        assert!(!state.send(GameLoopCommand::Shutdown));
    }
}
