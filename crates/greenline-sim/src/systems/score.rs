//! Score accumulation, the best-score notice and the game-over check.

use hecs::World;
use tracing::info;

use greenline_core::components::Attacker;
use greenline_core::config::Tuning;
use greenline_core::constants::*;
use greenline_core::enums::{AttackerState, SessionPhase};
use greenline_core::events::{Notice, SimEvent};
use greenline_core::tasks::DeferredAction;
use greenline_core::types::SimTime;

use crate::scheduler::Scheduler;
use crate::session::Session;

pub const NEW_BEST_SCORE_MESSAGE: &str = "New Best Score!";

/// Add one tick of survival time, announcing a new best score once.
pub fn run(
    session: &mut Session,
    scheduler: &mut Scheduler,
    tuning: &Tuning,
    time: SimTime,
    events: &mut Vec<SimEvent>,
) {
    session.score += tuning.dt();

    let Some(best) = session.best_score else {
        return;
    };
    if session.best_announced || session.score <= best {
        return;
    }
    session.best_announced = true;
    session.notice = Some(Notice {
        message: NEW_BEST_SCORE_MESSAGE.to_string(),
        tick: time.tick,
    });
    scheduler.schedule(
        time.tick,
        BEST_SCORE_NOTICE_SECS,
        tuning.fps,
        DeferredAction::ClearNotice,
    );
    info!(score = session.score, previous = best, "new best score");
    events.push(SimEvent::NewBestScore {
        score: session.score,
    });
}

/// End the session if any attacker has reached the left edge.
pub fn check_game_over(
    world: &World,
    session: &mut Session,
    events: &mut Vec<SimEvent>,
) -> bool {
    let breached = world
        .query::<&Attacker>()
        .iter()
        .any(|(_, a)| a.state != AttackerState::Dead && a.x <= 0.0);
    if !breached {
        return false;
    }

    let survived_secs = session.score;
    session.score = GAME_OVER_SCORE;
    session.phase = SessionPhase::Over;
    info!(survived_secs, "game over");
    events.push(SimEvent::GameOver { survived_secs });
    true
}
