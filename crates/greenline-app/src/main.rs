//! greenline: headless Greenline driver.
//!
//! Usage:
//!   greenline run --seconds 120 --autoplay
//!   greenline run --resume autosave --save-dir saves
//!   greenline saves --save-dir saves
//!   greenline check-config config/gameconfig.json

use std::path::{Path, PathBuf};
use std::process;
use std::time::{Duration, Instant};

use greenline_app::autopilot;
use greenline_app::config_loader;
use greenline_app::game_loop::{spawn_game_loop, LoopExit, LoopSettings};
use greenline_app::leaderboard::Leaderboard;
use greenline_app::logging::init_runtime;
use greenline_app::persistence;
use greenline_app::state::{AppState, GameLoopCommand};
use greenline_core::config::Tuning;
use greenline_core::enums::{Location, SessionPhase};
use greenline_sim::{SimConfig, SimulationEngine};

const DEFAULT_SLOT: &str = "autosave";
const DEFAULT_SAVE_DIR: &str = "saves";
const POLL_INTERVAL: Duration = Duration::from_millis(100);

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    init_runtime();

    match args[1].as_str() {
        "run" => cmd_run(&args[2..]),
        "saves" => cmd_saves(&args[2..]),
        "check-config" => cmd_check_config(&args[2..]),
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!(
        "greenline: headless lane defense simulation\n\
         \n\
         Commands:\n\
         \n\
         run           Play a session in real time\n\
         \n\
           --config <path>      Configuration file (default: search Config/, config/)\n\
           --seed <N>           RNG seed (default: 42)\n\
           --seconds <S>        Wall-clock seconds to run (default: 60)\n\
           --save-dir <dir>     Save slots and leaderboard (default: saves)\n\
           --location <name>    grass | sand (default: grass)\n\
           --difficulty <N>     Starting difficulty, clamped to the configured range\n\
           --resume <slot>      Continue a saved session instead of starting one\n\
           --autoplay           Collect orbs and build a defensive line\n\
         \n\
         saves         List save slots and the leaderboard\n\
         \n\
           --save-dir <dir>     Directory to inspect (default: saves)\n\
         \n\
         check-config  Validate a configuration file\n\
         \n\
           greenline check-config config/gameconfig.json\n"
    );
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    for i in 0..args.len() {
        if args[i] == flag && i + 1 < args.len() {
            return Some(&args[i + 1]);
        }
    }
    None
}

fn parse_or<T: std::str::FromStr>(args: &[String], flag: &str, default: T) -> T {
    match flag_value(args, flag) {
        Some(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                eprintln!("Error: invalid value for {flag}: {raw}");
                process::exit(1);
            }
        },
        None => default,
    }
}

/// When a run of `seconds` starting at `now` ends. `None` for negative, NaN,
/// infinite or overflowing input.
fn run_deadline(now: Instant, seconds: f64) -> Option<Instant> {
    let run_for = Duration::try_from_secs_f64(seconds).ok()?;
    now.checked_add(run_for)
}

fn parse_location(args: &[String]) -> Location {
    match flag_value(args, "--location") {
        None | Some("grass") => Location::GrassLawn,
        Some("sand") => Location::SandBeach,
        Some(other) => {
            eprintln!("Error: unknown location {other} (expected grass or sand)");
            process::exit(1);
        }
    }
}

fn save_dir(args: &[String]) -> PathBuf {
    PathBuf::from(flag_value(args, "--save-dir").unwrap_or(DEFAULT_SAVE_DIR))
}

fn load_tuning(args: &[String]) -> Tuning {
    let explicit = flag_value(args, "--config").map(PathBuf::from);
    match config_loader::load_tuning(explicit.as_deref(), Path::new(".")) {
        Ok(tuning) => tuning,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            process::exit(1);
        }
    }
}

// --- Run command ---

fn cmd_run(args: &[String]) {
    let tuning = load_tuning(args);
    let dir = save_dir(args);
    let config = SimConfig {
        seed: parse_or(args, "--seed", 42u64),
    };
    let seconds: f64 = parse_or(args, "--seconds", 60.0);
    let Some(deadline) = run_deadline(Instant::now(), seconds) else {
        eprintln!("Error: --seconds must be a finite, non-negative number: {seconds}");
        process::exit(1);
    };
    let autoplay = args.iter().any(|a| a == "--autoplay");

    let board = Leaderboard::load(&dir).unwrap_or_else(|e| {
        eprintln!("Warning: ignoring unreadable leaderboard: {e}");
        Leaderboard::default()
    });

    let (mut engine, slot) = match flag_value(args, "--resume") {
        Some(slot) => match persistence::resume_session(&dir, slot, tuning.clone(), config) {
            Ok(engine) => (engine, slot.to_string()),
            Err(e) => {
                eprintln!("Error resuming {slot}: {e}");
                process::exit(1);
            }
        },
        None => {
            let mut engine = SimulationEngine::new(tuning.clone(), config);
            let difficulty = parse_or(args, "--difficulty", tuning.initial_difficulty);
            engine.start(parse_location(args), difficulty);
            (engine, DEFAULT_SLOT.to_string())
        }
    };
    engine.set_best_score(board.best());
    if engine.phase() == SessionPhase::Paused {
        engine.resume();
    }

    let state = AppState::new();
    let settings = LoopSettings {
        save_dir: dir.clone(),
        slot: slot.clone(),
    };
    let (tx, handle) = match spawn_game_loop(engine, settings, state.latest_snapshot.clone()) {
        Ok(spawned) => spawned,
        Err(e) => {
            eprintln!("Error starting game loop: {e}");
            process::exit(1);
        }
    };
    if let Ok(mut slot_tx) = state.command_tx.lock() {
        *slot_tx = Some(tx);
    }
    state.set_running(true);

    while Instant::now() < deadline && !handle.is_finished() {
        std::thread::sleep(POLL_INTERVAL);
        if !autoplay {
            continue;
        }
        if let Some(snapshot) = state.snapshot() {
            for command in autopilot::plan(&snapshot, &tuning) {
                state.send(GameLoopCommand::Player(command));
            }
        }
    }

    // If the save fails the loop keeps running, so follow up with a shutdown.
    state.send(GameLoopCommand::SaveAndQuit);
    state.send(GameLoopCommand::Shutdown);
    let exit = match handle.join() {
        Ok(exit) => exit,
        Err(_) => {
            eprintln!("Error: game loop panicked");
            process::exit(1);
        }
    };
    state.set_running(false);

    print_summary(&state, &exit, &slot, &dir);
}

fn print_summary(state: &AppState, exit: &LoopExit, slot: &str, dir: &Path) {
    if let Some(snapshot) = state.snapshot() {
        println!(
            "tick {} ({:.1}s)  difficulty {}  sun {}",
            snapshot.time.tick, snapshot.time.elapsed_secs, snapshot.difficulty, snapshot.sun_balance
        );
        println!(
            "defenders {}  attackers {}  projectiles {}  orbs {}",
            snapshot.defenders.len(),
            snapshot.attackers.len(),
            snapshot.projectiles.len(),
            snapshot.orbs.len()
        );
    }
    match exit {
        LoopExit::GameOver { survived_secs } => println!("Game over after {survived_secs:.1}s"),
        LoopExit::Saved => println!("Saved to slot {slot}"),
        LoopExit::Shutdown | LoopExit::Disconnected => println!("Stopped without saving"),
    }
    if let Ok(board) = Leaderboard::load(dir) {
        print_leaderboard(&board);
    }
}

fn print_leaderboard(board: &Leaderboard) {
    if board.scores().is_empty() {
        println!("Leaderboard: empty");
        return;
    }
    println!("Leaderboard:");
    for (rank, score) in board.scores().iter().enumerate() {
        println!("  {}. {score:.1}s", rank + 1);
    }
}

// --- Saves command ---

fn cmd_saves(args: &[String]) {
    let dir = save_dir(args);
    let saves = persistence::list_saves(&dir);
    if saves.is_empty() {
        println!("No saves in {}", dir.display());
    }
    for save in &saves {
        println!(
            "{:<16} score {:>8.1}  difficulty {:>2}  tick {}",
            save.slot, save.score, save.difficulty, save.tick
        );
    }
    match Leaderboard::load(&dir) {
        Ok(board) => print_leaderboard(&board),
        Err(e) => eprintln!("Warning: unreadable leaderboard: {e}"),
    }
}

// --- Check-config command ---

fn cmd_check_config(args: &[String]) {
    let Some(path) = args.first() else {
        eprintln!("Error: check-config <path> is required");
        process::exit(1);
    };
    match config_loader::load_from_path(Path::new(path)) {
        Ok(tuning) => println!(
            "OK: {}x{} field, {} FPS, difficulty {}..{}",
            tuning.field.rows,
            tuning.field.columns,
            tuning.fps,
            tuning.initial_difficulty,
            tuning.max_difficulty
        ),
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_deadline_accepts_finite_seconds() {
        let now = Instant::now();
        assert_eq!(run_deadline(now, 0.0), Some(now));
        assert_eq!(run_deadline(now, 1.5), Some(now + Duration::from_millis(1500)));
    }

    #[test]
    fn test_run_deadline_rejects_unusable_seconds() {
        let now = Instant::now();
        let inf: f64 = "inf".parse().unwrap();
        assert_eq!(run_deadline(now, inf), None);
        assert_eq!(run_deadline(now, f64::NAN), None);
        assert_eq!(run_deadline(now, -1.0), None);
        assert_eq!(run_deadline(now, 1.0e300), None);
    }

    #[test]
    fn test_flag_value_reads_following_argument() {
        let args: Vec<String> = ["--seed", "7", "--autoplay"].iter().map(|s| s.to_string()).collect();
        assert_eq!(flag_value(&args, "--seed"), Some("7"));
        assert_eq!(flag_value(&args, "--autoplay"), None);
        assert_eq!(flag_value(&args, "--config"), None);
    }
}
