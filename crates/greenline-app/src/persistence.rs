//! Session save slots on disk.
//!
//! Each slot is a pretty-printed JSON file `<dir>/<slot>.json` holding a
//! `SavedSession`. Writes go to a temporary sibling and are renamed into
//! place, so a failed save never clobbers the previous file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use greenline_core::config::Tuning;
use greenline_core::state::SavedSession;
use greenline_sim::{SessionError, SimConfig, SimulationEngine};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("failed to parse {path}: {source}")]
    Deserialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Lightweight description of a save slot for listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveMetadata {
    pub slot: String,
    pub score: f64,
    pub difficulty: u32,
    pub tick: u64,
}

pub fn save_path(dir: &Path, slot: &str) -> PathBuf {
    dir.join(format!("{slot}.json"))
}

pub fn save_session(dir: &Path, slot: &str, session: &SavedSession) -> Result<(), PersistenceError> {
    write_json(&save_path(dir, slot), session)?;
    info!(slot, tick = session.time.tick, score = session.score, "session saved");
    Ok(())
}

pub fn load_session(dir: &Path, slot: &str) -> Result<SavedSession, PersistenceError> {
    read_json(&save_path(dir, slot))
}

/// Load a slot and rebuild a live engine from it. The engine comes back
/// paused.
pub fn resume_session(
    dir: &Path,
    slot: &str,
    tuning: Tuning,
    config: SimConfig,
) -> Result<SimulationEngine, PersistenceError> {
    let saved = load_session(dir, slot)?;
    SimulationEngine::restore(tuning, saved, config).map_err(|err| {
        warn!(slot, %err, "save slot rejected");
        PersistenceError::from(err)
    })
}

/// Every readable save slot in `dir`, highest score first. Files that do not
/// parse as a session are skipped.
pub fn list_saves(dir: &Path) -> Vec<SaveMetadata> {
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return Vec::new(),
    };

    let mut saves = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.extension().is_some_and(|ext| ext == "json") {
            continue;
        }
        let Some(slot) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if let Ok(saved) = read_json::<SavedSession>(&path) {
            saves.push(SaveMetadata {
                slot: slot.to_string(),
                score: saved.score,
                difficulty: saved.difficulty,
                tick: saved.time.tick,
            });
        }
    }
    saves.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.slot.cmp(&b.slot)));
    saves
}

/// Remove a slot. A missing slot is not an error.
pub fn delete_save(dir: &Path, slot: &str) -> Result<(), PersistenceError> {
    let path = save_path(dir, slot);
    match fs::remove_file(&path) {
        Ok(()) => {
            info!(slot, "save deleted");
            Ok(())
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(PersistenceError::Io { path, source }),
    }
}

/// Serialize `value` to `path` via a temporary file and rename.
pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), PersistenceError> {
    let json = serde_json::to_string_pretty(value).map_err(PersistenceError::Serialize)?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|source| PersistenceError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(|source| PersistenceError::Io {
        path: tmp.clone(),
        source,
    })?;
    fs::rename(&tmp, path).map_err(|source| {
        let _ = fs::remove_file(&tmp);
        PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        }
    })
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, PersistenceError> {
    let json = fs::read_to_string(path).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&json).map_err(|source| PersistenceError::Deserialize {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenline_core::config::GameConfig;
    use greenline_core::enums::{DefenderKind, Location, SessionPhase};

    fn tuning() -> Tuning {
        GameConfig::standard().validate().unwrap()
    }

    fn busy_session() -> SavedSession {
        let mut engine = SimulationEngine::new(tuning(), SimConfig { seed: 3 });
        engine.start(Location::SandBeach, 4);
        engine.place(2, 0, DefenderKind::Generator).unwrap();
        engine.place(2, 1, DefenderKind::Shooter1).unwrap();
        for _ in 0..900 {
            engine.tick();
        }
        engine.save()
    }

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("greenline_test_persist_{name}"));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = scratch("save_load");
        let saved = busy_session();

        save_session(&dir, "slot1", &saved).unwrap();
        let loaded = load_session(&dir, "slot1").unwrap();
        assert_eq!(loaded, saved);
        assert!(!dir.join("slot1.json.tmp").exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_resume_rebuilds_paused_engine() {
        let dir = scratch("resume");
        let saved = busy_session();
        save_session(&dir, "slot1", &saved).unwrap();

        let engine = resume_session(&dir, "slot1", tuning(), SimConfig::default()).unwrap();
        assert_eq!(engine.phase(), SessionPhase::Paused);
        assert_eq!(engine.location(), Location::SandBeach);
        assert_eq!(engine.score(), saved.score);
        assert!(engine.grid().defender_at(2, 1).is_some());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_resume_rejects_corrupt_session() {
        let dir = scratch("corrupt");
        let mut saved = busy_session();
        let mut copy = saved.defenders[0].clone();
        copy.id = greenline_core::types::EntityId(saved.next_entity_id + 10);
        saved.defenders.push(copy);
        save_session(&dir, "bad", &saved).unwrap();

        let err = resume_session(&dir, "bad", tuning(), SimConfig::default()).err().unwrap();
        assert!(matches!(err, PersistenceError::Session(_)));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_garbage_is_deserialize_error() {
        let dir = scratch("garbage");
        fs::create_dir_all(&dir).unwrap();
        fs::write(save_path(&dir, "junk"), "not json").unwrap();

        let err = load_session(&dir, "junk").unwrap_err();
        assert!(matches!(err, PersistenceError::Deserialize { .. }));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_failed_save_keeps_previous_file() {
        let dir = scratch("failed_save");
        let saved = busy_session();
        save_session(&dir, "slot1", &saved).unwrap();

        // A directory squatting on the temp path makes the write fail.
        fs::create_dir_all(dir.join("slot1.json.tmp")).unwrap();
        let mut newer = saved.clone();
        newer.score += 100.0;
        assert!(save_session(&dir, "slot1", &newer).is_err());

        assert_eq!(load_session(&dir, "slot1").unwrap(), saved);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_list_saves_empty() {
        let dir = scratch("list_empty");
        assert!(list_saves(&dir).is_empty());
    }

    #[test]
    fn test_list_saves_skips_foreign_files() {
        let dir = scratch("list_multi");
        let mut low = busy_session();
        low.score = 5.0;
        let mut high = low.clone();
        high.score = 50.0;
        save_session(&dir, "low", &low).unwrap();
        save_session(&dir, "high", &high).unwrap();
        fs::write(dir.join("leaderboard.json"), "{\"scores\":[]}").unwrap();
        fs::write(dir.join("notes.txt"), "hello").unwrap();

        let saves = list_saves(&dir);
        assert_eq!(saves.len(), 2);
        assert_eq!(saves[0].slot, "high");
        assert_eq!(saves[1].slot, "low");
        assert_eq!(saves[1].tick, low.time.tick);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_delete_save_removes_file() {
        let dir = scratch("delete");
        save_session(&dir, "todelete", &busy_session()).unwrap();
        assert!(save_path(&dir, "todelete").exists());

        delete_save(&dir, "todelete").unwrap();
        assert!(!save_path(&dir, "todelete").exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_delete_nonexistent_save_ok() {
        let dir = scratch("delete_noop");
        delete_save(&dir, "nope").unwrap();
    }
}
