//! Locating and loading the game configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use greenline_core::config::{GameConfig, Tuning};
use greenline_core::error::ConfigError;

/// Locations searched, relative to the working directory, when no explicit
/// path is given.
pub const CONFIG_CANDIDATES: [&str; 2] = ["Config/gameconfig.json", "config/gameconfig.json"];

/// Load and validate the configuration.
///
/// An explicit path is used as-is. Otherwise the candidates are tried under
/// `base` in order and the first existing file wins.
pub fn load_tuning(explicit: Option<&Path>, base: &Path) -> Result<Tuning, ConfigError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => locate(base)?,
    };
    load_from_path(&path)
}

/// First candidate that exists under `base`.
pub fn locate(base: &Path) -> Result<PathBuf, ConfigError> {
    let tried: Vec<PathBuf> = CONFIG_CANDIDATES.iter().map(|c| base.join(c)).collect();
    match tried.iter().find(|p| p.is_file()) {
        Some(found) => Ok(found.clone()),
        None => Err(ConfigError::NotFound { tried }),
    }
}

pub fn load_from_path(path: &Path) -> Result<Tuning, ConfigError> {
    let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let tuning = GameConfig::tuning_from_json_str(&json)?;
    info!(path = %path.display(), fps = tuning.fps, "configuration loaded");
    Ok(tuning)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("greenline_test_config_{name}"));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn write_standard(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let json = serde_json::to_string_pretty(&GameConfig::standard()).unwrap();
        fs::write(path, json).unwrap();
    }

    #[test]
    fn test_explicit_path_is_loaded() {
        let dir = scratch("explicit");
        let path = dir.join("custom.json");
        write_standard(&path);

        let tuning = load_tuning(Some(&path), Path::new("/nonexistent")).unwrap();
        assert_eq!(tuning, GameConfig::standard().validate().unwrap());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_candidates_searched_in_order() {
        let dir = scratch("candidates");
        write_standard(&dir.join("config/gameconfig.json"));
        assert_eq!(locate(&dir).unwrap(), dir.join("config/gameconfig.json"));

        write_standard(&dir.join("Config/gameconfig.json"));
        assert_eq!(locate(&dir).unwrap(), dir.join("Config/gameconfig.json"));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_not_found_lists_every_candidate() {
        let dir = scratch("missing");
        match load_tuning(None, &dir) {
            Err(ConfigError::NotFound { tried }) => {
                assert_eq!(tried.len(), CONFIG_CANDIDATES.len());
                assert!(tried[0].ends_with("Config/gameconfig.json"));
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_unreadable_explicit_path_is_io_error() {
        let dir = scratch("io");
        let err = load_tuning(Some(&dir.join("absent.json")), &dir).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let dir = scratch("invalid");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("gameconfig.json");
        fs::write(&path, "{ \"Field\": ").unwrap();

        assert!(matches!(
            load_from_path(&path),
            Err(ConfigError::Parse(_))
        ));

        let _ = fs::remove_dir_all(&dir);
    }
}
