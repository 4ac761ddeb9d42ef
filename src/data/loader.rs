//! RON/JSON data loader
//!
//! Loads engine configuration and game definitions from disk, with fallback
//! to built-in defaults for configuration.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::engine::EngineConfig;
use crate::goals::{GameDefinition, GoalKind, Section, Task};
use crate::progression::{ProgressionPolicy, XpConfig};

/// Default location of data files, relative to the working directory
pub const DEFAULT_DATA_DIR: &str = "assets/data";

const CONFIG_FILE: &str = "rewards.ron";
const SAMPLE_GAME_FILE: &str = "sample_game.ron";

#[derive(Error, Debug)]
pub enum DataError {
    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("RON error in {path:?}: {message}")]
    Ron { path: PathBuf, message: String },

    #[error("JSON error in {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unsupported data file {0:?}: expected .ron or .json")]
    UnsupportedFormat(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Ron,
    Json,
}

fn format_of(path: &Path) -> Result<Format, DataError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("ron") => Ok(Format::Ron),
        Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Format::Json),
        _ => Err(DataError::UnsupportedFormat(path.to_path_buf())),
    }
}

fn read(path: &Path) -> Result<String, DataError> {
    fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write(path: &Path, content: String) -> Result<(), DataError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| DataError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, content).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn to_ron<T: serde::Serialize>(value: &T, path: &Path) -> Result<String, DataError> {
    ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default()).map_err(|e| DataError::Ron {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load a game definition from a `.ron` or `.json` file
pub fn load_game(path: &Path) -> Result<GameDefinition, DataError> {
    let format = format_of(path)?;
    let content = read(path)?;
    let game: GameDefinition = match format {
        Format::Ron => ron::from_str(&content).map_err(|e| DataError::Ron {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?,
        Format::Json => serde_json::from_str(&content).map_err(|source| DataError::Json {
            path: path.to_path_buf(),
            source,
        })?,
    };
    log::info!("Loaded game {} ({} goals) from {:?}", game.id, game.goals.len(), path);
    Ok(game)
}

/// Write a game definition, format chosen by extension
pub fn save_game(game: &GameDefinition, path: &Path) -> Result<(), DataError> {
    let content = match format_of(path)? {
        Format::Ron => to_ron(game, path)?,
        Format::Json => serde_json::to_string_pretty(game).map_err(|source| DataError::Json {
            path: path.to_path_buf(),
            source,
        })?,
    };
    write(path, content)
}

/// Load engine configuration, falling back to defaults if missing or invalid
pub fn load_engine_config(base_path: &Path) -> EngineConfig {
    let path = base_path.join(CONFIG_FILE);
    if path.exists() {
        match fs::read_to_string(&path) {
            Ok(content) => match ron::from_str(&content) {
                Ok(config) => return config,
                Err(e) => log::warn!("Failed to parse {:?}: {}. Using defaults.", path, e),
            },
            Err(e) => log::warn!("Failed to read {:?}: {}. Using defaults.", path, e),
        }
    }
    EngineConfig::default()
}

/// A small sample game used by `export-defaults`
pub fn sample_game() -> GameDefinition {
    let mut goals = vec![Task::new("Install and open the game", 0.25)];
    goals.extend((2..=8).map(|level| {
        let mut task = Task::new(format!("Reach level {}", level * 5), 0.5 * level as f64);
        task.goal_id = Some(format!("goal-{}", level));
        task.days_left = Some(14);
        task
    }));
    let mut turbo = Task::new("Win 3 matches in a row", 3.0);
    turbo.section = Section::Turbo;
    turbo.goal_type = GoalKind::NonLinear;
    turbo.days_left = Some(3);
    goals.push(turbo);

    GameDefinition::new("sample-001", "Sample Puzzle Saga")
        .with_goals(goals)
        .with_policy(ProgressionPolicy::batched(3, 2))
        .with_xp(XpConfig::new(5.0, 1.2))
}

/// Export default configuration and the sample game to `base_path`
pub fn export_default_data(base_path: &Path) -> Result<(), DataError> {
    let config_path = base_path.join(CONFIG_FILE);
    write(&config_path, to_ron(&EngineConfig::default(), &config_path)?)?;

    save_game(&sample_game(), &base_path.join(SAMPLE_GAME_FILE))?;
    log::info!("Exported default data to {:?}", base_path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("goalrush-data-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_export_and_load_defaults() {
        let dir = scratch_dir("export");
        let result = export_default_data(&dir);
        assert!(result.is_ok(), "Failed to export default data: {:?}", result.err());

        assert_eq!(load_engine_config(&dir), EngineConfig::default());
        let game = load_game(&dir.join(SAMPLE_GAME_FILE)).unwrap();
        assert_eq!(game, sample_game());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_config_falls_back_to_defaults() {
        let dir = scratch_dir("fallback");
        assert_eq!(load_engine_config(&dir), EngineConfig::default());

        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(CONFIG_FILE), "not ron at all (").unwrap();
        assert_eq!(load_engine_config(&dir), EngineConfig::default());

        fs::write(dir.join(CONFIG_FILE), "(milestone_level: 5)").unwrap();
        let config = load_engine_config(&dir);
        assert_eq!(config.milestone_level, 5);
        assert_eq!(config.schedule.xp_per_batch, 50);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_json_game_round_trip_and_bad_extension() {
        let dir = scratch_dir("json");
        let path = dir.join("game.json");
        save_game(&sample_game(), &path).unwrap();
        assert_eq!(load_game(&path).unwrap().goals.len(), 9);

        let err = load_game(&dir.join("game.yaml")).unwrap_err();
        assert!(matches!(err, DataError::UnsupportedFormat(_)));

        let err = load_game(&dir.join("missing.json")).unwrap_err();
        assert!(matches!(err, DataError::Io { .. }));

        let _ = fs::remove_dir_all(&dir);
    }
}
