use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use super::gameplay::{FetchMode, WorldSettings};

pub(crate) const CONFIG_FILE_NAME: &str = "survivor.json";
const START_MAP_ENV_VAR: &str = "SURVIVOR_START_MAP";
const START_SPAWN_ENV_VAR: &str = "SURVIVOR_START_SPAWN";

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path} at {location}: {message}")]
    Parse {
        path: PathBuf,
        location: String,
        message: String,
    },
    #[error("invalid config {path}: map_scale must be a positive number, got {value}")]
    InvalidMapScale { path: PathBuf, value: f32 },
}

/// Game options. Every field may be omitted from `survivor.json`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct GameConfig {
    pub(crate) start_map: String,
    pub(crate) start_spawn: Option<String>,
    pub(crate) map_scale: f32,
    pub(crate) player_speed: f32,
    pub(crate) window_width: u32,
    pub(crate) window_height: u32,
    pub(crate) fetch_mode: FetchMode,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            start_map: "./maps/bedroom.tmj".to_string(),
            start_spawn: None,
            map_scale: 2.0,
            player_speed: 140.0,
            window_width: 800,
            window_height: 600,
            fetch_mode: FetchMode::Background,
        }
    }
}

impl GameConfig {
    /// Reads `survivor.json` under `root` when present, then applies the
    /// environment overrides.
    pub(crate) fn load(root: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(&root.join(CONFIG_FILE_NAME))?;
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(source) if source.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Self::parse(path, &raw)
    }

    fn parse(path: &Path, raw: &str) -> Result<Self, ConfigError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let config = serde_path_to_error::deserialize::<_, Self>(&mut deserializer)
            .map_err(|error| {
                let location = error.path().to_string();
                ConfigError::Parse {
                    path: path.to_path_buf(),
                    location: if location.is_empty() {
                        ".".to_string()
                    } else {
                        location
                    },
                    message: error.into_inner().to_string(),
                }
            })?;
        if !(config.map_scale.is_finite() && config.map_scale > 0.0) {
            return Err(ConfigError::InvalidMapScale {
                path: path.to_path_buf(),
                value: config.map_scale,
            });
        }
        Ok(config)
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(map) = lookup(START_MAP_ENV_VAR).filter(|value| !value.trim().is_empty()) {
            self.start_map = map.trim().to_string();
        }
        if let Some(spawn) = lookup(START_SPAWN_ENV_VAR) {
            let spawn = spawn.trim();
            self.start_spawn = (!spawn.is_empty()).then(|| spawn.to_string());
        }
    }

    pub(crate) fn to_world_settings(&self) -> WorldSettings {
        WorldSettings {
            start_map: self.start_map.clone(),
            start_spawn: self.start_spawn.clone(),
            map_scale: self.map_scale,
            player_speed: self.player_speed,
            viewport: (self.window_width, self.window_height),
            fetch_mode: self.fetch_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().expect("temp dir");
        let config = GameConfig::from_file(&temp.path().join(CONFIG_FILE_NAME)).expect("config");
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn file_overrides_only_named_fields() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(
            &path,
            r#"{"start_map": "./maps/street.tmj", "player_speed": 200, "fetch_mode": "inline"}"#,
        )
        .expect("write config");

        let config = GameConfig::from_file(&path).expect("config");
        assert_eq!(config.start_map, "./maps/street.tmj");
        assert_eq!(config.player_speed, 200.0);
        assert_eq!(config.fetch_mode, FetchMode::Inline);
        assert_eq!(config.map_scale, 2.0);
        assert_eq!((config.window_width, config.window_height), (800, 600));
    }

    #[test]
    fn parse_error_names_the_failing_field() {
        let error = GameConfig::parse(Path::new("survivor.json"), r#"{"map_scale": "big"}"#)
            .expect_err("bad scale");
        match error {
            ConfigError::Parse { location, .. } => assert_eq!(location, "map_scale"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_positive_map_scale_is_rejected() {
        for raw in [r#"{"map_scale": 0}"#, r#"{"map_scale": -2.0}"#] {
            let error = GameConfig::parse(Path::new("survivor.json"), raw).expect_err("bad scale");
            assert!(matches!(error, ConfigError::InvalidMapScale { .. }));
        }
        let config =
            GameConfig::parse(Path::new("survivor.json"), r#"{"map_scale": 0.5}"#).expect("config");
        assert_eq!(config.map_scale, 0.5);
    }

    #[test]
    fn environment_overrides_apply_last() {
        let mut config = GameConfig::default();
        config.apply_overrides(|name| match name {
            START_MAP_ENV_VAR => Some(" ./maps/house.tmj ".to_string()),
            START_SPAWN_ENV_VAR => Some("East".to_string()),
            _ => None,
        });
        assert_eq!(config.start_map, "./maps/house.tmj");
        assert_eq!(config.start_spawn.as_deref(), Some("East"));

        config.apply_overrides(|name| (name == START_SPAWN_ENV_VAR).then(String::new));
        assert_eq!(config.start_map, "./maps/house.tmj");
        assert_eq!(config.start_spawn, None);
    }

    #[test]
    fn world_settings_carry_the_window_as_viewport() {
        let settings = GameConfig::default().to_world_settings();
        assert_eq!(settings.viewport, (800, 600));
        assert_eq!(settings.start_map, "./maps/bedroom.tmj");
        assert_eq!(settings.fetch_mode, FetchMode::Background);
    }
}
