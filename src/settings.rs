//! Player preferences and game tuning
//!
//! Both are plain JSON files. Missing or unreadable files fall back to
//! defaults so a fresh install always starts.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reading or writing a JSON config file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_json::from_str(&json)?)
}

pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ConfigError> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Master sound switch, flipped by the sound button
    pub sound_on: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self { sound_on: true }
    }
}

impl Settings {
    pub fn toggle_sound(&mut self) {
        self.sound_on = !self.sound_on;
        log::info!("Sound {}", if self.sound_on { "on" } else { "off" });
    }

    /// Output volume for the audio collaborator
    pub fn volume(&self) -> f32 {
        if self.sound_on { 1.0 } else { 0.0 }
    }

    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match read_json(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::info!("Using default settings ({e})");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        write_json(path.as_ref(), self)
    }
}

/// Data-driven game balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Seed for random level selection
    pub seed: u64,
    /// Scroll speed of backgrounds and scenery (units/s)
    pub backdrop_speed: f32,
    /// Seconds between score points
    pub score_interval: f32,
    /// Seconds before an unanswered game over restarts the session
    pub death_timer: f32,
    /// Panel alpha change per second
    pub fade_speed: f32,
    /// Whether the avatar touching an obstacle ends the attempt
    pub player_contact_is_fatal: bool,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            seed: 0x5eed,
            backdrop_speed: 5.0,
            score_interval: 0.25,
            death_timer: 10.0,
            fade_speed: 5.0,
            player_contact_is_fatal: true,
        }
    }
}

impl Tuning {
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match read_json(path) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::warn!("Falling back to default tuning: {e}");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_tuning_uses_defaults() {
        let tuning: Tuning = serde_json::from_str(r#"{"backdrop_speed": 8.0}"#).unwrap();
        assert_eq!(tuning.backdrop_speed, 8.0);
        assert_eq!(tuning.death_timer, 10.0);
        assert!(tuning.player_contact_is_fatal);
    }

    #[test]
    fn test_missing_file_falls_back() {
        assert_eq!(Settings::load("/nonexistent/settings.json"), Settings::default());
        assert_eq!(Tuning::load("/nonexistent/tuning.json"), Tuning::default());
    }

    #[test]
    fn test_settings_persist() {
        let path = std::env::temp_dir().join(format!("lantern_settings_{}.json", std::process::id()));
        let mut settings = Settings::default();
        settings.toggle_sound();
        settings.save(&path).unwrap();

        let loaded = Settings::load(&path);
        assert!(!loaded.sound_on);
        assert_eq!(loaded.volume(), 0.0);
        let _ = fs::remove_file(path);
    }
}
