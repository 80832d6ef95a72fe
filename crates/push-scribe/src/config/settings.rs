//! Settings management.
//!
//! A small JSON document in the user config directory holding the UI theme
//! and the hotkey combo strings. Missing keys fall back to documented
//! defaults; a missing file is created with defaults. Saves are atomic
//! (temp file + rename) so a crash mid-write never corrupts settings.

use crate::{AppError, AppResult};

use std::{
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Default push-to-talk combo (also the default stop combo: hold-to-record).
pub(crate) const DEFAULT_START_SHORTCUT: &str = "ctrl+alt+o";
/// Default stop combo.
pub(crate) const DEFAULT_STOP_SHORTCUT: &str = "ctrl+alt+o";
/// Default exit combo.
pub(crate) const DEFAULT_EXIT_SHORTCUT: &str = "ctrl+alt+x";

/// Tray icon theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light icons for dark taskbars.
    #[default]
    Light,
    /// Dark icons for light taskbars.
    Dark,
}

/// User-facing settings, persisted as `settings.json`.
///
/// The key names are part of the on-disk contract and are deliberately
/// shouty to stay compatible with existing settings files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Tray icon theme.
    #[serde(default)]
    pub theme: Theme,

    /// Combo that starts (or, when equal to the stop combo, holds) recording.
    #[serde(rename = "START_RECORDING_SHORTCUT", default = "default_start")]
    pub start_recording_shortcut: String,

    /// Combo that stops recording.
    #[serde(rename = "STOP_RECORDING_SHORTCUT", default = "default_stop")]
    pub stop_recording_shortcut: String,

    /// Combo that exits the application.
    #[serde(rename = "EXIT_SHORTCUT", default = "default_exit")]
    pub exit_shortcut: String,
}

fn default_start() -> String {
    DEFAULT_START_SHORTCUT.to_string()
}

fn default_stop() -> String {
    DEFAULT_STOP_SHORTCUT.to_string()
}

fn default_exit() -> String {
    DEFAULT_EXIT_SHORTCUT.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            start_recording_shortcut: default_start(),
            stop_recording_shortcut: default_stop(),
            exit_shortcut: default_exit(),
        }
    }
}

impl Settings {
    /// Load settings from disk, creating the default file if not found.
    #[track_caller]
    #[instrument]
    pub fn load() -> AppResult<Self> {
        let path = Self::settings_path()?;
        Self::load_from(&path)
    }

    /// Save settings to the default location using the atomic write pattern.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn save(&self) -> AppResult<()> {
        let path = Self::settings_path()?;
        self.save_to(&path)
    }

    pub(crate) fn load_from(path: &Path) -> AppResult<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path).map_err(|e| AppError::ConfigError {
                reason: format!("Failed to read settings: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

            let settings: Settings =
                serde_json::from_str(&contents).map_err(|e| AppError::ConfigError {
                    reason: format!("Failed to parse settings: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?;

            info!(settings_path = ?path, "Settings loaded");

            Ok(settings)
        } else {
            info!(settings_path = ?path, "No settings found, creating default");
            let settings = Settings::default();
            settings.save_to(path)?;
            Ok(settings)
        }
    }

    /// Atomic write: serialize, write to a temp sibling, fsync, rename.
    pub(crate) fn save_to(&self, path: &Path) -> AppResult<()> {
        let contents =
            serde_json::to_string_pretty(self).map_err(|e| AppError::ConfigError {
                reason: format!("Failed to serialize settings: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let temp_path = path.with_extension("json.tmp");

        let mut temp_file = fs::File::create(&temp_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to create temp settings file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| AppError::ConfigError {
                reason: format!("Failed to write temp settings file: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        temp_file.sync_all().map_err(|e| AppError::ConfigError {
            reason: format!("Failed to sync temp settings file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        fs::rename(&temp_path, path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to rename temp settings into place: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(settings_path = ?path, "Settings saved (atomic write)");

        Ok(())
    }

    #[track_caller]
    fn settings_path() -> AppResult<PathBuf> {
        Ok(config_dir()?.join("settings.json"))
    }
}

/// Resolve (and create) the per-user config directory.
#[track_caller]
pub(crate) fn config_dir() -> AppResult<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "push-scribe", "Push-Scribe").ok_or_else(|| {
        AppError::ConfigError {
            reason: "Failed to get config directory".to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    })?;

    let config_dir = proj_dirs.config_dir();

    if !config_dir.exists() {
        fs::create_dir_all(config_dir)?;
        debug!(config_dir = ?config_dir, "Created config directory");
    }

    Ok(config_dir.to_path_buf())
}
