//! Settings persistence using TOML
//!
//! Stores settings in ~/.config/tetris-engine/settings.toml (or platform equivalent)

use crate::board::{BOARD_COLS, BOARD_ROWS};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Top-level settings file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Board size and scoring rules
    pub rules: Rules,
    /// Tick pacing
    pub timing: TimingSettings,
    /// High score list
    pub leaderboard: LeaderboardSettings,
}

/// Board dimensions and game-progression constants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    pub rows: usize,
    pub cols: usize,
    /// Points awarded per cleared line
    pub points_per_line: u32,
    /// Lines needed for each level up
    pub lines_per_level: u32,
    pub max_level: u32,
    /// Ghost is hidden when the landing spot is closer than this many rows
    pub min_ghost_distance: usize,
}

/// Drop-speed curve: ticks between gravity steps shrink quadratically with level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingSettings {
    pub base_drop_speed: u32,
    pub speed_curve_factor: f32,
    pub target_fps: f64,
}

/// Leaderboard settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaderboardSettings {
    pub max_entries: usize,
    /// File name inside the data directory
    pub file_name: String,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            rows: BOARD_ROWS,
            cols: BOARD_COLS,
            points_per_line: 100,
            lines_per_level: 5,
            max_level: 10,
            min_ghost_distance: 4,
        }
    }
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            base_drop_speed: 13,
            speed_curve_factor: 11.0,
            target_fps: 45.0,
        }
    }
}

impl Default for LeaderboardSettings {
    fn default() -> Self {
        Self {
            max_entries: 10,
            file_name: "leaderboard.txt".to_string(),
        }
    }
}

impl TimingSettings {
    /// Wall-clock length of one tick. Non-positive rates fall back to the default.
    pub fn frame_duration(&self) -> Duration {
        let fps = if self.target_fps.is_finite() && self.target_fps > 0.0 {
            self.target_fps
        } else {
            Self::default().target_fps
        };
        Duration::from_secs_f64(1.0 / fps)
    }

    /// Game time represented by `ticks` frames
    pub fn elapsed(&self, ticks: u64) -> Duration {
        self.frame_duration().mul_f64(ticks as f64)
    }
}

impl Settings {
    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("com", "tetris-engine", "tetris-engine")
    }

    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the settings file path
    fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("settings.toml"))
    }

    /// Where the leaderboard file lives
    pub fn leaderboard_path(&self) -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.data_dir().join(&self.leaderboard.file_name))
    }

    /// Parse settings text, falling back to defaults for anything malformed
    pub fn from_toml(contents: &str) -> Self {
        match toml::from_str(contents) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Ignoring malformed settings: {}", e);
                Self::default()
            }
        }
    }

    /// Load settings from file, or create default
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            return Self::default();
        };

        match fs::read_to_string(&path) {
            Ok(contents) => Self::from_toml(&contents),
            Err(_) => Self::default(),
        }
    }

    /// Save settings to file
    pub fn save(&self) -> Result<(), String> {
        let Some(dir) = Self::config_dir() else {
            return Err("Could not determine config directory".to_string());
        };

        let Some(path) = Self::settings_path() else {
            return Err("Could not determine settings path".to_string());
        };

        fs::create_dir_all(&dir).map_err(|e| format!("Failed to create config dir: {}", e))?;

        let contents =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize: {}", e))?;

        fs::write(&path, contents).map_err(|e| format!("Failed to write settings: {}", e))?;

        Ok(())
    }
}
