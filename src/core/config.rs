//=========================================================================
// Game Configuration
//
// Optional `space_battle.toml` read at startup. Every field has a
// default, so a missing file (or a partial one) is fine:
//
// ```toml
// fps = 30.0
// players = 4
//
// [window]
// title = "Space Battle"
// width = 640
// height = 480
//
// [assets]
// dir = "Resources"
// ```
//
// Unknown keys are ignored. Values that parse but make no sense (zero
// fps, five players) are rejected by `validate`.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::fs;
use std::path::{Path, PathBuf};

//=== External Dependencies ===============================================

use log::info;
use serde::Deserialize;

//=== Internal Dependencies ===============================================

use crate::core::error::SceneError;

//=== Sections ============================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Space Battle".to_owned(),
            width: 640,
            height: 480,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Root of the art directory tree.
    pub dir: PathBuf,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("Resources"),
        }
    }
}

//=== GameConfig ==========================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Target frame rate of every scene clock.
    pub fps: f64,

    /// Number of ships spawned, 1 to 4.
    pub players: u8,

    pub window: WindowConfig,
    pub assets: AssetConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fps: 30.0,
            players: 4,
            window: WindowConfig::default(),
            assets: AssetConfig::default(),
        }
    }
}

impl GameConfig {
    pub const FILE_NAME: &'static str = "space_battle.toml";
    pub const MAX_PLAYERS: u8 = 4;
    pub const FPS_RANGE: std::ops::RangeInclusive<f64> = 1.0..=1000.0;

    /// Parses and validates TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, SceneError> {
        let config: Self = toml::from_str(text)
            .map_err(|e| SceneError::config(format!("invalid {}: {}", Self::FILE_NAME, e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path`, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self, SceneError> {
        if !path.exists() {
            info!(target: "config", "{} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        info!(target: "config", "loaded {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SceneError> {
        if !Self::FPS_RANGE.contains(&self.fps) {
            return Err(SceneError::config(format!(
                "fps must be between {} and {}, got {}",
                Self::FPS_RANGE.start(),
                Self::FPS_RANGE.end(),
                self.fps
            )));
        }
        if !(1..=Self::MAX_PLAYERS).contains(&self.players) {
            return Err(SceneError::config(format!(
                "players must be between 1 and {}, got {}",
                Self::MAX_PLAYERS,
                self.players
            )));
        }
        if self.window.width == 0 || self.window.height == 0 {
            return Err(SceneError::config("window size must be non-zero"));
        }
        Ok(())
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
