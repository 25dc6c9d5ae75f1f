//! Game tunables
//!
//! Every constant the simulation reads lives in one `Settings` value that is
//! handed to the resolver, the field of view and the camera when a session
//! starts. Loaded from JSON; every section is `#[serde(default)]` so a file
//! only needs the values it overrides.

use std::io;
use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors raised while loading settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Player motion constants, in world units per step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Horizontal speed gained per step while a direction is held
    pub accel: f32,
    /// Horizontal velocity multiplier per step with no direction held
    pub friction: f32,
    /// Horizontal speed below which friction snaps velocity to zero
    pub stop_epsilon: f32,
    pub max_speed: f32,
    /// Added to vertical velocity every step (y grows downward)
    pub gravity: f32,
    /// Vertical velocity set on jump (negative = up)
    pub jump_power: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            accel: 0.5,
            friction: 0.86,
            stop_epsilon: 0.05,
            max_speed: 5.2,
            gravity: 0.6,
            jump_power: -12.5,
            width: PLAYER_WIDTH,
            height: PLAYER_HEIGHT,
        }
    }
}

impl PlayerTuning {
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

/// Collision margins
///
/// Both are empirically tuned rather than derived; treat them as knobs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionTuning {
    /// Solids are shrunk by this much on every side before the overlap test,
    /// so exact edge contact never counts as penetration
    pub solid_epsilon: f32,
    /// Spike boxes are grown by this much before the triangle test
    pub hazard_pad: f32,
}

impl Default for CollisionTuning {
    fn default() -> Self {
        Self {
            solid_epsilon: 0.5,
            hazard_pad: 1.0,
        }
    }
}

/// Field of view configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityConfig {
    /// Sight radius, in tiles
    pub radius: u32,
    /// Chebyshev ring around the player that is always visible
    pub near_always: u32,
    /// Whether ground tiles stop sight (they always stop movement)
    pub ground_blocks_sight: bool,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            radius: 6,
            near_always: 1,
            ground_blocks_sight: true,
        }
    }
}

/// Camera follow behavior
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Fraction of the remaining distance covered per frame
    pub lerp: f32,
    pub view_width: f32,
    pub view_height: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            lerp: 0.12,
            view_width: 1200.0,
            view_height: 600.0,
        }
    }
}

impl CameraConfig {
    pub fn view_size(&self) -> Vec2 {
        Vec2::new(self.view_width, self.view_height)
    }
}

/// All game tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub player: PlayerTuning,
    pub collision: CollisionTuning,
    pub visibility: VisibilityConfig,
    pub camera: CameraConfig,
    /// Upper bound on the elapsed time accounted to a single frame (seconds)
    pub max_frame_dt: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            player: PlayerTuning::default(),
            collision: CollisionTuning::default(),
            visibility: VisibilityConfig::default(),
            camera: CameraConfig::default(),
            max_frame_dt: MAX_FRAME_DT,
        }
    }
}

impl Settings {
    /// Parse settings from a JSON document (missing fields use defaults)
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from disk
    ///
    /// A missing file yields the defaults; an unreadable or malformed one is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => {
                let settings = Self::from_json(&json)?;
                log::info!("Loaded settings from {}", path.display());
                Ok(settings)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::info!("No settings at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(SettingsError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Clamped frame delta
    #[inline]
    pub fn clamp_dt(&self, dt: f32) -> f32 {
        dt.clamp(0.0, self.max_frame_dt)
    }
}
