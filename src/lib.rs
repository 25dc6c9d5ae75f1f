//! Lantern - a side-scrolling platformer played in the dark
//!
//! Core modules:
//! - `sim`: Frame simulation (world grid, collision resolver, field of view, gameplay rules)
//! - `level`: Level text loader and checkpoint metadata
//! - `settings`: Tunables for movement, collision, visibility and camera

pub mod level;
pub mod settings;
pub mod sim;

pub use level::{CheckpointMeta, Level, LevelError, LevelSequence};
pub use settings::{Settings, SettingsError};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Game configuration constants
pub mod consts {
    /// Side length of one grid cell, in world units (pixels)
    pub const TILE_SIZE: f32 = 40.0;
    /// Frame delta cap (seconds) applied before every simulation step
    pub const MAX_FRAME_DT: f32 = 0.033;

    /// Player defaults
    pub const PLAYER_WIDTH: f32 = 40.0;
    pub const PLAYER_HEIGHT: f32 = 40.0;

    /// Tall doors span this many tiles, bottom tile at the glyph
    pub const DOOR_HEIGHT_TILES: u32 = 4;

    /// Spawn used when a level has no `P` glyph
    pub const DEFAULT_SPAWN_X: f32 = 50.0;
    pub const DEFAULT_SPAWN_Y: f32 = 50.0;
}

/// A grid cell address
///
/// Ordered row-major so sorted cell lists read like the grid does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub row: i32,
    pub col: i32,
}

impl Cell {
    #[inline]
    pub const fn new(col: i32, row: i32) -> Self {
        Self { row, col }
    }

    /// Chebyshev distance (king moves) between two cells
    #[inline]
    pub fn chebyshev(self, other: Cell) -> i32 {
        (self.col - other.col).abs().max((self.row - other.row).abs())
    }
}

/// Cell containing a world-space point (floored, unclamped)
#[inline]
pub fn cell_of(point: Vec2, tile_size: f32) -> Cell {
    Cell::new(
        (point.x / tile_size).floor() as i32,
        (point.y / tile_size).floor() as i32,
    )
}

/// World-space top-left corner of a cell
#[inline]
pub fn tile_origin(col: i32, row: i32, tile_size: f32) -> Vec2 {
    Vec2::new(col as f32 * tile_size, row as f32 * tile_size)
}
