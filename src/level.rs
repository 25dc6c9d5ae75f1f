//! Level text loader
//!
//! One character per tile, rows top to bottom:
//!
//! | glyph       | meaning                                         |
//! |-------------|-------------------------------------------------|
//! | `#`         | block (solid, opaque)                           |
//! | `=`         | ground (solid, opacity per sight policy)        |
//! | `~` `^` `v` | lava, spikes, downward spikes                   |
//! | `R G B Y`   | colored door, 4 tiles tall, bottom at the glyph |
//! | `D` / `d`   | neutral door, 4 tiles / 1 tile                  |
//! | `r g b y`   | key                                             |
//! | `o`         | coin                                            |
//! | `C`         | checkpoint                                      |
//! | `A`         | goal                                            |
//! | `P`         | player spawn (one tile above the glyph)         |
//!
//! Anything else is empty space.

use std::io;
use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::collision::Rect;
use crate::sim::entities::{Checkpoint, Coin, Entities, Key};
use crate::sim::world::{KeyColor, ObjectKind, World, WorldObject};
use crate::tile_origin;

/// Errors raised while loading a level or its metadata
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("level '{0}' is empty")]
    Empty(String),
    #[error("level '{level}' has a second '{glyph}' at ({col}, {row})")]
    Duplicate {
        level: String,
        glyph: char,
        col: i32,
        row: i32,
    },
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid checkpoint metadata: {0}")]
    Meta(#[from] serde_json::Error),
}

/// Respawn offset from a checkpoint tile's top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RespawnOffset {
    #[serde(default)]
    pub dx: f32,
    #[serde(default = "default_respawn_dy")]
    pub dy: f32,
}

fn default_respawn_dy() -> f32 {
    -TILE_SIZE
}

/// Name and respawn override for the checkpoint at `(col, row)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointMeta {
    pub col: i32,
    pub row: i32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub respawn: Option<RespawnOffset>,
}

impl CheckpointMeta {
    /// Parse a JSON array of checkpoint metadata
    pub fn parse_list(json: &str) -> Result<Vec<Self>, LevelError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load_list(path: impl AsRef<Path>) -> Result<Vec<Self>, LevelError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_list(&json)
    }
}

/// A parsed level, ready to start a session from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub name: String,
    pub cols: u32,
    pub rows: u32,
    pub tile_size: f32,
    pub objects: Vec<WorldObject>,
    pub entities: Entities,
    /// Player top-left at level start
    pub spawn: Vec2,
}

impl Level {
    /// Parse level text
    pub fn parse(name: &str, text: &str) -> Result<Self, LevelError> {
        let text = text.replace('\r', "");
        if text.trim().is_empty() {
            return Err(LevelError::Empty(name.to_string()));
        }
        let lines: Vec<&str> = text.split('\n').collect();
        let rows = lines.len() as u32;
        let cols = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u32;

        let t = TILE_SIZE;
        let mut objects = Vec::new();
        let mut entities = Entities::default();
        let mut spawn: Option<Vec2> = None;
        let mut has_goal = false;

        let duplicate = |glyph, col, row| LevelError::Duplicate {
            level: name.to_string(),
            glyph,
            col,
            row,
        };

        for (row, line) in lines.iter().enumerate() {
            let row = row as i32;
            for (col, glyph) in line.chars().enumerate() {
                let col = col as i32;
                let origin = tile_origin(col, row, t);
                let (x, y) = (origin.x, origin.y);

                match glyph {
                    '#' => objects.push(WorldObject::new(x, y, t, t, ObjectKind::Block)),
                    '=' => objects.push(WorldObject::new(x, y, t, t, ObjectKind::Ground)),
                    '~' => objects.push(WorldObject::new(x, y, t, t, ObjectKind::Lava)),
                    '^' => objects.push(WorldObject::new(x, y, t, t, ObjectKind::Spikes)),
                    'v' => objects.push(WorldObject::new(x, y, t, t, ObjectKind::SpikesDown)),
                    'Y' | 'B' | 'R' | 'G' => {
                        objects.push(tall_door(x, y, KeyColor::from_glyph(glyph)));
                    }
                    'D' => objects.push(tall_door(x, y, None)),
                    'd' => objects.push(WorldObject::door(x, y, t, t, None)),
                    'y' | 'b' | 'r' | 'g' => {
                        if let Some(color) = KeyColor::from_glyph(glyph) {
                            entities.keys.push(Key {
                                rect: Rect::new(x + 10.0, y + 10.0, 20.0, 20.0),
                                color,
                                picked: false,
                            });
                        }
                    }
                    'o' => entities.coins.push(Coin {
                        rect: Rect::new(x + 8.0, y + 8.0, 24.0, 24.0),
                        collected: false,
                    }),
                    'C' => {
                        let id = entities.checkpoints.len();
                        entities.checkpoints.push(Checkpoint {
                            id,
                            rect: Rect::new(x, y, t, t),
                            col,
                            row,
                            name: format!("Checkpoint {}", id + 1),
                            respawn: Vec2::new(x, y - t),
                            active: false,
                        });
                    }
                    'A' => {
                        if has_goal {
                            return Err(duplicate(glyph, col, row));
                        }
                        has_goal = true;
                        objects.push(WorldObject::new(x, y, t, t, ObjectKind::Goal));
                    }
                    'P' => {
                        if spawn.is_some() {
                            return Err(duplicate(glyph, col, row));
                        }
                        spawn = Some(Vec2::new(x, y - t));
                    }
                    _ => {}
                }
            }
        }

        let spawn = spawn.unwrap_or(Vec2::new(DEFAULT_SPAWN_X, DEFAULT_SPAWN_Y));

        log::info!(
            "Parsed level '{}': {}x{} tiles, {} objects, {} coins, {} keys, {} checkpoints",
            name,
            cols,
            rows,
            objects.len(),
            entities.coins.len(),
            entities.keys.len(),
            entities.checkpoints.len()
        );

        Ok(Self {
            name: name.to_string(),
            cols,
            rows,
            tile_size: t,
            objects,
            entities,
            spawn,
        })
    }

    /// Read and parse a level file; the level is named after the file stem
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "level".to_string());
        Self::parse(&name, &text)
    }

    /// Rename and re-target checkpoints by grid position. Returns how many matched.
    pub fn apply_checkpoint_meta(&mut self, metas: &[CheckpointMeta]) -> usize {
        let mut applied = 0;
        for meta in metas {
            let Some(cp) = self
                .entities
                .checkpoints
                .iter_mut()
                .find(|cp| cp.col == meta.col && cp.row == meta.row)
            else {
                log::warn!(
                    "Checkpoint metadata at ({}, {}) matches no checkpoint in '{}'",
                    meta.col,
                    meta.row,
                    self.name
                );
                continue;
            };
            if let Some(name) = &meta.name {
                cp.name = name.clone();
            }
            let offset = meta.respawn.unwrap_or(RespawnOffset {
                dx: 0.0,
                dy: default_respawn_dy(),
            });
            cp.respawn = cp.rect.pos + Vec2::new(offset.dx, offset.dy);
            applied += 1;
        }
        applied
    }

    /// A fresh world for this level (all doors closed)
    pub fn build_world(&self) -> World {
        World::new(self.objects.clone(), self.cols, self.rows, self.tile_size)
    }

    pub fn pixel_size(&self) -> Vec2 {
        Vec2::new(self.cols as f32, self.rows as f32) * self.tile_size
    }
}

/// Play order of a level set. Finishing the last level wraps to the first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSequence {
    names: Vec<String>,
}

impl Default for LevelSequence {
    fn default() -> Self {
        Self::new(["map1", "map2", "map3"])
    }
}

impl LevelSequence {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Level to play after `current`. A name outside the sequence starts it over.
    pub fn next_after(&self, current: &str) -> Option<&str> {
        if self.names.is_empty() {
            return None;
        }
        let next = self
            .names
            .iter()
            .position(|n| n == current)
            .map_or(0, |i| (i + 1) % self.names.len());
        Some(self.names[next].as_str())
    }

    /// Level file for `name` in `dir` (`<dir>/<name>.txt`)
    pub fn path_for(dir: impl AsRef<Path>, name: &str) -> PathBuf {
        dir.as_ref().join(format!("{name}.txt"))
    }
}

/// Door `DOOR_HEIGHT_TILES` tall whose bottom tile is at `(x, y)`
fn tall_door(x: f32, y: f32, color: Option<KeyColor>) -> WorldObject {
    let tiles = DOOR_HEIGHT_TILES as f32;
    let top = y - (tiles - 1.0) * TILE_SIZE;
    WorldObject::door(x, top, TILE_SIZE, tiles * TILE_SIZE, color)
}
