//! Game state
//!
//! Owns the live world, the player and everything the frame tick mutates.
//! The parsed level is kept untouched so a restart can rebuild from it.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::camera::Camera;
use super::entities::{CheckpointInfo, Entities};
use super::fov::{FieldOfView, VisibleTiles};
use super::physics::{Player, Resolver};
use super::world::{KeyColor, World};
use crate::level::Level;
use crate::settings::Settings;

/// Events emitted during a tick (for audio, particles and the HUD)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Player left the ground; `at` is the feet position
    Jumped { at: Vec2 },
    /// Player touched down after being airborne
    Landed { at: Vec2 },
    Death { deaths: u32 },
    CoinCollected { total: u32 },
    KeyPicked { color: KeyColor, total_for_color: u32 },
    DoorsOpened { color: KeyColor, count: usize },
    CheckpointActivated { id: usize, name: String },
    LevelComplete { time: f32 },
}

/// Run statistics shown on the HUD
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub coins: u32,
    pub keys_total: u32,
    pub keys_by_color: BTreeMap<KeyColor, u32>,
    pub deaths: u32,
    /// Play time in seconds (clamped frame deltas)
    pub time: f32,
}

impl Stats {
    pub fn keys_of(&self, color: KeyColor) -> u32 {
        self.keys_by_color.get(&color).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveCheckpoint {
    pub id: usize,
    pub name: String,
    pub respawn: Vec2,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Level as parsed (doors closed, nothing collected)
    pub level: Level,
    pub settings: Settings,
    pub world: World,
    pub entities: Entities,
    pub player: Player,
    pub camera: Camera,
    /// Tiles seen from the player's current cell
    pub visible: VisibleTiles,
    pub stats: Stats,
    pub checkpoint: Option<ActiveCheckpoint>,
    pub paused: bool,
    pub level_complete: bool,
    /// Events from the most recent tick
    pub events: Vec<GameEvent>,
    pub(super) resolver: Resolver,
    fov: FieldOfView,
}

impl GameState {
    /// Start `level` with the player at its spawn point
    pub fn new(level: Level, settings: Settings) -> Self {
        let resolver = Resolver::new(settings.player, settings.collision);
        let fov = FieldOfView::new(settings.visibility);
        let mut state = Self {
            world: level.build_world(),
            entities: level.entities.clone(),
            player: Player::new(level.spawn, settings.player.size()),
            camera: Camera::new(&settings.camera),
            visible: VisibleTiles::default(),
            stats: Stats::default(),
            checkpoint: None,
            paused: false,
            level_complete: false,
            events: Vec::new(),
            resolver,
            fov,
            level,
            settings,
        };
        state.snap_camera();
        state.refresh_visibility();
        log::info!(
            "Started level '{}' at ({:.0}, {:.0})",
            state.level.name,
            state.player.pos.x,
            state.player.pos.y
        );
        state
    }

    /// Reload the pristine level. Deaths carry over, everything else resets.
    pub fn restart(&mut self) {
        self.load_level(self.level.clone());
    }

    /// Switch to `level` (next map in a sequence, or a reload) with the same
    /// settings. Deaths carry over, everything else resets.
    pub fn load_level(&mut self, level: Level) {
        let deaths = self.stats.deaths;
        let settings = self.settings.clone();
        *self = Self::new(level, settings);
        self.stats.deaths = deaths;
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn fov(&self) -> &FieldOfView {
        &self.fov
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        log::debug!("Paused: {}", self.paused);
    }

    /// Active checkpoint respawn, else the level spawn
    pub fn respawn_point(&self) -> Vec2 {
        self.checkpoint
            .as_ref()
            .map(|cp| cp.respawn)
            .unwrap_or(self.level.spawn)
    }

    /// Count a death and put the player back at the respawn point
    pub fn die(&mut self) {
        self.stats.deaths += 1;
        let respawn = self.respawn_point();
        self.player.teleport(respawn);
        self.snap_camera();
        log::debug!(
            "Death #{} in '{}', respawn at ({:.0}, {:.0})",
            self.stats.deaths,
            self.level.name,
            respawn.x,
            respawn.y
        );
        self.events.push(GameEvent::Death {
            deaths: self.stats.deaths,
        });
    }

    /// Make checkpoint `id` the only active one, optionally moving the player
    /// there. Returns false for an unknown id.
    pub fn activate_checkpoint(&mut self, id: usize, teleport: bool) -> bool {
        let Some(cp) = self.entities.activate_checkpoint(id) else {
            return false;
        };
        let active = ActiveCheckpoint {
            id: cp.id,
            name: cp.name.clone(),
            respawn: cp.respawn,
        };
        log::info!(
            "Checkpoint '{}' active, respawn at ({:.0}, {:.0})",
            active.name,
            active.respawn.x,
            active.respawn.y
        );
        self.events.push(GameEvent::CheckpointActivated {
            id: active.id,
            name: active.name.clone(),
        });
        if teleport {
            self.player.teleport(active.respawn);
            self.snap_camera();
            self.refresh_visibility();
        }
        self.checkpoint = Some(active);
        true
    }

    pub fn checkpoints(&self) -> Vec<CheckpointInfo> {
        self.entities.checkpoint_list()
    }

    /// Recompute the visible set from the player center
    pub fn refresh_visibility(&mut self) {
        self.visible = self.fov.compute(&self.world, self.player.center());
    }

    pub fn snap_camera(&mut self) {
        self.camera
            .snap_to(self.player.center(), self.world.pixel_size());
    }

    pub fn follow_camera(&mut self) {
        self.camera
            .follow(self.player.center(), self.world.pixel_size());
    }
}
