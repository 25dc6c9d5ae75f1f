//! Follow camera
//!
//! Eases toward the player center each frame and stays inside the world.
//! Worlds smaller than the viewport are allowed to scroll into negative y so
//! the level sits at the bottom of the screen.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::settings::CameraConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Top-left corner of the view, in world units
    pub pos: Vec2,
    pub view: Vec2,
    pub lerp: f32,
}

impl Camera {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            pos: Vec2::ZERO,
            view: config.view_size(),
            lerp: config.lerp,
        }
    }

    fn target(&self, focus: Vec2) -> Vec2 {
        focus - self.view * 0.5
    }

    fn clamp(&self, pos: Vec2, world: Vec2) -> Vec2 {
        let max_x = (world.x - self.view.x).max(0.0);
        let avail_y = world.y - self.view.y;
        Vec2::new(
            pos.x.clamp(0.0, max_x),
            pos.y.clamp(avail_y.min(0.0), avail_y.max(0.0)),
        )
    }

    /// Ease toward `focus` (usually the player center)
    pub fn follow(&mut self, focus: Vec2, world: Vec2) {
        let target = self.target(focus);
        let eased = self.pos + (target - self.pos) * self.lerp;
        self.pos = self.clamp(eased, world);
    }

    /// Jump straight to `focus`, rounded to whole units
    pub fn snap_to(&mut self, focus: Vec2, world: Vec2) {
        self.pos = self.clamp(self.target(focus).round(), world);
    }

    /// Resize the viewport (window resize, fullscreen)
    pub fn resize(&mut self, view: Vec2, focus: Vec2, world: Vec2) {
        self.view = view.max(Vec2::ONE);
        self.snap_to(focus, world);
    }
}
