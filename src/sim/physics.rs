//! Player movement and collision resolution
//!
//! One explicit-Euler step per frame, no sub-stepping. A step can tunnel through
//! an object thinner than its displacement; velocities are clamped horizontally
//! and the frame delta is capped upstream, which keeps that out of normal play.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{self, Axis, Rect};
use super::world::{Hazard, World};
use crate::settings::{CollisionTuning, PlayerTuning};

/// Held movement inputs, sampled once per frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

/// The player's kinematic state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    /// World units per step
    pub vel: Vec2,
    pub size: Vec2,
    /// Resting on a solid after the last step
    pub grounded: bool,
    /// Touched a hazard during the last step (reset every step)
    pub hit_hazard: bool,
}

impl Player {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            size,
            grounded: false,
            hit_hazard: false,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Bottom-center point (where dust spawns)
    #[inline]
    pub fn feet(&self) -> Vec2 {
        Vec2::new(self.pos.x + self.size.x * 0.5, self.pos.y + self.size.y)
    }

    /// Move without simulating (respawn, checkpoint warp). Clears motion.
    pub fn teleport(&mut self, pos: Vec2) {
        self.pos = pos;
        self.vel = Vec2::ZERO;
        self.hit_hazard = false;
    }
}

/// Side effects of one step, for audio and particles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepOutcome {
    pub jumped: bool,
    /// `grounded` went false -> true this step
    pub landed: bool,
}

/// Integrates the player against the world's solids and hazards
#[derive(Debug, Clone)]
pub struct Resolver {
    tuning: PlayerTuning,
    collision: CollisionTuning,
}

impl Resolver {
    pub fn new(tuning: PlayerTuning, collision: CollisionTuning) -> Self {
        Self { tuning, collision }
    }

    pub fn tuning(&self) -> &PlayerTuning {
        &self.tuning
    }

    /// Advance the player by one step
    pub fn step(&self, player: &mut Player, world: &World, input: &MoveInput) -> StepOutcome {
        let t = &self.tuning;

        // Horizontal input, friction when idle
        if input.left {
            player.vel.x -= t.accel;
        }
        if input.right {
            player.vel.x += t.accel;
        }
        if !input.left && !input.right {
            player.vel.x *= t.friction;
            if player.vel.x.abs() < t.stop_epsilon {
                player.vel.x = 0.0;
            }
        }
        player.vel.x = player.vel.x.clamp(-t.max_speed, t.max_speed);

        player.vel.y += t.gravity;

        let was_grounded = player.grounded;
        player.pos += player.vel;
        player.grounded = false;
        player.hit_hazard = false;

        for obj in world.objects() {
            if let Some(hazard) = obj.kind.hazard() {
                if self.touches_hazard(&player.rect(), &obj.rect, hazard) {
                    player.hit_hazard = true;
                }
                continue;
            }
            if obj.is_solid() {
                self.resolve_solid(player, &obj.rect);
            }
        }

        let mut outcome = StepOutcome::default();
        if input.jump && player.grounded {
            player.vel.y = t.jump_power;
            player.grounded = false;
            outcome.jumped = true;
        }
        outcome.landed = player.grounded && !was_grounded;
        outcome
    }

    /// Hazard contact never moves the player
    fn touches_hazard(&self, body: &Rect, obj: &Rect, hazard: Hazard) -> bool {
        if !body.overlaps(obj) {
            return false;
        }
        let pad = self.collision.hazard_pad;
        match hazard {
            Hazard::Lava => true,
            Hazard::Spikes => body.overlaps_padded(obj, pad) && collision::feet_hit_spike(body, obj),
            Hazard::SpikesDown => {
                body.overlaps_padded(obj, pad) && collision::head_hit_spike_down(body, obj)
            }
        }
    }

    /// Minimum-penetration push-out, only against the direction of travel
    fn resolve_solid(&self, player: &mut Player, solid: &Rect) {
        let body = player.rect();
        if !body.overlaps_eroded(solid, self.collision.solid_epsilon) {
            return;
        }
        let Some(pen) = collision::penetration(&body, solid) else {
            return;
        };

        match pen.axis() {
            Axis::X => {
                if pen.delta.x > 0.0 && player.vel.x < 0.0 {
                    player.pos.x += pen.depth.x;
                    player.vel.x = 0.0;
                } else if pen.delta.x < 0.0 && player.vel.x > 0.0 {
                    player.pos.x -= pen.depth.x;
                    player.vel.x = 0.0;
                }
            }
            Axis::Y => {
                if pen.delta.y > 0.0 && player.vel.y < 0.0 {
                    // Ceiling
                    player.pos.y += pen.depth.y;
                    player.vel.y = 0.0;
                } else if pen.delta.y < 0.0 && player.vel.y > 0.0 {
                    // Floor
                    player.pos.y -= pen.depth.y;
                    player.vel.y = 0.0;
                    player.grounded = true;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::world::{KeyColor, ObjectKind, WorldObject};
    use proptest::prelude::*;

    const T: f32 = 40.0;

    fn resolver() -> Resolver {
        Resolver::new(PlayerTuning::default(), CollisionTuning::default())
    }

    fn ground_row(row: i32, cols: std::ops::Range<i32>) -> Vec<WorldObject> {
        cols.map(|c| WorldObject::new(c as f32 * T, row as f32 * T, T, T, ObjectKind::Ground))
            .collect()
    }

    fn player_at(x: f32, y: f32) -> Player {
        Player::new(Vec2::new(x, y), Vec2::new(40.0, 40.0))
    }

    #[test]
    fn test_fast_fall_lands_on_ground() {
        let world = World::new(ground_row(10, 0..10), 10, 11, T);
        // Feet 10 units above the ground top (400), falling fast
        let mut player = player_at(120.0, 350.0);
        player.vel = Vec2::new(0.0, 20.0);

        let outcome = resolver().step(&mut player, &world, &MoveInput::default());

        assert!(player.grounded);
        assert!(outcome.landed);
        assert_eq!(player.vel.y, 0.0);
        assert!((player.pos.y + player.size.y - 400.0).abs() < 1e-3);
    }

    #[test]
    fn test_resting_stays_grounded_and_can_jump() {
        let world = World::new(ground_row(10, 0..10), 10, 11, T);
        let mut player = player_at(120.0, 360.0);
        let r = resolver();

        // Gravity sinks 0.6 per step, past the 0.5 erosion, so contact registers every step
        for _ in 0..5 {
            r.step(&mut player, &world, &MoveInput::default());
        }
        assert!(player.grounded);
        assert!(player.pos.y + player.size.y <= 400.5 + 1e-3);

        let input = MoveInput {
            jump: true,
            ..Default::default()
        };
        let outcome = r.step(&mut player, &world, &input);
        assert!(outcome.jumped);
        assert!(!outcome.landed);
        assert!(!player.grounded);
        assert_eq!(player.vel.y, -12.5);
    }

    #[test]
    fn test_jump_ignored_in_air() {
        let world = World::new(Vec::new(), 10, 10, T);
        let mut player = player_at(0.0, 0.0);
        let input = MoveInput {
            jump: true,
            ..Default::default()
        };
        let outcome = resolver().step(&mut player, &world, &input);
        assert!(!outcome.jumped);
        assert!((player.vel.y - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_acceleration_clamp_and_friction() {
        let world = World::new(Vec::new(), 10, 10, T);
        let r = resolver();
        let mut player = player_at(0.0, 0.0);
        let right = MoveInput {
            right: true,
            ..Default::default()
        };
        for _ in 0..30 {
            r.step(&mut player, &world, &right);
        }
        assert!((player.vel.x - 5.2).abs() < 1e-5);

        // Both held: accelerations cancel and no friction applies
        let both = MoveInput {
            left: true,
            right: true,
            jump: false,
        };
        r.step(&mut player, &world, &both);
        assert!((player.vel.x - 5.2).abs() < 1e-5);

        for _ in 0..200 {
            r.step(&mut player, &world, &MoveInput::default());
        }
        assert_eq!(player.vel.x, 0.0);
    }

    #[test]
    fn test_wall_stops_horizontal_motion() {
        // Wall column at x = 200..240
        let objects = (0..5)
            .map(|r| WorldObject::new(200.0, r as f32 * T, T, T, ObjectKind::Block))
            .collect();
        let world = World::new(objects, 10, 5, T);
        let mut player = player_at(158.0, 60.0);
        player.vel.x = 5.0;
        let right = MoveInput {
            right: true,
            ..Default::default()
        };
        resolver().step(&mut player, &world, &right);
        assert!((player.pos.x + player.size.x - 200.0).abs() < 1e-3);
        assert_eq!(player.vel.x, 0.0);
    }

    #[test]
    fn test_leaving_wall_is_not_pushed_back() {
        let world = World::new(
            vec![WorldObject::new(200.0, 0.0, T, 4.0 * T, ObjectKind::Block)],
            10,
            5,
            T,
        );
        // Still 5.5 units inside the wall after moving, but heading away from it
        let mut player = player_at(170.0, 60.0);
        player.vel.x = -4.0;
        let left = MoveInput {
            left: true,
            ..Default::default()
        };
        resolver().step(&mut player, &world, &left);
        assert!(player.vel.x < 0.0);
        assert!((player.pos.x - (170.0 - 4.5)).abs() < 1e-3);
    }

    #[test]
    fn test_ceiling_bump_zeroes_upward_velocity() {
        let world = World::new(vec![WorldObject::new(0.0, 0.0, 4.0 * T, T, ObjectKind::Block)], 4, 4, T);
        let mut player = player_at(40.0, 45.0);
        player.vel.y = -12.5;
        resolver().step(&mut player, &world, &MoveInput::default());
        assert_eq!(player.vel.y, 0.0);
        assert!((player.pos.y - 40.0).abs() < 1e-3);
        assert!(!player.grounded);
    }

    #[test]
    fn test_hazards_flag_without_pushing() {
        let world = World::new(vec![WorldObject::new(0.0, 40.0, T, T, ObjectKind::Lava)], 4, 4, T);
        let mut player = player_at(0.0, 20.0);
        resolver().step(&mut player, &world, &MoveInput::default());
        assert!(player.hit_hazard);
        assert!((player.vel.y - 0.6).abs() < 1e-6);

        // Flag is per step: out of the lava it clears
        player.teleport(Vec2::new(120.0, 0.0));
        resolver().step(&mut player, &world, &MoveInput::default());
        assert!(!player.hit_hazard);
    }

    #[test]
    fn test_spike_graze_then_contact() {
        let world = World::new(vec![WorldObject::new(0.0, 400.0, T, T, ObjectKind::Spikes)], 1, 11, T);
        let r = resolver();

        // After gravity the bottom sample row sits two units above the apex (404.8)
        let mut player = player_at(0.0, 363.2);
        r.step(&mut player, &world, &MoveInput::default());
        assert!(player.rect().overlaps(&world.objects()[0].rect));
        assert!(!player.hit_hazard);

        // Three units further down
        let mut player = player_at(0.0, 366.2);
        r.step(&mut player, &world, &MoveInput::default());
        assert!(player.hit_hazard);
    }

    #[test]
    fn test_door_solid_until_opened() {
        let mut objects = ground_row(10, 0..10);
        objects.push(WorldObject::door(200.0, 240.0, T, 4.0 * T, Some(KeyColor::Red)));
        let mut world = World::new(objects, 10, 11, T);
        let r = resolver();
        let right = MoveInput {
            right: true,
            ..Default::default()
        };

        let mut player = player_at(158.0, 360.0);
        player.vel.x = 5.0;
        r.step(&mut player, &world, &right);
        assert_eq!(player.vel.x, 0.0);
        assert!(player.pos.x + player.size.x <= 200.0 + 1e-3);

        world.open_doors(KeyColor::Red);
        player.vel.x = 5.0;
        r.step(&mut player, &world, &right);
        assert!(player.pos.x + player.size.x > 200.0);
        assert!(player.vel.x > 0.0);
    }

    proptest! {
        #[test]
        fn falling_onto_ground_never_sinks(
            x in 40.0f32..300.0,
            gap in 0.0f32..30.0,
            vy in 0.0f32..18.0,
        ) {
            let world = World::new(ground_row(10, 0..10), 10, 11, T);
            let mut player = player_at(x, 400.0 - 40.0 - gap);
            player.vel.y = vy;
            resolver().step(&mut player, &world, &MoveInput::default());

            let bottom = player.pos.y + player.size.y;
            prop_assert!(bottom <= 400.0 + 0.5 + 1e-3, "bottom {} sank into ground", bottom);
            if player.grounded {
                prop_assert_eq!(player.vel.y, 0.0);
            }
        }

        #[test]
        fn walking_into_block_never_embeds(
            from_left in any::<bool>(),
            gap in 0.0f32..4.0,
            dy in -15.0f32..15.0,
            speed in 1.0f32..5.0,
        ) {
            let block = Rect::new(40.0, 40.0, T, T);
            let world = World::new(vec![WorldObject::new(40.0, 40.0, T, T, ObjectKind::Block)], 5, 5, T);
            let (x, vx) = if from_left { (-gap, speed) } else { (80.0 + gap, -speed) };
            let mut player = player_at(x, 40.0 + dy);
            player.vel.x = vx;
            resolver().step(&mut player, &world, &MoveInput::default());

            let eps = CollisionTuning::default().solid_epsilon;
            prop_assert!(!player.rect().overlaps_eroded(&block, eps), "embedded at {:?}", player.pos);
            // Idle friction scales the approach speed before integration
            let travel = speed * PlayerTuning::default().friction;
            if travel > gap + eps + 0.1 {
                prop_assert_eq!(player.vel.x, 0.0);
            }
        }

        #[test]
        fn jumping_into_block_never_embeds(
            dx in -10.0f32..10.0,
            gap in 0.0f32..4.0,
            speed in 1.0f32..18.0,
        ) {
            let block = Rect::new(40.0, 40.0, T, T);
            let world = World::new(vec![WorldObject::new(40.0, 40.0, T, T, ObjectKind::Block)], 5, 5, T);
            let mut player = player_at(40.0 + dx, 80.0 + gap);
            player.vel.y = -speed;
            resolver().step(&mut player, &world, &MoveInput::default());

            let eps = CollisionTuning::default().solid_epsilon;
            prop_assert!(!player.rect().overlaps_eroded(&block, eps), "embedded at {:?}", player.pos);
            let rise = speed - PlayerTuning::default().gravity;
            if rise > gap + eps + 0.1 {
                prop_assert!(player.pos.y >= 80.0 - 1e-3);
                prop_assert_eq!(player.vel.y, 0.0);
            }
        }
    }
}
