//! Frame tick
//!
//! Advances the game by one rendered frame: movement, play time, gameplay
//! rules, visibility and camera, in that order.

use super::physics::MoveInput;
use super::state::{GameEvent, GameState};

/// Input for a single frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    /// Pause toggle (edge, not held)
    pub pause: bool,
}

impl TickInput {
    pub fn movement(&self) -> MoveInput {
        MoveInput {
            left: self.left,
            right: self.right,
            jump: self.jump,
        }
    }
}

/// Advance the game by one frame. `dt` is wall-clock seconds since the last
/// frame and only feeds the play-time counter.
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.events.clear();

    if input.pause {
        state.toggle_pause();
    }
    if state.paused || state.level_complete {
        return;
    }

    let dt = state.settings.clamp_dt(dt);

    let outcome = state
        .resolver
        .step(&mut state.player, &state.world, &input.movement());
    if outcome.jumped {
        state.events.push(GameEvent::Jumped {
            at: state.player.feet(),
        });
    }
    if outcome.landed {
        state.events.push(GameEvent::Landed {
            at: state.player.feet(),
        });
    }

    state.stats.time += dt;
    if state.player.hit_hazard {
        state.die();
    } else {
        apply_pickups(state);
    }

    state.refresh_visibility();
    state.follow_camera();
}

/// Coins, keys, checkpoints and the goal, by plain overlap with the player
fn apply_pickups(state: &mut GameState) {
    let body = state.player.rect();

    let coins = state.entities.collect_coins(&body);
    for _ in 0..coins {
        state.stats.coins += 1;
        state.events.push(GameEvent::CoinCollected {
            total: state.stats.coins,
        });
    }

    for color in state.entities.pick_keys(&body) {
        state.stats.keys_total += 1;
        let count = state.stats.keys_by_color.entry(color).or_insert(0);
        *count += 1;
        let total_for_color = *count;
        state.events.push(GameEvent::KeyPicked {
            color,
            total_for_color,
        });
        let opened = state.world.open_doors(color);
        if opened > 0 {
            state.events.push(GameEvent::DoorsOpened {
                color,
                count: opened,
            });
        }
    }

    if let Some(id) = state.entities.touched_checkpoint(&body) {
        state.activate_checkpoint(id, false);
    }

    let reached_goal = state
        .world
        .goal()
        .is_some_and(|goal| body.overlaps(&goal.rect));
    if reached_goal {
        state.level_complete = true;
        log::info!(
            "Level '{}' complete in {:.1}s ({} coins, {} deaths)",
            state.level.name,
            state.stats.time,
            state.stats.coins,
            state.stats.deaths
        );
        state.events.push(GameEvent::LevelComplete {
            time: state.stats.time,
        });
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::consts::MAX_FRAME_DT;
    use crate::level::Level;
    use crate::settings::Settings;
    use crate::sim::world::KeyColor;
    use crate::Cell;

    const FRAME: f32 = 1.0 / 60.0;

    // Red door column 6 (rows 0..=3), red key at (3, 3), coin at (2, 2), goal at (9, 3)
    const DOOR_LEVEL: &str = "\
..........
..........
..o.......
.P.r..R..A
==========";

    const LAVA_LEVEL: &str = "\
..........
..........
.P..C.....
=====~~===";

    fn start(text: &str) -> GameState {
        let level = Level::parse("test", text).expect("level parses");
        GameState::new(level, Settings::default())
    }

    fn place(state: &mut GameState, x: f32, y: f32) {
        state.player.teleport(Vec2::new(x, y));
    }

    #[test]
    fn test_pause_toggles_and_freezes() {
        let mut state = start(DOOR_LEVEL);
        let before = state.player.clone();

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, FRAME);
        assert!(state.paused);
        tick(&mut state, &TickInput::default(), FRAME);
        assert_eq!(state.player, before);
        assert_eq!(state.stats.time, 0.0);

        tick(&mut state, &pause, FRAME);
        assert!(!state.paused);
        assert!(state.player.pos.y > before.pos.y);
    }

    #[test]
    fn test_fall_lands_then_jumps() {
        let mut state = start(DOOR_LEVEL);
        let mut landed = false;
        for _ in 0..60 {
            tick(&mut state, &TickInput::default(), FRAME);
            landed |= state
                .events
                .iter()
                .any(|e| matches!(e, GameEvent::Landed { .. }));
        }
        assert!(landed);
        assert!(state.player.grounded);
        assert!((state.player.pos.y - 120.0).abs() < 1e-3);

        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        tick(&mut state, &jump, FRAME);
        assert!(
            state
                .events
                .iter()
                .any(|e| matches!(e, GameEvent::Jumped { .. }))
        );
        assert!(state.player.vel.y < 0.0);
    }

    #[test]
    fn test_key_opens_door_for_movement_and_sight() {
        let mut state = start(DOOR_LEVEL);
        let door = Cell::new(6, 3);
        let beyond = Cell::new(8, 3);

        place(&mut state, 120.0, 120.0);
        state.refresh_visibility();
        assert!(state.world.solidity_grid().get(door));
        assert!(state.world.opacity_grid(true).get(door));
        assert!(!state.visible.contains(beyond));

        tick(&mut state, &TickInput::default(), FRAME);

        assert!(!state.world.solidity_grid().get(door));
        assert!(!state.world.opacity_grid(true).get(door));
        assert!(state.visible.contains(door));
        assert!(state.visible.contains(beyond));
        assert_eq!(state.stats.keys_total, 1);
        assert_eq!(state.stats.keys_of(KeyColor::Red), 1);
        assert!(state.events.contains(&GameEvent::KeyPicked {
            color: KeyColor::Red,
            total_for_color: 1,
        }));
        assert!(state.events.contains(&GameEvent::DoorsOpened {
            color: KeyColor::Red,
            count: 1,
        }));
    }

    #[test]
    fn test_coin_collected_once() {
        let mut state = start(DOOR_LEVEL);
        place(&mut state, 80.0, 80.0);
        tick(&mut state, &TickInput::default(), FRAME);
        assert_eq!(state.stats.coins, 1);
        assert_eq!(state.events, vec![GameEvent::CoinCollected { total: 1 }]);

        tick(&mut state, &TickInput::default(), FRAME);
        assert_eq!(state.stats.coins, 1);
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_touching_checkpoint_activates_it() {
        let mut state = start(LAVA_LEVEL);
        place(&mut state, 160.0, 40.0);
        tick(&mut state, &TickInput::default(), FRAME);
        assert_eq!(
            state.events,
            vec![GameEvent::CheckpointActivated {
                id: 0,
                name: "Checkpoint 1".to_string(),
            }]
        );
        assert_eq!(state.respawn_point(), Vec2::new(160.0, 40.0));
    }

    #[test]
    fn test_lava_death_respawns_at_checkpoint() {
        let mut state = start(LAVA_LEVEL);
        assert!(state.activate_checkpoint(0, false));

        place(&mut state, 200.0, 81.0);
        tick(&mut state, &TickInput::default(), FRAME);

        assert_eq!(state.events, vec![GameEvent::Death { deaths: 1 }]);
        assert_eq!(state.stats.deaths, 1);
        assert_eq!(state.player.pos, Vec2::new(160.0, 40.0));
        assert_eq!(state.player.vel, Vec2::ZERO);
        assert!(!state.player.hit_hazard);
    }

    #[test]
    fn test_goal_completes_and_freezes() {
        let mut state = start(DOOR_LEVEL);
        place(&mut state, 360.0, 80.0);
        tick(&mut state, &TickInput::default(), FRAME);
        assert!(state.level_complete);
        // The finishing frame counts toward the reported time
        assert_eq!(
            state.events,
            vec![GameEvent::LevelComplete {
                time: state.stats.time
            }]
        );
        assert!((state.stats.time - FRAME).abs() < 1e-6);

        let pos = state.player.pos;
        let right = TickInput {
            right: true,
            ..Default::default()
        };
        tick(&mut state, &right, FRAME);
        assert_eq!(state.player.pos, pos);
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_play_time_uses_clamped_dt() {
        let mut state = start(DOOR_LEVEL);
        tick(&mut state, &TickInput::default(), 1.0);
        assert!((state.stats.time - MAX_FRAME_DT).abs() < 1e-6);
        tick(&mut state, &TickInput::default(), -0.5);
        assert!((state.stats.time - MAX_FRAME_DT).abs() < 1e-6);
    }

    #[test]
    fn test_restart_closes_doors() {
        let mut state = start(DOOR_LEVEL);
        place(&mut state, 120.0, 120.0);
        tick(&mut state, &TickInput::default(), FRAME);
        assert!(!state.world.solidity_grid().get(Cell::new(6, 3)));

        state.restart();
        assert!(state.world.solidity_grid().get(Cell::new(6, 3)));
        assert_eq!(state.stats.keys_total, 0);
    }
}
