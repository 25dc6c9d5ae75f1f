//! Pickups and checkpoints
//!
//! These never block movement or sight. They are collected by plain box
//! overlap with the player after each resolver step.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::world::KeyColor;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub rect: Rect,
    pub collected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Key {
    pub rect: Rect,
    pub color: KeyColor,
    pub picked: bool,
}

/// A named respawn point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Order of appearance in the level text
    pub id: usize,
    pub rect: Rect,
    pub col: i32,
    pub row: i32,
    pub name: String,
    /// Where the player reappears (top-left)
    pub respawn: Vec2,
    pub active: bool,
}

/// Everything in a level that is picked up or activated rather than collided with
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entities {
    pub coins: Vec<Coin>,
    pub keys: Vec<Key>,
    pub checkpoints: Vec<Checkpoint>,
}

/// Summary row for checkpoint pickers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointInfo {
    pub id: usize,
    pub name: String,
    pub col: i32,
    pub row: i32,
    pub active: bool,
}

impl Entities {
    /// Mark every uncollected coin under `body` as collected. Returns how many.
    pub fn collect_coins(&mut self, body: &Rect) -> u32 {
        let mut collected = 0;
        for coin in self.coins.iter_mut().filter(|c| !c.collected) {
            if body.overlaps(&coin.rect) {
                coin.collected = true;
                collected += 1;
            }
        }
        collected
    }

    /// Pick up every key under `body`. Returns the picked colors in level order.
    pub fn pick_keys(&mut self, body: &Rect) -> Vec<KeyColor> {
        self.keys
            .iter_mut()
            .filter(|k| !k.picked && body.overlaps(&k.rect))
            .map(|k| {
                k.picked = true;
                k.color
            })
            .collect()
    }

    /// First inactive checkpoint under `body`
    pub fn touched_checkpoint(&self, body: &Rect) -> Option<usize> {
        self.checkpoints
            .iter()
            .find(|cp| !cp.active && body.overlaps(&cp.rect))
            .map(|cp| cp.id)
    }

    /// Make `id` the only active checkpoint
    pub fn activate_checkpoint(&mut self, id: usize) -> Option<&Checkpoint> {
        if !self.checkpoints.iter().any(|cp| cp.id == id) {
            return None;
        }
        for cp in &mut self.checkpoints {
            cp.active = cp.id == id;
        }
        self.checkpoints.iter().find(|cp| cp.id == id)
    }

    pub fn checkpoint_list(&self) -> Vec<CheckpointInfo> {
        self.checkpoints
            .iter()
            .map(|cp| CheckpointInfo {
                id: cp.id,
                name: cp.name.clone(),
                col: cp.col,
                row: cp.row,
                active: cp.active,
            })
            .collect()
    }

    pub fn coins_remaining(&self) -> usize {
        self.coins.iter().filter(|c| !c.collected).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkpoint(id: usize, col: i32) -> Checkpoint {
        Checkpoint {
            id,
            rect: Rect::new(col as f32 * 40.0, 0.0, 40.0, 40.0),
            col,
            row: 0,
            name: format!("Checkpoint {}", id + 1),
            respawn: Vec2::new(col as f32 * 40.0, -40.0),
            active: false,
        }
    }

    #[test]
    fn test_coins_collected_once() {
        let mut entities = Entities {
            coins: vec![Coin {
                rect: Rect::new(8.0, 8.0, 24.0, 24.0),
                collected: false,
            }],
            ..Default::default()
        };
        let body = Rect::new(0.0, 0.0, 40.0, 40.0);
        assert_eq!(entities.collect_coins(&body), 1);
        assert_eq!(entities.collect_coins(&body), 0);
        assert_eq!(entities.coins_remaining(), 0);
    }

    #[test]
    fn test_keys_picked_once() {
        let mut entities = Entities {
            keys: vec![
                Key {
                    rect: Rect::new(10.0, 10.0, 20.0, 20.0),
                    color: KeyColor::Blue,
                    picked: false,
                },
                Key {
                    rect: Rect::new(90.0, 10.0, 20.0, 20.0),
                    color: KeyColor::Red,
                    picked: false,
                },
            ],
            ..Default::default()
        };
        let body = Rect::new(0.0, 0.0, 40.0, 40.0);
        assert_eq!(entities.pick_keys(&body), vec![KeyColor::Blue]);
        assert!(entities.pick_keys(&body).is_empty());
    }

    #[test]
    fn test_single_active_checkpoint() {
        let mut entities = Entities {
            checkpoints: vec![checkpoint(0, 0), checkpoint(1, 5)],
            ..Default::default()
        };
        assert_eq!(entities.touched_checkpoint(&Rect::new(200.0, 0.0, 40.0, 40.0)), Some(1));
        entities.activate_checkpoint(0);
        entities.activate_checkpoint(1);
        let active: Vec<bool> = entities.checkpoint_list().iter().map(|c| c.active).collect();
        assert_eq!(active, vec![false, true]);
        // Active checkpoints are not re-triggered
        assert_eq!(entities.touched_checkpoint(&Rect::new(200.0, 0.0, 40.0, 40.0)), None);
        assert!(entities.activate_checkpoint(7).is_none());
    }
}
