//! Simulation module
//!
//! All gameplay logic lives here. Nothing in this module renders, plays audio
//! or reads the clock:
//! - Per-frame steps, no sub-stepping
//! - Stable iteration order (level order for objects and entities)
//! - Side effects surface as `GameEvent`s

pub mod camera;
pub mod collision;
pub mod entities;
pub mod fov;
pub mod physics;
pub mod state;
pub mod tick;
pub mod world;

pub use camera::Camera;
pub use collision::{Axis, Penetration, Rect, Triangle, penetration};
pub use entities::{Checkpoint, CheckpointInfo, Coin, Entities, Key};
pub use fov::{FieldOfView, Line, VisibleTiles, cast_ray};
pub use physics::{MoveInput, Player, Resolver, StepOutcome};
pub use state::{ActiveCheckpoint, GameEvent, GameState, Stats};
pub use tick::{TickInput, tick};
pub use world::{CellGrid, CellRange, Classification, Hazard, KeyColor, ObjectKind, World, WorldObject};
