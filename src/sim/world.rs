//! World grid: typed rectangles and their solid/opaque classification
//!
//! Solidity and opacity are never stored on the objects. They are derived from
//! the object kind (and a door's `open` flag) each time they are asked for, so
//! a door opened by a key pickup is seen as passable by the very next query.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use crate::Cell;

/// Key/door colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum KeyColor {
    Red,
    Blue,
    Green,
    Yellow,
}

impl KeyColor {
    pub const ALL: [KeyColor; 4] = [KeyColor::Red, KeyColor::Blue, KeyColor::Green, KeyColor::Yellow];

    pub fn as_str(&self) -> &'static str {
        match self {
            KeyColor::Red => "red",
            KeyColor::Blue => "blue",
            KeyColor::Green => "green",
            KeyColor::Yellow => "yellow",
        }
    }

    /// Color for a level glyph, either case (`r`/`R`, `b`/`B`, ...)
    pub fn from_glyph(glyph: char) -> Option<Self> {
        match glyph.to_ascii_lowercase() {
            'r' => Some(KeyColor::Red),
            'b' => Some(KeyColor::Blue),
            'g' => Some(KeyColor::Green),
            'y' => Some(KeyColor::Yellow),
            _ => None,
        }
    }
}

/// The closed set of world object kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    Ground,
    Block,
    Door {
        open: bool,
        /// `None` for neutral doors, which no key opens
        color: Option<KeyColor>,
    },
    Lava,
    Spikes,
    SpikesDown,
    Goal,
}

/// What an object does to movement and sight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub solid: bool,
    pub opaque: bool,
}

/// Objects that kill on contact without blocking movement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hazard {
    /// Any overlap
    Lava,
    /// Feet inside the upward triangle
    Spikes,
    /// Head inside the downward triangle
    SpikesDown,
}

impl ObjectKind {
    /// Solid/opaque classification. Ground's opacity follows the global policy.
    pub fn classify(&self, ground_blocks_sight: bool) -> Classification {
        match *self {
            ObjectKind::Ground => Classification {
                solid: true,
                opaque: ground_blocks_sight,
            },
            ObjectKind::Block => Classification {
                solid: true,
                opaque: true,
            },
            ObjectKind::Door { open, .. } => Classification {
                solid: !open,
                opaque: !open,
            },
            ObjectKind::Lava | ObjectKind::Spikes | ObjectKind::SpikesDown | ObjectKind::Goal => {
                Classification {
                    solid: false,
                    opaque: false,
                }
            }
        }
    }

    #[inline]
    pub fn is_solid(&self) -> bool {
        // Solidity never depends on the sight policy
        self.classify(false).solid
    }

    #[inline]
    pub fn is_opaque(&self, ground_blocks_sight: bool) -> bool {
        self.classify(ground_blocks_sight).opaque
    }

    pub fn hazard(&self) -> Option<Hazard> {
        match self {
            ObjectKind::Lava => Some(Hazard::Lava),
            ObjectKind::Spikes => Some(Hazard::Spikes),
            ObjectKind::SpikesDown => Some(Hazard::SpikesDown),
            ObjectKind::Ground | ObjectKind::Block | ObjectKind::Door { .. } | ObjectKind::Goal => {
                None
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ObjectKind::Ground => "ground",
            ObjectKind::Block => "block",
            ObjectKind::Door { .. } => "door",
            ObjectKind::Lava => "lava",
            ObjectKind::Spikes => "spikes",
            ObjectKind::SpikesDown => "spikes-down",
            ObjectKind::Goal => "goal",
        }
    }
}

/// A typed rectangle in the level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldObject {
    pub rect: Rect,
    pub kind: ObjectKind,
}

impl WorldObject {
    pub fn new(x: f32, y: f32, width: f32, height: f32, kind: ObjectKind) -> Self {
        Self {
            rect: Rect::new(x, y, width, height),
            kind,
        }
    }

    /// A closed door
    pub fn door(x: f32, y: f32, width: f32, height: f32, color: Option<KeyColor>) -> Self {
        Self::new(x, y, width, height, ObjectKind::Door { open: false, color })
    }

    #[inline]
    pub fn is_solid(&self) -> bool {
        self.kind.is_solid()
    }

    #[inline]
    pub fn is_opaque(&self, ground_blocks_sight: bool) -> bool {
        self.kind.is_opaque(ground_blocks_sight)
    }
}

/// Inclusive range of cells covered by a rectangle, already clipped to the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub min: Cell,
    pub max: Cell,
}

impl CellRange {
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (self.min.row..=self.max.row)
            .flat_map(move |row| (self.min.col..=self.max.col).map(move |col| Cell::new(col, row)))
    }
}

/// The level's objects plus the grid they live on
///
/// Objects are only ever changed through [`World::open_doors`]; the resolver and
/// field of view read them through [`World::objects`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct World {
    objects: Vec<WorldObject>,
    cols: u32,
    rows: u32,
    tile_size: f32,
}

impl World {
    pub fn new(objects: Vec<WorldObject>, cols: u32, rows: u32, tile_size: f32) -> Self {
        Self {
            objects,
            cols,
            rows,
            tile_size,
        }
    }

    #[inline]
    pub fn objects(&self) -> &[WorldObject] {
        &self.objects
    }

    #[inline]
    pub fn cols(&self) -> u32 {
        self.cols
    }

    #[inline]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    #[inline]
    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// World extent in world units
    pub fn pixel_size(&self) -> Vec2 {
        Vec2::new(self.cols as f32, self.rows as f32) * self.tile_size
    }

    #[inline]
    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.col >= 0 && cell.row >= 0 && cell.col < self.cols as i32 && cell.row < self.rows as i32
    }

    /// First goal object, if the level has one
    pub fn goal(&self) -> Option<&WorldObject> {
        self.objects.iter().find(|o| o.kind == ObjectKind::Goal)
    }

    /// Open every closed door of `color`. Returns how many doors changed.
    pub fn open_doors(&mut self, color: KeyColor) -> usize {
        let mut opened = 0;
        for obj in &mut self.objects {
            if let ObjectKind::Door { open, color: Some(door_color) } = &mut obj.kind {
                if !*open && *door_color == color {
                    *open = true;
                    opened += 1;
                }
            }
        }
        if opened > 0 {
            log::debug!("Opened {} {} door(s)", opened, color.as_str());
        }
        opened
    }

    /// Cells covered by `rect`: `floor(x/t) ..= floor((x+w-1)/t)` on each axis,
    /// clipped to the grid. `None` when nothing remains after clipping.
    pub fn cell_range(&self, rect: &Rect) -> Option<CellRange> {
        let t = self.tile_size;
        let c0 = (rect.left() / t).floor() as i32;
        let r0 = (rect.top() / t).floor() as i32;
        let c1 = ((rect.right() - 1.0) / t).floor() as i32;
        let r1 = ((rect.bottom() - 1.0) / t).floor() as i32;

        let min = Cell::new(c0.max(0), r0.max(0));
        let max = Cell::new(c1.min(self.cols as i32 - 1), r1.min(self.rows as i32 - 1));
        (min.col <= max.col && min.row <= max.row).then_some(CellRange { min, max })
    }

    /// Rasterize every object matching `pred` onto a fresh grid
    pub fn rasterize(&self, mut pred: impl FnMut(&ObjectKind) -> bool) -> CellGrid {
        let mut grid = CellGrid::new(self.cols, self.rows);
        for obj in self.objects.iter().filter(|o| pred(&o.kind)) {
            if let Some(range) = self.cell_range(&obj.rect) {
                for cell in range.cells() {
                    grid.set(cell, true);
                }
            }
        }
        grid
    }

    /// Cells that currently block sight
    pub fn opacity_grid(&self, ground_blocks_sight: bool) -> CellGrid {
        self.rasterize(|kind| kind.is_opaque(ground_blocks_sight))
    }

    /// Cells that currently block movement
    pub fn solidity_grid(&self) -> CellGrid {
        self.rasterize(ObjectKind::is_solid)
    }
}

/// A `cols x rows` boolean table. Out-of-bounds reads are `false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellGrid {
    cols: u32,
    rows: u32,
    cells: Vec<bool>,
}

impl CellGrid {
    pub fn new(cols: u32, rows: u32) -> Self {
        Self {
            cols,
            rows,
            cells: vec![false; cols as usize * rows as usize],
        }
    }

    #[inline]
    fn index(&self, cell: Cell) -> Option<usize> {
        if cell.col < 0 || cell.row < 0 || cell.col >= self.cols as i32 || cell.row >= self.rows as i32 {
            return None;
        }
        Some(cell.row as usize * self.cols as usize + cell.col as usize)
    }

    #[inline]
    pub fn get(&self, cell: Cell) -> bool {
        self.index(cell).is_some_and(|i| self.cells[i])
    }

    /// Writes outside the grid are ignored
    #[inline]
    pub fn set(&mut self, cell: Cell, value: bool) {
        if let Some(i) = self.index(cell) {
            self.cells[i] = value;
        }
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }
}
