//! Field of view: which tiles the player can see this frame
//!
//! Recomputed from scratch every frame:
//! 1. Rasterize the currently opaque objects onto the grid
//! 2. Mark the player's cell and the Chebyshev ring around it (never occluded)
//! 3. Cast a Bresenham ray to every cell of the disc of radius `R + 0.15`.
//!    A ray marks each cell it enters and stops on the first opaque one.
//!    A diagonal step whose orthogonal neighbors contain an opaque cell stops
//!    the ray there (the neighbor wall is marked, the far cell is not), so
//!    sight never slips between two corner-touching walls.

use glam::Vec2;

use super::world::{CellGrid, World};
use crate::settings::VisibilityConfig;
use crate::{Cell, cell_of};

/// Extra reach added to the radius so the disc edge rounds outward
const DISC_MARGIN: f32 = 0.15;

/// Cells visible this frame, sorted row-major, no duplicates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibleTiles {
    cells: Vec<Cell>,
}

impl VisibleTiles {
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.cells.binary_search(&cell).is_ok()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells.iter().copied()
    }
}

/// Cells of a Bresenham line, excluding the start, ending on the target
#[derive(Debug, Clone)]
pub struct Line {
    cur: Cell,
    to: Cell,
    dx: i32,
    dy: i32,
    sx: i32,
    sy: i32,
    err: i32,
}

impl Line {
    pub fn new(from: Cell, to: Cell) -> Self {
        let dx = (to.col - from.col).abs();
        let dy = (to.row - from.row).abs();
        Self {
            cur: from,
            to,
            dx,
            dy,
            sx: if from.col < to.col { 1 } else { -1 },
            sy: if from.row < to.row { 1 } else { -1 },
            err: dx - dy,
        }
    }
}

impl Iterator for Line {
    type Item = Cell;

    fn next(&mut self) -> Option<Cell> {
        if self.cur == self.to {
            return None;
        }
        let e2 = 2 * self.err;
        if e2 > -self.dy {
            self.err -= self.dy;
            self.cur.col += self.sx;
        }
        if e2 < self.dx {
            self.err += self.dx;
            self.cur.row += self.sy;
        }
        Some(self.cur)
    }
}

/// Scratch marks over the clipped window around the player
struct Marks {
    min: Cell,
    max: Cell,
    width: usize,
    cells: Vec<bool>,
}

impl Marks {
    fn new(min: Cell, max: Cell) -> Self {
        let width = (max.col - min.col + 1) as usize;
        let height = (max.row - min.row + 1) as usize;
        Self {
            min,
            max,
            width,
            cells: vec![false; width * height],
        }
    }

    #[inline]
    fn mark(&mut self, cell: Cell) {
        if cell.col < self.min.col
            || cell.row < self.min.row
            || cell.col > self.max.col
            || cell.row > self.max.row
        {
            return;
        }
        let i = (cell.row - self.min.row) as usize * self.width + (cell.col - self.min.col) as usize;
        self.cells[i] = true;
    }

    fn into_tiles(self) -> VisibleTiles {
        let Marks {
            min, width, cells, ..
        } = self;
        let cells = cells
            .iter()
            .enumerate()
            .filter(|&(_, &seen)| seen)
            .map(|(i, _)| Cell::new(min.col + (i % width) as i32, min.row + (i / width) as i32))
            .collect();
        VisibleTiles { cells }
    }
}

/// Walk one ray, reporting every cell it reveals
pub fn cast_ray(opaque: &CellGrid, from: Cell, to: Cell, mut reveal: impl FnMut(Cell)) {
    let mut prev = from;
    for next in Line::new(from, to) {
        if next.col != prev.col && next.row != prev.row {
            let side_a = Cell::new(next.col, prev.row);
            let side_b = Cell::new(prev.col, next.row);
            let blocked_a = opaque.get(side_a);
            let blocked_b = opaque.get(side_b);
            if blocked_a || blocked_b {
                if blocked_a {
                    reveal(side_a);
                }
                if blocked_b {
                    reveal(side_b);
                }
                return;
            }
        }
        reveal(next);
        if opaque.get(next) {
            return;
        }
        prev = next;
    }
}

/// Bounded-radius visibility over the world grid
#[derive(Debug, Clone)]
pub struct FieldOfView {
    config: VisibilityConfig,
}

impl FieldOfView {
    pub fn new(config: VisibilityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &VisibilityConfig {
        &self.config
    }

    /// Cell under a world point, clamped into the grid
    pub fn origin_cell(world: &World, point: Vec2) -> Option<Cell> {
        if world.cols() == 0 || world.rows() == 0 {
            return None;
        }
        let cell = cell_of(point, world.tile_size());
        Some(Cell::new(
            cell.col.clamp(0, world.cols() as i32 - 1),
            cell.row.clamp(0, world.rows() as i32 - 1),
        ))
    }

    /// Visible tiles for a player whose center is at `center`
    pub fn compute(&self, world: &World, center: Vec2) -> VisibleTiles {
        let Some(origin) = Self::origin_cell(world, center) else {
            return VisibleTiles::default();
        };
        let opaque = world.opacity_grid(self.config.ground_blocks_sight);
        self.compute_from(&opaque, origin)
    }

    /// Visible tiles from `origin` over a prebuilt opacity grid
    pub fn compute_from(&self, opaque: &CellGrid, origin: Cell) -> VisibleTiles {
        let cols = opaque.cols() as i32;
        let rows = opaque.rows() as i32;
        if cols == 0 || rows == 0 {
            return VisibleTiles::default();
        }
        let origin = Cell::new(origin.col.clamp(0, cols - 1), origin.row.clamp(0, rows - 1));
        // No cell lies farther than cols + rows from the origin
        let span = cols.saturating_add(rows);
        let radius = i32::try_from(self.config.radius).unwrap_or(i32::MAX).min(span);
        let ring = i32::try_from(self.config.near_always).unwrap_or(i32::MAX).min(span);

        // Window covering both the ray disc and the near ring
        let reach = radius.max(ring);
        let mut marks = Marks::new(
            Cell::new((origin.col - reach).max(0), (origin.row - reach).max(0)),
            Cell::new((origin.col + reach).min(cols - 1), (origin.row + reach).min(rows - 1)),
        );

        marks.mark(origin);
        for dr in -ring..=ring {
            for dc in -ring..=ring {
                marks.mark(Cell::new(origin.col + dc, origin.row + dr));
            }
        }

        let limit = (radius as f32 + DISC_MARGIN).powi(2);
        for row in (origin.row - radius).max(0)..=(origin.row + radius).min(rows - 1) {
            for col in (origin.col - radius).max(0)..=(origin.col + radius).min(cols - 1) {
                let dc = col - origin.col;
                let dr = row - origin.row;
                if (dc * dc + dr * dr) as f32 > limit {
                    continue;
                }
                cast_ray(opaque, origin, Cell::new(col, row), |cell| marks.mark(cell));
            }
        }

        marks.into_tiles()
    }
}
