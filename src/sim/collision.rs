//! Collision primitives for axis-aligned boxes and spike triangles
//!
//! World space is y-down: `pos` is the top-left corner and `bottom()` is the
//! larger y. Everything here is pure geometry; the resolver in `physics`
//! decides what to do with the answers.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    #[inline]
    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    #[inline]
    pub fn half_extents(&self) -> Vec2 {
        self.size * 0.5
    }

    /// Strict overlap (touching edges do not count)
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.overlaps_inset(other, 0.0)
    }

    /// Overlap against `other` shrunk by `inset` on every side.
    /// A negative inset grows `other` instead.
    #[inline]
    pub fn overlaps_inset(&self, other: &Rect, inset: f32) -> bool {
        self.left() < other.right() - inset
            && self.right() > other.left() + inset
            && self.top() < other.bottom() - inset
            && self.bottom() > other.top() + inset
    }

    /// Overlap against `other` eroded by `eps` (solid contact test)
    #[inline]
    pub fn overlaps_eroded(&self, other: &Rect, eps: f32) -> bool {
        self.overlaps_inset(other, eps)
    }

    /// Overlap against `other` grown by `pad` (hazard broad phase)
    #[inline]
    pub fn overlaps_padded(&self, other: &Rect, pad: f32) -> bool {
        self.overlaps_inset(other, -pad)
    }
}

/// Separating axis chosen by minimum-penetration resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Overlap of a moving box against a solid, measured center to center
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Penetration {
    /// `mover.center - solid.center`
    pub delta: Vec2,
    /// Correction needed on each axis to separate (`half_sum - |delta|`)
    pub depth: Vec2,
}

impl Penetration {
    /// Axis with the smaller required correction (ties go to Y)
    pub fn axis(&self) -> Axis {
        if self.depth.x < self.depth.y {
            Axis::X
        } else {
            Axis::Y
        }
    }
}

/// Penetration of `mover` into `solid`, if their centers are close enough to overlap
pub fn penetration(mover: &Rect, solid: &Rect) -> Option<Penetration> {
    let delta = mover.center() - solid.center();
    let half_sum = mover.half_extents() + solid.half_extents();
    if delta.x.abs() < half_sum.x && delta.y.abs() < half_sum.y {
        Some(Penetration {
            delta,
            depth: half_sum - delta.abs(),
        })
    } else {
        None
    }
}

/// A triangle used for spike hit tests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub a: Vec2,
    pub b: Vec2,
    pub c: Vec2,
}

impl Triangle {
    /// Same-sign test over the three edges. Points exactly on an edge are outside.
    pub fn contains(&self, p: Vec2) -> bool {
        fn side(p1: Vec2, p2: Vec2, p3: Vec2) -> f32 {
            (p1.x - p3.x) * (p2.y - p3.y) - (p2.x - p3.x) * (p1.y - p3.y)
        }
        let b1 = side(p, self.a, self.b) < 0.0;
        let b2 = side(p, self.b, self.c) < 0.0;
        let b3 = side(p, self.c, self.a) < 0.0;
        b1 == b2 && b2 == b3
    }
}

/// Spike geometry margin: at least 4 units or 12% of the extent
#[inline]
fn spike_margin(extent: f32) -> f32 {
    (extent * 0.12).max(4.0)
}

/// Upward spike (`^`): apex near the top, base one unit above the bottom
pub fn spike_triangle(obj: &Rect) -> Triangle {
    let margin_x = spike_margin(obj.size.x);
    let base_y = obj.bottom() - 1.0;
    Triangle {
        a: Vec2::new(obj.pos.x + obj.size.x * 0.5, obj.pos.y + spike_margin(obj.size.y)),
        b: Vec2::new(obj.left() + margin_x, base_y),
        c: Vec2::new(obj.right() - margin_x, base_y),
    }
}

/// Downward spike (`v`): base one unit below the top, apex near the bottom
pub fn spike_down_triangle(obj: &Rect) -> Triangle {
    let margin_x = spike_margin(obj.size.x);
    let base_y = obj.top() + 1.0;
    Triangle {
        a: Vec2::new(obj.pos.x + obj.size.x * 0.5, obj.bottom() - spike_margin(obj.size.y)),
        b: Vec2::new(obj.left() + margin_x, base_y),
        c: Vec2::new(obj.right() - margin_x, base_y),
    }
}

/// Five sample columns across the body: both edges inset 2 units plus quarters
fn sample_columns(body: &Rect) -> [f32; 5] {
    let x = body.pos.x;
    let w = body.size.x;
    [x + 2.0, x + w * 0.25, x + w * 0.5, x + w * 0.75, x + w - 2.0]
}

fn any_sample_inside(body: &Rect, rows: [f32; 2], tri: &Triangle) -> bool {
    let columns = sample_columns(body);
    rows.iter()
        .any(|&y| columns.iter().any(|&x| tri.contains(Vec2::new(x, y))))
}

/// Feet against an upward spike: samples along the bottom edge and 6 units above it
pub fn feet_hit_spike(body: &Rect, spike: &Rect) -> bool {
    let rows = [body.bottom() - 1.0, body.bottom() - 6.0];
    any_sample_inside(body, rows, &spike_triangle(spike))
}

/// Head against a downward spike: samples along the top edge and 6 units below it
pub fn head_hit_spike_down(body: &Rect, spike: &Rect) -> bool {
    let rows = [body.top() + 1.0, body.top() + 6.0];
    any_sample_inside(body, rows, &spike_down_triangle(spike))
}
