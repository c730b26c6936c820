//! Integer rectangles
//!
//! Rectangles are half-open: `x..x + w` by `y..y + h`. An empty rectangle
//! has a non-positive width or height. Edges saturate at the `i32` range,
//! so far off-surface coordinates clip instead of overflowing.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in surface coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

/// Corner coordinates are held within this magnitude so a normalized
/// width always fits in `i32`
const CORNER_LIMIT: i32 = 1 << 30;

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle from inclusive corner coordinates, in any order
    ///
    /// Corners are clamped to `±2^30` first.
    pub fn from_corners(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        let clamp = |v: i32| v.clamp(-CORNER_LIMIT, CORNER_LIMIT - 1);
        let (x0, x1, y0, y1) = (clamp(x0), clamp(x1), clamp(y0), clamp(y1));
        let (xs, xe) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        let (ys, ye) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
        Self::new(xs, ys, xe - xs + 1, ye - ys + 1)
    }

    /// Exclusive right edge
    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.w)
    }

    /// Exclusive bottom edge
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.h)
    }

    pub const fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Overlap of two rectangles; empty when they do not touch
    pub fn intersect(&self, other: &Rect) -> Rect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let r = self.right().min(other.right());
        let b = self.bottom().min(other.bottom());
        let w = (r as i64 - x as i64).max(0) as i32;
        let h = (b as i64 - y as i64).max(0) as i32;
        Rect::new(x, y, w, h)
    }

    /// Number of pixels covered
    pub fn area(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.w as usize * self.h as usize
        }
    }
}
