//! Rotate and zoom blits
//!
//! The inverse transform (destination pixel to source pixel) is set up
//! once in 16.16 fixed point; the per-pixel loop only adds the matrix
//! columns to two accumulators and samples the nearest source pixel.

use crate::compose::{Compositor, PushOptions};
use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::sprite::Sprite;
use crate::traits::{batched, Surface};

/// Fractional bits of the fixed-point format
pub const FIXED_SHIFT: u32 = 16;

/// 1.0 in 16.16 fixed point
pub const FIXED_ONE: i32 = 1 << FIXED_SHIFT;

const FIXED_HALF: i64 = (FIXED_ONE / 2) as i64;

/// Inverse rotation+scale matrix in 16.16 fixed point
///
/// Maps a destination offset from the anchor to a source offset from the
/// pivot: `u = m00*dx + m01*dy`, `v = m10*dx + m11*dy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InverseMatrix {
    pub m00: i64,
    pub m01: i64,
    pub m10: i64,
    pub m11: i64,
}

fn to_fixed(v: f32) -> i64 {
    libm::roundf(v * FIXED_ONE as f32) as i64
}

/// Normalize an angle in degrees into [0, 360)
pub fn normalize_angle(degrees: f32) -> f32 {
    let a = libm::fmodf(degrees, 360.0);
    let a = if a < 0.0 { a + 360.0 } else { a };
    if a >= 360.0 {
        0.0
    } else {
        a
    }
}

/// Precomputed transform for one blit
#[derive(Debug, Clone, Copy)]
pub struct Transform {
    inverse: InverseMatrix,
    /// Destination bounding box before clipping
    bounds: Rect,
}

impl Transform {
    /// Set up a blit of a `width` x `height` source whose `pivot` lands on
    /// `anchor`
    pub fn new(
        width: u32,
        height: u32,
        pivot: (i32, i32),
        anchor: (i32, i32),
        angle: f32,
        zoom_x: f32,
        zoom_y: f32,
    ) -> Result<Self> {
        let valid = |z: f32| z.is_finite() && z > 0.0;
        if !valid(zoom_x) || !valid(zoom_y) || !angle.is_finite() {
            return Err(Error::DegenerateTransform);
        }

        let rad = normalize_angle(angle) * (core::f32::consts::PI / 180.0);
        let (sin, cos) = (libm::sinf(rad), libm::cosf(rad));
        let inverse = InverseMatrix {
            m00: to_fixed(cos / zoom_x),
            m01: to_fixed(sin / zoom_x),
            m10: to_fixed(-sin / zoom_y),
            m11: to_fixed(cos / zoom_y),
        };
        if (inverse.m00 == 0 && inverse.m01 == 0) || (inverse.m10 == 0 && inverse.m11 == 0) {
            // Zoom so large the fixed-point step underflows
            return Err(Error::DegenerateTransform);
        }

        // Forward-transform the source corners for the destination bounds
        let (px, py) = (pivot.0 as f32, pivot.1 as f32);
        let corners = [
            (0.0, 0.0),
            (width as f32, 0.0),
            (0.0, height as f32),
            (width as f32, height as f32),
        ];
        let mut min = (f32::MAX, f32::MAX);
        let mut max = (f32::MIN, f32::MIN);
        for (cx, cy) in corners {
            let (sx, sy) = ((cx - px) * zoom_x, (cy - py) * zoom_y);
            let dx = sx * cos - sy * sin;
            let dy = sx * sin + sy * cos;
            min = (min.0.min(dx), min.1.min(dy));
            max = (max.0.max(dx), max.1.max(dy));
        }
        let left = anchor.0.saturating_add(libm::floorf(min.0) as i32);
        let top = anchor.1.saturating_add(libm::floorf(min.1) as i32);
        let right = anchor.0.saturating_add(libm::ceilf(max.0) as i32);
        let bottom = anchor.1.saturating_add(libm::ceilf(max.1) as i32);
        let span = |lo: i32, hi: i32| (hi as i64 - lo as i64).min(i32::MAX as i64) as i32;
        let bounds = Rect::new(left, top, span(left, right), span(top, bottom));

        Ok(Self { inverse, bounds })
    }

    pub fn inverse(&self) -> InverseMatrix {
        self.inverse
    }

    /// Destination pixels that may receive a sample
    pub fn bounds(&self) -> Rect {
        self.bounds
    }
}

impl Sprite {
    /// Draw this sprite rotated by `angle` degrees and scaled by
    /// (`zoom_x`, `zoom_y`) around its pivot, with the pivot landing on
    /// (x, y)
    ///
    /// Sampling is nearest-neighbor at destination pixel centers.
    /// Transparency and alpha behave as in [`push_to`](Sprite::push_to).
    #[allow(clippy::too_many_arguments)]
    pub fn push_rotate_zoom<S: Surface + ?Sized>(
        &self,
        target: &mut S,
        x: i32,
        y: i32,
        angle: f32,
        zoom_x: f32,
        zoom_y: f32,
        options: PushOptions,
    ) -> Result<()> {
        let (w, h) = (self.width(), self.height());
        let pivot = self.pivot();
        let transform = Transform::new(w, h, pivot, (x, y), angle, zoom_x, zoom_y)?;
        let area = transform.bounds().intersect(&target.clip_rect());
        if area.is_empty() {
            return Ok(());
        }

        let options = PushOptions {
            transparent: options.transparent.or(self.transparent()),
            ..options
        };
        let target_format = target.format();
        let target_palette = target.palette().cloned();
        let mut comp = Compositor::new(
            self.format(),
            self.palette(),
            target_format,
            target_palette.as_ref(),
            options,
        )?;

        let m = transform.inverse();
        let (w, h) = (w as i64, h as i64);
        let pivot_u = (pivot.0 as i64) << FIXED_SHIFT;
        let pivot_v = (pivot.1 as i64) << FIXED_SHIFT;

        batched(target, |t| {
            for dy in area.y..area.bottom() {
                // Destination pixel center relative to the anchor
                let ry = ((dy as i64 - y as i64) << FIXED_SHIFT) + FIXED_HALF;
                let rx = ((area.x as i64 - x as i64) << FIXED_SHIFT) + FIXED_HALF;
                let mut u = pivot_u + ((m.m00 * rx + m.m01 * ry) >> FIXED_SHIFT);
                let mut v = pivot_v + ((m.m10 * rx + m.m11 * ry) >> FIXED_SHIFT);

                for dx in area.x..area.right() {
                    let (su, sv) = (u >> FIXED_SHIFT, v >> FIXED_SHIFT);
                    if su >= 0 && su < w && sv >= 0 && sv < h {
                        comp.put(t, dx, dy, self.read_at(su as i32, sv as i32))?;
                    } else {
                        comp.flush(t)?;
                    }
                    u += m.m00;
                    v += m.m10;
                }
                comp.flush(t)?;
            }
            Ok(())
        })
    }
}
