//! Immediate-mode rasterization
//!
//! Every shape is reduced to clipped horizontal spans and single pixels,
//! written through the [`Surface`] methods. Drawing operations come from
//! the blanket [`Canvas`] extension, so anything implementing `Surface`
//! can draw, and each call is wrapped in one `begin_batch`/`end_batch`
//! pair.

pub mod rotozoom;
mod shapes;

use crate::error::Result;
use crate::traits::{batched, Surface};

pub use rotozoom::{FIXED_ONE, FIXED_SHIFT};

/// 8x8 one-bit fill pattern
///
/// Row `y & 7`, bit `7 - (x & 7)` selects the foreground. The pattern is
/// anchored to surface coordinates so neighboring shapes tile seamlessly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pattern {
    pub rows: [u8; 8],
    pub foreground: u32,
    /// `None` leaves clear bits untouched
    pub background: Option<u32>,
}

impl Pattern {
    pub const CHECKER: [u8; 8] = [0xAA, 0x55, 0xAA, 0x55, 0xAA, 0x55, 0xAA, 0x55];
    pub const HATCH: [u8; 8] = [0x80, 0x40, 0x20, 0x10, 0x08, 0x04, 0x02, 0x01];

    pub const fn new(rows: [u8; 8], foreground: u32, background: Option<u32>) -> Self {
        Self {
            rows,
            foreground,
            background,
        }
    }

    /// Raw value at surface position (x, y), `None` if left untouched
    pub fn color_at(&self, x: i32, y: i32) -> Option<u32> {
        let row = self.rows[(y & 7) as usize];
        if row & (0x80 >> (x & 7)) != 0 {
            Some(self.foreground)
        } else {
            self.background
        }
    }
}

/// What a span is filled with
#[derive(Debug, Clone, Copy)]
pub(crate) enum Paint<'p> {
    Solid(u32),
    Pattern(&'p Pattern),
}

/// Fill the span (x..x + w, y) clipped to the surface's clip rectangle
pub(crate) fn span<S: Surface + ?Sized>(
    surface: &mut S,
    x: i32,
    y: i32,
    w: i32,
    paint: Paint<'_>,
) -> Result<()> {
    let clip = surface.clip_rect();
    if w <= 0 || y < clip.y || y >= clip.bottom() {
        return Ok(());
    }
    let start = x.max(clip.x);
    let end = x.saturating_add(w).min(clip.right());
    if start >= end {
        return Ok(());
    }
    match paint {
        Paint::Solid(raw) => surface.fill_span(start, y, end - start, raw),
        Paint::Pattern(pattern) => {
            let mut buf = [0u32; 32];
            let mut run_x = start;
            let mut len = 0usize;
            for px in start..end {
                match pattern.color_at(px, y) {
                    Some(raw) => {
                        if len == 0 {
                            run_x = px;
                        }
                        buf[len] = raw;
                        len += 1;
                        if len == buf.len() {
                            surface.write_run(run_x, y, &buf[..len])?;
                            len = 0;
                        }
                    }
                    None if len > 0 => {
                        surface.write_run(run_x, y, &buf[..len])?;
                        len = 0;
                    }
                    None => {}
                }
            }
            if len > 0 {
                surface.write_run(run_x, y, &buf[..len])?;
            }
            Ok(())
        }
    }
}

/// Drawing operations for every [`Surface`]
///
/// Colors are raw values in the surface's format; use
/// [`Surface::color`] to convert a canonical color.
pub trait Canvas: Surface {
    fn draw_pixel(&mut self, x: i32, y: i32, raw: u32) -> Result<()> {
        batched(self, |s| span(s, x, y, 1, Paint::Solid(raw)))
    }

    fn draw_hline(&mut self, x: i32, y: i32, w: i32, raw: u32) -> Result<()> {
        batched(self, |s| span(s, x, y, w, Paint::Solid(raw)))
    }

    fn draw_vline(&mut self, x: i32, y: i32, h: i32, raw: u32) -> Result<()> {
        batched(self, |s| shapes::vline(s, x, y, h, Paint::Solid(raw)))
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, raw: u32) -> Result<()> {
        batched(self, |s| shapes::line(s, x0, y0, x1, y1, Paint::Solid(raw)))
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, raw: u32) -> Result<()> {
        batched(self, |s| shapes::fill_rect(s, x, y, w, h, Paint::Solid(raw)))
    }

    fn fill_rect_pattern(&mut self, x: i32, y: i32, w: i32, h: i32, pattern: &Pattern) -> Result<()> {
        batched(self, |s| shapes::fill_rect(s, x, y, w, h, Paint::Pattern(pattern)))
    }

    /// Fill the clip rectangle
    fn fill_screen(&mut self, raw: u32) -> Result<()> {
        let clip = self.clip_rect();
        self.fill_rect(clip.x, clip.y, clip.w, clip.h, raw)
    }

    fn draw_rect(&mut self, x: i32, y: i32, w: i32, h: i32, raw: u32) -> Result<()> {
        batched(self, |s| shapes::rect(s, x, y, w, h, Paint::Solid(raw)))
    }

    fn draw_circle(&mut self, cx: i32, cy: i32, r: i32, raw: u32) -> Result<()> {
        batched(self, |s| shapes::circle(s, cx, cy, r, Paint::Solid(raw)))
    }

    fn fill_circle(&mut self, cx: i32, cy: i32, r: i32, raw: u32) -> Result<()> {
        batched(self, |s| shapes::fill_circle(s, cx, cy, r, Paint::Solid(raw)))
    }

    fn fill_circle_pattern(&mut self, cx: i32, cy: i32, r: i32, pattern: &Pattern) -> Result<()> {
        batched(self, |s| shapes::fill_circle(s, cx, cy, r, Paint::Pattern(pattern)))
    }

    fn draw_ellipse(&mut self, cx: i32, cy: i32, rx: i32, ry: i32, raw: u32) -> Result<()> {
        batched(self, |s| shapes::ellipse(s, cx, cy, rx, ry, Paint::Solid(raw)))
    }

    fn fill_ellipse(&mut self, cx: i32, cy: i32, rx: i32, ry: i32, raw: u32) -> Result<()> {
        batched(self, |s| shapes::fill_ellipse(s, cx, cy, rx, ry, Paint::Solid(raw)))
    }

    fn fill_ellipse_pattern(
        &mut self,
        cx: i32,
        cy: i32,
        rx: i32,
        ry: i32,
        pattern: &Pattern,
    ) -> Result<()> {
        batched(self, |s| shapes::fill_ellipse(s, cx, cy, rx, ry, Paint::Pattern(pattern)))
    }

    #[allow(clippy::too_many_arguments)]
    fn fill_triangle(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        raw: u32,
    ) -> Result<()> {
        batched(self, |s| {
            shapes::fill_triangle(s, [(x0, y0), (x1, y1), (x2, y2)], Paint::Solid(raw))
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn fill_triangle_pattern(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        pattern: &Pattern,
    ) -> Result<()> {
        batched(self, |s| {
            shapes::fill_triangle(s, [(x0, y0), (x1, y1), (x2, y2)], Paint::Pattern(pattern))
        })
    }
}

impl<T: Surface + ?Sized> Canvas for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::PixelFormat;
    use crate::error::{Error, ProtocolError};

    /// Counts batches and spans; fails every write when `broken`
    #[derive(Default)]
    struct Recorder {
        begins: u32,
        ends: u32,
        spans: u32,
        broken: bool,
    }

    impl Surface for Recorder {
        fn format(&self) -> PixelFormat {
            PixelFormat::RGB565
        }
        fn width(&self) -> i32 {
            32
        }
        fn height(&self) -> i32 {
            32
        }
        fn write_run(&mut self, _x: i32, _y: i32, _pixels: &[u32]) -> Result<()> {
            self.fill_span(0, 0, 1, 0)
        }
        fn fill_span(&mut self, _x: i32, _y: i32, _len: i32, _raw: u32) -> Result<()> {
            if self.broken {
                return Err(ProtocolError::NotReady.into());
            }
            self.spans += 1;
            Ok(())
        }
        fn begin_batch(&mut self) -> Result<()> {
            self.begins += 1;
            Ok(())
        }
        fn end_batch(&mut self) -> Result<()> {
            self.ends += 1;
            Ok(())
        }
    }

    #[test]
    fn test_each_shape_is_one_batch() {
        let mut r = Recorder::default();
        r.fill_circle(16, 16, 10, 1).unwrap();
        assert_eq!((r.begins, r.ends), (1, 1));
        assert_eq!(r.spans, 21);

        r.fill_screen(0).unwrap();
        assert_eq!((r.begins, r.ends), (2, 2));
    }

    #[test]
    fn test_batch_closed_on_error() {
        let mut r = Recorder {
            broken: true,
            ..Default::default()
        };
        let err = r.draw_line(0, 0, 10, 3, 1).unwrap_err();
        assert_eq!(err, Error::Protocol(ProtocolError::NotReady));
        assert_eq!((r.begins, r.ends), (1, 1));
    }

    #[test]
    fn test_offscreen_shapes_write_nothing() {
        let mut r = Recorder::default();
        r.fill_triangle(-50, -50, -40, -45, -45, -30, 1).unwrap();
        r.draw_hline(40, 5, 10, 1).unwrap();
        assert_eq!(r.spans, 0);
    }

    #[test]
    fn test_pattern_is_anchored_to_surface() {
        let p = Pattern::new(Pattern::CHECKER, 1, Some(0));
        assert_eq!(p.color_at(0, 0), Some(1));
        assert_eq!(p.color_at(1, 0), Some(0));
        assert_eq!(p.color_at(0, 1), Some(0));
        assert_eq!(p.color_at(8, 8), Some(1));
        assert_eq!(p.color_at(-8, 0), Some(1));
    }

    #[test]
    fn test_pattern_without_background_is_sparse() {
        let p = Pattern::new(Pattern::HATCH, 7, None);
        assert_eq!(p.color_at(0, 0), Some(7));
        assert_eq!(p.color_at(1, 0), None);
        assert_eq!(p.color_at(1, 1), Some(7));
    }
}
