//! Pixel surface trait
//!
//! A [`Surface`] is anything the raster engine can write pixels into: an
//! off-screen [`Sprite`](crate::sprite::Sprite) or a physical panel. All
//! pixel values crossing this interface are raw values in the surface's
//! own [`PixelFormat`].

use crate::color::{ColorConverter, Palette, PixelFormat};
use crate::error::{ProtocolError, Result};
use crate::geometry::Rect;

/// Rotation-aware pixel sink
///
/// Coordinates are logical (after the surface's rotation). Callers clip
/// against [`clip_rect`](Surface::clip_rect) before calling the write
/// methods; implementations may drop anything outside it.
pub trait Surface {
    /// Native pixel format
    fn format(&self) -> PixelFormat;

    /// Palette for palette formats
    fn palette(&self) -> Option<&Palette> {
        None
    }

    /// Logical width
    fn width(&self) -> i32;

    /// Logical height
    fn height(&self) -> i32;

    /// Writable region, never larger than the logical bounds
    fn clip_rect(&self) -> Rect {
        Rect::new(0, 0, self.width(), self.height())
    }

    /// Write a horizontal run of raw pixels starting at (x, y)
    fn write_run(&mut self, x: i32, y: i32, pixels: &[u32]) -> Result<()>;

    /// Fill `len` pixels starting at (x, y) with one raw value
    fn fill_span(&mut self, x: i32, y: i32, len: i32, raw: u32) -> Result<()>;

    /// Fill a clipped rectangle with one raw value
    fn fill_area(&mut self, area: Rect, raw: u32) -> Result<()> {
        for y in area.y..area.bottom() {
            self.fill_span(area.x, y, area.w, raw)?;
        }
        Ok(())
    }

    /// Read a horizontal run of raw pixels starting at (x, y)
    ///
    /// Write-only surfaces report [`ProtocolError::NotReadable`].
    fn read_run(&mut self, _x: i32, _y: i32, _out: &mut [u32]) -> Result<()> {
        Err(ProtocolError::NotReadable.into())
    }

    /// Start a group of writes that belong together
    ///
    /// Panels open a bus transaction here so a whole shape goes out in one
    /// lock/unlock cycle. Calls nest.
    fn begin_batch(&mut self) -> Result<()> {
        Ok(())
    }

    /// Close the group opened by [`begin_batch`](Surface::begin_batch)
    fn end_batch(&mut self) -> Result<()> {
        Ok(())
    }

    /// Raw value for a canonical color in this surface's format
    fn color(&self, color: crate::color::Color) -> u32 {
        ColorConverter::new(PixelFormat::ARGB8888, self.format())
            .with_palettes(None, self.palette())
            .encode(color)
    }
}

/// Run `body` between `begin_batch` and `end_batch`
///
/// The batch is closed even when `body` fails; the first error wins.
pub fn batched<S, T, F>(surface: &mut S, body: F) -> Result<T>
where
    S: Surface + ?Sized,
    F: FnOnce(&mut S) -> Result<T>,
{
    surface.begin_batch()?;
    let result = body(surface);
    let end = surface.end_batch();
    match result {
        Ok(value) => end.map(|_| value),
        Err(e) => Err(e),
    }
}
