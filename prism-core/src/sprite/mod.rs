//! Off-screen frame buffers
//!
//! A [`Sprite`] owns a packed pixel buffer in one [`PixelFormat`]. Pixels
//! are stored row-major in the unrotated (physical) orientation with no
//! row padding; sub-byte formats are MSB-first and multi-byte formats are
//! big-endian, so rows can be streamed to a panel as they are.
//!
//! All public coordinates are logical. Rotations 1 and 3 swap the logical
//! width and height; rotations 4-7 are 0-3 mirrored horizontally.

mod graphics;
mod scroll;

use alloc::vec::Vec;

use crate::color::{read_raw, write_raw, Color, ColorConverter, Palette, PixelFormat};
use crate::compose::{Compositor, PushOptions};
use crate::error::{ConfigError, Error, Result};
use crate::geometry::Rect;
use crate::traits::{batched, Surface};

/// Pixel buffer with rotation, clipping, scrolling and a pivot
#[derive(Debug, Clone)]
pub struct Sprite {
    /// Physical width
    width: u32,
    /// Physical height
    height: u32,
    format: PixelFormat,
    storage: Vec<u8>,
    rotation: u8,
    clip: Rect,
    scroll: Rect,
    transparent: Option<u32>,
    pivot: (i32, i32),
    palette: Option<Palette>,
}

impl Sprite {
    /// Allocate a zeroed `width` x `height` buffer
    ///
    /// Palette formats start with a grayscale palette so the sprite is
    /// usable before [`set_palette`](Sprite::set_palette) is called.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Result<Self> {
        if width == 0 || height == 0 || width > i32::MAX as u32 || height > i32::MAX as u32 {
            return Err(ConfigError::InvalidGeometry.into());
        }
        let len = format.storage_len(width, height).ok_or(Error::Allocation)?;
        let mut storage = Vec::new();
        storage
            .try_reserve_exact(len)
            .map_err(|_| Error::Allocation)?;
        storage.resize(len, 0);

        let palette = if format.is_palette() {
            Some(Palette::grayscale(format.bits_per_pixel())?)
        } else {
            None
        };

        let full = Rect::new(0, 0, width as i32, height as i32);
        debug!("sprite {}x{} {} bytes", width, height, len);
        Ok(Self {
            width,
            height,
            format,
            storage,
            rotation: 0,
            clip: full,
            scroll: full,
            transparent: None,
            pivot: (width as i32 / 2, height as i32 / 2),
            palette,
        })
    }

    /// Native pixel format
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Logical width
    pub fn width(&self) -> u32 {
        if self.rotation & 1 == 0 {
            self.width
        } else {
            self.height
        }
    }

    /// Logical height
    pub fn height(&self) -> u32 {
        if self.rotation & 1 == 0 {
            self.height
        } else {
            self.width
        }
    }

    /// Full logical area
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width() as i32, self.height() as i32)
    }

    /// Packed storage in physical orientation
    pub fn buffer(&self) -> &[u8] {
        &self.storage
    }

    /// Mutable packed storage in physical orientation
    pub fn buffer_mut(&mut self) -> &mut [u8] {
        &mut self.storage
    }

    /// Bytes of one physical row, rounded up to whole bytes
    pub fn row_bytes(&self) -> usize {
        self.format.bytes_for(self.width as usize)
    }

    pub fn rotation(&self) -> u8 {
        self.rotation
    }

    /// Set rotation 0-7; higher bits are ignored
    ///
    /// Clip and scroll rectangles are reset to the new logical bounds.
    pub fn set_rotation(&mut self, rotation: u8) {
        self.rotation = rotation & 7;
        let full = self.bounds();
        self.clip = full;
        self.scroll = full;
    }

    pub fn clip_rect(&self) -> Rect {
        self.clip
    }

    /// Restrict writes to `rect`, intersected with the logical bounds
    pub fn set_clip_rect(&mut self, rect: Rect) {
        self.clip = rect.intersect(&self.bounds());
    }

    pub fn clear_clip_rect(&mut self) {
        self.clip = self.bounds();
    }

    pub fn scroll_rect(&self) -> Rect {
        self.scroll
    }

    /// Restrict [`scroll`](Sprite::scroll) to `rect`, intersected with the
    /// logical bounds
    pub fn set_scroll_rect(&mut self, rect: Rect) {
        self.scroll = rect.intersect(&self.bounds());
    }

    pub fn clear_scroll_rect(&mut self) {
        self.scroll = self.bounds();
    }

    /// Rotation and zoom center, in logical coordinates
    pub fn pivot(&self) -> (i32, i32) {
        self.pivot
    }

    pub fn set_pivot(&mut self, x: i32, y: i32) {
        self.pivot = (x, y);
    }

    /// Raw value skipped when this sprite is pushed
    pub fn transparent(&self) -> Option<u32> {
        self.transparent
    }

    pub fn set_transparent(&mut self, raw: Option<u32>) {
        self.transparent = raw.map(|r| r & self.format.raw_mask());
    }

    pub fn palette(&self) -> Option<&Palette> {
        self.palette.as_ref()
    }

    /// Replace the palette of a palette-format sprite
    pub fn set_palette(&mut self, palette: Palette) -> Result<()> {
        if !self.format.is_palette() {
            return Err(ConfigError::InvalidPixelFormat.into());
        }
        palette.check_fits(self.format)?;
        self.palette = Some(palette);
        Ok(())
    }

    /// Raw value for `color` in this sprite's format
    pub fn color(&self, color: Color) -> u32 {
        ColorConverter::new(PixelFormat::ARGB8888, self.format)
            .with_palettes(None, self.palette.as_ref())
            .encode(color)
    }

    /// Read the pixel at logical (x, y), `None` outside the clip rectangle
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<u32> {
        if !self.clip.contains(x, y) {
            return None;
        }
        Some(self.read_at(x, y))
    }

    /// Write the pixel at logical (x, y); dropped outside the clip rectangle
    pub fn set_pixel(&mut self, x: i32, y: i32, raw: u32) {
        if self.clip.contains(x, y) {
            self.write_at(x, y, raw);
        }
    }

    /// Read the pixel at logical (x, y) regardless of the clip rectangle
    pub fn read_pixel(&self, x: i32, y: i32) -> Option<u32> {
        if !self.bounds().contains(x, y) {
            return None;
        }
        Some(self.read_at(x, y))
    }

    /// Copy this sprite onto `target` with its top-left corner at (x, y)
    ///
    /// The sprite's own transparent color applies unless `options` sets
    /// one. Partial alpha needs a readable target.
    pub fn push_to<S: Surface + ?Sized>(
        &self,
        target: &mut S,
        x: i32,
        y: i32,
        options: PushOptions,
    ) -> Result<()> {
        let options = PushOptions {
            transparent: options.transparent.or(self.transparent),
            ..options
        };
        let area = Rect::new(x, y, self.width() as i32, self.height() as i32)
            .intersect(&target.clip_rect());
        if area.is_empty() {
            return Ok(());
        }

        let target_format = target.format();
        let target_palette = target.palette().cloned();
        let mut comp = Compositor::new(
            self.format,
            self.palette.as_ref(),
            target_format,
            target_palette.as_ref(),
            options,
        )?;

        batched(target, |t| {
            for dy in area.y..area.bottom() {
                for dx in area.x..area.right() {
                    comp.put(t, dx, dy, self.read_at(dx - x, dy - y))?;
                }
                comp.flush(t)?;
            }
            Ok(())
        })
    }

    /// Read logical (x, y) ignoring the clip rectangle
    ///
    /// The caller keeps the point inside the logical bounds.
    pub(crate) fn read_at(&self, x: i32, y: i32) -> u32 {
        let index = self.index(x, y);
        read_raw(&self.storage, self.format.bits_per_pixel(), index)
    }

    /// Write logical (x, y) ignoring the clip rectangle
    pub(crate) fn write_at(&mut self, x: i32, y: i32, raw: u32) {
        let index = self.index(x, y);
        write_raw(&mut self.storage, self.format.bits_per_pixel(), index, raw);
    }

    /// Physical pixel index for a logical coordinate
    fn index(&self, x: i32, y: i32) -> usize {
        let (px, py) = self.to_physical(x, y);
        py as usize * self.width as usize + px as usize
    }

    /// Map logical to physical coordinates for the current rotation
    fn to_physical(&self, x: i32, y: i32) -> (u32, u32) {
        let w = self.width as i32;
        let h = self.height as i32;
        let x = if self.rotation >= 4 {
            self.width() as i32 - 1 - x
        } else {
            x
        };
        let (px, py) = match self.rotation & 3 {
            0 => (x, y),
            1 => (w - 1 - y, x),
            2 => (w - 1 - x, h - 1 - y),
            _ => (y, h - 1 - x),
        };
        (px as u32, py as u32)
    }
}

impl Surface for Sprite {
    fn format(&self) -> PixelFormat {
        self.format
    }

    fn palette(&self) -> Option<&Palette> {
        self.palette.as_ref()
    }

    fn width(&self) -> i32 {
        Sprite::width(self) as i32
    }

    fn height(&self) -> i32 {
        Sprite::height(self) as i32
    }

    fn clip_rect(&self) -> Rect {
        self.clip
    }

    fn write_run(&mut self, x: i32, y: i32, pixels: &[u32]) -> Result<()> {
        for (i, &raw) in pixels.iter().enumerate() {
            self.set_pixel(x + i as i32, y, raw);
        }
        Ok(())
    }

    fn fill_span(&mut self, x: i32, y: i32, len: i32, raw: u32) -> Result<()> {
        if y < self.clip.y || y >= self.clip.bottom() {
            return Ok(());
        }
        let start = x.max(self.clip.x);
        let end = (x + len).min(self.clip.right());
        for px in start..end {
            self.write_at(px, y, raw);
        }
        Ok(())
    }

    fn read_run(&mut self, x: i32, y: i32, out: &mut [u32]) -> Result<()> {
        let bounds = self.bounds();
        for (i, slot) in out.iter_mut().enumerate() {
            let px = x + i as i32;
            *slot = if bounds.contains(px, y) {
                self.read_at(px, y)
            } else {
                0
            };
        }
        Ok(())
    }

    fn color(&self, color: Color) -> u32 {
        Sprite::color(self, color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProtocolError;
    use crate::traits::Canvas;
    use proptest::prelude::*;

    fn numbered(w: u32, h: u32) -> Sprite {
        let mut s = Sprite::new(w, h, PixelFormat::RGB565).unwrap();
        for y in 0..h as i32 {
            for x in 0..w as i32 {
                s.set_pixel(x, y, (y * w as i32 + x) as u32);
            }
        }
        s
    }

    /// Write-only surface recording every run
    struct Sink {
        w: i32,
        h: i32,
        pixels: alloc::vec::Vec<u32>,
        batches: u32,
    }

    impl Sink {
        fn new(w: i32, h: i32) -> Self {
            Self {
                w,
                h,
                pixels: alloc::vec![0; (w * h) as usize],
                batches: 0,
            }
        }
    }

    impl Surface for Sink {
        fn format(&self) -> PixelFormat {
            PixelFormat::RGB565
        }
        fn width(&self) -> i32 {
            self.w
        }
        fn height(&self) -> i32 {
            self.h
        }
        fn write_run(&mut self, x: i32, y: i32, pixels: &[u32]) -> Result<()> {
            for (i, p) in pixels.iter().enumerate() {
                self.pixels[(y * self.w + x) as usize + i] = *p;
            }
            Ok(())
        }
        fn fill_span(&mut self, x: i32, y: i32, len: i32, raw: u32) -> Result<()> {
            for i in 0..len {
                self.pixels[(y * self.w + x + i) as usize] = raw;
            }
            Ok(())
        }
        fn begin_batch(&mut self) -> Result<()> {
            self.batches += 1;
            Ok(())
        }
    }

    #[test]
    fn test_new_rejects_zero_size() {
        assert_eq!(
            Sprite::new(0, 10, PixelFormat::RGB565).unwrap_err(),
            Error::Config(ConfigError::InvalidGeometry)
        );
    }

    #[test]
    fn test_storage_is_word_aligned() {
        let s = Sprite::new(3, 3, PixelFormat::GRAY1).unwrap();
        assert_eq!(s.buffer().len(), 4);
        let s = Sprite::new(5, 1, PixelFormat::RGB888).unwrap();
        assert_eq!(s.buffer().len(), 16);
    }

    #[test]
    fn test_multibyte_storage_is_big_endian() {
        let mut s = Sprite::new(2, 1, PixelFormat::RGB565).unwrap();
        s.set_pixel(1, 0, 0xF800);
        assert_eq!(&s.buffer()[..4], &[0x00, 0x00, 0xF8, 0x00]);
    }

    #[test]
    fn test_rotation_swaps_dimensions_without_realloc() {
        let mut s = Sprite::new(40, 20, PixelFormat::RGB565).unwrap();
        let len = s.buffer().len();
        s.set_rotation(1);
        assert_eq!((s.width(), s.height()), (20, 40));
        assert_eq!(s.clip_rect(), Rect::new(0, 0, 20, 40));
        s.set_rotation(14);
        assert_eq!(s.rotation(), 6);
        assert_eq!((s.width(), s.height()), (40, 20));
        assert_eq!(s.buffer().len(), len);
    }

    #[test]
    fn test_rotation_one_maps_to_physical() {
        let mut s = Sprite::new(4, 3, PixelFormat::RGB565).unwrap();
        s.set_rotation(1);
        s.set_pixel(0, 0, 0x1234);
        // Logical origin lands on the physical top-right corner
        s.set_rotation(0);
        assert_eq!(s.get_pixel(3, 0), Some(0x1234));
    }

    #[test]
    fn test_clip_drops_writes() {
        let mut s = Sprite::new(10, 10, PixelFormat::RGB565).unwrap();
        s.set_clip_rect(Rect::new(2, 2, 3, 3));
        s.set_pixel(0, 0, 0xFFFF);
        s.set_pixel(3, 3, 0xFFFF);
        assert_eq!(s.get_pixel(0, 0), None);
        s.clear_clip_rect();
        assert_eq!(s.get_pixel(0, 0), Some(0));
        assert_eq!(s.get_pixel(3, 3), Some(0xFFFF));
    }

    #[test]
    fn test_palette_sprite_round_trips_color() {
        let mut s = Sprite::new(8, 8, PixelFormat::PALETTE2).unwrap();
        let palette =
            Palette::from_colors(&[Color::BLACK, Color::RED, Color::GREEN, Color::BLUE]).unwrap();
        s.set_palette(palette).unwrap();
        assert_eq!(s.color(Color::GREEN), 2);

        let big = Palette::grayscale(4).unwrap();
        assert_eq!(
            s.set_palette(big).unwrap_err(),
            Error::Config(ConfigError::PaletteTooLarge)
        );
    }

    #[test]
    fn test_push_transparent_over_white() {
        // Black border of the source is the transparent color
        let mut dst = Sprite::new(200, 200, PixelFormat::RGB565).unwrap();
        dst.fill_screen(0xFFFF).unwrap();

        let mut src = Sprite::new(50, 50, PixelFormat::RGB565).unwrap();
        src.fill_rect(10, 10, 30, 30, 0xF800).unwrap();
        src.push_to(&mut dst, 20, 20, PushOptions::transparent(0))
            .unwrap();

        assert_eq!(dst.get_pixel(25, 25), Some(0xFFFF));
        assert_eq!(dst.get_pixel(30, 30), Some(0xF800));
        assert_eq!(dst.get_pixel(59, 59), Some(0xF800));
        assert_eq!(dst.get_pixel(60, 60), Some(0xFFFF));
    }

    #[test]
    fn test_push_full_sprite_onto_larger_buffer() {
        let mut device = Sprite::new(200, 200, PixelFormat::RGB565).unwrap();
        device.fill_screen(0x0841).unwrap();
        let mut src = Sprite::new(100, 100, PixelFormat::RGB565).unwrap();
        src.fill_screen(0xFFFF).unwrap();
        src.push_to(&mut device, 50, 50, PushOptions::opaque()).unwrap();

        for y in 0..200 {
            for x in 0..200 {
                let inside = (50..150).contains(&x) && (50..150).contains(&y);
                let expected = if inside { 0xFFFF } else { 0x0841 };
                assert_eq!(device.get_pixel(x, y), Some(expected));
            }
        }
    }

    #[test]
    fn test_push_uses_own_transparent_color() {
        let mut dst = Sprite::new(4, 1, PixelFormat::RGB565).unwrap();
        dst.fill_screen(0x1111).unwrap();
        let mut src = Sprite::new(4, 1, PixelFormat::RGB565).unwrap();
        src.set_pixel(1, 0, 0x2222);
        src.set_transparent(Some(0));
        src.push_to(&mut dst, 0, 0, PushOptions::opaque()).unwrap();
        assert_eq!(dst.get_pixel(0, 0), Some(0x1111));
        assert_eq!(dst.get_pixel(1, 0), Some(0x2222));
    }

    #[test]
    fn test_push_alpha_blends() {
        let mut dst = Sprite::new(2, 1, PixelFormat::RGB888).unwrap();
        dst.fill_screen(0x000000).unwrap();
        let mut src = Sprite::new(2, 1, PixelFormat::RGB888).unwrap();
        src.fill_screen(0xFFFFFF).unwrap();
        src.push_to(&mut dst, 0, 0, PushOptions::opaque().with_alpha(51))
            .unwrap();
        assert_eq!(dst.get_pixel(0, 0), Some(0x333333));
    }

    #[test]
    fn test_push_key_and_alpha_combine() {
        let under = Color::rgb(0x10, 0x20, 0x30);
        let over = Color::rgb(0xF0, 0xE0, 0xD0);
        let key = 0x0000FF;
        let mut dst = Sprite::new(4, 1, PixelFormat::RGB888).unwrap();
        dst.fill_screen(under.0 & 0xFF_FFFF).unwrap();
        let mut src = Sprite::new(4, 1, PixelFormat::RGB888).unwrap();
        src.fill_screen(over.0 & 0xFF_FFFF).unwrap();
        src.set_pixel(1, 0, key);
        src.set_pixel(3, 0, key);

        src.push_to(&mut dst, 0, 0, PushOptions::transparent(key).with_alpha(100))
            .unwrap();

        let blended = over.blend(under, 100).0 & 0xFF_FFFF;
        assert_eq!(dst.get_pixel(0, 0), Some(blended));
        assert_eq!(dst.get_pixel(1, 0), Some(under.0 & 0xFF_FFFF));
        assert_eq!(dst.get_pixel(2, 0), Some(blended));
        assert_eq!(dst.get_pixel(3, 0), Some(under.0 & 0xFF_FFFF));
    }

    #[test]
    fn test_push_far_offsets_clip_quietly() {
        let mut dst = Sprite::new(8, 8, PixelFormat::RGB565).unwrap();
        dst.fill_screen(0x0841).unwrap();
        let mut src = Sprite::new(4, 4, PixelFormat::RGB565).unwrap();
        src.fill_screen(0xFFFF).unwrap();
        for (x, y) in [(i32::MAX - 2, 0), (0, i32::MAX), (i32::MIN, i32::MIN), (i32::MIN, 2)] {
            src.push_to(&mut dst, x, y, PushOptions::opaque()).unwrap();
        }
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(dst.get_pixel(x, y), Some(0x0841));
            }
        }
    }

    #[test]
    fn test_push_alpha_needs_readable_target() {
        let mut sink = Sink::new(4, 4);
        let src = Sprite::new(2, 2, PixelFormat::RGB565).unwrap();
        let err = src
            .push_to(&mut sink, 0, 0, PushOptions::opaque().with_alpha(10))
            .unwrap_err();
        assert_eq!(err, Error::Protocol(ProtocolError::NotReadable));
    }

    #[test]
    fn test_push_converts_formats_and_clips() {
        let mut sink = Sink::new(4, 4);
        let mut src = Sprite::new(3, 3, PixelFormat::RGB888).unwrap();
        src.fill_screen(0xFF0000).unwrap();
        src.push_to(&mut sink, 2, -1, PushOptions::opaque()).unwrap();

        assert_eq!(sink.batches, 1);
        assert_eq!(sink.pixels[0 * 4 + 2], 0xF800);
        assert_eq!(sink.pixels[1 * 4 + 3], 0xF800);
        assert_eq!(sink.pixels[2 * 4 + 3], 0);
        assert_eq!(sink.pixels[0 * 4 + 1], 0);
    }

    #[test]
    fn test_push_palette_sprite_to_rgb() {
        let mut src = Sprite::new(2, 1, PixelFormat::PALETTE1).unwrap();
        src.set_palette(Palette::from_colors(&[Color::BLACK, Color::BLUE]).unwrap())
            .unwrap();
        src.set_pixel(1, 0, 1);
        let mut dst = Sprite::new(2, 1, PixelFormat::RGB565).unwrap();
        src.push_to(&mut dst, 0, 0, PushOptions::opaque()).unwrap();
        assert_eq!(dst.get_pixel(1, 0), Some(0x001F));
    }

    proptest! {
        #[test]
        fn prop_mirror_rotation_flips_x(
            w in 1u32..12, h in 1u32..12, x in 0i32..12, y in 0i32..12, base in 0u8..4
        ) {
            let mut s = numbered(w, h);
            s.set_rotation(base);
            let (lw, lh) = (s.width() as i32, s.height() as i32);
            prop_assume!(x < lw && y < lh);
            let plain = s.get_pixel(lw - 1 - x, y);
            s.set_rotation(base + 4);
            prop_assert_eq!(s.get_pixel(x, y), plain);
        }

        #[test]
        fn prop_rotation_is_idempotent(w in 1u32..10, h in 1u32..10, r in 0u8..8) {
            let mut s = numbered(w, h);
            s.set_rotation(r);
            let first: alloc::vec::Vec<_> = (0..s.height() as i32)
                .flat_map(|y| (0..s.width() as i32).map(move |x| (x, y)))
                .map(|(x, y)| s.get_pixel(x, y))
                .collect();
            s.set_rotation(r);
            let second: alloc::vec::Vec<_> = (0..s.height() as i32)
                .flat_map(|y| (0..s.width() as i32).map(move |x| (x, y)))
                .map(|(x, y)| s.get_pixel(x, y))
                .collect();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_rotations_cover_every_pixel_once(w in 1u32..8, h in 1u32..8, r in 0u8..8) {
            let mut s = numbered(w, h);
            s.set_rotation(r);
            let mut seen: alloc::vec::Vec<u32> = (0..s.height() as i32)
                .flat_map(|y| (0..s.width() as i32).map(move |x| (x, y)))
                .filter_map(|(x, y)| s.get_pixel(x, y))
                .collect();
            seen.sort_unstable();
            let expected: alloc::vec::Vec<u32> = (0..w * h).collect();
            prop_assert_eq!(seen, expected);
        }
    }
}
