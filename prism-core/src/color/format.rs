//! Pixel format descriptors
//!
//! A [`PixelFormat`] describes how one pixel is laid out in memory. The
//! raw value of a pixel is always handled as a `u32` holding exactly
//! `bits_per_pixel` significant bits.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Order of the color channels inside a raw pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ColorOrder {
    /// Red in the most significant field
    #[default]
    Rgb,
    /// Blue in the most significant field
    Bgr,
}

/// Pixel encoding descriptor
///
/// Supported encodings:
///
/// | bpp | palette | non-palette        |
/// |-----|---------|--------------------|
/// | 1   | indexed | grayscale (mono)   |
/// | 2   | indexed | grayscale          |
/// | 4   | indexed | grayscale          |
/// | 8   | indexed | RGB332             |
/// | 16  | -       | RGB565             |
/// | 24  | -       | RGB888             |
/// | 32  | -       | (A)RGB8888         |
///
/// Multi-byte pixels are stored big-endian, the order display controllers
/// expect on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PixelFormat {
    bits_per_pixel: u8,
    color_order: ColorOrder,
    has_alpha: bool,
    is_palette: bool,
}

impl PixelFormat {
    /// 16-bit RGB565
    pub const RGB565: Self = Self::raw(16, ColorOrder::Rgb, false, false);
    /// 16-bit BGR565
    pub const BGR565: Self = Self::raw(16, ColorOrder::Bgr, false, false);
    /// 24-bit RGB888
    pub const RGB888: Self = Self::raw(24, ColorOrder::Rgb, false, false);
    /// 24-bit BGR888
    pub const BGR888: Self = Self::raw(24, ColorOrder::Bgr, false, false);
    /// 32-bit ARGB8888
    pub const ARGB8888: Self = Self::raw(32, ColorOrder::Rgb, true, false);
    /// 32-bit ABGR8888
    pub const ABGR8888: Self = Self::raw(32, ColorOrder::Bgr, true, false);
    /// 32-bit RGB888 with an ignored padding byte
    pub const XRGB8888: Self = Self::raw(32, ColorOrder::Rgb, false, false);
    /// 8-bit RGB332
    pub const RGB332: Self = Self::raw(8, ColorOrder::Rgb, false, false);
    /// 1-bit monochrome
    pub const GRAY1: Self = Self::raw(1, ColorOrder::Rgb, false, false);
    /// 2-bit grayscale
    pub const GRAY2: Self = Self::raw(2, ColorOrder::Rgb, false, false);
    /// 4-bit grayscale
    pub const GRAY4: Self = Self::raw(4, ColorOrder::Rgb, false, false);
    /// 1-bit palette index
    pub const PALETTE1: Self = Self::raw(1, ColorOrder::Rgb, false, true);
    /// 2-bit palette index
    pub const PALETTE2: Self = Self::raw(2, ColorOrder::Rgb, false, true);
    /// 4-bit palette index
    pub const PALETTE4: Self = Self::raw(4, ColorOrder::Rgb, false, true);
    /// 8-bit palette index
    pub const PALETTE8: Self = Self::raw(8, ColorOrder::Rgb, false, true);

    const fn raw(bits_per_pixel: u8, color_order: ColorOrder, has_alpha: bool, is_palette: bool) -> Self {
        Self {
            bits_per_pixel,
            color_order,
            has_alpha,
            is_palette,
        }
    }

    /// Build a format, rejecting combinations that have no encoding
    pub const fn new(
        bits_per_pixel: u8,
        color_order: ColorOrder,
        has_alpha: bool,
        is_palette: bool,
    ) -> Result<Self, ConfigError> {
        let depth_ok = matches!(bits_per_pixel, 1 | 2 | 4 | 8 | 16 | 24 | 32);
        if !depth_ok || (is_palette && bits_per_pixel > 8) || (has_alpha && bits_per_pixel != 32) {
            return Err(ConfigError::InvalidPixelFormat);
        }
        if has_alpha && is_palette {
            return Err(ConfigError::InvalidPixelFormat);
        }
        Ok(Self::raw(bits_per_pixel, color_order, has_alpha, is_palette))
    }

    /// Palette format of the given depth
    pub const fn palette(bits_per_pixel: u8) -> Result<Self, ConfigError> {
        Self::new(bits_per_pixel, ColorOrder::Rgb, false, true)
    }

    /// Bits per pixel
    pub const fn bits_per_pixel(&self) -> u8 {
        self.bits_per_pixel
    }

    /// Whole bytes per pixel, 0 for sub-byte formats
    pub const fn bytes_per_pixel(&self) -> usize {
        self.bits_per_pixel as usize / 8
    }

    /// Channel order
    pub const fn color_order(&self) -> ColorOrder {
        self.color_order
    }

    /// Whether the format carries an alpha channel
    pub const fn has_alpha(&self) -> bool {
        self.has_alpha
    }

    /// Whether raw values are palette indices
    pub const fn is_palette(&self) -> bool {
        self.is_palette
    }

    /// Same layout with the channel order replaced
    ///
    /// Palette and grayscale formats have no channel order; they are
    /// returned unchanged.
    pub const fn with_order(self, color_order: ColorOrder) -> Self {
        if self.is_palette || self.bits_per_pixel < 8 {
            return self;
        }
        Self { color_order, ..self }
    }

    /// Mask covering the significant bits of a raw value
    pub const fn raw_mask(&self) -> u32 {
        if self.bits_per_pixel >= 32 {
            u32::MAX
        } else {
            (1u32 << self.bits_per_pixel) - 1
        }
    }

    /// Number of bytes needed to hold `count` packed pixels
    pub const fn bytes_for(&self, count: usize) -> usize {
        (count * self.bits_per_pixel as usize).div_ceil(8)
    }

    /// Storage size for a `width` x `height` buffer, word aligned
    ///
    /// Returns `None` if the size overflows `usize`.
    pub fn storage_len(&self, width: u32, height: u32) -> Option<usize> {
        let pixels = (width as usize).checked_mul(height as usize)?;
        let bits = pixels.checked_mul(self.bits_per_pixel as usize)?;
        let bytes = bits.div_ceil(8);
        bytes.checked_add(WORD_ALIGN - 1).map(|n| n & !(WORD_ALIGN - 1))
    }

    pub(crate) const fn encoding(&self) -> Encoding {
        let bgr = matches!(self.color_order, ColorOrder::Bgr);
        if self.is_palette {
            return Encoding::Indexed;
        }
        match self.bits_per_pixel {
            1 => Encoding::Gray1,
            2 => Encoding::Gray2,
            4 => Encoding::Gray4,
            8 if bgr => Encoding::Bgr233,
            8 => Encoding::Rgb332,
            16 if bgr => Encoding::Bgr565,
            16 => Encoding::Rgb565,
            24 if bgr => Encoding::Bgr888,
            24 => Encoding::Rgb888,
            _ => match (self.has_alpha, bgr) {
                (true, false) => Encoding::Argb8888,
                (true, true) => Encoding::Abgr8888,
                (false, false) => Encoding::Xrgb8888,
                (false, true) => Encoding::Xbgr8888,
            },
        }
    }
}

/// Storage is rounded up to this many bytes
pub const WORD_ALIGN: usize = 4;

/// Concrete encodings, used to index the conversion tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum Encoding {
    Gray1 = 0,
    Gray2 = 1,
    Gray4 = 2,
    Rgb332 = 3,
    Bgr233 = 4,
    Indexed = 5,
    Rgb565 = 6,
    Bgr565 = 7,
    Rgb888 = 8,
    Bgr888 = 9,
    Xrgb8888 = 10,
    Xbgr8888 = 11,
    Argb8888 = 12,
    Abgr8888 = 13,
}

impl Encoding {
    pub(crate) const COUNT: usize = 14;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_depth_invariant() {
        assert!(PixelFormat::new(8, ColorOrder::Rgb, false, true).is_ok());
        assert_eq!(
            PixelFormat::new(16, ColorOrder::Rgb, false, true),
            Err(ConfigError::InvalidPixelFormat)
        );
    }

    #[test]
    fn test_invalid_combinations() {
        assert!(PixelFormat::new(12, ColorOrder::Rgb, false, false).is_err());
        assert!(PixelFormat::new(16, ColorOrder::Rgb, true, false).is_err());
        assert!(PixelFormat::new(32, ColorOrder::Rgb, true, false).is_ok());
    }

    #[test]
    fn test_storage_len_word_aligned() {
        // 100 x 100 x 16bpp = 20000 bytes, already aligned
        assert_eq!(PixelFormat::RGB565.storage_len(100, 100), Some(20_000));
        // 3 x 3 x 1bpp = 9 bits -> 2 bytes -> 4
        assert_eq!(PixelFormat::GRAY1.storage_len(3, 3), Some(4));
        // 5 x 1 x 24bpp = 15 bytes -> 16
        assert_eq!(PixelFormat::RGB888.storage_len(5, 1), Some(16));
        assert_eq!(PixelFormat::RGB888.storage_len(u32::MAX, u32::MAX), None);
    }

    #[test]
    fn test_with_order() {
        assert_eq!(PixelFormat::RGB565.with_order(ColorOrder::Bgr), PixelFormat::BGR565);
        assert_eq!(PixelFormat::PALETTE4.with_order(ColorOrder::Bgr), PixelFormat::PALETTE4);
    }

    #[test]
    fn test_raw_mask() {
        assert_eq!(PixelFormat::GRAY1.raw_mask(), 0x1);
        assert_eq!(PixelFormat::RGB565.raw_mask(), 0xFFFF);
        assert_eq!(PixelFormat::ARGB8888.raw_mask(), 0xFFFF_FFFF);
    }
}
