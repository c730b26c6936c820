//! Pixel formats and color conversion
//!
//! Every conversion goes through a canonical 32-bit ARGB value
//! ([`Color`]). Depth reduction truncates low-order bits; expansion
//! zero-fills them for color channels, so `888 -> 565 -> 888` reproduces
//! the truncated value exactly. Grayscale levels expand by bit
//! replication so a lit monochrome pixel reads back as full white.

mod convert;
mod format;
mod palette;

pub use convert::{convert_pixel, read_raw, write_raw, ColorConverter};
pub use format::{ColorOrder, PixelFormat, WORD_ALIGN};
pub use palette::Palette;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Canonical 32-bit ARGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Color(pub u32);

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(0xFF, 0xFF, 0xFF);
    pub const RED: Self = Self::rgb(0xFF, 0, 0);
    pub const GREEN: Self = Self::rgb(0, 0xFF, 0);
    pub const BLUE: Self = Self::rgb(0, 0, 0xFF);

    /// Opaque color from 8-bit channels
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::argb(0xFF, r, g, b)
    }

    /// Color with explicit alpha
    pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self((a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    pub const fn a(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn b(self) -> u8 {
        self.0 as u8
    }

    /// Composite `self` over `dst` with a global alpha (0-255)
    ///
    /// Each channel is `(src * alpha + dst * (255 - alpha)) / 255` in
    /// integer arithmetic. The result is opaque.
    pub const fn blend(self, dst: Color, alpha: u8) -> Color {
        Color::rgb(
            mix(self.r(), dst.r(), alpha),
            mix(self.g(), dst.g(), alpha),
            mix(self.b(), dst.b(), alpha),
        )
    }
}

const fn mix(src: u8, dst: u8, alpha: u8) -> u8 {
    let a = alpha as u32;
    ((src as u32 * a + dst as u32 * (255 - a)) / 255) as u8
}

impl From<u32> for Color {
    fn from(argb: u32) -> Self {
        Color(argb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channels() {
        let c = Color::argb(0x12, 0x34, 0x56, 0x78);
        assert_eq!(c.0, 0x1234_5678);
        assert_eq!((c.a(), c.r(), c.g(), c.b()), (0x12, 0x34, 0x56, 0x78));
    }

    #[test]
    fn test_blend_endpoints() {
        let src = Color::rgb(200, 100, 50);
        let dst = Color::rgb(10, 20, 30);
        assert_eq!(src.blend(dst, 255), src);
        assert_eq!(src.blend(dst, 0), dst);
    }

    #[test]
    fn test_blend_half() {
        let src = Color::WHITE;
        let dst = Color::BLACK;
        // 255 * 128 / 255 = 128
        assert_eq!(src.blend(dst, 128), Color::rgb(128, 128, 128));
    }
}
