//! Caller-supplied index <-> color lookup tables

use heapless::Vec;

use super::{Color, PixelFormat};
use crate::error::ConfigError;

/// Maximum palette entries (8-bit indices)
pub const MAX_PALETTE: usize = 256;

/// Color lookup table for palette formats
///
/// Mapping a color to an index picks the nearest entry by squared RGB
/// distance, so conversions into a palette are lossy.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Palette {
    entries: Vec<Color, MAX_PALETTE>,
}

impl Palette {
    /// Create an empty palette
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a palette from a list of colors
    pub fn from_colors(colors: &[Color]) -> Result<Self, ConfigError> {
        let entries = Vec::from_slice(colors).map_err(|_| ConfigError::PaletteTooLarge)?;
        Ok(Self { entries })
    }

    /// Evenly spaced gray ramp with `2^bits` entries
    pub fn grayscale(bits: u8) -> Result<Self, ConfigError> {
        if !matches!(bits, 1 | 2 | 4 | 8) {
            return Err(ConfigError::InvalidPixelFormat);
        }
        let count = 1u32 << bits;
        let step = 255 / (count - 1);
        let mut entries = Vec::new();
        for i in 0..count {
            let level = (i * step) as u8;
            // Capacity is 256 and count <= 256
            let _ = entries.push(Color::rgb(level, level, level));
        }
        Ok(Self { entries })
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the palette has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at `index`
    pub fn get(&self, index: u32) -> Option<Color> {
        self.entries.get(index as usize).copied()
    }

    /// Replace or append an entry
    pub fn set(&mut self, index: u8, color: Color) -> Result<(), ConfigError> {
        let index = index as usize;
        while self.entries.len() <= index {
            self.entries
                .push(Color::BLACK)
                .map_err(|_| ConfigError::PaletteTooLarge)?;
        }
        self.entries[index] = color;
        Ok(())
    }

    /// Color for an index; out-of-range indices read as black
    pub fn lookup(&self, index: u32) -> Color {
        self.get(index).unwrap_or(Color::BLACK)
    }

    /// Index of the closest entry (first one wins ties)
    pub fn nearest(&self, color: Color) -> u32 {
        let mut best = 0u32;
        let mut best_dist = u32::MAX;
        for (i, entry) in self.entries.iter().enumerate() {
            let dr = entry.r() as i32 - color.r() as i32;
            let dg = entry.g() as i32 - color.g() as i32;
            let db = entry.b() as i32 - color.b() as i32;
            let dist = (dr * dr + dg * dg + db * db) as u32;
            if dist < best_dist {
                best = i as u32;
                best_dist = dist;
                if dist == 0 {
                    break;
                }
            }
        }
        best
    }

    /// Check the palette can be indexed by `format`
    pub fn check_fits(&self, format: PixelFormat) -> Result<(), ConfigError> {
        if !format.is_palette() {
            return Ok(());
        }
        if self.entries.len() > 1usize << format.bits_per_pixel() {
            return Err(ConfigError::PaletteTooLarge);
        }
        Ok(())
    }

    /// All entries
    pub fn colors(&self) -> &[Color] {
        &self.entries
    }
}
