//! Configuration type definitions
//!
//! Every option maps 1:1 onto a field. Validation checks the invariants a
//! driver relies on; out-of-range rotations are masked where they are used
//! instead of rejected.

use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Maximum device name length
pub const MAX_NAME_LEN: usize = 16;

/// Transport connecting the host to the panel controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BusKind {
    #[default]
    Spi,
    I2c,
    Parallel8,
    Parallel16,
    Rgb,
}

/// Panel geometry and controller options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PanelConfig {
    /// Controller frame memory width
    pub memory_width: u16,
    /// Controller frame memory height
    pub memory_height: u16,
    /// Visible width
    pub panel_width: u16,
    /// Visible height
    pub panel_height: u16,
    /// Column of the first visible pixel in controller memory
    pub offset_x: u16,
    /// Row of the first visible pixel in controller memory
    pub offset_y: u16,
    /// Added to every requested rotation (0-7)
    pub offset_rotation: u8,
    /// Panel needs inverted colors for a normal image
    pub invert: bool,
    /// Panel expects RGB subpixel order; BGR otherwise
    pub rgb_order: bool,
    /// Controller supports read-back
    pub readable: bool,
    /// Dummy clock bits before read data
    pub dummy_read_bits: u8,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            memory_width: 240,
            memory_height: 320,
            panel_width: 240,
            panel_height: 320,
            offset_x: 0,
            offset_y: 0,
            offset_rotation: 0,
            invert: false,
            rgb_order: false,
            readable: true,
            dummy_read_bits: 1,
        }
    }
}

impl PanelConfig {
    /// Panel of `width` x `height` filling the controller memory
    pub const fn new(width: u16, height: u16) -> Self {
        Self {
            memory_width: width,
            memory_height: height,
            panel_width: width,
            panel_height: height,
            offset_x: 0,
            offset_y: 0,
            offset_rotation: 0,
            invert: false,
            rgb_order: false,
            readable: true,
            dummy_read_bits: 1,
        }
    }

    /// Check the visible area lies inside controller memory
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.panel_width == 0 || self.panel_height == 0 {
            return Err(ConfigError::InvalidGeometry);
        }
        if self.memory_width == 0 || self.memory_height == 0 {
            return Err(ConfigError::InvalidGeometry);
        }
        let right = self.offset_x as u32 + self.panel_width as u32;
        let bottom = self.offset_y as u32 + self.panel_height as u32;
        if right > self.memory_width as u32 || bottom > self.memory_height as u32 {
            return Err(ConfigError::PanelOutOfMemory);
        }
        Ok(())
    }
}

/// Bus parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BusConfig {
    pub kind: BusKind,
    /// Write clock in Hz
    pub freq_write: u32,
    /// Read clock in Hz
    pub freq_read: u32,
    /// SPI mode 0-3
    pub spi_mode: u8,
    /// 7-bit I2C address
    pub i2c_address: u8,
    /// Other devices share the bus; re-clock on every acquire
    pub bus_shared: bool,
    /// DMA channel, `None` for blocking writes only
    pub dma_channel: Option<u8>,
    /// Deadline for one DMA transfer
    pub dma_timeout_ms: u32,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            kind: BusKind::Spi,
            freq_write: 40_000_000,
            freq_read: 16_000_000,
            spi_mode: 0,
            i2c_address: 0x3C,
            bus_shared: false,
            dma_channel: None,
            dma_timeout_ms: 100,
        }
    }
}

impl BusConfig {
    /// Check clocks and addressing are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.freq_write == 0 || self.freq_read == 0 {
            return Err(ConfigError::InvalidBus);
        }
        match self.kind {
            BusKind::Spi if self.spi_mode > 3 => Err(ConfigError::InvalidBus),
            BusKind::I2c if self.i2c_address > 0x7F => Err(ConfigError::InvalidBus),
            _ => Ok(()),
        }
    }
}

/// Complete display configuration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DisplayConfig {
    /// Device profile name, e.g. "ili9341"
    pub device: String<MAX_NAME_LEN>,
    /// Rotation applied after init (0-7)
    pub rotation: u8,
    pub panel: PanelConfig,
    pub bus: BusConfig,
}

impl DisplayConfig {
    /// Check every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.device.is_empty() {
            return Err(ConfigError::UnknownDevice);
        }
        self.panel.validate()?;
        self.bus.validate()
    }
}
