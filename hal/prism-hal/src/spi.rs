//! SPI bus abstractions
//!
//! Display controllers are write-mostly SPI devices. Many of them accept a
//! much faster clock for writes than for reads, so the bus exposes clock
//! reconfiguration between the two directions.

/// SPI bus master
pub trait SpiBus {
    /// Error type for SPI operations
    type Error: core::fmt::Debug;

    /// Write data, discarding whatever is clocked in
    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Read data (clocks out zeros)
    fn read(&mut self, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Wait until every queued byte has left the shift register
    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Change the SCLK frequency
    ///
    /// Buses that cannot retune at runtime keep their configured clock.
    fn set_frequency(&mut self, _hz: u32) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Change clock polarity and phase
    ///
    /// Buses fixed to one mode keep it.
    fn set_mode(&mut self, _mode: Mode) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Clock and mode settings a transport applies when it takes the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiConfig {
    /// Clock frequency for writes in Hz
    pub freq_write: u32,
    /// Clock frequency for reads in Hz
    pub freq_read: u32,
    pub mode: Mode,
}

/// SPI mode (combined clock polarity and phase)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// CPOL=0, CPHA=0
    #[default]
    Mode0,
    /// CPOL=0, CPHA=1
    Mode1,
    /// CPOL=1, CPHA=0
    Mode2,
    /// CPOL=1, CPHA=1
    Mode3,
}

impl Mode {
    /// Build a mode from its numeric form (0-3); higher bits are ignored
    pub const fn from_index(index: u8) -> Self {
        match index & 3 {
            0 => Mode::Mode0,
            1 => Mode::Mode1,
            2 => Mode::Mode2,
            _ => Mode::Mode3,
        }
    }
}
