//! I2C bus abstractions
//!
//! Small monochrome controllers (SSD1306, SH1106) sit on I2C. Every write
//! starts with a control byte that tells the controller whether the rest of
//! the transfer is commands or display data.

/// I2C bus master
pub trait I2cBus {
    /// Error type for I2C operations
    type Error: core::fmt::Debug;

    /// Write data to a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `data` - Bytes to write
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Read data from a device at the given address
    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Write then read in a single transaction (repeated start)
    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error>;
}

/// Addressing and clock of one I2C peripheral
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2cConfig {
    /// 7-bit device address
    pub address: u8,
    /// Clock frequency in Hz
    pub frequency: u32,
}

impl I2cConfig {
    /// Check that the address fits in 7 bits
    pub const fn is_valid(&self) -> bool {
        self.address <= 0x7F
    }
}
