//! Parallel (Intel 8080) bus abstractions
//!
//! An 8- or 16-bit data bus clocked by a WR strobe, with RD for reads and
//! RS (register select, the parallel equivalent of DC) choosing between
//! command and data cycles.

/// Data bus width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusWidth {
    /// D0-D7
    Eight,
    /// D0-D15
    Sixteen,
}

impl BusWidth {
    /// Number of bytes moved per WR strobe
    pub const fn bytes(self) -> usize {
        match self {
            BusWidth::Eight => 1,
            BusWidth::Sixteen => 2,
        }
    }
}

/// Parallel bus master
///
/// The implementation owns WR and RD strobes; RS is driven separately by
/// the transport so the same bus can serve controllers with inverted RS.
pub trait ParallelBus {
    /// Error type for bus operations
    type Error: core::fmt::Debug;

    /// Width of the data bus
    fn width(&self) -> BusWidth;

    /// Write one bus word per strobe
    ///
    /// On a 16-bit bus consecutive byte pairs form one word, high byte
    /// first. An odd trailing byte is written zero-extended.
    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Read one bus word per RD strobe
    fn read(&mut self, buf: &mut [u8]) -> Result<(), Self::Error>;
}
