//! 8/16-bit parallel (Intel 8080) transport
//!
//! RS low marks command cycles, RS high data cycles. On a 16-bit bus
//! commands and parameters travel one byte per cycle on the low lines;
//! pixel blocks use the full width.

use prism_core::config::BusKind;
use prism_core::Result;
use prism_hal::parallel::BusWidth;
use prism_hal::{NoPin, OutputPin, ParallelBus};

use super::{hw_error, value_bytes, Bus};

/// Parallel transport with an RS line and an optional CS line
pub struct ParallelTransport<P, RS, CS = NoPin> {
    bus: P,
    rs: RS,
    cs: CS,
}

impl<P, RS> ParallelTransport<P, RS, NoPin>
where
    P: ParallelBus,
    RS: OutputPin,
{
    /// Transport for a panel with its CS tied low
    pub fn new(bus: P, rs: RS) -> Self {
        Self::with_cs(bus, rs, NoPin)
    }
}

impl<P, RS, CS> ParallelTransport<P, RS, CS>
where
    P: ParallelBus,
    RS: OutputPin,
    CS: OutputPin,
{
    pub fn with_cs(bus: P, mut rs: RS, mut cs: CS) -> Self {
        rs.set_high();
        cs.set_high();
        Self { bus, rs, cs }
    }

    /// Release the peripherals
    pub fn free(self) -> (P, RS, CS) {
        (self.bus, self.rs, self.cs)
    }

    /// Write bytes one per bus cycle regardless of width
    fn write_narrow(&mut self, bytes: &[u8]) -> Result<()> {
        match self.bus.width() {
            BusWidth::Eight => self.bus.write(bytes).map_err(hw_error),
            BusWidth::Sixteen => {
                for &b in bytes {
                    self.bus.write(&[0, b]).map_err(hw_error)?;
                }
                Ok(())
            }
        }
    }
}

impl<P, RS, CS> Bus for ParallelTransport<P, RS, CS>
where
    P: ParallelBus,
    RS: OutputPin,
    CS: OutputPin,
{
    fn kind(&self) -> BusKind {
        match self.bus.width() {
            BusWidth::Eight => BusKind::Parallel8,
            BusWidth::Sixteen => BusKind::Parallel16,
        }
    }

    fn lock(&mut self) -> Result<()> {
        self.cs.set_low();
        Ok(())
    }

    fn unlock(&mut self) -> Result<()> {
        self.cs.set_high();
        Ok(())
    }

    fn write_command(&mut self, opcode: u32, bits: u8) -> Result<()> {
        self.rs.set_low();
        let result = self.write_narrow(&value_bytes(opcode, bits));
        self.rs.set_high();
        result
    }

    fn write_data(&mut self, value: u32, bits: u8) -> Result<()> {
        self.write_narrow(&value_bytes(value, bits))
    }

    fn write_params(&mut self, params: &[u8]) -> Result<()> {
        self.write_narrow(params)
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.bus.write(data).map_err(hw_error)
    }

    fn read_bytes(&mut self, buf: &mut [u8], dummy_bits: u8) -> Result<()> {
        // A parallel dummy read is one whole bus cycle
        if dummy_bits > 0 {
            let mut dummy = [0u8; 2];
            let width = self.bus.width().bytes();
            self.bus.read(&mut dummy[..width]).map_err(hw_error)?;
        }
        self.bus.read(buf).map_err(hw_error)
    }
}
