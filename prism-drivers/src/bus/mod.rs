//! Display bus transports
//!
//! A [`Bus`] is the capability set a panel needs from its transport:
//! acquire/release, command and data phases, block reads and optional
//! DMA. Each transport adapts one `prism-hal` peripheral trait.
//!
//! Hardware errors are reported as [`Error::BusTimeout`]; the transaction
//! manager turns them into an aborted transaction.

pub mod i2c;
pub mod parallel;
pub mod rgb;
pub mod spi;

use prism_core::config::BusKind;
use prism_core::{Error, ProtocolError, Result};

pub use i2c::I2cTransport;
pub use parallel::ParallelTransport;
pub use rgb::RgbTransport;
pub use spi::SpiTransport;

/// Transport capability interface
pub trait Bus {
    /// Which transport this is
    fn kind(&self) -> BusKind;

    /// Acquire the bus (assert chip select, apply the write clock)
    fn lock(&mut self) -> Result<()>;

    /// Release the bus once all queued bytes are out
    fn unlock(&mut self) -> Result<()>;

    /// Send a command opcode of `bits` width
    fn write_command(&mut self, opcode: u32, bits: u8) -> Result<()>;

    /// Send one data value of `bits` width, most significant byte first
    fn write_data(&mut self, value: u32, bits: u8) -> Result<()>;

    /// Send command parameters, one bus cycle per byte
    fn write_params(&mut self, params: &[u8]) -> Result<()> {
        for &p in params {
            self.write_data(p as u32, 8)?;
        }
        Ok(())
    }

    /// Send a block of data bytes (pixel stream)
    fn write_bytes(&mut self, data: &[u8]) -> Result<()>;

    /// Read `buf.len()` bytes after skipping `dummy_bits` clock cycles
    fn read_bytes(&mut self, buf: &mut [u8], dummy_bits: u8) -> Result<()>;

    /// Whether [`start_dma`](Bus::start_dma) can be used
    fn dma_available(&self) -> bool {
        false
    }

    /// Start streaming `data` in the background
    ///
    /// The caller keeps `data` alive and unchanged until the transfer is
    /// finished or aborted.
    fn start_dma(&mut self, _data: &[u8]) -> Result<()> {
        Err(ProtocolError::Unsupported.into())
    }

    /// Whether a started transfer is still running
    fn dma_busy(&mut self) -> bool {
        false
    }

    /// Collect the completion status of the last transfer
    fn finish_dma(&mut self) -> Result<()> {
        Ok(())
    }

    /// Stop a running transfer
    fn abort_dma(&mut self) {}

    /// Return the transport to its idle state after a failure
    fn reset(&mut self) {}
}

/// Big-endian bytes of the low `bits` of `value`
///
/// `bits` is rounded up to whole bytes and capped at 32.
pub(crate) fn value_bytes(value: u32, bits: u8) -> heapless::Vec<u8, 4> {
    let count = (bits.clamp(8, 32) as usize).div_ceil(8);
    let be = value.to_be_bytes();
    // count <= 4
    heapless::Vec::from_slice(&be[4 - count..]).unwrap_or_default()
}

/// Drop `dummy_bits` leading bits from a read
///
/// `head` holds the bytes clocked in before `buf`; its length is
/// `dummy_bits.div_ceil(8)`. Bits are realigned across the whole stream.
pub(crate) fn strip_dummy_bits(head: &[u8], buf: &mut [u8], dummy_bits: u8) {
    let frac = (dummy_bits % 8) as u32;
    if frac == 0 || head.is_empty() {
        return;
    }
    let mut prev = head[head.len() - 1];
    for b in buf.iter_mut() {
        let cur = *b;
        *b = (prev << frac) | (cur >> (8 - frac));
        prev = cur;
    }
}

/// Map a peripheral error onto the Prism taxonomy
pub(crate) fn hw_error<E: core::fmt::Debug>(_e: E) -> Error {
    warn!("bus hardware error");
    Error::BusTimeout
}
