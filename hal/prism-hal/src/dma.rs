//! DMA channel abstractions
//!
//! A DMA channel streams a memory block into the peripheral behind a
//! transport without CPU involvement. Completion is observed by polling;
//! transfer errors are only reported once the transfer is finished.
//!
//! # Buffer contract
//!
//! [`DmaChannel::start`] hands the channel a slice whose address the
//! hardware keeps reading after the call returns. The caller must keep
//! the bytes alive and unmodified until [`DmaChannel::is_busy`] reports
//! `false` or [`DmaChannel::abort`] returns. The transaction manager in
//! `prism-drivers` upholds this by owning the buffer for the whole
//! transfer.

/// Memory-to-peripheral DMA channel
pub trait DmaChannel {
    /// Error type reported at completion
    type Error: core::fmt::Debug;

    /// Whether a channel is actually wired up
    fn is_available(&self) -> bool {
        true
    }

    /// Queue a transfer and return immediately
    fn start(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Whether the last started transfer is still running
    fn is_busy(&mut self) -> bool;

    /// Collect the completion status of the last transfer
    ///
    /// Only meaningful once [`is_busy`](Self::is_busy) returned `false`.
    fn finish(&mut self) -> Result<(), Self::Error>;

    /// Stop the running transfer, if any
    ///
    /// There is no way to resume an aborted transfer.
    fn abort(&mut self);
}

/// Transport without a DMA channel
///
/// Reports itself unavailable so block writes stay synchronous.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NoDma;

/// Error type of [`NoDma`]; it can never be produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NoDmaError {}

impl DmaChannel for NoDma {
    type Error = NoDmaError;

    fn is_available(&self) -> bool {
        false
    }

    fn start(&mut self, _data: &[u8]) -> Result<(), Self::Error> {
        Ok(())
    }

    fn is_busy(&mut self) -> bool {
        false
    }

    fn finish(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn abort(&mut self) {}
}
