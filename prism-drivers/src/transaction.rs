//! Transaction manager
//!
//! Owns the bus and counts nested transactions. The bus is physically
//! locked exactly when the depth goes 0 → 1 and released exactly when it
//! returns to 0, after any DMA transfer has drained.
//!
//! A DMA block is moved into the manager and handed back by
//! [`TransactionManager::wait_dma`], so nothing can touch an in-flight
//! buffer. A hardware error or a missed DMA deadline aborts the whole
//! transaction: depth drops to zero, the transfer is stopped, the bus is
//! reset and the caller sees [`Error::BusTimeout`].

use alloc::vec::Vec;
use core::ops::{Deref, DerefMut};

use embedded_hal::delay::DelayNs;
use prism_core::config::BusConfig;
use prism_core::{Error, Result};

use crate::bus::Bus;

/// DMA completion poll interval
const POLL_US: u32 = 10;

/// Default DMA deadline
pub const DEFAULT_DMA_TIMEOUT_MS: u32 = 100;

/// Nesting bus owner with DMA buffer custody
pub struct TransactionManager<B, D> {
    bus: B,
    delay: D,
    depth: u32,
    locked: bool,
    /// Buffer of the last DMA block, in flight or completed
    pending: Option<Vec<u8>>,
    in_flight: bool,
    /// A DMA block opened its own transaction
    auto_scope: bool,
    dma_timeout_us: u32,
}

impl<B: Bus, D: DelayNs> TransactionManager<B, D> {
    pub fn new(bus: B, delay: D) -> Self {
        Self {
            bus,
            delay,
            depth: 0,
            locked: false,
            pending: None,
            in_flight: false,
            auto_scope: false,
            dma_timeout_us: DEFAULT_DMA_TIMEOUT_MS * 1_000,
        }
    }

    /// Manager with the DMA deadline from `config`
    pub fn with_config(bus: B, delay: D, config: &BusConfig) -> Self {
        let mut manager = Self::new(bus, delay);
        manager.dma_timeout_us = config.dma_timeout_ms.saturating_mul(1_000);
        manager
    }

    /// Release bus and delay
    ///
    /// An open transaction is closed first.
    pub fn free(mut self) -> (B, D) {
        if self.depth > 0 {
            self.depth = 1;
            let _ = self.end_transaction();
        }
        (self.bus, self.delay)
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn dma_available(&self) -> bool {
        self.bus.dma_available()
    }

    pub fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    pub fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }

    /// Open a transaction, locking the bus on the outermost level
    pub fn begin_transaction(&mut self) -> Result<()> {
        if self.depth == 0 {
            let r = self.bus.lock();
            self.check(r)?;
            self.locked = true;
            trace!("bus locked");
        }
        self.depth += 1;
        Ok(())
    }

    /// Close a transaction
    ///
    /// The outermost close drains DMA and unlocks. Closing at depth 0 does
    /// nothing, so callers stay balanced after an abort.
    pub fn end_transaction(&mut self) -> Result<()> {
        if self.depth == 0 {
            return Ok(());
        }
        if self.depth == 1 {
            self.complete_dma()?;
        }
        self.depth -= 1;
        if self.depth == 0 {
            self.auto_scope = false;
            self.locked = false;
            let r = self.bus.unlock();
            self.check(r)?;
            trace!("bus released");
        }
        Ok(())
    }

    /// Open a transaction closed when the guard drops
    pub fn transaction(&mut self) -> Result<TransactionGuard<'_, B, D>> {
        self.begin_transaction()?;
        Ok(TransactionGuard {
            manager: self,
            open: true,
        })
    }

    pub fn write_command(&mut self, opcode: u32, bits: u8) -> Result<()> {
        self.scoped(|bus| bus.write_command(opcode, bits))
    }

    pub fn write_data(&mut self, value: u32, bits: u8) -> Result<()> {
        self.scoped(|bus| bus.write_data(value, bits))
    }

    /// Command followed by its parameter bytes
    pub fn write_command_params(&mut self, opcode: u32, bits: u8, params: &[u8]) -> Result<()> {
        self.scoped(|bus| {
            bus.write_command(opcode, bits)?;
            if params.is_empty() {
                Ok(())
            } else {
                bus.write_params(params)
            }
        })
    }

    pub fn write_params(&mut self, params: &[u8]) -> Result<()> {
        self.scoped(|bus| bus.write_params(params))
    }

    /// Blocking block write
    pub fn write_block(&mut self, data: &[u8]) -> Result<()> {
        self.scoped(|bus| bus.write_bytes(data))
    }

    pub fn read_bytes(&mut self, buf: &mut [u8], dummy_bits: u8) -> Result<()> {
        self.scoped(|bus| bus.read_bytes(buf, dummy_bits))
    }

    /// Queue a block for DMA
    ///
    /// Waits for the previous transfer and returns its buffer for reuse.
    /// Without DMA the block is written blocking and parked so that
    /// [`wait_dma`](Self::wait_dma) hands it back the same way.
    pub fn write_block_dma(&mut self, data: Vec<u8>) -> Result<Option<Vec<u8>>> {
        let previous = self.wait_dma()?;
        if !self.bus.dma_available() {
            self.write_block(&data)?;
            self.pending = Some(data);
            return Ok(previous);
        }

        if self.depth == 0 {
            self.begin_transaction()?;
            self.auto_scope = true;
        }
        let r = self.bus.start_dma(&data);
        // Parked before checking so an abort drops it with the transfer
        self.pending = Some(data);
        if let Err(e) = self.check(r) {
            // Refused transfers stay parked for `wait_dma`
            if self.auto_scope {
                self.end_transaction()?;
            }
            return Err(e);
        }
        self.in_flight = true;
        Ok(previous)
    }

    /// Whether a DMA transfer is still running
    pub fn dma_busy(&mut self) -> bool {
        self.in_flight && self.bus.dma_busy()
    }

    /// Wait for the last DMA block and take its buffer back
    pub fn wait_dma(&mut self) -> Result<Option<Vec<u8>>> {
        self.complete_dma()?;
        if self.auto_scope {
            self.auto_scope = false;
            self.end_transaction()?;
        }
        Ok(self.pending.take())
    }

    /// Abort the transaction and return the bus to idle
    pub fn abort(&mut self) {
        warn!("transaction aborted at depth {}", self.depth);
        if self.in_flight {
            self.bus.abort_dma();
        }
        self.bus.reset();
        if self.locked {
            let _ = self.bus.unlock();
        }
        self.depth = 0;
        self.locked = false;
        self.in_flight = false;
        self.auto_scope = false;
        self.pending = None;
    }

    /// Poll the running transfer against the deadline
    fn complete_dma(&mut self) -> Result<()> {
        if !self.in_flight {
            return Ok(());
        }
        let mut waited = 0u32;
        while self.bus.dma_busy() {
            if waited >= self.dma_timeout_us {
                error!("dma deadline missed after {} us", waited);
                self.abort();
                return Err(Error::BusTimeout);
            }
            self.delay.delay_us(POLL_US);
            waited = waited.saturating_add(POLL_US);
        }
        self.in_flight = false;
        let r = self.bus.finish_dma();
        self.check(r)
    }

    /// Run `op` inside a transaction, opening one when none is active
    ///
    /// A transaction opened here is closed again whatever `op` returns.
    fn scoped<T>(&mut self, op: impl FnOnce(&mut B) -> Result<T>) -> Result<T> {
        self.complete_dma()?;
        let auto = self.depth == 0;
        if auto {
            self.begin_transaction()?;
        }
        let r = op(&mut self.bus);
        let r = self.check(r);
        if auto {
            let closed = self.end_transaction();
            return r.and_then(|value| closed.map(|_| value));
        }
        r
    }

    /// Abort on hardware failure
    fn check<T>(&mut self, r: Result<T>) -> Result<T> {
        if let Err(Error::BusTimeout) = r {
            self.abort();
        }
        r
    }
}

/// Scope guard closing a transaction on drop
pub struct TransactionGuard<'m, B: Bus, D: DelayNs> {
    manager: &'m mut TransactionManager<B, D>,
    open: bool,
}

impl<B: Bus, D: DelayNs> TransactionGuard<'_, B, D> {
    /// Close the transaction and report the result
    pub fn finish(mut self) -> Result<()> {
        self.open = false;
        self.manager.end_transaction()
    }
}

impl<B: Bus, D: DelayNs> Deref for TransactionGuard<'_, B, D> {
    type Target = TransactionManager<B, D>;

    fn deref(&self) -> &Self::Target {
        self.manager
    }
}

impl<B: Bus, D: DelayNs> DerefMut for TransactionGuard<'_, B, D> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.manager
    }
}

impl<B: Bus, D: DelayNs> Drop for TransactionGuard<'_, B, D> {
    fn drop(&mut self) {
        if self.open {
            let _ = self.manager.end_transaction();
        }
    }
}
