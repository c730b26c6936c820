//! Shared test doubles: a recording bus and a counting delay

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use prism_core::config::BusKind;
use prism_core::{Error, ProtocolError, Result};

use crate::bus::{value_bytes, Bus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Lock,
    Unlock,
    Command(u32),
    Data(Vec<u8>),
    Dma(Vec<u8>),
    Read(usize),
    AbortDma,
    Reset,
}

#[derive(Default)]
pub struct Wire {
    pub events: Vec<Event>,
    pub reads: VecDeque<u8>,
    pub dma: bool,
    /// Polls a started transfer stays busy for
    pub dma_polls: u32,
    /// Transfers never complete
    pub stuck: bool,
    pub busy_left: u32,
    pub fail_writes: bool,
    /// Every operation is refused as unsupported
    pub reject: bool,
}

#[derive(Clone, Default)]
pub struct MockBus(pub Rc<RefCell<Wire>>);

impl MockBus {
    pub fn with_dma(polls: u32) -> Self {
        let bus = Self::default();
        bus.0.borrow_mut().dma = true;
        bus.0.borrow_mut().dma_polls = polls;
        bus
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().events.clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().events.clear();
    }

    pub fn count(&self, event: &Event) -> usize {
        self.0.borrow().events.iter().filter(|e| *e == event).count()
    }

    pub fn queue_read(&self, bytes: &[u8]) {
        self.0.borrow_mut().reads.extend(bytes.iter().copied());
    }

    /// Commands with the data bytes written after each, in order
    ///
    /// DMA payloads count as data of the preceding command.
    pub fn transcript(&self) -> Vec<(u32, Vec<u8>)> {
        let mut out: Vec<(u32, Vec<u8>)> = Vec::new();
        for e in &self.0.borrow().events {
            match e {
                Event::Command(c) => out.push((*c, Vec::new())),
                Event::Data(d) | Event::Dma(d) => {
                    if let Some(last) = out.last_mut() {
                        last.1.extend_from_slice(d);
                    }
                }
                _ => {}
            }
        }
        out
    }

    fn record(&self, event: Event) -> Result<()> {
        let mut wire = self.0.borrow_mut();
        if wire.fail_writes {
            return Err(Error::BusTimeout);
        }
        if wire.reject {
            return Err(ProtocolError::Unsupported.into());
        }
        wire.events.push(event);
        Ok(())
    }
}

impl Bus for MockBus {
    fn kind(&self) -> BusKind {
        BusKind::Spi
    }

    fn lock(&mut self) -> Result<()> {
        let mut wire = self.0.borrow_mut();
        if wire.fail_writes {
            return Err(Error::BusTimeout);
        }
        wire.events.push(Event::Lock);
        Ok(())
    }

    fn unlock(&mut self) -> Result<()> {
        self.0.borrow_mut().events.push(Event::Unlock);
        Ok(())
    }

    fn write_command(&mut self, opcode: u32, _bits: u8) -> Result<()> {
        self.record(Event::Command(opcode))
    }

    fn write_data(&mut self, value: u32, bits: u8) -> Result<()> {
        self.record(Event::Data(value_bytes(value, bits).to_vec()))
    }

    fn write_params(&mut self, params: &[u8]) -> Result<()> {
        self.record(Event::Data(params.to_vec()))
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.record(Event::Data(data.to_vec()))
    }

    fn read_bytes(&mut self, buf: &mut [u8], _dummy_bits: u8) -> Result<()> {
        let mut wire = self.0.borrow_mut();
        if wire.reject {
            return Err(ProtocolError::Unsupported.into());
        }
        wire.events.push(Event::Read(buf.len()));
        for b in buf.iter_mut() {
            *b = wire.reads.pop_front().unwrap_or(0);
        }
        Ok(())
    }

    fn dma_available(&self) -> bool {
        self.0.borrow().dma
    }

    fn start_dma(&mut self, data: &[u8]) -> Result<()> {
        if !self.0.borrow().dma {
            return Err(ProtocolError::Unsupported.into());
        }
        self.record(Event::Dma(data.to_vec()))?;
        let mut wire = self.0.borrow_mut();
        wire.busy_left = wire.dma_polls;
        Ok(())
    }

    fn dma_busy(&mut self) -> bool {
        let mut wire = self.0.borrow_mut();
        if wire.stuck {
            return true;
        }
        if wire.busy_left > 0 {
            wire.busy_left -= 1;
            return true;
        }
        false
    }

    fn abort_dma(&mut self) {
        self.0.borrow_mut().events.push(Event::AbortDma);
    }

    fn reset(&mut self) {
        self.0.borrow_mut().events.push(Event::Reset);
    }
}

/// Delay that only counts elapsed nanoseconds
#[derive(Clone, Default)]
pub struct MockDelay(pub Rc<Cell<u64>>);

impl MockDelay {
    pub fn elapsed_us(&self) -> u64 {
        self.0.get() / 1_000
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.0.set(self.0.get() + ns as u64);
    }
}
