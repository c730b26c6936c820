//! 4-wire SPI transport
//!
//! Chip select frames a transaction; the DC line selects command (low) or
//! data (high) for every byte on the wire. Reads run at the separate read
//! clock and switch back to the write clock afterwards. A DMA channel is
//! only used when the configuration names one.

use prism_core::config::{BusConfig, BusKind};
use prism_core::Result;
use prism_hal::{DmaChannel, Mode, NoDma, OutputPin, SpiBus, SpiConfig};

use super::{hw_error, strip_dummy_bits, value_bytes, Bus};

/// Longest dummy prefix a read can request, in bytes
const MAX_DUMMY_BYTES: usize = 4;

/// SPI transport with CS and DC lines and an optional DMA channel
pub struct SpiTransport<SPI, CS, DC, DMA = NoDma> {
    spi: SPI,
    cs: CS,
    dc: DC,
    dma: DMA,
    /// `dma_channel` was configured
    dma_enabled: bool,
    settings: SpiConfig,
    shared: bool,
    /// Write clock applied since the last reset
    clocked: bool,
}

/// SPI settings carried by the bus section of the configuration
pub fn spi_config(config: &BusConfig) -> SpiConfig {
    SpiConfig {
        freq_write: config.freq_write,
        freq_read: config.freq_read,
        mode: Mode::from_index(config.spi_mode),
    }
}

impl<SPI, CS, DC> SpiTransport<SPI, CS, DC, NoDma>
where
    SPI: SpiBus,
    CS: OutputPin,
    DC: OutputPin,
{
    /// Create a blocking-only transport
    pub fn new(spi: SPI, cs: CS, dc: DC, config: &BusConfig) -> Self {
        Self::with_dma(spi, cs, dc, NoDma, config)
    }
}

impl<SPI, CS, DC, DMA> SpiTransport<SPI, CS, DC, DMA>
where
    SPI: SpiBus,
    CS: OutputPin,
    DC: OutputPin,
    DMA: DmaChannel,
{
    /// Create a transport that streams blocks through `dma`
    pub fn with_dma(spi: SPI, mut cs: CS, mut dc: DC, dma: DMA, config: &BusConfig) -> Self {
        cs.set_high();
        dc.set_high();
        Self {
            spi,
            cs,
            dc,
            dma,
            dma_enabled: config.dma_channel.is_some(),
            settings: spi_config(config),
            shared: config.bus_shared,
            clocked: false,
        }
    }

    /// Clock and mode applied on every acquire
    pub fn settings(&self) -> SpiConfig {
        self.settings
    }

    /// Release the peripherals
    pub fn free(self) -> (SPI, CS, DC, DMA) {
        (self.spi, self.cs, self.dc, self.dma)
    }

    fn send(&mut self, data: &[u8]) -> Result<()> {
        self.spi.write(data).map_err(hw_error)
    }
}

impl<SPI, CS, DC, DMA> Bus for SpiTransport<SPI, CS, DC, DMA>
where
    SPI: SpiBus,
    CS: OutputPin,
    DC: OutputPin,
    DMA: DmaChannel,
{
    fn kind(&self) -> BusKind {
        BusKind::Spi
    }

    fn lock(&mut self) -> Result<()> {
        // Another device may have changed the clock since our last turn
        if self.shared || !self.clocked {
            self.spi.set_mode(self.settings.mode).map_err(hw_error)?;
            self.spi
                .set_frequency(self.settings.freq_write)
                .map_err(hw_error)?;
            self.clocked = true;
        }
        self.cs.set_low();
        Ok(())
    }

    fn unlock(&mut self) -> Result<()> {
        let flushed = self.spi.flush().map_err(hw_error);
        self.cs.set_high();
        flushed
    }

    fn write_command(&mut self, opcode: u32, bits: u8) -> Result<()> {
        self.dc.set_low();
        let result = self.send(&value_bytes(opcode, bits));
        self.dc.set_high();
        result
    }

    fn write_data(&mut self, value: u32, bits: u8) -> Result<()> {
        self.send(&value_bytes(value, bits))
    }

    fn write_params(&mut self, params: &[u8]) -> Result<()> {
        self.send(params)
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.send(data)
    }

    fn read_bytes(&mut self, buf: &mut [u8], dummy_bits: u8) -> Result<()> {
        let head_len = (dummy_bits as usize).div_ceil(8).min(MAX_DUMMY_BYTES);
        let mut head = [0u8; MAX_DUMMY_BYTES];

        self.spi.flush().map_err(hw_error)?;
        self.spi
            .set_frequency(self.settings.freq_read)
            .map_err(hw_error)?;
        let mut result = self.spi.read(&mut head[..head_len]).map_err(hw_error);
        if result.is_ok() {
            result = self.spi.read(buf).map_err(hw_error);
        }
        let restored = self
            .spi
            .set_frequency(self.settings.freq_write)
            .map_err(hw_error);
        result?;
        restored?;

        strip_dummy_bits(&head[..head_len], buf, dummy_bits);
        Ok(())
    }

    fn dma_available(&self) -> bool {
        self.dma_enabled && self.dma.is_available()
    }

    fn start_dma(&mut self, data: &[u8]) -> Result<()> {
        self.dc.set_high();
        self.dma.start(data).map_err(hw_error)
    }

    fn dma_busy(&mut self) -> bool {
        self.dma.is_busy()
    }

    fn finish_dma(&mut self) -> Result<()> {
        self.dma.finish().map_err(hw_error)
    }

    fn abort_dma(&mut self) {
        self.dma.abort();
    }

    fn reset(&mut self) {
        self.dma.abort();
        self.cs.set_high();
        self.dc.set_high();
        self.clocked = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::vec::Vec;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Wire {
        Cs(bool),
        Dc(bool),
        Clock(u32),
        Mode(Mode),
        Tx(Vec<u8>),
        Rx(usize),
    }

    type Log = Rc<RefCell<Vec<Wire>>>;

    struct MockSpi {
        log: Log,
        rx: Vec<u8>,
        fail: bool,
    }

    impl SpiBus for MockSpi {
        type Error = ();

        fn write(&mut self, data: &[u8]) -> core::result::Result<(), ()> {
            if self.fail {
                return Err(());
            }
            self.log.borrow_mut().push(Wire::Tx(data.to_vec()));
            Ok(())
        }

        fn read(&mut self, buf: &mut [u8]) -> core::result::Result<(), ()> {
            self.log.borrow_mut().push(Wire::Rx(buf.len()));
            for b in buf.iter_mut() {
                *b = if self.rx.is_empty() { 0 } else { self.rx.remove(0) };
            }
            Ok(())
        }

        fn set_frequency(&mut self, hz: u32) -> core::result::Result<(), ()> {
            self.log.borrow_mut().push(Wire::Clock(hz));
            Ok(())
        }

        fn set_mode(&mut self, mode: Mode) -> core::result::Result<(), ()> {
            self.log.borrow_mut().push(Wire::Mode(mode));
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockDma {
        started: Vec<Vec<u8>>,
    }

    impl DmaChannel for MockDma {
        type Error = ();

        fn start(&mut self, data: &[u8]) -> core::result::Result<(), ()> {
            self.started.push(data.to_vec());
            Ok(())
        }

        fn is_busy(&mut self) -> bool {
            false
        }

        fn finish(&mut self) -> core::result::Result<(), ()> {
            Ok(())
        }

        fn abort(&mut self) {}
    }

    struct MockPin {
        log: Log,
        cs: bool,
    }

    impl OutputPin for MockPin {
        fn set_high(&mut self) {
            let event = if self.cs { Wire::Cs(true) } else { Wire::Dc(true) };
            self.log.borrow_mut().push(event);
        }

        fn set_low(&mut self) {
            let event = if self.cs { Wire::Cs(false) } else { Wire::Dc(false) };
            self.log.borrow_mut().push(event);
        }
    }

    fn transport(config: &BusConfig) -> (SpiTransport<MockSpi, MockPin, MockPin>, Log) {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let spi = MockSpi {
            log: log.clone(),
            rx: Vec::new(),
            fail: false,
        };
        let cs = MockPin {
            log: log.clone(),
            cs: true,
        };
        let dc = MockPin {
            log: log.clone(),
            cs: false,
        };
        let t = SpiTransport::new(spi, cs, dc, config);
        log.borrow_mut().clear();
        (t, log)
    }

    #[test]
    fn test_command_frames_dc_low() {
        let (mut t, log) = transport(&BusConfig::default());
        t.lock().unwrap();
        t.write_command(0x2A, 8).unwrap();
        t.write_data(0x0010, 16).unwrap();
        t.unlock().unwrap();

        assert_eq!(
            *log.borrow(),
            [
                Wire::Mode(Mode::Mode0),
                Wire::Clock(40_000_000),
                Wire::Cs(false),
                Wire::Dc(false),
                Wire::Tx([0x2A].to_vec()),
                Wire::Dc(true),
                Wire::Tx([0x00, 0x10].to_vec()),
                Wire::Cs(true),
            ]
        );
    }

    #[test]
    fn test_shared_bus_reclocks_every_lock() {
        let config = BusConfig {
            bus_shared: true,
            ..Default::default()
        };
        let (mut t, log) = transport(&config);
        for _ in 0..2 {
            t.lock().unwrap();
            t.unlock().unwrap();
        }
        let clocks = log.borrow().iter().filter(|w| matches!(w, Wire::Clock(_))).count();
        assert_eq!(clocks, 2);

        let (mut t, log) = transport(&BusConfig::default());
        for _ in 0..2 {
            t.lock().unwrap();
            t.unlock().unwrap();
        }
        let clocks = log.borrow().iter().filter(|w| matches!(w, Wire::Clock(_))).count();
        assert_eq!(clocks, 1);
    }

    #[test]
    fn test_configured_mode_applied_on_lock() {
        let config = BusConfig {
            spi_mode: 3,
            freq_write: 20_000_000,
            ..Default::default()
        };
        let (mut t, log) = transport(&config);
        assert_eq!(t.settings().mode, Mode::Mode3);
        t.lock().unwrap();
        assert_eq!(
            log.borrow()[..2],
            [Wire::Mode(Mode::Mode3), Wire::Clock(20_000_000)]
        );
    }

    #[test]
    fn test_dma_needs_configured_channel() {
        let spi = |log: &Log| MockSpi {
            log: log.clone(),
            rx: Vec::new(),
            fail: false,
        };
        let pin = |log: &Log, cs| MockPin {
            log: log.clone(),
            cs,
        };
        let log: Log = Rc::new(RefCell::new(Vec::new()));

        let t = SpiTransport::with_dma(
            spi(&log),
            pin(&log, true),
            pin(&log, false),
            MockDma::default(),
            &BusConfig::default(),
        );
        assert!(!t.dma_available());

        let config = BusConfig {
            dma_channel: Some(1),
            ..Default::default()
        };
        let mut t = SpiTransport::with_dma(
            spi(&log),
            pin(&log, true),
            pin(&log, false),
            MockDma::default(),
            &config,
        );
        assert!(t.dma_available());
        t.start_dma(&[1, 2, 3]).unwrap();
        let (_, _, _, dma) = t.free();
        assert_eq!(dma.started, [[1, 2, 3].to_vec()]);
    }

    #[test]
    fn test_read_uses_read_clock_and_strips_dummy() {
        let (mut t, log) = transport(&BusConfig::default());
        // One dummy bit in front of 0x93 0x41
        t.spi.rx = [0x93 >> 1, 0x80 | (0x41 >> 1), 0x80].to_vec();
        let mut id = [0u8; 2];
        t.read_bytes(&mut id, 1).unwrap();
        assert_eq!(id, [0x93, 0x41]);

        let log = log.borrow();
        assert_eq!(log[0], Wire::Clock(16_000_000));
        assert_eq!(log[1], Wire::Rx(1));
        assert_eq!(log[3], Wire::Clock(40_000_000));
    }

    #[test]
    fn test_hw_failure_is_bus_timeout() {
        let (mut t, _log) = transport(&BusConfig::default());
        t.spi.fail = true;
        assert_eq!(t.write_bytes(&[1, 2, 3]), Err(prism_core::Error::BusTimeout));
    }
}
