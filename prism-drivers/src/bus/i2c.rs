//! I2C transport
//!
//! Every write is one I2C transaction to the panel's 7-bit address,
//! starting with a control byte that selects the command or data
//! register. Long data blocks are split into bounded transactions.

use heapless::Vec;
use prism_core::config::{BusConfig, BusKind};
use prism_core::{ConfigError, Result};
use prism_hal::{I2cBus, I2cConfig};

use super::{hw_error, value_bytes, Bus};

/// Control byte announcing command bytes
pub const CONTROL_COMMAND: u8 = 0x00;

/// Control byte announcing data bytes
pub const CONTROL_DATA: u8 = 0x40;

/// Data bytes sent per I2C transaction
const CHUNK: usize = 32;

/// I2C transport
pub struct I2cTransport<I2C> {
    i2c: I2C,
    settings: I2cConfig,
}

impl<I2C: I2cBus> I2cTransport<I2C> {
    /// Create a transport for the configured address
    ///
    /// The write clock of `config` is the bus clock; I2C has no separate
    /// read rate.
    pub fn new(i2c: I2C, config: &BusConfig) -> Result<Self> {
        let settings = I2cConfig {
            address: config.i2c_address,
            frequency: config.freq_write,
        };
        if !settings.is_valid() {
            return Err(ConfigError::InvalidBus.into());
        }
        Ok(Self { i2c, settings })
    }

    /// Address and clock this transport was built for
    pub fn settings(&self) -> I2cConfig {
        self.settings
    }

    /// Release the peripheral
    pub fn free(self) -> I2C {
        self.i2c
    }

    pub fn address(&self) -> u8 {
        self.settings.address
    }

    fn send(&mut self, control: u8, payload: &[u8]) -> Result<()> {
        for chunk in payload.chunks(CHUNK) {
            let mut frame: Vec<u8, { CHUNK + 1 }> = Vec::new();
            // Capacity covers the control byte plus one chunk
            let _ = frame.push(control);
            let _ = frame.extend_from_slice(chunk);
            self.i2c.write(self.settings.address, &frame).map_err(hw_error)?;
        }
        Ok(())
    }
}

impl<I2C: I2cBus> Bus for I2cTransport<I2C> {
    fn kind(&self) -> BusKind {
        BusKind::I2c
    }

    fn lock(&mut self) -> Result<()> {
        Ok(())
    }

    fn unlock(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_command(&mut self, opcode: u32, bits: u8) -> Result<()> {
        self.send(CONTROL_COMMAND, &value_bytes(opcode, bits))
    }

    fn write_data(&mut self, value: u32, bits: u8) -> Result<()> {
        self.send(CONTROL_DATA, &value_bytes(value, bits))
    }

    fn write_params(&mut self, params: &[u8]) -> Result<()> {
        self.send(CONTROL_DATA, params)
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.send(CONTROL_DATA, data)
    }

    fn read_bytes(&mut self, buf: &mut [u8], _dummy_bits: u8) -> Result<()> {
        self.i2c
            .write_read(self.settings.address, &[CONTROL_DATA], buf)
            .map_err(hw_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec as StdVec;

    #[derive(Default)]
    struct MockI2c {
        frames: StdVec<(u8, StdVec<u8>)>,
        nack: bool,
    }

    impl I2cBus for MockI2c {
        type Error = ();

        fn write(&mut self, address: u8, data: &[u8]) -> core::result::Result<(), ()> {
            if self.nack {
                return Err(());
            }
            self.frames.push((address, data.to_vec()));
            Ok(())
        }

        fn read(&mut self, _address: u8, buf: &mut [u8]) -> core::result::Result<(), ()> {
            buf.fill(0xA5);
            Ok(())
        }

        fn write_read(
            &mut self,
            address: u8,
            data: &[u8],
            buf: &mut [u8],
        ) -> core::result::Result<(), ()> {
            self.write(address, data)?;
            self.read(address, buf)
        }
    }

    fn config(address: u8) -> BusConfig {
        BusConfig {
            kind: BusKind::I2c,
            i2c_address: address,
            ..Default::default()
        }
    }

    #[test]
    fn test_control_bytes() {
        let mut t = I2cTransport::new(MockI2c::default(), &config(0x3C)).unwrap();
        t.write_command(0xAF, 8).unwrap();
        t.write_params(&[0x10, 0x20]).unwrap();

        let i2c = t.free();
        assert_eq!(i2c.frames[0], (0x3C, [0x00, 0xAF].to_vec()));
        assert_eq!(i2c.frames[1], (0x3C, [0x40, 0x10, 0x20].to_vec()));
    }

    #[test]
    fn test_long_block_is_chunked() {
        let mut t = I2cTransport::new(MockI2c::default(), &config(0x3D)).unwrap();
        let data = [0x55u8; 70];
        t.write_bytes(&data).unwrap();

        let i2c = t.free();
        let sizes: StdVec<usize> = i2c.frames.iter().map(|(_, f)| f.len()).collect();
        assert_eq!(sizes, [33, 33, 7]);
        assert!(i2c.frames.iter().all(|(_, f)| f[0] == CONTROL_DATA));
    }

    #[test]
    fn test_invalid_address() {
        assert!(I2cTransport::new(MockI2c::default(), &config(0x80)).is_err());
    }

    #[test]
    fn test_settings_follow_config() {
        let bus = BusConfig {
            freq_write: 1_000_000,
            ..config(0x3D)
        };
        let t = I2cTransport::new(MockI2c::default(), &bus).unwrap();
        assert_eq!(t.settings(), I2cConfig { address: 0x3D, frequency: 1_000_000 });
        assert_eq!(t.address(), 0x3D);
    }

    #[test]
    fn test_nack_is_bus_timeout() {
        let mut t = I2cTransport::new(
            MockI2c {
                nack: true,
                ..Default::default()
            },
            &config(0x3C),
        )
        .unwrap();
        assert_eq!(t.write_command(0xAE, 8), Err(prism_core::Error::BusTimeout));
    }
}
