//! Adapters from `embedded-hal` 1.0 peripherals
//!
//! Most chip HALs already implement the `embedded-hal` traits. Wrapping a
//! peripheral in one of these newtypes makes it usable as a Prism
//! transport component without writing a dedicated implementation.

use embedded_hal::{digital, i2c, spi};

use crate::{I2cBus, OutputPin, SpiBus};

/// `embedded_hal::spi::SpiBus` as a Prism [`SpiBus`]
#[derive(Debug)]
pub struct EhSpi<T>(pub T);

impl<T: spi::SpiBus<u8>> SpiBus for EhSpi<T> {
    type Error = T::Error;

    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.0.write(data)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.0.read(buf)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.0.flush()
    }
}

/// `embedded_hal::i2c::I2c` as a Prism [`I2cBus`]
#[derive(Debug)]
pub struct EhI2c<T>(pub T);

impl<T: i2c::I2c> I2cBus for EhI2c<T> {
    type Error = T::Error;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.0.write(address, data)
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.0.read(address, buf)
    }

    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.0.write_read(address, write_data, read_buf)
    }
}

/// `embedded_hal::digital::OutputPin` as a Prism [`OutputPin`]
///
/// GPIO writes on real hardware are infallible; an error is dropped.
#[derive(Debug)]
pub struct EhPin<T>(pub T);

impl<T: digital::OutputPin> OutputPin for EhPin<T> {
    fn set_high(&mut self) {
        let _ = self.0.set_high();
    }

    fn set_low(&mut self) {
        let _ = self.0.set_low();
    }
}
