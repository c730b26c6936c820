//! GPIO pin abstractions
//!
//! Display controllers use a handful of discrete control lines next to
//! the data bus: chip select, data/command select, reset and sometimes a
//! busy or tearing-effect input.

/// Digital output pin
///
/// Implementations handle the register manipulation for the specific chip.
pub trait OutputPin {
    /// Drive the pin high (logic 1)
    fn set_high(&mut self);

    /// Drive the pin low (logic 0)
    fn set_low(&mut self);

    /// Drive the pin to a specific level
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }
}

/// Digital input pin
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&self) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&self) -> bool {
        !self.is_high()
    }
}

/// Placeholder for a control line that is not wired
///
/// Boards frequently tie CS low or leave RST connected to the MCU reset.
/// Writes are ignored and reads report low.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NoPin;

impl OutputPin for NoPin {
    fn set_high(&mut self) {}

    fn set_low(&mut self) {}
}

impl InputPin for NoPin {
    fn is_high(&self) -> bool {
        false
    }
}
