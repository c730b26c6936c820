//! RGB (parallel video) interface abstractions
//!
//! RGB panels have no command channel for pixel data: the MCU keeps a
//! frame buffer in memory and a peripheral scans it out continuously with
//! a pixel clock plus HSYNC/VSYNC framing.

/// Horizontal and vertical sync timing
///
/// All porch and pulse values are in pixel clocks (horizontal) or lines
/// (vertical).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RgbTiming {
    /// Pixel clock in Hz
    pub pclk_hz: u32,
    /// Active pixels per line
    pub h_active: u16,
    /// HSYNC front porch
    pub h_front_porch: u16,
    /// HSYNC pulse width
    pub h_pulse_width: u16,
    /// HSYNC back porch
    pub h_back_porch: u16,
    /// Active lines per frame
    pub v_active: u16,
    /// VSYNC front porch
    pub v_front_porch: u16,
    /// VSYNC pulse width
    pub v_pulse_width: u16,
    /// VSYNC back porch
    pub v_back_porch: u16,
}

impl RgbTiming {
    /// Total clocks per line including blanking
    pub const fn h_total(&self) -> u32 {
        self.h_active as u32
            + self.h_front_porch as u32
            + self.h_pulse_width as u32
            + self.h_back_porch as u32
    }

    /// Total lines per frame including blanking
    pub const fn v_total(&self) -> u32 {
        self.v_active as u32
            + self.v_front_porch as u32
            + self.v_pulse_width as u32
            + self.v_back_porch as u32
    }

    /// Resulting refresh rate in millihertz, or 0 if the timing is empty
    pub const fn refresh_mhz(&self) -> u32 {
        let clocks = self.h_total() as u64 * self.v_total() as u64;
        if clocks == 0 {
            return 0;
        }
        ((self.pclk_hz as u64 * 1000) / clocks) as u32
    }

    /// A timing is usable when it has an active area, a clock and non-zero
    /// sync pulses
    pub const fn is_valid(&self) -> bool {
        self.pclk_hz > 0
            && self.h_active > 0
            && self.v_active > 0
            && self.h_pulse_width > 0
            && self.v_pulse_width > 0
    }
}

/// RGB scan-out peripheral
pub trait RgbInterface {
    /// Error type for interface operations
    type Error: core::fmt::Debug;

    /// Sync timing the peripheral was configured with
    fn timing(&self) -> RgbTiming;

    /// Bytes per pixel in the scan-out buffer
    fn bytes_per_pixel(&self) -> usize;

    /// Mutable view of the frame buffer being scanned out
    fn framebuffer(&mut self) -> &mut [u8];

    /// Start or stop scan-out
    fn set_enabled(&mut self, enabled: bool) -> Result<(), Self::Error>;
}
