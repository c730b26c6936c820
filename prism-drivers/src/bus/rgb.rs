//! RGB scan-out transport
//!
//! RGB panels take pixels through a memory frame buffer rather than a
//! command channel. This transport accepts the MIPI DCS address window
//! commands a panel driver issues and writes the pixel stream straight
//! into the scan-out buffer, so the same panel logic drives both kinds
//! of display.

use prism_core::config::BusKind;
use prism_core::{ConfigError, ProtocolError, Result};
use prism_hal::{RgbInterface, RgbTiming};

use super::{hw_error, Bus};

const CASET: u8 = 0x2A;
const RASET: u8 = 0x2B;
const RAMWR: u8 = 0x2C;
const RAMRD: u8 = 0x2E;
const DISPOFF: u8 = 0x28;
const DISPON: u8 = 0x29;

/// Inclusive address window in frame buffer pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
struct Window {
    x0: u16,
    x1: u16,
    y0: u16,
    y1: u16,
}

/// Frame buffer transport for RGB panels
pub struct RgbTransport<R> {
    rgb: R,
    timing: RgbTiming,
    bpp: usize,
    command: u8,
    params: [u8; 4],
    param_len: usize,
    window: Window,
    /// Pixel index inside the window
    cursor: usize,
    /// Byte index inside the current pixel
    sub: usize,
}

impl<R: RgbInterface> RgbTransport<R> {
    /// Wrap a configured scan-out peripheral
    ///
    /// Fails when the timing is unusable or the frame buffer does not hold
    /// a full frame.
    pub fn new(mut rgb: R) -> Result<Self> {
        let timing = rgb.timing();
        if !timing.is_valid() {
            return Err(ConfigError::InvalidBus.into());
        }
        let bpp = rgb.bytes_per_pixel();
        let needed = timing.h_active as usize * timing.v_active as usize * bpp;
        if bpp == 0 || rgb.framebuffer().len() < needed {
            return Err(ConfigError::InvalidGeometry.into());
        }
        debug!(
            "rgb transport {}x{} @ {} mHz",
            timing.h_active,
            timing.v_active,
            timing.refresh_mhz()
        );
        Ok(Self {
            rgb,
            timing,
            bpp,
            command: 0,
            params: [0; 4],
            param_len: 0,
            window: Window {
                x0: 0,
                x1: timing.h_active - 1,
                y0: 0,
                y1: timing.v_active - 1,
            },
            cursor: 0,
            sub: 0,
        })
    }

    /// Release the peripheral
    pub fn free(self) -> R {
        self.rgb
    }

    pub fn timing(&self) -> RgbTiming {
        self.timing
    }

    /// Frame buffer byte offset of the pixel under the cursor
    fn offset(&self) -> usize {
        let w = &self.window;
        let cols = (w.x1 - w.x0) as usize + 1;
        let rows = (w.y1 - w.y0) as usize + 1;
        let index = self.cursor % (cols * rows);
        let x = w.x0 as usize + index % cols;
        let y = w.y0 as usize + index / cols;
        (y * self.timing.h_active as usize + x) * self.bpp
    }

    fn advance(&mut self) {
        self.sub += 1;
        if self.sub == self.bpp {
            self.sub = 0;
            self.cursor += 1;
        }
    }

    fn set_range(&mut self, columns: bool) {
        let start = u16::from_be_bytes([self.params[0], self.params[1]]);
        let end = u16::from_be_bytes([self.params[2], self.params[3]]);
        let active = if columns {
            self.timing.h_active
        } else {
            self.timing.v_active
        };
        let limit = active - 1;
        let start = start.min(limit);
        let end = end.clamp(start, limit);
        if columns {
            self.window.x0 = start;
            self.window.x1 = end;
        } else {
            self.window.y0 = start;
            self.window.y1 = end;
        }
    }

    fn feed(&mut self, data: &[u8]) {
        match self.command {
            CASET | RASET => {
                for &b in data {
                    if self.param_len < 4 {
                        self.params[self.param_len] = b;
                        self.param_len += 1;
                    }
                }
                if self.param_len == 4 {
                    self.set_range(self.command == CASET);
                    self.param_len = 0;
                }
            }
            RAMWR => {
                for &b in data {
                    let at = self.offset() + self.sub;
                    if let Some(slot) = self.rgb.framebuffer().get_mut(at) {
                        *slot = b;
                    }
                    self.advance();
                }
            }
            // Other controller commands have no frame buffer effect
            _ => {}
        }
    }
}

impl<R: RgbInterface> Bus for RgbTransport<R> {
    fn kind(&self) -> BusKind {
        BusKind::Rgb
    }

    fn lock(&mut self) -> Result<()> {
        Ok(())
    }

    fn unlock(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_command(&mut self, opcode: u32, _bits: u8) -> Result<()> {
        self.command = opcode as u8;
        self.param_len = 0;
        match self.command {
            RAMWR | RAMRD => {
                self.cursor = 0;
                self.sub = 0;
            }
            DISPON => self.rgb.set_enabled(true).map_err(hw_error)?,
            DISPOFF => self.rgb.set_enabled(false).map_err(hw_error)?,
            _ => {}
        }
        Ok(())
    }

    fn write_data(&mut self, value: u32, bits: u8) -> Result<()> {
        let bytes = super::value_bytes(value, bits);
        self.feed(&bytes);
        Ok(())
    }

    fn write_params(&mut self, params: &[u8]) -> Result<()> {
        self.feed(params);
        Ok(())
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.feed(data);
        Ok(())
    }

    fn read_bytes(&mut self, buf: &mut [u8], _dummy_bits: u8) -> Result<()> {
        if self.command != RAMRD {
            return Err(ProtocolError::Unsupported.into());
        }
        for b in buf.iter_mut() {
            let at = self.offset() + self.sub;
            *b = self.rgb.framebuffer().get(at).copied().unwrap_or(0);
            self.advance();
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.command = 0;
        self.param_len = 0;
        self.cursor = 0;
        self.sub = 0;
    }
}
