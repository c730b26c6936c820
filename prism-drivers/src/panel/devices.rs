//! Device profiles
//!
//! Everything that differs between controllers is data: init table,
//! opcode set, MADCTL bit layout and timing. Profiles are looked up by the
//! `device` name in the display configuration.

use prism_core::PixelFormat;

use super::init_table::{InitTable, DELAY_FLAG};

/// Controller opcodes (MIPI DCS numbering by default)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Opcodes {
    pub column_address: u8,
    pub row_address: u8,
    pub memory_write: u8,
    pub memory_read: u8,
    pub memory_access: u8,
    pub invert_off: u8,
    pub invert_on: u8,
    pub sleep_in: u8,
    pub sleep_out: u8,
    pub display_off: u8,
    pub display_on: u8,
    pub scroll_area: u8,
    pub scroll_start: u8,
    pub read_id: u8,
}

impl Opcodes {
    pub const DCS: Self = Self {
        column_address: 0x2A,
        row_address: 0x2B,
        memory_write: 0x2C,
        memory_read: 0x2E,
        memory_access: 0x36,
        invert_off: 0x20,
        invert_on: 0x21,
        sleep_in: 0x10,
        sleep_out: 0x11,
        display_off: 0x28,
        display_on: 0x29,
        scroll_area: 0x33,
        scroll_start: 0x37,
        read_id: 0x04,
    };
}

/// MADCTL register bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MadctlLayout {
    /// Register value for rotations 0-3
    pub rotations: [u8; 4],
    /// Set for BGR subpixel order
    pub bgr: u8,
    /// Column mirror (MX)
    pub mirror_x: u8,
    /// Row mirror (MY)
    pub mirror_y: u8,
}

pub const MADCTL_MY: u8 = 0x80;
pub const MADCTL_MX: u8 = 0x40;
pub const MADCTL_MV: u8 = 0x20;
pub const MADCTL_BGR: u8 = 0x08;

impl MadctlLayout {
    pub const DCS: Self = Self {
        rotations: [
            0,
            MADCTL_MX | MADCTL_MV,
            MADCTL_MX | MADCTL_MY,
            MADCTL_MY | MADCTL_MV,
        ],
        bgr: MADCTL_BGR,
        mirror_x: MADCTL_MX,
        mirror_y: MADCTL_MY,
    };

    /// Register value for an effective rotation 0-7
    ///
    /// Rotations 4-7 mirror the logical x axis of rotations 0-3.
    pub fn value(&self, rotation: u8, bgr: bool) -> u8 {
        let base = (rotation & 3) as usize;
        let mut v = self.rotations[base];
        if rotation & 4 != 0 {
            // x runs along memory columns unless MV swaps the axes
            v ^= if base & 1 == 0 {
                self.mirror_x
            } else {
                self.mirror_y
            };
        }
        if bgr {
            v |= self.bgr;
        }
        v
    }
}

/// Expected controller ID
///
/// Compared against the first four bytes returned by the read-ID opcode,
/// most significant first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ExpectedId {
    pub value: u32,
    pub mask: u32,
}

impl ExpectedId {
    pub fn matches(&self, id: u32) -> bool {
        id & self.mask == self.value & self.mask
    }
}

/// Everything the generic panel needs to drive one controller
#[derive(Debug, Clone, Copy)]
pub struct DeviceProfile {
    pub name: &'static str,
    pub init_table: InitTable<'static>,
    pub opcodes: Opcodes,
    pub madctl: MadctlLayout,
    /// Command width on the wire
    pub command_bits: u8,
    /// Pixel format written to frame memory
    pub native_format: PixelFormat,
    /// Pixel format returned by a memory read
    pub read_format: PixelFormat,
    pub reset_hold_us: u32,
    pub ready_ms: u32,
    pub sleep_in_ms: u32,
    pub sleep_out_ms: u32,
    pub expected_id: Option<ExpectedId>,
}

#[rustfmt::skip]
const ILI9341_INIT: &[u8] = &[
    0xEF, 3, 0x03, 0x80, 0x02,
    0xCF, 3, 0x00, 0xC1, 0x30,
    0xED, 4, 0x64, 0x03, 0x12, 0x81,
    0xE8, 3, 0x85, 0x00, 0x78,
    0xCB, 5, 0x39, 0x2C, 0x00, 0x34, 0x02,
    0xF7, 1, 0x20,
    0xEA, 2, 0x00, 0x00,
    0xC0, 1, 0x23,             // power control 1
    0xC1, 1, 0x10,             // power control 2
    0xC5, 2, 0x3E, 0x28,       // VCOM control 1
    0xC7, 1, 0x86,             // VCOM control 2
    0x37, 1, 0x00,
    0x3A, 1, 0x55,             // 16 bits per pixel
    0xB1, 2, 0x00, 0x18,       // frame rate 79 Hz
    0xB6, 3, 0x08, 0x82, 0x27,
    0xF2, 1, 0x00,
    0x26, 1, 0x01,             // gamma curve 1
    0xE0, 15, 0x0F, 0x31, 0x2B, 0x0C, 0x0E, 0x08, 0x4E, 0xF1,
              0x37, 0x07, 0x10, 0x03, 0x0E, 0x09, 0x00,
    0xE1, 15, 0x00, 0x0E, 0x14, 0x03, 0x11, 0x07, 0x31, 0xC1,
              0x48, 0x08, 0x0F, 0x0C, 0x31, 0x36, 0x0F,
    0x11, DELAY_FLAG, 150,     // sleep out
    0x29, DELAY_FLAG, 150,     // display on
    0xFF, 0xFF,
];

#[rustfmt::skip]
const ST7789_INIT: &[u8] = &[
    0x01, DELAY_FLAG, 150,     // software reset
    0x11, DELAY_FLAG, 10,
    0x3A, 1 | DELAY_FLAG, 0x55, 10,
    0x13, DELAY_FLAG, 10,      // normal mode
    0x29, DELAY_FLAG, 10,
    0xFF, 0xFF,
];

#[rustfmt::skip]
const GC9A01_INIT: &[u8] = &[
    0xEF, 0,
    0xEB, 1, 0x14,
    0xFE, 0,                   // inter register enable 1
    0xEF, 0,                   // inter register enable 2
    0xEB, 1, 0x14,
    0x84, 1, 0x40,
    0x85, 1, 0xFF,
    0x86, 1, 0xFF,
    0x87, 1, 0xFF,
    0x88, 1, 0x0A,
    0x89, 1, 0x21,
    0x8A, 1, 0x00,
    0x8B, 1, 0x80,
    0x8C, 1, 0x01,
    0x8D, 1, 0x01,
    0x8E, 1, 0xFF,
    0x8F, 1, 0xFF,
    0xB6, 2, 0x00, 0x00,
    0x3A, 1, 0x55,
    0x90, 4, 0x08, 0x08, 0x08, 0x08,
    0xBD, 1, 0x06,
    0xBC, 1, 0x00,
    0xFF, 3, 0x60, 0x01, 0x04,
    0xC3, 1, 0x13,             // voltage regulator 1a
    0xC4, 1, 0x13,             // voltage regulator 1b
    0xC9, 1, 0x22,
    0xBE, 1, 0x11,
    0xE1, 2, 0x10, 0x0E,
    0xDF, 3, 0x21, 0x0C, 0x02,
    0xF0, 6, 0x45, 0x09, 0x08, 0x08, 0x26, 0x2A,
    0xF1, 6, 0x43, 0x70, 0x72, 0x36, 0x37, 0x6F,
    0xF2, 6, 0x45, 0x09, 0x08, 0x08, 0x26, 0x2A,
    0xF3, 6, 0x43, 0x70, 0x72, 0x36, 0x37, 0x6F,
    0xED, 2, 0x1B, 0x0B,
    0xAE, 1, 0x77,
    0xCD, 1, 0x63,
    0xE8, 1, 0x34,
    0x62, 12, 0x18, 0x0D, 0x71, 0xED, 0x70, 0x70,
              0x18, 0x0F, 0x71, 0xEF, 0x70, 0x70,
    0x63, 12, 0x18, 0x11, 0x71, 0xF1, 0x70, 0x70,
              0x18, 0x13, 0x71, 0xF3, 0x70, 0x70,
    0x64, 7, 0x28, 0x29, 0xF1, 0x01, 0xF1, 0x00, 0x07,
    0x66, 10, 0x3C, 0x00, 0xCD, 0x67, 0x45, 0x45, 0x10, 0x00, 0x00, 0x00,
    0x67, 10, 0x00, 0x3C, 0x00, 0x00, 0x00, 0x01, 0x54, 0x10, 0x32, 0x98,
    0x74, 7, 0x10, 0x85, 0x80, 0x00, 0x00, 0x4E, 0x00,
    0x98, 2, 0x3E, 0x07,
    0x35, 0,                   // tearing effect line on
    0x11, DELAY_FLAG, 120,
    0x29, DELAY_FLAG, 20,
    0xFF, 0xFF,
];

pub static ILI9341: DeviceProfile = DeviceProfile {
    name: "ili9341",
    init_table: InitTable::new(ILI9341_INIT),
    opcodes: Opcodes {
        read_id: 0xD3,
        ..Opcodes::DCS
    },
    madctl: MadctlLayout::DCS,
    command_bits: 8,
    native_format: PixelFormat::RGB565,
    read_format: PixelFormat::RGB888,
    reset_hold_us: 10,
    ready_ms: 120,
    sleep_in_ms: 5,
    sleep_out_ms: 120,
    expected_id: Some(ExpectedId {
        value: 0x0000_9341,
        mask: 0x00FF_FFFF,
    }),
};

pub static ST7789: DeviceProfile = DeviceProfile {
    name: "st7789",
    init_table: InitTable::new(ST7789_INIT),
    opcodes: Opcodes::DCS,
    madctl: MadctlLayout::DCS,
    command_bits: 8,
    native_format: PixelFormat::RGB565,
    read_format: PixelFormat::RGB888,
    reset_hold_us: 10,
    ready_ms: 120,
    sleep_in_ms: 5,
    sleep_out_ms: 120,
    expected_id: Some(ExpectedId {
        value: 0x8585_5200,
        mask: 0xFFFF_0000,
    }),
};

pub static GC9A01: DeviceProfile = DeviceProfile {
    name: "gc9a01",
    init_table: InitTable::new(GC9A01_INIT),
    opcodes: Opcodes::DCS,
    madctl: MadctlLayout {
        rotations: [
            MADCTL_MX,
            MADCTL_MV,
            MADCTL_MY,
            MADCTL_MX | MADCTL_MY | MADCTL_MV,
        ],
        ..MadctlLayout::DCS
    },
    command_bits: 8,
    native_format: PixelFormat::RGB565,
    read_format: PixelFormat::RGB888,
    reset_hold_us: 10,
    ready_ms: 120,
    sleep_in_ms: 120,
    sleep_out_ms: 120,
    expected_id: None,
};

/// Known controllers
pub static DEVICES: [&DeviceProfile; 3] = [&ILI9341, &ST7789, &GC9A01];

/// Profile for a configured device name, ignoring ASCII case
pub fn find(name: &str) -> Option<&'static DeviceProfile> {
    DEVICES
        .iter()
        .copied()
        .find(|p| p.name.eq_ignore_ascii_case(name))
}
