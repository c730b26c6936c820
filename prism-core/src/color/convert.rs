//! Pixel value and run conversion
//!
//! A [`ColorConverter`] resolves everything that depends on the format
//! pair when it is built: raw readers and writers, decoder and encoder,
//! and a run function with fast paths for the common panel formats. The
//! per-pixel loops only call through those function pointers.

use super::format::Encoding;
use super::{Color, Palette, PixelFormat};
use crate::error::{ConfigError, Error};

type DecodeFn = fn(u32, Option<&Palette>) -> Color;
type EncodeFn = fn(Color, Option<&Palette>) -> u32;
type ReadFn = fn(&[u8], usize) -> u32;
type WriteFn = fn(&mut [u8], usize, u32);
type RunFn = fn(&ColorConverter<'_>, &[u8], usize, &mut [u8]);

/// Decoders indexed by [`Encoding`]
const DECODE: [DecodeFn; Encoding::COUNT] = [
    dec_gray1, dec_gray2, dec_gray4, dec_rgb332, dec_bgr233, dec_indexed, dec_rgb565,
    dec_bgr565, dec_rgb888, dec_bgr888, dec_xrgb8888, dec_xbgr8888, dec_argb8888,
    dec_abgr8888,
];

/// Encoders indexed by [`Encoding`]
const ENCODE: [EncodeFn; Encoding::COUNT] = [
    enc_gray1, enc_gray2, enc_gray4, enc_rgb332, enc_bgr233, enc_indexed, enc_rgb565,
    enc_bgr565, enc_rgb888, enc_bgr888, enc_xrgb8888, enc_xbgr8888, enc_argb8888,
    enc_abgr8888,
];

/// Convert one raw pixel between two non-palette formats
///
/// Palette formats need a lookup table; use [`ColorConverter`] with
/// [`ColorConverter::with_src_palette`] / [`ColorConverter::with_dst_palette`].
pub fn convert_pixel(value: u32, src: PixelFormat, dst: PixelFormat) -> Result<u32, Error> {
    let conv = ColorConverter::new(src, dst);
    conv.validate()?;
    Ok(conv.convert(value))
}

/// Read the raw pixel at `index` from packed storage
///
/// `index` must lie inside `buf`.
pub fn read_raw(buf: &[u8], bits_per_pixel: u8, index: usize) -> u32 {
    reader_for(bits_per_pixel)(buf, index)
}

/// Write a raw pixel at `index` into packed storage
///
/// `index` must lie inside `buf`; bits above the pixel depth are ignored.
pub fn write_raw(buf: &mut [u8], bits_per_pixel: u8, index: usize, value: u32) {
    writer_for(bits_per_pixel)(buf, index, value)
}

/// Converter bound to one source/destination format pair
#[derive(Clone, Copy)]
pub struct ColorConverter<'a> {
    src: PixelFormat,
    dst: PixelFormat,
    src_palette: Option<&'a Palette>,
    dst_palette: Option<&'a Palette>,
    identity: bool,
    decode: DecodeFn,
    encode: EncodeFn,
    read: ReadFn,
    write: WriteFn,
    run: RunFn,
}

impl<'a> ColorConverter<'a> {
    /// Build a converter without palettes
    pub fn new(src: PixelFormat, dst: PixelFormat) -> Self {
        let mut conv = Self {
            src,
            dst,
            src_palette: None,
            dst_palette: None,
            identity: false,
            decode: DECODE[src.encoding() as usize],
            encode: ENCODE[dst.encoding() as usize],
            read: reader_for(src.bits_per_pixel()),
            write: writer_for(dst.bits_per_pixel()),
            run: run_generic,
        };
        conv.resolve();
        conv
    }

    /// Attach the palette used to decode source indices
    pub fn with_src_palette(mut self, palette: &'a Palette) -> Self {
        self.src_palette = Some(palette);
        self.resolve();
        self
    }

    /// Attach the palette used to encode destination indices
    pub fn with_dst_palette(mut self, palette: &'a Palette) -> Self {
        self.dst_palette = Some(palette);
        self.resolve();
        self
    }

    /// Attach optional palettes for both sides
    pub fn with_palettes(mut self, src: Option<&'a Palette>, dst: Option<&'a Palette>) -> Self {
        self.src_palette = src;
        self.dst_palette = dst;
        self.resolve();
        self
    }

    fn resolve(&mut self) {
        let same_palette = match (self.src_palette, self.dst_palette) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        };
        self.identity = self.src == self.dst && same_palette;
        self.run = select_run(self.src, self.dst, self.identity);
    }

    /// Check that every palette format involved has its table
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.identity {
            return Ok(());
        }
        if self.src.is_palette() && self.src_palette.is_none() {
            return Err(ConfigError::MissingPalette);
        }
        if self.dst.is_palette() && self.dst_palette.is_none() {
            return Err(ConfigError::MissingPalette);
        }
        Ok(())
    }

    /// Source format
    pub fn src(&self) -> PixelFormat {
        self.src
    }

    /// Destination format
    pub fn dst(&self) -> PixelFormat {
        self.dst
    }

    /// Whether raw values pass through unchanged
    pub fn is_identity(&self) -> bool {
        self.identity
    }

    /// Decode a source raw value to canonical ARGB
    pub fn decode(&self, raw: u32) -> Color {
        (self.decode)(raw & self.src.raw_mask(), self.src_palette)
    }

    /// Encode a canonical color into a destination raw value
    pub fn encode(&self, color: Color) -> u32 {
        (self.encode)(color, self.dst_palette)
    }

    /// Convert one raw value
    pub fn convert(&self, raw: u32) -> u32 {
        if self.identity {
            return raw & self.src.raw_mask();
        }
        self.encode(self.decode(raw))
    }

    /// Convert `count` packed pixels from the start of `src` into the
    /// start of `dst`
    ///
    /// `count` is clamped to what both buffers can hold; the number of
    /// converted pixels is returned.
    pub fn convert_run(&self, src: &[u8], count: usize, dst: &mut [u8]) -> usize {
        let src_cap = src.len() * 8 / self.src.bits_per_pixel() as usize;
        let dst_cap = dst.len() * 8 / self.dst.bits_per_pixel() as usize;
        let count = count.min(src_cap).min(dst_cap);
        (self.run)(self, src, count, dst);
        count
    }
}

fn select_run(src: PixelFormat, dst: PixelFormat, identity: bool) -> RunFn {
    if identity {
        return if src.bits_per_pixel() >= 8 {
            run_copy
        } else {
            run_packed_copy
        };
    }
    match (src.encoding(), dst.encoding()) {
        (Encoding::Rgb888, Encoding::Rgb565) | (Encoding::Bgr888, Encoding::Bgr565) => {
            run_888_to_565
        }
        (Encoding::Rgb565, Encoding::Rgb888) | (Encoding::Bgr565, Encoding::Bgr888) => {
            run_565_to_888
        }
        (Encoding::Argb8888 | Encoding::Xrgb8888, Encoding::Rgb565) => run_8888_to_565,
        _ => run_generic,
    }
}

fn run_copy(conv: &ColorConverter<'_>, src: &[u8], count: usize, dst: &mut [u8]) {
    let bytes = count * conv.src.bytes_per_pixel();
    dst[..bytes].copy_from_slice(&src[..bytes]);
}

fn run_packed_copy(conv: &ColorConverter<'_>, src: &[u8], count: usize, dst: &mut [u8]) {
    for i in 0..count {
        (conv.write)(dst, i, (conv.read)(src, i));
    }
}

fn run_888_to_565(_conv: &ColorConverter<'_>, src: &[u8], count: usize, dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(3).zip(dst.chunks_exact_mut(2)).take(count) {
        let v = pack565(s[0], s[1], s[2]);
        d.copy_from_slice(&v.to_be_bytes());
    }
}

fn run_565_to_888(_conv: &ColorConverter<'_>, src: &[u8], count: usize, dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(2).zip(dst.chunks_exact_mut(3)).take(count) {
        let v = u16::from_be_bytes([s[0], s[1]]);
        d[0] = ((v >> 8) & 0xF8) as u8;
        d[1] = ((v >> 3) & 0xFC) as u8;
        d[2] = ((v << 3) & 0xF8) as u8;
    }
}

fn run_8888_to_565(_conv: &ColorConverter<'_>, src: &[u8], count: usize, dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(2)).take(count) {
        let v = pack565(s[1], s[2], s[3]);
        d.copy_from_slice(&v.to_be_bytes());
    }
}

fn run_generic(conv: &ColorConverter<'_>, src: &[u8], count: usize, dst: &mut [u8]) {
    for i in 0..count {
        let raw = (conv.read)(src, i);
        let color = (conv.decode)(raw, conv.src_palette);
        (conv.write)(dst, i, (conv.encode)(color, conv.dst_palette));
    }
}

#[inline]
fn pack565(hi: u8, mid: u8, lo: u8) -> u16 {
    ((hi as u16 & 0xF8) << 8) | ((mid as u16 & 0xFC) << 3) | (lo as u16 >> 3)
}

// Raw storage access

fn reader_for(bits_per_pixel: u8) -> ReadFn {
    match bits_per_pixel {
        1 => read_packed::<1>,
        2 => read_packed::<2>,
        4 => read_packed::<4>,
        8 => read_8,
        16 => read_16,
        24 => read_24,
        _ => read_32,
    }
}

fn writer_for(bits_per_pixel: u8) -> WriteFn {
    match bits_per_pixel {
        1 => write_packed::<1>,
        2 => write_packed::<2>,
        4 => write_packed::<4>,
        8 => write_8,
        16 => write_16,
        24 => write_24,
        _ => write_32,
    }
}

fn read_packed<const BITS: usize>(buf: &[u8], index: usize) -> u32 {
    let bit = index * BITS;
    let shift = 8 - BITS - (bit % 8);
    ((buf[bit / 8] >> shift) as u32) & ((1 << BITS) - 1)
}

fn write_packed<const BITS: usize>(buf: &mut [u8], index: usize, value: u32) {
    let bit = index * BITS;
    let shift = 8 - BITS - (bit % 8);
    let mask = (((1u32 << BITS) - 1) << shift) as u8;
    let byte = &mut buf[bit / 8];
    *byte = (*byte & !mask) | (((value << shift) as u8) & mask);
}

fn read_8(buf: &[u8], index: usize) -> u32 {
    buf[index] as u32
}

fn write_8(buf: &mut [u8], index: usize, value: u32) {
    buf[index] = value as u8;
}

fn read_16(buf: &[u8], index: usize) -> u32 {
    let o = index * 2;
    u16::from_be_bytes([buf[o], buf[o + 1]]) as u32
}

fn write_16(buf: &mut [u8], index: usize, value: u32) {
    let o = index * 2;
    buf[o..o + 2].copy_from_slice(&(value as u16).to_be_bytes());
}

fn read_24(buf: &[u8], index: usize) -> u32 {
    let o = index * 3;
    (buf[o] as u32) << 16 | (buf[o + 1] as u32) << 8 | buf[o + 2] as u32
}

fn write_24(buf: &mut [u8], index: usize, value: u32) {
    let o = index * 3;
    buf[o] = (value >> 16) as u8;
    buf[o + 1] = (value >> 8) as u8;
    buf[o + 2] = value as u8;
}

fn read_32(buf: &[u8], index: usize) -> u32 {
    let o = index * 4;
    u32::from_be_bytes([buf[o], buf[o + 1], buf[o + 2], buf[o + 3]])
}

fn write_32(buf: &mut [u8], index: usize, value: u32) {
    let o = index * 4;
    buf[o..o + 4].copy_from_slice(&value.to_be_bytes());
}

// Decoders: raw -> canonical ARGB

fn gray(level: u8) -> Color {
    Color::rgb(level, level, level)
}

fn dec_gray1(raw: u32, _: Option<&Palette>) -> Color {
    gray((raw & 1) as u8 * 0xFF)
}

fn dec_gray2(raw: u32, _: Option<&Palette>) -> Color {
    gray((raw & 3) as u8 * 0x55)
}

fn dec_gray4(raw: u32, _: Option<&Palette>) -> Color {
    gray((raw & 0xF) as u8 * 0x11)
}

fn dec_rgb332(raw: u32, _: Option<&Palette>) -> Color {
    let r = ((raw >> 5) & 7) as u8;
    let g = ((raw >> 2) & 7) as u8;
    let b = (raw & 3) as u8;
    Color::rgb(r << 5, g << 5, b << 6)
}

fn dec_bgr233(raw: u32, _: Option<&Palette>) -> Color {
    let b = ((raw >> 6) & 3) as u8;
    let g = ((raw >> 3) & 7) as u8;
    let r = (raw & 7) as u8;
    Color::rgb(r << 5, g << 5, b << 6)
}

fn dec_indexed(raw: u32, palette: Option<&Palette>) -> Color {
    palette.map_or(Color::BLACK, |p| p.lookup(raw))
}

fn dec_rgb565(raw: u32, _: Option<&Palette>) -> Color {
    let hi = ((raw >> 11) & 0x1F) as u8;
    let g = ((raw >> 5) & 0x3F) as u8;
    let lo = (raw & 0x1F) as u8;
    Color::rgb(hi << 3, g << 2, lo << 3)
}

fn dec_bgr565(raw: u32, _: Option<&Palette>) -> Color {
    let hi = ((raw >> 11) & 0x1F) as u8;
    let g = ((raw >> 5) & 0x3F) as u8;
    let lo = (raw & 0x1F) as u8;
    Color::rgb(lo << 3, g << 2, hi << 3)
}

fn dec_rgb888(raw: u32, _: Option<&Palette>) -> Color {
    Color(0xFF00_0000 | (raw & 0x00FF_FFFF))
}

fn dec_bgr888(raw: u32, _: Option<&Palette>) -> Color {
    Color::rgb(raw as u8, (raw >> 8) as u8, (raw >> 16) as u8)
}

fn dec_xrgb8888(raw: u32, p: Option<&Palette>) -> Color {
    dec_rgb888(raw, p)
}

fn dec_xbgr8888(raw: u32, p: Option<&Palette>) -> Color {
    dec_bgr888(raw, p)
}

fn dec_argb8888(raw: u32, _: Option<&Palette>) -> Color {
    Color(raw)
}

fn dec_abgr8888(raw: u32, _: Option<&Palette>) -> Color {
    Color::argb((raw >> 24) as u8, raw as u8, (raw >> 8) as u8, (raw >> 16) as u8)
}

// Encoders: canonical ARGB -> raw

/// BT.601 luma with weights summing to 256
fn luma(c: Color) -> u32 {
    (c.r() as u32 * 77 + c.g() as u32 * 150 + c.b() as u32 * 29) >> 8
}

fn enc_gray1(c: Color, _: Option<&Palette>) -> u32 {
    luma(c) >> 7
}

fn enc_gray2(c: Color, _: Option<&Palette>) -> u32 {
    luma(c) >> 6
}

fn enc_gray4(c: Color, _: Option<&Palette>) -> u32 {
    luma(c) >> 4
}

fn enc_rgb332(c: Color, _: Option<&Palette>) -> u32 {
    (c.r() as u32 >> 5) << 5 | (c.g() as u32 >> 5) << 2 | c.b() as u32 >> 6
}

fn enc_bgr233(c: Color, _: Option<&Palette>) -> u32 {
    (c.b() as u32 >> 6) << 6 | (c.g() as u32 >> 5) << 3 | c.r() as u32 >> 5
}

fn enc_indexed(c: Color, palette: Option<&Palette>) -> u32 {
    palette.map_or(0, |p| p.nearest(c))
}

fn enc_rgb565(c: Color, _: Option<&Palette>) -> u32 {
    pack565(c.r(), c.g(), c.b()) as u32
}

fn enc_bgr565(c: Color, _: Option<&Palette>) -> u32 {
    pack565(c.b(), c.g(), c.r()) as u32
}

fn enc_rgb888(c: Color, _: Option<&Palette>) -> u32 {
    c.0 & 0x00FF_FFFF
}

fn enc_bgr888(c: Color, _: Option<&Palette>) -> u32 {
    (c.b() as u32) << 16 | (c.g() as u32) << 8 | c.r() as u32
}

fn enc_xrgb8888(c: Color, p: Option<&Palette>) -> u32 {
    enc_rgb888(c, p)
}

fn enc_xbgr8888(c: Color, p: Option<&Palette>) -> u32 {
    enc_bgr888(c, p)
}

fn enc_argb8888(c: Color, _: Option<&Palette>) -> u32 {
    c.0
}

fn enc_abgr8888(c: Color, _: Option<&Palette>) -> u32 {
    (c.a() as u32) << 24 | enc_bgr888(c, None)
}
