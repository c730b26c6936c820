//! Run-buffered compositing onto a [`Surface`]
//!
//! Blits read source pixels one at a time but write the target in
//! horizontal runs: consecutive opaque pixels are gathered into a small
//! stack buffer and flushed with a single `write_run`. Transparent pixels
//! and row changes end the current run.

use crate::color::{ColorConverter, Palette, PixelFormat};
use crate::error::Result;
use crate::traits::Surface;

/// Pixels gathered before a run is flushed
const CHUNK: usize = 64;

/// Options shared by `push_to` and `push_rotate_zoom`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PushOptions {
    /// Source raw value that is skipped instead of drawn
    pub transparent: Option<u32>,
    /// Global opacity, 255 = opaque
    pub alpha: Option<u8>,
}

impl PushOptions {
    /// Opaque copy
    pub const fn opaque() -> Self {
        Self {
            transparent: None,
            alpha: None,
        }
    }

    /// Skip pixels equal to `raw`
    pub const fn transparent(raw: u32) -> Self {
        Self {
            transparent: Some(raw),
            alpha: None,
        }
    }

    /// Blend with global opacity `alpha`
    pub const fn with_alpha(mut self, alpha: u8) -> Self {
        self.alpha = Some(alpha);
        self
    }

    /// Whether the target has to be read back
    pub fn needs_readback(&self) -> bool {
        matches!(self.alpha, Some(a) if a < u8::MAX)
    }
}

/// Gathers source pixels into runs and writes them to the target
pub(crate) struct Compositor<'c> {
    /// Source raw to target raw
    conv: ColorConverter<'c>,
    /// Target raw to canonical, used for blending
    target_decode: ColorConverter<'c>,
    options: PushOptions,
    src: [u32; CHUNK],
    out: [u32; CHUNK],
    x: i32,
    y: i32,
    len: usize,
}

impl<'c> Compositor<'c> {
    /// `src_palette` and `dst_palette` belong to the source and target
    pub(crate) fn new(
        src: PixelFormat,
        src_palette: Option<&'c Palette>,
        dst: PixelFormat,
        dst_palette: Option<&'c Palette>,
        options: PushOptions,
    ) -> Result<Self> {
        let conv = ColorConverter::new(src, dst).with_palettes(src_palette, dst_palette);
        conv.validate()?;
        let target_decode = ColorConverter::new(dst, dst).with_palettes(dst_palette, dst_palette);
        Ok(Self {
            conv,
            target_decode,
            options,
            src: [0; CHUNK],
            out: [0; CHUNK],
            x: 0,
            y: 0,
            len: 0,
        })
    }

    /// Queue the source raw value `raw` for target pixel (x, y)
    pub(crate) fn put<S: Surface + ?Sized>(
        &mut self,
        target: &mut S,
        x: i32,
        y: i32,
        raw: u32,
    ) -> Result<()> {
        if self.options.transparent == Some(raw) {
            return self.flush(target);
        }
        if self.len > 0 && (y != self.y || x != self.x + self.len as i32) {
            self.flush(target)?;
        }
        if self.len == 0 {
            self.x = x;
            self.y = y;
        }
        self.src[self.len] = raw;
        self.len += 1;
        if self.len == CHUNK {
            self.flush(target)?;
        }
        Ok(())
    }

    /// End the current run
    pub(crate) fn flush<S: Surface + ?Sized>(&mut self, target: &mut S) -> Result<()> {
        if self.len == 0 {
            return Ok(());
        }
        let len = self.len;
        self.len = 0;

        match self.options.alpha {
            Some(alpha) if alpha < u8::MAX => {
                target.read_run(self.x, self.y, &mut self.out[..len])?;
                for i in 0..len {
                    let under = self.target_decode.decode(self.out[i]);
                    let over = self.conv.decode(self.src[i]);
                    self.out[i] = self.conv.encode(over.blend(under, alpha));
                }
            }
            _ => {
                for i in 0..len {
                    self.out[i] = self.conv.convert(self.src[i]);
                }
            }
        }
        target.write_run(self.x, self.y, &self.out[..len])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readback_only_for_partial_alpha() {
        assert!(!PushOptions::opaque().needs_readback());
        assert!(!PushOptions::opaque().with_alpha(255).needs_readback());
        assert!(PushOptions::transparent(0).with_alpha(128).needs_readback());
    }
}
