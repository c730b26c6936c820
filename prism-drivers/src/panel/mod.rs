//! Generic panel controller
//!
//! One [`Panel`] drives any controller described by a [`DeviceProfile`]
//! over any [`Bus`]. It owns the transaction manager, tracks the
//! lifecycle state and the address window, and implements [`Surface`] so
//! the raster engine and sprites draw straight onto the glass.
//!
//! Logical coordinates follow the current rotation. The window is
//! translated into controller memory with the configured offsets; column
//! and row address commands are only sent when the range changes.

pub mod devices;
pub mod init_table;

use alloc::vec::Vec;

use embedded_hal::delay::DelayNs;
use prism_core::color::{read_raw, write_raw, ColorConverter};
use prism_core::config::{DisplayConfig, PanelConfig};
use prism_core::state::{PanelEvent, PanelState};
use prism_core::{
    ConfigError, Error, PixelFormat, ProtocolError, PushOptions, Rect, Result, Sprite, Surface,
};
use prism_hal::{NoPin, OutputPin};

use crate::bus::Bus;
use crate::transaction::TransactionManager;

pub use devices::{find, DeviceProfile, ExpectedId, MadctlLayout, Opcodes};
pub use init_table::{InitCommand, InitTable, DELAY_FLAG};

/// Bytes encoded per block write when streaming pixels
const STREAM_BYTES: usize = 192;

/// Pixels fetched per memory read
const READ_CHUNK: usize = 32;

/// Display panel bound to a transport
pub struct Panel<B, D, RST = NoPin> {
    tm: TransactionManager<B, D>,
    profile: &'static DeviceProfile,
    config: PanelConfig,
    reset: RST,
    has_reset: bool,
    state: PanelState,
    /// Requested rotation 0-7
    rotation: u8,
    inverted: bool,
    width: i32,
    height: i32,
    col_start: i32,
    row_start: i32,
    clip: Rect,
    /// Last column and row address ranges sent
    columns: Option<(u16, u16)>,
    rows: Option<(u16, u16)>,
    /// Window primed for memory write
    window: Option<Rect>,
    /// Vertical scroll area (top, height, start)
    scroll: (u16, u16, u16),
    last_error: Option<Error>,
}

impl<B: Bus, D: DelayNs> Panel<B, D, NoPin> {
    /// Panel in rotation 0 with no reset line
    pub fn new(
        transport: B,
        profile: &'static DeviceProfile,
        config: PanelConfig,
        delay: D,
    ) -> Result<Self> {
        Self::build(TransactionManager::new(transport, delay), profile, config, 0)
    }

    /// Panel described by a display configuration
    ///
    /// The device name selects the profile.
    pub fn from_config(transport: B, config: &DisplayConfig, delay: D) -> Result<Self> {
        config.validate()?;
        let profile = devices::find(&config.device).ok_or(ConfigError::UnknownDevice)?;
        let tm = TransactionManager::with_config(transport, delay, &config.bus);
        Self::build(tm, profile, config.panel, config.rotation)
    }

    /// Attach a hardware reset line (active low)
    pub fn with_reset<RST: OutputPin>(self, mut pin: RST) -> Panel<B, D, RST> {
        pin.set_high();
        Panel {
            tm: self.tm,
            profile: self.profile,
            config: self.config,
            reset: pin,
            has_reset: true,
            state: self.state,
            rotation: self.rotation,
            inverted: self.inverted,
            width: self.width,
            height: self.height,
            col_start: self.col_start,
            row_start: self.row_start,
            clip: self.clip,
            columns: self.columns,
            rows: self.rows,
            window: self.window,
            scroll: self.scroll,
            last_error: self.last_error,
        }
    }

    fn build(
        tm: TransactionManager<B, D>,
        profile: &'static DeviceProfile,
        config: PanelConfig,
        rotation: u8,
    ) -> Result<Self> {
        config.validate()?;
        let mut panel = Self {
            tm,
            profile,
            config,
            reset: NoPin,
            has_reset: false,
            state: PanelState::Uninitialized,
            rotation: 0,
            inverted: false,
            width: 0,
            height: 0,
            col_start: 0,
            row_start: 0,
            clip: Rect::default(),
            columns: None,
            rows: None,
            window: None,
            scroll: (0, 0, 0),
            last_error: None,
        };
        panel.apply_geometry(rotation);
        debug!(
            "panel {} {}x{}",
            profile.name, config.panel_width, config.panel_height
        );
        Ok(panel)
    }
}

impl<B: Bus, D: DelayNs, RST: OutputPin> Panel<B, D, RST> {
    pub fn state(&self) -> PanelState {
        self.state
    }

    /// Most recent failure, kept until the next one
    pub fn last_error(&self) -> Option<Error> {
        self.last_error
    }

    pub fn profile(&self) -> &'static DeviceProfile {
        self.profile
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    pub fn rotation(&self) -> u8 {
        self.rotation
    }

    pub fn bus(&self) -> &B {
        self.tm.bus()
    }

    /// Release transport, delay and reset line
    pub fn free(self) -> (B, D, RST) {
        let (bus, delay) = self.tm.free();
        (bus, delay, self.reset)
    }

    /// Reset the controller and replay its init table
    ///
    /// The reset pulse is only generated when `use_reset` is set and a
    /// reset line is attached. On failure the panel returns to
    /// `Uninitialized` and the error is kept in [`last_error`](Self::last_error).
    pub fn init(&mut self, use_reset: bool) -> Result<()> {
        let next = self.state.transition(PanelEvent::BeginInit);
        if next != PanelState::Initializing {
            return self.fail(ProtocolError::NotReady.into());
        }
        self.state = next;
        info!("init {}", self.profile.name);

        match self.run_init(use_reset) {
            Ok(()) => {
                self.state = self.state.transition(PanelEvent::InitComplete);
                Ok(())
            }
            Err(e) => {
                error!("init {} failed: {}", self.profile.name, e);
                self.state = self.state.transition(PanelEvent::InitFailed);
                self.fail(e)
            }
        }
    }

    /// Open the address window covering the inclusive corners
    ///
    /// Corners are put in order and clipped to the panel. The returned
    /// rectangle is the window actually primed; an empty one primes
    /// nothing.
    pub fn set_window(&mut self, xs: i32, ys: i32, xe: i32, ye: i32) -> Result<Rect> {
        let r = self
            .ready()
            .and_then(|_| self.open_window(Rect::from_corners(xs, ys, xe, ye)));
        self.note(r)
    }

    /// Stream raw pixel bytes into the primed window
    pub fn write_pixels(&mut self, data: &[u8]) -> Result<()> {
        let r = self.streaming().and_then(|_| self.tm.write_block(data));
        self.note(r)
    }

    /// Queue raw pixel bytes for DMA into the primed window
    ///
    /// Returns the buffer of the previous transfer once it has completed.
    pub fn write_pixels_dma(&mut self, data: Vec<u8>) -> Result<Option<Vec<u8>>> {
        let r = self.streaming().and_then(|_| self.tm.write_block_dma(data));
        self.note(r)
    }

    /// Wait for the last DMA block and take its buffer back
    pub fn wait_dma(&mut self) -> Result<Option<Vec<u8>>> {
        let r = self.tm.wait_dma();
        self.note(r)
    }

    /// Open a transaction spanning several operations
    pub fn begin_transaction(&mut self) -> Result<()> {
        let r = self.tm.begin_transaction();
        self.note(r)
    }

    pub fn end_transaction(&mut self) -> Result<()> {
        let r = self.tm.end_transaction();
        self.note(r)
    }

    /// Change the rotation (0-3, 4-7 mirrored)
    ///
    /// Before init the rotation is stored and applied by [`init`](Self::init).
    pub fn set_rotation(&mut self, rotation: u8) -> Result<()> {
        match self.state {
            PanelState::Ready => {}
            PanelState::Uninitialized => {
                self.apply_geometry(rotation);
                return Ok(());
            }
            _ => return self.fail(ProtocolError::NotReady.into()),
        }
        self.apply_geometry(rotation);
        let r = self.write_madctl();
        self.note(r)
    }

    /// Invert the displayed colors
    pub fn set_invert(&mut self, invert: bool) -> Result<()> {
        match self.state {
            PanelState::Ready => {}
            PanelState::Uninitialized => {
                self.inverted = invert;
                return Ok(());
            }
            _ => return self.fail(ProtocolError::NotReady.into()),
        }
        self.inverted = invert;
        let r = self.write_invert();
        self.note(r)
    }

    /// Enter or leave controller sleep
    pub fn set_sleep(&mut self, sleep: bool) -> Result<()> {
        let ops = self.profile.opcodes;
        let (opcode, wait, event) = match (self.state, sleep) {
            (PanelState::Ready, false) | (PanelState::Sleeping, true) => return Ok(()),
            (PanelState::Ready, true) => (ops.sleep_in, self.profile.sleep_in_ms, PanelEvent::Sleep),
            (PanelState::Sleeping, false) => {
                (ops.sleep_out, self.profile.sleep_out_ms, PanelEvent::Wake)
            }
            _ => return self.fail(ProtocolError::NotReady.into()),
        };
        let r = self.command(opcode, &[]);
        self.note(r)?;
        self.tm.delay_ms(wait);
        self.state = self.state.transition(event);
        debug!("panel {}", self.state);
        Ok(())
    }

    /// Define the hardware scroll area and its start line
    ///
    /// `top` fixed lines stay in place, the following `height` lines
    /// scroll, `start` is the first scrolled line shown (relative to the
    /// area). Values are clamped to controller memory.
    pub fn set_vertical_scroll(&mut self, top: u16, height: u16, start: u16) -> Result<()> {
        let r = self.ready().and_then(|_| self.define_scroll(top, height, start));
        self.note(r)
    }

    /// Move the hardware scroll start by `lines`
    pub fn scroll(&mut self, lines: i32) -> Result<()> {
        let (top, height, start) = self.scroll;
        if height == 0 {
            return Ok(());
        }
        let height = height as i32;
        let start = (start as i32 + lines.rem_euclid(height)).rem_euclid(height) as u16;
        let r = self.ready().and_then(|_| self.scroll_start(top, height as u16, start));
        self.note(r)
    }

    /// Read the controller ID, most significant byte first
    pub fn read_id(&mut self) -> Result<u32> {
        let r = self.ready().and_then(|_| self.fetch_id());
        self.note(r)
    }

    /// Turn the display off and put the controller to sleep
    pub fn release(&mut self) -> Result<()> {
        if !self.state.is_initialized() {
            return self.fail(ProtocolError::NotReady.into());
        }
        let ops = self.profile.opcodes;
        let r = self.in_transaction(|p| {
            p.command(ops.display_off, &[])?;
            p.command(ops.sleep_in, &[])
        });
        self.note(r)?;
        self.tm.delay_ms(self.profile.sleep_in_ms);
        self.state = self.state.transition(PanelEvent::Release);
        info!("panel {} released", self.profile.name);
        Ok(())
    }

    /// Restrict drawing to `rect`
    pub fn set_clip_rect(&mut self, rect: Rect) {
        self.clip = rect.intersect(&self.bounds());
    }

    pub fn clear_clip_rect(&mut self) {
        self.clip = self.bounds();
    }

    /// Copy a sprite to the panel with its top-left corner at (x, y)
    ///
    /// Opaque copies open one window and stream whole converted rows,
    /// through DMA when the transport has it. Keyed or blended copies go
    /// through [`Sprite::push_to`].
    pub fn push_sprite(
        &mut self,
        sprite: &Sprite,
        x: i32,
        y: i32,
        options: PushOptions,
    ) -> Result<()> {
        let keyed = options.transparent.or(sprite.transparent()).is_some();
        if keyed || options.needs_readback() {
            return sprite.push_to(self, x, y, options);
        }
        let r = self
            .ready()
            .and_then(|_| self.in_transaction(|p| p.stream_sprite(sprite, x, y)));
        self.note(r)
    }

    fn run_init(&mut self, use_reset: bool) -> Result<()> {
        let table = self.profile.init_table;
        table.validate()?;

        if use_reset && self.has_reset {
            self.reset.set_low();
            self.tm.delay_us(self.profile.reset_hold_us);
            self.reset.set_high();
            self.tm.delay_ms(self.profile.ready_ms);
        }

        self.in_transaction(|p| {
            let bits = p.profile.command_bits;
            for cmd in table.commands() {
                let cmd = cmd?;
                p.tm.write_command_params(cmd.command as u32, bits, cmd.params)?;
                if cmd.delay_ms > 0 {
                    p.tm.delay_ms(cmd.delay_ms);
                }
            }

            if let (true, Some(expected)) = (p.config.readable, p.profile.expected_id) {
                let id = p.fetch_id()?;
                if !expected.matches(id) {
                    warn!("unexpected id {:x} for {}", id, p.profile.name);
                    return Err(ProtocolError::UnexpectedResponse.into());
                }
            }

            p.columns = None;
            p.rows = None;
            p.write_madctl()?;
            p.write_invert()
        })
    }

    /// Run `body` inside one transaction, closing it whatever happens
    fn in_transaction<T>(&mut self, body: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.tm.begin_transaction()?;
        let result = body(self);
        let end = self.tm.end_transaction();
        match result {
            Ok(value) => end.map(|_| value),
            Err(e) => Err(e),
        }
    }

    /// Recompute logical size and memory offsets for `rotation`
    fn apply_geometry(&mut self, rotation: u8) {
        self.rotation = rotation & 7;
        let r = self.effective_rotation();
        let c = &self.config;
        let (mw, mh) = (c.memory_width as i32, c.memory_height as i32);
        let (pw, ph) = (c.panel_width as i32, c.panel_height as i32);
        let (ox, oy) = (c.offset_x as i32, c.offset_y as i32);

        let (col, row) = match r & 3 {
            0 => (ox, oy),
            1 => (oy, mw - pw - ox),
            2 => (mw - pw - ox, mh - ph - oy),
            _ => (mh - ph - oy, ox),
        };
        let (memory_x, panel_x) = if r & 1 == 0 { (mw, pw) } else { (mh, ph) };
        self.col_start = if r & 4 != 0 {
            memory_x - panel_x - col
        } else {
            col
        };
        self.row_start = row;
        (self.width, self.height) = if r & 1 == 0 { (pw, ph) } else { (ph, pw) };

        self.clip = self.bounds();
        self.columns = None;
        self.rows = None;
        self.window = None;
    }

    /// Requested rotation combined with the mounting offset
    fn effective_rotation(&self) -> u8 {
        let off = self.config.offset_rotation;
        (self.rotation.wrapping_add(off) & 3) | ((self.rotation ^ off) & 4)
    }

    fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    fn ready(&self) -> Result<()> {
        if self.state.writes_allowed() {
            Ok(())
        } else {
            Err(ProtocolError::NotReady.into())
        }
    }

    fn streaming(&self) -> Result<()> {
        self.ready()?;
        if self.window.is_none() {
            return Err(ProtocolError::NoWindow.into());
        }
        Ok(())
    }

    /// Keep the error; a bus timeout also forgets cached controller state
    fn note<T>(&mut self, r: Result<T>) -> Result<T> {
        if let Err(e) = &r {
            let e = *e;
            self.last_error = Some(e);
            if e == Error::BusTimeout {
                self.columns = None;
                self.rows = None;
                self.window = None;
            }
        }
        r
    }

    fn fail<T>(&mut self, e: Error) -> Result<T> {
        self.note(Err(e))
    }

    /// Send a non-pixel command; ends any pixel stream
    fn command(&mut self, opcode: u8, params: &[u8]) -> Result<()> {
        self.window = None;
        self.tm
            .write_command_params(opcode as u32, self.profile.command_bits, params)
    }

    fn write_madctl(&mut self) -> Result<()> {
        let value = self
            .profile
            .madctl
            .value(self.effective_rotation(), !self.config.rgb_order);
        self.command(self.profile.opcodes.memory_access, &[value])
    }

    fn write_invert(&mut self) -> Result<()> {
        let ops = self.profile.opcodes;
        let opcode = if self.inverted ^ self.config.invert {
            ops.invert_on
        } else {
            ops.invert_off
        };
        self.command(opcode, &[])
    }

    fn fetch_id(&mut self) -> Result<u32> {
        if !self.config.readable {
            return Err(ProtocolError::NotReadable.into());
        }
        let opcode = self.profile.opcodes.read_id;
        let dummy = self.config.dummy_read_bits;
        let mut buf = [0u8; 4];
        self.in_transaction(|p| {
            p.command(opcode, &[])?;
            p.tm.read_bytes(&mut buf, dummy)
        })?;
        Ok(u32::from_be_bytes(buf))
    }

    fn define_scroll(&mut self, top: u16, height: u16, start: u16) -> Result<()> {
        let lines = self.config.memory_height;
        let top = top.min(lines);
        let height = height.min(lines - top);
        let bottom = lines - top - height;
        let start = if height == 0 { 0 } else { start % height };

        let [t0, t1] = top.to_be_bytes();
        let [h0, h1] = height.to_be_bytes();
        let [b0, b1] = bottom.to_be_bytes();
        let area = self.profile.opcodes.scroll_area;
        self.in_transaction(|p| {
            p.command(area, &[t0, t1, h0, h1, b0, b1])?;
            p.scroll_start(top, height, start)
        })
    }

    fn scroll_start(&mut self, top: u16, height: u16, start: u16) -> Result<()> {
        let line = top + start;
        self.command(self.profile.opcodes.scroll_start, &line.to_be_bytes())?;
        self.scroll = (top, height, start);
        Ok(())
    }

    /// Send the address ranges for a clipped, non-empty `area` followed by
    /// `opcode`
    fn address(&mut self, area: Rect, opcode: u8) -> Result<()> {
        let columns = (
            (area.x + self.col_start) as u16,
            (area.right() - 1 + self.col_start) as u16,
        );
        let rows = (
            (area.y + self.row_start) as u16,
            (area.bottom() - 1 + self.row_start) as u16,
        );
        let ops = self.profile.opcodes;
        let bits = self.profile.command_bits;
        self.window = None;

        if self.columns != Some(columns) {
            self.tm
                .write_command_params(ops.column_address as u32, bits, &range_bytes(columns))?;
            self.columns = Some(columns);
        }
        if self.rows != Some(rows) {
            self.tm
                .write_command_params(ops.row_address as u32, bits, &range_bytes(rows))?;
            self.rows = Some(rows);
        }
        self.tm.write_command(opcode as u32, bits)
    }

    /// Clip `area` and prime it for memory write
    fn open_window(&mut self, area: Rect) -> Result<Rect> {
        let area = area.intersect(&self.bounds());
        if area.is_empty() {
            self.window = None;
            return Ok(area);
        }
        let opcode = self.profile.opcodes.memory_write;
        self.in_transaction(|p| p.address(area, opcode))?;
        self.window = Some(area);
        trace!("window {} {} {} {}", area.x, area.y, area.w, area.h);
        Ok(area)
    }

    /// Encode `count` raw pixels into the primed window
    fn stream(&mut self, count: usize, pixel: impl Fn(usize) -> u32) -> Result<()> {
        let format = self.profile.native_format;
        let bits = format.bits_per_pixel();
        let per_block = STREAM_BYTES * 8 / bits as usize;
        let mut block = [0u8; STREAM_BYTES];
        let mut done = 0;
        while done < count {
            let n = (count - done).min(per_block);
            for i in 0..n {
                write_raw(&mut block, bits, i, pixel(done + i));
            }
            self.tm.write_block(&block[..format.bytes_for(n)])?;
            done += n;
        }
        Ok(())
    }

    fn stream_sprite(&mut self, sprite: &Sprite, x: i32, y: i32) -> Result<()> {
        let area = Rect::new(x, y, sprite.width() as i32, sprite.height() as i32)
            .intersect(&self.clip);
        if area.is_empty() {
            return Ok(());
        }
        let native = self.profile.native_format;
        let conv = ColorConverter::new(sprite.format(), native).with_palettes(sprite.palette(), None);
        conv.validate()?;

        self.open_window(area)?;
        let bits = native.bits_per_pixel();
        let row_len = native.bytes_for(area.w as usize);
        let dma = self.tm.dma_available();
        let mut row = alloc_row(row_len)?;

        for dy in area.y..area.bottom() {
            for (i, dx) in (area.x..area.right()).enumerate() {
                let raw = sprite.read_pixel(dx - x, dy - y).unwrap_or(0);
                write_raw(&mut row, bits, i, conv.convert(raw));
            }
            if dma {
                // The finished previous row becomes the next scratch buffer
                row = match self.tm.write_block_dma(row)? {
                    Some(done) if done.len() == row_len => done,
                    _ => alloc_row(row_len)?,
                };
            } else {
                self.tm.write_block(&row)?;
            }
        }
        if dma {
            self.tm.wait_dma()?;
        }
        Ok(())
    }

    fn write_run_inner(&mut self, x: i32, y: i32, pixels: &[u32]) -> Result<()> {
        self.ready()?;
        let clip = self.clip;
        if y < clip.y || y >= clip.bottom() {
            return Ok(());
        }
        let x0 = x.max(clip.x);
        let x1 = x.saturating_add(pixels.len() as i32).min(clip.right());
        if x0 >= x1 {
            return Ok(());
        }
        let run = &pixels[(x0 - x) as usize..(x1 - x) as usize];
        self.in_transaction(|p| {
            p.open_window(Rect::new(x0, y, x1 - x0, 1))?;
            p.stream(run.len(), |i| run[i])
        })
    }

    fn fill_inner(&mut self, area: Rect, raw: u32) -> Result<()> {
        self.ready()?;
        let area = area.intersect(&self.clip);
        if area.is_empty() {
            return Ok(());
        }
        self.in_transaction(|p| {
            p.open_window(area)?;
            p.stream(area.area(), |_| raw)
        })
    }

    fn read_inner(&mut self, x: i32, y: i32, out: &mut [u32]) -> Result<()> {
        self.ready()?;
        if !self.config.readable {
            return Err(ProtocolError::NotReadable.into());
        }
        out.fill(0);
        if y < 0 || y >= self.height {
            return Ok(());
        }
        let x0 = x.max(0);
        let x1 = x.saturating_add(out.len() as i32).min(self.width);
        if x0 >= x1 {
            return Ok(());
        }

        let read_format = self.profile.read_format;
        let conv = ColorConverter::new(read_format, self.profile.native_format);
        let bits = read_format.bits_per_pixel();
        let opcode = self.profile.opcodes.memory_read;
        let dummy = self.config.dummy_read_bits;
        let mut buf = [0u8; READ_CHUNK * 4];

        self.in_transaction(|p| {
            let mut cx = x0;
            while cx < x1 {
                let n = ((x1 - cx) as usize).min(READ_CHUNK);
                p.address(Rect::new(cx, y, n as i32, 1), opcode)?;
                let bytes = read_format.bytes_for(n);
                p.tm.read_bytes(&mut buf[..bytes], dummy)?;
                let base = (cx - x) as usize;
                for (i, slot) in out[base..base + n].iter_mut().enumerate() {
                    *slot = conv.convert(read_raw(&buf, bits, i));
                }
                cx += n as i32;
            }
            Ok(())
        })
    }
}

impl<B: Bus, D: DelayNs, RST: OutputPin> Surface for Panel<B, D, RST> {
    fn format(&self) -> PixelFormat {
        self.profile.native_format
    }

    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn clip_rect(&self) -> Rect {
        self.clip
    }

    fn write_run(&mut self, x: i32, y: i32, pixels: &[u32]) -> Result<()> {
        let r = self.write_run_inner(x, y, pixels);
        self.note(r)
    }

    fn fill_span(&mut self, x: i32, y: i32, len: i32, raw: u32) -> Result<()> {
        self.fill_area(Rect::new(x, y, len, 1), raw)
    }

    fn fill_area(&mut self, area: Rect, raw: u32) -> Result<()> {
        let r = self.fill_inner(area, raw);
        self.note(r)
    }

    fn read_run(&mut self, x: i32, y: i32, out: &mut [u32]) -> Result<()> {
        let r = self.read_inner(x, y, out);
        self.note(r)
    }

    fn begin_batch(&mut self) -> Result<()> {
        let r = self.ready().and_then(|_| self.tm.begin_transaction());
        self.note(r)
    }

    fn end_batch(&mut self) -> Result<()> {
        self.end_transaction()
    }
}

/// Big-endian start and end of an address range
fn range_bytes((start, end): (u16, u16)) -> [u8; 4] {
    let [s0, s1] = start.to_be_bytes();
    let [e0, e1] = end.to_be_bytes();
    [s0, s1, e0, e1]
}

fn alloc_row(len: usize) -> Result<Vec<u8>> {
    let mut row = Vec::new();
    row.try_reserve_exact(len).map_err(|_| Error::Allocation)?;
    row.resize(len, 0);
    Ok(row)
}
