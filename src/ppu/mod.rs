/*!
PPU implementation providing:
- CPU-visible register interface ($2000..$2007) and the OAM DMA sink
- Per-dot timing over a 341 x 262 grid with the odd-frame skip
- Background fetch pipeline with loopy v/t/x scrolling
- Per-scanline sprite evaluation (8 sprites, overflow flag)
- Pixel composition into a 256 x 240 buffer of palette indices (0..=63)
- Once-per-scanline rendering edge reported to the mapper (MMC3 IRQ clock)

STRUCTURE:
- `Ppu` holds all state (register latches, nametables, palette RAM, OAM,
  fetch latches and shifters, evaluated sprites, screen buffer, timing).
- `tick` advances one dot and returns `PpuEvents` for the caller to route.
- Cartridge-side accesses (pattern tables, mirroring, scanline edge) go
  through the `PpuBus` trait, so the PPU never holds a reference to the bus.

Submodules (each adds an `impl Ppu` block):
- registers: $2000-$2007 read/write semantics and OAM DMA.
- memory: PPU address space (CHR, mirrored nametables, palette aliasing).
- fetch: background fetch pipeline, v increments, t->v copies, scanline edge.
- oam_eval: sprite selection for the next scanline.
- sprite: OAM entry decoding and sprite pixel lookup.
- renderer: pixel emission and priority.
*/

use crate::error::SnapshotError;
use crate::ppu_bus::PpuBus;
use crate::snapshot::{StateReader, StateWriter};

pub(crate) mod fetch;
pub(crate) mod memory;
pub(crate) mod oam_eval;
pub(crate) mod registers;
pub(crate) mod renderer;
pub(crate) mod sprite;

pub use memory::nametable_index;
pub use sprite::Sprite;

/// Screen width in pixels.
pub const SCREEN_WIDTH: usize = 256;
/// Screen height in pixels.
pub const SCREEN_HEIGHT: usize = 240;

/// Dots per scanline (0..=340).
pub const DOTS_PER_SCANLINE: u16 = 341;
/// Scanlines per frame (0..=261).
pub const SCANLINES_PER_FRAME: u16 = 262;

pub(crate) const POST_RENDER_SCANLINE: u16 = 241;
pub(crate) const PRE_RENDER_SCANLINE: u16 = 261;

const NAMETABLE_RAM_SIZE: usize = 0x1000;
const PALETTE_RAM_SIZE: usize = 32;
const OAM_SIZE: usize = 256;
const MAX_SPRITES_PER_LINE: usize = 8;

// PPUCTRL bits
pub(crate) const CTRL_INCREMENT_32: u8 = 0x04;
pub(crate) const CTRL_SPRITE_TABLE: u8 = 0x08;
pub(crate) const CTRL_BG_TABLE: u8 = 0x10;
pub(crate) const CTRL_SPRITE_8X16: u8 = 0x20;
pub(crate) const CTRL_NMI_ENABLE: u8 = 0x80;

// PPUMASK bits
pub(crate) const MASK_LEFT_BG: u8 = 0x02;
pub(crate) const MASK_LEFT_SPRITES: u8 = 0x04;
pub(crate) const MASK_SHOW_BG: u8 = 0x08;
pub(crate) const MASK_SHOW_SPRITES: u8 = 0x10;

/// Signals produced by a single dot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PpuEvents {
    /// Vblank began with NMI enabled.
    pub nmi: bool,
    /// The mapper requested an IRQ on the scanline edge.
    pub irq: bool,
    /// Post-render scanline, dot 1.
    pub frame_complete: bool,
}

pub struct Ppu {
    // Loopy scroll registers
    v: u16,
    t: u16,
    fine_x: u8,
    write_toggle: bool,

    // CPU-visible register state
    ctrl: u8,
    mask: u8,
    vblank: bool,
    sprite_zero_hit: bool,
    sprite_overflow: bool,
    last_write: u8,
    read_buffer: u8,
    oam_addr: u8,

    // Memories
    oam: [u8; OAM_SIZE],
    nametables: [u8; NAMETABLE_RAM_SIZE],
    palette: [u8; PALETTE_RAM_SIZE],

    // Background fetch latches and shifters
    nt_latch: u8,
    at_latch_byte: u8,
    bg_lo_latch: u8,
    bg_hi_latch: u8,
    bg_lo_shift: u16,
    bg_hi_shift: u16,
    at_shift: u16,
    at_latch: u8,

    // Sprites selected for the next scanline
    sprites: [Sprite; MAX_SPRITES_PER_LINE],
    sprite_indices: [u8; MAX_SPRITES_PER_LINE],
    sprite_count: u8,

    // Timing
    scanline: u16,
    dot: u16,
    odd_frame: bool,

    // Output: palette indices, row-major 256 x 240
    screen: Box<[u8]>,
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}

impl Ppu {
    /// Serialized size of the full PPU state, screen buffer included.
    pub const STATE_SIZE: usize = 2 + 2 + 1 + 1 // v, t, fine x, w
        + 1 + 1 + 3 + 1 + 1 + 1 // ctrl, mask, status flags, last write, buffer, oam addr
        + OAM_SIZE
        + NAMETABLE_RAM_SIZE
        + PALETTE_RAM_SIZE
        + 5 + 2 + 2 + 2 // latches, shifters
        + MAX_SPRITES_PER_LINE * Sprite::SIZE + MAX_SPRITES_PER_LINE + 1
        + 2 + 2 + 1 // scanline, dot, odd frame
        + SCREEN_WIDTH * SCREEN_HEIGHT;

    pub fn new() -> Self {
        let mut ppu = Self {
            v: 0,
            t: 0,
            fine_x: 0,
            write_toggle: false,
            ctrl: 0,
            mask: 0,
            vblank: false,
            sprite_zero_hit: false,
            sprite_overflow: false,
            last_write: 0,
            read_buffer: 0,
            oam_addr: 0,
            oam: [0; OAM_SIZE],
            nametables: [0; NAMETABLE_RAM_SIZE],
            palette: [0; PALETTE_RAM_SIZE],
            nt_latch: 0,
            at_latch_byte: 0,
            bg_lo_latch: 0,
            bg_hi_latch: 0,
            bg_lo_shift: 0,
            bg_hi_shift: 0,
            at_shift: 0,
            at_latch: 0,
            sprites: [Sprite::default(); MAX_SPRITES_PER_LINE],
            sprite_indices: [0; MAX_SPRITES_PER_LINE],
            sprite_count: 0,
            scanline: 0,
            dot: 0,
            odd_frame: false,
            screen: vec![0u8; SCREEN_WIDTH * SCREEN_HEIGHT].into_boxed_slice(),
        };
        ppu.write_ctrl(0);
        ppu.write_mask(0);
        ppu
    }

    /// Advance one dot. Cartridge-side accesses go through `bus`.
    pub fn tick<B: PpuBus>(&mut self, bus: &mut B) -> PpuEvents {
        let mut events = PpuEvents::default();

        if self.rendering_enabled()
            && self.odd_frame
            && self.dot == 339
            && self.scanline == PRE_RENDER_SCANLINE
        {
            self.dot = 0;
            self.scanline = 0;
            self.odd_frame = !self.odd_frame;
        } else {
            self.dot += 1;
            if self.dot >= DOTS_PER_SCANLINE {
                self.dot = 0;
                self.scanline += 1;
            }
            if self.scanline >= SCANLINES_PER_FRAME {
                self.scanline = 0;
                self.odd_frame = !self.odd_frame;
            }
        }

        if self.dot == 0 {
            return events;
        }

        let visible = self.scanline < SCREEN_HEIGHT as u16;
        let pre_render = self.scanline == PRE_RENDER_SCANLINE;

        if self.rendering_enabled() && (visible || pre_render) {
            events.irq = self.render_dot(bus);
        }

        if self.dot == 1 {
            if pre_render {
                self.sprite_overflow = false;
                self.sprite_zero_hit = false;
                self.vblank = false;
            } else if self.scanline == POST_RENDER_SCANLINE {
                self.vblank = true;
                events.frame_complete = true;
                events.nmi = self.nmi_enabled();
            }
        }

        events
    }

    // ---------------------------------------------------------------------
    // Control / mask decoding
    // ---------------------------------------------------------------------

    #[inline]
    pub(crate) fn rendering_enabled(&self) -> bool {
        self.mask & (MASK_SHOW_BG | MASK_SHOW_SPRITES) != 0
    }

    #[inline]
    pub(crate) fn show_background(&self) -> bool {
        self.mask & MASK_SHOW_BG != 0
    }

    #[inline]
    pub(crate) fn show_sprites(&self) -> bool {
        self.mask & MASK_SHOW_SPRITES != 0
    }

    #[inline]
    pub(crate) fn bg_table_base(&self) -> u16 {
        if self.ctrl & CTRL_BG_TABLE != 0 { 0x1000 } else { 0x0000 }
    }

    #[inline]
    pub(crate) fn sprite_table_base(&self) -> u16 {
        if self.ctrl & CTRL_SPRITE_TABLE != 0 { 0x1000 } else { 0x0000 }
    }

    #[inline]
    pub(crate) fn sprite_height(&self) -> i32 {
        if self.ctrl & CTRL_SPRITE_8X16 != 0 { 16 } else { 8 }
    }

    #[inline]
    pub(crate) fn vram_increment(&self) -> u16 {
        if self.ctrl & CTRL_INCREMENT_32 != 0 { 32 } else { 1 }
    }

    pub fn nmi_enabled(&self) -> bool {
        self.ctrl & CTRL_NMI_ENABLE != 0
    }

    // ---------------------------------------------------------------------
    // Inspection
    // ---------------------------------------------------------------------

    /// Screen buffer of palette indices, row-major, 256 x 240.
    pub fn screen(&self) -> &[u8] {
        &self.screen
    }

    /// Palette index at (x, y). Out-of-range coordinates yield 0.
    pub fn pixel_index(&self, x: usize, y: usize) -> u8 {
        if x >= SCREEN_WIDTH || y >= SCREEN_HEIGHT {
            return 0;
        }
        self.screen[y * SCREEN_WIDTH + x]
    }

    pub fn scanline(&self) -> u16 {
        self.scanline
    }

    pub fn dot(&self) -> u16 {
        self.dot
    }

    pub fn is_odd_frame(&self) -> bool {
        self.odd_frame
    }

    pub fn vblank(&self) -> bool {
        self.vblank
    }

    pub fn sprite_zero_hit(&self) -> bool {
        self.sprite_zero_hit
    }

    pub fn sprite_overflow(&self) -> bool {
        self.sprite_overflow
    }

    pub fn vram_addr(&self) -> u16 {
        self.v
    }

    pub fn temp_addr(&self) -> u16 {
        self.t
    }

    pub fn fine_x(&self) -> u8 {
        self.fine_x
    }

    pub fn oam(&self) -> &[u8] {
        &self.oam
    }

    // ---------------------------------------------------------------------
    // Snapshot
    // ---------------------------------------------------------------------

    pub(crate) fn save_state(&self, w: &mut StateWriter) {
        w.u16(self.v);
        w.u16(self.t);
        w.u8(self.fine_x);
        w.bool(self.write_toggle);

        w.u8(self.ctrl);
        w.u8(self.mask);
        w.bool(self.vblank);
        w.bool(self.sprite_zero_hit);
        w.bool(self.sprite_overflow);
        w.u8(self.last_write);
        w.u8(self.read_buffer);
        w.u8(self.oam_addr);

        w.bytes(&self.oam);
        w.bytes(&self.nametables);
        w.bytes(&self.palette);

        w.u8(self.nt_latch);
        w.u8(self.at_latch_byte);
        w.u8(self.bg_lo_latch);
        w.u8(self.bg_hi_latch);
        w.u8(self.at_latch);
        w.u16(self.bg_lo_shift);
        w.u16(self.bg_hi_shift);
        w.u16(self.at_shift);

        for s in &self.sprites {
            w.bytes(&s.to_bytes());
        }
        w.bytes(&self.sprite_indices);
        w.u8(self.sprite_count);

        w.u16(self.scanline);
        w.u16(self.dot);
        w.bool(self.odd_frame);

        w.bytes(&self.screen);
    }

    pub(crate) fn load_state(&mut self, r: &mut StateReader<'_>) -> Result<(), SnapshotError> {
        self.v = r.u16()? & 0x7FFF;
        self.t = r.u16()? & 0x7FFF;
        self.fine_x = r.u8()? & 0x07;
        self.write_toggle = r.bool()?;

        self.ctrl = r.u8()?;
        self.mask = r.u8()?;
        self.vblank = r.bool()?;
        self.sprite_zero_hit = r.bool()?;
        self.sprite_overflow = r.bool()?;
        self.last_write = r.u8()?;
        self.read_buffer = r.u8()?;
        self.oam_addr = r.u8()?;

        r.read_into(&mut self.oam)?;
        r.read_into(&mut self.nametables)?;
        r.read_into(&mut self.palette)?;

        self.nt_latch = r.u8()?;
        self.at_latch_byte = r.u8()?;
        self.bg_lo_latch = r.u8()?;
        self.bg_hi_latch = r.u8()?;
        self.at_latch = r.u8()?;
        self.bg_lo_shift = r.u16()?;
        self.bg_hi_shift = r.u16()?;
        self.at_shift = r.u16()?;

        for s in &mut self.sprites {
            *s = Sprite::from_bytes(r.take(Sprite::SIZE)?);
        }
        r.read_into(&mut self.sprite_indices)?;
        let count = r.u8()?;
        if count as usize > MAX_SPRITES_PER_LINE {
            return Err(SnapshotError::Corrupt("sprite count"));
        }
        self.sprite_count = count;

        let scanline = r.u16()?;
        let dot = r.u16()?;
        if scanline >= SCANLINES_PER_FRAME || dot >= DOTS_PER_SCANLINE {
            return Err(SnapshotError::Corrupt("ppu position"));
        }
        self.scanline = scanline;
        self.dot = dot;
        self.odd_frame = r.bool()?;

        r.read_into(&mut self.screen)?;
        if self.screen.iter().any(|&ix| ix > 0x3F) {
            return Err(SnapshotError::Corrupt("screen index"));
        }
        Ok(())
    }
}
