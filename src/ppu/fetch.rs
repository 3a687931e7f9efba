/*!
Background fetch pipeline and per-dot rendering work.

Runs only while rendering is enabled, on visible lines (0-239) and the
pre-render line (261):

- Dots 1-256 on visible lines emit a pixel first (see `renderer`).
- Dots 1-256 and 321-336 shift the background shifters, then by dot % 8:
    1: nametable byte at 0x2000 | (v & 0x0FFF)
    3: attribute byte, pre-shifted to the quadrant selected by v
    5: pattern low plane at bg table + nt * 16 + fine Y
    7: pattern high plane (+8)
    0: reload shifter low bytes, latch the attribute, then increment
       vertical v at dot 256 or horizontal v otherwise
- Dot 257: copy horizontal bits t -> v; evaluate sprites for the next line
  (visible lines) or clear the selection (pre-render).
- Pre-render dots 280-304: copy vertical bits t -> v.
- With background and sprites both shown, the mapper sees one rendering
  edge per line: dot 270 when the background uses $0000, dot 324 when it
  uses $1000.
*/

use super::{PRE_RENDER_SCANLINE, Ppu, SCREEN_HEIGHT};
use crate::ppu_bus::PpuBus;

const SCANLINE_EDGE_DOT_BG_LOW: u16 = 270;
const SCANLINE_EDGE_DOT_BG_HIGH: u16 = 324;

impl Ppu {
    /// Rendering work for the current dot. Returns `true` if the mapper
    /// requested an IRQ on the scanline edge.
    pub(super) fn render_dot<B: PpuBus>(&mut self, bus: &mut B) -> bool {
        let dot = self.dot;
        let visible = self.scanline < SCREEN_HEIGHT as u16;
        let pre_render = self.scanline == PRE_RENDER_SCANLINE;

        if visible && (1..=256).contains(&dot) {
            self.emit_pixel(bus);
        }

        if dot <= 256 || (321..337).contains(&dot) {
            self.fetch_step(bus);
        }

        if dot == 257 {
            // v: ....F.. ...EDCBA = t: ....F.. ...EDCBA
            self.v = (self.v & 0xFBE0) | (self.t & 0x041F);
            if visible {
                self.evaluate_sprites();
            } else {
                self.sprite_count = 0;
            }
        }

        if pre_render && (280..=304).contains(&dot) {
            // v: IHGF.ED CBA..... = t: IHGF.ED CBA.....
            self.v = (self.v & 0x841F) | (self.t & 0x7BE0);
        }

        if self.show_background() && self.show_sprites() {
            let edge_dot = if self.bg_table_base() == 0 {
                SCANLINE_EDGE_DOT_BG_LOW
            } else {
                SCANLINE_EDGE_DOT_BG_HIGH
            };
            if dot == edge_dot {
                return bus.scanline_edge();
            }
        }
        false
    }

    fn fetch_step<B: PpuBus>(&mut self, bus: &mut B) {
        self.bg_lo_shift <<= 1;
        self.bg_hi_shift <<= 1;
        self.at_shift = (self.at_shift << 2) | (self.at_latch & 0x03) as u16;

        match self.dot & 0x07 {
            1 => {
                self.nt_latch = self.read(0x2000 | (self.v & 0x0FFF), bus);
            }
            3 => {
                let v = self.v;
                let addr = 0x23C0 | (v & 0x0C00) | ((v >> 4) & 0x38) | ((v >> 2) & 0x07);
                let mut at = self.read(addr, bus);
                if v & 0x40 != 0 {
                    at >>= 4;
                }
                if v & 0x02 != 0 {
                    at >>= 2;
                }
                self.at_latch_byte = at;
            }
            5 => {
                let addr = self.bg_pattern_addr();
                self.bg_lo_latch = self.read(addr, bus);
            }
            7 => {
                let addr = self.bg_pattern_addr().wrapping_add(8);
                self.bg_hi_latch = self.read(addr, bus);
            }
            0 => {
                self.bg_lo_shift = (self.bg_lo_shift & 0xFF00) | self.bg_lo_latch as u16;
                self.bg_hi_shift = (self.bg_hi_shift & 0xFF00) | self.bg_hi_latch as u16;
                self.at_latch = self.at_latch_byte & 0x03;
                if self.dot == 256 {
                    self.increment_vertical();
                } else {
                    self.increment_horizontal();
                }
            }
            _ => {}
        }
    }

    #[inline]
    fn bg_pattern_addr(&self) -> u16 {
        let fine_y = (self.v >> 12) & 0x07;
        self.bg_table_base() + ((self.nt_latch as u16) << 4) + fine_y
    }

    pub(super) fn increment_horizontal(&mut self) {
        if self.v & 0x001F == 31 {
            self.v &= !0x001F;
            self.v ^= 0x0400;
        } else {
            self.v += 1;
        }
    }

    pub(super) fn increment_vertical(&mut self) {
        if self.v & 0x7000 != 0x7000 {
            self.v += 0x1000;
            return;
        }
        self.v &= !0x7000;
        let coarse_y = (self.v >> 5) & 0x1F;
        let coarse_y = match coarse_y {
            29 => {
                self.v ^= 0x0800;
                0
            }
            31 => 0,
            y => y + 1,
        };
        self.v = (self.v & !0x03E0) | (coarse_y << 5);
    }
}
