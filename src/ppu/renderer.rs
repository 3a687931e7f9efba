#![doc = r#"
PPU renderer module

Composes one pixel per visible dot from the background shifters and the
selected sprites, resolves priority, raises sprite-zero hit and stores the
resulting palette index (0..=63) in the screen buffer.
"#]

use super::{MASK_LEFT_BG, MASK_LEFT_SPRITES, Ppu, SCREEN_WIDTH};
use crate::ppu_bus::PpuBus;

const BLANK_INDEX: u8 = 63;
const UNIVERSAL_BACKGROUND: u16 = 0x3F00;

impl Ppu {
    pub(super) fn emit_pixel<B: PpuBus>(&mut self, bus: &B) {
        let x = self.dot as i32 - 1;
        let idx = self.scanline as usize * SCREEN_WIDTH + x as usize;

        if x < 8 && self.mask & (MASK_LEFT_BG | MASK_LEFT_SPRITES) == 0 {
            self.screen[idx] = BLANK_INDEX;
            return;
        }

        let bg = self.bg_color_addr();
        let sprite = self.sprite_pixel(x, bus);

        let color_addr = match (bg, sprite) {
            (Some(bg), Some(sp)) => {
                if sp.oam_index == 0 && x != 255 {
                    self.sprite_zero_hit = true;
                }
                if sp.behind_bg { bg } else { sp.color_addr }
            }
            (Some(bg), None) => bg,
            (None, Some(sp)) => sp.color_addr,
            (None, None) => UNIVERSAL_BACKGROUND,
        };

        self.screen[idx] = self.read(color_addr, bus) & 0x3F;
    }

    fn bg_color_addr(&self) -> Option<u16> {
        if !self.show_background() || (self.mask & MASK_LEFT_BG == 0 && self.dot < 9) {
            return None;
        }
        let bit = 15 - self.fine_x as u16;
        let lo = (self.bg_lo_shift >> bit) & 1;
        let hi = (self.bg_hi_shift >> bit) & 1;
        if lo == 0 && hi == 0 {
            return None;
        }
        let palette = (self.at_shift >> (14 - 2 * self.fine_x as u16)) & 0x03;
        Some(UNIVERSAL_BACKGROUND | (palette << 2) | (hi << 1) | lo)
    }
}
