#![doc = r#"
PPU sprite helpers

Responsibilities
- Decode a 4-byte OAM entry (Y, tile, attributes, X) into `Sprite`.
- Produce the sprite palette address for the pixel being emitted, scanning
  the sprites selected for this line in OAM order.

Notes
- Sprites are selected one line ahead (see `oam_eval`), so the row inside the
  sprite is `scanline - y - 1`.
- Attribute bits: 0-1 palette, 5 behind background, 6 horizontal flip,
  7 vertical flip.
- In 8x16 mode the tile's bit 0 picks the pattern table and the even/odd tile
  pair covers the top/bottom halves.
"#]

use super::Ppu;
use crate::ppu_bus::PpuBus;

const ATTR_PALETTE: u8 = 0x03;
const ATTR_BEHIND_BG: u8 = 0x20;
const ATTR_FLIP_H: u8 = 0x40;
const ATTR_FLIP_V: u8 = 0x80;

/// One OAM entry.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Sprite {
    pub y: u8,
    pub tile: u8,
    pub attr: u8,
    pub x: u8,
}

/// An opaque sprite pixel found for the current dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SpritePixel {
    pub color_addr: u16,
    pub oam_index: u8,
    pub behind_bg: bool,
}

impl Sprite {
    /// Bytes per OAM entry.
    pub const SIZE: usize = 4;

    /// Decode the `index`-th entry (0..64) of primary OAM.
    pub fn from_oam(oam: &[u8], index: usize) -> Self {
        let base = index * Self::SIZE;
        Self::from_bytes(&oam[base..base + Self::SIZE])
    }

    /// Decode from at least four bytes in OAM order. Missing bytes read as 0.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let b = |i: usize| bytes.get(i).copied().unwrap_or(0);
        Self {
            y: b(0),
            tile: b(1),
            attr: b(2),
            x: b(3),
        }
    }

    pub fn to_bytes(self) -> [u8; Self::SIZE] {
        [self.y, self.tile, self.attr, self.x]
    }

    #[inline]
    pub fn palette(&self) -> u8 {
        self.attr & ATTR_PALETTE
    }

    #[inline]
    pub fn behind_background(&self) -> bool {
        self.attr & ATTR_BEHIND_BG != 0
    }

    #[inline]
    pub fn flip_horizontal(&self) -> bool {
        self.attr & ATTR_FLIP_H != 0
    }

    #[inline]
    pub fn flip_vertical(&self) -> bool {
        self.attr & ATTR_FLIP_V != 0
    }
}

impl Ppu {
    /// First opaque sprite pixel at (x, scanline) among the selected sprites.
    pub(super) fn sprite_pixel<B: PpuBus>(&self, x: i32, bus: &B) -> Option<SpritePixel> {
        if !self.show_sprites() || (self.mask & super::MASK_LEFT_SPRITES == 0 && x < 8) {
            return None;
        }

        let height = self.sprite_height();
        let y = self.scanline as i32;

        for i in 0..self.sprite_count as usize {
            let sprite = self.sprites[i];
            let mut col = x - sprite.x as i32;
            if !(0..8).contains(&col) {
                continue;
            }
            let mut row = y - sprite.y as i32 - 1;

            if sprite.flip_horizontal() {
                col = 7 - col;
            }
            if sprite.flip_vertical() {
                row = height - 1 - row;
            }

            let mut table = self.sprite_table_base() as i32;
            let mut tile = sprite.tile as i32;
            if height == 16 {
                table = if tile & 0x01 != 0 { 0x1000 } else { 0x0000 };
                tile &= 0xFE;
                if row >= 8 {
                    tile += 1;
                    row -= 8;
                }
            }

            // Out-of-window rows (only reachable from restored state) wrap
            // like any other PPU address.
            let addr = (table + (tile << 4) + row) as u16;
            let lo = self.read(addr, bus);
            let hi = self.read(addr.wrapping_add(8), bus);
            if lo == 0 && hi == 0 {
                continue;
            }

            let shift = 7 - col;
            let ix = (((hi >> shift) & 1) << 1) | ((lo >> shift) & 1);
            if ix != 0 {
                return Some(SpritePixel {
                    color_addr: 0x3F10 | ((sprite.palette() as u16) << 2) | ix as u16,
                    oam_index: self.sprite_indices[i],
                    behind_bg: sprite.behind_background(),
                });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::Mirroring;
    use crate::ppu::{CTRL_SPRITE_8X16, CTRL_SPRITE_TABLE, MASK_LEFT_SPRITES, MASK_SHOW_SPRITES};
    use crate::ppu_bus::mock::MockPpuBus;

    fn setup_with(sprites: &[(u8, Sprite)], scanline: u16) -> (Ppu, MockPpuBus) {
        let mut p = Ppu::new();
        let mut bus = MockPpuBus::new(Mirroring::Horizontal);
        p.write_register(0x2001, MASK_SHOW_SPRITES | MASK_LEFT_SPRITES, &mut bus);
        for (i, (oam_index, s)) in sprites.iter().enumerate() {
            p.sprites[i] = *s;
            p.sprite_indices[i] = *oam_index;
        }
        p.sprite_count = sprites.len() as u8;
        p.scanline = scanline;
        (p, bus)
    }

    #[test]
    fn oam_entry_decoding() {
        let mut oam = [0u8; 256];
        oam[4..8].copy_from_slice(&[0x10, 0x22, 0xE3, 0x40]);
        let s = Sprite::from_oam(&oam, 1);
        assert_eq!(s, Sprite { y: 0x10, tile: 0x22, attr: 0xE3, x: 0x40 });
        assert_eq!(s.palette(), 3);
        assert!(s.behind_background() && s.flip_horizontal() && s.flip_vertical());
        assert_eq!(Sprite::from_bytes(&s.to_bytes()), s);
    }

    #[test]
    fn pixel_uses_row_below_selection_line() {
        // Sprite at y=10 is drawn starting on line 11; row 0 of tile 1.
        let s = Sprite { y: 10, tile: 1, attr: 0x01, x: 20 };
        let (p, mut bus) = setup_with(&[(5, s)], 11);
        bus.pattern[0x10] = 0x80; // leftmost column, low plane
        let px = p.sprite_pixel(20, &bus).expect("opaque");
        assert_eq!(px.color_addr, 0x3F10 | (1 << 2) | 1);
        assert_eq!(px.oam_index, 5);
        assert!(!px.behind_bg);
        assert!(p.sprite_pixel(21, &bus).is_none());
        assert!(p.sprite_pixel(19, &bus).is_none());
    }

    #[test]
    fn horizontal_and_vertical_flip() {
        let s = Sprite { y: 0, tile: 0, attr: 0xC0, x: 0 };
        let (p, mut bus) = setup_with(&[(0, s)], 1);
        // Row 0 flipped vertically reads row 7; column 0 flipped reads bit 0.
        bus.pattern[7 + 8] = 0x01;
        let px = p.sprite_pixel(0, &bus).expect("opaque");
        assert_eq!(px.color_addr & 0x03, 2);
    }

    #[test]
    fn tall_sprites_pick_table_from_tile_bit() {
        let s = Sprite { y: 0, tile: 0x03, attr: 0, x: 0 };
        let (mut p, mut bus) = setup_with(&[(0, s)], 9);
        p.write_register(0x2000, CTRL_SPRITE_8X16, &mut bus);
        // Row 8 is the top row of the lower tile 0x03 in the $1000 table.
        bus.pattern[0x1000 + 0x03 * 16] = 0x80;
        assert!(p.sprite_pixel(0, &bus).is_some());
    }

    #[test]
    fn sprite_table_select_and_earlier_entry_wins() {
        let a = Sprite { y: 0, tile: 0, attr: 0x00, x: 0 };
        let b = Sprite { y: 0, tile: 1, attr: 0x02, x: 0 };
        let (mut p, mut bus) = setup_with(&[(3, a), (1, b)], 1);
        p.write_register(0x2000, CTRL_SPRITE_TABLE, &mut bus);
        bus.pattern[0x1010] = 0x80;
        // Entry `a` is transparent, so `b` shows through.
        assert_eq!(p.sprite_pixel(0, &bus).map(|px| px.oam_index), Some(1));
        bus.pattern[0x1000] = 0x80;
        assert_eq!(p.sprite_pixel(0, &bus).map(|px| px.oam_index), Some(3));
    }

    #[test]
    fn left_column_hidden_without_flag() {
        let s = Sprite { y: 0, tile: 0, attr: 0, x: 0 };
        let (mut p, mut bus) = setup_with(&[(0, s)], 1);
        bus.pattern[0] = 0xFF;
        p.write_register(0x2001, MASK_SHOW_SPRITES, &mut bus);
        assert!(p.sprite_pixel(3, &bus).is_none());
    }
}
