#![doc = r#"
PPU OAM evaluation

Selects up to eight sprites for the next scanline at dot 257 of each visible
line. Entries are scanned in OAM order; Y values above $EF never match. A
ninth match sets the sprite overflow flag and ends the scan.
"#]

use super::{MAX_SPRITES_PER_LINE, Ppu, Sprite};

const OAM_ENTRIES: usize = 64;
const Y_HIDDEN_ABOVE: u8 = 0xEF;

impl Ppu {
    pub(super) fn evaluate_sprites(&mut self) {
        self.sprite_count = 0;
        let height = self.sprite_height();
        let line = self.scanline as i32;

        for i in 0..OAM_ENTRIES {
            let sprite = Sprite::from_oam(&self.oam, i);
            if sprite.y > Y_HIDDEN_ABOVE {
                continue;
            }
            let row = line - sprite.y as i32;
            if !(0..height).contains(&row) {
                continue;
            }
            let n = self.sprite_count as usize;
            if n < MAX_SPRITES_PER_LINE {
                self.sprites[n] = sprite;
                self.sprite_indices[n] = i as u8;
                self.sprite_count += 1;
            } else {
                self.sprite_overflow = true;
                break;
            }
        }
    }
}
