#![doc = r#"
PPU registers module

Purpose
- CPU-visible register semantics for $2000-$2007 plus the OAM DMA sink.

Notes
- The bus folds 0x2000..=0x3FFF onto 0x2000..=0x2007 before calling in.
- Every write, OAM DMA included, is remembered; PPUSTATUS returns its low
  five bits.
- PPUDATA ($2007) reads below $3F00 are buffered; palette reads return
  immediately and refill the buffer from the nametable byte at v - $1000.
  Both reads and writes advance v by 1 or 32 (PPUCTRL bit 2).
- Scroll and address writes follow the loopy t/x/w model; v and t stay
  within 15 bits.
"#]

use super::Ppu;
use crate::ppu_bus::PpuBus;

const ADDR_MASK: u16 = 0x7FFF;

impl Ppu {
    /// CPU read of register `addr` (0x2000..=0x2007).
    pub fn read_register<B: PpuBus>(&mut self, addr: u16, bus: &mut B) -> u8 {
        match addr {
            0x2002 => {
                let mut res = self.last_write & 0x1F;
                res |= (self.sprite_overflow as u8) << 5;
                res |= (self.sprite_zero_hit as u8) << 6;
                res |= (self.vblank as u8) << 7;
                self.vblank = false;
                self.write_toggle = false;
                res
            }
            0x2004 => self.oam[self.oam_addr as usize],
            0x2007 => {
                let v = self.v;
                let res = if (v & 0x3FFF) < 0x3F00 {
                    let buffered = self.read_buffer;
                    self.read_buffer = self.read(v, bus);
                    buffered
                } else {
                    let value = self.read(v, bus);
                    self.read_buffer = self.read(v.wrapping_sub(0x1000), bus);
                    value
                };
                self.v = v.wrapping_add(self.vram_increment()) & ADDR_MASK;
                res
            }
            _ => 0,
        }
    }

    /// CPU write of register `addr` (0x2000..=0x2007).
    pub fn write_register<B: PpuBus>(&mut self, addr: u16, value: u8, bus: &mut B) {
        self.last_write = value;
        match addr {
            0x2000 => self.write_ctrl(value),
            0x2001 => self.write_mask(value),
            0x2003 => self.oam_addr = value,
            0x2004 => {
                self.oam[self.oam_addr as usize] = value;
                self.oam_addr = self.oam_addr.wrapping_add(1);
            }
            0x2005 => {
                if self.write_toggle {
                    // t: .CBA ..HG FED. .... <- d: HGFEDCBA
                    self.t = (self.t & 0x8FFF) | (((value & 0x07) as u16) << 12);
                    self.t = (self.t & 0xFC1F) | (((value >> 3) as u16) << 5);
                    self.write_toggle = false;
                } else {
                    // t: .... .... ...H GFED <- d: HGFED...; x <- CBA
                    self.t = (self.t & 0xFFE0) | (value >> 3) as u16;
                    self.fine_x = value & 0x07;
                    self.write_toggle = true;
                }
                self.t &= ADDR_MASK;
            }
            0x2006 => {
                if self.write_toggle {
                    self.t = (self.t & 0xFF00) | value as u16;
                    self.v = self.t;
                    self.write_toggle = false;
                } else {
                    // Bit 14 is cleared by the high write.
                    self.t = (self.t & 0x80FF) | (((value & 0x3F) as u16) << 8);
                    self.t &= 0x3FFF;
                    self.write_toggle = true;
                }
            }
            0x2007 => {
                self.write(self.v, value, bus);
                self.v = self.v.wrapping_add(self.vram_increment()) & ADDR_MASK;
            }
            _ => {}
        }
    }

    /// OAMDMA: copy a 256-byte CPU page into OAM starting at the OAM address.
    pub fn write_oam_dma(&mut self, page: u8, data: &[u8]) {
        self.last_write = page;
        for &byte in data.iter().take(256) {
            self.oam[self.oam_addr as usize] = byte;
            self.oam_addr = self.oam_addr.wrapping_add(1);
        }
    }

    pub(crate) fn write_ctrl(&mut self, value: u8) {
        self.ctrl = value;
        // t: ...BA.. ........ <- d: ......BA
        self.t = (self.t & 0xF3FF) | (((value & 0x03) as u16) << 10);
    }

    pub(crate) fn write_mask(&mut self, value: u8) {
        self.mask = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::Mirroring;
    use crate::ppu::{CTRL_INCREMENT_32, CTRL_NMI_ENABLE};
    use crate::ppu_bus::mock::MockPpuBus;

    fn setup() -> (Ppu, MockPpuBus) {
        (Ppu::new(), MockPpuBus::new(Mirroring::Horizontal))
    }

    #[test]
    fn status_read_clears_vblank_and_write_toggle() {
        let (mut p, mut bus) = setup();
        p.vblank = true;
        p.write_register(0x2005, 0x00, &mut bus);
        assert!(p.write_toggle);
        let s = p.read_register(0x2002, &mut bus);
        assert_ne!(s & 0x80, 0);
        assert!(!p.vblank());
        assert!(!p.write_toggle);
        assert_eq!(p.read_register(0x2002, &mut bus) & 0x80, 0);
    }

    #[test]
    fn status_low_bits_echo_last_write() {
        let (mut p, mut bus) = setup();
        p.write_register(0x2003, 0xFF, &mut bus);
        assert_eq!(p.read_register(0x2002, &mut bus), 0x1F);
        p.write_oam_dma(0x02, &[0; 256]);
        assert_eq!(p.read_register(0x2002, &mut bus), 0x02);
    }

    #[test]
    fn ppudata_past_3fff_reads_buffered_alias() {
        let (mut p, mut bus) = setup();
        p.palette[0x1F] = 0x2A;
        bus.pattern[0] = 0x11;
        p.write_register(0x2006, 0x3F, &mut bus);
        p.write_register(0x2006, 0xFF, &mut bus);
        assert_eq!(p.read_register(0x2007, &mut bus), 0x2A);
        assert_eq!(p.v, 0x4000);
        // $4000 folds onto $0000 and goes through the read buffer.
        let _ = p.read_register(0x2007, &mut bus);
        assert_eq!(p.read_register(0x2007, &mut bus), 0x11);
    }

    #[test]
    fn ppudata_buffered_read_and_increment() {
        let (mut p, mut bus) = setup();
        bus.pattern[0] = 0x11;
        bus.pattern[1] = 0x22;
        p.write_register(0x2006, 0x00, &mut bus);
        p.write_register(0x2006, 0x00, &mut bus);
        assert_eq!(p.read_register(0x2007, &mut bus), 0x00);
        assert_eq!(p.read_register(0x2007, &mut bus), 0x11);
        assert_eq!(p.read_register(0x2007, &mut bus), 0x22);
        assert_eq!(p.vram_addr(), 0x0003);
    }

    #[test]
    fn palette_read_is_immediate_and_refills_buffer_from_nametable() {
        let (mut p, mut bus) = setup();
        // Nametable byte under the palette ($3F01 - $1000 = $2F01)
        p.write_register(0x2006, 0x2F, &mut bus);
        p.write_register(0x2006, 0x01, &mut bus);
        p.write_register(0x2007, 0x77, &mut bus);
        p.write_register(0x2006, 0x3F, &mut bus);
        p.write_register(0x2006, 0x01, &mut bus);
        p.write_register(0x2007, 0x2A, &mut bus);
        p.write_register(0x2006, 0x3F, &mut bus);
        p.write_register(0x2006, 0x01, &mut bus);
        assert_eq!(p.read_register(0x2007, &mut bus), 0x2A);
        assert_eq!(p.read_buffer, 0x77);
    }

    #[test]
    fn ppuctrl_increment_32_on_ppudata_write() {
        let (mut p, mut bus) = setup();
        p.write_register(0x2000, CTRL_INCREMENT_32, &mut bus);
        p.write_register(0x2006, 0x20, &mut bus);
        p.write_register(0x2006, 0x00, &mut bus);
        assert_eq!(p.vram_addr(), 0x2000);
        p.write_register(0x2007, 0xAA, &mut bus);
        assert_eq!(p.vram_addr(), 0x2020);
        p.write_register(0x2007, 0xBB, &mut bus);
        assert_eq!(p.vram_addr(), 0x2040);
    }

    #[test]
    fn ctrl_sets_nametable_bits_of_t() {
        let (mut p, mut bus) = setup();
        p.write_register(0x2000, CTRL_NMI_ENABLE | 0x03, &mut bus);
        assert_eq!(p.temp_addr() & 0x0C00, 0x0C00);
        assert!(p.nmi_enabled());
    }

    #[test]
    fn scroll_writes_fill_t_and_fine_x() {
        let (mut p, mut bus) = setup();
        // X = 0x7D (coarse 15, fine 5), Y = 0x5E (coarse 11, fine 6)
        p.write_register(0x2005, 0x7D, &mut bus);
        p.write_register(0x2005, 0x5E, &mut bus);
        assert_eq!(p.fine_x(), 5);
        assert_eq!(p.temp_addr() & 0x001F, 15);
        assert_eq!((p.temp_addr() >> 5) & 0x1F, 11);
        assert_eq!((p.temp_addr() >> 12) & 0x07, 6);
    }

    #[test]
    fn address_high_write_clears_bit_14() {
        let (mut p, mut bus) = setup();
        p.write_register(0x2006, 0xFF, &mut bus);
        p.write_register(0x2006, 0x34, &mut bus);
        assert_eq!(p.vram_addr(), 0x3F34);
    }

    #[test]
    fn oam_data_and_dma_wrap_from_oam_address() {
        let (mut p, mut bus) = setup();
        p.write_register(0x2003, 0xFE, &mut bus);
        p.write_register(0x2004, 0x11, &mut bus);
        p.write_register(0x2004, 0x22, &mut bus);
        assert_eq!(p.oam()[0xFE], 0x11);
        assert_eq!(p.oam()[0xFF], 0x22);

        let page: Vec<u8> = (0..=255u8).collect();
        p.write_register(0x2003, 0x10, &mut bus);
        p.write_oam_dma(0x03, &page);
        assert_eq!(p.oam()[0x10], 0x00);
        assert_eq!(p.oam()[0x0F], 0xFF);
        p.write_register(0x2003, 0x10, &mut bus);
        assert_eq!(p.read_register(0x2004, &mut bus), 0x00);
    }
}
