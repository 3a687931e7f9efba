/*!
PPU address space ($0000-$3FFF, mirrored above).

Map
- $0000-$1FFF: pattern tables, answered by the cartridge (`PpuBus::chr_read`).
- $2000-$3EFF: nametables, folded into local storage by the mirroring mode.
- $3F00-$3FFF: 32-byte palette RAM; $3F10/$3F14/$3F18/$3F1C alias
  $3F00/$3F04/$3F08/$3F0C.

Nametable storage is 4 KiB so four-screen boards get four distinct tables;
every other mode only touches the first 2 KiB.
*/

use super::Ppu;
use crate::cartridge::Mirroring;
use crate::ppu_bus::PpuBus;

/// Palette RAM index for a palette address (low 5 bits significant).
#[inline]
pub(crate) fn palette_index(addr: u16) -> usize {
    let i = (addr & 0x1F) as usize;
    if i >= 0x10 && i & 0x03 == 0 { i - 0x10 } else { i }
}

/// Offset into nametable storage for a $2000-$3EFF address under `mirroring`.
pub fn nametable_index(mirroring: Mirroring, addr: u16) -> usize {
    let a = addr as usize;
    match mirroring {
        Mirroring::Horizontal => ((a >> 1) & 0x400) | (a & 0x3FF),
        Mirroring::Vertical => a & 0x7FF,
        Mirroring::SingleLower => a & 0x3FF,
        Mirroring::SingleUpper => 0x400 | (a & 0x3FF),
        Mirroring::FourScreen => a.wrapping_sub(0x2000) & 0xFFF,
    }
}

impl Ppu {
    pub(crate) fn read<B: PpuBus>(&self, addr: u16, bus: &B) -> u8 {
        let addr = addr & 0x3FFF;
        if addr >= 0x3F00 {
            self.palette[palette_index(addr)]
        } else if addr < 0x2000 {
            bus.chr_read(addr)
        } else {
            self.nametables[nametable_index(bus.mirroring(), addr)]
        }
    }

    pub(crate) fn write<B: PpuBus>(&mut self, addr: u16, value: u8, bus: &mut B) {
        let addr = addr & 0x3FFF;
        if addr >= 0x3F00 {
            self.palette[palette_index(addr)] = value;
        } else if addr < 0x2000 {
            bus.chr_write(addr, value);
        } else {
            self.nametables[nametable_index(bus.mirroring(), addr)] = value;
        }
    }

    /// Side-effect free read of the PPU address space (debugging, tests).
    pub fn peek<B: PpuBus>(&self, addr: u16, bus: &B) -> u8 {
        self.read(addr, bus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ppu_bus::mock::MockPpuBus;

    #[test]
    fn horizontal_pairs_top_and_bottom() {
        let m = Mirroring::Horizontal;
        assert_eq!(nametable_index(m, 0x2000), nametable_index(m, 0x2400));
        assert_eq!(nametable_index(m, 0x2800), nametable_index(m, 0x2C00));
        assert_ne!(nametable_index(m, 0x2000), nametable_index(m, 0x2800));
    }

    #[test]
    fn vertical_pairs_left_and_right() {
        let m = Mirroring::Vertical;
        assert_eq!(nametable_index(m, 0x2000), nametable_index(m, 0x2800));
        assert_eq!(nametable_index(m, 0x2400), nametable_index(m, 0x2C00));
        assert_ne!(nametable_index(m, 0x2000), nametable_index(m, 0x2400));
    }

    #[test]
    fn single_screen_and_four_screen() {
        assert_eq!(nametable_index(Mirroring::SingleLower, 0x2C05), 0x005);
        assert_eq!(nametable_index(Mirroring::SingleUpper, 0x2005), 0x405);
        assert_eq!(nametable_index(Mirroring::FourScreen, 0x2C05), 0xC05);
        // $3000-$3EFF mirrors $2000-$2EFF
        assert_eq!(nametable_index(Mirroring::FourScreen, 0x3005), 0x005);
    }

    #[test]
    fn palette_aliases() {
        assert_eq!(palette_index(0x3F10), 0x00);
        assert_eq!(palette_index(0x3F14), 0x04);
        assert_eq!(palette_index(0x3F1C), 0x0C);
        assert_eq!(palette_index(0x3F11), 0x11);
        assert_eq!(palette_index(0x3F21), 0x01);
    }

    #[test]
    fn read_write_routes_by_region() {
        let mut ppu = Ppu::new();
        let mut bus = MockPpuBus::new(Mirroring::Vertical);
        ppu.write(0x0010, 0xAB, &mut bus);
        assert_eq!(bus.pattern[0x10], 0xAB);
        ppu.write(0x2001, 0x42, &mut bus);
        assert_eq!(ppu.read(0x2801, &bus), 0x42);
        ppu.write(0x3F10, 0x0F, &mut bus);
        assert_eq!(ppu.read(0x3F00, &bus), 0x0F);
        // Address space mirrors every $4000.
        assert_eq!(ppu.read(0x7F00, &bus), 0x0F);
    }
}
