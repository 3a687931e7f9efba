/*!
PPU registers handler (CPU-visible 0x2000-0x3FFF)

Purpose
- Fold the 8-byte register window mirrors onto $2000-$2007.
- Split the Bus borrow so the PPU sees the cartridge through a `CartridgeView`
  while the CPU-side register access is in flight (PPUDATA touches CHR and
  nametables).
*/

use crate::bus::Bus;
use crate::bus::interfaces::CartridgeView;

pub struct PpuRegisters;

impl PpuRegisters {
    /// Mirror any address in 0x2000..=0x3FFF into 0x2000..=0x2007.
    #[inline]
    pub fn mirror_ppu_reg(addr: u16) -> u16 {
        0x2000 | (addr & 0x0007)
    }

    pub fn read(bus: &mut Bus, addr: u16) -> u8 {
        let Bus {
            ppu,
            mapper,
            mirroring,
            ..
        } = bus;
        let mut view = CartridgeView::new(mapper, *mirroring);
        ppu.read_register(Self::mirror_ppu_reg(addr), &mut view)
    }

    pub fn write(bus: &mut Bus, addr: u16, value: u8) {
        let Bus {
            ppu,
            mapper,
            mirroring,
            ..
        } = bus;
        let mut view = CartridgeView::new(mapper, *mirroring);
        ppu.write_register(Self::mirror_ppu_reg(addr), value, &mut view);
    }
}
