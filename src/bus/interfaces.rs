/*!
interfaces: lightweight views handed from the Bus to the PPU.

`CartridgeView` borrows only the mapper board and the current mirroring mode.
The Bus constructs one per PPU dot or per PPU register access by destructuring
itself, so `&mut Ppu` and the view never alias.
*/

use crate::cartridge::Mirroring;
use crate::mapper::{Board, Mapper};
use crate::ppu_bus::PpuBus;

/// Mutable view of the cartridge as seen from the PPU side.
pub struct CartridgeView<'a> {
    mapper: &'a mut Board,
    mirroring: Mirroring,
}

impl<'a> CartridgeView<'a> {
    #[inline]
    pub fn new(mapper: &'a mut Board, mirroring: Mirroring) -> Self {
        Self { mapper, mirroring }
    }
}

impl PpuBus for CartridgeView<'_> {
    #[inline]
    fn chr_read(&self, addr: u16) -> u8 {
        self.mapper.ppu_read(addr)
    }

    #[inline]
    fn chr_write(&mut self, addr: u16, value: u8) {
        self.mapper.ppu_write(addr, value)
    }

    #[inline]
    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    #[inline]
    fn scanline_edge(&mut self) -> bool {
        self.mapper.scanline_edge()
    }
}
