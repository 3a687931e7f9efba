/*!
ppu_bus: Trait abstraction decoupling the PPU from the cartridge/mapper.

The PPU owns nametable RAM, palette RAM and OAM itself; the only things it
needs from outside are:
- Pattern table accesses ($0000-$1FFF), answered by the mapper (CHR ROM/RAM)
- The current nametable mirroring mode (console-global, mapper controlled)
- A hook to report the once-per-scanline rendering edge to the mapper, which
  may answer with an IRQ request

Accepting a trait instead of the concrete Bus view keeps the PPU testable with
a lightweight in-memory mock.
*/

use crate::cartridge::Mirroring;

/// Minimal interface the PPU depends on for cartridge-side accesses.
pub trait PpuBus {
    /// Read a pattern table byte ($0000-$1FFF).
    fn chr_read(&self, addr: u16) -> u8;

    /// Write a pattern table byte; ignored unless the cartridge has CHR RAM.
    fn chr_write(&mut self, addr: u16, value: u8);

    /// Current nametable mirroring mode.
    fn mirroring(&self) -> Mirroring;

    /// Rendering scanline edge notification. Returns `true` to request an IRQ.
    fn scanline_edge(&mut self) -> bool {
        false
    }
}
