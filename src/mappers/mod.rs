/*
Module: mappers

Declares the banked board implementations and re-exports their public types.
The Fixed board (mapper 0) lives next to the trait in `crate::mapper`.

Implemented:
- MMC1 / ShiftRegister (Mapper 1)
- UxROM / SimpleBank (Mapper 2)
- MMC3 / CounterIrq (Mapper 4)
*/

pub mod mmc1;
pub mod mmc3;
pub mod uxrom;

pub use mmc1::Mmc1;
pub use mmc3::Mmc3;
pub use uxrom::Uxrom;

/// Read a ROM byte at a computed bank offset. Offsets past the end wrap modulo
/// the ROM size; an empty ROM reads as 0.
#[inline]
pub(crate) fn rom_byte(rom: &[u8], offset: usize) -> u8 {
    if rom.is_empty() {
        0
    } else {
        rom[offset % rom.len()]
    }
}
