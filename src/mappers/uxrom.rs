//! UxROM (Mapper 2) implementation.
//!
//! - $8000-$BFFF: switchable 16 KiB bank selected by any write to $8000-$FFFF
//! - $C000-$FFFF: fixed to the last 16 KiB bank
//! - CHR: always 8 KiB RAM
use std::sync::Arc;

use crate::cartridge::{Cartridge, PRG_BANK_SIZE};
use crate::error::SnapshotError;
use crate::mapper::{CHR_RAM_SIZE, Mapper};
use crate::mappers::rom_byte;
use crate::snapshot::{StateReader, StateWriter};

#[derive(Debug, Clone)]
pub struct Uxrom {
    prg_rom: Arc<[u8]>,
    chr_ram: Vec<u8>,
    prg_banks: usize,
    prg_offsets: [usize; 2],
}

impl Uxrom {
    pub fn new(cart: &Cartridge) -> Self {
        let prg_banks = cart.prg_banks().max(1);
        Self {
            prg_rom: Arc::clone(cart.prg_rom()),
            chr_ram: vec![0; CHR_RAM_SIZE],
            prg_banks,
            prg_offsets: [0, (prg_banks - 1) * PRG_BANK_SIZE],
        }
    }
}

impl Mapper for Uxrom {
    fn cpu_read(&self, addr: u16) -> u8 {
        if addr < 0x8000 {
            return 0;
        }
        let window = ((addr >> 14) & 1) as usize;
        rom_byte(
            &self.prg_rom,
            self.prg_offsets[window] + (addr as usize & 0x3FFF),
        )
    }

    fn cpu_write(&mut self, addr: u16, value: u8) {
        if addr >= 0x8000 {
            self.prg_offsets[0] = (value as usize % self.prg_banks) * PRG_BANK_SIZE;
        }
    }

    fn ppu_read(&self, addr: u16) -> u8 {
        self.chr_ram[(addr as usize) & (CHR_RAM_SIZE - 1)]
    }

    fn ppu_write(&mut self, addr: u16, value: u8) {
        self.chr_ram[(addr as usize) & (CHR_RAM_SIZE - 1)] = value;
    }

    fn save_state(&self, w: &mut StateWriter) {
        w.u8((self.prg_offsets[0] / PRG_BANK_SIZE) as u8);
        w.bytes(&self.chr_ram);
    }

    fn load_state(&mut self, r: &mut StateReader<'_>) -> Result<(), SnapshotError> {
        let bank = r.u8()? as usize;
        if bank >= self.prg_banks {
            return Err(SnapshotError::Corrupt("UxROM bank"));
        }
        self.prg_offsets[0] = bank * PRG_BANK_SIZE;
        r.read_into(&mut self.chr_ram)?;
        Ok(())
    }
}
