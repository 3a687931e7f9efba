//! MMC1 (Mapper 1) implementation.
//!
//! Implements:
//! - Serial shift register writes (5-bit) to control / CHR0 / CHR1 / PRG registers
//! - PRG banking modes (32K switch, or 16K with fixed low or high)
//! - CHR banking (8K or 4K+4K) over CHR ROM; CHR RAM boards map the 8 KiB directly
//! - Mirroring control (single lower/upper, vertical, horizontal)
//! - 8 KiB PRG RAM at $6000-$7FFF
//!
//! Simplified:
//! - PRG RAM disable bit is ignored (RAM always enabled)
//! - Consecutive-cycle write filtering is not modelled
use std::sync::Arc;

use crate::cartridge::{Cartridge, Mirroring, PRG_BANK_SIZE};
use crate::error::SnapshotError;
use crate::mapper::{CHR_RAM_SIZE, Mapper, PRG_RAM_SIZE};
use crate::mappers::rom_byte;
use crate::snapshot::{StateReader, StateWriter};

/// MMC1 mapper core state.
#[derive(Debug, Clone)]
pub struct Mmc1 {
    prg_rom: Arc<[u8]>,
    chr_rom: Arc<[u8]>,
    prg_ram: Vec<u8>,
    chr_ram: Vec<u8>, // empty when CHR ROM is present
    prg_banks: usize,

    // Serial latch
    shift_reg: u8,
    shift_count: u8,

    // Registers
    control: u8,
    prg_mode: u8,
    chr_mode: u8,
    chr_bank0: u8,
    chr_bank1: u8,
    prg_bank: u8,
    mirroring: Option<Mirroring>,

    // Cached mapping
    prg_offsets: [usize; 2],
    chr_offsets: [usize; 2],
}

impl Mmc1 {
    pub fn new(cart: &Cartridge) -> Self {
        let mut s = Self {
            prg_rom: Arc::clone(cart.prg_rom()),
            chr_rom: Arc::clone(cart.chr_rom()),
            prg_ram: vec![0; PRG_RAM_SIZE],
            chr_ram: if cart.uses_chr_ram() {
                vec![0; CHR_RAM_SIZE]
            } else {
                Vec::new()
            },
            prg_banks: cart.prg_banks(),
            shift_reg: 0,
            shift_count: 0,
            control: 0,
            prg_mode: 3,
            chr_mode: 0,
            chr_bank0: 0,
            chr_bank1: 0,
            prg_bank: 0,
            mirroring: None,
            prg_offsets: [0; 2],
            chr_offsets: [0; 2],
        };
        s.update_offsets();
        s
    }

    fn write_control(&mut self, value: u8) {
        self.control = value;
        self.mirroring = Some(match value & 0x03 {
            0 => Mirroring::SingleLower,
            1 => Mirroring::SingleUpper,
            2 => Mirroring::Vertical,
            _ => Mirroring::Horizontal,
        });
        self.prg_mode = (value >> 2) & 0x03;
        self.chr_mode = (value >> 4) & 0x01;
    }

    fn commit_register(&mut self, addr: u16, value5: u8) {
        match (addr >> 13) & 0x03 {
            0 => self.write_control(value5),
            1 => self.chr_bank0 = value5,
            2 => self.chr_bank1 = value5,
            _ => self.prg_bank = value5 & 0x0F,
        }
    }

    fn update_offsets(&mut self) {
        const CHR_4K: usize = 0x1000;
        self.chr_offsets = if self.chr_mode == 0 {
            let base = (self.chr_bank0 & 0xFE) as usize * CHR_4K;
            [base, base + CHR_4K]
        } else {
            [
                self.chr_bank0 as usize * CHR_4K,
                self.chr_bank1 as usize * CHR_4K,
            ]
        };

        let bank = self.prg_bank as usize;
        self.prg_offsets = match self.prg_mode {
            0 | 1 => {
                let base = (bank & 0x0E) * PRG_BANK_SIZE;
                [base, base + PRG_BANK_SIZE]
            }
            2 => [0, bank * PRG_BANK_SIZE],
            _ => [
                bank * PRG_BANK_SIZE,
                self.prg_banks.saturating_sub(1) * PRG_BANK_SIZE,
            ],
        };
    }

    #[inline]
    fn chr_is_ram(&self) -> bool {
        !self.chr_ram.is_empty()
    }
}

impl Mapper for Mmc1 {
    fn cpu_read(&self, addr: u16) -> u8 {
        match addr {
            0x6000..=0x7FFF => self.prg_ram[(addr as usize) & (PRG_RAM_SIZE - 1)],
            0x8000..=0xFFFF => {
                let window = ((addr >> 14) & 1) as usize;
                rom_byte(
                    &self.prg_rom,
                    self.prg_offsets[window] + (addr as usize & 0x3FFF),
                )
            }
            _ => 0,
        }
    }

    fn cpu_write(&mut self, addr: u16, value: u8) {
        match addr {
            0x6000..=0x7FFF => {
                self.prg_ram[(addr as usize) & (PRG_RAM_SIZE - 1)] = value;
            }
            0x8000..=0xFFFF => {
                if value & 0x80 != 0 {
                    // Reset: clear the latch and force PRG mode 3
                    self.shift_reg = 0;
                    self.shift_count = 0;
                    self.write_control(self.control | 0x0C);
                } else {
                    self.shift_reg = (self.shift_reg >> 1) | ((value & 1) << 4);
                    self.shift_count += 1;
                    if self.shift_count == 5 {
                        let value5 = self.shift_reg & 0x1F;
                        self.shift_reg = 0;
                        self.shift_count = 0;
                        self.commit_register(addr, value5);
                    }
                }
                self.update_offsets();
            }
            _ => {}
        }
    }

    fn ppu_read(&self, addr: u16) -> u8 {
        let a = (addr as usize) & 0x1FFF;
        if self.chr_is_ram() {
            self.chr_ram[a]
        } else {
            let window = (a >> 12) & 1;
            rom_byte(&self.chr_rom, self.chr_offsets[window] + (a & 0x0FFF))
        }
    }

    fn ppu_write(&mut self, addr: u16, value: u8) {
        if self.chr_is_ram() {
            self.chr_ram[(addr as usize) & 0x1FFF] = value;
        }
    }

    fn current_mirroring(&self) -> Option<Mirroring> {
        self.mirroring
    }

    fn save_state(&self, w: &mut StateWriter) {
        w.u8(self.shift_reg);
        w.u8(self.shift_count);
        w.u8(self.control);
        w.u8(self.prg_mode);
        w.u8(self.chr_mode);
        w.u8(self.chr_bank0);
        w.u8(self.chr_bank1);
        w.u8(self.prg_bank);
        w.u8(self.mirroring.map_or(0xFF, Mirroring::to_code));
        w.bytes(&self.prg_ram);
        w.bytes(&self.chr_ram);
    }

    fn load_state(&mut self, r: &mut StateReader<'_>) -> Result<(), SnapshotError> {
        self.shift_reg = r.u8()?;
        self.shift_count = r.u8()?;
        if self.shift_count >= 5 {
            return Err(SnapshotError::Corrupt("MMC1 shift count"));
        }
        self.control = r.u8()?;
        self.prg_mode = r.u8()? & 0x03;
        self.chr_mode = r.u8()? & 0x01;
        self.chr_bank0 = r.u8()?;
        self.chr_bank1 = r.u8()?;
        self.prg_bank = r.u8()? & 0x0F;
        self.mirroring = match r.u8()? {
            0xFF => None,
            code => Some(Mirroring::from_code(code)?),
        };
        r.read_into(&mut self.prg_ram)?;
        r.read_into(&mut self.chr_ram)?;
        self.update_offsets();
        Ok(())
    }
}
