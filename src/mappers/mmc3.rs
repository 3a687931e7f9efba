//! MMC3 (Mapper 4) implementation.
//!
//! Features:
//! - Eight bank registers written through the $8000/$8001 select/data pair
//! - PRG: four 8 KiB windows; R6/R7 switchable, last 16 KiB fixed, two layouts
//! - CHR: eight 1 KiB windows built from R0..R5, two layouts
//! - Mirroring control at $A000 (ignored on four-screen boards)
//! - Scanline IRQ counter clocked by the PPU rendering edge
//! - 8 KiB PRG RAM at $6000-$7FFF; CHR RAM when the cartridge has no CHR ROM
//!
//! Register map (even / odd address within each 8 KiB range):
//! - $8000-$9FFF: bank select / bank data
//! - $A000-$BFFF: mirroring / PRG RAM protect (no-op)
//! - $C000-$DFFF: IRQ latch / IRQ reload (counter := 0)
//! - $E000-$FFFF: IRQ disable / IRQ enable
use std::sync::Arc;

use crate::cartridge::{Cartridge, Mirroring, PRG_BANK_SIZE};
use crate::error::SnapshotError;
use crate::mapper::{CHR_RAM_SIZE, Mapper, PRG_RAM_SIZE};
use crate::mappers::rom_byte;
use crate::snapshot::{StateReader, StateWriter};

const BANK_1K: usize = 0x0400;
const BANK_8K: usize = 0x2000;

#[derive(Debug, Clone)]
pub struct Mmc3 {
    prg_rom: Arc<[u8]>,
    chr_rom: Arc<[u8]>,
    prg_ram: Vec<u8>,
    chr_ram: Vec<u8>, // empty when CHR ROM is present
    prg_banks: usize,
    four_screen: bool,

    // Bank registers R0..R7 and select state
    regs: [u8; 8],
    reg_index: u8,
    prg_mode: u8,
    chr_mode: u8,
    mirroring: Option<Mirroring>,

    // IRQ counter
    irq_enabled: bool,
    counter: u8,
    counter_reload: u8,

    // Cached mapping
    prg_offsets: [usize; 4],
    chr_offsets: [usize; 8],
}

impl Mmc3 {
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
            four_screen: cart.mirroring() == Mirroring::FourScreen,
            regs: [0, 2, 4, 5, 6, 7, 0, 1],
            reg_index: 0,
            prg_mode: 0,
            chr_mode: 0,
            mirroring: None,
            irq_enabled: false,
            counter: 0,
            counter_reload: 0,
            prg_offsets: [0; 4],
            chr_offsets: [0; 8],
        };
        s.update_offsets();
        s
    }

    fn write_register(&mut self, addr: u16, value: u8) {
        let even = addr & 1 == 0;
        match (addr, even) {
            (0x8000..=0x9FFF, true) => {
                self.reg_index = value & 0x07;
                self.prg_mode = (value >> 6) & 1;
                self.chr_mode = (value >> 7) & 1;
                self.update_offsets();
            }
            (0x8000..=0x9FFF, false) => {
                self.regs[self.reg_index as usize] = value;
                self.update_offsets();
            }
            (0xA000..=0xBFFF, true) => {
                if !self.four_screen {
                    self.mirroring = Some(if value & 1 != 0 {
                        Mirroring::Horizontal
                    } else {
                        Mirroring::Vertical
                    });
                }
            }
            (0xA000..=0xBFFF, false) => {}
            (0xC000..=0xDFFF, true) => self.counter_reload = value,
            (0xC000..=0xDFFF, false) => self.counter = 0,
            (_, true) => self.irq_enabled = false,
            (_, false) => self.irq_enabled = true,
        }
    }

    fn update_offsets(&mut self) {
        let r = |i: usize| self.regs[i] as usize * BANK_1K;
        let r0 = (self.regs[0] & 0xFE) as usize * BANK_1K;
        let r1 = (self.regs[1] & 0xFE) as usize * BANK_1K;
        let pairs = [r0, r0 + BANK_1K, r1, r1 + BANK_1K];
        let singles = [r(2), r(3), r(4), r(5)];
        self.chr_offsets = if self.chr_mode == 0 {
            [
                pairs[0], pairs[1], pairs[2], pairs[3], singles[0], singles[1], singles[2],
                singles[3],
            ]
        } else {
            [
                singles[0], singles[1], singles[2], singles[3], pairs[0], pairs[1], pairs[2],
                pairs[3],
            ]
        };

        let last = self.prg_banks.saturating_sub(1) * PRG_BANK_SIZE;
        let r6 = self.regs[6] as usize * BANK_8K;
        let r7 = self.regs[7] as usize * BANK_8K;
        self.prg_offsets = if self.prg_mode == 0 {
            [r6, r7, last, last + BANK_8K]
        } else {
            [last, r7, r6, last + BANK_8K]
        };
    }

    #[inline]
    fn chr_offset(&self, addr: u16) -> usize {
        let a = addr as usize;
        self.chr_offsets[(a >> 10) & 7] + (a & 0x03FF)
    }

    #[inline]
    fn chr_is_ram(&self) -> bool {
        !self.chr_ram.is_empty()
    }

    /// Current scanline counter value.
    pub fn irq_counter(&self) -> u8 {
        self.counter
    }
}

impl Mapper for Mmc3 {
    fn cpu_read(&self, addr: u16) -> u8 {
        match addr {
            0x6000..=0x7FFF => self.prg_ram[(addr as usize) & (PRG_RAM_SIZE - 1)],
            0x8000..=0xFFFF => {
                let window = ((addr >> 13) & 3) as usize;
                rom_byte(
                    &self.prg_rom,
                    self.prg_offsets[window] + (addr as usize & 0x1FFF),
                )
            }
            _ => 0,
        }
    }

    fn cpu_write(&mut self, addr: u16, value: u8) {
        match addr {
            0x6000..=0x7FFF => self.prg_ram[(addr as usize) & (PRG_RAM_SIZE - 1)] = value,
            0x8000..=0xFFFF => self.write_register(addr, value),
            _ => {}
        }
    }

    fn ppu_read(&self, addr: u16) -> u8 {
        let offset = self.chr_offset(addr);
        if self.chr_is_ram() {
            self.chr_ram[offset & (CHR_RAM_SIZE - 1)]
        } else {
            rom_byte(&self.chr_rom, offset)
        }
    }

    fn ppu_write(&mut self, addr: u16, value: u8) {
        if self.chr_is_ram() {
            let offset = self.chr_offset(addr) & (CHR_RAM_SIZE - 1);
            self.chr_ram[offset] = value;
        }
    }

    fn scanline_edge(&mut self) -> bool {
        if self.counter == 0 {
            self.counter = self.counter_reload;
            false
        } else {
            self.counter -= 1;
            self.counter == 0 && self.irq_enabled
        }
    }

    fn current_mirroring(&self) -> Option<Mirroring> {
        self.mirroring
    }

    fn save_state(&self, w: &mut StateWriter) {
        w.bytes(&self.regs);
        w.u8(self.reg_index);
        w.u8(self.prg_mode);
        w.u8(self.chr_mode);
        w.u8(self.mirroring.map_or(0xFF, Mirroring::to_code));
        w.bool(self.irq_enabled);
        w.u8(self.counter);
        w.u8(self.counter_reload);
        w.bytes(&self.prg_ram);
        w.bytes(&self.chr_ram);
    }

    fn load_state(&mut self, r: &mut StateReader<'_>) -> Result<(), SnapshotError> {
        r.read_into(&mut self.regs)?;
        self.reg_index = r.u8()? & 0x07;
        self.prg_mode = r.u8()? & 1;
        self.chr_mode = r.u8()? & 1;
        self.mirroring = match r.u8()? {
            0xFF => None,
            code => Some(Mirroring::from_code(code)?),
        };
        self.irq_enabled = r.bool()?;
        self.counter = r.u8()?;
        self.counter_reload = r.u8()?;
        r.read_into(&mut self.prg_ram)?;
        r.read_into(&mut self.chr_ram)?;
        self.update_offsets();
        Ok(())
    }
}
