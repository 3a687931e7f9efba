/*!
Mapper subsystem: trait definition, the closed `Board` variant set, and the
Fixed (NROM, mapper 0) implementation.

Purpose:
- Decouple CPU/PPU address mapping from the `Cartridge` so bank switching lives
  in one strategy per board.
- Provide a stable interface the Bus calls for CPU transactions at $4020..=$FFFF
  and the PPU calls (through `CartridgeView`) for pattern table accesses.

Integration:
- `Board::from_cartridge` selects the variant by iNES mapper id (0, 1, 2, 4).
- After every CPU write into cartridge space the Bus consults
  `current_mirroring` and adopts the returned mode.
- The PPU reports the once-per-scanline rendering edge through
  `scanline_edge`; a `true` return requests a CPU IRQ.
*/

use std::sync::Arc;

use crate::cartridge::{Cartridge, Mirroring};
use crate::error::{LoadError, SnapshotError};
use crate::mappers::{Mmc1, Mmc3, Uxrom, rom_byte};
use crate::snapshot::{StateReader, StateWriter};

/// Size of cartridge work RAM at $6000..=$7FFF.
pub const PRG_RAM_SIZE: usize = 8 * 1024;
/// Size of CHR RAM on boards without CHR ROM.
pub const CHR_RAM_SIZE: usize = 8 * 1024;

/// Common interface all cartridge mappers implement.
///
/// Semantics:
/// - All read/write methods take full CPU or PPU addresses (unmasked).
/// - Bank offsets are recomputed synchronously inside `cpu_write`; reads never
///   observe a stale table.
/// - Accesses outside the ranges a board decodes return 0 / are ignored.
pub trait Mapper {
    /// CPU-visible read at $4020..=$FFFF.
    fn cpu_read(&self, addr: u16) -> u8;

    /// CPU-visible write at $4020..=$FFFF (registers, PRG RAM).
    fn cpu_write(&mut self, addr: u16, value: u8);

    /// PPU-visible read at $0000..=$1FFF (pattern table region).
    fn ppu_read(&self, addr: u16) -> u8;

    /// PPU-visible write at $0000..=$1FFF. Only CHR RAM accepts writes.
    fn ppu_write(&mut self, addr: u16, value: u8);

    /// Rendering scanline edge. Returns `true` when the board requests an IRQ.
    fn scanline_edge(&mut self) -> bool {
        false
    }

    /// Mirroring most recently selected by a register write, if the board has
    /// mirroring control.
    fn current_mirroring(&self) -> Option<Mirroring> {
        None
    }

    /// Serialize registers and on-board RAM.
    fn save_state(&self, w: &mut StateWriter);

    /// Restore state written by `save_state` for the same cartridge.
    fn load_state(&mut self, r: &mut StateReader<'_>) -> Result<(), SnapshotError>;
}

/// Closed set of supported boards; exactly one is active per console.
#[derive(Debug, Clone)]
pub enum Board {
    Fixed(Nrom),
    ShiftRegister(Mmc1),
    SimpleBank(Uxrom),
    CounterIrq(Mmc3),
}

impl Board {
    /// Instantiate the board named by the cartridge header.
    pub fn from_cartridge(cart: &Cartridge) -> Result<Self, LoadError> {
        Ok(match cart.mapper_id() {
            0 => Board::Fixed(Nrom::new(cart)),
            1 => Board::ShiftRegister(Mmc1::new(cart)),
            2 => Board::SimpleBank(Uxrom::new(cart)),
            4 => Board::CounterIrq(Mmc3::new(cart)),
            other => return Err(LoadError::UnsupportedMapper(other)),
        })
    }

    /// iNES mapper number of the active variant.
    pub fn mapper_id(&self) -> u8 {
        match self {
            Board::Fixed(_) => 0,
            Board::ShiftRegister(_) => 1,
            Board::SimpleBank(_) => 2,
            Board::CounterIrq(_) => 4,
        }
    }

    #[inline]
    fn inner(&self) -> &dyn Mapper {
        match self {
            Board::Fixed(m) => m,
            Board::ShiftRegister(m) => m,
            Board::SimpleBank(m) => m,
            Board::CounterIrq(m) => m,
        }
    }

    #[inline]
    fn inner_mut(&mut self) -> &mut dyn Mapper {
        match self {
            Board::Fixed(m) => m,
            Board::ShiftRegister(m) => m,
            Board::SimpleBank(m) => m,
            Board::CounterIrq(m) => m,
        }
    }
}

impl Mapper for Board {
    #[inline]
    fn cpu_read(&self, addr: u16) -> u8 {
        self.inner().cpu_read(addr)
    }

    #[inline]
    fn cpu_write(&mut self, addr: u16, value: u8) {
        self.inner_mut().cpu_write(addr, value)
    }

    #[inline]
    fn ppu_read(&self, addr: u16) -> u8 {
        self.inner().ppu_read(addr)
    }

    #[inline]
    fn ppu_write(&mut self, addr: u16, value: u8) {
        self.inner_mut().ppu_write(addr, value)
    }

    #[inline]
    fn scanline_edge(&mut self) -> bool {
        self.inner_mut().scanline_edge()
    }

    #[inline]
    fn current_mirroring(&self) -> Option<Mirroring> {
        self.inner().current_mirroring()
    }

    fn save_state(&self, w: &mut StateWriter) {
        self.inner().save_state(w)
    }

    fn load_state(&mut self, r: &mut StateReader<'_>) -> Result<(), SnapshotError> {
        self.inner_mut().load_state(r)
    }
}

/// Fixed board (NROM, mapper 0).
///
/// - PRG ROM: 16 KiB mirrored into both windows, or 32 KiB direct.
/// - PRG RAM: 8 KiB at $6000..=$7FFF.
/// - CHR: 8 KiB ROM, or 8 KiB RAM when the header declares no CHR banks.
#[derive(Clone, Debug)]
pub struct Nrom {
    prg_rom: Arc<[u8]>,
    chr_rom: Arc<[u8]>,
    prg_ram: Vec<u8>,
    chr_ram: Vec<u8>, // empty when CHR ROM is present
    prg_offsets: [usize; 2],
}

impl Nrom {
    pub fn new(cart: &Cartridge) -> Self {
        let second = if cart.prg_banks() > 1 { 0x4000 } else { 0 };
        Self {
            prg_rom: Arc::clone(cart.prg_rom()),
            chr_rom: Arc::clone(cart.chr_rom()),
            prg_ram: vec![0; PRG_RAM_SIZE],
            chr_ram: if cart.uses_chr_ram() {
                vec![0; CHR_RAM_SIZE]
            } else {
                Vec::new()
            },
            prg_offsets: [0, second],
        }
    }

    #[inline]
    fn chr_is_ram(&self) -> bool {
        !self.chr_ram.is_empty()
    }
}

impl Mapper for Nrom {
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
        if let 0x6000..=0x7FFF = addr {
            self.prg_ram[(addr as usize) & (PRG_RAM_SIZE - 1)] = value;
        }
    }

    fn ppu_read(&self, addr: u16) -> u8 {
        let a = (addr as usize) & 0x1FFF;
        if self.chr_is_ram() {
            self.chr_ram[a]
        } else {
            rom_byte(&self.chr_rom, a)
        }
    }

    fn ppu_write(&mut self, addr: u16, value: u8) {
        if self.chr_is_ram() {
            self.chr_ram[(addr as usize) & 0x1FFF] = value;
        }
    }

    fn save_state(&self, w: &mut StateWriter) {
        w.bytes(&self.prg_ram);
        w.bytes(&self.chr_ram);
    }

    fn load_state(&mut self, r: &mut StateReader<'_>) -> Result<(), SnapshotError> {
        r.read_into(&mut self.prg_ram)?;
        r.read_into(&mut self.chr_ram)?;
        Ok(())
    }
}
