/*!
Cartridge image: iNES (v1) loader and cartridge metadata.

Features:
- Parse the 16-byte iNES header from bytes or a file path
- Skip the optional 512-byte trainer
- Slice PRG ROM and CHR ROM into shared, read-only buffers
- Decode nametable mirroring, battery flag and mapper id

Notes:
- The loader does not reject iNES 2.0 headers; the extra fields are ignored and
  the image is treated as v1.
- PRG/CHR are held as `Arc<[u8]>` so the active mapper can share them with the
  cartridge without copying; neither side ever writes ROM.
- Whether the mapper id is supported is decided by `mapper::Board::from_cartridge`.
*/

use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::error::{LoadError, SnapshotError};

/// iNES header length in bytes.
pub const HEADER_LEN: usize = 16;
/// Optional trainer length in bytes.
pub const TRAINER_LEN: usize = 512;
/// PRG ROM bank size (iNES header unit).
pub const PRG_BANK_SIZE: usize = 16 * 1024;
/// CHR ROM bank size (iNES header unit).
pub const CHR_BANK_SIZE: usize = 8 * 1024;

/// Nametable mirroring arrangement.
///
/// The header provides the initial mode; mappers with mirroring control
/// (ShiftRegister, CounterIrq) replace it at runtime.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mirroring {
    Horizontal,
    Vertical,
    SingleLower,
    SingleUpper,
    FourScreen,
}

impl Mirroring {
    pub(crate) fn to_code(self) -> u8 {
        match self {
            Mirroring::Horizontal => 0,
            Mirroring::Vertical => 1,
            Mirroring::SingleLower => 2,
            Mirroring::SingleUpper => 3,
            Mirroring::FourScreen => 4,
        }
    }

    pub(crate) fn from_code(code: u8) -> Result<Self, SnapshotError> {
        Ok(match code {
            0 => Mirroring::Horizontal,
            1 => Mirroring::Vertical,
            2 => Mirroring::SingleLower,
            3 => Mirroring::SingleUpper,
            4 => Mirroring::FourScreen,
            _ => return Err(SnapshotError::Corrupt("mirroring mode")),
        })
    }
}

#[derive(Clone, Debug)]
pub struct Cartridge {
    prg_rom: Arc<[u8]>,
    chr_rom: Arc<[u8]>,

    // Metadata
    prg_banks: usize,
    chr_banks: usize,
    mapper_id: u8,
    mirroring: Mirroring,
    battery: bool,
    has_trainer: bool,
}

impl Cartridge {
    // -------------- Construction --------------

    /// Parse a cartridge from raw iNES bytes.
    pub fn from_ines_bytes(data: &[u8]) -> Result<Self, LoadError> {
        if data.len() < HEADER_LEN {
            return Err(LoadError::HeaderTooShort(data.len()));
        }

        // 0-3: 'N', 'E', 'S', 0x1A
        if &data[0..4] != b"NES\x1A" {
            return Err(LoadError::BadMagic);
        }

        let prg_banks = data[4] as usize;
        let chr_banks = data[5] as usize;
        let flags6 = data[6];
        let flags7 = data[7];

        // Mapper ID: high nibble from flags7 and low nibble from flags6
        let mapper_id = (flags6 >> 4) | (flags7 & 0xF0);

        let four_screen = (flags6 & 0b0000_1000) != 0;
        let vertical_mirroring = (flags6 & 0b0000_0001) != 0;
        let mirroring = if four_screen {
            Mirroring::FourScreen
        } else if vertical_mirroring {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };
        let battery = (flags6 & 0b0000_0010) != 0;
        let has_trainer = (flags6 & 0b0000_0100) != 0;

        let prg_offset = HEADER_LEN + if has_trainer { TRAINER_LEN } else { 0 };
        let prg_len = prg_banks * PRG_BANK_SIZE;
        let chr_offset = prg_offset + prg_len;
        let chr_len = chr_banks * CHR_BANK_SIZE;
        let end = chr_offset + chr_len;
        if end > data.len() {
            return Err(LoadError::Truncated {
                expected: end,
                actual: data.len(),
            });
        }

        let cart = Self {
            prg_rom: Arc::from(&data[prg_offset..chr_offset]),
            chr_rom: Arc::from(&data[chr_offset..end]),
            prg_banks,
            chr_banks,
            mapper_id,
            mirroring,
            battery,
            has_trainer,
        };
        tracing::debug!(
            mapper = cart.mapper_id,
            prg_banks = cart.prg_banks,
            chr_banks = cart.chr_banks,
            mirroring = ?cart.mirroring,
            trainer = cart.has_trainer,
            "parsed iNES image"
        );
        Ok(cart)
    }

    /// Load a cartridge from an iNES file (.nes).
    pub fn from_ines_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let bytes = fs::read(path)?;
        Self::from_ines_bytes(&bytes)
    }

    // -------------- Accessors --------------

    pub fn prg_rom(&self) -> &Arc<[u8]> {
        &self.prg_rom
    }

    pub fn chr_rom(&self) -> &Arc<[u8]> {
        &self.chr_rom
    }

    /// Number of 16 KiB PRG ROM banks declared by the header.
    pub fn prg_banks(&self) -> usize {
        self.prg_banks
    }

    /// Number of 8 KiB CHR ROM banks declared by the header (0 = CHR RAM).
    pub fn chr_banks(&self) -> usize {
        self.chr_banks
    }

    pub fn mapper_id(&self) -> u8 {
        self.mapper_id
    }

    pub fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    pub fn battery_backed(&self) -> bool {
        self.battery
    }

    pub fn has_trainer(&self) -> bool {
        self.has_trainer
    }

    pub fn uses_chr_ram(&self) -> bool {
        self.chr_banks == 0
    }
}
