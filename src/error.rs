/*!
Error types surfaced by the emulator core.

- `LoadError`: iNES parsing and cartridge construction failures.
- `ExecutionFault`: fatal CPU conditions; the console must not be stepped again.
- `SnapshotError`: save-state validation and restore failures.

Everything else the hardware can encounter (open bus, unmapped writes,
out-of-range bank numbers) is a defined no-op and never produces an error.
*/

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("image too small for an iNES header ({0} bytes)")]
    HeaderTooShort(usize),
    #[error("invalid iNES magic (expected NES<1A>)")]
    BadMagic,
    #[error("image truncated: header declares {expected} bytes, file has {actual}")]
    Truncated { expected: usize, actual: usize },
    #[error("unsupported mapper {0}")]
    UnsupportedMapper(u8),
    #[error("failed to read ROM file: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExecutionFault {
    #[error("illegal opcode ${opcode:02X} at ${pc:04X}")]
    IllegalOpcode { opcode: u8, pc: u16 },
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot has wrong size: expected {expected} bytes, got {actual}")]
    WrongSize { expected: usize, actual: usize },
    #[error("invalid snapshot magic")]
    BadMagic,
    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u8),
    #[error("snapshot was taken with mapper {snapshot}, cartridge uses mapper {cartridge}")]
    MapperMismatch { snapshot: u8, cartridge: u8 },
    #[error("snapshot field out of range: {0}")]
    Corrupt(&'static str),
    #[error("snapshot ended unexpectedly")]
    UnexpectedEnd,
    #[error(transparent)]
    Load(#[from] LoadError),
}
