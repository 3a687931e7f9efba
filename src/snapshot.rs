/*!
Save-state encoding.

Layout
======
A snapshot is a flat little-endian byte string of fixed length
(`crate::console::STATE_SIZE`):

    magic "FCS\x1A" | version u8 | mapper id u8
    cpu block   (Cpu::STATE_SIZE)
    bus block   (Bus::STATE_SIZE: RAM, mirroring, controllers)
    ppu block   (Ppu::STATE_SIZE)
    mapper block (MAPPER_STATE_SIZE, zero padded)

Cartridge ROM bytes are never written; restore re-supplies them from the
original image so a snapshot is only meaningful with the same cartridge.

Each component serializes itself through `StateWriter` and restores through
`StateReader`; the reader validates lengths and enum codes and reports
`SnapshotError` instead of panicking on malformed input.
*/

use crate::error::SnapshotError;

/// Snapshot file magic.
pub const SNAPSHOT_MAGIC: &[u8; 4] = b"FCS\x1A";

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u8 = 1;

/// Magic + version + mapper id.
pub const HEADER_SIZE: usize = 6;

/// Fixed space reserved for the active mapper's registers and RAM
/// (8 KiB PRG RAM + 8 KiB CHR RAM + register area).
pub const MAPPER_STATE_SIZE: usize = 0x2000 + 0x2000 + 64;

/// Append-only little-endian encoder.
#[derive(Debug, Default)]
pub struct StateWriter {
    data: Vec<u8>,
}

impl StateWriter {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn u8(&mut self, v: u8) {
        self.data.push(v);
    }

    #[inline]
    pub fn bool(&mut self, v: bool) {
        self.data.push(v as u8);
    }

    #[inline]
    pub fn u16(&mut self, v: u16) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    #[inline]
    pub fn u64(&mut self, v: u64) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    #[inline]
    pub fn bytes(&mut self, v: &[u8]) {
        self.data.extend_from_slice(v);
    }

    /// Zero-fill up to `len` total bytes. No-op if already at or past it.
    pub fn pad_to(&mut self, len: usize) {
        if self.data.len() < len {
            self.data.resize(len, 0);
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

/// Cursor over a snapshot slice.
#[derive(Debug)]
pub struct StateReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> StateReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Borrow the next `len` bytes and advance.
    pub fn take(&mut self, len: usize) -> Result<&'a [u8], SnapshotError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or(SnapshotError::UnexpectedEnd)?;
        let out = &self.data[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    pub fn u8(&mut self) -> Result<u8, SnapshotError> {
        Ok(self.take(1)?[0])
    }

    pub fn bool(&mut self) -> Result<bool, SnapshotError> {
        match self.u8()? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(SnapshotError::Corrupt("boolean flag")),
        }
    }

    pub fn u16(&mut self) -> Result<u16, SnapshotError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn u64(&mut self) -> Result<u64, SnapshotError> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8)?);
        Ok(u64::from_le_bytes(buf))
    }

    /// Fill `out` from the stream.
    pub fn read_into(&mut self, out: &mut [u8]) -> Result<(), SnapshotError> {
        out.copy_from_slice(self.take(out.len())?);
        Ok(())
    }

    /// Split off a sub-reader over the next `len` bytes.
    pub fn sub(&mut self, len: usize) -> Result<StateReader<'a>, SnapshotError> {
        Ok(StateReader::new(self.take(len)?))
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}
