//! Shared test utilities for building minimal iNES (v1) ROM images and
//! ready-to-step CPU/bus pairs.
//!
//! Notes on iNES header fields used here:
//! - bytes[0..4] = b"NES\x1A"
//! - byte 4 = PRG ROM size in 16 KiB units
//! - byte 5 = CHR ROM size in 8 KiB units (0 => CHR RAM)
//! - byte 6 = Flags 6 (mirroring, battery, trainer, four-screen, mapper low nibble)
//! - byte 7 = Flags 7 (NES 2.0 indicator, mapper high nibble)
//! - byte 8 = PRG RAM size in 8 KiB units
//! - bytes 9..15 = padding
//!
//! Vectors:
//! - For 16 KiB PRG (NROM-128): vectors are at PRG offset 0x3FFA..=0x3FFF
//! - For 32 KiB PRG (NROM-256): vectors are at PRG offset 0x7FFA..=0x7FFF

#![allow(dead_code)]

use crate::bus::Bus;
use crate::cartridge::Cartridge;
use crate::cpu::Cpu;
use crate::mapper::Board;

const HEADER_SIZE: usize = 16;
const PRG_UNIT: usize = 16 * 1024;
const CHR_UNIT: usize = 8 * 1024;

/// Build a minimal iNES (v1) image. PRG is filled with 0xAA, CHR with 0xCC.
pub fn build_ines(
    prg_16k: usize,
    chr_8k: usize,
    flags6: u8,
    flags7: u8,
    prg_ram_8k: u8,
    trainer: Option<&[u8; 512]>,
) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(
        HEADER_SIZE + trainer.map(|_| 512).unwrap_or(0) + prg_16k * PRG_UNIT + chr_8k * CHR_UNIT,
    );

    bytes.extend_from_slice(b"NES\x1A");
    bytes.push(prg_16k as u8);
    bytes.push(chr_8k as u8);
    bytes.push(flags6);
    bytes.push(flags7);
    bytes.push(prg_ram_8k);
    bytes.extend_from_slice(&[0u8; 7]);

    if let Some(t) = trainer {
        bytes.extend_from_slice(t);
    }
    bytes.extend(std::iter::repeat_n(0xAA, prg_16k * PRG_UNIT));
    bytes.extend(std::iter::repeat_n(0xCC, chr_8k * CHR_UNIT));
    bytes
}

/// iNES image for bank-switching tests: every PRG byte holds the index of its
/// 8 KiB bank and every CHR byte the index of its 1 KiB bank, so a single read
/// tells which bank is mapped.
pub fn build_banked_ines(mapper: u8, prg_16k: usize, chr_8k: usize, flags6_extra: u8) -> Vec<u8> {
    let mut rom = build_ines(
        prg_16k,
        chr_8k,
        (mapper << 4) | (flags6_extra & 0x0F),
        mapper & 0xF0,
        0,
        None,
    );
    let prg_end = HEADER_SIZE + prg_16k * PRG_UNIT;
    for (i, b) in rom[HEADER_SIZE..prg_end].iter_mut().enumerate() {
        *b = (i / 0x2000) as u8;
    }
    for (i, b) in rom[prg_end..].iter_mut().enumerate() {
        *b = (i / 0x0400) as u8;
    }
    rom
}

/// NROM image with `prg` placed at the start of a single 16 KiB bank ($8000,
/// mirrored at $C000) and the given `(reset, nmi, irq)` vectors (all $8000 by
/// default).
pub fn build_nrom_with_prg(
    prg: &[u8],
    chr_8k: usize,
    prg_ram_8k: u8,
    vectors: Option<(u16, u16, u16)>,
) -> Vec<u8> {
    assert!(prg.len() <= PRG_UNIT, "Program must fit within a 16 KiB PRG bank");

    let mut rom = build_ines(1, chr_8k, 0, 0, prg_ram_8k, None);
    let prg_start = HEADER_SIZE;
    rom[prg_start..prg_start + prg.len()].copy_from_slice(prg);

    let (reset, nmi, irq) = vectors.unwrap_or((0x8000, 0x8000, 0x8000));
    set_vectors_in_prg(&mut rom[prg_start..prg_start + PRG_UNIT], reset, nmi, irq);
    rom
}

/// Write CPU vectors (NMI, RESET, IRQ/BRK) into a 16 or 32 KiB PRG slice.
pub fn set_vectors_in_prg(prg: &mut [u8], reset: u16, nmi: u16, irq: u16) {
    let base = match prg.len() {
        16384 => 0x3FFA,
        32768 => 0x7FFA,
        other => panic!("Unsupported PRG length for vector placement: {other} bytes"),
    };
    write_le_u16(prg, base, nmi);
    write_le_u16(prg, base + 2, reset);
    write_le_u16(prg, base + 4, irq);
}

#[inline]
fn write_le_u16(buf: &mut [u8], offset: usize, value: u16) {
    buf[offset] = (value & 0x00FF) as u8;
    buf[offset + 1] = (value >> 8) as u8;
}

/// Bus around a parsed image.
pub fn bus_from_rom(rom: &[u8]) -> Bus {
    let cart = Cartridge::from_ines_bytes(rom).expect("parse");
    let board = Board::from_cartridge(&cart).expect("board");
    Bus::new(board, cart.mirroring())
}

/// CPU reset into `prg` at $8000 (NROM, CHR ROM, all vectors $8000).
pub fn setup_cpu(prg: &[u8]) -> (Cpu, Bus) {
    setup_cpu_with_vectors(prg, 0x8000, 0x8000, 0x8000)
}

/// CPU reset through `reset` with custom NMI and IRQ/BRK vectors.
pub fn setup_cpu_with_vectors(prg: &[u8], nmi: u16, reset: u16, irq: u16) -> (Cpu, Bus) {
    let rom = build_nrom_with_prg(prg, 1, 1, Some((reset, nmi, irq)));
    let mut bus = bus_from_rom(&rom);
    let mut cpu = Cpu::new();
    cpu.reset(&mut bus);
    (cpu, bus)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_basic_ines() {
        let rom = build_ines(2, 1, 0x01, 0x00, 1, None);
        assert_eq!(&rom[0..4], b"NES\x1A");
        assert_eq!(rom[4], 2);
        assert_eq!(rom[5], 1);
        assert_eq!(rom[6], 0x01);
        assert_eq!(rom[8], 1);
        assert_eq!(rom.len(), 16 + 2 * 16 * 1024 + 8 * 1024);
    }

    #[test]
    fn writes_vectors_for_16k_prg() {
        let mut prg = vec![0u8; 16 * 1024];
        set_vectors_in_prg(&mut prg, 0x8123, 0x8456, 0x8ABC);
        assert_eq!(&prg[0x3FFA..], &[0x56, 0x84, 0x23, 0x81, 0xBC, 0x8A]);
    }

    #[test]
    fn banked_image_marks_every_bank() {
        let rom = build_banked_ines(4, 2, 1, 0x08);
        assert_eq!(rom[6], 0x48);
        assert_eq!(rom[16], 0);
        assert_eq!(rom[16 + 0x2000], 1);
        assert_eq!(rom[16 + 0x7FFF], 3);
        let chr = 16 + 0x8000;
        assert_eq!(rom[chr + 0x0400], 1);
        assert_eq!(rom[chr + 0x1FFF], 7);
    }

    #[test]
    fn setup_cpu_starts_at_program() {
        let (cpu, mut bus) = setup_cpu(&[0xA9, 0x01]);
        assert_eq!(cpu.pc(), 0x8000);
        assert_eq!(bus.read(0x8000), 0xA9);
        assert_eq!(bus.read(0xC000), 0xA9);
    }
}
