/*!
addressing.rs - 6502 addressing modes and effective address resolution.

Overview
========
Every opcode carries one `AddrMode`. Before the PC is advanced past the
instruction, `resolve` reads the operand bytes starting at PC+1 and produces
the effective address plus a page-cross indication:

    Absolute      word at PC+1
    AbsoluteX/Y   word at PC+1 plus X/Y           (page cross reported)
    Immediate     PC+1 itself
    ZeroPage      byte at PC+1
    ZeroPageX/Y   (byte at PC+1 + X/Y) & 0xFF
    Indirect      word at (word at PC+1), high byte fetched within the same page
    IndirectX     word at ((byte at PC+1 + X) & 0xFF), wrapping in zero page
    IndirectY     (word at byte at PC+1, wrapping in zero page) + Y (page cross reported)
    Relative      PC + 2 + signed byte at PC+1
    Accumulator, Implied, ImpliedBrk   no address (0)

Scope
=====
- Pure address / operand resolution only.
- Does NOT advance PC or apply cycle penalties; the dispatcher does both.
*/

use crate::bus::Bus;
use crate::cpu::regs::CpuRegs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddrMode {
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Accumulator,
    Immediate,
    Implied,
    /// BRK: implied, but the byte after the opcode is skipped.
    ImpliedBrk,
    Indirect,
    IndirectX,
    IndirectY,
    Relative,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
}

impl AddrMode {
    /// Instruction length in bytes (opcode included).
    pub const fn size(self) -> u16 {
        match self {
            AddrMode::Accumulator | AddrMode::Implied => 1,
            AddrMode::Immediate
            | AddrMode::ImpliedBrk
            | AddrMode::IndirectX
            | AddrMode::IndirectY
            | AddrMode::Relative
            | AddrMode::ZeroPage
            | AddrMode::ZeroPageX
            | AddrMode::ZeroPageY => 2,
            AddrMode::Absolute | AddrMode::AbsoluteX | AddrMode::AbsoluteY | AddrMode::Indirect => {
                3
            }
        }
    }
}

#[inline]
fn pages_differ(a: u16, b: u16) -> bool {
    (a & 0xFF00) != (b & 0xFF00)
}

/// Resolve the effective address for `mode` with PC still pointing at the opcode.
/// Returns `(addr, page_crossed)`.
pub(crate) fn resolve<C: CpuRegs>(cpu: &C, bus: &mut Bus, mode: AddrMode) -> (u16, bool) {
    let operand = cpu.pc().wrapping_add(1);
    match mode {
        AddrMode::Absolute => (bus.read_word(operand), false),
        AddrMode::AbsoluteX => indexed(bus.read_word(operand), cpu.x()),
        AddrMode::AbsoluteY => indexed(bus.read_word(operand), cpu.y()),
        AddrMode::Immediate => (operand, false),
        AddrMode::ZeroPage => (bus.read(operand) as u16, false),
        AddrMode::ZeroPageX => (bus.read(operand).wrapping_add(cpu.x()) as u16, false),
        AddrMode::ZeroPageY => (bus.read(operand).wrapping_add(cpu.y()) as u16, false),
        AddrMode::Indirect => {
            let ptr = bus.read_word(operand);
            (bus.read_word_page_wrapped(ptr), false)
        }
        AddrMode::IndirectX => {
            let zp = bus.read(operand).wrapping_add(cpu.x());
            (bus.read_word_page_wrapped(zp as u16), false)
        }
        AddrMode::IndirectY => {
            let zp = bus.read(operand);
            indexed(bus.read_word_page_wrapped(zp as u16), cpu.y())
        }
        AddrMode::Relative => {
            let offset = bus.read(operand) as i8;
            let next = cpu.pc().wrapping_add(2);
            (next.wrapping_add(offset as i16 as u16), false)
        }
        AddrMode::Accumulator | AddrMode::Implied | AddrMode::ImpliedBrk => (0, false),
    }
}

#[inline]
fn indexed(base: u16, index: u8) -> (u16, bool) {
    let addr = base.wrapping_add(index as u16);
    (addr, pages_differ(base, addr))
}
