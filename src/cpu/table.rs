/*!
table.rs - Opcode descriptor table.

Purpose
=======
Maps each of the 256 opcode values to an `Instruction` descriptor:
operation, addressing mode, base cycle count, and whether a page crossing
during address resolution costs one extra cycle.

Only the 151 documented opcodes are populated. Every other entry decodes to
`Operation::Illegal`, which the dispatcher reports as an execution fault.

The table is built once at compile time by a `const fn`.
*/

use crate::cpu::addressing::AddrMode;
use crate::cpu::addressing::AddrMode::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Adc,
    And,
    Asl,
    Bcc,
    Bcs,
    Beq,
    Bit,
    Bmi,
    Bne,
    Bpl,
    Brk,
    Bvc,
    Bvs,
    Clc,
    Cld,
    Cli,
    Clv,
    Cmp,
    Cpx,
    Cpy,
    Dec,
    Dex,
    Dey,
    Eor,
    Inc,
    Inx,
    Iny,
    Jmp,
    Jsr,
    Lda,
    Ldx,
    Ldy,
    Lsr,
    Nop,
    Ora,
    Pha,
    Php,
    Pla,
    Plp,
    Rol,
    Ror,
    Rti,
    Rts,
    Sbc,
    Sec,
    Sed,
    Sei,
    Sta,
    Stx,
    Sty,
    Tax,
    Tay,
    Tsx,
    Txa,
    Txs,
    Tya,
    Illegal,
}

impl Operation {
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Operation::Adc => "ADC",
            Operation::And => "AND",
            Operation::Asl => "ASL",
            Operation::Bcc => "BCC",
            Operation::Bcs => "BCS",
            Operation::Beq => "BEQ",
            Operation::Bit => "BIT",
            Operation::Bmi => "BMI",
            Operation::Bne => "BNE",
            Operation::Bpl => "BPL",
            Operation::Brk => "BRK",
            Operation::Bvc => "BVC",
            Operation::Bvs => "BVS",
            Operation::Clc => "CLC",
            Operation::Cld => "CLD",
            Operation::Cli => "CLI",
            Operation::Clv => "CLV",
            Operation::Cmp => "CMP",
            Operation::Cpx => "CPX",
            Operation::Cpy => "CPY",
            Operation::Dec => "DEC",
            Operation::Dex => "DEX",
            Operation::Dey => "DEY",
            Operation::Eor => "EOR",
            Operation::Inc => "INC",
            Operation::Inx => "INX",
            Operation::Iny => "INY",
            Operation::Jmp => "JMP",
            Operation::Jsr => "JSR",
            Operation::Lda => "LDA",
            Operation::Ldx => "LDX",
            Operation::Ldy => "LDY",
            Operation::Lsr => "LSR",
            Operation::Nop => "NOP",
            Operation::Ora => "ORA",
            Operation::Pha => "PHA",
            Operation::Php => "PHP",
            Operation::Pla => "PLA",
            Operation::Plp => "PLP",
            Operation::Rol => "ROL",
            Operation::Ror => "ROR",
            Operation::Rti => "RTI",
            Operation::Rts => "RTS",
            Operation::Sbc => "SBC",
            Operation::Sec => "SEC",
            Operation::Sed => "SED",
            Operation::Sei => "SEI",
            Operation::Sta => "STA",
            Operation::Stx => "STX",
            Operation::Sty => "STY",
            Operation::Tax => "TAX",
            Operation::Tay => "TAY",
            Operation::Tsx => "TSX",
            Operation::Txa => "TXA",
            Operation::Txs => "TXS",
            Operation::Tya => "TYA",
            Operation::Illegal => "ILL",
        }
    }

    /// True for the eight conditional relative branches.
    pub const fn is_branch(self) -> bool {
        matches!(
            self,
            Operation::Bcc
                | Operation::Bcs
                | Operation::Beq
                | Operation::Bmi
                | Operation::Bne
                | Operation::Bpl
                | Operation::Bvc
                | Operation::Bvs
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub op: Operation,
    pub mode: AddrMode,
    pub cycles: u8,
    pub page_cross: bool,
}

impl Instruction {
    const ILLEGAL: Instruction = Instruction {
        op: Operation::Illegal,
        mode: Implied,
        cycles: 1,
        page_cross: false,
    };

    #[inline]
    pub fn is_illegal(&self) -> bool {
        self.op == Operation::Illegal
    }
}

/// Descriptor lookup.
#[inline]
pub fn decode(opcode: u8) -> &'static Instruction {
    &INSTRUCTIONS[opcode as usize]
}

pub(crate) static INSTRUCTIONS: [Instruction; 256] = build_table();

const fn ins(op: Operation, mode: AddrMode, cycles: u8, page_cross: bool) -> Instruction {
    Instruction {
        op,
        mode,
        cycles,
        page_cross,
    }
}

const fn build_table() -> [Instruction; 256] {
    use Operation::*;
    let mut t = [Instruction::ILLEGAL; 256];
    t[0x00] = ins(Brk, ImpliedBrk, 7, false);
    t[0x01] = ins(Ora, IndirectX, 6, false);
    t[0x05] = ins(Ora, ZeroPage, 3, false);
    t[0x06] = ins(Asl, ZeroPage, 5, false);
    t[0x08] = ins(Php, Implied, 3, false);
    t[0x09] = ins(Ora, Immediate, 2, false);
    t[0x0A] = ins(Asl, Accumulator, 2, false);
    t[0x0D] = ins(Ora, Absolute, 4, false);
    t[0x0E] = ins(Asl, Absolute, 6, false);
    t[0x10] = ins(Bpl, Relative, 2, true);
    t[0x11] = ins(Ora, IndirectY, 5, true);
    t[0x15] = ins(Ora, ZeroPageX, 4, false);
    t[0x16] = ins(Asl, ZeroPageX, 6, false);
    t[0x18] = ins(Clc, Implied, 2, false);
    t[0x19] = ins(Ora, AbsoluteY, 4, true);
    t[0x1D] = ins(Ora, AbsoluteX, 4, true);
    t[0x1E] = ins(Asl, AbsoluteX, 7, false);
    t[0x20] = ins(Jsr, Absolute, 6, false);
    t[0x21] = ins(And, IndirectX, 6, false);
    t[0x24] = ins(Bit, ZeroPage, 3, false);
    t[0x25] = ins(And, ZeroPage, 3, false);
    t[0x26] = ins(Rol, ZeroPage, 5, false);
    t[0x28] = ins(Plp, Implied, 4, false);
    t[0x29] = ins(And, Immediate, 2, false);
    t[0x2A] = ins(Rol, Accumulator, 2, false);
    t[0x2C] = ins(Bit, Absolute, 4, false);
    t[0x2D] = ins(And, Absolute, 4, false);
    t[0x2E] = ins(Rol, Absolute, 6, false);
    t[0x30] = ins(Bmi, Relative, 2, true);
    t[0x31] = ins(And, IndirectY, 5, true);
    t[0x35] = ins(And, ZeroPageX, 4, false);
    t[0x36] = ins(Rol, ZeroPageX, 6, false);
    t[0x38] = ins(Sec, Implied, 2, false);
    t[0x39] = ins(And, AbsoluteY, 4, true);
    t[0x3D] = ins(And, AbsoluteX, 4, true);
    t[0x3E] = ins(Rol, AbsoluteX, 7, false);
    t[0x40] = ins(Rti, Implied, 6, false);
    t[0x41] = ins(Eor, IndirectX, 6, false);
    t[0x45] = ins(Eor, ZeroPage, 3, false);
    t[0x46] = ins(Lsr, ZeroPage, 5, false);
    t[0x48] = ins(Pha, Implied, 3, false);
    t[0x49] = ins(Eor, Immediate, 2, false);
    t[0x4A] = ins(Lsr, Accumulator, 2, false);
    t[0x4C] = ins(Jmp, Absolute, 3, false);
    t[0x4D] = ins(Eor, Absolute, 4, false);
    t[0x4E] = ins(Lsr, Absolute, 6, false);
    t[0x50] = ins(Bvc, Relative, 2, true);
    t[0x51] = ins(Eor, IndirectY, 5, true);
    t[0x55] = ins(Eor, ZeroPageX, 4, false);
    t[0x56] = ins(Lsr, ZeroPageX, 6, false);
    t[0x58] = ins(Cli, Implied, 2, false);
    t[0x59] = ins(Eor, AbsoluteY, 4, true);
    t[0x5D] = ins(Eor, AbsoluteX, 4, true);
    t[0x5E] = ins(Lsr, AbsoluteX, 7, false);
    t[0x60] = ins(Rts, Implied, 6, false);
    t[0x61] = ins(Adc, IndirectX, 6, false);
    t[0x65] = ins(Adc, ZeroPage, 3, false);
    t[0x66] = ins(Ror, ZeroPage, 5, false);
    t[0x68] = ins(Pla, Implied, 4, false);
    t[0x69] = ins(Adc, Immediate, 2, false);
    t[0x6A] = ins(Ror, Accumulator, 2, false);
    t[0x6C] = ins(Jmp, Indirect, 5, false);
    t[0x6D] = ins(Adc, Absolute, 4, false);
    t[0x6E] = ins(Ror, Absolute, 6, false);
    t[0x70] = ins(Bvs, Relative, 2, true);
    t[0x71] = ins(Adc, IndirectY, 5, true);
    t[0x75] = ins(Adc, ZeroPageX, 4, false);
    t[0x76] = ins(Ror, ZeroPageX, 6, false);
    t[0x78] = ins(Sei, Implied, 2, false);
    t[0x79] = ins(Adc, AbsoluteY, 4, true);
    t[0x7D] = ins(Adc, AbsoluteX, 4, true);
    t[0x7E] = ins(Ror, AbsoluteX, 7, false);
    t[0x81] = ins(Sta, IndirectX, 6, false);
    t[0x84] = ins(Sty, ZeroPage, 3, false);
    t[0x85] = ins(Sta, ZeroPage, 3, false);
    t[0x86] = ins(Stx, ZeroPage, 3, false);
    t[0x88] = ins(Dey, Implied, 2, false);
    t[0x8A] = ins(Txa, Implied, 2, false);
    t[0x8C] = ins(Sty, Absolute, 4, false);
    t[0x8D] = ins(Sta, Absolute, 4, false);
    t[0x8E] = ins(Stx, Absolute, 4, false);
    t[0x90] = ins(Bcc, Relative, 2, true);
    t[0x91] = ins(Sta, IndirectY, 6, false);
    t[0x94] = ins(Sty, ZeroPageX, 4, false);
    t[0x95] = ins(Sta, ZeroPageX, 4, false);
    t[0x96] = ins(Stx, ZeroPageY, 4, false);
    t[0x98] = ins(Tya, Implied, 2, false);
    t[0x99] = ins(Sta, AbsoluteY, 5, false);
    t[0x9A] = ins(Txs, Implied, 2, false);
    t[0x9D] = ins(Sta, AbsoluteX, 5, false);
    t[0xA0] = ins(Ldy, Immediate, 2, false);
    t[0xA1] = ins(Lda, IndirectX, 6, false);
    t[0xA2] = ins(Ldx, Immediate, 2, false);
    t[0xA4] = ins(Ldy, ZeroPage, 3, false);
    t[0xA5] = ins(Lda, ZeroPage, 3, false);
    t[0xA6] = ins(Ldx, ZeroPage, 3, false);
    t[0xA8] = ins(Tay, Implied, 2, false);
    t[0xA9] = ins(Lda, Immediate, 2, false);
    t[0xAA] = ins(Tax, Implied, 2, false);
    t[0xAC] = ins(Ldy, Absolute, 4, false);
    t[0xAD] = ins(Lda, Absolute, 4, false);
    t[0xAE] = ins(Ldx, Absolute, 4, false);
    t[0xB0] = ins(Bcs, Relative, 2, true);
    t[0xB1] = ins(Lda, IndirectY, 5, true);
    t[0xB4] = ins(Ldy, ZeroPageX, 4, false);
    t[0xB5] = ins(Lda, ZeroPageX, 4, false);
    t[0xB6] = ins(Ldx, ZeroPageY, 4, false);
    t[0xB8] = ins(Clv, Implied, 2, false);
    t[0xB9] = ins(Lda, AbsoluteY, 4, true);
    t[0xBA] = ins(Tsx, Implied, 2, false);
    t[0xBC] = ins(Ldy, AbsoluteX, 4, true);
    t[0xBD] = ins(Lda, AbsoluteX, 4, true);
    t[0xBE] = ins(Ldx, AbsoluteY, 4, true);
    t[0xC0] = ins(Cpy, Immediate, 2, false);
    t[0xC1] = ins(Cmp, IndirectX, 6, false);
    t[0xC4] = ins(Cpy, ZeroPage, 3, false);
    t[0xC5] = ins(Cmp, ZeroPage, 3, false);
    t[0xC6] = ins(Dec, ZeroPage, 5, false);
    t[0xC8] = ins(Iny, Implied, 2, false);
    t[0xC9] = ins(Cmp, Immediate, 2, false);
    t[0xCA] = ins(Dex, Implied, 2, false);
    t[0xCC] = ins(Cpy, Absolute, 4, false);
    t[0xCD] = ins(Cmp, Absolute, 4, false);
    t[0xCE] = ins(Dec, Absolute, 6, false);
    t[0xD0] = ins(Bne, Relative, 2, true);
    t[0xD1] = ins(Cmp, IndirectY, 5, true);
    t[0xD5] = ins(Cmp, ZeroPageX, 4, false);
    t[0xD6] = ins(Dec, ZeroPageX, 6, false);
    t[0xD8] = ins(Cld, Implied, 2, false);
    t[0xD9] = ins(Cmp, AbsoluteY, 4, true);
    t[0xDD] = ins(Cmp, AbsoluteX, 4, true);
    t[0xDE] = ins(Dec, AbsoluteX, 7, false);
    t[0xE0] = ins(Cpx, Immediate, 2, false);
    t[0xE1] = ins(Sbc, IndirectX, 6, false);
    t[0xE4] = ins(Cpx, ZeroPage, 3, false);
    t[0xE5] = ins(Sbc, ZeroPage, 3, false);
    t[0xE6] = ins(Inc, ZeroPage, 5, false);
    t[0xE8] = ins(Inx, Implied, 2, false);
    t[0xE9] = ins(Sbc, Immediate, 2, false);
    t[0xEA] = ins(Nop, Implied, 2, false);
    t[0xEC] = ins(Cpx, Absolute, 4, false);
    t[0xED] = ins(Sbc, Absolute, 4, false);
    t[0xEE] = ins(Inc, Absolute, 6, false);
    t[0xF0] = ins(Beq, Relative, 2, true);
    t[0xF1] = ins(Sbc, IndirectY, 5, true);
    t[0xF5] = ins(Sbc, ZeroPageX, 4, false);
    t[0xF6] = ins(Inc, ZeroPageX, 6, false);
    t[0xF8] = ins(Sed, Implied, 2, false);
    t[0xF9] = ins(Sbc, AbsoluteY, 4, true);
    t[0xFD] = ins(Sbc, AbsoluteX, 4, true);
    t[0xFE] = ins(Inc, AbsoluteX, 7, false);
    t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documented_opcode_count() {
        let legal = INSTRUCTIONS.iter().filter(|i| !i.is_illegal()).count();
        assert_eq!(legal, 151);
    }

    #[test]
    fn spot_check_descriptors() {
        let lda = decode(0xBD);
        assert_eq!(lda.op, Operation::Lda);
        assert_eq!(lda.mode, AddrMode::AbsoluteX);
        assert_eq!(lda.cycles, 4);
        assert!(lda.page_cross);

        let sta = decode(0x9D);
        assert_eq!(sta.op, Operation::Sta);
        assert!(!sta.page_cross);
        assert_eq!(sta.cycles, 5);

        assert_eq!(decode(0x6C).mode, AddrMode::Indirect);
        assert_eq!(decode(0x00).mode, AddrMode::ImpliedBrk);
    }

    #[test]
    fn undocumented_opcodes_are_illegal() {
        for op in [0x02u8, 0x1A, 0x80, 0x9E, 0xEB, 0xFF] {
            assert!(decode(op).is_illegal(), "opcode {op:#04X}");
        }
    }

    #[test]
    fn mnemonics() {
        assert_eq!(decode(0xEA).op.mnemonic(), "NOP");
        assert_eq!(decode(0x20).op.mnemonic(), "JSR");
        assert_eq!(decode(0x03).op.mnemonic(), "ILL");
    }
}
