/*!
dispatch - Orchestrator for a single 6502 CPU step (DMA stall / interrupts / execute)

Overview
========
Coordinates one call to `Cpu::step`:
1. OAM DMA stall: if stall cycles remain, consume one and return 1. No
   fetch, no interrupt service.
2. Pending interrupt (NMI or IRQ, single latch): push PC and P (bit 5 set,
   B clear), set I, load PC from the vector. Costs 7 cycles and the step
   continues with the handler's first instruction.
3. Fetch the opcode at PC and look up its descriptor. An illegal opcode
   is an `ExecutionFault`.
4. Resolve the effective address, advance PC by the instruction size, then
   execute the operation.
5. Cost = interrupt (0 or 7) + base + page-cross penalty (descriptor
   permitting) + operation extra (branches). The cycle counter accumulates
   the cost.
6. If the instruction wrote OAMDMA, arm the stall: 514 cycles when the
   cycle counter was odd before this step, else 513.

Stall cycles are not added to the cycle counter.
*/

pub(crate) mod branches;

use crate::bus::Bus;
use crate::cpu::addressing::{AddrMode, resolve};
use crate::cpu::core::Cpu;
use crate::cpu::execute::{
    Shift, adc, and, bit, compare, dec_value, dex, dey, eor, inc_value, inx, iny, lda, ldx, ldy,
    ora, pha, php, pla, plp, pop_word, push_status, push_word, rmw_memory, sbc, shift_acc,
    shift_value, tax, tay, tsx, txa, txs, tya,
};
use crate::cpu::regs::CpuRegs;
use crate::cpu::state::{CARRY, DECIMAL, IRQ_DISABLE, Interrupt, OVERFLOW};
use crate::cpu::table::{Instruction, Operation, decode};
use crate::error::ExecutionFault;

/// Interrupt entry cost.
pub(crate) const INTERRUPT_CYCLES: u32 = 7;

/// OAM DMA stall lengths (even / odd cycle parity at the time of the write).
pub(crate) const DMA_STALL_EVEN: u16 = 513;
pub(crate) const DMA_STALL_ODD: u16 = 514;

/// Execute one CPU step and return the cycles consumed.
pub(crate) fn step(cpu: &mut Cpu, bus: &mut Bus) -> Result<u32, ExecutionFault> {
    if cpu.stall > 0 {
        cpu.stall -= 1;
        return Ok(1);
    }

    let start_cycles = cpu.cycles;
    let mut cycles = 0u32;

    if let Some(kind) = cpu.pending.take() {
        service_interrupt(&mut cpu.state, bus, kind);
        cycles += INTERRUPT_CYCLES;
    }

    let pc = cpu.state.pc();
    let opcode = bus.read(pc);
    let ins = decode(opcode);
    if ins.is_illegal() {
        tracing::warn!(
            opcode = format_args!("{opcode:#04X}"),
            pc = format_args!("{pc:#06X}"),
            "illegal opcode"
        );
        return Err(ExecutionFault::IllegalOpcode { opcode, pc });
    }

    let (addr, page_crossed) = resolve(&cpu.state, bus, ins.mode);
    cpu.state.advance_pc(ins.mode.size());

    cycles += ins.cycles as u32;
    cycles += execute(&mut cpu.state, bus, ins, addr);
    if page_crossed && ins.page_cross {
        cycles += 1;
    }

    if bus.take_dma_request() {
        cpu.stall = if start_cycles & 1 == 1 {
            DMA_STALL_ODD
        } else {
            DMA_STALL_EVEN
        };
    }

    cpu.cycles += cycles as u64;
    Ok(cycles)
}

/// Interrupt entry sequence (push PC, P with B clear; set I; load vector).
fn service_interrupt<C: CpuRegs>(cpu: &mut C, bus: &mut Bus, kind: Interrupt) {
    let pc = cpu.pc();
    push_word(cpu, bus, pc);
    push_status(cpu, bus, false);
    cpu.assign_flag(IRQ_DISABLE, true);
    let target = bus.read_word(kind.vector());
    cpu.set_pc(target);
}

/// Run the semantics of `ins` with PC already past the instruction.
/// Returns extra cycles beyond the descriptor's base count (branches only).
fn execute<C: CpuRegs>(cpu: &mut C, bus: &mut Bus, ins: &Instruction, addr: u16) -> u32 {
    use Operation::*;

    match ins.op {
        // Loads / stores
        Lda => lda(cpu, bus.read(addr)),
        Ldx => ldx(cpu, bus.read(addr)),
        Ldy => ldy(cpu, bus.read(addr)),
        Sta => bus.write(addr, cpu.a()),
        Stx => bus.write(addr, cpu.x()),
        Sty => bus.write(addr, cpu.y()),

        // Transfers
        Tax => tax(cpu),
        Tay => tay(cpu),
        Txa => txa(cpu),
        Tya => tya(cpu),
        Tsx => tsx(cpu),
        Txs => txs(cpu),

        // Stack
        Pha => pha(cpu, bus),
        Php => php(cpu, bus),
        Pla => pla(cpu, bus),
        Plp => plp(cpu, bus),

        // Logical / arithmetic
        And => and(cpu, bus.read(addr)),
        Ora => ora(cpu, bus.read(addr)),
        Eor => eor(cpu, bus.read(addr)),
        Bit => bit(cpu, bus.read(addr)),
        Adc => adc(cpu, bus.read(addr)),
        Sbc => sbc(cpu, bus.read(addr)),
        Cmp => {
            let v = bus.read(addr);
            let a = cpu.a();
            compare(cpu, a, v);
        }
        Cpx => {
            let v = bus.read(addr);
            let x = cpu.x();
            compare(cpu, x, v);
        }
        Cpy => {
            let v = bus.read(addr);
            let y = cpu.y();
            compare(cpu, y, v);
        }

        // Increments / decrements
        Inc => rmw_memory(cpu, bus, addr, inc_value),
        Dec => rmw_memory(cpu, bus, addr, dec_value),
        Inx => inx(cpu),
        Iny => iny(cpu),
        Dex => dex(cpu),
        Dey => dey(cpu),

        // Shifts / rotates
        Asl => shift(cpu, bus, ins.mode, addr, Shift::Asl),
        Lsr => shift(cpu, bus, ins.mode, addr, Shift::Lsr),
        Rol => shift(cpu, bus, ins.mode, addr, Shift::Rol),
        Ror => shift(cpu, bus, ins.mode, addr, Shift::Ror),

        // Control flow
        Jmp => cpu.set_pc(addr),
        Jsr => {
            let ret = cpu.pc().wrapping_sub(1);
            push_word(cpu, bus, ret);
            cpu.set_pc(addr);
        }
        Rts => {
            let ret = pop_word(cpu, bus).wrapping_add(1);
            cpu.set_pc(ret);
        }
        Rti => {
            plp(cpu, bus);
            let ret = pop_word(cpu, bus);
            cpu.set_pc(ret);
        }
        Brk => {
            let pc = cpu.pc();
            push_word(cpu, bus, pc);
            push_status(cpu, bus, true);
            let target = bus.read_word(Interrupt::Irq.vector());
            cpu.set_pc(target);
            cpu.assign_flag(IRQ_DISABLE, true);
        }
        Bpl | Bmi | Bvc | Bvs | Bcc | Bcs | Bne | Beq => {
            return branches::handle(ins.op, cpu, addr);
        }

        // Flags
        Clc => cpu.assign_flag(CARRY, false),
        Sec => cpu.assign_flag(CARRY, true),
        Cli => cpu.assign_flag(IRQ_DISABLE, false),
        Sei => cpu.assign_flag(IRQ_DISABLE, true),
        Cld => cpu.assign_flag(DECIMAL, false),
        Sed => cpu.assign_flag(DECIMAL, true),
        Clv => cpu.assign_flag(OVERFLOW, false),

        Nop | Illegal => {}
    }
    0
}

fn shift<C: CpuRegs>(cpu: &mut C, bus: &mut Bus, mode: AddrMode, addr: u16, kind: Shift) {
    if mode == AddrMode::Accumulator {
        shift_acc(cpu, kind);
    } else {
        rmw_memory(cpu, bus, addr, |c, v| shift_value(c, kind, v));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::state::{BREAK, NEGATIVE, UNUSED, ZERO};
    use crate::test_utils::{setup_cpu, setup_cpu_with_vectors};

    #[test]
    fn nop_costs_two_cycles() {
        let (mut cpu, mut bus) = setup_cpu(&[0xEA, 0xEA]);
        assert_eq!(cpu.step(&mut bus).unwrap(), 2);
        assert_eq!(cpu.pc(), 0x8001);
        assert_eq!(cpu.cycles(), 2);
    }

    #[test]
    fn illegal_opcode_faults() {
        let (mut cpu, mut bus) = setup_cpu(&[0x02]);
        let err = cpu.step(&mut bus).unwrap_err();
        assert_eq!(
            err,
            ExecutionFault::IllegalOpcode {
                opcode: 0x02,
                pc: 0x8000
            }
        );
    }

    #[test]
    fn lda_absolute_x_page_cross_penalty() {
        // LDX #$10 ; LDA $80F5,X
        let (mut cpu, mut bus) = setup_cpu(&[0xA2, 0x10, 0xBD, 0xF5, 0x80]);
        assert_eq!(cpu.step(&mut bus).unwrap(), 2);
        assert_eq!(cpu.step(&mut bus).unwrap(), 5);
    }

    #[test]
    fn sta_absolute_x_has_no_penalty() {
        // LDX #$10 ; STA $02F5,X
        let (mut cpu, mut bus) = setup_cpu(&[0xA2, 0x10, 0x9D, 0xF5, 0x02]);
        cpu.step(&mut bus).unwrap();
        assert_eq!(cpu.step(&mut bus).unwrap(), 5);
    }

    #[test]
    fn jsr_rts_round_trip() {
        // $8000 JSR $8004 ; $8003 NOP ; $8004 RTS
        let (mut cpu, mut bus) = setup_cpu(&[0x20, 0x04, 0x80, 0xEA, 0x60]);
        assert_eq!(cpu.step(&mut bus).unwrap(), 6);
        assert_eq!(cpu.pc(), 0x8004);
        assert_eq!(cpu.sp(), 0xFB);
        // Return address pushed is the last byte of the JSR.
        assert_eq!(bus.read(0x01FD), 0x80);
        assert_eq!(bus.read(0x01FC), 0x02);
        assert_eq!(cpu.step(&mut bus).unwrap(), 6);
        assert_eq!(cpu.pc(), 0x8003);
        assert_eq!(cpu.sp(), 0xFD);
    }

    #[test]
    fn brk_pushes_pc_plus_two_and_status_with_break() {
        let (mut cpu, mut bus) = setup_cpu_with_vectors(&[0x00, 0xFF], 0x9000, 0x8000, 0xA000);
        assert_eq!(cpu.step(&mut bus).unwrap(), 7);
        assert_eq!(cpu.pc(), 0xA000);
        assert_eq!(bus.read(0x01FD), 0x80);
        assert_eq!(bus.read(0x01FC), 0x02);
        let pushed = bus.read(0x01FB);
        assert_eq!(pushed & (BREAK | UNUSED), BREAK | UNUSED);
        assert!(cpu.get_flag(IRQ_DISABLE));
    }

    #[test]
    fn php_plp_discards_break_and_unused() {
        // SEC ; PHP ; CLC ; PLP
        let (mut cpu, mut bus) = setup_cpu(&[0x38, 0x08, 0x18, 0x28]);
        for _ in 0..4 {
            cpu.step(&mut bus).unwrap();
        }
        assert!(cpu.get_flag(CARRY));
        assert_eq!(cpu.status() & (BREAK | UNUSED), 0);
    }

    #[test]
    fn nmi_is_serviced_before_next_instruction() {
        // Reset at $8000 (NOP), NMI handler at $9000 (NOP).
        let mut prg = vec![0xEA; 0x1001];
        prg[0x1000] = 0xEA;
        let (mut cpu, mut bus) = setup_cpu_with_vectors(&prg, 0x9000, 0x8000, 0xA000);
        cpu.trigger_nmi();
        // 7 for entry + 2 for the handler's NOP, same step.
        assert_eq!(cpu.step(&mut bus).unwrap(), 9);
        assert_eq!(cpu.pc(), 0x9001);
        // Status pushed with bit 5 set and B clear.
        let pushed = bus.read(0x01FB);
        assert_eq!(pushed & (BREAK | UNUSED), UNUSED);
        assert_eq!(bus.read(0x01FD), 0x80);
        assert_eq!(bus.read(0x01FC), 0x00);
    }

    #[test]
    fn irq_ignored_while_interrupts_disabled() {
        let (mut cpu, mut bus) = setup_cpu(&[0xEA, 0xEA]);
        cpu.trigger_irq();
        assert_eq!(cpu.step(&mut bus).unwrap(), 2);
        assert_eq!(cpu.pc(), 0x8001);
    }

    #[test]
    fn irq_taken_after_cli() {
        // CLI ; NOP  with IRQ vector -> $8002 (NOP)
        let (mut cpu, mut bus) =
            setup_cpu_with_vectors(&[0x58, 0xEA, 0xEA], 0x8000, 0x8000, 0x8002);
        cpu.step(&mut bus).unwrap();
        cpu.trigger_irq();
        assert_eq!(cpu.step(&mut bus).unwrap(), 9);
        assert_eq!(cpu.pc(), 0x8003);
        assert!(cpu.get_flag(IRQ_DISABLE));
    }

    #[test]
    fn rti_restores_status_and_pc() {
        // Manually stage a frame: P=0xC3, PC=$8003
        let (mut cpu, mut bus) = setup_cpu(&[0x40, 0xEA, 0xEA, 0xEA]);
        bus.write(0x01FD, 0x80);
        bus.write(0x01FC, 0x03);
        bus.write(0x01FB, 0xFF);
        cpu.set_sp(0xFA);
        assert_eq!(cpu.step(&mut bus).unwrap(), 6);
        assert_eq!(cpu.pc(), 0x8003);
        assert_eq!(cpu.status(), 0xFF & !(BREAK | UNUSED));
        assert!(cpu.get_flag(NEGATIVE));
    }

    #[test]
    fn memory_rmw_and_accumulator_shift() {
        // LDA #$81 ; ASL A ; STA $10 ; INC $10 ; LSR $10
        let (mut cpu, mut bus) =
            setup_cpu(&[0xA9, 0x81, 0x0A, 0x85, 0x10, 0xE6, 0x10, 0x46, 0x10]);
        cpu.step(&mut bus).unwrap();
        assert_eq!(cpu.step(&mut bus).unwrap(), 2);
        assert_eq!(cpu.a(), 0x02);
        assert!(cpu.get_flag(CARRY));
        cpu.step(&mut bus).unwrap();
        assert_eq!(cpu.step(&mut bus).unwrap(), 5);
        assert_eq!(bus.read(0x0010), 0x03);
        assert_eq!(cpu.step(&mut bus).unwrap(), 5);
        assert_eq!(bus.read(0x0010), 0x01);
        assert!(cpu.get_flag(CARRY));
        assert!(!cpu.get_flag(ZERO));
    }

    #[test]
    fn oam_dma_arms_stall_by_parity() {
        // LDA #$02 ; STA $4014 ; NOP
        let (mut cpu, mut bus) = setup_cpu(&[0xA9, 0x02, 0x8D, 0x14, 0x40, 0xEA]);
        cpu.step(&mut bus).unwrap(); // cycles = 2 (even) before the STA
        assert_eq!(cpu.step(&mut bus).unwrap(), 4);
        assert_eq!(cpu.stall(), DMA_STALL_EVEN);
        for _ in 0..DMA_STALL_EVEN {
            assert_eq!(cpu.step(&mut bus).unwrap(), 1);
        }
        assert_eq!(cpu.step(&mut bus).unwrap(), 2);
        assert_eq!(cpu.cycles(), 8);
    }

    #[test]
    fn oam_dma_odd_parity_adds_a_cycle() {
        // LDA $00 (3 cycles, odd) ; STA $4014
        let (mut cpu, mut bus) = setup_cpu(&[0xA5, 0x00, 0x8D, 0x14, 0x40]);
        cpu.step(&mut bus).unwrap();
        cpu.step(&mut bus).unwrap();
        assert_eq!(cpu.stall(), DMA_STALL_ODD);
    }
}
