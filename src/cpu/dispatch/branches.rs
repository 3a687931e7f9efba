/*!
branches.rs - Relative branch handler (BPL/BMI/BVC/BVS/BCC/BCS/BNE/BEQ)

Cycle Rules
===========
Base cost: 2 cycles (from the descriptor table).
If branch is taken: +1 cycle.
If branch is taken and the target lies on a different page than the
instruction following the branch: +2 total.

Caller Requirements
===================
The dispatcher resolves the target address and advances PC past the branch
before invoking `handle`; the page comparison uses that advanced PC.
*/

use crate::cpu::regs::CpuRegs;
use crate::cpu::state::{CARRY, NEGATIVE, OVERFLOW, ZERO};
use crate::cpu::table::Operation;

/// Execute a branch `op` toward `target`. Returns the extra cycles (0, 1 or 2).
/// Non-branch operations are a no-op returning 0.
pub(super) fn handle<C: CpuRegs>(op: Operation, cpu: &mut C, target: u16) -> u32 {
    let taken = match op {
        Operation::Bpl => !cpu.is_flag_set(NEGATIVE),
        Operation::Bmi => cpu.is_flag_set(NEGATIVE),
        Operation::Bvc => !cpu.is_flag_set(OVERFLOW),
        Operation::Bvs => cpu.is_flag_set(OVERFLOW),
        Operation::Bcc => !cpu.is_flag_set(CARRY),
        Operation::Bcs => cpu.is_flag_set(CARRY),
        Operation::Bne => !cpu.is_flag_set(ZERO),
        Operation::Beq => cpu.is_flag_set(ZERO),
        _ => return 0,
    };
    if !taken {
        return 0;
    }
    let crossed = (cpu.pc() & 0xFF00) != (target & 0xFF00);
    cpu.set_pc(target);
    if crossed { 2 } else { 1 }
}
