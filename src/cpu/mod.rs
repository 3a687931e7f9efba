/*!
cpu - 6502 CPU core (NES 2A03 without the audio unit).

Layout:

    state.rs        - Architectural registers, flag masks, interrupt kinds.
    regs.rs         - `CpuRegs` trait the instruction helpers are generic over.
    addressing.rs   - Addressing modes & effective address resolution.
    table.rs        - 256-entry opcode descriptor table.
    execute.rs      - Instruction semantic helpers (ALU, stack, RMW).
    dispatch/       - Orchestrates a single step (DMA stall / interrupts / execute).
    core/           - `Cpu` façade: state + cycle counter + stall + interrupt latch.

Usage:
```ignore
use famicore::cpu::Cpu;

let mut cpu = Cpu::new();
cpu.reset(&mut bus);
let cycles = cpu.step(&mut bus)?;
```
*/

pub mod addressing;
pub mod core;
pub mod dispatch;
pub mod execute;
pub mod regs;
pub mod state;
pub mod table;

// Re-exports:
// - Cpu (facade over CpuState)
// - CpuState (raw state; exposed for tests, snapshots, trait impls)
// - Flag constants (canonical bit masks)
pub use crate::cpu::core::Cpu;
pub use crate::cpu::regs::CpuRegs;
pub use crate::cpu::state::{
    BREAK, CARRY, CpuState, DECIMAL, IRQ_DISABLE, Interrupt, NEGATIVE, OVERFLOW, UNUSED, ZERO,
};
