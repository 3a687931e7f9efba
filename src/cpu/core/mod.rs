/*!
core::Cpu - 6502 CPU façade wrapping `CpuState`.

Design
======
- `Cpu` owns the architectural registers (`CpuState`) plus the timing state
  the dispatcher needs: the cumulative cycle counter, the OAM DMA stall
  counter and a single-slot interrupt latch.
- Register / flag accessors are exposed for inspection and tests.
- `step` delegates to `dispatch::step`, which is generic over `CpuRegs` for
  instruction semantics.

Interrupt latch
===============
`trigger_nmi` always latches an NMI. `trigger_irq` latches an IRQ only when
the I flag is clear at the moment of the request. Either call overwrites an
earlier request that has not been serviced yet.
*/

use crate::bus::Bus;
use crate::cpu::state::{CpuState, IRQ_DISABLE, Interrupt, RESET_VECTOR};
use crate::error::{ExecutionFault, SnapshotError};
use crate::snapshot::{StateReader, StateWriter};

#[derive(Debug, Clone)]
pub struct Cpu {
    pub(crate) state: CpuState,
    pub(crate) cycles: u64,
    pub(crate) stall: u16,
    pub(crate) pending: Option<Interrupt>,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    /// Serialized size: registers + cycle counter + stall + latch code.
    pub const STATE_SIZE: usize = CpuState::STATE_SIZE + 8 + 2 + 1;

    /// Construct a new CPU with power‑up defaults.
    pub fn new() -> Self {
        Self {
            state: CpuState::new(),
            cycles: 0,
            stall: 0,
            pending: None,
        }
    }

    /// Power-on initialization: load PC from the reset vector, SP = 0xFD,
    /// P = 0x24, clear counters and the interrupt latch.
    pub fn reset(&mut self, bus: &mut Bus) {
        self.state = CpuState::new();
        self.state.pc = bus.read_word(RESET_VECTOR);
        self.cycles = 0;
        self.stall = 0;
        self.pending = None;
        tracing::debug!(pc = format_args!("{:#06X}", self.state.pc), "cpu reset");
    }

    /// Execute one step (stall cycle, or optional interrupt entry plus one
    /// instruction). Returns the cycles consumed.
    pub fn step(&mut self, bus: &mut Bus) -> Result<u32, ExecutionFault> {
        crate::cpu::dispatch::step(self, bus)
    }

    /// Latch an NMI.
    pub fn trigger_nmi(&mut self) {
        self.pending = Some(Interrupt::Nmi);
    }

    /// Latch an IRQ unless interrupts are disabled right now.
    pub fn trigger_irq(&mut self) {
        if !self.state.is_flag_set(IRQ_DISABLE) {
            self.pending = Some(Interrupt::Irq);
        }
    }

    pub fn pending_interrupt(&self) -> Option<Interrupt> {
        self.pending
    }

    /// Cumulative instruction cycles since reset (stall cycles excluded).
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Remaining OAM DMA stall cycles.
    pub fn stall(&self) -> u16 {
        self.stall
    }

    /// Return immutable reference to internal state (for inspection / testing).
    pub fn state(&self) -> &CpuState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut CpuState {
        &mut self.state
    }

    // ---------------------------------------------------------------------
    // Register accessors
    // ---------------------------------------------------------------------
    pub fn a(&self) -> u8 {
        self.state.a
    }
    pub fn x(&self) -> u8 {
        self.state.x
    }
    pub fn y(&self) -> u8 {
        self.state.y
    }
    pub fn sp(&self) -> u8 {
        self.state.sp
    }
    pub fn pc(&self) -> u16 {
        self.state.pc
    }
    pub fn status(&self) -> u8 {
        self.state.status
    }

    pub fn set_a(&mut self, v: u8) {
        self.state.a = v;
    }
    pub fn set_x(&mut self, v: u8) {
        self.state.x = v;
    }
    pub fn set_y(&mut self, v: u8) {
        self.state.y = v;
    }
    pub fn set_sp(&mut self, v: u8) {
        self.state.sp = v;
    }
    pub fn set_pc(&mut self, v: u16) {
        self.state.pc = v;
    }

    pub fn get_flag(&self, mask: u8) -> bool {
        self.state.is_flag_set(mask)
    }

    pub fn set_flag(&mut self, mask: u8, on: bool) {
        self.state.assign_flag(mask, on);
    }

    // ---------------------------------------------------------------------
    // Snapshot
    // ---------------------------------------------------------------------

    pub(crate) fn save_state(&self, w: &mut StateWriter) {
        self.state.save_state(w);
        w.u64(self.cycles);
        w.u16(self.stall);
        w.u8(match self.pending {
            None => 0,
            Some(Interrupt::Nmi) => 1,
            Some(Interrupt::Irq) => 2,
        });
    }

    pub(crate) fn load_state(&mut self, r: &mut StateReader<'_>) -> Result<(), SnapshotError> {
        self.state.load_state(r)?;
        self.cycles = r.u64()?;
        self.stall = r.u16()?;
        self.pending = match r.u8()? {
            0 => None,
            1 => Some(Interrupt::Nmi),
            2 => Some(Interrupt::Irq),
            _ => return Err(SnapshotError::Corrupt("interrupt latch")),
        };
        Ok(())
    }
}
