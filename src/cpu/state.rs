/*!
state.rs - 6502 architectural state (registers + flags) and interrupt kinds.

Overview
========
`CpuState` owns all architecturally visible registers. It intentionally
excludes:
  - Bus / memory logic
  - Instruction decode / dispatch logic
  - Timing / cycle accounting and the interrupt latch (see `core::Cpu`)

Status register
===============
Bit: 7 6 5 4 3 2 1 0
     N V 1 B D I Z C

Bits 4 (B) and 5 (unused) do not exist as storage on the 6502. `status` keeps
them clear; they are synthesized only when P is pushed:
  - BRK / PHP push P | 0x30
  - NMI / IRQ entry push P | 0x20
and are discarded when P is pulled (PLP / RTI).

Power-on / reset
================
PC is loaded from $FFFC/$FFFD by the caller; SP = 0xFD; P = 0x24 (I set; the
unused bit is dropped on assignment).
*/

use crate::error::SnapshotError;
use crate::snapshot::{StateReader, StateWriter};

/// Processor status flag bit masks (canonical definitions).
pub const CARRY: u8 = 0b0000_0001;
pub const ZERO: u8 = 0b0000_0010;
pub const IRQ_DISABLE: u8 = 0b0000_0100;
pub const DECIMAL: u8 = 0b0000_1000; // Not used by NES hardware, still part of 6502.
pub const BREAK: u8 = 0b0001_0000;
pub const UNUSED: u8 = 0b0010_0000;
pub const OVERFLOW: u8 = 0b0100_0000;
pub const NEGATIVE: u8 = 0b1000_0000;

/// Status value loaded at power-on.
pub const POWER_ON_STATUS: u8 = 0x24;
/// Stack pointer value loaded at power-on.
pub const POWER_ON_SP: u8 = 0xFD;

pub const NMI_VECTOR: u16 = 0xFFFA;
pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// Latched interrupt kind. The CPU holds at most one; a later request
/// overwrites an earlier one that has not been serviced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    Nmi,
    Irq,
}

impl Interrupt {
    #[inline]
    pub fn vector(self) -> u16 {
        match self {
            Interrupt::Nmi => NMI_VECTOR,
            Interrupt::Irq => IRQ_VECTOR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuState {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub status: u8,
}

impl Default for CpuState {
    fn default() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            sp: POWER_ON_SP,
            pc: 0x0000,
            status: POWER_ON_STATUS & !(BREAK | UNUSED),
        }
    }
}

impl CpuState {
    pub const STATE_SIZE: usize = 7;

    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return true if a status flag (bit mask) is set.
    #[inline]
    pub fn is_flag_set(&self, mask: u8) -> bool {
        (self.status & mask) != 0
    }

    /// Assign a flag bit based on boolean `value`.
    #[inline]
    pub fn assign_flag(&mut self, mask: u8, value: bool) {
        if value {
            self.status |= mask;
        } else {
            self.status &= !mask;
        }
    }

    pub(crate) fn save_state(&self, w: &mut StateWriter) {
        w.u16(self.pc);
        w.u8(self.sp);
        w.u8(self.a);
        w.u8(self.x);
        w.u8(self.y);
        w.u8(self.status);
    }

    pub(crate) fn load_state(&mut self, r: &mut StateReader<'_>) -> Result<(), SnapshotError> {
        self.pc = r.u16()?;
        self.sp = r.u8()?;
        self.a = r.u8()?;
        self.x = r.u8()?;
        self.y = r.u8()?;
        self.status = r.u8()? & !(BREAK | UNUSED);
        Ok(())
    }
}
