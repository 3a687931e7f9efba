/*!
regs.rs - CpuRegs trait: the register + flag manipulation interface the
instruction helpers are generic over.

The trait does NOT include:
  - Stack push/pop
  - Instruction fetch
  - Bus access of any kind

Memory and stack operations stay explicit at call sites via `&mut Bus`; the
trait is purely architectural register / status semantics. Static dispatch
through generics keeps the hot path free of indirection.
*/

use crate::cpu::state::{BREAK, CARRY, CpuState, NEGATIVE, OVERFLOW, UNUSED, ZERO};

pub trait CpuRegs {
    // ---------------------------------------------------------------------
    // Read accessors
    // ---------------------------------------------------------------------
    fn a(&self) -> u8;
    fn x(&self) -> u8;
    fn y(&self) -> u8;
    fn sp(&self) -> u8;
    fn pc(&self) -> u16;
    fn status(&self) -> u8;

    // ---------------------------------------------------------------------
    // Mutators
    // ---------------------------------------------------------------------
    fn set_a(&mut self, v: u8);
    fn set_x(&mut self, v: u8);
    fn set_y(&mut self, v: u8);
    fn set_sp(&mut self, v: u8);
    fn set_pc(&mut self, v: u16);
    fn set_status(&mut self, v: u8);

    /// Advance PC by `delta` (wrapping at 16 bits).
    #[inline]
    fn advance_pc(&mut self, delta: u16) {
        let pc = self.pc().wrapping_add(delta);
        self.set_pc(pc);
    }

    // ---------------------------------------------------------------------
    // Flags
    // ---------------------------------------------------------------------
    fn is_flag_set(&self, mask: u8) -> bool;
    fn assign_flag(&mut self, mask: u8, value: bool);

    #[inline]
    fn update_zn(&mut self, v: u8) {
        self.assign_flag(ZERO, v == 0);
        self.assign_flag(NEGATIVE, (v & 0x80) != 0);
    }

    #[inline]
    fn update_carry(&mut self, carry: bool) {
        self.assign_flag(CARRY, carry);
    }

    #[inline]
    fn update_overflow(&mut self, overflow: bool) {
        self.assign_flag(OVERFLOW, overflow);
    }

    /// P as pushed to the stack: bit 5 always set, bit 4 set for BRK/PHP only.
    #[inline]
    fn compose_status_for_push(&self, set_break: bool) -> u8 {
        let v = self.status() | UNUSED;
        if set_break { v | BREAK } else { v & !BREAK }
    }

    /// Restore P from a pulled byte; bits 4 and 5 have no storage.
    #[inline]
    fn restore_status(&mut self, v: u8) {
        self.set_status(v & !(BREAK | UNUSED));
    }
}

impl CpuRegs for CpuState {
    #[inline]
    fn a(&self) -> u8 {
        self.a
    }
    #[inline]
    fn x(&self) -> u8 {
        self.x
    }
    #[inline]
    fn y(&self) -> u8 {
        self.y
    }
    #[inline]
    fn sp(&self) -> u8 {
        self.sp
    }
    #[inline]
    fn pc(&self) -> u16 {
        self.pc
    }
    #[inline]
    fn status(&self) -> u8 {
        self.status
    }

    #[inline]
    fn set_a(&mut self, v: u8) {
        self.a = v;
    }
    #[inline]
    fn set_x(&mut self, v: u8) {
        self.x = v;
    }
    #[inline]
    fn set_y(&mut self, v: u8) {
        self.y = v;
    }
    #[inline]
    fn set_sp(&mut self, v: u8) {
        self.sp = v;
    }
    #[inline]
    fn set_pc(&mut self, v: u16) {
        self.pc = v;
    }
    #[inline]
    fn set_status(&mut self, v: u8) {
        self.status = v;
    }

    #[inline]
    fn is_flag_set(&self, mask: u8) -> bool {
        CpuState::is_flag_set(self, mask)
    }

    #[inline]
    fn assign_flag(&mut self, mask: u8, value: bool) {
        CpuState::assign_flag(self, mask, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_composition_synthesizes_bits_4_and_5() {
        let mut s = CpuState::new();
        s.set_status(CARRY);
        assert_eq!(s.compose_status_for_push(true), CARRY | BREAK | UNUSED);
        assert_eq!(s.compose_status_for_push(false), CARRY | UNUSED);
    }

    #[test]
    fn restore_discards_bits_4_and_5() {
        let mut s = CpuState::new();
        s.restore_status(0xFF);
        assert_eq!(s.status(), 0xFF & !(BREAK | UNUSED));
    }

    #[test]
    fn update_zn_flags() {
        let mut s = CpuState::new();
        s.update_zn(0);
        assert!(s.is_flag_set(ZERO));
        assert!(!s.is_flag_set(NEGATIVE));
        s.update_zn(0x80);
        assert!(!s.is_flag_set(ZERO));
        assert!(s.is_flag_set(NEGATIVE));
    }
}
