/*!
Controller abstraction for NES-style serial input via $4016/$4017.

Behavior:
- Buttons are represented as a bitmask in the order the CPU reads them:
  A, B, Select, Start, Up, Down, Left, Right  (bit 0 through bit 7)
- Writing to $4016 controls the strobe (bit 0 of the written value):
  * While strobe is high, every read reloads the shift register from the live
    button state, so reads keep returning the A button.
  * Writing strobe high copies the live state into the shift register.
  * With strobe low, each read returns bit 0 of the shift register and shifts
    it right; after 8 reads the register is empty and reads return 0.

Host input arrives once per frame through `Input` (eight booleans); the console
converts it with `Input::to_byte` and stores it as the live state.
*/

use crate::error::SnapshotError;
use crate::snapshot::{StateReader, StateWriter};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Button {
    A,
    B,
    Select,
    Start,
    Up,
    Down,
    Left,
    Right,
}

impl Button {
    #[inline]
    pub fn mask(self) -> u8 {
        match self {
            Button::A => 1 << 0,
            Button::B => 1 << 1,
            Button::Select => 1 << 2,
            Button::Start => 1 << 3,
            Button::Up => 1 << 4,
            Button::Down => 1 << 5,
            Button::Left => 1 << 6,
            Button::Right => 1 << 7,
        }
    }
}

/// Per-frame button snapshot supplied by the host.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Input {
    pub a: bool,
    pub b: bool,
    pub select: bool,
    pub start: bool,
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl Input {
    /// Pack into the serial byte layout (A in bit 0 ... Right in bit 7).
    pub fn to_byte(&self) -> u8 {
        [
            (self.a, Button::A),
            (self.b, Button::B),
            (self.select, Button::Select),
            (self.start, Button::Start),
            (self.up, Button::Up),
            (self.down, Button::Down),
            (self.left, Button::Left),
            (self.right, Button::Right),
        ]
        .iter()
        .filter(|(pressed, _)| *pressed)
        .fold(0, |acc, (_, button)| acc | button.mask())
    }

    /// Set or clear a single button.
    pub fn set(&mut self, button: Button, pressed: bool) {
        let slot = match button {
            Button::A => &mut self.a,
            Button::B => &mut self.b,
            Button::Select => &mut self.select,
            Button::Start => &mut self.start,
            Button::Up => &mut self.up,
            Button::Down => &mut self.down,
            Button::Left => &mut self.left,
            Button::Right => &mut self.right,
        };
        *slot = pressed;
    }
}

#[derive(Clone, Debug, Default)]
pub struct Controller {
    // Current live button states. Bit set = pressed.
    buttons: u8,

    // Serial shift register read by the CPU.
    shift: u8,

    strobe: bool,
}

impl Controller {
    pub const STATE_SIZE: usize = 3;

    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the live button state.
    pub fn set_state_mask(&mut self, mask: u8) {
        self.buttons = mask;
    }

    /// Called when the CPU writes to $4016. Only bit 0 is relevant.
    pub fn write_strobe(&mut self, value: u8) {
        self.strobe = (value & 1) != 0;
        if self.strobe {
            self.shift = self.buttons;
        }
    }

    /// Serial read (CPU read from $4016/$4017 for this controller).
    pub fn read(&mut self) -> u8 {
        if self.strobe {
            self.shift = self.buttons;
        }
        let bit = self.shift & 1;
        self.shift >>= 1;
        bit
    }

    pub fn current_mask(&self) -> u8 {
        self.buttons
    }

    pub fn strobe(&self) -> bool {
        self.strobe
    }

    pub(crate) fn save_state(&self, w: &mut StateWriter) {
        w.u8(self.buttons);
        w.u8(self.shift);
        w.bool(self.strobe);
    }

    pub(crate) fn load_state(&mut self, r: &mut StateReader<'_>) -> Result<(), SnapshotError> {
        self.buttons = r.u8()?;
        self.shift = r.u8()?;
        self.strobe = r.bool()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_shift_behaviour() {
        let mut c = Controller::new();

        // Press A, Start, Left -> bits 0, 3, 6
        c.set_state_mask((1 << 0) | (1 << 3) | (1 << 6));

        c.write_strobe(1);
        c.write_strobe(0);

        let expected = [1, 0, 0, 1, 0, 0, 1, 0];
        for &e in &expected {
            assert_eq!(c.read(), e);
        }

        // Register is drained after 8 reads
        assert_eq!(c.read(), 0);
        assert_eq!(c.read(), 0);
    }

    #[test]
    fn strobe_high_always_returns_a() {
        let mut c = Controller::new();
        c.set_state_mask(Button::A.mask());

        c.write_strobe(1);
        for _ in 0..16 {
            assert_eq!(c.read(), 1);
        }

        c.set_state_mask(0);
        assert_eq!(c.read(), 0);
    }

    #[test]
    fn input_packs_lsb_first() {
        let input = Input {
            a: true,
            start: true,
            right: true,
            ..Input::default()
        };
        assert_eq!(input.to_byte(), 0b1000_1001);

        let mut all = Input::default();
        for b in [
            Button::A,
            Button::B,
            Button::Select,
            Button::Start,
            Button::Up,
            Button::Down,
            Button::Left,
            Button::Right,
        ] {
            all.set(b, true);
        }
        assert_eq!(all.to_byte(), 0xFF);
    }

    #[test]
    fn live_state_change_without_strobe_not_visible() {
        let mut c = Controller::new();
        c.set_state_mask(0);
        c.write_strobe(1);
        c.write_strobe(0);
        c.set_state_mask(0xFF);
        assert_eq!(c.read(), 0);
    }
}
