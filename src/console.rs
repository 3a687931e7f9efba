#![doc = r#"
Console: the top-level owner of one emulated machine.

Overview
- `Console` owns the CPU and the bus (RAM, PPU, mapper board, mirroring,
  controllers). It is created only from a successfully parsed cartridge.
- `tick` runs one CPU instruction (or one stall cycle / interrupt entry) and
  then three PPU dots per consumed CPU cycle; `next_frame` repeats it until
  the PPU reports the post-render frame edge.
- After an `ExecutionFault` the console is halted: every later `tick` returns
  the same fault without touching state.

Snapshots
- `save_state` produces a fixed-size byte string (`Console::STATE_SIZE`)
  laid out as described in `crate::snapshot`.
- `restore_state` rebuilds a console from the cartridge image and a snapshot;
  ROM bytes are never part of the snapshot.

Usage
```ignore
let mut console = famicore::Console::new(&rom_bytes)?;
console.set_input(Some(&input), None);
console.next_frame()?;
let rgba = console.screen_pixel(10, 20);
```
"#]

use std::path::Path;

use crate::bus::{Bus, clock};
use crate::cartridge::Cartridge;
use crate::controller::Input;
use crate::cpu::Cpu;
use crate::error::{ExecutionFault, LoadError, SnapshotError};
use crate::mapper::{Board, Mapper};
use crate::palette::Rgba;
use crate::ppu::{Ppu, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::snapshot::{
    HEADER_SIZE, MAPPER_STATE_SIZE, SNAPSHOT_MAGIC, SNAPSHOT_VERSION, StateReader, StateWriter,
};

pub struct Console {
    cartridge: Cartridge,
    cpu: Cpu,
    bus: Bus,
    halted: Option<ExecutionFault>,
}

impl Console {
    /// Exact length of every snapshot produced by `save_state`.
    pub const STATE_SIZE: usize =
        HEADER_SIZE + Cpu::STATE_SIZE + Bus::STATE_SIZE + Ppu::STATE_SIZE + MAPPER_STATE_SIZE;

    /// Parse an iNES image, build the board and power the machine on.
    pub fn new(rom: &[u8]) -> Result<Self, LoadError> {
        let cartridge = Cartridge::from_ines_bytes(rom)?;
        Self::from_cartridge(cartridge)
    }

    /// Read and load an iNES file.
    pub fn from_ines_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let cartridge = Cartridge::from_ines_file(path)?;
        Self::from_cartridge(cartridge)
    }

    fn from_cartridge(cartridge: Cartridge) -> Result<Self, LoadError> {
        let board = Board::from_cartridge(&cartridge)?;
        let mut bus = Bus::new(board, cartridge.mirroring());
        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);
        tracing::debug!(
            mapper = cartridge.mapper_id(),
            reset_pc = format_args!("{:#06X}", cpu.pc()),
            "console powered on"
        );
        Ok(Self {
            cartridge,
            cpu,
            bus,
            halted: None,
        })
    }

    /// One CPU step plus the matching PPU dots. Returns `Ok(true)` when a
    /// frame completed during this step.
    pub fn tick(&mut self) -> Result<bool, ExecutionFault> {
        if let Some(fault) = self.halted {
            return Err(fault);
        }
        let cycles = match self.cpu.step(&mut self.bus) {
            Ok(c) => c,
            Err(fault) => {
                self.halted = Some(fault);
                return Err(fault);
            }
        };
        Ok(clock::tick(&mut self.bus, &mut self.cpu, cycles))
    }

    /// Run until the next frame edge.
    pub fn next_frame(&mut self) -> Result<(), ExecutionFault> {
        while !self.tick()? {}
        Ok(())
    }

    /// Replace the live button state of either controller; `None` leaves it
    /// unchanged.
    pub fn set_input(&mut self, player1: Option<&Input>, player2: Option<&Input>) {
        if let Some(input) = player1 {
            self.bus.set_controller_state(0, input.to_byte());
        }
        if let Some(input) = player2 {
            self.bus.set_controller_state(1, input.to_byte());
        }
    }

    /// Palette index (0..=63) at (x, y); out-of-range coordinates yield 0.
    pub fn screen_index(&self, x: usize, y: usize) -> u8 {
        self.bus.ppu().pixel_index(x, y) & 0x3F
    }

    /// RGBA colour at (x, y) through the fixed master palette.
    pub fn screen_pixel(&self, x: usize, y: usize) -> Rgba {
        Rgba::from_index(self.screen_index(x, y))
    }

    /// Row-major 256 x 240 buffer of palette indices.
    pub fn screen_buffer(&self) -> &[u8] {
        self.bus.ppu().screen()
    }

    /// Whole frame as packed RGBA8 (256 * 240 * 4 bytes).
    pub fn frame_rgba(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(SCREEN_WIDTH * SCREEN_HEIGHT * 4);
        for &ix in self.screen_buffer() {
            out.extend_from_slice(&Rgba::from_index(ix).to_array());
        }
        out
    }

    pub fn cartridge(&self) -> &Cartridge {
        &self.cartridge
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    /// The fault that stopped execution, if any.
    pub fn halted(&self) -> Option<ExecutionFault> {
        self.halted
    }

    // ---------------------------------------------------------------------
    // Snapshots
    // ---------------------------------------------------------------------

    /// Serialize the complete machine state (ROM bytes excluded).
    pub fn save_state(&self) -> Vec<u8> {
        let mut w = StateWriter::with_capacity(Self::STATE_SIZE);
        w.bytes(SNAPSHOT_MAGIC);
        w.u8(SNAPSHOT_VERSION);
        w.u8(self.bus.mapper().mapper_id());
        self.cpu.save_state(&mut w);
        self.bus.save_state(&mut w);
        self.bus.ppu.save_state(&mut w);

        let mapper_start = w.len();
        self.bus.mapper.save_state(&mut w);
        debug_assert!(w.len() - mapper_start <= MAPPER_STATE_SIZE);
        w.pad_to(mapper_start + MAPPER_STATE_SIZE);
        w.into_bytes()
    }

    /// Build a console from the cartridge image `rom` and continue from
    /// `snapshot`.
    pub fn restore_state(rom: &[u8], snapshot: &[u8]) -> Result<Self, SnapshotError> {
        let mut console = Self::new(rom)?;
        console.load_state(snapshot)?;
        Ok(console)
    }

    /// Restore `snapshot` into this console (same cartridge). On error the
    /// console may be partially overwritten and should be discarded.
    pub fn load_state(&mut self, snapshot: &[u8]) -> Result<(), SnapshotError> {
        if snapshot.len() != Self::STATE_SIZE {
            return Err(SnapshotError::WrongSize {
                expected: Self::STATE_SIZE,
                actual: snapshot.len(),
            });
        }
        let mut r = StateReader::new(snapshot);
        if r.take(SNAPSHOT_MAGIC.len())? != SNAPSHOT_MAGIC {
            return Err(SnapshotError::BadMagic);
        }
        let version = r.u8()?;
        if version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(version));
        }
        let mapper = r.u8()?;
        let cartridge_mapper = self.bus.mapper().mapper_id();
        if mapper != cartridge_mapper {
            return Err(SnapshotError::MapperMismatch {
                snapshot: mapper,
                cartridge: cartridge_mapper,
            });
        }

        self.cpu.load_state(&mut r)?;
        self.bus.load_state(&mut r)?;
        self.bus.ppu.load_state(&mut r)?;
        let mut mapper_block = r.sub(MAPPER_STATE_SIZE)?;
        self.bus.mapper.load_state(&mut mapper_block)?;
        self.halted = None;

        tracing::debug!(
            mapper,
            pc = format_args!("{:#06X}", self.cpu.pc()),
            cycles = self.cpu.cycles(),
            "snapshot restored"
        );
        Ok(())
    }
}
