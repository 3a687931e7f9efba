#![doc = r#"
famicore library crate.

An NES emulator core: a 6502 CPU, the picture processing unit and cartridge
mappers 0, 1, 2 and 4, locked together by `Console` at three PPU dots per CPU
cycle. Hosts load an iNES image, feed controller input once per frame and read
back an indexed 256 x 240 frame.

Modules:
- bus: CPU address space (RAM, PPU registers, controllers, cartridge) and PPU clocking
- cartridge: iNES loader and cartridge metadata
- console: top-level machine, frame stepping and save states
- controller: serial controller ports and the per-frame `Input`
- cpu: 6502 CPU core (facade + state + dispatch + execute modules)
- error: `LoadError`, `ExecutionFault`, `SnapshotError`
- mapper / mappers: `Mapper` trait, `Board` variants and the banked boards
- palette: fixed 64-entry RGBA master palette
- ppu: per-dot PPU (registers, fetch pipeline, sprites, renderer)
- ppu_bus: trait decoupling the PPU from the cartridge
- snapshot: fixed-layout state encoding helpers
- screenshot (feature `screenshot`): PNG export

In tests, shared iNES builders are available under `crate::test_utils`.
"#]

pub mod bus;
pub mod cartridge;
pub mod console;
pub mod controller;
pub mod cpu;
pub mod error;
pub mod mapper;
pub mod mappers;
pub mod palette;
pub mod ppu;
pub mod ppu_bus;
#[cfg(feature = "screenshot")]
pub mod screenshot;
pub mod snapshot;

// Re-export commonly used types at the crate root for convenience.
pub use bus::Bus;
pub use cartridge::{Cartridge, Mirroring};
pub use console::Console;
pub use controller::{Button, Input};
pub use cpu::core::Cpu;
pub use error::{ExecutionFault, LoadError, SnapshotError};
pub use palette::{NES_PALETTE, Rgba};
pub use ppu::{SCREEN_HEIGHT, SCREEN_WIDTH};

// Shared test utilities (only compiled for tests)
#[cfg(test)]
pub mod test_utils;
