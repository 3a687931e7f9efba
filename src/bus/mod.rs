#![doc = r#"
Bus module: the CPU-visible address space and the devices behind it.

Overview
- `Bus` owns everything the CPU can reach besides its own registers: 2 KiB work
  RAM, the PPU, the active mapper board, the console-global nametable mirroring
  mode, and both controller ports.
- The CPU receives `&mut Bus` for each step; the PPU receives a short-lived
  `CartridgeView` borrowing only the mapper and mirroring fields, so no
  back-references exist anywhere in the object graph.

Modules and responsibilities
- cpu_interface: CPU-visible address decoder (read/write, word reads, OAM DMA,
  $4016/$4017 controller ports).
- ram: 2 KiB internal RAM with 0x0800 mirroring.
- ppu_registers: CPU-visible PPU register window (0x2000-0x3FFF).
- clock: steps the PPU three dots per CPU cycle and routes NMI/IRQ requests.
- interfaces: `CartridgeView`, the `PpuBus` implementation handed to the PPU.
"#]

/// CPU-visible memory map and helpers (dispatcher for address ranges).
pub mod cpu_interface;

/// PPU registers handler (CPU-visible 0x2000-0x3FFF).
pub mod ppu_registers;

/// 2 KiB CPU work RAM.
pub mod ram;

/// PPU/CPU clock ratio and interrupt routing.
pub mod clock;

/// Views handed to the PPU.
pub mod interfaces;

#[cfg(test)]
mod tests;

pub use interfaces::CartridgeView;
pub use ram::{CPU_RAM_SIZE, Ram};

use crate::cartridge::Mirroring;
use crate::controller::Controller;
use crate::error::SnapshotError;
use crate::mapper::{Board, Mapper};
use crate::ppu::{Ppu, PpuEvents};
use crate::snapshot::{StateReader, StateWriter};

pub struct Bus {
    pub(crate) ram: Ram,
    pub(crate) ppu: Ppu,
    pub(crate) mapper: Board,
    pub(crate) mirroring: Mirroring,
    pub(crate) controllers: [Controller; 2],
    // Set by an OAMDMA write; consumed by the CPU after the instruction completes.
    dma_request: bool,
}

impl Bus {
    /// Serialized size of the bus-owned state (RAM, mirroring, controllers).
    pub const STATE_SIZE: usize = CPU_RAM_SIZE + 1 + 2 * Controller::STATE_SIZE;

    /// Power-on bus around a freshly constructed board.
    pub fn new(mapper: Board, mirroring: Mirroring) -> Self {
        Self {
            ram: Ram::new(),
            ppu: Ppu::new(),
            mapper,
            mirroring,
            controllers: [Controller::new(), Controller::new()],
            dma_request: false,
        }
    }

    /// CPU read.
    #[inline]
    pub fn read(&mut self, addr: u16) -> u8 {
        cpu_interface::cpu_read(self, addr)
    }

    /// CPU write.
    #[inline]
    pub fn write(&mut self, addr: u16, value: u8) {
        cpu_interface::cpu_write(self, addr, value)
    }

    /// Little-endian word read (vectors, absolute operands).
    #[inline]
    pub fn read_word(&mut self, addr: u16) -> u16 {
        cpu_interface::cpu_read_word(self, addr)
    }

    /// Little-endian word read whose high byte never leaves the page of `addr`.
    #[inline]
    pub fn read_word_page_wrapped(&mut self, addr: u16) -> u16 {
        cpu_interface::cpu_read_word_page_wrapped(self, addr)
    }

    /// Consume a pending OAM DMA request.
    #[inline]
    pub(crate) fn take_dma_request(&mut self) -> bool {
        std::mem::take(&mut self.dma_request)
    }

    pub(crate) fn request_dma(&mut self) {
        self.dma_request = true;
    }

    /// Advance the PPU by one dot.
    pub(crate) fn step_ppu(&mut self) -> PpuEvents {
        let Bus {
            ppu,
            mapper,
            mirroring,
            ..
        } = self;
        let mut view = CartridgeView::new(mapper, *mirroring);
        ppu.tick(&mut view)
    }

    /// Route a CPU write into cartridge space and adopt any mirroring change.
    pub(crate) fn mapper_write(&mut self, addr: u16, value: u8) {
        self.mapper.cpu_write(addr, value);
        if let Some(m) = self.mapper.current_mirroring() {
            self.mirroring = m;
        }
    }

    /// Replace the live button state of controller `port` (0 or 1).
    pub fn set_controller_state(&mut self, port: usize, mask: u8) {
        if let Some(c) = self.controllers.get_mut(port) {
            c.set_state_mask(mask);
        }
    }

    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    pub fn mapper(&self) -> &Board {
        &self.mapper
    }

    pub fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    pub fn ram(&self) -> &Ram {
        &self.ram
    }

    pub(crate) fn save_state(&self, w: &mut StateWriter) {
        w.bytes(self.ram.as_slice());
        w.u8(self.mirroring.to_code());
        for c in &self.controllers {
            c.save_state(w);
        }
    }

    pub(crate) fn load_state(&mut self, r: &mut StateReader<'_>) -> Result<(), SnapshotError> {
        r.read_into(self.ram.as_mut_slice())?;
        self.mirroring = Mirroring::from_code(r.u8()?)?;
        for c in &mut self.controllers {
            c.load_state(r)?;
        }
        self.dma_request = false;
        Ok(())
    }
}
