/*!
Clock/timing orchestrator for the Bus.

Purpose
- Keep the PPU locked at three dots per CPU cycle.
- Route PPU-originated interrupt requests to the CPU as soon as they occur:
  * vblank entry with NMI enabled -> `Cpu::trigger_nmi`
  * mapper scanline counter expiry -> `Cpu::trigger_irq` (honours the I flag
    at the moment of the request)
- Report whether a frame edge (post-render scanline, dot 1) occurred.
*/

use crate::bus::Bus;
use crate::cpu::core::Cpu;

/// PPU dots per CPU cycle (NTSC).
pub const PPU_DOTS_PER_CPU_CYCLE: u32 = 3;

/// Step the PPU `3 * cycles` dots. Returns `true` if a frame completed.
pub fn tick(bus: &mut Bus, cpu: &mut Cpu, cycles: u32) -> bool {
    let mut frame_complete = false;
    for _ in 0..cycles * PPU_DOTS_PER_CPU_CYCLE {
        let events = bus.step_ppu();
        if events.nmi {
            cpu.trigger_nmi();
        }
        if events.irq {
            cpu.trigger_irq();
        }
        frame_complete |= events.frame_complete;
    }
    frame_complete
}
