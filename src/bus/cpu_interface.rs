/*!
CPU interface dispatcher

Purpose
- Centralize CPU-visible memory mapping and delegate to devices.
- Keep address decoding in one place so the Bus façade stays small.

Address map:
- $0000-$07FF: 2KB internal RAM
- $0800-$1FFF: Mirrors of $0000-$07FF (mask & 0x07FF)
- $2000-$2007: PPU registers
- $2008-$3FFF: Mirrors of $2000-$2007 (mask with & 0x0007)
- $4000-$4013, $4015: audio range (reads 0, writes ignored)
- $4014: OAM DMA (write copies a 256-byte page into OAM and stalls the CPU)
- $4016: Controller strobe (write), Controller 1 serial read (read)
- $4017: Controller 2 serial read (read); writes ignored
- $4018-$401F: disabled test registers (reads 0, writes ignored)
- $4020-$FFFF: cartridge (mapper-controlled)
*/

use crate::bus::Bus;
use crate::bus::ppu_registers::PpuRegisters;
use crate::mapper::Mapper;

/// CPU-visible read from the unified address space.
pub fn cpu_read(bus: &mut Bus, addr: u16) -> u8 {
    match addr {
        0x0000..=0x1FFF => bus.ram.read(addr),
        0x2000..=0x3FFF => PpuRegisters::read(bus, addr),
        0x4016 => bus.controllers[0].read(),
        0x4017 => bus.controllers[1].read(),
        0x4000..=0x401F => 0,
        0x4020..=0xFFFF => bus.mapper.cpu_read(addr),
    }
}

/// CPU-visible write to the unified address space.
pub fn cpu_write(bus: &mut Bus, addr: u16, value: u8) {
    match addr {
        0x0000..=0x1FFF => bus.ram.write(addr, value),
        0x2000..=0x3FFF => PpuRegisters::write(bus, addr, value),
        0x4014 => oam_dma(bus, value),
        0x4016 => {
            for pad in &mut bus.controllers {
                pad.write_strobe(value);
            }
        }
        // Audio and test registers are not emulated.
        0x4000..=0x401F => {}
        0x4020..=0xFFFF => bus.mapper_write(addr, value),
    }
}

/// Copy CPU page `page << 8` into OAM starting at the current OAM address and
/// request the CPU DMA stall.
fn oam_dma(bus: &mut Bus, page: u8) {
    let base = (page as u16) << 8;
    let mut buf = [0u8; 256];
    for (i, byte) in buf.iter_mut().enumerate() {
        *byte = cpu_read(bus, base | i as u16);
    }
    bus.ppu.write_oam_dma(page, &buf);
    bus.request_dma();
}

pub fn cpu_read_word(bus: &mut Bus, addr: u16) -> u16 {
    let lo = cpu_read(bus, addr) as u16;
    let hi = cpu_read(bus, addr.wrapping_add(1)) as u16;
    (hi << 8) | lo
}

/// Word read reproducing the 6502 pointer bug: the high byte is fetched from
/// the same page as the low byte.
pub fn cpu_read_word_page_wrapped(bus: &mut Bus, addr: u16) -> u16 {
    let lo = cpu_read(bus, addr) as u16;
    let hi_addr = (addr & 0xFF00) | (addr.wrapping_add(1) & 0x00FF);
    let hi = cpu_read(bus, hi_addr) as u16;
    (hi << 8) | lo
}
