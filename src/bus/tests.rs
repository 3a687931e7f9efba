use super::*;
use crate::test_utils::{build_banked_ines, build_ines, bus_from_rom};

/// NROM bus with header mirroring from `flags6`.
fn nrom_bus(flags6: u8) -> Bus {
    bus_from_rom(&build_ines(1, 1, flags6, 0, 1, None))
}

/// Helper for MMC1 serial writes (5 LSB-first writes to `addr`).
fn mmc1_serial_write(bus: &mut Bus, addr: u16, value5: u8) {
    for i in 0..5 {
        bus.write(addr, (value5 >> i) & 1);
    }
}

fn ppu_write(bus: &mut Bus, addr: u16, value: u8) {
    let _ = bus.read(0x2002); // reset write toggle
    bus.write(0x2006, (addr >> 8) as u8);
    bus.write(0x2006, addr as u8);
    bus.write(0x2007, value);
}

fn ppu_read(bus: &mut Bus, addr: u16) -> u8 {
    let _ = bus.read(0x2002);
    bus.write(0x2006, (addr >> 8) as u8);
    bus.write(0x2006, addr as u8);
    let _ = bus.read(0x2007); // buffered read (ignored)
    bus.read(0x2007)
}

#[test]
fn ram_powers_on_filled_and_mirrors() {
    let mut bus = nrom_bus(0);
    assert_eq!(bus.read(0x0000), 0xFF);

    bus.write(0x0001, 0xAA);
    assert_eq!(bus.read(0x0001), 0xAA);
    assert_eq!(bus.read(0x0801), 0xAA);
    assert_eq!(bus.read(0x1801), 0xAA);

    bus.write(0x1801, 0x55);
    assert_eq!(bus.read(0x0001), 0x55);
    assert_eq!(bus.read(0x0801), 0x55);
}

#[test]
fn ppu_register_window_mirrors() {
    let mut bus = nrom_bus(0);
    // $3456 folds onto $2006: address writes through the mirror.
    bus.write(0x3456, 0x21);
    bus.write(0x200E, 0x00);
    bus.write(0x2007, 0x99);
    assert_eq!(ppu_read(&mut bus, 0x2100), 0x99);
    // Status low bits echo the last register write.
    bus.write(0x2005, 0x1B);
    assert_eq!(bus.read(0x200A) & 0x1F, 0x1B);
}

#[test]
fn audio_and_test_registers_are_inert() {
    let mut bus = nrom_bus(0);
    bus.write(0x4000, 0xFF);
    bus.write(0x4015, 0xFF);
    bus.write(0x4017, 0xFF);
    assert_eq!(bus.read(0x4000), 0);
    assert_eq!(bus.read(0x4015), 0);
    assert_eq!(bus.read(0x401F), 0);
}

#[test]
fn controller_strobe_and_read() {
    let mut bus = nrom_bus(0);
    bus.set_controller_state(0, 0b1000_0101); // A, Select, Right
    bus.set_controller_state(1, 0b0000_0010); // B
    bus.write(0x4016, 1);
    bus.write(0x4016, 0);

    let p1: Vec<u8> = (0..8).map(|_| bus.read(0x4016)).collect();
    assert_eq!(p1, vec![1, 0, 1, 0, 0, 0, 0, 1]);
    // Exhausted shift register reads 0.
    assert_eq!(bus.read(0x4016), 0);

    assert_eq!(bus.read(0x4017), 0);
    assert_eq!(bus.read(0x4017), 1);
}

#[test]
fn strobe_high_keeps_returning_a() {
    let mut bus = nrom_bus(0);
    bus.set_controller_state(0, 0x01);
    bus.write(0x4016, 1);
    for _ in 0..10 {
        assert_eq!(bus.read(0x4016), 1);
    }
}

#[test]
fn prg_ram_read_write() {
    let mut bus = nrom_bus(0);
    bus.write(0x6000, 0x42);
    bus.write(0x7FFF, 0x24);
    assert_eq!(bus.read(0x6000), 0x42);
    assert_eq!(bus.read(0x7FFF), 0x24);
}

#[test]
fn oam_dma_copies_page_and_requests_stall() {
    let mut bus = nrom_bus(0);
    for i in 0..256u16 {
        bus.write(0x0200 + i, i as u8);
    }
    bus.write(0x2003, 0xFE);
    assert!(!bus.take_dma_request());
    bus.write(0x4014, 0x02);
    assert!(bus.take_dma_request());
    assert!(!bus.take_dma_request(), "request is consumed once");

    let oam = bus.ppu().oam();
    assert_eq!(oam[0xFE], 0x00);
    assert_eq!(oam[0xFF], 0x01);
    assert_eq!(oam[0x00], 0x02);
    assert_eq!(oam[0x01], 0x03);
}

#[test]
fn word_reads() {
    let mut bus = nrom_bus(0);
    bus.write(0x0010, 0x34);
    bus.write(0x0011, 0x12);
    assert_eq!(bus.read_word(0x0010), 0x1234);

    bus.write(0x02FF, 0xCD);
    bus.write(0x0300, 0xAB);
    bus.write(0x0200, 0xEF);
    assert_eq!(bus.read_word(0x02FF), 0xABCD);
    assert_eq!(bus.read_word_page_wrapped(0x02FF), 0xEFCD);
}

// ---------- PPU memory mapping through the bus ----------

#[test]
fn nametable_horizontal_mirroring() {
    let mut bus = nrom_bus(0b0000_0000);
    ppu_write(&mut bus, 0x2000, 0x55);
    assert_eq!(ppu_read(&mut bus, 0x2400), 0x55);
    assert_ne!(ppu_read(&mut bus, 0x2800), 0x55);
}

#[test]
fn nametable_vertical_mirroring() {
    let mut bus = nrom_bus(0b0000_0001);
    ppu_write(&mut bus, 0x2000, 0x66);
    assert_eq!(ppu_read(&mut bus, 0x2800), 0x66);
    assert_ne!(ppu_read(&mut bus, 0x2400), 0x66);
}

#[test]
fn four_screen_keeps_tables_distinct() {
    let mut bus = bus_from_rom(&build_banked_ines(4, 2, 1, 0b0000_1000));
    assert_eq!(bus.mirroring(), Mirroring::FourScreen);
    for (i, base) in [0x2000u16, 0x2400, 0x2800, 0x2C00].into_iter().enumerate() {
        ppu_write(&mut bus, base + 7, i as u8 + 1);
    }
    for (i, base) in [0x2000u16, 0x2400, 0x2800, 0x2C00].into_iter().enumerate() {
        assert_eq!(ppu_read(&mut bus, base + 7), i as u8 + 1);
    }
    // The board's mirroring register is ignored on four-screen carts.
    bus.write(0xA000, 0x01);
    assert_eq!(bus.mirroring(), Mirroring::FourScreen);
}

#[test]
fn palette_3f10_mirrors_3f00() {
    let mut bus = nrom_bus(0);
    ppu_write(&mut bus, 0x3F10, 0x12);
    let _ = bus.read(0x2002);
    bus.write(0x2006, 0x3F);
    bus.write(0x2006, 0x00);
    // Palette reads are not buffered.
    assert_eq!(bus.read(0x2007), 0x12);
}

#[test]
fn ppudata_reads_chr_through_mapper() {
    let mut bus = bus_from_rom(&build_banked_ines(4, 2, 1, 0));
    bus.write(0x8000, 0x00);
    bus.write(0x8001, 0x04); // R0: 2K at $0000 -> 1K banks 4,5
    let _ = bus.read(0x2002);
    bus.write(0x2006, 0x04);
    bus.write(0x2006, 0x00);
    let _ = bus.read(0x2007);
    assert_eq!(bus.read(0x2007), 5);
}

// -------- Mapper-driven mirroring --------

#[test]
fn mmc1_control_selects_mirroring() {
    let mut bus = bus_from_rom(&build_banked_ines(1, 2, 1, 0));
    let cases = [
        (0b00010, Mirroring::Vertical),
        (0b00011, Mirroring::Horizontal),
        (0b00000, Mirroring::SingleLower),
        (0b00001, Mirroring::SingleUpper),
    ];
    for (control, expected) in cases {
        mmc1_serial_write(&mut bus, 0x8000, control);
        assert_eq!(bus.mirroring(), expected);
    }
}

#[test]
fn mmc1_single_screen_aliases_all_tables() {
    let mut bus = bus_from_rom(&build_banked_ines(1, 2, 1, 0));
    mmc1_serial_write(&mut bus, 0x8000, 0b00000);
    ppu_write(&mut bus, 0x2000, 0xC3);
    for base in [0x2400u16, 0x2800, 0x2C00] {
        assert_eq!(ppu_read(&mut bus, base), 0xC3);
    }

    mmc1_serial_write(&mut bus, 0x8000, 0b00001);
    ppu_write(&mut bus, 0x2C00, 0xD4);
    assert_eq!(ppu_read(&mut bus, 0x2000), 0xD4);
    // Lower table kept its own contents.
    mmc1_serial_write(&mut bus, 0x8000, 0b00000);
    assert_eq!(ppu_read(&mut bus, 0x2000), 0xC3);
}

#[test]
fn mmc3_mirroring_switches_back_and_forth() {
    let mut bus = bus_from_rom(&build_banked_ines(4, 2, 1, 0));

    bus.write(0xA000, 0x00);
    assert_eq!(bus.mirroring(), Mirroring::Vertical);
    ppu_write(&mut bus, 0x2005, 0x9A);
    assert_eq!(ppu_read(&mut bus, 0x2805), 0x9A, "$2800 mirrors $2000");

    bus.write(0xA000, 0x01);
    assert_eq!(bus.mirroring(), Mirroring::Horizontal);
    ppu_write(&mut bus, 0x2005, 0x6E);
    assert_eq!(ppu_read(&mut bus, 0x2405), 0x6E, "$2400 mirrors $2000");

    bus.write(0xA000, 0x00);
    assert_eq!(bus.mirroring(), Mirroring::Vertical);
}

// -------- Clocking --------

#[test]
fn clock_runs_three_dots_per_cycle_and_routes_nmi() {
    use crate::cpu::{Cpu, Interrupt};

    let mut bus = nrom_bus(0);
    let mut cpu = Cpu::new();
    cpu.reset(&mut bus);
    bus.write(0x2000, 0x80); // NMI enable

    let mut cycles = 0u32;
    let mut frame = false;
    while !frame {
        frame = clock::tick(&mut bus, &mut cpu, 1);
        cycles += 1;
    }
    // (241, 1) is 241 * 341 + 1 dots in.
    assert_eq!(cycles, (241 * 341 + 1u32).div_ceil(3));
    assert_eq!(cpu.pending_interrupt(), Some(Interrupt::Nmi));
    assert!(bus.ppu().vblank());
}

#[test]
fn snapshot_round_trip_keeps_ram_and_mirroring() {
    let mut bus = bus_from_rom(&build_banked_ines(1, 2, 1, 0));
    bus.write(0x0123, 0x77);
    mmc1_serial_write(&mut bus, 0x8000, 0b00010);
    bus.set_controller_state(1, 0x5A);

    let mut w = StateWriter::default();
    bus.save_state(&mut w);
    let bytes = w.into_bytes();
    assert_eq!(bytes.len(), Bus::STATE_SIZE);

    let mut restored = bus_from_rom(&build_banked_ines(1, 2, 1, 0));
    restored
        .load_state(&mut StateReader::new(&bytes))
        .expect("load");
    assert_eq!(restored.read(0x0123), 0x77);
    assert_eq!(restored.mirroring(), Mirroring::Vertical);
    assert_eq!(restored.controllers[1].current_mask(), 0x5A);
}
