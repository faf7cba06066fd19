use retrocore_common::{Emulator, LoadError};

use super::ppu::FRAMEBUFFER_SIZE;
use super::*;
use crate::cpu::Bus;
use crate::interrupts::InterruptFlags;
use crate::CYCLES_PER_FRAME;

/// ROM image of `banks` 16 KiB banks, each starting with its bank number.
fn banked_rom(banks: usize) -> Vec<u8> {
    let mut rom = vec![0; banks * 0x4000];
    for bank in 0..banks {
        rom[bank * 0x4000] = bank as u8;
    }
    rom
}

fn mmu_with_rom(rom: &[u8]) -> Mmu {
    let mut mmu = Mmu::new();
    mmu.load_rom(rom).unwrap();
    mmu
}

fn pixel(framebuffer: &[u8], x: usize, y: usize) -> [u8; 4] {
    let offset = (y * crate::SCREEN_WIDTH + x) * 4;
    [
        framebuffer[offset],
        framebuffer[offset + 1],
        framebuffer[offset + 2],
        framebuffer[offset + 3],
    ]
}

const SHADE_0: [u8; 4] = [155, 188, 15, 255];
const SHADE_1: [u8; 4] = [139, 172, 15, 255];
const SHADE_2: [u8; 4] = [48, 98, 48, 255];
const SHADE_3: [u8; 4] = [15, 56, 15, 255];

// ---------------------------------------------------------------------------
// MMU
// ---------------------------------------------------------------------------

#[test]
fn mmu_decodes_rom_wram_echo_and_unusable() {
    let mut rom = banked_rom(2);
    rom[0x0100] = 0x42;
    let mut mmu = mmu_with_rom(&rom);

    assert_eq!(mmu.read(0x0000), 0);
    assert_eq!(mmu.read(0x0100), 0x42);
    assert_eq!(mmu.read(0x4000), 1);

    // ROM writes go to the bank controller only.
    mmu.write(0x0100, 0x99);
    assert_eq!(mmu.read(0x0100), 0x42);

    mmu.write(0xC000, 0x5A);
    assert_eq!(mmu.read(0xE000), 0x5A);
    mmu.write(0xE001, 0x77);
    assert_eq!(mmu.read(0xC001), 0x77);

    mmu.write(0xFEA0, 0x12);
    assert_eq!(mmu.read(0xFEA0), 0xFF);
    assert_eq!(mmu.read(0xFEFF), 0xFF);

    mmu.write(0x8000, 0x33);
    mmu.write(0xFE00, 0x44);
    mmu.write(0xFF80, 0x55);
    mmu.write(0xFFFF, 0x1F);
    assert_eq!(mmu.read(0x8000), 0x33);
    assert_eq!(mmu.read(0xFE00), 0x44);
    assert_eq!(mmu.read(0xFF80), 0x55);
    assert_eq!(mmu.read(0xFFFF), 0x1F);
}

#[test]
fn mmu_reads_past_rom_end_return_ff() {
    let mmu = mmu_with_rom(&[0x00; 0x200]);
    assert_eq!(mmu.read(0x0300), 0xFF);
    assert_eq!(mmu.read(0x4000), 0xFF);
}

#[test]
fn mmu_rom_bank_select_coerces_zero_and_masks() {
    let mut mmu = mmu_with_rom(&banked_rom(4));
    assert_eq!(mmu.rom_bank(), 1);

    mmu.write(0x2000, 0x02);
    assert_eq!(mmu.read(0x4000), 2);

    mmu.write(0x3FFF, 0x00);
    assert_eq!(mmu.rom_bank(), 1);
    assert_eq!(mmu.read(0x4000), 1);

    mmu.write(0x2000, 0x23);
    assert_eq!(mmu.rom_bank(), 3);
    assert_eq!(mmu.read(0x4000), 3);

    // Bank beyond the image.
    mmu.write(0x2000, 0x10);
    assert_eq!(mmu.read(0x4000), 0xFF);
}

#[test]
fn mmu_records_ram_enable_and_banking_mode() {
    let mut mmu = mmu_with_rom(&banked_rom(2));

    mmu.write(0x0000, 0x0A);
    assert!(mmu.ram_enabled());
    mmu.write(0x1FFF, 0x1A);
    assert!(mmu.ram_enabled());
    mmu.write(0x0000, 0x00);
    assert!(!mmu.ram_enabled());

    mmu.write(0x6000, 0x01);
    assert_eq!(mmu.banking_mode(), 1);
    mmu.write(0x7FFF, 0x02);
    assert_eq!(mmu.banking_mode(), 0);
}

#[test]
fn mmu_external_ram_grows_on_demand_per_bank() {
    let mut mmu = mmu_with_rom(&banked_rom(2));
    assert!(mmu.ext_ram().is_empty());
    assert_eq!(mmu.read(0xA000), 0xFF);

    mmu.write(0xA010, 0x42);
    assert_eq!(mmu.ext_ram().len(), 0x11);
    assert_eq!(mmu.read(0xA010), 0x42);
    assert_eq!(mmu.read(0xA000), 0x00);
    assert_eq!(mmu.read(0xA100), 0xFF);

    mmu.write(0x4000, 0x05);
    assert_eq!(mmu.ram_bank(), 1);
    mmu.write(0xA000, 0x07);
    assert_eq!(mmu.ext_ram().len(), 0x2001);
    assert_eq!(mmu.read(0xA000), 0x07);

    mmu.write(0x4000, 0x00);
    assert_eq!(mmu.read(0xA000), 0x00);
    assert_eq!(mmu.read(0xA010), 0x42);
}

#[test]
fn mmu_boot_rom_overlay_and_disable_latch() {
    let mut mmu = mmu_with_rom(&banked_rom(2));
    mmu.load_boot_rom(&[0xAA; BOOT_ROM_SIZE]).unwrap();

    assert_eq!(mmu.read(0x0000), 0xAA);
    assert_eq!(mmu.read(0x00FF), 0xAA);
    assert_eq!(mmu.read(0x0100), 0x00);
    assert_eq!(mmu.read(io::BOOT), 0x00);

    // Zero writes keep the overlay.
    mmu.write(io::BOOT, 0x00);
    assert!(mmu.boot_rom_enabled());

    mmu.write(io::BOOT, 0x01);
    assert!(!mmu.boot_rom_enabled());
    assert_eq!(mmu.read(0x0000), 0x00);
    assert_eq!(mmu.read(io::BOOT), 0x01);

    // Reset maps it back in.
    mmu.reset();
    assert_eq!(mmu.read(0x0000), 0xAA);
}

#[test]
fn mmu_rejects_wrong_size_boot_rom() {
    let mut mmu = Mmu::new();
    mmu.load_boot_rom(&[0x11; BOOT_ROM_SIZE]).unwrap();

    let err = mmu.load_boot_rom(&[0x00; 255]).unwrap_err();
    assert!(matches!(err, LoadError::BootRomSize(255)));
    assert!(!mmu.has_boot_rom());
    assert!(!mmu.boot_rom_enabled());

    assert!(mmu.load_boot_rom(&[0x00; 257]).is_err());
    assert!(!mmu.boot_rom_enabled());
}

#[test]
fn mmu_rejects_empty_rom_and_keeps_previous() {
    let mut mmu = mmu_with_rom(&banked_rom(2));
    mmu.write(0xC000, 0x12);

    assert!(matches!(mmu.load_rom(&[]), Err(LoadError::EmptyRom)));
    assert_eq!(mmu.rom().len(), 0x8000);
    assert_eq!(mmu.read(0x4000), 1);
    assert_eq!(mmu.read(0xC000), 0x12);
}

#[test]
fn mmu_word_access_is_little_endian() {
    let mut mmu = Mmu::new();
    for addr in [0x8000u16, 0xC000, 0xC0FF, 0xDFFE, 0xFF80] {
        mmu.write_word(addr, 0xBEEF);
        assert_eq!(mmu.read(addr), 0xEF);
        assert_eq!(mmu.read(addr + 1), 0xBE);
        assert_eq!(mmu.read_word(addr), 0xBEEF);
    }
}

#[test]
fn mmu_request_interrupt_ors_into_if() {
    let mut mmu = Mmu::new();
    mmu.write(io::IF, 0x01);
    mmu.request_interrupt(InterruptFlags::TIMER);
    mmu.request_interrupt(InterruptFlags::JOYPAD);
    assert_eq!(mmu.read(io::IF), 0x15);
}

// ---------------------------------------------------------------------------
// Timer
// ---------------------------------------------------------------------------

#[test]
fn timer_increments_tima_once_per_selected_bit_period() {
    let mut mmu = Mmu::new();
    let mut timer = Timer::new();
    mmu.write(io::TAC, 0x05);

    timer.step(&mut mmu, 16);
    assert_eq!(mmu.read(io::TIMA), 1);

    timer.step(&mut mmu, 15);
    assert_eq!(mmu.read(io::TIMA), 1);
    timer.step(&mut mmu, 1);
    assert_eq!(mmu.read(io::TIMA), 2);

    for _ in 0..40 {
        timer.step(&mut mmu, 4);
    }
    assert_eq!(mmu.read(io::TIMA), 12);
}

#[test]
fn timer_counts_every_edge_in_a_large_step() {
    let mut mmu = Mmu::new();
    let mut timer = Timer::new();
    mmu.write(io::TAC, 0x05);

    timer.step(&mut mmu, 160);
    assert_eq!(mmu.read(io::TIMA), 10);
    assert_eq!(timer.prev_counter(), 0);
    assert_eq!(timer.counter(), 160);
}

#[test]
fn timer_frequency_select_picks_counter_bit() {
    for (tac, period) in [(0x04u8, 1024u32), (0x05, 16), (0x06, 64), (0x07, 256)] {
        let mut mmu = Mmu::new();
        let mut timer = Timer::new();
        mmu.write(io::TAC, tac);

        timer.step(&mut mmu, period - 4);
        assert_eq!(mmu.read(io::TIMA), 0, "tac {:#04x}", tac);
        timer.step(&mut mmu, 4);
        assert_eq!(mmu.read(io::TIMA), 1, "tac {:#04x}", tac);
    }
}

#[test]
fn timer_overflow_reloads_tma_and_requests_interrupt() {
    let mut mmu = Mmu::new();
    let mut timer = Timer::new();
    mmu.write(io::TAC, 0x05);
    mmu.write(io::TIMA, 0xFF);
    mmu.write(io::TMA, 0xAB);

    timer.step(&mut mmu, 16);
    assert_eq!(mmu.read(io::TIMA), 0xAB);
    assert_eq!(mmu.read(io::IF) & 0x04, 0x04);
}

#[test]
fn timer_disabled_only_advances_div() {
    let mut mmu = Mmu::new();
    let mut timer = Timer::new();
    mmu.write(io::TAC, 0x01);

    timer.step(&mut mmu, 1000);
    assert_eq!(mmu.read(io::TIMA), 0);
    assert_eq!(timer.div(), 3);
    assert_eq!(mmu.read(io::DIV), 3);
}

#[test]
fn timer_tac_write_falling_edge_increments_tima() {
    let mut mmu = Mmu::new();
    let mut timer = Timer::new();
    mmu.write(io::TAC, 0x05);

    // Counter = 8: bit 3 high.
    timer.step(&mut mmu, 8);
    assert_eq!(mmu.read(io::TIMA), 0);

    timer.write_tac(&mut mmu, 0x01);
    assert_eq!(mmu.read(io::TIMA), 1);
    assert_eq!(mmu.read(io::TAC), 0x01);

    // Re-enabling is quiet; moving off a high bit to a low one is an edge.
    timer.write_tac(&mut mmu, 0x05);
    assert_eq!(mmu.read(io::TIMA), 1);
    timer.write_tac(&mut mmu, 0x06);
    assert_eq!(mmu.read(io::TIMA), 2);
}

#[test]
fn timer_tac_write_with_low_signal_is_quiet() {
    let mut mmu = Mmu::new();
    let mut timer = Timer::new();
    mmu.write(io::TAC, 0x05);
    timer.step(&mut mmu, 4);

    timer.write_tac(&mut mmu, 0x00);
    assert_eq!(mmu.read(io::TIMA), 0);
}

#[test]
fn timer_div_reset_can_tick_tima() {
    let mut mmu = Mmu::new();
    let mut timer = Timer::new();
    mmu.write(io::TAC, 0x05);
    timer.step(&mut mmu, 0x0308);
    assert_eq!(timer.div(), 3);
    let tima = mmu.read(io::TIMA);

    timer.reset_div(&mut mmu);
    assert_eq!(mmu.read(io::TIMA), tima + 1);
    assert_eq!(timer.counter(), 0);
    assert_eq!(timer.div(), 0);
    assert_eq!(mmu.read(io::DIV), 0);
}

// ---------------------------------------------------------------------------
// PPU
// ---------------------------------------------------------------------------

#[test]
fn ppu_walks_one_scanline() {
    let mut mmu = Mmu::new();
    let mut ppu = Ppu::new();
    assert_eq!(ppu.mode(), PpuMode::OamScan);

    ppu.step(&mut mmu, 80);
    assert_eq!(ppu.mode(), PpuMode::Drawing);
    assert_eq!(mmu.read(io::STAT) & 0x03, 3);

    ppu.step(&mut mmu, 172);
    assert_eq!(ppu.mode(), PpuMode::HBlank);
    assert_eq!(mmu.read(io::STAT) & 0x03, 0);
    assert_eq!(ppu.line(), 0);

    ppu.step(&mut mmu, 204);
    assert_eq!(ppu.mode(), PpuMode::OamScan);
    assert_eq!(ppu.line(), 1);
    assert_eq!(mmu.read(io::LY), 1);
    assert_eq!(mmu.read(io::STAT) & 0x03, 2);
}

#[test]
fn ppu_partial_steps_accumulate() {
    let mut mmu = Mmu::new();
    let mut ppu = Ppu::new();

    ppu.step(&mut mmu, 76);
    assert_eq!(ppu.mode(), PpuMode::OamScan);
    ppu.step(&mut mmu, 8);
    assert_eq!(ppu.mode(), PpuMode::Drawing);

    // A whole line in one call crosses every boundary.
    let mut ppu = Ppu::new();
    ppu.step(&mut mmu, 456);
    assert_eq!(ppu.mode(), PpuMode::OamScan);
    assert_eq!(ppu.line(), 1);
}

#[test]
fn ppu_enters_vblank_after_144_lines_and_wraps() {
    let mut mmu = Mmu::new();
    let mut ppu = Ppu::new();

    for _ in 0..(144 * 456 / 4) {
        ppu.step(&mut mmu, 4);
    }
    assert_eq!(ppu.mode(), PpuMode::VBlank);
    assert_eq!(ppu.line(), 144);
    assert!(ppu.frame_ready());
    assert_eq!(mmu.read(io::IF) & 0x01, 0x01);
    assert_eq!(mmu.read(io::STAT) & 0x03, 1);

    ppu.step(&mut mmu, 456);
    assert_eq!(ppu.line(), 145);
    assert_eq!(mmu.read(io::LY), 145);

    ppu.step(&mut mmu, 456 * 9);
    assert_eq!(ppu.line(), 0);
    assert_eq!(ppu.mode(), PpuMode::OamScan);
    assert_eq!(mmu.read(io::LY), 0);

    ppu.clear_frame_ready();
    assert!(!ppu.frame_ready());
}

#[test]
fn ppu_full_frame_is_70224_cycles() {
    let mut mmu = Mmu::new();
    let mut ppu = Ppu::new();

    ppu.step(&mut mmu, CYCLES_PER_FRAME - 4);
    assert_eq!(ppu.line(), 153);
    ppu.step(&mut mmu, 4);
    assert_eq!(ppu.line(), 0);
    assert_eq!(ppu.mode(), PpuMode::OamScan);
}

#[test]
fn ppu_sets_lyc_coincidence_bit() {
    let mut mmu = Mmu::new();
    let mut ppu = Ppu::new();
    mmu.write(io::LYC, 2);

    ppu.step(&mut mmu, 456);
    assert_eq!(mmu.read(io::STAT) & 0x04, 0);
    ppu.step(&mut mmu, 456);
    assert_eq!(mmu.read(io::STAT) & 0x04, 0x04);
    ppu.step(&mut mmu, 456);
    assert_eq!(mmu.read(io::STAT) & 0x04, 0);
}

#[test]
fn ppu_renders_background_with_unsigned_tile_data() {
    let mut mmu = Mmu::new();
    let mut ppu = Ppu::new();
    mmu.write(io::LCDC, 0x91);
    mmu.write(io::BGP, 0xE4);
    // Tile 0, row 0: every pixel color 1. Row 1 stays color 0.
    mmu.write(0x8000, 0xFF);
    mmu.write(0x8001, 0x00);

    ppu.step(&mut mmu, 80 + 172);
    assert_eq!(pixel(ppu.framebuffer(), 0, 0), SHADE_1);
    assert_eq!(pixel(ppu.framebuffer(), 159, 0), SHADE_1);

    ppu.step(&mut mmu, 456);
    assert_eq!(pixel(ppu.framebuffer(), 0, 1), SHADE_0);
    // Line 2 not drawn yet.
    assert_eq!(pixel(ppu.framebuffer(), 0, 2), [0xFF; 4]);
}

#[test]
fn ppu_renders_background_with_signed_tile_data() {
    let mut mmu = Mmu::new();
    let mut ppu = Ppu::new();
    mmu.write(io::LCDC, 0x81);
    mmu.write(io::BGP, 0xE4);

    // Map entry 0 -> tile 0 at 0x9000, entry 1 -> tile -128 at 0x8800.
    mmu.write(0x9800, 0x00);
    mmu.write(0x9801, 0x80);
    mmu.write(0x9000, 0xFF);
    mmu.write(0x9001, 0xFF);
    mmu.write(0x8800, 0x00);
    mmu.write(0x8801, 0xFF);

    ppu.step(&mut mmu, 80 + 172);
    assert_eq!(pixel(ppu.framebuffer(), 0, 0), SHADE_3);
    assert_eq!(pixel(ppu.framebuffer(), 8, 0), SHADE_2);
    assert_eq!(pixel(ppu.framebuffer(), 16, 0), SHADE_3);
}

#[test]
fn ppu_applies_scroll_and_alternate_tile_map() {
    let mut mmu = Mmu::new();
    let mut ppu = Ppu::new();
    mmu.write(io::LCDC, 0x99);
    mmu.write(io::BGP, 0xE4);
    mmu.write(io::SCX, 4);
    mmu.write(io::SCY, 8);

    // Map row 1, column 1 of the 0x9C00 map points at tile 1, whose first
    // row is color 3 only in its leftmost pixel.
    mmu.write(0x9C21, 0x01);
    mmu.write(0x8010, 0x80);
    mmu.write(0x8011, 0x80);

    ppu.step(&mut mmu, 80 + 172);
    let fb = ppu.framebuffer();
    // Background x 8 lands on screen x 4.
    assert_eq!(pixel(fb, 3, 0), SHADE_0);
    assert_eq!(pixel(fb, 4, 0), SHADE_3);
    assert_eq!(pixel(fb, 5, 0), SHADE_0);
}

#[test]
fn ppu_leaves_lines_untouched_with_lcd_off() {
    let mut mmu = Mmu::new();
    let mut ppu = Ppu::new();
    mmu.write(io::LCDC, 0x11);
    mmu.write(0x8000, 0xFF);
    mmu.write(0x8001, 0xFF);

    ppu.step(&mut mmu, 456);
    assert!(ppu.framebuffer().iter().all(|&b| b == 0xFF));
    assert_eq!(ppu.framebuffer().len(), FRAMEBUFFER_SIZE);
}

// ---------------------------------------------------------------------------
// Joypad / serial / bus
// ---------------------------------------------------------------------------

#[test]
fn joypad_press_requests_interrupt_and_release_does_not() {
    let mut mmu = Mmu::new();
    let mut joypad = Joypad::new();

    joypad.set_button(&mut mmu, Button::Start, true);
    assert!(joypad.is_pressed(Button::Start));
    assert_eq!(joypad.state(), 0xF7);
    assert_eq!(mmu.read(io::IF), 0x10);

    mmu.write(io::IF, 0);
    joypad.set_button(&mut mmu, Button::Start, false);
    assert!(!joypad.is_pressed(Button::Start));
    assert_eq!(joypad.state(), 0xFF);
    assert_eq!(mmu.read(io::IF), 0);
}

#[test]
fn joypad_update_reflects_selected_group() {
    let mut mmu = Mmu::new();
    let mut joypad = Joypad::new();
    joypad.set_button(&mut mmu, Button::A, true);
    joypad.set_button(&mut mmu, Button::Down, true);

    // Action buttons selected (bit 5 low).
    mmu.write(io::JOYP, 0x10);
    joypad.update(&mut mmu);
    assert_eq!(mmu.read(io::JOYP), 0xDE);

    // Directions selected (bit 4 low).
    mmu.write(io::JOYP, 0x20);
    joypad.update(&mut mmu);
    assert_eq!(mmu.read(io::JOYP), 0xE7);

    // Both groups.
    mmu.write(io::JOYP, 0x00);
    joypad.update(&mut mmu);
    assert_eq!(mmu.read(io::JOYP), 0xC6);

    // Neither.
    mmu.write(io::JOYP, 0x30);
    joypad.update(&mut mmu);
    assert_eq!(mmu.read(io::JOYP), 0xFF);
}

#[test]
fn button_indices_map_in_order() {
    assert_eq!(Button::from_index(0), Some(Button::A));
    assert_eq!(Button::from_index(3), Some(Button::Start));
    assert_eq!(Button::from_index(7), Some(Button::Down));
    assert_eq!(Button::from_index(8), None);
}

#[test]
fn serial_captures_internal_clock_transfers() {
    let mut mmu = Mmu::new();
    let mut serial = Serial::new();

    mmu.write(io::SB, b'O');
    serial.write_sc(&mut mmu, 0x81);
    mmu.write(io::SB, b'K');
    serial.write_sc(&mut mmu, 0x81);
    assert_eq!(serial.output(), b"OK");
    assert_eq!(mmu.read(io::SC), 0x01);

    // External clock: no transfer.
    serial.write_sc(&mut mmu, 0x80);
    assert_eq!(serial.output(), b"OK");
    assert_eq!(mmu.read(io::SC), 0x80);

    serial.clear();
    assert!(serial.output().is_empty());
}

#[test]
fn bus_routes_timer_joypad_and_serial_registers() {
    let mut mmu = Mmu::new();
    let mut timer = Timer::new();
    let mut joypad = Joypad::new();
    let mut serial = Serial::new();
    joypad.set_button(&mut mmu, Button::B, true);
    timer.step(&mut mmu, 0x1234);

    {
        let mut bus = GameBoyBus::new(&mut mmu, &mut timer, &joypad, &mut serial);
        assert_eq!(bus.read8(io::DIV), 0x12);
        bus.write8(io::DIV, 0xAB);
        assert_eq!(bus.read8(io::DIV), 0x00);

        bus.write8(io::TAC, 0x05);
        assert_eq!(bus.read8(io::TAC), 0x05);

        bus.write8(io::JOYP, 0x10);
        assert_eq!(bus.read8(io::JOYP), 0xDD);

        bus.write8(io::SB, b'h');
        bus.write8(io::SC, 0x81);

        bus.write16(0xC000, 0x1234);
        assert_eq!(bus.read16(0xC000), 0x1234);
    }

    assert_eq!(timer.counter(), 0);
    assert_eq!(serial.output(), b"h");
    assert_eq!(mmu.read(0xC001), 0x12);
}

#[test]
fn bus_stat_writes_keep_ppu_owned_bits() {
    let mut mmu = Mmu::new();
    let mut timer = Timer::new();
    let joypad = Joypad::new();
    let mut serial = Serial::new();
    mmu.write(io::STAT, 0x83);
    mmu.write(io::LY, 5);

    let mut bus = GameBoyBus::new(&mut mmu, &mut timer, &joypad, &mut serial);
    bus.write8(io::STAT, 0x00);
    assert_eq!(bus.read8(io::STAT), 0x83);
    bus.write8(io::STAT, 0xFC);
    assert_eq!(bus.read8(io::STAT), 0xFB);

    bus.write8(io::LYC, 5);
    assert_eq!(bus.read8(io::LYC), 5);
    assert_eq!(bus.read8(io::STAT), 0xFF);
    bus.write8(io::LYC, 6);
    assert_eq!(bus.read8(io::STAT), 0xFB);
}

// ---------------------------------------------------------------------------
// Cartridge header
// ---------------------------------------------------------------------------

fn rom_with_header(title: &[u8], cartridge_type: u8) -> Vec<u8> {
    let mut rom = vec![0; 0x8000];
    rom[0x0134..0x0134 + title.len()].copy_from_slice(title);
    rom[0x0147] = cartridge_type;
    rom[0x0148] = 0x01;
    rom[0x0149] = 0x02;
    let mut checksum = 0u8;
    for &b in &rom[0x0134..0x014D] {
        checksum = checksum.wrapping_sub(b).wrapping_sub(1);
    }
    rom[0x014D] = checksum;
    rom
}

#[test]
fn cartridge_header_parses_fields() {
    let rom = rom_with_header(b"TETRIS", 0x01);
    let header = CartridgeHeader::parse(&rom).unwrap();

    assert_eq!(header.title, "TETRIS");
    assert_eq!(header.cartridge_type, 0x01);
    assert_eq!(header.mapper_name(), "MBC1");
    assert_eq!(header.rom_size_bytes(), Some(0x10000));
    assert_eq!(header.ram_size_bytes(), Some(8 * 1024));
    assert!(header.checksum_valid());
}

#[test]
fn cartridge_header_detects_bad_checksum() {
    let mut rom = rom_with_header(b"ZELDA", 0x00);
    rom[0x014D] ^= 0xFF;
    let header = CartridgeHeader::parse(&rom).unwrap();
    assert_eq!(header.mapper_name(), "ROM ONLY");
    assert!(!header.checksum_valid());
}

#[test]
fn cartridge_header_needs_full_header_block() {
    assert!(CartridgeHeader::parse(&[0; 0x14F]).is_none());
    assert!(CartridgeHeader::parse(&[0; 0x150]).is_some());
}

// ---------------------------------------------------------------------------
// GameBoy facade
// ---------------------------------------------------------------------------

#[test]
fn run_frame_without_rom_does_nothing() {
    let mut gb = GameBoy::new();
    gb.run_frame();
    assert_eq!(gb.pc(), 0x0100);
    assert_eq!(gb.cpu().cycles(), 0);
    assert_eq!(gb.arch_name(), "Game Boy");
    assert_eq!(gb.screen_width(), 160);
    assert_eq!(gb.screen_height(), 144);
    assert_eq!(gb.framebuffer().len(), 160 * 144 * 4);
    assert_eq!(gb.memory_size(), 0x10000);
}

#[test]
fn load_rom_applies_post_boot_io() {
    let mut gb = GameBoy::new();
    gb.load_rom(&rom_with_header(b"TEST", 0x00)).unwrap();

    assert!(gb.is_rom_loaded());
    assert_eq!(gb.cartridge_header().map(|h| h.title.as_str()), Some("TEST"));
    assert_eq!(gb.registers().af(), 0x01B0);
    assert_eq!(gb.mmu().read(io::LCDC), 0x91);
    // Mode 2 and LY == LYC on top of the post-boot interrupt selects.
    assert_eq!(gb.mmu().read(io::STAT), 0x86);
    assert_eq!(gb.mmu().read(io::BGP), 0xFC);
    assert_eq!(gb.mmu().read(io::JOYP), 0xCF);
    assert_eq!(gb.mmu().read(io::DMA), 0xFF);
}

#[test]
fn load_rom_rejects_empty_image() {
    let mut gb = GameBoy::new();
    assert!(gb.load_rom(&[]).is_err());
    assert!(!gb.is_rom_loaded());
}

#[test]
fn run_frame_spends_exactly_one_frame_of_nops() {
    let mut gb = GameBoy::new();
    gb.load_rom(&[0x00; 0x8000]).unwrap();

    gb.run_frame();
    assert_eq!(gb.cpu().cycles(), CYCLES_PER_FRAME);
    assert_eq!(gb.pc(), 0x0100 + (CYCLES_PER_FRAME / 4) as u16);
    assert_eq!(gb.ppu().line(), 0);
    assert_eq!(gb.ppu().mode(), PpuMode::OamScan);
    assert!(!gb.ppu().frame_ready());
    assert_eq!(gb.mmu().read(io::IF) & 0x01, 0x01);
    assert_eq!(gb.timer().div(), ((CYCLES_PER_FRAME % 0x10000) >> 8) as u8);

    // Empty VRAM with BGP=0xFC draws shade 0 everywhere.
    let fb = gb.framebuffer();
    assert_eq!(pixel(fb, 0, 0), SHADE_0);
    assert_eq!(pixel(fb, 159, 143), SHADE_0);

    let pc = gb.pc();
    gb.run_frame();
    assert_eq!(gb.pc(), pc + (CYCLES_PER_FRAME / 4) as u16);
}

#[test]
fn halted_cpu_still_completes_frame() {
    let mut rom = vec![0x00; 0x8000];
    rom[0x0100] = 0x76;
    let mut gb = GameBoy::new();
    gb.load_rom(&rom).unwrap();

    gb.run_frame();
    assert!(gb.cpu().halted);
    assert_eq!(gb.pc(), 0x0101);
    assert_eq!(gb.cpu().cycles(), CYCLES_PER_FRAME);
}

#[test]
fn set_button_routes_to_joypad() {
    let mut gb = GameBoy::new();
    gb.set_button(1, true);
    assert!(gb.joypad().is_pressed(Button::B));
    assert_eq!(gb.mmu().read(io::IF) & 0x10, 0x10);

    gb.set_button(42, true);
    assert_eq!(gb.joypad().state(), 0xFD);
}

#[test]
fn serial_output_from_program() {
    let mut rom = vec![0x00; 0x8000];
    // LD A,'O' ; LDH (01),A ; LD A,81 ; LDH (02),A
    rom[0x0100..0x0108].copy_from_slice(&[0x3E, b'O', 0xE0, 0x01, 0x3E, 0x81, 0xE0, 0x02]);
    let mut gb = GameBoy::new();
    gb.load_rom(&rom).unwrap();

    for _ in 0..4 {
        gb.step();
    }
    assert_eq!(gb.serial_output(), b"O");
    assert_eq!(gb.pc(), 0x0108);
}

#[test]
fn program_reads_back_stat_mode_after_write() {
    let mut rom = vec![0x00; 0x8000];
    // LD A,40 ; LDH (41),A ; LDH A,(41)
    rom[0x0100..0x0106].copy_from_slice(&[0x3E, 0x40, 0xE0, 0x41, 0xF0, 0x41]);
    let mut gb = GameBoy::new();
    gb.load_rom(&rom).unwrap();

    for _ in 0..3 {
        gb.step();
    }
    let stat = gb.registers().a();
    assert_eq!(stat & 0x03, 2);
    assert_eq!(stat, 0xC6);
    assert_eq!(gb.ppu().mode(), PpuMode::OamScan);
}

#[test]
fn boot_rom_starts_at_zero() {
    let mut gb = GameBoy::new();
    gb.load_boot_rom(&[0x00; BOOT_ROM_SIZE]).unwrap();
    gb.load_rom(&[0x00; 0x8000]).unwrap();

    assert_eq!(gb.pc(), 0x0000);
    assert_eq!(gb.registers().af(), 0x0000);
    gb.step();
    assert_eq!(gb.pc(), 0x0001);

    // A rejected boot ROM falls back to the post-boot start.
    assert!(gb.load_boot_rom(&[0x00; 16]).is_err());
    gb.reset();
    assert_eq!(gb.pc(), 0x0100);
    assert_eq!(gb.mmu().read(io::LCDC), 0x91);
}

#[test]
fn reset_clears_framebuffer_and_ram() {
    let mut gb = GameBoy::new();
    gb.load_rom(&[0x00; 0x8000]).unwrap();
    gb.run_frame();
    gb.mmu_mut().write(0xC000, 0x42);

    gb.reset();
    assert!(gb.framebuffer().iter().all(|&b| b == 0xFF));
    assert_eq!(gb.mmu().read(0xC000), 0x00);
    assert_eq!(gb.pc(), 0x0100);
}
