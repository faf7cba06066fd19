use retrocore_common::{Emulator, LoadError};

use crate::cpu::{Cpu, Registers};
use crate::{CYCLES_PER_FRAME, SCREEN_HEIGHT, SCREEN_WIDTH};

use super::ppu::{self, FRAMEBUFFER_SIZE};
use super::{io, Button, CartridgeHeader, GameBoyBus, Joypad, Mmu, Ppu, Serial, Timer};

/// High-level Game Boy machine.
///
/// Owns every component and runs them in lockstep: each CPU instruction is
/// followed by the timer and PPU advancing by the cycles it took.
pub struct GameBoy {
    cpu: Cpu,
    mmu: Mmu,
    timer: Timer,
    ppu: Ppu,
    joypad: Joypad,
    serial: Serial,
    /// Last completed frame, copied out of the PPU.
    framebuffer: Vec<u8>,
    rom_loaded: bool,
    header: Option<CartridgeHeader>,
}

impl Default for GameBoy {
    fn default() -> Self {
        Self::new()
    }
}

impl GameBoy {
    pub fn new() -> Self {
        Self {
            cpu: Cpu::new(),
            mmu: Mmu::new(),
            timer: Timer::new(),
            ppu: Ppu::new(),
            joypad: Joypad::new(),
            serial: Serial::new(),
            framebuffer: vec![0xFF; FRAMEBUFFER_SIZE],
            rom_loaded: false,
            header: None,
        }
    }

    /// Install a 256-byte DMG boot ROM. It takes effect on the next reset
    /// (or ROM load), which starts execution at 0x0000.
    pub fn load_boot_rom(&mut self, data: &[u8]) -> Result<(), LoadError> {
        self.mmu.load_boot_rom(data)
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn registers(&self) -> &Registers {
        &self.cpu.regs
    }

    pub fn mmu(&self) -> &Mmu {
        &self.mmu
    }

    pub fn mmu_mut(&mut self) -> &mut Mmu {
        &mut self.mmu
    }

    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn joypad(&self) -> &Joypad {
        &self.joypad
    }

    /// Bytes the cartridge has sent over the serial port.
    pub fn serial_output(&self) -> &[u8] {
        self.serial.output()
    }

    pub fn cartridge_header(&self) -> Option<&CartridgeHeader> {
        self.header.as_ref()
    }

    pub fn is_rom_loaded(&self) -> bool {
        self.rom_loaded
    }

    /// Execute one instruction and advance timer and PPU to match.
    fn step_instruction(&mut self) -> u32 {
        let mut bus = GameBoyBus::new(
            &mut self.mmu,
            &mut self.timer,
            &self.joypad,
            &mut self.serial,
        );
        let cycles = self.cpu.step(&mut bus);

        self.timer.step(&mut self.mmu, cycles);
        self.ppu.step(&mut self.mmu, cycles);
        cycles
    }

    /// Post-boot IO register values for a start without a boot ROM.
    fn apply_post_boot_io(&mut self) {
        self.mmu.write(io::LCDC, 0x91);
        ppu::write_stat(&mut self.mmu, 0x85);
        self.mmu.write(io::BGP, 0xFC);
        self.mmu.write(io::JOYP, 0xCF);
        self.mmu.write(io::DMA, 0xFF);
    }
}

impl Emulator for GameBoy {
    fn load_rom(&mut self, rom: &[u8]) -> Result<(), LoadError> {
        self.mmu.load_rom(rom)?;

        self.header = CartridgeHeader::parse(rom);
        match &self.header {
            Some(header) => log::info!(
                "GB: cartridge '{}' type {:#04x} ({}), ROM code {:#04x}, RAM code {:#04x}, checksum {}",
                header.title,
                header.cartridge_type,
                header.mapper_name(),
                header.rom_size,
                header.ram_size,
                if header.checksum_valid() { "ok" } else { "bad" }
            ),
            None => log::warn!("GB: ROM too small to carry a cartridge header"),
        }

        self.reset();
        self.rom_loaded = true;
        Ok(())
    }

    fn reset(&mut self) {
        self.mmu.reset();
        self.timer.reset();
        self.ppu.reset();
        self.ppu.sync_registers(&mut self.mmu);
        self.joypad.reset();
        self.serial.clear();
        self.framebuffer.fill(0xFF);

        if self.mmu.boot_rom_enabled() {
            self.cpu.reset_for_boot_rom();
        } else {
            self.cpu.reset();
            self.apply_post_boot_io();
        }
        log::info!("GB: reset, PC={:04X}", self.cpu.regs.pc);
    }

    fn step(&mut self) {
        self.step_instruction();
    }

    fn run_frame(&mut self) {
        if !self.rom_loaded {
            return;
        }

        self.cpu.reset_cycles();
        while self.cpu.cycles() < CYCLES_PER_FRAME {
            self.step_instruction();
        }

        self.joypad.update(&mut self.mmu);

        if self.ppu.frame_ready() {
            self.framebuffer.copy_from_slice(self.ppu.framebuffer());
            self.ppu.clear_frame_ready();
        }
        log::trace!(
            "GB: frame done, PC={:04X} LY={}",
            self.cpu.regs.pc,
            self.ppu.line()
        );
    }

    fn framebuffer(&self) -> &[u8] {
        &self.framebuffer
    }

    fn screen_width(&self) -> usize {
        SCREEN_WIDTH
    }

    fn screen_height(&self) -> usize {
        SCREEN_HEIGHT
    }

    fn set_button(&mut self, index: usize, pressed: bool) {
        match Button::from_index(index) {
            Some(button) => self.joypad.set_button(&mut self.mmu, button, pressed),
            None => log::debug!("GB: ignoring unknown button index {}", index),
        }
    }

    fn arch_name(&self) -> &'static str {
        "Game Boy"
    }

    fn memory(&self) -> &[u8] {
        self.mmu.memory()
    }

    fn pc(&self) -> u16 {
        self.cpu.regs.pc
    }
}
