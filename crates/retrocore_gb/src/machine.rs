mod bus;
mod cartridge;
mod gameboy;
mod joypad;
mod mmu;
mod ppu;
mod serial;
mod timer;

pub use bus::GameBoyBus;
pub use cartridge::CartridgeHeader;
pub use gameboy::GameBoy;
pub use joypad::{Button, Joypad};
pub use mmu::Mmu;
pub use ppu::{Ppu, PpuMode};
pub use serial::Serial;
pub use timer::Timer;

/// Total addressable memory for the Game Boy (64 KiB).
const MEMORY_SIZE: usize = 0x10000;

/// Size of a DMG boot ROM image.
pub const BOOT_ROM_SIZE: usize = 0x100;

/// Memory-mapped IO register addresses.
pub mod io {
    pub const JOYP: u16 = 0xFF00;
    pub const SB: u16 = 0xFF01;
    pub const SC: u16 = 0xFF02;
    pub const DIV: u16 = 0xFF04;
    pub const TIMA: u16 = 0xFF05;
    pub const TMA: u16 = 0xFF06;
    pub const TAC: u16 = 0xFF07;
    pub const IF: u16 = 0xFF0F;
    pub const LCDC: u16 = 0xFF40;
    pub const STAT: u16 = 0xFF41;
    pub const SCY: u16 = 0xFF42;
    pub const SCX: u16 = 0xFF43;
    pub const LY: u16 = 0xFF44;
    pub const LYC: u16 = 0xFF45;
    pub const DMA: u16 = 0xFF46;
    pub const BGP: u16 = 0xFF47;
    /// Boot ROM disable latch.
    pub const BOOT: u16 = 0xFF50;
    pub const IE: u16 = 0xFFFF;
}

#[cfg(test)]
mod tests;
