pub mod cpu;
pub mod interrupts;
pub mod machine;

pub use cpu::{Bus, Cpu, Flag, Registers};
pub use interrupts::InterruptFlags;
pub use machine::{CartridgeHeader, GameBoy};

/// Logical screen width in pixels for the Game Boy DMG.
pub const SCREEN_WIDTH: usize = 160;
/// Logical screen height in pixels.
pub const SCREEN_HEIGHT: usize = 144;

/// T-cycles in one full frame (154 lines of 456 cycles).
pub const CYCLES_PER_FRAME: u32 = 70_224;
