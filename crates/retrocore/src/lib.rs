use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use typed_builder::TypedBuilder;

pub use retrocore_chip8::Chip8;
pub use retrocore_common::{Beeper, Color, Emulator, LoadError};
pub use retrocore_gb::GameBoy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    Chip8,
    GameBoy,
}

impl FromStr for Arch {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "chip8" | "CHIP8" | "chip-8" | "CHIP-8" => Ok(Arch::Chip8),
            "gb" | "GB" | "gameboy" | "game-boy" | "dmg" => Ok(Arch::GameBoy),
            other => bail!("unknown system '{}'. Supported: chip8, gb", other),
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arch::Chip8 => f.write_str("chip8"),
            Arch::GameBoy => f.write_str("gb"),
        }
    }
}

/// The active emulation core.
///
/// Shared operations go through the `Emulator` impl; architecture specific
/// views (CHIP-8 registers, Game Boy CPU state, ...) are reached by matching
/// on the variant.
pub enum Core {
    Chip8(Box<Chip8>),
    GameBoy(Box<GameBoy>),
}

impl Core {
    pub fn select(arch: Arch) -> Self {
        log::info!("Selecting core: {}", arch);
        match arch {
            Arch::Chip8 => Core::Chip8(Box::default()),
            Arch::GameBoy => Core::GameBoy(Box::default()),
        }
    }

    pub fn arch(&self) -> Arch {
        match self {
            Core::Chip8(_) => Arch::Chip8,
            Core::GameBoy(_) => Arch::GameBoy,
        }
    }

    pub fn as_chip8(&self) -> Option<&Chip8> {
        match self {
            Core::Chip8(chip8) => Some(chip8),
            _ => None,
        }
    }

    pub fn as_chip8_mut(&mut self) -> Option<&mut Chip8> {
        match self {
            Core::Chip8(chip8) => Some(chip8),
            _ => None,
        }
    }

    pub fn as_game_boy(&self) -> Option<&GameBoy> {
        match self {
            Core::GameBoy(gb) => Some(gb),
            _ => None,
        }
    }

    pub fn as_game_boy_mut(&mut self) -> Option<&mut GameBoy> {
        match self {
            Core::GameBoy(gb) => Some(gb),
            _ => None,
        }
    }

    fn inner(&self) -> &dyn Emulator {
        match self {
            Core::Chip8(chip8) => &**chip8,
            Core::GameBoy(gb) => &**gb,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Emulator {
        match self {
            Core::Chip8(chip8) => &mut **chip8,
            Core::GameBoy(gb) => &mut **gb,
        }
    }

    /// Current picture as packed RGB24, whatever the core's native layout.
    pub fn frame_rgb24(&self) -> Vec<u8> {
        match self {
            Core::Chip8(chip8) => chip8
                .framebuffer()
                .iter()
                .flat_map(|&pixel| {
                    let color = if pixel != 0 { Color::BLACK } else { Color::WHITE };
                    [color.r, color.g, color.b]
                })
                .collect(),
            Core::GameBoy(gb) => gb
                .framebuffer()
                .chunks_exact(4)
                .flat_map(|rgba| [rgba[0], rgba[1], rgba[2]])
                .collect(),
        }
    }
}

impl Emulator for Core {
    fn load_rom(&mut self, rom: &[u8]) -> Result<(), LoadError> {
        self.inner_mut().load_rom(rom)
    }

    fn load_rom_file(&mut self, path: &Path) -> Result<(), LoadError> {
        self.inner_mut().load_rom_file(path)
    }

    fn reset(&mut self) {
        self.inner_mut().reset()
    }

    fn step(&mut self) {
        self.inner_mut().step()
    }

    fn run_frame(&mut self) {
        self.inner_mut().run_frame()
    }

    fn framebuffer(&self) -> &[u8] {
        self.inner().framebuffer()
    }

    fn screen_width(&self) -> usize {
        self.inner().screen_width()
    }

    fn screen_height(&self) -> usize {
        self.inner().screen_height()
    }

    fn set_button(&mut self, index: usize, pressed: bool) {
        self.inner_mut().set_button(index, pressed)
    }

    fn arch_name(&self) -> &'static str {
        self.inner().arch_name()
    }

    fn memory(&self) -> &[u8] {
        self.inner().memory()
    }

    fn pc(&self) -> u16 {
        self.inner().pc()
    }
}

/// Settings for a headless run.
#[derive(Debug, Clone, TypedBuilder)]
pub struct RunConfig {
    pub arch: Arch,
    #[builder(setter(into))]
    pub rom_path: PathBuf,
    /// Game Boy only.
    #[builder(default)]
    pub boot_rom_path: Option<PathBuf>,
    #[builder(default = 60)]
    pub frames: u32,
    /// Where to write the final frame as raw RGB24.
    #[builder(default)]
    pub dump_path: Option<PathBuf>,
}

/// Load the configured ROM, run it for `frames` frames and return the core.
pub fn run(config: &RunConfig) -> Result<Core> {
    let mut core = Core::select(config.arch);

    if let Some(boot_path) = &config.boot_rom_path {
        match core.as_game_boy_mut() {
            Some(gb) => {
                let data = std::fs::read(boot_path)
                    .with_context(|| format!("failed to read boot ROM '{}'", boot_path.display()))?;
                gb.load_boot_rom(&data)
                    .with_context(|| format!("invalid boot ROM '{}'", boot_path.display()))?;
            }
            None => log::warn!("Boot ROM ignored for {}", config.arch),
        }
    }

    core.load_rom_file(&config.rom_path)
        .with_context(|| format!("failed to load ROM '{}'", config.rom_path.display()))?;

    for _ in 0..config.frames {
        core.run_frame();
    }
    log::info!(
        "{}: ran {} frames, PC={:04X}",
        core.arch_name(),
        config.frames,
        core.pc()
    );

    if let Some(dump_path) = &config.dump_path {
        std::fs::write(dump_path, core.frame_rgb24())
            .with_context(|| format!("failed to write frame dump '{}'", dump_path.display()))?;
        log::info!(
            "Wrote {}x{} RGB24 frame to '{}'",
            core.screen_width(),
            core.screen_height(),
            dump_path.display()
        );
    }

    Ok(core)
}
