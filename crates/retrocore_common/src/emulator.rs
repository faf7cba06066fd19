use std::path::Path;

use crate::LoadError;

/// Contract shared by every emulation core.
///
/// A host drives an implementor by loading a ROM, calling `run_frame` at its
/// own frame rate, copying `framebuffer` into a texture and forwarding input
/// through `set_button`.
pub trait Emulator {
    fn load_rom(&mut self, rom: &[u8]) -> Result<(), LoadError>;

    /// Read `path` and hand its bytes to `load_rom`.
    fn load_rom_file(&mut self, path: &Path) -> Result<(), LoadError> {
        let rom = std::fs::read(path)?;
        log::info!("Loading ROM '{}' ({} bytes)", path.display(), rom.len());
        self.load_rom(&rom)
    }

    fn reset(&mut self);

    /// Execute a single instruction.
    fn step(&mut self);

    /// Execute one frame worth of work.
    fn run_frame(&mut self);

    /// Read-only view of the current picture. The byte layout is
    /// architecture specific (one byte per pixel for CHIP-8, RGBA for the
    /// Game Boy).
    fn framebuffer(&self) -> &[u8];
    fn screen_width(&self) -> usize;
    fn screen_height(&self) -> usize;

    fn set_button(&mut self, index: usize, pressed: bool);

    fn arch_name(&self) -> &'static str;

    /// Raw address space, for debug memory views.
    fn memory(&self) -> &[u8];

    fn memory_size(&self) -> usize {
        self.memory().len()
    }

    fn pc(&self) -> u16;
}
