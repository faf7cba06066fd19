use thiserror::Error;

/// Reasons a ROM or boot ROM image can be rejected.
///
/// A failed load never changes the state of the emulator it was offered to.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("ROM image is empty")]
    EmptyRom,
    #[error("ROM too large: {size} bytes (max: {max})")]
    RomTooLarge { size: usize, max: usize },
    #[error("boot ROM must be exactly 256 bytes, got {0}")]
    BootRomSize(usize),
}
