/// Header block at 0x0100-0x014F. Images shorter than that have no header.
const HEADER_END: usize = 0x0150;

const TITLE_START: usize = 0x0134;
const TITLE_END: usize = 0x0144;
const CARTRIDGE_TYPE: usize = 0x0147;
const ROM_SIZE: usize = 0x0148;
const RAM_SIZE: usize = 0x0149;
const HEADER_CHECKSUM: usize = 0x014D;

/// Informational view of a cartridge header. Nothing here changes how the
/// MMU maps the image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CartridgeHeader {
    pub title: String,
    pub cartridge_type: u8,
    pub rom_size: u8,
    pub ram_size: u8,
    pub header_checksum: u8,
    computed_checksum: u8,
}

impl CartridgeHeader {
    pub fn parse(rom: &[u8]) -> Option<Self> {
        if rom.len() < HEADER_END {
            return None;
        }

        // Title is NUL padded; non-ASCII bytes are replaced.
        let raw_title = &rom[TITLE_START..TITLE_END];
        let len = raw_title.iter().position(|&b| b == 0).unwrap_or(raw_title.len());
        let title = String::from_utf8_lossy(&raw_title[..len]).trim_end().to_string();

        // Checksum over 0x0134-0x014C.
        let computed_checksum = rom[TITLE_START..HEADER_CHECKSUM]
            .iter()
            .fold(0u8, |acc, &b| acc.wrapping_sub(b).wrapping_sub(1));

        Some(Self {
            title,
            cartridge_type: rom[CARTRIDGE_TYPE],
            rom_size: rom[ROM_SIZE],
            ram_size: rom[RAM_SIZE],
            header_checksum: rom[HEADER_CHECKSUM],
            computed_checksum,
        })
    }

    pub fn checksum_valid(&self) -> bool {
        self.computed_checksum == self.header_checksum
    }

    /// ROM size in bytes, from byte 0x0148 (32 KiB << n).
    pub fn rom_size_bytes(&self) -> Option<usize> {
        (self.rom_size <= 8).then(|| 0x8000 << self.rom_size)
    }

    /// External RAM size in bytes, from byte 0x0149.
    pub fn ram_size_bytes(&self) -> Option<usize> {
        const KIB: usize = 1024;
        match self.ram_size {
            0x00 | 0x01 => Some(0),
            0x02 => Some(8 * KIB),
            0x03 => Some(32 * KIB),
            0x04 => Some(128 * KIB),
            0x05 => Some(64 * KIB),
            _ => None,
        }
    }

    pub fn mapper_name(&self) -> &'static str {
        match self.cartridge_type {
            0x00 => "ROM ONLY",
            0x01..=0x03 => "MBC1",
            0x05 | 0x06 => "MBC2",
            0x0F..=0x13 => "MBC3",
            0x19..=0x1E => "MBC5",
            _ => "unknown",
        }
    }
}
