use retrocore_common::LoadError;

use crate::interrupts::InterruptFlags;

use super::{io, BOOT_ROM_SIZE, MEMORY_SIZE};

const ROM_BANK_SIZE: usize = 0x4000;
const RAM_BANK_SIZE: usize = 0x2000;

/// Memory management unit.
///
/// Owns the 64 KiB address space, the cartridge ROM, external cartridge RAM
/// and the optional boot ROM, and decodes every CPU-visible access. Writes
/// below 0x8000 go to the MBC1-style bank controller and never touch memory.
///
/// DIV (FF04) and TAC (FF07) are stored raw here; the system bus routes
/// them to the timer.
pub struct Mmu {
    memory: Vec<u8>,
    rom: Vec<u8>,
    /// External cartridge RAM. Grows, zero-filled, on the first write past
    /// its current end.
    ext_ram: Vec<u8>,
    boot_rom: Option<Vec<u8>>,
    boot_rom_enabled: bool,
    /// Never 0; a write of 0 selects bank 1.
    rom_bank: usize,
    /// 0-3
    ram_bank: usize,
    /// Recorded but not enforced on external RAM accesses.
    ram_enabled: bool,
    /// Recorded but not applied to bank selection.
    banking_mode: u8,
}

impl Default for Mmu {
    fn default() -> Self {
        Self::new()
    }
}

impl Mmu {
    pub fn new() -> Self {
        Self {
            memory: vec![0; MEMORY_SIZE],
            rom: Vec::new(),
            ext_ram: Vec::new(),
            boot_rom: None,
            boot_rom_enabled: false,
            rom_bank: 1,
            ram_bank: 0,
            ram_enabled: false,
            banking_mode: 0,
        }
    }

    /// Clear volatile state. The cartridge and boot ROM stay installed and
    /// the boot ROM overlay is re-enabled if one is present.
    pub fn reset(&mut self) {
        self.memory.fill(0);
        self.ext_ram.clear();
        self.boot_rom_enabled = self.boot_rom.is_some();
        self.rom_bank = 1;
        self.ram_bank = 0;
        self.ram_enabled = false;
        self.banking_mode = 0;
    }

    /// Install a cartridge image. An empty image is rejected and leaves the
    /// current cartridge in place.
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<(), LoadError> {
        if rom.is_empty() {
            log::warn!("GB MMU: rejecting empty ROM image");
            return Err(LoadError::EmptyRom);
        }

        self.rom = rom.to_vec();
        self.reset();
        log::info!(
            "GB MMU: loaded {} byte ROM ({} banks)",
            rom.len(),
            rom.len().div_ceil(ROM_BANK_SIZE)
        );
        Ok(())
    }

    /// Install a boot ROM and map it over 0x0000-0x00FF.
    ///
    /// Anything but exactly 256 bytes is rejected, which also removes any
    /// previously installed boot ROM.
    pub fn load_boot_rom(&mut self, data: &[u8]) -> Result<(), LoadError> {
        if data.len() != BOOT_ROM_SIZE {
            log::warn!(
                "GB MMU: boot ROM must be {} bytes, got {}",
                BOOT_ROM_SIZE,
                data.len()
            );
            self.boot_rom = None;
            self.boot_rom_enabled = false;
            return Err(LoadError::BootRomSize(data.len()));
        }

        self.boot_rom = Some(data.to_vec());
        self.boot_rom_enabled = true;
        log::info!("GB MMU: boot ROM installed");
        Ok(())
    }

    pub fn read(&self, addr: u16) -> u8 {
        let a = addr as usize;
        match addr {
            0x0000..=0x00FF if self.boot_rom_enabled => self
                .boot_rom
                .as_ref()
                .and_then(|boot| boot.get(a).copied())
                .unwrap_or(0xFF),
            0x0000..=0x3FFF => self.rom.get(a).copied().unwrap_or(0xFF),
            0x4000..=0x7FFF => {
                let offset = self.rom_bank * ROM_BANK_SIZE + (a - 0x4000);
                self.rom.get(offset).copied().unwrap_or(0xFF)
            }
            0xA000..=0xBFFF => self
                .ext_ram
                .get(self.ext_ram_offset(addr))
                .copied()
                .unwrap_or(0xFF),
            0xE000..=0xFDFF => self.memory[a - 0x2000],
            0xFEA0..=0xFEFF => 0xFF,
            io::BOOT => {
                if self.boot_rom_enabled {
                    0x00
                } else {
                    0x01
                }
            }
            // VRAM, WRAM, OAM, IO, HRAM and IE.
            _ => self.memory[a],
        }
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        let a = addr as usize;
        match addr {
            0x0000..=0x7FFF => self.handle_mbc_write(addr, value),
            0xA000..=0xBFFF => {
                let offset = self.ext_ram_offset(addr);
                if offset >= self.ext_ram.len() {
                    self.ext_ram.resize(offset + 1, 0);
                }
                self.ext_ram[offset] = value;
            }
            0xE000..=0xFDFF => self.memory[a - 0x2000] = value,
            0xFEA0..=0xFEFF => {}
            io::BOOT => {
                if value != 0 && self.boot_rom_enabled {
                    log::debug!("GB MMU: boot ROM disabled");
                    self.boot_rom_enabled = false;
                }
                self.memory[a] = value;
            }
            _ => self.memory[a] = value,
        }
    }

    /// Low byte at `addr`, high byte at `addr + 1`.
    pub fn read_word(&self, addr: u16) -> u16 {
        u16::from_le_bytes([self.read(addr), self.read(addr.wrapping_add(1))])
    }

    pub fn write_word(&mut self, addr: u16, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.write(addr, lo);
        self.write(addr.wrapping_add(1), hi);
    }

    /// Bank controller registers (basic MBC1 subset).
    pub fn handle_mbc_write(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => self.ram_enabled = (value & 0x0F) == 0x0A,
            0x2000..=0x3FFF => {
                let bank = (value & 0x1F) as usize;
                self.rom_bank = if bank == 0 { 1 } else { bank };
                log::debug!("GB MMU: ROM bank {}", self.rom_bank);
            }
            0x4000..=0x5FFF => {
                self.ram_bank = (value & 0x03) as usize;
                log::debug!("GB MMU: RAM bank {}", self.ram_bank);
            }
            0x6000..=0x7FFF => self.banking_mode = value & 0x01,
            _ => {}
        }
    }

    #[inline]
    fn ext_ram_offset(&self, addr: u16) -> usize {
        self.ram_bank * RAM_BANK_SIZE + (addr as usize - 0xA000)
    }

    /// Set bits in IF.
    pub fn request_interrupt(&mut self, flags: InterruptFlags) {
        let iflags = self.read(io::IF);
        self.write(io::IF, iflags | flags.bits());
    }

    pub fn rom(&self) -> &[u8] {
        &self.rom
    }

    pub fn has_rom(&self) -> bool {
        !self.rom.is_empty()
    }

    pub fn has_boot_rom(&self) -> bool {
        self.boot_rom.is_some()
    }

    pub fn boot_rom_enabled(&self) -> bool {
        self.boot_rom_enabled
    }

    pub fn rom_bank(&self) -> usize {
        self.rom_bank
    }

    pub fn ram_bank(&self) -> usize {
        self.ram_bank
    }

    pub fn ram_enabled(&self) -> bool {
        self.ram_enabled
    }

    pub fn banking_mode(&self) -> u8 {
        self.banking_mode
    }

    pub fn ext_ram(&self) -> &[u8] {
        &self.ext_ram
    }

    /// Flat backing array, for debug memory views. Banked regions are not
    /// reflected here.
    pub fn memory(&self) -> &[u8] {
        &self.memory
    }
}
