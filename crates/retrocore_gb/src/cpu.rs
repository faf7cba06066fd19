mod alu;
mod cb;
mod exec;
mod helpers;
mod regs;

pub use regs::{RegisterPair, Registers};

use crate::interrupts::{InterruptFlags, IE_ADDR, IF_ADDR};

/// Flag bits in the F register.
///
/// Layout (bit index in the byte, from MSB to LSB):
/// - bit 7: Z (zero)
/// - bit 6: N (subtract)
/// - bit 5: H (half carry)
/// - bit 4: C (carry)
/// - bits 0-3 are always zero.
#[derive(Clone, Copy, Debug)]
pub enum Flag {
    Z = 7,
    N = 6,
    H = 5,
    C = 4,
}

/// Abstraction over the Game Boy bus (memory and IO).
///
/// The CPU never touches memory except through this trait; the machine's
/// system bus routes timer and joypad registers to their owners.
pub trait Bus {
    fn read8(&mut self, addr: u16) -> u8;
    fn write8(&mut self, addr: u16, value: u8);

    /// Little-endian: low byte at `addr`, high byte at `addr + 1`.
    fn read16(&mut self, addr: u16) -> u16 {
        let lo = self.read8(addr);
        let hi = self.read8(addr.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    fn write16(&mut self, addr: u16, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.write8(addr, lo);
        self.write8(addr.wrapping_add(1), hi);
    }
}

/// Game Boy CPU core.
///
/// Executes one instruction per `step` and keeps a running T-cycle count
/// that the machine resets at the start of every frame.
#[derive(Clone, Debug)]
pub struct Cpu {
    pub regs: Registers,
    pub ime: bool,
    pub halted: bool,
    /// Set by EI; IME turns on once the following instruction completes.
    ime_enable_pending: bool,
    cycles: u32,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    pub fn new() -> Self {
        let mut cpu = Self {
            regs: Registers::default(),
            ime: false,
            halted: false,
            ime_enable_pending: false,
            cycles: 0,
        };
        cpu.apply_dmg_boot_state();
        cpu
    }

    /// Reset the CPU to the state the DMG boot ROM leaves behind.
    pub fn reset(&mut self) {
        self.reset_for_boot_rom();
        self.apply_dmg_boot_state();
    }

    /// Reset to a cleared register file with PC=0x0000, so that an
    /// installed boot ROM runs first.
    pub fn reset_for_boot_rom(&mut self) {
        self.regs = Registers::default();
        self.ime = false;
        self.halted = false;
        self.ime_enable_pending = false;
        self.cycles = 0;
    }

    /// Post-boot register values (DMG mode), as documented in Pan Docs.
    fn apply_dmg_boot_state(&mut self) {
        self.regs.set_af(0x01B0);
        self.regs.set_bc(0x0013);
        self.regs.set_de(0x00D8);
        self.regs.set_hl(0x014D);
        self.regs.sp = 0xFFFE;
        self.regs.pc = 0x0100;
        self.ime = false;
    }

    /// T-cycles spent since the last `reset_cycles`.
    #[inline]
    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    #[inline]
    pub fn reset_cycles(&mut self) {
        self.cycles = 0;
    }

    /// Interrupts that are both requested (IF) and enabled (IE).
    pub fn pending_interrupts<B: Bus>(&self, bus: &mut B) -> InterruptFlags {
        let ie = bus.read8(IE_ADDR);
        let iflags = bus.read8(IF_ADDR);
        InterruptFlags::from_bits_truncate(ie & iflags)
    }

    /// Execute a single instruction and return the number of T-cycles taken.
    ///
    /// A halted CPU does not fetch; it idles for 4 cycles and wakes up once
    /// an enabled interrupt is requested. Vector dispatch is not performed.
    pub fn step<B: Bus>(&mut self, bus: &mut B) -> u32 {
        if self.halted {
            if !self.pending_interrupts(bus).is_empty() {
                log::trace!("GB CPU: leaving HALT at PC={:04X}", self.regs.pc);
                self.halted = false;
            }
            self.cycles = self.cycles.wrapping_add(4);
            return 4;
        }

        let enable_ime = self.ime_enable_pending;
        let opcode = self.fetch8(bus);
        let cycles = self.exec_opcode(bus, opcode);

        // A DI executed in between cancels the pending enable.
        if enable_ime && self.ime_enable_pending {
            self.ime = true;
            self.ime_enable_pending = false;
        }

        self.cycles = self.cycles.wrapping_add(cycles);
        cycles
    }
}
