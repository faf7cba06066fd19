use crate::cpu::Bus;

use super::{io, ppu, Joypad, Mmu, Serial, Timer};

/// CPU-facing view of the machine for the duration of one instruction.
///
/// Borrows the MMU together with the peripherals whose registers need side
/// effects on access, so the MMU never holds a reference back to them.
pub struct GameBoyBus<'a> {
    pub mmu: &'a mut Mmu,
    pub timer: &'a mut Timer,
    pub joypad: &'a Joypad,
    pub serial: &'a mut Serial,
}

impl<'a> GameBoyBus<'a> {
    pub fn new(
        mmu: &'a mut Mmu,
        timer: &'a mut Timer,
        joypad: &'a Joypad,
        serial: &'a mut Serial,
    ) -> Self {
        Self {
            mmu,
            timer,
            joypad,
            serial,
        }
    }
}

impl Bus for GameBoyBus<'_> {
    fn read8(&mut self, addr: u16) -> u8 {
        match addr {
            io::DIV => self.timer.div(),
            _ => self.mmu.read(addr),
        }
    }

    fn write8(&mut self, addr: u16, value: u8) {
        match addr {
            io::DIV => self.timer.reset_div(self.mmu),
            io::TAC => self.timer.write_tac(self.mmu, value),
            io::JOYP => {
                // Only the selection bits are writable.
                let current = self.mmu.read(io::JOYP);
                self.mmu.write(io::JOYP, (current & !0x30) | (value & 0x30));
                self.joypad.update(self.mmu);
            }
            io::SC => self.serial.write_sc(self.mmu, value),
            io::STAT => ppu::write_stat(self.mmu, value),
            io::LYC => ppu::write_lyc(self.mmu, value),
            _ => self.mmu.write(addr, value),
        }
    }
}
