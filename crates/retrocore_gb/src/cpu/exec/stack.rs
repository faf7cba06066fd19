use crate::cpu::{Bus, Cpu};

impl Cpu {
    /// PUSH rr (`11rr0101`) and POP rr (`11rr0001`). The pair index reads
    /// AF in the slot where the arithmetic opcodes use SP.
    pub(super) fn exec_push_pop<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        debug_assert!(opcode >= 0xC0 && matches!(opcode & 0x0F, 0x01 | 0x05));
        let slot = (opcode >> 4) & 0x03;

        if opcode & 0x04 != 0 {
            let value = match slot {
                3 => self.regs.af(),
                rp => self.read_rp(rp),
            };
            self.push_u16(bus, value);
            16
        } else {
            let value = self.pop_u16(bus);
            match slot {
                3 => self.regs.set_af(value),
                rp => self.write_rp(rp, value),
            }
            12
        }
    }

    /// RST: call to the fixed vector in bits 3-5.
    pub(super) fn exec_rst<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        debug_assert_eq!(opcode & 0xC7, 0xC7);
        let ret = self.regs.pc;
        self.push_u16(bus, ret);
        self.regs.pc = u16::from(opcode & 0x38);
        16
    }

    /// RET (0xC9) and RETI (0xD9). RETI enables interrupts without the EI
    /// delay.
    pub(super) fn exec_return<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        self.regs.pc = self.pop_u16(bus);
        if opcode == 0xD9 {
            self.ime = true;
            self.ime_enable_pending = false;
        }
        16
    }
}
