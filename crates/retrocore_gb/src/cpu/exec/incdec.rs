use crate::cpu::alu;
use crate::cpu::{Bus, Cpu};

impl Cpu {
    /// INC r (`00rrr100`) and DEC r (`00rrr101`), including (HL).
    pub(super) fn exec_incdec8<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        debug_assert!(opcode < 0x40 && matches!(opcode & 0x07, 4 | 5));
        let reg = (opcode >> 3) & 0x07;
        let value = self.read_reg8(bus, reg);
        let (result, flags) = if opcode & 0x01 == 0 {
            alu::inc(value, self.regs.f())
        } else {
            alu::dec(value, self.regs.f())
        };
        self.write_reg8(bus, reg, result);
        self.regs.set_f(flags);

        if reg == 6 { 12 } else { 4 }
    }

    /// INC rr (`00rr0011`) and DEC rr (`00rr1011`). Flags are untouched.
    pub(super) fn exec_incdec16(&mut self, opcode: u8) -> u32 {
        debug_assert!(opcode < 0x40 && opcode & 0x07 == 3);
        let rp = opcode >> 4;
        let value = self.read_rp(rp);
        let value = if opcode & 0x08 == 0 {
            value.wrapping_add(1)
        } else {
            value.wrapping_sub(1)
        };
        self.write_rp(rp, value);
        8
    }
}
