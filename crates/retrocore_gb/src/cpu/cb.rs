use super::{alu, Bus, Cpu};

impl Cpu {
    /// Handle CB-prefixed instructions.
    ///
    /// The low 3 bits select the operand (same order as `read_reg8`), bits
    /// 6-7 select the family and bits 3-5 the operation or bit number.
    pub(super) fn step_cb<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let cb = self.fetch8(bus);
        let x = cb >> 6;
        let y = (cb >> 3) & 0x07;
        let z = cb & 0x07;
        let on_hl = z == 6;

        let value = self.read_reg8(bus, z);
        let f = self.regs.f();
        match x {
            0 => {
                let (result, flags) = alu::shift(y, value, f);
                self.write_reg8(bus, z, result);
                self.regs.set_f(flags);
                if on_hl { 16 } else { 8 }
            }
            // BIT y, r
            1 => {
                self.regs.set_f(alu::test_bit(y, value, f));
                if on_hl { 12 } else { 8 }
            }
            // RES y, r
            2 => {
                self.write_reg8(bus, z, value & !(1 << y));
                if on_hl { 16 } else { 8 }
            }
            // SET y, r
            _ => {
                self.write_reg8(bus, z, value | (1 << y));
                if on_hl { 16 } else { 8 }
            }
        }
    }
}
