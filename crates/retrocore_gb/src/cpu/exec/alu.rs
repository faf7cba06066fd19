use crate::cpu::alu::{self, AluOp};
use crate::cpu::{Bus, Cpu, Flag};

impl Cpu {
    fn apply_to_a(&mut self, op: AluOp, value: u8) {
        let (result, flags) = alu::accumulate(op, self.regs.a(), value, self.regs.f());
        if op.writes_back() {
            self.regs.set_a(result);
        }
        self.regs.set_f(flags);
    }

    /// `0x80-0xBF` take the operand from a register or (HL), `0xC6-0xFE`
    /// from the byte after the opcode.
    pub(super) fn exec_arith<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        let (value, cycles) = if opcode < 0xC0 {
            let src = opcode & 0x07;
            (self.read_reg8(bus, src), if src == 6 { 8 } else { 4 })
        } else {
            debug_assert_eq!(opcode & 0xC7, 0xC6);
            (self.fetch8(bus), 8)
        };
        self.apply_to_a(AluOp::from_opcode(opcode), value);
        cycles
    }

    /// RLCA, RRCA, RLA, RRA: the CB rotates on A with Z forced clear.
    pub(super) fn exec_rotate_a(&mut self, opcode: u8) -> u32 {
        debug_assert!(matches!(opcode, 0x07 | 0x0F | 0x17 | 0x1F));
        let (result, flags) = alu::shift(opcode >> 3, self.regs.a(), self.regs.f());
        self.regs.set_a(result);
        self.regs.set_f(flags & !(1 << Flag::Z as u8));
        4
    }

    pub(super) fn exec_add_hl_rr(&mut self, opcode: u8) -> u32 {
        debug_assert!(matches!(opcode, 0x09 | 0x19 | 0x29 | 0x39));
        let value = self.read_rp(opcode >> 4);
        let (result, flags) = alu::add_hl(self.regs.hl(), value, self.regs.f());
        self.regs.set_hl(result);
        self.regs.set_f(flags);
        8
    }

    /// ADD SP,e8 (0xE8) and LD HL,SP+e8 (0xF8).
    pub(super) fn exec_sp_offset<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        let imm = self.fetch8(bus);
        let (result, flags) = alu::add_sp_offset(self.regs.sp, imm);
        self.regs.set_f(flags);
        if opcode == 0xE8 {
            self.regs.sp = result;
            16
        } else {
            self.regs.set_hl(result);
            12
        }
    }

    /// DAA, CPL, SCF, CCF.
    pub(super) fn exec_accumulator_misc(&mut self, opcode: u8) -> u32 {
        let (a, f) = (self.regs.a(), self.regs.f());
        match opcode {
            0x27 => {
                let (result, flags) = alu::daa(a, f);
                self.regs.set_a(result);
                self.regs.set_f(flags);
            }
            0x2F => {
                let (result, flags) = alu::complement(a, f);
                self.regs.set_a(result);
                self.regs.set_f(flags);
            }
            0x37 => self.regs.set_f(alu::carry_flag(f, false)),
            _ => {
                debug_assert_eq!(opcode, 0x3F);
                self.regs.set_f(alu::carry_flag(f, true));
            }
        }
        4
    }
}
