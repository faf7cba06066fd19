use super::{Cpu, Flag};

/// A 16-bit register whose high and low bytes can be addressed on their own.
///
/// Byte accessors compose the pair big-endian: the high byte is the first
/// letter of the pair name (A in AF, B in BC, ...).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegisterPair(u16);

impl RegisterPair {
    #[inline]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    #[inline]
    pub const fn get(self) -> u16 {
        self.0
    }

    #[inline]
    pub fn set(&mut self, value: u16) {
        self.0 = value;
    }

    #[inline]
    pub const fn hi(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub const fn lo(self) -> u8 {
        self.0 as u8
    }

    #[inline]
    pub fn set_hi(&mut self, value: u8) {
        self.0 = u16::from_be_bytes([value, self.lo()]);
    }

    #[inline]
    pub fn set_lo(&mut self, value: u8) {
        self.0 = u16::from_be_bytes([self.hi(), value]);
    }
}

/// Registers for the Game Boy CPU (LR35902).
///
/// AF, BC, DE and HL are stored as 16-bit pairs; the 8-bit accessors read
/// and write one half of the pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Registers {
    af: RegisterPair,
    bc: RegisterPair,
    de: RegisterPair,
    hl: RegisterPair,
    pub sp: u16,
    pub pc: u16,
}

macro_rules! byte_accessors {
    ($pair:ident, $hi:ident, $set_hi:ident, $lo:ident, $set_lo:ident) => {
        #[inline]
        pub fn $hi(&self) -> u8 {
            self.$pair.hi()
        }

        #[inline]
        pub fn $set_hi(&mut self, value: u8) {
            self.$pair.set_hi(value);
        }

        #[inline]
        pub fn $lo(&self) -> u8 {
            self.$pair.lo()
        }

        #[inline]
        pub fn $set_lo(&mut self, value: u8) {
            self.$pair.set_lo(value);
        }
    };
}

impl Registers {
    byte_accessors!(bc, b, set_b, c, set_c);
    byte_accessors!(de, d, set_d, e, set_e);
    byte_accessors!(hl, h, set_h, l, set_l);

    #[inline]
    pub fn a(&self) -> u8 {
        self.af.hi()
    }

    #[inline]
    pub fn set_a(&mut self, value: u8) {
        self.af.set_hi(value);
    }

    #[inline]
    pub fn f(&self) -> u8 {
        self.af.lo()
    }

    /// Lower 4 bits of F are always zero.
    #[inline]
    pub fn set_f(&mut self, value: u8) {
        self.af.set_lo(value & 0xF0);
    }

    #[inline]
    pub fn af(&self) -> u16 {
        self.af.get()
    }

    #[inline]
    pub fn set_af(&mut self, value: u16) {
        self.af.set(value & 0xFFF0);
    }

    #[inline]
    pub fn bc(&self) -> u16 {
        self.bc.get()
    }

    #[inline]
    pub fn set_bc(&mut self, value: u16) {
        self.bc.set(value);
    }

    #[inline]
    pub fn de(&self) -> u16 {
        self.de.get()
    }

    #[inline]
    pub fn set_de(&mut self, value: u16) {
        self.de.set(value);
    }

    #[inline]
    pub fn hl(&self) -> u16 {
        self.hl.get()
    }

    #[inline]
    pub fn set_hl(&mut self, value: u16) {
        self.hl.set(value);
    }
}

impl Cpu {
    #[inline]
    pub fn get_flag(&self, flag: Flag) -> bool {
        let bit = flag as u8;
        (self.regs.f() & (1 << bit)) != 0
    }

    #[inline]
    pub fn set_flag(&mut self, flag: Flag, value: bool) {
        let bit = flag as u8;
        let f = self.regs.f();
        if value {
            self.regs.set_f(f | (1 << bit));
        } else {
            self.regs.set_f(f & !(1 << bit));
        }
    }

    #[inline]
    pub fn clear_flags(&mut self) {
        self.regs.set_f(0);
    }
}
