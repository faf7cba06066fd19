//! Flag arithmetic. Each function takes its operands and the incoming F
//! value and returns the result together with the new F, so the caller
//! decides where the result lands.

use super::Flag;

/// Operation selected by bits 3-5 of the `0x80-0xBF` and `0xC6-0xFE`
/// arithmetic opcodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum AluOp {
    Add,
    Adc,
    Sub,
    Sbc,
    And,
    Xor,
    Or,
    Cp,
}

impl AluOp {
    pub(super) fn from_opcode(opcode: u8) -> Self {
        match (opcode >> 3) & 0x07 {
            0 => AluOp::Add,
            1 => AluOp::Adc,
            2 => AluOp::Sub,
            3 => AluOp::Sbc,
            4 => AluOp::And,
            5 => AluOp::Xor,
            6 => AluOp::Or,
            _ => AluOp::Cp,
        }
    }

    /// CP only reports flags.
    pub(super) fn writes_back(self) -> bool {
        self != AluOp::Cp
    }
}

#[inline]
const fn mask(flag: Flag) -> u8 {
    1 << flag as u8
}

#[inline]
const fn flag_if(flag: Flag, set: bool) -> u8 {
    if set {
        mask(flag)
    } else {
        0
    }
}

#[inline]
fn carry_bit(f: u8) -> u8 {
    (f & mask(Flag::C) != 0) as u8
}

/// `A op value`.
pub(super) fn accumulate(op: AluOp, a: u8, value: u8, f: u8) -> (u8, u8) {
    match op {
        AluOp::Add | AluOp::Adc => {
            let carry = if op == AluOp::Adc { carry_bit(f) } else { 0 };
            let (partial, c1) = a.overflowing_add(value);
            let (result, c2) = partial.overflowing_add(carry);
            let half = (a & 0x0F) + (value & 0x0F) + carry > 0x0F;
            let flags = flag_if(Flag::Z, result == 0)
                | flag_if(Flag::H, half)
                | flag_if(Flag::C, c1 || c2);
            (result, flags)
        }
        AluOp::Sub | AluOp::Sbc | AluOp::Cp => {
            let borrow = if op == AluOp::Sbc { carry_bit(f) } else { 0 };
            let (partial, b1) = a.overflowing_sub(value);
            let (result, b2) = partial.overflowing_sub(borrow);
            let half = (a & 0x0F) < (value & 0x0F) + borrow;
            let flags = flag_if(Flag::Z, result == 0)
                | mask(Flag::N)
                | flag_if(Flag::H, half)
                | flag_if(Flag::C, b1 || b2);
            (result, flags)
        }
        AluOp::And => {
            let result = a & value;
            (result, flag_if(Flag::Z, result == 0) | mask(Flag::H))
        }
        AluOp::Xor => {
            let result = a ^ value;
            (result, flag_if(Flag::Z, result == 0))
        }
        AluOp::Or => {
            let result = a | value;
            (result, flag_if(Flag::Z, result == 0))
        }
    }
}

/// INC r. C passes through.
pub(super) fn inc(value: u8, f: u8) -> (u8, u8) {
    let result = value.wrapping_add(1);
    let flags = (f & mask(Flag::C))
        | flag_if(Flag::Z, result == 0)
        | flag_if(Flag::H, value & 0x0F == 0x0F);
    (result, flags)
}

/// DEC r. C passes through.
pub(super) fn dec(value: u8, f: u8) -> (u8, u8) {
    let result = value.wrapping_sub(1);
    let flags = (f & mask(Flag::C))
        | flag_if(Flag::Z, result == 0)
        | mask(Flag::N)
        | flag_if(Flag::H, value & 0x0F == 0);
    (result, flags)
}

/// BCD correction of A after an addition (N clear) or subtraction (N set).
pub(super) fn daa(a: u8, f: u8) -> (u8, u8) {
    let subtract = f & mask(Flag::N) != 0;
    let mut carry = f & mask(Flag::C) != 0;
    let mut correction = 0u8;

    if f & mask(Flag::H) != 0 || (!subtract && a & 0x0F > 0x09) {
        correction |= 0x06;
    }
    if carry || (!subtract && a > 0x99) {
        correction |= 0x60;
        carry = true;
    }

    let result = if subtract {
        a.wrapping_sub(correction)
    } else {
        a.wrapping_add(correction)
    };
    let flags = (f & mask(Flag::N)) | flag_if(Flag::Z, result == 0) | flag_if(Flag::C, carry);
    (result, flags)
}

/// CPL: A inverted, N and H set.
pub(super) fn complement(a: u8, f: u8) -> (u8, u8) {
    (!a, f | mask(Flag::N) | mask(Flag::H))
}

/// SCF (`invert == false`) and CCF (`invert == true`). Z is kept.
pub(super) fn carry_flag(f: u8, invert: bool) -> u8 {
    let carry = if invert { f & mask(Flag::C) == 0 } else { true };
    (f & mask(Flag::Z)) | flag_if(Flag::C, carry)
}

/// Rotate and shift family in CB order: RLC, RRC, RL, RR, SLA, SRA, SWAP,
/// SRL. N and H are cleared and C holds the bit shifted out.
pub(super) fn shift(op: u8, value: u8, f: u8) -> (u8, u8) {
    let carry_in = carry_bit(f);
    let high_out = value & 0x80 != 0;
    let low_out = value & 0x01 != 0;
    let (result, carry) = match op & 0x07 {
        0 => (value.rotate_left(1), high_out),
        1 => (value.rotate_right(1), low_out),
        2 => ((value << 1) | carry_in, high_out),
        3 => ((value >> 1) | (carry_in << 7), low_out),
        4 => (value << 1, high_out),
        5 => ((value >> 1) | (value & 0x80), low_out),
        6 => (value.rotate_left(4), false),
        _ => (value >> 1, low_out),
    };
    (result, flag_if(Flag::Z, result == 0) | flag_if(Flag::C, carry))
}

/// BIT n: Z is the complement of the tested bit. C is kept.
pub(super) fn test_bit(bit: u8, value: u8, f: u8) -> u8 {
    (f & mask(Flag::C)) | flag_if(Flag::Z, value & (1 << bit) == 0) | mask(Flag::H)
}

/// ADD HL,rr. Z is kept; H and C are the carries out of bits 11 and 15.
pub(super) fn add_hl(hl: u16, value: u16, f: u8) -> (u16, u8) {
    let (result, carry) = hl.overflowing_add(value);
    let half = (hl & 0x0FFF) + (value & 0x0FFF) > 0x0FFF;
    let flags = (f & mask(Flag::Z)) | flag_if(Flag::H, half) | flag_if(Flag::C, carry);
    (result, flags)
}

/// SP plus a signed immediate, for ADD SP,e8 and LD HL,SP+e8. H and C come
/// from the unsigned addition of the low byte; Z and N are cleared.
pub(super) fn add_sp_offset(sp: u16, imm: u8) -> (u16, u8) {
    let low = sp as u8;
    let half = (low & 0x0F) + (imm & 0x0F) > 0x0F;
    let carry = low.checked_add(imm).is_none();
    let result = sp.wrapping_add(imm as i8 as u16);
    (result, flag_if(Flag::H, half) | flag_if(Flag::C, carry))
}
