//! ALU operations for the Z80.
//!
//! Every function is pure: operands in, result and flags out. Callers decide
//! which of the returned flags reach F, because instruction families that
//! share an operation do not share a flag policy (INC r keeps carry, ADD
//! does not; rotates of A keep S, Z and P/V, CB rotates do not).

#![allow(clippy::cast_possible_truncation)] // Intentional truncation for low byte extraction.

use crate::flags::{CF, HF, NF, PF, SF, XF, YF, ZF, sz53, sz53p};

/// Result of an ALU operation with flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluResult {
    pub value: u8,
    pub flags: u8,
}

/// Add two bytes with optional carry, returning result and flags.
#[must_use]
pub fn add8(a: u8, b: u8, carry: bool) -> AluResult {
    let c = u8::from(carry);
    let wide = u16::from(a) + u16::from(b) + u16::from(c);
    let result = wide as u8;

    let mut flags = sz53(result);
    if (a & 0x0F) + (b & 0x0F) + c > 0x0F {
        flags |= HF;
    }
    // Both operands same sign, result different sign
    if (a ^ b) & 0x80 == 0 && (a ^ result) & 0x80 != 0 {
        flags |= PF;
    }
    if wide > 0xFF {
        flags |= CF;
    }

    AluResult { value: result, flags }
}

/// Subtract two bytes with optional borrow, returning result and flags.
#[must_use]
pub fn sub8(a: u8, b: u8, carry: bool) -> AluResult {
    let c = u8::from(carry);
    let result = a.wrapping_sub(b).wrapping_sub(c);

    let mut flags = sz53(result) | NF;
    // Borrow from bit 4
    if u16::from(a & 0x0F) < u16::from(b & 0x0F) + u16::from(c) {
        flags |= HF;
    }
    // Operands differ in sign, result sign differs from minuend
    if (a ^ b) & 0x80 != 0 && (a ^ result) & 0x80 != 0 {
        flags |= PF;
    }
    if u16::from(a) < u16::from(b) + u16::from(c) {
        flags |= CF;
    }

    AluResult { value: result, flags }
}

#[must_use]
pub fn and8(a: u8, b: u8) -> AluResult {
    let value = a & b;
    AluResult { value, flags: sz53p(value) | HF }
}

#[must_use]
pub fn or8(a: u8, b: u8) -> AluResult {
    let value = a | b;
    AluResult { value, flags: sz53p(value) }
}

#[must_use]
pub fn xor8(a: u8, b: u8) -> AluResult {
    let value = a ^ b;
    AluResult { value, flags: sz53p(value) }
}

/// Compare: subtract without storing. The returned value is `a` unchanged.
#[must_use]
pub fn cp8(a: u8, b: u8) -> AluResult {
    let diff = sub8(a, b, false);
    // For CP, undocumented flags come from the operand, not the result
    AluResult {
        value: a,
        flags: (diff.flags & !(YF | XF)) | (b & (YF | XF)),
    }
}

/// One of the eight accumulator operations selected by bits 5-3 of the
/// opcode: ADD, ADC, SUB, SBC, AND, XOR, OR, CP.
#[must_use]
pub fn alu8(op: u8, a: u8, b: u8, carry: bool) -> AluResult {
    match op & 7 {
        0 => add8(a, b, false),
        1 => add8(a, b, carry),
        2 => sub8(a, b, false),
        3 => sub8(a, b, carry),
        4 => and8(a, b),
        5 => xor8(a, b),
        6 => or8(a, b),
        _ => cp8(a, b),
    }
}

/// NEG: two's complement of A, flagged as `0 - a`.
#[must_use]
pub fn neg8(a: u8) -> AluResult {
    sub8(0, a, false)
}

/// Increment byte. Carry is not part of the result; INC never changes it.
#[must_use]
pub fn inc8(a: u8) -> AluResult {
    let value = a.wrapping_add(1);
    let mut flags = sz53(value);
    if a & 0x0F == 0x0F {
        flags |= HF;
    }
    if a == 0x7F {
        flags |= PF;
    }
    AluResult { value, flags }
}

/// Decrement byte. Carry is not part of the result; DEC never changes it.
#[must_use]
pub fn dec8(a: u8) -> AluResult {
    let value = a.wrapping_sub(1);
    let mut flags = sz53(value) | NF;
    if a & 0x0F == 0x00 {
        flags |= HF;
    }
    if a == 0x80 {
        flags |= PF;
    }
    AluResult { value, flags }
}

/// Decimal adjust A after BCD arithmetic. `f` is the current flag byte.
#[must_use]
pub fn daa(a: u8, f: u8) -> AluResult {
    let subtract = f & NF != 0;
    let mut correction = 0u8;
    let mut carry = f & CF != 0;

    if f & HF != 0 || a & 0x0F > 9 {
        correction |= 0x06;
    }
    if carry || a > 0x99 {
        correction |= 0x60;
        carry = true;
    }

    let value = if subtract {
        a.wrapping_sub(correction)
    } else {
        a.wrapping_add(correction)
    };
    let half = if subtract {
        f & HF != 0 && a & 0x0F < 6
    } else {
        a & 0x0F > 9
    };

    let mut flags = sz53p(value) | (f & NF);
    if half {
        flags |= HF;
    }
    if carry {
        flags |= CF;
    }
    AluResult { value, flags }
}

/// Build the flags of a CB-prefixed shift: S, Z, P from the result, carry
/// from the bit shifted out, H and N clear.
fn shifted(value: u8, carry_out: u8) -> AluResult {
    let mut flags = sz53p(value);
    if carry_out != 0 {
        flags |= CF;
    }
    AluResult { value, flags }
}

/// Rotate left circular (bit 7 -> carry and bit 0).
#[must_use]
pub fn rlc8(a: u8) -> AluResult {
    shifted(a.rotate_left(1), a >> 7)
}

/// Rotate right circular (bit 0 -> carry and bit 7).
#[must_use]
pub fn rrc8(a: u8) -> AluResult {
    shifted(a.rotate_right(1), a & 1)
}

/// Rotate left through carry.
#[must_use]
pub fn rl8(a: u8, old_carry: bool) -> AluResult {
    shifted((a << 1) | u8::from(old_carry), a >> 7)
}

/// Rotate right through carry.
#[must_use]
pub fn rr8(a: u8, old_carry: bool) -> AluResult {
    shifted((a >> 1) | (u8::from(old_carry) << 7), a & 1)
}

/// Shift left arithmetic (bit 0 = 0).
#[must_use]
pub fn sla8(a: u8) -> AluResult {
    shifted(a << 1, a >> 7)
}

/// Shift right arithmetic (bit 7 preserved).
#[must_use]
pub fn sra8(a: u8) -> AluResult {
    shifted((a >> 1) | (a & 0x80), a & 1)
}

/// Shift left logical (undocumented SLL - bit 0 = 1).
#[must_use]
pub fn sll8(a: u8) -> AluResult {
    shifted((a << 1) | 1, a >> 7)
}

/// Shift right logical (bit 7 = 0).
#[must_use]
pub fn srl8(a: u8) -> AluResult {
    shifted(a >> 1, a & 1)
}

/// One of the eight CB shifts selected by bits 5-3 of the opcode.
#[must_use]
pub fn shift8(op: u8, a: u8, carry: bool) -> AluResult {
    match op & 7 {
        0 => rlc8(a),
        1 => rrc8(a),
        2 => rl8(a, carry),
        3 => rr8(a, carry),
        4 => sla8(a),
        5 => sra8(a),
        6 => sll8(a),
        _ => srl8(a),
    }
}

/// The four accumulator rotates (RLCA, RRCA, RLA, RRA) selected by bits 4-3.
///
/// Unlike the CB forms these keep S, Z and P/V from `f` and clear H and N.
#[must_use]
pub fn rotate_a(op: u8, a: u8, f: u8) -> AluResult {
    let carry = f & CF != 0;
    let shifted = match op & 3 {
        0 => rlc8(a),
        1 => rrc8(a),
        2 => rl8(a, carry),
        _ => rr8(a, carry),
    };
    AluResult {
        value: shifted.value,
        flags: (f & (SF | ZF | PF)) | (shifted.value & (YF | XF)) | (shifted.flags & CF),
    }
}

/// Flags after `BIT n, value`. Carry is kept from `f`.
#[must_use]
pub fn bit(n: u8, value: u8, f: u8) -> u8 {
    let tested = value & (1 << (n & 7));
    let mut flags = HF | (f & CF) | (value & (YF | XF));
    if tested == 0 {
        flags |= ZF | PF;
    }
    flags | (tested & SF)
}

/// 16-bit add for HL/IX/IY. Returns H, N (clear), C and the undocumented
/// bits; S, Z and P/V are the caller's to keep.
#[must_use]
pub fn add16(a: u16, b: u16) -> (u16, u8) {
    let wide = u32::from(a) + u32::from(b);
    let result = wide as u16;

    // Undocumented flags from high byte of result
    let mut flags = ((result >> 8) as u8) & (YF | XF);
    // Half-carry from bit 11
    if (a & 0x0FFF) + (b & 0x0FFF) > 0x0FFF {
        flags |= HF;
    }
    if wide > 0xFFFF {
        flags |= CF;
    }

    (result, flags)
}

/// 16-bit add with carry for HL. Sets every flag.
#[must_use]
pub fn adc16(a: u16, b: u16, carry: bool) -> (u16, u8) {
    let c = u16::from(carry);
    let wide = u32::from(a) + u32::from(b) + u32::from(c);
    let result = wide as u16;

    let mut flags = flags16(result);
    if (a & 0x0FFF) + (b & 0x0FFF) + c > 0x0FFF {
        flags |= HF;
    }
    if (a ^ b) & 0x8000 == 0 && (a ^ result) & 0x8000 != 0 {
        flags |= PF;
    }
    if wide > 0xFFFF {
        flags |= CF;
    }

    (result, flags)
}

/// 16-bit subtract with borrow for HL. Sets every flag.
#[must_use]
pub fn sbc16(a: u16, b: u16, carry: bool) -> (u16, u8) {
    let c = u16::from(carry);
    let result = a.wrapping_sub(b).wrapping_sub(c);

    let mut flags = flags16(result) | NF;
    // Borrow from bit 12
    if u32::from(a & 0x0FFF) < u32::from(b & 0x0FFF) + u32::from(c) {
        flags |= HF;
    }
    if (a ^ b) & 0x8000 != 0 && (a ^ result) & 0x8000 != 0 {
        flags |= PF;
    }
    if u32::from(a) < u32::from(b) + u32::from(c) {
        flags |= CF;
    }

    (result, flags)
}

/// S, Z and the undocumented bits of a 16-bit result.
fn flags16(result: u16) -> u8 {
    let hi = (result >> 8) as u8;
    let mut flags = hi & (SF | YF | XF);
    if result == 0 {
        flags |= ZF;
    }
    flags
}
