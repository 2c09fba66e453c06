//! Integer arithmetic-logic operations.
//!
//! Pure functions over 32-bit words. Flag updates other than carry and
//! overflow happen in the register write path, not here.

#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]

/// Sum or difference together with the flags `ADD`/`SUB` produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AluResult {
    /// Wrapped 32-bit result.
    pub value: u32,
    /// Carry out of `ADD`, borrow out of `SUB`.
    pub carry: bool,
    /// Signed overflow.
    pub overflow: bool,
}

/// `b + c + carry_in`.
///
/// Carry is set when the unsigned sum does not fit in 32 bits; overflow when
/// both operands share a sign that the result lacks.
#[must_use]
pub const fn add(b: u32, c: u32, carry_in: bool) -> AluResult {
    let wide = b as u64 + c as u64 + carry_in as u64;
    let value = wide as u32;
    AluResult {
        value,
        carry: wide > u32::MAX as u64,
        overflow: ((b ^ value) & (c ^ value)) >> 31 != 0,
    }
}

/// `b - c - borrow_in`.
///
/// Carry is the borrow: set when the subtrahend plus borrow exceeds the
/// minuend. Overflow is set when the operands differ in sign and the result's
/// sign differs from the minuend's.
#[must_use]
pub const fn sub(b: u32, c: u32, borrow_in: bool) -> AluResult {
    let value = b.wrapping_sub(c).wrapping_sub(borrow_in as u32);
    AluResult {
        value,
        carry: (b as u64) < c as u64 + borrow_in as u64,
        overflow: ((b ^ c) & (b ^ value)) >> 31 != 0,
    }
}

/// Logical shift left by `c & 31`.
#[must_use]
pub const fn lsl(b: u32, c: u32) -> u32 {
    b << (c & 31)
}

/// Arithmetic shift right by `c & 31`.
#[must_use]
pub const fn asr(b: u32, c: u32) -> u32 {
    ((b as i32) >> (c & 31)) as u32
}

/// Rotate right by `c & 31`.
#[must_use]
pub const fn ror(b: u32, c: u32) -> u32 {
    b.rotate_right(c & 31)
}

/// 32x32 to 64-bit multiply, returning `(low, high)` words.
#[must_use]
pub const fn mul(b: u32, c: u32, unsigned: bool) -> (u32, u32) {
    let product = if unsigned {
        b as u64 * c as u64
    } else {
        (b as i32 as i64 * c as i32 as i64) as u64
    };
    (product as u32, (product >> 32) as u32)
}

/// Division returning `(quotient, remainder)`.
///
/// Signed division floors toward negative infinity so the remainder is never
/// negative, and requires a strictly positive divisor. Unsigned division only
/// rejects zero. `None` means the divisor was rejected.
#[must_use]
pub const fn div(b: u32, c: u32, unsigned: bool) -> Option<(u32, u32)> {
    if unsigned {
        if c == 0 {
            return None;
        }
        return Some((b / c, b % c));
    }

    let divisor = c as i32;
    if divisor <= 0 {
        return None;
    }
    let dividend = b as i32;
    let mut quotient = dividend / divisor;
    let mut remainder = dividend % divisor;
    if remainder < 0 {
        quotient -= 1;
        remainder += divisor;
    }
    Some((quotient as u32, remainder as u32))
}
