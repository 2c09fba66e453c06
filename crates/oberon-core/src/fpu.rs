//! Bit-exact floating-point unit.
//!
//! Operands use the binary32 layout (1 sign, 8 exponent, 23 mantissa bits)
//! but no encodings are reserved: there are no infinities, NaNs or
//! subnormals, and an exponent field of zero reads as zero in `FML`/`FDV`.
//! Nothing here goes through a host float type.

#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]

const SIGN: u32 = 0x8000_0000;
const EXPONENT_MAX: u32 = 0x7F80_0000;
const MANTISSA: u32 = 0x007F_FFFF;
const HIDDEN: u32 = 0x0080_0000;
const BIAS: i32 = 127;

const fn exponent(x: u32) -> u32 {
    (x >> 23) & 0xFF
}

const fn shift_right_clamped(value: i32, shift: u32) -> i32 {
    if shift > 31 {
        value >> 31
    } else {
        value >> shift
    }
}

/// Floating add (`FAD`), also used for `FSB` with the sign of `y` flipped.
///
/// With `u` set the left operand is a 24-bit two's-complement integer that is
/// converted to float (`FLT` idiom, `y = 2^23`). With `v` set the right
/// operand has no hidden bit and the raw working sum is returned as an
/// integer (`FLOOR` idiom, `y = 2^23`).
#[must_use]
pub const fn fp_add(x: u32, y: u32, u: bool, v: bool) -> u32 {
    let xs = x >> 31;
    let (xe, x0) = if u {
        (150, (((x & 0x00FF_FFFF) << 8) as i32) >> 7)
    } else {
        let xm = ((x & MANTISSA) << 1) | 0x0100_0000;
        let x0 = xm as i32;
        (exponent(x), if xs != 0 { -x0 } else { x0 })
    };

    let ys = y >> 31;
    let ye = exponent(y);
    let mut ym = (y & MANTISSA) << 1;
    if !u && !v {
        ym |= 0x0100_0000;
    }
    let y0 = if ys != 0 { -(ym as i32) } else { ym as i32 };

    let (e0, x3, y3) = if ye > xe {
        (ye, shift_right_clamped(x0, ye - xe), y0)
    } else {
        (xe, x0, shift_right_clamped(y0, xe - ye))
    };

    let sum = ((xs << 26) | (xs << 25) | (x3 as u32 & 0x01FF_FFFF))
        .wrapping_add((ys << 26) | (ys << 25) | (y3 as u32 & 0x01FF_FFFF));

    let magnitude = if sum & (1 << 26) != 0 {
        sum.wrapping_neg()
    } else {
        sum
    };
    let s = magnitude.wrapping_add(1) & 0x07FF_FFFF;

    let mut e1 = e0 + 1;
    let mut t3 = s >> 1;
    if s & 0x03FF_FFFC != 0 {
        while t3 & (1 << 24) == 0 {
            t3 <<= 1;
            e1 = e1.wrapping_sub(1);
        }
    } else {
        t3 <<= 24;
        e1 = e1.wrapping_sub(24);
    }

    if v {
        ((sum << 5) as i32 >> 6) as u32
    } else if x & !SIGN == 0 {
        if u {
            0
        } else {
            y
        }
    } else if y & !SIGN == 0 {
        x
    } else if t3 & 0x01FF_FFFF == 0 || e1 & 0x100 != 0 {
        0
    } else {
        ((sum & 0x0400_0000) << 5) | (e1 << 23) | ((t3 >> 1) & MANTISSA)
    }
}

/// Packs a rounded 24-bit significand, handling the rounding carry and range.
const fn pack(sign: u32, mut exp: i32, mut mant: u64) -> u32 {
    if mant & (1 << 24) != 0 {
        mant >>= 1;
        exp += 1;
    }
    if exp <= 0 {
        0
    } else if exp >= 255 {
        sign | EXPONENT_MAX | (mant as u32 & MANTISSA)
    } else {
        sign | ((exp as u32) << 23) | (mant as u32 & MANTISSA)
    }
}

/// Floating multiply (`FML`), rounding half up to 24 significant bits.
///
/// A zero exponent field on either side yields `0`; results below the
/// smallest exponent flush to `0`; results above the largest saturate the
/// exponent field.
#[must_use]
pub const fn fp_mul(x: u32, y: u32) -> u32 {
    let sign = (x ^ y) & SIGN;
    let xe = exponent(x);
    let ye = exponent(y);
    if xe == 0 || ye == 0 {
        return 0;
    }

    let product = ((x & MANTISSA) | HIDDEN) as u64 * ((y & MANTISSA) | HIDDEN) as u64;
    let mut exp = xe as i32 + ye as i32 - BIAS;
    let (mant, round) = if product & (1 << 47) != 0 {
        exp += 1;
        (product >> 24, (product >> 23) & 1)
    } else {
        (product >> 23, (product >> 22) & 1)
    };
    pack(sign, exp, mant + round)
}

/// Floating divide (`FDV`) by restoring long division, rounding half up.
///
/// A zero dividend yields `0`; a zero divisor yields the signed saturated
/// exponent with an empty mantissa.
#[must_use]
pub const fn fp_div(x: u32, y: u32) -> u32 {
    let sign = (x ^ y) & SIGN;
    let xe = exponent(x);
    let ye = exponent(y);
    if xe == 0 {
        return 0;
    }
    if ye == 0 {
        return sign | EXPONENT_MAX;
    }

    let divisor = ((y & MANTISSA) | HIDDEN) as u64;
    let mut remainder = ((x & MANTISSA) | HIDDEN) as u64;
    let mut quotient = 0_u64;
    let mut bit = 0;
    while bit < 26 {
        quotient <<= 1;
        if remainder >= divisor {
            remainder -= divisor;
            quotient |= 1;
        }
        remainder <<= 1;
        bit += 1;
    }

    // quotient = floor(xm * 2^25 / ym), in [2^24, 2^26)
    let mut exp = xe as i32 - ye as i32 + BIAS - 1;
    let (mant, round) = if quotient & (1 << 25) != 0 {
        exp += 1;
        (quotient >> 2, (quotient >> 1) & 1)
    } else {
        (quotient >> 1, quotient & 1)
    };
    pack(sign, exp, mant + round)
}

#[cfg(test)]
mod tests {
    use super::{fp_add, fp_div, fp_mul};

    const ONE: u32 = 0x3F80_0000;
    const TWO_POW_23: u32 = 0x4B00_0000;

    #[test]
    fn add_simple_values() {
        assert_eq!(fp_add(ONE, ONE, false, false), 0x4000_0000);
        assert_eq!(fp_add(0x3FC0_0000, 0x4010_0000, false, false), 0x4070_0000);
        assert_eq!(fp_add(0x4000_0000, 0xBF00_0000, false, false), 0x3FC0_0000);
        assert_eq!(fp_add(0x4040_0000, 0xC040_0000, false, false), 0);
    }

    #[test]
    fn add_zero_operands_short_circuit() {
        assert_eq!(fp_add(0, 0x4000_0000, false, false), 0x4000_0000);
        assert_eq!(fp_add(0x8000_0000, 0xC000_0000, false, false), 0xC000_0000);
        assert_eq!(fp_add(0x4000_0000, 0, false, false), 0x4000_0000);
        assert_eq!(fp_add(0, 0x4000_0000, true, false), 0);
    }

    #[test]
    fn integer_to_float_conversion() {
        assert_eq!(fp_add(5, TWO_POW_23, true, false), 0x40A0_0000);
        assert_eq!(fp_add((-5_i32) as u32, TWO_POW_23, true, false), 0xC0A0_0000);
    }

    #[test]
    fn float_to_integer_floors() {
        assert_eq!(fp_add(0x40A0_0000, TWO_POW_23, false, true), 5);
        assert_eq!(fp_add(0x40B0_0000, TWO_POW_23, false, true), 5);
        assert_eq!(fp_add(0xC0B0_0000, TWO_POW_23, false, true), (-6_i32) as u32);
        assert_eq!(fp_add(0xC0A0_0000, TWO_POW_23, false, true), (-5_i32) as u32);
        assert_eq!(fp_add(0x3E80_0000, TWO_POW_23, false, true), 0);
    }

    #[test]
    fn multiply_rounds_and_normalizes() {
        assert_eq!(fp_mul(0x3FC0_0000, 0x4000_0000), 0x4040_0000);
        assert_eq!(fp_mul(0x3F80_0001, 0x3F80_0001), 0x3F80_0002);
        assert_eq!(fp_mul(0xC040_0000, 0x3F00_0000), 0xBFC0_0000);
    }

    #[test]
    fn multiply_zero_exponent_is_zero() {
        assert_eq!(fp_mul(0, ONE), 0);
        assert_eq!(fp_mul(0x8000_0000, ONE), 0);
        assert_eq!(fp_mul(ONE, 0x0000_1234), 0);
    }

    #[test]
    fn multiply_out_of_range() {
        assert_eq!(fp_mul(0x0080_0000, 0x0080_0000), 0);
        assert_eq!(fp_mul(0x7F00_0000, 0x7F00_0000), 0x7F80_0000);
        assert_eq!(fp_mul(0xFF00_0000, 0x7F00_0000), 0xFF80_0000);
    }

    #[test]
    fn divide_rounds_to_nearest() {
        assert_eq!(fp_div(0x4040_0000, 0x4000_0000), 0x3FC0_0000);
        assert_eq!(fp_div(ONE, 0x4040_0000), 0x3EAA_AAAB);
        assert_eq!(fp_div(0xBF80_0000, 0x4080_0000), 0xBE80_0000);
        assert_eq!(fp_div(0x4000_0000, 0x4000_0000), ONE);
    }

    #[test]
    fn divide_by_zero_saturates() {
        assert_eq!(fp_div(ONE, 0), 0x7F80_0000);
        assert_eq!(fp_div(0xBF80_0000, 0), 0xFF80_0000);
        assert_eq!(fp_div(0, 0), 0);
        assert_eq!(fp_div(0, ONE), 0);
    }
}
