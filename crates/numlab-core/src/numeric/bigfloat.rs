//! Arbitrary precision binary floating point.
//!
//! A finite value is `mantissa * 2^exponent` with `|mantissa| < 2^precision`.
//! Every operation takes the precision of its result as an explicit argument
//! and rounds to nearest, ties to even. There is no ambient precision.
//!
//! Mantissas are kept odd (trailing zero bits are folded into the exponent),
//! so structurally equal values compare equal.

use super::MAX_EXACT_BITS;
use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::cmp::Ordering;
use std::fmt;

/// Binary exponents beyond this magnitude overflow to infinity or underflow
/// to zero
const MAX_EXPONENT: i64 = 1 << 30;

/// An IEEE binary interchange format
struct Format {
    /// Significand bits, hidden bit included
    precision: i64,
    /// Exponent of the smallest subnormal
    min_exponent: i64,
    /// Values at or above `2^max_top` overflow
    max_top: i64,
}

const BINARY32: Format = Format {
    precision: 24,
    min_exponent: -149,
    max_top: 128,
};

const BINARY64: Format = Format {
    precision: 53,
    min_exponent: -1074,
    max_top: 1024,
};

#[derive(Debug, Clone, PartialEq)]
enum Repr {
    Finite { mantissa: BigInt, exponent: i64 },
    Infinite { negative: bool },
    NaN,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BigFloat {
    repr: Repr,
    precision: u32,
}

impl BigFloat {
    fn finite(mantissa: BigInt, exponent: i64, precision: u32) -> Self {
        let precision = precision.max(1);
        if mantissa.is_zero() {
            return BigFloat::zero(precision);
        }
        let negative = mantissa.is_negative();
        let (magnitude, exponent) = round_magnitude(mantissa.magnitude().clone(), exponent, precision);
        let top = exponent.saturating_add(magnitude.bits() as i64);
        if top > MAX_EXPONENT {
            return BigFloat::infinity(negative, precision);
        }
        if top < -MAX_EXPONENT {
            return BigFloat::zero(precision);
        }
        let sign = if negative { Sign::Minus } else { Sign::Plus };
        BigFloat {
            repr: Repr::Finite {
                mantissa: BigInt::from_biguint(sign, magnitude),
                exponent,
            },
            precision,
        }
    }

    pub fn zero(precision: u32) -> Self {
        BigFloat {
            repr: Repr::Finite {
                mantissa: BigInt::zero(),
                exponent: 0,
            },
            precision: precision.max(1),
        }
    }

    pub fn infinity(negative: bool, precision: u32) -> Self {
        BigFloat {
            repr: Repr::Infinite { negative },
            precision: precision.max(1),
        }
    }

    pub fn nan(precision: u32) -> Self {
        BigFloat {
            repr: Repr::NaN,
            precision: precision.max(1),
        }
    }

    pub fn from_i64(value: i64, precision: u32) -> Self {
        BigFloat::finite(BigInt::from(value), 0, precision)
    }

    pub fn from_bigint(value: &BigInt, precision: u32) -> Self {
        BigFloat::finite(value.clone(), 0, precision)
    }

    pub fn from_f64(value: f64, precision: u32) -> Self {
        if value.is_nan() {
            return BigFloat::nan(precision);
        }
        if value.is_infinite() {
            return BigFloat::infinity(value < 0.0, precision);
        }
        if value == 0.0 {
            return BigFloat::zero(precision);
        }
        let bits = value.to_bits();
        let negative = bits >> 63 == 1;
        let biased = ((bits >> 52) & 0x7ff) as i64;
        let fraction = bits & ((1u64 << 52) - 1);
        let (mantissa, exponent) = if biased == 0 {
            (fraction, -1074)
        } else {
            (fraction | (1u64 << 52), biased - 1075)
        };
        let mut mantissa = BigInt::from(mantissa);
        if negative {
            mantissa = -mantissa;
        }
        BigFloat::finite(mantissa, exponent, precision)
    }

    pub fn from_f32(value: f32, precision: u32) -> Self {
        BigFloat::from_f64(f64::from(value), precision)
    }

    pub fn from_rational(value: &BigRational, precision: u32) -> Self {
        if value.is_integer() {
            return BigFloat::from_bigint(value.numer(), precision);
        }
        let (magnitude, exponent) = quotient(value.numer().magnitude(), value.denom().magnitude(), precision);
        let sign = if value.is_negative() { Sign::Minus } else { Sign::Plus };
        BigFloat::finite(BigInt::from_biguint(sign, magnitude), exponent, precision)
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// The same value rounded to `precision` bits
    pub fn with_precision(&self, precision: u32) -> Self {
        match &self.repr {
            Repr::Finite { mantissa, exponent } => BigFloat::finite(mantissa.clone(), *exponent, precision),
            Repr::Infinite { negative } => BigFloat::infinity(*negative, precision),
            Repr::NaN => BigFloat::nan(precision),
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(&self.repr, Repr::Finite { mantissa, .. } if mantissa.is_zero())
    }

    pub fn is_nan(&self) -> bool {
        matches!(self.repr, Repr::NaN)
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self.repr, Repr::Infinite { .. })
    }

    pub fn is_negative(&self) -> bool {
        match &self.repr {
            Repr::Finite { mantissa, .. } => mantissa.is_negative(),
            Repr::Infinite { negative } => *negative,
            Repr::NaN => false,
        }
    }

    pub fn neg(&self) -> Self {
        match &self.repr {
            Repr::Finite { mantissa, exponent } => BigFloat {
                repr: Repr::Finite {
                    mantissa: -mantissa,
                    exponent: *exponent,
                },
                precision: self.precision,
            },
            Repr::Infinite { negative } => BigFloat::infinity(!negative, self.precision),
            Repr::NaN => self.clone(),
        }
    }

    pub fn add(&self, other: &BigFloat, precision: u32) -> Self {
        match (&self.repr, &other.repr) {
            (Repr::NaN, _) | (_, Repr::NaN) => BigFloat::nan(precision),
            (Repr::Infinite { negative: a }, Repr::Infinite { negative: b }) => {
                if a == b {
                    BigFloat::infinity(*a, precision)
                } else {
                    BigFloat::nan(precision)
                }
            }
            (Repr::Infinite { negative }, _) | (_, Repr::Infinite { negative }) => {
                BigFloat::infinity(*negative, precision)
            }
            (
                Repr::Finite {
                    mantissa: m1,
                    exponent: e1,
                },
                Repr::Finite {
                    mantissa: m2,
                    exponent: e2,
                },
            ) => add_finite(m1, *e1, m2, *e2, precision),
        }
    }

    pub fn sub(&self, other: &BigFloat, precision: u32) -> Self {
        self.add(&other.neg(), precision)
    }

    pub fn mul(&self, other: &BigFloat, precision: u32) -> Self {
        match (&self.repr, &other.repr) {
            (Repr::NaN, _) | (_, Repr::NaN) => BigFloat::nan(precision),
            (Repr::Infinite { .. }, _) | (_, Repr::Infinite { .. }) => {
                if self.is_zero() || other.is_zero() {
                    BigFloat::nan(precision)
                } else {
                    BigFloat::infinity(self.is_negative() != other.is_negative(), precision)
                }
            }
            (
                Repr::Finite {
                    mantissa: m1,
                    exponent: e1,
                },
                Repr::Finite {
                    mantissa: m2,
                    exponent: e2,
                },
            ) => BigFloat::finite(m1 * m2, e1.saturating_add(*e2), precision),
        }
    }

    /// Division following IEEE rules: `x / 0` is a signed infinity, `0 / 0`
    /// is NaN
    pub fn div(&self, other: &BigFloat, precision: u32) -> Self {
        let negative = self.is_negative() != other.is_negative();
        match (&self.repr, &other.repr) {
            (Repr::NaN, _) | (_, Repr::NaN) => BigFloat::nan(precision),
            (Repr::Infinite { .. }, Repr::Infinite { .. }) => BigFloat::nan(precision),
            (Repr::Infinite { .. }, _) => BigFloat::infinity(negative, precision),
            (_, Repr::Infinite { .. }) => BigFloat::zero(precision),
            (
                Repr::Finite {
                    mantissa: m1,
                    exponent: e1,
                },
                Repr::Finite {
                    mantissa: m2,
                    exponent: e2,
                },
            ) => {
                if m2.is_zero() {
                    if m1.is_zero() {
                        BigFloat::nan(precision)
                    } else {
                        BigFloat::infinity(m1.is_negative(), precision)
                    }
                } else if m1.is_zero() {
                    BigFloat::zero(precision)
                } else {
                    let (magnitude, shift) = quotient(m1.magnitude(), m2.magnitude(), precision);
                    let sign = if negative { Sign::Minus } else { Sign::Plus };
                    BigFloat::finite(
                        BigInt::from_biguint(sign, magnitude),
                        e1.saturating_sub(*e2).saturating_add(shift),
                        precision,
                    )
                }
            }
        }
    }

    /// Integer power by repeated squaring.
    ///
    /// Intermediate products carry 64 guard bits before the final rounding.
    pub fn powi(&self, exponent: i64, precision: u32) -> Self {
        if exponent == 0 {
            return BigFloat::from_i64(1, precision);
        }
        let odd = exponent % 2 != 0;
        match &self.repr {
            Repr::NaN => return BigFloat::nan(precision),
            Repr::Infinite { negative } => {
                return if exponent > 0 {
                    BigFloat::infinity(*negative && odd, precision)
                } else {
                    BigFloat::zero(precision)
                };
            }
            Repr::Finite { mantissa, .. } if mantissa.is_zero() => {
                return if exponent > 0 {
                    BigFloat::zero(precision)
                } else {
                    BigFloat::infinity(false, precision)
                };
            }
            Repr::Finite { .. } => {}
        }

        let working = precision.saturating_add(64);
        let mut remaining = exponent.unsigned_abs();
        let mut base = self.with_precision(working);
        let mut result = BigFloat::from_i64(1, working);
        while remaining > 0 {
            if remaining & 1 == 1 {
                result = result.mul(&base, working);
            }
            remaining >>= 1;
            if remaining > 0 {
                base = base.mul(&base, working);
            }
        }
        if exponent < 0 {
            BigFloat::from_i64(1, working).div(&result, precision)
        } else {
            result.with_precision(precision)
        }
    }

    /// Nearest `f64`, ties to even, with gradual underflow
    pub fn to_f64(&self) -> f64 {
        self.to_format(&BINARY64)
    }

    /// Nearest `f32`, ties to even, with gradual underflow
    pub fn to_f32(&self) -> f32 {
        self.to_format(&BINARY32) as f32
    }

    fn to_format(&self, format: &Format) -> f64 {
        match &self.repr {
            Repr::NaN => f64::NAN,
            Repr::Infinite { negative: true } => f64::NEG_INFINITY,
            Repr::Infinite { negative: false } => f64::INFINITY,
            Repr::Finite { mantissa, .. } if mantissa.is_zero() => 0.0,
            Repr::Finite { mantissa, exponent } => {
                let value = round_to_format(mantissa.magnitude(), *exponent, format);
                if mantissa.is_negative() { -value } else { value }
            }
        }
    }

    /// Exact rational value; `None` for infinities, NaN, and values whose
    /// numerator or denominator would exceed [`MAX_EXACT_BITS`]
    pub fn to_rational(&self) -> Option<BigRational> {
        match &self.repr {
            Repr::Finite { mantissa, .. } if mantissa.is_zero() => Some(BigRational::zero()),
            Repr::Finite { mantissa, exponent } => {
                if *exponent >= 0 {
                    self.to_bigint().map(BigRational::from_integer)
                } else if exponent.unsigned_abs() > MAX_EXACT_BITS {
                    None
                } else {
                    let denominator = BigInt::one() << (exponent.unsigned_abs() as usize);
                    Some(BigRational::new(mantissa.clone(), denominator))
                }
            }
            _ => None,
        }
    }

    /// Exact integer value; `None` unless finite, integral and within
    /// [`MAX_EXACT_BITS`]
    pub fn to_bigint(&self) -> Option<BigInt> {
        match &self.repr {
            Repr::Finite { mantissa, .. } if mantissa.is_zero() => Some(BigInt::zero()),
            Repr::Finite { mantissa, exponent } if *exponent >= 0 => {
                let bits = mantissa.bits().saturating_add(exponent.unsigned_abs());
                (bits <= MAX_EXACT_BITS).then(|| mantissa << (*exponent as usize))
            }
            _ => None,
        }
    }

    /// Exact `i64` value, if the number is an integer in range
    pub fn to_i64(&self) -> Option<i64> {
        match &self.repr {
            Repr::Finite { mantissa, .. } if mantissa.is_zero() => Some(0),
            Repr::Finite { mantissa, exponent } if (0..64).contains(exponent) => {
                (mantissa << (*exponent as usize)).to_i64()
            }
            _ => None,
        }
    }

    /// Finite with no fractional part. Odd mantissas make this a sign
    /// check on the exponent.
    pub fn is_integer(&self) -> bool {
        match &self.repr {
            Repr::Finite { mantissa, exponent } => mantissa.is_zero() || *exponent >= 0,
            _ => false,
        }
    }

    /// Significant decimal digits shown for this precision
    fn display_digits(&self) -> usize {
        (f64::from(self.precision) * std::f64::consts::LOG10_2).ceil() as usize + 1
    }
}

/// Round `magnitude * 2^exponent` to `precision` bits and strip trailing zeros
fn round_magnitude(mut magnitude: BigUint, mut exponent: i64, precision: u32) -> (BigUint, i64) {
    let bits = magnitude.bits();
    let precision = u64::from(precision);
    if bits > precision {
        let shift = (bits - precision) as usize;
        let half = BigUint::one() << (shift - 1);
        let mask = (BigUint::one() << shift) - BigUint::one();
        let remainder = &magnitude & &mask;
        magnitude >>= shift;
        exponent = exponent.saturating_add(shift as i64);
        let round_up = match remainder.cmp(&half) {
            Ordering::Greater => true,
            Ordering::Equal => magnitude.is_odd(),
            Ordering::Less => false,
        };
        if round_up {
            magnitude += 1u32;
            if magnitude.bits() > precision {
                magnitude >>= 1usize;
                exponent = exponent.saturating_add(1);
            }
        }
    }
    if let Some(zeros) = magnitude.trailing_zeros()
        && zeros > 0
    {
        magnitude >>= zeros as usize;
        exponent = exponent.saturating_add(zeros as i64);
    }
    (magnitude, exponent)
}

/// `numerator / denominator` with at least `precision + 2` quotient bits and
/// a sticky bit for any remainder, as `(magnitude, exponent)`
fn quotient(numerator: &BigUint, denominator: &BigUint, precision: u32) -> (BigUint, i64) {
    let wanted = i64::from(precision) + 2 + denominator.bits() as i64 - numerator.bits() as i64;
    let shift = wanted.max(0) as usize;
    let (mut q, r) = (numerator << shift).div_rem(denominator);
    let mut exponent = -(shift as i64);
    if !r.is_zero() {
        q = (q << 1usize) + BigUint::one();
        exponent -= 1;
    }
    (q, exponent)
}

fn add_finite(m1: &BigInt, e1: i64, m2: &BigInt, e2: i64, precision: u32) -> BigFloat {
    if m1.is_zero() {
        return BigFloat::finite(m2.clone(), e2, precision);
    }
    if m2.is_zero() {
        return BigFloat::finite(m1.clone(), e1, precision);
    }
    // An operand lying entirely below the rounding position of the other
    // cannot change the rounded sum.
    let top1 = e1.saturating_add(m1.bits() as i64);
    let top2 = e2.saturating_add(m2.bits() as i64);
    let guard = i64::from(precision) + 2;
    if top2 < top1.saturating_sub(guard) {
        return BigFloat::finite(m1.clone(), e1, precision);
    }
    if top1 < top2.saturating_sub(guard) {
        return BigFloat::finite(m2.clone(), e2, precision);
    }
    let exponent = e1.min(e2);
    let a = m1 << ((e1 - exponent) as usize);
    let b = m2 << ((e2 - exponent) as usize);
    BigFloat::finite(a + b, exponent, precision)
}

/// `value * 2^exponent` in f64 arithmetic, stepping to avoid premature
/// overflow of the scale factor
fn scale(mut value: f64, mut exponent: i64) -> f64 {
    let step = 2f64.powi(1000);
    let inverse_step = 2f64.powi(-1000);
    while exponent > 1000 && value.is_finite() {
        value *= step;
        exponent -= 1000;
    }
    while exponent < -1000 && value != 0.0 {
        value *= inverse_step;
        exponent += 1000;
    }
    value * 2f64.powi(exponent as i32)
}

/// Nearest `f64` to an exact rational, rounded once
pub fn rational_to_f64(value: &BigRational) -> f64 {
    rational_to_format(value, &BINARY64)
}

/// Nearest `f32` to an exact rational, rounded once
pub fn rational_to_f32(value: &BigRational) -> f32 {
    rational_to_format(value, &BINARY32) as f32
}

fn rational_to_format(value: &BigRational, format: &Format) -> f64 {
    if value.is_zero() {
        return 0.0;
    }
    // The sticky bit keeps the single rounding below exact.
    let (magnitude, exponent) = quotient(
        value.numer().magnitude(),
        value.denom().magnitude(),
        format.precision as u32,
    );
    let rounded = round_to_format(&magnitude, exponent, format);
    if value.is_negative() { -rounded } else { rounded }
}

/// Round `magnitude * 2^exponent` to `format`, subnormals included.
///
/// The input is exact or ends in a sticky bit below `format.precision + 1`
/// significant bits. The returned value is exactly representable in `f64`.
fn round_to_format(magnitude: &BigUint, exponent: i64, format: &Format) -> f64 {
    let top = exponent.saturating_add(magnitude.bits() as i64);
    if top > format.max_top {
        return f64::INFINITY;
    }
    // Significand bits left above the smallest subnormal at this magnitude.
    let available = top.saturating_sub(format.min_exponent).min(format.precision);
    if available < 0 {
        return 0.0;
    }
    if available == 0 {
        // Between half the smallest subnormal and the subnormal itself; the
        // exact half ties to even zero.
        return if magnitude.count_ones() == 1 {
            0.0
        } else {
            scale(1.0, format.min_exponent)
        };
    }
    let (rounded, exponent) = round_magnitude(magnitude.clone(), exponent, available as u32);
    if exponent.saturating_add(rounded.bits() as i64) > format.max_top {
        return f64::INFINITY;
    }
    scale(rounded.to_f64().unwrap_or(f64::NAN), exponent)
}

/// Round `magnitude * 2^exponent` to an integer, ties to even
fn round_to_integer(magnitude: BigUint, exponent: i64) -> BigUint {
    if exponent >= 0 {
        return magnitude << (exponent as usize);
    }
    let shift = exponent.unsigned_abs();
    if shift > magnitude.bits() {
        return BigUint::zero();
    }
    let shift = shift as usize;
    let half = BigUint::one() << (shift - 1);
    let remainder = &magnitude & ((BigUint::one() << shift) - 1u32);
    let mut integer = magnitude >> shift;
    match remainder.cmp(&half) {
        Ordering::Greater => integer += 1u32,
        Ordering::Equal if integer.is_odd() => integer += 1u32,
        _ => {}
    }
    integer
}

/// `magnitude * 2^exponent * 10^n` rounded to an integer.
///
/// The power of five is computed with `working` bits; it is exact whenever
/// the product could land on a tie.
fn decimal_scale(magnitude: &BigUint, exponent: i64, n: i64, working: u32) -> Option<BigUint> {
    let five = BigFloat::from_i64(5, working).powi(n.abs(), working);
    let Repr::Finite {
        mantissa: m5,
        exponent: e5,
    } = five.repr
    else {
        return None;
    };
    if n >= 0 {
        let exponent = exponent.saturating_add(n).saturating_add(e5);
        Some(round_to_integer(magnitude * m5.magnitude(), exponent))
    } else {
        let (q, shift) = quotient(magnitude, m5.magnitude(), working);
        let exponent = exponent.saturating_add(n).saturating_sub(e5).saturating_add(shift);
        Some(round_to_integer(q, exponent))
    }
}

impl fmt::Display for BigFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (mantissa, exponent) = match &self.repr {
            Repr::NaN => return write!(f, "NaN"),
            Repr::Infinite { negative: true } => return write!(f, "-Inf"),
            Repr::Infinite { negative: false } => return write!(f, "Inf"),
            Repr::Finite { mantissa, exponent } => (mantissa, *exponent),
        };
        if mantissa.is_zero() {
            return write!(f, "0.0");
        }
        let sign = if mantissa.is_negative() { "-" } else { "" };
        let magnitude = mantissa.magnitude();

        // Decimal exponent estimate from the binary one, corrected below.
        let top = exponent.saturating_add(magnitude.bits() as i64);
        let mut k = ((top - 1) as f64 * std::f64::consts::LOG10_2).floor() as i64;

        let digits = self.display_digits() as i64;
        let working = self.precision.saturating_mul(2).saturating_add(64);
        let lower = BigUint::from(10u32).pow((digits - 1) as u32);
        let upper = &lower * 10u32;
        let mut scaled = BigUint::zero();
        for _ in 0..4 {
            scaled = match decimal_scale(magnitude, exponent, digits - 1 - k, working) {
                Some(scaled) => scaled,
                None => return write!(f, "NaN"),
            };
            if scaled >= upper {
                k += 1;
            } else if scaled < lower {
                k -= 1;
            } else {
                break;
            }
        }
        let text = scaled.to_string();
        let text = text.trim_end_matches('0');
        let (head, tail) = text.split_at(text.len().min(1));

        if (-5..21).contains(&k) {
            if k >= 0 {
                let k = k as usize;
                let integer_len = k + 1;
                if text.len() <= integer_len {
                    write!(f, "{sign}{text}{}.0", "0".repeat(integer_len - text.len()))
                } else {
                    let (integer, fraction) = text.split_at(integer_len);
                    write!(f, "{sign}{integer}.{fraction}")
                }
            } else {
                let zeros = "0".repeat((-k - 1) as usize);
                write!(f, "{sign}0.{zeros}{text}")
            }
        } else {
            let tail = if tail.is_empty() { "0" } else { tail };
            write!(f, "{sign}{head}.{tail}e{k:+}")
        }
    }
}
