//! Runtime numeric values.

use super::bigfloat::rational_to_f64;
use super::{BigFloat, NumericKind};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, Zero};
use std::fmt;

/// A numeric value whose payload always matches its kind.
///
/// Rationals are reduced with a positive denominator by construction
/// (`BigRational::new` normalises). BigFloats carry their own precision.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    BigInt(BigInt),
    Rational(BigRational),
    Float32(f32),
    Float64(f64),
    BigFloat(BigFloat),
    Complex(Box<Complex>),
}

/// Real and imaginary parts of the same real kind.
///
/// Only built through [`crate::numeric::convert`] and the arithmetic layer,
/// which promote both parts to a common kind first.
#[derive(Debug, Clone, PartialEq)]
pub struct Complex {
    re: Value,
    im: Value,
}

impl Complex {
    pub(crate) fn from_parts(re: Value, im: Value) -> Self {
        debug_assert_eq!(re.kind(), im.kind());
        debug_assert!(!re.kind().is_complex());
        Complex { re, im }
    }

    pub fn re(&self) -> &Value {
        &self.re
    }

    pub fn im(&self) -> &Value {
        &self.im
    }
}

impl Value {
    pub fn kind(&self) -> NumericKind {
        match self {
            Value::Int(_) => NumericKind::Int,
            Value::BigInt(_) => NumericKind::BigInt,
            Value::Rational(_) => NumericKind::Rational,
            Value::Float32(_) => NumericKind::Float32,
            Value::Float64(_) => NumericKind::Float64,
            Value::BigFloat(value) => NumericKind::BigFloat(value.precision()),
            Value::Complex(value) => NumericKind::complex(value.re.kind()),
        }
    }

    /// Reduced rational `numerator / denominator`; `None` for a zero
    /// denominator
    pub fn rational(numerator: impl Into<BigInt>, denominator: impl Into<BigInt>) -> Option<Value> {
        let denominator = denominator.into();
        if denominator.is_zero() {
            return None;
        }
        Some(Value::Rational(BigRational::new(numerator.into(), denominator)))
    }

    /// Additive identity of a kind
    pub fn zero(kind: &NumericKind) -> Value {
        match kind {
            NumericKind::Int => Value::Int(0),
            NumericKind::BigInt => Value::BigInt(BigInt::zero()),
            NumericKind::Rational => Value::Rational(BigRational::zero()),
            NumericKind::Float32 => Value::Float32(0.0),
            NumericKind::Float64 => Value::Float64(0.0),
            NumericKind::BigFloat(precision) => Value::BigFloat(BigFloat::zero(*precision)),
            NumericKind::Complex(inner) => {
                Value::Complex(Box::new(Complex::from_parts(Value::zero(inner), Value::zero(inner))))
            }
        }
    }

    /// Multiplicative identity of a kind
    pub fn one(kind: &NumericKind) -> Value {
        match kind {
            NumericKind::Int => Value::Int(1),
            NumericKind::BigInt => Value::BigInt(BigInt::from(1)),
            NumericKind::Rational => Value::Rational(BigRational::from_integer(BigInt::from(1))),
            NumericKind::Float32 => Value::Float32(1.0),
            NumericKind::Float64 => Value::Float64(1.0),
            NumericKind::BigFloat(precision) => Value::BigFloat(BigFloat::from_i64(1, *precision)),
            NumericKind::Complex(inner) => {
                Value::Complex(Box::new(Complex::from_parts(Value::one(inner), Value::zero(inner))))
            }
        }
    }

    /// Purely imaginary value `0 + value·im` for a real `value`
    pub fn imaginary(value: Value) -> Value {
        match value {
            Value::Complex(_) => value,
            real => {
                let zero = Value::zero(&real.kind());
                Value::Complex(Box::new(Complex::from_parts(zero, real)))
            }
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Value::Int(value) => *value == 0,
            Value::BigInt(value) => value.is_zero(),
            Value::Rational(value) => value.is_zero(),
            Value::Float32(value) => *value == 0.0,
            Value::Float64(value) => *value == 0.0,
            Value::BigFloat(value) => value.is_zero(),
            Value::Complex(value) => value.re.is_zero() && value.im.is_zero(),
        }
    }

    /// Strictly below zero; false for NaN and complex values
    pub fn is_negative(&self) -> bool {
        match self {
            Value::Int(value) => *value < 0,
            Value::BigInt(value) => value.is_negative(),
            Value::Rational(value) => value.is_negative(),
            Value::Float32(value) => *value < 0.0,
            Value::Float64(value) => *value < 0.0,
            Value::BigFloat(value) => value.is_negative() && !value.is_zero(),
            Value::Complex(_) => false,
        }
    }

    /// Exact integer value of a real, if it has one
    pub fn to_integer(&self) -> Option<BigInt> {
        match self {
            Value::Int(value) => Some(BigInt::from(*value)),
            Value::BigInt(value) => Some(value.clone()),
            Value::Rational(value) if value.is_integer() => Some(value.to_integer()),
            Value::Rational(_) => None,
            Value::Float32(value) => float_to_integer(f64::from(*value)),
            Value::Float64(value) => float_to_integer(*value),
            Value::BigFloat(value) => value.to_bigint(),
            Value::Complex(value) if value.im.is_zero() => value.re.to_integer(),
            Value::Complex(_) => None,
        }
    }

    /// Approximate `f64` of a real value, used where an operation has no
    /// exact counterpart
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Value::Int(value) => Some(*value as f64),
            Value::BigInt(value) => Some(BigFloat::from_bigint(value, 53).to_f64()),
            Value::Rational(value) => Some(rational_to_f64(value)),
            Value::Float32(value) => Some(f64::from(*value)),
            Value::Float64(value) => Some(*value),
            Value::BigFloat(value) => Some(value.to_f64()),
            Value::Complex(_) => None,
        }
    }
}

fn float_to_integer(value: f64) -> Option<BigInt> {
    if value.is_finite() && value.fract() == 0.0 {
        BigFloat::from_f64(value, 64).to_bigint()
    } else {
        None
    }
}

/// Floats always show a decimal point or exponent, like `1.0` and `1e300`
fn write_float(f: &mut fmt::Formatter<'_>, value: f64, text: String) -> fmt::Result {
    if value.is_nan() {
        write!(f, "NaN")
    } else if value.is_infinite() {
        write!(f, "{}", if value < 0.0 { "-Inf" } else { "Inf" })
    } else {
        write!(f, "{text}")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(value) => write!(f, "{value}"),
            Value::BigInt(value) => write!(f, "{value}"),
            Value::Rational(value) => write!(f, "{}//{}", value.numer(), value.denom()),
            Value::Float32(value) => write_float(f, f64::from(*value), format!("{value:?}")),
            Value::Float64(value) => write_float(f, *value, format!("{value:?}")),
            Value::BigFloat(value) => write!(f, "{value}"),
            Value::Complex(value) => {
                let im = &value.im;
                if im.is_negative() {
                    write!(f, "{} - {}im", value.re, super::negate(im))
                } else {
                    write!(f, "{} + {}im", value.re, im)
                }
            }
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float64(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float32(value)
    }
}

impl From<BigInt> for Value {
    fn from(value: BigInt) -> Self {
        Value::BigInt(value)
    }
}

impl From<BigRational> for Value {
    fn from(value: BigRational) -> Self {
        Value::Rational(value)
    }
}

impl From<BigFloat> for Value {
    fn from(value: BigFloat) -> Self {
        Value::BigFloat(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rational_is_reduced_with_positive_denominator() {
        let Some(Value::Rational(value)) = Value::rational(6, -8) else {
            panic!("expected a rational");
        };
        assert_eq!(*value.numer(), BigInt::from(-3));
        assert_eq!(*value.denom(), BigInt::from(4));
        assert!(Value::rational(1, 0).is_none());
    }

    #[test]
    fn test_display_notebook_style() {
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::rational(3, 4).map(|v| v.to_string()), Some("3//4".to_string()));
        assert_eq!(Value::Float64(0.84).to_string(), "0.84");
        assert_eq!(Value::Float64(1.0).to_string(), "1.0");
        assert_eq!(Value::Float32(0.5).to_string(), "0.5");
        assert_eq!(Value::Float64(f64::INFINITY).to_string(), "Inf");
        assert_eq!(Value::Float64(f64::NEG_INFINITY).to_string(), "-Inf");
        assert_eq!(Value::Float64(f64::NAN).to_string(), "NaN");
    }

    #[test]
    fn test_complex_display() {
        let value = Value::Complex(Box::new(Complex::from_parts(Value::Int(1), Value::Int(2))));
        assert_eq!(value.to_string(), "1 + 2im");
        let value = Value::Complex(Box::new(Complex::from_parts(
            Value::Float64(0.5),
            Value::Float64(-1.5),
        )));
        assert_eq!(value.to_string(), "0.5 - 1.5im");
    }

    #[test]
    fn test_kinds() {
        assert_eq!(Value::Int(1).kind(), NumericKind::Int);
        assert_eq!(
            Value::BigFloat(BigFloat::from_i64(1, 128)).kind(),
            NumericKind::BigFloat(128)
        );
        assert_eq!(
            Value::imaginary(Value::Float32(2.0)).kind(),
            NumericKind::complex(NumericKind::Float32)
        );
    }

    #[test]
    fn test_identities() {
        let kind = NumericKind::complex(NumericKind::Rational);
        assert!(Value::zero(&kind).is_zero());
        assert!(!Value::one(&kind).is_zero());
        assert_eq!(Value::one(&NumericKind::Float64), Value::Float64(1.0));
    }

    #[test]
    fn test_to_integer() {
        assert_eq!(Value::Float64(3.0).to_integer(), Some(BigInt::from(3)));
        assert_eq!(Value::Float64(3.5).to_integer(), None);
        assert_eq!(Value::Float64(f64::NAN).to_integer(), None);
        assert_eq!(Value::rational(8, 4).and_then(|v| v.to_integer()), Some(BigInt::from(2)));
    }
}
