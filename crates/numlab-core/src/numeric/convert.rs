//! Conversions between numeric kinds.
//!
//! Promotions (towards a higher-ranked kind) never fail: integers widen
//! losslessly, exact values round to the nearest float with ties to even,
//! and reals gain a zero imaginary part. Explicit conversions downwards fail
//! with [`NumericError::Inexact`] when the value has no exact image.

use super::bigfloat::rational_to_f32;
use super::{BigFloat, Complex, NumericError, NumericKind, NumericResult, Value};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::ToPrimitive;

/// Convert `value` to `target`
pub fn convert(value: &Value, target: &NumericKind) -> NumericResult<Value> {
    if value.kind() == *target {
        return Ok(value.clone());
    }
    match (value, target) {
        (Value::Complex(complex), NumericKind::Complex(inner)) => Ok(Value::Complex(Box::new(
            Complex::from_parts(convert(complex.re(), inner)?, convert(complex.im(), inner)?),
        ))),
        (Value::Complex(complex), real) => {
            if complex.im().is_zero() {
                convert(complex.re(), real).map_err(|_| inexact(value, target))
            } else {
                Err(inexact(value, target))
            }
        }
        (real, NumericKind::Complex(inner)) => {
            let re = convert(real, inner)?;
            let im = Value::zero(inner);
            Ok(Value::Complex(Box::new(Complex::from_parts(re, im))))
        }
        (real, target) => convert_real(real, target),
    }
}

fn convert_real(value: &Value, target: &NumericKind) -> NumericResult<Value> {
    let converted = match target {
        NumericKind::Int => value
            .to_integer()
            .and_then(|integer| integer.to_i64())
            .map(Value::Int),
        NumericKind::BigInt => value.to_integer().map(Value::BigInt),
        NumericKind::Rational => to_rational(value).map(Value::Rational),
        NumericKind::Float32 => Some(Value::Float32(to_f32(value))),
        NumericKind::Float64 => value.to_f64().map(Value::Float64),
        NumericKind::BigFloat(precision) => to_bigfloat(value, *precision).map(Value::BigFloat),
        NumericKind::Complex(_) => None,
    };
    converted.ok_or_else(|| inexact(value, target))
}

fn to_rational(value: &Value) -> Option<BigRational> {
    match value {
        Value::Int(v) => Some(BigRational::from_integer(BigInt::from(*v))),
        Value::BigInt(v) => Some(BigRational::from_integer(v.clone())),
        Value::Rational(v) => Some(v.clone()),
        Value::Float32(v) => BigRational::from_float(f64::from(*v)),
        Value::Float64(v) => BigRational::from_float(*v),
        Value::BigFloat(v) => v.to_rational(),
        Value::Complex(_) => None,
    }
}

fn to_f32(value: &Value) -> f32 {
    match value {
        Value::Int(v) => *v as f32,
        Value::BigInt(v) => BigFloat::from_bigint(v, 24).to_f32(),
        Value::Rational(v) => rational_to_f32(v),
        Value::Float32(v) => *v,
        Value::Float64(v) => *v as f32,
        Value::BigFloat(v) => v.to_f32(),
        Value::Complex(_) => f32::NAN,
    }
}

fn to_bigfloat(value: &Value, precision: u32) -> Option<BigFloat> {
    match value {
        Value::Int(v) => Some(BigFloat::from_i64(*v, precision)),
        Value::BigInt(v) => Some(BigFloat::from_bigint(v, precision)),
        Value::Rational(v) => Some(BigFloat::from_rational(v, precision)),
        Value::Float32(v) => Some(BigFloat::from_f32(*v, precision)),
        Value::Float64(v) => Some(BigFloat::from_f64(*v, precision)),
        Value::BigFloat(v) => Some(v.with_precision(precision)),
        Value::Complex(_) => None,
    }
}

fn inexact(value: &Value, target: &NumericKind) -> NumericError {
    NumericError::Inexact {
        value: value.to_string(),
        target: target.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_promotions_are_lossless() {
        let value = Value::Int(i64::MAX);
        assert_eq!(
            convert(&value, &NumericKind::BigInt),
            Ok(Value::BigInt(BigInt::from(i64::MAX)))
        );
        assert_eq!(
            convert(&value, &NumericKind::Rational),
            Ok(Value::Rational(BigRational::from_integer(BigInt::from(i64::MAX))))
        );
    }

    #[test]
    fn test_rational_to_float_rounds_to_nearest() {
        let third = Value::rational(1, 3).expect("rational");
        assert_eq!(convert(&third, &NumericKind::Float64), Ok(Value::Float64(1.0 / 3.0)));
        assert_eq!(convert(&third, &NumericKind::Float32), Ok(Value::Float32(1.0 / 3.0)));
    }

    #[test]
    fn test_real_to_complex_has_zero_imaginary_part() {
        let converted = convert(&Value::Float64(2.5), &NumericKind::complex(NumericKind::Float64));
        let Ok(Value::Complex(complex)) = converted else {
            panic!("expected complex, got {converted:?}");
        };
        assert_eq!(complex.re(), &Value::Float64(2.5));
        assert_eq!(complex.im(), &Value::Float64(0.0));
    }

    #[test]
    fn test_complex_promotes_both_parts() {
        let value = Value::imaginary(Value::Int(3));
        let converted = convert(&value, &NumericKind::complex(NumericKind::BigFloat(128)));
        let Ok(Value::Complex(complex)) = converted else {
            panic!("expected complex");
        };
        assert_eq!(complex.re().kind(), NumericKind::BigFloat(128));
        assert_eq!(complex.im().kind(), NumericKind::BigFloat(128));
    }

    #[test]
    fn test_float_to_bigfloat_keeps_requested_precision() {
        let converted = convert(&Value::Float64(0.1), &NumericKind::BigFloat(300));
        assert_eq!(converted.map(|v| v.kind()), Ok(NumericKind::BigFloat(300)));
    }

    #[test]
    fn test_inexact_downward_conversions_fail() {
        assert!(matches!(
            convert(&Value::Float64(0.5), &NumericKind::Int),
            Err(NumericError::Inexact { .. })
        ));
        assert!(matches!(
            convert(&Value::Float64(f64::NAN), &NumericKind::Rational),
            Err(NumericError::Inexact { .. })
        ));
        let too_big = Value::BigInt(BigInt::from(i64::MAX) + 1);
        assert!(matches!(
            convert(&too_big, &NumericKind::Int),
            Err(NumericError::Inexact { .. })
        ));
        assert!(matches!(
            convert(&Value::imaginary(Value::Int(1)), &NumericKind::Float64),
            Err(NumericError::Inexact { .. })
        ));
    }

    #[test]
    fn test_exact_downward_conversions_succeed() {
        assert_eq!(convert(&Value::Float64(4.0), &NumericKind::Int), Ok(Value::Int(4)));
        assert_eq!(
            convert(&Value::Float64(0.75), &NumericKind::Rational),
            Ok(Value::rational(3, 4).expect("rational"))
        );
        let real_complex = convert(&Value::Int(7), &NumericKind::complex(NumericKind::Int))
            .expect("promotion");
        assert_eq!(convert(&real_complex, &NumericKind::Int), Ok(Value::Int(7)));
    }
}
