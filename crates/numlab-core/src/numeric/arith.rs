//! Arithmetic over the numeric tower.
//!
//! Every binary operation first promotes both operands to
//! [`NumericKind::result_kind`] and then dispatches on that single kind, so
//! the kind of a result never depends on operand values.

use super::{
    ArithOp, BigFloat, Complex, MAX_EXACT_BITS, NumericError, NumericKind, NumericResult, Value,
    convert,
};
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{Float, Signed, ToPrimitive, Zero};

/// Apply `op` to `lhs` and `rhs` after promotion
pub fn binary(op: ArithOp, lhs: &Value, rhs: &Value) -> NumericResult<Value> {
    let target = NumericKind::result_kind(op, &lhs.kind(), &rhs.kind());
    let lhs = convert(lhs, &target)?;
    let rhs = convert(rhs, &target)?;
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => int_op(op, a, b).map(Value::Int),
        (Value::BigInt(a), Value::BigInt(b)) => bigint_op(op, &a, &b).map(Value::BigInt),
        (Value::Rational(a), Value::Rational(b)) => rational_op(op, &a, &b).map(Value::Rational),
        (Value::Float32(a), Value::Float32(b)) => Ok(Value::Float32(float_op(op, a, b))),
        (Value::Float64(a), Value::Float64(b)) => Ok(Value::Float64(float_op(op, a, b))),
        (Value::BigFloat(a), Value::BigFloat(b)) => {
            let precision = target.precision().unwrap_or_else(|| a.precision());
            bigfloat_op(op, &a, &b, precision).map(Value::BigFloat)
        }
        (Value::Complex(a), Value::Complex(b)) => {
            complex_op(op, &a, &b).map(|complex| Value::Complex(Box::new(complex)))
        }
        (lhs, rhs) => Err(NumericError::Domain(format!(
            "operands {} and {} did not promote to a common kind",
            lhs.kind(),
            rhs.kind()
        ))),
    }
}

/// Additive inverse. Int negation wraps like the other Int operations.
pub fn negate(value: &Value) -> Value {
    match value {
        Value::Int(v) => Value::Int(v.wrapping_neg()),
        Value::BigInt(v) => Value::BigInt(-v),
        Value::Rational(v) => Value::Rational(-v),
        Value::Float32(v) => Value::Float32(-v),
        Value::Float64(v) => Value::Float64(-v),
        Value::BigFloat(v) => Value::BigFloat(v.neg()),
        Value::Complex(v) => Value::Complex(Box::new(Complex::from_parts(
            negate(v.re()),
            negate(v.im()),
        ))),
    }
}

fn int_op(op: ArithOp, a: i64, b: i64) -> NumericResult<i64> {
    match op {
        ArithOp::Add => Ok(a.wrapping_add(b)),
        ArithOp::Sub => Ok(a.wrapping_sub(b)),
        ArithOp::Mul => Ok(a.wrapping_mul(b)),
        // Int / Int is promoted to Rational before it gets here
        ArithOp::Div => {
            if b == 0 {
                Err(NumericError::DivisionByZero)
            } else {
                Ok(a.wrapping_div(b))
            }
        }
        ArithOp::Pow => {
            if b < 0 {
                return Err(negative_exponent(&NumericKind::Int, b));
            }
            Ok(wrapping_pow(a, b.unsigned_abs()))
        }
    }
}

fn wrapping_pow(mut base: i64, mut exponent: u64) -> i64 {
    let mut result: i64 = 1;
    while exponent > 0 {
        if exponent & 1 == 1 {
            result = result.wrapping_mul(base);
        }
        exponent >>= 1;
        if exponent > 0 {
            base = base.wrapping_mul(base);
        }
    }
    result
}

fn bigint_op(op: ArithOp, a: &BigInt, b: &BigInt) -> NumericResult<BigInt> {
    match op {
        ArithOp::Add => Ok(a + b),
        ArithOp::Sub => Ok(a - b),
        ArithOp::Mul => Ok(a * b),
        ArithOp::Div => {
            if b.is_zero() {
                Err(NumericError::DivisionByZero)
            } else {
                Ok(a / b)
            }
        }
        ArithOp::Pow => {
            if b.is_negative() {
                return Err(negative_exponent(&NumericKind::BigInt, b));
            }
            Ok(a.pow(exact_exponent(b, a.bits())?))
        }
    }
}

fn rational_op(op: ArithOp, a: &BigRational, b: &BigRational) -> NumericResult<BigRational> {
    match op {
        ArithOp::Add => Ok(a + b),
        ArithOp::Sub => Ok(a - b),
        ArithOp::Mul => Ok(a * b),
        ArithOp::Div => {
            if b.is_zero() {
                Err(NumericError::DivisionByZero)
            } else {
                Ok(a / b)
            }
        }
        ArithOp::Pow => {
            if !b.is_integer() {
                return Err(NumericError::Domain(format!(
                    "Rational exponent {}//{} is not an integer",
                    b.numer(),
                    b.denom()
                )));
            }
            let exponent = b.to_integer();
            let base_bits = a.numer().bits().max(a.denom().bits());
            let magnitude = exact_exponent(&exponent.abs(), base_bits)?;
            let raised = BigRational::new(a.numer().pow(magnitude), a.denom().pow(magnitude));
            if exponent.is_negative() {
                if raised.is_zero() {
                    return Err(NumericError::DivisionByZero);
                }
                Ok(raised.recip())
            } else {
                Ok(raised)
            }
        }
    }
}

/// Exponent for an exact power of a base with `base_bits` significant bits.
///
/// Results are bounded by [`MAX_EXACT_BITS`]. A base of 0, 1 or -1 never
/// grows, so only the exponent's parity is kept.
fn exact_exponent(exponent: &BigInt, base_bits: u64) -> NumericResult<u32> {
    if exponent.is_zero() {
        return Ok(0);
    }
    if base_bits <= 1 {
        return Ok(if exponent.is_odd() { 1 } else { 2 });
    }
    exponent
        .to_u64()
        .filter(|power| power.saturating_mul(base_bits) <= MAX_EXACT_BITS)
        .and_then(|power| u32::try_from(power).ok())
        .ok_or_else(|| too_large(exponent))
}

fn too_large(exponent: impl std::fmt::Display) -> NumericError {
    NumericError::Domain(format!(
        "result of `^` with exponent {exponent} would exceed {MAX_EXACT_BITS} bits"
    ))
}

/// Significant bits of an exact real that can grow under powers
fn growing_bits(value: &Value) -> Option<u64> {
    match value {
        Value::BigInt(v) => Some(v.bits()),
        Value::Rational(v) => Some(v.numer().bits().max(v.denom().bits())),
        _ => None,
    }
}

fn negative_exponent(kind: &NumericKind, exponent: impl std::fmt::Display) -> NumericError {
    NumericError::Domain(format!(
        "negative exponent {exponent} is not defined for {kind}; convert the base to Rational or a float kind"
    ))
}

/// IEEE semantics: division by zero yields an infinity or NaN
fn float_op<F: Float>(op: ArithOp, a: F, b: F) -> F {
    match op {
        ArithOp::Add => a + b,
        ArithOp::Sub => a - b,
        ArithOp::Mul => a * b,
        ArithOp::Div => a / b,
        ArithOp::Pow => a.powf(b),
    }
}

fn bigfloat_op(op: ArithOp, a: &BigFloat, b: &BigFloat, precision: u32) -> NumericResult<BigFloat> {
    match op {
        ArithOp::Add => Ok(a.add(b, precision)),
        ArithOp::Sub => Ok(a.sub(b, precision)),
        ArithOp::Mul => Ok(a.mul(b, precision)),
        ArithOp::Div => Ok(a.div(b, precision)),
        ArithOp::Pow => {
            if b.is_nan() || a.is_nan() {
                return Ok(BigFloat::nan(precision));
            }
            if !b.is_integer() {
                return Err(NumericError::Domain(format!("BigFloat exponent {b} is not an integer")));
            }
            let exponent = b.to_i64().ok_or_else(|| {
                NumericError::Domain(format!("BigFloat exponent {b} is out of range"))
            })?;
            Ok(a.powi(exponent, precision))
        }
    }
}

fn complex_op(op: ArithOp, a: &Complex, b: &Complex) -> NumericResult<Complex> {
    match op {
        ArithOp::Add => Ok(Complex::from_parts(
            binary(ArithOp::Add, a.re(), b.re())?,
            binary(ArithOp::Add, a.im(), b.im())?,
        )),
        ArithOp::Sub => Ok(Complex::from_parts(
            binary(ArithOp::Sub, a.re(), b.re())?,
            binary(ArithOp::Sub, a.im(), b.im())?,
        )),
        ArithOp::Mul => complex_mul(a, b),
        ArithOp::Div => complex_div(a, b),
        ArithOp::Pow => complex_pow(a, b),
    }
}

fn complex_mul(a: &Complex, b: &Complex) -> NumericResult<Complex> {
    let ac = binary(ArithOp::Mul, a.re(), b.re())?;
    let bd = binary(ArithOp::Mul, a.im(), b.im())?;
    let ad = binary(ArithOp::Mul, a.re(), b.im())?;
    let bc = binary(ArithOp::Mul, a.im(), b.re())?;
    Ok(Complex::from_parts(
        binary(ArithOp::Sub, &ac, &bd)?,
        binary(ArithOp::Add, &ad, &bc)?,
    ))
}

/// `(a + bi) / (c + di) = ((ac + bd) + (bc - ad)i) / (c² + d²)`
fn complex_div(a: &Complex, b: &Complex) -> NumericResult<Complex> {
    let kind = a.re().kind();
    if kind.is_exact() && b.re().is_zero() && b.im().is_zero() {
        return Err(NumericError::DivisionByZero);
    }
    let cc = binary(ArithOp::Mul, b.re(), b.re())?;
    let dd = binary(ArithOp::Mul, b.im(), b.im())?;
    let denominator = binary(ArithOp::Add, &cc, &dd)?;
    let ac = binary(ArithOp::Mul, a.re(), b.re())?;
    let bd = binary(ArithOp::Mul, a.im(), b.im())?;
    let bc = binary(ArithOp::Mul, a.im(), b.re())?;
    let ad = binary(ArithOp::Mul, a.re(), b.im())?;
    let re = binary(ArithOp::Div, &binary(ArithOp::Add, &ac, &bd)?, &denominator)?;
    let im = binary(ArithOp::Div, &binary(ArithOp::Sub, &bc, &ad)?, &denominator)?;
    // division of exact parts is already exact, so the kind is unchanged
    Ok(Complex::from_parts(convert(&re, &kind)?, convert(&im, &kind)?))
}

fn complex_pow(base: &Complex, exponent: &Complex) -> NumericResult<Complex> {
    let kind = base.re().kind();
    let integral = if exponent.im().is_zero() {
        exponent.re().to_integer()
    } else {
        None
    };

    match (integral.as_ref().and_then(ToPrimitive::to_u32), &integral) {
        (Some(power), Some(_)) => complex_powi(base, power, false, &kind),
        (None, Some(whole)) if whole.is_negative() => {
            match (whole.magnitude().to_u32(), kind.is_exact()) {
                (Some(power), _) => complex_powi(base, power, true, &kind),
                (None, true) => Err(too_large(whole)),
                (None, false) => complex_powf(base, exponent, &kind),
            }
        }
        (None, Some(whole)) if kind.is_exact() => Err(too_large(whole)),
        _ => complex_powf(base, exponent, &kind),
    }
}

fn complex_powi(base: &Complex, power: u32, invert: bool, kind: &NumericKind) -> NumericResult<Complex> {
    if invert && matches!(kind, NumericKind::Int | NumericKind::BigInt) {
        return Err(negative_exponent(&NumericKind::complex(kind.clone()), format!("-{power}")));
    }
    if let (Some(re), Some(im)) = (growing_bits(base.re()), growing_bits(base.im())) {
        // |re + im·i| < 2^(max + 1); only 0, ±1 and ±i stay bounded
        let unit = (base.re().is_zero() || base.im().is_zero()) && re.max(im) <= 1;
        if !unit && u64::from(power).saturating_mul(re.max(im) + 1) > MAX_EXACT_BITS {
            return Err(too_large(power));
        }
    }
    let one = || Complex::from_parts(Value::one(kind), Value::zero(kind));
    let mut result = one();
    let mut square = base.clone();
    let mut remaining = power;
    while remaining > 0 {
        if remaining & 1 == 1 {
            result = complex_mul(&result, &square)?;
        }
        remaining >>= 1;
        if remaining > 0 {
            square = complex_mul(&square, &square)?;
        }
    }
    if invert {
        complex_div(&one(), &result)
    } else {
        Ok(result)
    }
}

/// Non-integral powers via the principal branch:
/// `z^w = exp(w · (ln|z| + i·arg z))`
fn complex_powf(base: &Complex, exponent: &Complex, kind: &NumericKind) -> NumericResult<Complex> {
    if !matches!(kind, NumericKind::Float32 | NumericKind::Float64) {
        return Err(NumericError::Domain(format!(
            "non-integer complex exponent is not supported for {}",
            NumericKind::complex(kind.clone())
        )));
    }
    let parts = |value: &Complex| -> NumericResult<(f64, f64)> {
        match (value.re().to_f64(), value.im().to_f64()) {
            (Some(re), Some(im)) => Ok((re, im)),
            _ => Err(NumericError::Domain("complex parts must be real".to_string())),
        }
    };
    let (a, b) = parts(base)?;
    let (c, d) = parts(exponent)?;

    let (re, im) = if a == 0.0 && b == 0.0 {
        if c > 0.0 { (0.0, 0.0) } else { (f64::NAN, f64::NAN) }
    } else {
        let ln_r = a.hypot(b).ln();
        let theta = b.atan2(a);
        let magnitude = (c * ln_r - d * theta).exp();
        let angle = d * ln_r + c * theta;
        (magnitude * angle.cos(), magnitude * angle.sin())
    };
    Ok(Complex::from_parts(
        convert(&Value::Float64(re), kind)?,
        convert(&Value::Float64(im), kind)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rational(n: i64, d: i64) -> Value {
        Value::rational(n, d).expect("non-zero denominator")
    }

    fn complex(re: Value, im: Value) -> Value {
        Value::Complex(Box::new(Complex::from_parts(re, im)))
    }

    #[test]
    fn test_float_arithmetic() {
        let result = binary(ArithOp::Mul, &Value::Float64(4.0), &Value::Float64(0.3));
        assert_eq!(result, Ok(Value::Float64(4.0 * 0.3)));
        let result = binary(ArithOp::Add, &Value::Int(1), &Value::Float32(0.5));
        assert_eq!(result, Ok(Value::Float32(1.5)));
    }

    #[test]
    fn test_integer_division_is_exact() {
        assert_eq!(binary(ArithOp::Div, &Value::Int(3), &Value::Int(4)), Ok(rational(3, 4)));
        assert_eq!(binary(ArithOp::Div, &Value::Int(4), &Value::Int(2)), Ok(rational(2, 1)));
        assert_eq!(
            binary(ArithOp::Div, &Value::Int(1), &Value::Int(0)),
            Err(NumericError::DivisionByZero)
        );
    }

    #[test]
    fn test_float_division_by_zero_is_ieee() {
        assert_eq!(
            binary(ArithOp::Div, &Value::Float64(1.0), &Value::Float64(0.0)),
            Ok(Value::Float64(f64::INFINITY))
        );
        let Ok(Value::Float64(nan)) = binary(ArithOp::Div, &Value::Float64(0.0), &Value::Int(0))
        else {
            panic!("expected Float64");
        };
        assert!(nan.is_nan());
    }

    #[test]
    fn test_int_wraps_on_overflow() {
        assert_eq!(
            binary(ArithOp::Add, &Value::Int(i64::MAX), &Value::Int(1)),
            Ok(Value::Int(i64::MIN))
        );
        assert_eq!(negate(&Value::Int(i64::MIN)), Value::Int(i64::MIN));
        assert_eq!(binary(ArithOp::Pow, &Value::Int(2), &Value::Int(64)), Ok(Value::Int(0)));
    }

    #[test]
    fn test_int_negative_power_is_a_domain_error() {
        assert!(matches!(
            binary(ArithOp::Pow, &Value::Int(2), &Value::Int(-1)),
            Err(NumericError::Domain(_))
        ));
    }

    #[test]
    fn test_bigint_arithmetic() {
        let big = Value::BigInt(BigInt::from(i64::MAX));
        assert_eq!(
            binary(ArithOp::Add, &big, &Value::Int(1)),
            Ok(Value::BigInt(BigInt::from(i64::MAX) + 1))
        );
        assert_eq!(
            binary(ArithOp::Pow, &Value::BigInt(BigInt::from(2)), &Value::Int(100)),
            Ok(Value::BigInt(BigInt::from(1) << 100usize))
        );
    }

    #[test]
    fn test_rational_power() {
        assert_eq!(binary(ArithOp::Pow, &rational(2, 3), &Value::Int(2)), Ok(rational(4, 9)));
        assert_eq!(binary(ArithOp::Pow, &rational(2, 3), &Value::Int(-2)), Ok(rational(9, 4)));
        assert!(matches!(
            binary(ArithOp::Pow, &rational(2, 1), &rational(1, 2)),
            Err(NumericError::Domain(_))
        ));
        assert_eq!(
            binary(ArithOp::Pow, &rational(0, 1), &Value::Int(-1)),
            Err(NumericError::DivisionByZero)
        );
    }

    #[test]
    fn test_exact_power_size_is_bounded() {
        let err = binary(ArithOp::Pow, &rational(2, 1), &Value::Int(100_000_000)).expect_err("too large");
        assert!(matches!(&err, NumericError::Domain(message) if message.contains("would exceed")), "{err}");
        assert!(matches!(
            binary(ArithOp::Pow, &Value::BigInt(BigInt::from(3)), &Value::Int(5_000_000)),
            Err(NumericError::Domain(_))
        ));
        assert!(matches!(
            binary(ArithOp::Pow, &rational(1, 2), &Value::Int(-4_000_000)),
            Err(NumericError::Domain(_))
        ));
        let gaussian = complex(Value::BigInt(BigInt::from(1)), Value::BigInt(BigInt::from(1)));
        assert!(matches!(
            binary(ArithOp::Pow, &gaussian, &Value::Int(10_000_000)),
            Err(NumericError::Domain(_))
        ));
        // Units never grow, whatever the exponent
        let huge = Value::BigInt(BigInt::from(10).pow(30) + 1);
        assert_eq!(binary(ArithOp::Pow, &rational(-1, 1), &huge), Ok(rational(-1, 1)));
        assert_eq!(
            binary(ArithOp::Pow, &Value::BigInt(BigInt::from(1)), &huge),
            Ok(Value::BigInt(BigInt::from(1)))
        );
        assert_eq!(
            binary(ArithOp::Pow, &Value::BigInt(BigInt::from(2)), &Value::Int(1000)),
            Ok(Value::BigInt(BigInt::from(1) << 1000usize))
        );
    }

    #[test]
    fn test_bigfloat_huge_power_is_infinite() {
        let two = Value::BigFloat(BigFloat::from_i64(2, 256));
        let result = binary(ArithOp::Pow, &two, &Value::Int(1_125_899_906_842_624)).expect("power");
        assert_eq!(result.to_string(), "Inf");
        let err = binary(ArithOp::Pow, &two, &Value::Float64(1e300)).expect_err("out of range");
        assert!(err.to_string().contains("out of range"), "{err}");
    }

    #[test]
    fn test_bigfloat_uses_max_precision() {
        let a = Value::BigFloat(BigFloat::from_i64(1, 64));
        let b = Value::BigFloat(BigFloat::from_i64(3, 300));
        let result = binary(ArithOp::Div, &a, &b).expect("division");
        assert_eq!(result.kind(), NumericKind::BigFloat(300));
    }

    #[test]
    fn test_bigfloat_power() {
        let two = Value::BigFloat(BigFloat::from_i64(2, 128));
        let result = binary(ArithOp::Pow, &two, &Value::Int(10)).expect("power");
        assert_eq!(result.to_integer(), Some(BigInt::from(1024)));
        assert!(matches!(
            binary(ArithOp::Pow, &two, &Value::Float64(0.5)),
            Err(NumericError::Domain(_))
        ));
    }

    #[test]
    fn test_complex_multiplication() {
        let i = Value::imaginary(Value::Int(1));
        let squared = binary(ArithOp::Mul, &i, &i).expect("multiply");
        assert_eq!(squared, complex(Value::Int(-1), Value::Int(0)));
    }

    #[test]
    fn test_complex_division() {
        let z = complex(Value::Int(1), Value::Int(1));
        let w = complex(Value::Int(1), Value::Int(-1));
        let quotient = binary(ArithOp::Div, &z, &w).expect("divide");
        assert_eq!(quotient, complex(rational(0, 1), rational(1, 1)));
        let zero = Value::zero(&NumericKind::complex(NumericKind::Int));
        assert_eq!(binary(ArithOp::Div, &z, &zero), Err(NumericError::DivisionByZero));
    }

    #[test]
    fn test_complex_integer_power() {
        let i = Value::imaginary(Value::Int(1));
        assert_eq!(
            binary(ArithOp::Pow, &i, &Value::Int(4)),
            Ok(complex(Value::Int(1), Value::Int(0)))
        );
        let half = complex(rational(1, 2), rational(0, 1));
        assert_eq!(
            binary(ArithOp::Pow, &half, &Value::Int(-2)),
            Ok(complex(rational(4, 1), rational(0, 1)))
        );
    }

    #[test]
    fn test_complex_fractional_power_uses_principal_branch() {
        let minus_one = complex(Value::Float64(-1.0), Value::Float64(0.0));
        let Ok(Value::Complex(root)) = binary(ArithOp::Pow, &minus_one, &Value::Float64(0.5))
        else {
            panic!("expected a complex result");
        };
        let re = root.re().to_f64().expect("real part");
        let im = root.im().to_f64().expect("imaginary part");
        assert!(re.abs() < 1e-15);
        assert!((im - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_result_kind_matches_static_table() {
        let values = [
            Value::Int(3),
            Value::BigInt(BigInt::from(5)),
            rational(1, 2),
            Value::Float32(1.5),
            Value::Float64(2.5),
            Value::BigFloat(BigFloat::from_i64(7, 96)),
            Value::imaginary(Value::Int(2)),
        ];
        for op in [ArithOp::Add, ArithOp::Sub, ArithOp::Mul, ArithOp::Div] {
            for a in &values {
                for b in &values {
                    let result = binary(op, a, b).expect("arithmetic");
                    assert_eq!(
                        result.kind(),
                        NumericKind::result_kind(op, &a.kind(), &b.kind()),
                        "{a} {op} {b}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_negate() {
        assert_eq!(negate(&rational(1, 2)), rational(-1, 2));
        assert_eq!(
            negate(&Value::imaginary(Value::Float64(1.0))),
            complex(Value::Float64(-0.0), Value::Float64(-1.0))
        );
    }
}
