//! Numeric kind descriptors and the static promotion table.

use super::ArithOp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Precision in bits used for `BigFloat` when none is spelled out
pub const DEFAULT_PRECISION: u32 = 256;

/// Kind of a numeric value.
///
/// `Complex` only ever wraps a real kind; use [`NumericKind::complex`] to
/// build one so that nesting is flattened.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumericKind {
    Int,
    BigInt,
    Rational,
    Float32,
    Float64,
    BigFloat(u32),
    Complex(Box<NumericKind>),
}

impl NumericKind {
    /// Complex kind over `inner`'s real part
    pub fn complex(inner: NumericKind) -> NumericKind {
        match inner {
            NumericKind::Complex(real) => NumericKind::Complex(real),
            real => NumericKind::Complex(Box::new(real)),
        }
    }

    /// Position in the total order Int < BigInt < Rational < Float32 <
    /// Float64 < BigFloat < Complex
    pub fn rank(&self) -> u8 {
        match self {
            NumericKind::Int => 0,
            NumericKind::BigInt => 1,
            NumericKind::Rational => 2,
            NumericKind::Float32 => 3,
            NumericKind::Float64 => 4,
            NumericKind::BigFloat(_) => 5,
            NumericKind::Complex(_) => 6,
        }
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, NumericKind::Complex(_))
    }

    /// Kinds with no rounding error
    pub fn is_exact(&self) -> bool {
        match self {
            NumericKind::Int | NumericKind::BigInt | NumericKind::Rational => true,
            NumericKind::Complex(inner) => inner.is_exact(),
            _ => false,
        }
    }

    /// The real kind of each component; `self` for real kinds
    pub fn real(&self) -> &NumericKind {
        match self {
            NumericKind::Complex(inner) => inner,
            real => real,
        }
    }

    /// Bit precision carried by BigFloat kinds (and complex over them)
    pub fn precision(&self) -> Option<u32> {
        match self.real() {
            NumericKind::BigFloat(precision) => Some(*precision),
            _ => None,
        }
    }

    /// Common kind for a mixed-kind binary operation.
    ///
    /// The higher-ranked kind wins. Two BigFloats meet at the larger
    /// precision, and a complex operand lifts the result to the complex kind
    /// over the promoted real parts.
    pub fn promote(a: &NumericKind, b: &NumericKind) -> NumericKind {
        if a.is_complex() || b.is_complex() {
            return NumericKind::complex(promote_real(a.real(), b.real()));
        }
        promote_real(a, b)
    }

    /// Kind produced by `op` applied to operands of kinds `a` and `b`.
    ///
    /// Division in the integer kinds is exact and lands in Rational.
    pub fn result_kind(op: ArithOp, a: &NumericKind, b: &NumericKind) -> NumericKind {
        let promoted = NumericKind::promote(a, b);
        if op != ArithOp::Div {
            return promoted;
        }
        match promoted {
            NumericKind::Int | NumericKind::BigInt => NumericKind::Rational,
            NumericKind::Complex(inner)
                if matches!(*inner, NumericKind::Int | NumericKind::BigInt) =>
            {
                NumericKind::complex(NumericKind::Rational)
            }
            other => other,
        }
    }

    /// Short suffix for instruction names, e.g. `f64` or `cf64`
    pub fn mnemonic(&self) -> String {
        match self {
            NumericKind::Int => "i64".to_string(),
            NumericKind::BigInt => "big".to_string(),
            NumericKind::Rational => "rat".to_string(),
            NumericKind::Float32 => "f32".to_string(),
            NumericKind::Float64 => "f64".to_string(),
            NumericKind::BigFloat(precision) => format!("bf{precision}"),
            NumericKind::Complex(inner) => format!("c{}", inner.mnemonic()),
        }
    }

    /// Spelling accepted by the conversion syntax, e.g. `BigFloat{128}`
    pub fn constructor(&self) -> String {
        match self {
            NumericKind::BigFloat(precision) => format!("BigFloat{{{precision}}}"),
            NumericKind::Complex(inner) => format!("Complex{{{}}}", inner.constructor()),
            other => other.to_string(),
        }
    }
}

fn promote_real(a: &NumericKind, b: &NumericKind) -> NumericKind {
    match (a, b) {
        (NumericKind::BigFloat(p), NumericKind::BigFloat(q)) => NumericKind::BigFloat((*p).max(*q)),
        _ if a.rank() >= b.rank() => a.clone(),
        _ => b.clone(),
    }
}

impl fmt::Display for NumericKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericKind::Int => write!(f, "Int"),
            NumericKind::BigInt => write!(f, "BigInt"),
            NumericKind::Rational => write!(f, "Rational"),
            NumericKind::Float32 => write!(f, "Float32"),
            NumericKind::Float64 => write!(f, "Float64"),
            NumericKind::BigFloat(precision) => write!(f, "BigFloat({precision})"),
            NumericKind::Complex(inner) => write!(f, "Complex({inner})"),
        }
    }
}
