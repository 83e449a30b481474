//! Surface syntax tree for numlab expressions
//!
//! This is the tree the parser produces. It keeps the notation the user
//! wrote (implicit multiplication, parentheses, unary minus); desugaring
//! into the core [`crate::expr::Expression`] removes it.

use crate::numeric::{ArithOp, NumericKind, Value};

mod span;

pub use span::Span;

#[derive(Debug, PartialEq, Clone)]
pub enum Expr {
    Number {
        value: Value,
        span: Option<Span>,
    },
    Identifier {
        name: String,
        span: Option<Span>,
    },
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
        span: Option<Span>,
    },
    /// A numeric literal written directly against a variable or group: `4x`,
    /// `2(x + 1)`
    ImplicitMul {
        coefficient: Box<Expr>,
        operand: Box<Expr>,
        span: Option<Span>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        span: Option<Span>,
    },
    /// Parenthesised expression
    Group {
        inner: Box<Expr>,
        span: Option<Span>,
    },
    /// Explicit conversion such as `Float32(e)` or `BigFloat{128}(e)`
    Convert {
        target: KindSpec,
        operand: Box<Expr>,
        span: Option<Span>,
    },
}

impl Expr {
    /// Get the span of this expression, if available
    pub fn span(&self) -> Option<Span> {
        match self {
            Expr::Number { span, .. } => *span,
            Expr::Identifier { span, .. } => *span,
            Expr::Binary { span, .. } => *span,
            Expr::ImplicitMul { span, .. } => *span,
            Expr::Unary { span, .. } => *span,
            Expr::Group { span, .. } => *span,
            Expr::Convert { span, .. } => *span,
        }
    }
}

/// Binary operators
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Rem,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
            BinaryOp::Rem => "%",
        }
    }

    /// The numeric operation this operator denotes; `None` for operators
    /// the numeric tower does not support
    pub fn arith(&self) -> Option<ArithOp> {
        match self {
            BinaryOp::Add => Some(ArithOp::Add),
            BinaryOp::Sub => Some(ArithOp::Sub),
            BinaryOp::Mul => Some(ArithOp::Mul),
            BinaryOp::Div => Some(ArithOp::Div),
            BinaryOp::Pow => Some(ArithOp::Pow),
            BinaryOp::Rem => None,
        }
    }
}

impl From<ArithOp> for BinaryOp {
    fn from(op: ArithOp) -> Self {
        match op {
            ArithOp::Add => BinaryOp::Add,
            ArithOp::Sub => BinaryOp::Sub,
            ArithOp::Mul => BinaryOp::Mul,
            ArithOp::Div => BinaryOp::Div,
            ArithOp::Pow => BinaryOp::Pow,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum UnaryOp {
    Neg, // -x
}

/// A kind as written in conversion syntax.
///
/// Unlike [`NumericKind`] the BigFloat precision may be left out, and
/// `complex(e)` names "the complex kind over whatever `e` is".
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum KindSpec {
    Int,
    BigInt,
    Rational,
    Float32,
    Float64,
    BigFloat(Option<u32>),
    Complex(Box<KindSpec>),
    /// `complex(e)`: lift the operand's own kind
    ComplexOf,
}

impl KindSpec {
    /// Resolve to a concrete kind, filling in a missing BigFloat precision.
    /// `None` for [`KindSpec::ComplexOf`], whose kind depends on the operand.
    pub fn to_kind(&self, default_precision: u32) -> Option<NumericKind> {
        Some(match self {
            KindSpec::Int => NumericKind::Int,
            KindSpec::BigInt => NumericKind::BigInt,
            KindSpec::Rational => NumericKind::Rational,
            KindSpec::Float32 => NumericKind::Float32,
            KindSpec::Float64 => NumericKind::Float64,
            KindSpec::BigFloat(precision) => {
                NumericKind::BigFloat(precision.unwrap_or(default_precision))
            }
            KindSpec::Complex(inner) => NumericKind::complex(inner.to_kind(default_precision)?),
            KindSpec::ComplexOf => return None,
        })
    }
}

impl From<&NumericKind> for KindSpec {
    fn from(kind: &NumericKind) -> Self {
        match kind {
            NumericKind::Int => KindSpec::Int,
            NumericKind::BigInt => KindSpec::BigInt,
            NumericKind::Rational => KindSpec::Rational,
            NumericKind::Float32 => KindSpec::Float32,
            NumericKind::Float64 => KindSpec::Float64,
            NumericKind::BigFloat(precision) => KindSpec::BigFloat(Some(*precision)),
            NumericKind::Complex(inner) => KindSpec::Complex(Box::new(KindSpec::from(&**inner))),
        }
    }
}
