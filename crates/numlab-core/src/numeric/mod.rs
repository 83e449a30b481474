//! The numeric tower.
//!
//! A closed set of numeric kinds replaces per-call runtime dispatch:
//!
//! - [`NumericKind`] describes a kind and owns the static promotion table
//! - [`Value`] is a tagged union whose payload always matches its kind
//! - [`BigFloat`] is an arbitrary precision binary float whose precision is
//!   an explicit field, threaded through every operation
//! - [`convert`] moves values between kinds, [`binary`] applies arithmetic
//!   after pairwise promotion
//!
//! Errors from this layer ([`NumericError`]) carry no source location; the
//! evaluator and the lowering pipeline attach the offending subexpression.

mod arith;
mod bigfloat;
mod convert;
mod kind;
mod value;

pub use arith::{binary, negate};
pub use bigfloat::BigFloat;
pub use convert::convert;
pub use kind::{DEFAULT_PRECISION, NumericKind};
pub use value::{Complex, Value};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Largest exact integer or rational, in bits, that an operation builds.
/// Exact powers past it fail, and BigFloat values past it have no exact
/// image.
pub const MAX_EXACT_BITS: u64 = 1 << 22;

/// The supported arithmetic operations: `+`, `-`, `*`, `/` and `^`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl ArithOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
            ArithOp::Pow => "^",
        }
    }

    /// Instruction stem used by the instruction-list stage
    pub fn mnemonic(&self) -> &'static str {
        match self {
            ArithOp::Add => "add",
            ArithOp::Sub => "sub",
            ArithOp::Mul => "mul",
            ArithOp::Div => "div",
            ArithOp::Pow => "pow",
        }
    }
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Failure of a numeric operation, before any source context is attached
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NumericError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("{0}")]
    Domain(String),
    #[error("cannot convert {value} to {target} exactly")]
    Inexact { value: String, target: NumericKind },
}

pub type NumericResult<T> = Result<T, NumericError>;
