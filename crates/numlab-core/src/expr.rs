//! Core expression tree
//!
//! Desugaring lowers the surface [`crate::ast::Expr`] into this smaller
//! language: literals, variables, binary operations and explicit
//! conversions. Both the evaluator and the lowering stages work on it.

use crate::ast::{BinaryOp, Span};
use crate::numeric::{NumericKind, Value};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal {
        value: Value,
        span: Option<Span>,
    },
    Variable {
        name: String,
        span: Option<Span>,
    },
    BinaryOp {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
        span: Option<Span>,
    },
    Convert {
        target: ConvertTarget,
        operand: Box<Expression>,
        span: Option<Span>,
    },
}

/// Target of an explicit conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertTarget {
    Kind(NumericKind),
    /// The complex kind over the operand's kind
    Complex,
}

impl ConvertTarget {
    pub fn resolve(&self, operand: &NumericKind) -> NumericKind {
        match self {
            ConvertTarget::Kind(kind) => kind.clone(),
            ConvertTarget::Complex => NumericKind::complex(operand.clone()),
        }
    }
}

impl Expression {
    pub fn literal(value: impl Into<Value>) -> Self {
        Expression::Literal {
            value: value.into(),
            span: None,
        }
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Expression::Variable {
            name: name.into(),
            span: None,
        }
    }

    pub fn binary(op: BinaryOp, left: Expression, right: Expression) -> Self {
        Expression::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
            span: None,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Expression::Literal { span, .. } => *span,
            Expression::Variable { span, .. } => *span,
            Expression::BinaryOp { span, .. } => *span,
            Expression::Convert { span, .. } => *span,
        }
    }

    /// Names of all variables, in order of first appearance
    pub fn variables(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_variables(&mut names);
        names
    }

    fn collect_variables<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Expression::Literal { .. } => {}
            Expression::Variable { name, .. } => {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
            Expression::BinaryOp { left, right, .. } => {
                left.collect_variables(names);
                right.collect_variables(names);
            }
            Expression::Convert { operand, .. } => operand.collect_variables(names),
        }
    }
}

/// Literal text as it appears inside a rendered tree; complex values are
/// parenthesised so `re + imim` does not read as an addition node
pub(crate) fn literal_text(value: &Value) -> String {
    match value {
        Value::Complex(_) => format!("({value})"),
        _ => value.to_string(),
    }
}

pub(crate) fn target_text(target: &ConvertTarget) -> String {
    match target {
        ConvertTarget::Kind(kind) => kind.constructor(),
        ConvertTarget::Complex => "complex".to_string(),
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal { value, .. } => write!(f, "{}", literal_text(value)),
            Expression::Variable { name, .. } => write!(f, "{name}"),
            Expression::BinaryOp {
                op, left, right, ..
            } => write!(f, "({left} {} {right})", op.symbol()),
            Expression::Convert {
                target, operand, ..
            } => write!(f, "{}({operand})", target_text(target)),
        }
    }
}
