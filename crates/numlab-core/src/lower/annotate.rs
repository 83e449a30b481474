//! Stage 2: resolve the kind of every node

use super::LowerError;
use crate::ast::Span;
use crate::expr::{Expression, literal_text};
use crate::numeric::{ArithOp, NumericKind, Value};
use std::fmt;

/// A core expression node together with its resolved kind
#[derive(Debug, Clone, PartialEq)]
pub struct TypedExpr {
    pub kind: NumericKind,
    pub node: TypedNode,
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypedNode {
    Literal(Value),
    Variable(String),
    Binary {
        op: ArithOp,
        left: Box<TypedExpr>,
        right: Box<TypedExpr>,
    },
    /// Conversion to the node's own kind
    Convert { operand: Box<TypedExpr> },
}

/// Annotate `expr` bottom-up. Every variable takes `argument_kind`,
/// literals keep their own kind and binary nodes get
/// [`NumericKind::result_kind`].
pub fn annotate(expr: &Expression, argument_kind: &NumericKind) -> Result<TypedExpr, LowerError> {
    let (kind, node) = match expr {
        Expression::Literal { value, .. } => (value.kind(), TypedNode::Literal(value.clone())),
        Expression::Variable { name, .. } => {
            (argument_kind.clone(), TypedNode::Variable(name.clone()))
        }
        Expression::BinaryOp {
            op, left, right, ..
        } => {
            let op = op.arith().ok_or_else(|| LowerError::UnsupportedOperator {
                op: op.symbol().to_string(),
                expr: expr.to_string(),
                span: expr.span(),
            })?;
            let left = annotate(left, argument_kind)?;
            let right = annotate(right, argument_kind)?;
            (
                NumericKind::result_kind(op, &left.kind, &right.kind),
                TypedNode::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
            )
        }
        Expression::Convert {
            target, operand, ..
        } => {
            let operand = annotate(operand, argument_kind)?;
            (
                target.resolve(&operand.kind),
                TypedNode::Convert {
                    operand: Box::new(operand),
                },
            )
        }
    };
    Ok(TypedExpr {
        kind,
        node,
        span: expr.span(),
    })
}

impl fmt::Display for TypedExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.node {
            TypedNode::Literal(value) => write!(f, "{}", literal_text(value))?,
            TypedNode::Variable(name) => write!(f, "{name}")?,
            TypedNode::Binary { op, left, right } => write!(f, "({left} {op} {right})")?,
            TypedNode::Convert { operand } => write!(f, "{}({operand})", self.kind.constructor())?,
        }
        write!(f, "::{}", self.kind)
    }
}
