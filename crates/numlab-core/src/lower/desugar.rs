//! Stage 1: surface syntax to core expressions

use super::LowerOptions;
use crate::ast::{BinaryOp, Expr, Span, UnaryOp};
use crate::expr::{ConvertTarget, Expression};
use crate::numeric::{Value, negate};

/// Remove surface notation.
///
/// - implicit multiplication becomes an explicit `*`
/// - parentheses disappear; the tree already encodes grouping
/// - `-e` becomes `(-1 * e)`, except that a negated literal folds into the
///   literal itself
/// - `BigFloat(e)` without a precision gets `options.default_precision`
pub fn desugar(expr: &Expr, options: &LowerOptions) -> Expression {
    match expr {
        Expr::Number { value, span } => Expression::Literal {
            value: value.clone(),
            span: *span,
        },
        Expr::Identifier { name, span } => Expression::Variable {
            name: name.clone(),
            span: *span,
        },
        Expr::Binary {
            left,
            op,
            right,
            span,
        } => Expression::BinaryOp {
            op: *op,
            left: Box::new(desugar(left, options)),
            right: Box::new(desugar(right, options)),
            span: *span,
        },
        Expr::ImplicitMul {
            coefficient,
            operand,
            span,
        } => Expression::BinaryOp {
            op: BinaryOp::Mul,
            left: Box::new(desugar(coefficient, options)),
            right: Box::new(desugar(operand, options)),
            span: *span,
        },
        Expr::Unary {
            op: UnaryOp::Neg,
            operand,
            span,
        } => negated(desugar(operand, options), *span),
        Expr::Group { inner, .. } => desugar(inner, options),
        Expr::Convert {
            target,
            operand,
            span,
        } => Expression::Convert {
            target: target
                .to_kind(options.default_precision)
                .map_or(ConvertTarget::Complex, ConvertTarget::Kind),
            operand: Box::new(desugar(operand, options)),
            span: *span,
        },
    }
}

fn negated(operand: Expression, span: Option<Span>) -> Expression {
    match operand {
        Expression::Literal { value, .. } => Expression::Literal {
            value: negate(&value),
            span,
        },
        operand => Expression::BinaryOp {
            op: BinaryOp::Mul,
            left: Box::new(Expression::Literal {
                value: Value::Int(-1),
                span,
            }),
            right: Box::new(operand),
            span,
        },
    }
}
