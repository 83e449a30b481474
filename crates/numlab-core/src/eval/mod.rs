//! Numeric domain evaluator
//!
//! Walks a core [`Expression`] bottom-up. Every binary node promotes its
//! operands with the static table in [`crate::numeric::NumericKind`] before
//! the operation is applied, so the kind of the result depends only on the
//! kinds of the operands.

mod errors;

pub use errors::{EvalError, EvalResult};

use crate::expr::Expression;
use crate::numeric::{self, Value};
use std::collections::HashMap;
use tracing::trace;

/// Variable bindings for one evaluation
pub type Bindings = HashMap<String, Value>;

/// Evaluate `expr` under `bindings`
pub fn evaluate(expr: &Expression, bindings: &Bindings) -> EvalResult<Value> {
    let value = match expr {
        Expression::Literal { value, .. } => value.clone(),
        Expression::Variable { name, span } => {
            bindings
                .get(name)
                .cloned()
                .ok_or_else(|| EvalError::UnboundVariable {
                    name: name.clone(),
                    span: *span,
                })?
        }
        Expression::BinaryOp {
            op,
            left,
            right,
            span,
        } => {
            let arith = op.arith().ok_or_else(|| EvalError::UnsupportedOperator {
                op: op.symbol().to_string(),
                expr: expr.to_string(),
                span: *span,
            })?;
            let lhs = evaluate(left, bindings)?;
            let rhs = evaluate(right, bindings)?;
            numeric::binary(arith, &lhs, &rhs).map_err(|err| EvalError::from_numeric(err, expr))?
        }
        Expression::Convert {
            target, operand, ..
        } => {
            let value = evaluate(operand, bindings)?;
            let kind = target.resolve(&value.kind());
            numeric::convert(&value, &kind).map_err(|err| EvalError::from_numeric(err, expr))?
        }
    };
    trace!(expr = %expr, value = %value, kind = %value.kind(), "evaluated");
    Ok(value)
}
