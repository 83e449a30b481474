//! Stage 3: SSA-like intermediate form
//!
//! The typed tree is flattened in post-order into triples
//! `%n = op(operands)::Kind`. Each slot is assigned once and only read
//! after it has been produced. Operands are brought to the operation kind
//! first: constants are converted on the spot, anything else gets an
//! explicit `convert` triple.

use super::LowerError;
use super::annotate::{TypedExpr, TypedNode};
use crate::expr::literal_text;
use crate::numeric::{ArithOp, NumericKind, Value, convert};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Slot(usize),
    Variable(String),
    Constant(Value),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Slot(slot) => write!(f, "%{slot}"),
            Operand::Variable(name) => write!(f, "{name}"),
            Operand::Constant(value) => write!(f, "{}", literal_text(value)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Arith(ArithOp),
    /// Conversion from the given kind to the triple's kind
    Convert(NumericKind),
}

impl Op {
    pub fn name(&self) -> &'static str {
        match self {
            Op::Arith(op) => op.mnemonic(),
            Op::Convert(_) => "convert",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Triple {
    pub slot: usize,
    pub op: Op,
    pub operands: Vec<Operand>,
    pub kind: NumericKind,
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let operands = self
            .operands
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(
            f,
            "%{} = {}({operands})::{}",
            self.slot,
            self.op.name(),
            self.kind
        )
    }
}

/// The flattened program: triples in execution order, then the returned
/// operand
#[derive(Debug, Clone, PartialEq)]
pub struct Ssa {
    pub triples: Vec<Triple>,
    pub result: Operand,
    pub kind: NumericKind,
}

impl Ssa {
    pub fn lines(&self) -> Vec<String> {
        self.triples
            .iter()
            .map(ToString::to_string)
            .chain(std::iter::once(format!("return {}", self.result)))
            .collect()
    }
}

/// Flatten a typed tree
pub fn to_ssa(typed: &TypedExpr) -> Result<Ssa, LowerError> {
    let mut builder = Builder::default();
    let result = builder.lower(typed)?;
    Ok(Ssa {
        triples: builder.triples,
        result,
        kind: typed.kind.clone(),
    })
}

#[derive(Default)]
struct Builder {
    triples: Vec<Triple>,
}

impl Builder {
    fn lower(&mut self, typed: &TypedExpr) -> Result<Operand, LowerError> {
        match &typed.node {
            TypedNode::Literal(value) => Ok(Operand::Constant(value.clone())),
            TypedNode::Variable(name) => Ok(Operand::Variable(name.clone())),
            TypedNode::Binary { op, left, right } => {
                let lhs = self.lower(left)?;
                let lhs = self.coerce(lhs, left, &typed.kind)?;
                let rhs = self.lower(right)?;
                let rhs = self.coerce(rhs, right, &typed.kind)?;
                Ok(self.emit(Op::Arith(*op), vec![lhs, rhs], &typed.kind))
            }
            TypedNode::Convert { operand } => {
                let value = self.lower(operand)?;
                if operand.kind == typed.kind {
                    return Ok(value);
                }
                Ok(self.emit(Op::Convert(operand.kind.clone()), vec![value], &typed.kind))
            }
        }
    }

    /// Bring `operand` (computed by `source`) to `target`
    fn coerce(&mut self, operand: Operand, source: &TypedExpr, target: &NumericKind) -> Result<Operand, LowerError> {
        if source.kind == *target {
            return Ok(operand);
        }
        match operand {
            Operand::Constant(value) => convert(&value, target)
                .map(Operand::Constant)
                .map_err(|_| LowerError::InexactConversion {
                    value: value.to_string(),
                    target: target.clone(),
                    expr: source.to_string(),
                    span: source.span,
                }),
            other => Ok(self.emit(Op::Convert(source.kind.clone()), vec![other], target)),
        }
    }

    fn emit(&mut self, op: Op, operands: Vec<Operand>, kind: &NumericKind) -> Operand {
        let slot = self.triples.len() + 1;
        self.triples.push(Triple {
            slot,
            op,
            operands,
            kind: kind.clone(),
        });
        Operand::Slot(slot)
    }
}
