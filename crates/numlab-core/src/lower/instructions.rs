//! Stage 4: symbolic instruction list

use super::ssa::{Op, Operand, Ssa};
use std::fmt;

/// One illustrative machine instruction such as `mul.f64 %1, 4.0, x`
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub opcode: String,
    pub operands: Vec<Operand>,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let operands = self
            .operands
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        if operands.is_empty() {
            write!(f, "{}", self.opcode)
        } else {
            write!(f, "{} {operands}", self.opcode)
        }
    }
}

/// Map each triple to a typed opcode: `(mul, Float64)` becomes `mul.f64`,
/// a conversion from Int to Float64 becomes `cvt.f64.i64`. The list ends
/// with `ret.<kind>`.
pub fn select(ssa: &Ssa) -> Vec<Instruction> {
    let mut instructions: Vec<Instruction> = ssa
        .triples
        .iter()
        .map(|triple| {
            let opcode = match &triple.op {
                Op::Arith(op) => format!("{}.{}", op.mnemonic(), triple.kind.mnemonic()),
                Op::Convert(from) => format!("cvt.{}.{}", triple.kind.mnemonic(), from.mnemonic()),
            };
            let mut operands = Vec::with_capacity(triple.operands.len() + 1);
            operands.push(Operand::Slot(triple.slot));
            operands.extend(triple.operands.iter().cloned());
            Instruction { opcode, operands }
        })
        .collect();
    instructions.push(Instruction {
        opcode: format!("ret.{}", ssa.kind.mnemonic()),
        operands: vec![ssa.result.clone()],
    });
    instructions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lower::ssa::Triple;
    use crate::numeric::{ArithOp, NumericKind, Value};

    #[test]
    fn test_select_opcodes() {
        let ssa = Ssa {
            triples: vec![
                Triple {
                    slot: 1,
                    op: Op::Convert(NumericKind::Int),
                    operands: vec![Operand::Variable("n".to_string())],
                    kind: NumericKind::Float32,
                },
                Triple {
                    slot: 2,
                    op: Op::Arith(ArithOp::Pow),
                    operands: vec![Operand::Slot(1), Operand::Constant(Value::Float32(2.0))],
                    kind: NumericKind::Float32,
                },
            ],
            result: Operand::Slot(2),
            kind: NumericKind::Float32,
        };
        let lines: Vec<String> = select(&ssa).iter().map(ToString::to_string).collect();
        assert_eq!(
            lines,
            vec!["cvt.f32.i64 %1, n", "pow.f32 %2, %1, 2.0", "ret.f32 %2"]
        );
    }
}
