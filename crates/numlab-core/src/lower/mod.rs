//! Pipeline stage visualizer
//!
//! Lowers a parsed expression over one argument kind through four stages:
//!
//! 1. `desugar`: surface notation removed, giving a core [`Expression`]
//! 2. `typed`: every node annotated with its [`NumericKind`]
//! 3. `intermediate`: post-order SSA triples `%n = op(a, b)::Kind`
//! 4. `instructions`: one typed opcode per triple, e.g. `mul.f64`
//!
//! Each stage is a pure function of the previous one. The instruction list
//! is illustrative only; nothing executes it.

pub mod annotate;
pub mod desugar;
pub mod instructions;
pub mod ssa;

pub use annotate::{TypedExpr, TypedNode, annotate};
pub use desugar::desugar;
pub use instructions::{Instruction, select};
pub use ssa::{Op, Operand, Ssa, Triple, to_ssa};

use crate::ast::{Expr, Span};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::expr::Expression;
use crate::numeric::{DEFAULT_PRECISION, NumericKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Options threaded into lowering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LowerOptions {
    /// Precision in bits for `BigFloat(e)` written without one
    pub default_precision: u32,
}

impl Default for LowerOptions {
    fn default() -> Self {
        LowerOptions {
            default_precision: DEFAULT_PRECISION,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LowerError {
    #[error("unsupported operator `{op}` in `{expr}`")]
    UnsupportedOperator {
        op: String,
        expr: String,
        span: Option<Span>,
    },

    #[error("cannot convert {value} to {target} exactly in `{expr}`")]
    InexactConversion {
        value: String,
        target: NumericKind,
        expr: String,
        span: Option<Span>,
    },
}

impl LowerError {
    pub fn span(&self) -> Option<Span> {
        match self {
            LowerError::UnsupportedOperator { span, .. }
            | LowerError::InexactConversion { span, .. } => *span,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            LowerError::UnsupportedOperator { .. } => "UnsupportedOperator",
            LowerError::InexactConversion { .. } => "InexactConversion",
        }
    }

    pub fn to_diagnostic(&self, filename: &str) -> Diagnostic {
        let diagnostic = Diagnostic::error(
            DiagnosticKind::Lower,
            format!("{}: {self}", self.kind_name()),
            self.span().unwrap_or(Span::new(0, 0)),
            filename.to_string(),
        );
        match self {
            LowerError::UnsupportedOperator { .. } => {
                diagnostic.with_note("supported operators are + - * / ^")
            }
            LowerError::InexactConversion { .. } => diagnostic,
        }
    }
}

/// One labelled text block of the lowering output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub name: String,
    pub lines: Vec<String>,
}

impl Stage {
    fn new(name: &str, lines: Vec<String>) -> Self {
        Stage {
            name: name.to_string(),
            lines,
        }
    }
}

/// Output of all four lowering stages
#[derive(Debug, Clone, PartialEq)]
pub struct Lowered {
    pub desugared: Expression,
    pub typed: TypedExpr,
    pub ssa: Ssa,
    pub instructions: Vec<Instruction>,
}

impl Lowered {
    /// The stages in pipeline order
    pub fn stages(&self) -> [Stage; 4] {
        [
            Stage::new("desugar", vec![self.desugared.to_string()]),
            Stage::new("typed", vec![self.typed.to_string()]),
            Stage::new("intermediate", self.ssa.lines()),
            Stage::new(
                "instructions",
                self.instructions.iter().map(ToString::to_string).collect(),
            ),
        ]
    }

    pub fn result_kind(&self) -> &NumericKind {
        &self.typed.kind
    }
}

/// Run all four stages over `expr`, binding every variable to `argument_kind`
pub fn lower(
    expr: &Expr,
    argument_kind: &NumericKind,
    options: &LowerOptions,
) -> Result<Lowered, LowerError> {
    let desugared = desugar(expr, options);
    debug!(stage = "desugar", output = %desugared);

    let typed = annotate(&desugared, argument_kind)?;
    debug!(stage = "typed", kind = %typed.kind, output = %typed);

    let ssa = to_ssa(&typed)?;
    debug!(stage = "intermediate", triples = ssa.triples.len());

    let instructions = select(&ssa);
    debug!(stage = "instructions", count = instructions.len());

    Ok(Lowered {
        desugared,
        typed,
        ssa,
        instructions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn lowered(source: &str, kind: NumericKind) -> Lowered {
        let ast = parse(source, "test").expect("parses");
        lower(&ast, &kind, &LowerOptions::default()).expect("lowers")
    }

    #[test]
    fn test_logistic_map_float64() {
        let stages = lowered("4x*(1-x)", NumericKind::Float64).stages();
        let names: Vec<&str> = stages.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["desugar", "typed", "intermediate", "instructions"]);
        assert_eq!(stages[0].lines, ["((4 * x) * (1 - x))"]);
        assert_eq!(
            stages[3].lines,
            ["mul.f64 %1, 4.0, x", "sub.f64 %2, 1.0, x", "mul.f64 %3, %1, %2", "ret.f64 %3"]
        );
    }

    #[test]
    fn test_rational_argument() {
        let lowered = lowered("x / 3", NumericKind::Int);
        assert_eq!(lowered.result_kind(), &NumericKind::Rational);
        assert_eq!(
            lowered.stages()[3].lines,
            ["cvt.rat.i64 %1, x", "div.rat %2, %1, 3//1", "ret.rat %2"]
        );
    }

    #[test]
    fn test_explicit_conversion() {
        let lowered = lowered("Float32(x) + 1", NumericKind::Int);
        assert_eq!(
            lowered.stages()[2].lines,
            ["%1 = convert(x)::Float32", "%2 = add(%1, 1.0)::Float32", "return %2"]
        );
    }

    #[test]
    fn test_identity_conversion_is_dropped() {
        let lowered = lowered("Float64(x)", NumericKind::Float64);
        assert_eq!(lowered.stages()[3].lines, ["ret.f64 x"]);
    }

    #[test]
    fn test_remainder_fails_to_lower() {
        let ast = parse("x % 2", "test").expect("parses");
        let err = lower(&ast, &NumericKind::Int, &LowerOptions::default()).expect_err("fails");
        assert_eq!(err.kind_name(), "UnsupportedOperator");
        assert_eq!(err.span(), Some(Span::new(0, 5)));
        let diagnostic = err.to_diagnostic("test");
        assert!(diagnostic.message.starts_with("UnsupportedOperator: "));
    }

    #[test]
    fn test_stages_serialize() {
        let stages = lowered("x + 1", NumericKind::Float64).stages();
        let json = serde_json::to_value(&stages).expect("serializes");
        assert_eq!(json[0]["name"], "desugar");
        assert_eq!(json[2]["lines"][0], "%1 = add(x, 1.0)::Float64");
    }
}
