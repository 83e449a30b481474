//! Error types for evaluation failures

use crate::ast::Span;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::expr::Expression;
use crate::numeric::{NumericError, NumericKind};
use thiserror::Error;

/// Why an expression could not be evaluated.
///
/// Every variant names the offending subexpression (rendered fully
/// parenthesised) and keeps its span when the expression came from source.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("unbound variable `{name}`")]
    UnboundVariable { name: String, span: Option<Span> },

    #[error("division by zero in `{expr}`")]
    DivisionByZero { expr: String, span: Option<Span> },

    #[error("unsupported operator `{op}` in `{expr}`")]
    UnsupportedOperator {
        op: String,
        expr: String,
        span: Option<Span>,
    },

    #[error("{message} in `{expr}`")]
    DomainError {
        message: String,
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

pub type EvalResult<T> = Result<T, EvalError>;

impl EvalError {
    /// Attach the failing subexpression to an error from the numeric layer
    pub fn from_numeric(err: NumericError, expr: &Expression) -> Self {
        let span = expr.span();
        let text = expr.to_string();
        match err {
            NumericError::DivisionByZero => EvalError::DivisionByZero { expr: text, span },
            NumericError::Domain(message) => EvalError::DomainError {
                message,
                expr: text,
                span,
            },
            NumericError::Inexact { value, target } => EvalError::InexactConversion {
                value,
                target,
                expr: text,
                span,
            },
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            EvalError::UnboundVariable { span, .. }
            | EvalError::DivisionByZero { span, .. }
            | EvalError::UnsupportedOperator { span, .. }
            | EvalError::DomainError { span, .. }
            | EvalError::InexactConversion { span, .. } => *span,
        }
    }

    /// Stable name of the error kind, as shown to users
    pub fn kind_name(&self) -> &'static str {
        match self {
            EvalError::UnboundVariable { .. } => "UnboundVariable",
            EvalError::DivisionByZero { .. } => "DivisionByZero",
            EvalError::UnsupportedOperator { .. } => "UnsupportedOperator",
            EvalError::DomainError { .. } => "DomainError",
            EvalError::InexactConversion { .. } => "InexactConversion",
        }
    }

    pub fn to_diagnostic(&self, filename: &str) -> Diagnostic {
        let diagnostic = Diagnostic::error(
            DiagnosticKind::Eval,
            format!("{}: {self}", self.kind_name()),
            self.span().unwrap_or(Span::new(0, 0)),
            filename.to_string(),
        );
        match self {
            EvalError::UnboundVariable { name, .. } => {
                diagnostic.with_help(format!("bind it on the command line, e.g. `{name}=0.3`"))
            }
            EvalError::DivisionByZero { .. } => diagnostic
                .with_note("exact division has no value for a zero divisor")
                .with_help("convert an operand to Float64 to get IEEE infinities instead"),
            EvalError::UnsupportedOperator { .. } => {
                diagnostic.with_note("supported operators are + - * / ^")
            }
            EvalError::DomainError { .. } => diagnostic,
            EvalError::InexactConversion { .. } => diagnostic
                .with_note("explicit conversions to a narrower kind must be exact"),
        }
    }
}
