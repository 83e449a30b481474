//! Unified pipeline for evaluating and lowering numlab expressions
//!
//! A `Pipeline` owns the source text and a filename for diagnostics, and
//! runs the individual stages on demand.
//!
//! ```no_run
//! # use numlab_core::pipeline::Pipeline;
//! # use numlab_core::eval::Bindings;
//! # use numlab_core::lower::LowerOptions;
//! let pipeline = Pipeline::new("3/4".to_string(), "<expr>".to_string());
//!
//! match pipeline.run_eval(&Bindings::new(), &LowerOptions::default()) {
//!     Ok(value) => println!("{} : {}", value, value.kind()),
//!     Err(e) => eprintln!("{}", e.format_with_source(pipeline.source(), pipeline.filename())),
//! }
//! ```

use crate::ast::{Expr, Span};
use crate::diagnostics::Diagnostic;
use crate::eval::{self, Bindings, EvalError};
use crate::expr::Expression;
use crate::lower::{self, LowerError, LowerOptions, Lowered, desugar};
use crate::numeric::{NumericKind, Value};
use crate::parser;
use std::fmt;

/// Errors that can occur during pipeline execution
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// Parse error(s)
    Parse(Vec<Diagnostic>),
    Eval(EvalError),
    Lower(LowerError),
}

impl PipelineError {
    /// Process exit code for this failure
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::Parse(_) => 1,
            PipelineError::Eval(_) | PipelineError::Lower(_) => 2,
        }
    }

    fn diagnostics(&self, filename: &str) -> Vec<Diagnostic> {
        match self {
            PipelineError::Parse(diagnostics) => diagnostics.clone(),
            PipelineError::Eval(err) => vec![err.to_diagnostic(filename)],
            PipelineError::Lower(err) => vec![err.to_diagnostic(filename)],
        }
    }

    /// Format error for display to user
    pub fn format_display(&self) -> String {
        match self {
            PipelineError::Parse(diagnostics) => diagnostics
                .iter()
                .map(|d| format!("{}", d))
                .collect::<Vec<_>>()
                .join("\n"),
            PipelineError::Eval(err) => format!("{}: {err}", err.kind_name()),
            PipelineError::Lower(err) => format!("{}: {err}", err.kind_name()),
        }
    }

    /// Format error with source code context. Parse diagnostics keep the
    /// filename they were created with; `filename` names the source of
    /// evaluation and lowering errors.
    pub fn format_with_source(&self, source: &str, filename: &str) -> String {
        self.diagnostics(filename)
            .iter()
            .map(|d| d.format(source))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            PipelineError::Parse(diagnostics) => diagnostics.first().map(|d| d.span),
            PipelineError::Eval(err) => err.span(),
            PipelineError::Lower(err) => err.span(),
        }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_display())
    }
}

impl std::error::Error for PipelineError {}

impl From<Vec<Diagnostic>> for PipelineError {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        PipelineError::Parse(diagnostics)
    }
}

impl From<EvalError> for PipelineError {
    fn from(error: EvalError) -> Self {
        PipelineError::Eval(error)
    }
}

impl From<LowerError> for PipelineError {
    fn from(error: LowerError) -> Self {
        PipelineError::Lower(error)
    }
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Parse, evaluate and lower a single expression
#[derive(Debug)]
pub struct Pipeline {
    /// Expression text
    source: String,
    /// Filename for error reporting
    filename: String,
}

impl Pipeline {
    pub fn new(source: String, filename: String) -> Self {
        Pipeline { source, filename }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Parse the source into a surface syntax tree
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Parse` if the text is not a valid expression.
    pub fn parse(&self) -> PipelineResult<Expr> {
        parser::parse(&self.source, &self.filename).map_err(PipelineError::Parse)
    }

    pub fn desugar(&self, ast: &Expr, options: &LowerOptions) -> Expression {
        desugar(ast, options)
    }

    /// Evaluate a desugared expression
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Eval` for any evaluation failure.
    pub fn evaluate(&self, expr: &Expression, bindings: &Bindings) -> PipelineResult<Value> {
        Ok(eval::evaluate(expr, bindings)?)
    }

    /// Run the four lowering stages with every variable of `argument_kind`
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Lower` if a stage rejects the expression.
    pub fn lower(
        &self,
        ast: &Expr,
        argument_kind: &NumericKind,
        options: &LowerOptions,
    ) -> PipelineResult<Lowered> {
        Ok(lower::lower(ast, argument_kind, options)?)
    }

    /// Parse, desugar and evaluate in one step
    pub fn run_eval(&self, bindings: &Bindings, options: &LowerOptions) -> PipelineResult<Value> {
        let ast = self.parse()?;
        let expr = self.desugar(&ast, options);
        self.evaluate(&expr, bindings)
    }

    /// Parse and lower in one step
    pub fn run_lower(
        &self,
        argument_kind: &NumericKind,
        options: &LowerOptions,
    ) -> PipelineResult<Lowered> {
        let ast = self.parse()?;
        self.lower(&ast, argument_kind, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline(source: &str) -> Pipeline {
        Pipeline::new(source.to_string(), "<expr>".to_string())
    }

    #[test]
    fn test_run_eval() {
        let value = pipeline("3/4")
            .run_eval(&Bindings::new(), &LowerOptions::default())
            .expect("evaluates");
        assert_eq!(value.to_string(), "3//4");
    }

    #[test]
    fn test_exit_codes() {
        let parse = pipeline("(1 + ")
            .run_eval(&Bindings::new(), &LowerOptions::default())
            .expect_err("fails");
        assert!(matches!(parse, PipelineError::Parse(_)));
        assert_eq!(parse.exit_code(), 1);

        let eval = pipeline("1/0")
            .run_eval(&Bindings::new(), &LowerOptions::default())
            .expect_err("fails");
        assert_eq!(eval.exit_code(), 2);

        let lower = pipeline("x % 2")
            .run_lower(&NumericKind::Int, &LowerOptions::default())
            .expect_err("fails");
        assert_eq!(lower.exit_code(), 2);
    }

    #[test]
    fn test_format_with_source_names_subexpression() {
        let source = "a / b";
        let bindings: Bindings = [
            ("a".to_string(), Value::Int(1)),
            ("b".to_string(), Value::Int(0)),
        ]
        .into_iter()
        .collect();
        let err = pipeline(source)
            .run_eval(&bindings, &LowerOptions::default())
            .expect_err("fails");
        let text = err.format_with_source(source, "<expr>");
        assert!(text.contains("DivisionByZero"), "{text}");
        assert!(text.contains("(a / b)"), "{text}");
        assert_eq!(err.span(), Some(Span::new(0, 5)));
    }

    #[test]
    fn test_format_with_source_names_the_pipeline_file() {
        let pipeline = pipeline("1 \u{d7} (2 \u{f7} 0)");
        let err = pipeline
            .run_eval(&Bindings::new(), &LowerOptions::default())
            .expect_err("fails");
        let text = err.format_with_source(pipeline.source(), pipeline.filename());
        assert!(text.contains("  --> <expr>:1:6\n"), "{text}");

        let lower = Pipeline::new("x % 2".to_string(), "<lowered>".to_string());
        let err = lower
            .run_lower(&NumericKind::Int, &LowerOptions::default())
            .expect_err("fails");
        let text = err.format_with_source(lower.source(), lower.filename());
        assert!(text.contains("  --> <lowered>:1:1\n"), "{text}");

        let parse = Pipeline::new("(1 + ".to_string(), "<parsed>".to_string());
        let err = parse.parse().expect_err("fails");
        assert!(err.format_with_source(parse.source(), "ignored").contains("<parsed>:"));
    }

    #[test]
    fn test_run_lower() {
        let lowered = pipeline("4x*(1-x)")
            .run_lower(&NumericKind::Float64, &LowerOptions::default())
            .expect("lowers");
        assert_eq!(lowered.stages().len(), 4);
    }
}
