//! Shared CLI utilities: bindings, kinds, logging and error output

use numlab_core::diagnostics::{Diagnostic, DiagnosticKind};
use numlab_core::eval::Bindings;
use numlab_core::lower::LowerOptions;
use numlab_core::numeric::NumericKind;
use numlab_core::parser;
use numlab_core::pipeline::{Pipeline, PipelineError};
use numlab_core::Span;
use std::process;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter, e.g. `numlab_core=debug`
pub const LOG_ENV: &str = "NUMLAB_LOG";

/// Exit code for malformed command lines (`EX_USAGE`), distinct from the
/// parse (1) and evaluation (2) failures of the expression itself
pub const USAGE_EXIT_CODE: i32 = 64;

/// Exit code for a clap error: help and version output are successes
pub fn usage_exit_code(err: &clap::Error) -> i32 {
    if err.use_stderr() { USAGE_EXIT_CODE } else { 0 }
}

/// Install the stderr subscriber. `NUMLAB_LOG` wins over `-v`.
pub fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(level_for(verbose)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn level_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Split `name=value`; the value is expression text
pub fn split_binding(text: &str) -> Result<(&str, &str), Diagnostic> {
    let invalid = |message: &str| {
        Diagnostic::error(
            DiagnosticKind::Parse,
            message.to_string(),
            Span::new(0, text.len()),
            "<binding>".to_string(),
        )
        .with_help("write bindings as name=value, e.g. x=0.3")
    };
    let (name, value) = text
        .split_once('=')
        .ok_or_else(|| invalid("binding is missing `=`"))?;
    let name = name.trim();
    let mut chars = name.chars();
    let valid_name = chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_');
    if !valid_name {
        return Err(invalid(&format!("`{name}` is not a variable name")));
    }
    Ok((name, value))
}

/// One `name=value` argument after evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub name: String,
    /// The argument as written
    pub text: String,
    /// Variables its value reads
    pub uses: Vec<String>,
}

impl Binding {
    pub fn unused_warning(&self) -> Diagnostic {
        Diagnostic::warning(
            DiagnosticKind::Eval,
            format!("binding `{}` is never used", self.name),
            Span::new(0, self.text.len()),
            "<binding>".to_string(),
        )
        .with_help("remove it, or refer to it in the expression")
    }
}

/// Evaluate `name=value` arguments in order. Each value may use the
/// bindings before it. A failure comes back with the pipeline that hit it,
/// so the error can be shown against the right text.
pub fn evaluate_bindings(
    args: &[String],
    options: &LowerOptions,
) -> Result<(Bindings, Vec<Binding>), (PipelineError, Pipeline)> {
    let mut bindings = Bindings::new();
    let mut bound = Vec::with_capacity(args.len());
    for arg in args {
        let (name, value) = split_binding(arg).map_err(|diagnostic| {
            let pipeline = Pipeline::new(arg.clone(), "<binding>".to_string());
            (PipelineError::Parse(vec![diagnostic]), pipeline)
        })?;
        let pipeline = Pipeline::new(value.to_string(), format!("<binding {name}>"));
        let expr = match pipeline.parse() {
            Ok(ast) => pipeline.desugar(&ast, options),
            Err(err) => return Err((err, pipeline)),
        };
        let value = match pipeline.evaluate(&expr, &bindings) {
            Ok(value) => value,
            Err(err) => return Err((err, pipeline)),
        };
        tracing::info!(name, value = %value, kind = %value.kind(), "bound");
        bound.push(Binding {
            name: name.to_string(),
            text: arg.clone(),
            uses: expr.variables().into_iter().map(str::to_string).collect(),
        });
        bindings.insert(name.to_string(), value);
    }
    Ok((bindings, bound))
}

/// Bindings read neither by the expression nor by a later binding. A name
/// bound again is only read up to and including its rebinding.
pub fn unused_bindings<'a>(bound: &'a [Binding], expression_uses: &[&str]) -> Vec<&'a Binding> {
    bound
        .iter()
        .enumerate()
        .filter(|(index, binding)| {
            let later = &bound[index + 1..];
            let rebound = later.iter().position(|other| other.name == binding.name);
            let readers = match rebound {
                Some(position) => &later[..=position],
                None => later,
            };
            let read_later = readers.iter().any(|other| other.uses.contains(&binding.name));
            let read_by_expression =
                rebound.is_none() && expression_uses.contains(&binding.name.as_str());
            !read_later && !read_by_expression
        })
        .map(|(_, binding)| binding)
        .collect()
}

pub fn parse_kind_or_exit(text: &str, options: &LowerOptions) -> NumericKind {
    match parser::parse_kind(text, options.default_precision) {
        Ok(kind) => kind,
        Err(errors) => {
            format_parse_errors(&errors, text);
            process::exit(1);
        }
    }
}

/// Format and print parse errors to stderr
pub fn format_parse_errors(errors: &[Diagnostic], source: &str) {
    if errors.is_empty() {
        eprintln!("error[parse]: invalid input `{source}`");
    }
    for error in errors {
        eprintln!("{}", error.format(source));
    }
}

/// Print a pipeline failure against the pipeline's text and exit with its
/// code
pub fn exit_with(err: &PipelineError, pipeline: &Pipeline) -> ! {
    eprintln!("{}", err.format_with_source(pipeline.source(), pipeline.filename()));
    process::exit(err.exit_code());
}
