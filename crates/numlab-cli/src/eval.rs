//! `eval` subcommand handler

use crate::utils::{evaluate_bindings, exit_with, unused_bindings};
use numlab_core::lower::LowerOptions;
use numlab_core::pipeline::Pipeline;

/// Evaluate an expression and print `<value> : <kind>`
pub fn handle_eval(expression: &str, bindings: &[String], options: &LowerOptions) {
    let (bindings, bound) = match evaluate_bindings(bindings, options) {
        Ok(result) => result,
        Err((err, pipeline)) => exit_with(&err, &pipeline),
    };

    let pipeline = Pipeline::new(expression.to_string(), "<expr>".to_string());
    let expr = match pipeline.parse() {
        Ok(ast) => pipeline.desugar(&ast, options),
        Err(e) => exit_with(&e, &pipeline),
    };

    for binding in unused_bindings(&bound, &expr.variables()) {
        eprintln!("{}", binding.unused_warning().format(&binding.text));
    }

    match pipeline.evaluate(&expr, &bindings) {
        Ok(value) => println!("{} : {}", value, value.kind()),
        Err(e) => exit_with(&e, &pipeline),
    }
}
