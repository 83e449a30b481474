//! Debug subcommand: `ast`

use crate::utils::format_parse_errors;
use numlab_core::parser;
use std::process;

/// Print the parsed syntax tree for debugging
pub fn handle_ast(expression: &str) {
    let ast = match parser::parse(expression, "<expr>") {
        Ok(ast) => ast,
        Err(errors) => {
            format_parse_errors(&errors, expression);
            process::exit(1);
        }
    };

    println!("{ast:#?}");
}
