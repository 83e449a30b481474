//! `lower` subcommand handler

use crate::utils::{exit_with, parse_kind_or_exit};
use numlab_core::lower::{LowerOptions, Stage};
use numlab_core::pipeline::Pipeline;
use std::process;

/// Print the four lowering stages
pub fn handle_lower(expression: &str, argument_kind: &str, json: bool, options: &LowerOptions) {
    let kind = parse_kind_or_exit(argument_kind, options);

    let pipeline = Pipeline::new(expression.to_string(), "<expr>".to_string());
    let lowered = match pipeline.run_lower(&kind, options) {
        Ok(lowered) => lowered,
        Err(e) => exit_with(&e, &pipeline),
    };

    let stages = lowered.stages();
    if json {
        match serde_json::to_string_pretty(&stages) {
            Ok(text) => println!("{text}"),
            Err(err) => {
                eprintln!("Error serializing stages: {err}");
                process::exit(2);
            }
        }
    } else {
        print!("{}", render_stages(&stages));
    }
}

/// Labelled text blocks separated by blank lines
pub fn render_stages(stages: &[Stage]) -> String {
    stages
        .iter()
        .map(|stage| {
            let mut block = format!("== {} ==\n", stage.name);
            for line in &stage.lines {
                block.push_str(line);
                block.push('\n');
            }
            block
        })
        .collect::<Vec<_>>()
        .join("\n")
}
