use clap::{Parser, Subcommand};

mod debug;
mod eval;
mod lower;
mod promote;
mod utils;


use debug::handle_ast;
use eval::handle_eval;
use lower::handle_lower;
use numlab_core::lower::LowerOptions;
use numlab_core::numeric::DEFAULT_PRECISION;
use numlab_core::parser::{MAX_PRECISION, MIN_PRECISION};
use promote::handle_promote;
use std::process;

/// Get the version string including git revision
fn version() -> &'static str {
    concat!(env!("CARGO_PKG_VERSION"), " (git:", env!("GIT_HASH"), ")")
}

#[derive(Parser)]
#[command(
    author,
    version = version(),
    about = "Evaluate numeric expressions and show how they lower",
    long_about = None,
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Default BigFloat precision in bits, used by `BigFloat(...)` without one
    #[arg(
        long,
        global = true,
        default_value_t = DEFAULT_PRECISION,
        value_parser = clap::value_parser!(u32).range(i64::from(MIN_PRECISION)..=i64::from(MAX_PRECISION))
    )]
    precision: u32,
    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate an expression
    Eval {
        /// The expression, e.g. "4x*(1-x)"
        #[arg(allow_hyphen_values = true)]
        expression: String,
        /// Variable bindings such as x=0.3, evaluated left to right
        #[arg(allow_hyphen_values = true)]
        bindings: Vec<String>,
    },
    /// Show the four lowering stages of an expression
    Lower {
        /// The expression to lower
        #[arg(allow_hyphen_values = true)]
        expression: String,
        /// Kind of every variable, e.g. Float64 or BigFloat{128}
        argument_kind: String,
        /// Print the stages as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the kind two kinds promote to
    Promote {
        left: String,
        right: String,
    },
    /// Print the parsed syntax tree (debug)
    #[command(hide = true)]
    Ast {
        /// The expression to parse
        #[arg(allow_hyphen_values = true)]
        expression: String,
    },
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            process::exit(utils::usage_exit_code(&err));
        }
    };
    utils::init_logging(cli.verbose);

    let options = LowerOptions {
        default_precision: cli.precision,
    };

    match &cli.command {
        Commands::Eval {
            expression,
            bindings,
        } => {
            handle_eval(expression, bindings, &options);
        }
        Commands::Lower {
            expression,
            argument_kind,
            json,
        } => {
            handle_lower(expression, argument_kind, *json, &options);
        }
        Commands::Promote { left, right } => {
            handle_promote(left, right, &options);
        }
        Commands::Ast { expression } => {
            handle_ast(expression);
        }
    }
}
