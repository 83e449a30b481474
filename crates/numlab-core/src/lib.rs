pub mod ast;
pub mod diagnostics;
pub mod eval;
pub mod expr;
pub mod lower;
pub mod numeric;
pub mod parser;
pub mod pipeline;

// Re-export commonly used types for convenience
pub use ast::{Expr, Span};
pub use diagnostics::{Diagnostic, Severity};
pub use eval::{Bindings, EvalError, evaluate};
pub use expr::Expression;
pub use lower::{LowerError, LowerOptions, Lowered, Stage, lower};
pub use numeric::{NumericKind, Value};
pub use pipeline::{Pipeline, PipelineError};
