//! Size limits checked before parsing
//!
//! The grammar and every later stage recurse over the tree, so deeply
//! nested or very long input is turned away with a diagnostic up front.

use crate::ast::Span;
use crate::diagnostics::{Diagnostic, DiagnosticKind};

/// Deepest nesting of brackets plus `^` operators.
///
/// A `^` counts against the bracket level it appears in until that level
/// closes or a binary operator ends the power chain, since the right-hand
/// side of a power nests inside it.
pub const MAX_NESTING: usize = 64;

/// Most operator symbols in one expression
pub const MAX_OPERATORS: usize = 1024;

/// Reject `source` if it nests or chains deeper than the parser allows
pub fn check(source: &str, filename: &str) -> Result<(), Diagnostic> {
    // `^` count of each open bracket level, outermost first
    let mut levels: Vec<usize> = vec![0];
    let mut depth = 0usize;
    let mut operators = 0usize;
    // Whether the last significant character ended an operand
    let mut after_operand = false;

    for (offset, ch) in source.char_indices() {
        match ch {
            '(' | '{' => {
                levels.push(0);
                depth += 1;
                after_operand = false;
            }
            ')' | '}' => {
                // Unbalanced closers are left for the parser to report
                if levels.len() > 1
                    && let Some(carets) = levels.pop()
                {
                    depth -= 1 + carets;
                }
                after_operand = true;
                continue;
            }
            '^' => {
                if let Some(carets) = levels.last_mut() {
                    *carets += 1;
                }
                depth += 1;
                operators += 1;
                after_operand = false;
            }
            '+' | '-' | '\u{2212}' | '*' | '\u{d7}' | '/' | '\u{f7}' | '%' => {
                // A prefix sign may be an exponent, so only a binary operator
                // closes the powers of this level
                if after_operand && let Some(carets) = levels.last_mut() {
                    depth -= *carets;
                    *carets = 0;
                }
                operators += 1;
                after_operand = false;
            }
            c if c.is_whitespace() => continue,
            _ => {
                after_operand = true;
                continue;
            }
        }

        let span = Span::new(offset, offset + ch.len_utf8());
        if depth > MAX_NESTING {
            return Err(Diagnostic::error(
                DiagnosticKind::Parse,
                format!("expression nests more than {MAX_NESTING} levels deep"),
                span,
                filename.to_string(),
            )
            .with_help("bind part of the expression to a variable and refer to it instead"));
        }
        if operators > MAX_OPERATORS {
            return Err(Diagnostic::error(
                DiagnosticKind::Parse,
                format!("expression has more than {MAX_OPERATORS} operators"),
                span,
                filename.to_string(),
            )
            .with_help("split the expression into bindings"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested(levels: usize) -> String {
        format!("{}1{}", "(".repeat(levels), ")".repeat(levels))
    }

    #[test]
    fn test_nesting_up_to_the_limit_is_accepted() {
        assert!(check(&nested(MAX_NESTING), "test").is_ok());
        let chain = vec!["2"; MAX_NESTING + 1].join("^");
        assert!(check(&chain, "test").is_ok());
    }

    #[test]
    fn test_nesting_past_the_limit_is_rejected() {
        let source = nested(MAX_NESTING + 1);
        let diagnostic = check(&source, "test").expect_err("too deep");
        assert_eq!(diagnostic.span, Span::new(MAX_NESTING, MAX_NESTING + 1));
        assert!(diagnostic.message.contains("levels deep"));
    }

    #[test]
    fn test_power_chains_count_as_nesting() {
        let chain = vec!["2"; MAX_NESTING + 2].join("^");
        assert!(check(&chain, "test").is_err());
        // Closing a bracket releases the powers inside it
        let grouped = "(2^2^2) + ".repeat(MAX_NESTING);
        assert!(check(&format!("{grouped}1"), "test").is_ok());
        // So does a binary operator after the power
        let sum = "x^2 + ".repeat(MAX_NESTING * 2);
        assert!(check(&format!("{sum}1"), "test").is_ok());
        // A sign in the exponent keeps the chain open
        let signed = vec!["2"; MAX_NESTING + 2].join("^-");
        assert!(check(&signed, "test").is_err());
    }

    #[test]
    fn test_operator_count_is_bounded() {
        let source = format!("{}1", "1 + ".repeat(MAX_OPERATORS));
        assert!(check(&source, "test").is_ok());
        let source = format!("{}1", "1 + ".repeat(MAX_OPERATORS + 1));
        let diagnostic = check(&source, "test").expect_err("too long");
        assert!(diagnostic.message.contains("operators"));
    }

    #[test]
    fn test_unbalanced_closers_are_ignored() {
        assert!(check("1)) + (2", "test").is_ok());
    }
}
