//! Error formatting for parser errors
//!
//! Converts chumsky errors into diagnostics, with fix-its for unbalanced
//! parentheses and braces

use crate::ast::Span;
use crate::diagnostics::{Diagnostic, DiagnosticKind, FixIt};
use chumsky::error::{Rich, RichReason};

/// Convert a chumsky error reason to a readable message
pub fn format_error_reason(reason: &RichReason<char>) -> String {
    match reason {
        RichReason::ExpectedFound { found: None, .. } => "unexpected end of input".to_string(),
        RichReason::ExpectedFound {
            found: Some(c), ..
        } => format!("unexpected '{}'", c.escape_debug()),
        RichReason::Custom(msg) => msg.to_string(),
    }
}

/// Convert chumsky parse errors to diagnostics
pub fn errors_to_diagnostics(errors: Vec<Rich<char>>, filename: &str, source: &str) -> Vec<Diagnostic> {
    errors
        .into_iter()
        .map(|e| {
            let span = Span::new(e.span().start, e.span().end);
            let diag = Diagnostic::error(
                DiagnosticKind::Parse,
                format_error_reason(e.reason()),
                span,
                filename.to_string(),
            );
            augment_with_fixits(diag, e.reason(), span, source)
        })
        .collect()
}

fn augment_with_fixits(diag: Diagnostic, reason: &RichReason<char>, span: Span, source: &str) -> Diagnostic {
    let RichReason::ExpectedFound { found, .. } = reason else {
        return diag;
    };
    match found.as_deref() {
        None => {
            let closers = missing_closers(source);
            if closers.is_empty() {
                diag.with_suggestion("the expression ends before an operand")
            } else {
                let fix = FixIt::insert(span.end, closers.clone(), format!("Insert '{closers}'"));
                diag.with_suggestion("unclosed parenthesis or brace").with_fix(fix)
            }
        }
        Some(ch @ (')' | '}')) => diag.with_fix(FixIt::replace(span, "", format!("Remove '{ch}'"))),
        Some(' ') => diag.with_suggestion(
            "implicit multiplication needs the number written directly against its operand, as in `4x`",
        ),
        Some(_) => diag,
    }
}

/// Closing delimiters needed at the end of `source` to balance it
fn missing_closers(source: &str) -> String {
    let mut stack = Vec::new();
    for ch in source.chars() {
        match ch {
            '(' => stack.push(')'),
            '{' => stack.push('}'),
            ')' | '}' => {
                if let Some(pos) = stack.iter().rposition(|c| *c == ch) {
                    stack.remove(pos);
                }
            }
            _ => {}
        }
    }
    stack.into_iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_closers() {
        assert_eq!(missing_closers("4x*(1-x"), ")");
        assert_eq!(missing_closers("Complex{BigFloat{64"), "}}");
        assert_eq!(missing_closers("((1)"), ")");
        assert_eq!(missing_closers("1+2"), "");
    }
}
