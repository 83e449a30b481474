//! User-facing diagnostics with source snippets
//!
//! Parse errors arrive here from chumsky; evaluation and lowering errors
//! are converted by [`crate::pipeline`] so that every failure the CLI
//! prints shares one layout:
//!
//! ```text
//! error[eval]: division by zero in `(a / b)`
//!   --> <input>:1:1
//!   |
//! 1 | a/b
//!   | ^~~
//!   |
//! ```

use crate::ast::Span;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

/// Which stage produced the diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    Parse,
    Eval,
    Lower,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::Parse => "parse",
            DiagnosticKind::Eval => "eval",
            DiagnosticKind::Lower => "lower",
        }
    }
}

/// A text edit that would fix the problem, in byte offsets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixIt {
    pub span: Span,
    pub replacement: String,
    /// Short label such as "Insert ')'"
    pub label: String,
}

impl FixIt {
    pub fn replace(span: Span, replacement: impl Into<String>, label: impl Into<String>) -> Self {
        FixIt {
            span,
            replacement: replacement.into(),
            label: label.into(),
        }
    }

    pub fn insert(at: usize, text: impl Into<String>, label: impl Into<String>) -> Self {
        FixIt::replace(Span::new(at, at), text, label)
    }

    /// Apply the edit to `source`
    pub fn apply(&self, source: &str) -> String {
        let start = self.span.start.min(source.len());
        let end = self.span.end.clamp(start, source.len());
        let mut fixed = String::with_capacity(source.len() + self.replacement.len());
        fixed.push_str(source.get(..start).unwrap_or(source));
        fixed.push_str(&self.replacement);
        fixed.push_str(source.get(end..).unwrap_or(""));
        fixed
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub message: String,
    pub span: Span,
    pub filename: String,
    pub notes: Vec<String>,
    pub help: Option<String>,
    /// Hints that don't imply an automatic edit
    pub suggestions: Vec<String>,
    pub fixits: Vec<FixIt>,
}

impl Diagnostic {
    pub fn error(kind: DiagnosticKind, message: String, span: Span, filename: String) -> Self {
        Self {
            kind,
            severity: Severity::Error,
            message,
            span,
            filename,
            notes: Vec::new(),
            help: None,
            suggestions: Vec::new(),
            fixits: Vec::new(),
        }
    }

    pub fn warning(kind: DiagnosticKind, message: String, span: Span, filename: String) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(kind, message, span, filename)
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_fix(mut self, fix: FixIt) -> Self {
        self.fixits.push(fix);
        self
    }

    /// Format the diagnostic with a source snippet
    pub fn format(&self, source: &str) -> String {
        let line_index = LineIndex::new(source);
        let formatter = DiagnosticFormatter {
            diagnostic: self,
            source,
            line_index: &line_index,
        };
        formatter.format()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}]: {} at {}:{}..{}",
            self.severity.as_str(),
            self.kind.as_str(),
            self.message,
            self.filename,
            self.span.start,
            self.span.end
        )
    }
}

/// Offset to line/column mapping
#[derive(Debug)]
pub struct LineIndex<'a> {
    source: &'a str,
    /// Starting byte offset of each line
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .char_indices()
                .filter(|(_, ch)| *ch == '\n')
                .map(|(i, _)| i + 1),
        );
        Self {
            source,
            line_starts,
        }
    }

    /// Convert byte offset to (line, column), both 1-indexed. Columns count
    /// characters, so `×` and `÷` take one column each.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.source.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        };
        let line_start = self.line_starts[line];
        let col = match self.source.get(line_start..offset) {
            Some(text) => text.chars().count(),
            None => offset.saturating_sub(line_start),
        };
        (line + 1, col + 1)
    }

    /// Byte range of a line (1-indexed), excluding the newline
    pub fn line_range(&self, line: usize, source_len: usize) -> Option<(usize, usize)> {
        if line == 0 || line > self.line_starts.len() {
            return None;
        }
        let start = self.line_starts[line - 1];
        let end = match self.line_starts.get(line) {
            Some(next) => next.saturating_sub(1),
            None => source_len,
        };
        Some((start, end.max(start)))
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

struct DiagnosticFormatter<'a> {
    diagnostic: &'a Diagnostic,
    source: &'a str,
    line_index: &'a LineIndex<'a>,
}

impl DiagnosticFormatter<'_> {
    fn format(&self) -> String {
        let diagnostic = self.diagnostic;
        let mut output = format!(
            "{}[{}]: {}\n",
            diagnostic.severity.as_str(),
            diagnostic.kind.as_str(),
            diagnostic.message
        );

        let (start_line, start_col) = self.line_index.line_col(diagnostic.span.start);
        let (end_line, end_col) = self.line_index.line_col(diagnostic.span.end);
        output.push_str(&format!(
            "  --> {}:{}:{}\n",
            diagnostic.filename, start_line, start_col
        ));
        output.push_str(&self.format_snippet(start_line, start_col, end_line, end_col));

        for note in &diagnostic.notes {
            output.push_str(&format!("note: {note}\n"));
        }
        if let Some(help) = &diagnostic.help {
            output.push_str(&format!("help: {help}\n"));
        }
        for suggestion in &diagnostic.suggestions {
            output.push_str(&format!("suggestion: {suggestion}\n"));
        }
        for fix in &diagnostic.fixits {
            output.push_str(&format!("fix: {}\n", fix.label));
        }
        output
    }

    fn format_snippet(
        &self,
        start_line: usize,
        start_col: usize,
        end_line: usize,
        end_col: usize,
    ) -> String {
        let width = end_line.max(start_line).to_string().len();
        let gutter = format!("{:width$} |", "");
        let mut output = format!("{gutter}\n");

        for line_num in start_line..=end_line.min(self.line_index.line_count()) {
            let Some((line_start, line_end)) =
                self.line_index.line_range(line_num, self.source.len())
            else {
                continue;
            };
            let line_text = self.source.get(line_start..line_end).unwrap_or("");
            output.push_str(&format!("{line_num:width$} | {line_text}\n"));

            let from = if line_num == start_line { start_col - 1 } else { 0 };
            let to = if line_num == end_line {
                end_col - 1
            } else {
                line_text.chars().count()
            };
            let underline_width = to.saturating_sub(from).max(1);
            output.push_str(&format!(
                "{gutter} {}^{}\n",
                " ".repeat(from),
                "~".repeat(underline_width - 1)
            ));
        }

        output.push_str(&format!("{gutter}\n"));
        output
    }
}
