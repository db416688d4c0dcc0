use std::fmt;

use thiserror::Error;

/// Represents a byte span within a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceSpan {
    pub start: usize,
    pub end: usize,
}

impl SourceSpan {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Which stage of the pipeline produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    Lexer,
    Parser,
    Semantic,
    Runtime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// Rich diagnostic information surfaced to end users.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub message: String,
    pub span: Option<SourceSpan>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::Error,
            message: message.into(),
            span: None,
            notes: Vec::new(),
        }
    }

    pub fn warning(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::Warning,
            message: message.into(),
            span: None,
            notes: Vec::new(),
        }
    }

    pub fn with_span(mut self, span: SourceSpan) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }

    /// Render with a 1-based line:column position resolved against `source`.
    pub fn render(&self, source: &str) -> String {
        let mut out = match self.span {
            Some(span) => {
                let (line, column) = line_column(source, span.start);
                format!("{line}:{column}: {self}")
            }
            None => self.to_string(),
        };
        for note in &self.notes {
            out.push_str("\n  note: ");
            out.push_str(note);
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self.kind {
            DiagnosticKind::Lexer => "lex",
            DiagnosticKind::Parser => "parse",
            DiagnosticKind::Semantic => "semantic",
            DiagnosticKind::Runtime => "runtime",
        };
        let severity = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{severity}[{stage}]: {}", self.message)
    }
}

impl std::error::Error for Diagnostic {}

/// Translate a byte offset into a 1-based (line, column) pair.
pub fn line_column(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    for (idx, ch) in source.char_indices() {
        if idx >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}

/// Unified error type for the Ravun toolchain.
#[derive(Debug, Error)]
pub enum RavunError {
    #[error("{0}")]
    Diagnostic(#[from] Diagnostic),
    #[error("compilation failed with {} error(s)", .0.iter().filter(|d| !d.is_warning()).count())]
    Compile(Vec<Diagnostic>),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RavunError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_column_counts_newlines() {
        let source = "let a = 1;\nlet b = 2;\n";
        assert_eq!(line_column(source, 0), (1, 1));
        assert_eq!(line_column(source, 11), (2, 1));
        assert_eq!(line_column(source, 15), (2, 5));
    }

    #[test]
    fn render_includes_position_and_notes() {
        let source = "x\ny";
        let diag = Diagnostic::new(DiagnosticKind::Parser, "unexpected token")
            .with_span(SourceSpan::new(2, 3))
            .with_note("statements end with `;`");
        let rendered = diag.render(source);
        assert!(rendered.starts_with("2:1: error[parse]: unexpected token"));
        assert!(rendered.contains("note: statements end with `;`"));
    }
}
