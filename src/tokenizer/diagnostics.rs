//! Problems found while tokenizing.
//!
//! The tokenizer never fails. Everything it cannot make sense of is recorded here as a
//! [`Diagnostic`] attached to a source span, next to an [`crate::tokenizer::TokenKind::Error`]
//! token in the stream where one applies.
//!
//! [`Diagnostics`] is an append-only sink backed by `boxcar::Vec`. It can be shared through an
//! `Arc` between the tokenizers of several chunks of the same input, and read while they run.
//!
//! # Examples
//!
//! ```rust
//! use ironscope::tokenizer::{DiagnosticCode, Tokenizer, TokenizerConfig};
//!
//! let mut tokenizer = Tokenizer::new("x = $\n", TokenizerConfig::default());
//! let tokens: Vec<_> = tokenizer.by_ref().collect();
//!
//! let diagnostics = tokenizer.diagnostics();
//! assert_eq!(diagnostics.by_code(DiagnosticCode::BadCharacter).len(), 1);
//! assert!(diagnostics.has_errors());
//! # assert!(!tokens.is_empty());
//! ```

use std::fmt::{self, Write};

use crate::tokenizer::token::Span;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DiagnosticSeverity {
    /// Informational, nothing is wrong
    Info,
    /// Suspicious but well defined, e.g. mixed tabs and spaces
    Warning,
    /// The input is invalid at this location
    Error,
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticSeverity::Info => write!(f, "INFO"),
            DiagnosticSeverity::Warning => write!(f, "WARN"),
            DiagnosticSeverity::Error => write!(f, "ERROR"),
        }
    }
}

/// Classification of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    /// Generic invalid syntax: unmatched brackets, unterminated single-line strings
    SyntaxError,
    /// A dedent to a column no enclosing block uses
    IndentationError,
    /// Tabs and spaces mixed so that the meaning depends on the tab size
    InconsistentIndentation,
    /// A token cut off by the end of input
    IncompleteToken,
    /// Literal text that could not be converted
    BadLiteral,
    /// A character that starts no token
    BadCharacter,
    /// Undecodable input or an unsupported encoding declaration
    Encoding,
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiagnosticCode::SyntaxError => "SyntaxError",
            DiagnosticCode::IndentationError => "IndentationError",
            DiagnosticCode::InconsistentIndentation => "InconsistentIndentation",
            DiagnosticCode::IncompleteToken => "IncompleteToken",
            DiagnosticCode::BadLiteral => "BadLiteral",
            DiagnosticCode::BadCharacter => "BadCharacter",
            DiagnosticCode::Encoding => "Encoding",
        };
        f.write_str(name)
    }
}

/// A single problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// How bad it is
    pub severity: DiagnosticSeverity,
    /// What kind of problem it is
    pub code: DiagnosticCode,
    /// Human readable description
    pub message: String,
    /// The offending source text
    pub span: Span,
}

impl Diagnostic {
    /// Create a diagnostic.
    pub fn new(
        severity: DiagnosticSeverity,
        code: DiagnosticCode,
        message: impl Into<String>,
        span: Span,
    ) -> Self {
        Diagnostic {
            severity,
            code,
            message: message.into(),
            span,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} at {}: {}",
            self.severity, self.code, self.span.start, self.message
        )
    }
}

/// Append-only, thread-safe collection of diagnostics.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: boxcar::Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Diagnostics {
            entries: boxcar::Vec::new(),
        }
    }

    /// Record a diagnostic.
    pub fn push(&self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    /// Number of recorded diagnostics.
    #[must_use]
    pub fn count(&self) -> usize {
        self.entries.count()
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Returns `true` if an error-severity diagnostic was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.iter()
            .any(|d| d.severity == DiagnosticSeverity::Error)
    }

    /// Number of error-severity diagnostics.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.iter()
            .filter(|d| d.severity == DiagnosticSeverity::Error)
            .count()
    }

    /// Number of warning-severity diagnostics.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.iter()
            .filter(|d| d.severity == DiagnosticSeverity::Warning)
            .count()
    }

    /// All diagnostics in the order they were recorded.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().map(|(_, d)| d)
    }

    /// Diagnostics of one kind.
    #[must_use]
    pub fn by_code(&self, code: DiagnosticCode) -> Vec<&Diagnostic> {
        self.iter().filter(|d| d.code == code).collect()
    }

    /// A printable report with one line per diagnostic.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut output = String::new();
        let _ = writeln!(
            output,
            "Diagnostics: {} error(s), {} warning(s)",
            self.error_count(),
            self.warning_count()
        );

        for diagnostic in self.iter() {
            let _ = writeln!(output, "  {diagnostic}");
        }

        output
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}
