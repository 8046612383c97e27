//! Tokens and source spans.

use std::fmt;

use crate::tokenizer::{
    keywords::{Keyword, Operator},
    literal::Literal,
    source::SourceLocation,
    state::IncompleteString,
};

/// A half-open range of source text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Span {
    /// First character of the token
    pub start: SourceLocation,
    /// Position just past the token
    pub end: SourceLocation,
}

impl Span {
    /// A span from `start` to `end`.
    #[must_use]
    pub fn new(start: SourceLocation, end: SourceLocation) -> Self {
        Span { start, end }
    }

    /// An empty span at `location`.
    #[must_use]
    pub fn at(location: SourceLocation) -> Self {
        Span {
            start: location,
            end: location,
        }
    }

    /// Returns `true` for spans that cover no text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start.offset == self.end.offset
    }

    /// Byte length of the covered text.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end.offset.saturating_sub(self.start.offset)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// What a token is.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    /// End of input, always the last token
    EndOfFile,
    /// End of a logical line
    NewLine,
    /// A line break that does not end a logical line, emitted in verbatim mode only
    NL,
    /// The block indentation grew
    Indent,
    /// One block indentation level was closed
    Dedent,
    /// An identifier
    Name(String),
    /// A reserved word
    Keyword(Keyword),
    /// A numeric or string literal
    Constant(Literal),
    /// A comment including its `#`, emitted in verbatim mode only
    Comment(String),
    /// An operator or delimiter
    Operator(Operator),
    /// Text that could not be tokenized, with the reason
    Error(String),
    /// A triple-quoted string cut off by the end of input, in tolerant mode
    IncompleteString(IncompleteString),
}

impl TokenKind {
    /// Returns `true` for [`TokenKind::NewLine`], [`TokenKind::NL`] and the indentation tokens.
    #[must_use]
    pub fn is_layout(&self) -> bool {
        matches!(
            self,
            TokenKind::NewLine | TokenKind::NL | TokenKind::Indent | TokenKind::Dedent
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::EndOfFile => write!(f, "ENDMARKER"),
            TokenKind::NewLine => write!(f, "NEWLINE"),
            TokenKind::NL => write!(f, "NL"),
            TokenKind::Indent => write!(f, "INDENT"),
            TokenKind::Dedent => write!(f, "DEDENT"),
            TokenKind::Name(name) => write!(f, "NAME {name}"),
            TokenKind::Keyword(keyword) => write!(f, "KEYWORD {keyword}"),
            TokenKind::Constant(literal) => write!(f, "CONSTANT {literal}"),
            TokenKind::Comment(text) => write!(f, "COMMENT {text}"),
            TokenKind::Operator(op) => write!(f, "OP {op}"),
            TokenKind::Error(message) => write!(f, "ERROR {message}"),
            TokenKind::IncompleteString(partial) => {
                write!(f, "INCOMPLETE {:?}", partial.content)
            }
        }
    }
}

/// A token and where it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    /// What was scanned
    pub kind: TokenKind,
    /// Where it was scanned
    pub span: Span,
}

impl Token {
    /// Create a token.
    #[must_use]
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }

    /// Returns `true` for [`TokenKind::EndOfFile`].
    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::EndOfFile
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.span, self.kind)
    }
}
