//! Restartable tokenizer for indentation-structured, Python-like source.
//!
//! The tokenizer turns source text into [`Token`]s: names, keywords, operators, typed literal
//! constants, and the layout tokens `NewLine`, `Indent` and `Dedent` that carry the block
//! structure. It is built for interactive and editor use:
//!
//! - It never fails. Malformed input becomes [`TokenKind::Error`] tokens and [`Diagnostic`]s.
//! - It is restartable. [`TokenizerState`] captures everything carried between tokens, so a
//!   later input chunk can be tokenized as if it had been part of one input all along.
//! - An unterminated triple-quoted string at the end of a chunk can be continued by the next
//!   one, see [`TokenizerOptions::TOLERANT_STRINGS`].
//!
//! # Key Components
//!
//! - [`SourceBuffer`] - Character cursor with position tracking and pushback
//! - [`TokenizerState`] - Indentation stack, bracket depths, open string literal
//! - [`Tokenizer`] - The scanning engine
//! - [`parse_integer`], [`parse_float`], [`parse_string`] - Literal conversion
//! - [`Diagnostics`] - Shared sink for problems found while scanning
//!
//! # Examples
//!
//! ```rust
//! use ironscope::tokenizer::{Literal, TokenKind, Tokenizer, TokenizerConfig};
//!
//! let tokens: Vec<_> = Tokenizer::new("answer = 0x2a\n", TokenizerConfig::default()).collect();
//! assert_eq!(tokens[2].kind, TokenKind::Constant(Literal::Int(42)));
//! assert_eq!(tokens[2].span.start.column, 10);
//! ```

mod diagnostics;
mod keywords;
mod literal;
mod options;
mod scanner;
mod source;
mod state;
mod token;

pub use diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSeverity, Diagnostics};
pub use keywords::{Keyword, Operator};
pub use literal::{
    parse_float, parse_imaginary, parse_integer, parse_string, Literal, LiteralError, StringFlags,
};
pub use options::{TokenizerConfig, TokenizerOptions};
pub use scanner::Tokenizer;
pub use source::{decode_source, Encoding, SourceBuffer, SourceLocation};
pub use state::{IncompleteString, LineIndentation, TokenizerState};
pub use token::{Span, Token, TokenKind};
