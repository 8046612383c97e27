//! The restartable part of the tokenizer.
//!
//! [`TokenizerState`] holds everything that carries over from one token to the next, apart
//! from the position in the input. Snapshot it with [`crate::tokenizer::Tokenizer::state`],
//! and hand it to [`crate::tokenizer::Tokenizer::with_state`] together with the rest of the
//! input to continue exactly where the snapshot was taken.

use crate::tokenizer::{literal::StringFlags, source::SourceLocation};

/// A triple-quoted string literal left open at the end of an input chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncompleteString {
    /// The quote character, `'` or `"`
    pub quote: char,
    /// Prefix and quoting of the literal
    pub flags: StringFlags,
    /// Body text so far, escapes unprocessed
    pub content: String,
    /// Where the literal, including its prefix, started
    pub start: SourceLocation,
}

impl IncompleteString {
    /// Returns `true` if the body ends in an unpaired backslash, which escapes whatever
    /// character comes next.
    #[must_use]
    pub fn ends_in_escape(&self) -> bool {
        self.content.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
    }
}

/// Leading whitespace of a physical line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LineIndentation {
    /// Width with tabs expanded to the configured tab size
    pub width: usize,
    /// Width with every tab counting as one column
    pub alt: usize,
    /// The whitespace itself
    pub text: String,
}

/// Scanner state between two tokens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenizerState {
    /// Open indentation widths, strictly increasing; never empty
    pub indent: Vec<usize>,
    /// The whitespace that opened each level in `indent`
    pub indent_format: Vec<String>,
    /// Dedents still to emit; `-1` means one `Indent` is pending
    pub pending_dedents: i32,
    /// Open `(`
    pub paren_level: u32,
    /// Open `{`
    pub brace_level: u32,
    /// Open `[`
    pub bracket_level: u32,
    /// A string literal to continue with the next input
    pub incomplete: Option<IncompleteString>,
    /// No token other than layout has been emitted since the last `NewLine`
    pub last_newline: bool,
    /// The next character begins a physical line whose indentation is not yet measured
    pub at_line_start: bool,
    /// Leading whitespace of the current line read before the input ran out
    pub line_indent: LineIndentation,
}

impl Default for TokenizerState {
    fn default() -> Self {
        TokenizerState {
            indent: vec![0],
            indent_format: vec![String::new()],
            pending_dedents: 0,
            paren_level: 0,
            brace_level: 0,
            bracket_level: 0,
            incomplete: None,
            last_newline: true,
            at_line_start: true,
            line_indent: LineIndentation::default(),
        }
    }
}

impl TokenizerState {
    /// State for the start of an input.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// State for a fragment that is already nested in blocks at the given widths.
    ///
    /// Widths are sorted and deduplicated. Levels written as spaces are assumed.
    #[must_use]
    pub fn with_indentation(levels: &[usize]) -> Self {
        let mut indent: Vec<usize> = levels.to_vec();
        indent.sort_unstable();
        indent.dedup();
        if indent.is_empty() {
            indent.push(0);
        }

        let indent_format = indent.iter().map(|&width| " ".repeat(width)).collect();
        TokenizerState {
            indent,
            indent_format,
            ..Self::default()
        }
    }

    /// The innermost indentation width.
    #[must_use]
    pub fn indent_level(&self) -> usize {
        self.indent.last().copied().unwrap_or_default()
    }

    /// Number of open indentation levels above the outermost one.
    #[must_use]
    pub fn indent_depth(&self) -> usize {
        self.indent.len().saturating_sub(1)
    }

    /// Total number of open brackets of all kinds.
    #[must_use]
    pub fn grouping_level(&self) -> u32 {
        self.paren_level + self.brace_level + self.bracket_level
    }

    /// Returns `true` while any bracket is open, which makes line breaks insignificant.
    #[must_use]
    pub fn in_grouping(&self) -> bool {
        self.grouping_level() > 0
    }
}
