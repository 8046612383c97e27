//! Tokenizer configuration.

use bitflags::bitflags;

use crate::tokenizer::diagnostics::DiagnosticSeverity;

bitflags! {
    /// Language and mode switches.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct TokenizerOptions: u8 {
        /// Emit comments and non-logical line breaks
        const VERBATIM = 0x01;
        /// `print` is an ordinary name
        const PRINT_FUNCTION = 0x02;
        /// Unprefixed string literals are unicode
        const UNICODE_LITERALS = 0x04;
        /// No synthetic `NewLine`/`Dedent` tokens at the end of input
        const DONT_IMPLY_DEDENT = 0x08;
        /// A triple-quoted string cut off by the end of input yields `IncompleteString`
        const TOLERANT_STRINGS = 0x10;
    }
}

/// Settings for a [`crate::tokenizer::Tokenizer`].
///
/// ```rust
/// use ironscope::tokenizer::{TokenizerConfig, TokenizerOptions};
///
/// let config = TokenizerConfig {
///     options: TokenizerOptions::PRINT_FUNCTION,
///     ..TokenizerConfig::strict()
/// };
/// assert_eq!(config.tab_size, 8);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenizerConfig {
    /// Mode switches
    pub options: TokenizerOptions,
    /// Severity for mixed tab/space indentation, `None` to skip the check
    pub indentation_check: Option<DiagnosticSeverity>,
    /// Column multiple a tab advances to
    pub tab_size: usize,
    /// Diagnostics past this many are dropped
    pub max_diagnostics: usize,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        TokenizerConfig {
            options: TokenizerOptions::empty(),
            indentation_check: Some(DiagnosticSeverity::Warning),
            tab_size: 8,
            max_diagnostics: 100,
        }
    }
}

impl TokenizerConfig {
    /// Read-eval-print input: input arrives in chunks, so nothing is implied at the end of one
    /// and an open triple-quoted string is continued by the next.
    #[must_use]
    pub fn interactive() -> Self {
        TokenizerConfig {
            options: TokenizerOptions::TOLERANT_STRINGS | TokenizerOptions::DONT_IMPLY_DEDENT,
            ..Self::default()
        }
    }

    /// Editors: keep comments and blank lines, tolerate unfinished strings.
    #[must_use]
    pub fn ide() -> Self {
        TokenizerConfig {
            options: TokenizerOptions::VERBATIM | TokenizerOptions::TOLERANT_STRINGS,
            indentation_check: Some(DiagnosticSeverity::Warning),
            ..Self::default()
        }
    }

    /// Batch compilation: mixed indentation is an error.
    #[must_use]
    pub fn strict() -> Self {
        TokenizerConfig {
            options: TokenizerOptions::empty(),
            indentation_check: Some(DiagnosticSeverity::Error),
            ..Self::default()
        }
    }

    /// Returns `true` if `option` is set.
    #[must_use]
    pub fn has(&self, option: TokenizerOptions) -> bool {
        self.options.contains(option)
    }
}
