//! Reserved words and operator spellings.

use std::fmt;

use strum::{Display, EnumCount, EnumIter, EnumString, IntoStaticStr};

/// A reserved word.
///
/// Matching is exact and case sensitive. `print` is only reserved while the
/// [`crate::tokenizer::TokenizerOptions::PRINT_FUNCTION`] option is off.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, EnumIter, EnumCount,
)]
#[strum(serialize_all = "lowercase")]
#[allow(missing_docs)]
pub enum Keyword {
    And,
    As,
    Assert,
    Break,
    Class,
    Continue,
    Def,
    Del,
    Elif,
    Else,
    Except,
    Exec,
    Finally,
    For,
    From,
    Global,
    If,
    Import,
    In,
    Is,
    Lambda,
    Nonlocal,
    Not,
    Or,
    Pass,
    Print,
    Raise,
    Return,
    Try,
    While,
    With,
    Yield,
    #[strum(serialize = "None")]
    None,
    #[strum(serialize = "True")]
    True,
    #[strum(serialize = "False")]
    False,
}

impl Keyword {
    /// The source spelling.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// An operator or delimiter.
///
/// Scanning uses maximal munch: the longest spelling that matches wins, so `**=` is one
/// [`Operator::DoubleStarEqual`] rather than `**` followed by `=`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumString, IntoStaticStr, EnumIter)]
#[allow(missing_docs)]
pub enum Operator {
    #[strum(serialize = "+")]
    Plus,
    #[strum(serialize = "-")]
    Minus,
    #[strum(serialize = "*")]
    Star,
    #[strum(serialize = "**")]
    DoubleStar,
    #[strum(serialize = "/")]
    Slash,
    #[strum(serialize = "//")]
    DoubleSlash,
    #[strum(serialize = "%")]
    Percent,
    #[strum(serialize = "<<")]
    LeftShift,
    #[strum(serialize = ">>")]
    RightShift,
    #[strum(serialize = "&")]
    Ampersand,
    #[strum(serialize = "|")]
    Pipe,
    #[strum(serialize = "^")]
    Caret,
    #[strum(serialize = "~")]
    Tilde,
    #[strum(serialize = "<")]
    Less,
    #[strum(serialize = ">")]
    Greater,
    #[strum(serialize = "<=")]
    LessEqual,
    #[strum(serialize = ">=")]
    GreaterEqual,
    #[strum(serialize = "==")]
    Equal,
    #[strum(serialize = "!=")]
    NotEqual,
    #[strum(serialize = "<>")]
    LessGreater,
    #[strum(serialize = "(")]
    LeftParen,
    #[strum(serialize = ")")]
    RightParen,
    #[strum(serialize = "[")]
    LeftBracket,
    #[strum(serialize = "]")]
    RightBracket,
    #[strum(serialize = "{")]
    LeftBrace,
    #[strum(serialize = "}")]
    RightBrace,
    #[strum(serialize = ",")]
    Comma,
    #[strum(serialize = ":")]
    Colon,
    #[strum(serialize = ".")]
    Dot,
    #[strum(serialize = "...")]
    Ellipsis,
    #[strum(serialize = ";")]
    Semicolon,
    #[strum(serialize = "@")]
    At,
    #[strum(serialize = "=")]
    Assign,
    #[strum(serialize = "->")]
    Arrow,
    #[strum(serialize = "`")]
    Backquote,
    #[strum(serialize = "+=")]
    PlusEqual,
    #[strum(serialize = "-=")]
    MinusEqual,
    #[strum(serialize = "*=")]
    StarEqual,
    #[strum(serialize = "/=")]
    SlashEqual,
    #[strum(serialize = "//=")]
    DoubleSlashEqual,
    #[strum(serialize = "%=")]
    PercentEqual,
    #[strum(serialize = "**=")]
    DoubleStarEqual,
    #[strum(serialize = ">>=")]
    RightShiftEqual,
    #[strum(serialize = "<<=")]
    LeftShiftEqual,
    #[strum(serialize = "&=")]
    AmpersandEqual,
    #[strum(serialize = "^=")]
    CaretEqual,
    #[strum(serialize = "|=")]
    PipeEqual,
}

/// The longest operator spelling, in characters.
pub const MAX_OPERATOR_LEN: usize = 3;

impl Operator {
    /// The source spelling.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Returns `true` for `(`, `[` and `{`.
    #[must_use]
    pub fn is_opening(self) -> bool {
        matches!(
            self,
            Operator::LeftParen | Operator::LeftBracket | Operator::LeftBrace
        )
    }

    /// Returns `true` for `)`, `]` and `}`.
    #[must_use]
    pub fn is_closing(self) -> bool {
        matches!(
            self,
            Operator::RightParen | Operator::RightBracket | Operator::RightBrace
        )
    }

    /// Returns `true` for `=` and the augmented assignments.
    #[must_use]
    pub fn is_assignment(self) -> bool {
        matches!(
            self,
            Operator::Assign
                | Operator::PlusEqual
                | Operator::MinusEqual
                | Operator::StarEqual
                | Operator::SlashEqual
                | Operator::DoubleSlashEqual
                | Operator::PercentEqual
                | Operator::DoubleStarEqual
                | Operator::RightShiftEqual
                | Operator::LeftShiftEqual
                | Operator::AmpersandEqual
                | Operator::CaretEqual
                | Operator::PipeEqual
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn keyword_spelling() {
        assert_eq!(Keyword::from_str("lambda").unwrap(), Keyword::Lambda);
        assert_eq!(Keyword::from_str("None").unwrap(), Keyword::None);
        assert!(Keyword::from_str("none").is_err());
        assert!(Keyword::from_str("Print").is_err());
        assert_eq!(Keyword::Nonlocal.as_str(), "nonlocal");
        assert_eq!(Keyword::COUNT, 35);
    }

    #[test]
    fn operators_round_trip_their_spelling() {
        for op in Operator::iter() {
            assert!(op.as_str().chars().count() <= MAX_OPERATOR_LEN);
            assert_eq!(Operator::from_str(op.as_str()).unwrap(), op);
            assert_eq!(op.to_string(), op.as_str());
        }
    }

    #[test]
    fn brace_spelling() {
        assert_eq!(Operator::LeftBrace.to_string(), "{");
        assert_eq!(format!("{}{}", Operator::LeftBrace, Operator::RightBrace), "{}");
        assert_eq!(Operator::from_str("}").unwrap(), Operator::RightBrace);
    }

    #[test]
    fn assignment_classes() {
        assert!(Operator::Assign.is_assignment());
        assert!(Operator::DoubleSlashEqual.is_assignment());
        assert!(Operator::PipeEqual.is_assignment());
        assert!(!Operator::Equal.is_assignment());
        assert!(!Operator::LessEqual.is_assignment());
        assert!(!Operator::Arrow.is_assignment());
    }
}
