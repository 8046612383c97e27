//! Conversion of literal text into typed values.
//!
//! The scanner decides where a literal starts and ends; the functions here turn its text into
//! a [`Literal`]. Failures are returned as [`LiteralError`] so the scanner can report them and
//! substitute a zero value.

use std::fmt;

use bitflags::bitflags;
use thiserror::Error;

bitflags! {
    /// Prefix and quoting of a string literal.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct StringFlags: u8 {
        /// `r` prefix, escapes are kept verbatim
        const RAW = 0x01;
        /// `u` prefix, or an unprefixed literal under `UNICODE_LITERALS`
        const UNICODE = 0x02;
        /// `b` prefix
        const BYTES = 0x04;
        /// Triple quoted
        const TRIPLE = 0x08;
    }
}

impl StringFlags {
    /// Parse a string prefix such as `ur` or `Rb`.
    ///
    /// Returns `None` if `prefix` is not one of `r u b ur ub br rb` in any case.
    #[must_use]
    pub fn from_prefix(prefix: &str) -> Option<StringFlags> {
        let flags = match prefix.to_ascii_lowercase().as_str() {
            "" => StringFlags::empty(),
            "r" => StringFlags::RAW,
            "u" => StringFlags::UNICODE,
            "b" => StringFlags::BYTES,
            "ur" => StringFlags::UNICODE | StringFlags::RAW,
            "ub" => StringFlags::UNICODE | StringFlags::BYTES,
            "br" | "rb" => StringFlags::BYTES | StringFlags::RAW,
            _ => return None,
        };

        Some(flags)
    }
}

/// A typed literal value.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    /// An integer that fits in 64 bits
    Int(i64),
    /// A long integer, from an `L` suffix or a value beyond 64 bits
    Long(i128),
    /// A floating point number
    Float(f64),
    /// An imaginary number, `j` suffix
    Imaginary(f64),
    /// A plain string
    Str(String),
    /// A unicode string
    Unicode(String),
    /// A byte string
    Bytes(Vec<u8>),
}

impl Literal {
    /// The empty string of the kind `flags` select.
    #[must_use]
    pub fn empty_string(flags: StringFlags) -> Literal {
        if flags.contains(StringFlags::BYTES) {
            Literal::Bytes(Vec::new())
        } else if flags.contains(StringFlags::UNICODE) {
            Literal::Unicode(String::new())
        } else {
            Literal::Str(String::new())
        }
    }

    /// Widen an integer to a long, leaving other literals alone.
    #[must_use]
    pub fn into_long(self) -> Literal {
        match self {
            Literal::Int(value) => Literal::Long(i128::from(value)),
            other => other,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(value) => write!(f, "{value}"),
            Literal::Long(value) => write!(f, "{value}L"),
            Literal::Float(value) => write!(f, "{value:?}"),
            Literal::Imaginary(value) => write!(f, "{value:?}j"),
            Literal::Str(value) => write!(f, "{value:?}"),
            Literal::Unicode(value) => write!(f, "u{value:?}"),
            Literal::Bytes(value) => write!(f, "b{:?}", String::from_utf8_lossy(value)),
        }
    }
}

/// Why literal text could not be converted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LiteralError {
    /// No digits at all
    #[error("literal has no digits")]
    Empty,
    /// A digit outside the radix
    #[error("invalid digit '{0}' for radix {1}")]
    InvalidDigit(char, u32),
    /// An integer beyond 128 bits
    #[error("integer literal is too large")]
    Overflow,
    /// Text that is not a number
    #[error("malformed number '{0}'")]
    Malformed(String),
    /// An escape sequence that cannot be decoded
    #[error("invalid escape sequence '{0}'")]
    InvalidEscape(String),
    /// A non-ASCII character in a byte string
    #[error("bytes can only contain ASCII literal characters")]
    NonAscii,
}

/// Parse the digits of an integer, without prefix or suffix.
///
/// Values that fit in an `i64` become [`Literal::Int`], larger ones [`Literal::Long`].
///
/// # Errors
/// Returns [`LiteralError::Empty`], [`LiteralError::InvalidDigit`] or
/// [`LiteralError::Overflow`].
///
/// # Examples
///
/// ```rust
/// use ironscope::tokenizer::{parse_integer, Literal};
///
/// assert_eq!(parse_integer("ff", 16), Ok(Literal::Int(255)));
/// assert_eq!(
///     parse_integer("10000000000000000", 16),
///     Ok(Literal::Long(1 << 64))
/// );
/// ```
pub fn parse_integer(text: &str, radix: u32) -> Result<Literal, LiteralError> {
    if text.is_empty() {
        return Err(LiteralError::Empty);
    }
    if let Some(bad) = text.chars().find(|c| !c.is_digit(radix)) {
        return Err(LiteralError::InvalidDigit(bad, radix));
    }

    let value = i128::from_str_radix(text, radix).map_err(|_| LiteralError::Overflow)?;
    Ok(match i64::try_from(value) {
        Ok(small) => Literal::Int(small),
        Err(_) => Literal::Long(value),
    })
}

/// Parse a floating point literal such as `1.`, `.5` or `1e-3`.
///
/// # Errors
/// Returns [`LiteralError::Malformed`] if `text` is not a float literal.
pub fn parse_float(text: &str) -> Result<Literal, LiteralError> {
    float_value(text).map(Literal::Float)
}

/// Parse an imaginary literal, the text including its `j` suffix.
///
/// # Errors
/// Returns [`LiteralError::Malformed`] if `text` is not an imaginary literal.
pub fn parse_imaginary(text: &str) -> Result<Literal, LiteralError> {
    let body = text
        .strip_suffix(|c: char| c == 'j' || c == 'J')
        .ok_or_else(|| LiteralError::Malformed(text.to_string()))?;
    float_value(body).map(Literal::Imaginary)
}

fn float_value(text: &str) -> Result<f64, LiteralError> {
    let starts_well = text
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || c == '.');
    let only_float_chars = text
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if !starts_well || !only_float_chars {
        return Err(LiteralError::Malformed(text.to_string()));
    }

    text.parse::<f64>()
        .map_err(|_| LiteralError::Malformed(text.to_string()))
}

/// Decode the body of a string literal, the text between its quotes.
///
/// Raw literals are returned as written. Otherwise the usual escapes are processed:
/// `\n \t \\ \' \" \a \b \f \v \r`, octal `\ooo`, hex `\xhh` and a backslash before a newline,
/// which removes both. `\uXXXX` and `\UXXXXXXXX` are decoded in unicode literals only.
/// `\N{...}` and unknown escapes are kept verbatim.
///
/// # Errors
/// Returns [`LiteralError::InvalidEscape`] for a truncated `\x`, `\u` or `\U` escape or one that
/// names no character, and [`LiteralError::NonAscii`] for non-ASCII text in a byte string.
///
/// # Examples
///
/// ```rust
/// use ironscope::tokenizer::{parse_string, Literal, StringFlags};
///
/// assert_eq!(
///     parse_string(r"a\tb\x41", StringFlags::empty()),
///     Ok(Literal::Str("a\tbA".to_string()))
/// );
/// assert_eq!(
///     parse_string(r"é", StringFlags::UNICODE),
///     Ok(Literal::Unicode("é".to_string()))
/// );
/// ```
pub fn parse_string(body: &str, flags: StringFlags) -> Result<Literal, LiteralError> {
    let bytes = flags.contains(StringFlags::BYTES);
    if bytes && !body.is_ascii() {
        return Err(LiteralError::NonAscii);
    }

    let text = if flags.contains(StringFlags::RAW) {
        body.to_string()
    } else {
        unescape(body, flags.contains(StringFlags::UNICODE) && !bytes)?
    };

    Ok(if bytes {
        Literal::Bytes(text.chars().map(latin1_byte).collect())
    } else if flags.contains(StringFlags::UNICODE) {
        Literal::Unicode(text)
    } else {
        Literal::Str(text)
    })
}

/// Escapes in byte strings only produce values below 0x100.
#[allow(clippy::cast_possible_truncation)]
fn latin1_byte(c: char) -> u8 {
    u32::from(c) as u8
}

fn unescape(body: &str, unicode: bool) -> Result<String, LiteralError> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let Some(escape) = chars.next() else {
            out.push('\\');
            break;
        };

        match escape {
            '\n' => {}
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'v' => out.push('\x0b'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            '0'..='7' => {
                let mut value = escape.to_digit(8).unwrap_or_default();
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            value = value * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push(code_point(value, &format!("\\{value:o}"))?);
            }
            'x' => out.push(hex_escape(&mut chars, 2, 'x')?),
            'u' if unicode => out.push(hex_escape(&mut chars, 4, 'u')?),
            'U' if unicode => out.push(hex_escape(&mut chars, 8, 'U')?),
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }

    Ok(out)
}

fn hex_escape(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    digits: usize,
    kind: char,
) -> Result<char, LiteralError> {
    let mut text = String::with_capacity(digits);
    for _ in 0..digits {
        match chars.peek() {
            Some(c) if c.is_ascii_hexdigit() => {
                text.push(*c);
                chars.next();
            }
            _ => return Err(LiteralError::InvalidEscape(format!("\\{kind}{text}"))),
        }
    }

    let value = u32::from_str_radix(&text, 16)
        .map_err(|_| LiteralError::InvalidEscape(format!("\\{kind}{text}")))?;
    code_point(value, &format!("\\{kind}{text}"))
}

fn code_point(value: u32, escape: &str) -> Result<char, LiteralError> {
    char::from_u32(value).ok_or_else(|| LiteralError::InvalidEscape(escape.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers() {
        assert_eq!(parse_integer("0", 10), Ok(Literal::Int(0)));
        assert_eq!(parse_integer("777", 8), Ok(Literal::Int(511)));
        assert_eq!(parse_integer("1010", 2), Ok(Literal::Int(10)));
        assert_eq!(
            parse_integer("9223372036854775808", 10),
            Ok(Literal::Long(9_223_372_036_854_775_808))
        );
        assert_eq!(parse_integer("", 16), Err(LiteralError::Empty));
        assert_eq!(parse_integer("19", 8), Err(LiteralError::InvalidDigit('9', 8)));
        assert_eq!(
            parse_integer(&"f".repeat(40), 16),
            Err(LiteralError::Overflow)
        );
    }

    #[test]
    fn floats() {
        assert_eq!(parse_float("1."), Ok(Literal::Float(1.0)));
        assert_eq!(parse_float(".5"), Ok(Literal::Float(0.5)));
        assert_eq!(parse_float("2.5e-1"), Ok(Literal::Float(0.25)));
        assert_eq!(parse_imaginary("3j"), Ok(Literal::Imaginary(3.0)));
        assert_eq!(parse_imaginary("1.5J"), Ok(Literal::Imaginary(1.5)));
        assert!(parse_float("inf").is_err());
        assert!(parse_float("1e").is_err());
        assert!(parse_imaginary("3").is_err());
    }

    #[test]
    fn escapes() {
        let plain = StringFlags::empty();
        assert_eq!(
            parse_string(r#"\'\"\\\a\101\0"#, plain),
            Ok(Literal::Str("'\"\\\x07A\0".to_string()))
        );
        assert_eq!(
            parse_string("one \\\ntwo", plain),
            Ok(Literal::Str("one two".to_string()))
        );
        assert_eq!(
            parse_string(r"é\N{DASH}\q", plain),
            Ok(Literal::Str(r"é\N{DASH}\q".to_string()))
        );
        assert_eq!(
            parse_string(r"\U0001F600", StringFlags::UNICODE),
            Ok(Literal::Unicode("\u{1F600}".to_string()))
        );
        assert!(matches!(
            parse_string(r"\x4", plain),
            Err(LiteralError::InvalidEscape(_))
        ));
        assert!(matches!(
            parse_string(r"\ud800", StringFlags::UNICODE),
            Err(LiteralError::InvalidEscape(_))
        ));
    }

    #[test]
    fn raw_and_bytes() {
        assert_eq!(
            parse_string(r"a\nb", StringFlags::RAW),
            Ok(Literal::Str(r"a\nb".to_string()))
        );
        assert_eq!(
            parse_string(r"\xff\x00z", StringFlags::BYTES),
            Ok(Literal::Bytes(vec![0xFF, 0x00, b'z']))
        );
        assert_eq!(
            parse_string("é", StringFlags::BYTES),
            Err(LiteralError::NonAscii)
        );
        assert_eq!(StringFlags::from_prefix("Rb"), Some(StringFlags::BYTES | StringFlags::RAW));
        assert_eq!(StringFlags::from_prefix("bu"), None);
    }

    #[test]
    fn widening() {
        assert_eq!(Literal::Int(7).into_long(), Literal::Long(7));
        assert_eq!(Literal::Float(1.0).into_long(), Literal::Float(1.0));
        assert_eq!(Literal::Long(7).to_string(), "7L");
    }
}
