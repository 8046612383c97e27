//! Character cursor over source text, and source encoding detection.
//!
//! [`SourceBuffer`] hands out one character at a time with position tracking. Line breaks are
//! normalized on the way out: `\r\n`, a lone `\r` and `\n` are all returned as a single `'\n'`,
//! while [`SourceBuffer::token_text`] still returns the untouched input.
//!
//! A buffer may begin at an arbitrary [`SourceLocation`], which lets a tokenizer resumed on the
//! second half of an input report spans in the coordinates of the whole input.

use std::{borrow::Cow, fmt};

/// A position in the source text.
///
/// `offset` is a byte offset, `line` and `column` are 1-based and count characters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceLocation {
    /// Byte offset from the start of the input
    pub offset: usize,
    /// 1-based line number
    pub line: u32,
    /// 1-based column, in characters
    pub column: u32,
}

impl SourceLocation {
    /// The first character of an input.
    pub const START: SourceLocation = SourceLocation {
        offset: 0,
        line: 1,
        column: 1,
    };
}

impl Default for SourceLocation {
    fn default() -> Self {
        Self::START
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Clone, Copy, Debug)]
struct Cursor {
    pos: usize,
    line: u32,
    column: u32,
}

/// A pull-based character source with pushback.
///
/// Every character consumed since the last [`SourceBuffer::mark_token_start`] can be pushed
/// back with [`SourceBuffer::back`], one at a time.
///
/// # Examples
///
/// ```rust
/// use ironscope::tokenizer::SourceBuffer;
///
/// let mut source = SourceBuffer::new("ab\r\nc");
/// source.mark_token_start();
/// assert_eq!(source.next_char(), Some('a'));
/// assert_eq!(source.next_char(), Some('b'));
/// assert_eq!(source.next_char(), Some('\n'));
/// assert_eq!(source.token_text(), "ab\r\n");
/// assert_eq!(source.position().line, 2);
/// assert!(source.back());
/// assert_eq!(source.peek(), Some('\n'));
/// ```
#[derive(Clone, Debug)]
pub struct SourceBuffer<'s> {
    text: Cow<'s, str>,
    base: usize,
    current: Cursor,
    start: Cursor,
    trail: Vec<Cursor>,
}

impl<'s> SourceBuffer<'s> {
    /// Create a buffer over `text`, starting at line 1, column 1.
    #[must_use]
    pub fn new(text: impl Into<Cow<'s, str>>) -> Self {
        Self::with_location(text, SourceLocation::START)
    }

    /// Create a buffer over `text` whose first character sits at `location`.
    #[must_use]
    pub fn with_location(text: impl Into<Cow<'s, str>>, location: SourceLocation) -> Self {
        let current = Cursor {
            pos: 0,
            line: location.line,
            column: location.column,
        };

        SourceBuffer {
            text: text.into(),
            base: location.offset,
            current,
            start: current,
            trail: Vec::new(),
        }
    }

    /// The whole text held by this buffer.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Decode the character at byte `pos`, folding line breaks into `'\n'`.
    fn decode(&self, pos: usize) -> Option<(char, usize)> {
        let c = self.text.get(pos..)?.chars().next()?;
        if c == '\r' {
            if self.text.as_bytes().get(pos + 1) == Some(&b'\n') {
                return Some(('\n', 2));
            }
            return Some(('\n', 1));
        }

        Some((c, c.len_utf8()))
    }

    /// The next character, without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<char> {
        self.decode(self.current.pos).map(|(c, _)| c)
    }

    /// The character `n` positions ahead, `peek_n(0)` being [`SourceBuffer::peek`].
    #[must_use]
    pub fn peek_n(&self, n: usize) -> Option<char> {
        let mut pos = self.current.pos;
        for _ in 0..n {
            let (_, len) = self.decode(pos)?;
            pos += len;
        }

        self.decode(pos).map(|(c, _)| c)
    }

    /// Consume and return the next character.
    pub fn next_char(&mut self) -> Option<char> {
        let (c, len) = self.decode(self.current.pos)?;

        self.trail.push(self.current);
        self.current.pos += len;
        if c == '\n' {
            self.current.line += 1;
            self.current.column = 1;
        } else {
            self.current.column += 1;
        }

        Some(c)
    }

    /// Push back the last consumed character.
    ///
    /// Returns `false` once the token start is reached.
    pub fn back(&mut self) -> bool {
        match self.trail.pop() {
            Some(cursor) => {
                self.current = cursor;
                true
            }
            None => false,
        }
    }

    /// Start a new token at the current position.
    pub fn mark_token_start(&mut self) {
        self.trail.clear();
        self.start = self.current;
    }

    /// The raw input between the token start and the current position.
    #[must_use]
    pub fn token_text(&self) -> &str {
        self.text
            .get(self.start.pos..self.current.pos)
            .unwrap_or_default()
    }

    /// Where the current token started.
    #[must_use]
    pub fn token_start(&self) -> SourceLocation {
        self.location(self.start)
    }

    /// The current position.
    #[must_use]
    pub fn position(&self) -> SourceLocation {
        self.location(self.current)
    }

    /// Returns `true` once every character has been consumed.
    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.current.pos >= self.text.len()
    }

    fn location(&self, cursor: Cursor) -> SourceLocation {
        SourceLocation {
            offset: self.base + cursor.pos,
            line: cursor.line,
            column: cursor.column,
        }
    }
}

impl<'s> From<&'s str> for SourceBuffer<'s> {
    fn from(text: &'s str) -> Self {
        SourceBuffer::new(text)
    }
}

impl From<String> for SourceBuffer<'static> {
    fn from(text: String) -> Self {
        SourceBuffer::new(text)
    }
}

/// The character encoding a source file was decoded with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Encoding {
    /// UTF-8, the default
    Utf8,
    /// UTF-8 with a byte order mark, which was stripped
    Utf8Bom,
    /// ISO-8859-1
    Latin1,
    /// 7-bit ASCII; other bytes become U+FFFD
    Ascii,
    /// A declared encoding that is not supported; the text was decoded as lossy UTF-8
    Unknown(String),
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Utf8 => write!(f, "utf-8"),
            Encoding::Utf8Bom => write!(f, "utf-8-sig"),
            Encoding::Latin1 => write!(f, "latin-1"),
            Encoding::Ascii => write!(f, "ascii"),
            Encoding::Unknown(name) => write!(f, "{name}"),
        }
    }
}

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decode raw source bytes into text.
///
/// A UTF-8 byte order mark wins over everything else. Otherwise a `coding:` (or `coding=`)
/// declaration in a comment on line 1, or on line 2 when line 1 is blank or a comment, selects
/// the encoding. Undeclared input is UTF-8. Invalid sequences are replaced with U+FFFD.
///
/// # Examples
///
/// ```rust
/// use ironscope::tokenizer::{decode_source, Encoding};
///
/// let (text, encoding) = decode_source(b"# -*- coding: latin-1 -*-\nx = '\xe9'\n");
/// assert_eq!(encoding, Encoding::Latin1);
/// assert!(text.ends_with("'\u{e9}'\n"));
/// ```
#[must_use]
pub fn decode_source(bytes: &[u8]) -> (String, Encoding) {
    let (text, encoding, _) = decode(bytes);
    (text, encoding)
}

/// Like [`decode_source`], also telling whether any byte had to be replaced.
pub(crate) fn decode(bytes: &[u8]) -> (String, Encoding, bool) {
    if let Some(rest) = bytes.strip_prefix(UTF8_BOM) {
        let (text, lossy) = utf8(rest);
        return (text, Encoding::Utf8Bom, lossy);
    }

    let encoding = declared_encoding(bytes).map_or(Encoding::Utf8, |name| {
        match normalize(&name).as_str() {
            "utf-8" | "utf8" | "utf-8-sig" => Encoding::Utf8,
            "latin-1" | "latin1" | "iso-8859-1" | "iso8859-1" | "l1" => Encoding::Latin1,
            "ascii" | "us-ascii" => Encoding::Ascii,
            _ => Encoding::Unknown(name),
        }
    });

    match encoding {
        Encoding::Latin1 => (bytes.iter().copied().map(char::from).collect(), encoding, false),
        Encoding::Ascii => {
            let lossy = !bytes.is_ascii();
            let text = bytes
                .iter()
                .map(|&b| {
                    if b.is_ascii() {
                        char::from(b)
                    } else {
                        char::REPLACEMENT_CHARACTER
                    }
                })
                .collect();
            (text, encoding, lossy)
        }
        _ => {
            let (text, lossy) = utf8(bytes);
            (text, encoding, lossy)
        }
    }
}

fn utf8(bytes: &[u8]) -> (String, bool) {
    match String::from_utf8_lossy(bytes) {
        Cow::Borrowed(text) => (text.to_string(), false),
        Cow::Owned(text) => (text, true),
    }
}

fn normalize(name: &str) -> String {
    name.to_ascii_lowercase().replace('_', "-")
}

/// Find a coding declaration in the first two lines.
fn declared_encoding(bytes: &[u8]) -> Option<String> {
    let mut lines = bytes.split(|&b| b == b'\n').take(2);

    let first = lines.next()?;
    if let Some(name) = coding_in(first) {
        return Some(name);
    }

    let first = trim_start(first);
    if first.is_empty() || first[0] == b'#' || first == b"\r" {
        return lines.next().and_then(coding_in);
    }

    None
}

fn trim_start(line: &[u8]) -> &[u8] {
    let skip = line
        .iter()
        .take_while(|&&b| b == b' ' || b == b'\t' || b == b'\x0c')
        .count();
    &line[skip..]
}

fn coding_in(line: &[u8]) -> Option<String> {
    let line = trim_start(line);
    if line.first() != Some(&b'#') {
        return None;
    }

    let at = line.windows(6).position(|w| w == b"coding")?;
    let rest = &line[at + 6..];
    if !matches!(rest.first(), Some(b':' | b'=')) {
        return None;
    }

    let rest = trim_start(&rest[1..]);
    let name: Vec<u8> = rest
        .iter()
        .copied()
        .take_while(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
        .collect();
    if name.is_empty() {
        return None;
    }

    String::from_utf8(name).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newlines_are_folded() {
        let mut source = SourceBuffer::new("a\r\nb\rc\n");
        let mut seen = String::new();
        while let Some(c) = source.next_char() {
            seen.push(c);
        }

        assert_eq!(seen, "a\nb\nc\n");
        assert_eq!(
            source.position(),
            SourceLocation {
                offset: 7,
                line: 4,
                column: 1
            }
        );
    }

    #[test]
    fn peek_ahead() {
        let source = SourceBuffer::new("x\r\ny");
        assert_eq!(source.peek(), Some('x'));
        assert_eq!(source.peek_n(1), Some('\n'));
        assert_eq!(source.peek_n(2), Some('y'));
        assert_eq!(source.peek_n(3), None);
    }

    #[test]
    fn pushback_to_token_start() {
        let mut source = SourceBuffer::new("héllo");
        source.next_char();
        source.mark_token_start();

        source.next_char();
        source.next_char();
        assert_eq!(source.token_text(), "él");
        assert_eq!(source.position().column, 4);

        assert!(source.back());
        assert!(source.back());
        assert!(!source.back());
        assert_eq!(source.position(), source.token_start());
        assert_eq!(source.peek(), Some('é'));
    }

    #[test]
    fn resumed_location() {
        let start = SourceLocation {
            offset: 10,
            line: 3,
            column: 1,
        };
        let mut source = SourceBuffer::with_location(String::from("ab\ncd"), start);
        while source.next_char().is_some() {}

        assert!(source.is_eof());
        assert_eq!(
            source.position(),
            SourceLocation {
                offset: 15,
                line: 4,
                column: 3
            }
        );
    }

    #[test]
    fn encodings() {
        let (text, encoding) = decode_source(b"\xEF\xBB\xBFx = 1\n");
        assert_eq!(encoding, Encoding::Utf8Bom);
        assert_eq!(text, "x = 1\n");

        let (_, encoding) = decode_source(b"#!/usr/bin/env python\n# coding=ascii\n");
        assert_eq!(encoding, Encoding::Ascii);

        let (_, encoding) = decode_source(b"x = 1\n# coding: latin-1\n");
        assert_eq!(encoding, Encoding::Utf8);

        let (text, encoding, lossy) = decode(b"# vim: set fileencoding=cp1252 :\n\x80\n");
        assert_eq!(encoding, Encoding::Unknown("cp1252".to_string()));
        assert!(lossy);
        assert!(text.contains(char::REPLACEMENT_CHARACTER));
    }
}
