//! The scanning engine.
//!
//! [`Tokenizer`] pulls characters from a [`SourceBuffer`] and produces one [`Token`] per call.
//! Block structure is tracked with an indentation stack: a line indented deeper than the
//! innermost level yields `Indent`, a shallower one yields one `Dedent` per closed level. While
//! a bracket is open, line breaks and indentation carry no meaning.
//!
//! Indentation is measured lazily. Only when the first real token of a line is found is its
//! width compared with the stack, so blank and comment-only lines never open or close blocks.

use std::{cmp::Ordering, str::FromStr, sync::Arc};

use log::debug;

use crate::tokenizer::{
    diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSeverity, Diagnostics},
    keywords::{Keyword, Operator, MAX_OPERATOR_LEN},
    literal::{
        parse_float, parse_imaginary, parse_integer, parse_string, Literal, LiteralError,
        StringFlags,
    },
    options::{TokenizerConfig, TokenizerOptions},
    source::{self, Encoding, SourceBuffer, SourceLocation},
    state::{IncompleteString, LineIndentation, TokenizerState},
    token::{Span, Token, TokenKind},
};

enum LineStart {
    Token(Token),
    Blank,
    Code,
}

/// A restartable tokenizer for indentation-structured source text.
///
/// The tokenizer is an [`Iterator`] over [`Token`]s that ends after
/// [`TokenKind::EndOfFile`]. It never fails: problems become [`TokenKind::Error`] tokens and
/// entries in [`Tokenizer::diagnostics`].
///
/// # Examples
///
/// ```rust
/// use ironscope::tokenizer::{Keyword, Operator, TokenKind, Tokenizer, TokenizerConfig};
///
/// let source = "if ready:\n    go()\n";
/// let kinds: Vec<TokenKind> = Tokenizer::new(source, TokenizerConfig::default())
///     .map(|token| token.kind)
///     .collect();
///
/// assert_eq!(
///     kinds,
///     [
///         TokenKind::Keyword(Keyword::If),
///         TokenKind::Name("ready".into()),
///         TokenKind::Operator(Operator::Colon),
///         TokenKind::NewLine,
///         TokenKind::Indent,
///         TokenKind::Name("go".into()),
///         TokenKind::Operator(Operator::LeftParen),
///         TokenKind::Operator(Operator::RightParen),
///         TokenKind::NewLine,
///         TokenKind::Dedent,
///         TokenKind::EndOfFile,
///     ]
/// );
/// ```
///
/// Resuming on the next chunk of an input:
///
/// ```rust
/// use ironscope::tokenizer::{SourceBuffer, TokenKind, Tokenizer, TokenizerConfig};
///
/// let mut first = Tokenizer::new("x = '''one\n", TokenizerConfig::interactive());
/// let partial: Vec<_> = first.by_ref().collect();
/// assert!(matches!(partial[2].kind, TokenKind::IncompleteString(_)));
///
/// let rest = SourceBuffer::with_location("two'''\n", first.position());
/// let mut second = Tokenizer::with_state(rest, TokenizerConfig::default(), first.into_state());
/// let string = second.next_token();
/// assert_eq!(string.span.start.column, 5);
/// assert_eq!(string.kind.to_string(), "CONSTANT \"one\\ntwo\"");
/// ```
#[derive(Debug)]
pub struct Tokenizer<'s> {
    source: SourceBuffer<'s>,
    config: TokenizerConfig,
    state: TokenizerState,
    diagnostics: Arc<Diagnostics>,
    finished: bool,
}

impl<'s> Tokenizer<'s> {
    /// Tokenize `source` from the beginning.
    pub fn new(source: impl Into<SourceBuffer<'s>>, config: TokenizerConfig) -> Self {
        Self::build(source.into(), config, TokenizerState::new())
    }

    /// Continue tokenizing with a state taken from an earlier tokenizer.
    ///
    /// `source` must start where the earlier tokenizer stopped, see
    /// [`SourceBuffer::with_location`] and [`Tokenizer::position`].
    pub fn with_state(
        source: impl Into<SourceBuffer<'s>>,
        config: TokenizerConfig,
        state: TokenizerState,
    ) -> Self {
        let source = source.into();
        debug!(
            "Resuming tokenizer at {} - indentation depth {}, grouping depth {}, open string: {}",
            source.position(),
            state.indent_depth(),
            state.grouping_level(),
            state.incomplete.is_some()
        );

        Self::build(source, config, state)
    }

    /// Tokenize a fragment that already sits inside blocks indented to `levels`.
    pub fn with_indentation(
        source: impl Into<SourceBuffer<'s>>,
        config: TokenizerConfig,
        levels: &[usize],
    ) -> Self {
        Self::build(
            source.into(),
            config,
            TokenizerState::with_indentation(levels),
        )
    }

    fn build(source: SourceBuffer<'s>, config: TokenizerConfig, state: TokenizerState) -> Self {
        Tokenizer {
            source,
            config,
            state,
            diagnostics: Arc::new(Diagnostics::new()),
            finished: false,
        }
    }

    /// Record diagnostics into `diagnostics` instead of a private sink.
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Arc<Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// The current state, to resume from later.
    #[must_use]
    pub fn state(&self) -> TokenizerState {
        self.state.clone()
    }

    /// Consume the tokenizer, keeping its state.
    #[must_use]
    pub fn into_state(self) -> TokenizerState {
        self.state
    }

    /// Problems found so far.
    #[must_use]
    pub fn diagnostics(&self) -> &Arc<Diagnostics> {
        &self.diagnostics
    }

    /// The settings in use.
    #[must_use]
    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    /// Where the next token will start scanning.
    #[must_use]
    pub fn position(&self) -> SourceLocation {
        self.source.position()
    }

    /// Produce the next token.
    ///
    /// After [`TokenKind::EndOfFile`] every call returns another `EndOfFile`.
    pub fn next_token(&mut self) -> Token {
        if self.finished {
            return Token::new(TokenKind::EndOfFile, Span::at(self.source.position()));
        }

        loop {
            if let Some(token) = self.pending_indentation() {
                return token;
            }

            if let Some(partial) = self.state.incomplete.take() {
                if self.source.is_eof() {
                    self.state.incomplete = Some(partial);
                    return self.end_marker();
                }
                self.source.mark_token_start();
                return self.scan_string_body(partial);
            }

            if self.state.at_line_start && !self.state.in_grouping() {
                match self.line_start() {
                    LineStart::Token(token) => return token,
                    LineStart::Blank => continue,
                    LineStart::Code => {
                        if self.state.pending_dedents != 0 {
                            continue;
                        }
                    }
                }
            }

            self.skip_whitespace();
            self.source.mark_token_start();

            let Some(c) = self.source.peek() else {
                match self.end_of_input() {
                    Some(token) => return token,
                    None => continue,
                }
            };

            let kind = match c {
                '\n' => {
                    self.source.next_char();
                    if self.state.in_grouping() {
                        continue;
                    }
                    self.state.at_line_start = true;
                    if self.state.last_newline {
                        continue;
                    }
                    self.state.last_newline = true;
                    TokenKind::NewLine
                }
                '#' => {
                    let text = self.scan_comment();
                    if !self.config.has(TokenizerOptions::VERBATIM) {
                        continue;
                    }
                    TokenKind::Comment(text)
                }
                '\\' => match self.line_continuation() {
                    Some(kind) => kind,
                    None => continue,
                },
                '\'' | '"' => return self.scan_string(StringFlags::empty()),
                '.' if self.source.peek_n(1).is_some_and(|c| c.is_ascii_digit()) => {
                    self.scan_number()
                }
                c if c.is_ascii_digit() => self.scan_number(),
                c if is_name_start(c) => return self.scan_name(),
                _ => self.scan_operator(),
            };

            return self.finish(kind);
        }
    }

    fn finish(&mut self, kind: TokenKind) -> Token {
        let start = self.source.token_start();
        self.finish_at(start, kind)
    }

    fn finish_at(&mut self, start: SourceLocation, kind: TokenKind) -> Token {
        if !matches!(
            kind,
            TokenKind::NewLine
                | TokenKind::NL
                | TokenKind::Comment(_)
                | TokenKind::Indent
                | TokenKind::Dedent
                | TokenKind::EndOfFile
        ) {
            self.state.last_newline = false;
        }

        Token::new(kind, Span::new(start, self.source.position()))
    }

    fn end_marker(&mut self) -> Token {
        self.finished = true;
        Token::new(TokenKind::EndOfFile, Span::at(self.source.position()))
    }

    fn report(
        &self,
        severity: DiagnosticSeverity,
        code: DiagnosticCode,
        message: impl Into<String>,
        span: Span,
    ) {
        if self.diagnostics.count() < self.config.max_diagnostics {
            self.diagnostics
                .push(Diagnostic::new(severity, code, message, span));
        }
    }

    fn error(&self, code: DiagnosticCode, message: &str) -> TokenKind {
        self.report(
            DiagnosticSeverity::Error,
            code,
            message,
            self.token_span(),
        );
        TokenKind::Error(message.to_string())
    }

    fn token_span(&self) -> Span {
        Span::new(self.source.token_start(), self.source.position())
    }

    fn pending_indentation(&mut self) -> Option<Token> {
        let kind = match self.state.pending_dedents.cmp(&0) {
            Ordering::Less => {
                self.state.pending_dedents = 0;
                TokenKind::Indent
            }
            Ordering::Greater => {
                self.state.pending_dedents -= 1;
                TokenKind::Dedent
            }
            Ordering::Equal => return None,
        };

        Some(Token::new(kind, Span::at(self.source.position())))
    }

    /// Handle the end of input: close the logical line and the open blocks first, unless the
    /// input is one chunk of a longer one.
    fn end_of_input(&mut self) -> Option<Token> {
        if !self.config.has(TokenizerOptions::DONT_IMPLY_DEDENT) {
            let here = Span::at(self.source.position());

            if !self.state.last_newline {
                self.state.last_newline = true;
                self.state.at_line_start = true;
                return Some(Token::new(TokenKind::NewLine, here));
            }

            let open = self.state.indent_depth();
            if open > 0 {
                self.state.indent.truncate(1);
                self.state.indent_format.truncate(1);
                self.state.pending_dedents = i32::try_from(open).unwrap_or(i32::MAX);
                return None;
            }

            if self.state.in_grouping() {
                self.report(
                    DiagnosticSeverity::Error,
                    DiagnosticCode::SyntaxError,
                    "EOF in multi-line statement",
                    here,
                );
            }
        }

        Some(self.end_marker())
    }

    fn line_start(&mut self) -> LineStart {
        self.source.mark_token_start();
        let indentation = self.measure_indentation();
        let verbatim = self.config.has(TokenizerOptions::VERBATIM);

        match self.source.peek() {
            None => {
                self.state.line_indent = indentation;
                LineStart::Code
            }
            Some('#') => {
                self.source.mark_token_start();
                let text = self.scan_comment();
                if verbatim {
                    LineStart::Token(self.finish(TokenKind::Comment(text)))
                } else {
                    LineStart::Blank
                }
            }
            Some('\n') => {
                self.source.mark_token_start();
                self.source.next_char();
                if verbatim {
                    LineStart::Token(self.finish(TokenKind::NL))
                } else {
                    LineStart::Blank
                }
            }
            Some(_) => {
                self.state.at_line_start = false;
                self.indent_to(&indentation);
                LineStart::Code
            }
        }
    }

    /// Measure leading whitespace, continuing a measurement the previous chunk ended in.
    fn measure_indentation(&mut self) -> LineIndentation {
        let tab_size = self.config.tab_size.max(1);
        let mut indentation = std::mem::take(&mut self.state.line_indent);

        while let Some(c) = self.source.peek() {
            match c {
                ' ' => {
                    indentation.width += 1;
                    indentation.alt += 1;
                }
                '\t' => {
                    indentation.width = (indentation.width / tab_size + 1) * tab_size;
                    indentation.alt += 1;
                }
                '\x0c' => {
                    self.source.next_char();
                    indentation = LineIndentation::default();
                    continue;
                }
                _ => break,
            }

            indentation.text.push(c);
            self.source.next_char();
        }

        indentation
    }

    /// Compare the width of a code line with the indentation stack and queue the tokens.
    fn indent_to(&mut self, line: &LineIndentation) {
        let top = self.state.indent_level();

        if line.width > top {
            self.check_consistency(line, self.state.indent.len() - 1);
            self.state.indent.push(line.width);
            self.state.indent_format.push(line.text.clone());
            self.state.pending_dedents = -1;
            return;
        }

        let mut dedents = 0;
        while self.state.indent.len() > 1 && self.state.indent_level() > line.width {
            self.state.indent.pop();
            self.state.indent_format.pop();
            dedents += 1;
        }
        self.state.pending_dedents = dedents;

        if self.state.indent_level() == line.width {
            self.check_consistency(line, self.state.indent.len() - 1);
        } else {
            self.report(
                DiagnosticSeverity::Error,
                DiagnosticCode::IndentationError,
                format!(
                    "unindent to column {} does not match any outer indentation level",
                    line.width
                ),
                self.token_span(),
            );
        }
    }

    /// Tabs and spaces are mixed inconsistently when the ordering against `level` differs
    /// between tab size 8 and tab size 1.
    fn check_consistency(&self, line: &LineIndentation, level: usize) {
        let Some(severity) = self.config.indentation_check else {
            return;
        };
        let (Some(&width), Some(format)) = (
            self.state.indent.get(level),
            self.state.indent_format.get(level),
        ) else {
            return;
        };

        let alt = format.chars().count();
        if line.width.cmp(&width) != line.alt.cmp(&alt) {
            self.report(
                severity,
                DiagnosticCode::InconsistentIndentation,
                "inconsistent use of tabs and spaces in indentation",
                self.token_span(),
            );
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.source.peek(), Some(' ' | '\t' | '\x0c')) {
            self.source.next_char();
        }
    }

    fn scan_comment(&mut self) -> String {
        while self.source.peek().is_some_and(|c| c != '\n') {
            self.source.next_char();
        }

        self.source.token_text().to_string()
    }

    /// A backslash: joins the next line when a line break follows it.
    fn line_continuation(&mut self) -> Option<TokenKind> {
        self.source.next_char();
        match self.source.peek() {
            Some('\n') => {
                self.source.next_char();
                None
            }
            None => Some(self.error(
                DiagnosticCode::SyntaxError,
                "unexpected end of input after line continuation character",
            )),
            Some(_) => Some(self.error(
                DiagnosticCode::SyntaxError,
                "unexpected character after line continuation character",
            )),
        }
    }

    fn scan_name(&mut self) -> Token {
        while self.source.peek().is_some_and(is_name_char) {
            self.source.next_char();
        }

        let text = self.source.token_text().to_string();
        if matches!(self.source.peek(), Some('\'' | '"')) {
            if let Some(flags) = StringFlags::from_prefix(&text) {
                return self.scan_string(flags);
            }
        }

        let kind = match Keyword::from_str(&text) {
            Ok(Keyword::Print) if self.config.has(TokenizerOptions::PRINT_FUNCTION) => {
                TokenKind::Name(text)
            }
            Ok(keyword) => TokenKind::Keyword(keyword),
            Err(_) => TokenKind::Name(text),
        };

        self.finish(kind)
    }

    fn scan_operator(&mut self) -> TokenKind {
        let mut spelling = String::with_capacity(MAX_OPERATOR_LEN);
        let mut matched = None;
        for n in 0..MAX_OPERATOR_LEN {
            let Some(c) = self.source.peek_n(n) else {
                break;
            };
            spelling.push(c);
            if let Ok(op) = Operator::from_str(&spelling) {
                matched = Some((op, n + 1));
            }
        }

        let Some((op, len)) = matched else {
            let c = self.source.next_char().unwrap_or_default();
            return self.error(
                DiagnosticCode::BadCharacter,
                &format!("unexpected character {c:?}"),
            );
        };

        for _ in 0..len {
            self.source.next_char();
        }

        self.grouping(op)
    }

    fn grouping(&mut self, op: Operator) -> TokenKind {
        let level = match op {
            Operator::LeftParen | Operator::RightParen => &mut self.state.paren_level,
            Operator::LeftBracket | Operator::RightBracket => &mut self.state.bracket_level,
            Operator::LeftBrace | Operator::RightBrace => &mut self.state.brace_level,
            _ => return TokenKind::Operator(op),
        };

        if op.is_opening() {
            *level = level.saturating_add(1);
        } else if *level == 0 {
            return self.error(DiagnosticCode::SyntaxError, &format!("unmatched '{op}'"));
        } else {
            *level -= 1;
        }

        TokenKind::Operator(op)
    }

    fn scan_string(&mut self, mut flags: StringFlags) -> Token {
        if !flags.intersects(StringFlags::UNICODE | StringFlags::BYTES)
            && self.config.has(TokenizerOptions::UNICODE_LITERALS)
        {
            flags |= StringFlags::UNICODE;
        }

        let quote = self.source.next_char().unwrap_or('\'');
        if self.source.peek() == Some(quote) && self.source.peek_n(1) == Some(quote) {
            self.source.next_char();
            self.source.next_char();
            flags |= StringFlags::TRIPLE;
        }

        let partial = IncompleteString {
            quote,
            flags,
            content: String::new(),
            start: self.source.token_start(),
        };
        self.scan_string_body(partial)
    }

    /// Scan up to and including the closing quote, appending to `partial`.
    fn scan_string_body(&mut self, mut partial: IncompleteString) -> Token {
        let triple = partial.flags.contains(StringFlags::TRIPLE);
        let mut escaped = partial.ends_in_escape();

        loop {
            let Some(c) = self.source.next_char() else {
                return self.unterminated_string(partial);
            };

            if escaped {
                partial.content.push(c);
                escaped = false;
                continue;
            }

            match c {
                '\\' => {
                    partial.content.push(c);
                    escaped = true;
                }
                '\n' if !triple => {
                    self.source.back();
                    let message = "EOL while scanning string literal";
                    self.report(
                        DiagnosticSeverity::Error,
                        DiagnosticCode::SyntaxError,
                        message,
                        Span::new(partial.start, self.source.position()),
                    );
                    return self.finish_at(partial.start, TokenKind::Error(message.to_string()));
                }
                c if c == partial.quote => {
                    if !triple {
                        return self.string_constant(partial);
                    }
                    if self.source.peek() == Some(c) && self.source.peek_n(1) == Some(c) {
                        self.source.next_char();
                        self.source.next_char();
                        return self.string_constant(partial);
                    }
                    partial.content.push(c);
                }
                c => partial.content.push(c),
            }
        }
    }

    fn unterminated_string(&mut self, partial: IncompleteString) -> Token {
        let span = Span::new(partial.start, self.source.position());

        if !partial.flags.contains(StringFlags::TRIPLE) {
            let message = "EOL while scanning string literal";
            self.report(
                DiagnosticSeverity::Error,
                DiagnosticCode::SyntaxError,
                message,
                span,
            );
            return self.finish_at(partial.start, TokenKind::Error(message.to_string()));
        }

        if self.config.has(TokenizerOptions::TOLERANT_STRINGS) {
            self.state.incomplete = Some(partial.clone());
            return self.finish_at(partial.start, TokenKind::IncompleteString(partial));
        }

        let message = "EOF while scanning triple-quoted string literal";
        self.report(
            DiagnosticSeverity::Error,
            DiagnosticCode::IncompleteToken,
            message,
            span,
        );
        self.finish_at(partial.start, TokenKind::Error(message.to_string()))
    }

    fn string_constant(&mut self, partial: IncompleteString) -> Token {
        let literal = match parse_string(&partial.content, partial.flags) {
            Ok(literal) => literal,
            Err(err) => {
                self.report(
                    DiagnosticSeverity::Error,
                    DiagnosticCode::BadLiteral,
                    err.to_string(),
                    Span::new(partial.start, self.source.position()),
                );
                Literal::empty_string(partial.flags)
            }
        };

        self.finish_at(partial.start, TokenKind::Constant(literal))
    }

    fn scan_number(&mut self) -> TokenKind {
        let first = self.source.next_char();

        if first == Some('0') {
            let radix = match self.source.peek() {
                Some('x' | 'X') => Some(16),
                Some('o' | 'O') => Some(8),
                Some('b' | 'B') => Some(2),
                _ => None,
            };
            if let Some(radix) = radix {
                self.source.next_char();
                return self.prefixed_integer(radix);
            }
        }

        let mut float = first == Some('.');
        self.digits();
        if !float && self.source.peek() == Some('.') {
            self.source.next_char();
            self.digits();
            float = true;
        }
        if matches!(self.source.peek(), Some('e' | 'E')) && self.exponent() {
            float = true;
        }

        if matches!(self.source.peek(), Some('j' | 'J')) {
            self.source.next_char();
            let result = parse_imaginary(self.source.token_text());
            return self.literal(result, Literal::Imaginary(0.0));
        }
        if float {
            let result = parse_float(self.source.token_text());
            return self.literal(result, Literal::Float(0.0));
        }

        let text = self.source.token_text().to_string();
        let radix = if text.len() > 1 && text.starts_with('0') {
            8
        } else {
            10
        };
        self.integer(&text, radix)
    }

    fn prefixed_integer(&mut self, radix: u32) -> TokenKind {
        let digit = |c: char| {
            if radix == 16 {
                c.is_ascii_hexdigit()
            } else {
                c.is_ascii_digit()
            }
        };
        while self.source.peek().is_some_and(digit) {
            self.source.next_char();
        }

        let text = self.source.token_text().to_string();
        self.integer(text.get(2..).unwrap_or_default(), radix)
    }

    /// Convert integer digits, consuming an `l`/`L` suffix.
    fn integer(&mut self, digits: &str, radix: u32) -> TokenKind {
        let long = matches!(self.source.peek(), Some('l' | 'L'));
        if long {
            self.source.next_char();
        }

        let result = parse_integer(digits, radix);
        if long {
            self.literal(result.map(Literal::into_long), Literal::Long(0))
        } else {
            self.literal(result, Literal::Int(0))
        }
    }

    /// Consume an exponent, or push back the `e` and sign if no digit follows them.
    fn exponent(&mut self) -> bool {
        self.source.next_char();
        let mut consumed = 1;
        if matches!(self.source.peek(), Some('+' | '-')) {
            self.source.next_char();
            consumed += 1;
        }

        if self.source.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.digits();
            return true;
        }

        for _ in 0..consumed {
            self.source.back();
        }
        false
    }

    fn digits(&mut self) {
        while self.source.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.source.next_char();
        }
    }

    fn literal(&self, result: Result<Literal, LiteralError>, zero: Literal) -> TokenKind {
        match result {
            Ok(literal) => TokenKind::Constant(literal),
            Err(err) => {
                self.report(
                    DiagnosticSeverity::Error,
                    DiagnosticCode::BadLiteral,
                    format!("{err} in '{}'", self.source.token_text()),
                    self.token_span(),
                );
                TokenKind::Constant(zero)
            }
        }
    }
}

impl Tokenizer<'static> {
    /// Decode raw source bytes with [`crate::tokenizer::decode_source`] and tokenize the text.
    ///
    /// An unsupported encoding declaration and undecodable bytes are reported as
    /// [`DiagnosticCode::Encoding`] warnings.
    #[must_use]
    pub fn from_bytes(bytes: &[u8], config: TokenizerConfig) -> Self {
        let (text, encoding, lossy) = source::decode(bytes);
        let tokenizer = Tokenizer::new(text, config);
        let start = Span::at(SourceLocation::START);

        if let Encoding::Unknown(name) = &encoding {
            tokenizer.report(
                DiagnosticSeverity::Warning,
                DiagnosticCode::Encoding,
                format!("unknown encoding '{name}', decoding as utf-8"),
                start,
            );
        }
        if lossy {
            tokenizer.report(
                DiagnosticSeverity::Warning,
                DiagnosticCode::Encoding,
                format!("invalid {encoding} input, undecodable bytes were replaced"),
                start,
            );
        }

        tokenizer
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }

        Some(self.next_token())
    }
}

impl std::iter::FusedIterator for Tokenizer<'_> {}

fn is_name_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_name_char(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}
