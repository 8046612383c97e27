//! Property tests for the tokenizer.
//!
//! Generated programs exercise block structure, grouping and resumption through the public
//! API only.

use ironscope::tokenizer::{
    Literal, Operator, SourceBuffer, Token, TokenKind, Tokenizer, TokenizerConfig,
    TokenizerOptions,
};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

/// Identifiers that are not keywords.
fn arb_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,6}".prop_map(|s| format!("v_{s}"))
}

/// A simple statement on one line.
fn arb_statement() -> impl Strategy<Value = String> {
    prop_oneof![
        (arb_name(), 0u32..1000).prop_map(|(name, value)| format!("{name} = {value}")),
        (arb_name(), arb_name()).prop_map(|(a, b)| format!("{a} += {b}")),
        arb_name().prop_map(|name| format!("{name}()")),
        Just("pass".to_string()),
    ]
}

/// Indentation depths where each line opens at most one new level.
fn arb_depths() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0usize..6, 1..20).prop_map(|raw| {
        let mut depths = Vec::with_capacity(raw.len());
        let mut previous = 0;
        for wanted in raw {
            let depth = wanted.min(previous + 1);
            depths.push(depth);
            previous = depth;
        }
        depths[0] = 0;
        depths
    })
}

/// A program of indented statements, some of them spread over several lines by brackets.
fn arb_program() -> impl Strategy<Value = String> {
    (arb_depths(), prop::collection::vec((arb_statement(), any::<bool>()), 20)).prop_map(
        |(depths, statements)| {
            let mut program = String::new();
            for (depth, (statement, grouped)) in depths.iter().zip(statements) {
                program.push_str(&"    ".repeat(*depth));
                if grouped {
                    program.push_str(&format!("call({statement:?},\n  1,\n)\n"));
                } else {
                    program.push_str(&statement);
                    program.push('\n');
                }
            }
            program
        },
    )
}

// ============================================================================
// Helpers
// ============================================================================

fn kinds(source: &str) -> Vec<TokenKind> {
    Tokenizer::new(source, TokenizerConfig::default())
        .map(|token| token.kind)
        .collect()
}

fn count(kinds: &[TokenKind], wanted: &TokenKind) -> usize {
    kinds.iter().filter(|kind| *kind == wanted).count()
}

/// Tokenize `source` in two chunks split at byte `split`.
fn tokenize_split(source: &str, split: usize) -> Vec<Token> {
    let chunk = TokenizerConfig {
        options: TokenizerOptions::DONT_IMPLY_DEDENT,
        ..TokenizerConfig::default()
    };
    let mut first = Tokenizer::new(&source[..split], chunk);
    let mut tokens: Vec<_> = first.by_ref().filter(|token| !token.is_eof()).collect();

    let rest = SourceBuffer::with_location(&source[split..], first.position());
    tokens.extend(Tokenizer::with_state(
        rest,
        TokenizerConfig::default(),
        first.into_state(),
    ));
    tokens
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn indents_and_dedents_balance(depths in arb_depths(), statement in arb_statement()) {
        let program: String = depths
            .iter()
            .map(|depth| format!("{}{statement}\n", "    ".repeat(*depth)))
            .collect();

        let mut tokenizer = Tokenizer::new(program.as_str(), TokenizerConfig::default());
        let kinds: Vec<_> = tokenizer.by_ref().map(|token| token.kind).collect();

        let opened = depths.windows(2).filter(|pair| pair[1] > pair[0]).count();
        prop_assert_eq!(count(&kinds, &TokenKind::Indent), opened);
        prop_assert_eq!(count(&kinds, &TokenKind::Dedent), opened);
        prop_assert_eq!(count(&kinds, &TokenKind::NewLine), depths.len());
        prop_assert_eq!(kinds.last(), Some(&TokenKind::EndOfFile));
        prop_assert!(tokenizer.diagnostics().is_empty());
    }

    #[test]
    fn line_breaks_inside_brackets_are_insignificant(names in prop::collection::vec(arb_name(), 1..8)) {
        let program = format!("x = [\n{}\n]\n", names.join(",\n        "));
        let kinds = kinds(&program);

        prop_assert_eq!(count(&kinds, &TokenKind::NewLine), 1);
        prop_assert_eq!(count(&kinds, &TokenKind::Indent), 0);
        prop_assert_eq!(count(&kinds, &TokenKind::Operator(Operator::Comma)), names.len() - 1);
    }

    #[test]
    fn restart_between_tokens_matches_single_pass(program in arb_program(), pick in any::<prop::sample::Index>()) {
        let whole: Vec<_> = Tokenizer::new(program.as_str(), TokenizerConfig::default()).collect();

        // Every offset outside a token, including inside leading whitespace.
        let boundaries: Vec<_> = (0..=program.len())
            .filter(|&at| {
                !whole
                    .iter()
                    .any(|token| token.span.start.offset < at && at < token.span.end.offset)
            })
            .collect();
        let split = boundaries[pick.index(boundaries.len())];

        prop_assert_eq!(tokenize_split(&program, split), whole);
    }

    #[test]
    fn triple_quoted_string_continues(body in "[a-z \n]{1,40}", pick in any::<prop::sample::Index>()) {
        let source = format!("'''{body}'''");
        let split = 3 + 1 + pick.index(body.len());

        let mut first = Tokenizer::new(&source[..split], TokenizerConfig::interactive());
        let head = first.next_token();
        let is_incomplete = matches!(head.kind, TokenKind::IncompleteString(_));
        prop_assert!(is_incomplete);
        prop_assert!(first.next_token().is_eof());

        let rest = SourceBuffer::with_location(&source[split..], first.position());
        let mut second =
            Tokenizer::with_state(rest, TokenizerConfig::interactive(), first.into_state());
        let string = second.next_token();

        prop_assert_eq!(string.kind, TokenKind::Constant(Literal::Str(body.clone())));
        prop_assert_eq!(string.span.start.offset, 0);
        prop_assert_eq!(string.span.end.offset, source.len());
        prop_assert!(second.state().incomplete.is_none());
    }

    #[test]
    fn never_panics_and_always_ends(source in "\\PC{0,80}") {
        let mut tokenizer = Tokenizer::new(source.as_str(), TokenizerConfig::ide());
        let tokens: Vec<_> = tokenizer.by_ref().collect();

        prop_assert!(tokens.last().is_some_and(Token::is_eof));
        prop_assert_eq!(tokens.iter().filter(|token| token.is_eof()).count(), 1);
        for pair in tokens.windows(2) {
            prop_assert!(pair[0].span.start.offset <= pair[1].span.start.offset);
        }
    }
}

#[test]
fn nested_blocks_close_at_end_of_input() {
    let kinds = kinds("if a:\n    if b:\n        c\n");

    assert_eq!(count(&kinds, &TokenKind::Indent), 2);
    assert_eq!(
        &kinds[kinds.len() - 3..],
        &[TokenKind::Dedent, TokenKind::Dedent, TokenKind::EndOfFile]
    );
}

#[test]
fn interactive_chunks_keep_blocks_open() {
    let mut first = Tokenizer::new("for x in y:\n    f(x)\n", TokenizerConfig::interactive());
    let kinds: Vec<_> = first.by_ref().map(|token| token.kind).collect();

    assert_eq!(count(&kinds, &TokenKind::Dedent), 0);
    assert_eq!(first.state().indent, vec![0, 4]);
}
