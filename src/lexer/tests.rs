//! Unit tests for the lexer module.
//!
//! Covers keywords and identifiers, number and complex literals, strings,
//! the layout tokens and error recovery.

use proptest::prelude::*;

use super::{
    lexer::{tokenize, Lexer},
    tokens::{Literal, Token, TokenKind},
};
use crate::errors::errors::ErrorImpl;

fn lex(source: &str) -> Vec<Token> {
    tokenize(source.to_string(), Some("test.cy".to_string())).unwrap()
}

fn kinds(source: &str) -> Vec<TokenKind> {
    lex(source).into_iter().map(|token| token.kind).collect()
}

fn lex_errors(source: &str) -> Vec<ErrorImpl> {
    tokenize(source.to_string(), Some("test.cy".to_string()))
        .unwrap_err()
        .into_iter()
        .map(|error| error.get_impl().clone())
        .collect()
}

#[test]
fn test_tokenize_keywords() {
    let tokens = lex("if elif else for in defer return del");

    assert_eq!(tokens[0].kind, TokenKind::If);
    assert_eq!(tokens[1].kind, TokenKind::Elif);
    assert_eq!(tokens[2].kind, TokenKind::Else);
    assert_eq!(tokens[3].kind, TokenKind::For);
    assert_eq!(tokens[4].kind, TokenKind::In);
    assert_eq!(tokens[5].kind, TokenKind::Defer);
    assert_eq!(tokens[6].kind, TokenKind::Return);
    assert_eq!(tokens[7].kind, TokenKind::Del);
    assert_eq!(tokens[8].kind, TokenKind::Newline);
    assert_eq!(tokens[9].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_identifiers() {
    let tokens = lex("foo f3 π _e x_y");
    let values: Vec<&str> = tokens
        .iter()
        .filter(|token| token.kind == TokenKind::Identifier)
        .map(|token| token.value.as_str())
        .collect();

    // `_` only starts an identifier, it never continues one
    assert_eq!(values, vec!["foo", "f3", "π", "_e", "x", "_y"]);
}

#[test]
fn test_number_then_identifier() {
    let tokens = lex("2x");

    assert_eq!(tokens[0].kind, TokenKind::Integer);
    assert_eq!(tokens[0].value, "2");
    assert_eq!(tokens[1].kind, TokenKind::Identifier);
    assert_eq!(tokens[1].value, "x");
}

#[test]
fn test_tokenize_numbers() {
    let tokens = lex("42 0x1F 0b1010 0o17 1_000 3.14 .5 1e10 2.5E-3");

    let expected = vec![
        (TokenKind::Integer, Literal::Integer { radix: 10, digits: "42".into(), imaginary: false }),
        (TokenKind::Integer, Literal::Integer { radix: 16, digits: "1F".into(), imaginary: false }),
        (TokenKind::Integer, Literal::Integer { radix: 2, digits: "1010".into(), imaginary: false }),
        (TokenKind::Integer, Literal::Integer { radix: 8, digits: "17".into(), imaginary: false }),
        (TokenKind::Integer, Literal::Integer { radix: 10, digits: "1000".into(), imaginary: false }),
        (TokenKind::Float, Literal::Float { text: "3.14".into(), imaginary: false }),
        (TokenKind::Float, Literal::Float { text: ".5".into(), imaginary: false }),
        (TokenKind::Float, Literal::Float { text: "1e10".into(), imaginary: false }),
        (TokenKind::Float, Literal::Float { text: "2.5E-3".into(), imaginary: false }),
    ];

    for (token, (kind, literal)) in tokens.iter().zip(expected) {
        assert_eq!(token.kind, kind, "kind of {}", token.value);
        assert_eq!(token.literal.as_ref(), Some(&literal), "literal of {}", token.value);
    }
    assert_eq!(tokens[4].value, "1_000");
}

#[test]
fn test_exponent_needs_digits() {
    let tokens = lex("2e");

    assert_eq!(tokens[0].kind, TokenKind::Integer);
    assert_eq!(tokens[0].value, "2");
    assert_eq!(tokens[1].kind, TokenKind::Identifier);
    assert_eq!(tokens[1].value, "e");
}

#[test]
fn test_tokenize_imaginary_literals() {
    let tokens = lex("3_i 2.5𝒊 𝒊 0x1_i");

    assert_eq!(tokens[0].value, "3_i");
    assert_eq!(
        tokens[0].literal,
        Some(Literal::Integer { radix: 10, digits: "3".into(), imaginary: true })
    );
    assert_eq!(tokens[1].value, "2.5𝒊");
    assert_eq!(
        tokens[1].literal,
        Some(Literal::Float { text: "2.5".into(), imaginary: true })
    );
    assert_eq!(tokens[2].kind, TokenKind::Integer);
    assert_eq!(
        tokens[2].literal,
        Some(Literal::Integer { radix: 10, digits: "1".into(), imaginary: true })
    );
    assert_eq!(
        tokens[3].literal,
        Some(Literal::Integer { radix: 16, digits: "1".into(), imaginary: true })
    );
    assert_eq!(tokens[3].literal.as_ref().unwrap().to_string(), "0x1i");
}

#[test]
fn test_imaginary_suffix_stops_at_non_identifier_characters() {
    // `²` is a number but not a digit, so it cannot continue an identifier
    let mut lexer = Lexer::new("3_i²".to_string(), None);
    let first = lexer.next().unwrap().unwrap();

    assert_eq!(first.value, "3_i");
    assert_eq!(
        first.literal,
        Some(Literal::Integer { radix: 10, digits: "3".into(), imaginary: true })
    );
    assert!(matches!(
        lexer.next(),
        Some(Err(error)) if matches!(error.get_impl(), ErrorImpl::UnknownCharacter { .. })
    ));
}

#[test]
fn test_misplaced_separators() {
    for source in ["1__0", "1_", "0x_1", "0b102", "0x"] {
        let errors = lex_errors(source);
        assert_eq!(errors.len(), 1, "errors for {}", source);
        assert!(
            matches!(errors[0], ErrorImpl::LiteralSyntaxError { .. }),
            "error for {}: {:?}",
            source,
            errors[0]
        );
    }
}

#[test]
fn test_tokenize_strings() {
    let tokens = lex(r#""a\tb\u{41}\x42\"" "plain""#);

    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].value, r#""a\tb\u{41}\x42\"""#);
    assert_eq!(tokens[0].literal, Some(Literal::Str("a\tbAB\"".into())));
    assert_eq!(tokens[1].literal, Some(Literal::Str("plain".into())));
}

#[test]
fn test_invalid_escape() {
    let errors = lex_errors(r#"s = "\q""#);

    assert_eq!(
        errors,
        vec![ErrorImpl::InvalidEscapeSequence { sequence: "\\q".into() }]
    );
}

#[test]
fn test_unterminated_string() {
    let errors = lex_errors("x = \"abc\ny = 1\n");

    assert_eq!(errors, vec![ErrorImpl::UnterminatedString]);
}

#[test]
fn test_indent_and_dedent() {
    assert_eq!(
        kinds("if a:\n    b\n    c\nd\n"),
        vec![
            TokenKind::If,
            TokenKind::Identifier,
            TokenKind::Colon,
            TokenKind::Newline,
            TokenKind::Indent,
            TokenKind::Identifier,
            TokenKind::Newline,
            TokenKind::Identifier,
            TokenKind::Newline,
            TokenKind::Dedent,
            TokenKind::Identifier,
            TokenKind::Newline,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_dedent_per_level() {
    let middle = kinds("a:\n  b:\n    c\nd\n");
    let dedents_before_d = middle
        .iter()
        .skip_while(|kind| **kind != TokenKind::Dedent)
        .take_while(|kind| **kind == TokenKind::Dedent)
        .count();
    assert_eq!(dedents_before_d, 2);

    let at_end = kinds("a:\n  b:\n    c");
    assert_eq!(
        &at_end[at_end.len() - 4..],
        &[
            TokenKind::Newline,
            TokenKind::Dedent,
            TokenKind::Dedent,
            TokenKind::EOF
        ]
    );
}

#[test]
fn test_indentation_error() {
    let errors = lex_errors("a:\n    b\n  c\n");

    assert_eq!(errors, vec![ErrorImpl::IndentationError { width: 2 }]);
}

#[test]
fn test_blank_and_comment_lines_ignored() {
    let kinds = kinds("a:\n    b\n\n  # note\n    c # trailing\n");

    assert_eq!(kinds.iter().filter(|k| **k == TokenKind::Indent).count(), 1);
    assert_eq!(kinds.iter().filter(|k| **k == TokenKind::Dedent).count(), 1);
    assert_eq!(kinds.iter().filter(|k| **k == TokenKind::Newline).count(), 3);
}

#[test]
fn test_brackets_suppress_layout() {
    assert_eq!(
        kinds("f(1,\n      2)\n"),
        vec![
            TokenKind::Identifier,
            TokenKind::OpenParen,
            TokenKind::Integer,
            TokenKind::Comma,
            TokenKind::Integer,
            TokenKind::CloseParen,
            TokenKind::Newline,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_operators_prefer_longest() {
    assert_eq!(
        kinds("a := b -> c == d != e <= f >= g << h >> i √j"),
        vec![
            TokenKind::Identifier,
            TokenKind::ColonEquals,
            TokenKind::Identifier,
            TokenKind::Arrow,
            TokenKind::Identifier,
            TokenKind::Equals,
            TokenKind::Identifier,
            TokenKind::NotEquals,
            TokenKind::Identifier,
            TokenKind::LessEquals,
            TokenKind::Identifier,
            TokenKind::GreaterEquals,
            TokenKind::Identifier,
            TokenKind::ShiftLeft,
            TokenKind::Identifier,
            TokenKind::ShiftRight,
            TokenKind::Identifier,
            TokenKind::Sqrt,
            TokenKind::Identifier,
            TokenKind::Newline,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_token_positions() {
    let tokens = lex("x = 1\ny = π\n");
    let pi = tokens.iter().find(|token| token.value == "π").unwrap();

    assert_eq!(pi.span.start.line, 2);
    assert_eq!(pi.span.start.column, 5);
    assert_eq!(pi.span.start.offset, 10);
    assert_eq!(pi.span.end.offset, 12);
    assert_eq!(pi.span.start.file.as_str(), "test.cy");
}

#[test]
fn test_spans_cover_source_text() {
    let source = "f(x; a) =\n    y := √x 2_i\n    \"s\\n\" # note\ng = 0x1F\n";
    let tokens = lex(source);

    for token in tokens {
        let start = token.span.start.offset as usize;
        let end = token.span.end.offset as usize;
        assert_eq!(&source[start..end], token.value, "{:?}", token.kind);
    }
}

#[test]
fn test_recovers_after_errors() {
    let errors = lex_errors("a = $\nb = ?\nc = 1\n");

    assert_eq!(errors.len(), 2);
    assert!(errors
        .iter()
        .all(|error| matches!(error, ErrorImpl::UnknownCharacter { .. })));
}

#[test]
fn test_recovery_closes_brackets_left_open() {
    let errors = lex_errors("f(x) =\n    y = (\"abc\n  z = 1\n");

    assert_eq!(
        errors,
        vec![
            ErrorImpl::UnterminatedString,
            ErrorImpl::IndentationError { width: 2 },
        ]
    );
}

#[test]
fn test_lexer_is_lazy() {
    let mut lexer = Lexer::new("a b".to_string(), None);
    let first = lexer.next().unwrap().unwrap();

    assert_eq!(first.kind, TokenKind::Identifier);
    assert_eq!(first.span.start.file.as_str(), "shell");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn token_values_match_source_slices(
        words in prop::collection::vec(
            prop::sample::select(vec![
                "x", "foo", "π", "42", "0x1F", "3.5", "1_000", "\"s\"", "+", "*",
                "(", ")", "√", "2_i", "𝒊", ":=", "->", ";",
            ]),
            0..24,
        )
    ) {
        let source = words.join(" ");
        let tokens = tokenize(source.clone(), None);

        prop_assert!(tokens.is_ok(), "failed on {:?}", source);
        for token in tokens.unwrap() {
            let start = token.span.start.offset as usize;
            let end = token.span.end.offset as usize;
            prop_assert_eq!(&source[start..end], token.value.as_str());
        }
    }
}
