//! Unit tests for error handling.
//!
//! This module contains tests for error types and error reporting.

use crate::errors::errors::{Error, ErrorImpl, ErrorKind, ErrorTip};
use crate::{Position, Span};
use std::rc::Rc;

fn span_at(offset: u32, line: u32, column: u32) -> Span {
    let file = Rc::new("test.cy".to_string());
    Span::new(
        Position::new(offset, line, column, Rc::clone(&file)),
        Position::new(offset + 1, line, column + 1, file),
    )
}

#[test]
fn test_error_creation() {
    let error = Error::new(
        ErrorImpl::UnknownCharacter {
            character: "$".to_string(),
        },
        span_at(10, 1, 11),
    );

    assert_eq!(error.get_error_name(), "UnknownCharacter");
    assert_eq!(error.get_kind(), ErrorKind::Lex);
}

#[test]
fn test_error_position() {
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            token: "identifier".to_string(),
        },
        span_at(42, 3, 7),
    );

    assert_eq!(error.get_position().offset, 42);
    assert_eq!(error.get_position().line, 3);
    assert_eq!(error.get_position().column, 7);
    assert_eq!(error.get_span().end.offset, 43);
}

#[test]
fn test_error_kinds_follow_stage() {
    let cases = vec![
        (ErrorImpl::UnterminatedString, ErrorKind::Lex),
        (ErrorImpl::IndentationError { width: 2 }, ErrorKind::Lex),
        (
            ErrorImpl::LiteralSyntaxError {
                literal: "1__0".to_string(),
                reason: "misplaced separator".to_string(),
            },
            ErrorKind::Lex,
        ),
        (
            ErrorImpl::MismatchedBlock {
                message: "expected an indented block".to_string(),
            },
            ErrorKind::Parse,
        ),
        (
            ErrorImpl::MalformedLiteral {
                literal: "0x".to_string(),
            },
            ErrorKind::Parse,
        ),
        (
            ErrorImpl::UnboundFreeVariable {
                variable: "a".to_string(),
                reason: "is not defined".to_string(),
            },
            ErrorKind::Binding,
        ),
        (
            ErrorImpl::GlobalDeleteOfNonGlobal {
                variable: "x".to_string(),
            },
            ErrorKind::Binding,
        ),
        (
            ErrorImpl::InternalError {
                message: "ambiguous node survived".to_string(),
            },
            ErrorKind::Internal,
        ),
    ];

    for (error_impl, kind) in cases {
        assert_eq!(Error::new(error_impl, span_at(0, 1, 1)).get_kind(), kind);
    }
}

#[test]
fn test_binding_error_names() {
    let unbound = Error::new(
        ErrorImpl::UnboundFreeVariable {
            variable: "a".to_string(),
            reason: "is referenced before assignment".to_string(),
        },
        span_at(0, 1, 1),
    );
    assert_eq!(unbound.get_error_name(), "UnboundFreeVariableError");

    let delete = Error::new(
        ErrorImpl::GlobalDeleteOfNonGlobal {
            variable: "x".to_string(),
        },
        span_at(0, 1, 1),
    );
    assert_eq!(delete.get_error_name(), "GlobalDeleteOfNonGlobalError");
}

#[test]
fn test_internal_constructor() {
    let error = Error::internal("node is not a SymbolExpr", span_at(5, 1, 6));

    assert_eq!(error.get_error_name(), "InternalError");
    assert_eq!(
        error.get_impl(),
        &ErrorImpl::InternalError {
            message: "node is not a SymbolExpr".to_string()
        }
    );
}

#[test]
fn test_error_tip_none() {
    let error = Error::new(
        ErrorImpl::UnknownCharacter {
            character: "$".to_string(),
        },
        span_at(0, 1, 1),
    );

    assert!(matches!(error.get_tip(), ErrorTip::None));
}

#[test]
fn test_error_tip_suggestion() {
    let error = Error::new(
        ErrorImpl::UnboundFreeVariable {
            variable: "total".to_string(),
            reason: "is referenced before assignment".to_string(),
        },
        span_at(0, 1, 1),
    );

    match error.get_tip() {
        ErrorTip::Suggestion(tip) => {
            assert!(tip.contains("`total` is referenced before assignment"));
            assert!(tip.contains("after `;`"));
        }
        _ => panic!("Expected suggestion tip"),
    }
}

#[test]
fn test_error_tip_display() {
    let tip = ErrorTip::Suggestion("Try this instead".to_string());
    assert_eq!(tip.to_string(), "Try this instead");

    let tip = ErrorTip::None;
    assert_eq!(tip.to_string(), "");
}

#[test]
fn test_error_display_includes_location() {
    let error = Error::new(ErrorImpl::UnterminatedString, span_at(4, 2, 3));

    assert_eq!(error.to_string(), "unterminated string literal at test.cy:2:3");
}
