//! Unit tests for the parser module.
//!
//! This module contains tests for parsing various language constructs including:
//! - Operator precedence and juxtaposition
//! - Tuples, matrices, maps and lambdas
//! - Function declarations
//! - Control flow and indented blocks
//! - Error recovery

use std::rc::Rc;

use crate::{
    ast::statements::BlockStmt,
    errors::errors::{Error, ErrorImpl, ErrorKind},
    lexer::lexer::tokenize,
};

use super::parser::parse;

fn parse_source(source: &str) -> Result<BlockStmt, Vec<Error>> {
    let tokens = tokenize(source.to_string(), Some("test.cy".to_string())).unwrap();
    let (_, result) = parse(tokens, Rc::new("test.cy".to_string()));
    result
}

/// Renders each top-level statement.
fn rendered(source: &str) -> Vec<String> {
    parse_source(source)
        .unwrap()
        .iter()
        .map(|stmt| stmt.to_string())
        .collect()
}

fn rendered_one(source: &str) -> String {
    let statements = rendered(source);
    assert_eq!(statements.len(), 1, "expected one statement in {:?}", source);
    statements[0].clone()
}

#[test]
fn test_parse_implicit_multiplication_after_division() {
    assert_eq!(rendered_one("1/2√3"), "(adj (/ 1 2) (√ 3))");
    assert_eq!(rendered_one("(1/2)*√3"), "(* (/ 1 2) (√ 3))");
    assert_eq!(rendered_one("1/(2*√3)"), "(/ 1 (* 2 (√ 3)))");
}

#[test]
fn test_parse_juxtaposition() {
    assert_eq!(rendered_one("2x"), "(adj 2 x)");
    assert_eq!(rendered_one("a b c"), "(adj (adj a b) c)");
    assert_eq!(rendered_one("2x^2"), "(adj 2 (^ x 2))");
    assert_eq!(rendered_one("f(x, y)"), "(adj f (args x y))");
    assert_eq!(rendered_one("f@(x)"), "(adj f@ (args x))");
    assert_eq!(rendered_one("3 f(x)"), "(adj 3 (adj f (args x)))");
}

#[test]
fn test_parse_operator_precedence() {
    assert_eq!(rendered_one("a + b * c == d"), "(== (+ a (* b c)) d)");
    assert_eq!(rendered_one("a^b^c"), "(^ a (^ b c))");
    assert_eq!(rendered_one("-x^2"), "(- (^ x 2))");
    assert_eq!(rendered_one("n!"), "(! n)");
    assert_eq!(rendered_one("a - b - c"), "(- (- a b) c)");
    assert_eq!(rendered_one("a = b = 1"), "(= a (= b 1))");
}

#[test]
fn test_parse_tuple_boundaries() {
    assert_eq!(rendered_one("(x)"), "x");
    assert_eq!(rendered_one("(x,)"), "(tuple x)");
    assert_eq!(rendered_one("()"), "(tuple)");
    assert_eq!(rendered_one("a, b = 1, 2"), "(= (tuple a b) (tuple 1 2))");
}

#[test]
fn test_parse_collections() {
    assert_eq!(rendered_one("[1, 2; 3, 4]"), "(matrix (row 1 2) (row 3 4))");
    assert_eq!(rendered_one("{\"a\": 1, 2: x}"), "(map (\"a\" 1) (2 x))");
    assert_eq!(rendered_one("m{1, 2}"), "(index m 1 2)");
    assert_eq!(rendered_one("m{i} = 0"), "(= (index m i) 0)");
}

#[test]
fn test_parse_lambdas() {
    assert_eq!(rendered_one("k = x -> x^2"), "(= k (lambda (x) (^ x 2)))");
    assert_eq!(rendered_one("(x, y) -> x + y"), "(lambda (x y) (+ x y))");
    assert_eq!(rendered_one("(x; a) -> x a"), "(lambda (x; a) (adj x a))");
}

#[test]
fn test_parse_function_declarations() {
    assert_eq!(
        rendered_one("f(x, y; a) = x + y"),
        "(fn f (x y; a) (block (+ x y)))"
    );
    assert_eq!(
        rendered_one("f(x) =\n    y = x\n    return y\n"),
        "(fn f (x) (block (= y x) (return y)))"
    );
    assert_eq!(rendered_one("g@() := 1"), "(local-fn g@ () (block 1))");
    // Not a declaration: nothing follows the parameter list
    assert_eq!(rendered_one("f(x) + 1"), "(+ (adj f (args x)) 1)");
}

#[test]
fn test_parse_if_chain() {
    assert_eq!(
        rendered_one("if x: a\nelif y: b\nelse: c\n"),
        "(if x (block a) (block (if y (block b) (block c))))"
    );
    assert_eq!(
        rendered_one("if x > 0:\n    a = 1\nelse:\n    a = 2\n"),
        "(if (> x 0) (block (= a 1)) (block (= a 2)))"
    );
}

#[test]
fn test_parse_loops_and_defer() {
    assert_eq!(
        rendered_one("for i in xs: s = s + i\n"),
        "(for i xs (block (= s (+ s i))))"
    );
    assert_eq!(
        rendered_one("defer r := 0: r = r + 1\n"),
        "(defer r 0 (block (= r (+ r 1))))"
    );
    assert_eq!(rendered_one("defer:\n    cleanup\n"), "(defer (block cleanup))");
}

#[test]
fn test_parse_return_and_del() {
    assert_eq!(
        rendered_one("f() =\n    del x\n    return\n"),
        "(fn f () (block (del x) (return)))"
    );
}

#[test]
fn test_parse_statement_separators() {
    assert_eq!(rendered("a = 1; b = 2\nc = 3;\n").len(), 3);
    assert_eq!(rendered("if x: a; b\nc\n").len(), 2);
    assert_eq!(rendered_one("if x: a; b\n"), "(if x (block a b))");
}

#[test]
fn test_parse_nested_blocks() {
    let source = "f(x) =\n    if x:\n        return 1\n    return 2\ng(y) = y\n";
    assert_eq!(
        rendered(source),
        vec![
            "(fn f (x) (block (if x (block (return 1))) (return 2)))",
            "(fn g (y) (block y))",
        ]
    );
}

#[test]
fn test_parse_invalid_assignment_target() {
    let errors = parse_source("1 = 2\n").unwrap_err();

    assert_eq!(errors.len(), 1);
    assert!(matches!(
        errors[0].get_impl(),
        ErrorImpl::UnexpectedTokenDetailed { .. }
    ));
}

#[test]
fn test_parse_bound_variables_outside_parameter_list() {
    assert!(parse_source("(x; a)\n").is_err());
    assert!(parse_source("f(x; a)\n").is_err());
}

#[test]
fn test_parse_missing_block() {
    let errors = parse_source("if x\n    a\nb = 1\n").unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].get_error_name(), "MismatchedBlock");

    let errors = parse_source("if x:\nb\n").unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].get_error_name(), "MismatchedBlock");
}

#[test]
fn test_parse_recovers_at_statement_boundaries() {
    let errors = parse_source("a = )\nb = 2\nc = ]\nd = 4\n").unwrap_err();

    assert_eq!(errors.len(), 2);
    assert!(errors.iter().all(|error| error.get_kind() == ErrorKind::Parse));
    assert_eq!(errors[0].get_position().line, 1);
    assert_eq!(errors[1].get_position().line, 3);
}

#[test]
fn test_parse_recovers_inside_function_body() {
    let errors = parse_source("f(x) =\n    a = )\n    b = 1\nc = ]\n").unwrap_err();

    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].get_position().line, 2);
    assert_eq!(errors[1].get_position().line, 4);
}

#[test]
fn test_parse_empty_source() {
    assert!(parse_source("").unwrap().body.is_empty());
    assert!(parse_source("# only a comment\n\n").unwrap().body.is_empty());
}
