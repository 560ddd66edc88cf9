//! Unit tests for binding resolution.

use std::rc::Rc;

use crate::{
    ast::{
        ast::{ExprType, ExprWrapper},
        expressions::{AssignmentExpr, LambdaExpr, SymbolExpr},
        statements::{BlockStmt, ExpressionStmt, FnDeclStmt},
    },
    call_resolver::call_resolver::resolve_calls,
    errors::errors::{Error, ErrorImpl, ErrorKind},
    lexer::lexer::tokenize,
    parser::parser::parse,
    scope::{
        globals::GlobalScope,
        scope::{Resolution, SymbolKind},
    },
};

use super::binding_resolver::{resolve_bindings, verify_resolved};

fn parse_source(source: &str) -> BlockStmt {
    let tokens = tokenize(source.to_string(), Some("test.cy".to_string())).unwrap();
    let (_, ast) = parse(tokens, Rc::new("test.cy".to_string()));
    ast.unwrap()
}

fn resolve_in(source: &str, globals: &mut GlobalScope) -> Result<BlockStmt, Vec<Error>> {
    let mut ast = parse_source(source);
    resolve_calls(&mut ast, globals).map_err(|error| vec![error])?;
    resolve_bindings(&mut ast, globals)?;
    Ok(ast)
}

fn resolve(source: &str) -> Result<BlockStmt, Vec<Error>> {
    resolve_in(source, &mut GlobalScope::new())
}

fn collect_expr(expr: &ExprWrapper, out: &mut Vec<(String, Option<Resolution>)>) {
    if expr.get_expr_type() == ExprType::Symbol {
        let symbol = expr.node_ref::<SymbolExpr>().unwrap();
        out.push((symbol.value.clone(), symbol.resolution));
    }
    for child in expr.children() {
        collect_expr(child, out);
    }
}

/// Every identifier with its tag, in tree order.
fn resolutions(block: &BlockStmt) -> Vec<(String, Option<Resolution>)> {
    let mut out = vec![];
    for stmt in block.iter() {
        for expr in stmt.child_exprs() {
            collect_expr(expr, &mut out);
        }
        for child in stmt.child_blocks() {
            out.extend(resolutions(child));
        }
    }
    out
}

fn tag(name: &str, resolution: Resolution) -> (String, Option<Resolution>) {
    (name.to_string(), Some(resolution))
}

fn unbound_name(error: &Error) -> Option<&str> {
    match error.get_impl() {
        ErrorImpl::UnboundFreeVariable { variable, .. } => Some(variable),
        _ => None,
    }
}

#[test]
fn test_forward_reference_to_global_function() {
    let mut globals = GlobalScope::new();
    let ast = resolve_in("g(x) = 2f(x)\nf(x) = x+1\n", &mut globals).unwrap();

    assert_eq!(
        resolutions(&ast),
        vec![
            tag("f", Resolution::Global),
            tag("x", Resolution::Local),
            tag("x", Resolution::Local),
        ]
    );
    assert!(globals.get("f").is_some_and(|f| f.is_static_function));
    assert!(globals.get("g").is_some_and(|g| g.is_static_function));
}

#[test]
fn test_read_of_enclosing_local_is_unbound() {
    let errors = resolve("f(x) =\n    y = x\n    g() := y\n    g()\n").unwrap_err();

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].get_kind(), ErrorKind::Binding);
    assert_eq!(errors[0].get_error_name(), "UnboundFreeVariableError");
    assert_eq!(unbound_name(&errors[0]), Some("y"));
}

#[test]
fn test_local_function_can_call_itself() {
    let ast = resolve("outer(x) =\n    h(y) = h(y - 1)\n    h(x)\n").unwrap();

    let outer = ast.body[0].node_ref::<FnDeclStmt>().unwrap();
    let h = outer.body.body[0].node_ref::<FnDeclStmt>().unwrap();
    let h_scope = h.scope.as_ref().unwrap();

    assert_eq!(h_scope.names(), vec!["y", "h"]);
    assert!(h_scope
        .get("h")
        .is_some_and(|h| h.kind == SymbolKind::BoundFree && h.is_static_function));
    assert!(resolutions(&ast).contains(&tag("h", Resolution::BoundFree)));
    assert!(verify_resolved(&ast).is_ok());
}

#[test]
fn test_local_function_can_call_sibling() {
    let ast = resolve("outer(x) =\n    h(y) = y\n    k(z) = h(z)\n    k(x)\n").unwrap();

    let outer = ast.body[0].node_ref::<FnDeclStmt>().unwrap();
    let k = outer.body.body[1].node_ref::<FnDeclStmt>().unwrap();
    assert_eq!(k.scope.as_ref().unwrap().names(), vec!["z", "h"]);
    assert_eq!(
        outer.scope.as_ref().unwrap().get("h").map(|h| h.kind),
        Some(SymbolKind::Local)
    );
}

#[test]
fn test_bound_variable_must_exist_outside() {
    let errors = resolve("f(x; nope) = x\n").unwrap_err();

    assert_eq!(errors.len(), 1);
    assert_eq!(unbound_name(&errors[0]), Some("nope"));
}

#[test]
fn test_read_before_assignment_is_unbound() {
    let errors = resolve("f(x) =\n    y = z\n    z = x\n").unwrap_err();

    assert_eq!(errors.len(), 1);
    assert_eq!(unbound_name(&errors[0]), Some("z"));
}

#[test]
fn test_bound_variable_assignment_mutates_capture() {
    let ast = resolve("a = 1\nf(x; a) =\n    a = x\ng(x) =\n    a = x\n").unwrap();

    assert_eq!(
        resolutions(&ast),
        vec![
            tag("a", Resolution::Global),
            tag("x", Resolution::Local),
            tag("a", Resolution::BoundFree),
            tag("x", Resolution::Local),
            tag("a", Resolution::Local),
        ]
    );

    let f = ast.body[1].node_ref::<FnDeclStmt>().unwrap();
    let f_scope = f.scope.as_ref().unwrap();
    assert_eq!(f_scope.names(), vec!["x", "a"]);
    assert_eq!(f_scope.get("a").map(|a| a.kind), Some(SymbolKind::BoundFree));

    let g = ast.body[2].node_ref::<FnDeclStmt>().unwrap();
    let g_scope = g.scope.as_ref().unwrap();
    assert_eq!(g_scope.get("a").map(|a| a.kind), Some(SymbolKind::Local));
}

#[test]
fn test_local_assignment_shadows_capture() {
    let ast = resolve("a = 1\nf(x; a) =\n    a := x\n    a\n").unwrap();

    let tags = resolutions(&ast);
    assert_eq!(tags[2], tag("a", Resolution::Local));
    assert_eq!(tags[3], tag("a", Resolution::Local));
}

#[test]
fn test_errors_in_separate_functions_are_all_reported() {
    let mut globals = GlobalScope::new();
    let source = "f(; nope) = 1\ng(x) =\n    y = w\n    w = 1\nh(x) = x\n";
    let errors = resolve_in(source, &mut globals).unwrap_err();

    let names: Vec<_> = errors.iter().filter_map(unbound_name).collect();
    assert_eq!(names, vec!["nope", "w"]);
    assert!(globals.is_empty());
}

#[test]
fn test_delete_global() {
    let mut globals = GlobalScope::new();
    resolve_in("x = 1\ny = 2\n", &mut globals).unwrap();
    resolve_in("del x\n", &mut globals).unwrap();

    assert!(!globals.contains("x"));
    assert!(globals.contains("y"));
}

#[test]
fn test_delete_inside_function_keeps_global_until_run() {
    let mut globals = GlobalScope::new();
    let ast = resolve_in("x = 1\nf() =\n    del x\n", &mut globals).unwrap();

    assert!(globals.contains("x"));
    assert_eq!(resolutions(&ast)[1], tag("x", Resolution::Global));
}

#[test]
fn test_delete_of_parameter_is_rejected() {
    let errors = resolve("f(y) =\n    del y\n").unwrap_err();

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].get_error_name(), "GlobalDeleteOfNonGlobalError");
}

#[test]
fn test_failed_unit_leaves_globals_unchanged() {
    let mut globals = GlobalScope::new();
    resolve_in("a = 1\n", &mut globals).unwrap();

    assert!(resolve_in("b = 1\ndel a\nc(; nope) = 1\n", &mut globals).is_err());

    assert!(globals.contains("a"));
    assert!(!globals.contains("b"));
    assert!(!globals.contains("c"));
}

#[test]
fn test_lambda_scope_is_recorded() {
    let ast = resolve("a = 2\nk = (x; a) -> x a\n").unwrap();

    let statement = ast.body[1].node_ref::<ExpressionStmt>().unwrap();
    let assignment = statement.expression.node_ref::<AssignmentExpr>().unwrap();
    let lambda = assignment.value.node_ref::<LambdaExpr>().unwrap();

    assert_eq!(lambda.scope.as_ref().unwrap().names(), vec!["x", "a"]);
    assert_eq!(
        resolutions(&ast)[1..3],
        [tag("x", Resolution::Local), tag("a", Resolution::BoundFree)]
    );
}

#[test]
fn test_defer_binding_is_local() {
    let ast = resolve("f(x) =\n    defer r := x:\n        return r\n    return x\n").unwrap();

    let f = ast.body[0].node_ref::<FnDeclStmt>().unwrap();
    let scope = f.scope.as_ref().unwrap();
    assert_eq!(scope.get("r").map(|r| r.kind), Some(SymbolKind::Local));
}

#[test]
fn test_verify_resolved() {
    let ast = resolve("f(x) = x^2\ny = f(3) + 2z\n").unwrap();
    assert!(verify_resolved(&ast).is_ok());

    let parsed = parse_source("2x\n");
    let error = verify_resolved(&parsed).unwrap_err();
    assert_eq!(error.get_kind(), ErrorKind::Internal);

    let mut calls_only = parse_source("y\n");
    resolve_calls(&mut calls_only, &GlobalScope::new()).unwrap();
    assert_eq!(
        verify_resolved(&calls_only).unwrap_err().get_kind(),
        ErrorKind::Internal
    );
}

#[test]
fn test_resolution_is_idempotent() {
    let mut globals = GlobalScope::new();
    let source = "a = 1\nf(x; a) =\n    a = x\n    b = f(x)\n    b\nk = (x; a) -> x a\ndel a\n";
    let mut ast = resolve_in(source, &mut globals).unwrap();
    let once = format!("{:?}", ast);

    resolve_calls(&mut ast, &globals).unwrap();
    resolve_bindings(&mut ast, &mut globals).unwrap();

    assert_eq!(format!("{:?}", ast), once);
}
