//! Decides, for every juxtaposition left by the parser, whether it is a call
//! or an implicit multiplication.
//!
//! A name is callable when it was declared with `name(...) = body` somewhere
//! up the static scope chain and not shadowed since, or when it carries the
//! `@` hint. The scope tree built here only serves this decision and is
//! dropped afterwards; binding resolution builds its own.

use crate::{
    ast::{
        ast::{ExprType, ExprWrapper, StmtType, StmtWrapper},
        expressions::{
            AdjacentOperand, AmbiguousExpr, AssignmentExpr, BinaryExpr, CallExpr, LambdaExpr,
            Parameter, SymbolExpr, TupleExpr,
        },
        statements::{
            BlockStmt, DeferStmt, ExpressionStmt, FnDeclStmt, ForStmt, IfStmt, ReturnStmt,
        },
    },
    errors::errors::Error,
    lexer::tokens::{Token, TokenKind},
    scope::{
        globals::GlobalScope,
        scope::{ScopeId, ScopeTree, Symbol, SymbolKind},
    },
    Span, MK_TOKEN,
};

pub struct CallResolver {
    scopes: ScopeTree,
    current: ScopeId,
}

impl CallResolver {
    /// Starts from the globals of earlier units so their functions stay callable.
    pub fn new(globals: &GlobalScope) -> Self {
        let mut scopes = ScopeTree::new();
        for symbol in globals.symbols() {
            scopes.declare(ScopeTree::GLOBAL, symbol.clone());
        }

        CallResolver {
            scopes,
            current: ScopeTree::GLOBAL,
        }
    }

    fn at_global_scope(&self) -> bool {
        self.current == ScopeTree::GLOBAL
    }

    /// Whether `callee` juxtaposed with an argument list is a call.
    fn is_call_target(&self, callee: &ExprWrapper) -> Result<bool, Error> {
        if callee.get_expr_type() != ExprType::Symbol {
            return Ok(false);
        }

        let symbol = callee.node_ref::<SymbolExpr>()?;
        if symbol.hinted {
            return Ok(true);
        }

        Ok(self
            .scopes
            .lookup(self.current, &symbol.value)
            .is_some_and(|found| found.is_callable()))
    }

    fn declare_function(&mut self, decl: &FnDeclStmt) {
        let kind = if self.at_global_scope() {
            SymbolKind::Global
        } else if decl.is_local {
            SymbolKind::LocalFunction
        } else {
            SymbolKind::Local
        };

        let existing_hint = self
            .scopes
            .scope(self.current)
            .get(&decl.identifier)
            .and_then(|symbol| symbol.type_hint);

        let mut symbol = Symbol::static_function(decl.identifier.clone(), kind, self.current)
            .hinted(decl.hinted);
        symbol.type_hint = symbol.type_hint.or(existing_hint);

        self.scopes.declare(self.current, symbol);
    }

    /// Opens a function scope holding `parameters` and `bound_variables`
    /// and makes it current. Returns the scope to go back to.
    fn enter_function(&mut self, parameters: &[Parameter], bound_variables: &[Parameter]) -> ScopeId {
        let outer = self.current;
        let scope = self.scopes.push_function(outer);

        for bound in bound_variables {
            // A captured name keeps whatever the enclosing scope knows about it
            let symbol = match self.scopes.lookup(outer, &bound.name) {
                Some(found) => Symbol {
                    kind: SymbolKind::BoundFree,
                    scope,
                    ..found.clone()
                }
                .hinted(bound.hinted),
                None => Symbol::new(bound.name.clone(), SymbolKind::BoundFree, scope)
                    .hinted(bound.hinted),
            };
            self.scopes.declare(scope, symbol);
        }

        for parameter in parameters {
            self.scopes.declare(
                scope,
                Symbol::new(parameter.name.clone(), SymbolKind::Parameter, scope)
                    .hinted(parameter.hinted),
            );
        }

        self.current = scope;
        outer
    }

    fn assign_name(&mut self, name: &str, hinted: bool, local: bool) {
        let scope = self.scopes.scope_mut(self.current);

        let keep = if self.current == ScopeTree::GLOBAL {
            scope.get(name).is_some_and(|symbol| symbol.is_static_function)
        } else {
            !local && scope.contains(name)
        };

        if keep {
            if let Some(symbol) = scope.get_mut(name) {
                if hinted {
                    *symbol = symbol.clone().hinted(true);
                }
            }
            return;
        }

        let kind = if self.current == ScopeTree::GLOBAL {
            SymbolKind::Global
        } else {
            SymbolKind::Local
        };
        scope.declare(Symbol::new(name, kind, self.current).hinted(hinted));
    }
}

fn multiply(left: ExprWrapper, right: ExprWrapper, span: Span) -> ExprWrapper {
    let operator = MK_TOKEN!(TokenKind::Star, String::from("*"), span.clone());

    ExprWrapper::new(BinaryExpr {
        left,
        operator,
        right,
        implicit: true,
        span,
    })
}

fn resolve_ambiguous_expr(
    resolver: &mut CallResolver,
    ambiguous: AmbiguousExpr,
) -> Result<ExprWrapper, Error> {
    let AmbiguousExpr {
        mut left,
        right,
        span,
    } = ambiguous;

    resolve_expr(resolver, &mut left)?;

    match right {
        AdjacentOperand::Arguments(mut arguments) => {
            for item in arguments.items.iter_mut() {
                resolve_expr(resolver, item)?;
            }

            if resolver.is_call_target(&left)? {
                Ok(ExprWrapper::new(CallExpr {
                    callee: left,
                    arguments: arguments.items,
                    span,
                }))
            } else {
                Ok(multiply(left, arguments.into_operand(), span))
            }
        }
        AdjacentOperand::Operand(mut operand) => {
            resolve_expr(resolver, &mut operand)?;
            Ok(multiply(left, operand, span))
        }
    }
}

fn resolve_assignment_target(
    resolver: &mut CallResolver,
    target: &mut ExprWrapper,
    local: bool,
) -> Result<(), Error> {
    match target.get_expr_type() {
        ExprType::Symbol => {
            let symbol = target.node_ref::<SymbolExpr>()?;
            resolver.assign_name(&symbol.value, symbol.hinted, local);
            Ok(())
        }
        ExprType::Tuple => {
            for item in target.node_mut::<TupleExpr>()?.items.iter_mut() {
                resolve_assignment_target(resolver, item, local)?;
            }
            Ok(())
        }
        ExprType::Index => resolve_expr(resolver, target),
        _ => Err(Error::internal(
            format!("cannot assign to `{}`", target),
            target.get_span().clone(),
        )),
    }
}

pub fn resolve_expr(resolver: &mut CallResolver, expr: &mut ExprWrapper) -> Result<(), Error> {
    match expr.get_expr_type() {
        ExprType::Ambiguous => {
            let ambiguous = expr.take().into_node::<AmbiguousExpr>()?;
            *expr = resolve_ambiguous_expr(resolver, ambiguous)?;
            Ok(())
        }
        ExprType::Assignment | ExprType::LocalAssignment => {
            let assignment = expr.node_mut::<AssignmentExpr>()?;
            let local = assignment.is_local();

            resolve_expr(resolver, &mut assignment.value)?;
            resolve_assignment_target(resolver, &mut assignment.assignee, local)
        }
        ExprType::Lambda => {
            let lambda = expr.node_mut::<LambdaExpr>()?;

            let outer = resolver.enter_function(&lambda.parameters, &lambda.bound_variables);
            let result = resolve_expr(resolver, &mut lambda.body);
            resolver.current = outer;

            result
        }
        _ => {
            for child in expr.children_mut() {
                resolve_expr(resolver, child)?;
            }
            Ok(())
        }
    }
}

pub fn resolve_stmt(resolver: &mut CallResolver, stmt: &mut StmtWrapper) -> Result<(), Error> {
    match stmt.get_stmt_type() {
        StmtType::ExpressionStmt => {
            resolve_expr(resolver, &mut stmt.node_mut::<ExpressionStmt>()?.expression)
        }
        StmtType::FnDeclStmt => {
            let decl = stmt.node_mut::<FnDeclStmt>()?;

            // Declared before the body so the function can call itself
            resolver.declare_function(decl);

            let outer = resolver.enter_function(&decl.parameters, &decl.bound_variables);
            let result = resolve_block(resolver, &mut decl.body);
            resolver.current = outer;

            result
        }
        StmtType::IfStmt => {
            let if_stmt = stmt.node_mut::<IfStmt>()?;

            resolve_expr(resolver, &mut if_stmt.condition)?;
            resolve_block(resolver, &mut if_stmt.then_body)?;
            if let Some(else_body) = &mut if_stmt.else_body {
                resolve_block(resolver, else_body)?;
            }
            Ok(())
        }
        StmtType::ForStmt => {
            let for_stmt = stmt.node_mut::<ForStmt>()?;

            resolve_expr(resolver, &mut for_stmt.iterable)?;
            resolve_assignment_target(resolver, &mut for_stmt.variable, false)?;
            resolve_block(resolver, &mut for_stmt.body)
        }
        StmtType::DeferStmt => {
            let defer = stmt.node_mut::<DeferStmt>()?;

            if let Some(initializer) = &mut defer.initializer {
                resolve_expr(resolver, initializer)?;
            }
            if let Some(binding) = &mut defer.binding {
                resolve_assignment_target(resolver, binding, true)?;
            }
            resolve_block(resolver, &mut defer.body)
        }
        StmtType::ReturnStmt => match &mut stmt.node_mut::<ReturnStmt>()?.value {
            Some(value) => resolve_expr(resolver, value),
            None => Ok(()),
        },
        // Deleting a name does not change how earlier code classified it
        StmtType::DelStmt => Ok(()),
    }
}

pub fn resolve_block(resolver: &mut CallResolver, block: &mut BlockStmt) -> Result<(), Error> {
    for stmt in block.iter_mut() {
        resolve_stmt(resolver, stmt)?;
    }

    Ok(())
}

/// Rewrites every juxtaposition in `ast` into a `CallExpr` or an implicit
/// multiplication. Running it again on its own output changes nothing.
pub fn resolve_calls(ast: &mut BlockStmt, globals: &GlobalScope) -> Result<(), Error> {
    let mut resolver = CallResolver::new(globals);
    resolve_block(&mut resolver, ast)
}
