//! Tags every identifier with where its binding lives.
//!
//! Each function gets its own scope. Names listed after `;` in a parameter
//! list are captured from the enclosing scopes; any other name assigned in
//! a function is a new local. Reads that find nothing are prospective
//! globals, checked when the program runs.
//!
//! Global-scope changes of the unit are collected in a batch and committed
//! only when the whole unit resolved without errors.

use std::collections::HashSet;

use crate::{
    ast::{
        ast::{ExprType, ExprWrapper, StmtType, StmtWrapper},
        expressions::{AssignmentExpr, LambdaExpr, Parameter, SymbolExpr, TupleExpr},
        statements::{
            BlockStmt, DeferStmt, DelStmt, ExpressionStmt, FnDeclStmt, ForStmt, IfStmt,
            ReturnStmt,
        },
    },
    errors::errors::{Error, ErrorImpl},
    scope::{
        globals::{GlobalBatch, GlobalScope},
        scope::{FunctionScope, Resolution, ScopeId, ScopeTree, Symbol, SymbolKind},
    },
    Span,
};

/// Reads seen so far in one function body
#[derive(Debug)]
struct Frame {
    scope: ScopeId,
    referenced: HashSet<String>,
}

pub struct BindingResolver {
    scopes: ScopeTree,
    current: ScopeId,
    frames: Vec<Frame>,
    batch: GlobalBatch,
    errors: Vec<Error>,
}

fn unbound_free_variable(name: &str, reason: &str, span: &Span) -> Error {
    Error::new(
        ErrorImpl::UnboundFreeVariable {
            variable: name.to_string(),
            reason: reason.to_string(),
        },
        span.clone(),
    )
}

impl BindingResolver {
    pub fn new(globals: &GlobalScope) -> Self {
        let mut scopes = ScopeTree::new();
        for symbol in globals.symbols() {
            scopes.declare(ScopeTree::GLOBAL, symbol.clone());
        }

        BindingResolver {
            scopes,
            current: ScopeTree::GLOBAL,
            frames: vec![],
            batch: GlobalBatch::new(),
            errors: vec![],
        }
    }

    fn at_global_scope(&self) -> bool {
        self.current == ScopeTree::GLOBAL
    }

    fn current_frame(&mut self) -> Option<&mut Frame> {
        self.frames
            .last_mut()
            .filter(|frame| frame.scope == self.current)
    }

    /// Opens a scope for a function with the given parameter lists.
    ///
    /// Every bound variable must already be declared somewhere outside.
    /// Returns the scope to go back to once the body is done.
    fn enter_function(
        &mut self,
        parameters: &[Parameter],
        bound_variables: &[Parameter],
    ) -> Result<ScopeId, Error> {
        let outer = self.current;

        for bound in bound_variables {
            if self.scopes.lookup(outer, &bound.name).is_none() {
                return Err(unbound_free_variable(
                    &bound.name,
                    "is not defined in an enclosing scope",
                    &bound.span,
                ));
            }
        }

        let scope = self.scopes.push_function(outer);
        for parameter in parameters {
            self.scopes.declare(
                scope,
                Symbol::new(parameter.name.clone(), SymbolKind::Parameter, scope)
                    .hinted(parameter.hinted),
            );
        }
        for bound in bound_variables {
            self.scopes.declare(
                scope,
                Symbol::new(bound.name.clone(), SymbolKind::BoundFree, scope).hinted(bound.hinted),
            );
        }

        self.current = scope;
        self.frames.push(Frame {
            scope,
            referenced: HashSet::new(),
        });

        Ok(outer)
    }

    /// Closes the current function scope and returns its symbol table.
    fn exit_function(&mut self, outer: ScopeId) -> FunctionScope {
        let scope = self.scopes.scope(self.current).to_function_scope();

        self.frames.pop();
        self.current = outer;

        scope
    }

    fn resolve_read(&mut self, name: &str, span: &Span) -> Result<Resolution, Error> {
        if let Some(frame) = self.current_frame() {
            frame.referenced.insert(name.to_string());
        }

        if self.at_global_scope() {
            return Ok(Resolution::Global);
        }

        let found = self
            .scopes
            .ancestors(self.current)
            .find_map(|id| self.scopes.scope(id).get(name).map(|symbol| (id, symbol.clone())));

        match found {
            None => Ok(Resolution::Global),
            Some((id, _)) if id == ScopeTree::GLOBAL => Ok(Resolution::Global),
            Some((id, symbol)) if id == self.current => Ok(match symbol.kind {
                SymbolKind::BoundFree => Resolution::BoundFree,
                _ => Resolution::Local,
            }),
            // Functions declared in an enclosing function are captured implicitly
            Some((_, symbol)) if symbol.is_static_function => {
                let capture = Symbol {
                    kind: SymbolKind::BoundFree,
                    scope: self.current,
                    ..symbol
                };
                self.scopes.declare(self.current, capture);

                Ok(Resolution::BoundFree)
            }
            Some(_) => Err(unbound_free_variable(
                name,
                "belongs to an enclosing function",
                span,
            )),
        }
    }

    /// Binds `name` as the target of an assignment in the current scope.
    fn resolve_write(
        &mut self,
        name: &str,
        local: bool,
        declared: Symbol,
        span: &Span,
    ) -> Result<Resolution, Error> {
        if self.at_global_scope() {
            let keeps_static = self
                .scopes
                .scope(ScopeTree::GLOBAL)
                .get(name)
                .is_some_and(|symbol| symbol.is_static_function);

            if !keeps_static {
                self.scopes.declare(ScopeTree::GLOBAL, declared.clone());
            }
            self.batch.declare(declared);

            return Ok(Resolution::Global);
        }

        let existing = self.scopes.scope(self.current).get(name).map(|symbol| symbol.kind);
        match existing {
            Some(SymbolKind::BoundFree) if !local => Ok(Resolution::BoundFree),
            Some(_) if !local => Ok(Resolution::Local),
            _ => {
                let read_first = self
                    .current_frame()
                    .is_some_and(|frame| frame.referenced.contains(name));

                if read_first && existing.is_none() {
                    return Err(unbound_free_variable(
                        name,
                        "is referenced before assignment",
                        span,
                    ));
                }

                self.scopes.declare(self.current, declared);
                Ok(Resolution::Local)
            }
        }
    }

    fn resolve_delete(&mut self, name: &str, span: &Span) -> Result<Resolution, Error> {
        let non_global = self
            .scopes
            .ancestors(self.current)
            .take_while(|id| *id != ScopeTree::GLOBAL)
            .any(|id| self.scopes.scope(id).contains(name));

        if non_global {
            return Err(Error::new(
                ErrorImpl::GlobalDeleteOfNonGlobal {
                    variable: name.to_string(),
                },
                span.clone(),
            ));
        }

        // Inside a function the deletion only happens when the function runs
        if self.at_global_scope() {
            self.scopes.scope_mut(ScopeTree::GLOBAL).remove(name);
            self.batch.delete(name);
        }

        Ok(Resolution::Global)
    }

    fn declared_symbol(&self, name: &str, hinted: bool) -> Symbol {
        let kind = if self.at_global_scope() {
            SymbolKind::Global
        } else {
            SymbolKind::Local
        };

        Symbol::new(name, kind, self.current).hinted(hinted)
    }
}

fn resolve_symbol(resolver: &mut BindingResolver, expr: &mut ExprWrapper) -> Result<(), Error> {
    let symbol = expr.node_mut::<SymbolExpr>()?;

    match resolver.resolve_read(&symbol.value, &symbol.span) {
        Ok(resolution) => {
            symbol.resolution = Some(resolution);
            Ok(())
        }
        Err(error) => {
            symbol.resolution = Some(Resolution::Unbound);
            Err(error)
        }
    }
}

fn resolve_assignment_target(
    resolver: &mut BindingResolver,
    target: &mut ExprWrapper,
    local: bool,
) -> Result<(), Error> {
    match target.get_expr_type() {
        ExprType::Symbol => {
            let symbol = target.node_mut::<SymbolExpr>()?;
            let declared = resolver.declared_symbol(&symbol.value, symbol.hinted);

            match resolver.resolve_write(&symbol.value, local, declared, &symbol.span) {
                Ok(resolution) => {
                    symbol.resolution = Some(resolution);
                    Ok(())
                }
                Err(error) => {
                    symbol.resolution = Some(Resolution::Unbound);
                    Err(error)
                }
            }
        }
        ExprType::Tuple => {
            for item in target.node_mut::<TupleExpr>()?.items.iter_mut() {
                resolve_assignment_target(resolver, item, local)?;
            }
            Ok(())
        }
        // Assigning through an index reads the indexed value
        _ => resolve_expr(resolver, target),
    }
}

pub fn resolve_expr(resolver: &mut BindingResolver, expr: &mut ExprWrapper) -> Result<(), Error> {
    match expr.get_expr_type() {
        ExprType::Symbol => resolve_symbol(resolver, expr),
        ExprType::Assignment | ExprType::LocalAssignment => {
            let assignment = expr.node_mut::<AssignmentExpr>()?;
            let local = assignment.is_local();

            resolve_expr(resolver, &mut assignment.value)?;
            resolve_assignment_target(resolver, &mut assignment.assignee, local)
        }
        ExprType::Lambda => {
            let lambda = expr.node_mut::<LambdaExpr>()?;

            let outer = resolver.enter_function(&lambda.parameters, &lambda.bound_variables)?;
            let result = resolve_expr(resolver, &mut lambda.body);
            lambda.scope = Some(resolver.exit_function(outer));

            result
        }
        ExprType::Ambiguous => Err(Error::internal(
            format!("`{}` reached binding resolution unresolved", expr),
            expr.get_span().clone(),
        )),
        _ => {
            for child in expr.children_mut() {
                resolve_expr(resolver, child)?;
            }
            Ok(())
        }
    }
}

fn resolve_fn_decl(resolver: &mut BindingResolver, decl: &mut FnDeclStmt) -> Result<(), Error> {
    let mut declared = Symbol::static_function(
        decl.identifier.clone(),
        SymbolKind::Local,
        resolver.current,
    )
    .hinted(decl.hinted);

    declared.kind = if resolver.at_global_scope() {
        SymbolKind::Global
    } else if decl.is_local {
        SymbolKind::LocalFunction
    } else {
        SymbolKind::Local
    };

    let resolution =
        resolver.resolve_write(&decl.identifier, decl.is_local, declared.clone(), &decl.span)?;
    if resolution == Resolution::Local {
        resolver.scopes.declare(resolver.current, declared);
    }

    // An error inside the body ends that body only; the unit keeps going
    let outer = match resolver.enter_function(&decl.parameters, &decl.bound_variables) {
        Ok(outer) => outer,
        Err(error) => {
            resolver.errors.push(error);
            return Ok(());
        }
    };

    let result = resolve_block(resolver, &mut decl.body);
    decl.scope = Some(resolver.exit_function(outer));

    if let Err(error) = result {
        resolver.errors.push(error);
    }

    Ok(())
}

pub fn resolve_stmt(resolver: &mut BindingResolver, stmt: &mut StmtWrapper) -> Result<(), Error> {
    match stmt.get_stmt_type() {
        StmtType::ExpressionStmt => {
            resolve_expr(resolver, &mut stmt.node_mut::<ExpressionStmt>()?.expression)
        }
        StmtType::FnDeclStmt => resolve_fn_decl(resolver, stmt.node_mut::<FnDeclStmt>()?),
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
        StmtType::DelStmt => {
            let del = stmt.node_mut::<DelStmt>()?;
            let symbol = del.target.node_mut::<SymbolExpr>()?;

            match resolver.resolve_delete(&symbol.value, &symbol.span) {
                Ok(resolution) => {
                    symbol.resolution = Some(resolution);
                    Ok(())
                }
                Err(error) => {
                    symbol.resolution = Some(Resolution::Unbound);
                    Err(error)
                }
            }
        }
    }
}

/// Resolves the statements of a function body, stopping at the first error.
pub fn resolve_block(resolver: &mut BindingResolver, block: &mut BlockStmt) -> Result<(), Error> {
    for stmt in block.iter_mut() {
        resolve_stmt(resolver, stmt)?;
    }

    Ok(())
}

/// Tags every identifier in `ast` and commits the unit's global changes.
///
/// Top-level statements are resolved independently, so one bad statement
/// does not hide errors in the next. On any error `globals` is left as it was.
pub fn resolve_bindings(ast: &mut BlockStmt, globals: &mut GlobalScope) -> Result<(), Vec<Error>> {
    let mut resolver = BindingResolver::new(globals);

    for stmt in ast.iter_mut() {
        if let Err(error) = resolve_stmt(&mut resolver, stmt) {
            resolver.errors.push(error);
        }
    }

    if !resolver.errors.is_empty() {
        return Err(resolver.errors);
    }

    globals.commit(resolver.batch);
    Ok(())
}

fn verify_expr(expr: &ExprWrapper) -> Result<(), Error> {
    match expr.get_expr_type() {
        ExprType::Ambiguous => {
            return Err(Error::internal(
                format!("juxtaposition `{}` was never resolved", expr),
                expr.get_span().clone(),
            ))
        }
        ExprType::Symbol => {
            let symbol = expr.node_ref::<SymbolExpr>()?;
            if symbol.resolution.is_none() {
                return Err(Error::internal(
                    format!("identifier `{}` has no binding", symbol.value),
                    symbol.span.clone(),
                ));
            }
        }
        _ => {}
    }

    for child in expr.children() {
        verify_expr(child)?;
    }

    Ok(())
}

/// Checks that no juxtaposition is left and every identifier is tagged.
pub fn verify_resolved(ast: &BlockStmt) -> Result<(), Error> {
    for stmt in ast.iter() {
        for expr in stmt.child_exprs() {
            verify_expr(expr)?;
        }
        for block in stmt.child_blocks() {
            verify_resolved(block)?;
        }
    }

    Ok(())
}
