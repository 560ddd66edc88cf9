use std::{
    fmt::Display,
    slice::{Iter, IterMut},
};

use crate::{scope::scope::FunctionScope, Span, MK_STMT_COMMON};

use super::{
    ast::{Stmt, StmtType, StmtWrapper, ExprWrapper},
    expressions::{write_parameter_list, Parameter},
};

/// A sequence of statements, either an indented block or one line of
/// `;`-separated statements. The root of every parse is a block.
#[derive(Debug, Clone)]
pub struct BlockStmt {
    pub body: Vec<StmtWrapper>,
    pub id: i32,
    pub span: Span,
}

impl BlockStmt {
    pub fn iter(&self) -> Iter<'_, StmtWrapper> {
        self.body.iter()
    }
    pub fn iter_mut(&mut self) -> IterMut<'_, StmtWrapper> {
        self.body.iter_mut()
    }
}

impl Display for BlockStmt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(block")?;
        for stmt in &self.body {
            write!(f, " {}", stmt)?;
        }
        write!(f, ")")
    }
}

#[derive(Debug, Clone)]
pub struct ExpressionStmt {
    pub expression: ExprWrapper,
    pub span: Span,
}

impl Stmt for ExpressionStmt {
    MK_STMT_COMMON!();

    fn get_stmt_type(&self) -> StmtType {
        StmtType::ExpressionStmt
    }
    fn child_exprs(&self) -> Vec<&ExprWrapper> {
        vec![&self.expression]
    }
    fn child_blocks(&self) -> Vec<&BlockStmt> {
        vec![]
    }
}

impl Display for ExpressionStmt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.expression)
    }
}

/// Function Declaration - `name(params; bound) = body`
///
/// `is_local` is set for the `:=` form.
#[derive(Debug, Clone)]
pub struct FnDeclStmt {
    pub identifier: String,
    pub hinted: bool,
    pub is_local: bool,
    pub parameters: Vec<Parameter>,
    pub bound_variables: Vec<Parameter>,
    pub body: BlockStmt,
    /// Filled in by binding resolution
    pub scope: Option<FunctionScope>,
    pub span: Span,
}

impl Stmt for FnDeclStmt {
    MK_STMT_COMMON!();

    fn get_stmt_type(&self) -> StmtType {
        StmtType::FnDeclStmt
    }
    fn child_exprs(&self) -> Vec<&ExprWrapper> {
        vec![]
    }
    fn child_blocks(&self) -> Vec<&BlockStmt> {
        vec![&self.body]
    }
}

impl Display for FnDeclStmt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({} {}{} ",
            if self.is_local { "local-fn" } else { "fn" },
            self.identifier,
            if self.hinted { "@" } else { "" }
        )?;
        write_parameter_list(f, &self.parameters, &self.bound_variables)?;
        write!(f, " {})", self.body)
    }
}

/// If Statement
///
/// An `elif` chain is stored as an else block holding a single nested `IfStmt`.
#[derive(Debug, Clone)]
pub struct IfStmt {
    pub condition: ExprWrapper,
    pub then_body: BlockStmt,
    pub else_body: Option<BlockStmt>,
    pub span: Span,
}

impl Stmt for IfStmt {
    MK_STMT_COMMON!();

    fn get_stmt_type(&self) -> StmtType {
        StmtType::IfStmt
    }
    fn child_exprs(&self) -> Vec<&ExprWrapper> {
        vec![&self.condition]
    }
    fn child_blocks(&self) -> Vec<&BlockStmt> {
        std::iter::once(&self.then_body)
            .chain(self.else_body.iter())
            .collect()
    }
}

impl Display for IfStmt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(if {} {}", self.condition, self.then_body)?;
        if let Some(else_body) = &self.else_body {
            write!(f, " {}", else_body)?;
        }
        write!(f, ")")
    }
}

#[derive(Debug, Clone)]
pub struct ForStmt {
    /// Always a `SymbolExpr`
    pub variable: ExprWrapper,
    pub iterable: ExprWrapper,
    pub body: BlockStmt,
    pub span: Span,
}

impl Stmt for ForStmt {
    MK_STMT_COMMON!();

    fn get_stmt_type(&self) -> StmtType {
        StmtType::ForStmt
    }
    fn child_exprs(&self) -> Vec<&ExprWrapper> {
        vec![&self.iterable, &self.variable]
    }
    fn child_blocks(&self) -> Vec<&BlockStmt> {
        vec![&self.body]
    }
}

impl Display for ForStmt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(for {} {} {})", self.variable, self.iterable, self.body)
    }
}

/// Defer Statement - `defer [name [:= init]]: body`
///
/// The body runs when the enclosing function exits, latest first. `binding`
/// names a local that receives the function's result.
#[derive(Debug, Clone)]
pub struct DeferStmt {
    /// Always a `SymbolExpr` when present
    pub binding: Option<ExprWrapper>,
    pub initializer: Option<ExprWrapper>,
    pub body: BlockStmt,
    pub span: Span,
}

impl Stmt for DeferStmt {
    MK_STMT_COMMON!();

    fn get_stmt_type(&self) -> StmtType {
        StmtType::DeferStmt
    }
    fn child_exprs(&self) -> Vec<&ExprWrapper> {
        self.initializer
            .iter()
            .chain(self.binding.iter())
            .collect()
    }
    fn child_blocks(&self) -> Vec<&BlockStmt> {
        vec![&self.body]
    }
}

impl Display for DeferStmt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(defer")?;
        if let Some(binding) = &self.binding {
            write!(f, " {}", binding)?;
        }
        if let Some(initializer) = &self.initializer {
            write!(f, " {}", initializer)?;
        }
        write!(f, " {})", self.body)
    }
}

#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub value: Option<ExprWrapper>,
    pub span: Span,
}

impl Stmt for ReturnStmt {
    MK_STMT_COMMON!();

    fn get_stmt_type(&self) -> StmtType {
        StmtType::ReturnStmt
    }
    fn child_exprs(&self) -> Vec<&ExprWrapper> {
        self.value.iter().collect()
    }
    fn child_blocks(&self) -> Vec<&BlockStmt> {
        vec![]
    }
}

impl Display for ReturnStmt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.value {
            Some(value) => write!(f, "(return {})", value),
            None => write!(f, "(return)"),
        }
    }
}

/// Del Statement - removes a global binding
#[derive(Debug, Clone)]
pub struct DelStmt {
    /// Always a `SymbolExpr`
    pub target: ExprWrapper,
    pub span: Span,
}

impl Stmt for DelStmt {
    MK_STMT_COMMON!();

    fn get_stmt_type(&self) -> StmtType {
        StmtType::DelStmt
    }
    fn child_exprs(&self) -> Vec<&ExprWrapper> {
        vec![&self.target]
    }
    fn child_blocks(&self) -> Vec<&BlockStmt> {
        vec![]
    }
}

impl Display for DelStmt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(del {})", self.target)
    }
}
