use std::{
    any::{type_name, Any},
    fmt::{Debug, Display},
    ops::{Deref, DerefMut},
};

use crate::{errors::errors::Error, Span};

use super::{expressions::TupleExpr, statements::BlockStmt};

/// Statement Types
#[derive(PartialEq, Clone, Copy, Debug)]
pub enum StmtType {
    ExpressionStmt,
    FnDeclStmt,
    IfStmt,
    ForStmt,
    DeferStmt,
    ReturnStmt,
    DelStmt,
}

/// Statement Trait
///
/// Defines the behavior of all statement types in the AST.
/// `Display` renders the statement as an S-expression.
pub trait Stmt: Debug + Display {
    /// Returns the type of the statement.
    fn get_stmt_type(&self) -> StmtType;
    /// Type conversion purposes - used with `.downcast_ref<T>()`
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    /// Clones the statement into a StmtWrapper.
    /// Clone cannot be derived for certain trait objects, so this method is necessary.
    fn clone_wrapper(&self) -> StmtWrapper;
    /// Returns the span of the statement.
    fn get_span(&self) -> &Span;
    /// Expressions owned directly by the statement, in evaluation order.
    fn child_exprs(&self) -> Vec<&ExprWrapper>;
    /// Blocks owned directly by the statement.
    fn child_blocks(&self) -> Vec<&BlockStmt>;
}

/// Statement Wrapper
///
/// A wrapper that allows for any statement kind to be stored with helper methods
#[derive(Debug)]
pub struct StmtWrapper(Box<dyn Stmt>);

impl StmtWrapper {
    pub fn new<T: Stmt + 'static>(stmt: T) -> Self {
        StmtWrapper(Box::new(stmt))
    }

    /// Downcasts to a concrete statement, reporting a mismatch as an internal error.
    pub fn node_ref<T: Stmt + 'static>(&self) -> Result<&T, Error> {
        self.0
            .as_any()
            .downcast_ref::<T>()
            .ok_or_else(|| mismatch::<T>(self.0.get_span()))
    }

    pub fn node_mut<T: Stmt + 'static>(&mut self) -> Result<&mut T, Error> {
        let span = self.0.get_span().clone();
        self.0
            .as_any_mut()
            .downcast_mut::<T>()
            .ok_or_else(|| mismatch::<T>(&span))
    }
}

impl Deref for StmtWrapper {
    type Target = Box<dyn Stmt>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for StmtWrapper {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl Display for StmtWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl Clone for StmtWrapper {
    fn clone(&self) -> Self {
        self.0.clone_wrapper()
    }
}

/// Expression Types
///
/// Defines the various kinds of expressions in the AST.
#[derive(PartialEq, Clone, Copy, Debug)]
pub enum ExprType {
    Number,
    String,
    Symbol,
    Binary,
    Prefix,
    Postfix,
    Call,
    Index,
    Tuple,
    Matrix,
    Map,
    Lambda,
    Assignment,
    LocalAssignment,
    /// Juxtaposition not yet classified as call or multiplication
    Ambiguous,
}

pub trait Expr: Debug + Display {
    /// Returns the expression type of the expression.
    fn get_expr_type(&self) -> ExprType;
    /// Type conversion purposes - used with `.downcast_ref<T>()`
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
    /// Clones the expression into an ExprWrapper.
    /// Clone cannot be derived for certain trait objects, so this method is necessary.
    fn clone_wrapper(&self) -> ExprWrapper;
    /// Returns the span of the expression.
    fn get_span(&self) -> &Span;
    /// Direct subexpressions in evaluation order.
    fn children(&self) -> Vec<&ExprWrapper>;
    fn children_mut(&mut self) -> Vec<&mut ExprWrapper>;
}

/// Expression Wrapper
///
/// A wrapper that allows for any expression kind to be stored with helper methods
#[derive(Debug)]
pub struct ExprWrapper(Box<dyn Expr>);

impl ExprWrapper {
    pub fn new<T: Expr + 'static>(expression: T) -> Self {
        ExprWrapper(Box::new(expression))
    }

    /// Downcasts to a concrete expression, reporting a mismatch as an internal error.
    pub fn node_ref<T: Expr + 'static>(&self) -> Result<&T, Error> {
        self.0
            .as_any()
            .downcast_ref::<T>()
            .ok_or_else(|| mismatch::<T>(self.0.get_span()))
    }

    pub fn node_mut<T: Expr + 'static>(&mut self) -> Result<&mut T, Error> {
        let span = self.0.get_span().clone();
        self.0
            .as_any_mut()
            .downcast_mut::<T>()
            .ok_or_else(|| mismatch::<T>(&span))
    }

    /// Consumes the wrapper and returns the concrete expression.
    pub fn into_node<T: Expr + 'static>(self) -> Result<T, Error> {
        let span = self.0.get_span().clone();
        self.0
            .into_any()
            .downcast::<T>()
            .map(|node| *node)
            .map_err(|_| mismatch::<T>(&span))
    }

    /// Moves the expression out, leaving an empty tuple with the same span behind.
    pub fn take(&mut self) -> ExprWrapper {
        let placeholder = ExprWrapper::new(TupleExpr {
            items: vec![],
            span: self.0.get_span().clone(),
        });

        std::mem::replace(self, placeholder)
    }
}

impl Deref for ExprWrapper {
    type Target = Box<dyn Expr>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for ExprWrapper {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl Display for ExprWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl Clone for ExprWrapper {
    fn clone(&self) -> Self {
        self.0.clone_wrapper()
    }
}

fn mismatch<T>(span: &Span) -> Error {
    Error::internal(format!("node is not a {}", short_type_name::<T>()), span.clone())
}

fn short_type_name<T>() -> &'static str {
    let name = type_name::<T>();
    name.rsplit("::").next().unwrap_or(name)
}

/// Writes `items` separated by single spaces.
pub fn write_joined<T: Display>(
    f: &mut std::fmt::Formatter<'_>,
    items: impl IntoIterator<Item = T>,
) -> std::fmt::Result {
    for (index, item) in items.into_iter().enumerate() {
        if index > 0 {
            write!(f, " ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}
