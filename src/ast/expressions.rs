use std::fmt::Display;

use crate::{
    lexer::tokens::{Literal, Token},
    scope::scope::{FunctionScope, Resolution},
    Span, MK_EXPR_COMMON,
};

use super::ast::{write_joined, Expr, ExprType, ExprWrapper};

// LITERALS

/// Number Expression
/// Represents a numeric literal in the AST, kept as decoded digits so the
/// evaluator can pick its own precision.
#[derive(Debug, Clone)]
pub struct NumberExpr {
    pub literal: Literal,
    /// Source spelling, separators included
    pub lexeme: String,
    pub span: Span,
}

impl Expr for NumberExpr {
    MK_EXPR_COMMON!();

    fn get_expr_type(&self) -> ExprType {
        ExprType::Number
    }
    fn children(&self) -> Vec<&ExprWrapper> {
        vec![]
    }
    fn children_mut(&mut self) -> Vec<&mut ExprWrapper> {
        vec![]
    }
}

impl Display for NumberExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.literal)
    }
}

/// String Expression
/// Holds the decoded string contents.
#[derive(Debug, Clone)]
pub struct StringExpr {
    pub value: String,
    pub span: Span,
}

impl Expr for StringExpr {
    MK_EXPR_COMMON!();

    fn get_expr_type(&self) -> ExprType {
        ExprType::String
    }
    fn children(&self) -> Vec<&ExprWrapper> {
        vec![]
    }
    fn children_mut(&mut self) -> Vec<&mut ExprWrapper> {
        vec![]
    }
}

impl Display for StringExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.value)
    }
}

/// Symbol Expression
/// An identifier reference. `resolution` stays `None` until binding resolution.
#[derive(Debug, Clone)]
pub struct SymbolExpr {
    pub value: String,
    /// Written with the `@` call hint
    pub hinted: bool,
    pub resolution: Option<Resolution>,
    pub span: Span,
}

impl SymbolExpr {
    pub fn new(value: String, hinted: bool, span: Span) -> Self {
        SymbolExpr {
            value,
            hinted,
            resolution: None,
            span,
        }
    }
}

impl Expr for SymbolExpr {
    MK_EXPR_COMMON!();

    fn get_expr_type(&self) -> ExprType {
        ExprType::Symbol
    }
    fn children(&self) -> Vec<&ExprWrapper> {
        vec![]
    }
    fn children_mut(&mut self) -> Vec<&mut ExprWrapper> {
        vec![]
    }
}

impl Display for SymbolExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.value, if self.hinted { "@" } else { "" })
    }
}

// OPERATORS

/// Binary Expression
///
/// `implicit` marks a multiplication that came from juxtaposition.
#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub left: ExprWrapper,
    pub operator: Token,
    pub right: ExprWrapper,
    pub implicit: bool,
    pub span: Span,
}

impl Expr for BinaryExpr {
    MK_EXPR_COMMON!();

    fn get_expr_type(&self) -> ExprType {
        ExprType::Binary
    }
    fn children(&self) -> Vec<&ExprWrapper> {
        vec![&self.left, &self.right]
    }
    fn children_mut(&mut self) -> Vec<&mut ExprWrapper> {
        vec![&mut self.left, &mut self.right]
    }
}

impl Display for BinaryExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} {} {})", self.operator.value, self.left, self.right)
    }
}

#[derive(Debug, Clone)]
pub struct PrefixExpr {
    pub operator: Token,
    pub right_expr: ExprWrapper,
    pub span: Span,
}

impl Expr for PrefixExpr {
    MK_EXPR_COMMON!();

    fn get_expr_type(&self) -> ExprType {
        ExprType::Prefix
    }
    fn children(&self) -> Vec<&ExprWrapper> {
        vec![&self.right_expr]
    }
    fn children_mut(&mut self) -> Vec<&mut ExprWrapper> {
        vec![&mut self.right_expr]
    }
}

impl Display for PrefixExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} {})", self.operator.value, self.right_expr)
    }
}

#[derive(Debug, Clone)]
pub struct PostfixExpr {
    pub operator: Token,
    pub left_expr: ExprWrapper,
    pub span: Span,
}

impl Expr for PostfixExpr {
    MK_EXPR_COMMON!();

    fn get_expr_type(&self) -> ExprType {
        ExprType::Postfix
    }
    fn children(&self) -> Vec<&ExprWrapper> {
        vec![&self.left_expr]
    }
    fn children_mut(&mut self) -> Vec<&mut ExprWrapper> {
        vec![&mut self.left_expr]
    }
}

impl Display for PostfixExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} {})", self.operator.value, self.left_expr)
    }
}

/// Assignment Expression
///
/// Covers both `=` and `:=`; the operator token tells them apart.
#[derive(Debug, Clone)]
pub struct AssignmentExpr {
    pub assignee: ExprWrapper,
    pub operator: Token,
    pub value: ExprWrapper,
    pub span: Span,
}

impl AssignmentExpr {
    pub fn is_local(&self) -> bool {
        self.operator.value == ":="
    }
}

impl Expr for AssignmentExpr {
    MK_EXPR_COMMON!();

    fn get_expr_type(&self) -> ExprType {
        if self.is_local() {
            ExprType::LocalAssignment
        } else {
            ExprType::Assignment
        }
    }
    fn children(&self) -> Vec<&ExprWrapper> {
        vec![&self.value, &self.assignee]
    }
    fn children_mut(&mut self) -> Vec<&mut ExprWrapper> {
        vec![&mut self.value, &mut self.assignee]
    }
}

impl Display for AssignmentExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} {} {})", self.operator.value, self.assignee, self.value)
    }
}

// COMPOUND

#[derive(Debug, Clone)]
pub struct CallExpr {
    pub callee: ExprWrapper,
    pub arguments: Vec<ExprWrapper>,
    pub span: Span,
}

impl Expr for CallExpr {
    MK_EXPR_COMMON!();

    fn get_expr_type(&self) -> ExprType {
        ExprType::Call
    }
    fn children(&self) -> Vec<&ExprWrapper> {
        std::iter::once(&self.callee)
            .chain(self.arguments.iter())
            .collect()
    }
    fn children_mut(&mut self) -> Vec<&mut ExprWrapper> {
        std::iter::once(&mut self.callee)
            .chain(self.arguments.iter_mut())
            .collect()
    }
}

impl Display for CallExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(call {}", self.callee)?;
        for argument in &self.arguments {
            write!(f, " {}", argument)?;
        }
        write!(f, ")")
    }
}

/// Index Expression - `target{i, j}`
#[derive(Debug, Clone)]
pub struct IndexExpr {
    pub target: ExprWrapper,
    pub indices: Vec<ExprWrapper>,
    pub span: Span,
}

impl Expr for IndexExpr {
    MK_EXPR_COMMON!();

    fn get_expr_type(&self) -> ExprType {
        ExprType::Index
    }
    fn children(&self) -> Vec<&ExprWrapper> {
        std::iter::once(&self.target)
            .chain(self.indices.iter())
            .collect()
    }
    fn children_mut(&mut self) -> Vec<&mut ExprWrapper> {
        std::iter::once(&mut self.target)
            .chain(self.indices.iter_mut())
            .collect()
    }
}

impl Display for IndexExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(index {}", self.target)?;
        for index in &self.indices {
            write!(f, " {}", index)?;
        }
        write!(f, ")")
    }
}

#[derive(Debug, Clone)]
pub struct TupleExpr {
    pub items: Vec<ExprWrapper>,
    pub span: Span,
}

impl Expr for TupleExpr {
    MK_EXPR_COMMON!();

    fn get_expr_type(&self) -> ExprType {
        ExprType::Tuple
    }
    fn children(&self) -> Vec<&ExprWrapper> {
        self.items.iter().collect()
    }
    fn children_mut(&mut self) -> Vec<&mut ExprWrapper> {
        self.items.iter_mut().collect()
    }
}

impl Display for TupleExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(tuple")?;
        for item in &self.items {
            write!(f, " {}", item)?;
        }
        write!(f, ")")
    }
}

/// Matrix Expression - `[a, b; c, d]`, rows split by `;`
#[derive(Debug, Clone)]
pub struct MatrixExpr {
    pub rows: Vec<Vec<ExprWrapper>>,
    pub span: Span,
}

impl Expr for MatrixExpr {
    MK_EXPR_COMMON!();

    fn get_expr_type(&self) -> ExprType {
        ExprType::Matrix
    }
    fn children(&self) -> Vec<&ExprWrapper> {
        self.rows.iter().flatten().collect()
    }
    fn children_mut(&mut self) -> Vec<&mut ExprWrapper> {
        self.rows.iter_mut().flatten().collect()
    }
}

impl Display for MatrixExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(matrix")?;
        for row in &self.rows {
            write!(f, " (row ")?;
            write_joined(f, row)?;
            write!(f, ")")?;
        }
        write!(f, ")")
    }
}

#[derive(Debug, Clone)]
pub struct MapExpr {
    pub entries: Vec<(ExprWrapper, ExprWrapper)>,
    pub span: Span,
}

impl Expr for MapExpr {
    MK_EXPR_COMMON!();

    fn get_expr_type(&self) -> ExprType {
        ExprType::Map
    }
    fn children(&self) -> Vec<&ExprWrapper> {
        self.entries
            .iter()
            .flat_map(|(key, value)| [key, value])
            .collect()
    }
    fn children_mut(&mut self) -> Vec<&mut ExprWrapper> {
        self.entries
            .iter_mut()
            .flat_map(|(key, value)| [key, value])
            .collect()
    }
}

impl Display for MapExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(map")?;
        for (key, value) in &self.entries {
            write!(f, " ({} {})", key, value)?;
        }
        write!(f, ")")
    }
}

/// A declared parameter or bound variable name.
#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub hinted: bool,
    pub span: Span,
}

impl Display for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.name, if self.hinted { "@" } else { "" })
    }
}

/// Renders `(x y; a b)`.
pub fn write_parameter_list(
    f: &mut std::fmt::Formatter<'_>,
    parameters: &[Parameter],
    bound_variables: &[Parameter],
) -> std::fmt::Result {
    write!(f, "(")?;
    write_joined(f, parameters)?;
    if !bound_variables.is_empty() {
        write!(f, "; ")?;
        write_joined(f, bound_variables)?;
    }
    write!(f, ")")
}

/// Lambda Expression - `x -> body`, `(x, y; a) -> body`
#[derive(Debug, Clone)]
pub struct LambdaExpr {
    pub parameters: Vec<Parameter>,
    pub bound_variables: Vec<Parameter>,
    pub body: ExprWrapper,
    /// Filled in by binding resolution
    pub scope: Option<FunctionScope>,
    pub span: Span,
}

impl Expr for LambdaExpr {
    MK_EXPR_COMMON!();

    fn get_expr_type(&self) -> ExprType {
        ExprType::Lambda
    }
    fn children(&self) -> Vec<&ExprWrapper> {
        vec![&self.body]
    }
    fn children_mut(&mut self) -> Vec<&mut ExprWrapper> {
        vec![&mut self.body]
    }
}

impl Display for LambdaExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(lambda ")?;
        write_parameter_list(f, &self.parameters, &self.bound_variables)?;
        write!(f, " {})", self.body)
    }
}

// UNRESOLVED

/// Parenthesized argument list following an expression, as written.
#[derive(Debug, Clone)]
pub struct ArgumentList {
    pub items: Vec<ExprWrapper>,
    pub trailing_comma: bool,
    pub span: Span,
}

impl ArgumentList {
    /// The value the list denotes when it turns out not to be a call:
    /// a lone item is just that item, anything else is a tuple.
    pub fn into_operand(mut self) -> ExprWrapper {
        if self.items.len() == 1 && !self.trailing_comma {
            if let Some(item) = self.items.pop() {
                return item;
            }
        }

        ExprWrapper::new(TupleExpr {
            items: self.items,
            span: self.span,
        })
    }
}

#[derive(Debug, Clone)]
pub enum AdjacentOperand {
    Operand(ExprWrapper),
    Arguments(ArgumentList),
}

/// Two juxtaposed expressions, either a call or an implicit multiplication.
///
/// Only exists between parsing and call resolution.
#[derive(Debug, Clone)]
pub struct AmbiguousExpr {
    pub left: ExprWrapper,
    pub right: AdjacentOperand,
    pub span: Span,
}

impl Expr for AmbiguousExpr {
    MK_EXPR_COMMON!();

    fn get_expr_type(&self) -> ExprType {
        ExprType::Ambiguous
    }
    fn children(&self) -> Vec<&ExprWrapper> {
        let mut children = vec![&self.left];
        match &self.right {
            AdjacentOperand::Operand(operand) => children.push(operand),
            AdjacentOperand::Arguments(arguments) => children.extend(arguments.items.iter()),
        }
        children
    }
    fn children_mut(&mut self) -> Vec<&mut ExprWrapper> {
        let mut children = vec![&mut self.left];
        match &mut self.right {
            AdjacentOperand::Operand(operand) => children.push(operand),
            AdjacentOperand::Arguments(arguments) => children.extend(arguments.items.iter_mut()),
        }
        children
    }
}

impl Display for AmbiguousExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.right {
            AdjacentOperand::Operand(operand) => write!(f, "(adj {} {})", self.left, operand),
            AdjacentOperand::Arguments(arguments) => {
                write!(f, "(adj {} (args", self.left)?;
                for item in &arguments.items {
                    write!(f, " {}", item)?;
                }
                write!(f, "))")
            }
        }
    }
}
