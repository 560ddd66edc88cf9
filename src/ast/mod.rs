/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - ast: Core traits, node wrappers and the ExprType / StmtType tags
/// - expressions: Expression nodes, including the transient ambiguous adjacency
/// - statements: Statement nodes and blocks
pub mod ast;
pub mod expressions;
pub mod statements;
