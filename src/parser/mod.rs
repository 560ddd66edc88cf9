//! Parser module for building an Abstract Syntax Tree (AST).
//!
//! This module contains the parser that transforms a stream of tokens
//! into an Abstract Syntax Tree. It uses a Pratt parser for expressions
//! with proper operator precedence and handles:
//!
//! - Statement parsing (function declarations, control flow, `defer`, `del`)
//! - Expression parsing (binary ops, juxtaposition, literals, lambdas)
//! - Indentation-delimited blocks
//! - Error recovery and reporting
//!
//! Juxtaposed expressions are left as `AmbiguousExpr` nodes; whether they
//! are calls is decided by the call resolver.

pub mod expr;
pub mod lookups;
pub mod parser;
pub mod stmt;

#[cfg(test)]
mod tests;
