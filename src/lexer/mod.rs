//! Lexical analysis module for the front-end.
//!
//! This module contains the lexer that converts source text into a stream
//! of tokens for parsing. It handles:
//!
//! - Tokenization using an ordered table of anchored regex patterns
//! - Number literals with base prefixes, `_` separators and imaginary suffixes
//! - Layout: Newline, Indent and Dedent tokens derived from indentation
//! - Token position tracking for error reporting

pub mod lexer;
pub mod tokens;

#[cfg(test)]
mod tests;
