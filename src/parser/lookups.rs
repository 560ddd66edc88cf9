use std::collections::HashMap;

use crate::{
    ast::ast::{ExprWrapper, StmtWrapper},
    errors::errors::Error,
    lexer::tokens::TokenKind,
};

use super::{expr::*, parser::Parser, stmt::*};

/// Binding powers, lowest first.
#[derive(PartialEq, PartialOrd, Clone, Copy, Debug)]
pub enum BindingPower {
    Default,
    Assignment,
    Lambda,
    Comma,
    Relational,
    Additive,
    /// Explicit `*` `/` and juxtaposition share this level
    Multiplicative,
    Exponent,
    Call,
}

pub type StmtHandler = fn(&mut Parser) -> Result<StmtWrapper, Error>;
pub type NUDHandler = fn(&mut Parser) -> Result<ExprWrapper, Error>;
pub type LEDHandler = fn(&mut Parser, ExprWrapper, BindingPower) -> Result<ExprWrapper, Error>;

pub fn create_token_lookups(parser: &mut Parser) {
    parser.led(TokenKind::Assignment, BindingPower::Assignment, parse_assignment_expr);
    parser.led(TokenKind::ColonEquals, BindingPower::Assignment, parse_assignment_expr);

    parser.led(TokenKind::Arrow, BindingPower::Lambda, parse_lambda_expr);
    parser.led(TokenKind::Comma, BindingPower::Comma, parse_tuple_expr);

    // Relational
    parser.led(TokenKind::Less, BindingPower::Relational, parse_binary_expr);
    parser.led(TokenKind::LessEquals, BindingPower::Relational, parse_binary_expr);
    parser.led(TokenKind::Greater, BindingPower::Relational, parse_binary_expr);
    parser.led(TokenKind::GreaterEquals, BindingPower::Relational, parse_binary_expr);
    parser.led(TokenKind::Equals, BindingPower::Relational, parse_binary_expr);
    parser.led(TokenKind::NotEquals, BindingPower::Relational, parse_binary_expr);

    // Additive and multiplicative
    parser.led(TokenKind::Plus, BindingPower::Additive, parse_binary_expr);
    parser.led(TokenKind::Dash, BindingPower::Additive, parse_binary_expr);
    parser.led(TokenKind::Pipe, BindingPower::Additive, parse_binary_expr);
    parser.led(TokenKind::Tilde, BindingPower::Additive, parse_binary_expr);
    parser.led(TokenKind::Star, BindingPower::Multiplicative, parse_binary_expr);
    parser.led(TokenKind::Slash, BindingPower::Multiplicative, parse_binary_expr);
    parser.led(TokenKind::Backslash, BindingPower::Multiplicative, parse_binary_expr);
    parser.led(TokenKind::Percent, BindingPower::Multiplicative, parse_binary_expr);
    parser.led(TokenKind::ShiftLeft, BindingPower::Multiplicative, parse_binary_expr);
    parser.led(TokenKind::ShiftRight, BindingPower::Multiplicative, parse_binary_expr);
    parser.led(TokenKind::Ampersand, BindingPower::Multiplicative, parse_binary_expr);

    // Exponent
    parser.led(TokenKind::Caret, BindingPower::Exponent, parse_exponent_expr);
    parser.led(TokenKind::Bang, BindingPower::Exponent, parse_postfix_expr);

    // Call and index
    parser.led(TokenKind::OpenParen, BindingPower::Call, parse_call_expr);
    parser.led(TokenKind::OpenCurly, BindingPower::Call, parse_index_expr);

    // Juxtaposition: anything that starts a primary
    parser.led(TokenKind::Integer, BindingPower::Multiplicative, parse_juxtaposition_expr);
    parser.led(TokenKind::Float, BindingPower::Multiplicative, parse_juxtaposition_expr);
    parser.led(TokenKind::String, BindingPower::Multiplicative, parse_juxtaposition_expr);
    parser.led(TokenKind::Identifier, BindingPower::Multiplicative, parse_juxtaposition_expr);
    parser.led(TokenKind::OpenBracket, BindingPower::Multiplicative, parse_juxtaposition_expr);
    parser.led(TokenKind::Sqrt, BindingPower::Multiplicative, parse_juxtaposition_expr);

    // Literals and symbols
    parser.nud(TokenKind::Integer, parse_primary_expr);
    parser.nud(TokenKind::Float, parse_primary_expr);
    parser.nud(TokenKind::Identifier, parse_primary_expr);
    parser.nud(TokenKind::String, parse_primary_expr);
    parser.nud(TokenKind::Dash, parse_prefix_expr);
    parser.nud(TokenKind::Plus, parse_prefix_expr);
    parser.nud(TokenKind::Tilde, parse_prefix_expr);
    parser.nud(TokenKind::Sqrt, parse_prefix_expr);
    parser.nud(TokenKind::OpenParen, parse_grouping_expr);
    parser.nud(TokenKind::OpenBracket, parse_matrix_expr);
    parser.nud(TokenKind::OpenCurly, parse_map_expr);

    // Statements
    parser.stmt(TokenKind::If, parse_if_stmt);
    parser.stmt(TokenKind::For, parse_for_stmt);
    parser.stmt(TokenKind::Defer, parse_defer_stmt);
    parser.stmt(TokenKind::Return, parse_return_stmt);
    parser.stmt(TokenKind::Del, parse_del_stmt);
}

// Lookup tables inside parser struct, so it's easier
pub type StmtLookup = HashMap<TokenKind, StmtHandler>;
pub type NUDLookup = HashMap<TokenKind, NUDHandler>;
pub type LEDLookup = HashMap<TokenKind, LEDHandler>;
pub type BPLookup = HashMap<TokenKind, BindingPower>;
