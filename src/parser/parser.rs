//! Parser implementation for building the Abstract Syntax Tree.
//!
//! This module contains the main Parser struct and the `parse` entry point.
//! The parser uses a Pratt parser approach with NUD/LED handlers for
//! expression parsing and specialized functions for statement parsing.
//!
//! It maintains lookup tables for:
//! - Statement handlers
//! - NUD (null denotation) handlers for prefix expressions
//! - LED (left denotation) handlers for infix expressions
//! - Binding powers for operator precedence
//!
//! Errors are collected rather than returned at the first failure: after a
//! failed statement the parser skips to the next line and keeps going.

use std::{collections::HashMap, rc::Rc};

use crate::{
    ast::statements::BlockStmt,
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
    Position, Span, MK_TOKEN,
};

use super::{
    lookups::{
        create_token_lookups, BPLookup, BindingPower, LEDHandler, LEDLookup, NUDHandler, NUDLookup,
        StmtHandler, StmtLookup,
    },
    stmt::parse_statement_list,
};

/// The main parser structure that maintains parsing state.
pub struct Parser {
    /// The list of tokens to parse, always ending in EOF
    tokens: Vec<Token>,
    /// Current position in the token stream
    pos: usize,
    /// Lookup table for statement parsing handlers
    stmt_lookup: StmtLookup,
    /// Lookup table for null denotation (prefix) expression handlers
    nud_lookup: NUDLookup,
    /// Lookup table for left denotation (infix) expression handlers
    led_lookup: LEDLookup,
    /// Lookup table for expression binding powers (precedence)
    binding_power_lookup: BPLookup,
    /// Errors recorded while recovering
    errors: Vec<Error>,
    /// Counter for generating unique block IDs
    current_id: i32,
}

impl Parser {
    /// Creates a new Parser instance.
    ///
    /// # Arguments
    ///
    /// * `tokens` - Vector of tokens to parse
    /// * `file` - Reference-counted string containing the source file name
    pub fn new(mut tokens: Vec<Token>, file: Rc<String>) -> Self {
        if tokens.last().map(|token| token.kind) != Some(TokenKind::EOF) {
            let end = tokens
                .last()
                .map(|token| token.span.end.clone())
                .unwrap_or_else(|| Position::new(0, 1, 1, Rc::clone(&file)));
            tokens.push(MK_TOKEN!(
                TokenKind::EOF,
                String::new(),
                Span::new(end.clone(), end)
            ));
        }

        Parser {
            tokens,
            pos: 0,
            stmt_lookup: HashMap::new(),
            nud_lookup: HashMap::new(),
            led_lookup: HashMap::new(),
            binding_power_lookup: HashMap::new(),
            errors: vec![],
            current_id: 1,
        }
    }

    fn token_at(&self, index: usize) -> &Token {
        &self.tokens[index.min(self.tokens.len() - 1)]
    }

    /// Returns the current token without advancing.
    pub fn current_token(&self) -> &Token {
        self.token_at(self.pos)
    }

    /// Returns the kind of the current token.
    pub fn current_token_kind(&self) -> TokenKind {
        self.current_token().kind
    }

    /// Kind of the token `offset` places ahead of the current one.
    pub fn peek_kind(&self, offset: usize) -> TokenKind {
        self.token_at(self.pos + offset).kind
    }

    /// Kind of the most recently consumed token.
    pub fn previous_token_kind(&self) -> Option<TokenKind> {
        self.pos.checked_sub(1).map(|index| self.token_at(index).kind)
    }

    /// Advances to the next token and returns the previous token.
    ///
    /// The cursor never moves past the final EOF.
    pub fn advance(&mut self) -> &Token {
        let index = self.pos;
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        self.token_at(index)
    }

    /// Expects a token of the specified kind, with optional custom error.
    pub fn expect_error(
        &mut self,
        expected_kind: TokenKind,
        error: Option<Error>,
    ) -> Result<Token, Error> {
        if self.current_token_kind() != expected_kind {
            match error {
                Some(error) => Err(error),
                None => Err(self.unexpected_token()),
            }
        } else {
            Ok(self.advance().clone())
        }
    }

    /// Expects a token of the specified kind with default error message.
    pub fn expect(&mut self, expected_kind: TokenKind) -> Result<Token, Error> {
        self.expect_error(expected_kind, None)
    }

    /// Error describing the current token as unexpected.
    pub fn unexpected_token(&self) -> Error {
        let token = self.current_token();
        let text = if token.kind.is_synthetic() {
            token.kind.to_string()
        } else {
            token.value.clone()
        };

        Error::new(ErrorImpl::UnexpectedToken { token: text }, token.span.clone())
    }

    /// Like `unexpected_token`, with a note on what was expected.
    pub fn unexpected_token_detailed(&self, message: &str) -> Error {
        let token = self.current_token();
        let text = if token.kind.is_synthetic() {
            token.kind.to_string()
        } else {
            token.value.clone()
        };

        Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: text,
                message: String::from(message),
            },
            token.span.clone(),
        )
    }

    /// Checks if there are more tokens to parse.
    pub fn has_tokens(&self) -> bool {
        self.current_token_kind() != TokenKind::EOF
    }

    /// Returns a reference to the statement lookup table.
    pub fn get_stmt_lookup(&self) -> &StmtLookup {
        &self.stmt_lookup
    }

    /// Returns a reference to the NUD (null denotation) lookup table.
    pub fn get_nud_lookup(&self) -> &NUDLookup {
        &self.nud_lookup
    }

    /// Returns a reference to the LED (left denotation) lookup table.
    pub fn get_led_lookup(&self) -> &LEDLookup {
        &self.led_lookup
    }

    /// Binding power of the current token as an infix operator.
    pub fn current_binding_power(&self) -> BindingPower {
        *self
            .binding_power_lookup
            .get(&self.current_token_kind())
            .unwrap_or(&BindingPower::Default)
    }

    /// Registers a left denotation (infix) handler for a token.
    ///
    /// # Arguments
    ///
    /// * `kind` - The token kind to register
    /// * `binding_power` - The precedence/binding power for this operator
    /// * `led_fn` - The handler function for this infix operator
    pub fn led(&mut self, kind: TokenKind, binding_power: BindingPower, led_fn: LEDHandler) {
        self.binding_power_lookup.insert(kind, binding_power);
        self.led_lookup.insert(kind, led_fn);
    }

    /// Registers a null denotation (prefix) handler for a token.
    ///
    /// Leaves the binding power alone: most prefix tokens are also infix.
    pub fn nud(&mut self, kind: TokenKind, nud_fn: NUDHandler) {
        self.nud_lookup.insert(kind, nud_fn);
    }

    /// Registers a statement handler for a token.
    pub fn stmt(&mut self, kind: TokenKind, stmt_fn: StmtHandler) {
        self.binding_power_lookup.insert(kind, BindingPower::Default);
        self.stmt_lookup.insert(kind, stmt_fn);
    }

    /// Advances the internal ID counter and returns the previous value.
    pub fn advance_id(&mut self) -> i32 {
        let id = self.current_id;
        self.current_id += 1;
        id
    }

    /// Returns the start of the current token.
    pub fn get_position(&self) -> Position {
        self.current_token().span.start.clone()
    }

    /// Returns the end of the most recently consumed token.
    pub fn get_previous_end(&self) -> Position {
        match self.pos.checked_sub(1) {
            Some(index) => self.token_at(index).span.end.clone(),
            None => self.get_position(),
        }
    }

    /// Span from `start` to the end of the most recently consumed token.
    pub fn span_from(&self, start: Position) -> Span {
        Span::new(start, self.get_previous_end())
    }

    pub fn push_error(&mut self, error: Error) {
        self.errors.push(error);
    }

    /// Skips the rest of a failed statement.
    ///
    /// Stops after the next line break, also skipping an indented block that
    /// follows it. Never consumes the Dedent closing the enclosing block.
    pub fn synchronize(&mut self) {
        let mut depth = 0usize;

        loop {
            match self.current_token_kind() {
                TokenKind::EOF => break,
                TokenKind::Dedent if depth == 0 => break,
                TokenKind::Dedent => {
                    depth -= 1;
                    self.advance();
                    if depth == 0 && self.current_token_kind() != TokenKind::Indent {
                        break;
                    }
                }
                TokenKind::Indent => {
                    depth += 1;
                    self.advance();
                }
                TokenKind::Newline => {
                    self.advance();
                    if depth == 0 && self.current_token_kind() != TokenKind::Indent {
                        break;
                    }
                }
                _ => {
                    self.advance();
                }
            }
        }
    }
}

/// Parses a stream of tokens into an Abstract Syntax Tree.
///
/// This is the main entry point for parsing. It creates a parser instance,
/// initializes all lookup tables, and parses all statements until EOF.
///
/// # Returns
///
/// A tuple containing:
/// - The Parser instance (with state after parsing)
/// - The root BlockStmt, or every error recorded while parsing
pub fn parse(tokens: Vec<Token>, file: Rc<String>) -> (Parser, Result<BlockStmt, Vec<Error>>) {
    let mut parser = Parser::new(tokens, file);
    create_token_lookups(&mut parser);

    let start = parser.get_position();
    let mut body = vec![];

    while parser.has_tokens() {
        body.extend(parse_statement_list(&mut parser));

        // Only an unmatched Dedent stops the list before EOF
        if parser.current_token_kind() == TokenKind::Dedent {
            let error = Error::new(
                ErrorImpl::MismatchedBlock {
                    message: String::from("dedent without a matching block"),
                },
                parser.current_token().span.clone(),
            );
            parser.push_error(error);
            parser.advance();
        }
    }

    if !parser.errors.is_empty() {
        let errors = parser.errors.clone();
        return (parser, Err(errors));
    }

    let block = BlockStmt {
        body,
        id: 0,
        span: Span::new(start, parser.get_position()),
    };

    (parser, Ok(block))
}
