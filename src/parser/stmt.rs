use crate::{
    ast::{
        ast::{ExprWrapper, StmtWrapper},
        expressions::{Parameter, SymbolExpr},
        statements::{
            BlockStmt, DeferStmt, DelStmt, ExpressionStmt, FnDeclStmt, ForStmt, IfStmt,
            ReturnStmt,
        },
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    parser::{
        expr::{parse_expr, parse_parameter_names},
        lookups::BindingPower,
    },
    Position,
};

use super::parser::Parser;

pub fn parse_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let handler = parser
        .get_stmt_lookup()
        .get(&parser.current_token_kind())
        .copied();

    let stmt = if let Some(handler) = handler {
        handler(parser)?
    } else if is_fn_decl_ahead(parser) {
        parse_fn_decl_stmt(parser)?
    } else {
        let expr = parse_expr(parser, BindingPower::Default)?;
        StmtWrapper::new(ExpressionStmt {
            span: expr.get_span().clone(),
            expression: expr,
        })
    };

    expect_terminator(parser)?;
    Ok(stmt)
}

/// A statement ends at `;`, a line break, a block end or the end of input.
/// Statements that end with their own indented block need nothing more.
fn expect_terminator(parser: &mut Parser) -> Result<(), Error> {
    if matches!(
        parser.previous_token_kind(),
        Some(TokenKind::Newline) | Some(TokenKind::Dedent)
    ) {
        return Ok(());
    }

    match parser.current_token_kind() {
        TokenKind::Semicolon => {
            parser.advance();
            // The last `;` on a line is optional
            if parser.current_token_kind() == TokenKind::Newline {
                parser.advance();
            }
            Ok(())
        }
        TokenKind::Newline => {
            parser.advance();
            Ok(())
        }
        TokenKind::EOF | TokenKind::Dedent => Ok(()),
        _ => Err(parser.unexpected_token()),
    }
}

fn at_statement_end(parser: &Parser) -> bool {
    matches!(
        parser.current_token_kind(),
        TokenKind::Newline | TokenKind::Semicolon | TokenKind::Dedent | TokenKind::EOF
    )
}

/// Parses statements up to a Dedent or EOF, recording errors and
/// resynchronizing after each failed statement.
pub fn parse_statement_list(parser: &mut Parser) -> Vec<StmtWrapper> {
    let mut body = vec![];

    while !matches!(
        parser.current_token_kind(),
        TokenKind::Dedent | TokenKind::EOF
    ) {
        match parse_stmt(parser) {
            Ok(stmt) => body.push(stmt),
            Err(error) => {
                parser.push_error(error);
                parser.synchronize();
            }
        }
    }

    body
}

fn mismatched_block(parser: &Parser, message: &str) -> Error {
    Error::new(
        ErrorImpl::MismatchedBlock {
            message: String::from(message),
        },
        parser.current_token().span.clone(),
    )
}

/// Newline, Indent, statements, Dedent. The leading Newline is already consumed.
fn parse_indented_block(parser: &mut Parser, start: Position) -> Result<BlockStmt, Error> {
    if parser.current_token_kind() != TokenKind::Indent {
        return Err(mismatched_block(parser, "expected an indented block"));
    }
    parser.advance();

    let body = parse_statement_list(parser);

    let error = mismatched_block(parser, "expected the indented block to end");
    parser.expect_error(TokenKind::Dedent, Some(error))?;

    Ok(BlockStmt {
        body,
        id: parser.advance_id(),
        span: parser.span_from(start),
    })
}

/// `: body`, where the body is an indented block or the rest of the line.
pub fn parse_block(parser: &mut Parser) -> Result<BlockStmt, Error> {
    let start = parser.get_position();

    let error = mismatched_block(parser, "expected `:` before a block");
    parser.expect_error(TokenKind::Colon, Some(error))?;

    if parser.current_token_kind() == TokenKind::Newline {
        parser.advance();
        return parse_indented_block(parser, start);
    }

    let mut body = vec![];
    loop {
        body.push(parse_stmt(parser)?);

        if parser.previous_token_kind() == Some(TokenKind::Newline)
            || matches!(
                parser.current_token_kind(),
                TokenKind::EOF | TokenKind::Dedent
            )
        {
            break;
        }
    }

    Ok(BlockStmt {
        body,
        id: parser.advance_id(),
        span: parser.span_from(start),
    })
}

/// Looks past a balanced `(...)` for `=` or `:=`: `name(...) = body`.
fn is_fn_decl_ahead(parser: &Parser) -> bool {
    if parser.current_token_kind() != TokenKind::Identifier {
        return false;
    }

    let mut offset = 1;
    if parser.peek_kind(offset) == TokenKind::At {
        offset += 1;
    }
    if parser.peek_kind(offset) != TokenKind::OpenParen {
        return false;
    }

    let mut depth = 0;
    loop {
        let kind = parser.peek_kind(offset);
        if kind.is_opening_bracket() {
            depth += 1;
        } else if kind.is_closing_bracket() {
            depth -= 1;
            if depth == 0 {
                break;
            }
        } else if matches!(kind, TokenKind::EOF | TokenKind::Newline) {
            return false;
        }
        offset += 1;
    }

    matches!(
        parser.peek_kind(offset + 1),
        TokenKind::Assignment | TokenKind::ColonEquals
    )
}

fn parse_parameter_list(parser: &mut Parser) -> Result<(Vec<Parameter>, Vec<Parameter>), Error> {
    parser.expect(TokenKind::OpenParen)?;

    let parameters = parse_parameter_names(parser)?;
    let bound_variables = if parser.current_token_kind() == TokenKind::Semicolon {
        parser.advance();
        parse_parameter_names(parser)?
    } else {
        vec![]
    };

    parser.expect(TokenKind::CloseParen)?;
    Ok((parameters, bound_variables))
}

pub fn parse_fn_decl_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let name_token = parser.expect(TokenKind::Identifier)?;
    let start = name_token.span.start.clone();

    let hinted = parser.current_token_kind() == TokenKind::At;
    if hinted {
        parser.advance();
    }

    let (parameters, bound_variables) = parse_parameter_list(parser)?;
    let is_local = parser.advance().kind == TokenKind::ColonEquals;

    let body = if parser.current_token_kind() == TokenKind::Newline {
        let body_start = parser.get_position();
        parser.advance();
        parse_indented_block(parser, body_start)?
    } else {
        let expr = parse_expr(parser, BindingPower::Default)?;
        let span = expr.get_span().clone();
        BlockStmt {
            body: vec![StmtWrapper::new(ExpressionStmt {
                expression: expr,
                span: span.clone(),
            })],
            id: parser.advance_id(),
            span,
        }
    };

    Ok(StmtWrapper::new(FnDeclStmt {
        identifier: name_token.value,
        hinted,
        is_local,
        parameters,
        bound_variables,
        body,
        scope: None,
        span: parser.span_from(start),
    }))
}

/// `if c: ...`, also used for each `elif` link of a chain.
pub fn parse_if_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let start = parser.advance().span.start.clone();

    let condition = parse_expr(parser, BindingPower::Default)?;
    let then_body = parse_block(parser)?;

    let else_body = match parser.current_token_kind() {
        TokenKind::Elif => {
            let nested = parse_if_stmt(parser)?;
            let span = nested.get_span().clone();
            Some(BlockStmt {
                body: vec![nested],
                id: parser.advance_id(),
                span,
            })
        }
        TokenKind::Else => {
            parser.advance();
            Some(parse_block(parser)?)
        }
        _ => None,
    };

    Ok(StmtWrapper::new(IfStmt {
        condition,
        then_body,
        else_body,
        span: parser.span_from(start),
    }))
}

fn parse_name(parser: &mut Parser, message: &str) -> Result<ExprWrapper, Error> {
    let error = parser.unexpected_token_detailed(message);
    let token = parser.expect_error(TokenKind::Identifier, Some(error))?;

    Ok(ExprWrapper::new(SymbolExpr::new(token.value, false, token.span)))
}

/// `for x in iterable: body`
pub fn parse_for_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let start = parser.advance().span.start.clone();

    let variable = parse_name(parser, "expected a loop variable")?;
    parser.expect(TokenKind::In)?;
    let iterable = parse_expr(parser, BindingPower::Default)?;
    let body = parse_block(parser)?;

    Ok(StmtWrapper::new(ForStmt {
        variable,
        iterable,
        body,
        span: parser.span_from(start),
    }))
}

/// `defer [name [:= init]]: body`
pub fn parse_defer_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let start = parser.advance().span.start.clone();

    let mut binding = None;
    let mut initializer = None;

    if parser.current_token_kind() == TokenKind::Identifier {
        binding = Some(parse_name(parser, "expected a name to bind")?);

        if parser.current_token_kind() == TokenKind::ColonEquals {
            parser.advance();
            initializer = Some(parse_expr(parser, BindingPower::Default)?);
        }
    }

    let body = parse_block(parser)?;

    Ok(StmtWrapper::new(DeferStmt {
        binding,
        initializer,
        body,
        span: parser.span_from(start),
    }))
}

pub fn parse_return_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let start = parser.advance().span.start.clone();

    let value = if at_statement_end(parser) {
        None
    } else {
        Some(parse_expr(parser, BindingPower::Default)?)
    };

    Ok(StmtWrapper::new(ReturnStmt {
        value,
        span: parser.span_from(start),
    }))
}

pub fn parse_del_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let start = parser.advance().span.start.clone();

    let target = parse_name(parser, "expected a name to delete")?;

    Ok(StmtWrapper::new(DelStmt {
        target,
        span: parser.span_from(start),
    }))
}
