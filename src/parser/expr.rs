use crate::{
    ast::{
        ast::{ExprType, ExprWrapper},
        expressions::{
            AdjacentOperand, AmbiguousExpr, ArgumentList, AssignmentExpr, BinaryExpr, IndexExpr,
            LambdaExpr, MapExpr, MatrixExpr, NumberExpr, Parameter, PostfixExpr, PrefixExpr,
            StringExpr, SymbolExpr, TupleExpr,
        },
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Literal, TokenKind},
};

use super::{lookups::BindingPower, parser::Parser};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<ExprWrapper, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let Some(nud) = parser.get_nud_lookup().get(&token_kind).copied() else {
        return Err(parser.unexpected_token());
    };

    let mut left = nud(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs
    while parser.current_binding_power() > bp {
        let token_kind = parser.current_token_kind();
        let Some(led) = parser.get_led_lookup().get(&token_kind).copied() else {
            return Err(parser.unexpected_token());
        };

        let operator_bp = parser.current_binding_power();
        left = led(parser, left, operator_bp)?;
    }

    Ok(left)
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<ExprWrapper, Error> {
    match parser.current_token_kind() {
        TokenKind::Integer | TokenKind::Float => {
            let token = parser.advance().clone();
            match token.literal {
                Some(literal @ (Literal::Integer { .. } | Literal::Float { .. })) => {
                    Ok(ExprWrapper::new(NumberExpr {
                        literal,
                        lexeme: token.value,
                        span: token.span,
                    }))
                }
                _ => Err(Error::new(
                    ErrorImpl::MalformedLiteral {
                        literal: token.value,
                    },
                    token.span,
                )),
            }
        }
        TokenKind::Identifier => {
            let token = parser.advance().clone();
            let mut span = token.span;
            let hinted = parser.current_token_kind() == TokenKind::At;
            if hinted {
                span = span.to(&parser.advance().span);
            }

            Ok(ExprWrapper::new(SymbolExpr::new(token.value, hinted, span)))
        }
        TokenKind::String => {
            let token = parser.advance().clone();
            match token.literal {
                Some(Literal::Str(value)) => Ok(ExprWrapper::new(StringExpr {
                    value,
                    span: token.span,
                })),
                _ => Err(Error::new(
                    ErrorImpl::MalformedLiteral {
                        literal: token.value,
                    },
                    token.span,
                )),
            }
        }
        _ => Err(parser.unexpected_token()),
    }
}

pub fn parse_binary_expr(
    parser: &mut Parser,
    left: ExprWrapper,
    bp: BindingPower,
) -> Result<ExprWrapper, Error> {
    let operator_token = parser.advance().clone();

    let right = parse_expr(parser, bp)?;

    Ok(ExprWrapper::new(BinaryExpr {
        span: left.get_span().to(right.get_span()),
        left,
        operator: operator_token,
        right,
        implicit: false,
    }))
}

/// `^` is right-associative, so its right side is parsed one level lower.
pub fn parse_exponent_expr(
    parser: &mut Parser,
    left: ExprWrapper,
    _bp: BindingPower,
) -> Result<ExprWrapper, Error> {
    let operator_token = parser.advance().clone();

    let right = parse_expr(parser, BindingPower::Multiplicative)?;

    Ok(ExprWrapper::new(BinaryExpr {
        span: left.get_span().to(right.get_span()),
        left,
        operator: operator_token,
        right,
        implicit: false,
    }))
}

pub fn parse_prefix_expr(parser: &mut Parser) -> Result<ExprWrapper, Error> {
    let operator_token = parser.advance().clone();
    let rhs = parse_expr(parser, BindingPower::Multiplicative)?;

    Ok(ExprWrapper::new(PrefixExpr {
        span: operator_token.span.to(rhs.get_span()),
        operator: operator_token,
        right_expr: rhs,
    }))
}

pub fn parse_postfix_expr(
    parser: &mut Parser,
    left: ExprWrapper,
    _bp: BindingPower,
) -> Result<ExprWrapper, Error> {
    let operator_token = parser.advance().clone();

    Ok(ExprWrapper::new(PostfixExpr {
        span: left.get_span().to(&operator_token.span),
        operator: operator_token,
        left_expr: left,
    }))
}

fn check_assignment_target(target: &ExprWrapper, local: bool) -> Result<(), Error> {
    let valid = match target.get_expr_type() {
        ExprType::Symbol => true,
        ExprType::Tuple => target
            .children()
            .iter()
            .all(|item| item.get_expr_type() == ExprType::Symbol),
        ExprType::Index => !local,
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: target.to_string(),
                message: String::from("only names, tuples of names and indexes can be assigned"),
            },
            target.get_span().clone(),
        ))
    }
}

/// `=` and `:=`, both right-associative.
pub fn parse_assignment_expr(
    parser: &mut Parser,
    left: ExprWrapper,
    _bp: BindingPower,
) -> Result<ExprWrapper, Error> {
    let local = parser.current_token_kind() == TokenKind::ColonEquals;
    check_assignment_target(&left, local)?;

    let operator_token = parser.advance().clone();
    let rhs = parse_expr(parser, BindingPower::Default)?;

    Ok(ExprWrapper::new(AssignmentExpr {
        span: left.get_span().to(rhs.get_span()),
        operator: operator_token,
        value: rhs,
        assignee: left,
    }))
}

/// `a, b, c` with an optional trailing comma.
pub fn parse_tuple_expr(
    parser: &mut Parser,
    left: ExprWrapper,
    bp: BindingPower,
) -> Result<ExprWrapper, Error> {
    let start = left.get_span().start.clone();
    let mut items = vec![left];

    while parser.current_token_kind() == TokenKind::Comma {
        parser.advance();

        if !parser
            .get_nud_lookup()
            .contains_key(&parser.current_token_kind())
        {
            break;
        }

        items.push(parse_expr(parser, bp)?);
    }

    Ok(ExprWrapper::new(TupleExpr {
        items,
        span: parser.span_from(start),
    }))
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<ExprWrapper, Error> {
    let start = parser.advance().span.start.clone();

    // `()` is always the empty tuple
    if parser.current_token_kind() == TokenKind::CloseParen {
        parser.advance();
        return Ok(ExprWrapper::new(TupleExpr {
            items: vec![],
            span: parser.span_from(start),
        }));
    }

    let expr = parse_expr(parser, BindingPower::Default)?;

    if parser.current_token_kind() == TokenKind::Semicolon {
        parser.advance();
        let bound_variables = parse_parameter_names(parser)?;
        parser.expect(TokenKind::CloseParen)?;

        if parser.current_token_kind() != TokenKind::Arrow {
            return Err(parser.unexpected_token_detailed(
                "bound variables are only allowed in a lambda or function parameter list",
            ));
        }

        let parameters = lambda_parameters(&expr)?;
        parser.advance();
        let body = parse_expr(parser, BindingPower::Assignment)?;

        return Ok(ExprWrapper::new(LambdaExpr {
            parameters,
            bound_variables,
            body,
            scope: None,
            span: parser.span_from(start),
        }));
    }

    parser.expect(TokenKind::CloseParen)?;

    Ok(expr)
}

/// Comma-separated names, each optionally `@`-hinted, up to a closing `)`.
pub fn parse_parameter_names(parser: &mut Parser) -> Result<Vec<Parameter>, Error> {
    let mut names = vec![];

    while parser.current_token_kind() == TokenKind::Identifier {
        let token = parser.advance().clone();
        let mut span = token.span;
        let hinted = parser.current_token_kind() == TokenKind::At;
        if hinted {
            span = span.to(&parser.advance().span);
        }

        names.push(Parameter {
            name: token.value,
            hinted,
            span,
        });

        if parser.current_token_kind() != TokenKind::Comma {
            break;
        }
        parser.advance();
    }

    match parser.current_token_kind() {
        TokenKind::CloseParen | TokenKind::Semicolon => Ok(names),
        _ => Err(parser.unexpected_token_detailed("expected a parameter name")),
    }
}

fn lambda_parameters(expr: &ExprWrapper) -> Result<Vec<Parameter>, Error> {
    let as_parameter = |item: &ExprWrapper| -> Result<Parameter, Error> {
        let symbol = item.node_ref::<SymbolExpr>().map_err(|_| {
            Error::new(
                ErrorImpl::UnexpectedTokenDetailed {
                    token: item.to_string(),
                    message: String::from("lambda parameters must be plain names"),
                },
                item.get_span().clone(),
            )
        })?;

        Ok(Parameter {
            name: symbol.value.clone(),
            hinted: symbol.hinted,
            span: symbol.span.clone(),
        })
    };

    match expr.get_expr_type() {
        ExprType::Tuple => expr.children().into_iter().map(as_parameter).collect(),
        _ => Ok(vec![as_parameter(expr)?]),
    }
}

/// `params -> body`
pub fn parse_lambda_expr(
    parser: &mut Parser,
    left: ExprWrapper,
    _bp: BindingPower,
) -> Result<ExprWrapper, Error> {
    let parameters = lambda_parameters(&left)?;
    parser.advance();

    let body = parse_expr(parser, BindingPower::Assignment)?;

    Ok(ExprWrapper::new(LambdaExpr {
        span: left.get_span().to(body.get_span()),
        parameters,
        bound_variables: vec![],
        body,
        scope: None,
    }))
}

/// `left(args)`: a call or a multiplication, decided after parsing.
pub fn parse_call_expr(
    parser: &mut Parser,
    left: ExprWrapper,
    _bp: BindingPower,
) -> Result<ExprWrapper, Error> {
    let open = parser.advance().span.clone();

    let mut items = vec![];
    let mut trailing_comma = false;

    while parser.current_token_kind() != TokenKind::CloseParen {
        if parser.current_token_kind() == TokenKind::Semicolon {
            return Err(
                parser.unexpected_token_detailed("`;` is only allowed in a parameter list")
            );
        }

        items.push(parse_expr(parser, BindingPower::Comma)?);
        trailing_comma = false;

        match parser.current_token_kind() {
            TokenKind::Comma => {
                parser.advance();
                trailing_comma = true;
            }
            TokenKind::CloseParen => {}
            _ => return Err(parser.unexpected_token()),
        }
    }

    let close = parser.expect(TokenKind::CloseParen)?;
    let arguments = ArgumentList {
        items,
        trailing_comma,
        span: open.to(&close.span),
    };

    Ok(ExprWrapper::new(AmbiguousExpr {
        span: left.get_span().to(&close.span),
        left,
        right: AdjacentOperand::Arguments(arguments),
    }))
}

/// Two primaries side by side, e.g. `2x` or `a b`.
pub fn parse_juxtaposition_expr(
    parser: &mut Parser,
    left: ExprWrapper,
    _bp: BindingPower,
) -> Result<ExprWrapper, Error> {
    let right = parse_expr(parser, BindingPower::Multiplicative)?;

    Ok(ExprWrapper::new(AmbiguousExpr {
        span: left.get_span().to(right.get_span()),
        left,
        right: AdjacentOperand::Operand(right),
    }))
}

/// Comma-separated expressions up to `close`.
fn parse_delimited_items(
    parser: &mut Parser,
    close: TokenKind,
) -> Result<Vec<ExprWrapper>, Error> {
    let mut items = vec![];

    while parser.current_token_kind() != close {
        items.push(parse_expr(parser, BindingPower::Comma)?);

        if parser.current_token_kind() != TokenKind::Comma {
            break;
        }
        parser.advance();
    }

    parser.expect(close)?;
    Ok(items)
}

/// `target{i, j}`
pub fn parse_index_expr(
    parser: &mut Parser,
    left: ExprWrapper,
    _bp: BindingPower,
) -> Result<ExprWrapper, Error> {
    let start = left.get_span().start.clone();
    parser.advance();

    let indices = parse_delimited_items(parser, TokenKind::CloseCurly)?;

    Ok(ExprWrapper::new(IndexExpr {
        target: left,
        indices,
        span: parser.span_from(start),
    }))
}

/// `[a, b; c, d]`
pub fn parse_matrix_expr(parser: &mut Parser) -> Result<ExprWrapper, Error> {
    let start = parser.advance().span.start.clone();

    let mut rows = vec![];
    let mut row = vec![];

    while parser.current_token_kind() != TokenKind::CloseBracket {
        row.push(parse_expr(parser, BindingPower::Comma)?);

        match parser.current_token_kind() {
            TokenKind::Comma => {
                parser.advance();
            }
            TokenKind::Semicolon => {
                parser.advance();
                rows.push(std::mem::take(&mut row));
            }
            TokenKind::CloseBracket => {}
            _ => return Err(parser.unexpected_token()),
        }
    }

    if !row.is_empty() {
        rows.push(row);
    }

    parser.expect(TokenKind::CloseBracket)?;

    Ok(ExprWrapper::new(MatrixExpr {
        rows,
        span: parser.span_from(start),
    }))
}

/// `{key: value, ...}`
pub fn parse_map_expr(parser: &mut Parser) -> Result<ExprWrapper, Error> {
    let start = parser.advance().span.start.clone();

    let mut entries = vec![];

    while parser.current_token_kind() != TokenKind::CloseCurly {
        let key = parse_expr(parser, BindingPower::Comma)?;
        parser.expect(TokenKind::Colon)?;
        let value = parse_expr(parser, BindingPower::Comma)?;
        entries.push((key, value));

        if parser.current_token_kind() != TokenKind::Comma {
            break;
        }
        parser.advance();
    }

    parser.expect(TokenKind::CloseCurly)?;

    Ok(ExprWrapper::new(MapExpr {
        entries,
        span: parser.span_from(start),
    }))
}

