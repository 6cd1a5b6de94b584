use crate::{
    ast::{
        ast::{Expr, ExprBase, ExprWrapper},
        expressions::{
            AttributeExpr, AwaitExpr, BinaryExpr, CallExpr, Comprehension, ComprehensionExpr,
            ComprehensionKind, Constant, ConstantExpr, DictExpr, IfExpr, KeywordExpr, LambdaExpr,
            ListExpr, NameExpr, NamedExpr, SetExpr, SliceExpr, StarredExpr, SubscriptExpr,
            TupleExpr, UnaryExpr, YieldExpr,
        },
        statements::{Parameter, ParameterKind},
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    Position, Span,
};

use super::{lookups::BindingPower, parser::Parser};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<ExprWrapper, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let nud = match parser.get_nud_lookup().get(&token_kind) {
        Some(nud) => *nud,
        None => return Err(parser.unexpected()),
    };

    let mut left = nud(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs
    while *parser
        .get_bp_lookup()
        .get(&parser.current_token_kind())
        .unwrap_or(&BindingPower::Default)
        > bp
    {
        let token_kind = parser.current_token_kind();
        let next_bp = *parser
            .get_bp_lookup()
            .get(&token_kind)
            .unwrap_or(&BindingPower::Default);
        let led = match parser.get_led_lookup().get(&token_kind) {
            Some(led) => *led,
            None => return Err(parser.unexpected()),
        };

        left = led(parser, left, next_bp)?;
    }

    Ok(left)
}

/// Parses `a, b, c`; a single element without a comma is returned as is.
pub fn parse_expr_list(parser: &mut Parser, bp: BindingPower) -> Result<ExprWrapper, Error> {
    let first = parse_expr(parser, bp)?;
    if parser.current_token_kind() != TokenKind::Comma {
        return Ok(first);
    }

    let start = first.get_span().start.clone();
    let mut elements = vec![first];
    while parser.current_token_kind() == TokenKind::Comma {
        parser.advance();
        if !parser.can_start_expr() {
            break;
        }
        elements.push(parse_expr(parser, bp)?);
    }

    Ok(ExprWrapper::new(TupleExpr {
        elements,
        span: Span::new(start, parser.last_end()),
    }))
}

fn span_from(parser: &Parser, start: Position) -> Span {
    Span::new(start, parser.last_end())
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<ExprWrapper, Error> {
    let token = parser.advance().clone();
    let constant = match token.kind {
        TokenKind::Identifier => {
            return Ok(ExprWrapper::new(NameExpr {
                id: token.value,
                span: token.span,
            }))
        }
        TokenKind::Number => Constant::Number(token.value),
        TokenKind::None => Constant::None,
        TokenKind::True => Constant::True,
        TokenKind::False => Constant::False,
        TokenKind::Ellipsis => Constant::Ellipsis,
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken { token: token.value },
                token.span.start,
            ))
        }
    };

    Ok(ExprWrapper::new(ConstantExpr {
        value: constant,
        span: token.span,
    }))
}

/// Adjacent string literals concatenate into one constant.
pub fn parse_string_expr(parser: &mut Parser) -> Result<ExprWrapper, Error> {
    let first = parser.advance().clone();
    let mut kind = first.kind;
    let mut value = first.value;

    while matches!(
        parser.current_token_kind(),
        TokenKind::String | TokenKind::FString | TokenKind::Bytes
    ) {
        let token = parser.advance().clone();
        if token.kind == TokenKind::FString {
            kind = TokenKind::FString;
        }
        value.push_str(&token.value);
    }

    let constant = match kind {
        TokenKind::Bytes => Constant::Bytes(value),
        TokenKind::FString => Constant::FString(value),
        _ => Constant::Str(value),
    };

    Ok(ExprWrapper::new(ConstantExpr {
        value: constant,
        span: span_from(parser, first.span.start),
    }))
}

pub fn parse_binary_expr(
    parser: &mut Parser,
    left: ExprWrapper,
    bp: BindingPower,
) -> Result<ExprWrapper, Error> {
    let operator_token = parser.advance().clone();

    let right = parse_expr(parser, bp)?;

    Ok(ExprWrapper::new(BinaryExpr {
        span: Span {
            start: left.get_span().start.clone(),
            end: right.get_span().end.clone(),
        },
        left,
        operator: operator_token.value,
        right,
    }))
}

/// `is` and `is not`
pub fn parse_is_expr(
    parser: &mut Parser,
    left: ExprWrapper,
    bp: BindingPower,
) -> Result<ExprWrapper, Error> {
    parser.advance();
    let operator = if parser.current_token_kind() == TokenKind::Not {
        parser.advance();
        "is not"
    } else {
        "is"
    };

    let right = parse_expr(parser, bp)?;

    Ok(ExprWrapper::new(BinaryExpr {
        span: Span::new(left.get_span().start.clone(), right.get_span().end.clone()),
        left,
        operator: String::from(operator),
        right,
    }))
}

/// `not in`; a bare infix `not` is a syntax error.
pub fn parse_not_in_expr(
    parser: &mut Parser,
    left: ExprWrapper,
    bp: BindingPower,
) -> Result<ExprWrapper, Error> {
    parser.advance();
    let error = Error::new(
        ErrorImpl::UnexpectedTokenDetailed {
            token: parser.current_token().value.clone(),
            message: String::from("expected `in` after `not`"),
        },
        parser.get_position(),
    );
    parser.expect_error(TokenKind::In, Some(error))?;

    let right = parse_expr(parser, bp)?;

    Ok(ExprWrapper::new(BinaryExpr {
        span: Span::new(left.get_span().start.clone(), right.get_span().end.clone()),
        left,
        operator: String::from("not in"),
        right,
    }))
}

/// `**` binds right to left and tighter than a unary operator on its left.
pub fn parse_power_expr(
    parser: &mut Parser,
    left: ExprWrapper,
    _bp: BindingPower,
) -> Result<ExprWrapper, Error> {
    let operator_token = parser.advance().clone();
    let right = parse_expr(parser, BindingPower::Unary)?;

    Ok(ExprWrapper::new(BinaryExpr {
        span: Span::new(left.get_span().start.clone(), right.get_span().end.clone()),
        left,
        operator: operator_token.value,
        right,
    }))
}

pub fn parse_prefix_expr(parser: &mut Parser) -> Result<ExprWrapper, Error> {
    let operator_token = parser.advance().clone();
    let operand = parse_expr(parser, BindingPower::Unary)?;

    Ok(ExprWrapper::new(UnaryExpr {
        span: Span {
            start: operator_token.span.start.clone(),
            end: operand.get_span().end.clone(),
        },
        operator: operator_token.value,
        operand,
    }))
}

pub fn parse_not_expr(parser: &mut Parser) -> Result<ExprWrapper, Error> {
    let start = parser.advance().span.start.clone();
    let operand = parse_expr(parser, BindingPower::LogicalNot)?;

    Ok(ExprWrapper::new(UnaryExpr {
        span: Span::new(start, operand.get_span().end.clone()),
        operator: String::from("not"),
        operand,
    }))
}

pub fn parse_starred_expr(parser: &mut Parser) -> Result<ExprWrapper, Error> {
    let start = parser.advance().span.start.clone();
    let value = parse_expr(parser, BindingPower::Relational)?;

    Ok(ExprWrapper::new(StarredExpr {
        span: Span::new(start, value.get_span().end.clone()),
        value,
    }))
}

pub fn parse_await_expr(parser: &mut Parser) -> Result<ExprWrapper, Error> {
    let start = parser.advance().span.start.clone();
    let value = parse_expr(parser, BindingPower::Await)?;

    Ok(ExprWrapper::new(AwaitExpr {
        span: Span::new(start, value.get_span().end.clone()),
        value,
    }))
}

pub fn parse_yield_expr(parser: &mut Parser) -> Result<ExprWrapper, Error> {
    let start = parser.advance().span.start.clone();

    let (value, is_from) = if parser.current_token_kind() == TokenKind::From {
        parser.advance();
        (Some(parse_expr(parser, BindingPower::Default)?), true)
    } else if parser.can_start_expr() {
        (Some(parse_expr_list(parser, BindingPower::Default)?), false)
    } else {
        (None, false)
    };

    Ok(ExprWrapper::new(YieldExpr {
        value,
        is_from,
        span: span_from(parser, start),
    }))
}

/// `target := value`
pub fn parse_named_expr(
    parser: &mut Parser,
    left: ExprWrapper,
    bp: BindingPower,
) -> Result<ExprWrapper, Error> {
    if left.downcast::<NameExpr>().is_none() {
        return Err(Error::new(
            ErrorImpl::InvalidTarget {
                target: left.unparse(),
            },
            left.get_span().start.clone(),
        ));
    }
    parser.advance();
    let value = parse_expr(parser, bp)?;

    Ok(ExprWrapper::new(NamedExpr {
        span: Span::new(left.get_span().start.clone(), value.get_span().end.clone()),
        target: left,
        value,
    }))
}

/// `body if test else orelse`
pub fn parse_ternary_expr(
    parser: &mut Parser,
    left: ExprWrapper,
    bp: BindingPower,
) -> Result<ExprWrapper, Error> {
    parser.advance();
    let test = parse_expr(parser, bp)?;
    parser.expect(TokenKind::Else)?;
    let orelse = parse_expr(parser, BindingPower::Walrus)?;

    Ok(ExprWrapper::new(IfExpr {
        span: Span::new(left.get_span().start.clone(), orelse.get_span().end.clone()),
        test,
        body: left,
        orelse,
    }))
}

/// Parses a parenthesised argument list, including the parentheses.
pub fn parse_arguments(parser: &mut Parser) -> Result<Vec<ExprWrapper>, Error> {
    parser.expect(TokenKind::OpenParen)?;

    let mut arguments = vec![];
    while parser.current_token_kind() != TokenKind::CloseParen {
        let start = parser.get_position();
        let argument = match parser.current_token_kind() {
            TokenKind::Star => parse_starred_expr(parser)?,
            TokenKind::DoubleStar => {
                parser.advance();
                let value = parse_expr(parser, BindingPower::Walrus)?;
                ExprWrapper::new(KeywordExpr {
                    name: None,
                    value,
                    span: span_from(parser, start),
                })
            }
            TokenKind::Identifier if parser.peek_kind(1) == TokenKind::Assignment => {
                let name = parser.advance().value.clone();
                parser.advance();
                let value = parse_expr(parser, BindingPower::Walrus)?;
                ExprWrapper::new(KeywordExpr {
                    name: Some(name),
                    value,
                    span: span_from(parser, start),
                })
            }
            _ => {
                let argument = parse_expr(parser, BindingPower::Default)?;
                if is_comprehension_start(parser) {
                    let generators = parse_comprehension_clauses(parser)?;
                    ExprWrapper::new(ComprehensionExpr {
                        kind: ComprehensionKind::Generator,
                        element: argument,
                        value: None,
                        generators,
                        span: span_from(parser, start),
                    })
                } else {
                    argument
                }
            }
        };
        arguments.push(argument);

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        } else {
            break;
        }
    }

    parser.expect(TokenKind::CloseParen)?;
    Ok(arguments)
}

pub fn parse_call_expr(
    parser: &mut Parser,
    left: ExprWrapper,
    _bp: BindingPower,
) -> Result<ExprWrapper, Error> {
    let arguments = parse_arguments(parser)?;

    Ok(ExprWrapper::new(CallExpr {
        span: Span {
            start: left.get_span().start.clone(),
            end: parser.last_end(),
        },
        callee: left,
        arguments,
    }))
}

pub fn parse_member_expr(
    parser: &mut Parser,
    left: ExprWrapper,
    _bp: BindingPower,
) -> Result<ExprWrapper, Error> {
    parser.advance();
    let attr = parser.expect(TokenKind::Identifier)?.value;

    Ok(ExprWrapper::new(AttributeExpr {
        span: Span {
            start: left.get_span().start.clone(),
            end: parser.last_end(),
        },
        value: left,
        attr,
    }))
}

pub fn parse_subscript_expr(
    parser: &mut Parser,
    left: ExprWrapper,
    _bp: BindingPower,
) -> Result<ExprWrapper, Error> {
    parser.advance();

    let first = parse_slice_item(parser)?;
    let slice = if parser.current_token_kind() == TokenKind::Comma {
        let start = first.get_span().start.clone();
        let mut elements = vec![first];
        while parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
            if parser.current_token_kind() == TokenKind::CloseBracket {
                break;
            }
            elements.push(parse_slice_item(parser)?);
        }
        ExprWrapper::new(TupleExpr {
            elements,
            span: span_from(parser, start),
        })
    } else {
        first
    };

    parser.expect(TokenKind::CloseBracket)?;

    Ok(ExprWrapper::new(SubscriptExpr {
        span: Span::new(left.get_span().start.clone(), parser.last_end()),
        value: left,
        slice,
    }))
}

/// An index expression or `lower:upper:step` slice.
fn parse_slice_item(parser: &mut Parser) -> Result<ExprWrapper, Error> {
    let start = parser.get_position();

    let lower = if parser.current_token_kind() != TokenKind::Colon {
        let lower = parse_expr(parser, BindingPower::Default)?;
        if parser.current_token_kind() != TokenKind::Colon {
            return Ok(lower);
        }
        Some(lower)
    } else {
        None
    };
    parser.expect(TokenKind::Colon)?;

    let ends_item = |kind: TokenKind| {
        matches!(
            kind,
            TokenKind::Colon | TokenKind::Comma | TokenKind::CloseBracket
        )
    };

    let upper = if !ends_item(parser.current_token_kind()) {
        Some(parse_expr(parser, BindingPower::Default)?)
    } else {
        None
    };

    let step = if parser.current_token_kind() == TokenKind::Colon {
        parser.advance();
        if !ends_item(parser.current_token_kind()) {
            Some(parse_expr(parser, BindingPower::Default)?)
        } else {
            None
        }
    } else {
        None
    };

    Ok(ExprWrapper::new(SliceExpr {
        lower,
        upper,
        step,
        span: span_from(parser, start),
    }))
}

fn is_comprehension_start(parser: &Parser) -> bool {
    match parser.current_token_kind() {
        TokenKind::For => true,
        TokenKind::Async => parser.peek_kind(1) == TokenKind::For,
        _ => false,
    }
}

/// Parses one or more `[async] for target in iter [if cond]*` clauses.
fn parse_comprehension_clauses(parser: &mut Parser) -> Result<Vec<Comprehension>, Error> {
    let mut generators = vec![];

    while is_comprehension_start(parser) {
        let is_async = parser.current_token_kind() == TokenKind::Async;
        if is_async {
            parser.advance();
        }
        parser.expect(TokenKind::For)?;

        let target = parse_expr_list(parser, BindingPower::Relational)?;
        parser.expect(TokenKind::In)?;
        let iter = parse_expr(parser, BindingPower::Ternary)?;

        let mut ifs = vec![];
        while parser.current_token_kind() == TokenKind::If {
            parser.advance();
            ifs.push(parse_expr(parser, BindingPower::Ternary)?);
        }

        generators.push(Comprehension {
            target,
            iter,
            ifs,
            is_async,
        });
    }

    Ok(generators)
}

/// `( )`: grouping, tuples and generator expressions.
pub fn parse_grouping_expr(parser: &mut Parser) -> Result<ExprWrapper, Error> {
    let start = parser.advance().span.start.clone();

    if parser.current_token_kind() == TokenKind::CloseParen {
        parser.advance();
        return Ok(ExprWrapper::new(TupleExpr {
            elements: vec![],
            span: span_from(parser, start),
        }));
    }

    let first = parse_expr(parser, BindingPower::Default)?;

    if is_comprehension_start(parser) {
        let generators = parse_comprehension_clauses(parser)?;
        parser.expect(TokenKind::CloseParen)?;
        return Ok(ExprWrapper::new(ComprehensionExpr {
            kind: ComprehensionKind::Generator,
            element: first,
            value: None,
            generators,
            span: span_from(parser, start),
        }));
    }

    if parser.current_token_kind() != TokenKind::Comma {
        parser.expect(TokenKind::CloseParen)?;
        return Ok(first);
    }

    let mut elements = vec![first];
    while parser.current_token_kind() == TokenKind::Comma {
        parser.advance();
        if parser.current_token_kind() == TokenKind::CloseParen {
            break;
        }
        elements.push(parse_expr(parser, BindingPower::Default)?);
    }
    parser.expect(TokenKind::CloseParen)?;

    Ok(ExprWrapper::new(TupleExpr {
        elements,
        span: span_from(parser, start),
    }))
}

/// `[ ]`: list displays and list comprehensions.
pub fn parse_list_expr(parser: &mut Parser) -> Result<ExprWrapper, Error> {
    let start = parser.advance().span.start.clone();

    let mut elements = vec![];
    if parser.current_token_kind() != TokenKind::CloseBracket {
        let first = parse_expr(parser, BindingPower::Default)?;

        if is_comprehension_start(parser) {
            let generators = parse_comprehension_clauses(parser)?;
            parser.expect(TokenKind::CloseBracket)?;
            return Ok(ExprWrapper::new(ComprehensionExpr {
                kind: ComprehensionKind::List,
                element: first,
                value: None,
                generators,
                span: span_from(parser, start),
            }));
        }

        elements.push(first);
        while parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
            if parser.current_token_kind() == TokenKind::CloseBracket {
                break;
            }
            elements.push(parse_expr(parser, BindingPower::Default)?);
        }
    }
    parser.expect(TokenKind::CloseBracket)?;

    Ok(ExprWrapper::new(ListExpr {
        elements,
        span: span_from(parser, start),
    }))
}

/// `{ }`: dict and set displays and their comprehensions.
pub fn parse_curly_expr(parser: &mut Parser) -> Result<ExprWrapper, Error> {
    let start = parser.advance().span.start.clone();

    if parser.current_token_kind() == TokenKind::CloseCurly {
        parser.advance();
        return Ok(ExprWrapper::new(DictExpr {
            entries: vec![],
            span: span_from(parser, start),
        }));
    }

    if parser.current_token_kind() == TokenKind::DoubleStar {
        parser.advance();
        let value = parse_expr(parser, BindingPower::Relational)?;
        return parse_dict_entries(parser, start, vec![(None, value)]);
    }

    let first = parse_expr(parser, BindingPower::Default)?;

    if parser.current_token_kind() == TokenKind::Colon {
        parser.advance();
        let value = parse_expr(parser, BindingPower::Default)?;

        if is_comprehension_start(parser) {
            let generators = parse_comprehension_clauses(parser)?;
            parser.expect(TokenKind::CloseCurly)?;
            return Ok(ExprWrapper::new(ComprehensionExpr {
                kind: ComprehensionKind::Dict,
                element: first,
                value: Some(value),
                generators,
                span: span_from(parser, start),
            }));
        }

        return parse_dict_entries(parser, start, vec![(Some(first), value)]);
    }

    if is_comprehension_start(parser) {
        let generators = parse_comprehension_clauses(parser)?;
        parser.expect(TokenKind::CloseCurly)?;
        return Ok(ExprWrapper::new(ComprehensionExpr {
            kind: ComprehensionKind::Set,
            element: first,
            value: None,
            generators,
            span: span_from(parser, start),
        }));
    }

    let mut elements = vec![first];
    while parser.current_token_kind() == TokenKind::Comma {
        parser.advance();
        if parser.current_token_kind() == TokenKind::CloseCurly {
            break;
        }
        elements.push(parse_expr(parser, BindingPower::Default)?);
    }
    parser.expect(TokenKind::CloseCurly)?;

    Ok(ExprWrapper::new(SetExpr {
        elements,
        span: span_from(parser, start),
    }))
}

fn parse_dict_entries(
    parser: &mut Parser,
    start: Position,
    mut entries: Vec<(Option<ExprWrapper>, ExprWrapper)>,
) -> Result<ExprWrapper, Error> {
    while parser.current_token_kind() == TokenKind::Comma {
        parser.advance();
        match parser.current_token_kind() {
            TokenKind::CloseCurly => break,
            TokenKind::DoubleStar => {
                parser.advance();
                entries.push((None, parse_expr(parser, BindingPower::Relational)?));
            }
            _ => {
                let key = parse_expr(parser, BindingPower::Default)?;
                parser.expect(TokenKind::Colon)?;
                let value = parse_expr(parser, BindingPower::Default)?;
                entries.push((Some(key), value));
            }
        }
    }
    parser.expect(TokenKind::CloseCurly)?;

    Ok(ExprWrapper::new(DictExpr {
        entries,
        span: span_from(parser, start),
    }))
}

pub fn parse_lambda_expr(parser: &mut Parser) -> Result<ExprWrapper, Error> {
    let start = parser.advance().span.start.clone();

    let parameters = parse_parameters(parser, TokenKind::Colon, false)?;
    parser.expect(TokenKind::Colon)?;
    let body = parse_expr(parser, BindingPower::Walrus)?;

    Ok(ExprWrapper::new(LambdaExpr {
        span: Span::new(start, body.get_span().end.clone()),
        parameters,
        body,
    }))
}

/// Parses a parameter list up to (not including) `closing`.
///
/// Handles `/` and bare `*` markers, `*args`, `**kwargs` and defaults.
/// Annotations are only read for `def` parameters.
pub fn parse_parameters(
    parser: &mut Parser,
    closing: TokenKind,
    annotated: bool,
) -> Result<Vec<Parameter>, Error> {
    let mut parameters: Vec<Parameter> = vec![];
    let mut kind = ParameterKind::Regular;

    while parser.current_token_kind() != closing {
        let start = parser.get_position();
        match parser.current_token_kind() {
            TokenKind::Slash => {
                parser.advance();
                for parameter in parameters.iter_mut() {
                    if parameter.kind == ParameterKind::Regular {
                        parameter.kind = ParameterKind::PositionalOnly;
                    }
                }
            }
            TokenKind::Star => {
                parser.advance();
                if parser.current_token_kind() == TokenKind::Identifier {
                    let name = parser.advance().value.clone();
                    let annotation = parse_annotation(parser, annotated)?;
                    parameters.push(Parameter {
                        name,
                        annotation,
                        default: None,
                        kind: ParameterKind::VarArgs,
                        span: span_from(parser, start),
                    });
                }
                kind = ParameterKind::KeywordOnly;
            }
            TokenKind::DoubleStar => {
                parser.advance();
                let name = parser.expect(TokenKind::Identifier)?.value;
                let annotation = parse_annotation(parser, annotated)?;
                parameters.push(Parameter {
                    name,
                    annotation,
                    default: None,
                    kind: ParameterKind::VarKeywords,
                    span: span_from(parser, start),
                });
            }
            _ => {
                let name = parser.expect(TokenKind::Identifier)?.value;
                let annotation = parse_annotation(parser, annotated)?;
                let default = if parser.current_token_kind() == TokenKind::Assignment {
                    parser.advance();
                    Some(parse_expr(parser, BindingPower::Walrus)?)
                } else {
                    None
                };
                parameters.push(Parameter {
                    name,
                    annotation,
                    default,
                    kind,
                    span: span_from(parser, start),
                });
            }
        }

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        } else {
            break;
        }
    }

    Ok(parameters)
}

fn parse_annotation(parser: &mut Parser, annotated: bool) -> Result<Option<ExprWrapper>, Error> {
    if annotated && parser.current_token_kind() == TokenKind::Colon {
        parser.advance();
        Ok(Some(parse_expr(parser, BindingPower::Walrus)?))
    } else {
        Ok(None)
    }
}
