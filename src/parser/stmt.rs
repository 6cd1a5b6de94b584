use crate::{
    ast::{
        ast::{Expr, ExprBase, ExprType, ExprWrapper, StmtWrapper},
        statements::{
            AnnAssignStmt, AssertStmt, AssignStmt, AugAssignStmt, ClassDefStmt, DeleteStmt,
            ExceptHandler, ExpressionStmt, ForStmt, FunctionDefStmt, GlobalStmt, IfStmt,
            ImportStmt, KeywordStmt, RaiseStmt, ReturnStmt, TryStmt, WhileStmt, WithItem,
            WithStmt,
        },
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    Position, Span,
};

use super::{
    expr::{parse_arguments, parse_expr, parse_expr_list, parse_parameters},
    lookups::{is_compound_stmt, BindingPower},
    parser::Parser,
};

/// Parses one compound statement, or one logical line of simple statements.
pub fn parse_stmt(parser: &mut Parser) -> Result<Vec<StmtWrapper>, Error> {
    let kind = parser.current_token_kind();
    if is_compound_stmt(kind) {
        if let Some(handler) = parser.get_stmt_lookup().get(&kind).copied() {
            return Ok(vec![handler(parser)?]);
        }
    }

    parse_simple_stmt_line(parser)
}

/// `a; b; c NEWLINE`
fn parse_simple_stmt_line(parser: &mut Parser) -> Result<Vec<StmtWrapper>, Error> {
    let mut statements = vec![parse_simple_stmt(parser)?];
    while parser.current_token_kind() == TokenKind::Semicolon {
        parser.advance();
        if parser.current_token_kind() == TokenKind::Newline {
            break;
        }
        statements.push(parse_simple_stmt(parser)?);
    }

    parser.expect(TokenKind::Newline)?;
    Ok(statements)
}

fn parse_simple_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let kind = parser.current_token_kind();
    if !is_compound_stmt(kind) {
        if let Some(handler) = parser.get_stmt_lookup().get(&kind).copied() {
            return handler(parser);
        }
    }

    parse_expression_stmt(parser)
}

/// Parses `: suite`, either on the same line or as an indented block.
pub fn parse_block(parser: &mut Parser) -> Result<Vec<StmtWrapper>, Error> {
    parser.expect(TokenKind::Colon)?;

    if parser.current_token_kind() != TokenKind::Newline {
        return parse_simple_stmt_line(parser);
    }
    parser.advance();

    let error = Error::new(ErrorImpl::ExpectedIndentedBlock, parser.get_position());
    parser.expect_error(TokenKind::Indent, Some(error))?;

    let mut body = vec![];
    while !matches!(
        parser.current_token_kind(),
        TokenKind::Dedent | TokenKind::EOF
    ) {
        if parser.current_token_kind() == TokenKind::Indent {
            return Err(Error::new(ErrorImpl::UnexpectedIndent, parser.get_position()));
        }
        body.extend(parse_stmt(parser)?);
    }

    if parser.current_token_kind() == TokenKind::Dedent {
        parser.advance();
    }

    Ok(body)
}

fn invalid_target(target: &ExprWrapper) -> Error {
    Error::new(
        ErrorImpl::InvalidTarget {
            target: target.unparse(),
        },
        target.get_span().start.clone(),
    )
}

/// Checks an assignment target; tuples, lists and starred names may only
/// appear when the target destructures.
fn validate_target(target: &ExprWrapper, destructure: bool) -> Result<(), Error> {
    match target.get_expr_type() {
        ExprType::Name | ExprType::Attribute | ExprType::Subscript => Ok(()),
        ExprType::Tuple | ExprType::List | ExprType::Starred if destructure => target
            .children()
            .into_iter()
            .try_for_each(|child| validate_target(child, true)),
        _ => Err(invalid_target(target)),
    }
}

pub fn parse_expression_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let start = parser.get_position();
    let first = parse_expr_list(parser, BindingPower::Default)?;

    match parser.current_token_kind() {
        TokenKind::Colon => {
            parser.advance();
            validate_target(&first, false)?;

            // Annotations allow conditional expressions but not `:=`
            let annotation = parse_expr(parser, BindingPower::Walrus)?;
            let value = if parser.current_token_kind() == TokenKind::Assignment {
                parser.advance();
                Some(parse_expr_list(parser, BindingPower::Default)?)
            } else {
                None
            };

            Ok(StmtWrapper::new(AnnAssignStmt {
                target: first,
                annotation,
                value,
                span: Span::new(start, parser.last_end()),
            }))
        }
        TokenKind::Assignment => {
            let mut targets = vec![first];
            while parser.current_token_kind() == TokenKind::Assignment {
                parser.advance();
                targets.push(parse_expr_list(parser, BindingPower::Default)?);
            }

            let value = match targets.pop() {
                Some(value) => value,
                None => return Err(parser.unexpected()),
            };
            for target in &targets {
                validate_target(target, true)?;
            }

            Ok(StmtWrapper::new(AssignStmt {
                targets,
                value,
                span: Span::new(start, parser.last_end()),
            }))
        }
        kind if kind.is_augmented_assignment() => {
            validate_target(&first, false)?;
            let operator = parser.advance().value.clone();
            let value = parse_expr_list(parser, BindingPower::Default)?;

            Ok(StmtWrapper::new(AugAssignStmt {
                target: first,
                operator,
                value,
                span: Span::new(start, parser.last_end()),
            }))
        }
        _ => Ok(StmtWrapper::new(ExpressionStmt {
            span: first.get_span().clone(),
            expression: first,
        })),
    }
}

pub fn parse_if_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    // Also entered on `elif`
    let start = parser.advance().span.start.clone();

    let test = parse_expr(parser, BindingPower::Default)?;
    let body = parse_block(parser)?;

    let orelse = match parser.current_token_kind() {
        TokenKind::Elif => vec![parse_if_stmt(parser)?],
        TokenKind::Else => {
            parser.advance();
            parse_block(parser)?
        }
        _ => vec![],
    };

    Ok(StmtWrapper::new(IfStmt {
        test,
        body,
        orelse,
        span: Span::new(start, parser.last_end()),
    }))
}

fn parse_else_block(parser: &mut Parser) -> Result<Vec<StmtWrapper>, Error> {
    if parser.current_token_kind() == TokenKind::Else {
        parser.advance();
        parse_block(parser)
    } else {
        Ok(vec![])
    }
}

pub fn parse_while_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let start = parser.advance().span.start.clone();

    let test = parse_expr(parser, BindingPower::Default)?;
    let body = parse_block(parser)?;
    let orelse = parse_else_block(parser)?;

    Ok(StmtWrapper::new(WhileStmt {
        test,
        body,
        orelse,
        span: Span::new(start, parser.last_end()),
    }))
}

pub fn parse_for_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let start = parser.get_position();
    parse_for(parser, false, start)
}

fn parse_for(parser: &mut Parser, is_async: bool, start: Position) -> Result<StmtWrapper, Error> {
    parser.expect(TokenKind::For)?;

    let target = parse_expr_list(parser, BindingPower::Relational)?;
    validate_target(&target, true)?;
    parser.expect(TokenKind::In)?;
    let iter = parse_expr_list(parser, BindingPower::Default)?;

    let body = parse_block(parser)?;
    let orelse = parse_else_block(parser)?;

    Ok(StmtWrapper::new(ForStmt {
        target,
        iter,
        body,
        orelse,
        is_async,
        span: Span::new(start, parser.last_end()),
    }))
}

pub fn parse_try_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let start = parser.advance().span.start.clone();
    let body = parse_block(parser)?;

    let mut handlers = vec![];
    while parser.current_token_kind() == TokenKind::Except {
        parser.advance();
        // except* for exception groups
        if parser.current_token_kind() == TokenKind::Star {
            parser.advance();
        }

        let mut kind = None;
        let mut name = None;
        if parser.current_token_kind() != TokenKind::Colon {
            kind = Some(parse_expr_list(parser, BindingPower::Walrus)?);
            if parser.current_token_kind() == TokenKind::As {
                parser.advance();
                name = Some(parser.expect(TokenKind::Identifier)?.value);
            }
        }

        handlers.push(ExceptHandler {
            kind,
            name,
            body: parse_block(parser)?,
        });
    }

    let orelse = parse_else_block(parser)?;

    let finalbody = if parser.current_token_kind() == TokenKind::Finally {
        parser.advance();
        parse_block(parser)?
    } else {
        vec![]
    };

    if handlers.is_empty() && finalbody.is_empty() {
        return Err(parser.unexpected());
    }

    Ok(StmtWrapper::new(TryStmt {
        body,
        handlers,
        orelse,
        finalbody,
        span: Span::new(start, parser.last_end()),
    }))
}

pub fn parse_with_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let start = parser.get_position();
    parse_with(parser, false, start)
}

/// Whether the `(` at the cursor wraps the whole item list, as in
/// `with (a as b, c as d):`.
fn has_parenthesized_items(parser: &Parser) -> bool {
    let mut depth = 0usize;
    let mut offset = 0;
    loop {
        match parser.peek_kind(offset) {
            TokenKind::OpenParen | TokenKind::OpenBracket | TokenKind::OpenCurly => depth += 1,
            TokenKind::CloseParen | TokenKind::CloseBracket | TokenKind::CloseCurly => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return parser.peek_kind(offset + 1) == TokenKind::Colon;
                }
            }
            TokenKind::EOF | TokenKind::Newline => return false,
            _ => {}
        }
        offset += 1;
    }
}

fn parse_with_item(parser: &mut Parser) -> Result<WithItem, Error> {
    let context = parse_expr(parser, BindingPower::Walrus)?;
    let target = if parser.current_token_kind() == TokenKind::As {
        parser.advance();
        let target = parse_expr(parser, BindingPower::Relational)?;
        validate_target(&target, true)?;
        Some(target)
    } else {
        None
    };

    Ok(WithItem { context, target })
}

fn parse_with(parser: &mut Parser, is_async: bool, start: Position) -> Result<StmtWrapper, Error> {
    parser.expect(TokenKind::With)?;

    let parenthesized = parser.current_token_kind() == TokenKind::OpenParen
        && has_parenthesized_items(parser);
    let closing = if parenthesized {
        parser.advance();
        TokenKind::CloseParen
    } else {
        TokenKind::Colon
    };

    let mut items = vec![parse_with_item(parser)?];
    while parser.current_token_kind() == TokenKind::Comma {
        parser.advance();
        if parser.current_token_kind() == closing {
            break;
        }
        items.push(parse_with_item(parser)?);
    }

    if parenthesized {
        parser.expect(TokenKind::CloseParen)?;
    }

    let body = parse_block(parser)?;

    Ok(StmtWrapper::new(WithStmt {
        items,
        body,
        is_async,
        span: Span::new(start, parser.last_end()),
    }))
}

pub fn parse_function_def_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    parse_function_def(parser, vec![], None)
}

/// `def name(params) -> returns: suite`
///
/// `async_start` is the position of a leading `async` keyword.
fn parse_function_def(
    parser: &mut Parser,
    decorators: Vec<ExprWrapper>,
    async_start: Option<Position>,
) -> Result<StmtWrapper, Error> {
    let def_start = parser.expect(TokenKind::Def)?.span.start;
    let is_async = async_start.is_some();
    let start = async_start.unwrap_or(def_start);

    let name = parser.expect(TokenKind::Identifier)?.value;

    parser.expect(TokenKind::OpenParen)?;
    let parameters = parse_parameters(parser, TokenKind::CloseParen, true)?;
    parser.expect(TokenKind::CloseParen)?;

    let returns = if parser.current_token_kind() == TokenKind::Arrow {
        parser.advance();
        Some(parse_expr(parser, BindingPower::Walrus)?)
    } else {
        None
    };

    let body = parse_block(parser)?;

    Ok(StmtWrapper::new(FunctionDefStmt {
        name,
        decorators,
        parameters,
        returns,
        body,
        is_async,
        span: Span::new(start, parser.last_end()),
    }))
}

pub fn parse_class_def_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    parse_class_def(parser, vec![])
}

fn parse_class_def(
    parser: &mut Parser,
    decorators: Vec<ExprWrapper>,
) -> Result<StmtWrapper, Error> {
    let start = parser.expect(TokenKind::Class)?.span.start;
    let name = parser.expect(TokenKind::Identifier)?.value;

    let bases = if parser.current_token_kind() == TokenKind::OpenParen {
        parse_arguments(parser)?
    } else {
        vec![]
    };

    let body = parse_block(parser)?;

    Ok(StmtWrapper::new(ClassDefStmt {
        name,
        decorators,
        bases,
        body,
        span: Span::new(start, parser.last_end()),
    }))
}

/// `@decorator` lines followed by a `def`, `async def` or `class`.
pub fn parse_decorated_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let mut decorators = vec![];
    while parser.current_token_kind() == TokenKind::At {
        parser.advance();
        decorators.push(parse_expr(parser, BindingPower::Walrus)?);
        parser.expect(TokenKind::Newline)?;
    }

    match parser.current_token_kind() {
        TokenKind::Def => parse_function_def(parser, decorators, None),
        TokenKind::Class => parse_class_def(parser, decorators),
        TokenKind::Async => {
            let start = parser.advance().span.start.clone();
            parse_function_def(parser, decorators, Some(start))
        }
        _ => Err(parser.unexpected()),
    }
}

pub fn parse_async_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let start = parser.advance().span.start.clone();

    match parser.current_token_kind() {
        TokenKind::Def => parse_function_def(parser, vec![], Some(start)),
        TokenKind::For => parse_for(parser, true, start),
        TokenKind::With => parse_with(parser, true, start),
        _ => Err(parser.unexpected()),
    }
}

/// `pass`, `break` and `continue`
pub fn parse_keyword_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let token = parser.advance().clone();

    Ok(StmtWrapper::new(KeywordStmt {
        keyword: token.value,
        span: token.span,
    }))
}

pub fn parse_return_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let start = parser.advance().span.start.clone();

    let value = if parser.can_start_expr() {
        Some(parse_expr_list(parser, BindingPower::Default)?)
    } else {
        None
    };

    Ok(StmtWrapper::new(ReturnStmt {
        value,
        span: Span::new(start, parser.last_end()),
    }))
}

pub fn parse_raise_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let start = parser.advance().span.start.clone();

    let mut exception = None;
    let mut cause = None;
    if parser.can_start_expr() {
        exception = Some(parse_expr(parser, BindingPower::Walrus)?);
        if parser.current_token_kind() == TokenKind::From {
            parser.advance();
            cause = Some(parse_expr(parser, BindingPower::Walrus)?);
        }
    }

    Ok(StmtWrapper::new(RaiseStmt {
        exception,
        cause,
        span: Span::new(start, parser.last_end()),
    }))
}

/// `global` and `nonlocal`
pub fn parse_global_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let keyword = parser.advance().clone();

    let mut names = vec![parser.expect(TokenKind::Identifier)?.value];
    while parser.current_token_kind() == TokenKind::Comma {
        parser.advance();
        names.push(parser.expect(TokenKind::Identifier)?.value);
    }

    Ok(StmtWrapper::new(GlobalStmt {
        names,
        is_nonlocal: keyword.kind == TokenKind::Nonlocal,
        span: Span::new(keyword.span.start, parser.last_end()),
    }))
}

pub fn parse_delete_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let start = parser.advance().span.start.clone();

    let mut targets = vec![];
    loop {
        let target = parse_expr(parser, BindingPower::Relational)?;
        validate_target(&target, true)?;
        targets.push(target);

        if parser.current_token_kind() != TokenKind::Comma {
            break;
        }
        parser.advance();
        if !parser.can_start_expr() {
            break;
        }
    }

    Ok(StmtWrapper::new(DeleteStmt {
        targets,
        span: Span::new(start, parser.last_end()),
    }))
}

pub fn parse_assert_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let start = parser.advance().span.start.clone();

    let test = parse_expr(parser, BindingPower::Walrus)?;
    let message = if parser.current_token_kind() == TokenKind::Comma {
        parser.advance();
        Some(parse_expr(parser, BindingPower::Walrus)?)
    } else {
        None
    };

    Ok(StmtWrapper::new(AssertStmt {
        test,
        message,
        span: Span::new(start, parser.last_end()),
    }))
}

fn parse_dotted_name(parser: &mut Parser) -> Result<String, Error> {
    let mut name = parser.expect(TokenKind::Identifier)?.value;
    while parser.current_token_kind() == TokenKind::Dot {
        parser.advance();
        name.push('.');
        name.push_str(&parser.expect(TokenKind::Identifier)?.value);
    }
    Ok(name)
}

fn parse_alias(parser: &mut Parser) -> Result<Option<String>, Error> {
    if parser.current_token_kind() == TokenKind::As {
        parser.advance();
        Ok(Some(parser.expect(TokenKind::Identifier)?.value))
    } else {
        Ok(None)
    }
}

/// `import a.b as c, d` and `from ..a import (b as c, d)`
pub fn parse_import_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let keyword = parser.advance().clone();
    let mut names = vec![];

    if keyword.kind == TokenKind::Import {
        loop {
            let name = parse_dotted_name(parser)?;
            names.push((name, parse_alias(parser)?));
            if parser.current_token_kind() != TokenKind::Comma {
                break;
            }
            parser.advance();
        }

        return Ok(StmtWrapper::new(ImportStmt {
            module: None,
            names,
            span: Span::new(keyword.span.start, parser.last_end()),
        }));
    }

    let mut module = String::new();
    loop {
        match parser.current_token_kind() {
            TokenKind::Dot => module.push('.'),
            // `...` lexes as a single token
            TokenKind::Ellipsis => module.push_str("..."),
            _ => break,
        }
        parser.advance();
    }
    if parser.current_token_kind() == TokenKind::Identifier {
        module.push_str(&parse_dotted_name(parser)?);
    }
    if module.is_empty() {
        return Err(parser.unexpected());
    }

    parser.expect(TokenKind::Import)?;

    if parser.current_token_kind() == TokenKind::Star {
        parser.advance();
        names.push((String::from("*"), None));
    } else {
        let parenthesized = parser.current_token_kind() == TokenKind::OpenParen;
        if parenthesized {
            parser.advance();
        }
        loop {
            let name = parser.expect(TokenKind::Identifier)?.value;
            names.push((name, parse_alias(parser)?));
            if parser.current_token_kind() != TokenKind::Comma {
                break;
            }
            parser.advance();
            if parenthesized && parser.current_token_kind() == TokenKind::CloseParen {
                break;
            }
        }
        if parenthesized {
            parser.expect(TokenKind::CloseParen)?;
        }
    }

    Ok(StmtWrapper::new(ImportStmt {
        module: Some(module),
        names,
        span: Span::new(keyword.span.start, parser.last_end()),
    }))
}
