//! Parser implementation for building the Abstract Syntax Tree.
//!
//! This module contains the main Parser struct and parsing functions.
//! The parser uses a Pratt parser approach with NUD/LED handlers for
//! expression parsing and specialized functions for statement parsing.
//!
//! It maintains lookup tables for:
//! - Statement handlers
//! - NUD (null denotation) handlers for prefix expressions
//! - LED (left denotation) handlers for infix expressions
//! - Binding powers for operator precedence

use std::{collections::HashMap, sync::Arc};

use crate::{
    ast::{ast::ExprWrapper, statements::BlockStmt},
    errors::errors::{Error, ErrorImpl},
    lexer::{
        lexer::tokenize,
        tokens::{Token, TokenKind},
    },
    Position, Span, MK_TOKEN,
};

use super::{
    expr::parse_expr_list,
    lookups::{
        create_token_lookups, BPLookup, BindingPower, LEDHandler, LEDLookup, NUDHandler, NUDLookup,
        StmtHandler, StmtLookup,
    },
    stmt::parse_stmt,
};

/// The main parser structure that maintains parsing state.
///
/// This struct holds the token stream and maintains lookup tables for
/// parsing statements and expressions. It tracks the current position in
/// the token stream and the end of the last significant token consumed,
/// which is where multi-line statements end.
pub struct Parser {
    /// The list of tokens to parse, always terminated by `EOF`
    tokens: Vec<Token>,
    /// Current position in the token stream
    pos: usize,
    /// The name of the source file being parsed
    file: Arc<String>,
    /// End of the last consumed token that is not layout
    last_end: Position,
    /// Lookup table for statement parsing handlers
    stmt_lookup: StmtLookup,
    /// Lookup table for null denotation (prefix) expression handlers
    nud_lookup: NUDLookup,
    /// Lookup table for left denotation (infix) expression handlers
    led_lookup: LEDLookup,
    /// Lookup table for expression binding powers (precedence)
    binding_power_lookup: BPLookup,
}

impl Parser {
    /// Creates a new Parser instance.
    ///
    /// # Arguments
    ///
    /// * `tokens` - Vector of tokens to parse
    /// * `file` - Shared string containing the source file name
    pub fn new(mut tokens: Vec<Token>, file: Arc<String>) -> Self {
        if tokens.last().map(|token| token.kind) != Some(TokenKind::EOF) {
            let position = tokens
                .last()
                .map(|token| token.span.end.clone())
                .unwrap_or_else(|| Position::new(0, 1, &file));
            tokens.push(MK_TOKEN!(
                TokenKind::EOF,
                String::new(),
                Span::new(position.clone(), position)
            ));
        }

        Parser {
            tokens,
            pos: 0,
            last_end: Position::new(0, 1, &file),
            file,
            stmt_lookup: HashMap::new(),
            nud_lookup: HashMap::new(),
            led_lookup: HashMap::new(),
            binding_power_lookup: HashMap::new(),
        }
    }

    /// Returns the current token without advancing.
    pub fn current_token(&self) -> &Token {
        &self.tokens[self.pos]
    }

    /// Returns the kind of the current token.
    pub fn current_token_kind(&self) -> TokenKind {
        self.current_token().kind
    }

    /// Returns the kind of the token `n` places ahead, `EOF` past the end.
    pub fn peek_kind(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.pos + n)
            .map_or(TokenKind::EOF, |token| token.kind)
    }

    /// Advances to the next token and returns the previous token.
    ///
    /// The parser never moves past `EOF`.
    pub fn advance(&mut self) -> &Token {
        let index = self.pos;
        if self.tokens[index].kind != TokenKind::EOF {
            self.pos += 1;
        }
        if !self.tokens[index].kind.is_layout() {
            self.last_end = self.tokens[index].span.end.clone();
        }
        &self.tokens[index]
    }

    /// Expects a token of the specified kind, with optional custom error.
    ///
    /// # Returns
    ///
    /// Returns Ok(Token) if the current token matches, otherwise returns an Error.
    pub fn expect_error(
        &mut self,
        expected_kind: TokenKind,
        error: Option<Error>,
    ) -> Result<Token, Error> {
        if self.current_token_kind() != expected_kind {
            match error {
                Some(error) => Err(error),
                None => Err(self.unexpected()),
            }
        } else {
            Ok(self.advance().clone())
        }
    }

    /// Expects a token of the specified kind with default error message.
    pub fn expect(&mut self, expected_kind: TokenKind) -> Result<Token, Error> {
        self.expect_error(expected_kind, None)
    }

    /// An `UnexpectedToken` error for the current token.
    pub fn unexpected(&self) -> Error {
        let token = self.current_token();
        let shown = if token.value.is_empty() {
            token.kind.to_string()
        } else {
            token.value.clone()
        };
        Error::new(ErrorImpl::UnexpectedToken { token: shown }, token.span.start.clone())
    }

    /// Checks if there are more tokens to parse.
    pub fn has_tokens(&self) -> bool {
        self.current_token_kind() != TokenKind::EOF
    }

    /// Whether the current token can begin an expression.
    pub fn can_start_expr(&self) -> bool {
        self.nud_lookup.contains_key(&self.current_token_kind())
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

    /// Returns a reference to the binding power lookup table.
    pub fn get_bp_lookup(&self) -> &BPLookup {
        &self.binding_power_lookup
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
    /// Prefix handlers leave the binding power table alone, since several
    /// tokens (`-`, `*`, `not`) are both prefix and infix operators.
    pub fn nud(&mut self, kind: TokenKind, nud_fn: NUDHandler) {
        self.nud_lookup.insert(kind, nud_fn);
    }

    /// Registers a statement handler for a token.
    pub fn stmt(&mut self, kind: TokenKind, stmt_fn: StmtHandler) {
        self.stmt_lookup.insert(kind, stmt_fn);
    }

    /// Returns the start of the current token.
    pub fn get_position(&self) -> Position {
        self.current_token().span.start.clone()
    }

    /// Returns the end of the last significant token consumed.
    pub fn last_end(&self) -> Position {
        self.last_end.clone()
    }

    pub fn get_file(&self) -> &Arc<String> {
        &self.file
    }
}

fn new_parser(tokens: Vec<Token>, file: Arc<String>) -> Parser {
    let mut parser = Parser::new(tokens, file);
    create_token_lookups(&mut parser);
    parser
}

/// Parses a stream of tokens into an Abstract Syntax Tree.
///
/// This is the main entry point for parsing. It creates a parser instance,
/// initializes all lookup tables, and parses all statements until EOF.
///
/// # Returns
///
/// The module body as a `BlockStmt`, or the first syntax error.
pub fn parse(tokens: Vec<Token>, file: Arc<String>) -> Result<BlockStmt, Error> {
    let mut parser = new_parser(tokens, Arc::clone(&file));

    let mut body = vec![];
    while parser.has_tokens() {
        match parser.current_token_kind() {
            TokenKind::Newline => {
                parser.advance();
            }
            TokenKind::Indent => {
                return Err(Error::new(ErrorImpl::UnexpectedIndent, parser.get_position()))
            }
            _ => body.extend(parse_stmt(&mut parser)?),
        }
    }

    Ok(BlockStmt {
        body,
        span: Span {
            start: Position::new(0, 1, &file),
            end: parser.last_end(),
        },
    })
}

/// Parses standalone expression text, such as an annotation read back from
/// a type table. A top-level comma list yields a tuple.
pub fn parse_expression(source: &str, file: Option<String>) -> Result<ExprWrapper, Error> {
    let file = Arc::new(file.unwrap_or_else(|| String::from("<string>")));
    let tokens = tokenize(source.trim(), Some(file.to_string()))?;
    let mut parser = new_parser(tokens, file);

    let expression = parse_expr_list(&mut parser, BindingPower::Default)?;
    while parser.current_token_kind() == TokenKind::Newline {
        parser.advance();
    }
    if parser.has_tokens() {
        return Err(parser.unexpected());
    }

    Ok(expression)
}
