//! Utility macros for pydytype.
//!
//! This module defines helper macros used throughout the front end:
//!
//! - `MK_TOKEN!` - Creates a Token instance
//! - `MK_DEFAULT_HANDLER!` - Creates a default lexer handler for simple tokens
//! - `MK_STMT_IMPL!` / `MK_EXPR_IMPL!` - Implement the AST node traits
//!
//! These macros reduce boilerplate in the lexer and AST implementations.

/// Creates a Token instance.
///
/// # Arguments
///
/// * `$kind` - The TokenKind
/// * `$value` - The token's string value
/// * `$span` - The source span
///
/// # Example
///
/// ```ignore
/// let token = MK_TOKEN!(TokenKind::Number, "42".to_string(), span);
/// ```
#[macro_export]
macro_rules! MK_TOKEN {
    ($kind:expr, $value:expr, $span:expr) => {
        Token {
            kind: $kind,
            value: $value,
            span: $span,
        }
    };
}

/// Creates a default lexer handler for simple single-token patterns.
///
/// Generates a handler function that creates a token with the given kind
/// and advances the lexer position by the token's length.
///
/// # Arguments
///
/// * `$kind` - The TokenKind to create
/// * `$value` - The literal string value (used for length calculation)
///
/// # Example
///
/// ```ignore
/// pattern("\\+", MK_DEFAULT_HANDLER!(TokenKind::Plus, "+"))
/// ```
#[macro_export]
macro_rules! MK_DEFAULT_HANDLER {
    ($kind:expr, $value:literal) => {
        |lexer: &mut Lexer, _regex: &Regex| -> Result<(), Error> {
            let start = lexer.position();
            lexer.advance_n($value.len());
            let end = lexer.position();
            lexer.push(MK_TOKEN!($kind, String::from($value), Span { start, end }));
            Ok(())
        }
    };
}

/// Implements the `Stmt` trait for a statement node with a `span` field.
///
/// # Example
///
/// ```ignore
/// MK_STMT_IMPL!(ReturnStmt, StmtType::Return);
/// ```
#[macro_export]
macro_rules! MK_STMT_IMPL {
    ($node:ty, $stmt_type:expr) => {
        impl Stmt for $node {
            fn get_stmt_type(&self) -> StmtType {
                $stmt_type
            }
            fn as_any(&self) -> &dyn Any {
                self
            }
            fn get_span(&self) -> &Span {
                &self.span
            }
        }
    };
}

/// Implements `ExprBase` for an expression node with a `span` field.
///
/// The node still implements `Expr` (`unparse` and `children`) by hand.
#[macro_export]
macro_rules! MK_EXPR_IMPL {
    ($node:ty, $expr_type:expr) => {
        impl ExprBase for $node {
            fn get_expr_type(&self) -> ExprType {
                $expr_type
            }
            fn as_any(&self) -> &dyn Any {
                self
            }
            fn get_span(&self) -> &Span {
                &self.span
            }
        }
    };
}
