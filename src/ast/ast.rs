use std::{any::Any, fmt::Debug, ops::Deref};

use crate::Span;

/// Statement Types
#[derive(PartialEq, Debug, Clone, Copy)]
pub enum StmtType {
    Block,
    Expression,
    FunctionDef,
    ClassDef,
    Assign,
    AnnAssign,
    AugAssign,
    Return,
    If,
    While,
    For,
    With,
    Try,
    Raise,
    Global,
    Delete,
    Assert,
    Import,
    Keyword,
}

/// Statement Trait
///
/// Defines the behavior of all statement types in the AST.
pub trait Stmt: Debug {
    /// Returns the type of the statement.
    fn get_stmt_type(&self) -> StmtType;
    /// Type conversion purposes - used with `.downcast_ref<T>()`
    fn as_any(&self) -> &dyn Any;
    /// Returns the span of the statement.
    fn get_span(&self) -> &Span;
}

/// Statement Wrapper
///
/// A wrapper that allows for any statement kind to be stored with helper methods
#[derive(Debug)]
pub struct StmtWrapper(Box<dyn Stmt>);

impl StmtWrapper {
    pub fn new<T: Stmt + 'static>(stmt: T) -> Self {
        StmtWrapper(Box::new(stmt))
    }

    /// Downcasts to a concrete statement node.
    pub fn downcast<T: 'static>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }
}

impl Deref for StmtWrapper {
    type Target = Box<dyn Stmt>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Expression Types
///
/// Defines the various kinds of expressions in the AST.
#[derive(PartialEq, Clone, Copy, Debug)]
pub enum ExprType {
    Name,
    Constant,
    Attribute,
    Subscript,
    Slice,
    Tuple,
    List,
    Set,
    Dict,
    Call,
    Keyword,
    Starred,
    Binary,
    Unary,
    Lambda,
    IfExp,
    Comprehension,
    NamedExpr,
    Await,
    Yield,
}

/// The bookkeeping half of an expression node; implemented with `MK_EXPR_IMPL!`.
pub trait ExprBase {
    /// Returns the expression type of the expression.
    fn get_expr_type(&self) -> ExprType;
    /// Type conversion purposes - used with `.downcast_ref<T>()`
    fn as_any(&self) -> &dyn Any;
    /// Returns the span of the expression.
    fn get_span(&self) -> &Span;
}

pub trait Expr: ExprBase + Debug {
    /// Renders the expression back to canonical source text.
    fn unparse(&self) -> String;
    /// Direct sub-expressions, in source order.
    fn children(&self) -> Vec<&ExprWrapper>;
}

/// Expression Wrapper
///
/// A wrapper that allows for any expression kind to be stored with helper methods
#[derive(Debug)]
pub struct ExprWrapper(Box<dyn Expr>);

impl ExprWrapper {
    pub fn new<T: Expr + 'static>(expression: T) -> Self {
        ExprWrapper(Box::new(expression))
    }

    /// Downcasts to a concrete expression node.
    pub fn downcast<T: 'static>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }
}

impl ExprBase for ExprWrapper {
    fn get_expr_type(&self) -> ExprType {
        self.0.get_expr_type()
    }
    fn as_any(&self) -> &dyn Any {
        self.0.as_any()
    }
    fn get_span(&self) -> &Span {
        self.0.get_span()
    }
}

impl Expr for ExprWrapper {
    fn unparse(&self) -> String {
        self.0.unparse()
    }
    fn children(&self) -> Vec<&ExprWrapper> {
        self.0.children()
    }
}
