use std::any::Any;

use crate::{Span, MK_STMT_IMPL};

use super::ast::{Expr, ExprWrapper, Stmt, StmtType, StmtWrapper};

/// How a parameter binds its argument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParameterKind {
    PositionalOnly,
    Regular,
    /// `*args`
    VarArgs,
    KeywordOnly,
    /// `**kwargs`
    VarKeywords,
}

/// A function or lambda parameter.
#[derive(Debug)]
pub struct Parameter {
    pub name: String,
    pub annotation: Option<ExprWrapper>,
    pub default: Option<ExprWrapper>,
    pub kind: ParameterKind,
    pub span: Span,
}

impl Parameter {
    pub fn unparse(&self) -> String {
        let prefix = match self.kind {
            ParameterKind::VarArgs => "*",
            ParameterKind::VarKeywords => "**",
            _ => "",
        };
        let mut result = format!("{}{}", prefix, self.name);
        if let Some(annotation) = &self.annotation {
            result.push_str(&format!(": {}", annotation.unparse()));
        }
        if let Some(default) = &self.default {
            if self.annotation.is_some() {
                result.push_str(&format!(" = {}", default.unparse()));
            } else {
                result.push_str(&format!("={}", default.unparse()));
            }
        }
        result
    }
}

/// The module body, and any indented suite.
#[derive(Debug)]
pub struct BlockStmt {
    pub body: Vec<StmtWrapper>,
    pub span: Span,
}

MK_STMT_IMPL!(BlockStmt, StmtType::Block);

#[derive(Debug)]
pub struct ExpressionStmt {
    pub expression: ExprWrapper,
    pub span: Span,
}

MK_STMT_IMPL!(ExpressionStmt, StmtType::Expression);

/// `def` and `async def`.
///
/// The span runs from the `def` keyword (decorators excluded) to the end of
/// the last body statement.
#[derive(Debug)]
pub struct FunctionDefStmt {
    pub name: String,
    pub decorators: Vec<ExprWrapper>,
    pub parameters: Vec<Parameter>,
    pub returns: Option<ExprWrapper>,
    pub body: Vec<StmtWrapper>,
    pub is_async: bool,
    pub span: Span,
}

MK_STMT_IMPL!(FunctionDefStmt, StmtType::FunctionDef);

#[derive(Debug)]
pub struct ClassDefStmt {
    pub name: String,
    pub decorators: Vec<ExprWrapper>,
    pub bases: Vec<ExprWrapper>,
    pub body: Vec<StmtWrapper>,
    pub span: Span,
}

MK_STMT_IMPL!(ClassDefStmt, StmtType::ClassDef);

/// `a = b = value`
#[derive(Debug)]
pub struct AssignStmt {
    pub targets: Vec<ExprWrapper>,
    pub value: ExprWrapper,
    pub span: Span,
}

MK_STMT_IMPL!(AssignStmt, StmtType::Assign);

/// `target: annotation [= value]`
#[derive(Debug)]
pub struct AnnAssignStmt {
    pub target: ExprWrapper,
    pub annotation: ExprWrapper,
    pub value: Option<ExprWrapper>,
    pub span: Span,
}

MK_STMT_IMPL!(AnnAssignStmt, StmtType::AnnAssign);

#[derive(Debug)]
pub struct AugAssignStmt {
    pub target: ExprWrapper,
    pub operator: String,
    pub value: ExprWrapper,
    pub span: Span,
}

MK_STMT_IMPL!(AugAssignStmt, StmtType::AugAssign);

#[derive(Debug)]
pub struct ReturnStmt {
    pub value: Option<ExprWrapper>,
    pub span: Span,
}

MK_STMT_IMPL!(ReturnStmt, StmtType::Return);

/// `if`; `elif` chains nest as a single `IfStmt` in `orelse`.
#[derive(Debug)]
pub struct IfStmt {
    pub test: ExprWrapper,
    pub body: Vec<StmtWrapper>,
    pub orelse: Vec<StmtWrapper>,
    pub span: Span,
}

MK_STMT_IMPL!(IfStmt, StmtType::If);

#[derive(Debug)]
pub struct WhileStmt {
    pub test: ExprWrapper,
    pub body: Vec<StmtWrapper>,
    pub orelse: Vec<StmtWrapper>,
    pub span: Span,
}

MK_STMT_IMPL!(WhileStmt, StmtType::While);

#[derive(Debug)]
pub struct ForStmt {
    pub target: ExprWrapper,
    pub iter: ExprWrapper,
    pub body: Vec<StmtWrapper>,
    pub orelse: Vec<StmtWrapper>,
    pub is_async: bool,
    pub span: Span,
}

MK_STMT_IMPL!(ForStmt, StmtType::For);

#[derive(Debug)]
pub struct WithItem {
    pub context: ExprWrapper,
    pub target: Option<ExprWrapper>,
}

#[derive(Debug)]
pub struct WithStmt {
    pub items: Vec<WithItem>,
    pub body: Vec<StmtWrapper>,
    pub is_async: bool,
    pub span: Span,
}

MK_STMT_IMPL!(WithStmt, StmtType::With);

#[derive(Debug)]
pub struct ExceptHandler {
    pub kind: Option<ExprWrapper>,
    pub name: Option<String>,
    pub body: Vec<StmtWrapper>,
}

#[derive(Debug)]
pub struct TryStmt {
    pub body: Vec<StmtWrapper>,
    pub handlers: Vec<ExceptHandler>,
    pub orelse: Vec<StmtWrapper>,
    pub finalbody: Vec<StmtWrapper>,
    pub span: Span,
}

MK_STMT_IMPL!(TryStmt, StmtType::Try);

#[derive(Debug)]
pub struct RaiseStmt {
    pub exception: Option<ExprWrapper>,
    pub cause: Option<ExprWrapper>,
    pub span: Span,
}

MK_STMT_IMPL!(RaiseStmt, StmtType::Raise);

/// `global` and `nonlocal` declarations.
#[derive(Debug)]
pub struct GlobalStmt {
    pub names: Vec<String>,
    pub is_nonlocal: bool,
    pub span: Span,
}

MK_STMT_IMPL!(GlobalStmt, StmtType::Global);

#[derive(Debug)]
pub struct DeleteStmt {
    pub targets: Vec<ExprWrapper>,
    pub span: Span,
}

MK_STMT_IMPL!(DeleteStmt, StmtType::Delete);

#[derive(Debug)]
pub struct AssertStmt {
    pub test: ExprWrapper,
    pub message: Option<ExprWrapper>,
    pub span: Span,
}

MK_STMT_IMPL!(AssertStmt, StmtType::Assert);

/// `import a.b as c` and `from .m import x as y`.
#[derive(Debug)]
pub struct ImportStmt {
    /// `Some` for `from` imports, holding the dotted module (with any leading dots)
    pub module: Option<String>,
    /// `(name, alias)`; `*` for star imports
    pub names: Vec<(String, Option<String>)>,
    pub span: Span,
}

MK_STMT_IMPL!(ImportStmt, StmtType::Import);

/// `pass`, `break` and `continue`.
#[derive(Debug)]
pub struct KeywordStmt {
    pub keyword: String,
    pub span: Span,
}

MK_STMT_IMPL!(KeywordStmt, StmtType::Keyword);
