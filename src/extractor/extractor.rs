//! Walks a parsed module and records, per scope, which names are declared
//! with which type expressions.
//!
//! Function bodies (`def` and `async def`) open scopes; class bodies do not,
//! so class-level assignments land in the enclosing scope. Only simple name
//! targets are recorded. Attribute and subscript targets, tuple unpacking,
//! `for` targets, `with ... as` targets, augmented assignments, walrus
//! targets and `global`/`nonlocal` declarations are walked but not recorded.

use std::{fs, path::Path, sync::Arc};

use log::debug;

use crate::{
    ast::{
        ast::{Expr, ExprWrapper, StmtType, StmtWrapper},
        expressions::{LambdaExpr, NameExpr},
        statements::{
            AnnAssignStmt, AssertStmt, AssignStmt, AugAssignStmt, BlockStmt, ClassDefStmt,
            DeleteStmt, ExpressionStmt, ForStmt, FunctionDefStmt, IfStmt, Parameter, RaiseStmt,
            ReturnStmt, TryStmt, WhileStmt, WithStmt,
        },
    },
    errors::errors::{Error, ErrorImpl},
    lexer::lexer::tokenize,
    parser::parser::parse,
    scope::{
        scope::{Scope, ScopeStack},
        table::{flatten, LineTypeTable},
    },
    Position,
};

pub struct AnnotationExtractor {
    scopes: ScopeStack,
}

impl AnnotationExtractor {
    /// Starts with a module scope covering lines `1..=line_end`.
    pub fn new(line_end: u32) -> Self {
        AnnotationExtractor {
            scopes: ScopeStack::new(Scope::new(1, line_end)),
        }
    }

    pub fn visit_stmts(&mut self, statements: &[StmtWrapper]) {
        for statement in statements {
            self.visit_stmt(statement);
        }
    }

    pub fn visit_stmt(&mut self, statement: &StmtWrapper) {
        let line = statement.get_span().start.line;

        match statement.get_stmt_type() {
            StmtType::Block => {
                if let Some(block) = statement.downcast::<BlockStmt>() {
                    self.visit_stmts(&block.body);
                }
            }
            StmtType::Expression => {
                if let Some(expression) = statement.downcast::<ExpressionStmt>() {
                    self.visit_expr(&expression.expression);
                }
            }
            StmtType::FunctionDef => {
                if let Some(function) = statement.downcast::<FunctionDefStmt>() {
                    self.visit_function(function);
                }
            }
            StmtType::ClassDef => {
                if let Some(class) = statement.downcast::<ClassDefStmt>() {
                    self.visit_exprs(&class.decorators);
                    self.visit_exprs(&class.bases);
                    self.visit_stmts(&class.body);
                }
            }
            StmtType::Assign => {
                if let Some(assign) = statement.downcast::<AssignStmt>() {
                    for target in &assign.targets {
                        if let Some(name) = target.downcast::<NameExpr>() {
                            self.scopes.current().add_type(&name.id, None, Some(line));
                        }
                        self.visit_expr(target);
                    }
                    self.visit_expr(&assign.value);
                }
            }
            StmtType::AnnAssign => {
                if let Some(assign) = statement.downcast::<AnnAssignStmt>() {
                    if let Some(name) = assign.target.downcast::<NameExpr>() {
                        let type_expression = assign.annotation.unparse();
                        self.scopes
                            .current()
                            .add_type(&name.id, Some(type_expression), Some(line));
                    }
                    self.visit_expr(&assign.target);
                    self.visit_expr(&assign.annotation);
                    self.visit_optional(&assign.value);
                }
            }
            StmtType::AugAssign => {
                if let Some(assign) = statement.downcast::<AugAssignStmt>() {
                    self.visit_expr(&assign.target);
                    self.visit_expr(&assign.value);
                }
            }
            StmtType::Return => {
                if let Some(ret) = statement.downcast::<ReturnStmt>() {
                    self.visit_optional(&ret.value);
                }
            }
            StmtType::If => {
                if let Some(branch) = statement.downcast::<IfStmt>() {
                    self.visit_expr(&branch.test);
                    self.visit_stmts(&branch.body);
                    self.visit_stmts(&branch.orelse);
                }
            }
            StmtType::While => {
                if let Some(lp) = statement.downcast::<WhileStmt>() {
                    self.visit_expr(&lp.test);
                    self.visit_stmts(&lp.body);
                    self.visit_stmts(&lp.orelse);
                }
            }
            StmtType::For => {
                if let Some(lp) = statement.downcast::<ForStmt>() {
                    self.visit_expr(&lp.target);
                    self.visit_expr(&lp.iter);
                    self.visit_stmts(&lp.body);
                    self.visit_stmts(&lp.orelse);
                }
            }
            StmtType::With => {
                if let Some(with) = statement.downcast::<WithStmt>() {
                    for item in &with.items {
                        self.visit_expr(&item.context);
                        self.visit_optional(&item.target);
                    }
                    self.visit_stmts(&with.body);
                }
            }
            StmtType::Try => {
                if let Some(attempt) = statement.downcast::<TryStmt>() {
                    self.visit_stmts(&attempt.body);
                    for handler in &attempt.handlers {
                        self.visit_optional(&handler.kind);
                        self.visit_stmts(&handler.body);
                    }
                    self.visit_stmts(&attempt.orelse);
                    self.visit_stmts(&attempt.finalbody);
                }
            }
            StmtType::Raise => {
                if let Some(raise) = statement.downcast::<RaiseStmt>() {
                    self.visit_optional(&raise.exception);
                    self.visit_optional(&raise.cause);
                }
            }
            StmtType::Delete => {
                if let Some(delete) = statement.downcast::<DeleteStmt>() {
                    self.visit_exprs(&delete.targets);
                }
            }
            StmtType::Assert => {
                if let Some(assert) = statement.downcast::<AssertStmt>() {
                    self.visit_expr(&assert.test);
                    self.visit_optional(&assert.message);
                }
            }
            StmtType::Global | StmtType::Import | StmtType::Keyword => {}
        }
    }

    /// Decorators, defaults and annotations belong to the enclosing scope;
    /// parameters and the body belong to the function's own scope.
    fn visit_function(&mut self, function: &FunctionDefStmt) {
        self.visit_exprs(&function.decorators);
        for parameter in &function.parameters {
            self.visit_optional(&parameter.annotation);
            self.visit_optional(&parameter.default);
        }
        self.visit_optional(&function.returns);

        self.scopes
            .push(function.span.start.line, function.span.end.line);
        self.record_parameters(&function.parameters, true);
        self.visit_stmts(&function.body);
        self.scopes.pop();
    }

    /// Parameters apply from the first line of the current scope.
    fn record_parameters(&mut self, parameters: &[Parameter], annotated: bool) {
        for parameter in parameters {
            let type_expression = if annotated {
                parameter.annotation.as_ref().map(|annotation| annotation.unparse())
            } else {
                None
            };
            self.scopes
                .current()
                .add_type(&parameter.name, type_expression, None);
        }
    }

    pub fn visit_expr(&mut self, expression: &ExprWrapper) {
        if let Some(lambda) = expression.downcast::<LambdaExpr>() {
            self.record_parameters(&lambda.parameters, false);
        }
        for child in expression.children() {
            self.visit_expr(child);
        }
    }

    fn visit_exprs(&mut self, expressions: &[ExprWrapper]) {
        for expression in expressions {
            self.visit_expr(expression);
        }
    }

    fn visit_optional(&mut self, expression: &Option<ExprWrapper>) {
        if let Some(expression) = expression {
            self.visit_expr(expression);
        }
    }

    /// Closes any scope still open and returns the module scope.
    pub fn finish(self) -> Scope {
        self.scopes.finish()
    }
}

/// Builds the scope tree of a parsed module.
pub fn extract(module: &BlockStmt, line_end: u32) -> Scope {
    let mut extractor = AnnotationExtractor::new(line_end);
    extractor.visit_stmts(&module.body);
    extractor.finish()
}

/// Extracts the line type table from source text.
pub fn parse_source(source: &str, file: &str) -> Result<LineTypeTable, Error> {
    let tokens = tokenize(source, Some(file.to_string()))?;
    let module = parse(tokens, Arc::new(file.to_string()))?;

    let line_end = source.lines().count() as u32;
    let root = extract(&module, line_end);
    debug!(
        "{}: {} lines, {} function scope(s)",
        file,
        line_end,
        root.children.len()
    );

    Ok(flatten(&root))
}

/// Extracts the line type table from a file on disk.
pub fn parse_module(path: impl AsRef<Path>) -> Result<LineTypeTable, Error> {
    let path = path.as_ref();
    let file = path.to_string_lossy().to_string();

    let source = fs::read_to_string(path).map_err(|error| {
        Error::new(
            ErrorImpl::FileReadError {
                path: file.clone(),
                message: error.to_string(),
            },
            Position::new(0, 0, &Arc::new(file.clone())),
        )
    })?;

    parse_source(&source, &file)
}
