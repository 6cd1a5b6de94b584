//! Unit tests for the parser module.
//!
//! This module contains tests for parsing various language constructs including:
//! - Assignments, annotated assignments and augmented assignments
//! - Function and class definitions
//! - Expressions and operator precedence
//! - Control flow statements
//! - Canonical unparsing of annotations
//! - Syntax errors

use std::sync::Arc;

use super::parser::{parse, parse_expression};
use crate::{
    ast::{
        ast::{Expr, ExprBase, ExprType, StmtType},
        expressions::{BinaryExpr, ComprehensionExpr, SubscriptExpr, TupleExpr},
        statements::{
            AnnAssignStmt, AssignStmt, BlockStmt, ClassDefStmt, FunctionDefStmt, IfStmt,
            ImportStmt, ParameterKind, WithStmt,
        },
    },
    errors::errors::{Error, ErrorImpl},
    lexer::lexer::tokenize,
};

fn parse_source(source: &str) -> Result<BlockStmt, Error> {
    let tokens = tokenize(source, Some("test.py".to_string()))?;
    parse(tokens, Arc::new("test.py".to_string()))
}

fn unparse(source: &str) -> String {
    parse_expression(source, None).unwrap().unparse()
}

#[test]
fn test_parse_assignment() {
    let block = parse_source("x = 42\n").unwrap();

    assert_eq!(block.body.len(), 1);
    let assign = block.body[0].downcast::<AssignStmt>().unwrap();
    assert_eq!(assign.targets.len(), 1);
    assert_eq!(assign.targets[0].unparse(), "x");
    assert_eq!(assign.value.unparse(), "42");
}

#[test]
fn test_parse_chained_and_tuple_assignment() {
    let block = parse_source("a = b = 1\nc, *d = 1, 2, 3\n").unwrap();

    let chained = block.body[0].downcast::<AssignStmt>().unwrap();
    assert_eq!(chained.targets.len(), 2);

    let unpack = block.body[1].downcast::<AssignStmt>().unwrap();
    assert_eq!(unpack.targets[0].get_expr_type(), ExprType::Tuple);
    assert_eq!(unpack.value.unparse(), "(1, 2, 3)");
}

#[test]
fn test_parse_annotated_assignment() {
    let block = parse_source("x: list[int] = []\ny: dict[str, int]\n").unwrap();

    let first = block.body[0].downcast::<AnnAssignStmt>().unwrap();
    assert_eq!(first.target.unparse(), "x");
    assert_eq!(first.annotation.unparse(), "list[int]");
    assert!(first.value.is_some());

    let second = block.body[1].downcast::<AnnAssignStmt>().unwrap();
    assert_eq!(second.annotation.unparse(), "dict[str, int]");
    assert!(second.value.is_none());
}

#[test]
fn test_parse_augmented_assignment() {
    let block = parse_source("x += 5\n").unwrap();

    assert_eq!(block.body[0].get_stmt_type(), StmtType::AugAssign);
}

#[test]
fn test_parse_function_definition() {
    let source = "def add(a: int, b=2, /, c: str = 'x', *args: int, d, **kw) -> int:\n    return a + b\n";
    let block = parse_source(source).unwrap();

    let function = block.body[0].downcast::<FunctionDefStmt>().unwrap();
    assert_eq!(function.name, "add");
    assert!(!function.is_async);
    assert_eq!(function.returns.as_ref().unwrap().unparse(), "int");

    let names: Vec<&str> = function.parameters.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c", "args", "d", "kw"]);

    let kinds: Vec<ParameterKind> = function.parameters.iter().map(|p| p.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ParameterKind::PositionalOnly,
            ParameterKind::PositionalOnly,
            ParameterKind::Regular,
            ParameterKind::VarArgs,
            ParameterKind::KeywordOnly,
            ParameterKind::VarKeywords,
        ]
    );
    assert_eq!(function.parameters[0].annotation.as_ref().unwrap().unparse(), "int");
    assert!(function.parameters[1].annotation.is_none());
    assert_eq!(function.parameters[2].default.as_ref().unwrap().unparse(), "'x'");
}

#[test]
fn test_function_span_covers_body_only() {
    let source = "@decorator\ndef f():\n    x = 1\n\n    y = [\n        1,\n    ]\n\n# trailing\nz = 2\n";
    let block = parse_source(source).unwrap();

    let function = block.body[0].downcast::<FunctionDefStmt>().unwrap();
    assert_eq!(function.decorators.len(), 1);
    assert_eq!(function.span.start.line, 2);
    assert_eq!(function.span.end.line, 7);
    assert_eq!(block.body.len(), 2);
}

#[test]
fn test_parse_async_function() {
    let block = parse_source("async def f():\n    await g()\n").unwrap();

    let function = block.body[0].downcast::<FunctionDefStmt>().unwrap();
    assert!(function.is_async);
    assert_eq!(function.span.start.line, 1);
}

#[test]
fn test_parse_class_definition() {
    let block = parse_source("class Point(Base, metaclass=Meta):\n    x: int = 0\n    def f(self): pass\n").unwrap();

    let class = block.body[0].downcast::<ClassDefStmt>().unwrap();
    assert_eq!(class.name, "Point");
    assert_eq!(class.bases.len(), 2);
    assert_eq!(class.body.len(), 2);
    assert_eq!(class.body[1].get_stmt_type(), StmtType::FunctionDef);
}

#[test]
fn test_parse_if_elif_else() {
    let source = "if a:\n    pass\nelif b:\n    pass\nelse:\n    x = 1\n";
    let block = parse_source(source).unwrap();

    let statement = block.body[0].downcast::<IfStmt>().unwrap();
    assert_eq!(statement.orelse.len(), 1);
    let elif = statement.orelse[0].downcast::<IfStmt>().unwrap();
    assert_eq!(elif.test.unparse(), "b");
    assert_eq!(elif.orelse.len(), 1);
}

#[test]
fn test_parse_compound_statements() {
    let source = "\
for i, j in pairs:
    continue
else:
    pass
while x < 10:
    x += 1
try:
    pass
except (ValueError, KeyError) as error:
    raise
except* OSError:
    pass
else:
    pass
finally:
    pass
with open(a) as f, (b) as g:
    pass
with (open(a) as f, open(b) as g):
    pass
";
    let block = parse_source(source).unwrap();

    let kinds: Vec<StmtType> = block.body.iter().map(|stmt| stmt.get_stmt_type()).collect();
    assert_eq!(
        kinds,
        vec![
            StmtType::For,
            StmtType::While,
            StmtType::Try,
            StmtType::With,
            StmtType::With,
        ]
    );
    let with = block.body[4].downcast::<WithStmt>().unwrap();
    assert_eq!(with.items.len(), 2);
    assert_eq!(with.items[1].target.as_ref().unwrap().unparse(), "g");
}

#[test]
fn test_parse_simple_statements() {
    let source = "\
import os.path as p, sys
from ..pkg import (a as b, c,)
from . import d
global g; nonlocal n
del a[0], b.c
assert x, 'message'
return
";
    let block = parse_source(source).unwrap();

    assert_eq!(block.body.len(), 8);
    let import = block.body[0].downcast::<ImportStmt>().unwrap();
    assert_eq!(import.module, None);
    assert_eq!(
        import.names,
        vec![
            ("os.path".to_string(), Some("p".to_string())),
            ("sys".to_string(), None)
        ]
    );
    let from = block.body[1].downcast::<ImportStmt>().unwrap();
    assert_eq!(from.module.as_deref(), Some("..pkg"));
    assert_eq!(from.names.len(), 2);
    assert_eq!(block.body[3].get_stmt_type(), StmtType::Global);
    assert_eq!(block.body[4].get_stmt_type(), StmtType::Global);
    assert_eq!(block.body[7].get_stmt_type(), StmtType::Return);
}

#[test]
fn test_parse_one_line_suite() {
    let block = parse_source("if x: a = 1; b = 2\nc = 3\n").unwrap();

    let statement = block.body[0].downcast::<IfStmt>().unwrap();
    assert_eq!(statement.body.len(), 2);
    assert_eq!(block.body.len(), 2);
}

#[test]
fn test_operator_precedence() {
    let expression = parse_expression("a + b * c ** -d", None).unwrap();

    let sum = expression.downcast::<BinaryExpr>().unwrap();
    assert_eq!(sum.operator, "+");
    let product = sum.right.downcast::<BinaryExpr>().unwrap();
    assert_eq!(product.operator, "*");
    let power = product.right.downcast::<BinaryExpr>().unwrap();
    assert_eq!(power.operator, "**");
    assert_eq!(power.right.get_expr_type(), ExprType::Unary);
}

#[test]
fn test_comparison_and_logical_precedence() {
    let expression = parse_expression("not a in b and c is not d or e", None).unwrap();

    let or = expression.downcast::<BinaryExpr>().unwrap();
    assert_eq!(or.operator, "or");
    let and = or.left.downcast::<BinaryExpr>().unwrap();
    assert_eq!(and.operator, "and");
    assert_eq!(and.left.unparse(), "not a in b");
    assert_eq!(and.right.unparse(), "c is not d");
}

#[test]
fn test_parse_displays_and_comprehensions() {
    assert_eq!(unparse("[1, 2, 3]"), "[1, 2, 3]");
    assert_eq!(unparse("{1, 2}"), "{1, 2}");
    assert_eq!(unparse("{'a': 1, **rest}"), "{'a': 1, **rest}");
    assert_eq!(unparse("{}"), "{}");
    assert_eq!(unparse("()"), "()");
    assert_eq!(unparse("(1,)"), "(1,)");
    assert_eq!(unparse("[x * 2 for x in range(3) if x]"), "[x * 2 for x in range(3) if x]");
    assert_eq!(unparse("{k: v for k, v in items}"), "{k: v for (k, v) in items}");

    let generator = parse_expression("sum(x for x in y)", None).unwrap();
    assert_eq!(generator.children()[1].get_expr_type(), ExprType::Comprehension);
    let comprehension = generator.children()[1].downcast::<ComprehensionExpr>().unwrap();
    assert_eq!(comprehension.generators.len(), 1);
}

#[test]
fn test_parse_lambda_ternary_and_walrus() {
    assert_eq!(unparse("lambda x, y=1: x if y else None"), "lambda x, y=1: x if y else None");
    assert_eq!(unparse("(n := len(a))"), "(n := len(a))");
    assert_eq!(unparse("f(a, *b, key=c, **d)"), "f(a, *b, key=c, **d)");
}

#[test]
fn test_unparse_annotations() {
    assert_eq!(unparse("list[int]"), "list[int]");
    assert_eq!(unparse("dict[str, list[int]]"), "dict[str, list[int]]");
    assert_eq!(unparse("dict[int:int]"), "dict[int:int]");
    assert_eq!(unparse("typing.List[int]"), "typing.List[int]");
    assert_eq!(unparse("'list[int]'"), "'list[int]'");
    assert_eq!(unparse("a[::2]"), "a[::2]");
    assert_eq!(unparse("int | None"), "int | None");
}

#[test]
fn test_subscript_holds_tuple_index() {
    let expression = parse_expression("dict[str, int]", None).unwrap();

    let subscript = expression.downcast::<SubscriptExpr>().unwrap();
    let index = subscript.slice.downcast::<TupleExpr>().unwrap();
    assert_eq!(index.elements.len(), 2);
}

#[test]
fn test_parse_expression_trims_whitespace() {
    assert_eq!(unparse("  set[int]  "), "set[int]");
}

#[test]
fn test_parse_empty_program() {
    let block = parse_source("").unwrap();

    assert!(block.body.is_empty());
}

#[test]
fn test_parse_string_concatenation() {
    assert_eq!(unparse("'a' 'b'"), "'ab'");
}

#[test]
fn test_syntax_error_unexpected_token() {
    let error = parse_source("x = = 1\n").unwrap_err();

    assert_eq!(error.get_error_name(), "UnexpectedToken");
    assert_eq!(error.get_position().line, 1);
}

#[test]
fn test_syntax_error_invalid_target() {
    let error = parse_source("f() = 1\n").unwrap_err();

    assert_eq!(
        error.get_internal_error(),
        &ErrorImpl::InvalidTarget {
            target: "f()".to_string()
        }
    );
}

#[test]
fn test_syntax_error_expected_indented_block() {
    let error = parse_source("def f():\nreturn 1\n").unwrap_err();

    assert_eq!(error.get_internal_error(), &ErrorImpl::ExpectedIndentedBlock);
    assert_eq!(error.get_position().line, 2);
}

#[test]
fn test_syntax_error_unexpected_indent() {
    let error = parse_source("x = 1\n    y = 2\n").unwrap_err();

    assert_eq!(error.get_internal_error(), &ErrorImpl::UnexpectedIndent);
}

#[test]
fn test_syntax_error_trailing_tokens_in_expression() {
    assert!(parse_expression("list[int] x", None).is_err());
    assert!(parse_expression("list[int", None).is_err());
}
