use std::any::Any;

use crate::{Span, MK_EXPR_IMPL};

use super::{
    ast::{Expr, ExprBase, ExprType, ExprWrapper},
    statements::Parameter,
};

fn join(expressions: &[ExprWrapper]) -> String {
    expressions
        .iter()
        .map(|expr| expr.unparse())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Quotes a string the way Python's `repr` does for simple strings.
pub fn quote(value: &str) -> String {
    let mut result = String::from("'");
    for ch in value.chars() {
        match ch {
            '\'' => result.push_str("\\'"),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\t' => result.push_str("\\t"),
            '\r' => result.push_str("\\r"),
            _ => result.push(ch),
        }
    }
    result.push('\'');
    result
}

#[derive(Debug)]
pub struct NameExpr {
    pub id: String,
    pub span: Span,
}

MK_EXPR_IMPL!(NameExpr, ExprType::Name);

impl Expr for NameExpr {
    fn unparse(&self) -> String {
        self.id.clone()
    }
    fn children(&self) -> Vec<&ExprWrapper> {
        vec![]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    None,
    True,
    False,
    Ellipsis,
    /// Number literal as written in source
    Number(String),
    Str(String),
    Bytes(String),
    FString(String),
}

#[derive(Debug)]
pub struct ConstantExpr {
    pub value: Constant,
    pub span: Span,
}

MK_EXPR_IMPL!(ConstantExpr, ExprType::Constant);

impl Expr for ConstantExpr {
    fn unparse(&self) -> String {
        match &self.value {
            Constant::None => String::from("None"),
            Constant::True => String::from("True"),
            Constant::False => String::from("False"),
            Constant::Ellipsis => String::from("..."),
            Constant::Number(number) => number.clone(),
            Constant::Str(value) => quote(value),
            Constant::Bytes(value) => format!("b{}", quote(value)),
            Constant::FString(value) => format!("f{}", quote(value)),
        }
    }
    fn children(&self) -> Vec<&ExprWrapper> {
        vec![]
    }
}

#[derive(Debug)]
pub struct AttributeExpr {
    pub value: ExprWrapper,
    pub attr: String,
    pub span: Span,
}

MK_EXPR_IMPL!(AttributeExpr, ExprType::Attribute);

impl Expr for AttributeExpr {
    fn unparse(&self) -> String {
        format!("{}.{}", self.value.unparse(), self.attr)
    }
    fn children(&self) -> Vec<&ExprWrapper> {
        vec![&self.value]
    }
}

#[derive(Debug)]
pub struct SubscriptExpr {
    pub value: ExprWrapper,
    pub slice: ExprWrapper,
    pub span: Span,
}

MK_EXPR_IMPL!(SubscriptExpr, ExprType::Subscript);

impl Expr for SubscriptExpr {
    fn unparse(&self) -> String {
        // `dict[str, int]`, not `dict[(str, int)]`
        let index = match self.slice.downcast::<TupleExpr>() {
            Some(tuple) if !tuple.elements.is_empty() => {
                let mut index = join(&tuple.elements);
                if tuple.elements.len() == 1 {
                    index.push(',');
                }
                index
            }
            _ => self.slice.unparse(),
        };
        format!("{}[{}]", self.value.unparse(), index)
    }
    fn children(&self) -> Vec<&ExprWrapper> {
        vec![&self.value, &self.slice]
    }
}

#[derive(Debug)]
pub struct SliceExpr {
    pub lower: Option<ExprWrapper>,
    pub upper: Option<ExprWrapper>,
    pub step: Option<ExprWrapper>,
    pub span: Span,
}

MK_EXPR_IMPL!(SliceExpr, ExprType::Slice);

impl Expr for SliceExpr {
    fn unparse(&self) -> String {
        let part = |expr: &Option<ExprWrapper>| expr.as_ref().map(|e| e.unparse()).unwrap_or_default();
        let mut result = format!("{}:{}", part(&self.lower), part(&self.upper));
        if self.step.is_some() {
            result.push(':');
            result.push_str(&part(&self.step));
        }
        result
    }
    fn children(&self) -> Vec<&ExprWrapper> {
        [&self.lower, &self.upper, &self.step]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[derive(Debug)]
pub struct TupleExpr {
    pub elements: Vec<ExprWrapper>,
    pub span: Span,
}

MK_EXPR_IMPL!(TupleExpr, ExprType::Tuple);

impl Expr for TupleExpr {
    fn unparse(&self) -> String {
        if self.elements.len() == 1 {
            format!("({},)", self.elements[0].unparse())
        } else {
            format!("({})", join(&self.elements))
        }
    }
    fn children(&self) -> Vec<&ExprWrapper> {
        self.elements.iter().collect()
    }
}

#[derive(Debug)]
pub struct ListExpr {
    pub elements: Vec<ExprWrapper>,
    pub span: Span,
}

MK_EXPR_IMPL!(ListExpr, ExprType::List);

impl Expr for ListExpr {
    fn unparse(&self) -> String {
        format!("[{}]", join(&self.elements))
    }
    fn children(&self) -> Vec<&ExprWrapper> {
        self.elements.iter().collect()
    }
}

#[derive(Debug)]
pub struct SetExpr {
    pub elements: Vec<ExprWrapper>,
    pub span: Span,
}

MK_EXPR_IMPL!(SetExpr, ExprType::Set);

impl Expr for SetExpr {
    fn unparse(&self) -> String {
        format!("{{{}}}", join(&self.elements))
    }
    fn children(&self) -> Vec<&ExprWrapper> {
        self.elements.iter().collect()
    }
}

/// `{k: v, **other}`; a `None` key marks a `**` unpacking.
#[derive(Debug)]
pub struct DictExpr {
    pub entries: Vec<(Option<ExprWrapper>, ExprWrapper)>,
    pub span: Span,
}

MK_EXPR_IMPL!(DictExpr, ExprType::Dict);

impl Expr for DictExpr {
    fn unparse(&self) -> String {
        let entries = self
            .entries
            .iter()
            .map(|(key, value)| match key {
                Some(key) => format!("{}: {}", key.unparse(), value.unparse()),
                None => format!("**{}", value.unparse()),
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!("{{{}}}", entries)
    }
    fn children(&self) -> Vec<&ExprWrapper> {
        self.entries
            .iter()
            .flat_map(|(key, value)| key.iter().chain(std::iter::once(value)))
            .collect()
    }
}

#[derive(Debug)]
pub struct CallExpr {
    pub callee: ExprWrapper,
    /// Positional, `StarredExpr` and `KeywordExpr` arguments in source order
    pub arguments: Vec<ExprWrapper>,
    pub span: Span,
}

MK_EXPR_IMPL!(CallExpr, ExprType::Call);

impl Expr for CallExpr {
    fn unparse(&self) -> String {
        format!("{}({})", self.callee.unparse(), join(&self.arguments))
    }
    fn children(&self) -> Vec<&ExprWrapper> {
        std::iter::once(&self.callee)
            .chain(self.arguments.iter())
            .collect()
    }
}

/// A call keyword argument; `name` is `None` for `**kwargs` unpacking.
#[derive(Debug)]
pub struct KeywordExpr {
    pub name: Option<String>,
    pub value: ExprWrapper,
    pub span: Span,
}

MK_EXPR_IMPL!(KeywordExpr, ExprType::Keyword);

impl Expr for KeywordExpr {
    fn unparse(&self) -> String {
        match &self.name {
            Some(name) => format!("{}={}", name, self.value.unparse()),
            None => format!("**{}", self.value.unparse()),
        }
    }
    fn children(&self) -> Vec<&ExprWrapper> {
        vec![&self.value]
    }
}

#[derive(Debug)]
pub struct StarredExpr {
    pub value: ExprWrapper,
    pub span: Span,
}

MK_EXPR_IMPL!(StarredExpr, ExprType::Starred);

impl Expr for StarredExpr {
    fn unparse(&self) -> String {
        format!("*{}", self.value.unparse())
    }
    fn children(&self) -> Vec<&ExprWrapper> {
        vec![&self.value]
    }
}

/// Binary arithmetic, boolean and comparison operations.
#[derive(Debug)]
pub struct BinaryExpr {
    pub left: ExprWrapper,
    pub operator: String,
    pub right: ExprWrapper,
    pub span: Span,
}

MK_EXPR_IMPL!(BinaryExpr, ExprType::Binary);

impl Expr for BinaryExpr {
    fn unparse(&self) -> String {
        format!("{} {} {}", self.left.unparse(), self.operator, self.right.unparse())
    }
    fn children(&self) -> Vec<&ExprWrapper> {
        vec![&self.left, &self.right]
    }
}

#[derive(Debug)]
pub struct UnaryExpr {
    pub operator: String,
    pub operand: ExprWrapper,
    pub span: Span,
}

MK_EXPR_IMPL!(UnaryExpr, ExprType::Unary);

impl Expr for UnaryExpr {
    fn unparse(&self) -> String {
        if self.operator == "not" {
            format!("not {}", self.operand.unparse())
        } else {
            format!("{}{}", self.operator, self.operand.unparse())
        }
    }
    fn children(&self) -> Vec<&ExprWrapper> {
        vec![&self.operand]
    }
}

#[derive(Debug)]
pub struct LambdaExpr {
    pub parameters: Vec<Parameter>,
    pub body: ExprWrapper,
    pub span: Span,
}

MK_EXPR_IMPL!(LambdaExpr, ExprType::Lambda);

impl Expr for LambdaExpr {
    fn unparse(&self) -> String {
        let parameters = self
            .parameters
            .iter()
            .map(|parameter| parameter.unparse())
            .collect::<Vec<_>>()
            .join(", ");
        if parameters.is_empty() {
            format!("lambda: {}", self.body.unparse())
        } else {
            format!("lambda {}: {}", parameters, self.body.unparse())
        }
    }
    fn children(&self) -> Vec<&ExprWrapper> {
        self.parameters
            .iter()
            .filter_map(|parameter| parameter.default.as_ref())
            .chain(std::iter::once(&self.body))
            .collect()
    }
}

/// `body if test else orelse`
#[derive(Debug)]
pub struct IfExpr {
    pub test: ExprWrapper,
    pub body: ExprWrapper,
    pub orelse: ExprWrapper,
    pub span: Span,
}

MK_EXPR_IMPL!(IfExpr, ExprType::IfExp);

impl Expr for IfExpr {
    fn unparse(&self) -> String {
        format!(
            "{} if {} else {}",
            self.body.unparse(),
            self.test.unparse(),
            self.orelse.unparse()
        )
    }
    fn children(&self) -> Vec<&ExprWrapper> {
        vec![&self.test, &self.body, &self.orelse]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ComprehensionKind {
    List,
    Set,
    Dict,
    Generator,
}

/// One `for target in iter if cond` clause.
#[derive(Debug)]
pub struct Comprehension {
    pub target: ExprWrapper,
    pub iter: ExprWrapper,
    pub ifs: Vec<ExprWrapper>,
    pub is_async: bool,
}

#[derive(Debug)]
pub struct ComprehensionExpr {
    pub kind: ComprehensionKind,
    pub element: ExprWrapper,
    /// Value expression of a dict comprehension
    pub value: Option<ExprWrapper>,
    pub generators: Vec<Comprehension>,
    pub span: Span,
}

MK_EXPR_IMPL!(ComprehensionExpr, ExprType::Comprehension);

impl Expr for ComprehensionExpr {
    fn unparse(&self) -> String {
        let mut inner = match &self.value {
            Some(value) => format!("{}: {}", self.element.unparse(), value.unparse()),
            None => self.element.unparse(),
        };
        for generator in &self.generators {
            if generator.is_async {
                inner.push_str(" async");
            }
            inner.push_str(&format!(
                " for {} in {}",
                generator.target.unparse(),
                generator.iter.unparse()
            ));
            for condition in &generator.ifs {
                inner.push_str(&format!(" if {}", condition.unparse()));
            }
        }
        match self.kind {
            ComprehensionKind::List => format!("[{}]", inner),
            ComprehensionKind::Set | ComprehensionKind::Dict => format!("{{{}}}", inner),
            ComprehensionKind::Generator => format!("({})", inner),
        }
    }
    fn children(&self) -> Vec<&ExprWrapper> {
        let mut children = vec![&self.element];
        children.extend(self.value.iter());
        for generator in &self.generators {
            children.push(&generator.target);
            children.push(&generator.iter);
            children.extend(generator.ifs.iter());
        }
        children
    }
}

/// `target := value`
#[derive(Debug)]
pub struct NamedExpr {
    pub target: ExprWrapper,
    pub value: ExprWrapper,
    pub span: Span,
}

MK_EXPR_IMPL!(NamedExpr, ExprType::NamedExpr);

impl Expr for NamedExpr {
    fn unparse(&self) -> String {
        format!("({} := {})", self.target.unparse(), self.value.unparse())
    }
    fn children(&self) -> Vec<&ExprWrapper> {
        vec![&self.target, &self.value]
    }
}

#[derive(Debug)]
pub struct AwaitExpr {
    pub value: ExprWrapper,
    pub span: Span,
}

MK_EXPR_IMPL!(AwaitExpr, ExprType::Await);

impl Expr for AwaitExpr {
    fn unparse(&self) -> String {
        format!("await {}", self.value.unparse())
    }
    fn children(&self) -> Vec<&ExprWrapper> {
        vec![&self.value]
    }
}

#[derive(Debug)]
pub struct YieldExpr {
    pub value: Option<ExprWrapper>,
    pub is_from: bool,
    pub span: Span,
}

MK_EXPR_IMPL!(YieldExpr, ExprType::Yield);

impl Expr for YieldExpr {
    fn unparse(&self) -> String {
        match (&self.value, self.is_from) {
            (Some(value), true) => format!("(yield from {})", value.unparse()),
            (Some(value), false) => format!("(yield {})", value.unparse()),
            (None, _) => String::from("(yield)"),
        }
    }
    fn children(&self) -> Vec<&ExprWrapper> {
        self.value.iter().collect()
    }
}
