//! Turns a type expression into a `TypeDescriptor` by evaluating its names
//! against a frame's environment.

use crate::{
    ast::{
        ast::{Expr, ExprBase, ExprType, ExprWrapper},
        expressions::{
            AttributeExpr, BinaryExpr, Constant, ConstantExpr, NameExpr, SliceExpr, SubscriptExpr,
            TupleExpr,
        },
    },
    errors::errors::ResolveError,
    parser::parser::parse_expression,
    runtime::{
        builtins::BUILTINS,
        namespace::Namespace,
        types::{BuiltinType, TypeObject},
        value::Value,
    },
};

use super::descriptor::{Origin, TypeDescriptor};

/// The names visible at the point of use.
#[derive(Debug, Clone, Copy)]
pub struct Environment<'a> {
    pub locals: &'a Namespace,
    pub globals: &'a Namespace,
}

impl<'a> Environment<'a> {
    pub fn new(locals: &'a Namespace, globals: &'a Namespace) -> Self {
        Environment { locals, globals }
    }

    /// Locals, then globals, then builtins.
    pub fn lookup(&self, name: &str) -> Option<&'a Value> {
        self.locals
            .get(name)
            .or_else(|| self.globals.get(name))
            .or_else(|| BUILTINS.get(name))
    }
}

fn malformed(reason: String) -> ResolveError {
    ResolveError::Malformed { reason }
}

fn unsupported(reason: String) -> ResolveError {
    ResolveError::Unsupported { reason }
}

/// Resolves textual type expression such as `dict[str, list[int]]`.
pub fn resolve_type(type_expression: &str, env: &Environment) -> Result<TypeDescriptor, ResolveError> {
    let expression = parse_expression(type_expression, None).map_err(|error| {
        malformed(format!(
            "invalid syntax in `{}`: {}",
            type_expression,
            error.get_internal_error()
        ))
    })?;

    resolve_expr(&expression, env)
}

pub fn resolve_expr(expression: &ExprWrapper, env: &Environment) -> Result<TypeDescriptor, ResolveError> {
    match expression.get_expr_type() {
        ExprType::Name | ExprType::Attribute => {
            let value = evaluate(expression, env)?;
            descriptor_of(&value)
        }
        ExprType::Constant => match expression.downcast::<ConstantExpr>().map(|c| &c.value) {
            Some(Constant::None) => Ok(TypeDescriptor::Primitive(BuiltinType::NoneType.into())),
            // Forward reference
            Some(Constant::Str(text)) => resolve_type(text, env),
            _ => Err(malformed(format!("`{}` is not a type", expression.unparse()))),
        },
        ExprType::Subscript => match expression.downcast::<SubscriptExpr>() {
            Some(subscript) => resolve_subscript(subscript, env),
            None => Err(malformed(format!("`{}` is not a type", expression.unparse()))),
        },
        ExprType::Binary => match expression.downcast::<BinaryExpr>() {
            Some(binary) if binary.operator == "|" => {
                resolve_expr(&binary.left, env).or_else(keep_unresolved)?;
                resolve_expr(&binary.right, env).or_else(keep_unresolved)?;
                Err(unsupported(format!("union `{}`", expression.unparse())))
            }
            _ => Err(malformed(format!("`{}` is not a type", expression.unparse()))),
        },
        _ => Err(malformed(format!("`{}` is not a type", expression.unparse()))),
    }
}

/// Lets every error but `Unresolved` through as success, so that an
/// unknown name inside an unsupported type is still reported as unknown.
fn keep_unresolved(error: ResolveError) -> Result<TypeDescriptor, ResolveError> {
    match error {
        ResolveError::Unresolved { .. } => Err(error),
        _ => Ok(TypeDescriptor::Primitive(BuiltinType::Object.into())),
    }
}

/// Evaluates a dotted name such as `typing.List`.
fn evaluate(expression: &ExprWrapper, env: &Environment) -> Result<Value, ResolveError> {
    if let Some(name) = expression.downcast::<NameExpr>() {
        return env
            .lookup(&name.id)
            .cloned()
            .ok_or_else(|| ResolveError::Unresolved {
                name: name.id.clone(),
            });
    }

    if let Some(attribute) = expression.downcast::<AttributeExpr>() {
        let unresolved = || ResolveError::Unresolved {
            name: expression.unparse(),
        };
        return match evaluate(&attribute.value, env)? {
            Value::Module { namespace, .. } => namespace.get(&attribute.attr).cloned().ok_or_else(unresolved),
            _ => Err(unresolved()),
        };
    }

    Err(malformed(format!("`{}` is not a type", expression.unparse())))
}

fn resolve_subscript(subscript: &SubscriptExpr, env: &Environment) -> Result<TypeDescriptor, ResolveError> {
    let target = evaluate(&subscript.value, env)?;
    let arguments: Vec<&ExprWrapper> = match subscript.slice.downcast::<TupleExpr>() {
        Some(tuple) => tuple.elements.iter().collect(),
        None => vec![&subscript.slice],
    };

    let origin = match &target {
        Value::Type(TypeObject::Builtin(builtin)) => Origin::from_builtin(*builtin),
        Value::TypingForm(form) => Origin::from_typing(*form),
        _ => None,
    };

    if let Some(origin) = origin {
        let resolved = arguments
            .into_iter()
            .map(|argument| resolve_argument(argument, env))
            .collect::<Vec<_>>();
        // An unknown name anywhere wins over a bad sibling argument
        for argument in &resolved {
            argument.clone().or_else(keep_unresolved)?;
        }
        let args = resolved.into_iter().collect::<Result<Vec<_>, _>>()?;
        return Ok(TypeDescriptor::Generic { origin, args });
    }

    for argument in arguments {
        resolve_argument(argument, env).or_else(keep_unresolved)?;
    }

    match target {
        Value::Type(TypeObject::Builtin(builtin)) if builtin.is_subscriptable() => {
            Err(unsupported(format!("`{}[...]` is not checked", builtin.name())))
        }
        Value::TypingForm(form) => Err(unsupported(format!(
            "`typing.{}[...]` is not checked",
            form.name()
        ))),
        other => Err(malformed(format!(
            "`{}` is not subscriptable",
            other.type_repr()
        ))),
    }
}

fn resolve_argument(argument: &ExprWrapper, env: &Environment) -> Result<TypeDescriptor, ResolveError> {
    if argument.downcast::<SliceExpr>().is_some() {
        return Err(malformed(format!(
            "slice `{}` is not a type",
            argument.unparse()
        )));
    }
    resolve_expr(argument, env)
}

/// The descriptor of an already evaluated type value, e.g. a local bound
/// to `list[int]`. Strings are only forward references in source text, a
/// string value is not a type.
pub fn descriptor_of(value: &Value) -> Result<TypeDescriptor, ResolveError> {
    match value {
        Value::None => Ok(TypeDescriptor::Primitive(BuiltinType::NoneType.into())),
        Value::Type(class) => Ok(match class.as_builtin().and_then(Origin::from_builtin) {
            Some(origin) => TypeDescriptor::Unconstrained(origin),
            None => TypeDescriptor::Primitive(class.clone()),
        }),
        Value::TypingForm(form) => match (Origin::from_typing(*form), form.builtin()) {
            (Some(origin), _) => Ok(TypeDescriptor::Unconstrained(origin)),
            (None, Some(builtin)) => Ok(TypeDescriptor::Primitive(builtin.into())),
            (None, None) => Err(unsupported(format!("`typing.{}` is not checked", form.name()))),
        },
        Value::Alias { origin, args } => match origin.as_builtin().and_then(Origin::from_builtin) {
            Some(origin) => Ok(TypeDescriptor::Generic {
                origin,
                args: args
                    .iter()
                    .map(descriptor_of)
                    .collect::<Result<Vec<_>, _>>()?,
            }),
            None => Err(unsupported(format!("`{}` is not checked", value.type_repr()))),
        },
        other => Err(malformed(format!("{} is not a type", other))),
    }
}
