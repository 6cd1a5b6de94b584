//! Evaluation of literal source text (`[1, 'a']`, `{1: {2.5}}`, `-3j`)
//! into runtime values.

use crate::{
    ast::{
        ast::{Expr, ExprWrapper},
        expressions::{
            BinaryExpr, CallExpr, Constant, ConstantExpr, DictExpr, ListExpr, NameExpr, SetExpr,
            TupleExpr, UnaryExpr,
        },
    },
    errors::errors::LiteralError,
    parser::parser::parse_expression,
};

use super::value::Value;

/// Evaluates a literal expression: numbers, strings, bytes, `None`,
/// booleans, lists, tuples, sets, dicts, `set()`, and signed or complex
/// number arithmetic such as `-1` and `1+2j`.
pub fn literal_eval(text: &str) -> Result<Value, LiteralError> {
    let expression = parse_expression(text, None)?;
    eval(&expression)
}

fn not_a_literal(expression: &ExprWrapper) -> LiteralError {
    LiteralError::NotALiteral {
        expression: expression.unparse(),
    }
}

fn eval(expression: &ExprWrapper) -> Result<Value, LiteralError> {
    if let Some(constant) = expression.downcast::<ConstantExpr>() {
        return eval_constant(&constant.value, expression);
    }
    if let Some(list) = expression.downcast::<ListExpr>() {
        return Ok(Value::List(eval_all(&list.elements)?));
    }
    if let Some(tuple) = expression.downcast::<TupleExpr>() {
        return Ok(Value::Tuple(eval_all(&tuple.elements)?));
    }
    if let Some(set) = expression.downcast::<SetExpr>() {
        let items = eval_all(&set.elements)?;
        ensure_hashable(&items)?;
        return Ok(Value::set(items));
    }
    if let Some(dict) = expression.downcast::<DictExpr>() {
        let mut entries = Vec::with_capacity(dict.entries.len());
        for (key, value) in &dict.entries {
            let Some(key) = key else {
                return Err(not_a_literal(expression));
            };
            let key = eval(key)?;
            ensure_hashable(std::slice::from_ref(&key))?;
            entries.push((key, eval(value)?));
        }
        return Ok(Value::dict(entries));
    }
    if let Some(call) = expression.downcast::<CallExpr>() {
        // `set()` is the only way to spell an empty set
        let is_set = call
            .callee
            .downcast::<NameExpr>()
            .is_some_and(|name| name.id == "set");
        if is_set && call.arguments.is_empty() {
            return Ok(Value::Set(vec![]));
        }
        return Err(not_a_literal(expression));
    }
    if let Some(unary) = expression.downcast::<UnaryExpr>() {
        return eval_unary(unary, expression);
    }
    if let Some(binary) = expression.downcast::<BinaryExpr>() {
        return eval_complex(binary, expression);
    }

    Err(not_a_literal(expression))
}

fn eval_all(expressions: &[ExprWrapper]) -> Result<Vec<Value>, LiteralError> {
    expressions.iter().map(eval).collect()
}

fn ensure_hashable(items: &[Value]) -> Result<(), LiteralError> {
    match items.iter().find(|item| !item.is_hashable()) {
        Some(item) => Err(LiteralError::Unhashable {
            type_name: item.type_of().name().to_string(),
        }),
        None => Ok(()),
    }
}

fn eval_constant(constant: &Constant, expression: &ExprWrapper) -> Result<Value, LiteralError> {
    match constant {
        Constant::None => Ok(Value::None),
        Constant::True => Ok(Value::Bool(true)),
        Constant::False => Ok(Value::Bool(false)),
        Constant::Number(literal) => parse_number(literal),
        Constant::Str(value) => Ok(Value::Str(value.clone())),
        Constant::Bytes(value) => value
            .chars()
            .map(|ch| u8::try_from(ch as u32).map_err(|_| not_a_literal(expression)))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Bytes),
        Constant::Ellipsis | Constant::FString(_) => Err(not_a_literal(expression)),
    }
}

/// Parses an integer, float or imaginary literal as written in source.
pub fn parse_number(literal: &str) -> Result<Value, LiteralError> {
    let invalid = || LiteralError::InvalidNumber {
        literal: literal.to_string(),
    };
    let cleaned = literal.replace('_', "").to_ascii_lowercase();

    for (prefix, radix) in [("0x", 16), ("0o", 8), ("0b", 2)] {
        if let Some(digits) = cleaned.strip_prefix(prefix) {
            return i64::from_str_radix(digits, radix)
                .map(Value::Int)
                .map_err(|_| invalid());
        }
    }

    if let Some(imaginary) = cleaned.strip_suffix('j') {
        return imaginary
            .parse::<f64>()
            .map(|imag| Value::Complex(0.0, imag))
            .map_err(|_| invalid());
    }

    if cleaned.contains(['.', 'e']) {
        return cleaned.parse::<f64>().map(Value::Float).map_err(|_| invalid());
    }

    // `0`, `00` are fine; `01` is not
    if cleaned.len() > 1 && cleaned.starts_with('0') && cleaned.chars().any(|ch| ch != '0') {
        return Err(invalid());
    }
    cleaned.parse::<i64>().map(Value::Int).map_err(|_| invalid())
}

fn eval_unary(unary: &UnaryExpr, expression: &ExprWrapper) -> Result<Value, LiteralError> {
    let operand = eval(&unary.operand)?;

    match (unary.operator.as_str(), operand) {
        ("+", value @ (Value::Int(_) | Value::Float(_) | Value::Complex(..))) => Ok(value),
        ("-", Value::Int(value)) => value
            .checked_neg()
            .map(Value::Int)
            .ok_or_else(|| not_a_literal(expression)),
        ("-", Value::Float(value)) => Ok(Value::Float(-value)),
        ("-", Value::Complex(real, imag)) => Ok(Value::Complex(-real, -imag)),
        _ => Err(not_a_literal(expression)),
    }
}

/// `real + imagj` and `real - imagj`
fn eval_complex(binary: &BinaryExpr, expression: &ExprWrapper) -> Result<Value, LiteralError> {
    let real = match eval(&binary.left)? {
        Value::Int(value) => value as f64,
        Value::Float(value) => value,
        _ => return Err(not_a_literal(expression)),
    };
    let Value::Complex(_, imag) = eval(&binary.right)? else {
        return Err(not_a_literal(expression));
    };

    match binary.operator.as_str() {
        "+" => Ok(Value::Complex(real, imag)),
        "-" => Ok(Value::Complex(real, -imag)),
        _ => Err(not_a_literal(expression)),
    }
}
