use std::{fmt::Display, sync::Arc};

use super::{
    namespace::Namespace,
    types::{BuiltinType, TypeObject},
};

/// Special forms exported by the `typing` module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingForm {
    List,
    Set,
    Dict,
    FrozenSet,
    Tuple,
    Optional,
    Union,
    Any,
    Callable,
}

impl TypingForm {
    pub fn name(&self) -> &'static str {
        match self {
            TypingForm::List => "List",
            TypingForm::Set => "Set",
            TypingForm::Dict => "Dict",
            TypingForm::FrozenSet => "FrozenSet",
            TypingForm::Tuple => "Tuple",
            TypingForm::Optional => "Optional",
            TypingForm::Union => "Union",
            TypingForm::Any => "Any",
            TypingForm::Callable => "Callable",
        }
    }

    /// The built-in class the form stands for, if it is a plain alias of one.
    pub fn builtin(&self) -> Option<BuiltinType> {
        match self {
            TypingForm::List => Some(BuiltinType::List),
            TypingForm::Set => Some(BuiltinType::Set),
            TypingForm::Dict => Some(BuiltinType::Dict),
            TypingForm::FrozenSet => Some(BuiltinType::FrozenSet),
            TypingForm::Tuple => Some(BuiltinType::Tuple),
            _ => None,
        }
    }
}

/// A snapshot of a runtime value as reported by the instrumented program.
#[derive(Debug, Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Complex(f64, f64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    Set(Vec<Value>),
    FrozenSet(Vec<Value>),
    /// Entries in insertion order
    Dict(Vec<(Value, Value)>),
    Slice(Box<Value>, Box<Value>, Box<Value>),
    /// An instance of a user class. Subclasses of built-in containers carry
    /// their contents as `payload`.
    Object {
        class: TypeObject,
        payload: Option<Box<Value>>,
    },
    /// A class object, e.g. `int` or a user class.
    Type(TypeObject),
    /// A parameterized generic such as `list[int]`.
    Alias {
        origin: TypeObject,
        args: Vec<Value>,
    },
    TypingForm(TypingForm),
    Module {
        name: String,
        namespace: Arc<Namespace>,
    },
    Function(String),
}

impl Value {
    pub fn str(value: &str) -> Self {
        Value::Str(value.to_string())
    }

    /// Builds a set, dropping duplicates the way a set display does.
    pub fn set(items: Vec<Value>) -> Self {
        Value::Set(dedupe(items))
    }

    pub fn frozenset(items: Vec<Value>) -> Self {
        Value::FrozenSet(dedupe(items))
    }

    /// Builds a dict; a repeated key keeps its first position and its last value.
    pub fn dict(entries: Vec<(Value, Value)>) -> Self {
        let mut result: Vec<(Value, Value)> = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            match result.iter_mut().find(|(existing, _)| existing.py_eq(&key)) {
                Some(entry) => entry.1 = value,
                None => result.push((key, value)),
            }
        }
        Value::Dict(result)
    }

    pub fn instance(class: &TypeObject, payload: Option<Value>) -> Self {
        Value::Object {
            class: class.clone(),
            payload: payload.map(Box::new),
        }
    }

    pub fn builtin_type(builtin: BuiltinType) -> Self {
        Value::Type(TypeObject::Builtin(builtin))
    }

    /// `type(value)`
    pub fn type_of(&self) -> TypeObject {
        let builtin = match self {
            Value::None => BuiltinType::NoneType,
            Value::Bool(_) => BuiltinType::Bool,
            Value::Int(_) => BuiltinType::Int,
            Value::Float(_) => BuiltinType::Float,
            Value::Complex(..) => BuiltinType::Complex,
            Value::Str(_) => BuiltinType::Str,
            Value::Bytes(_) => BuiltinType::Bytes,
            Value::List(_) => BuiltinType::List,
            Value::Tuple(_) => BuiltinType::Tuple,
            Value::Set(_) => BuiltinType::Set,
            Value::FrozenSet(_) => BuiltinType::FrozenSet,
            Value::Dict(_) => BuiltinType::Dict,
            Value::Slice(..) => BuiltinType::Slice,
            Value::Object { class, .. } => return class.clone(),
            Value::Type(_) => BuiltinType::Type,
            Value::Alias { .. } => BuiltinType::GenericAlias,
            Value::TypingForm(_) => BuiltinType::SpecialForm,
            Value::Module { .. } => BuiltinType::Module,
            Value::Function(_) => BuiltinType::Function,
        };
        TypeObject::Builtin(builtin)
    }

    /// `isinstance(value, class)`
    pub fn is_instance(&self, class: &TypeObject) -> bool {
        self.type_of().is_subtype(class)
    }

    /// Elements of an ordered sequence container.
    pub fn as_list_like(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            Value::Object {
                payload: Some(payload),
                ..
            } => payload.as_list_like(),
            _ => None,
        }
    }

    /// Elements of an unordered unique container; `frozenset` included.
    pub fn as_set_like(&self) -> Option<&[Value]> {
        match self {
            Value::Set(items) | Value::FrozenSet(items) => Some(items),
            Value::Object {
                payload: Some(payload),
                ..
            } => payload.as_set_like(),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&[(Value, Value)]> {
        match self {
            Value::Dict(entries) => Some(entries),
            Value::Object {
                payload: Some(payload),
                ..
            } => payload.as_mapping(),
            _ => None,
        }
    }

    fn as_complex(&self) -> Option<(f64, f64)> {
        match self {
            Value::Bool(value) => Some((*value as i64 as f64, 0.0)),
            Value::Int(value) => Some((*value as f64, 0.0)),
            Value::Float(value) => Some((*value, 0.0)),
            Value::Complex(real, imag) => Some((*real, *imag)),
            _ => None,
        }
    }

    /// Python `==`: numbers compare across `bool`/`int`/`float`/`complex`,
    /// `set` equals `frozenset`, dicts ignore order.
    pub fn py_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => return a == b,
            (Value::Bool(a), Value::Bool(b)) => return a == b,
            _ => {}
        }
        if let (Some(a), Some(b)) = (self.as_complex(), other.as_complex()) {
            return a == b;
        }

        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::List(a), Value::List(b)) | (Value::Tuple(a), Value::Tuple(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(a, b)| a.py_eq(b))
            }
            (
                Value::Set(a) | Value::FrozenSet(a),
                Value::Set(b) | Value::FrozenSet(b),
            ) => a.len() == b.len() && a.iter().all(|item| b.iter().any(|other| item.py_eq(other))),
            (Value::Dict(a), Value::Dict(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(key, value)| {
                        b.iter()
                            .any(|(other_key, other_value)| key.py_eq(other_key) && value.py_eq(other_value))
                    })
            }
            (Value::Slice(a1, a2, a3), Value::Slice(b1, b2, b3)) => {
                a1.py_eq(b1) && a2.py_eq(b2) && a3.py_eq(b3)
            }
            (
                Value::Object {
                    class: a_class,
                    payload: a_payload,
                },
                Value::Object {
                    class: b_class,
                    payload: b_payload,
                },
            ) => {
                a_class == b_class
                    && match (a_payload, b_payload) {
                        (Some(a), Some(b)) => a.py_eq(b),
                        (None, None) => true,
                        _ => false,
                    }
            }
            (Value::Type(a), Value::Type(b)) => a == b,
            (
                Value::Alias { origin: a, args: a_args },
                Value::Alias { origin: b, args: b_args },
            ) => {
                a == b
                    && a_args.len() == b_args.len()
                    && a_args.iter().zip(b_args).all(|(a, b)| a.py_eq(b))
            }
            (Value::TypingForm(a), Value::TypingForm(b)) => a == b,
            (Value::Module { name: a, .. }, Value::Module { name: b, .. }) => a == b,
            (Value::Function(a), Value::Function(b)) => a == b,
            _ => false,
        }
    }

    /// Whether the value may be a set element or dict key.
    pub fn is_hashable(&self) -> bool {
        match self {
            Value::List(_) | Value::Set(_) | Value::Dict(_) | Value::Slice(..) => false,
            Value::Tuple(items) => items.iter().all(Value::is_hashable),
            Value::Object {
                payload: Some(payload),
                ..
            } => payload.is_hashable(),
            _ => true,
        }
    }

    /// Renders the value the way it reads inside a type expression:
    /// classes by name rather than `<class '...'>`.
    pub fn type_repr(&self) -> String {
        match self {
            Value::Type(class) => class.name().to_string(),
            Value::Alias { origin, args } => {
                let args = args.iter().map(Value::type_repr).collect::<Vec<_>>();
                format!("{}[{}]", origin.name(), args.join(", "))
            }
            Value::TypingForm(form) => format!("typing.{}", form.name()),
            _ => self.to_string(),
        }
    }
}

fn dedupe(items: Vec<Value>) -> Vec<Value> {
    let mut result: Vec<Value> = Vec::with_capacity(items.len());
    for item in items {
        if !result.iter().any(|existing| existing.py_eq(&item)) {
            result.push(item);
        }
    }
    result
}

/// `repr(float)`
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return String::from("nan");
    }
    if value.is_infinite() {
        return String::from(if value > 0.0 { "inf" } else { "-inf" });
    }

    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let formatted = format!("{:e}", value);
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) => {
                let (sign, digits) = match exponent.strip_prefix('-') {
                    Some(digits) => ('-', digits),
                    None => ('+', exponent),
                };
                format!("{}e{}{:0>2}", mantissa, sign, digits)
            }
            None => formatted,
        };
    }

    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

fn format_complex_part(value: f64) -> String {
    let formatted = format_float(value);
    match formatted.strip_suffix(".0") {
        Some(stripped) => stripped.to_string(),
        None => formatted,
    }
}

fn escape_into(result: &mut String, ch: char, quote: char) {
    match ch {
        '\\' => result.push_str("\\\\"),
        '\n' => result.push_str("\\n"),
        '\r' => result.push_str("\\r"),
        '\t' => result.push_str("\\t"),
        ch if ch == quote => {
            result.push('\\');
            result.push(ch);
        }
        ch if (ch as u32) < 0x20 || ch as u32 == 0x7f => {
            result.push_str(&format!("\\x{:02x}", ch as u32))
        }
        ch => result.push(ch),
    }
}

fn pick_quote(has_single: bool, has_double: bool) -> char {
    if has_single && !has_double {
        '"'
    } else {
        '\''
    }
}

/// `repr(str)`
pub fn repr_str(value: &str) -> String {
    let quote = pick_quote(value.contains('\''), value.contains('"'));
    let mut result = String::from(quote);
    for ch in value.chars() {
        escape_into(&mut result, ch, quote);
    }
    result.push(quote);
    result
}

/// `repr(bytes)`
pub fn repr_bytes(value: &[u8]) -> String {
    let quote = pick_quote(value.contains(&b'\''), value.contains(&b'"'));
    let mut result = format!("b{}", quote);
    for &byte in value {
        if byte >= 0x80 {
            result.push_str(&format!("\\x{:02x}", byte));
        } else {
            escape_into(&mut result, byte as char, quote);
        }
    }
    result.push(quote);
    result
}

fn join(items: &[Value]) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Int(value) => write!(f, "{}", value),
            Value::Float(value) => write!(f, "{}", format_float(*value)),
            Value::Complex(real, imag) => {
                if *real == 0.0 && real.is_sign_positive() {
                    write!(f, "{}j", format_complex_part(*imag))
                } else {
                    let sign = if *imag < 0.0 || (*imag == 0.0 && imag.is_sign_negative()) {
                        ""
                    } else {
                        "+"
                    };
                    write!(
                        f,
                        "({}{}{}j)",
                        format_complex_part(*real),
                        sign,
                        format_complex_part(*imag)
                    )
                }
            }
            Value::Str(value) => write!(f, "{}", repr_str(value)),
            Value::Bytes(value) => write!(f, "{}", repr_bytes(value)),
            Value::List(items) => write!(f, "[{}]", join(items)),
            Value::Tuple(items) if items.len() == 1 => write!(f, "({},)", items[0]),
            Value::Tuple(items) => write!(f, "({})", join(items)),
            Value::Set(items) if items.is_empty() => write!(f, "set()"),
            Value::Set(items) => write!(f, "{{{}}}", join(items)),
            Value::FrozenSet(items) if items.is_empty() => write!(f, "frozenset()"),
            Value::FrozenSet(items) => write!(f, "frozenset({{{}}})", join(items)),
            Value::Dict(entries) => {
                let entries = entries
                    .iter()
                    .map(|(key, value)| format!("{}: {}", key, value))
                    .collect::<Vec<_>>();
                write!(f, "{{{}}}", entries.join(", "))
            }
            Value::Slice(start, stop, step) => write!(f, "slice({}, {}, {})", start, stop, step),
            Value::Object {
                payload: Some(payload),
                ..
            } => write!(f, "{}", payload),
            Value::Object { class, .. } => write!(f, "<{} object>", class),
            Value::Type(class) => write!(f, "<class '{}'>", class),
            Value::Alias { .. } | Value::TypingForm(_) => write!(f, "{}", self.type_repr()),
            Value::Module { name, .. } => write!(f, "<module '{}'>", name),
            Value::Function(name) => write!(f, "<function {}>", name),
        }
    }
}
