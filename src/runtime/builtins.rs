use std::sync::Arc;

use lazy_static::lazy_static;

use super::{
    namespace::Namespace,
    types::BuiltinType,
    value::{TypingForm, Value},
};

lazy_static! {
    /// Built-in classes every frame can see.
    pub static ref BUILTINS: Namespace = [
        BuiltinType::Int,
        BuiltinType::Float,
        BuiltinType::Complex,
        BuiltinType::Str,
        BuiltinType::Bytes,
        BuiltinType::Bool,
        BuiltinType::List,
        BuiltinType::Tuple,
        BuiltinType::Set,
        BuiltinType::FrozenSet,
        BuiltinType::Dict,
        BuiltinType::Object,
        BuiltinType::Type,
        BuiltinType::Slice,
    ]
    .into_iter()
    .map(|builtin| (builtin.name().to_string(), Value::builtin_type(builtin)))
    .collect();

    static ref TYPING: Arc<Namespace> = Arc::new(
        [
            TypingForm::List,
            TypingForm::Set,
            TypingForm::Dict,
            TypingForm::FrozenSet,
            TypingForm::Tuple,
            TypingForm::Optional,
            TypingForm::Union,
            TypingForm::Any,
            TypingForm::Callable,
        ]
        .into_iter()
        .map(|form| (form.name().to_string(), Value::TypingForm(form)))
        .collect()
    );
}

/// The stock `typing` module.
pub fn typing_module() -> Value {
    Value::Module {
        name: String::from("typing"),
        namespace: Arc::clone(&TYPING),
    }
}

/// Globals of a module that did `import typing` and
/// `from typing import *`.
pub fn typing_globals() -> Namespace {
    let mut globals = Namespace::new().with("typing", typing_module());
    for (name, value) in TYPING.iter() {
        globals.insert(name, value.clone());
    }
    globals
}
