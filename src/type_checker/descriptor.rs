use std::fmt::Display;

use crate::runtime::{
    types::{BuiltinType, TypeObject},
    value::TypingForm,
};

/// The parameterizable containers the checker understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    List,
    Set,
    Dict,
}

impl Origin {
    pub fn name(&self) -> &'static str {
        self.builtin().name()
    }

    /// Number of type arguments the origin takes.
    pub fn arity(&self) -> usize {
        match self {
            Origin::List | Origin::Set => 1,
            Origin::Dict => 2,
        }
    }

    pub fn builtin(&self) -> BuiltinType {
        match self {
            Origin::List => BuiltinType::List,
            Origin::Set => BuiltinType::Set,
            Origin::Dict => BuiltinType::Dict,
        }
    }

    pub fn from_builtin(builtin: BuiltinType) -> Option<Origin> {
        match builtin {
            BuiltinType::List => Some(Origin::List),
            BuiltinType::Set => Some(Origin::Set),
            BuiltinType::Dict => Some(Origin::Dict),
            _ => None,
        }
    }

    pub fn from_typing(form: TypingForm) -> Option<Origin> {
        match form {
            TypingForm::List => Some(Origin::List),
            TypingForm::Set => Some(Origin::Set),
            TypingForm::Dict => Some(Origin::Dict),
            _ => None,
        }
    }
}

/// A resolved, checkable type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    /// Checked with an instance test.
    Primitive(TypeObject),
    /// `list[T]`, `set[T]`, `dict[K, V]`. Arity is not validated here.
    Generic {
        origin: Origin,
        args: Vec<TypeDescriptor>,
    },
    /// Bare `list`, `set` or `dict`.
    Unconstrained(Origin),
}

impl Display for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeDescriptor::Primitive(class) => write!(f, "{}", class),
            TypeDescriptor::Generic { origin, args } => {
                let args = args.iter().map(|arg| arg.to_string()).collect::<Vec<_>>();
                write!(f, "{}[{}]", origin.name(), args.join(", "))
            }
            TypeDescriptor::Unconstrained(origin) => write!(f, "{}", origin.name()),
        }
    }
}
