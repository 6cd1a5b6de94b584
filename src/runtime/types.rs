//! Runtime classes: the built-in types and user-defined classes a value
//! can be an instance of.

use std::{fmt::Display, sync::Arc};

/// Built-in classes known to the checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    Object,
    NoneType,
    Bool,
    Int,
    Float,
    Complex,
    Str,
    Bytes,
    List,
    Tuple,
    Set,
    FrozenSet,
    Dict,
    Slice,
    Type,
    GenericAlias,
    SpecialForm,
    Module,
    Function,
}

impl BuiltinType {
    pub fn name(&self) -> &'static str {
        match self {
            BuiltinType::Object => "object",
            BuiltinType::NoneType => "NoneType",
            BuiltinType::Bool => "bool",
            BuiltinType::Int => "int",
            BuiltinType::Float => "float",
            BuiltinType::Complex => "complex",
            BuiltinType::Str => "str",
            BuiltinType::Bytes => "bytes",
            BuiltinType::List => "list",
            BuiltinType::Tuple => "tuple",
            BuiltinType::Set => "set",
            BuiltinType::FrozenSet => "frozenset",
            BuiltinType::Dict => "dict",
            BuiltinType::Slice => "slice",
            BuiltinType::Type => "type",
            BuiltinType::GenericAlias => "types.GenericAlias",
            BuiltinType::SpecialForm => "typing._SpecialForm",
            BuiltinType::Module => "module",
            BuiltinType::Function => "function",
        }
    }

    /// The direct base class; `object` has none.
    pub fn base(&self) -> Option<BuiltinType> {
        match self {
            BuiltinType::Object => None,
            BuiltinType::Bool => Some(BuiltinType::Int),
            _ => Some(BuiltinType::Object),
        }
    }

    /// Whether `cls[...]` is valid syntax at runtime.
    pub fn is_subscriptable(&self) -> bool {
        matches!(
            self,
            BuiltinType::List
                | BuiltinType::Tuple
                | BuiltinType::Set
                | BuiltinType::FrozenSet
                | BuiltinType::Dict
                | BuiltinType::Type
        )
    }
}

/// A user class with its direct bases, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDef {
    pub name: String,
    pub bases: Vec<TypeObject>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeObject {
    Builtin(BuiltinType),
    Class(Arc<ClassDef>),
}

impl TypeObject {
    /// A user class; no bases means it derives from `object`.
    pub fn class(name: &str, bases: Vec<TypeObject>) -> Self {
        TypeObject::Class(Arc::new(ClassDef {
            name: name.to_string(),
            bases,
        }))
    }

    pub fn name(&self) -> &str {
        match self {
            TypeObject::Builtin(builtin) => builtin.name(),
            TypeObject::Class(class) => &class.name,
        }
    }

    pub fn bases(&self) -> Vec<TypeObject> {
        match self {
            TypeObject::Builtin(builtin) => builtin.base().map(TypeObject::Builtin).into_iter().collect(),
            TypeObject::Class(class) if class.bases.is_empty() => {
                vec![TypeObject::Builtin(BuiltinType::Object)]
            }
            TypeObject::Class(class) => class.bases.clone(),
        }
    }

    /// `issubclass(self, other)`
    pub fn is_subtype(&self, other: &TypeObject) -> bool {
        if self == other || *other == TypeObject::Builtin(BuiltinType::Object) {
            return true;
        }
        self.bases().iter().any(|base| base.is_subtype(other))
    }

    pub fn as_builtin(&self) -> Option<BuiltinType> {
        match self {
            TypeObject::Builtin(builtin) => Some(*builtin),
            TypeObject::Class(_) => None,
        }
    }
}

impl From<BuiltinType> for TypeObject {
    fn from(builtin: BuiltinType) -> Self {
        TypeObject::Builtin(builtin)
    }
}

impl Display for TypeObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
