use std::fmt::Display;

use log::{trace, warn};

use crate::{
    errors::errors::{CheckError, ResolveError},
    runtime::value::Value,
};

use super::{
    descriptor::{Origin, TypeDescriptor},
    resolver::{resolve_type, Environment},
};

/// What a single observation found.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Conformant,
    Mismatch,
    /// The annotation itself is wrong, e.g. `dict[int]`.
    Malformed(String),
    /// The annotation uses a type the checker does not handle, e.g. `tuple[int]`.
    Unsupported(String),
}

impl Outcome {
    pub fn is_conformant(&self) -> bool {
        matches!(self, Outcome::Conformant)
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Conformant => write!(f, "ok"),
            Outcome::Mismatch => write!(f, "mismatch"),
            Outcome::Malformed(reason) => write!(f, "malformed ({})", reason),
            Outcome::Unsupported(reason) => write!(f, "unsupported ({})", reason),
        }
    }
}

/// Checks every generic in the tree has as many arguments as its origin takes.
pub fn validate(descriptor: &TypeDescriptor) -> Result<(), CheckError> {
    if let TypeDescriptor::Generic { origin, args } = descriptor {
        if args.len() != origin.arity() {
            return Err(CheckError::WrongArity {
                origin: origin.name().to_string(),
                expected: origin.arity(),
                found: args.len(),
            });
        }
        for arg in args {
            validate(arg)?;
        }
    }
    Ok(())
}

/// Whether `value` conforms to `descriptor`.
///
/// The descriptor is validated as a whole before the value is looked at,
/// so `list[dict[int]]` is reported even for an empty list.
pub fn check(value: &Value, descriptor: &TypeDescriptor) -> Result<bool, CheckError> {
    validate(descriptor)?;
    Ok(conforms(value, descriptor))
}

fn conforms(value: &Value, descriptor: &TypeDescriptor) -> bool {
    match descriptor {
        TypeDescriptor::Primitive(class) => value.is_instance(class),
        TypeDescriptor::Unconstrained(origin) => match origin {
            Origin::List => value.as_list_like().is_some(),
            Origin::Set => value.as_set_like().is_some(),
            Origin::Dict => value.as_mapping().is_some(),
        },
        TypeDescriptor::Generic { origin, args } => match (origin, args.as_slice()) {
            (Origin::List, [element]) => value
                .as_list_like()
                .is_some_and(|items| items.iter().all(|item| conforms(item, element))),
            (Origin::Set, [element]) => value
                .as_set_like()
                .is_some_and(|items| items.iter().all(|item| conforms(item, element))),
            (Origin::Dict, [key_type, value_type]) => value.as_mapping().is_some_and(|entries| {
                entries
                    .iter()
                    .all(|(key, value)| conforms(key, key_type) && conforms(value, value_type))
            }),
            // `check` validates arity first
            (origin, args) => unreachable!("{} with {} argument(s)", origin.name(), args.len()),
        },
    }
}

/// A resolved and checked annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    /// `None` when the annotation could not be turned into a descriptor.
    pub descriptor: Option<TypeDescriptor>,
    pub outcome: Outcome,
}

/// Resolves `type_expression` in `env` and checks `value` against it.
///
/// Only an unresolvable name is an error: the annotation may belong to a
/// binding that is not visible yet. Malformed and unsupported annotations
/// are outcomes.
pub fn check_annotation(
    value: &Value,
    type_expression: &str,
    env: &Environment,
) -> Result<Verdict, ResolveError> {
    let descriptor = match resolve_type(type_expression, env) {
        Ok(descriptor) => descriptor,
        Err(ResolveError::Malformed { reason }) => {
            warn!("malformed annotation `{}`: {}", type_expression, reason);
            return Ok(Verdict {
                descriptor: None,
                outcome: Outcome::Malformed(reason),
            });
        }
        Err(ResolveError::Unsupported { reason }) => {
            return Ok(Verdict {
                descriptor: None,
                outcome: Outcome::Unsupported(reason),
            });
        }
        Err(error) => return Err(error),
    };

    let outcome = match check(value, &descriptor) {
        Ok(true) => Outcome::Conformant,
        Ok(false) => Outcome::Mismatch,
        Err(error) => {
            warn!("malformed annotation `{}`: {}", type_expression, error);
            Outcome::Malformed(error.to_string())
        }
    };
    trace!("{} against {}: {}", value, descriptor, outcome);

    Ok(Verdict {
        descriptor: Some(descriptor),
        outcome,
    })
}
