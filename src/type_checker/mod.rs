//! Resolution of type expressions and conformance checking.
//!
//! A type expression is evaluated against a frame's environment into a
//! `TypeDescriptor`, then a runtime value is checked against it:
//!
//! - Primitive types use an instance test through the class hierarchy
//! - `list`, `set` and `dict` generics recurse into their elements
//! - Bare containers only check the container kind

pub mod descriptor;
pub mod resolver;
pub mod type_checker;

#[cfg(test)]
mod tests;
