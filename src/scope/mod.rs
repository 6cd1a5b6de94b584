//! Nested scopes of declared types and the flattened per-line table.
//!
//! - scope: `Scope`, `TypeRecord` and the `ScopeStack` used while walking a module
//! - table: `LineTypeTable`, the read-only line -> name -> type view

pub mod scope;
pub mod table;

#[cfg(test)]
mod tests;
