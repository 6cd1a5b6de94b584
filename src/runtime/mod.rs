pub mod builtins;
pub mod literal;
pub mod namespace;
pub mod types;
pub mod value;
