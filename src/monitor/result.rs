use std::fmt::Display;

use crate::{
    runtime::value::Value,
    type_checker::{descriptor::TypeDescriptor, type_checker::Outcome},
};

/// One observation: a variable's value checked against its declared type.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub file_path: String,
    pub line: u32,
    pub varname: String,
    pub value: Value,
    pub type_expression: String,
    /// `None` when the annotation was malformed or unsupported.
    pub descriptor: Option<TypeDescriptor>,
    pub outcome: Outcome,
}

impl CheckResult {
    pub fn is_conformant(&self) -> bool {
        self.outcome.is_conformant()
    }
}

impl Display for CheckResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}: {}: {} = {}: {}",
            self.file_path, self.line, self.varname, self.type_expression, self.value, self.outcome
        )
    }
}
