use std::{fmt::Display, sync::Arc};

use crate::runtime::namespace::Namespace;

/// Points in execution where a frame's bindings may have changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Entering a function; reported on the `def` line.
    Call,
    /// About to execute a line.
    Line,
    Return,
}

impl Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::Call => write!(f, "call"),
            EventKind::Line => write!(f, "line"),
            EventKind::Return => write!(f, "return"),
        }
    }
}

/// Snapshot of an executing frame.
#[derive(Debug, Clone)]
pub struct Frame {
    pub file: String,
    pub line: u32,
    pub locals: Namespace,
    /// Shared by every frame of the same module.
    pub globals: Arc<Namespace>,
}

impl Frame {
    pub fn new(file: &str, line: u32, locals: Namespace, globals: &Arc<Namespace>) -> Self {
        Frame {
            file: file.to_string(),
            line,
            locals,
            globals: Arc::clone(globals),
        }
    }

    /// The same frame moved to another line with updated locals.
    pub fn at(&self, line: u32, locals: Namespace) -> Self {
        Frame {
            file: self.file.clone(),
            line,
            locals,
            globals: Arc::clone(&self.globals),
        }
    }
}
