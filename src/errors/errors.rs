use std::fmt::Display;

use thiserror::Error;

use crate::Position;

/// A source error: something in a file could not be tokenized or parsed.
///
/// Extracting a file's annotations fails with this error, it is never
/// swallowed by the extractor.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_internal_error(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnterminatedString => "UnterminatedString",
            ErrorImpl::InconsistentIndentation => "InconsistentIndentation",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::UnexpectedIndent => "UnexpectedIndent",
            ErrorImpl::ExpectedIndentedBlock => "ExpectedIndentedBlock",
            ErrorImpl::InvalidTarget { .. } => "InvalidTarget",
            ErrorImpl::FileReadError { .. } => "FileReadError",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::UnterminatedString => {
                ErrorTip::Suggestion(String::from("String literal is never closed"))
            }
            ErrorImpl::InconsistentIndentation => ErrorTip::Suggestion(String::from(
                "Unindent does not match any outer indentation level",
            )),
            ErrorImpl::UnexpectedToken { token } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`", token))
            }
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::UnexpectedIndent => {
                ErrorTip::Suggestion(String::from("Indented line outside of a block"))
            }
            ErrorImpl::ExpectedIndentedBlock => {
                ErrorTip::Suggestion(String::from("Expected an indented block after `:`"))
            }
            ErrorImpl::InvalidTarget { target } => {
                ErrorTip::Suggestion(format!("Cannot assign to `{}`", target))
            }
            ErrorImpl::FileReadError { path, message } => {
                ErrorTip::Suggestion(format!("Failed to read `{}`: {}", path, message))
            }
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}: {}",
            self.position.file, self.position.line, self.internal_error
        )
    }
}

impl std::error::Error for Error {}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("inconsistent indentation")]
    InconsistentIndentation,
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message:?}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("unexpected indent")]
    UnexpectedIndent,
    #[error("expected an indented block")]
    ExpectedIndentedBlock,
    #[error("invalid assignment target {target:?}")]
    InvalidTarget { target: String },
    #[error("failed to read {path:?}: {message}")]
    FileReadError { path: String, message: String },
}

/// Failure to turn a type expression into a type descriptor.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    /// A name or attribute is not bound in the frame's environment.
    #[error("name {name:?} is not defined")]
    Unresolved { name: String },
    /// The expression evaluates to something that is not a type.
    #[error("malformed type: {reason}")]
    Malformed { reason: String },
    /// A parameterized type outside list/set/dict.
    #[error("unsupported type: {reason}")]
    Unsupported { reason: String },
}

/// Failure to check a value against a descriptor.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CheckError {
    #[error("malformed type: {origin} takes {expected} type argument(s), {found} given")]
    WrongArity {
        origin: String,
        expected: usize,
        found: usize,
    },
}

/// Failure to evaluate a literal value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LiteralError {
    #[error(transparent)]
    Syntax(#[from] Error),
    #[error("not a literal: {expression}")]
    NotALiteral { expression: String },
    #[error("invalid number literal: {literal}")]
    InvalidNumber { literal: String },
    #[error("unhashable type: '{type_name}'")]
    Unhashable { type_name: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MonitorError {
    #[error("the monitor is already tracing")]
    AlreadyTracing,
    #[error("the monitor is not tracing")]
    NotTracing,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}
