#![allow(clippy::module_inception)]

use std::{fmt::Write, path::Path, sync::Arc};

use crate::errors::errors::{Error, ErrorTip};

pub mod ast;
pub mod comments;
pub mod config;
pub mod errors;
pub mod extractor;
pub mod harness;
pub mod lexer;
pub mod logging;
pub mod macros;
pub mod monitor;
pub mod parser;
pub mod runtime;
pub mod scope;
pub mod type_checker;

extern crate regex;

pub use extractor::extractor::{parse_module, parse_source};
pub use monitor::monitor::TypeMonitor;
pub use scope::table::LineTypeTable;

/// A point in a source file: byte offset, 1-indexed line and file name.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub offset: u32,
    pub line: u32,
    pub file: Arc<String>,
}

impl Position {
    pub fn new(offset: u32, line: u32, file: &Arc<String>) -> Self {
        Position {
            offset,
            line,
            file: Arc::clone(file),
        }
    }

    pub fn null() -> Self {
        Position {
            offset: 0,
            line: 0,
            file: Arc::new(String::from("<null>")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Span { start, end }
    }
}

/// Finds the line containing a byte offset.
///
/// Returns the 1-indexed line number, the line text and the offset of the
/// position within that line.
pub fn get_line_at_position(content: &str, position: u32) -> Option<(usize, String, usize)> {
    let pos = position as usize;

    if pos > content.len() {
        return None;
    }

    let mut start = 0;
    let mut line_number = 1;

    for line in content.split_inclusive('\n') {
        let end = start + line.len();

        if (start..end).contains(&pos) {
            return Some((line_number, line.to_string(), pos - start));
        }

        start = end;
        line_number += 1;
    }

    // Offset at the very end of the file (EOF token)
    let last = content.lines().last().unwrap_or_default();
    Some((line_number.max(2) - 1, last.to_string(), last.len()))
}

/// Renders an error against the source it came from.
pub fn format_error(error: &Error, content: &str, file: &Path) -> String {
    /*
        Error: UnexpectedToken (Unexpected token: `)`)
        -> example.py
           |
        20 | def f(a: int)):
           | -------------^
    */

    let mut out = String::new();

    if let ErrorTip::None = error.get_tip() {
        let _ = writeln!(out, "Error: {}", error.get_error_name());
    } else {
        let _ = writeln!(out, "Error: {} ({})", error.get_error_name(), error.get_tip());
    }
    let _ = writeln!(out, "-> {}", file.as_os_str().to_string_lossy());

    let Some((line, line_text, line_pos)) = get_line_at_position(content, error.get_position().offset) else {
        return out;
    };

    let line_string = line.to_string();
    let padding = line_string.len() + 2;

    let _ = writeln!(out, "{:>padding$}", "|");

    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(&line_text);
    let _ = writeln!(out, "{} | {}", line_string, line_text_removed.trim_end());

    let arrows = line_pos.saturating_sub(removed_whitespace) + 1;

    let _ = writeln!(out, "{:>padding$} {:->arrows$}", "|", "^");
    out
}

fn remove_starting_whitespace(string: &str) -> (String, usize) {
    let mut start = 0;
    for c in string.chars() {
        if c == ' ' || c == '\t' {
            start += 1;
        } else {
            break;
        }
    }

    (String::from(&string[start..]), start)
}
