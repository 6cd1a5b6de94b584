use std::{collections::BTreeMap, fs, path::Path, sync::Arc};

use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    errors::errors::{Error, ErrorImpl},
    lexer::lexer::tokenize_comments,
    Position,
};

lazy_static! {
    static ref COMMAND_COMMENT: Regex = Regex::new(r"^#\s*pydytype:\s*(.+)$").unwrap();
}

/// Command marking a line where a failed check is expected.
pub const ASSERT_FAIL: &str = "test_assert_fail";

/// Every comment of a file, keyed by line.
pub fn parse_module_comments(path: impl AsRef<Path>) -> Result<BTreeMap<u32, String>, Error> {
    let path = path.as_ref();
    let file = path.to_string_lossy().to_string();

    let source = fs::read_to_string(path).map_err(|error| {
        Error::new(
            ErrorImpl::FileReadError {
                path: file.clone(),
                message: error.to_string(),
            },
            Position::new(0, 0, &Arc::new(file.clone())),
        )
    })?;

    tokenize_comments(&source, Some(file))
}

/// The `<command>` of a `# pydytype: <command>` comment.
pub fn parse_command_comment(comment: Option<&str>) -> Option<String> {
    let captures = COMMAND_COMMENT.captures(comment?.trim_end())?;
    Some(captures[1].to_string())
}
