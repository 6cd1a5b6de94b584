//! Cross-references check results with comment tags: a failed check is
//! expected only on a line tagged `# pydytype: test_assert_fail`.

use std::collections::BTreeMap;

use crate::{
    comments::comments::{parse_command_comment, ASSERT_FAIL},
    monitor::result::CheckResult,
};

/// Whether a line is tagged as an expected failure.
pub fn expects_failure(comments: &BTreeMap<u32, String>, line: u32) -> bool {
    parse_command_comment(comments.get(&line).map(String::as_str)).as_deref() == Some(ASSERT_FAIL)
}

/// Non-conformant results on lines not tagged as expected failures.
pub fn unexpected_failures<'a>(
    results: &'a [CheckResult],
    comments: &BTreeMap<u32, String>,
) -> Vec<&'a CheckResult> {
    results
        .iter()
        .filter(|result| !result.is_conformant() && !expects_failure(comments, result.line))
        .collect()
}
