//! `# pydytype: <command>` comment tags in checked programs.

pub mod comments;
