//! Lexical analysis module.
//!
//! This module contains the lexer (tokenizer) that converts Python source
//! into a stream of tokens for parsing. It handles:
//!
//! - Tokenization of source code using regex patterns
//! - Recognition of keywords, identifiers, literals, and operators
//! - Logical lines and indentation (`Newline`, `Indent`, `Dedent`)
//! - Token position tracking (offset and line) for error reporting
//! - Comment collection, used by the comment-tag reader

pub mod lexer;
pub mod tokens;
