use std::{collections::BTreeMap, sync::Arc};

use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position, Span, MK_DEFAULT_HANDLER, MK_TOKEN,
};

use super::tokens::{Token, TokenKind, RESERVED_LOOKUP};

pub type RegexHandler = fn(&mut Lexer, &Regex) -> Result<(), Error>;

pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

fn pattern(regex: &str, handler: RegexHandler) -> RegexPattern {
    RegexPattern {
        regex: Regex::new(&format!("^(?:{})", regex)).expect("lexer patterns are valid regexes"),
        handler,
    }
}

lazy_static! {
    // Order matters: the first pattern matching at the current position wins,
    // so longer operators come before their prefixes.
    static ref PATTERNS: Vec<RegexPattern> = vec![
        pattern("\\r?\\n", newline_handler),
        pattern("\\\\\\r?\\n", skip_handler),
        pattern("[ \\t\\x0C]+", skip_handler),
        pattern("#[^\\r\\n]*", comment_handler),
        pattern("(?i:[rbuf]{0,2})(?:\"\"\"(?s:[^\\\\]|\\\\.)*?\"\"\"|'''(?s:[^\\\\]|\\\\.)*?''')", string_handler),
        pattern("(?i:[rbuf]{0,2})(?:\"(?:[^\"\\\\\\r\\n]|\\\\(?s:.))*\"|'(?:[^'\\\\\\r\\n]|\\\\(?s:.))*')", string_handler),
        pattern("(?i:[rbuf]{0,2})[\"']", unterminated_string_handler),
        pattern("0[xX][0-9a-fA-F_]+|0[oO][0-7_]+|0[bB][01_]+|(?:[0-9][0-9_]*\\.[0-9_]*|\\.[0-9][0-9_]*|[0-9][0-9_]*)(?:[eE][+-]?[0-9][0-9_]*)?[jJ]?", number_handler),
        pattern("[\\p{XID_Start}_]\\p{XID_Continue}*", symbol_handler),
        pattern("\\.\\.\\.", MK_DEFAULT_HANDLER!(TokenKind::Ellipsis, "...")),
        pattern("\\*\\*=", MK_DEFAULT_HANDLER!(TokenKind::DoubleStarEquals, "**=")),
        pattern("//=", MK_DEFAULT_HANDLER!(TokenKind::DoubleSlashEquals, "//=")),
        pattern(">>=", MK_DEFAULT_HANDLER!(TokenKind::ShiftRightEquals, ">>=")),
        pattern("<<=", MK_DEFAULT_HANDLER!(TokenKind::ShiftLeftEquals, "<<=")),
        pattern("->", MK_DEFAULT_HANDLER!(TokenKind::Arrow, "->")),
        pattern(":=", MK_DEFAULT_HANDLER!(TokenKind::Walrus, ":=")),
        pattern("==", MK_DEFAULT_HANDLER!(TokenKind::Equals, "==")),
        pattern("!=", MK_DEFAULT_HANDLER!(TokenKind::NotEquals, "!=")),
        pattern("<=", MK_DEFAULT_HANDLER!(TokenKind::LessEquals, "<=")),
        pattern(">=", MK_DEFAULT_HANDLER!(TokenKind::GreaterEquals, ">=")),
        pattern("\\+=", MK_DEFAULT_HANDLER!(TokenKind::PlusEquals, "+=")),
        pattern("-=", MK_DEFAULT_HANDLER!(TokenKind::MinusEquals, "-=")),
        pattern("\\*=", MK_DEFAULT_HANDLER!(TokenKind::StarEquals, "*=")),
        pattern("/=", MK_DEFAULT_HANDLER!(TokenKind::SlashEquals, "/=")),
        pattern("%=", MK_DEFAULT_HANDLER!(TokenKind::PercentEquals, "%=")),
        pattern("@=", MK_DEFAULT_HANDLER!(TokenKind::AtEquals, "@=")),
        pattern("&=", MK_DEFAULT_HANDLER!(TokenKind::AmpersandEquals, "&=")),
        pattern("\\|=", MK_DEFAULT_HANDLER!(TokenKind::PipeEquals, "|=")),
        pattern("\\^=", MK_DEFAULT_HANDLER!(TokenKind::CaretEquals, "^=")),
        pattern("\\*\\*", MK_DEFAULT_HANDLER!(TokenKind::DoubleStar, "**")),
        pattern("//", MK_DEFAULT_HANDLER!(TokenKind::DoubleSlash, "//")),
        pattern("<<", MK_DEFAULT_HANDLER!(TokenKind::ShiftLeft, "<<")),
        pattern(">>", MK_DEFAULT_HANDLER!(TokenKind::ShiftRight, ">>")),
        pattern("\\[", MK_DEFAULT_HANDLER!(TokenKind::OpenBracket, "[")),
        pattern("\\]", MK_DEFAULT_HANDLER!(TokenKind::CloseBracket, "]")),
        pattern("\\{", MK_DEFAULT_HANDLER!(TokenKind::OpenCurly, "{")),
        pattern("\\}", MK_DEFAULT_HANDLER!(TokenKind::CloseCurly, "}")),
        pattern("\\(", MK_DEFAULT_HANDLER!(TokenKind::OpenParen, "(")),
        pattern("\\)", MK_DEFAULT_HANDLER!(TokenKind::CloseParen, ")")),
        pattern("=", MK_DEFAULT_HANDLER!(TokenKind::Assignment, "=")),
        pattern("<", MK_DEFAULT_HANDLER!(TokenKind::Less, "<")),
        pattern(">", MK_DEFAULT_HANDLER!(TokenKind::Greater, ">")),
        pattern("\\.", MK_DEFAULT_HANDLER!(TokenKind::Dot, ".")),
        pattern(";", MK_DEFAULT_HANDLER!(TokenKind::Semicolon, ";")),
        pattern(":", MK_DEFAULT_HANDLER!(TokenKind::Colon, ":")),
        pattern(",", MK_DEFAULT_HANDLER!(TokenKind::Comma, ",")),
        pattern("@", MK_DEFAULT_HANDLER!(TokenKind::At, "@")),
        pattern("\\+", MK_DEFAULT_HANDLER!(TokenKind::Plus, "+")),
        pattern("-", MK_DEFAULT_HANDLER!(TokenKind::Dash, "-")),
        pattern("\\*", MK_DEFAULT_HANDLER!(TokenKind::Star, "*")),
        pattern("/", MK_DEFAULT_HANDLER!(TokenKind::Slash, "/")),
        pattern("%", MK_DEFAULT_HANDLER!(TokenKind::Percent, "%")),
        pattern("&", MK_DEFAULT_HANDLER!(TokenKind::Ampersand, "&")),
        pattern("\\|", MK_DEFAULT_HANDLER!(TokenKind::Pipe, "|")),
        pattern("\\^", MK_DEFAULT_HANDLER!(TokenKind::Caret, "^")),
        pattern("~", MK_DEFAULT_HANDLER!(TokenKind::Tilde, "~")),
    ];
}

const TAB_SIZE: usize = 8;

pub struct Lexer {
    tokens: Vec<Token>,
    comments: BTreeMap<u32, String>,
    source: String,
    pos: usize,
    line: u32,
    file: Arc<String>,
    /// Open brackets; newlines inside brackets are not logical line breaks.
    paren_depth: usize,
    indent_stack: Vec<usize>,
    at_line_start: bool,
}

impl Lexer {
    pub fn new(source: String, file: Option<String>) -> Lexer {
        let file_name = if let Some(file) = file {
            Arc::new(file)
        } else {
            Arc::new(String::from("<string>"))
        };

        Lexer {
            tokens: vec![],
            comments: BTreeMap::new(),
            source,
            pos: 0,
            line: 1,
            file: file_name,
            paren_depth: 0,
            indent_stack: vec![0],
            at_line_start: true,
        }
    }

    /// Advances by `n` bytes, keeping the line counter in sync.
    pub fn advance_n(&mut self, n: usize) {
        let end = (self.pos + n).min(self.source.len());
        self.line += self.source[self.pos..end].matches('\n').count() as u32;
        self.pos = end;
    }

    pub fn push(&mut self, token: Token) {
        match token.kind {
            TokenKind::OpenParen | TokenKind::OpenBracket | TokenKind::OpenCurly => {
                self.paren_depth += 1
            }
            TokenKind::CloseParen | TokenKind::CloseBracket | TokenKind::CloseCurly => {
                self.paren_depth = self.paren_depth.saturating_sub(1)
            }
            _ => {}
        }
        self.tokens.push(token);
    }

    pub fn position(&self) -> Position {
        Position::new(self.pos as u32, self.line, &self.file)
    }

    pub fn at(&self) -> char {
        self.remainder().chars().next().unwrap_or('\0')
    }

    pub fn remainder(&self) -> &str {
        &self.source[self.pos..]
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn last_kind(&self) -> Option<TokenKind> {
        self.tokens.last().map(|token| token.kind)
    }

    fn push_layout(&mut self, kind: TokenKind) {
        let position = self.position();
        self.push(MK_TOKEN!(
            kind,
            String::new(),
            Span {
                start: position.clone(),
                end: position
            }
        ));
    }

    /// Measures the indentation of a fresh logical line and emits
    /// `Indent`/`Dedent` tokens. Blank and comment-only lines are ignored.
    fn handle_indentation(&mut self) -> Result<(), Error> {
        self.at_line_start = false;
        if self.paren_depth > 0 {
            return Ok(());
        }

        let mut column = 0;
        let mut width = 0;
        for ch in self.remainder().chars() {
            match ch {
                ' ' => column += 1,
                '\t' => column = (column / TAB_SIZE + 1) * TAB_SIZE,
                '\x0C' => column = 0,
                _ => break,
            }
            width += 1;
        }

        let next = self.remainder()[width..].chars().next();
        if matches!(next, None | Some('\n') | Some('\r') | Some('#')) {
            self.advance_n(width);
            return Ok(());
        }

        let current = *self.indent_stack.last().unwrap_or(&0);
        if column > current {
            self.indent_stack.push(column);
            self.advance_n(width);
            self.push_layout(TokenKind::Indent);
        } else {
            self.advance_n(width);
            while column < *self.indent_stack.last().unwrap_or(&0) {
                self.indent_stack.pop();
                self.push_layout(TokenKind::Dedent);
            }
            if column != *self.indent_stack.last().unwrap_or(&0) {
                return Err(Error::new(ErrorImpl::InconsistentIndentation, self.position()));
            }
        }

        Ok(())
    }

    fn finish(&mut self) {
        if matches!(self.last_kind(), Some(kind) if !kind.is_layout()) {
            self.push_layout(TokenKind::Newline);
        }
        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            self.push_layout(TokenKind::Dedent);
        }
        self.push_layout(TokenKind::EOF);
    }
}

fn newline_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = regex.find(lexer.remainder()).map_or(1, |m| m.end());

    if lexer.paren_depth == 0 {
        if matches!(lexer.last_kind(), Some(kind) if !kind.is_layout()) {
            lexer.push_layout(TokenKind::Newline);
        }
        lexer.at_line_start = true;
    }

    lexer.advance_n(matched);
    Ok(())
}

fn skip_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = regex.find(lexer.remainder()).map_or(0, |m| m.end());
    lexer.advance_n(matched);
    Ok(())
}

fn comment_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let comment = regex
        .find(lexer.remainder())
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    lexer.comments.insert(lexer.line, comment.clone());
    lexer.advance_n(comment.len());
    Ok(())
}

fn unterminated_string_handler(lexer: &mut Lexer, _regex: &Regex) -> Result<(), Error> {
    Err(Error::new(ErrorImpl::UnterminatedString, lexer.position()))
}

fn number_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = regex
        .find(lexer.remainder())
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    let start = lexer.position();
    lexer.advance_n(matched.len());
    let end = lexer.position();
    lexer.push(MK_TOKEN!(TokenKind::Number, matched, Span { start, end }));
    Ok(())
}

fn string_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let literal = regex
        .find(lexer.remainder())
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    let prefix_len = literal.find(['"', '\'']).unwrap_or(0);
    let prefix = literal[..prefix_len].to_ascii_lowercase();
    let body = &literal[prefix_len..];
    let quote_len = if body.starts_with("\"\"\"") || body.starts_with("'''") {
        3
    } else {
        1
    };
    let content = &body[quote_len..body.len() - quote_len];

    let value = if prefix.contains('r') {
        content.to_string()
    } else {
        unescape(content)
    };

    let kind = if prefix.contains('b') {
        TokenKind::Bytes
    } else if prefix.contains('f') {
        TokenKind::FString
    } else {
        TokenKind::String
    };

    let start = lexer.position();
    lexer.advance_n(literal.len());
    let end = lexer.position();
    lexer.push(MK_TOKEN!(kind, value, Span { start, end }));
    Ok(())
}

fn unescape(content: &str) -> String {
    let mut result = String::new();
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch); // Keep non-escape characters
            continue;
        }

        let Some(next_ch) = chars.peek().copied() else {
            result.push(ch); // Keep the lone backslash
            break;
        };

        match next_ch {
            'n' => result.push('\n'),
            't' => result.push('\t'),
            'r' => result.push('\r'),
            '0' => result.push('\0'),
            '\\' => result.push('\\'),
            '\'' => result.push('\''),
            '"' => result.push('"'),
            // Line continuation inside the literal
            '\n' => {}
            'x' => {
                chars.next();
                let mut hex = String::new();
                for _ in 0..2 {
                    match chars.peek() {
                        Some(ch) if ch.is_ascii_hexdigit() => {
                            hex.push(*ch);
                            chars.next();
                        }
                        _ => break,
                    }
                }

                match u8::from_str_radix(&hex, 16) {
                    Ok(byte) => result.push(byte as char),
                    Err(_) => {
                        result.push_str("\\x");
                        result.push_str(&hex);
                    }
                }
                continue;
            }
            _ => {
                result.push(ch); // Keep the backslash
                result.push(next_ch);
            }
        }
        chars.next();
    }

    result
}

fn symbol_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let value = regex
        .find(lexer.remainder())
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    let kind = RESERVED_LOOKUP
        .get(value.as_str())
        .copied()
        .unwrap_or(TokenKind::Identifier);

    let start = lexer.position();
    lexer.advance_n(value.len());
    let end = lexer.position();
    lexer.push(MK_TOKEN!(kind, value, Span { start, end }));
    Ok(())
}

fn run(source: &str, file: Option<String>) -> Result<Lexer, Error> {
    let mut lex = Lexer::new(source.to_string(), file);

    while !lex.at_eof() {
        if lex.at_line_start {
            lex.handle_indentation()?;
            continue;
        }

        let pattern = PATTERNS
            .iter()
            .find(|pattern| pattern.regex.is_match(lex.remainder()));

        match pattern {
            Some(pattern) => (pattern.handler)(&mut lex, &pattern.regex)?,
            None => {
                return Err(Error::new(
                    ErrorImpl::UnrecognisedToken {
                        token: lex.at().to_string(),
                    },
                    lex.position(),
                ))
            }
        }
    }

    lex.finish();
    Ok(lex)
}

/// Converts source text into tokens, including layout tokens
/// (`Newline`, `Indent`, `Dedent`) and a final `EOF`.
pub fn tokenize(source: &str, file: Option<String>) -> Result<Vec<Token>, Error> {
    Ok(run(source, file)?.tokens)
}

/// Collects every comment in the source, keyed by its line.
pub fn tokenize_comments(source: &str, file: Option<String>) -> Result<BTreeMap<u32, String>, Error> {
    Ok(run(source, file)?.comments)
}
