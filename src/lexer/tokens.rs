use lazy_static::lazy_static;
use std::{collections::HashMap, fmt::Display};

use crate::Span;

lazy_static! {
    pub static ref RESERVED_LOOKUP: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("False", TokenKind::False);
        map.insert("None", TokenKind::None);
        map.insert("True", TokenKind::True);
        map.insert("and", TokenKind::And);
        map.insert("as", TokenKind::As);
        map.insert("assert", TokenKind::Assert);
        map.insert("async", TokenKind::Async);
        map.insert("await", TokenKind::Await);
        map.insert("break", TokenKind::Break);
        map.insert("class", TokenKind::Class);
        map.insert("continue", TokenKind::Continue);
        map.insert("def", TokenKind::Def);
        map.insert("del", TokenKind::Del);
        map.insert("elif", TokenKind::Elif);
        map.insert("else", TokenKind::Else);
        map.insert("except", TokenKind::Except);
        map.insert("finally", TokenKind::Finally);
        map.insert("for", TokenKind::For);
        map.insert("from", TokenKind::From);
        map.insert("global", TokenKind::Global);
        map.insert("if", TokenKind::If);
        map.insert("import", TokenKind::Import);
        map.insert("in", TokenKind::In);
        map.insert("is", TokenKind::Is);
        map.insert("lambda", TokenKind::Lambda);
        map.insert("nonlocal", TokenKind::Nonlocal);
        map.insert("not", TokenKind::Not);
        map.insert("or", TokenKind::Or);
        map.insert("pass", TokenKind::Pass);
        map.insert("raise", TokenKind::Raise);
        map.insert("return", TokenKind::Return);
        map.insert("try", TokenKind::Try);
        map.insert("while", TokenKind::While);
        map.insert("with", TokenKind::With);
        map.insert("yield", TokenKind::Yield);
        map
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    EOF,
    Newline,
    Indent,
    Dedent,

    Number,
    String,
    FString,
    Bytes,
    Identifier,

    OpenBracket,
    CloseBracket,
    OpenCurly,
    CloseCurly,
    OpenParen,
    CloseParen,

    Assignment, // =
    Walrus,     // :=
    Equals,     // ==
    NotEquals,  // !=
    Less,
    LessEquals,
    Greater,
    GreaterEquals,

    Dot,
    Ellipsis,
    Semicolon,
    Colon,
    Comma,
    Arrow,
    At,

    PlusEquals,
    MinusEquals,
    StarEquals,
    SlashEquals,
    DoubleSlashEquals,
    PercentEquals,
    AtEquals,
    AmpersandEquals,
    PipeEquals,
    CaretEquals,
    ShiftLeftEquals,
    ShiftRightEquals,
    DoubleStarEquals,

    Plus,
    Dash,
    Star,
    DoubleStar,
    Slash,
    DoubleSlash,
    Percent,
    Ampersand,
    Pipe,
    Caret,
    Tilde,
    ShiftLeft,
    ShiftRight,

    // Reserved
    False,
    None,
    True,
    And,
    As,
    Assert,
    Async,
    Await,
    Break,
    Class,
    Continue,
    Def,
    Del,
    Elif,
    Else,
    Except,
    Finally,
    For,
    From,
    Global,
    If,
    Import,
    In,
    Is,
    Lambda,
    Nonlocal,
    Not,
    Or,
    Pass,
    Raise,
    Return,
    Try,
    While,
    With,
    Yield,
}

impl TokenKind {
    /// Returns whether the token is an augmented assignment operator (`+=`, `//=`, ...).
    pub fn is_augmented_assignment(&self) -> bool {
        matches!(
            self,
            TokenKind::PlusEquals
                | TokenKind::MinusEquals
                | TokenKind::StarEquals
                | TokenKind::SlashEquals
                | TokenKind::DoubleSlashEquals
                | TokenKind::PercentEquals
                | TokenKind::AtEquals
                | TokenKind::AmpersandEquals
                | TokenKind::PipeEquals
                | TokenKind::CaretEquals
                | TokenKind::ShiftLeftEquals
                | TokenKind::ShiftRightEquals
                | TokenKind::DoubleStarEquals
        )
    }

    /// Returns whether the token only shapes the layout of the file.
    pub fn is_layout(&self) -> bool {
        matches!(
            self,
            TokenKind::Newline | TokenKind::Indent | TokenKind::Dedent | TokenKind::EOF
        )
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub span: Span,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Token {{\nkind: {},\nvalue: {}}}", self.kind, self.value)
    }
}
