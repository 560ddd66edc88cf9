use lazy_static::lazy_static;
use std::{collections::HashMap, fmt::Display};

use crate::Span;

lazy_static! {
    pub static ref RESERVED_LOOKUP: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("if", TokenKind::If);
        map.insert("elif", TokenKind::Elif);
        map.insert("else", TokenKind::Else);
        map.insert("for", TokenKind::For);
        map.insert("in", TokenKind::In);
        map.insert("defer", TokenKind::Defer);
        map.insert("return", TokenKind::Return);
        map.insert("del", TokenKind::Del);
        map
    };
}

/// Glyph reserved for the imaginary unit. It can never be part of an identifier.
pub const IMAGINARY_GLYPH: char = '𝒊';

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    EOF,
    Newline,
    Indent,
    Dedent,

    Integer,
    Float,
    String,
    Identifier,

    OpenBracket,
    CloseBracket,
    OpenCurly,
    CloseCurly,
    OpenParen,
    CloseParen,

    Assignment,  // =
    ColonEquals, // :=
    Arrow,       // ->
    Equals,      // ==
    NotEquals,   // !=

    Less,
    LessEquals,
    Greater,
    GreaterEquals,

    Comma,
    Semicolon,
    Colon,
    At,

    Plus,
    Dash,
    Pipe,
    Tilde,

    Star,
    Slash,
    Backslash,
    Percent,
    ShiftLeft,
    ShiftRight,
    Ampersand,

    Caret,
    Bang,
    Sqrt,

    // Reserved
    If,
    Elif,
    Else,
    For,
    In,
    Defer,
    Return,
    Del,
}

impl TokenKind {
    pub fn is_opening_bracket(&self) -> bool {
        matches!(
            self,
            TokenKind::OpenParen | TokenKind::OpenBracket | TokenKind::OpenCurly
        )
    }

    pub fn is_closing_bracket(&self) -> bool {
        matches!(
            self,
            TokenKind::CloseParen | TokenKind::CloseBracket | TokenKind::CloseCurly
        )
    }

    /// Tokens the lexer makes up from layout rather than reading them from the source.
    pub fn is_synthetic(&self) -> bool {
        matches!(
            self,
            TokenKind::EOF | TokenKind::Newline | TokenKind::Indent | TokenKind::Dedent
        )
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Decoded payload of a literal token.
///
/// Digit separators are stripped; the exact spelling stays in `Token::value`.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer {
        radix: u32,
        digits: String,
        imaginary: bool,
    },
    Float {
        text: String,
        imaginary: bool,
    },
    Str(String),
}

impl Literal {
    pub fn is_imaginary(&self) -> bool {
        match self {
            Literal::Integer { imaginary, .. } | Literal::Float { imaginary, .. } => *imaginary,
            Literal::Str(_) => false,
        }
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Integer {
                radix,
                digits,
                imaginary,
            } => {
                let prefix = match radix {
                    2 => "0b",
                    8 => "0o",
                    16 => "0x",
                    _ => "",
                };
                write!(f, "{}{}{}", prefix, digits, if *imaginary { "i" } else { "" })
            }
            Literal::Float { text, imaginary } => {
                write!(f, "{}{}", text, if *imaginary { "i" } else { "" })
            }
            Literal::Str(value) => write!(f, "{:?}", value),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    /// Exact source text of the token (empty for Dedent and EOF)
    pub value: String,
    pub span: Span,
    pub literal: Option<Literal>,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Token {{\nkind: {},\nvalue: {}}}", self.kind, self.value)
    }
}

impl Token {
    fn is_one_of_many(&self, tokens: &[TokenKind]) -> bool {
        tokens.contains(&self.kind)
    }

    pub fn debug(&self) -> String {
        if self.is_one_of_many(&[
            TokenKind::String,
            TokenKind::Identifier,
            TokenKind::Integer,
            TokenKind::Float,
        ]) {
            format!(
                "{}:{} {} ({})",
                self.span.start.line, self.span.start.column, self.kind, self.value
            )
        } else {
            format!(
                "{}:{} {} ()",
                self.span.start.line, self.span.start.column, self.kind
            )
        }
    }
}
