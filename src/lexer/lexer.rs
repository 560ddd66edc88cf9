use std::{collections::VecDeque, rc::Rc};

use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position, Span, MK_DEFAULT_HANDLER, MK_TOKEN,
};

use super::tokens::{Literal, Token, TokenKind, IMAGINARY_GLYPH, RESERVED_LOOKUP};

pub type RegexHandler = fn(&mut Lexer, &Regex) -> Result<(), Error>;

pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

/// Characters allowed after the first one in an identifier
const IDENTIFIER_CONTINUE: &str = "[[\\p{L}\\p{Nd}]--[𝒊]]";

lazy_static! {
    static ref IDENTIFIER_CONTINUE_CHAR: Regex =
        Regex::new(&format!("^{}$", IDENTIFIER_CONTINUE)).unwrap();

    /// Ordered pattern table; the first pattern matching at the cursor wins,
    /// so longer operators must precede their prefixes.
    static ref PATTERNS: Vec<RegexPattern> = vec![
        RegexPattern { regex: Regex::new("^\r?\n").unwrap(), handler: newline_handler },
        RegexPattern { regex: Regex::new("^[ \t]+").unwrap(), handler: skip_handler },
        RegexPattern { regex: Regex::new("^#[^\n]*").unwrap(), handler: skip_handler },
        RegexPattern { regex: Regex::new("^\\.?[0-9]").unwrap(), handler: number_handler },
        RegexPattern { regex: Regex::new("^𝒊").unwrap(), handler: imaginary_unit_handler },
        RegexPattern { regex: Regex::new(&format!("^[[\\p{{L}}_]--[𝒊]]{}*", IDENTIFIER_CONTINUE)).unwrap(), handler: symbol_handler },
        RegexPattern { regex: Regex::new("^\"").unwrap(), handler: string_handler },
        RegexPattern { regex: Regex::new("^\\[").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::OpenBracket, "[") },
        RegexPattern { regex: Regex::new("^\\]").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::CloseBracket, "]") },
        RegexPattern { regex: Regex::new("^\\{").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::OpenCurly, "{") },
        RegexPattern { regex: Regex::new("^\\}").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::CloseCurly, "}") },
        RegexPattern { regex: Regex::new("^\\(").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::OpenParen, "(") },
        RegexPattern { regex: Regex::new("^\\)").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::CloseParen, ")") },
        RegexPattern { regex: Regex::new("^:=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::ColonEquals, ":=") },
        RegexPattern { regex: Regex::new("^->").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Arrow, "->") },
        RegexPattern { regex: Regex::new("^==").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Equals, "==") },
        RegexPattern { regex: Regex::new("^!=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::NotEquals, "!=") },
        RegexPattern { regex: Regex::new("^<<").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::ShiftLeft, "<<") },
        RegexPattern { regex: Regex::new("^>>").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::ShiftRight, ">>") },
        RegexPattern { regex: Regex::new("^<=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::LessEquals, "<=") },
        RegexPattern { regex: Regex::new("^>=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::GreaterEquals, ">=") },
        RegexPattern { regex: Regex::new("^<").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Less, "<") },
        RegexPattern { regex: Regex::new("^>").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Greater, ">") },
        RegexPattern { regex: Regex::new("^=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Assignment, "=") },
        RegexPattern { regex: Regex::new("^!").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Bang, "!") },
        RegexPattern { regex: Regex::new("^,").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Comma, ",") },
        RegexPattern { regex: Regex::new("^;").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Semicolon, ";") },
        RegexPattern { regex: Regex::new("^:").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Colon, ":") },
        RegexPattern { regex: Regex::new("^@").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::At, "@") },
        RegexPattern { regex: Regex::new("^\\+").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Plus, "+") },
        RegexPattern { regex: Regex::new("^-").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Dash, "-") },
        RegexPattern { regex: Regex::new("^\\|").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Pipe, "|") },
        RegexPattern { regex: Regex::new("^~").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Tilde, "~") },
        RegexPattern { regex: Regex::new("^\\*").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Star, "*") },
        RegexPattern { regex: Regex::new("^/").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Slash, "/") },
        RegexPattern { regex: Regex::new("^\\\\").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Backslash, "\\") },
        RegexPattern { regex: Regex::new("^%").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Percent, "%") },
        RegexPattern { regex: Regex::new("^&").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Ampersand, "&") },
        RegexPattern { regex: Regex::new("^\\^").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Caret, "^") },
        RegexPattern { regex: Regex::new("^√").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Sqrt, "√") },
    ];
}

/// Lazy, indentation-aware tokenizer.
///
/// Tokens are produced on demand through the `Iterator` impl. After an error
/// the lexer skips to the next newline and carries on, so one pass reports
/// every bad line. A lexer can only be restarted by building a new one over
/// the same source.
pub struct Lexer {
    source: String,
    pos: usize,
    file: Rc<String>,
    line: u32,
    line_start: usize,
    pending: VecDeque<Token>,
    indent_stack: Vec<usize>,
    /// Bracket nesting; layout is ignored while this is non-zero
    depth: usize,
    at_line_start: bool,
    line_has_content: bool,
    finished: bool,
}

impl Lexer {
    pub fn new(source: String, file: Option<String>) -> Lexer {
        let file_name = if let Some(file) = file {
            Rc::new(file)
        } else {
            Rc::new(String::from("shell"))
        };

        Lexer {
            source,
            pos: 0,
            file: file_name,
            line: 1,
            line_start: 0,
            pending: VecDeque::new(),
            indent_stack: vec![0],
            depth: 0,
            at_line_start: true,
            line_has_content: false,
            finished: false,
        }
    }

    pub fn advance_n(&mut self, n: usize) {
        self.pos += n;
    }

    pub fn push(&mut self, token: Token) {
        if token.kind.is_opening_bracket() {
            self.depth += 1;
        } else if token.kind.is_closing_bracket() {
            self.depth = self.depth.saturating_sub(1);
        }

        if !token.kind.is_synthetic() {
            self.line_has_content = true;
        }

        self.pending.push_back(token);
    }

    pub fn remainder(&self) -> &str {
        &self.source[self.pos..]
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// Position of a byte offset on the current line.
    fn position_at(&self, offset: usize) -> Position {
        let column = self.source[self.line_start..offset].chars().count() as u32 + 1;
        Position::new(offset as u32, self.line, column, Rc::clone(&self.file))
    }

    /// Span of the next `len` bytes.
    pub fn span_of(&self, len: usize) -> Span {
        self.span_at(0, len)
    }

    /// Span of `len` bytes starting `from` bytes past the cursor.
    pub fn span_at(&self, from: usize, len: usize) -> Span {
        Span::new(
            self.position_at(self.pos + from),
            self.position_at(self.pos + from + len),
        )
    }

    fn start_line(&mut self) {
        self.line += 1;
        self.line_start = self.pos;

        if self.depth == 0 {
            self.at_line_start = true;
            self.line_has_content = false;
        }
    }

    fn handle_indentation(&mut self) -> Result<(), Error> {
        self.at_line_start = false;

        let width = self
            .remainder()
            .chars()
            .take_while(|c| *c == ' ' || *c == '\t')
            .count();

        // Blank and comment-only lines have no say in the layout
        match self.remainder()[width..].chars().next() {
            None | Some('\n') | Some('\r') | Some('#') => return Ok(()),
            _ => {}
        }

        let current = *self.indent_stack.last().unwrap_or(&0);

        if width > current {
            let span = self.span_of(width);
            let text = self.remainder()[..width].to_string();
            self.indent_stack.push(width);
            self.push(MK_TOKEN!(TokenKind::Indent, text, span));
        } else if width < current {
            while width < *self.indent_stack.last().unwrap_or(&0) {
                self.indent_stack.pop();
                let span = self.span_at(width, 0);
                self.push(MK_TOKEN!(TokenKind::Dedent, String::new(), span));
            }

            if *self.indent_stack.last().unwrap_or(&0) != width {
                return Err(Error::new(
                    ErrorImpl::IndentationError { width },
                    self.span_of(width),
                ));
            }
        }

        self.advance_n(width);
        Ok(())
    }

    fn finish(&mut self) {
        let end = self.span_of(0);

        if self.line_has_content {
            self.push(MK_TOKEN!(TokenKind::Newline, String::new(), end.clone()));
            self.line_has_content = false;
        }

        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            self.push(MK_TOKEN!(TokenKind::Dedent, String::new(), end.clone()));
        }

        self.push(MK_TOKEN!(TokenKind::EOF, String::new(), end));
        self.finished = true;
    }

    fn step(&mut self) -> Result<(), Error> {
        if self.at_line_start && self.depth == 0 {
            return self.handle_indentation();
        }

        if self.at_eof() {
            self.finish();
            return Ok(());
        }

        for pattern in PATTERNS.iter() {
            let matched_here = pattern
                .regex
                .find(self.remainder())
                .is_some_and(|found| found.start() == 0);

            if matched_here {
                return (pattern.handler)(self, &pattern.regex);
            }
        }

        let character = self.remainder().chars().next().unwrap_or_default();
        Err(Error::new(
            ErrorImpl::UnknownCharacter {
                character: character.to_string(),
            },
            self.span_of(character.len_utf8()),
        ))
    }

    /// Resynchronizes at the next newline after an error.
    ///
    /// Brackets left open on the failed line are dropped so the next line
    /// goes through layout handling again.
    fn recover(&mut self) {
        self.depth = 0;
        match self.remainder().find('\n') {
            Some(offset) => self.advance_n(offset),
            None => self.pos = self.source.len(),
        }
    }
}

impl Iterator for Lexer {
    type Item = Result<Token, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(Ok(token));
            }

            if self.finished {
                return None;
            }

            if let Err(error) = self.step() {
                self.recover();
                return Some(Err(error));
            }
        }
    }
}

fn matched_len(lexer: &Lexer, regex: &Regex) -> usize {
    regex
        .find(lexer.remainder())
        .map(|found| found.end())
        .unwrap_or(0)
}

fn skip_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = matched_len(lexer, regex);
    lexer.advance_n(matched);
    Ok(())
}

fn newline_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = matched_len(lexer, regex);

    if lexer.depth == 0 && lexer.line_has_content {
        let span = lexer.span_of(matched);
        let text = lexer.remainder()[..matched].to_string();
        lexer.push(MK_TOKEN!(TokenKind::Newline, text, span));
    }

    lexer.advance_n(matched);
    lexer.start_line();
    Ok(())
}

fn is_identifier_continue(c: char) -> bool {
    IDENTIFIER_CONTINUE_CHAR.is_match(c.encode_utf8(&mut [0; 4]))
}

fn is_digit_of(c: char, radix: u32) -> bool {
    c.is_digit(radix)
}

/// Length of a run of digits of `radix` and `_` separators.
fn digit_run(text: &str, radix: u32) -> usize {
    text.char_indices()
        .find(|(_, c)| !(is_digit_of(*c, radix) || *c == '_'))
        .map(|(index, _)| index)
        .unwrap_or(text.len())
}

fn number_handler(lexer: &mut Lexer, _regex: &Regex) -> Result<(), Error> {
    let rest = lexer.remainder();
    let bytes = rest.as_bytes();

    let (radix, prefix_len) = if bytes.len() >= 2 && bytes[0] == b'0' {
        match bytes[1] {
            b'b' | b'B' => (2, 2),
            b'o' | b'O' => (8, 2),
            b'x' | b'X' => (16, 2),
            _ => (10, 0),
        }
    } else {
        (10, 0)
    };

    let mut end = prefix_len;
    let mut is_float = false;

    if radix != 10 {
        end += digit_run(&rest[end..], radix);
    } else {
        end += digit_run(rest, 10);

        let after_point = rest[end..].strip_prefix('.');
        if let Some(after) = after_point {
            let next_is_digit = after.chars().next().is_some_and(|c| c.is_ascii_digit());
            if end > 0 || next_is_digit {
                is_float = true;
                end += 1;
                end += digit_run(&rest[end..], 10);
            }
        }

        let mut exponent = rest[end..].chars();
        if matches!(exponent.next(), Some('e') | Some('E')) {
            let sign_len = match exponent.clone().next() {
                Some('+') | Some('-') => {
                    exponent.next();
                    1
                }
                _ => 0,
            };
            if exponent.next().is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                end += 1 + sign_len;
                end += digit_run(&rest[end..], 10);
            }
        }
    }

    // Imaginary marker: `_i` glued to the digits, or the reserved glyph
    let mut body_end = end;
    let mut imaginary = false;
    if rest[..end].ends_with('_') && rest[end..].starts_with('i') {
        let after = rest[end + 1..].chars().next();
        if !after.is_some_and(is_identifier_continue) {
            imaginary = true;
            body_end = end - 1;
            end += 1;
        }
    } else if rest[end..].starts_with(IMAGINARY_GLYPH) {
        imaginary = true;
        end += IMAGINARY_GLYPH.len_utf8();
    }

    let body = &rest[prefix_len..body_end];
    let literal_error = |reason: &str| {
        Error::new(
            ErrorImpl::LiteralSyntaxError {
                literal: rest[..end].to_string(),
                reason: reason.to_string(),
            },
            lexer.span_of(end),
        )
    };

    if body.is_empty() {
        return Err(literal_error("missing digits after the base prefix"));
    }

    let chars: Vec<char> = body.chars().collect();
    for (index, c) in chars.iter().enumerate() {
        if *c != '_' {
            continue;
        }
        let before = index.checked_sub(1).and_then(|i| chars.get(i));
        let after = chars.get(index + 1);
        if !before.is_some_and(|b| is_digit_of(*b, radix)) || !after.is_some_and(|a| is_digit_of(*a, radix)) {
            return Err(literal_error("`_` separators must sit between two digits"));
        }
    }

    if rest[end..].chars().next().is_some_and(|c| c.is_ascii_digit()) {
        return Err(literal_error("digit out of range for the base"));
    }

    let digits = body.replace('_', "");
    let (kind, literal) = if is_float {
        (
            TokenKind::Float,
            Literal::Float {
                text: digits,
                imaginary,
            },
        )
    } else {
        (
            TokenKind::Integer,
            Literal::Integer {
                radix,
                digits,
                imaginary,
            },
        )
    };

    let value = rest[..end].to_string();
    let span = lexer.span_of(end);
    lexer.push(MK_TOKEN!(kind, value, span, literal));
    lexer.advance_n(end);
    Ok(())
}

fn imaginary_unit_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = matched_len(lexer, regex);
    let span = lexer.span_of(matched);
    let literal = Literal::Integer {
        radix: 10,
        digits: String::from("1"),
        imaginary: true,
    };

    lexer.push(MK_TOKEN!(TokenKind::Integer, IMAGINARY_GLYPH.to_string(), span, literal));
    lexer.advance_n(matched);
    Ok(())
}

fn string_handler(lexer: &mut Lexer, _regex: &Regex) -> Result<(), Error> {
    let rest = lexer.remainder();
    let mut chars = rest.char_indices().skip(1).peekable();
    let mut result = String::new();
    let mut end = None;

    while let Some((index, ch)) = chars.next() {
        match ch {
            '"' => {
                end = Some(index + 1);
                break;
            }
            '\n' => break,
            '\\' => {
                let Some((escape_index, escape)) = chars.next() else {
                    break;
                };
                let invalid = |len: usize| {
                    Error::new(
                        ErrorImpl::InvalidEscapeSequence {
                            sequence: rest[index..escape_index + len].to_string(),
                        },
                        lexer.span_at(index, escape_index + len - index),
                    )
                };

                match escape {
                    'n' => result.push('\n'),
                    't' => result.push('\t'),
                    'r' => result.push('\r'),
                    '0' => result.push('\0'),
                    '\\' => result.push('\\'),
                    '"' => result.push('"'),
                    'x' => {
                        let hex: String = rest[escape_index + 1..].chars().take(2).collect();
                        let value = if hex.len() == 2 {
                            u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32)
                        } else {
                            None
                        };
                        match value {
                            Some(value) => {
                                result.push(value);
                                chars.next();
                                chars.next();
                            }
                            None => return Err(invalid(1 + hex.len())),
                        }
                    }
                    'u' => {
                        let tail = &rest[escape_index + 1..];
                        let close = tail.find('}').filter(|_| tail.starts_with('{'));
                        let value = close
                            .map(|close| &tail[1..close])
                            .filter(|hex| !hex.is_empty() && hex.len() <= 6)
                            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                            .and_then(char::from_u32);
                        match (value, close) {
                            (Some(value), Some(close)) => {
                                result.push(value);
                                for _ in 0..=close {
                                    chars.next();
                                }
                            }
                            _ => return Err(invalid(1)),
                        }
                    }
                    '\n' => break,
                    other => return Err(invalid(other.len_utf8())),
                }
            }
            _ => result.push(ch),
        }
    }

    let Some(end) = end else {
        let line_len = rest.find('\n').unwrap_or(rest.len());
        return Err(Error::new(
            ErrorImpl::UnterminatedString,
            lexer.span_of(line_len),
        ));
    };

    let value = rest[..end].to_string();
    let span = lexer.span_of(end);
    lexer.push(MK_TOKEN!(TokenKind::String, value, span, Literal::Str(result)));
    lexer.advance_n(end);
    Ok(())
}

fn symbol_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = matched_len(lexer, regex);
    let value = lexer.remainder()[..matched].to_string();
    let span = lexer.span_of(matched);

    if let Some(kind) = RESERVED_LOOKUP.get(value.as_str()) {
        lexer.push(MK_TOKEN!(*kind, value, span));
    } else {
        lexer.push(MK_TOKEN!(TokenKind::Identifier, value, span));
    }

    lexer.advance_n(matched);
    Ok(())
}

/// Tokenizes a whole buffer, collecting every lexing error.
pub fn tokenize(source: String, file: Option<String>) -> Result<Vec<Token>, Vec<Error>> {
    let mut tokens = vec![];
    let mut errors = vec![];

    for item in Lexer::new(source, file) {
        match item {
            Ok(token) => tokens.push(token),
            Err(error) => errors.push(error),
        }
    }

    if errors.is_empty() {
        Ok(tokens)
    } else {
        Err(errors)
    }
}
