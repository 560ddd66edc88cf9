#![allow(clippy::module_inception)]

use std::rc::Rc;

use crate::{
    ast::statements::BlockStmt,
    binding_resolver::binding_resolver::resolve_bindings,
    call_resolver::call_resolver::resolve_calls,
    errors::errors::{Error, ErrorTip},
    lexer::lexer::tokenize,
    parser::parser::parse,
    scope::globals::GlobalScope,
};

pub mod ast;
pub mod binding_resolver;
pub mod call_resolver;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod scope;

extern crate regex;

/// A location in a source buffer.
///
/// `offset` is a byte offset; `line` and `column` are 1-based, with the
/// column counted in characters.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub offset: u32,
    pub line: u32,
    pub column: u32,
    pub file: Rc<String>,
}

impl Position {
    pub fn new(offset: u32, line: u32, column: u32, file: Rc<String>) -> Self {
        Position {
            offset,
            line,
            column,
            file,
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

    /// Span running from the start of `self` to the end of `other`.
    pub fn to(&self, other: &Span) -> Span {
        Span {
            start: self.start.clone(),
            end: other.end.clone(),
        }
    }
}

/// Runs one compilation unit through every front-end stage.
///
/// Stages run to completion one after another; the first stage reporting
/// errors stops the unit. `globals` is only modified when binding resolution
/// succeeds for the whole unit.
pub fn compile(
    source: &str,
    file: Option<String>,
    globals: &mut GlobalScope,
) -> Result<BlockStmt, Vec<Error>> {
    let file_name = Rc::new(file.clone().unwrap_or_else(|| String::from("shell")));

    let tokens = tokenize(source.to_string(), file)?;
    let (_, ast) = parse(tokens, file_name);
    let mut ast = ast?;

    resolve_calls(&mut ast, globals).map_err(|error| vec![error])?;
    resolve_bindings(&mut ast, globals)?;

    Ok(ast)
}

/// Returns the 1-based line number, the text of that line and the byte
/// offset of `position` within it.
pub fn get_line_at_position(source: &str, position: u32) -> Option<(usize, String, usize)> {
    let pos = position as usize;

    if pos > source.len() {
        return None;
    }

    let mut start = 0;
    let mut line_number = 1;

    for line in source.split_inclusive('\n') {
        let end = start + line.len();

        if (start..end).contains(&pos) {
            return Some((line_number, line.to_string(), pos - start));
        }

        start = end;
        line_number += 1;
    }

    // Position sits at the very end of the buffer
    let last = source.split_inclusive('\n').last().unwrap_or("");
    Some((line_number.max(2) - 1, last.to_string(), last.len()))
}

pub fn format_error(error: &Error, source: &str) -> String {
    /*
        Error: name (tip)
        -> input.cy
           |
        20 | x = 1 + $
           | --------^
    */

    let position = error.get_position();
    let mut output = String::new();

    if let ErrorTip::None = error.get_tip() {
        output.push_str(&format!("Error: {}\n", error.get_error_name()));
    } else {
        output.push_str(&format!(
            "Error: {} ({})\n",
            error.get_error_name(),
            error.get_tip()
        ));
    }
    output.push_str(&format!(
        "-> {}:{}:{}\n",
        position.file, position.line, position.column
    ));

    let Some((line, line_text, line_pos)) = get_line_at_position(source, position.offset) else {
        return output;
    };

    let line_string = line.to_string();
    let padding = line_string.len() + 2;

    output.push_str(&format!("{:>padding$}\n", "|"));

    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(&line_text);
    output.push_str(&format!("{} | {}\n", line_string, line_text_removed.trim_end()));

    let column = line_text[..line_pos.min(line_text.len())].chars().count();
    let arrows = column.saturating_sub(removed_whitespace) + 1;

    output.push_str(&format!("{:>padding$} {:->arrows$}\n", "|", "^"));
    output
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

    (string.chars().skip(start).collect(), start)
}
