use std::fmt::Display;

use thiserror::Error;

use crate::{Position, Span};

/// Which stage of the pipeline an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lex,
    Parse,
    Binding,
    /// Broken front-end invariant rather than a problem with the input
    Internal,
}

#[derive(Debug, Clone)]
pub struct Error {
    internal_error: ErrorImpl,
    span: Span,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, span: Span) -> Self {
        Error {
            internal_error: error_impl,
            span,
        }
    }

    pub fn internal(message: impl Into<String>, span: Span) -> Self {
        Error::new(
            ErrorImpl::InternalError {
                message: message.into(),
            },
            span,
        )
    }

    pub fn get_position(&self) -> &Position {
        &self.span.start
    }

    pub fn get_span(&self) -> &Span {
        &self.span
    }

    pub fn get_impl(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_kind(&self) -> ErrorKind {
        match &self.internal_error {
            ErrorImpl::UnterminatedString
            | ErrorImpl::InvalidEscapeSequence { .. }
            | ErrorImpl::UnknownCharacter { .. }
            | ErrorImpl::IndentationError { .. }
            | ErrorImpl::LiteralSyntaxError { .. } => ErrorKind::Lex,
            ErrorImpl::UnexpectedToken { .. }
            | ErrorImpl::UnexpectedTokenDetailed { .. }
            | ErrorImpl::MismatchedBlock { .. }
            | ErrorImpl::MalformedLiteral { .. } => ErrorKind::Parse,
            ErrorImpl::UnboundFreeVariable { .. } | ErrorImpl::GlobalDeleteOfNonGlobal { .. } => {
                ErrorKind::Binding
            }
            ErrorImpl::InternalError { .. } => ErrorKind::Internal,
        }
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnterminatedString => "UnterminatedString",
            ErrorImpl::InvalidEscapeSequence { .. } => "InvalidEscapeSequence",
            ErrorImpl::UnknownCharacter { .. } => "UnknownCharacter",
            ErrorImpl::IndentationError { .. } => "IndentationError",
            ErrorImpl::LiteralSyntaxError { .. } => "LiteralSyntaxError",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::MismatchedBlock { .. } => "MismatchedBlock",
            ErrorImpl::MalformedLiteral { .. } => "MalformedLiteral",
            ErrorImpl::UnboundFreeVariable { .. } => "UnboundFreeVariableError",
            ErrorImpl::GlobalDeleteOfNonGlobal { .. } => "GlobalDeleteOfNonGlobalError",
            ErrorImpl::InternalError { .. } => "InternalError",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnterminatedString => {
                ErrorTip::Suggestion(String::from("String literal is missing its closing `\"`"))
            }
            ErrorImpl::InvalidEscapeSequence { sequence } => ErrorTip::Suggestion(format!(
                "Unknown escape sequence `{}`, expected one of \\n \\t \\r \\0 \\\\ \\\" \\x## \\u{{...}}",
                sequence
            )),
            ErrorImpl::UnknownCharacter { .. } => ErrorTip::None,
            ErrorImpl::IndentationError { width } => ErrorTip::Suggestion(format!(
                "Indentation of {} does not match any enclosing block",
                width
            )),
            ErrorImpl::LiteralSyntaxError { literal, reason } => {
                ErrorTip::Suggestion(format!("Invalid number literal `{}`: {}", literal, reason))
            }
            ErrorImpl::UnexpectedToken { token } => ErrorTip::Suggestion(format!(
                "Unexpected token: `{}`, did you miss a newline or `;`?",
                token
            )),
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::MismatchedBlock { message } => ErrorTip::Suggestion(message.clone()),
            ErrorImpl::MalformedLiteral { literal } => {
                ErrorTip::Suggestion(format!("Literal `{}` could not be decoded", literal))
            }
            ErrorImpl::UnboundFreeVariable { variable, reason } => ErrorTip::Suggestion(format!(
                "`{}` {}; list it after `;` in the parameter list to bind it explicitly",
                variable, reason
            )),
            ErrorImpl::GlobalDeleteOfNonGlobal { variable } => ErrorTip::Suggestion(format!(
                "`{}` is not a global variable and cannot be deleted",
                variable
            )),
            ErrorImpl::InternalError { message } => ErrorTip::Suggestion(format!(
                "Internal front-end error: {}",
                message
            )),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let start = &self.span.start;
        write!(
            f,
            "{} at {}:{}:{}",
            self.internal_error, start.file, start.line, start.column
        )
    }
}

impl std::error::Error for Error {}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    // Lexing
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("invalid escape sequence: {sequence:?}")]
    InvalidEscapeSequence { sequence: String },
    #[error("unknown character: {character:?}")]
    UnknownCharacter { character: String },
    #[error("indentation of width {width} matches no enclosing block")]
    IndentationError { width: usize },
    #[error("invalid literal {literal:?}: {reason}")]
    LiteralSyntaxError { literal: String, reason: String },

    // Parsing
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message:?}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("mismatched block: {message}")]
    MismatchedBlock { message: String },
    #[error("malformed literal: {literal:?}")]
    MalformedLiteral { literal: String },

    // Binding
    #[error("unbound free variable {variable:?}: {reason}")]
    UnboundFreeVariable { variable: String, reason: String },
    #[error("cannot delete non-global variable {variable:?}")]
    GlobalDeleteOfNonGlobal { variable: String },

    #[error("internal error: {message}")]
    InternalError { message: String },
}
