//! Utility macros for the front-end.
//!
//! This module defines helper macros used throughout the crate:
//!
//! - `MK_TOKEN!` - Creates a Token instance
//! - `MK_DEFAULT_HANDLER!` - Creates a default lexer handler for simple tokens
//! - `MK_EXPR_COMMON!` / `MK_STMT_COMMON!` - Shared AST node trait methods
//!
//! These macros reduce boilerplate in the lexer and AST implementations.

/// Creates a Token instance.
///
/// # Arguments
///
/// * `$kind` - The TokenKind
/// * `$value` - The token's source text
/// * `$span` - The source span
/// * `$literal` - Optional decoded literal payload
///
/// # Example
///
/// ```ignore
/// let token = MK_TOKEN!(TokenKind::Identifier, "x".to_string(), span);
/// ```
#[macro_export]
macro_rules! MK_TOKEN {
    ($kind:expr, $value:expr, $span:expr) => {
        Token {
            kind: $kind,
            value: $value,
            span: $span,
            literal: None,
        }
    };
    ($kind:expr, $value:expr, $span:expr, $literal:expr) => {
        Token {
            kind: $kind,
            value: $value,
            span: $span,
            literal: Some($literal),
        }
    };
}

/// Creates a default lexer handler for simple single-token patterns.
///
/// Generates a handler function that creates a token with the given kind
/// and advances the lexer position by the token's length in bytes.
///
/// # Arguments
///
/// * `$kind` - The TokenKind to create
/// * `$value` - The literal string value (used for length calculation)
///
/// # Example
///
/// ```ignore
/// RegexPattern {
///     regex: Regex::new("^\\+").unwrap(),
///     handler: MK_DEFAULT_HANDLER!(TokenKind::Plus, "+"),
/// }
/// ```
#[macro_export]
macro_rules! MK_DEFAULT_HANDLER {
    ($kind:expr, $value:literal) => {
        |lexer: &mut Lexer, _regex: &Regex| -> Result<(), Error> {
            let span = lexer.span_of($value.len());
            lexer.push(MK_TOKEN!($kind, String::from($value), span));
            lexer.advance_n($value.len());
            Ok(())
        }
    };
}

/// Expands to the `Expr` methods every expression node implements the same way.
///
/// The node must be `Clone` and have a `span: Span` field.
#[macro_export]
macro_rules! MK_EXPR_COMMON {
    () => {
        fn as_any(&self) -> &dyn ::std::any::Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
            self
        }
        fn into_any(self: Box<Self>) -> Box<dyn ::std::any::Any> {
            self
        }
        fn clone_wrapper(&self) -> $crate::ast::ast::ExprWrapper {
            $crate::ast::ast::ExprWrapper::new(self.clone())
        }
        fn get_span(&self) -> &$crate::Span {
            &self.span
        }
    };
}

/// Expands to the `Stmt` methods every statement node implements the same way.
#[macro_export]
macro_rules! MK_STMT_COMMON {
    () => {
        fn as_any(&self) -> &dyn ::std::any::Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
            self
        }
        fn clone_wrapper(&self) -> $crate::ast::ast::StmtWrapper {
            $crate::ast::ast::StmtWrapper::new(self.clone())
        }
        fn get_span(&self) -> &$crate::Span {
            &self.span
        }
    };
}
