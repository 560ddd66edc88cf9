//! Error types and error handling for the front-end.
//!
//! This module defines the error values produced by every stage. It includes:
//!
//! - Error structures carrying the source span they refer to
//! - Variants for lexing, parsing and binding, plus an internal kind
//! - Error names and suggestions for the diagnostics printer
//!
//! Errors are always returned as values, never raised through panics.

pub mod errors;

#[cfg(test)]
mod tests;
