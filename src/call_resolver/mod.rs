//! Call resolution for juxtaposed expressions.
//!
//! Runs after parsing and before binding resolution. Every `AmbiguousExpr`
//! becomes a `CallExpr` or an implicit multiplication.

pub mod call_resolver;
