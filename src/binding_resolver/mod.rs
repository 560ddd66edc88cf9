//! Scope and binding resolution.
//!
//! Tags each identifier as local, bound-free or global, attaches the symbol
//! table of every function to its node and updates the global scope.

pub mod binding_resolver;

#[cfg(test)]
mod tests;
