//! Scope tables for the resolvers.
//!
//! - `scope`: symbols, scopes and the per-unit scope arena
//! - `globals`: the cross-unit global scope and its atomic change batch

pub mod globals;
pub mod scope;
