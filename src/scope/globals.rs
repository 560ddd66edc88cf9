//! Global scope shared across compilation units
//!
//! A unit never writes to the global scope directly. Binding resolution
//! collects its changes in a `GlobalBatch`, which is committed in one step
//! once the whole unit resolved without errors.

use super::scope::{Scope, Symbol};

#[derive(Debug, Clone, PartialEq)]
pub enum GlobalChange {
    Declare(Symbol),
    Delete(String),
}

/// Pending global-scope changes of one unit, in program order
#[derive(Debug, Clone, Default)]
pub struct GlobalBatch {
    changes: Vec<GlobalChange>,
}

impl GlobalBatch {
    pub fn new() -> Self {
        GlobalBatch { changes: vec![] }
    }

    pub fn declare(&mut self, symbol: Symbol) {
        self.changes.push(GlobalChange::Declare(symbol));
    }

    pub fn delete(&mut self, name: impl Into<String>) {
        self.changes.push(GlobalChange::Delete(name.into()));
    }

    pub fn changes(&self) -> &[GlobalChange] {
        &self.changes
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// The global variable table of a host session.
///
/// Created empty and handed explicitly to every stage that needs it.
#[derive(Debug, Clone)]
pub struct GlobalScope {
    scope: Scope,
}

impl GlobalScope {
    pub fn new() -> Self {
        GlobalScope {
            scope: Scope::new(None, false),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.scope.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.scope.contains(name)
    }

    pub fn symbols(&self) -> &[Symbol] {
        self.scope.symbols()
    }

    pub fn is_empty(&self) -> bool {
        self.scope.is_empty()
    }

    /// Applies every change of `batch` in order.
    ///
    /// A name already known as a static function keeps that classification
    /// when it is assigned again; only `del` removes it.
    pub fn commit(&mut self, batch: GlobalBatch) {
        for change in batch.changes {
            match change {
                GlobalChange::Declare(symbol) => {
                    let keeps_static = self
                        .scope
                        .get(&symbol.name)
                        .is_some_and(|existing| existing.is_static_function);

                    if !keeps_static {
                        self.scope.declare(symbol);
                    }
                }
                GlobalChange::Delete(name) => {
                    self.scope.remove(&name);
                }
            }
        }
    }
}

impl Default for GlobalScope {
    fn default() -> Self {
        Self::new()
    }
}
