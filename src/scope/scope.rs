//! Scope tracking shared by the call and binding resolvers
//!
//! Scopes live in an arena indexed by `ScopeId`; a scope only refers to its
//! parent by id, so the tree can be walked upward without owning anything.

use std::collections::HashMap;

pub type ScopeId = usize;

/// How a name was introduced into its scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Parameter,
    /// Listed after `;` in a parameter list, captured from an enclosing scope
    BoundFree,
    Local,
    Global,
    /// Declared with `name(...) := ...`
    LocalFunction,
}

/// Annotation carried by an `@`-suffixed name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeHint {
    Callable,
}

/// Information about a declared name
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Scope the symbol was declared in
    pub scope: ScopeId,
    /// Declared with the `name(...) = body` form
    pub is_static_function: bool,
    pub type_hint: Option<TypeHint>,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind, scope: ScopeId) -> Self {
        Symbol {
            name: name.into(),
            kind,
            scope,
            is_static_function: false,
            type_hint: None,
        }
    }

    pub fn static_function(name: impl Into<String>, kind: SymbolKind, scope: ScopeId) -> Self {
        Symbol {
            is_static_function: true,
            ..Symbol::new(name, kind, scope)
        }
    }

    pub fn hinted(mut self, hinted: bool) -> Self {
        if hinted {
            self.type_hint = Some(TypeHint::Callable);
        }
        self
    }

    /// Whether juxtaposition with an argument list means a call.
    pub fn is_callable(&self) -> bool {
        self.is_static_function || self.type_hint.is_some()
    }
}

/// Resolution tag attached to every identifier after binding resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Local,
    BoundFree,
    Global,
    /// The reference was reported as an error
    Unbound,
}

/// Bound-variable table of one function, in declaration order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FunctionScope {
    pub symbols: Vec<Symbol>,
}

impl FunctionScope {
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|symbol| symbol.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.symbols.iter().map(|symbol| symbol.name.as_str()).collect()
    }
}

/// A single lexical scope level
#[derive(Debug, Clone)]
pub struct Scope {
    /// Enclosing scope, `None` for the global scope
    pub parent: Option<ScopeId>,
    /// Name to position in `order`
    index: HashMap<String, usize>,
    order: Vec<Symbol>,
    pub is_function: bool,
}

impl Scope {
    pub fn new(parent: Option<ScopeId>, is_function: bool) -> Self {
        Scope {
            parent,
            index: HashMap::new(),
            order: Vec::new(),
            is_function,
        }
    }

    /// Declares `symbol`, replacing a same-named symbol in place.
    pub fn declare(&mut self, symbol: Symbol) {
        match self.index.get(&symbol.name) {
            Some(position) => self.order[*position] = symbol,
            None => {
                self.index.insert(symbol.name.clone(), self.order.len());
                self.order.push(symbol);
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Symbol> {
        let position = self.index.remove(name)?;
        let symbol = self.order.remove(position);

        for slot in self.index.values_mut() {
            if *slot > position {
                *slot -= 1;
            }
        }

        Some(symbol)
    }

    /// Look up a symbol in this scope only
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.index.get(name).map(|position| &self.order[*position])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        self.index.get(name).map(|position| &mut self.order[*position])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All symbols in declaration order
    pub fn symbols(&self) -> &[Symbol] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn to_function_scope(&self) -> FunctionScope {
        FunctionScope {
            symbols: self.order.clone(),
        }
    }
}

/// Arena of scopes for one compilation unit. Scope 0 is the global scope.
#[derive(Debug, Clone)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
}

impl ScopeTree {
    pub const GLOBAL: ScopeId = 0;

    pub fn new() -> Self {
        ScopeTree {
            scopes: vec![Scope::new(None, false)],
        }
    }

    /// Opens a function scope nested in `parent`.
    pub fn push_function(&mut self, parent: ScopeId) -> ScopeId {
        self.scopes.push(Scope::new(Some(parent), true));
        self.scopes.len() - 1
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id]
    }

    pub fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id]
    }

    pub fn declare(&mut self, id: ScopeId, symbol: Symbol) {
        self.scopes[id].declare(symbol);
    }

    /// Look up a name, searching from `id` outward to the global scope
    pub fn lookup(&self, id: ScopeId, name: &str) -> Option<&Symbol> {
        self.ancestors(id)
            .find_map(|scope| self.scopes[scope].get(name))
    }

    /// `id` followed by each enclosing scope, ending at the global scope
    pub fn ancestors(&self, id: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        std::iter::successors(Some(id), move |current| self.scopes[*current].parent)
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_declare_keeps_order() {
        let mut scope = Scope::new(None, true);
        scope.declare(Symbol::new("b", SymbolKind::Parameter, 1));
        scope.declare(Symbol::new("a", SymbolKind::Local, 1));

        let names: Vec<&str> = scope.symbols().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert!(scope.contains("a"));
        assert_eq!(scope.len(), 2);
    }

    #[test]
    fn test_scope_redeclare_replaces_in_place() {
        let mut scope = Scope::new(None, true);
        scope.declare(Symbol::new("x", SymbolKind::BoundFree, 1));
        scope.declare(Symbol::new("y", SymbolKind::Local, 1));
        scope.declare(Symbol::new("x", SymbolKind::Local, 1));

        assert_eq!(scope.len(), 2);
        assert_eq!(scope.symbols()[0].kind, SymbolKind::Local);
    }

    #[test]
    fn test_scope_remove_reindexes() {
        let mut scope = Scope::new(None, false);
        scope.declare(Symbol::new("a", SymbolKind::Global, 0));
        scope.declare(Symbol::new("b", SymbolKind::Global, 0));
        scope.declare(Symbol::new("c", SymbolKind::Global, 0));

        assert!(scope.remove("a").is_some());
        assert!(scope.remove("a").is_none());
        assert_eq!(scope.get("c").map(|s| s.name.as_str()), Some("c"));
        assert_eq!(scope.len(), 2);
    }

    #[test]
    fn test_tree_lookup_walks_outward() {
        let mut tree = ScopeTree::new();
        tree.declare(ScopeTree::GLOBAL, Symbol::static_function("f", SymbolKind::Global, 0));

        let outer = tree.push_function(ScopeTree::GLOBAL);
        tree.declare(outer, Symbol::new("x", SymbolKind::Parameter, outer));
        let inner = tree.push_function(outer);

        assert_eq!(tree.lookup(inner, "x").map(|s| s.scope), Some(outer));
        assert!(tree.lookup(inner, "f").is_some_and(|s| s.is_static_function));
        assert!(tree.lookup(inner, "missing").is_none());
        assert_eq!(tree.ancestors(inner).collect::<Vec<_>>(), vec![inner, outer, 0]);
    }

    #[test]
    fn test_inner_declaration_shadows() {
        let mut tree = ScopeTree::new();
        tree.declare(ScopeTree::GLOBAL, Symbol::static_function("f", SymbolKind::Global, 0));
        let body = tree.push_function(ScopeTree::GLOBAL);
        tree.declare(body, Symbol::new("f", SymbolKind::Parameter, body));

        assert!(!tree.lookup(body, "f").is_some_and(|s| s.is_callable()));
    }

    #[test]
    fn test_hint_makes_callable() {
        let symbol = Symbol::new("g", SymbolKind::Parameter, 1).hinted(true);

        assert!(symbol.is_callable());
        assert_eq!(symbol.type_hint, Some(TypeHint::Callable));
        assert!(!Symbol::new("g", SymbolKind::Parameter, 1).hinted(false).is_callable());
    }
}
