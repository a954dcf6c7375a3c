//! Lexical scopes and the scope-chain operations.

use crate::dict::{Dict, SCOPE_BUCKETS};
use crate::gc::{Trace, Tracer};
use crate::Heap;
use core_types::{JsString, ScopeId, Value};

/// A lexical environment: a parent link and string-keyed bindings.
///
/// Only the global scope has no parent.
#[derive(Debug, Clone)]
pub struct Scope {
    /// Enclosing scope
    pub parent: Option<ScopeId>,
    /// Bindings declared directly in this scope
    pub bindings: Dict,
}

impl Scope {
    /// Creates an empty scope.
    pub fn new(parent: Option<ScopeId>) -> Self {
        Scope {
            parent,
            bindings: Dict::new(SCOPE_BUCKETS),
        }
    }
}

impl Trace for Scope {
    fn trace(&self, tracer: &mut Tracer) {
        if let Some(parent) = self.parent {
            tracer.edge(parent);
        }
        for (_, value) in self.bindings.entries() {
            tracer.value(value);
        }
    }
}

impl Heap {
    /// Declares `key` in `scope` itself, overwriting an existing binding
    /// there and shadowing any binding of the same name further out.
    pub fn scope_declare(&mut self, scope: ScopeId, key: impl Into<JsString>, value: Value) {
        if let Some(s) = self.scope_mut(scope) {
            s.bindings.insert(key, value);
        }
    }

    /// Assigns to the nearest scope owning `key`. Returns false, leaving
    /// every scope untouched, when no scope in the chain declares it.
    pub fn scope_set(&mut self, scope: ScopeId, key: &str, value: Value) -> bool {
        match self.scope_owning(scope, key) {
            Some(owner) => self
                .scope_mut(owner)
                .map(|s| s.bindings.update(key, value))
                .unwrap_or(false),
            None => false,
        }
    }

    /// Resolves `key` through the chain, `None` if no scope declares it.
    pub fn scope_lookup(&self, scope: ScopeId, key: &str) -> Option<Value> {
        let owner = self.scope_owning(scope, key)?;
        self.scope(owner)?.bindings.get(key).cloned()
    }

    /// Resolves `key` through the chain, `undefined` if unresolved.
    pub fn scope_get(&self, scope: ScopeId, key: &str) -> Value {
        self.scope_lookup(scope, key).unwrap_or(Value::Undefined)
    }

    /// Existence check, optionally restricted to `scope` itself.
    pub fn scope_contains(&self, scope: ScopeId, key: &str, include_parents: bool) -> bool {
        if include_parents {
            self.scope_owning(scope, key).is_some()
        } else {
            self.scope(scope)
                .map(|s| s.bindings.contains(key))
                .unwrap_or(false)
        }
    }

    fn scope_owning(&self, scope: ScopeId, key: &str) -> Option<ScopeId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let s = self.scope(id)?;
            if s.bindings.contains(key) {
                return Some(id);
            }
            current = s.parent;
        }
        None
    }
}
