//! Scope management for free-variable analysis.

use rustc_hash::FxHashSet;

/// A stack of lexical scopes, each holding the names bound in it.
///
/// A name is bound if any open scope contains it. Popping a scope forgets its
/// bindings, so names declared in a block are invisible once the block ends.
#[derive(Debug, Default)]
pub struct ScopeStack<'a> {
    scopes: Vec<FxHashSet<&'a str>>,
}

impl<'a> ScopeStack<'a> {
    pub fn new() -> Self {
        Self { scopes: Vec::new() }
    }

    /// Open a new innermost scope.
    pub fn push(&mut self) {
        self.scopes.push(FxHashSet::default());
    }

    /// Close the innermost scope. Popping an empty stack is a no-op.
    pub fn pop(&mut self) {
        self.scopes.pop();
    }

    /// Bind `name` in the innermost scope, opening one if none is open.
    pub fn bind(&mut self, name: &'a str) {
        if self.scopes.is_empty() {
            self.push();
        }
        if let Some(innermost) = self.scopes.last_mut() {
            innermost.insert(name);
        }
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.scopes.iter().rev().any(|scope| scope.contains(name))
    }

    /// Number of open scopes.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}
