//! Lexical environments.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Var,
    Let,
    Const,
    Function,
    Parameter,
}

struct Binding<'a> {
    kind: BindingKind,
    /// `None` while a `let`/`const` binding is in its temporal dead zone.
    value: Option<Value<'a>>,
}

/// Why a lookup or assignment failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessError {
    NotDefined,
    Uninitialized,
    ConstAssignment,
}

/// One scope of variables and a link to the enclosing one.
pub struct Environment<'a> {
    bindings: RefCell<FxHashMap<String, Binding<'a>>>,
    parent: Option<Rc<Environment<'a>>>,
}

impl<'a> Environment<'a> {
    pub fn global() -> Rc<Self> {
        Rc::new(Self {
            bindings: RefCell::new(FxHashMap::default()),
            parent: None,
        })
    }

    pub fn child(parent: &Rc<Environment<'a>>) -> Rc<Self> {
        Rc::new(Self {
            bindings: RefCell::new(FxHashMap::default()),
            parent: Some(Rc::clone(parent)),
        })
    }

    /// Create or overwrite a binding in this scope. A `var` redeclaration
    /// keeps the current value.
    pub fn declare(&self, name: &str, kind: BindingKind, value: Option<Value<'a>>) {
        let mut bindings = self.bindings.borrow_mut();
        if kind == BindingKind::Var {
            if let Some(existing) = bindings.get(name) {
                if existing.value.is_some() {
                    return;
                }
            }
        }
        bindings.insert(name.to_string(), Binding { kind, value });
    }

    /// End the dead zone of a `let`/`const` binding in this scope.
    pub fn initialize(&self, name: &str, value: Value<'a>) {
        if let Some(binding) = self.bindings.borrow_mut().get_mut(name) {
            binding.value = Some(value);
        }
    }

    pub fn has_binding(&self, name: &str) -> bool {
        self.bindings.borrow().contains_key(name)
    }

    pub fn is_resolvable(&self, name: &str) -> bool {
        self.has_binding(name) || self.parent.as_ref().is_some_and(|p| p.is_resolvable(name))
    }

    pub fn get(&self, name: &str) -> Result<Value<'a>, AccessError> {
        if let Some(binding) = self.bindings.borrow().get(name) {
            return binding.value.clone().ok_or(AccessError::Uninitialized);
        }
        match &self.parent {
            Some(parent) => parent.get(name),
            None => Err(AccessError::NotDefined),
        }
    }

    /// Assign to the nearest binding of `name`.
    pub fn set(&self, name: &str, value: Value<'a>) -> Result<(), AccessError> {
        if let Some(binding) = self.bindings.borrow_mut().get_mut(name) {
            return match (binding.kind, &binding.value) {
                (_, None) => Err(AccessError::Uninitialized),
                (BindingKind::Const, _) => Err(AccessError::ConstAssignment),
                _ => {
                    binding.value = Some(value);
                    Ok(())
                }
            };
        }
        match &self.parent {
            Some(parent) => parent.set(name, value),
            None => Err(AccessError::NotDefined),
        }
    }
}
