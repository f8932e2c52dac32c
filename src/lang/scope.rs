//! Lexical scopes for name bindings.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use super::object::Object;

/// A lexical binding frame chained to its enclosing frame.
///
/// Scopes are shared through `Rc` so a closure keeps its defining scope
/// alive. A scope never points at its children.
#[derive(Debug, Default)]
pub struct Scope {
    store: RefCell<FxHashMap<String, Object>>,
    parent: Option<Rc<Scope>>,
}

impl Scope {
    pub fn new(parent: Option<Rc<Scope>>) -> Rc<Self> {
        Rc::new(Self {
            store: RefCell::new(FxHashMap::default()),
            parent,
        })
    }

    /// Creates a scope with no parent.
    pub fn root() -> Rc<Self> {
        Self::new(None)
    }

    /// Creates a child scope of `parent`.
    pub fn enclosed(parent: &Rc<Scope>) -> Rc<Self> {
        Self::new(Some(Rc::clone(parent)))
    }

    /// Looks `name` up here, then in each ancestor outward.
    pub fn get(&self, name: &str) -> Option<Object> {
        if let Some(value) = self.store.borrow().get(name) {
            return Some(value.clone());
        }
        self.parent.as_ref().and_then(|parent| parent.get(name))
    }

    /// Binds `name` in this scope, shadowing any ancestor binding.
    pub fn set(&self, name: impl Into<String>, value: Object) -> Object {
        self.store.borrow_mut().insert(name.into(), value.clone());
        value
    }

    /// Whether `name` is bound in this scope itself.
    pub fn contains_local(&self, name: &str) -> bool {
        self.store.borrow().contains_key(name)
    }

    pub fn parent(&self) -> Option<&Rc<Scope>> {
        self.parent.as_ref()
    }

    /// Number of ancestors between this scope and the root.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.parent.as_ref();
        while let Some(scope) = current {
            depth += 1;
            current = scope.parent.as_ref();
        }
        depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_new() {
        let scope = Scope::root();
        assert_eq!(scope.depth(), 0);
        assert!(scope.parent().is_none());
        assert_eq!(scope.get("x"), None);
    }

    #[test]
    fn test_set_returns_value() {
        let scope = Scope::root();
        assert_eq!(scope.set("x", Object::Integer(1)), Object::Integer(1));
        assert_eq!(scope.get("x"), Some(Object::Integer(1)));
    }

    #[test]
    fn test_get_walks_ancestors() {
        let root = Scope::root();
        root.set("x", Object::Integer(1));
        let middle = Scope::enclosed(&root);
        let leaf = Scope::enclosed(&middle);

        assert_eq!(leaf.depth(), 2);
        assert_eq!(leaf.get("x"), Some(Object::Integer(1)));
        assert!(!leaf.contains_local("x"));
    }

    #[test]
    fn test_set_shadows_without_mutating_parent() {
        let root = Scope::root();
        root.set("x", Object::Integer(1));
        let child = Scope::enclosed(&root);
        child.set("x", Object::Integer(2));

        assert_eq!(child.get("x"), Some(Object::Integer(2)));
        assert_eq!(root.get("x"), Some(Object::Integer(1)));
    }

    #[test]
    fn test_child_outlives_parent_handle() {
        let root = Scope::root();
        root.set("greeting", Object::String("hi".to_string()));
        let child = Scope::enclosed(&root);
        drop(root);

        assert_eq!(
            child.get("greeting"),
            Some(Object::String("hi".to_string()))
        );
    }

    #[test]
    fn test_rebinding_in_same_scope_replaces() {
        let scope = Scope::root();
        scope.set("x", Object::Integer(1));
        scope.set("x", Object::Boolean(true));
        assert_eq!(scope.get("x"), Some(Object::Boolean(true)));
    }
}
