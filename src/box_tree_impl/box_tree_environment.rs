//! Binding frames used to look up variables during substitution.

use std::collections::HashMap;

use crate::box_tree_impl::box_tree_ast::ExprNode;

/// One frame of bindings. Child frames borrow their parent, so a frame can
/// never outlive the substitution call that created it. The global frame is
/// the one with no parent.
#[derive(Debug, Default)]
pub struct Environment<'a> {
    values: HashMap<String, ExprNode>,
    parent: Option<&'a Environment<'a>>,
}

impl<'a> Environment<'a> {
    /// Creates an empty root frame.
    pub fn new() -> Environment<'a> {
        return Environment {
            values: HashMap::new(),
            parent: None,
        };
    }

    /// Creates an empty frame whose lookups fall back to `self`.
    pub fn new_child<'b>(&'b self) -> Environment<'b> {
        return Environment {
            values: HashMap::new(),
            parent: Some(self),
        };
    }

    /// Looks `name` up in this frame, then in each ancestor in turn.
    pub fn find(&self, name: &str) -> Option<&ExprNode> {
        match self.values.get(name) {
            Some(value) => return Some(value),
            None => return self.parent.and_then(|parent| parent.find(name)),
        }
    }

    /// Binds `name` in this frame only, hiding any binding of the same name
    /// in an ancestor.
    pub fn set(&mut self, name: &str, value: ExprNode) {
        self.values.insert(String::from(name), value);
    }

    /// The names bound directly in this frame, sorted.
    pub fn local_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.values.keys().map(|name| name.as_str()).collect();
        names.sort_unstable();
        return names;
    }
}
