//! Name Tables
//!
//! A name maps to a stack of handles: binding a name that is already in use
//! hides the previous binding until the new one is removed. Independently, each
//! handle remembers its base name, the first name it was given.

use entities_data_handling::Handle;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub(crate) struct NameTable {
    bindings: HashMap<String, Vec<Handle>>,
    base_names: HashMap<Handle, String>,
}

impl NameTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Bytes a new binding of `name` costs
    pub(crate) fn footprint(name: &str) -> usize {
        const BINDING_BYTES: usize = 48;
        BINDING_BYTES + 2 * name.len()
    }

    pub(crate) fn bind(&mut self, handle: Handle, name: &str) {
        self.bindings
            .entry(name.to_string())
            .or_default()
            .push(handle);
        self.base_names
            .entry(handle)
            .or_insert_with(|| name.to_string());
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<Handle> {
        self.bindings.get(name).and_then(|stack| stack.last().copied())
    }

    pub(crate) fn base_name(&self, handle: Handle) -> Option<&str> {
        self.base_names.get(&handle).map(String::as_str)
    }

    /// Remove the current binding of `name`, uncovering the previous one
    ///
    /// Returns the bytes the removed binding was charged.
    pub(crate) fn unbind(&mut self, name: &str) -> usize {
        let Some(stack) = self.bindings.get_mut(name) else {
            return 0;
        };
        let popped = stack.pop().is_some();
        if stack.is_empty() {
            self.bindings.remove(name);
        }
        if popped {
            Self::footprint(name)
        } else {
            0
        }
    }

    /// Remove the base name of `handle` and its binding if it is current
    pub(crate) fn clear(&mut self, handle: Handle) -> usize {
        match self.base_names.remove(&handle) {
            Some(name) if self.lookup(&name) == Some(handle) => self.unbind(&name),
            _ => 0,
        }
    }

    /// Drop every trace of a reclaimed handle, returning the bytes released
    pub(crate) fn forget(&mut self, handle: Handle) -> usize {
        self.base_names.remove(&handle);
        let mut released = 0;
        self.bindings.retain(|name, stack| {
            let before = stack.len();
            stack.retain(|&h| h != handle);
            released += (before - stack.len()) * Self::footprint(name);
            !stack.is_empty()
        });
        released
    }

    /// Whether `handle` has a base name or any binding
    pub(crate) fn is_named(&self, handle: Handle) -> bool {
        self.base_names.contains_key(&handle)
            || self.bindings.values().any(|stack| stack.contains(&handle))
    }

    /// Every handle that has a base name or a binding
    pub(crate) fn named_handles(&self) -> Vec<Handle> {
        let mut handles: Vec<Handle> = self.base_names.keys().copied().collect();
        handles.extend(self.bindings.values().flatten().copied());
        handles.sort_unstable();
        handles.dedup();
        handles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shadowing() {
        let mut names = NameTable::new();
        names.bind(4, "x");
        names.bind(9, "x");
        assert_eq!(names.lookup("x"), Some(9));
        assert_eq!(names.unbind("x"), NameTable::footprint("x"));
        assert_eq!(names.lookup("x"), Some(4));
        names.unbind("x");
        assert_eq!(names.lookup("x"), None);
        assert_eq!(names.unbind("x"), 0);
        assert_eq!(names.base_name(9), Some("x"));
    }

    #[test]
    fn test_base_name_is_first_name() {
        let mut names = NameTable::new();
        names.bind(3, "a");
        names.bind(3, "b");
        assert_eq!(names.base_name(3), Some("a"));
        assert_eq!(names.lookup("b"), Some(3));
    }

    #[test]
    fn test_clear_removes_current_binding() {
        let mut names = NameTable::new();
        names.bind(1, "p");
        assert_eq!(names.clear(1), NameTable::footprint("p"));
        assert_eq!(names.clear(1), 0);
        assert_eq!(names.base_name(1), None);
        assert_eq!(names.lookup("p"), None);
    }

    #[test]
    fn test_forget() {
        let mut names = NameTable::new();
        names.bind(1, "p");
        names.bind(2, "p");
        names.bind(1, "q");
        names.bind(1, "q");
        assert_eq!(
            names.forget(1),
            NameTable::footprint("p") + 2 * NameTable::footprint("q")
        );
        assert!(!names.is_named(1));
        assert_eq!(names.lookup("p"), Some(2));
        assert_eq!(names.lookup("q"), None);
        assert_eq!(names.named_handles(), vec![2]);
    }
}
