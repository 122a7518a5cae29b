// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Storage for known overlay elements.

use alloc::collections::BTreeMap;
use alloc::collections::btree_map::Entry;

use crate::child::{Child, ChildId};

/// The set of tracked children, keyed by id.
///
/// Iteration order is id order, which keeps batched notifications
/// deterministic. An id maps to at most one child; inserting an id that is
/// already registered is refused rather than replacing the existing child.
#[derive(Debug)]
pub struct ChildRegistry<E> {
    children: BTreeMap<ChildId, Child<E>>,
}

impl<E> Default for ChildRegistry<E> {
    fn default() -> Self {
        Self {
            children: BTreeMap::new(),
        }
    }
}

impl<E> ChildRegistry<E> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns `true` if no child is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns `true` if `id` is registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.children.contains_key(id)
    }

    /// Looks up a child by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Child<E>> {
        self.children.get(id)
    }

    /// Looks up a child by id for mutation.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Child<E>> {
        self.children.get_mut(id)
    }

    /// Registers a child. Returns the child back if its id is taken.
    pub fn insert(&mut self, child: Child<E>) -> Result<&mut Child<E>, Child<E>> {
        match self.children.entry(child.id.clone()) {
            Entry::Vacant(slot) => Ok(slot.insert(child)),
            Entry::Occupied(_) => Err(child),
        }
    }

    /// Unregisters a child and returns it.
    pub fn remove(&mut self, id: &str) -> Option<Child<E>> {
        self.children.remove(id)
    }

    /// Iterates children in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Child<E>> {
        self.children.values()
    }

    /// Iterates children in id order for mutation.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Child<E>> {
        self.children.values_mut()
    }

    /// Removes and yields every child.
    pub fn drain(&mut self) -> impl Iterator<Item = Child<E>> {
        core::mem::take(&mut self.children).into_values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::child::AuthoredSize;
    use alloc::string::String;
    use alloc::vec::Vec;

    fn child(id: &str, element: u32) -> Child<u32> {
        Child::new(ChildId::new(id), element, AuthoredSize::default(), String::new())
    }

    #[test]
    fn insert_refuses_duplicate_ids() {
        let mut reg = ChildRegistry::new();
        assert!(reg.insert(child("a", 1)).is_ok());
        let dup = reg.insert(child("a", 2)).unwrap_err();
        assert_eq!(dup.element, 2);
        assert_eq!(reg.get("a").map(|c| c.element), Some(1), "original kept");
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn iteration_is_in_id_order() {
        let mut reg = ChildRegistry::new();
        for id in ["c", "a", "b"] {
            reg.insert(child(id, 0)).unwrap();
        }
        let ids: Vec<_> = reg.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn remove_frees_the_id() {
        let mut reg = ChildRegistry::new();
        reg.insert(child("a", 1)).unwrap();
        assert!(reg.remove("a").is_some());
        assert!(!reg.contains("a"));
        assert!(reg.insert(child("a", 3)).is_ok());
    }

    #[test]
    fn drain_empties_registry() {
        let mut reg = ChildRegistry::new();
        reg.insert(child("a", 1)).unwrap();
        reg.insert(child("b", 2)).unwrap();
        assert_eq!(reg.drain().count(), 2);
        assert!(reg.is_empty());
    }
}
