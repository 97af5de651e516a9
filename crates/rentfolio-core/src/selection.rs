//! The set of resource ids currently checked in a list view.
//!
//! Invariant: a selection is always a subset of the ids visible on the
//! active page. The list controller enforces this by clearing the set on
//! any view change and re-validating it after a refetch.

use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: HashSet<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Add or remove one id. Returns whether the id is selected afterwards.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.to_string());
            true
        }
    }

    pub fn insert(&mut self, id: &str) {
        self.ids.insert(id.to_string());
    }

    pub fn select_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        for id in ids {
            self.ids.insert(id.to_string());
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Drop every selected id that is no longer visible.
    pub fn retain_visible<'a>(&mut self, visible: impl IntoIterator<Item = &'a str>) {
        let visible: HashSet<&str> = visible.into_iter().collect();
        self.ids.retain(|id| visible.contains(id.as_str()));
    }

    pub fn ids(&self) -> Vec<String> {
        self.ids.iter().cloned().collect()
    }

    /// Empty the set and hand back what was selected.
    pub fn take_ids(&mut self) -> Vec<String> {
        self.ids.drain().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_adds_then_removes() {
        let mut selection = SelectionSet::new();
        assert!(selection.toggle("b-1"));
        assert!(selection.contains("b-1"));
        assert!(!selection.toggle("b-1"));
        assert!(selection.is_empty());
    }

    #[test]
    fn retain_visible_enforces_subset() {
        let mut selection = SelectionSet::new();
        selection.select_all(["b-1", "b-2", "b-3"]);
        selection.retain_visible(["b-2", "b-4"]);
        assert_eq!(selection.len(), 1);
        assert!(selection.contains("b-2"));
    }

    #[test]
    fn take_ids_empties_the_set() {
        let mut selection = SelectionSet::new();
        selection.select_all(["b-1", "b-2"]);
        let mut taken = selection.take_ids();
        taken.sort();
        assert_eq!(taken, vec!["b-1".to_string(), "b-2".to_string()]);
        assert!(selection.is_empty());
    }
}
