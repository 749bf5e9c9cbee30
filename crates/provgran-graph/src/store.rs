//! Triple store collaborator.
//!
//! The graph only needs insertion, pattern removal and pattern queries. The
//! in-memory store keeps triples in a `BTreeSet` so every query and every
//! serialization sees them in the same order.

use crate::types::{Triple, TriplePattern};
use std::collections::BTreeSet;
use std::fmt;

pub trait TripleStore: fmt::Debug {
    /// Insert a triple; `false` when it was already present.
    fn insert(&mut self, triple: Triple) -> bool;

    fn remove(&mut self, triple: &Triple) -> bool;

    fn contains(&self, triple: &Triple) -> bool;

    fn len(&self) -> usize;

    fn iter(&self) -> Box<dyn Iterator<Item = &Triple> + '_>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn matching<'a>(&'a self, pattern: &'a TriplePattern) -> Box<dyn Iterator<Item = &'a Triple> + 'a> {
        Box::new(self.iter().filter(move |triple| pattern.matches(triple)))
    }

    /// Remove every triple matching `pattern`, returning how many went away.
    fn remove_matching(&mut self, pattern: &TriplePattern) -> usize {
        let doomed: Vec<Triple> = self.matching(pattern).cloned().collect();
        doomed.iter().filter(|triple| self.remove(triple)).count()
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryTripleStore {
    triples: BTreeSet<Triple>,
}

impl InMemoryTripleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TripleStore for InMemoryTripleStore {
    fn insert(&mut self, triple: Triple) -> bool {
        self.triples.insert(triple)
    }

    fn remove(&mut self, triple: &Triple) -> bool {
        self.triples.remove(triple)
    }

    fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    fn len(&self) -> usize {
        self.triples.len()
    }

    fn iter(&self) -> Box<dyn Iterator<Item = &Triple> + '_> {
        Box::new(self.triples.iter())
    }

    fn matching<'a>(&'a self, pattern: &'a TriplePattern) -> Box<dyn Iterator<Item = &'a Triple> + 'a> {
        // Subject-bound patterns only need the subject's range of the set.
        match &pattern.subject {
            Some(subject) => Box::new(
                self.triples
                    .iter()
                    .skip_while(move |triple| triple.subject < *subject)
                    .take_while(move |triple| triple.subject == *subject)
                    .filter(move |triple| pattern.matches(triple)),
            ),
            None => Box::new(self.triples.iter().filter(move |triple| pattern.matches(triple))),
        }
    }
}

/// Buffered edit of a store.
///
/// Merges collect every removal and addition first and apply them in one go
/// once all checks have passed, so a failed merge leaves the store untouched.
/// Removals run before additions.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    removals: Vec<TriplePattern>,
    additions: BTreeSet<Triple>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeSummary {
    pub removed: usize,
    pub added: usize,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remove(&mut self, pattern: TriplePattern) -> &mut Self {
        self.removals.push(pattern);
        self
    }

    pub fn add(&mut self, triple: Triple) -> &mut Self {
        self.additions.insert(triple);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.removals.is_empty() && self.additions.is_empty()
    }

    pub fn apply(self, store: &mut dyn TripleStore) -> ChangeSummary {
        let removed = self
            .removals
            .iter()
            .map(|pattern| store.remove_matching(pattern))
            .sum();
        let added = self
            .additions
            .into_iter()
            .map(|triple| store.insert(triple))
            .filter(|inserted| *inserted)
            .count();
        ChangeSummary { removed, added }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Triple;

    fn triple(s: &str, p: &str, o: &str) -> Triple {
        Triple::new(
            format!("https://e.org/{s}").as_str(),
            format!("https://e.org/{p}").as_str(),
            format!("https://e.org/{o}").as_str(),
        )
    }

    #[test]
    fn insert_is_set_semantics() {
        let mut store = InMemoryTripleStore::new();
        assert!(store.insert(triple("a", "p", "b")));
        assert!(!store.insert(triple("a", "p", "b")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn subject_bound_queries_only_see_that_subject() {
        let mut store = InMemoryTripleStore::new();
        store.insert(triple("a", "p", "b"));
        store.insert(triple("b", "p", "c"));
        store.insert(triple("b", "q", "a"));
        store.insert(triple("c", "p", "a"));
        let pattern = TriplePattern::any().subject("https://e.org/b");
        assert_eq!(store.matching(&pattern).count(), 2);
        let pattern = TriplePattern::any().object("https://e.org/a");
        assert_eq!(store.matching(&pattern).count(), 2);
    }

    #[test]
    fn change_set_removes_before_adding() {
        let mut store = InMemoryTripleStore::new();
        store.insert(triple("a", "p", "b"));
        store.insert(triple("a", "q", "b"));
        let mut changes = ChangeSet::new();
        changes
            .remove(TriplePattern::any().subject("https://e.org/a"))
            .add(triple("a", "p", "c"));
        let summary = changes.apply(&mut store);
        assert_eq!(summary, ChangeSummary { removed: 2, added: 1 });
        assert_eq!(store.iter().cloned().collect::<Vec<_>>(), vec![triple("a", "p", "c")]);
    }
}
