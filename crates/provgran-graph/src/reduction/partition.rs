//! Merge lists and their connected groups.

use crate::error::{ProvGraphError, Result};
use crate::types::ActivityId;
use serde::Serialize;
use std::collections::BTreeSet;

/// `informed wasInformedBy informant`, selected for merging.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MergeEdge {
    pub informed: ActivityId,
    pub informant: ActivityId,
}

impl MergeEdge {
    pub fn new(informed: ActivityId, informant: ActivityId) -> Self {
        Self { informed, informant }
    }

    fn touches(&self, members: &BTreeSet<ActivityId>) -> bool {
        members.contains(&self.informed) || members.contains(&self.informant)
    }
}

/// Split a merge list into groups of edges connected through a shared
/// endpoint. Groups and the edges inside them come out sorted.
pub fn divide_merge_list(edges: impl IntoIterator<Item = MergeEdge>) -> Vec<Vec<MergeEdge>> {
    let mut remaining: Vec<MergeEdge> = edges
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let mut groups = Vec::new();
    while !remaining.is_empty() {
        let seed = remaining.remove(0);
        let mut members = BTreeSet::from([seed.informed.clone(), seed.informant.clone()]);
        let mut group = vec![seed];
        loop {
            let (joined, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut remaining)
                .into_iter()
                .partition(|edge| edge.touches(&members));
            remaining = rest;
            if joined.is_empty() {
                break;
            }
            for edge in joined {
                members.insert(edge.informed.clone());
                members.insert(edge.informant.clone());
                group.push(edge);
            }
        }
        group.sort();
        groups.push(group);
    }
    groups
}

/// A connected merge group split into its roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeGroup {
    /// The only member informing no other member. It survives the merge.
    pub sink: ActivityId,
    /// Members informed by no other member.
    pub sources: BTreeSet<ActivityId>,
    pub intermediates: BTreeSet<ActivityId>,
    pub edges: Vec<MergeEdge>,
}

impl MergeGroup {
    pub fn classify(edges: Vec<MergeEdge>) -> Result<Self> {
        let informed: BTreeSet<ActivityId> = edges.iter().map(|edge| edge.informed.clone()).collect();
        let informants: BTreeSet<ActivityId> = edges.iter().map(|edge| edge.informant.clone()).collect();

        let mut sinks: Vec<ActivityId> = informed.difference(&informants).cloned().collect();
        if sinks.len() != 1 {
            let names: Vec<&str> = sinks.iter().map(ActivityId::as_str).collect();
            return Err(ProvGraphError::merge_violation(format!(
                "merge group needs exactly one final activity, found {} [{}]",
                sinks.len(),
                names.join(", ")
            )));
        }
        let sink = sinks.remove(0);
        Ok(Self {
            sink,
            sources: informants.difference(&informed).cloned().collect(),
            intermediates: informed.intersection(&informants).cloned().collect(),
            edges,
        })
    }

    /// Members deleted by the merge: everything but the sink.
    pub fn removed(&self) -> BTreeSet<ActivityId> {
        self.sources.union(&self.intermediates).cloned().collect()
    }

    pub fn members(&self) -> BTreeSet<ActivityId> {
        let mut members = self.removed();
        members.insert(self.sink.clone());
        members
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> ActivityId {
        ActivityId::from_iri(format!("https://e.org/{name}"))
    }

    fn edge(informed: &str, informant: &str) -> MergeEdge {
        MergeEdge::new(id(informed), id(informant))
    }

    #[test]
    fn groups_are_weakly_connected_components() {
        let groups = divide_merge_list([
            edge("b", "a"),
            edge("x", "w"),
            edge("c", "b"),
            edge("y", "x"),
            edge("d", "c"),
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0], vec![edge("b", "a"), edge("c", "b"), edge("d", "c")]);
        assert_eq!(groups[1], vec![edge("x", "w"), edge("y", "x")]);
    }

    #[test]
    fn group_linked_only_through_a_late_edge_is_joined() {
        // (d, c) shares nothing with (b, a) until (c, b) is pulled in
        let groups = divide_merge_list([edge("b", "a"), edge("d", "c"), edge("c", "b")]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 3);
    }

    #[test]
    fn chain_classification() {
        let group = MergeGroup::classify(vec![edge("b", "a"), edge("c", "b")]).unwrap();
        assert_eq!(group.sink, id("c"));
        assert_eq!(group.sources, BTreeSet::from([id("a")]));
        assert_eq!(group.intermediates, BTreeSet::from([id("b")]));
        assert_eq!(group.members().len(), 3);
    }

    #[test]
    fn two_sinks_violate_the_merge_invariant() {
        let err = MergeGroup::classify(vec![edge("b", "a"), edge("c", "a")]).unwrap_err();
        assert!(matches!(err, ProvGraphError::MergeInvariantViolation { .. }));
    }

    #[test]
    fn cycle_has_no_sink() {
        let err = MergeGroup::classify(vec![edge("b", "a"), edge("a", "b")]).unwrap_err();
        assert!(matches!(err, ProvGraphError::MergeInvariantViolation { .. }));
    }
}
