//! Derived relations.

use crate::graph::ProvGraph;
use crate::types::{EntityId, Iri, Term, Triple, TriplePattern};
use crate::vocabulary::prov;
use std::collections::{BTreeSet, VecDeque};
use tracing::debug;

impl ProvGraph {
    /// Assert `A wasInformedBy B` for every `A used e` with
    /// `e wasGeneratedBy B`.
    ///
    /// Existing `wasInformedBy` triples are left alone, so running this twice
    /// is the same as running it once. Self-loops are never asserted.
    pub fn infer_was_informed_by_links(&mut self) -> usize {
        let used = TriplePattern::any().predicate(prov::USED);
        let mut inferred = BTreeSet::new();
        for usage in self.store().matching(&used) {
            let Term::Iri(data) = &usage.object else {
                continue;
            };
            let generated = TriplePattern::any()
                .subject(data)
                .predicate(prov::WAS_GENERATED_BY);
            for generation in self.store().matching(&generated) {
                match &generation.object {
                    Term::Iri(informant) if *informant != usage.subject => {
                        inferred.insert(Triple::new(&usage.subject, prov::WAS_INFORMED_BY, informant));
                    }
                    _ => {}
                }
            }
        }
        let added = inferred
            .into_iter()
            .map(|triple| self.insert(triple))
            .filter(|inserted| *inserted)
            .count();
        debug!(added, "wasInformedBy links inferred");
        added
    }

    /// `wasDerivedFrom*` starting at `entity`, including `entity` itself.
    pub fn derivation_closure(&self, entity: &EntityId) -> BTreeSet<Iri> {
        let mut seen = BTreeSet::from([entity.iri().clone()]);
        let mut queue = VecDeque::from([entity.iri().clone()]);
        while let Some(current) = queue.pop_front() {
            for source in self.object_iris(&current, prov::WAS_DERIVED_FROM) {
                if seen.insert(source.clone()) {
                    queue.push_back(source);
                }
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use crate::builders::{ActivityBuilder, EntityBuilder, Link};
    use crate::graph::ProvGraph;
    use crate::types::Triple;
    use crate::vocabulary::prov;
    use provgran_core::EngineConfig;

    #[test]
    fn inference_is_idempotent() {
        let mut graph = ProvGraph::new(EngineConfig::default()).unwrap();
        let a = graph.add_entity(EntityBuilder::new()).unwrap();
        let b = graph.add_entity(EntityBuilder::new()).unwrap();
        let c = graph.add_entity(EntityBuilder::new()).unwrap();
        let p1 = graph.add_activity(ActivityBuilder::new()).unwrap();
        let p2 = graph.add_activity(ActivityBuilder::new()).unwrap();
        graph.link(Link::new().input(&a).process(&p1).output(&b)).unwrap();
        graph.link(Link::new().input(&b).process(&p2).output(&c)).unwrap();

        assert_eq!(graph.infer_was_informed_by_links(), 1);
        let snapshot: Vec<Triple> = graph.triples().cloned().collect();
        assert_eq!(graph.infer_was_informed_by_links(), 0);
        assert_eq!(graph.triples().cloned().collect::<Vec<_>>(), snapshot);
        assert!(graph.contains(&Triple::new(&p2, prov::WAS_INFORMED_BY, &p1)));
    }

    #[test]
    fn closure_follows_chains_and_survives_cycles() {
        let mut graph = ProvGraph::new(EngineConfig::default()).unwrap();
        let a = graph.add_entity(EntityBuilder::new()).unwrap();
        let b = graph.add_entity(EntityBuilder::new()).unwrap();
        let c = graph.add_entity(EntityBuilder::new()).unwrap();
        graph.was_derived_from(&c, &b).unwrap();
        graph.was_derived_from(&b, &a).unwrap();
        graph.was_derived_from(&a, &c).unwrap();
        let closure = graph.derivation_closure(&c);
        assert_eq!(closure.len(), 3);
        assert!(closure.contains(a.iri()));
    }
}
