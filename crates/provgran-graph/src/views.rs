//! Thread views: sub-graphs restricted to the flow relations.

use crate::graph::ProvGraph;
use crate::types::{Iri, Triple, TriplePattern};
use crate::vocabulary::prov;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThreadView {
    /// `wasInformedBy` only.
    Process,
    /// `wasDerivedFrom` only.
    Data,
    ProcessAndData,
}

impl ThreadView {
    pub const ALL: [ThreadView; 3] = [ThreadView::Process, ThreadView::Data, ThreadView::ProcessAndData];

    pub fn predicates(&self) -> &'static [&'static str] {
        match self {
            ThreadView::Process => &[prov::WAS_INFORMED_BY],
            ThreadView::Data => &[prov::WAS_DERIVED_FROM],
            ThreadView::ProcessAndData => &[
                prov::USED,
                prov::WAS_GENERATED_BY,
                prov::WAS_INFORMED_BY,
                prov::WAS_DERIVED_FROM,
            ],
        }
    }

    /// Tag used in snapshot file names.
    pub fn file_tag(&self) -> &'static str {
        match self {
            ThreadView::Process => "processThread",
            ThreadView::Data => "dataThread",
            ThreadView::ProcessAndData => "processAndDataThread",
        }
    }

    pub fn extract(&self, graph: &ProvGraph) -> Vec<Triple> {
        self.predicates()
            .iter()
            .flat_map(|predicate| {
                let pattern = TriplePattern::any().predicate(Iri::from(*predicate));
                graph.store().matching(&pattern).cloned().collect::<Vec<_>>()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::{ActivityBuilder, EntityBuilder, Link};
    use provgran_core::EngineConfig;

    #[test]
    fn views_keep_only_their_relations() {
        let mut graph = ProvGraph::new(EngineConfig::default()).unwrap();
        let a = graph.add_entity(EntityBuilder::new()).unwrap();
        let b = graph.add_entity(EntityBuilder::new()).unwrap();
        let c = graph.add_entity(EntityBuilder::new()).unwrap();
        let p1 = graph.add_activity(ActivityBuilder::new().label("one")).unwrap();
        let p2 = graph.add_activity(ActivityBuilder::new().label("two")).unwrap();
        graph.link(Link::new().input(&a).process(&p1).output(&b)).unwrap();
        graph.link(Link::new().input(&b).process(&p2).output(&c)).unwrap();
        graph.infer_was_informed_by_links();

        assert_eq!(ThreadView::Process.extract(&graph).len(), 1);
        assert_eq!(ThreadView::Data.extract(&graph).len(), 2);
        // 2 used, 2 wasGeneratedBy, 1 wasInformedBy, 2 wasDerivedFrom
        assert_eq!(ThreadView::ProcessAndData.extract(&graph).len(), 7);
    }
}
