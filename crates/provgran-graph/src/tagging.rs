//! Process tags.
//!
//! Tags come from the configured vocabulary; the four structural tags are
//! derived from the graph shape.

use crate::error::Result;
use crate::graph::ProvGraph;
use crate::store::ChangeSet;
use crate::types::{ActivityId, Literal, Triple, TriplePattern};
use crate::vocabulary::geokur;
use provgran_core::structural_tags;
use provgran_id::ProvKind;
use serde::Serialize;
use tracing::{debug, warn};

const STRUCTURAL: [&str; 4] = [
    structural_tags::MULTIPLE_INS,
    structural_tags::MULTIPLE_OUTS,
    structural_tags::ROOT,
    structural_tags::BRANCH,
];

/// Outcome of [`ProvGraph::tag_process`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagReport {
    pub accepted: Vec<String>,
    /// Tags missing from the vocabulary. They were not recorded.
    pub rejected: Vec<String>,
}

impl TagReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

impl ProvGraph {
    /// Record vocabulary tags on an activity. Unknown tags are skipped with a
    /// warning and listed in the report.
    pub fn tag_process<I, S>(&mut self, activity: &ActivityId, tags: I) -> Result<TagReport>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.expect_kind(activity.iri(), "hasTag", ProvKind::Activity)?;
        let mut report = TagReport::default();
        for tag in tags {
            let tag = tag.as_ref();
            if self.config().tags.is_known(tag) {
                self.insert(Triple::new(activity, geokur::HAS_TAG, Literal::plain(tag)));
                report.accepted.push(tag.to_string());
            } else {
                warn!(activity = %activity, tag, "Unknown tag skipped");
                report.rejected.push(tag.to_string());
            }
        }
        Ok(report)
    }

    /// Recompute `multipleIns`, `multipleOuts`, `root` and `branch` for every
    /// top-level activity. Returns the number of structural tags now present.
    pub fn add_structural_tags(&mut self) -> usize {
        let mut changes = ChangeSet::new();
        let mut count = 0;
        for activity in self.activities() {
            for tag in STRUCTURAL {
                changes.remove(
                    TriplePattern::any()
                        .subject(&activity)
                        .predicate(geokur::HAS_TAG)
                        .object(Literal::plain(tag)),
                );
            }
            let shape = [
                (structural_tags::MULTIPLE_INS, self.used_entities(&activity).len()),
                (structural_tags::MULTIPLE_OUTS, self.generated_entities(&activity).len()),
                (structural_tags::ROOT, self.predecessors(&activity).len()),
                (structural_tags::BRANCH, self.successors(&activity).len()),
            ];
            for (tag, degree) in shape {
                if degree > 1 {
                    changes.add(Triple::new(&activity, geokur::HAS_TAG, Literal::plain(tag)));
                    count += 1;
                }
            }
        }
        self.commit(changes);
        debug!(count, "Structural tags recomputed");
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::{ActivityBuilder, EntityBuilder, Link};
    use provgran_core::EngineConfig;
    use tracing_test::traced_test;

    #[test]
    #[traced_test]
    fn unknown_tags_are_skipped_with_a_warning() {
        let mut graph = ProvGraph::new(EngineConfig::default()).unwrap();
        let clip = graph.add_activity(ActivityBuilder::new()).unwrap();

        let report = graph.tag_process(&clip, ["clip", "made-up"]).unwrap();

        assert_eq!(report.accepted, vec!["clip".to_string()]);
        assert_eq!(report.rejected, vec!["made-up".to_string()]);
        assert!(!report.is_clean());
        assert_eq!(graph.tags(&clip).into_iter().collect::<Vec<_>>(), vec!["clip".to_string()]);
        assert!(logs_contain("Unknown tag skipped"));
    }

    #[test]
    fn structural_tags_follow_degrees() {
        let mut graph = ProvGraph::new(EngineConfig::default()).unwrap();
        let a = graph.add_entity(EntityBuilder::new()).unwrap();
        let b = graph.add_entity(EntityBuilder::new()).unwrap();
        let c = graph.add_entity(EntityBuilder::new()).unwrap();
        let merge = graph.add_activity(ActivityBuilder::new()).unwrap();
        graph
            .link(Link::new().inputs([&a, &b]).process(&merge).output(&c))
            .unwrap();

        assert_eq!(graph.add_structural_tags(), 1);
        assert_eq!(
            graph.tags(&merge).into_iter().collect::<Vec<_>>(),
            vec![structural_tags::MULTIPLE_INS.to_string()]
        );
        // stable on re-run
        assert_eq!(graph.add_structural_tags(), 1);
    }
}
