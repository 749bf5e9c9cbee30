//! Type-driven merge along the change hierarchy.
//!
//! For each change type, finest first, a flat merge collapses chains of
//! activities of that type; an up-merge then bridges the type and the next
//! coarser one. A snapshot is written after every step, giving the `_LOGn`
//! sequence.

use super::partition::{divide_merge_list, MergeEdge, MergeGroup};
use super::{LevelSummary, MergeMode};
use crate::error::Result;
use crate::graph::ProvGraph;
use crate::snapshot::SnapshotWriter;
use crate::store::ChangeSet;
use crate::types::{ActivityId, AgentId, EntityId, Iri, Literal, Triple, TriplePattern};
use crate::vocabulary::{geokur, prov, GEOKUR};
use provgran_observability::spans;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GranularityReport {
    pub levels: Vec<LevelSummary>,
    /// Activities annotated `hasBranch` and therefore never merged away.
    pub branches: BTreeSet<ActivityId>,
}

impl ProvGraph {
    /// Configured change types as IRIs, finest first.
    pub fn change_hierarchy(&self) -> Vec<Iri> {
        self.config()
            .change_hierarchy
            .iter()
            .map(|change| Iri::new(GEOKUR.term(change)))
            .collect()
    }

    pub fn has_process_type(&self, activity: &ActivityId, change: &Iri) -> bool {
        self.contains(&Triple::new(activity, geokur::HAS_PROCESS_TYPE, change))
    }

    /// `wasInformedBy` pairs where both ends have type `change`.
    pub fn flat_merge_list(&mut self, change: &Iri) -> Vec<MergeEdge> {
        self.collect_merge_edges(|graph, edge| {
            graph.has_process_type(&edge.informed, change)
                && graph.has_process_type(&edge.informant, change)
        })
    }

    /// `wasInformedBy` pairs with one end of type `change` and the other of
    /// type `up`, in either direction.
    pub fn up_merge_list(&mut self, change: &Iri, up: &Iri) -> Vec<MergeEdge> {
        self.collect_merge_edges(|graph, edge| {
            (graph.has_process_type(&edge.informant, up) && graph.has_process_type(&edge.informed, change))
                || (graph.has_process_type(&edge.informant, change)
                    && graph.has_process_type(&edge.informed, up))
        })
    }

    /// Accepted edges whose informant informs more than one activity are
    /// left out, and the informant is marked `hasBranch "True"`.
    fn collect_merge_edges(&mut self, accept: impl Fn(&ProvGraph, &MergeEdge) -> bool) -> Vec<MergeEdge> {
        let informed_by = TriplePattern::any().predicate(prov::WAS_INFORMED_BY);
        let candidates: Vec<MergeEdge> = self
            .store()
            .matching(&informed_by)
            .filter_map(|triple| {
                triple.object.as_iri().map(|informant| {
                    MergeEdge::new(
                        ActivityId::from_iri(triple.subject.clone()),
                        ActivityId::from_iri(informant.clone()),
                    )
                })
            })
            .filter(|edge| accept(self, edge))
            .collect();

        let mut edges = BTreeSet::new();
        let mut branches = BTreeSet::new();
        for edge in candidates {
            if self.successors(&edge.informant).len() > 1 {
                branches.insert(edge.informant);
            } else {
                edges.insert(edge);
            }
        }
        for branch in branches {
            if !self.has_branch(&branch) {
                debug!(activity = %branch, "Branch point kept");
                self.insert(Triple::new(&branch, geokur::HAS_BRANCH, Literal::plain("True")));
            }
        }
        edges.into_iter().collect()
    }

    /// Merge every group and relabel its sink to `target`. Returns the number
    /// of merged groups.
    pub fn merge_parts(&mut self, groups: Vec<Vec<MergeEdge>>, target: &Iri) -> Result<usize> {
        let mut merged = 0;
        for edges in groups {
            let group = MergeGroup::classify(edges)?;
            self.merge_group(&group, target)?;
            merged += 1;
        }
        Ok(merged)
    }

    /// Collapse one group into its sink.
    ///
    /// Sources and intermediates are deleted with the entities they
    /// generated. The sink takes over the data they consumed from outside
    /// the group, gets direct derivations from its outputs to that data, and
    /// inherits their agents.
    pub fn merge_group(&mut self, group: &MergeGroup, target: &Iri) -> Result<()> {
        let members = group.members();
        let span = spans::merge_group(group.sink.as_str(), members.len());
        let _guard = span.enter();

        let removed = group.removed();
        let roots: BTreeSet<ActivityId> = removed
            .iter()
            .flat_map(|member| self.predecessors(member))
            .filter(|activity| !members.contains(activity))
            .collect();
        let doomed: BTreeSet<EntityId> = removed
            .iter()
            .flat_map(|member| self.generated_entities(member))
            .collect();
        let sources: BTreeSet<EntityId> = removed
            .iter()
            .flat_map(|member| self.used_entities(member))
            .filter(|entity| !doomed.contains(entity))
            .collect();
        let agents: BTreeSet<AgentId> = removed
            .iter()
            .flat_map(|member| self.associated_agents(member))
            .collect();

        let mut derivations = Vec::new();
        for result in self.generated_entities(&group.sink) {
            let closure = self.derivation_closure(&result);
            for source in sources.iter().filter(|source| **source != result) {
                if closure.contains(source.iri()) {
                    derivations.push(Triple::new(&result, prov::WAS_DERIVED_FROM, source));
                }
            }
        }

        let mut changes = ChangeSet::new();
        for entity in &doomed {
            changes
                .remove(TriplePattern::any().subject(entity))
                .remove(TriplePattern::any().object(entity));
        }
        for member in &removed {
            changes
                .remove(TriplePattern::any().subject(member))
                .remove(TriplePattern::any().object(member));
        }
        for source in &sources {
            changes.add(Triple::new(&group.sink, prov::USED, source));
            for agent in &agents {
                changes.add(Triple::new(source, prov::WAS_ATTRIBUTED_TO, agent));
            }
            for root in self.generators(source).intersection(&roots) {
                changes.add(Triple::new(&group.sink, prov::WAS_INFORMED_BY, root));
            }
        }
        for agent in &agents {
            changes.add(Triple::new(&group.sink, prov::WAS_ASSOCIATED_WITH, agent));
        }
        for derivation in derivations {
            changes.add(derivation);
        }
        changes
            .remove(
                TriplePattern::any()
                    .subject(&group.sink)
                    .predicate(geokur::HAS_PROCESS_TYPE),
            )
            .add(Triple::new(&group.sink, geokur::HAS_PROCESS_TYPE, target));

        self.commit(changes);
        self.infer_was_informed_by_links();
        info!(
            sink = %group.sink,
            removed_activities = removed.len(),
            removed_entities = doomed.len(),
            roots = roots.len(),
            process_type = GEOKUR.local_name(target.as_str()).unwrap_or(target.as_str()),
            "Merge group collapsed"
        );
        Ok(())
    }

    /// Run the flat and up merges over the whole change hierarchy, writing
    /// levels `0..=2n-1` for `n` change types.
    pub fn serialize_granularities(&mut self, writer: &mut dyn SnapshotWriter) -> Result<GranularityReport> {
        let hierarchy = self.change_hierarchy();
        let mut report = GranularityReport::default();
        let mut level = 0;
        writer.write_snapshot(self, level)?;
        report
            .levels
            .push(LevelSummary::capture(self, level, MergeMode::Initial, None, 0));

        for (index, change) in hierarchy.iter().enumerate() {
            let coarser = hierarchy.get(index + 1).unwrap_or(change);

            level += 1;
            {
                let span = spans::granularity_level(level, local_name(change), MergeMode::Flat.as_str());
                let _guard = span.enter();
                let edges = self.flat_merge_list(change);
                let merged = self.merge_parts(divide_merge_list(edges), coarser)?;
                writer.write_snapshot(self, level)?;
                report.levels.push(LevelSummary::capture(
                    self,
                    level,
                    MergeMode::Flat,
                    Some(local_name(change).to_string()),
                    merged,
                ));
            }

            let Some(up) = hierarchy.get(index + 1) else {
                continue;
            };
            level += 1;
            let span = spans::granularity_level(level, local_name(up), MergeMode::Up.as_str());
            let _guard = span.enter();
            let mut edges = self.up_merge_list(change, up);
            let mut finer = index;
            while edges.is_empty() && finer > 0 {
                finer -= 1;
                edges = self.up_merge_list(&hierarchy[finer], up);
            }
            if edges.is_empty() {
                debug!(up = local_name(up), "No up-merge candidates");
            }
            let merged = self.merge_parts(divide_merge_list(edges), up)?;
            writer.write_snapshot(self, level)?;
            report.levels.push(LevelSummary::capture(
                self,
                level,
                MergeMode::Up,
                Some(local_name(up).to_string()),
                merged,
            ));
        }

        report.branches = self
            .all_activities()
            .into_iter()
            .filter(|activity| self.has_branch(activity))
            .collect();
        info!(levels = report.levels.len(), branches = report.branches.len(), "Granularities written");
        Ok(report)
    }
}

fn local_name(change: &Iri) -> &str {
    GEOKUR.local_name(change.as_str()).unwrap_or(change.as_str())
}
