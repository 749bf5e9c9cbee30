//! Importance-driven pairwise merge.

use super::{LevelSummary, MergeMode};
use crate::error::{ProvGraphError, Result};
use crate::graph::ProvGraph;
use crate::importance::IMPORTANCE_EPSILON;
use crate::snapshot::SnapshotWriter;
use crate::store::ChangeSet;
use crate::types::{ActivityId, AgentId, EntityId, Literal, Triple, TriplePattern};
use crate::vocabulary::{geokur, prov, rdf, rdfs};
use provgran_id::ProvKind;
use provgran_observability::spans;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use tracing::{debug, info};

/// The activity chosen for folding and the neighbour it folds into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergePair {
    pub process: ActivityId,
    pub neighbor: ActivityId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeOutcome {
    pub composite: ActivityId,
    /// The member whose output fed the other one.
    pub earlier: ActivityId,
    pub later: ActivityId,
    pub importance: f64,
    pub removed_entities: Vec<EntityId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeneralizeReport {
    pub levels: Vec<LevelSummary>,
    pub merges: Vec<MergeOutcome>,
}

impl ProvGraph {
    /// Pick the next pair to merge.
    ///
    /// Candidates are the activities of minimal importance; among their
    /// `wasInformedBy` neighbours the least important one wins. Ties go to
    /// the lexicographically smallest candidate, then neighbour. A neighbour
    /// that is also reachable through a third activity is skipped, since the
    /// composite would inform itself; when no candidate of the lowest
    /// importance has a usable neighbour the next importance level is tried.
    pub fn get_merge_pair(&self) -> Result<MergePair> {
        let activities = self.activities();
        if activities.len() < 2 {
            return Err(ProvGraphError::merge_violation(format!(
                "{} activities left, nothing to merge",
                activities.len()
            )));
        }
        let importance = self.stored_importance(&activities)?;
        let mut ranked: Vec<&ActivityId> = activities.iter().collect();
        ranked.sort_by(|a, b| importance[*a].total_cmp(&importance[*b]).then_with(|| a.cmp(b)));

        let mut start = 0;
        while start < ranked.len() {
            let floor = importance[ranked[start]];
            let end = ranked[start..]
                .iter()
                .position(|activity| importance[*activity] > floor + IMPORTANCE_EPSILON)
                .map_or(ranked.len(), |offset| start + offset);
            let mut tier = ranked[start..end].to_vec();
            tier.sort();
            if let Some(pair) = self.least_important_neighbor(&tier, &importance) {
                return Ok(pair);
            }
            start = end;
        }
        Err(ProvGraphError::merge_violation(
            "no activity has a wasInformedBy neighbour it can be merged with",
        ))
    }

    fn least_important_neighbor(
        &self,
        candidates: &[&ActivityId],
        importance: &BTreeMap<ActivityId, f64>,
    ) -> Option<MergePair> {
        let mut best: Option<(f64, MergePair)> = None;
        for candidate in candidates.iter().copied() {
            let neighbors: BTreeSet<ActivityId> = self
                .predecessors(candidate)
                .into_iter()
                .chain(self.successors(candidate))
                .filter(|neighbor| neighbor != candidate && importance.contains_key(neighbor))
                .collect();
            for neighbor in neighbors {
                let Some((earlier, later)) = self.merge_direction(candidate, &neighbor) else {
                    continue;
                };
                if self.has_detour(earlier, later) {
                    debug!(process = %candidate, neighbor = %neighbor, "Neighbour skipped, merge would close a cycle");
                    continue;
                }
                let value = importance[&neighbor];
                if best
                    .as_ref()
                    .is_none_or(|(lowest, _)| value < *lowest - IMPORTANCE_EPSILON)
                {
                    best = Some((
                        value,
                        MergePair {
                            process: candidate.clone(),
                            neighbor,
                        },
                    ));
                }
            }
        }
        best.map(|(_, pair)| pair)
    }

    /// `(earlier, later)` when exactly one of the two informs the other.
    fn merge_direction<'a>(
        &self,
        process: &'a ActivityId,
        neighbor: &'a ActivityId,
    ) -> Option<(&'a ActivityId, &'a ActivityId)> {
        let forward = self.contains(&Triple::new(process, prov::WAS_INFORMED_BY, neighbor));
        let backward = self.contains(&Triple::new(neighbor, prov::WAS_INFORMED_BY, process));
        match (forward, backward) {
            (true, false) => Some((neighbor, process)),
            (false, true) => Some((process, neighbor)),
            _ => None,
        }
    }

    /// Whether `later` is also reachable from `earlier` through some other
    /// activity.
    fn has_detour(&self, earlier: &ActivityId, later: &ActivityId) -> bool {
        let mut visited = BTreeSet::new();
        let mut queue: VecDeque<ActivityId> = self
            .successors(earlier)
            .into_iter()
            .filter(|activity| activity != later)
            .collect();
        while let Some(activity) = queue.pop_front() {
            if !visited.insert(activity.clone()) {
                continue;
            }
            for next in self.successors(&activity) {
                if &next == later {
                    return true;
                }
                if &next != earlier && !visited.contains(&next) {
                    queue.push_back(next);
                }
            }
        }
        false
    }

    fn stored_importance(&self, activities: &[ActivityId]) -> Result<BTreeMap<ActivityId, f64>> {
        activities
            .iter()
            .map(|activity| {
                self.importance(activity)
                    .map(|value| (activity.clone(), value))
                    .ok_or_else(|| {
                        ProvGraphError::merge_violation(format!("{activity} has no relative importance"))
                    })
            })
            .collect()
    }

    /// Fold two adjacent activities into one composite.
    ///
    /// Exactly one of `process wasInformedBy neighbor` and
    /// `neighbor wasInformedBy process` must hold. The data passed between
    /// the two is deleted unless a third activity also uses it, the two
    /// originals become `SubProcess`es of the composite, and the composite
    /// takes over their inputs, outputs, agents and neighbours.
    pub fn merge(&mut self, process: &ActivityId, neighbor: &ActivityId) -> Result<MergeOutcome> {
        let span = spans::merge_pair(process.as_str(), neighbor.as_str());
        let _guard = span.enter();

        for member in [process, neighbor] {
            self.expect_kind(member.iri(), "merge", ProvKind::Activity)?;
            if !self.is_current_activity(member.iri()) {
                return Err(ProvGraphError::merge_violation(format!(
                    "{member} is already part of a composite"
                )));
            }
        }
        if process == neighbor {
            return Err(ProvGraphError::merge_violation("cannot merge an activity with itself"));
        }

        let forward = self.contains(&Triple::new(process, prov::WAS_INFORMED_BY, neighbor));
        let backward = self.contains(&Triple::new(neighbor, prov::WAS_INFORMED_BY, process));
        let (earlier, later) = match (forward, backward) {
            (true, false) => (neighbor.clone(), process.clone()),
            (false, true) => (process.clone(), neighbor.clone()),
            (true, true) => {
                return Err(ProvGraphError::merge_violation(format!(
                    "{process} and {neighbor} inform each other"
                )));
            }
            (false, false) => {
                return Err(ProvGraphError::merge_violation(format!(
                    "{process} and {neighbor} are not linked by wasInformedBy"
                )));
            }
        };
        if self.has_detour(&earlier, &later) {
            return Err(ProvGraphError::merge_violation(format!(
                "{earlier} also reaches {later} through another activity, merging them would close a cycle"
            )));
        }
        let pair = [&earlier, &later];

        let earlier_inputs = self.used_entities(&earlier);
        let earlier_outputs = self.generated_entities(&earlier);
        let later_inputs = self.used_entities(&later);
        let later_outputs = self.generated_entities(&later);

        let intermediates: BTreeSet<EntityId> = earlier_outputs
            .intersection(&later_inputs)
            .filter(|entity| self.users(entity).iter().all(|user| pair.contains(&user)))
            .cloned()
            .collect();
        let inputs: BTreeSet<EntityId> = earlier_inputs
            .union(&later_inputs)
            .filter(|entity| !earlier_outputs.contains(*entity))
            .cloned()
            .collect();
        let outputs: BTreeSet<EntityId> = later_outputs
            .iter()
            .chain(earlier_outputs.difference(&intermediates))
            .cloned()
            .collect();
        let outside = |set: BTreeSet<ActivityId>| -> BTreeSet<ActivityId> {
            set.into_iter().filter(|activity| !pair.contains(&activity)).collect()
        };
        let predecessors = outside(
            self.predecessors(&earlier)
                .into_iter()
                .chain(self.predecessors(&later))
                .collect(),
        );
        let successors = outside(
            self.successors(&earlier)
                .into_iter()
                .chain(self.successors(&later))
                .collect(),
        );
        let agents: BTreeSet<AgentId> = self
            .associated_agents(&earlier)
            .into_iter()
            .chain(self.associated_agents(&later))
            .collect();
        let tags: BTreeSet<String> = self.tags(&earlier).into_iter().chain(self.tags(&later)).collect();

        let process_importance = self.importance(process).unwrap_or_default();
        let neighbor_importance = self.importance(neighbor).unwrap_or_default();
        let importance = (process_importance + neighbor_importance).min(1.0);
        let anchor = if process_importance > neighbor_importance + IMPORTANCE_EPSILON {
            process
        } else {
            neighbor
        };
        let label = self.explicit_label(anchor.iri());
        let process_type = self.process_type(anchor);

        let started = [self.started_at(&earlier)?, self.started_at(&later)?]
            .into_iter()
            .flatten()
            .min();
        let ended = [self.ended_at(&earlier)?, self.ended_at(&later)?]
            .into_iter()
            .flatten()
            .max();

        let mut derivations = Vec::new();
        for output in &outputs {
            let closure = self.derivation_closure(output);
            for input in inputs.iter().filter(|input| *input != output) {
                if closure.contains(input.iri()) {
                    derivations.push(Triple::new(output, prov::WAS_DERIVED_FROM, input));
                }
            }
        }

        let composite = ActivityId::from_iri(self.allocate(None)?);

        let mut changes = ChangeSet::new();
        for entity in &intermediates {
            changes
                .remove(TriplePattern::any().subject(entity))
                .remove(TriplePattern::any().object(entity));
        }
        for member in pair {
            changes
                .remove(TriplePattern::any().subject(member).predicate(prov::USED))
                .remove(TriplePattern::any().predicate(prov::WAS_GENERATED_BY).object(member))
                .remove(TriplePattern::any().subject(member).predicate(prov::WAS_INFORMED_BY))
                .remove(TriplePattern::any().predicate(prov::WAS_INFORMED_BY).object(member))
                .remove(TriplePattern::any().subject(member).predicate(rdf::TYPE))
                .add(Triple::new(member, rdf::TYPE, geokur::SUB_PROCESS))
                .add(Triple::new(&composite, geokur::HAS_SUB_PROCESS, member));
        }

        changes
            .add(Triple::new(&composite, rdf::TYPE, geokur::PROCESS))
            .add(Triple::new(
                &composite,
                geokur::HAS_RELATIVE_IMPORTANCE,
                Literal::double(importance),
            ));
        if let Some(label) = label {
            changes.add(Triple::new(&composite, rdfs::LABEL, Literal::plain(label)));
        }
        if let Some(process_type) = process_type {
            changes.add(Triple::new(&composite, geokur::HAS_PROCESS_TYPE, process_type));
        }
        if let Some(started) = started {
            changes.add(Triple::new(&composite, prov::STARTED_AT_TIME, Literal::date_time(&started)));
        }
        if let Some(ended) = ended {
            changes.add(Triple::new(&composite, prov::ENDED_AT_TIME, Literal::date_time(&ended)));
        }
        for tag in &tags {
            changes.add(Triple::new(&composite, geokur::HAS_TAG, Literal::plain(tag)));
        }
        for input in &inputs {
            changes.add(Triple::new(&composite, prov::USED, input));
        }
        for output in &outputs {
            changes.add(Triple::new(output, prov::WAS_GENERATED_BY, &composite));
        }
        for agent in &agents {
            changes.add(Triple::new(&composite, prov::WAS_ASSOCIATED_WITH, agent));
        }
        for predecessor in &predecessors {
            changes.add(Triple::new(&composite, prov::WAS_INFORMED_BY, predecessor));
        }
        for successor in &successors {
            changes.add(Triple::new(successor, prov::WAS_INFORMED_BY, &composite));
        }
        for derivation in derivations {
            changes.add(derivation);
        }

        let summary = self.commit(changes);
        self.infer_was_informed_by_links();
        info!(
            composite = %composite,
            earlier = %earlier,
            later = %later,
            importance,
            removed_entities = intermediates.len(),
            removed_triples = summary.removed,
            "Activities merged"
        );
        Ok(MergeOutcome {
            composite,
            earlier,
            later,
            importance,
            removed_entities: intermediates.into_iter().collect(),
        })
    }

    /// One merge step. `None` once at most one activity is left.
    pub fn generalize_step(&mut self) -> Result<Option<MergeOutcome>> {
        if self.activities().len() <= 1 {
            return Ok(None);
        }
        self.ensure_importance()?;
        let pair = self.get_merge_pair()?;
        self.merge(&pair.process, &pair.neighbor).map(Some)
    }

    /// Merge until one activity remains, writing a snapshot of the initial
    /// graph and after every step.
    pub fn generalize(&mut self, writer: &mut dyn SnapshotWriter) -> Result<GeneralizeReport> {
        let mut report = GeneralizeReport::default();
        if !self.activities().is_empty() {
            self.ensure_importance()?;
        }
        writer.write_snapshot(self, 0)?;
        report
            .levels
            .push(LevelSummary::capture(self, 0, MergeMode::Initial, None, 0));

        let mut step = 0;
        loop {
            let remaining = self.activities().len();
            if remaining <= 1 {
                break;
            }
            step += 1;
            let span = spans::generalize_step(step, remaining);
            let _guard = span.enter();
            let Some(outcome) = self.generalize_step()? else {
                break;
            };
            writer.write_snapshot(self, step)?;
            report
                .levels
                .push(LevelSummary::capture(self, step, MergeMode::Pairwise, None, 1));
            report.merges.push(outcome);
        }
        info!(steps = step, "Generalization finished");
        Ok(report)
    }
}
