//! Relative importance of top-level activities.

use crate::error::{ProvGraphError, Result};
use crate::graph::ProvGraph;
use crate::store::ChangeSet;
use crate::types::{ActivityId, Literal, Triple, TriplePattern};
use crate::vocabulary::geokur;
use provgran_core::ZeroImportancePolicy;
use provgran_id::ProvKind;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Tolerance for comparing importance values.
pub const IMPORTANCE_EPSILON: f64 = 1e-9;

impl ProvGraph {
    /// Score every top-level activity by the weights of its tags' categories
    /// and normalise the scores to sum to one.
    ///
    /// When every score is zero the configured policy decides between a
    /// uniform `1 / N` and `ZeroTotalImportance`.
    pub fn compute_relative_importance(&mut self) -> Result<BTreeMap<ActivityId, f64>> {
        let activities = self.activities();
        if activities.is_empty() {
            return Ok(BTreeMap::new());
        }
        let scores: BTreeMap<ActivityId, f64> = activities
            .into_iter()
            .map(|activity| {
                let score: f64 = self
                    .tags(&activity)
                    .iter()
                    .filter_map(|tag| self.config().tags.weight_of(tag))
                    .sum();
                (activity, score)
            })
            .collect();
        let total: f64 = scores.values().sum();

        let importance: BTreeMap<ActivityId, f64> = if total > 0.0 {
            scores
                .into_iter()
                .map(|(activity, score)| (activity, score / total))
                .collect()
        } else {
            match self.config().zero_importance {
                ZeroImportancePolicy::Uniform => {
                    warn!(activities = scores.len(), "No tag weights, importance is uniform");
                    let share = 1.0 / scores.len() as f64;
                    scores.into_keys().map(|activity| (activity, share)).collect()
                }
                ZeroImportancePolicy::Error => {
                    return Err(ProvGraphError::ZeroTotalImportance {
                        activities: scores.len(),
                    });
                }
            }
        };

        let mut changes = ChangeSet::new();
        for (activity, value) in &importance {
            changes
                .remove(
                    TriplePattern::any()
                        .subject(activity)
                        .predicate(geokur::HAS_RELATIVE_IMPORTANCE),
                )
                .add(Triple::new(activity, geokur::HAS_RELATIVE_IMPORTANCE, Literal::double(*value)));
        }
        self.commit(changes);
        debug!(activities = importance.len(), total, "Relative importance computed");
        Ok(importance)
    }

    pub fn set_importance(&mut self, activity: &ActivityId, value: f64) -> Result<()> {
        self.expect_kind(activity.iri(), "hasRelativeImportance", ProvKind::Activity)?;
        if !(0.0..=1.0).contains(&value) {
            return Err(ProvGraphError::ImportanceOutOfRange {
                node: activity.to_string(),
                value,
            });
        }
        self.replace_value(activity.iri(), geokur::HAS_RELATIVE_IMPORTANCE, Literal::double(value));
        Ok(())
    }

    /// Sum of the stored importance over top-level activities.
    pub fn total_importance(&self) -> f64 {
        self.activities()
            .iter()
            .filter_map(|activity| self.importance(activity))
            .sum()
    }

    /// Importance of every top-level activity, computing it first when any
    /// value is missing. Stored values are otherwise authoritative.
    pub(crate) fn ensure_importance(&mut self) -> Result<BTreeMap<ActivityId, f64>> {
        let activities = self.activities();
        if activities.iter().any(|activity| self.importance(activity).is_none()) {
            return self.compute_relative_importance();
        }
        let mut importance = BTreeMap::new();
        for activity in activities {
            let value = self.importance(&activity).unwrap_or_default();
            if !(-IMPORTANCE_EPSILON..=1.0 + IMPORTANCE_EPSILON).contains(&value) {
                return Err(ProvGraphError::ImportanceOutOfRange {
                    node: activity.to_string(),
                    value,
                });
            }
            importance.insert(activity, value);
        }
        Ok(importance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::ActivityBuilder;
    use provgran_core::EngineConfig;

    #[test]
    fn importance_is_normalised() {
        let mut graph = ProvGraph::new(EngineConfig::default()).unwrap();
        let a = graph.add_activity(ActivityBuilder::new()).unwrap();
        let b = graph.add_activity(ActivityBuilder::new()).unwrap();
        graph.tag_process(&a, ["import"]).unwrap();
        graph.tag_process(&b, ["irreversible", "selection"]).unwrap();
        let importance = graph.compute_relative_importance().unwrap();
        assert!((importance[&a] - 1.0 / 6.0).abs() < IMPORTANCE_EPSILON);
        assert!((importance[&b] - 5.0 / 6.0).abs() < IMPORTANCE_EPSILON);
        assert!((graph.total_importance() - 1.0).abs() < IMPORTANCE_EPSILON);
    }

    #[test]
    fn zero_total_falls_back_to_uniform() {
        let mut graph = ProvGraph::new(EngineConfig::default()).unwrap();
        for _ in 0..4 {
            graph.add_activity(ActivityBuilder::new()).unwrap();
        }
        let importance = graph.compute_relative_importance().unwrap();
        assert!(importance.values().all(|value| (*value - 0.25).abs() < IMPORTANCE_EPSILON));
    }

    #[test]
    fn zero_total_can_be_an_error() {
        let config = EngineConfig {
            zero_importance: ZeroImportancePolicy::Error,
            ..EngineConfig::default()
        };
        let mut graph = ProvGraph::new(config).unwrap();
        graph.add_activity(ActivityBuilder::new()).unwrap();
        assert!(matches!(
            graph.compute_relative_importance(),
            Err(ProvGraphError::ZeroTotalImportance { activities: 1 })
        ));
    }

    #[test]
    fn out_of_range_importance_is_rejected() {
        let mut graph = ProvGraph::new(EngineConfig::default()).unwrap();
        let a = graph.add_activity(ActivityBuilder::new()).unwrap();
        assert!(matches!(
            graph.set_importance(&a, 1.5),
            Err(ProvGraphError::ImportanceOutOfRange { .. })
        ));
    }
}
