//! Granularity reduction.
//!
//! Two strategies coarsen a graph step by step:
//! - [`pairwise`] folds the least important activity into its least
//!   important neighbour until one activity remains;
//! - [`typed`] collapses chains of activities sharing a change type, walking
//!   the change hierarchy from finest to coarsest.
//!
//! Both write a snapshot after every step through a
//! [`SnapshotWriter`](crate::snapshot::SnapshotWriter). Every merge is
//! validated in full and then committed as one change set.

pub mod pairwise;
pub mod partition;
pub mod typed;

pub use pairwise::{GeneralizeReport, MergeOutcome, MergePair};
pub use partition::{divide_merge_list, MergeEdge, MergeGroup};
pub use typed::GranularityReport;

use crate::graph::ProvGraph;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeMode {
    Initial,
    Pairwise,
    Flat,
    Up,
}

impl MergeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeMode::Initial => "initial",
            MergeMode::Pairwise => "pairwise",
            MergeMode::Flat => "flat",
            MergeMode::Up => "up",
        }
    }
}

/// One written granularity level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelSummary {
    pub level: usize,
    pub mode: MergeMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_type: Option<String>,
    pub merges: usize,
    pub activities: usize,
    pub triples: usize,
}

impl LevelSummary {
    pub(crate) fn capture(
        graph: &ProvGraph,
        level: usize,
        mode: MergeMode,
        change_type: Option<String>,
        merges: usize,
    ) -> Self {
        Self {
            level,
            mode,
            change_type,
            merges,
            activities: graph.activities().len(),
            triples: graph.len(),
        }
    }
}
