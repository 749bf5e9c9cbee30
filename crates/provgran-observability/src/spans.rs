//! Span constructors for the reduction engine phases.
//!
//! Keeping span names in one place lets log filters such as
//! `RUST_LOG=provgran[merge_group]=debug` stay stable.

use tracing::{info_span, Span};

pub fn generalize_step(step: usize, activities: usize) -> Span {
    info_span!("generalize_step", step, activities)
}

pub fn merge_pair(process: &str, neighbor: &str) -> Span {
    info_span!("merge_pair", process, neighbor)
}

pub fn granularity_level(level: usize, change_type: &str, mode: &'static str) -> Span {
    info_span!("granularity_level", level, change_type, mode)
}

pub fn merge_group(sink: &str, members: usize) -> Span {
    info_span!("merge_group", sink, members)
}

pub fn write_snapshot(path: &std::path::Path) -> Span {
    info_span!("write_snapshot", path = %path.display())
}

pub fn load_graph(path: &std::path::Path) -> Span {
    info_span!("load_graph", path = %path.display())
}
