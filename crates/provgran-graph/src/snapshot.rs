//! Granularity snapshots.
//!
//! The reduction strategies hand the graph to a [`SnapshotWriter`] after
//! every step. Levels count up from 0 (the input graph).

use crate::codec::RdfFormat;
use crate::error::Result;
use crate::graph::ProvGraph;
use crate::types::Triple;
use crate::views::ThreadView;
use provgran_observability::spans;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::info;

pub trait SnapshotWriter {
    fn write_snapshot(&mut self, graph: &ProvGraph, level: usize) -> Result<()>;
}

/// File name suffix scheme for levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotNaming {
    /// `base-3.ttl`
    Dash,
    /// `base_LOG3.ttl`
    Log,
}

impl SnapshotNaming {
    pub fn suffix(&self, level: usize) -> String {
        match self {
            SnapshotNaming::Dash => format!("-{level}"),
            SnapshotNaming::Log => format!("_LOG{level}"),
        }
    }
}

/// Writes each level next to `base`, optionally with thread views.
#[derive(Debug, Clone)]
pub struct FileSnapshotWriter {
    base: PathBuf,
    naming: SnapshotNaming,
    format: RdfFormat,
    views: Vec<ThreadView>,
    written: Vec<PathBuf>,
}

impl FileSnapshotWriter {
    pub fn new(base: impl Into<PathBuf>, naming: SnapshotNaming, format: RdfFormat) -> Self {
        Self {
            base: base.into(),
            naming,
            format,
            views: Vec::new(),
            written: Vec::new(),
        }
    }

    pub fn with_views(mut self, views: impl IntoIterator<Item = ThreadView>) -> Self {
        self.views.extend(views);
        self
    }

    pub fn path_for(&self, level: usize) -> PathBuf {
        self.file_name(None, level)
    }

    pub fn view_path_for(&self, view: ThreadView, level: usize) -> PathBuf {
        self.file_name(Some(view), level)
    }

    fn file_name(&self, view: Option<ThreadView>, level: usize) -> PathBuf {
        let mut name = OsString::from(self.base.as_os_str());
        if let Some(view) = view {
            name.push("_");
            name.push(view.file_tag());
        }
        name.push(self.naming.suffix(level));
        name.push(".");
        name.push(self.format.extension());
        PathBuf::from(name)
    }

    /// Every file written so far, in order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn write_file(&mut self, path: PathBuf, contents: String) -> Result<()> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, contents)?;
        self.written.push(path);
        Ok(())
    }
}

impl SnapshotWriter for FileSnapshotWriter {
    fn write_snapshot(&mut self, graph: &ProvGraph, level: usize) -> Result<()> {
        let path = self.path_for(level);
        let span = spans::write_snapshot(&path);
        let _guard = span.enter();

        self.write_file(path.clone(), graph.serialize(self.format))?;
        for view in self.views.clone() {
            let triples = view.extract(graph);
            let contents = self
                .format
                .write(&triples, Some(graph.namespace().as_str()));
            self.write_file(self.view_path_for(view, level), contents)?;
        }
        info!(
            level,
            path = %path.display(),
            triples = graph.len(),
            activities = graph.activities().len(),
            "Snapshot written"
        );
        Ok(())
    }
}

/// One captured level.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub level: usize,
    pub activities: usize,
    pub triples: Vec<Triple>,
}

/// Keeps every level in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotWriter {
    pub snapshots: Vec<Snapshot>,
}

impl MemorySnapshotWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn levels(&self) -> Vec<usize> {
        self.snapshots.iter().map(|snapshot| snapshot.level).collect()
    }
}

impl SnapshotWriter for MemorySnapshotWriter {
    fn write_snapshot(&mut self, graph: &ProvGraph, level: usize) -> Result<()> {
        self.snapshots.push(Snapshot {
            level,
            activities: graph.activities().len(),
            triples: graph.triples().cloned().collect(),
        });
        Ok(())
    }
}

/// Base path without extension, for callers that pass `out/graph.ttl`.
pub fn strip_extension(path: &Path) -> PathBuf {
    match RdfFormat::from_path(path) {
        Some(_) => path.with_extension(""),
        None => path.to_path_buf(),
    }
}
