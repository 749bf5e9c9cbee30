//! Text formats for graphs.

mod lexer;
pub mod ntriples;
pub mod turtle;

use crate::error::{ProvGraphError, Result};
use crate::graph::ProvGraph;
use crate::types::Triple;
use provgran_core::EngineConfig;
use provgran_observability::spans;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Extensions of RDF syntaxes this crate does not read.
const UNREADABLE_EXTENSIONS: [&str; 5] = ["rdf", "xml", "owl", "jsonld", "trig"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RdfFormat {
    #[default]
    Turtle,
    NTriples,
}

impl RdfFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            RdfFormat::Turtle => "ttl",
            RdfFormat::NTriples => "nt",
        }
    }

    /// `.nt` is N-Triples; `.ttl` and `.n3` are read as Turtle.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "nt" => Some(RdfFormat::NTriples),
            "ttl" | "n3" => Some(RdfFormat::Turtle),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|extension| extension.to_str())
            .and_then(Self::from_extension)
    }

    pub fn write<'a>(&self, triples: impl IntoIterator<Item = &'a Triple>, namespace: Option<&str>) -> String {
        match self {
            RdfFormat::Turtle => turtle::write(triples, namespace),
            RdfFormat::NTriples => ntriples::write(triples),
        }
    }

    pub fn parse(&self, input: &str) -> Result<Vec<Triple>> {
        match self {
            RdfFormat::Turtle => turtle::parse(input),
            RdfFormat::NTriples => ntriples::parse(input),
        }
    }
}

impl ProvGraph {
    pub fn serialize(&self, format: RdfFormat) -> String {
        format.write(self.triples(), Some(self.namespace().as_str()))
    }

    pub fn write_to(&self, path: &Path, format: RdfFormat) -> Result<()> {
        std::fs::write(path, self.serialize(format))?;
        Ok(())
    }

    pub fn parse(config: EngineConfig, input: &str, format: RdfFormat) -> Result<Self> {
        Self::from_triples(config, format.parse(input)?)
    }

    /// Load a document, picking the format from the file extension
    /// (Turtle when unknown). XML and JSON-LD documents are refused.
    pub fn load(config: EngineConfig, path: &Path) -> Result<Self> {
        let span = spans::load_graph(path);
        let _guard = span.enter();
        let extension = path
            .extension()
            .and_then(|extension| extension.to_str())
            .map(str::to_ascii_lowercase);
        if let Some(extension) = extension.filter(|extension| UNREADABLE_EXTENSIONS.contains(&extension.as_str())) {
            return Err(ProvGraphError::UnsupportedFormat(extension));
        }
        let format = RdfFormat::from_path(path).unwrap_or_default();
        let input = std::fs::read_to_string(path)?;
        let graph = Self::parse(config, &input, format)?;
        info!(
            triples = graph.len(),
            activities = graph.activities().len(),
            "Graph loaded"
        );
        Ok(graph)
    }
}
