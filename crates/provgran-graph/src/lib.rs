//! PROV-O provenance graphs and their granularity reduction.
//!
//! A [`ProvGraph`] is built from entities, activities and agents linked by
//! PROV-O relations, tagged and weighted by importance, and then coarsened
//! by one of the strategies in [`reduction`]. Each coarsening step can be
//! written out through a [`snapshot::SnapshotWriter`].

pub mod builders;
pub mod codec;
pub mod error;
pub mod graph;
pub mod importance;
pub mod inference;
pub mod reduction;
pub mod relations;
pub mod snapshot;
pub mod store;
pub mod tagging;
pub mod types;
pub mod views;
pub mod vocabulary;

pub use builders::{ActivityBuilder, AgentBuilder, EntityBuilder, Link};
pub use codec::RdfFormat;
pub use error::{ProvGraphError, Result};
pub use graph::{parse_timestamp, ProvGraph};
pub use importance::IMPORTANCE_EPSILON;
pub use reduction::{GeneralizeReport, GranularityReport, LevelSummary, MergeMode, MergeOutcome, MergePair};
pub use relations::Relation;
pub use snapshot::{FileSnapshotWriter, MemorySnapshotWriter, SnapshotNaming, SnapshotWriter};
pub use store::{ChangeSet, InMemoryTripleStore, TripleStore};
pub use tagging::TagReport;
pub use types::{ActivityId, AgentId, EntityId, Iri, Literal, NodeRef, Term, Triple, TriplePattern};
pub use views::ThreadView;

pub use provgran_core::{EngineConfig, TagConfig, ZeroImportancePolicy};
pub use provgran_id::{IdScope, Namespace, ProvKind};
