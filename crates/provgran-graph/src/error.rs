use provgran_core::ConfigError;
use provgran_id::{IdError, ProvKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProvGraphError {
    #[error(transparent)]
    Id(#[from] IdError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{relation} expects {expected} but {node} is {found}")]
    InvalidRelationTarget {
        relation: &'static str,
        node: String,
        expected: ProvKind,
        found: ProvKind,
    },
    #[error("unknown node {0}")]
    UnknownNode(String),
    #[error("invalid timestamp \"{value}\" on {node}")]
    InvalidTimestamp { node: String, value: String },
    #[error("relative importance {value} of {node} is outside [0, 1]")]
    ImportanceOutOfRange { node: String, value: f64 },
    #[error("merge invariant violated: {reason}")]
    MergeInvariantViolation { reason: String },
    #[error("total relative importance of {activities} activities is zero")]
    ZeroTotalImportance { activities: usize },
    #[error("cannot read .{0} documents, only Turtle and N-Triples")]
    UnsupportedFormat(String),
    #[error("parse error at line {line}: {reason}")]
    Parse { line: usize, reason: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProvGraphError {
    pub(crate) fn merge_violation(reason: impl Into<String>) -> Self {
        ProvGraphError::MergeInvariantViolation { reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, ProvGraphError>;
