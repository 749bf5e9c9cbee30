//! Error types for loading and validating engine configuration.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("failed to read configuration {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration is not valid JSON for the expected shape
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A tag points at a category that has no weight
    #[error("tag \"{tag}\" uses category \"{category}\" which has no weight")]
    MissingWeight { tag: String, category: String },

    /// Weights must be finite and non-negative
    #[error("category \"{category}\" has invalid weight {weight}")]
    InvalidWeight { category: String, weight: f64 },

    /// The change hierarchy drives the type-driven merge and cannot be empty
    #[error("change hierarchy is empty")]
    EmptyHierarchy,

    #[error("change type \"{0}\" appears more than once in the hierarchy")]
    DuplicateChangeType(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
