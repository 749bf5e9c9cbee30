//! Shared configuration for provenance graph construction and reduction.

pub mod config;
pub mod error;

pub use config::{structural_tags, EngineConfig, TagConfig, ZeroImportancePolicy, DEFAULT_NAMESPACE};
pub use error::{ConfigError, Result};
