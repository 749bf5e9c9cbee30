//! Engine configuration.
//!
//! The tag vocabulary (tag -> category) and the category weights are two
//! external key-value tables. They are loaded once, validated, and then
//! handed to the graph by value; nothing here is global.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::debug;

pub const DEFAULT_NAMESPACE: &str = "https://provgran.example.org/";

/// Structural tags attached by the graph itself.
pub mod structural_tags {
    pub const MULTIPLE_INS: &str = "multipleIns";
    pub const MULTIPLE_OUTS: &str = "multipleOuts";
    pub const ROOT: &str = "root";
    pub const BRANCH: &str = "branch";
}

/// What to do when every activity has a zero tag weight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroImportancePolicy {
    /// Every activity receives `1 / N`.
    #[default]
    Uniform,
    /// Fail with `ZeroTotalImportance`.
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagConfig {
    /// tag -> category
    pub categories: BTreeMap<String, String>,
    /// category -> weight
    pub weights: BTreeMap<String, f64>,
}

impl TagConfig {
    pub fn from_tables(
        categories: impl IntoIterator<Item = (String, String)>,
        weights: impl IntoIterator<Item = (String, f64)>,
    ) -> Result<Self> {
        let config = Self {
            categories: categories.into_iter().collect(),
            weights: weights.into_iter().collect(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Load the two tables from separate JSON objects on disk.
    pub fn from_json_files(categories: &Path, weights: &Path) -> Result<Self> {
        let categories: BTreeMap<String, String> = serde_json::from_str(&read(categories)?)?;
        let weights: BTreeMap<String, f64> = serde_json::from_str(&read(weights)?)?;
        Self::from_tables(categories, weights)
    }

    pub fn is_known(&self, tag: &str) -> bool {
        self.categories.contains_key(tag)
    }

    pub fn category_of(&self, tag: &str) -> Option<&str> {
        self.categories.get(tag).map(String::as_str)
    }

    /// Weight contributed by a tag through its category.
    pub fn weight_of(&self, tag: &str) -> Option<f64> {
        self.category_of(tag)
            .and_then(|category| self.weights.get(category))
            .copied()
    }

    pub fn validate(&self) -> Result<()> {
        for (category, weight) in &self.weights {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(ConfigError::InvalidWeight {
                    category: category.clone(),
                    weight: *weight,
                });
            }
        }
        for (tag, category) in &self.categories {
            if !self.weights.contains_key(category) {
                return Err(ConfigError::MissingWeight {
                    tag: tag.clone(),
                    category: category.clone(),
                });
            }
        }
        Ok(())
    }
}

impl Default for TagConfig {
    fn default() -> Self {
        let categories = [
            (structural_tags::MULTIPLE_INS, "structure"),
            (structural_tags::MULTIPLE_OUTS, "structure"),
            (structural_tags::ROOT, "junction"),
            (structural_tags::BRANCH, "junction"),
            ("import", "io"),
            ("export", "io"),
            ("selection", "filter"),
            ("clip", "filter"),
            ("parameterizable", "configuration"),
            ("wildcard", "configuration"),
            ("irreversible", "destructive"),
            ("aggregation", "destructive"),
            ("reprojection", "transformation"),
            ("conversion", "transformation"),
        ];
        let weights = [
            ("io", 1.0),
            ("filter", 2.0),
            ("configuration", 1.5),
            ("destructive", 3.0),
            ("transformation", 1.0),
            ("structure", 2.0),
            ("junction", 2.5),
        ];
        Self {
            categories: categories
                .into_iter()
                .map(|(tag, category)| (tag.to_string(), category.to_string()))
                .collect(),
            weights: weights
                .into_iter()
                .map(|(category, weight)| (category.to_string(), weight))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Namespace new node identifiers are minted in.
    pub namespace: String,
    pub tags: TagConfig,
    /// Change types from finest to coarsest, as local names in the project
    /// vocabulary.
    pub change_hierarchy: Vec<String>,
    pub zero_importance: ZeroImportancePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            tags: TagConfig::default(),
            change_hierarchy: [
                "BasalChange",
                "UnitChange",
                "ValueChange",
                "SemanticShift",
                "CoreConcept",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            zero_importance: ZeroImportancePolicy::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let config = Self::from_json_str(&read(path)?)?;
        debug!(
            path = %path.display(),
            tags = config.tags.categories.len(),
            change_types = config.change_hierarchy.len(),
            "Engine configuration loaded"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.tags.validate()?;
        if self.change_hierarchy.is_empty() {
            return Err(ConfigError::EmptyHierarchy);
        }
        let mut seen = HashSet::new();
        for change in &self.change_hierarchy {
            if !seen.insert(change.as_str()) {
                return Err(ConfigError::DuplicateChangeType(change.clone()));
            }
        }
        Ok(())
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}
