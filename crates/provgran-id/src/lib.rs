//! Identity for provenance graph nodes.
//!
//! This crate owns the rules for node identifiers: which strings are valid
//! IRIs, how fresh identifiers are minted inside a namespace, and how callers
//! build hierarchical identifiers from an explicit scope stack. The registry
//! of issued identifiers lives in an [`IdVault`] owned by a single graph.

pub mod namespace;
pub mod scope;
pub mod vault;

pub use namespace::Namespace;
pub use scope::IdScope;
pub use vault::IdVault;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("identifier \"{id}\" is malformed: {reason}")]
    Malformed { id: String, reason: String },
    #[error("identifier \"{0}\" was already used in this graph")]
    AlreadyUsed(String),
    #[error("namespace \"{0}\" is not a valid URL")]
    NamespaceMalformed(String),
    #[error("namespace \"{0}\" has to end with '/' or '#'")]
    NamespaceMissingEndSymbol(String),
    #[error("scope segment \"{0}\" is not usable inside an identifier")]
    InvalidScopeSegment(String),
}

pub type Result<T> = std::result::Result<T, IdError>;

/// Kind of PROV-O node an identifier was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProvKind {
    Entity,
    Activity,
    Agent,
}

impl ProvKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProvKind::Entity => "Entity",
            ProvKind::Activity => "Activity",
            ProvKind::Agent => "Agent",
        }
    }
}

impl std::fmt::Display for ProvKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Characters that may never appear in an IRI written by this workspace.
pub const FORBIDDEN_IRI_CHARS: &str = "<>\"{}|\\^`";

/// Check an identifier against the IRI rules used by the vault.
///
/// The identifier must not contain any of [`FORBIDDEN_IRI_CHARS`] or
/// whitespace, and must be an absolute URL (`scheme://authority[/path]`).
pub fn validate_iri(id: &str) -> Result<()> {
    if let Some(ch) = id
        .chars()
        .find(|ch| FORBIDDEN_IRI_CHARS.contains(*ch) || ch.is_whitespace())
    {
        return Err(IdError::Malformed {
            id: id.to_string(),
            reason: format!("contains forbidden character {:?}", ch),
        });
    }
    namespace::check_absolute_url(id).map_err(|reason| IdError::Malformed {
        id: id.to_string(),
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_every_forbidden_symbol() {
        for symbol in FORBIDDEN_IRI_CHARS.chars() {
            let id = format!("https://test.package/te{symbol}st");
            assert!(matches!(validate_iri(&id), Err(IdError::Malformed { .. })), "{id}");
        }
    }

    #[test]
    fn rejects_whitespace_and_relative_ids() {
        assert!(validate_iri("https://test.package/a b").is_err());
        assert!(validate_iri("https://test.package/a\tb").is_err());
        assert!(validate_iri("just-a-name").is_err());
        assert!(validate_iri("/relative/path").is_err());
    }

    #[test]
    fn rejects_broken_authorities() {
        for id in [
            "https://:::/x",
            "http://[[/a",
            "a1://@@@",
            "https://exa%mple/x",
            "mailto:someone@example.org",
        ] {
            assert!(matches!(validate_iri(id), Err(IdError::Malformed { .. })), "{id}");
        }
    }

    #[test]
    fn accepts_absolute_urls() {
        assert!(validate_iri("https://test.package/node").is_ok());
        assert!(validate_iri("http://www.w3.org/ns/prov#used").is_ok());
        assert!(validate_iri("https://example.com").is_ok());
    }
}
