//! Registry of identifiers issued within one graph.

use crate::{validate_iri, IdError, IdScope, Namespace, Result};
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct IdVault {
    issued: HashSet<String>,
}

impl IdVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a fresh identifier `namespace + uuid` that was never issued.
    pub fn generate(&mut self, namespace: &Namespace) -> Result<String> {
        self.generate_in(namespace, &IdScope::new())
    }

    /// Mint a fresh identifier below the scope path of `scope`.
    pub fn generate_in(&mut self, namespace: &Namespace, scope: &IdScope) -> Result<String> {
        let prefix = format!("{}{}", namespace.as_str(), scope.path());
        let mut id = format!("{}{}", prefix, uuid::Uuid::new_v4());
        while self.issued.contains(&id) {
            id = format!("{}{}", prefix, uuid::Uuid::new_v4());
        }
        validate_iri(&id)?;
        self.issued.insert(id.clone());
        Ok(id)
    }

    /// Register a caller supplied identifier.
    pub fn add(&mut self, id: impl Into<String>) -> Result<String> {
        let id = id.into();
        if self.issued.contains(&id) {
            return Err(IdError::AlreadyUsed(id));
        }
        validate_iri(&id)?;
        self.issued.insert(id.clone());
        Ok(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.issued.contains(id)
    }

    pub fn len(&self) -> usize {
        self.issued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issued.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn namespace() -> Namespace {
        Namespace::new("https://test.package/").unwrap()
    }

    #[test]
    fn generated_ids_are_valid_and_unique() {
        let mut vault = IdVault::new();
        let ns = namespace();
        let ids: HashSet<String> = (0..500).map(|_| vault.generate(&ns).unwrap()).collect();
        assert_eq!(ids.len(), 500);
        assert!(ids.iter().all(|id| validate_iri(id).is_ok() && id.starts_with(ns.as_str())));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut vault = IdVault::new();
        vault.add("https://test.package/test").unwrap();
        assert_eq!(
            vault.add("https://test.package/test"),
            Err(IdError::AlreadyUsed("https://test.package/test".to_string()))
        );
        assert_eq!(vault.len(), 1);
    }

    #[test]
    fn malformed_ids_are_not_registered() {
        let mut vault = IdVault::new();
        assert!(matches!(vault.add("https://test.package/te st"), Err(IdError::Malformed { .. })));
        assert!(vault.is_empty());
    }

    #[test]
    fn scoped_ids_embed_the_path() {
        let mut vault = IdVault::new();
        let mut scope = IdScope::new();
        scope.push("preprocessing").unwrap();
        let id = vault.generate_in(&namespace(), &scope).unwrap();
        assert!(id.starts_with("https://test.package/preprocessing/"));
    }

    #[test]
    fn vaults_do_not_share_state() {
        let mut first = IdVault::new();
        let mut second = IdVault::new();
        first.add("https://test.package/shared").unwrap();
        assert!(second.add("https://test.package/shared").is_ok());
    }
}
