//! Typed IRI namespaces.
//!
//! A [`Namespace`] replaces string concatenation at call sites: terms are
//! minted with [`Namespace::term`] and recognised with
//! [`Namespace::local_name`].

use crate::{IdError, Result};
use std::fmt;
use url::Url;

/// Absolute URL with a non-empty host, or the reason it is not one.
pub(crate) fn check_absolute_url(value: &str) -> std::result::Result<(), String> {
    let url = Url::parse(value).map_err(|err| format!("not an absolute URL: {err}"))?;
    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err("URL has no host".to_string()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Namespace(String);

impl Namespace {
    /// Create a namespace. It must be an absolute URL ending in `/` or `#`.
    pub fn new(iri: impl Into<String>) -> Result<Self> {
        let iri = iri.into();
        if check_absolute_url(&iri).is_err() || iri.chars().any(|ch| crate::FORBIDDEN_IRI_CHARS.contains(ch)) {
            return Err(IdError::NamespaceMalformed(iri));
        }
        if !(iri.ends_with('/') || iri.ends_with('#')) {
            return Err(IdError::NamespaceMissingEndSymbol(iri));
        }
        Ok(Self(iri))
    }

    /// Namespace for vocabularies known at compile time. No validation.
    pub const fn from_static(iri: &'static str) -> StaticNamespace {
        StaticNamespace(iri)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn term(&self, local: &str) -> String {
        format!("{}{}", self.0, local)
    }

    pub fn contains(&self, iri: &str) -> bool {
        iri.starts_with(&self.0)
    }

    pub fn local_name<'a>(&self, iri: &'a str) -> Option<&'a str> {
        iri.strip_prefix(self.0.as_str())
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Namespace {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Compile-time namespace used for the fixed PROV-O and project vocabularies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticNamespace(&'static str);

impl StaticNamespace {
    pub const fn as_str(&self) -> &'static str {
        self.0
    }

    pub fn term(&self, local: &str) -> String {
        format!("{}{}", self.0, local)
    }

    pub fn local_name<'a>(&self, iri: &'a str) -> Option<&'a str> {
        iri.strip_prefix(self.0)
    }

    pub fn to_namespace(self) -> Namespace {
        Namespace(self.0.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_requires_end_symbol() {
        assert_eq!(
            Namespace::new("https://provo-example.org"),
            Err(IdError::NamespaceMissingEndSymbol("https://provo-example.org".to_string()))
        );
        assert!(Namespace::new("https://provo-example.org/").is_ok());
        assert!(Namespace::new("https://provo-example.org/ns#").is_ok());
    }

    #[test]
    fn namespace_must_be_url() {
        assert!(matches!(Namespace::new("not a url/"), Err(IdError::NamespaceMalformed(_))));
        assert!(matches!(Namespace::new("https://ex{}.org/"), Err(IdError::NamespaceMalformed(_))));
    }

    #[test]
    fn term_and_local_name_are_inverse() {
        let ns = Namespace::new("https://example.com/").unwrap();
        let term = ns.term("dissolve");
        assert_eq!(term, "https://example.com/dissolve");
        assert_eq!(ns.local_name(&term), Some("dissolve"));
        assert_eq!(ns.local_name("http://other.org/x"), None);
    }
}
