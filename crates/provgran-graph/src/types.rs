//! RDF terms, triples and typed node identifiers.

use crate::vocabulary::{rdf, xsd};
use provgran_id::ProvKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An absolute IRI. Validation happens when identifiers are issued by the
/// vault; terms read from documents are taken as they are.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Iri(String);

impl Iri {
    pub fn new(iri: impl Into<String>) -> Self {
        Self(iri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Iri {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Iri {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<&Iri> for Iri {
    fn from(value: &Iri) -> Self {
        value.clone()
    }
}

impl From<String> for Iri {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LiteralKind {
    Plain,
    Lang(String),
    Typed(Iri),
}

/// A literal keeps its lexical form; numeric values are parsed on read.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Literal {
    lexical: String,
    kind: LiteralKind,
}

impl Literal {
    pub fn plain(lexical: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            kind: LiteralKind::Plain,
        }
    }

    pub fn lang(lexical: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            kind: LiteralKind::Lang(tag.into()),
        }
    }

    pub fn typed(lexical: impl Into<String>, datatype: impl Into<Iri>) -> Self {
        let datatype = datatype.into();
        // xsd:string and plain literals are the same term
        if datatype.as_str() == xsd::STRING {
            return Self::plain(lexical);
        }
        Self {
            lexical: lexical.into(),
            kind: LiteralKind::Typed(datatype),
        }
    }

    pub fn double(value: f64) -> Self {
        Self::typed(format!("{value:?}"), xsd::DOUBLE)
    }

    pub fn date_time(value: &chrono::DateTime<chrono::Utc>) -> Self {
        Self::typed(
            value.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true),
            xsd::DATE_TIME,
        )
    }

    pub fn lexical(&self) -> &str {
        &self.lexical
    }

    pub fn kind(&self) -> &LiteralKind {
        &self.kind
    }

    pub fn datatype(&self) -> &str {
        match &self.kind {
            LiteralKind::Plain => xsd::STRING,
            LiteralKind::Lang(_) => rdf::LANG_STRING,
            LiteralKind::Typed(datatype) => datatype.as_str(),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.lexical.trim().parse().ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Term {
    Iri(Iri),
    Literal(Literal),
}

impl Term {
    pub fn as_iri(&self) -> Option<&Iri> {
        match self {
            Term::Iri(iri) => Some(iri),
            Term::Literal(_) => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Iri(_) => None,
            Term::Literal(literal) => Some(literal),
        }
    }
}

impl From<Iri> for Term {
    fn from(value: Iri) -> Self {
        Term::Iri(value)
    }
}

impl From<&Iri> for Term {
    fn from(value: &Iri) -> Self {
        Term::Iri(value.clone())
    }
}

impl From<&str> for Term {
    fn from(value: &str) -> Self {
        Term::Iri(Iri::from(value))
    }
}

impl From<Literal> for Term {
    fn from(value: Literal) -> Self {
        Term::Literal(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Triple {
    pub subject: Iri,
    pub predicate: Iri,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: impl Into<Iri>, predicate: impl Into<Iri>, object: impl Into<Term>) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }
}

/// Triple pattern; `None` positions match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriplePattern {
    pub subject: Option<Iri>,
    pub predicate: Option<Iri>,
    pub object: Option<Term>,
}

impl TriplePattern {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn subject(mut self, subject: impl Into<Iri>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn predicate(mut self, predicate: impl Into<Iri>) -> Self {
        self.predicate = Some(predicate.into());
        self
    }

    pub fn object(mut self, object: impl Into<Term>) -> Self {
        self.object = Some(object.into());
        self
    }

    pub fn matches(&self, triple: &Triple) -> bool {
        self.subject.as_ref().is_none_or(|s| *s == triple.subject)
            && self.predicate.as_ref().is_none_or(|p| *p == triple.predicate)
            && self.object.as_ref().is_none_or(|o| *o == triple.object)
    }
}

macro_rules! define_node_id_type {
    ($(#[$doc:meta])* $name:ident, $kind:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Iri);

        impl $name {
            pub const KIND: ProvKind = $kind;

            /// Wrap an IRI without checking the graph. Relation methods
            /// verify the kind before writing.
            pub fn from_iri(iri: impl Into<Iri>) -> Self {
                Self(iri.into())
            }

            pub fn iri(&self) -> &Iri {
                &self.0
            }

            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }

            pub fn into_iri(self) -> Iri {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }

        impl From<$name> for Iri {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl From<&$name> for Iri {
            fn from(value: &$name) -> Self {
                value.0.clone()
            }
        }

        impl From<&$name> for Term {
            fn from(value: &$name) -> Self {
                Term::Iri(value.0.clone())
            }
        }
    };
}

define_node_id_type!(
    /// Data artifact.
    EntityId,
    ProvKind::Entity
);

define_node_id_type!(
    /// Processing step.
    ActivityId,
    ProvKind::Activity
);

define_node_id_type!(
    /// Person, organisation or software acting in the graph.
    AgentId,
    ProvKind::Agent
);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeRef {
    Entity(EntityId),
    Activity(ActivityId),
    Agent(AgentId),
}

impl NodeRef {
    pub fn kind(&self) -> ProvKind {
        match self {
            NodeRef::Entity(_) => ProvKind::Entity,
            NodeRef::Activity(_) => ProvKind::Activity,
            NodeRef::Agent(_) => ProvKind::Agent,
        }
    }

    pub fn iri(&self) -> &Iri {
        match self {
            NodeRef::Entity(id) => id.iri(),
            NodeRef::Activity(id) => id.iri(),
            NodeRef::Agent(id) => id.iri(),
        }
    }
}

impl From<EntityId> for NodeRef {
    fn from(value: EntityId) -> Self {
        NodeRef::Entity(value)
    }
}

impl From<ActivityId> for NodeRef {
    fn from(value: ActivityId) -> Self {
        NodeRef::Activity(value)
    }
}

impl From<AgentId> for NodeRef {
    fn from(value: AgentId) -> Self {
        NodeRef::Agent(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_wildcards() {
        let triple = Triple::new("https://e.org/a", rdf::TYPE, "https://e.org/T");
        assert!(TriplePattern::any().matches(&triple));
        assert!(TriplePattern::any().predicate(rdf::TYPE).matches(&triple));
        assert!(!TriplePattern::any().subject("https://e.org/b").matches(&triple));
        assert!(
            TriplePattern::any()
                .subject("https://e.org/a")
                .object("https://e.org/T")
                .matches(&triple)
        );
    }

    #[test]
    fn xsd_string_collapses_to_plain() {
        assert_eq!(Literal::typed("x", xsd::STRING), Literal::plain("x"));
        assert_eq!(Literal::plain("x").datatype(), xsd::STRING);
    }

    #[test]
    fn double_literal_keeps_a_fraction() {
        assert_eq!(Literal::double(1.0).lexical(), "1.0");
        assert_eq!(Literal::double(0.25).as_f64(), Some(0.25));
    }

    #[test]
    fn node_ids_serialize_as_plain_strings() {
        let id = ActivityId::from_iri("https://e.org/p1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"https://e.org/p1\"");
        assert_eq!(NodeRef::from(id).kind(), ProvKind::Activity);
    }
}
