//! The provenance graph: a triple store plus the per-graph identity state.
//!
//! `ProvGraph` owns its store, its identifier vault and its configuration.
//! Nothing is shared between graphs.

use crate::error::{ProvGraphError, Result};
use crate::store::{ChangeSet, ChangeSummary, InMemoryTripleStore, TripleStore};
use crate::types::{ActivityId, AgentId, EntityId, Iri, Literal, Term, Triple, TriplePattern};
use crate::vocabulary::{geokur, prov, rdf, rdfs, ACTIVITY_TYPES, AGENT_TYPES, ENTITY_TYPES};
use chrono::{DateTime, NaiveDateTime, Utc};
use provgran_core::EngineConfig;
use provgran_id::{IdScope, IdVault, Namespace, ProvKind};
use std::collections::BTreeSet;
use tracing::debug;

#[derive(Debug)]
pub struct ProvGraph {
    store: Box<dyn TripleStore>,
    vault: IdVault,
    namespace: Namespace,
    scope: IdScope,
    config: EngineConfig,
    default_agent: Option<AgentId>,
}

impl ProvGraph {
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::with_store(config, Box::new(InMemoryTripleStore::new()))
    }

    /// Build a graph over a caller supplied store. Schema triples are
    /// asserted immediately.
    pub fn with_store(config: EngineConfig, store: Box<dyn TripleStore>) -> Result<Self> {
        config.validate()?;
        let namespace = Namespace::new(config.namespace.as_str())?;
        let mut graph = Self {
            store,
            vault: IdVault::new(),
            namespace,
            scope: IdScope::new(),
            config,
            default_agent: None,
        };
        graph.assert_schema();
        Ok(graph)
    }

    /// Rebuild a graph from parsed triples. Every typed node is registered in
    /// the vault so later identifiers never collide with loaded ones.
    pub fn from_triples(config: EngineConfig, triples: impl IntoIterator<Item = Triple>) -> Result<Self> {
        let mut graph = Self::new(config)?;
        for triple in triples {
            graph.store.insert(triple);
        }
        let nodes: BTreeSet<Iri> = graph
            .store
            .matching(&TriplePattern::any().predicate(rdf::TYPE))
            .filter(|triple| {
                triple
                    .object
                    .as_iri()
                    .is_some_and(|class| node_kind(class.as_str()).is_some())
            })
            .map(|triple| triple.subject.clone())
            .collect();
        for node in &nodes {
            graph.vault.add(node.as_str())?;
        }
        debug!(triples = graph.len(), nodes = nodes.len(), "Graph loaded");
        Ok(graph)
    }

    fn assert_schema(&mut self) {
        let schema = [
            (geokur::PROCESS, rdfs::SUB_CLASS_OF, prov::ACTIVITY),
            (geokur::SUB_PROCESS, rdfs::SUB_CLASS_OF, prov::ACTIVITY),
            (geokur::DATA, rdfs::SUB_CLASS_OF, prov::ENTITY),
            (geokur::HAS_PROCESS_TYPE, rdf::TYPE, rdf::PROPERTY),
        ];
        for (s, p, o) in schema {
            self.store.insert(Triple::new(s, p, o));
        }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn scope(&self) -> &IdScope {
        &self.scope
    }

    /// Scope stack used for identifiers minted by this graph.
    pub fn scope_mut(&mut self) -> &mut IdScope {
        &mut self.scope
    }

    pub fn store(&self) -> &dyn TripleStore {
        self.store.as_ref()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn triples(&self) -> impl Iterator<Item = &Triple> {
        self.store.iter()
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.store.contains(triple)
    }

    pub fn default_agent(&self) -> Option<&AgentId> {
        self.default_agent.as_ref()
    }

    pub(crate) fn set_default_agent_unchecked(&mut self, agent: Option<AgentId>) {
        self.default_agent = agent;
    }

    pub(crate) fn insert(&mut self, triple: Triple) -> bool {
        self.store.insert(triple)
    }

    pub(crate) fn commit(&mut self, changes: ChangeSet) -> ChangeSummary {
        changes.apply(self.store.as_mut())
    }

    /// Issue an identifier: a caller supplied one is registered, otherwise a
    /// fresh one is minted below the current scope.
    pub(crate) fn allocate(&mut self, id: Option<&str>) -> Result<Iri> {
        let id = match id {
            Some(id) => self.vault.add(id)?,
            None => self.vault.generate_in(&self.namespace, &self.scope)?,
        };
        Ok(Iri::new(id))
    }

    pub fn is_issued(&self, id: &str) -> bool {
        self.vault.contains(id)
    }

    // ----- node kinds -------------------------------------------------

    pub fn kind_of(&self, node: &Iri) -> Option<ProvKind> {
        self.store
            .matching(&TriplePattern::any().subject(node).predicate(rdf::TYPE))
            .find_map(|triple| triple.object.as_iri().and_then(|class| node_kind(class.as_str())))
    }

    pub(crate) fn expect_kind(&self, node: &Iri, relation: &'static str, expected: ProvKind) -> Result<()> {
        match self.kind_of(node) {
            Some(found) if found == expected => Ok(()),
            Some(found) => Err(ProvGraphError::InvalidRelationTarget {
                relation,
                node: node.to_string(),
                expected,
                found,
            }),
            None => Err(ProvGraphError::UnknownNode(node.to_string())),
        }
    }

    pub fn has_type(&self, node: &Iri, class: &str) -> bool {
        self.store.contains(&Triple::new(node, rdf::TYPE, class))
    }

    /// A top-level activity: not folded into a composite.
    pub fn is_current_activity(&self, node: &Iri) -> bool {
        (self.has_type(node, geokur::PROCESS) || self.has_type(node, prov::ACTIVITY))
            && !self.has_type(node, geokur::SUB_PROCESS)
    }

    // ----- generic lookups ----------------------------------------------

    pub(crate) fn objects(&self, subject: &Iri, predicate: &str) -> Vec<Term> {
        let pattern = TriplePattern::any().subject(subject).predicate(predicate);
        self.store
            .matching(&pattern)
            .map(|triple| triple.object.clone())
            .collect()
    }

    pub(crate) fn object_iris(&self, subject: &Iri, predicate: &str) -> BTreeSet<Iri> {
        self.objects(subject, predicate)
            .into_iter()
            .filter_map(|term| match term {
                Term::Iri(iri) => Some(iri),
                Term::Literal(_) => None,
            })
            .collect()
    }

    pub(crate) fn subjects(&self, predicate: &str, object: &Iri) -> BTreeSet<Iri> {
        let pattern = TriplePattern::any().predicate(predicate).object(object);
        self.store.matching(&pattern).map(|triple| triple.subject.clone()).collect()
    }

    fn literal(&self, subject: &Iri, predicate: &str) -> Option<Literal> {
        self.objects(subject, predicate).into_iter().find_map(|term| match term {
            Term::Literal(literal) => Some(literal),
            Term::Iri(_) => None,
        })
    }

    fn subjects_of_kind(&self, classes: &[&str]) -> BTreeSet<Iri> {
        classes
            .iter()
            .flat_map(|class| self.subjects(rdf::TYPE, &Iri::from(*class)))
            .collect()
    }

    // ----- nodes --------------------------------------------------------

    /// Top-level activities in identifier order.
    pub fn activities(&self) -> Vec<ActivityId> {
        self.subjects_of_kind(&ACTIVITY_TYPES)
            .into_iter()
            .filter(|iri| self.is_current_activity(iri))
            .map(ActivityId::from_iri)
            .collect()
    }

    /// Every activity including the ones folded into composites.
    pub fn all_activities(&self) -> Vec<ActivityId> {
        self.subjects_of_kind(&ACTIVITY_TYPES)
            .into_iter()
            .map(ActivityId::from_iri)
            .collect()
    }

    pub fn entities(&self) -> Vec<EntityId> {
        self.subjects_of_kind(&ENTITY_TYPES)
            .into_iter()
            .map(EntityId::from_iri)
            .collect()
    }

    pub fn agents(&self) -> Vec<AgentId> {
        self.subjects_of_kind(&AGENT_TYPES)
            .into_iter()
            .map(AgentId::from_iri)
            .collect()
    }

    /// `rdfs:label`, falling back to the identifier.
    pub fn label(&self, node: &Iri) -> String {
        self.explicit_label(node)
            .unwrap_or_else(|| node.to_string())
    }

    /// `rdfs:label` without the identifier fallback.
    pub fn explicit_label(&self, node: &Iri) -> Option<String> {
        self.literal(node, rdfs::LABEL)
            .map(|literal| literal.lexical().to_string())
    }

    pub fn description(&self, node: &Iri) -> Option<String> {
        self.literal(node, rdfs::COMMENT)
            .map(|literal| literal.lexical().to_string())
    }

    pub fn process_type(&self, activity: &ActivityId) -> Option<Iri> {
        self.object_iris(activity.iri(), geokur::HAS_PROCESS_TYPE)
            .into_iter()
            .next()
    }

    pub fn tags(&self, activity: &ActivityId) -> BTreeSet<String> {
        self.objects(activity.iri(), geokur::HAS_TAG)
            .into_iter()
            .filter_map(|term| term.as_literal().map(|literal| literal.lexical().to_string()))
            .collect()
    }

    /// Stored relative importance. Several values (a hand-edited document)
    /// resolve to the largest.
    pub fn importance(&self, activity: &ActivityId) -> Option<f64> {
        self.objects(activity.iri(), geokur::HAS_RELATIVE_IMPORTANCE)
            .into_iter()
            .filter_map(|term| term.as_literal().and_then(Literal::as_f64))
            .reduce(f64::max)
    }

    pub fn has_branch(&self, activity: &ActivityId) -> bool {
        self.objects(activity.iri(), geokur::HAS_BRANCH)
            .into_iter()
            .any(|term| term.as_literal().is_some_and(|literal| literal.lexical() == "True"))
    }

    pub fn sub_processes(&self, activity: &ActivityId) -> BTreeSet<ActivityId> {
        self.object_iris(activity.iri(), geokur::HAS_SUB_PROCESS)
            .into_iter()
            .map(ActivityId::from_iri)
            .collect()
    }

    pub fn used_entities(&self, activity: &ActivityId) -> BTreeSet<EntityId> {
        self.object_iris(activity.iri(), prov::USED)
            .into_iter()
            .map(EntityId::from_iri)
            .collect()
    }

    pub fn generated_entities(&self, activity: &ActivityId) -> BTreeSet<EntityId> {
        self.subjects(prov::WAS_GENERATED_BY, activity.iri())
            .into_iter()
            .map(EntityId::from_iri)
            .collect()
    }

    pub fn generators(&self, entity: &EntityId) -> BTreeSet<ActivityId> {
        self.object_iris(entity.iri(), prov::WAS_GENERATED_BY)
            .into_iter()
            .map(ActivityId::from_iri)
            .collect()
    }

    pub fn users(&self, entity: &EntityId) -> BTreeSet<ActivityId> {
        self.subjects(prov::USED, entity.iri())
            .into_iter()
            .map(ActivityId::from_iri)
            .collect()
    }

    /// Activities this one was informed by.
    pub fn predecessors(&self, activity: &ActivityId) -> BTreeSet<ActivityId> {
        self.object_iris(activity.iri(), prov::WAS_INFORMED_BY)
            .into_iter()
            .map(ActivityId::from_iri)
            .collect()
    }

    /// Activities informed by this one.
    pub fn successors(&self, activity: &ActivityId) -> BTreeSet<ActivityId> {
        self.subjects(prov::WAS_INFORMED_BY, activity.iri())
            .into_iter()
            .map(ActivityId::from_iri)
            .collect()
    }

    pub fn associated_agents(&self, activity: &ActivityId) -> BTreeSet<AgentId> {
        self.object_iris(activity.iri(), prov::WAS_ASSOCIATED_WITH)
            .into_iter()
            .map(AgentId::from_iri)
            .collect()
    }

    pub fn started_at(&self, activity: &ActivityId) -> Result<Option<DateTime<Utc>>> {
        self.timestamp(activity.iri(), prov::STARTED_AT_TIME)
    }

    pub fn ended_at(&self, activity: &ActivityId) -> Result<Option<DateTime<Utc>>> {
        self.timestamp(activity.iri(), prov::ENDED_AT_TIME)
    }

    fn timestamp(&self, node: &Iri, predicate: &str) -> Result<Option<DateTime<Utc>>> {
        match self.literal(node, predicate) {
            Some(literal) => parse_timestamp(literal.lexical())
                .map(Some)
                .ok_or_else(|| ProvGraphError::InvalidTimestamp {
                    node: node.to_string(),
                    value: literal.lexical().to_string(),
                }),
            None => Ok(None),
        }
    }
}

/// Parse an `xsd:dateTime` lexical form. A missing offset is read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|time| time.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

fn node_kind(class: &str) -> Option<ProvKind> {
    if ACTIVITY_TYPES.contains(&class) {
        Some(ProvKind::Activity)
    } else if ENTITY_TYPES.contains(&class) {
        Some(ProvKind::Entity)
    } else if AGENT_TYPES.contains(&class) {
        Some(ProvKind::Agent)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_graph_holds_only_schema() {
        let graph = ProvGraph::new(EngineConfig::default()).unwrap();
        assert_eq!(graph.len(), 4);
        assert!(graph.activities().is_empty());
        assert!(graph.contains(&Triple::new(geokur::PROCESS, rdfs::SUB_CLASS_OF, prov::ACTIVITY)));
    }

    #[test]
    fn invalid_namespace_is_rejected() {
        let config = EngineConfig {
            namespace: "https://no-end-symbol.org".to_string(),
            ..EngineConfig::default()
        };
        assert!(matches!(ProvGraph::new(config), Err(ProvGraphError::Id(_))));
    }

    #[test]
    fn timestamps_accept_offsets_and_naive_forms() {
        assert!(parse_timestamp("2021-03-01T10:00:00Z").is_some());
        assert!(parse_timestamp("2021-03-01T10:00:00+02:00").is_some());
        assert!(parse_timestamp("2021-03-01T10:00:00.5").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn loading_registers_nodes() {
        let triples = vec![
            Triple::new("https://e.org/p", rdf::TYPE, geokur::PROCESS),
            Triple::new("https://e.org/d", rdf::TYPE, prov::ENTITY),
        ];
        let graph = ProvGraph::from_triples(EngineConfig::default(), triples).unwrap();
        assert!(graph.is_issued("https://e.org/p"));
        assert!(graph.is_issued("https://e.org/d"));
        assert_eq!(graph.kind_of(&Iri::from("https://e.org/d")), Some(ProvKind::Entity));
        assert_eq!(graph.activities().len(), 1);
    }
}
