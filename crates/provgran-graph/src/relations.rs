//! PROV-O relations between nodes.
//!
//! Identifiers are plain wrappers, so every relation re-checks the kinds of
//! both ends against the graph before the triple is written.

use crate::error::{ProvGraphError, Result};
use crate::graph::{parse_timestamp, ProvGraph};
use crate::types::{ActivityId, AgentId, EntityId, Iri, Literal, NodeRef, Triple, TriplePattern};
use crate::vocabulary::{geokur, prov, rdfs};
use chrono::{DateTime, Utc};
use provgran_id::ProvKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Used,
    WasGeneratedBy,
    WasDerivedFrom,
    WasAttributedTo,
    WasAssociatedWith,
    WasInformedBy,
    ActedOnBehalfOf,
    HasSubProcess,
}

impl Relation {
    pub fn name(&self) -> &'static str {
        match self {
            Relation::Used => "used",
            Relation::WasGeneratedBy => "wasGeneratedBy",
            Relation::WasDerivedFrom => "wasDerivedFrom",
            Relation::WasAttributedTo => "wasAttributedTo",
            Relation::WasAssociatedWith => "wasAssociatedWith",
            Relation::WasInformedBy => "wasInformedBy",
            Relation::ActedOnBehalfOf => "actedOnBehalfOf",
            Relation::HasSubProcess => "hasSubProcess",
        }
    }

    pub fn predicate(&self) -> &'static str {
        match self {
            Relation::Used => prov::USED,
            Relation::WasGeneratedBy => prov::WAS_GENERATED_BY,
            Relation::WasDerivedFrom => prov::WAS_DERIVED_FROM,
            Relation::WasAttributedTo => prov::WAS_ATTRIBUTED_TO,
            Relation::WasAssociatedWith => prov::WAS_ASSOCIATED_WITH,
            Relation::WasInformedBy => prov::WAS_INFORMED_BY,
            Relation::ActedOnBehalfOf => prov::ACTED_ON_BEHALF_OF,
            Relation::HasSubProcess => geokur::HAS_SUB_PROCESS,
        }
    }

    /// (subject kind, object kind)
    pub fn signature(&self) -> (ProvKind, ProvKind) {
        use ProvKind::*;
        match self {
            Relation::Used => (Activity, Entity),
            Relation::WasGeneratedBy => (Entity, Activity),
            Relation::WasDerivedFrom => (Entity, Entity),
            Relation::WasAttributedTo => (Entity, Agent),
            Relation::WasAssociatedWith => (Activity, Agent),
            Relation::WasInformedBy => (Activity, Activity),
            Relation::ActedOnBehalfOf => (Agent, Agent),
            Relation::HasSubProcess => (Activity, Activity),
        }
    }
}

impl ProvGraph {
    /// Assert `subject relation object` after checking both node kinds.
    pub fn relate(&mut self, subject: &NodeRef, relation: Relation, object: &NodeRef) -> Result<()> {
        self.relate_iris(subject.iri(), relation, object.iri())
    }

    pub(crate) fn relate_iris(&mut self, subject: &Iri, relation: Relation, object: &Iri) -> Result<()> {
        let (domain, range) = relation.signature();
        self.expect_kind(subject, relation.name(), domain)?;
        self.expect_kind(object, relation.name(), range)?;
        self.insert(Triple::new(subject, relation.predicate(), object));
        Ok(())
    }

    pub fn used(&mut self, activity: &ActivityId, entity: &EntityId) -> Result<()> {
        self.relate_iris(activity.iri(), Relation::Used, entity.iri())
    }

    pub fn was_generated_by(&mut self, entity: &EntityId, activity: &ActivityId) -> Result<()> {
        self.relate_iris(entity.iri(), Relation::WasGeneratedBy, activity.iri())
    }

    pub fn was_derived_from(&mut self, entity: &EntityId, source: &EntityId) -> Result<()> {
        self.relate_iris(entity.iri(), Relation::WasDerivedFrom, source.iri())
    }

    pub fn was_attributed_to(&mut self, entity: &EntityId, agent: &AgentId) -> Result<()> {
        self.relate_iris(entity.iri(), Relation::WasAttributedTo, agent.iri())
    }

    pub fn was_associated_with(&mut self, activity: &ActivityId, agent: &AgentId) -> Result<()> {
        self.relate_iris(activity.iri(), Relation::WasAssociatedWith, agent.iri())
    }

    pub fn was_informed_by(&mut self, activity: &ActivityId, informant: &ActivityId) -> Result<()> {
        self.relate_iris(activity.iri(), Relation::WasInformedBy, informant.iri())
    }

    pub fn acted_on_behalf_of(&mut self, agent: &AgentId, principal: &AgentId) -> Result<()> {
        self.relate_iris(agent.iri(), Relation::ActedOnBehalfOf, principal.iri())
    }

    pub fn has_sub_process(&mut self, activity: &ActivityId, sub_process: &ActivityId) -> Result<()> {
        self.relate_iris(activity.iri(), Relation::HasSubProcess, sub_process.iri())
    }

    /// Every agent acts on behalf of every principal.
    pub fn delegate_all<'a>(
        &mut self,
        agents: impl IntoIterator<Item = &'a AgentId>,
        principals: impl IntoIterator<Item = &'a AgentId> + Clone,
    ) -> Result<()> {
        for agent in agents {
            for principal in principals.clone() {
                self.acted_on_behalf_of(agent, principal)?;
            }
        }
        Ok(())
    }

    pub fn attribute_entities_to_agent<'a>(
        &mut self,
        entities: impl IntoIterator<Item = &'a EntityId>,
        agent: &AgentId,
    ) -> Result<()> {
        for entity in entities {
            self.was_attributed_to(entity, agent)?;
        }
        Ok(())
    }

    /// Associate every activity created afterwards with `agent`.
    pub fn set_default_agent(&mut self, agent: Option<&AgentId>) -> Result<()> {
        if let Some(agent) = agent {
            self.expect_kind(agent.iri(), "defaultAgent", ProvKind::Agent)?;
        }
        self.set_default_agent_unchecked(agent.cloned());
        Ok(())
    }

    pub fn started_at_time(&mut self, activity: &ActivityId, time: DateTime<Utc>) -> Result<()> {
        self.set_time(activity, prov::STARTED_AT_TIME, time)
    }

    pub fn ended_at_time(&mut self, activity: &ActivityId, time: DateTime<Utc>) -> Result<()> {
        self.set_time(activity, prov::ENDED_AT_TIME, time)
    }

    /// Like [`ProvGraph::started_at_time`] for an `xsd:dateTime` string.
    pub fn started_at_time_str(&mut self, activity: &ActivityId, raw: &str) -> Result<()> {
        let time = checked_timestamp(activity, raw)?;
        self.started_at_time(activity, time)
    }

    pub fn ended_at_time_str(&mut self, activity: &ActivityId, raw: &str) -> Result<()> {
        let time = checked_timestamp(activity, raw)?;
        self.ended_at_time(activity, time)
    }

    fn set_time(&mut self, activity: &ActivityId, predicate: &'static str, time: DateTime<Utc>) -> Result<()> {
        let name = if predicate == prov::STARTED_AT_TIME { "startedAtTime" } else { "endedAtTime" };
        self.expect_kind(activity.iri(), name, ProvKind::Activity)?;
        self.replace_value(activity.iri(), predicate, Literal::date_time(&time));
        Ok(())
    }

    /// Declare the activity an execution of an external method or tool.
    pub fn is_instance_of(&mut self, activity: &ActivityId, method: impl Into<Iri>) -> Result<()> {
        self.expect_kind(activity.iri(), "isInstanceOf", ProvKind::Activity)?;
        let method: Iri = method.into();
        self.insert(Triple::new(activity, geokur::IS_INSTANCE_OF, method));
        Ok(())
    }

    pub fn set_process_type(&mut self, activity: &ActivityId, process_type: impl Into<Iri>) -> Result<()> {
        self.expect_kind(activity.iri(), "hasProcessType", ProvKind::Activity)?;
        let process_type: Iri = process_type.into();
        self.replace_value(activity.iri(), geokur::HAS_PROCESS_TYPE, process_type);
        Ok(())
    }

    pub fn set_label(&mut self, node: &NodeRef, label: &str) -> Result<()> {
        self.expect_kind(node.iri(), "label", node.kind())?;
        self.replace_value(node.iri(), rdfs::LABEL, Literal::plain(label));
        Ok(())
    }

    pub fn set_description(&mut self, node: &NodeRef, description: &str) -> Result<()> {
        self.expect_kind(node.iri(), "description", node.kind())?;
        self.replace_value(node.iri(), rdfs::COMMENT, Literal::plain(description));
        Ok(())
    }

    /// Single-valued property write.
    pub(crate) fn replace_value(&mut self, subject: &Iri, predicate: &str, value: impl Into<crate::types::Term>) {
        let mut changes = crate::store::ChangeSet::new();
        changes
            .remove(TriplePattern::any().subject(subject).predicate(predicate))
            .add(Triple::new(subject, predicate, value));
        self.commit(changes);
    }
}

fn checked_timestamp(activity: &ActivityId, raw: &str) -> Result<DateTime<Utc>> {
    parse_timestamp(raw).ok_or_else(|| ProvGraphError::InvalidTimestamp {
        node: activity.to_string(),
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::{ActivityBuilder, AgentBuilder, EntityBuilder};
    use provgran_core::EngineConfig;

    fn graph() -> ProvGraph {
        ProvGraph::new(EngineConfig::default()).unwrap()
    }

    #[test]
    fn relation_to_wrong_kind_is_rejected_before_writing() {
        let mut graph = graph();
        let a = graph.add_activity(ActivityBuilder::new().label("a")).unwrap();
        let b = graph.add_activity(ActivityBuilder::new().label("b")).unwrap();
        let before = graph.len();
        let err = graph
            .used(&a, &EntityId::from_iri(b.iri().clone()))
            .unwrap_err();
        assert!(matches!(
            err,
            ProvGraphError::InvalidRelationTarget {
                relation: "used",
                expected: ProvKind::Entity,
                found: ProvKind::Activity,
                ..
            }
        ));
        assert_eq!(graph.len(), before);
    }

    #[test]
    fn relation_to_missing_node_is_unknown() {
        let mut graph = graph();
        let a = graph.add_activity(ActivityBuilder::new()).unwrap();
        let ghost = EntityId::from_iri("https://provgran.example.org/ghost");
        assert!(matches!(graph.used(&a, &ghost), Err(ProvGraphError::UnknownNode(_))));
    }

    #[test]
    fn times_are_single_valued() {
        let mut graph = graph();
        let a = graph.add_activity(ActivityBuilder::new()).unwrap();
        graph.started_at_time_str(&a, "2021-01-01T00:00:00Z").unwrap();
        graph.started_at_time_str(&a, "2021-01-02T00:00:00Z").unwrap();
        let start = graph.started_at(&a).unwrap().unwrap();
        assert_eq!(start.to_rfc3339(), "2021-01-02T00:00:00+00:00");
        assert!(matches!(
            graph.ended_at_time_str(&a, "soon"),
            Err(ProvGraphError::InvalidTimestamp { .. })
        ));
    }

    #[test]
    fn delegation_covers_every_pair() {
        let mut graph = graph();
        let alice = graph.add_agent(AgentBuilder::person().label("Alice")).unwrap();
        let bob = graph.add_agent(AgentBuilder::person().label("Bob")).unwrap();
        let org = graph.add_agent(AgentBuilder::organization().label("Org")).unwrap();
        graph.delegate_all([&alice, &bob], [&org]).unwrap();
        assert!(graph.contains(&Triple::new(&alice, prov::ACTED_ON_BEHALF_OF, &org)));
        assert!(graph.contains(&Triple::new(&bob, prov::ACTED_ON_BEHALF_OF, &org)));
    }

    #[test]
    fn instance_of_and_process_type() {
        let mut graph = graph();
        let clip = graph.add_activity(ActivityBuilder::new()).unwrap();
        graph.is_instance_of(&clip, "https://tools.example.org/clip").unwrap();
        graph.set_process_type(&clip, geokur::UNIT_CHANGE).unwrap();
        graph.set_process_type(&clip, geokur::VALUE_CHANGE).unwrap();
        assert!(graph.contains(&Triple::new(
            &clip,
            geokur::IS_INSTANCE_OF,
            "https://tools.example.org/clip"
        )));
        assert_eq!(graph.process_type(&clip), Some(Iri::from(geokur::VALUE_CHANGE)));
    }

    #[test]
    fn labels_are_replaced() {
        let mut graph = graph();
        let data = graph.add_entity(EntityBuilder::new().label("raw")).unwrap();
        graph.set_label(&NodeRef::from(data.clone()), "clean").unwrap();
        assert_eq!(graph.label(data.iri()), "clean");
    }
}
