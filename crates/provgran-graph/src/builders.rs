//! Builders for nodes and for `link`.

use crate::error::Result;
use crate::graph::ProvGraph;
use crate::relations::Relation;
use crate::types::{ActivityId, AgentId, EntityId, Iri, Literal, Triple};
use crate::vocabulary::{geokur, prov, rdf, rdfs};
use chrono::{DateTime, Utc};
use provgran_id::ProvKind;

#[derive(Debug, Clone, Default)]
struct NodeSpec {
    id: Option<String>,
    local_id: Option<String>,
    label: Option<String>,
    description: Option<String>,
}

macro_rules! node_setters {
    () => {
        /// Use a caller supplied absolute identifier.
        pub fn id(mut self, id: impl Into<String>) -> Self {
            self.node.id = Some(id.into());
            self
        }

        /// Use `namespace + scope path + local` as identifier.
        pub fn local_id(mut self, local: impl Into<String>) -> Self {
            self.node.local_id = Some(local.into());
            self
        }

        pub fn label(mut self, label: impl Into<String>) -> Self {
            self.node.label = Some(label.into());
            self
        }

        pub fn description(mut self, description: impl Into<String>) -> Self {
            self.node.description = Some(description.into());
            self
        }
    };
}

#[derive(Debug, Clone, Default)]
pub struct EntityBuilder {
    node: NodeSpec,
}

impl EntityBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    node_setters!();
}

#[derive(Debug, Clone, Default)]
pub struct ActivityBuilder {
    node: NodeSpec,
    process_type: Option<Iri>,
    instance_of: Option<Iri>,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
}

impl ActivityBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    node_setters!();

    pub fn process_type(mut self, process_type: impl Into<Iri>) -> Self {
        self.process_type = Some(process_type.into());
        self
    }

    pub fn instance_of(mut self, method: impl Into<Iri>) -> Self {
        self.instance_of = Some(method.into());
        self
    }

    pub fn started_at(mut self, time: DateTime<Utc>) -> Self {
        self.started_at = Some(time);
        self
    }

    pub fn ended_at(mut self, time: DateTime<Utc>) -> Self {
        self.ended_at = Some(time);
        self
    }
}

#[derive(Debug, Clone)]
pub struct AgentBuilder {
    node: NodeSpec,
    class: &'static str,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self {
            node: NodeSpec::default(),
            class: prov::AGENT,
        }
    }
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn person() -> Self {
        Self {
            class: prov::PERSON,
            ..Self::default()
        }
    }

    pub fn organization() -> Self {
        Self {
            class: prov::ORGANIZATION,
            ..Self::default()
        }
    }

    pub fn software() -> Self {
        Self {
            class: prov::SOFTWARE_AGENT,
            ..Self::default()
        }
    }

    node_setters!();
}

impl ProvGraph {
    pub fn add_entity(&mut self, builder: EntityBuilder) -> Result<EntityId> {
        let iri = self.add_node(&builder.node, geokur::DATA)?;
        Ok(EntityId::from_iri(iri))
    }

    /// Add a processing step. The default agent, when set, is associated
    /// with it.
    pub fn add_activity(&mut self, builder: ActivityBuilder) -> Result<ActivityId> {
        let iri = self.add_node(&builder.node, geokur::PROCESS)?;
        let activity = ActivityId::from_iri(iri);
        if let Some(process_type) = builder.process_type {
            self.insert(Triple::new(&activity, geokur::HAS_PROCESS_TYPE, process_type));
        }
        if let Some(method) = builder.instance_of {
            self.insert(Triple::new(&activity, geokur::IS_INSTANCE_OF, method));
        }
        if let Some(time) = builder.started_at {
            self.insert(Triple::new(&activity, prov::STARTED_AT_TIME, Literal::date_time(&time)));
        }
        if let Some(time) = builder.ended_at {
            self.insert(Triple::new(&activity, prov::ENDED_AT_TIME, Literal::date_time(&time)));
        }
        if let Some(agent) = self.default_agent().cloned() {
            self.was_associated_with(&activity, &agent)?;
        }
        Ok(activity)
    }

    pub fn add_agent(&mut self, builder: AgentBuilder) -> Result<AgentId> {
        let iri = self.add_node(&builder.node, builder.class)?;
        Ok(AgentId::from_iri(iri))
    }

    fn add_node(&mut self, node: &NodeSpec, class: &str) -> Result<Iri> {
        let requested = match (&node.id, &node.local_id) {
            (Some(id), _) => Some(id.clone()),
            (None, Some(local)) => {
                let scoped = format!("{}{}", self.scope().path(), local);
                Some(self.namespace().term(&scoped))
            }
            (None, None) => None,
        };
        let iri = self.allocate(requested.as_deref())?;
        self.insert(Triple::new(&iri, rdf::TYPE, class));
        if let Some(label) = &node.label {
            self.insert(Triple::new(&iri, rdfs::LABEL, Literal::plain(label)));
        }
        if let Some(description) = &node.description {
            self.insert(Triple::new(&iri, rdfs::COMMENT, Literal::plain(description)));
        }
        Ok(iri)
    }

    /// Connect inputs, a process, outputs and agents in one call.
    ///
    /// Every referenced node is checked before anything is written. Absent
    /// groups are skipped, and repeating a link changes nothing.
    pub fn link(&mut self, link: Link) -> Result<()> {
        let Link {
            inputs,
            process,
            outputs,
            agents,
        } = link;

        for entity in inputs.iter().chain(&outputs) {
            self.expect_kind(entity.iri(), "link", ProvKind::Entity)?;
        }
        if let Some(process) = &process {
            self.expect_kind(process.iri(), "link", ProvKind::Activity)?;
        }
        for agent in &agents {
            self.expect_kind(agent.iri(), "link", ProvKind::Agent)?;
        }

        if let Some(process) = &process {
            for input in &inputs {
                self.insert(Triple::new(process, Relation::Used.predicate(), input));
            }
            for output in &outputs {
                self.insert(Triple::new(output, Relation::WasGeneratedBy.predicate(), process));
            }
            for agent in &agents {
                self.insert(Triple::new(process, Relation::WasAssociatedWith.predicate(), agent));
            }
        }
        for output in &outputs {
            for input in &inputs {
                self.insert(Triple::new(output, Relation::WasDerivedFrom.predicate(), input));
            }
        }
        for entity in inputs.iter().chain(&outputs) {
            for agent in &agents {
                self.insert(Triple::new(entity, Relation::WasAttributedTo.predicate(), agent));
            }
        }
        Ok(())
    }
}

/// Arguments of [`ProvGraph::link`]. Each group takes one node or many.
#[derive(Debug, Clone, Default)]
pub struct Link {
    inputs: Vec<EntityId>,
    process: Option<ActivityId>,
    outputs: Vec<EntityId>,
    agents: Vec<AgentId>,
}

impl Link {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(mut self, entity: &EntityId) -> Self {
        self.inputs.push(entity.clone());
        self
    }

    pub fn inputs<'a>(mut self, entities: impl IntoIterator<Item = &'a EntityId>) -> Self {
        self.inputs.extend(entities.into_iter().cloned());
        self
    }

    pub fn process(mut self, activity: &ActivityId) -> Self {
        self.process = Some(activity.clone());
        self
    }

    pub fn output(mut self, entity: &EntityId) -> Self {
        self.outputs.push(entity.clone());
        self
    }

    pub fn outputs<'a>(mut self, entities: impl IntoIterator<Item = &'a EntityId>) -> Self {
        self.outputs.extend(entities.into_iter().cloned());
        self
    }

    pub fn agent(mut self, agent: &AgentId) -> Self {
        self.agents.push(agent.clone());
        self
    }

    pub fn agents<'a>(mut self, agents: impl IntoIterator<Item = &'a AgentId>) -> Self {
        self.agents.extend(agents.into_iter().cloned());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProvGraphError;
    use provgran_core::EngineConfig;

    fn graph() -> ProvGraph {
        ProvGraph::new(EngineConfig::default()).unwrap()
    }

    #[test]
    fn label_defaults_to_identifier() {
        let mut graph = graph();
        let data = graph.add_entity(EntityBuilder::new()).unwrap();
        assert_eq!(graph.label(data.iri()), data.as_str());
        assert_eq!(graph.description(data.iri()), None);
    }

    #[test]
    fn caller_ids_must_be_unique() {
        let mut graph = graph();
        graph
            .add_entity(EntityBuilder::new().id("https://test.package/test"))
            .unwrap();
        let err = graph
            .add_agent(AgentBuilder::new().id("https://test.package/test"))
            .unwrap_err();
        assert!(matches!(err, ProvGraphError::Id(provgran_id::IdError::AlreadyUsed(_))));
    }

    #[test]
    fn local_ids_follow_namespace_and_scope() {
        let mut graph = graph();
        graph.scope_mut().push("preprocessing").unwrap();
        let data = graph.add_entity(EntityBuilder::new().local_id("crimeData")).unwrap();
        assert_eq!(data.as_str(), "https://provgran.example.org/preprocessing/crimeData");
    }

    #[test]
    fn default_agent_is_associated_with_new_activities() {
        let mut graph = graph();
        let me = graph.add_agent(AgentBuilder::person().label("Me")).unwrap();
        graph.set_default_agent(Some(&me)).unwrap();
        let step = graph.add_activity(ActivityBuilder::new().label("add")).unwrap();
        assert!(graph.associated_agents(&step).contains(&me));
    }

    #[test]
    fn link_rejects_mismatched_kinds_without_writing() {
        let mut graph = graph();
        let data = graph.add_entity(EntityBuilder::new()).unwrap();
        let step = graph.add_activity(ActivityBuilder::new()).unwrap();
        let before = graph.len();
        let bogus = AgentId::from_iri(data.iri().clone());
        let err = graph
            .link(Link::new().input(&data).process(&step).agent(&bogus))
            .unwrap_err();
        assert!(matches!(err, ProvGraphError::InvalidRelationTarget { .. }));
        assert_eq!(graph.len(), before);
    }
}
