//! Small provenance graphs used across test suites.

use provgran_core::EngineConfig;
use provgran_graph::vocabulary::GEOKUR;
use provgran_graph::{ActivityBuilder, ActivityId, EntityBuilder, EntityId, Link, ProvGraph};

pub fn graph() -> ProvGraph {
    ProvGraph::new(EngineConfig::default()).expect("default config is valid")
}

/// `E0 -> P1 -> E1 -> ... -> Pn -> En`, with `wasInformedBy` inferred.
pub struct Chain {
    pub graph: ProvGraph,
    pub entities: Vec<EntityId>,
    pub activities: Vec<ActivityId>,
}

/// A chain of `steps` activities with no process types.
pub fn chain(steps: usize) -> Chain {
    typed_chain(&vec![None; steps])
}

/// A chain whose activities carry the given change types (local names in
/// the project vocabulary).
pub fn typed_chain(types: &[Option<&str>]) -> Chain {
    let mut graph = graph();
    let mut entities = vec![add_entity(&mut graph, "E0")];
    let mut activities = Vec::new();
    for (index, change) in types.iter().enumerate() {
        let mut builder = ActivityBuilder::new().label(format!("P{}", index + 1));
        if let Some(change) = change {
            builder = builder.process_type(GEOKUR.term(change));
        }
        let activity = graph.add_activity(builder).expect("activity added");
        let output = add_entity(&mut graph, &format!("E{}", index + 1));
        let input = entities.last().expect("chain starts with an entity");
        graph
            .link(Link::new().input(input).process(&activity).output(&output))
            .expect("chain link");
        entities.push(output);
        activities.push(activity);
    }
    graph.infer_was_informed_by_links();
    tracing::debug!(steps = types.len(), "Chain fixture built");
    Chain {
        graph,
        entities,
        activities,
    }
}

/// `P1` produces `X`, which both `P2` and `P3` consume.
pub struct Fork {
    pub graph: ProvGraph,
    pub source: EntityId,
    pub shared: EntityId,
    pub p1: ActivityId,
    pub p2: ActivityId,
    pub p3: ActivityId,
}

pub fn fork() -> Fork {
    let mut graph = graph();
    let source = add_entity(&mut graph, "source");
    let shared = add_entity(&mut graph, "X");
    let left = add_entity(&mut graph, "left");
    let right = add_entity(&mut graph, "right");
    let p1 = add_activity(&mut graph, "P1");
    let p2 = add_activity(&mut graph, "P2");
    let p3 = add_activity(&mut graph, "P3");
    graph
        .link(Link::new().input(&source).process(&p1).output(&shared))
        .expect("fork link");
    graph
        .link(Link::new().input(&shared).process(&p2).output(&left))
        .expect("fork link");
    graph
        .link(Link::new().input(&shared).process(&p3).output(&right))
        .expect("fork link");
    graph.infer_was_informed_by_links();
    Fork {
        graph,
        source,
        shared,
        p1,
        p2,
        p3,
    }
}

/// `P1` feeds `P2` and `P3`, both of which feed `P4`.
pub struct Diamond {
    pub graph: ProvGraph,
    pub p1: ActivityId,
    pub p2: ActivityId,
    pub p3: ActivityId,
    pub p4: ActivityId,
}

pub fn diamond() -> Diamond {
    let mut graph = graph();
    let source = add_entity(&mut graph, "source");
    let split = add_entity(&mut graph, "split");
    let upper = add_entity(&mut graph, "upper");
    let lower = add_entity(&mut graph, "lower");
    let joined = add_entity(&mut graph, "joined");
    let p1 = add_activity(&mut graph, "P1");
    let p2 = add_activity(&mut graph, "P2");
    let p3 = add_activity(&mut graph, "P3");
    let p4 = add_activity(&mut graph, "P4");
    graph
        .link(Link::new().input(&source).process(&p1).output(&split))
        .expect("diamond link");
    graph
        .link(Link::new().input(&split).process(&p2).output(&upper))
        .expect("diamond link");
    graph
        .link(Link::new().input(&split).process(&p3).output(&lower))
        .expect("diamond link");
    graph
        .link(Link::new().inputs([&upper, &lower]).process(&p4).output(&joined))
        .expect("diamond link");
    graph.infer_was_informed_by_links();
    Diamond {
        graph,
        p1,
        p2,
        p3,
        p4,
    }
}

/// `P1` and `P2` each produce one input of `P3`, which writes two outputs.
pub struct Join {
    pub graph: ProvGraph,
    pub p1: ActivityId,
    pub p2: ActivityId,
    pub p3: ActivityId,
}

pub fn join() -> Join {
    let mut graph = graph();
    let left = add_entity(&mut graph, "left");
    let right = add_entity(&mut graph, "right");
    let table = add_entity(&mut graph, "table");
    let report = add_entity(&mut graph, "report");
    let p1 = add_activity(&mut graph, "P1");
    let p2 = add_activity(&mut graph, "P2");
    let p3 = add_activity(&mut graph, "P3");
    graph
        .link(Link::new().process(&p1).output(&left))
        .expect("join link");
    graph
        .link(Link::new().process(&p2).output(&right))
        .expect("join link");
    graph
        .link(
            Link::new()
                .inputs([&left, &right])
                .process(&p3)
                .outputs([&table, &report]),
        )
        .expect("join link");
    graph.infer_was_informed_by_links();
    Join { graph, p1, p2, p3 }
}

pub fn add_entity(graph: &mut ProvGraph, label: &str) -> EntityId {
    graph
        .add_entity(EntityBuilder::new().label(label))
        .expect("entity added")
}

pub fn add_activity(graph: &mut ProvGraph, label: &str) -> ActivityId {
    graph
        .add_activity(ActivityBuilder::new().label(label))
        .expect("activity added")
}
