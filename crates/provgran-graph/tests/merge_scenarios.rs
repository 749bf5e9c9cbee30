use chrono::{TimeZone, Utc};
use provgran_graph::reduction::divide_merge_list;
use provgran_graph::vocabulary::{geokur, prov, rdf};
use provgran_graph::{
    EntityBuilder, Iri, MemorySnapshotWriter, MergeMode, ProvGraph, ProvGraphError, Triple, TriplePattern,
};
use test_support::fixtures::{self, Chain};

fn mentions(graph: &ProvGraph, node: &Iri) -> usize {
    let as_subject = graph.store().matching(&TriplePattern::any().subject(node)).count();
    let as_object = graph
        .store()
        .matching(&TriplePattern::any().object(node))
        .count();
    as_subject + as_object
}

#[test]
fn explicit_ids_are_unique() {
    let mut graph = fixtures::graph();
    graph
        .add_entity(EntityBuilder::new().local_id("crimeData"))
        .unwrap();
    let err = graph
        .add_entity(EntityBuilder::new().local_id("crimeData"))
        .unwrap_err();
    assert!(matches!(err, ProvGraphError::Id(_)));
}

#[test]
fn merging_a_three_node_chain() {
    let Chain {
        mut graph,
        entities,
        activities,
    } = fixtures::chain(2);
    let (a, b, c) = (&entities[0], &entities[1], &entities[2]);
    let (p1, p2) = (&activities[0], &activities[1]);
    assert!(graph.contains(&Triple::new(p2, prov::WAS_INFORMED_BY, p1)));
    graph.compute_relative_importance().unwrap();

    let outcome = graph.merge(p2, p1).unwrap();
    let composite = &outcome.composite;

    assert_eq!(outcome.removed_entities, vec![b.clone()]);
    assert_eq!(mentions(&graph, b.iri()), 0);
    assert!(!graph.entities().contains(b));

    assert_eq!(graph.sub_processes(composite).len(), 2);
    assert!(graph.sub_processes(composite).contains(p1));
    assert!(graph.sub_processes(composite).contains(p2));
    assert!(graph.contains(&Triple::new(composite, prov::USED, a)));
    assert!(graph.contains(&Triple::new(c, prov::WAS_GENERATED_BY, composite)));
    assert!(graph.contains(&Triple::new(c, prov::WAS_DERIVED_FROM, a)));

    assert_eq!(graph.activities(), vec![composite.clone()]);
    for member in [p1, p2] {
        assert!(graph.has_type(member.iri(), geokur::SUB_PROCESS));
        assert!(!graph.has_type(member.iri(), geokur::PROCESS));
        assert!(graph.used_entities(member).is_empty());
        assert!(graph.generated_entities(member).is_empty());
    }
    assert!((graph.importance(composite).unwrap() - 1.0).abs() < 1e-9);
}

#[test]
fn merged_composite_keeps_the_more_important_label() {
    let Chain {
        mut graph,
        activities,
        ..
    } = fixtures::chain(2);
    graph.set_importance(&activities[0], 0.8).unwrap();
    graph.set_importance(&activities[1], 0.2).unwrap();

    let outcome = graph.merge(&activities[1], &activities[0]).unwrap();
    assert_eq!(graph.label(outcome.composite.iri()), "P1");
    assert_eq!(outcome.earlier, activities[0]);
    assert_eq!(outcome.later, activities[1]);
}

#[test]
fn composite_spans_its_members() {
    let Chain {
        mut graph,
        activities,
        ..
    } = fixtures::chain(2);
    let early = Utc.with_ymd_and_hms(2021, 5, 1, 8, 0, 0).unwrap();
    let late = Utc.with_ymd_and_hms(2021, 5, 1, 17, 30, 0).unwrap();
    graph.started_at_time(&activities[0], early).unwrap();
    graph
        .ended_at_time(&activities[0], Utc.with_ymd_and_hms(2021, 5, 1, 9, 0, 0).unwrap())
        .unwrap();
    graph.ended_at_time(&activities[1], late).unwrap();
    graph.compute_relative_importance().unwrap();

    let outcome = graph.merge(&activities[0], &activities[1]).unwrap();
    assert_eq!(graph.started_at(&outcome.composite).unwrap(), Some(early));
    assert_eq!(graph.ended_at(&outcome.composite).unwrap(), Some(late));
}

#[test]
fn merge_pair_prefers_least_important_neighbour() {
    let Chain {
        mut graph,
        activities,
        ..
    } = fixtures::chain(3);
    graph.set_importance(&activities[0], 0.5).unwrap();
    graph.set_importance(&activities[1], 0.1).unwrap();
    graph.set_importance(&activities[2], 0.4).unwrap();

    let pair = graph.get_merge_pair().unwrap();
    assert_eq!(pair.process, activities[1]);
    assert_eq!(pair.neighbor, activities[2]);
}

#[test]
fn each_step_removes_one_activity() {
    let Chain { mut graph, .. } = fixtures::chain(4);
    graph.compute_relative_importance().unwrap();

    let before = graph.activities().len();
    graph.generalize_step().unwrap().unwrap();
    assert_eq!(graph.activities().len(), before - 1);
}

#[test]
fn generalize_ends_with_one_fully_important_activity() {
    let Chain { mut graph, .. } = fixtures::chain(4);
    let mut writer = MemorySnapshotWriter::new();

    let report = graph.generalize(&mut writer).unwrap();

    assert_eq!(writer.levels(), vec![0, 1, 2, 3]);
    assert_eq!(report.merges.len(), 3);
    assert_eq!(report.levels[0].mode, MergeMode::Initial);
    let remaining = graph.activities();
    assert_eq!(remaining.len(), 1);
    assert!((graph.importance(&remaining[0]).unwrap() - 1.0).abs() < 1e-9);
    assert!(graph.generalize_step().unwrap().is_none());
}

#[test]
fn shared_output_is_detected_as_a_branch() {
    let mut fork = fixtures::fork();
    let unit = Iri::from(geokur::UNIT_CHANGE);
    for activity in [&fork.p1, &fork.p2, &fork.p3] {
        fork.graph.set_process_type(activity, unit.clone()).unwrap();
    }

    assert_eq!(fork.graph.successors(&fork.p1).len(), 2);
    assert!(fork.graph.flat_merge_list(&unit).is_empty());
    assert!(fork.graph.has_branch(&fork.p1));
    assert!(!fork.graph.has_branch(&fork.p2));
    assert!(fork.graph.users(&fork.shared).contains(&fork.p3));
}

#[test]
fn typed_reduction_writes_every_level() {
    let Chain {
        mut graph,
        entities,
        activities,
    } = fixtures::typed_chain(&[Some("UnitChange"), Some("UnitChange"), Some("UnitChange")]);
    let mut writer = MemorySnapshotWriter::new();

    let report = graph.serialize_granularities(&mut writer).unwrap();

    assert_eq!(writer.levels(), (0..10).collect::<Vec<_>>());
    assert_eq!(report.levels.len(), 10);
    assert!(report.branches.is_empty());

    let sink = &activities[2];
    assert_eq!(graph.activities(), vec![sink.clone()]);
    assert_eq!(
        graph.process_type(sink),
        Some(Iri::from(geokur::VALUE_CHANGE))
    );
    assert!(graph.contains(&Triple::new(sink, prov::USED, &entities[0])));
    assert!(graph.contains(&Triple::new(&entities[3], prov::WAS_DERIVED_FROM, &entities[0])));
    for gone in &entities[1..3] {
        assert_eq!(mentions(&graph, gone.iri()), 0);
    }
    assert_eq!(mentions(&graph, activities[0].iri()), 0);

    let unit_flat = &report.levels[3];
    assert_eq!(unit_flat.mode, MergeMode::Flat);
    assert_eq!(unit_flat.change_type.as_deref(), Some("UnitChange"));
    assert_eq!(unit_flat.merges, 1);
    assert_eq!(writer.snapshots[3].activities, 1);
    assert_eq!(writer.snapshots[0].activities, 3);
}

#[test]
fn up_merge_joins_adjacent_change_types() {
    let Chain {
        mut graph,
        activities,
        ..
    } = fixtures::typed_chain(&[Some("BasalChange"), Some("UnitChange")]);
    let basal = Iri::from(geokur::BASAL_CHANGE);
    let unit = Iri::from(geokur::UNIT_CHANGE);

    let edges = graph.up_merge_list(&basal, &unit);
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].informed, activities[1]);
    assert_eq!(edges[0].informant, activities[0]);

    let merged = graph
        .merge_parts(divide_merge_list(edges), &unit)
        .unwrap();
    assert_eq!(merged, 1);
    assert_eq!(graph.activities(), vec![activities[1].clone()]);
    assert!(graph.has_type(activities[1].iri(), geokur::PROCESS));
    assert!(!graph.contains(&Triple::new(
        &activities[0],
        rdf::TYPE,
        geokur::PROCESS
    )));
}

#[test]
fn diamond_generalizes_to_a_single_activity() {
    let fixtures::Diamond {
        mut graph,
        p1,
        p2,
        p3,
        p4,
    } = fixtures::diamond();
    for (activity, value) in [(&p1, 0.05), (&p2, 0.05), (&p3, 0.8), (&p4, 0.1)] {
        graph.set_importance(activity, value).unwrap();
    }
    let mut writer = MemorySnapshotWriter::new();

    let report = graph.generalize(&mut writer).unwrap();

    assert_eq!(report.merges.len(), 3);
    assert_eq!(writer.levels(), vec![0, 1, 2, 3]);
    let remaining = graph.activities();
    assert_eq!(remaining.len(), 1);
    assert!((graph.importance(&remaining[0]).unwrap() - 1.0).abs() < 1e-9);
}

#[test]
fn merge_refuses_to_close_a_cycle() {
    let fixtures::Diamond {
        mut graph,
        p1,
        p2,
        p3,
        p4,
    } = fixtures::diamond();
    for (activity, value) in [(&p1, 0.05), (&p2, 0.05), (&p3, 0.8), (&p4, 0.1)] {
        graph.set_importance(activity, value).unwrap();
    }
    let composite = graph.merge(&p1, &p2).unwrap().composite;
    assert!(graph.successors(&composite).contains(&p3));
    assert!(graph.successors(&composite).contains(&p4));

    let before = graph.len();
    assert!(matches!(
        graph.merge(&composite, &p4),
        Err(ProvGraphError::MergeInvariantViolation { .. })
    ));
    assert_eq!(graph.len(), before);

    let pair = graph.get_merge_pair().unwrap();
    assert_eq!(pair.neighbor, p3);
    assert!(pair.process == composite || pair.process == p4);
}
