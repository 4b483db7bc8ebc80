//! End-to-end scenarios through the services and the facade envelope.

use archwire_core::{
    ComponentSymbol, PortDefinition, PortDirection, SymbolId, SymbolKind, SymbolStatus,
    TypeReference, Version,
};
use archwire_ops::{
    Config, ConnectRequest, ErrorCode, GraphRequest, OpsError, SymbolPatch, Workbench,
};

// ============================================================================
// Fixtures
// ============================================================================

fn data_type(name: &str) -> ComponentSymbol {
    ComponentSymbol::new("core", name, Version::new(1, 0, 0), SymbolKind::DataType)
}

/// A component with one `out` port and one single-cardinality, required
/// `in` port, both typed by `payload`.
fn relay(name: &str, payload: &SymbolId) -> ComponentSymbol {
    ComponentSymbol::new("app", name, Version::new(1, 0, 0), SymbolKind::Component)
        .with_port(PortDefinition::new(
            "out",
            PortDirection::Out,
            TypeReference::new(payload.clone()),
        ))
        .with_port(
            PortDefinition::new("in", PortDirection::In, TypeReference::new(payload.clone()))
                .required(),
        )
}

/// Workbench pre-seeded with a payload type and three relay components.
fn seeded_bench() -> (Workbench, SymbolId, Vec<SymbolId>) {
    let bench = Workbench::in_memory();
    let payload = data_type("Payload");
    let payload_id = payload.id.clone();
    bench.symbol_table().register(payload).unwrap();

    let mut ids = Vec::new();
    for name in ["x", "y", "z"] {
        ids.push(
            bench
                .symbol_table()
                .register(relay(name, &payload_id))
                .unwrap(),
        );
    }
    (bench, payload_id, ids)
}

// ============================================================================
// Wiring + graph scenarios
// ============================================================================

#[test]
fn three_symbol_cycle_is_detected_and_kills_the_topo_order() {
    let (bench, _, ids) = seeded_bench();
    let wiring = bench.wiring_service();

    wiring
        .connect(ConnectRequest::between(ids[0].clone(), "out", ids[1].clone(), "in"))
        .unwrap();
    wiring
        .connect(ConnectRequest::between(ids[1].clone(), "out", ids[2].clone(), "in"))
        .unwrap();
    wiring
        .connect(ConnectRequest::between(ids[2].clone(), "out", ids[0].clone(), "in"))
        .unwrap();

    let graph = bench.graph_service();
    let cycles = graph.cycles(&GraphRequest::default()).unwrap();
    assert_eq!(cycles, vec![vec![ids[0].clone(), ids[1].clone(), ids[2].clone()]]);
    assert_eq!(graph.topological_order(&GraphRequest::default()).unwrap(), None);
    assert!(graph.stats(&GraphRequest::default()).unwrap().has_cycles);
}

#[test]
fn cardinality_is_enforced_across_connects() {
    let (bench, payload_id, ids) = seeded_bench();
    let wiring = bench.wiring_service();

    // A third producer of the same payload type.
    let extra = bench
        .symbol_table()
        .register(relay("w", &payload_id))
        .unwrap();

    // First connect to y.in succeeds; the port is non-multiple, so the
    // second one fails even though the types line up exactly.
    wiring
        .connect(ConnectRequest::between(ids[0].clone(), "out", ids[1].clone(), "in"))
        .unwrap();
    let second = wiring.connect(ConnectRequest::between(
        extra.clone(),
        "out",
        ids[1].clone(),
        "in",
    ));
    assert!(matches!(second, Err(OpsError::CardinalityViolation { .. })));

    // The facade reports the stable code.
    let envelope = bench.wire(ConnectRequest::between(extra, "out", ids[1].clone(), "in"));
    assert!(!envelope.success);
    assert_eq!(
        envelope.error.unwrap().code,
        ErrorCode::CardinalityViolation
    );
}

#[test]
fn multiple_ports_accept_many_connections() {
    let bench = Workbench::in_memory();
    let payload = data_type("Event");
    let payload_id = payload.id.clone();
    bench.symbol_table().register(payload).unwrap();

    let sink = ComponentSymbol::new("app", "sink", Version::new(1, 0, 0), SymbolKind::Component)
        .with_port(
            PortDefinition::new(
                "events",
                PortDirection::In,
                TypeReference::new(payload_id.clone()),
            )
            .multiple(),
        );
    let sink_id = bench.symbol_table().register(sink).unwrap();

    for name in ["p1", "p2"] {
        let producer = bench
            .symbol_table()
            .register(relay(name, &payload_id))
            .unwrap();
        bench
            .wiring_service()
            .connect(ConnectRequest::between(producer, "out", sink_id.clone(), "events"))
            .unwrap();
    }
}

#[test]
fn validate_connection_checks_without_persisting() {
    let (bench, _, ids) = seeded_bench();
    let wiring = bench.wiring_service();

    let request = ConnectRequest::between(ids[0].clone(), "out", ids[1].clone(), "in");
    wiring.validate_connection(&request).unwrap();

    // Nothing was persisted, so the graph has no edges and the same
    // request still connects.
    assert_eq!(
        bench
            .graph_service()
            .stats(&GraphRequest::default())
            .unwrap()
            .edge_count,
        0
    );
    wiring.connect(request).unwrap();
}

#[test]
fn connect_resolves_symbols_and_ports_in_order() {
    let (bench, _, ids) = seeded_bench();
    let wiring = bench.wiring_service();

    let missing_symbol = wiring.connect(ConnectRequest::between(
        SymbolId::new("app/ghost@1.0.0"),
        "out",
        ids[1].clone(),
        "in",
    ));
    assert!(matches!(missing_symbol, Err(OpsError::SymbolNotFound { .. })));

    let missing_port = wiring.connect(ConnectRequest::between(
        ids[0].clone(),
        "nope",
        ids[1].clone(),
        "in",
    ));
    assert!(matches!(missing_port, Err(OpsError::PortNotFound { .. })));

    // Role-swapped: an input port as the source fails compatibility.
    let swapped = wiring.connect(ConnectRequest::between(
        ids[0].clone(),
        "in",
        ids[1].clone(),
        "in",
    ));
    assert!(matches!(swapped, Err(OpsError::IncompatiblePorts { .. })));
}

#[test]
fn disconnect_removes_and_reports_missing() {
    let (bench, _, ids) = seeded_bench();
    let wiring = bench.wiring_service();

    let connection = wiring
        .connect(ConnectRequest::between(ids[0].clone(), "out", ids[1].clone(), "in"))
        .unwrap();
    wiring.disconnect(&connection.id).unwrap();
    assert!(matches!(
        wiring.disconnect(&connection.id),
        Err(OpsError::ConnectionNotFound { .. })
    ));

    // The port is free again.
    wiring
        .connect(ConnectRequest::between(ids[2].clone(), "out", ids[1].clone(), "in"))
        .unwrap();
}

#[test]
fn compatible_ports_rank_exact_matches_first() {
    let bench = Workbench::in_memory();
    let table = bench.symbol_table();

    let payload = data_type("Doc");
    let payload_id = payload.id.clone();
    table.register(payload).unwrap();

    let producer = table.register(relay("producer", &payload_id)).unwrap();

    // Exact consumer.
    let exact = ComponentSymbol::new("app", "exact", Version::new(1, 0, 0), SymbolKind::Component)
        .with_port(PortDefinition::new(
            "doc",
            PortDirection::In,
            TypeReference::new(payload_id.clone()),
        ));
    // Widened consumer accepts null, which costs score.
    let widened =
        ComponentSymbol::new("app", "widened", Version::new(1, 0, 0), SymbolKind::Component)
            .with_port(PortDefinition::new(
                "doc",
                PortDirection::In,
                TypeReference::new(payload_id.clone()).nullable(),
            ));
    // Different type never shows up.
    let other = ComponentSymbol::new("app", "other", Version::new(1, 0, 0), SymbolKind::Component)
        .with_port(PortDefinition::new(
            "doc",
            PortDirection::In,
            TypeReference::new(SymbolId::new("core/Other@1.0.0")),
        ));
    let exact_id = table.register(exact).unwrap();
    let widened_id = table.register(widened).unwrap();
    table.register(other).unwrap();

    let matches = bench
        .wiring_service()
        .compatible_ports(&producer, "out")
        .unwrap();
    let ranked: Vec<(&SymbolId, u8)> = matches.iter().map(|m| (&m.symbol, m.score)).collect();
    assert_eq!(matches.len(), 2);
    assert!(ranked.contains(&(&exact_id, 100)));
    assert!(ranked.contains(&(&widened_id, 95)));
    let widened_pos = matches.iter().position(|m| m.symbol == widened_id).unwrap();
    assert_eq!(widened_pos, matches.len() - 1);
    assert!(matches.iter().all(|m| m.symbol != producer));
}

#[test]
fn unconnected_required_ports_excludes_wired_and_optional() {
    let (bench, payload_id, ids) = seeded_bench();

    // An optional input port that never counts.
    let optional = ComponentSymbol::new("app", "opt", Version::new(1, 0, 0), SymbolKind::Component)
        .with_port(PortDefinition::new(
            "maybe",
            PortDirection::In,
            TypeReference::new(payload_id.clone()),
        ));
    bench.symbol_table().register(optional).unwrap();

    bench
        .wiring_service()
        .connect(ConnectRequest::between(ids[0].clone(), "out", ids[1].clone(), "in"))
        .unwrap();

    let unconnected = bench.wiring_service().unconnected_required_ports().unwrap();
    let flagged: Vec<&SymbolId> = unconnected.iter().map(|u| &u.symbol).collect();
    // y.in is wired; x.in and z.in remain open.
    assert_eq!(flagged, vec![&ids[0], &ids[2]]);
}

// ============================================================================
// Symbol table scenarios
// ============================================================================

#[test]
fn update_patches_fields_and_rejects_missing() {
    let (bench, _, ids) = seeded_bench();
    let table = bench.symbol_table();

    let updated = table
        .update(
            &ids[0],
            SymbolPatch::new()
                .with_status(SymbolStatus::Tested)
                .with_description("relay x")
                .with_tags(["stable"]),
        )
        .unwrap();
    assert_eq!(updated.status, SymbolStatus::Tested);
    assert_eq!(updated.description, "relay x");
    assert!(updated.updated_at >= updated.created_at);

    let missing = table.update(&SymbolId::new("app/ghost@1.0.0"), SymbolPatch::new());
    assert!(matches!(missing, Err(OpsError::SymbolNotFound { .. })));
}

#[test]
fn registration_rejects_duplicates_and_bad_constraints() {
    let (bench, payload_id, _) = seeded_bench();
    let table = bench.symbol_table();

    let duplicate = table.register(data_type("Payload"));
    assert!(matches!(duplicate, Err(OpsError::Validation { .. })));

    let mut bad = relay("bad", &payload_id);
    bad.compatible_versions = vec!["not-a-range".to_string()];
    let rejected = table.register(bad);
    assert!(matches!(rejected, Err(OpsError::InvalidConstraint { .. })));

    let mut bad_port = relay("badport", &payload_id);
    bad_port.ports[0].ty.constraint = Some(">=1".to_string());
    assert!(matches!(
        table.register(bad_port),
        Err(OpsError::InvalidConstraint { .. })
    ));
}

#[test]
fn containment_must_stay_a_forest() {
    let bench = Workbench::in_memory();
    let table = bench.symbol_table();

    let leaf = table.register(data_type("Leaf")).unwrap();
    let mid = ComponentSymbol::new("core", "Mid", Version::new(1, 0, 0), SymbolKind::DataType)
        .with_child(leaf.clone());
    let mid_id = table.register(mid).unwrap();

    // Second parent for the same child is rejected.
    let rival = ComponentSymbol::new("core", "Rival", Version::new(1, 0, 0), SymbolKind::DataType)
        .with_child(leaf.clone());
    assert!(matches!(
        table.register(rival),
        Err(OpsError::Validation { .. })
    ));

    // A containment cycle is rejected at update time.
    let cyclic = table.update(
        &leaf,
        SymbolPatch::new().with_contains([mid_id.clone()]),
    );
    assert!(matches!(cyclic, Err(OpsError::Validation { .. })));

    // Self-containment is rejected outright.
    let selfish = table.update(&mid_id, SymbolPatch::new().with_contains([mid_id.clone()]));
    assert!(matches!(selfish, Err(OpsError::Validation { .. })));

    // The legal hierarchy still resolves both ways.
    assert_eq!(table.children(&mid_id).unwrap()[0].id, leaf);
    assert_eq!(table.parent(&leaf).unwrap().unwrap().id, mid_id);
}

#[test]
fn structural_dependency_queries_follow_generics() {
    let bench = Workbench::in_memory();
    let table = bench.symbol_table();

    let item = table.register(data_type("Item")).unwrap();
    let list = table.register(data_type("List")).unwrap();

    let consumer =
        ComponentSymbol::new("app", "consumer", Version::new(1, 0, 0), SymbolKind::Component)
            .with_port(PortDefinition::new(
                "items",
                PortDirection::In,
                TypeReference::new(list.clone())
                    .with_generic(TypeReference::new(item.clone())),
            ));
    let consumer_id = table.register(consumer).unwrap();

    // `consumer` depends on both List and Item (through the generic).
    assert_eq!(
        table.dependencies_of(&consumer_id).unwrap(),
        vec![list.clone(), item.clone()]
    );

    // Item's dependents include `consumer`, found through the generic.
    let dependents = table.dependents_of(&item).unwrap();
    assert_eq!(dependents.len(), 1);
    assert_eq!(dependents[0].id, consumer_id);

    assert!(table.dependents_of(&list).unwrap().iter().any(|s| s.id == consumer_id));
    assert!(matches!(
        table.dependents_of(&SymbolId::new("nope@1.0.0")),
        Err(OpsError::SymbolNotFound { .. })
    ));
}

#[test]
fn reachability_and_test_audits_classify_by_status() {
    let (bench, _, ids) = seeded_bench();
    let table = bench.symbol_table();

    table
        .update(&ids[0], SymbolPatch::new().with_status(SymbolStatus::Tested))
        .unwrap();
    table
        .update(&ids[1], SymbolPatch::new().with_status(SymbolStatus::Implemented))
        .unwrap();

    let unreachable: Vec<SymbolId> = table
        .unreachable_symbols()
        .unwrap()
        .into_iter()
        .map(|s| s.id)
        .collect();
    // Payload and z remain declared.
    assert_eq!(unreachable.len(), 2);
    assert!(unreachable.contains(&ids[2]));

    let untested: Vec<SymbolId> = table
        .untested_symbols()
        .unwrap()
        .into_iter()
        .map(|s| s.id)
        .collect();
    // Everything except the tested x.
    assert_eq!(untested.len(), 3);
    assert!(!untested.contains(&ids[0]));
}

#[test]
fn deleting_a_symbol_cascades_its_wiring() {
    let (bench, _, ids) = seeded_bench();

    bench
        .wiring_service()
        .connect(ConnectRequest::between(ids[0].clone(), "out", ids[1].clone(), "in"))
        .unwrap();

    bench.symbol_table().delete(&ids[1]).unwrap();
    assert_eq!(
        bench
            .graph_service()
            .stats(&GraphRequest::default())
            .unwrap()
            .edge_count,
        0
    );
    assert!(matches!(
        bench.symbol_table().get(&ids[1]),
        Err(OpsError::SymbolNotFound { .. })
    ));
}

// ============================================================================
// Facade envelope
// ============================================================================

#[test]
fn facade_envelope_carries_stable_codes() {
    let bench = Workbench::in_memory();

    let missing = bench.get_symbol(&SymbolId::new("nope@1.0.0"));
    assert!(!missing.success);
    assert!(missing.data.is_none());
    assert_eq!(missing.error.unwrap().code, ErrorCode::NotFound);

    let payload = data_type("Payload");
    let registered = bench.register_symbol(payload.clone());
    assert!(registered.success);
    assert_eq!(registered.data.unwrap(), payload.id);

    let duplicate = bench.register_symbol(payload);
    assert!(!duplicate.success);
    assert_eq!(duplicate.error.unwrap().code, ErrorCode::ValidationFailed);

    let stats = bench.get_stats();
    assert!(stats.success);
    assert_eq!(stats.data.unwrap().node_count, 1);
}

#[test]
fn facade_envelope_serializes_to_the_wire_shape() {
    let bench = Workbench::in_memory();
    let missing = bench.get_symbol(&SymbolId::new("nope@1.0.0"));

    let json = serde_json::to_value(&missing).unwrap();
    assert_eq!(json["success"], serde_json::json!(false));
    assert_eq!(json["error"]["code"], serde_json::json!("NotFound"));
    assert!(json.get("data").is_none());
}

#[test]
fn subgraph_through_the_facade() {
    let (bench, _, ids) = seeded_bench();
    bench
        .wiring_service()
        .connect(ConnectRequest::between(ids[0].clone(), "out", ids[1].clone(), "in"))
        .unwrap();

    let response = bench.get_subgraph(&ids[0]);
    assert!(response.success);
    let graph = response.data.unwrap();
    assert!(graph.nodes.contains_key(&ids[0]));
    assert!(graph.nodes.contains_key(&ids[1]));
    assert!(!graph.nodes.contains_key(&ids[2]));

    let missing = bench.get_subgraph(&SymbolId::new("nope@1.0.0"));
    assert_eq!(missing.error.unwrap().code, ErrorCode::NotFound);
}

#[test]
fn workbench_persists_through_the_json_store() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.store_dir = dir.path().join(".archwire");

    {
        let bench = Workbench::open(config.clone()).unwrap();
        bench
            .symbol_table()
            .register(data_type("Persisted"))
            .unwrap();
    }

    let reopened = Workbench::open(config).unwrap();
    let listed = reopened.symbol_table().list().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Persisted");
}

#[test]
fn type_edges_surface_structural_coupling_in_the_graph() {
    let (bench, payload_id, ids) = seeded_bench();

    let response = bench.get_graph(&GraphRequest::with_type_edges());
    assert!(response.success);
    let graph = response.data.unwrap().graph;
    // Every relay references the payload type from both ports.
    assert!(graph
        .edges_from(&ids[0])
        .iter()
        .any(|e| e.target == payload_id));

    let wires_only = bench.get_graph(&GraphRequest::wires_only());
    assert_eq!(wires_only.data.unwrap().graph.edge_count(), 0);
}
