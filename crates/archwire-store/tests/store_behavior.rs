//! Behavioral tests run against both repository implementations.

use archwire_core::{
    ComponentSymbol, Connection, PortDefinition, PortDirection, SymbolId, SymbolKind,
    SymbolStatus, TypeReference, Version,
};
use archwire_store::{has_store, JsonStore, MemoryRepository, StoreError, SymbolRepository};

fn component(namespace: &str, name: &str) -> ComponentSymbol {
    ComponentSymbol::new(namespace, name, Version::new(1, 0, 0), SymbolKind::Component)
        .with_description(format!("test component {name}"))
        .with_tag("fixture")
}

fn wire(from: &ComponentSymbol, to: &ComponentSymbol) -> Connection {
    Connection::between(from.id.clone(), "out", to.id.clone(), "in")
}

fn exercise_repository(store: &dyn SymbolRepository) {
    let a = component("app", "alpha");
    let b = component("app", "beta");
    let lib = component("lib", "gamma");

    store.insert_symbol(a.clone()).unwrap();
    store.insert_symbol(b.clone()).unwrap();
    store.insert_symbol(lib.clone()).unwrap();

    // Duplicate ids are rejected.
    assert!(matches!(
        store.insert_symbol(a.clone()),
        Err(StoreError::DuplicateSymbol { .. })
    ));

    // Listing is ascending by id.
    let ids: Vec<SymbolId> = store.list_symbols().unwrap().into_iter().map(|s| s.id).collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);

    // Indexed finders.
    assert_eq!(store.find_by_namespace("app").unwrap().len(), 2);
    assert_eq!(store.find_by_kind(SymbolKind::Component).unwrap().len(), 3);
    assert_eq!(store.find_by_tag("fixture").unwrap().len(), 3);
    assert_eq!(
        store.find_by_status(SymbolStatus::Declared).unwrap().len(),
        3
    );
    assert_eq!(store.search("GAMMA").unwrap().len(), 1);
    assert_eq!(store.search("test component").unwrap().len(), 3);

    // Updates replace; updating a missing symbol fails.
    let mut patched = a.clone();
    patched.status = SymbolStatus::Tested;
    store.update_symbol(patched).unwrap();
    assert_eq!(
        store.symbol(&a.id).unwrap().unwrap().status,
        SymbolStatus::Tested
    );
    let ghost = component("app", "ghost");
    assert!(matches!(
        store.update_symbol(ghost),
        Err(StoreError::SymbolNotFound { .. })
    ));

    // Connections and the exclusive-target rule.
    store.insert_connection(wire(&a, &b), true).unwrap();
    assert!(matches!(
        store.insert_connection(wire(&lib, &b), true),
        Err(StoreError::TargetOccupied { .. })
    ));
    // A non-exclusive insert to the same target is allowed.
    store.insert_connection(wire(&lib, &b), false).unwrap();
    assert_eq!(store.connections_to(&b.id, "in").unwrap().len(), 2);
    assert_eq!(store.connections_for(&a.id).unwrap().len(), 1);

    // Duplicate connection ids are rejected.
    assert!(matches!(
        store.insert_connection(wire(&a, &b), false),
        Err(StoreError::DuplicateConnection { .. })
    ));

    // Deleting a symbol cascades to its connections.
    store.delete_symbol(&b.id).unwrap();
    assert!(store.symbol(&b.id).unwrap().is_none());
    assert!(store.connections_for(&a.id).unwrap().is_empty());
    assert!(store.list_connections().unwrap().is_empty());
    assert!(matches!(
        store.delete_symbol(&b.id),
        Err(StoreError::SymbolNotFound { .. })
    ));
}

#[test]
fn memory_repository_behaves() {
    exercise_repository(&MemoryRepository::new());
}

#[test]
fn json_store_behaves() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::open(dir.path().join(".archwire")).unwrap();
    exercise_repository(&store);
}

#[test]
fn containment_queries_resolve_parent_and_children() {
    let store = MemoryRepository::new();
    let child = component("app", "child");
    let parent = component("app", "parent").with_child(child.id.clone());

    store.insert_symbol(child.clone()).unwrap();
    store.insert_symbol(parent.clone()).unwrap();

    assert_eq!(store.children_of(&parent.id).unwrap(), vec![child.id.clone()]);
    assert_eq!(store.parent_of(&child.id).unwrap(), Some(parent.id.clone()));
    assert_eq!(store.parent_of(&parent.id).unwrap(), None);
    assert!(matches!(
        store.children_of(&SymbolId::new("missing@1.0.0")),
        Err(StoreError::SymbolNotFound { .. })
    ));

    // Deleting the child detaches it from the parent.
    store.delete_symbol(&child.id).unwrap();
    assert!(store.children_of(&parent.id).unwrap().is_empty());
}

#[test]
fn json_store_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let store_dir = dir.path().join(".archwire");

    let token = ComponentSymbol::new("core", "Token", Version::new(1, 0, 0), SymbolKind::DataType);
    let lexer = component("app", "lexer").with_port(PortDefinition::new(
        "tokens",
        PortDirection::Out,
        TypeReference::new(token.id.clone()),
    ));
    let parser = component("app", "parser").with_port(
        PortDefinition::new("tokens", PortDirection::In, TypeReference::new(token.id.clone()))
            .required(),
    );

    {
        let store = JsonStore::open(&store_dir).unwrap();
        store.insert_symbol(token.clone()).unwrap();
        store.insert_symbol(lexer.clone()).unwrap();
        store.insert_symbol(parser.clone()).unwrap();
        store.insert_connection(wire(&lexer, &parser), false).unwrap();
    }

    assert!(has_store(dir.path()));

    let reopened = JsonStore::open(&store_dir).unwrap();
    assert_eq!(reopened.list_symbols().unwrap().len(), 3);
    assert_eq!(reopened.list_connections().unwrap().len(), 1);
    let loaded = reopened.symbol(&parser.id).unwrap().unwrap();
    assert_eq!(loaded.ports.len(), 1);
    assert!(loaded.ports[0].required);

    let manifest = reopened.manifest().unwrap().unwrap();
    assert_eq!(manifest.symbol_count, 3);
    assert_eq!(manifest.connection_count, 1);
}

#[test]
fn json_store_snapshots_and_stats() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::open(dir.path().join(".archwire")).unwrap();

    let a = component("app", "alpha");
    store.insert_symbol(a).unwrap();

    let snapshot_path = store.snapshot().unwrap();
    assert!(snapshot_path.exists());
    assert_eq!(store.list_snapshots().unwrap().len(), 1);

    let snapshot = store.load_snapshot(&snapshot_path).unwrap();
    assert_eq!(snapshot.symbols.len(), 1);
    assert!(snapshot.connections.is_empty());

    let stats = store.stats().unwrap();
    assert!(stats.exists);
    assert_eq!(stats.snapshot_count, 1);
    assert!(stats.total_size > 0);
    assert!(stats.manifest.is_some());

    store.clean().unwrap();
    assert!(!store.exists());
    assert!(!store.stats().unwrap().exists);
}
