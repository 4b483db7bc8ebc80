//! In-memory repository implementation.

use std::collections::BTreeMap;
use std::sync::RwLock;

use archwire_core::{
    AbstractionLevel, ComponentSymbol, Connection, ConnectionId, SymbolId, SymbolKind,
    SymbolOrigin, SymbolStatus,
};

use crate::repository::{StoreError, StoreResult, SymbolRepository};

#[derive(Debug, Default)]
struct Shelves {
    symbols: BTreeMap<SymbolId, ComponentSymbol>,
    connections: BTreeMap<ConnectionId, Connection>,
}

/// `RwLock`-guarded in-memory repository. The default choice for tests
/// and for embedders that persist elsewhere.
///
/// Construct one per graph; there is deliberately no process-wide
/// instance, so independent graphs can coexist.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    inner: RwLock<Shelves>,
}

impl MemoryRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Shelves> {
        self.inner.read().expect("repository lock poisoned")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Shelves> {
        self.inner.write().expect("repository lock poisoned")
    }

    fn filter_symbols<F>(&self, predicate: F) -> Vec<ComponentSymbol>
    where
        F: Fn(&ComponentSymbol) -> bool,
    {
        self.read()
            .symbols
            .values()
            .filter(|s| predicate(s))
            .cloned()
            .collect()
    }
}

impl SymbolRepository for MemoryRepository {
    fn insert_symbol(&self, symbol: ComponentSymbol) -> StoreResult<()> {
        let mut shelves = self.write();
        if shelves.symbols.contains_key(&symbol.id) {
            return Err(StoreError::DuplicateSymbol {
                id: symbol.id.clone(),
            });
        }
        shelves.symbols.insert(symbol.id.clone(), symbol);
        Ok(())
    }

    fn symbol(&self, id: &SymbolId) -> StoreResult<Option<ComponentSymbol>> {
        Ok(self.read().symbols.get(id).cloned())
    }

    fn update_symbol(&self, symbol: ComponentSymbol) -> StoreResult<()> {
        let mut shelves = self.write();
        if !shelves.symbols.contains_key(&symbol.id) {
            return Err(StoreError::SymbolNotFound {
                id: symbol.id.clone(),
            });
        }
        shelves.symbols.insert(symbol.id.clone(), symbol);
        Ok(())
    }

    fn delete_symbol(&self, id: &SymbolId) -> StoreResult<()> {
        let mut shelves = self.write();
        if shelves.symbols.remove(id).is_none() {
            return Err(StoreError::SymbolNotFound { id: id.clone() });
        }
        // Referential rules, applied in the same locked step: connections
        // touching the symbol go away, and any parent drops the child.
        shelves.connections.retain(|_, c| !c.touches(id));
        for symbol in shelves.symbols.values_mut() {
            symbol.contains.retain(|child| child != id);
        }
        Ok(())
    }

    fn list_symbols(&self) -> StoreResult<Vec<ComponentSymbol>> {
        Ok(self.read().symbols.values().cloned().collect())
    }

    fn find_by_namespace(&self, namespace: &str) -> StoreResult<Vec<ComponentSymbol>> {
        Ok(self.filter_symbols(|s| s.namespace == namespace))
    }

    fn find_by_level(&self, level: AbstractionLevel) -> StoreResult<Vec<ComponentSymbol>> {
        Ok(self.filter_symbols(|s| s.level == level))
    }

    fn find_by_kind(&self, kind: SymbolKind) -> StoreResult<Vec<ComponentSymbol>> {
        Ok(self.filter_symbols(|s| s.kind == kind))
    }

    fn find_by_tag(&self, tag: &str) -> StoreResult<Vec<ComponentSymbol>> {
        Ok(self.filter_symbols(|s| s.tags.iter().any(|t| t == tag)))
    }

    fn find_by_status(&self, status: SymbolStatus) -> StoreResult<Vec<ComponentSymbol>> {
        Ok(self.filter_symbols(|s| s.status == status))
    }

    fn find_by_origin(&self, origin: SymbolOrigin) -> StoreResult<Vec<ComponentSymbol>> {
        Ok(self.filter_symbols(|s| s.origin == origin))
    }

    fn search(&self, query: &str) -> StoreResult<Vec<ComponentSymbol>> {
        let needle = query.to_lowercase();
        Ok(self.filter_symbols(|s| {
            s.id.as_str().to_lowercase().contains(&needle)
                || s.name.to_lowercase().contains(&needle)
                || s.description.to_lowercase().contains(&needle)
                || s.tags.iter().any(|t| t.to_lowercase().contains(&needle))
        }))
    }

    fn children_of(&self, id: &SymbolId) -> StoreResult<Vec<SymbolId>> {
        let shelves = self.read();
        let symbol = shelves
            .symbols
            .get(id)
            .ok_or_else(|| StoreError::SymbolNotFound { id: id.clone() })?;
        Ok(symbol.contains.clone())
    }

    fn parent_of(&self, id: &SymbolId) -> StoreResult<Option<SymbolId>> {
        Ok(self
            .read()
            .symbols
            .values()
            .find(|s| s.contains.contains(id))
            .map(|s| s.id.clone()))
    }

    fn insert_connection(
        &self,
        connection: Connection,
        exclusive_target: bool,
    ) -> StoreResult<()> {
        let mut shelves = self.write();
        if shelves.connections.contains_key(&connection.id) {
            return Err(StoreError::DuplicateConnection {
                id: connection.id.clone(),
            });
        }
        if exclusive_target {
            let occupied = shelves
                .connections
                .values()
                .any(|c| c.targets(&connection.to_symbol, &connection.to_port));
            if occupied {
                return Err(StoreError::TargetOccupied {
                    symbol: connection.to_symbol.clone(),
                    port: connection.to_port.clone(),
                });
            }
        }
        shelves.connections.insert(connection.id.clone(), connection);
        Ok(())
    }

    fn connection(&self, id: &ConnectionId) -> StoreResult<Option<Connection>> {
        Ok(self.read().connections.get(id).cloned())
    }

    fn delete_connection(&self, id: &ConnectionId) -> StoreResult<()> {
        let mut shelves = self.write();
        if shelves.connections.remove(id).is_none() {
            return Err(StoreError::ConnectionNotFound { id: id.clone() });
        }
        Ok(())
    }

    fn connections_for(&self, id: &SymbolId) -> StoreResult<Vec<Connection>> {
        Ok(self
            .read()
            .connections
            .values()
            .filter(|c| c.touches(id))
            .cloned()
            .collect())
    }

    fn connections_to(&self, id: &SymbolId, port: &str) -> StoreResult<Vec<Connection>> {
        Ok(self
            .read()
            .connections
            .values()
            .filter(|c| c.targets(id, port))
            .cloned()
            .collect())
    }

    fn list_connections(&self) -> StoreResult<Vec<Connection>> {
        Ok(self.read().connections.values().cloned().collect())
    }
}
