//! The repository capability trait and its error type.

use archwire_core::{
    AbstractionLevel, ComponentSymbol, Connection, ConnectionId, SymbolId, SymbolKind,
    SymbolOrigin, SymbolStatus,
};
use thiserror::Error;

/// Result type for repository operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur inside a repository implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No symbol with the given id.
    #[error("symbol not found: {id}")]
    SymbolNotFound { id: SymbolId },

    /// No connection with the given id.
    #[error("connection not found: {id}")]
    ConnectionNotFound { id: ConnectionId },

    /// A symbol with the given id is already registered.
    #[error("symbol already registered: {id}")]
    DuplicateSymbol { id: SymbolId },

    /// A connection with the given id already exists.
    #[error("connection already exists: {id}")]
    DuplicateConnection { id: ConnectionId },

    /// An exclusive-target insert found the input port occupied.
    #[error("input port {symbol}#{port} already has a connection")]
    TargetOccupied { symbol: SymbolId, port: String },

    /// IO error during persistence.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Capability interface over symbol and connection storage.
///
/// Implementations must be safe to share across threads and must apply
/// each method atomically: compound rules (cascading deletes, the
/// exclusive-target check) run under the implementation's own lock or
/// transaction, never in the caller.
pub trait SymbolRepository: Send + Sync {
    // Symbol CRUD.

    /// Insert a new symbol; `DuplicateSymbol` if the id is taken.
    fn insert_symbol(&self, symbol: ComponentSymbol) -> StoreResult<()>;

    /// Fetch a symbol by id.
    fn symbol(&self, id: &SymbolId) -> StoreResult<Option<ComponentSymbol>>;

    /// Replace a stored symbol; `SymbolNotFound` if absent.
    fn update_symbol(&self, symbol: ComponentSymbol) -> StoreResult<()>;

    /// Delete a symbol, cascading to its connections (both directions)
    /// and detaching it from any parent's `contains` list.
    /// `SymbolNotFound` if absent.
    fn delete_symbol(&self, id: &SymbolId) -> StoreResult<()>;

    /// All symbols, ascending by id.
    fn list_symbols(&self) -> StoreResult<Vec<ComponentSymbol>>;

    // Indexed finders.

    /// Symbols in the exact namespace.
    fn find_by_namespace(&self, namespace: &str) -> StoreResult<Vec<ComponentSymbol>>;

    /// Symbols at the given abstraction level.
    fn find_by_level(&self, level: AbstractionLevel) -> StoreResult<Vec<ComponentSymbol>>;

    /// Symbols of the given kind.
    fn find_by_kind(&self, kind: SymbolKind) -> StoreResult<Vec<ComponentSymbol>>;

    /// Symbols carrying the given tag.
    fn find_by_tag(&self, tag: &str) -> StoreResult<Vec<ComponentSymbol>>;

    /// Symbols in the given lifecycle status.
    fn find_by_status(&self, status: SymbolStatus) -> StoreResult<Vec<ComponentSymbol>>;

    /// Symbols with the given origin.
    fn find_by_origin(&self, origin: SymbolOrigin) -> StoreResult<Vec<ComponentSymbol>>;

    /// Case-insensitive free-text search over id, name, description,
    /// and tags.
    fn search(&self, query: &str) -> StoreResult<Vec<ComponentSymbol>>;

    // Containment.

    /// Child ids declared by the symbol's `contains` list;
    /// `SymbolNotFound` if the symbol is absent.
    fn children_of(&self, id: &SymbolId) -> StoreResult<Vec<SymbolId>>;

    /// The parent symbol, if any; containment is a forest so there is at
    /// most one.
    fn parent_of(&self, id: &SymbolId) -> StoreResult<Option<SymbolId>>;

    // Connection CRUD.

    /// Insert a connection. `DuplicateConnection` if the id exists.
    /// With `exclusive_target`, also reject an occupied `(to_symbol,
    /// to_port)` with `TargetOccupied` — check and insert are one atomic
    /// step, which is what makes single-cardinality safe under
    /// concurrent connects.
    fn insert_connection(&self, connection: Connection, exclusive_target: bool)
        -> StoreResult<()>;

    /// Fetch a connection by id.
    fn connection(&self, id: &ConnectionId) -> StoreResult<Option<Connection>>;

    /// Delete a connection; `ConnectionNotFound` if absent.
    fn delete_connection(&self, id: &ConnectionId) -> StoreResult<()>;

    /// Connections touching the symbol on either end.
    fn connections_for(&self, id: &SymbolId) -> StoreResult<Vec<Connection>>;

    /// Connections targeting the given input port.
    fn connections_to(&self, id: &SymbolId, port: &str) -> StoreResult<Vec<Connection>>;

    /// All connections, ascending by id.
    fn list_connections(&self) -> StoreResult<Vec<Connection>>;
}
