//! The facade consumed by UI/CLI collaborators.
//!
//! Every operation returns the uniform envelope: `{success: true, data}`
//! or `{success: false, error: {code, message}}`. The envelope is plain
//! serde data; how it travels (stdout, IPC, HTTP) is the caller's
//! concern.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use archwire_core::{
    ComponentSymbol, ConnectionId, DependencyGraph, GraphStats, SymbolId,
};
use archwire_store::{JsonStore, MemoryRepository, SymbolRepository};

use crate::config::Config;
use crate::error::{ErrorCode, OpsResult};
use crate::graph::GraphService;
use crate::requests::{ConnectRequest, GraphRequest, SymbolPatch};
use crate::responses::{GraphResponse, PortMatch, UnconnectedPort};
use crate::symbols::SymbolTable;
use crate::wiring::WiringService;

/// Error payload in a failed envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Stable error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
}

/// The uniform response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Payload on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl<T> ApiResponse<T> {
    /// Successful envelope.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Failed envelope.
    pub fn err(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
        }
    }

    fn from_result(result: OpsResult<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => Self::err(err.code(), err.to_string()),
        }
    }
}

/// The workbench facade: all three services over one shared repository.
///
/// Construct one per graph — there is deliberately no process-wide
/// instance, so independent workbenches can coexist in tests and
/// embedders.
#[derive(Clone)]
pub struct Workbench {
    config: Config,
    symbols: SymbolTable,
    graph: GraphService,
    wiring: WiringService,
}

impl Workbench {
    /// Create a workbench over an explicit repository.
    pub fn new(store: Arc<dyn SymbolRepository>, config: Config) -> Self {
        Self {
            symbols: SymbolTable::new(store.clone()),
            graph: GraphService::new(store.clone(), config.include_type_edges),
            wiring: WiringService::new(store),
            config,
        }
    }

    /// Create a workbench over a fresh in-memory repository.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryRepository::new()), Config::default())
    }

    /// Open a workbench over the persistent store named by the config.
    pub fn open(config: Config) -> OpsResult<Self> {
        let store = JsonStore::open(&config.store_dir)?;
        Ok(Self::new(Arc::new(store), config))
    }

    /// The active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The symbol table service, for typed (non-envelope) access.
    pub fn symbol_table(&self) -> &SymbolTable {
        &self.symbols
    }

    /// The graph service, for typed (non-envelope) access.
    pub fn graph_service(&self) -> &GraphService {
        &self.graph
    }

    /// The wiring service, for typed (non-envelope) access.
    pub fn wiring_service(&self) -> &WiringService {
        &self.wiring
    }

    // =========================================================================
    // Symbol operations
    // =========================================================================

    /// Register a symbol.
    pub fn register_symbol(&self, symbol: ComponentSymbol) -> ApiResponse<SymbolId> {
        ApiResponse::from_result(self.symbols.register(symbol))
    }

    /// List all symbols.
    pub fn list_symbols(&self) -> ApiResponse<Vec<ComponentSymbol>> {
        ApiResponse::from_result(self.symbols.list())
    }

    /// Fetch one symbol.
    pub fn get_symbol(&self, id: &SymbolId) -> ApiResponse<ComponentSymbol> {
        ApiResponse::from_result(self.symbols.get(id))
    }

    /// Run registration validation without persisting.
    pub fn validate_symbol(&self, symbol: &ComponentSymbol) -> ApiResponse<()> {
        ApiResponse::from_result(self.symbols.validate_registration(symbol))
    }

    /// Apply a partial update.
    pub fn update_symbol(&self, id: &SymbolId, patch: SymbolPatch) -> ApiResponse<ComponentSymbol> {
        ApiResponse::from_result(self.symbols.update(id, patch))
    }

    /// Delete a symbol, cascading its connections.
    pub fn delete_symbol(&self, id: &SymbolId) -> ApiResponse<()> {
        ApiResponse::from_result(self.symbols.delete(id))
    }

    // =========================================================================
    // Wiring operations
    // =========================================================================

    /// Create a validated connection.
    pub fn wire(&self, request: ConnectRequest) -> ApiResponse<ConnectionId> {
        ApiResponse::from_result(self.wiring.connect(request).map(|c| c.id))
    }

    /// Remove a connection.
    pub fn unwire(&self, id: &ConnectionId) -> ApiResponse<()> {
        ApiResponse::from_result(self.wiring.disconnect(id))
    }

    /// Pre-flight a connection without persisting it.
    pub fn validate_connection(&self, request: &ConnectRequest) -> ApiResponse<()> {
        ApiResponse::from_result(self.wiring.validate_connection(request))
    }

    /// Find ports the named port could connect to, best first, capped at
    /// the configured maximum.
    pub fn find_compatible_ports(
        &self,
        symbol: &SymbolId,
        port: &str,
    ) -> ApiResponse<Vec<PortMatch>> {
        ApiResponse::from_result(self.wiring.compatible_ports(symbol, port).map(|mut m| {
            m.truncate(self.config.max_port_matches);
            m
        }))
    }

    /// Find required input ports nothing connects to.
    pub fn find_unconnected_required(&self) -> ApiResponse<Vec<UnconnectedPort>> {
        ApiResponse::from_result(self.wiring.unconnected_required_ports())
    }

    // =========================================================================
    // Graph operations
    // =========================================================================

    /// Build the dependency graph.
    pub fn get_graph(&self, request: &GraphRequest) -> ApiResponse<GraphResponse> {
        ApiResponse::from_result(self.graph.build(request))
    }

    /// Build the induced subgraph around one symbol.
    pub fn get_subgraph(&self, root: &SymbolId) -> ApiResponse<DependencyGraph> {
        ApiResponse::from_result(self.graph.subgraph(root, &GraphRequest::default()))
    }

    /// Detect cycles. A non-empty list is data, not an error.
    pub fn detect_cycles(&self) -> ApiResponse<Vec<Vec<SymbolId>>> {
        ApiResponse::from_result(self.graph.cycles(&GraphRequest::default()))
    }

    /// Topological order, or `None` when the graph is cyclic.
    pub fn get_topological_order(&self) -> ApiResponse<Option<Vec<SymbolId>>> {
        ApiResponse::from_result(self.graph.topological_order(&GraphRequest::default()))
    }

    /// Aggregate graph statistics.
    pub fn get_stats(&self) -> ApiResponse<GraphStats> {
        ApiResponse::from_result(self.graph.stats(&GraphRequest::default()))
    }
}
