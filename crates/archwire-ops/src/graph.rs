//! Dependency graph service: stateless builds over a repository snapshot.

use std::sync::Arc;

use tracing::debug;

use archwire_core::{ComponentSymbol, Connection, DependencyGraph, GraphStats, SymbolId};
use archwire_store::SymbolRepository;

use crate::error::{OpsError, OpsResult};
use crate::requests::GraphRequest;
use crate::responses::GraphResponse;

/// Builds and queries dependency graphs on demand. Holds no graph state
/// of its own; every call snapshots the repository and recomputes.
#[derive(Clone)]
pub struct GraphService {
    store: Arc<dyn SymbolRepository>,
    include_type_edges_default: bool,
}

impl GraphService {
    /// Create a service over the given repository.
    pub fn new(store: Arc<dyn SymbolRepository>, include_type_edges_default: bool) -> Self {
        Self {
            store,
            include_type_edges_default,
        }
    }

    /// Build the full graph for the current snapshot.
    pub fn build(&self, request: &GraphRequest) -> OpsResult<GraphResponse> {
        let include_type_edges = request
            .include_type_edges
            .unwrap_or(self.include_type_edges_default);
        let (symbols, connections) = self.snapshot()?;
        debug!(
            symbols = symbols.len(),
            connections = connections.len(),
            include_type_edges,
            "Building dependency graph"
        );
        Ok(GraphResponse {
            graph: DependencyGraph::build(&symbols, &connections, include_type_edges),
            include_type_edges,
        })
    }

    /// Build the induced subgraph of `root`'s ancestors and descendants.
    pub fn subgraph(&self, root: &SymbolId, request: &GraphRequest) -> OpsResult<DependencyGraph> {
        let response = self.build(request)?;
        response
            .graph
            .subgraph(root)
            .ok_or_else(|| OpsError::SymbolNotFound { id: root.clone() })
    }

    /// Detected cycles in the current snapshot. A non-empty result is a
    /// reportable finding, not an error.
    pub fn cycles(&self, request: &GraphRequest) -> OpsResult<Vec<Vec<SymbolId>>> {
        Ok(self.build(request)?.graph.cycles)
    }

    /// Topological order of the current snapshot, or `None` when cyclic.
    pub fn topological_order(&self, request: &GraphRequest) -> OpsResult<Option<Vec<SymbolId>>> {
        Ok(self.build(request)?.graph.topological_order)
    }

    /// Aggregate statistics for the current snapshot.
    pub fn stats(&self, request: &GraphRequest) -> OpsResult<GraphStats> {
        Ok(self.build(request)?.graph.stats())
    }

    fn snapshot(&self) -> OpsResult<(Vec<ComponentSymbol>, Vec<Connection>)> {
        Ok((self.store.list_symbols()?, self.store.list_connections()?))
    }
}
