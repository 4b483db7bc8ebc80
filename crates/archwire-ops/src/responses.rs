//! Response DTOs for operations.

use serde::{Deserialize, Serialize};

use archwire_core::{DependencyGraph, PortDirection, SymbolId};

/// A candidate port found by a compatible-port scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortMatch {
    /// Symbol the candidate port lives on.
    pub symbol: SymbolId,
    /// Candidate port name.
    pub port: String,
    /// Candidate port direction.
    pub direction: PortDirection,
    /// Compatibility score in [0, 100]; ranks candidates.
    pub score: u8,
}

impl PortMatch {
    /// Whether the candidate matched without any relaxation.
    pub fn is_exact(&self) -> bool {
        self.score == 100
    }
}

/// A required input port with no connection targeting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnconnectedPort {
    /// Symbol the port lives on.
    pub symbol: SymbolId,
    /// Port name.
    pub port: String,
    /// Port direction.
    pub direction: PortDirection,
}

/// Response from a graph build operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphResponse {
    /// The built graph.
    pub graph: DependencyGraph,

    /// Whether structural type edges were included.
    pub include_type_edges: bool,
}

impl GraphResponse {
    /// Get node count.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get edge count.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
