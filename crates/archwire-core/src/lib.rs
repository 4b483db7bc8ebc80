//! Core domain model for the Archwire architecture workbench.
//!
//! Archwire models software components as versioned, typed symbols with
//! directional ports, wires them together via explicit connections, and
//! reasons about the resulting dependency graph. This crate holds the
//! domain types and the pure algorithms over them:
//!
//! - [`version`] — semantic version parsing, precedence, and constraint
//!   matching
//! - [`symbol`] — component symbols and their taxonomy (level, kind,
//!   status, origin)
//! - [`port`] — directional ports and recursive type references
//! - [`connection`] — persisted wiring between ports
//! - [`compat`] — port compatibility checking
//! - [`graph`] — the derived dependency graph and its algorithms (cycle
//!   detection, topological ordering, stats)
//!
//! Everything here is pure and synchronous; persistence and orchestration
//! live in `archwire-store` and `archwire-ops`.

pub mod compat;
pub mod connection;
pub mod graph;
pub mod port;
pub mod symbol;
pub mod version;

pub use compat::{check_port_compatibility, CheckMode, Compatibility};
pub use connection::{Connection, ConnectionId};
pub use graph::{DependencyGraph, GraphEdge, GraphEdgeKind, GraphNode, GraphStats};
pub use port::{PortDefinition, PortDirection, TypeReference, MAX_TYPE_DEPTH};
pub use symbol::{
    AbstractionLevel, ComponentSymbol, SourceLocation, SymbolError, SymbolId, SymbolKind,
    SymbolOrigin, SymbolStatus,
};
pub use version::{find_best_match, parse_constraint, Version, VersionError, VersionRange};
