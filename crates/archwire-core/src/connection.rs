//! Persisted wiring between an output-capable and an input-capable port.

use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::symbol::SymbolId;

/// Identifier for a [`Connection`], derived deterministically from its
/// endpoints: `{from}#{from_port}->{to}#{to_port}`. One wire per port
/// pair; re-wiring the same pair is a duplicate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// Derive the id for a wire between two ports.
    pub fn for_wire(from: &SymbolId, from_port: &str, to: &SymbolId, to_port: &str) -> Self {
        Self(format!("{from}#{from_port}->{to}#{to_port}"))
    }

    /// Wrap an already-formatted id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConnectionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A persisted wire from one symbol's output port to another symbol's
/// input port. Created and deleted only through the wiring service,
/// which validates compatibility and cardinality first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    /// Deterministic connection id.
    pub id: ConnectionId,
    /// Source symbol.
    pub from_symbol: SymbolId,
    /// Output-capable port on the source symbol.
    pub from_port: String,
    /// Target symbol.
    pub to_symbol: SymbolId,
    /// Input-capable port on the target symbol.
    pub to_port: String,
    /// Optional transform applied along the wire.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,
    /// When the connection was persisted.
    pub created_at: SystemTime,
}

impl Connection {
    /// Create a connection between two ports, deriving its id.
    pub fn between(
        from_symbol: SymbolId,
        from_port: impl Into<String>,
        to_symbol: SymbolId,
        to_port: impl Into<String>,
    ) -> Self {
        let from_port = from_port.into();
        let to_port = to_port.into();
        Self {
            id: ConnectionId::for_wire(&from_symbol, &from_port, &to_symbol, &to_port),
            from_symbol,
            from_port,
            to_symbol,
            to_port,
            transform: None,
            created_at: SystemTime::now(),
        }
    }

    /// Attach a transform.
    pub fn with_transform(mut self, transform: impl Into<String>) -> Self {
        self.transform = Some(transform.into());
        self
    }

    /// Whether the connection touches the given symbol on either end.
    pub fn touches(&self, id: &SymbolId) -> bool {
        self.from_symbol == *id || self.to_symbol == *id
    }

    /// Whether the connection targets the given input port.
    pub fn targets(&self, id: &SymbolId, port: &str) -> bool {
        self.to_symbol == *id && self.to_port == port
    }
}
