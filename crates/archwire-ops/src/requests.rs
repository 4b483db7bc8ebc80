//! Request DTOs for operations.

use serde::{Deserialize, Serialize};

use archwire_core::{
    PortDefinition, SourceLocation, SymbolId, SymbolStatus,
};

/// Request to wire an output port to an input port.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectRequest {
    /// Source symbol.
    pub from_symbol: SymbolId,
    /// Output-capable port on the source.
    pub from_port: String,
    /// Target symbol.
    pub to_symbol: SymbolId,
    /// Input-capable port on the target.
    pub to_port: String,
    /// Optional transform applied along the wire.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,
}

impl ConnectRequest {
    /// Create a request between two named ports.
    pub fn between(
        from_symbol: impl Into<SymbolId>,
        from_port: impl Into<String>,
        to_symbol: impl Into<SymbolId>,
        to_port: impl Into<String>,
    ) -> Self {
        Self {
            from_symbol: from_symbol.into(),
            from_port: from_port.into(),
            to_symbol: to_symbol.into(),
            to_port: to_port.into(),
            transform: None,
        }
    }

    /// Attach a transform.
    pub fn with_transform(mut self, transform: impl Into<String>) -> Self {
        self.transform = Some(transform.into());
        self
    }
}

/// Request to build a dependency graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphRequest {
    /// Override the configured default for structural port-type edges.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_type_edges: Option<bool>,
}

impl GraphRequest {
    /// Request a graph with wire edges only.
    pub fn wires_only() -> Self {
        Self {
            include_type_edges: Some(false),
        }
    }

    /// Request a graph that also carries structural type edges.
    pub fn with_type_edges() -> Self {
        Self {
            include_type_edges: Some(true),
        }
    }
}

/// Partial update to a symbol. Identity fields (name, namespace,
/// version — and therefore the id) cannot be patched; a version change
/// is a re-registration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymbolPatch {
    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New implementation language.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Replacement tag list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// New lifecycle status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SymbolStatus>,
    /// Replacement port list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ports: Option<Vec<PortDefinition>>,
    /// Replacement child list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contains: Option<Vec<SymbolId>>,
    /// Replacement compatible-version ranges.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compatible_versions: Option<Vec<String>>,
    /// New source location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceLocation>,
}

impl SymbolPatch {
    /// An empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the status.
    pub fn with_status(mut self, status: SymbolStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replace the tag list.
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags = Some(tags.into_iter().map(|t| t.into()).collect());
        self
    }

    /// Replace the child list.
    pub fn with_contains(mut self, contains: impl IntoIterator<Item = SymbolId>) -> Self {
        self.contains = Some(contains.into_iter().collect());
        self
    }

    /// Replace the port list.
    pub fn with_ports(mut self, ports: impl IntoIterator<Item = PortDefinition>) -> Self {
        self.ports = Some(ports.into_iter().collect());
        self
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.language.is_none()
            && self.tags.is_none()
            && self.status.is_none()
            && self.ports.is_none()
            && self.contains.is_none()
            && self.compatible_versions.is_none()
            && self.source.is_none()
    }
}
