//! Directional ports and the recursive type references they carry.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::symbol::SymbolId;

/// Maximum nesting depth for [`TypeReference`] generics. Registration
/// rejects deeper types, which guarantees every compatibility check
/// terminates.
pub const MAX_TYPE_DEPTH: usize = 8;

/// Direction of data flow through a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortDirection {
    /// Receives data.
    In,
    /// Emits data.
    Out,
    /// Both receives and emits.
    InOut,
}

impl PortDirection {
    /// Whether the port may act as the source of a connection.
    pub fn is_output_capable(&self) -> bool {
        matches!(self, PortDirection::Out | PortDirection::InOut)
    }

    /// Whether the port may act as the target of a connection.
    pub fn is_input_capable(&self) -> bool {
        matches!(self, PortDirection::In | PortDirection::InOut)
    }
}

impl fmt::Display for PortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortDirection::In => write!(f, "in"),
            PortDirection::Out => write!(f, "out"),
            PortDirection::InOut => write!(f, "inout"),
        }
    }
}

/// A reference to a typed symbol, optionally parameterized by nested
/// type references (generics) and qualified by a version constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeReference {
    /// The referenced symbol.
    pub target: SymbolId,
    /// Version constraint on the target (`^1.2.0`-style spec).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint: Option<String>,
    /// Ordered generic arguments.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generics: Vec<TypeReference>,
    /// Whether the value may be absent.
    #[serde(default)]
    pub nullable: bool,
}

impl TypeReference {
    /// Reference a symbol with no generics.
    pub fn new(target: impl Into<SymbolId>) -> Self {
        Self {
            target: target.into(),
            constraint: None,
            generics: Vec::new(),
            nullable: false,
        }
    }

    /// Append a generic argument.
    pub fn with_generic(mut self, generic: TypeReference) -> Self {
        self.generics.push(generic);
        self
    }

    /// Attach a version constraint.
    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraint = Some(constraint.into());
        self
    }

    /// Mark the reference nullable.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Nesting depth of this reference: 1 plus the deepest generic.
    pub fn depth(&self) -> usize {
        1 + self
            .generics
            .iter()
            .map(TypeReference::depth)
            .max()
            .unwrap_or(0)
    }

    /// Every symbol id this reference mentions, including through
    /// generics, in first-mention order without duplicates.
    pub fn referenced_symbols(&self) -> Vec<SymbolId> {
        let mut out = Vec::new();
        self.collect_referenced(&mut out);
        out
    }

    fn collect_referenced(&self, out: &mut Vec<SymbolId>) {
        if !out.contains(&self.target) {
            out.push(self.target.clone());
        }
        for generic in &self.generics {
            generic.collect_referenced(out);
        }
    }

    /// Whether this reference mentions `id` anywhere, including through
    /// generics.
    pub fn references(&self, id: &SymbolId) -> bool {
        self.target == *id || self.generics.iter().any(|g| g.references(id))
    }
}

impl fmt::Display for TypeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.target)?;
        if !self.generics.is_empty() {
            write!(f, "<")?;
            for (i, generic) in self.generics.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{generic}")?;
            }
            write!(f, ">")?;
        }
        if self.nullable {
            write!(f, "?")?;
        }
        Ok(())
    }
}

/// A named, typed, directional attachment point on a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortDefinition {
    /// Port name, unique within its symbol.
    pub name: String,
    /// Direction of data flow.
    pub direction: PortDirection,
    /// Type carried by the port.
    pub ty: TypeReference,
    /// Whether the port must be connected for the symbol to be complete.
    #[serde(default)]
    pub required: bool,
    /// Whether the port accepts more than one incoming connection.
    #[serde(default)]
    pub multiple: bool,
    /// Human description.
    #[serde(default)]
    pub description: String,
    /// Default value used when the port is left unconnected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl PortDefinition {
    /// Create a port with the given name, direction, and type.
    pub fn new(name: impl Into<String>, direction: PortDirection, ty: TypeReference) -> Self {
        Self {
            name: name.into(),
            direction,
            ty,
            required: false,
            multiple: false,
            description: String::new(),
            default: None,
        }
    }

    /// Mark the port required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Allow multiple incoming connections.
    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the default value.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }
}
