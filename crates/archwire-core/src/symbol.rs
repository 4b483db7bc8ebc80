//! Component symbols and their taxonomy.
//!
//! A [`ComponentSymbol`] is a versioned, identified definition of a
//! component or type at a given abstraction level. Its identifier is the
//! canonical string `{namespace}/{name}@{version}` and is derived
//! deterministically from those parts; identity never changes after
//! registration (a version change means re-registration).

use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::port::{PortDefinition, MAX_TYPE_DEPTH};
use crate::version::Version;

/// Errors raised by symbol construction and validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SymbolError {
    /// The id string does not parse as `{namespace}/{name}@{version}`.
    #[error("invalid symbol id `{input}`: {message}")]
    InvalidId { input: String, message: String },

    /// The stored id does not match the one derived from the identity fields.
    #[error("symbol id `{actual}` does not match its identity fields (expected `{expected}`)")]
    IdMismatch { expected: String, actual: String },

    /// The kind is not allowed at the symbol's abstraction level.
    #[error("kind `{kind}` is not valid at level {level}")]
    InvalidKindForLevel {
        kind: SymbolKind,
        level: AbstractionLevel,
    },

    /// Two ports share a name.
    #[error("duplicate port name `{name}`")]
    DuplicatePort { name: String },

    /// A port's type reference nests deeper than the enforced maximum.
    #[error("port `{port}` type nests {depth} levels deep (maximum {MAX_TYPE_DEPTH})")]
    TypeTooDeep { port: String, depth: usize },
}

/// Canonical symbol identifier: `{namespace}/{name}@{version}`.
///
/// The namespace is a `/`-joined path and may be empty, in which case the
/// id carries no leading slash (`name@1.0.0`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolId(String);

impl SymbolId {
    /// Derive the id from its identity parts.
    pub fn derive(namespace: &str, name: &str, version: &Version) -> Self {
        if namespace.is_empty() {
            Self(format!("{name}@{version}"))
        } else {
            Self(format!("{namespace}/{name}@{version}"))
        }
    }

    /// Wrap an already-formatted id string without validating it.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parse and validate an id string into its parts.
    pub fn parse(input: &str) -> Result<(String, String, Version), SymbolError> {
        let (path, version_str) = input.rsplit_once('@').ok_or_else(|| SymbolError::InvalidId {
            input: input.to_string(),
            message: "missing `@version` suffix".to_string(),
        })?;
        let version = Version::parse(version_str).map_err(|err| SymbolError::InvalidId {
            input: input.to_string(),
            message: err.to_string(),
        })?;
        let (namespace, name) = match path.rsplit_once('/') {
            Some((ns, name)) => (ns.to_string(), name.to_string()),
            None => (String::new(), path.to_string()),
        };
        if name.is_empty() {
            return Err(SymbolError::InvalidId {
                input: input.to_string(),
                message: "empty symbol name".to_string(),
            });
        }
        Ok((namespace, name, version))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SymbolId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SymbolId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Abstraction tier in the component hierarchy, ordered from primitive
/// types (L0) up to contracts and APIs (L4).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum AbstractionLevel {
    /// Primitive types and aliases.
    L0,
    /// Data types and functions.
    L1,
    /// Components, modules, services.
    L2,
    /// Subsystems and libraries.
    L3,
    /// Contracts and APIs.
    L4,
}

impl AbstractionLevel {
    /// All levels, ascending.
    pub const ALL: [AbstractionLevel; 5] = [
        AbstractionLevel::L0,
        AbstractionLevel::L1,
        AbstractionLevel::L2,
        AbstractionLevel::L3,
        AbstractionLevel::L4,
    ];

    /// Get a display label for the level.
    pub fn label(&self) -> &'static str {
        match self {
            AbstractionLevel::L0 => "primitives",
            AbstractionLevel::L1 => "data & functions",
            AbstractionLevel::L2 => "components",
            AbstractionLevel::L3 => "subsystems",
            AbstractionLevel::L4 => "contracts",
        }
    }
}

impl fmt::Display for AbstractionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbstractionLevel::L0 => write!(f, "L0"),
            AbstractionLevel::L1 => write!(f, "L1"),
            AbstractionLevel::L2 => write!(f, "L2"),
            AbstractionLevel::L3 => write!(f, "L3"),
            AbstractionLevel::L4 => write!(f, "L4"),
        }
    }
}

/// What a symbol defines. Each kind is constrained to one abstraction level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    /// A primitive value type (L0).
    Primitive,
    /// A named alias over another type (L0).
    TypeAlias,
    /// A structured data type (L1).
    DataType,
    /// A standalone function (L1).
    Function,
    /// A deployable or composable component (L2).
    Component,
    /// A code module (L2).
    Module,
    /// A long-running service (L2).
    Service,
    /// A subsystem grouping several components (L3).
    Subsystem,
    /// A reusable library (L3).
    Library,
    /// A behavioral contract (L4).
    Contract,
    /// An exposed API surface (L4).
    Api,
}

impl SymbolKind {
    /// The abstraction level this kind belongs to.
    pub fn level(&self) -> AbstractionLevel {
        match self {
            SymbolKind::Primitive | SymbolKind::TypeAlias => AbstractionLevel::L0,
            SymbolKind::DataType | SymbolKind::Function => AbstractionLevel::L1,
            SymbolKind::Component | SymbolKind::Module | SymbolKind::Service => {
                AbstractionLevel::L2
            }
            SymbolKind::Subsystem | SymbolKind::Library => AbstractionLevel::L3,
            SymbolKind::Contract | SymbolKind::Api => AbstractionLevel::L4,
        }
    }

    /// Whether this kind may appear at the given level.
    pub fn is_valid_for(&self, level: AbstractionLevel) -> bool {
        self.level() == level
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SymbolKind::Primitive => "primitive",
            SymbolKind::TypeAlias => "type_alias",
            SymbolKind::DataType => "data_type",
            SymbolKind::Function => "function",
            SymbolKind::Component => "component",
            SymbolKind::Module => "module",
            SymbolKind::Service => "service",
            SymbolKind::Subsystem => "subsystem",
            SymbolKind::Library => "library",
            SymbolKind::Contract => "contract",
            SymbolKind::Api => "api",
        };
        f.write_str(label)
    }
}

/// Lifecycle status of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolStatus {
    /// Registered but never referenced or exercised.
    Declared,
    /// Backed by an implementation.
    Implemented,
    /// Covered by tests.
    Tested,
    /// Observed running.
    Executed,
    /// Kept for history; should not gain new references.
    Deprecated,
}

impl SymbolStatus {
    /// Whether the symbol counts as covered for test audits.
    pub fn is_verified(&self) -> bool {
        matches!(self, SymbolStatus::Tested | SymbolStatus::Executed)
    }
}

/// How a symbol entered the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolOrigin {
    /// Registered by an engineer.
    Manual,
    /// Produced by a generator.
    Generated,
}

/// Where a symbol's definition lives in source, when known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Path of the defining file.
    pub file: String,
    /// 1-based line, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

/// A versioned, typed component definition with directional ports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSymbol {
    /// Canonical id, derived from namespace + name + version.
    pub id: SymbolId,
    /// Component name.
    pub name: String,
    /// Slash-delimited namespace path; may be empty.
    #[serde(default)]
    pub namespace: String,
    /// Abstraction tier.
    pub level: AbstractionLevel,
    /// What the symbol defines; constrained per level.
    pub kind: SymbolKind,
    /// Implementation language tag.
    #[serde(default)]
    pub language: String,
    /// Ordered list of ports.
    #[serde(default)]
    pub ports: Vec<PortDefinition>,
    /// Symbol version.
    pub version: Version,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Human description.
    #[serde(default)]
    pub description: String,
    /// When the symbol was registered.
    pub created_at: SystemTime,
    /// When the symbol was last updated.
    pub updated_at: SystemTime,
    /// Lifecycle status.
    pub status: SymbolStatus,
    /// How the symbol entered the table.
    pub origin: SymbolOrigin,
    /// Child symbol ids. Containment is a forest: no cycles, at most one
    /// parent per symbol.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contains: Vec<SymbolId>,
    /// Version ranges this symbol declares compatibility with.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub compatible_versions: Vec<String>,
    /// Source location, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceLocation>,
}

impl ComponentSymbol {
    /// Create a symbol with derived id and default metadata.
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        version: Version,
        kind: SymbolKind,
    ) -> Self {
        let namespace = namespace.into();
        let name = name.into();
        let now = SystemTime::now();
        Self {
            id: SymbolId::derive(&namespace, &name, &version),
            name,
            namespace,
            level: kind.level(),
            kind,
            language: String::new(),
            ports: Vec::new(),
            version,
            tags: Vec::new(),
            description: String::new(),
            created_at: now,
            updated_at: now,
            status: SymbolStatus::Declared,
            origin: SymbolOrigin::Manual,
            contains: Vec::new(),
            compatible_versions: Vec::new(),
            source: None,
        }
    }

    /// Attach a port.
    pub fn with_port(mut self, port: PortDefinition) -> Self {
        self.ports.push(port);
        self
    }

    /// Attach a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the implementation language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Mark the symbol as generated.
    pub fn generated(mut self) -> Self {
        self.origin = SymbolOrigin::Generated;
        self
    }

    /// Declare a child symbol.
    pub fn with_child(mut self, child: SymbolId) -> Self {
        self.contains.push(child);
        self
    }

    /// Look up a port by name.
    pub fn port(&self, name: &str) -> Option<&PortDefinition> {
        self.ports.iter().find(|p| p.name == name)
    }

    /// Validate the symbol's intrinsic invariants.
    ///
    /// Checks id derivation, kind/level pairing, port-name uniqueness,
    /// and type-reference nesting depth. Containment invariants span
    /// multiple symbols and are checked at registration time by the
    /// symbol table service.
    pub fn validate(&self) -> Result<(), SymbolError> {
        let expected = SymbolId::derive(&self.namespace, &self.name, &self.version);
        if expected != self.id {
            return Err(SymbolError::IdMismatch {
                expected: expected.to_string(),
                actual: self.id.to_string(),
            });
        }
        SymbolId::parse(self.id.as_str())?;

        if !self.kind.is_valid_for(self.level) {
            return Err(SymbolError::InvalidKindForLevel {
                kind: self.kind,
                level: self.level,
            });
        }

        for (i, port) in self.ports.iter().enumerate() {
            if self.ports[..i].iter().any(|p| p.name == port.name) {
                return Err(SymbolError::DuplicatePort {
                    name: port.name.clone(),
                });
            }
            let depth = port.ty.depth();
            if depth > MAX_TYPE_DEPTH {
                return Err(SymbolError::TypeTooDeep {
                    port: port.name.clone(),
                    depth,
                });
            }
        }

        Ok(())
    }
}
