//! Archwire operations layer.
//!
//! This crate provides the typed service API over an
//! `archwire_store::SymbolRepository`: symbol registration and queries,
//! validated wiring, and dependency-graph analysis. The [`Workbench`]
//! facade wraps all three services behind the uniform
//! `{success, data | error}` envelope that UI and CLI collaborators
//! consume.
//!
//! ## Usage
//!
//! ```
//! use archwire_core::{ComponentSymbol, PortDefinition, PortDirection, SymbolKind, TypeReference, Version};
//! use archwire_ops::{ConnectRequest, Workbench};
//!
//! let bench = Workbench::in_memory();
//!
//! let token = ComponentSymbol::new("core", "Token", Version::new(1, 0, 0), SymbolKind::DataType);
//! let lexer = ComponentSymbol::new("app", "Lexer", Version::new(1, 0, 0), SymbolKind::Component)
//!     .with_port(PortDefinition::new(
//!         "tokens",
//!         PortDirection::Out,
//!         TypeReference::new(token.id.clone()),
//!     ));
//! let parser = ComponentSymbol::new("app", "Parser", Version::new(1, 0, 0), SymbolKind::Component)
//!     .with_port(PortDefinition::new(
//!         "tokens",
//!         PortDirection::In,
//!         TypeReference::new(token.id.clone()),
//!     ));
//!
//! let lexer_id = lexer.id.clone();
//! let parser_id = parser.id.clone();
//! assert!(bench.register_symbol(token).success);
//! assert!(bench.register_symbol(lexer).success);
//! assert!(bench.register_symbol(parser).success);
//!
//! let wired = bench.wire(ConnectRequest::between(lexer_id, "tokens", parser_id, "tokens"));
//! assert!(wired.success);
//! ```

mod config;
mod error;
mod facade;
mod graph;
mod requests;
mod responses;
mod symbols;
mod wiring;

// Re-export public API
pub use config::Config;
pub use error::{ErrorCode, OpsError, OpsResult};
pub use facade::{ApiError, ApiResponse, Workbench};
pub use graph::GraphService;
pub use requests::{ConnectRequest, GraphRequest, SymbolPatch};
pub use responses::{GraphResponse, PortMatch, UnconnectedPort};
pub use symbols::SymbolTable;
pub use wiring::WiringService;
