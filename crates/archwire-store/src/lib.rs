//! Symbol repository for the Archwire workbench.
//!
//! The services in `archwire-ops` depend only on the [`SymbolRepository`]
//! capability trait; storage specifics never leak into graph or wiring
//! logic. Two implementations ship here:
//!
//! - [`MemoryRepository`] — `RwLock`-guarded maps, used by tests and
//!   embedders
//! - [`JsonStore`] — a `.archwire/` folder of JSON documents with a
//!   manifest and timestamped snapshots
//!
//! Both enforce the repository-side referential rules: deleting a symbol
//! cascades to its connections and containment links, and an
//! exclusive-target connection insert rejects an occupied input port
//! inside the store's own write lock.

mod json;
mod memory;
mod repository;

pub use json::{has_store, JsonStore, Manifest, StoreSnapshot, StoreStats, STORE_DIR};
pub use memory::MemoryRepository;
pub use repository::{StoreError, StoreResult, SymbolRepository};
