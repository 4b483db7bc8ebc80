//! Persistent repository backed by a `.archwire` folder of JSON documents.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use walkdir::WalkDir;

use archwire_core::{
    AbstractionLevel, ComponentSymbol, Connection, ConnectionId, SymbolId, SymbolKind,
    SymbolOrigin, SymbolStatus,
};

use crate::memory::MemoryRepository;
use crate::repository::{StoreResult, SymbolRepository};

/// Name of the persistence folder.
pub const STORE_DIR: &str = ".archwire";

const MANIFEST_FILE: &str = "manifest.json";
const SYMBOLS_FILE: &str = "symbols.json";
const CONNECTIONS_FILE: &str = "connections.json";
const SNAPSHOTS_DIR: &str = "snapshots";

/// Store manifest describing the persisted state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Version of the manifest format.
    pub version: u32,

    /// Number of persisted symbols.
    pub symbol_count: usize,

    /// Number of persisted connections.
    pub connection_count: usize,

    /// Timestamp of the last write.
    pub last_write: SystemTime,
}

impl Manifest {
    fn new(symbol_count: usize, connection_count: usize) -> Self {
        Self {
            version: 1,
            symbol_count,
            connection_count,
            last_write: SystemTime::now(),
        }
    }
}

/// A timestamped full copy of the store contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// All symbols at snapshot time.
    pub symbols: Vec<ComponentSymbol>,
    /// All connections at snapshot time.
    pub connections: Vec<Connection>,
    /// When the snapshot was taken.
    pub created_at: SystemTime,
}

/// Statistics about a store folder.
#[derive(Debug, Default, Clone)]
pub struct StoreStats {
    /// Whether the folder exists.
    pub exists: bool,
    /// Loaded manifest if available.
    pub manifest: Option<Manifest>,
    /// Number of snapshots.
    pub snapshot_count: usize,
    /// Total size of the folder in bytes.
    pub total_size: u64,
}

/// Persistent [`SymbolRepository`] writing through to a folder of JSON
/// documents. Every mutation lands on disk before the call returns;
/// opening an existing folder loads its contents back.
#[derive(Debug)]
pub struct JsonStore {
    dir: PathBuf,
    cache: MemoryRepository,
}

impl JsonStore {
    /// Open (or create) a store at the given folder.
    pub fn open(dir: impl AsRef<Path>) -> StoreResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        let store = Self {
            dir,
            cache: MemoryRepository::new(),
        };

        let symbols_path = store.dir.join(SYMBOLS_FILE);
        if symbols_path.exists() {
            let symbols: Vec<ComponentSymbol> =
                serde_json::from_str(&std::fs::read_to_string(&symbols_path)?)?;
            for symbol in symbols {
                store.cache.insert_symbol(symbol)?;
            }
        }
        let connections_path = store.dir.join(CONNECTIONS_FILE);
        if connections_path.exists() {
            let connections: Vec<Connection> =
                serde_json::from_str(&std::fs::read_to_string(&connections_path)?)?;
            for connection in connections {
                store.cache.insert_connection(connection, false)?;
            }
        }

        info!(
            path = %store.dir.display(),
            symbols = store.cache.list_symbols()?.len(),
            connections = store.cache.list_connections()?.len(),
            "Opened store"
        );
        Ok(store)
    }

    /// Path of the store folder.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether the folder exists on disk.
    pub fn exists(&self) -> bool {
        self.dir.exists()
    }

    fn init(&self) -> StoreResult<()> {
        if !self.dir.exists() {
            std::fs::create_dir_all(&self.dir)?;
            debug!(path = %self.dir.display(), "Created store directory");
        }
        let snapshots = self.dir.join(SNAPSHOTS_DIR);
        if !snapshots.exists() {
            std::fs::create_dir_all(&snapshots)?;
        }
        Ok(())
    }

    /// Write the current contents and manifest to disk.
    fn flush(&self) -> StoreResult<()> {
        self.init()?;

        let symbols = self.cache.list_symbols()?;
        let connections = self.cache.list_connections()?;

        std::fs::write(
            self.dir.join(SYMBOLS_FILE),
            serde_json::to_string_pretty(&symbols)?,
        )?;
        std::fs::write(
            self.dir.join(CONNECTIONS_FILE),
            serde_json::to_string_pretty(&connections)?,
        )?;

        let manifest = Manifest::new(symbols.len(), connections.len());
        std::fs::write(
            self.dir.join(MANIFEST_FILE),
            serde_json::to_string_pretty(&manifest)?,
        )?;

        debug!(
            path = %self.dir.display(),
            symbols = symbols.len(),
            connections = connections.len(),
            "Flushed store"
        );
        Ok(())
    }

    /// Load the manifest, if one has been written.
    pub fn manifest(&self) -> StoreResult<Option<Manifest>> {
        let path = self.dir.join(MANIFEST_FILE);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&std::fs::read_to_string(path)?)?))
    }

    /// Create a timestamped snapshot of the full contents.
    pub fn snapshot(&self) -> StoreResult<PathBuf> {
        self.init()?;

        let snapshot = StoreSnapshot {
            symbols: self.cache.list_symbols()?,
            connections: self.cache.list_connections()?,
            created_at: SystemTime::now(),
        };
        let timestamp = snapshot
            .created_at
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap()
            .as_secs();
        let path = self
            .dir
            .join(SNAPSHOTS_DIR)
            .join(format!("{timestamp}.json"));
        std::fs::write(&path, serde_json::to_string_pretty(&snapshot)?)?;

        info!(path = %path.display(), "Created snapshot");
        Ok(path)
    }

    /// List snapshot files, newest first.
    pub fn list_snapshots(&self) -> StoreResult<Vec<PathBuf>> {
        let snapshots_dir = self.dir.join(SNAPSHOTS_DIR);
        if !snapshots_dir.exists() {
            return Ok(vec![]);
        }

        let mut snapshots: Vec<PathBuf> = std::fs::read_dir(&snapshots_dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().map(|e| e == "json").unwrap_or(false))
            .collect();
        snapshots.sort_by(|a, b| b.cmp(a));
        Ok(snapshots)
    }

    /// Load a specific snapshot.
    pub fn load_snapshot(&self, path: &Path) -> StoreResult<StoreSnapshot> {
        Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?)
    }

    /// Remove the store folder entirely.
    pub fn clean(&self) -> StoreResult<()> {
        if self.dir.exists() {
            std::fs::remove_dir_all(&self.dir)?;
            info!(path = %self.dir.display(), "Removed store directory");
        }
        Ok(())
    }

    /// Get storage statistics.
    pub fn stats(&self) -> StoreResult<StoreStats> {
        if !self.exists() {
            return Ok(StoreStats::default());
        }

        let total_size = WalkDir::new(&self.dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
            .filter_map(|e| e.metadata().ok())
            .map(|m| m.len())
            .sum();

        Ok(StoreStats {
            exists: true,
            manifest: self.manifest()?,
            snapshot_count: self.list_snapshots()?.len(),
            total_size,
        })
    }
}

impl SymbolRepository for JsonStore {
    fn insert_symbol(&self, symbol: ComponentSymbol) -> StoreResult<()> {
        self.cache.insert_symbol(symbol)?;
        self.flush()
    }

    fn symbol(&self, id: &SymbolId) -> StoreResult<Option<ComponentSymbol>> {
        self.cache.symbol(id)
    }

    fn update_symbol(&self, symbol: ComponentSymbol) -> StoreResult<()> {
        self.cache.update_symbol(symbol)?;
        self.flush()
    }

    fn delete_symbol(&self, id: &SymbolId) -> StoreResult<()> {
        self.cache.delete_symbol(id)?;
        self.flush()
    }

    fn list_symbols(&self) -> StoreResult<Vec<ComponentSymbol>> {
        self.cache.list_symbols()
    }

    fn find_by_namespace(&self, namespace: &str) -> StoreResult<Vec<ComponentSymbol>> {
        self.cache.find_by_namespace(namespace)
    }

    fn find_by_level(&self, level: AbstractionLevel) -> StoreResult<Vec<ComponentSymbol>> {
        self.cache.find_by_level(level)
    }

    fn find_by_kind(&self, kind: SymbolKind) -> StoreResult<Vec<ComponentSymbol>> {
        self.cache.find_by_kind(kind)
    }

    fn find_by_tag(&self, tag: &str) -> StoreResult<Vec<ComponentSymbol>> {
        self.cache.find_by_tag(tag)
    }

    fn find_by_status(&self, status: SymbolStatus) -> StoreResult<Vec<ComponentSymbol>> {
        self.cache.find_by_status(status)
    }

    fn find_by_origin(&self, origin: SymbolOrigin) -> StoreResult<Vec<ComponentSymbol>> {
        self.cache.find_by_origin(origin)
    }

    fn search(&self, query: &str) -> StoreResult<Vec<ComponentSymbol>> {
        self.cache.search(query)
    }

    fn children_of(&self, id: &SymbolId) -> StoreResult<Vec<SymbolId>> {
        self.cache.children_of(id)
    }

    fn parent_of(&self, id: &SymbolId) -> StoreResult<Option<SymbolId>> {
        self.cache.parent_of(id)
    }

    fn insert_connection(
        &self,
        connection: Connection,
        exclusive_target: bool,
    ) -> StoreResult<()> {
        self.cache.insert_connection(connection, exclusive_target)?;
        self.flush()
    }

    fn connection(&self, id: &ConnectionId) -> StoreResult<Option<Connection>> {
        self.cache.connection(id)
    }

    fn delete_connection(&self, id: &ConnectionId) -> StoreResult<()> {
        self.cache.delete_connection(id)?;
        self.flush()
    }

    fn connections_for(&self, id: &SymbolId) -> StoreResult<Vec<Connection>> {
        self.cache.connections_for(id)
    }

    fn connections_to(&self, id: &SymbolId, port: &str) -> StoreResult<Vec<Connection>> {
        self.cache.connections_to(id, port)
    }

    fn list_connections(&self) -> StoreResult<Vec<Connection>> {
        self.cache.list_connections()
    }
}

/// Check if a store folder exists under the given path.
pub fn has_store(path: &Path) -> bool {
    path.join(STORE_DIR).exists()
}
