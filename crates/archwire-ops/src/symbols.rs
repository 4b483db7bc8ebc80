//! Symbol table service: registration, queries, containment, and
//! structural dependency analysis.

use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;
use std::time::SystemTime;

use tracing::{debug, info};

use archwire_core::{
    parse_constraint, AbstractionLevel, ComponentSymbol, SymbolId, SymbolKind, SymbolOrigin,
    SymbolStatus, TypeReference,
};
use archwire_store::SymbolRepository;

use crate::error::{OpsError, OpsResult};
use crate::requests::SymbolPatch;

/// Domain operations on symbols over a shared repository.
///
/// Registration and updates enforce the invariants the raw repository
/// does not know about: kind/level pairing, port-name uniqueness,
/// type-reference depth, well-formed version constraints, and the
/// containment forest (no cycles, at most one parent).
#[derive(Clone)]
pub struct SymbolTable {
    store: Arc<dyn SymbolRepository>,
}

impl SymbolTable {
    /// Create a service over the given repository.
    pub fn new(store: Arc<dyn SymbolRepository>) -> Self {
        Self { store }
    }

    /// Register a new symbol after full validation.
    pub fn register(&self, symbol: ComponentSymbol) -> OpsResult<SymbolId> {
        self.validate_registration(&symbol)?;
        let id = symbol.id.clone();
        self.store.insert_symbol(symbol)?;
        info!(symbol = %id, "Registered symbol");
        Ok(id)
    }

    /// Run every registration check without persisting anything.
    pub fn validate_registration(&self, symbol: &ComponentSymbol) -> OpsResult<()> {
        symbol.validate()?;
        if self.store.symbol(&symbol.id)?.is_some() {
            return Err(OpsError::validation(format!(
                "symbol already registered: {}",
                symbol.id
            )));
        }
        for spec in &symbol.compatible_versions {
            parse_constraint(spec)?;
        }
        for port in &symbol.ports {
            validate_type_constraints(&port.ty)?;
        }
        self.validate_containment(&symbol.id, &symbol.contains)?;
        Ok(())
    }

    /// Fetch a symbol; `NotFound` if absent.
    pub fn get(&self, id: &SymbolId) -> OpsResult<ComponentSymbol> {
        self.store
            .symbol(id)?
            .ok_or_else(|| OpsError::SymbolNotFound { id: id.clone() })
    }

    /// Apply a partial update. Identity fields are immutable through
    /// this path; the patch type cannot express them.
    pub fn update(&self, id: &SymbolId, patch: SymbolPatch) -> OpsResult<ComponentSymbol> {
        let mut symbol = self.get(id)?;
        if patch.is_empty() {
            return Ok(symbol);
        }

        if let Some(description) = patch.description {
            symbol.description = description;
        }
        if let Some(language) = patch.language {
            symbol.language = language;
        }
        if let Some(tags) = patch.tags {
            symbol.tags = tags;
        }
        if let Some(status) = patch.status {
            symbol.status = status;
        }
        if let Some(ports) = patch.ports {
            symbol.ports = ports;
        }
        if let Some(contains) = patch.contains {
            symbol.contains = contains;
        }
        if let Some(compatible_versions) = patch.compatible_versions {
            symbol.compatible_versions = compatible_versions;
        }
        if let Some(source) = patch.source {
            symbol.source = Some(source);
        }
        symbol.updated_at = SystemTime::now();

        symbol.validate()?;
        for spec in &symbol.compatible_versions {
            parse_constraint(spec)?;
        }
        for port in &symbol.ports {
            validate_type_constraints(&port.ty)?;
        }
        self.validate_containment(&symbol.id, &symbol.contains)?;

        self.store.update_symbol(symbol.clone())?;
        debug!(symbol = %id, "Updated symbol");
        Ok(symbol)
    }

    /// Delete a symbol; the repository cascades its connections and
    /// containment links.
    pub fn delete(&self, id: &SymbolId) -> OpsResult<()> {
        self.store.delete_symbol(id)?;
        info!(symbol = %id, "Deleted symbol");
        Ok(())
    }

    /// All symbols, ascending by id.
    pub fn list(&self) -> OpsResult<Vec<ComponentSymbol>> {
        Ok(self.store.list_symbols()?)
    }

    /// Symbols in the exact namespace.
    pub fn find_by_namespace(&self, namespace: &str) -> OpsResult<Vec<ComponentSymbol>> {
        Ok(self.store.find_by_namespace(namespace)?)
    }

    /// Symbols at the given abstraction level.
    pub fn find_by_level(&self, level: AbstractionLevel) -> OpsResult<Vec<ComponentSymbol>> {
        Ok(self.store.find_by_level(level)?)
    }

    /// Symbols of the given kind.
    pub fn find_by_kind(&self, kind: SymbolKind) -> OpsResult<Vec<ComponentSymbol>> {
        Ok(self.store.find_by_kind(kind)?)
    }

    /// Symbols carrying the given tag.
    pub fn find_by_tag(&self, tag: &str) -> OpsResult<Vec<ComponentSymbol>> {
        Ok(self.store.find_by_tag(tag)?)
    }

    /// Symbols in the given lifecycle status.
    pub fn find_by_status(&self, status: SymbolStatus) -> OpsResult<Vec<ComponentSymbol>> {
        Ok(self.store.find_by_status(status)?)
    }

    /// Symbols with the given origin.
    pub fn find_by_origin(&self, origin: SymbolOrigin) -> OpsResult<Vec<ComponentSymbol>> {
        Ok(self.store.find_by_origin(origin)?)
    }

    /// Case-insensitive free-text search.
    pub fn search(&self, query: &str) -> OpsResult<Vec<ComponentSymbol>> {
        Ok(self.store.search(query)?)
    }

    /// Resolve the symbol's children.
    pub fn children(&self, id: &SymbolId) -> OpsResult<Vec<ComponentSymbol>> {
        let mut out = Vec::new();
        for child in self.store.children_of(id)? {
            if let Some(symbol) = self.store.symbol(&child)? {
                out.push(symbol);
            }
        }
        Ok(out)
    }

    /// Resolve the symbol's parent, if any.
    pub fn parent(&self, id: &SymbolId) -> OpsResult<Option<ComponentSymbol>> {
        self.get(id)?;
        match self.store.parent_of(id)? {
            Some(parent) => Ok(self.store.symbol(&parent)?),
            None => Ok(None),
        }
    }

    /// Every symbol whose port types reference `id`, directly or through
    /// a generic argument.
    pub fn dependents_of(&self, id: &SymbolId) -> OpsResult<Vec<ComponentSymbol>> {
        self.get(id)?;
        Ok(self
            .list()?
            .into_iter()
            .filter(|s| s.id != *id && s.ports.iter().any(|p| p.ty.references(id)))
            .collect())
    }

    /// Every symbol id referenced by `id`'s own ports, deduplicated in
    /// first-mention order.
    pub fn dependencies_of(&self, id: &SymbolId) -> OpsResult<Vec<SymbolId>> {
        let symbol = self.get(id)?;
        let mut out: Vec<SymbolId> = Vec::new();
        for port in &symbol.ports {
            for referenced in port.ty.referenced_symbols() {
                if !out.contains(&referenced) {
                    out.push(referenced);
                }
            }
        }
        Ok(out)
    }

    /// Symbols still in status `declared` — registered but never
    /// referenced or exercised.
    pub fn unreachable_symbols(&self) -> OpsResult<Vec<ComponentSymbol>> {
        self.find_by_status(SymbolStatus::Declared)
    }

    /// Symbols whose status is neither `tested` nor `executed`.
    pub fn untested_symbols(&self) -> OpsResult<Vec<ComponentSymbol>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|s| !s.status.is_verified())
            .collect())
    }

    /// Check the containment forest invariants for linking `id` to the
    /// given children: every child exists, has no other parent, and no
    /// descendant chain leads back to `id`.
    fn validate_containment(&self, id: &SymbolId, children: &[SymbolId]) -> OpsResult<()> {
        for (i, child) in children.iter().enumerate() {
            if children[..i].contains(child) {
                return Err(OpsError::validation(format!(
                    "symbol {child} is listed as a child twice"
                )));
            }
            if child == id {
                return Err(OpsError::validation(format!(
                    "symbol {id} cannot contain itself"
                )));
            }
            if self.store.symbol(child)?.is_none() {
                return Err(OpsError::validation(format!(
                    "contained symbol {child} is not registered"
                )));
            }
            if let Some(parent) = self.store.parent_of(child)? {
                if parent != *id {
                    return Err(OpsError::validation(format!(
                        "symbol {child} is already contained by {parent}"
                    )));
                }
            }

            let mut queue: VecDeque<SymbolId> = VecDeque::from([child.clone()]);
            let mut seen: BTreeSet<SymbolId> = BTreeSet::new();
            while let Some(current) = queue.pop_front() {
                if !seen.insert(current.clone()) {
                    continue;
                }
                for grandchild in self.store.children_of(&current)? {
                    if grandchild == *id {
                        return Err(OpsError::validation(format!(
                            "containment cycle: {id} -> {child} reaches back to {id}"
                        )));
                    }
                    queue.push_back(grandchild);
                }
            }
        }
        Ok(())
    }
}

/// Parse every version constraint a type reference carries, at any
/// nesting level.
fn validate_type_constraints(ty: &TypeReference) -> OpsResult<()> {
    if let Some(spec) = &ty.constraint {
        parse_constraint(spec)?;
    }
    for generic in &ty.generics {
        validate_type_constraints(generic)?;
    }
    Ok(())
}
