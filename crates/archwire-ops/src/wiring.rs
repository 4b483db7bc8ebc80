//! Wiring service: validated connection creation and removal, plus
//! compatible-port discovery and required-port audits.

use std::sync::Arc;

use tracing::{info, warn};

use archwire_core::{
    check_port_compatibility, CheckMode, ComponentSymbol, Connection, ConnectionId,
    PortDefinition, SymbolId,
};
use archwire_store::{StoreError, SymbolRepository};

use crate::error::{OpsError, OpsResult};
use crate::requests::ConnectRequest;
use crate::responses::{PortMatch, UnconnectedPort};

/// Orchestrates validated wiring over a shared repository.
///
/// Every connection passes the same gauntlet: both symbols resolve, both
/// named ports resolve, the compatibility checker accepts the pair, and
/// a non-multiple input port is not already occupied. Only then does the
/// connection persist — with the store's exclusive-target rule closing
/// the race two concurrent connects would otherwise win together.
#[derive(Clone)]
pub struct WiringService {
    store: Arc<dyn SymbolRepository>,
}

impl WiringService {
    /// Create a service over the given repository.
    pub fn new(store: Arc<dyn SymbolRepository>) -> Self {
        Self { store }
    }

    /// Create a validated connection, returning the persisted record.
    pub fn connect(&self, request: ConnectRequest) -> OpsResult<Connection> {
        let (to_port, connection) = self.prepare(&request)?;

        self.store
            .insert_connection(connection.clone(), !to_port.multiple)
            .map_err(|err| match err {
                StoreError::TargetOccupied { symbol, port } => {
                    OpsError::CardinalityViolation { symbol, port }
                }
                other => other.into(),
            })?;

        info!(
            connection = %connection.id,
            from = %connection.from_symbol,
            to = %connection.to_symbol,
            "Created connection"
        );
        Ok(connection)
    }

    /// Remove a connection; `NotFound` if absent.
    pub fn disconnect(&self, id: &ConnectionId) -> OpsResult<()> {
        self.store.delete_connection(id)?;
        info!(connection = %id, "Removed connection");
        Ok(())
    }

    /// Run every `connect` check without persisting anything.
    pub fn validate_connection(&self, request: &ConnectRequest) -> OpsResult<()> {
        self.prepare(request).map(|_| ())
    }

    /// Scan all other symbols for ports the named port could legally
    /// connect to, ranked by descending score, then symbol id, then
    /// port name.
    pub fn compatible_ports(
        &self,
        symbol_id: &SymbolId,
        port_name: &str,
    ) -> OpsResult<Vec<PortMatch>> {
        let subject = self.resolve_symbol(symbol_id)?;
        let port = resolve_port(&subject, port_name)?;

        let mut matches: Vec<PortMatch> = Vec::new();
        for other in self.store.list_symbols()? {
            if other.id == subject.id {
                continue;
            }
            for candidate in &other.ports {
                // Try the subject in both roles; an inout pair can match
                // either way, so keep the better score.
                let mut best: Option<u8> = None;
                if port.direction.is_output_capable() && candidate.direction.is_input_capable() {
                    let verdict = check_port_compatibility(port, candidate, CheckMode::Compatible);
                    if verdict.compatible {
                        best = verdict.score;
                    }
                }
                if port.direction.is_input_capable() && candidate.direction.is_output_capable() {
                    let verdict = check_port_compatibility(candidate, port, CheckMode::Compatible);
                    if verdict.compatible {
                        best = best.max(verdict.score);
                    }
                }
                if let Some(score) = best {
                    matches.push(PortMatch {
                        symbol: other.id.clone(),
                        port: candidate.name.clone(),
                        direction: candidate.direction,
                        score,
                    });
                }
            }
        }

        matches.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.symbol.cmp(&b.symbol))
                .then_with(|| a.port.cmp(&b.port))
        });
        Ok(matches)
    }

    /// Every required, input-capable port with no persisted connection
    /// targeting it.
    pub fn unconnected_required_ports(&self) -> OpsResult<Vec<UnconnectedPort>> {
        let mut out = Vec::new();
        for symbol in self.store.list_symbols()? {
            for port in &symbol.ports {
                if port.required
                    && port.direction.is_input_capable()
                    && self.store.connections_to(&symbol.id, &port.name)?.is_empty()
                {
                    out.push(UnconnectedPort {
                        symbol: symbol.id.clone(),
                        port: port.name.clone(),
                        direction: port.direction,
                    });
                }
            }
        }
        Ok(out)
    }

    /// Shared validation pipeline for `connect` and `validate_connection`.
    fn prepare(&self, request: &ConnectRequest) -> OpsResult<(PortDefinition, Connection)> {
        let from_symbol = self.resolve_symbol(&request.from_symbol)?;
        let to_symbol = self.resolve_symbol(&request.to_symbol)?;
        let from_port = resolve_port(&from_symbol, &request.from_port)?.clone();
        let to_port = resolve_port(&to_symbol, &request.to_port)?.clone();

        let verdict = check_port_compatibility(&from_port, &to_port, CheckMode::Compatible);
        if !verdict.compatible {
            let reason = verdict
                .reason
                .unwrap_or_else(|| "ports are incompatible".to_string());
            warn!(
                from = %from_symbol.id,
                to = %to_symbol.id,
                reason = %reason,
                "Rejected connection"
            );
            return Err(OpsError::IncompatiblePorts { reason });
        }

        // Friendly pre-check; the store re-checks atomically on insert.
        if !to_port.multiple
            && !self
                .store
                .connections_to(&to_symbol.id, &to_port.name)?
                .is_empty()
        {
            return Err(OpsError::CardinalityViolation {
                symbol: to_symbol.id.clone(),
                port: to_port.name.clone(),
            });
        }

        let mut connection = Connection::between(
            from_symbol.id.clone(),
            from_port.name.clone(),
            to_symbol.id.clone(),
            to_port.name.clone(),
        );
        if let Some(transform) = &request.transform {
            connection = connection.with_transform(transform.clone());
        }

        Ok((to_port, connection))
    }

    fn resolve_symbol(&self, id: &SymbolId) -> OpsResult<ComponentSymbol> {
        self.store
            .symbol(id)?
            .ok_or_else(|| OpsError::SymbolNotFound { id: id.clone() })
    }
}

fn resolve_port<'a>(symbol: &'a ComponentSymbol, name: &str) -> OpsResult<&'a PortDefinition> {
    symbol.port(name).ok_or_else(|| OpsError::PortNotFound {
        symbol: symbol.id.clone(),
        port: name.to_string(),
    })
}
