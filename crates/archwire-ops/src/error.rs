//! Error types for the operations layer.

use archwire_core::{ConnectionId, SymbolError, SymbolId, VersionError};
use archwire_store::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for operations.
pub type OpsResult<T> = Result<T, OpsError>;

/// Errors that can occur during operations.
#[derive(Debug, Error)]
pub enum OpsError {
    /// The referenced symbol does not exist.
    #[error("symbol not found: {id}")]
    SymbolNotFound { id: SymbolId },

    /// The referenced port does not exist on the symbol.
    #[error("port `{port}` not found on {symbol}")]
    PortNotFound { symbol: SymbolId, port: String },

    /// The referenced connection does not exist.
    #[error("connection not found: {id}")]
    ConnectionNotFound { id: ConnectionId },

    /// A version constraint failed to parse.
    #[error("invalid version constraint `{spec}`: {message}")]
    InvalidConstraint { spec: String, message: String },

    /// The ports cannot be connected.
    #[error("incompatible ports: {reason}")]
    IncompatiblePorts { reason: String },

    /// The input port accepts a single connection and is already wired.
    #[error("input port {symbol}#{port} accepts a single connection and is already wired")]
    CardinalityViolation { symbol: SymbolId, port: String },

    /// A symbol-table invariant was violated.
    #[error("validation failed: {message}")]
    Validation { message: String },

    /// Unexpected repository failure.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl OpsError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// The stable code this error reports at the facade boundary.
    pub fn code(&self) -> ErrorCode {
        match self {
            OpsError::SymbolNotFound { .. }
            | OpsError::PortNotFound { .. }
            | OpsError::ConnectionNotFound { .. } => ErrorCode::NotFound,
            OpsError::InvalidConstraint { .. } => ErrorCode::InvalidConstraint,
            OpsError::IncompatiblePorts { .. } => ErrorCode::IncompatiblePorts,
            OpsError::CardinalityViolation { .. } => ErrorCode::CardinalityViolation,
            OpsError::Validation { .. } => ErrorCode::ValidationFailed,
            OpsError::Internal { .. } => ErrorCode::InternalError,
        }
    }
}

/// Stable error code taxonomy exposed to UI/CLI collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    NotFound,
    InvalidConstraint,
    IncompatiblePorts,
    CardinalityViolation,
    ValidationFailed,
    InternalError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ErrorCode::NotFound => "NotFound",
            ErrorCode::InvalidConstraint => "InvalidConstraint",
            ErrorCode::IncompatiblePorts => "IncompatiblePorts",
            ErrorCode::CardinalityViolation => "CardinalityViolation",
            ErrorCode::ValidationFailed => "ValidationFailed",
            ErrorCode::InternalError => "InternalError",
        };
        f.write_str(label)
    }
}

impl From<StoreError> for OpsError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::SymbolNotFound { id } => OpsError::SymbolNotFound { id },
            StoreError::ConnectionNotFound { id } => OpsError::ConnectionNotFound { id },
            StoreError::TargetOccupied { symbol, port } => {
                OpsError::CardinalityViolation { symbol, port }
            }
            StoreError::DuplicateSymbol { .. } | StoreError::DuplicateConnection { .. } => {
                OpsError::Validation {
                    message: err.to_string(),
                }
            }
            StoreError::Io(_) | StoreError::Json(_) => OpsError::Internal {
                message: err.to_string(),
            },
        }
    }
}

impl From<SymbolError> for OpsError {
    fn from(err: SymbolError) -> Self {
        OpsError::Validation {
            message: err.to_string(),
        }
    }
}

impl From<VersionError> for OpsError {
    fn from(err: VersionError) -> Self {
        match err {
            VersionError::InvalidConstraint { input, message } => OpsError::InvalidConstraint {
                spec: input,
                message,
            },
            VersionError::InvalidVersion { .. } => OpsError::Validation {
                message: err.to_string(),
            },
        }
    }
}
