use std::fmt;

use crease_ledger::LedgerError;
use crease_types::TypeError;
use serde::Serialize;

/// Errors produced by the scoring engine.
///
/// No variant is retried by the engine. On any error the innings aggregate,
/// the match, and the ledger are exactly as they were before the call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("invalid state: {reason}")]
    InvalidState { reason: String },

    #[error("invariant violation: {reason}")]
    InvariantViolation { reason: String },

    #[error("validation failed on {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Coarse error class for transports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    NotFound,
    InvalidState,
    InvariantViolation,
    Validation,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotFound => "notFound",
            Self::InvalidState => "invalidState",
            Self::InvariantViolation => "invariantViolation",
            Self::Validation => "validation",
        };
        f.write_str(name)
    }
}

impl EngineError {
    pub fn not_found(entity: &'static str, id: impl fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn invalid_state(reason: impl Into<String>) -> Self {
        Self::InvalidState {
            reason: reason.into(),
        }
    }

    pub fn invariant(reason: impl Into<String>) -> Self {
        Self::InvariantViolation {
            reason: reason.into(),
        }
    }

    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidState { .. } => ErrorKind::InvalidState,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::InvariantViolation { .. } | Self::Ledger(_) => ErrorKind::InvariantViolation,
        }
    }

    /// The offending input field, for validation errors.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl From<TypeError> for EngineError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidDelivery { field, reason } => Self::Validation { field, reason },
            TypeError::UnknownVariant { kind, value } => Self::Validation {
                field: kind,
                reason: format!("unknown value {value}"),
            },
            TypeError::InvalidId(reason) => Self::Validation { field: "id", reason },
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
