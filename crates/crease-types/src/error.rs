use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    #[error("invalid delivery: {field}: {reason}")]
    InvalidDelivery { field: &'static str, reason: String },

    #[error("unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },
}

impl TypeError {
    pub(crate) fn delivery(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidDelivery {
            field,
            reason: reason.into(),
        }
    }
}
