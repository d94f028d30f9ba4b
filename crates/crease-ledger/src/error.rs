/// Errors produced by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("integrity violation at seq {seq}: {reason}")]
    IntegrityViolation { seq: u64, reason: String },

    #[error("ball record not found: seq {seq}")]
    RecordNotFound { seq: u64 },

    #[error("ball record seq {seq} is already invalidated")]
    AlreadyInvalidated { seq: u64 },

    #[error("serialization error: {0}")]
    Serialization(String),
}
