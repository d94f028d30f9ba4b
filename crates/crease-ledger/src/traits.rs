use crease_types::InningsId;

use crate::error::LedgerError;
use crate::record::{BallDraft, BallRecord};

/// Write boundary for ball ledger operations.
pub trait LedgerWriter: Send + Sync {
    /// Append a delivery, assigning the next sequence number and hash link.
    fn append(&self, draft: &BallDraft) -> Result<BallRecord, LedgerError>;

    /// Soft-delete a record. The record stays in the stream.
    fn invalidate(&self, innings: &InningsId, seq: u64) -> Result<BallRecord, LedgerError>;
}

/// Read boundary for ball ledger queries and reconstruction.
pub trait LedgerReader: Send + Sync {
    /// Most recently appended record that is still valid.
    fn last_valid(&self, innings: &InningsId) -> Result<Option<BallRecord>, LedgerError>;

    /// Every record of the innings, including invalidated ones, in append order.
    fn read_all(&self, innings: &InningsId) -> Result<Vec<BallRecord>, LedgerError>;
}
