use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;
use crease_types::InningsId;
use tracing::debug;

use crate::error::LedgerError;
use crate::record::{BallDraft, BallRecord};
use crate::traits::{LedgerReader, LedgerWriter};

/// In-memory ball ledger for tests, local scoring, and embedding.
pub struct InMemoryBallLedger {
    inner: RwLock<LedgerState>,
}

#[derive(Default)]
struct LedgerState {
    streams: HashMap<InningsId, Vec<BallRecord>>,
}

impl InMemoryBallLedger {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(LedgerState::default()),
        }
    }

    fn read_state(&self) -> Result<std::sync::RwLockReadGuard<'_, LedgerState>, LedgerError> {
        self.inner
            .read()
            .map_err(|_| LedgerError::IntegrityViolation {
                seq: 0,
                reason: "ledger read lock poisoned".into(),
            })
    }

    fn write_state(&self) -> Result<std::sync::RwLockWriteGuard<'_, LedgerState>, LedgerError> {
        self.inner
            .write()
            .map_err(|_| LedgerError::IntegrityViolation {
                seq: 0,
                reason: "ledger write lock poisoned".into(),
            })
    }
}

impl Default for InMemoryBallLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerWriter for InMemoryBallLedger {
    fn append(&self, draft: &BallDraft) -> Result<BallRecord, LedgerError> {
        let mut state = self.write_state()?;

        let stream = state.streams.entry(draft.innings).or_default();
        let seq = (stream.len() + 1) as u64;
        let prev_hash = stream.last().map(|r| r.record_hash);

        // Timestamps never run backwards within a stream.
        let now = Utc::now();
        let recorded_at = match stream.last() {
            Some(last) if last.recorded_at > now => last.recorded_at,
            _ => now,
        };

        let mut record = BallRecord::from_draft(draft, seq, prev_hash, recorded_at);
        record.record_hash = record.compute_hash()?;
        stream.push(record.clone());

        debug!(
            innings = %draft.innings,
            seq,
            over = record.over_number,
            ball = record.ball_number,
            "ball appended"
        );
        Ok(record)
    }

    fn invalidate(&self, innings: &InningsId, seq: u64) -> Result<BallRecord, LedgerError> {
        let mut state = self.write_state()?;

        let index = seq
            .checked_sub(1)
            .ok_or(LedgerError::RecordNotFound { seq })? as usize;
        let record = state
            .streams
            .get_mut(innings)
            .and_then(|stream| stream.get_mut(index))
            .ok_or(LedgerError::RecordNotFound { seq })?;

        if !record.is_valid {
            return Err(LedgerError::AlreadyInvalidated { seq });
        }
        record.is_valid = false;

        debug!(innings = %innings, seq, "ball invalidated");
        Ok(record.clone())
    }
}

impl LedgerReader for InMemoryBallLedger {
    fn last_valid(&self, innings: &InningsId) -> Result<Option<BallRecord>, LedgerError> {
        let state = self.read_state()?;
        Ok(state
            .streams
            .get(innings)
            .and_then(|stream| stream.iter().rev().find(|r| r.is_valid))
            .cloned())
    }

    fn read_all(&self, innings: &InningsId) -> Result<Vec<BallRecord>, LedgerError> {
        let state = self.read_state()?;
        Ok(state.streams.get(innings).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{StreamValidator, ViolationKind};
    use crease_types::{BallType, PlayerId};

    fn draft(innings: InningsId, over: u32, ball: u32, runs: u32) -> BallDraft {
        BallDraft {
            innings,
            over_number: over,
            ball_number: ball,
            striker: PlayerId::new(),
            non_striker: PlayerId::new(),
            bowler: PlayerId::new(),
            runs,
            ball_type: BallType::Normal,
            wicket_type: None,
            dismissed: None,
            fielder: None,
            new_batsman: None,
        }
    }

    #[test]
    fn append_assigns_sequence_and_hash_chain() {
        let ledger = InMemoryBallLedger::new();
        let innings = InningsId::new();

        let first = ledger.append(&draft(innings, 0, 0, 1)).unwrap();
        let second = ledger.append(&draft(innings, 0, 1, 4)).unwrap();

        assert_eq!(first.seq, 1);
        assert_eq!(second.seq, 2);
        assert_eq!(first.prev_hash, None);
        assert_eq!(second.prev_hash, Some(first.record_hash));
        assert!(second.recorded_at >= first.recorded_at);
        assert!(StreamValidator::validate_stream(&ledger, &innings)
            .unwrap()
            .is_valid());
    }

    #[test]
    fn streams_are_independent_per_innings() {
        let ledger = InMemoryBallLedger::new();
        let a = InningsId::new();
        let b = InningsId::new();

        ledger.append(&draft(a, 0, 0, 1)).unwrap();
        let first_b = ledger.append(&draft(b, 0, 0, 2)).unwrap();

        assert_eq!(first_b.seq, 1);
        assert_eq!(first_b.prev_hash, None);
        assert_eq!(ledger.read_all(&a).unwrap().len(), 1);
        assert_eq!(ledger.read_all(&b).unwrap(), vec![first_b]);
    }

    #[test]
    fn last_valid_follows_append_order_not_ball_numbers() {
        let ledger = InMemoryBallLedger::new();
        let innings = InningsId::new();

        ledger.append(&draft(innings, 0, 3, 1)).unwrap();
        ledger.append(&draft(innings, 0, 1, 2)).unwrap();

        let last = ledger.last_valid(&innings).unwrap().unwrap();
        assert_eq!(last.seq, 2);
        assert_eq!(last.runs, 2);
    }

    #[test]
    fn invalidate_is_soft_and_skipped_by_last_valid() {
        let ledger = InMemoryBallLedger::new();
        let innings = InningsId::new();

        ledger.append(&draft(innings, 0, 0, 1)).unwrap();
        ledger.append(&draft(innings, 0, 1, 6)).unwrap();

        let undone = ledger.invalidate(&innings, 2).unwrap();
        assert!(!undone.is_valid);
        assert_eq!(ledger.read_all(&innings).unwrap().len(), 2);
        assert_eq!(ledger.last_valid(&innings).unwrap().unwrap().seq, 1);

        // Flipping validity does not break the chain.
        let report = StreamValidator::validate_stream(&ledger, &innings).unwrap();
        assert!(report.is_valid());
        assert_eq!(report.valid_records, 1);
    }

    #[test]
    fn invalidate_twice_or_unknown_is_an_error() {
        let ledger = InMemoryBallLedger::new();
        let innings = InningsId::new();
        ledger.append(&draft(innings, 0, 0, 1)).unwrap();

        ledger.invalidate(&innings, 1).unwrap();
        assert_eq!(
            ledger.invalidate(&innings, 1).unwrap_err(),
            LedgerError::AlreadyInvalidated { seq: 1 }
        );
        assert_eq!(
            ledger.invalidate(&innings, 0).unwrap_err(),
            LedgerError::RecordNotFound { seq: 0 }
        );
        assert_eq!(
            ledger.invalidate(&InningsId::new(), 1).unwrap_err(),
            LedgerError::RecordNotFound { seq: 1 }
        );
    }

    #[test]
    fn tampered_record_fails_validation() {
        let ledger = InMemoryBallLedger::new();
        let innings = InningsId::new();
        ledger.append(&draft(innings, 0, 0, 1)).unwrap();
        ledger.append(&draft(innings, 0, 1, 2)).unwrap();

        {
            let mut guard = ledger.inner.write().unwrap();
            let stream = guard.streams.get_mut(&innings).unwrap();
            stream[1].runs = 6;
        }

        let report = StreamValidator::validate_stream(&ledger, &innings).unwrap();
        assert!(!report.hash_chain_valid);
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].seq, 2);
        assert_eq!(report.violations[0].kind, ViolationKind::HashMismatch);
    }
}
